use chrono::NaiveDate;
use rusqlite::{params, OptionalExtension, Row};
use tracing::debug;

use crate::dao::{ThemeDao, THEME};
use crate::domain::Theme;
use crate::error::{Error, Result};
use crate::storage::Database;

use super::{constraint_error, date_param, limit_param};

/// [`ThemeDao`] backed by the `theme` table.
#[derive(Debug, Clone)]
pub struct SqliteThemeDao {
    db: Database,
}

impl SqliteThemeDao {
    /// Create a DAO over `db`.
    #[must_use]
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Convert `id, name, description, thumbnail` columns starting at `offset`.
    pub(crate) fn row_to_theme(row: &Row<'_>, offset: usize) -> rusqlite::Result<Theme> {
        Ok(Theme {
            id: Some(row.get(offset)?),
            name: row.get(offset + 1)?,
            description: row.get(offset + 2)?,
            thumbnail: row.get(offset + 3)?,
        })
    }
}

impl ThemeDao for SqliteThemeDao {
    fn find_all_themes(&self) -> Result<Vec<Theme>> {
        self.db.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT id, name, description, thumbnail FROM theme ORDER BY id")?;
            let themes = stmt
                .query_map([], |row| Self::row_to_theme(row, 0))?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(themes)
        })
    }

    fn find_theme_by_id(&self, id: i64) -> Result<Theme> {
        self.db.with_conn(|conn| {
            conn.query_row(
                "SELECT id, name, description, thumbnail FROM theme WHERE id = ?1",
                [id],
                |row| Self::row_to_theme(row, 0),
            )
            .optional()?
            .ok_or_else(|| Error::not_found(THEME, id))
        })
    }

    fn find_top_reserved_themes_in_period_with_limit(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        limit: usize,
    ) -> Result<Vec<Theme>> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(
                r"
                SELECT t.id, t.name, t.description, t.thumbnail
                FROM theme AS t
                INNER JOIN reservation AS r ON r.theme_id = t.id
                WHERE r.date >= ?1 AND r.date <= ?2
                GROUP BY t.id
                ORDER BY COUNT(r.id) DESC, t.id ASC
                LIMIT ?3
                ",
            )?;
            let themes = stmt
                .query_map(
                    params![date_param(start), date_param(end), limit_param(limit)],
                    |row| Self::row_to_theme(row, 0),
                )?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(themes)
        })
    }

    fn exist_theme_by_name(&self, name: &str) -> Result<bool> {
        self.db.with_conn(|conn| {
            let exists: bool = conn.query_row(
                "SELECT EXISTS (SELECT 1 FROM theme WHERE name = ?1)",
                [name],
                |row| row.get(0),
            )?;
            Ok(exists)
        })
    }

    fn add_theme(&self, theme: &Theme) -> Result<Theme> {
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO theme (name, description, thumbnail) VALUES (?1, ?2, ?3)",
                params![theme.name, theme.description, theme.thumbnail],
            )
            .map_err(|e| constraint_error(e, THEME, None))?;

            let id = conn.last_insert_rowid();
            debug!("Inserted theme '{}' with id {}", theme.name, id);
            Ok(theme.clone().with_id(id))
        })
    }

    fn remove_theme_by_id(&self, id: i64) -> Result<()> {
        self.db.with_conn(|conn| {
            let affected = conn
                .execute("DELETE FROM theme WHERE id = ?1", [id])
                .map_err(|e| constraint_error(e, THEME, Some(id)))?;

            if affected == 0 {
                return Err(Error::not_found(THEME, id));
            }
            debug!("Removed theme {}", id);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::sqlite::fixtures::{self, date};

    fn sample_theme() -> Theme {
        Theme::new("Sunken Ship", "a flooded hull", "https://img/ship.png")
    }

    #[test]
    fn test_find_all_themes() {
        let daos = fixtures::populated();
        assert_eq!(daos.themes.find_all_themes().unwrap().len(), 3);
    }

    #[test]
    fn test_find_theme_by_id() {
        let daos = fixtures::empty();
        let actual = daos.themes.add_theme(&sample_theme()).unwrap();

        let expected = daos.themes.find_theme_by_id(actual.id.unwrap()).unwrap();

        assert_eq!(actual.id, expected.id);
        assert_eq!(actual.name, expected.name);
        assert_eq!(actual.description, expected.description);
        assert_eq!(actual.thumbnail, expected.thumbnail);
    }

    #[test]
    fn test_find_theme_by_missing_id() {
        let daos = fixtures::empty();
        let err = daos.themes.find_theme_by_id(100).unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().contains("theme"));
    }

    #[test]
    fn test_top_reserved_themes_in_week() {
        let daos = fixtures::populated();
        let today = date(2025, 4, 30);

        let themes = daos
            .themes
            .find_top_reserved_themes_in_period_with_limit(today - chrono::Days::new(7), today, 2)
            .unwrap();

        assert_eq!(themes.len(), 2);
        assert_eq!(themes.first().and_then(|t| t.id), Some(2));
        assert_eq!(themes.last().and_then(|t| t.id), Some(1));
    }

    #[test]
    fn test_top_reserved_themes_window_is_inclusive() {
        let daos = fixtures::populated();

        // Only 2025-04-24 (theme 1) and 2025-04-25 (theme 1) fall inside.
        let themes = daos
            .themes
            .find_top_reserved_themes_in_period_with_limit(date(2025, 4, 24), date(2025, 4, 25), 10)
            .unwrap();

        assert_eq!(themes.iter().map(|t| t.id).collect::<Vec<_>>(), vec![Some(1)]);
    }

    #[test]
    fn test_top_reserved_themes_breaks_ties_by_id() {
        let daos = fixtures::populated();

        // One booking each for theme 1 (04-25) and theme 2 (04-26).
        let themes = daos
            .themes
            .find_top_reserved_themes_in_period_with_limit(date(2025, 4, 25), date(2025, 4, 26), 10)
            .unwrap();

        assert_eq!(themes.iter().map(|t| t.id).collect::<Vec<_>>(), vec![Some(1), Some(2)]);
    }

    #[test]
    fn test_exist_theme_by_name() {
        let daos = fixtures::empty();
        let theme = sample_theme();
        assert!(!daos.themes.exist_theme_by_name(&theme.name).unwrap());

        daos.themes.add_theme(&theme).unwrap();
        assert!(daos.themes.exist_theme_by_name(&theme.name).unwrap());
    }

    #[test]
    fn test_remove_theme() {
        let daos = fixtures::empty();
        let id = daos.themes.add_theme(&sample_theme()).unwrap().id.unwrap();

        daos.themes.remove_theme_by_id(id).unwrap();

        let err = daos.themes.remove_theme_by_id(id).unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().contains("theme"));
    }

    #[test]
    fn test_duplicate_name_rejected_by_store() {
        let daos = fixtures::empty();
        daos.themes.add_theme(&sample_theme()).unwrap();

        assert!(daos.themes.add_theme(&sample_theme()).unwrap_err().is_duplicated());
    }
}
