use chrono::NaiveTime;
use rusqlite::{OptionalExtension, Row};
use tracing::debug;

use crate::dao::{ReservationTimeDao, RESERVATION_TIME};
use crate::domain::ReservationTime;
use crate::error::{Error, Result};
use crate::storage::Database;

use super::{constraint_error, time_column, time_param};

/// [`ReservationTimeDao`] backed by the `reservation_time` table.
#[derive(Debug, Clone)]
pub struct SqliteTimeDao {
    db: Database,
}

impl SqliteTimeDao {
    /// Create a DAO over `db`.
    #[must_use]
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Convert `id, start_at` columns starting at `offset`.
    pub(crate) fn row_to_time(row: &Row<'_>, offset: usize) -> rusqlite::Result<ReservationTime> {
        Ok(ReservationTime {
            id: Some(row.get(offset)?),
            start_at: time_column(row, offset + 1)?,
        })
    }
}

impl ReservationTimeDao for SqliteTimeDao {
    fn find_all_reservation_times(&self) -> Result<Vec<ReservationTime>> {
        self.db.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT id, start_at FROM reservation_time ORDER BY start_at")?;
            let times = stmt
                .query_map([], |row| Self::row_to_time(row, 0))?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(times)
        })
    }

    fn find_reservation_time_by_id(&self, id: i64) -> Result<ReservationTime> {
        self.db.with_conn(|conn| {
            conn.query_row(
                "SELECT id, start_at FROM reservation_time WHERE id = ?1",
                [id],
                |row| Self::row_to_time(row, 0),
            )
            .optional()?
            .ok_or_else(|| Error::not_found(RESERVATION_TIME, id))
        })
    }

    fn exist_reservation_time_by_start_at(&self, start_at: NaiveTime) -> Result<bool> {
        self.db.with_conn(|conn| {
            let exists: bool = conn.query_row(
                "SELECT EXISTS (SELECT 1 FROM reservation_time WHERE start_at = ?1)",
                [time_param(start_at)],
                |row| row.get(0),
            )?;
            Ok(exists)
        })
    }

    fn add_reservation_time(&self, time: &ReservationTime) -> Result<ReservationTime> {
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO reservation_time (start_at) VALUES (?1)",
                [time_param(time.start_at)],
            )
            .map_err(|e| constraint_error(e, RESERVATION_TIME, None))?;

            let id = conn.last_insert_rowid();
            let saved = ReservationTime::new(time.start_at).with_id(id);
            debug!("Inserted reservation time {} with id {}", saved.start_at, id);
            Ok(saved)
        })
    }

    fn remove_reservation_time_by_id(&self, id: i64) -> Result<()> {
        self.db.with_conn(|conn| {
            let affected = conn
                .execute("DELETE FROM reservation_time WHERE id = ?1", [id])
                .map_err(|e| constraint_error(e, RESERVATION_TIME, Some(id)))?;

            if affected == 0 {
                return Err(Error::not_found(RESERVATION_TIME, id));
            }
            debug!("Removed reservation time {}", id);
            Ok(())
        })
    }
}
