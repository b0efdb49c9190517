use chrono::NaiveDate;
use rusqlite::{params, Row};
use tracing::debug;

use crate::dao::{ReservationDao, MEMBER, RESERVATION, RESERVATION_TIME, THEME};
use crate::domain::{Reservation, ReservationFilter};
use crate::error::{Error, Result};
use crate::storage::Database;

use super::{constraint_error, date_column, date_param};
use super::{SqliteMemberDao, SqliteThemeDao, SqliteTimeDao};

/// The reservation aggregate query. Column order is what
/// [`SqliteReservationDao::row_to_reservation`] reads.
const SELECT_RESERVATION: &str = r"
SELECT
    r.id,
    m.id, m.name, m.email, m.password, m.role,
    r.date,
    rt.id, rt.start_at,
    t.id, t.name, t.description, t.thumbnail
FROM reservation AS r
INNER JOIN member AS m ON r.member_id = m.id
INNER JOIN reservation_time AS rt ON r.time_id = rt.id
INNER JOIN theme AS t ON r.theme_id = t.id
";

const ORDER_BY_SESSION: &str = "ORDER BY r.date, rt.start_at, r.id";

/// [`ReservationDao`] backed by the `reservation` table joined with its
/// member, slot and theme.
#[derive(Debug, Clone)]
pub struct SqliteReservationDao {
    db: Database,
}

impl SqliteReservationDao {
    /// Create a DAO over `db`.
    #[must_use]
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn row_to_reservation(row: &Row<'_>) -> rusqlite::Result<Reservation> {
        Ok(Reservation {
            id: Some(row.get(0)?),
            member: SqliteMemberDao::row_to_member(row, 1)?,
            date: date_column(row, 6)?,
            time: SqliteTimeDao::row_to_time(row, 7)?,
            theme: SqliteThemeDao::row_to_theme(row, 9)?,
        })
    }

    fn exists(&self, sql: &str, params: impl rusqlite::Params) -> Result<bool> {
        self.db.with_conn(|conn| {
            let exists: bool = conn.query_row(sql, params, |row| row.get(0))?;
            Ok(exists)
        })
    }
}

impl ReservationDao for SqliteReservationDao {
    fn find_all_reservations(&self) -> Result<Vec<Reservation>> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!("{SELECT_RESERVATION} {ORDER_BY_SESSION}"))?;
            let reservations = stmt
                .query_map([], Self::row_to_reservation)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(reservations)
        })
    }

    fn find_reservations_by_filters(&self, filter: &ReservationFilter) -> Result<Vec<Reservation>> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                r"{SELECT_RESERVATION}
                WHERE (?1 IS NULL OR r.theme_id = ?1)
                    AND (?2 IS NULL OR r.member_id = ?2)
                    AND (?3 IS NULL OR r.date >= ?3)
                    AND (?4 IS NULL OR r.date <= ?4)
                {ORDER_BY_SESSION}"
            ))?;
            let reservations = stmt
                .query_map(
                    params![
                        filter.theme_id,
                        filter.member_id,
                        filter.date_from.map(date_param),
                        filter.date_to.map(date_param),
                    ],
                    Self::row_to_reservation,
                )?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(reservations)
        })
    }

    fn exist_reservation_by_date_time_and_theme(
        &self,
        date: NaiveDate,
        time_id: i64,
        theme_id: i64,
    ) -> Result<bool> {
        self.exists(
            r"
            SELECT EXISTS (
                SELECT 1
                FROM reservation
                WHERE date = ?1
                    AND time_id = ?2
                    AND theme_id = ?3
            )
            ",
            params![date_param(date), time_id, theme_id],
        )
    }

    fn exist_reservation_by_time_id(&self, time_id: i64) -> Result<bool> {
        self.exists(
            "SELECT EXISTS (SELECT 1 FROM reservation WHERE time_id = ?1)",
            [time_id],
        )
    }

    fn exist_reservation_by_theme_id(&self, theme_id: i64) -> Result<bool> {
        self.exists(
            "SELECT EXISTS (SELECT 1 FROM reservation WHERE theme_id = ?1)",
            [theme_id],
        )
    }

    fn find_booked_time_ids(&self, date: NaiveDate, theme_id: i64) -> Result<Vec<i64>> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT time_id FROM reservation \
                 WHERE date = ?1 AND theme_id = ?2 ORDER BY time_id",
            )?;
            let ids = stmt
                .query_map(params![date_param(date), theme_id], |row| row.get(0))?
                .collect::<std::result::Result<Vec<i64>, _>>()?;
            Ok(ids)
        })
    }

    fn add_reservation(&self, reservation: &Reservation) -> Result<Reservation> {
        let unsaved =
            |resource: &str| Error::internal(format!("{resource} must be saved before booking"));
        let member_id = reservation.member.id.ok_or_else(|| unsaved(MEMBER))?;
        let time_id = reservation.time.id.ok_or_else(|| unsaved(RESERVATION_TIME))?;
        let theme_id = reservation.theme.id.ok_or_else(|| unsaved(THEME))?;

        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO reservation (member_id, date, time_id, theme_id) \
                 VALUES (?1, ?2, ?3, ?4)",
                params![member_id, date_param(reservation.date), time_id, theme_id],
            )
            .map_err(|e| constraint_error(e, RESERVATION, None))?;

            let id = conn.last_insert_rowid();
            debug!(
                "Inserted reservation {} for member {} on {} (time {}, theme {})",
                id, member_id, reservation.date, time_id, theme_id
            );
            Ok(reservation.clone().with_id(id))
        })
    }

    fn remove_reservation_by_id(&self, id: i64) -> Result<()> {
        self.db.with_conn(|conn| {
            let affected = conn.execute("DELETE FROM reservation WHERE id = ?1", [id])?;

            if affected == 0 {
                return Err(Error::not_found(RESERVATION, id));
            }
            debug!("Removed reservation {}", id);
            Ok(())
        })
    }
}
