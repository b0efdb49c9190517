//! `SQLite` implementations of the data-access traits.

mod member;
mod reservation;
mod theme;
mod time;

pub use member::SqliteMemberDao;
pub use reservation::SqliteReservationDao;
pub use theme::SqliteThemeDao;
pub use time::SqliteTimeDao;

use chrono::{NaiveDate, NaiveTime};
use rusqlite::types::Type;
use rusqlite::Row;

use crate::domain::TIME_FORMAT;
use crate::error::Error;

/// Storage format of reservation dates.
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Read a `HH:MM` column.
fn time_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveTime> {
    let text: String = row.get(idx)?;
    NaiveTime::parse_from_str(&text, TIME_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Read a `yyyy-MM-dd` column.
fn date_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDate> {
    let text: String = row.get(idx)?;
    NaiveDate::parse_from_str(&text, DATE_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn time_param(time: NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

fn date_param(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn limit_param(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

/// Translate constraint failures on `resource` into domain errors.
///
/// A unique violation means a concurrent writer won the race past the
/// service's existence check; a foreign key violation on delete means the
/// row is still referenced.
fn constraint_error(err: rusqlite::Error, resource: &'static str, id: Option<i64>) -> Error {
    if let rusqlite::Error::SqliteFailure(failure, _) = &err {
        match failure.extended_code {
            rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE => return Error::duplicated(resource),
            rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY => {
                if let Some(id) = id {
                    return Error::in_use(resource, id);
                }
            }
            _ => {}
        }
    }
    Error::DatabaseQuery(err)
}
