//! `SQLite` schema definitions for roomescape.
//!
//! This module contains the SQL statements for creating the reservation
//! schema. Indexes that arrived after the first release live in
//! [`super::migrations`].

/// SQL statement to create the member table.
pub const CREATE_MEMBER_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS member (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE,
    password TEXT NOT NULL,
    role TEXT NOT NULL DEFAULT 'USER'
)
";

/// SQL statement to create the reservation time table.
///
/// `start_at` holds `HH:MM` text so lexical order is chronological order.
pub const CREATE_RESERVATION_TIME_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS reservation_time (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    start_at TEXT NOT NULL UNIQUE
)
";

/// SQL statement to create the theme table.
pub const CREATE_THEME_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS theme (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    description TEXT NOT NULL,
    thumbnail TEXT NOT NULL
)
";

/// SQL statement to create the reservation table.
pub const CREATE_RESERVATION_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS reservation (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    member_id INTEGER NOT NULL,
    date TEXT NOT NULL,
    time_id INTEGER NOT NULL,
    theme_id INTEGER NOT NULL,
    FOREIGN KEY (member_id) REFERENCES member (id),
    FOREIGN KEY (time_id) REFERENCES reservation_time (id),
    FOREIGN KEY (theme_id) REFERENCES theme (id),
    UNIQUE (date, time_id, theme_id)
)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// SQL statement to index reservations by date for range filters.
pub const CREATE_RESERVATION_DATE_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_reservation_date ON reservation(date)
";

/// SQL statement to index reservations by theme.
pub const CREATE_RESERVATION_THEME_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_reservation_theme ON reservation(theme_id)
";

/// SQL statement to index reservations by member.
pub const CREATE_RESERVATION_MEMBER_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_reservation_member ON reservation(member_id)
";

/// All base schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    CREATE_MEMBER_TABLE,
    CREATE_RESERVATION_TIME_TABLE,
    CREATE_THEME_TABLE,
    CREATE_RESERVATION_TABLE,
    CREATE_METADATA_TABLE,
];
