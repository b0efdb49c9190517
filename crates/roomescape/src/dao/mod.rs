//! Data-access traits for roomescape.
//!
//! Each table has a trait describing the queries the services need. The
//! [`sqlite`] implementations run against a [`Database`](crate::storage::Database);
//! the [`memory`] implementations keep records in process and are what the
//! service tests run against.
//!
//! Lookups by id return [`Error::NotFound`](crate::Error::NotFound) naming the
//! resource when no row matches, and so do removals that touch no row.

pub mod memory;
pub mod sqlite;

use chrono::{NaiveDate, NaiveTime};

use crate::domain::{Member, Reservation, ReservationFilter, ReservationTime, Theme};
use crate::error::Result;

pub use memory::{InMemoryMemberDao, InMemoryReservationDao, InMemoryThemeDao, InMemoryTimeDao};
pub use sqlite::{SqliteMemberDao, SqliteReservationDao, SqliteThemeDao, SqliteTimeDao};

/// Resource name used in member errors.
pub const MEMBER: &str = "member";
/// Resource name used in time slot errors.
pub const RESERVATION_TIME: &str = "reservationTime";
/// Resource name used in theme errors.
pub const THEME: &str = "theme";
/// Resource name used in reservation errors.
pub const RESERVATION: &str = "reservation";

/// Access to registered members.
pub trait MemberDao: Send + Sync {
    /// All members, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store fails.
    fn find_all_members(&self) -> Result<Vec<Member>>;

    /// The member with `id`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound("member")` if there is none.
    fn find_member_by_id(&self, id: i64) -> Result<Member>;

    /// The member registered under `email`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store fails.
    fn find_member_by_email(&self, email: &str) -> Result<Option<Member>>;

    /// Whether `email` is already registered.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store fails.
    fn exist_member_by_email(&self, email: &str) -> Result<bool>;

    /// Persist a new member and return it with its id.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store rejects the row.
    fn add_member(&self, member: &Member) -> Result<Member>;
}

/// Access to bookable time slots.
pub trait ReservationTimeDao: Send + Sync {
    /// All slots, earliest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store fails.
    fn find_all_reservation_times(&self) -> Result<Vec<ReservationTime>>;

    /// The slot with `id`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound("reservationTime")` if there is none.
    fn find_reservation_time_by_id(&self, id: i64) -> Result<ReservationTime>;

    /// Whether a slot already starts at `start_at`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store fails.
    fn exist_reservation_time_by_start_at(&self, start_at: NaiveTime) -> Result<bool>;

    /// Persist a new slot and return it with its id.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store rejects the row.
    fn add_reservation_time(&self, time: &ReservationTime) -> Result<ReservationTime>;

    /// Delete the slot with `id`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound("reservationTime")` if no row was deleted.
    fn remove_reservation_time_by_id(&self, id: i64) -> Result<()>;
}

/// Access to themes.
pub trait ThemeDao: Send + Sync {
    /// All themes, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store fails.
    fn find_all_themes(&self) -> Result<Vec<Theme>>;

    /// The theme with `id`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound("theme")` if there is none.
    fn find_theme_by_id(&self, id: i64) -> Result<Theme>;

    /// Themes ranked by reservations dated within `[start, end]`.
    ///
    /// Most reserved first, ties broken by lower id. Themes with no
    /// reservation in the window are left out. At most `limit` entries.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store fails.
    fn find_top_reserved_themes_in_period_with_limit(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        limit: usize,
    ) -> Result<Vec<Theme>>;

    /// Whether a theme named `name` exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store fails.
    fn exist_theme_by_name(&self, name: &str) -> Result<bool>;

    /// Persist a new theme and return it with its id.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store rejects the row.
    fn add_theme(&self, theme: &Theme) -> Result<Theme>;

    /// Delete the theme with `id`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound("theme")` if no row was deleted.
    fn remove_theme_by_id(&self, id: i64) -> Result<()>;
}

/// Access to reservations, composed with their member, slot and theme.
pub trait ReservationDao: Send + Sync {
    /// All reservations, ordered by date then start time.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store fails.
    fn find_all_reservations(&self) -> Result<Vec<Reservation>>;

    /// Reservations matching every constraint present in `filter`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store fails.
    fn find_reservations_by_filters(&self, filter: &ReservationFilter) -> Result<Vec<Reservation>>;

    /// Whether the slot `time_id` of theme `theme_id` is taken on `date`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store fails.
    fn exist_reservation_by_date_time_and_theme(
        &self,
        date: NaiveDate,
        time_id: i64,
        theme_id: i64,
    ) -> Result<bool>;

    /// Whether any reservation uses slot `time_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store fails.
    fn exist_reservation_by_time_id(&self, time_id: i64) -> Result<bool>;

    /// Whether any reservation uses theme `theme_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store fails.
    fn exist_reservation_by_theme_id(&self, theme_id: i64) -> Result<bool>;

    /// Ids of the slots taken for `theme_id` on `date`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store fails.
    fn find_booked_time_ids(&self, date: NaiveDate, theme_id: i64) -> Result<Vec<i64>>;

    /// Persist a new reservation and return it with its id.
    ///
    /// Only the ids of the member, slot and theme are stored; the returned
    /// aggregate carries the records that were passed in.
    ///
    /// # Errors
    ///
    /// Returns an error if any of them lacks an id or the store rejects the row.
    fn add_reservation(&self, reservation: &Reservation) -> Result<Reservation>;

    /// Delete the reservation with `id`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound("reservation")` if no row was deleted.
    fn remove_reservation_by_id(&self, id: i64) -> Result<()>;
}
