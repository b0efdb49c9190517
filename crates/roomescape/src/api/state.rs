//! Shared state handed to every handler.

use std::sync::Arc;

use crate::config::ReservationConfig;
use crate::dao::{SqliteMemberDao, SqliteReservationDao, SqliteThemeDao, SqliteTimeDao};
use crate::service::{MemberService, ReservationService, ThemeService, TimeService};
use crate::storage::Database;

/// [`TimeService`] over `SQLite`.
pub type SqliteTimeService = TimeService<SqliteTimeDao, SqliteReservationDao>;
/// [`ThemeService`] over `SQLite`.
pub type SqliteThemeService = ThemeService<SqliteThemeDao, SqliteReservationDao>;
/// [`MemberService`] over `SQLite`.
pub type SqliteMemberService = MemberService<SqliteMemberDao>;
/// [`ReservationService`] over `SQLite`.
pub type SqliteReservationService =
    ReservationService<SqliteReservationDao, SqliteMemberDao, SqliteTimeDao, SqliteThemeDao>;

/// The services, wired to one database.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Time slots.
    pub times: Arc<SqliteTimeService>,
    /// Themes.
    pub themes: Arc<SqliteThemeService>,
    /// Members.
    pub members: Arc<SqliteMemberService>,
    /// Reservations.
    pub reservations: Arc<SqliteReservationService>,
}

impl AppState {
    /// Wire every service to `db`.
    #[must_use]
    pub fn new(db: &Database, config: &ReservationConfig) -> Self {
        let members = SqliteMemberDao::new(db.clone());
        let times = SqliteTimeDao::new(db.clone());
        let themes = SqliteThemeDao::new(db.clone());
        let reservations = SqliteReservationDao::new(db.clone());

        Self {
            times: Arc::new(TimeService::new(times.clone(), reservations.clone())),
            themes: Arc::new(ThemeService::new(themes.clone(), reservations.clone(), config)),
            members: Arc::new(MemberService::new(members.clone())),
            reservations: Arc::new(ReservationService::new(reservations, members, times, themes)),
        }
    }
}
