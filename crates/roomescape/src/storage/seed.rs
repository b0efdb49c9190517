//! Demo data for a fresh database.

use chrono::{Days, NaiveDate, NaiveTime};
use tracing::{debug, info};

use crate::dao::{
    MemberDao, ReservationDao, ReservationTimeDao, SqliteMemberDao, SqliteReservationDao,
    SqliteThemeDao, SqliteTimeDao, ThemeDao,
};
use crate::domain::{Member, Reservation, ReservationTime, Role, Theme};
use crate::error::{Error, Result};
use crate::storage::Database;

const THEMES: [(&str, &str, &str); 3] = [
    (
        "Lost Temple",
        "Find the idol before the chamber floods.",
        "https://assets.roomescape.dev/themes/lost-temple.jpg",
    ),
    (
        "Haunted Manor",
        "Something in the attic wants you to stay.",
        "https://assets.roomescape.dev/themes/haunted-manor.jpg",
    ),
    (
        "Space Station",
        "Restore life support before the air runs out.",
        "https://assets.roomescape.dev/themes/space-station.jpg",
    ),
];

const SLOTS: [(u32, u32); 4] = [(10, 0), (13, 0), (16, 0), (19, 30)];

/// `(days before today, slot index, theme index, booked by admin)`
const BOOKINGS: [(u64, usize, usize, bool); 5] = [
    (1, 0, 1, false),
    (2, 1, 1, false),
    (3, 2, 0, true),
    (5, 0, 1, false),
    (6, 3, 2, false),
];

/// Insert the demo data set if the database holds no records.
///
/// Reservations are dated in the week before `today` so the popular themes
/// ranking has something to show.
///
/// Returns `true` if anything was inserted. The inserts share one
/// transaction, so a failure leaves the database empty.
///
/// # Errors
///
/// Returns an error if any insert fails.
pub fn seed_demo_data(db: &Database, today: NaiveDate) -> Result<bool> {
    db.in_transaction(|| insert_demo_data(db, today))
}

fn insert_demo_data(db: &Database, today: NaiveDate) -> Result<bool> {
    let stats = db.stats()?;
    if stats.members + stats.themes + stats.reservation_times + stats.reservations > 0 {
        debug!("Database already holds records, skipping seed");
        return Ok(false);
    }

    let members = SqliteMemberDao::new(db.clone());
    let times = SqliteTimeDao::new(db.clone());
    let themes = SqliteThemeDao::new(db.clone());
    let reservations = SqliteReservationDao::new(db.clone());

    let admin = members.add_member(
        &Member::new("admin", "admin@roomescape.dev", "admin").with_role(Role::Admin),
    )?;
    let player =
        members.add_member(&Member::new("player", "player@roomescape.dev", "player"))?;

    let saved_themes = THEMES
        .iter()
        .map(|(name, description, thumbnail)| {
            themes.add_theme(&Theme::new(*name, *description, *thumbnail))
        })
        .collect::<Result<Vec<_>>>()?;

    let saved_slots = SLOTS
        .iter()
        .map(|&(h, m)| {
            let start_at = NaiveTime::from_hms_opt(h, m, 0)
                .ok_or_else(|| Error::internal(format!("invalid demo slot {h}:{m}")))?;
            times.add_reservation_time(&ReservationTime::new(start_at))
        })
        .collect::<Result<Vec<_>>>()?;

    for &(days_ago, slot, theme, by_admin) in &BOOKINGS {
        let date = today
            .checked_sub_days(Days::new(days_ago))
            .ok_or_else(|| Error::internal("demo reservation date out of range"))?;
        let member = if by_admin { &admin } else { &player };
        reservations.add_reservation(&Reservation::new(
            member.clone(),
            date,
            saved_slots[slot],
            saved_themes[theme].clone(),
        ))?;
    }

    info!(
        "Seeded {} members, {} themes, {} time slots and {} reservations",
        2,
        saved_themes.len(),
        saved_slots.len(),
        BOOKINGS.len()
    );
    Ok(true)
}
