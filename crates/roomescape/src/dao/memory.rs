//! In-memory implementations of the data-access traits.
//!
//! These mirror the observable behaviour of the `SQLite` DAOs (ids start at
//! 1, the same not-found, duplicate and in-use errors) without a database.
//! Each fake is a cloneable handle onto shared state, so a test can keep one
//! clone and hand another to the service under test.
//!
//! The time and theme stores stand in for the foreign keys through a linked
//! [`InMemoryReservationDao`]: removing a referenced row fails with
//! [`Error::InUse`].

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{NaiveDate, NaiveTime};

use crate::dao::{
    MemberDao, ReservationDao, ReservationTimeDao, ThemeDao, MEMBER, RESERVATION,
    RESERVATION_TIME, THEME,
};
use crate::domain::{
    truncate_to_minute, Member, Reservation, ReservationFilter, ReservationTime, Theme,
};
use crate::error::{Error, Result};

/// Rows keyed by id plus the next id to hand out.
#[derive(Debug)]
struct Table<T> {
    rows: BTreeMap<i64, T>,
    next_id: i64,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl<T> Table<T> {
    fn insert(&mut self, make: impl FnOnce(i64) -> T) -> &T {
        let id = self.next_id;
        self.next_id += 1;
        self.rows.entry(id).or_insert_with(|| make(id))
    }
}

/// Shared, lockable table.
#[derive(Debug)]
struct Shared<T>(Arc<Mutex<Table<T>>>);

impl<T> Clone for Shared<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T> Default for Shared<T> {
    fn default() -> Self {
        Self(Arc::new(Mutex::new(Table::default())))
    }
}

impl<T> Shared<T> {
    fn lock(&self) -> Result<MutexGuard<'_, Table<T>>> {
        self.0.lock().map_err(|_| Error::LockPoisoned)
    }
}

fn require_id(id: Option<i64>, resource: &'static str) -> Result<i64> {
    id.ok_or_else(|| Error::internal(format!("{resource} must be saved before booking")))
}

/// In-memory [`MemberDao`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryMemberDao {
    table: Shared<Member>,
}

impl InMemoryMemberDao {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl MemberDao for InMemoryMemberDao {
    fn find_all_members(&self) -> Result<Vec<Member>> {
        Ok(self.table.lock()?.rows.values().cloned().collect())
    }

    fn find_member_by_id(&self, id: i64) -> Result<Member> {
        self.table
            .lock()?
            .rows
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::not_found(MEMBER, id))
    }

    fn find_member_by_email(&self, email: &str) -> Result<Option<Member>> {
        Ok(self
            .table
            .lock()?
            .rows
            .values()
            .find(|m| m.email == email)
            .cloned())
    }

    fn exist_member_by_email(&self, email: &str) -> Result<bool> {
        Ok(self.find_member_by_email(email)?.is_some())
    }

    fn add_member(&self, member: &Member) -> Result<Member> {
        let mut table = self.table.lock()?;
        if table.rows.values().any(|m| m.email == member.email) {
            return Err(Error::duplicated(MEMBER));
        }
        Ok(table.insert(|id| member.clone().with_id(id)).clone())
    }
}

/// In-memory [`ReservationTimeDao`].
///
/// Start times are kept to the minute like the `HH:MM` column.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTimeDao {
    table: Shared<ReservationTime>,
    reservations: InMemoryReservationDao,
}

impl InMemoryTimeDao {
    /// Create an empty store with no reservations linked.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store whose slots stay in use while `reservations`
    /// holds a booking for them.
    #[must_use]
    pub fn linked(reservations: &InMemoryReservationDao) -> Self {
        Self {
            table: Shared::default(),
            reservations: reservations.clone(),
        }
    }
}

impl ReservationTimeDao for InMemoryTimeDao {
    fn find_all_reservation_times(&self) -> Result<Vec<ReservationTime>> {
        let mut times: Vec<ReservationTime> =
            self.table.lock()?.rows.values().copied().collect();
        times.sort_by_key(|t| t.start_at);
        Ok(times)
    }

    fn find_reservation_time_by_id(&self, id: i64) -> Result<ReservationTime> {
        self.table
            .lock()?
            .rows
            .get(&id)
            .copied()
            .ok_or_else(|| Error::not_found(RESERVATION_TIME, id))
    }

    fn exist_reservation_time_by_start_at(&self, start_at: NaiveTime) -> Result<bool> {
        let start_at = truncate_to_minute(start_at);
        Ok(self
            .table
            .lock()?
            .rows
            .values()
            .any(|t| t.start_at == start_at))
    }

    fn add_reservation_time(&self, time: &ReservationTime) -> Result<ReservationTime> {
        let slot = ReservationTime::new(time.start_at);
        let mut table = self.table.lock()?;
        if table.rows.values().any(|t| t.start_at == slot.start_at) {
            return Err(Error::duplicated(RESERVATION_TIME));
        }
        Ok(*table.insert(|id| slot.with_id(id)))
    }

    fn remove_reservation_time_by_id(&self, id: i64) -> Result<()> {
        let mut table = self.table.lock()?;
        if !table.rows.contains_key(&id) {
            return Err(Error::not_found(RESERVATION_TIME, id));
        }
        if self.reservations.exist_reservation_by_time_id(id)? {
            return Err(Error::in_use(RESERVATION_TIME, id));
        }
        table.rows.remove(&id);
        Ok(())
    }
}

/// In-memory [`ReservationDao`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryReservationDao {
    table: Shared<Reservation>,
}

impl InMemoryReservationDao {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn matching(&self, predicate: impl Fn(&Reservation) -> bool) -> Result<Vec<Reservation>> {
        let mut found: Vec<Reservation> = self
            .table
            .lock()?
            .rows
            .values()
            .filter(|r| predicate(r))
            .cloned()
            .collect();
        found.sort_by_key(|r| (r.date, r.time.start_at, r.id));
        Ok(found)
    }
}

impl ReservationDao for InMemoryReservationDao {
    fn find_all_reservations(&self) -> Result<Vec<Reservation>> {
        self.matching(|_| true)
    }

    fn find_reservations_by_filters(
        &self,
        filter: &ReservationFilter,
    ) -> Result<Vec<Reservation>> {
        self.matching(|r| filter.matches(r))
    }

    fn exist_reservation_by_date_time_and_theme(
        &self,
        date: NaiveDate,
        time_id: i64,
        theme_id: i64,
    ) -> Result<bool> {
        Ok(!self
            .matching(|r| {
                r.date == date && r.time.id == Some(time_id) && r.theme.id == Some(theme_id)
            })?
            .is_empty())
    }

    fn exist_reservation_by_time_id(&self, time_id: i64) -> Result<bool> {
        Ok(!self.matching(|r| r.time.id == Some(time_id))?.is_empty())
    }

    fn exist_reservation_by_theme_id(&self, theme_id: i64) -> Result<bool> {
        Ok(!self.matching(|r| r.theme.id == Some(theme_id))?.is_empty())
    }

    fn find_booked_time_ids(&self, date: NaiveDate, theme_id: i64) -> Result<Vec<i64>> {
        let mut ids: Vec<i64> = self
            .matching(|r| r.date == date && r.theme.id == Some(theme_id))?
            .into_iter()
            .filter_map(|r| r.time.id)
            .collect();
        ids.sort_unstable();
        Ok(ids)
    }

    fn add_reservation(&self, reservation: &Reservation) -> Result<Reservation> {
        require_id(reservation.member.id, MEMBER)?;
        let time_id = require_id(reservation.time.id, RESERVATION_TIME)?;
        let theme_id = require_id(reservation.theme.id, THEME)?;
        if self.exist_reservation_by_date_time_and_theme(reservation.date, time_id, theme_id)? {
            return Err(Error::duplicated(RESERVATION));
        }

        let mut table = self.table.lock()?;
        Ok(table.insert(|id| reservation.clone().with_id(id)).clone())
    }

    fn remove_reservation_by_id(&self, id: i64) -> Result<()> {
        self.table
            .lock()?
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| Error::not_found(RESERVATION, id))
    }
}

/// In-memory [`ThemeDao`].
///
/// Popularity ranking and the in-use check read the reservations of the
/// linked [`InMemoryReservationDao`]; a default-constructed store ranks
/// nothing and never reports a theme in use.
#[derive(Debug, Clone, Default)]
pub struct InMemoryThemeDao {
    table: Shared<Theme>,
    reservations: InMemoryReservationDao,
}

impl InMemoryThemeDao {
    /// Create an empty store with no reservations linked.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store that ranks themes by `reservations` and keeps
    /// booked themes in use.
    #[must_use]
    pub fn linked(reservations: &InMemoryReservationDao) -> Self {
        Self {
            table: Shared::default(),
            reservations: reservations.clone(),
        }
    }
}

impl ThemeDao for InMemoryThemeDao {
    fn find_all_themes(&self) -> Result<Vec<Theme>> {
        Ok(self.table.lock()?.rows.values().cloned().collect())
    }

    fn find_theme_by_id(&self, id: i64) -> Result<Theme> {
        self.table
            .lock()?
            .rows
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::not_found(THEME, id))
    }

    fn find_top_reserved_themes_in_period_with_limit(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        limit: usize,
    ) -> Result<Vec<Theme>> {
        let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
        for reservation in self
            .reservations
            .matching(|r| r.date >= start && r.date <= end)?
        {
            if let Some(theme_id) = reservation.theme.id {
                *counts.entry(theme_id).or_default() += 1;
            }
        }

        let mut ranked: Vec<(i64, usize)> = counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

        let table = self.table.lock()?;
        Ok(ranked
            .into_iter()
            .filter_map(|(id, _)| table.rows.get(&id).cloned())
            .take(limit)
            .collect())
    }

    fn exist_theme_by_name(&self, name: &str) -> Result<bool> {
        Ok(self.table.lock()?.rows.values().any(|t| t.name == name))
    }

    fn add_theme(&self, theme: &Theme) -> Result<Theme> {
        let mut table = self.table.lock()?;
        if table.rows.values().any(|t| t.name == theme.name) {
            return Err(Error::duplicated(THEME));
        }
        Ok(table.insert(|id| theme.clone().with_id(id)).clone())
    }

    fn remove_theme_by_id(&self, id: i64) -> Result<()> {
        let mut table = self.table.lock()?;
        if !table.rows.contains_key(&id) {
            return Err(Error::not_found(THEME, id));
        }
        if self.reservations.exist_reservation_by_theme_id(id)? {
            return Err(Error::in_use(THEME, id));
        }
        table.rows.remove(&id);
        Ok(())
    }
}
