//! Time slot management.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::dao::{ReservationDao, ReservationTimeDao, RESERVATION_TIME};
use crate::domain::{hh_mm, AvailableTime, ReservationTime};
use crate::error::{Error, Result};

/// Input for creating a time slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeRequest {
    /// Start of the slot.
    #[serde(with = "hh_mm")]
    pub start_at: NaiveTime,
}

impl TimeRequest {
    /// Create a request for a slot starting at `start_at`.
    #[must_use]
    pub fn new(start_at: NaiveTime) -> Self {
        Self { start_at }
    }
}

/// Adds, lists and removes bookable time slots.
#[derive(Debug, Clone)]
pub struct TimeService<D, R> {
    times: D,
    reservations: R,
}

impl<D: ReservationTimeDao, R: ReservationDao> TimeService<D, R> {
    /// Create a service over the given stores.
    #[must_use]
    pub fn new(times: D, reservations: R) -> Self {
        Self {
            times,
            reservations,
        }
    }

    /// All slots, earliest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn find_all_reservation_times(&self) -> Result<Vec<ReservationTime>> {
        self.times.find_all_reservation_times()
    }

    /// Create a slot.
    ///
    /// # Errors
    ///
    /// Returns `Duplicated("reservationTime")` if a slot already starts at
    /// the requested time.
    pub fn add_reservation_time(&self, request: TimeRequest) -> Result<ReservationTime> {
        if self
            .times
            .exist_reservation_time_by_start_at(request.start_at)?
        {
            warn!("Rejected duplicate reservation time {}", request.start_at);
            return Err(Error::duplicated(RESERVATION_TIME));
        }

        let saved = self
            .times
            .add_reservation_time(&ReservationTime::new(request.start_at))?;
        info!("Added reservation time {}", request.start_at);
        Ok(saved)
    }

    /// Remove the slot with `id`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound("reservationTime")` if there is no such slot and
    /// `InUse` if reservations still hold it.
    pub fn remove_reservation_time(&self, id: i64) -> Result<()> {
        self.times.find_reservation_time_by_id(id)?;
        if self.reservations.exist_reservation_by_time_id(id)? {
            warn!("Rejected removal of reservation time {} still in use", id);
            return Err(Error::in_use(RESERVATION_TIME, id));
        }

        self.times.remove_reservation_time_by_id(id)?;
        info!("Removed reservation time {}", id);
        Ok(())
    }

    /// Every slot, flagged with whether it is booked for `theme_id` on `date`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn find_available_times(
        &self,
        date: NaiveDate,
        theme_id: i64,
    ) -> Result<Vec<AvailableTime>> {
        let booked = self.reservations.find_booked_time_ids(date, theme_id)?;
        debug!(
            "Theme {} has {} booked slots on {}",
            theme_id,
            booked.len(),
            date
        );

        Ok(self
            .times
            .find_all_reservation_times()?
            .into_iter()
            .map(|time| AvailableTime {
                already_booked: time.id.is_some_and(|id| booked.contains(&id)),
                time,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::{InMemoryReservationDao, InMemoryTimeDao};
    use crate::domain::{Member, Reservation, Theme};

    type Service = TimeService<InMemoryTimeDao, InMemoryReservationDao>;

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn service() -> (Service, InMemoryReservationDao) {
        let reservations = InMemoryReservationDao::new();
        (
            TimeService::new(InMemoryTimeDao::linked(&reservations), reservations.clone()),
            reservations,
        )
    }

    fn book(reservations: &InMemoryReservationDao, slot: ReservationTime, date: NaiveDate) {
        reservations
            .add_reservation(&Reservation::new(
                Member::new("brown", "brown@example.com", "pw").with_id(1),
                date,
                slot,
                Theme::new("Lost Temple", "", "").with_id(1),
            ))
            .unwrap();
    }

    #[test]
    fn test_find_all_reservation_times() {
        let (service, _) = service();
        service.add_reservation_time(TimeRequest::new(time(10, 0))).unwrap();
        service.add_reservation_time(TimeRequest::new(time(12, 0))).unwrap();

        assert_eq!(service.find_all_reservation_times().unwrap().len(), 2);
    }

    #[test]
    fn test_add_reservation_time() {
        let (service, _) = service();

        let actual = service.add_reservation_time(TimeRequest::new(time(10, 0))).unwrap();

        assert_eq!(actual.id, Some(1));
        assert_eq!(actual.start_at, time(10, 0));
    }

    #[test]
    fn test_add_duplicated_reservation_time() {
        let (service, _) = service();
        let request = TimeRequest::new(time(10, 0));
        service.add_reservation_time(request).unwrap();

        let err = service.add_reservation_time(request).unwrap_err();

        assert!(err.is_duplicated());
        assert!(err.to_string().contains("reservationTime"));
    }

    #[test]
    fn test_remove_reservation_time() {
        let (service, _) = service();
        service.add_reservation_time(TimeRequest::new(time(10, 0))).unwrap();

        service.remove_reservation_time(1).unwrap();

        assert!(service.find_all_reservation_times().unwrap().is_empty());
    }

    #[test]
    fn test_remove_missing_reservation_time() {
        let (service, _) = service();
        let err = service.remove_reservation_time(1).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_remove_booked_reservation_time_is_in_use() {
        let (service, reservations) = service();
        let slot = service.add_reservation_time(TimeRequest::new(time(10, 0))).unwrap();
        book(&reservations, slot, NaiveDate::from_ymd_opt(2025, 5, 1).unwrap());

        let err = service.remove_reservation_time(1).unwrap_err();

        assert!(matches!(err, Error::InUse { id: 1, .. }));
        assert_eq!(service.find_all_reservation_times().unwrap().len(), 1);
    }

    #[test]
    fn test_find_available_times() {
        let (service, reservations) = service();
        let ten = service.add_reservation_time(TimeRequest::new(time(10, 0))).unwrap();
        service.add_reservation_time(TimeRequest::new(time(12, 0))).unwrap();
        let day = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();
        book(&reservations, ten, day);

        let available = service.find_available_times(day, 1).unwrap();
        let flags: Vec<(NaiveTime, bool)> = available
            .iter()
            .map(|a| (a.time.start_at, a.already_booked))
            .collect();
        assert_eq!(flags, vec![(time(10, 0), true), (time(12, 0), false)]);

        let other_theme = service.find_available_times(day, 2).unwrap();
        assert!(other_theme.iter().all(|a| !a.already_booked));
    }

    #[test]
    fn test_time_request_deserialize() {
        let request: TimeRequest = serde_json::from_str(r#"{"startAt": "10:00"}"#).unwrap();
        assert_eq!(request.start_at, time(10, 0));
        assert!(serde_json::from_str::<TimeRequest>(r#"{"startAt": "10h"}"#).is_err());
    }
}
