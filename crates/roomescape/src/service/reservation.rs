//! Booking and cancelling reservations.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::dao::{MemberDao, ReservationDao, ReservationTimeDao, ThemeDao, RESERVATION};
use crate::domain::{Reservation, ReservationFilter};
use crate::error::{Error, Result};

/// Input for booking a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationRequest {
    /// Who is booking.
    pub member_id: i64,
    /// Session date.
    pub date: NaiveDate,
    /// Slot to book.
    pub time_id: i64,
    /// Theme to play.
    pub theme_id: i64,
}

/// Books, lists and cancels reservations.
///
/// Composes the member, slot and theme stores to resolve the ids in a
/// [`ReservationRequest`] into a full [`Reservation`].
#[derive(Debug, Clone)]
pub struct ReservationService<R, M, T, H> {
    reservations: R,
    members: M,
    times: T,
    themes: H,
}

impl<R, M, T, H> ReservationService<R, M, T, H>
where
    R: ReservationDao,
    M: MemberDao,
    T: ReservationTimeDao,
    H: ThemeDao,
{
    /// Create a service over the given stores.
    #[must_use]
    pub fn new(reservations: R, members: M, times: T, themes: H) -> Self {
        Self {
            reservations,
            members,
            times,
            themes,
        }
    }

    /// All reservations, ordered by session.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn find_all_reservations(&self) -> Result<Vec<Reservation>> {
        self.reservations.find_all_reservations()
    }

    /// Reservations matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns a validation error if `date_from` is after `date_to`.
    pub fn find_reservations_by_filters(
        &self,
        filter: &ReservationFilter,
    ) -> Result<Vec<Reservation>> {
        if let (Some(from), Some(to)) = (filter.date_from, filter.date_to) {
            if from > to {
                return Err(Error::validation(format!(
                    "dateFrom {from} is after dateTo {to}"
                )));
            }
        }
        if filter.is_empty() {
            return self.find_all_reservations();
        }

        debug!("Searching reservations with {:?}", filter);
        self.reservations.find_reservations_by_filters(filter)
    }

    /// Book a session.
    ///
    /// `now` is the current local date-time; sessions starting before it
    /// cannot be booked.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` naming the member, slot or theme that does not
    /// exist, a validation error for a past session, and
    /// `Duplicated("reservation")` if the session is already taken.
    pub fn add_reservation(
        &self,
        request: ReservationRequest,
        now: NaiveDateTime,
    ) -> Result<Reservation> {
        let member = self.members.find_member_by_id(request.member_id)?;
        let time = self.times.find_reservation_time_by_id(request.time_id)?;
        let theme = self.themes.find_theme_by_id(request.theme_id)?;
        let reservation = Reservation::new(member, request.date, time, theme);

        if reservation.is_before(now) {
            warn!("Rejected reservation for past session {}", reservation.starts_at());
            return Err(Error::validation(format!(
                "cannot reserve a past session ({})",
                reservation.starts_at().format("%Y-%m-%d %H:%M")
            )));
        }
        if self.reservations.exist_reservation_by_date_time_and_theme(
            request.date,
            request.time_id,
            request.theme_id,
        )? {
            warn!(
                "Rejected reservation for taken session {} (time {}, theme {})",
                request.date, request.time_id, request.theme_id
            );
            return Err(Error::duplicated(RESERVATION));
        }

        let saved = self.reservations.add_reservation(&reservation)?;
        info!(
            "Booked reservation {:?} for member {} on {}",
            saved.id, request.member_id, saved.starts_at()
        );
        Ok(saved)
    }

    /// Cancel the reservation with `id`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound("reservation")` if there is none.
    pub fn remove_reservation(&self, id: i64) -> Result<()> {
        self.reservations.remove_reservation_by_id(id)?;
        info!("Removed reservation {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::{
        InMemoryMemberDao, InMemoryReservationDao, InMemoryThemeDao, InMemoryTimeDao,
    };
    use crate::domain::{Member, ReservationTime, Theme};
    use chrono::NaiveTime;

    type Service = ReservationService<
        InMemoryReservationDao,
        InMemoryMemberDao,
        InMemoryTimeDao,
        InMemoryThemeDao,
    >;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, d).unwrap()
    }

    fn time(h: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, 0, 0).unwrap()
    }

    /// Noon on 2025-05-01.
    fn now() -> NaiveDateTime {
        date(1).and_time(time(12))
    }

    /// One member, slots at 10:00 and 14:00, one theme.
    fn service() -> Service {
        let reservations = InMemoryReservationDao::new();
        let members = InMemoryMemberDao::new();
        let times = InMemoryTimeDao::linked(&reservations);
        let themes = InMemoryThemeDao::linked(&reservations);

        members.add_member(&Member::new("brown", "brown@example.com", "pw")).unwrap();
        times.add_reservation_time(&ReservationTime::new(time(10))).unwrap();
        times.add_reservation_time(&ReservationTime::new(time(14))).unwrap();
        themes.add_theme(&Theme::new("Lost Temple", "ruins", "https://img/1.png")).unwrap();

        ReservationService::new(reservations, members, times, themes)
    }

    fn request(day: u32, time_id: i64) -> ReservationRequest {
        ReservationRequest {
            member_id: 1,
            date: date(day),
            time_id,
            theme_id: 1,
        }
    }

    #[test]
    fn test_add_reservation_composes_aggregate() {
        let service = service();

        let saved = service.add_reservation(request(2, 1), now()).unwrap();

        assert_eq!(saved.id, Some(1));
        assert_eq!(saved.member.name, "brown");
        assert_eq!(saved.time.start_at, time(10));
        assert_eq!(saved.theme.name, "Lost Temple");
        assert_eq!(service.find_all_reservations().unwrap(), vec![saved]);
    }

    #[test]
    fn test_add_reservation_later_today() {
        let service = service();
        assert!(service.add_reservation(request(1, 2), now()).is_ok());
    }

    #[test]
    fn test_add_reservation_in_the_past() {
        let service = service();

        let err = service.add_reservation(request(1, 1), now()).unwrap_err();

        assert!(matches!(err, Error::Validation { .. }));
        assert!(service.find_all_reservations().unwrap().is_empty());
    }

    #[test]
    fn test_add_duplicated_reservation() {
        let service = service();
        service.add_reservation(request(2, 1), now()).unwrap();

        let err = service.add_reservation(request(2, 1), now()).unwrap_err();

        assert!(err.is_duplicated());
        assert!(err.to_string().contains("reservation"));
    }

    #[test]
    fn test_add_reservation_with_missing_parts() {
        let service = service();

        let missing_member = ReservationRequest { member_id: 9, ..request(2, 1) };
        let missing_time = request(2, 9);
        let missing_theme = ReservationRequest { theme_id: 9, ..request(2, 1) };

        for (req, resource) in [
            (missing_member, "member"),
            (missing_time, "reservationTime"),
            (missing_theme, "theme"),
        ] {
            let err = service.add_reservation(req, now()).unwrap_err();
            assert!(err.is_not_found());
            assert!(err.to_string().starts_with(resource), "{err}");
        }
    }

    #[test]
    fn test_find_reservations_by_filters() {
        let service = service();
        service.add_reservation(request(2, 1), now()).unwrap();
        service.add_reservation(request(3, 1), now()).unwrap();
        service.add_reservation(request(5, 2), now()).unwrap();

        let filter = ReservationFilter {
            date_from: Some(date(3)),
            date_to: Some(date(5)),
            ..Default::default()
        };
        let found = service.find_reservations_by_filters(&filter).unwrap();
        assert_eq!(found.iter().map(|r| r.date).collect::<Vec<_>>(), vec![date(3), date(5)]);

        let everything = service
            .find_reservations_by_filters(&ReservationFilter::default())
            .unwrap();
        assert_eq!(everything.len(), 3);

        let other_member = ReservationFilter { member_id: Some(2), ..Default::default() };
        assert!(service.find_reservations_by_filters(&other_member).unwrap().is_empty());
    }

    #[test]
    fn test_find_reservations_with_inverted_range() {
        let service = service();
        let filter = ReservationFilter {
            date_from: Some(date(5)),
            date_to: Some(date(3)),
            ..Default::default()
        };

        let err = service.find_reservations_by_filters(&filter).unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
    }

    #[test]
    fn test_remove_reservation() {
        let service = service();
        service.add_reservation(request(2, 1), now()).unwrap();

        service.remove_reservation(1).unwrap();

        assert!(service.find_all_reservations().unwrap().is_empty());
        let err = service.remove_reservation(1).unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().contains("reservation"));
    }

    #[test]
    fn test_request_deserialize() {
        let request: ReservationRequest = serde_json::from_str(
            r#"{"memberId": 1, "date": "2025-05-02", "timeId": 2, "themeId": 3}"#,
        )
        .unwrap();
        assert_eq!(request.date, date(2));
        assert_eq!(request.time_id, 2);
    }
}
