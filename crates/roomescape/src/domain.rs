//! Core domain types for roomescape.
//!
//! A [`Reservation`] is an aggregate: it owns full copies of the [`Member`]
//! who booked, the [`ReservationTime`] slot and the [`Theme`] being played.
//! Records carry `id: None` until the storage layer assigns one.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize, Serializer};

use crate::error::{Error, Result};

/// Access level of a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Manages themes and time slots.
    Admin,
    /// Books reservations.
    #[default]
    User,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Admin => write!(f, "ADMIN"),
            Self::User => write!(f, "USER"),
        }
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ADMIN" => Ok(Self::Admin),
            "USER" => Ok(Self::User),
            other => Err(Error::validation(format!("unknown role: {other}"))),
        }
    }
}

/// A registered member.
///
/// The password never leaves the process through serialization; use
/// [`MemberView`] for anything shown to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Member {
    /// Identifier assigned by storage.
    pub id: Option<i64>,
    /// Display name.
    pub name: String,
    /// Login email, unique across members.
    pub email: String,
    /// Stored credential.
    #[serde(skip_serializing)]
    pub password: String,
    /// Access level.
    pub role: Role,
}

impl Member {
    /// Create an unsaved member with the `User` role.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            email: email.into(),
            password: password.into(),
            role: Role::User,
        }
    }

    /// Return a copy with the given role.
    #[must_use]
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    /// Return a saved copy carrying `id`.
    #[must_use]
    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    /// Check if the member has administrator rights.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Client-facing projection of a [`Member`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberView {
    /// Identifier.
    pub id: Option<i64>,
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: String,
}

impl From<&Member> for MemberView {
    fn from(member: &Member) -> Self {
        Self {
            id: member.id,
            name: member.name.clone(),
            email: member.email.clone(),
        }
    }
}

/// A bookable start time, shared by every theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationTime {
    /// Identifier assigned by storage.
    pub id: Option<i64>,
    /// Wall-clock start of the session.
    #[serde(with = "hh_mm")]
    pub start_at: NaiveTime,
}

impl ReservationTime {
    /// Create an unsaved time slot. Slots start on the minute, so seconds
    /// are dropped.
    #[must_use]
    pub fn new(start_at: NaiveTime) -> Self {
        Self {
            id: None,
            start_at: truncate_to_minute(start_at),
        }
    }

    /// Return a saved copy carrying `id`.
    #[must_use]
    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }
}

/// An escape-room theme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    /// Identifier assigned by storage.
    pub id: Option<i64>,
    /// Unique theme name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Thumbnail image URL.
    pub thumbnail: String,
}

impl Theme {
    /// Create an unsaved theme.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        thumbnail: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            description: description.into(),
            thumbnail: thumbnail.into(),
        }
    }

    /// Return a saved copy carrying `id`.
    #[must_use]
    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }
}

/// A booked session: who plays which theme, on which date, at which time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reservation {
    /// Identifier assigned by storage.
    pub id: Option<i64>,
    /// The member who booked.
    #[serde(serialize_with = "serialize_member_view")]
    pub member: Member,
    /// Session date.
    pub date: NaiveDate,
    /// Session start slot.
    pub time: ReservationTime,
    /// Theme being played.
    pub theme: Theme,
}

impl Reservation {
    /// Create an unsaved reservation.
    #[must_use]
    pub fn new(member: Member, date: NaiveDate, time: ReservationTime, theme: Theme) -> Self {
        Self {
            id: None,
            member,
            date,
            time,
            theme,
        }
    }

    /// Return a saved copy carrying `id`.
    #[must_use]
    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    /// The moment the session starts.
    #[must_use]
    pub fn starts_at(&self) -> NaiveDateTime {
        self.date.and_time(self.time.start_at)
    }

    /// Check if the session starts before `now`.
    #[must_use]
    pub fn is_before(&self, now: NaiveDateTime) -> bool {
        self.starts_at() < now
    }
}

fn serialize_member_view<S: Serializer>(
    member: &Member,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    MemberView::from(member).serialize(serializer)
}

/// A time slot annotated with whether it is taken for a given date and theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableTime {
    /// The slot.
    #[serde(flatten)]
    pub time: ReservationTime,
    /// Whether a reservation already holds it.
    pub already_booked: bool,
}

/// Optional constraints for reservation queries. Absent fields match everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationFilter {
    /// Only reservations of this theme.
    pub theme_id: Option<i64>,
    /// Only reservations made by this member.
    pub member_id: Option<i64>,
    /// Earliest date, inclusive.
    pub date_from: Option<NaiveDate>,
    /// Latest date, inclusive.
    pub date_to: Option<NaiveDate>,
}

impl ReservationFilter {
    /// Check if the filter constrains nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Check if a reservation satisfies every present constraint.
    #[must_use]
    pub fn matches(&self, reservation: &Reservation) -> bool {
        self.theme_id.is_none_or(|id| reservation.theme.id == Some(id))
            && self.member_id.is_none_or(|id| reservation.member.id == Some(id))
            && self.date_from.is_none_or(|from| reservation.date >= from)
            && self.date_to.is_none_or(|to| reservation.date <= to)
    }
}

/// Parse a wall-clock time written as `HH:MM` or `HH:MM:SS`.
///
/// Seconds are accepted but dropped, matching what storage keeps.
///
/// # Errors
///
/// Returns a validation error if the text is neither form.
pub fn parse_time(text: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(text, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(text, "%H:%M:%S"))
        .map(truncate_to_minute)
        .map_err(|_| Error::validation(format!("invalid time '{text}', expected HH:MM")))
}

/// Drop the seconds and sub-second part of `time`.
#[must_use]
pub fn truncate_to_minute(time: NaiveTime) -> NaiveTime {
    NaiveTime::from_hms_opt(time.hour(), time.minute(), 0).unwrap_or(time)
}

/// Parse a calendar date written as `yyyy-MM-dd`.
///
/// # Errors
///
/// Returns a validation error if the text is not a valid date.
pub fn parse_date(text: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .map_err(|_| Error::validation(format!("invalid date '{text}', expected yyyy-MM-dd")))
}

/// Serde adapter writing times as `HH:MM`.
pub mod hh_mm {
    use chrono::NaiveTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    /// Serialize as `HH:MM`.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&time.format(super::TIME_FORMAT))
    }

    /// Deserialize from `HH:MM` or `HH:MM:SS`.
    ///
    /// # Errors
    ///
    /// Fails on any other shape.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let text = String::deserialize(deserializer)?;
        super::parse_time(&text).map_err(de::Error::custom)
    }
}

/// Storage and wire format of a time slot.
pub const TIME_FORMAT: &str = "%H:%M";
