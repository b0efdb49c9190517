//! Business rules on top of the data-access traits.
//!
//! Services are generic over the DAO traits so the same rules run against
//! `SQLite` in production and against the in-memory fakes in tests. Each
//! service checks its preconditions before touching storage and reports
//! violations as domain errors (`NotFound`, `Duplicated`, `InUse`,
//! `Validation`).

pub mod member;
pub mod reservation;
pub mod theme;
pub mod time;

pub use member::{MemberRequest, MemberService};
pub use reservation::{ReservationRequest, ReservationService};
pub use theme::{ThemeRequest, ThemeService};
pub use time::{TimeRequest, TimeService};

use crate::error::{Error, Result};

/// Reject a value that is empty after trimming.
fn require_text(value: &str, field: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::validation(format!("{field} must not be blank")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_text() {
        assert!(require_text("Lost Temple", "name").is_ok());

        let err = require_text(" \t", "name").unwrap_err();
        assert_eq!(err.to_string(), "invalid input: name must not be blank");
    }
}
