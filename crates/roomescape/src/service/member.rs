//! Member registration.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::dao::{MemberDao, MEMBER};
use crate::domain::Member;
use crate::error::{Error, Result};

use super::require_text;

/// One `@`, no whitespace, and a dot somewhere in the domain.
const EMAIL_PATTERN: &str = r"^[^@\s]+@[^@\s]+\.[^@\s]+$";

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(EMAIL_PATTERN).expect("email pattern is valid"));

/// Input for signing up a member.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberRequest {
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: String,
    /// Credential.
    pub password: String,
}

impl std::fmt::Debug for MemberRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemberRequest")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl MemberRequest {
    /// Create a request.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            password: password.into(),
        }
    }
}

/// Registers and looks up members.
#[derive(Debug, Clone)]
pub struct MemberService<D> {
    members: D,
}

impl<D: MemberDao> MemberService<D> {
    /// Create a service over the given store.
    #[must_use]
    pub fn new(members: D) -> Self {
        Self { members }
    }

    /// All members.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn find_all_members(&self) -> Result<Vec<Member>> {
        self.members.find_all_members()
    }

    /// The member with `id`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound("member")` if there is none.
    pub fn find_member(&self, id: i64) -> Result<Member> {
        self.members.find_member_by_id(id)
    }

    /// Sign up a member with the `User` role.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank name or password or a
    /// malformed email, and `Duplicated("member")` if the email is taken.
    pub fn add_member(&self, request: MemberRequest) -> Result<Member> {
        require_text(&request.name, "name")?;
        require_text(&request.password, "password")?;
        let email = request.email.trim();
        if !EMAIL.is_match(email) {
            return Err(Error::validation(format!("invalid email '{email}'")));
        }
        if self.members.exist_member_by_email(email)? {
            warn!("Rejected signup for an email already registered");
            return Err(Error::duplicated(MEMBER));
        }

        let saved = self.members.add_member(&Member::new(
            request.name.trim(),
            email,
            request.password,
        ))?;
        info!("Registered member {:?}", saved.id);
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::InMemoryMemberDao;
    use crate::domain::Role;

    fn service() -> MemberService<InMemoryMemberDao> {
        MemberService::new(InMemoryMemberDao::new())
    }

    #[test]
    fn test_add_member() {
        let service = service();

        let member = service
            .add_member(MemberRequest::new("brown", "brown@example.com", "pw"))
            .unwrap();

        assert_eq!(member.id, Some(1));
        assert_eq!(member.role, Role::User);
        assert_eq!(service.find_member(1).unwrap(), member);
    }

    #[test]
    fn test_add_member_with_taken_email() {
        let service = service();
        service
            .add_member(MemberRequest::new("brown", "brown@example.com", "pw"))
            .unwrap();

        let err = service
            .add_member(MemberRequest::new("other", " brown@example.com ", "pw2"))
            .unwrap_err();

        assert!(err.is_duplicated());
        assert!(err.to_string().contains("member"));
    }

    #[test]
    fn test_add_member_rejects_bad_input() {
        let service = service();

        for request in [
            MemberRequest::new(" ", "a@example.com", "pw"),
            MemberRequest::new("a", "a@example.com", ""),
            MemberRequest::new("a", "not-an-email", "pw"),
            MemberRequest::new("a", "a@b", "pw"),
            MemberRequest::new("a", "a b@example.com", "pw"),
        ] {
            let err = service.add_member(request).unwrap_err();
            assert!(matches!(err, Error::Validation { .. }), "{err}");
        }
        assert!(service.find_all_members().unwrap().is_empty());
    }

    #[test]
    fn test_find_missing_member() {
        let err = service().find_member(7).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_request_debug_hides_password() {
        let request = MemberRequest::new("a", "a@example.com", "hunter2");
        let debug = format!("{request:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("a@example.com"));
    }
}
