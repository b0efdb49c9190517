use rusqlite::{params, OptionalExtension, Row};
use tracing::{debug, warn};

use crate::dao::{MemberDao, MEMBER};
use crate::domain::{Member, Role};
use crate::error::{Error, Result};
use crate::storage::Database;

use super::constraint_error;

const SELECT_MEMBER: &str = "SELECT id, name, email, password, role FROM member";

/// [`MemberDao`] backed by the `member` table.
#[derive(Debug, Clone)]
pub struct SqliteMemberDao {
    db: Database,
}

impl SqliteMemberDao {
    /// Create a DAO over `db`.
    #[must_use]
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Convert a row starting at `offset` into a [`Member`].
    ///
    /// Expects `id, name, email, password, role` in that order.
    pub(crate) fn row_to_member(row: &Row<'_>, offset: usize) -> rusqlite::Result<Member> {
        let role_str: String = row.get(offset + 4)?;
        let role = role_str.parse().unwrap_or_else(|_| {
            warn!("Unknown member role: {}, defaulting to USER", role_str);
            Role::User
        });

        Ok(Member {
            id: Some(row.get(offset)?),
            name: row.get(offset + 1)?,
            email: row.get(offset + 2)?,
            password: row.get(offset + 3)?,
            role,
        })
    }
}

impl MemberDao for SqliteMemberDao {
    fn find_all_members(&self) -> Result<Vec<Member>> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!("{SELECT_MEMBER} ORDER BY id"))?;
            let members = stmt
                .query_map([], |row| Self::row_to_member(row, 0))?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(members)
        })
    }

    fn find_member_by_id(&self, id: i64) -> Result<Member> {
        self.db.with_conn(|conn| {
            conn.query_row(&format!("{SELECT_MEMBER} WHERE id = ?1"), [id], |row| {
                Self::row_to_member(row, 0)
            })
            .optional()?
            .ok_or_else(|| Error::not_found(MEMBER, id))
        })
    }

    fn find_member_by_email(&self, email: &str) -> Result<Option<Member>> {
        self.db.with_conn(|conn| {
            let member = conn
                .query_row(&format!("{SELECT_MEMBER} WHERE email = ?1"), [email], |row| {
                    Self::row_to_member(row, 0)
                })
                .optional()?;
            Ok(member)
        })
    }

    fn exist_member_by_email(&self, email: &str) -> Result<bool> {
        self.db.with_conn(|conn| {
            let exists: bool = conn.query_row(
                "SELECT EXISTS (SELECT 1 FROM member WHERE email = ?1)",
                [email],
                |row| row.get(0),
            )?;
            Ok(exists)
        })
    }

    fn add_member(&self, member: &Member) -> Result<Member> {
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO member (name, email, password, role) VALUES (?1, ?2, ?3, ?4)",
                params![
                    member.name,
                    member.email,
                    member.password,
                    member.role.to_string()
                ],
            )
            .map_err(|e| constraint_error(e, MEMBER, None))?;

            let id = conn.last_insert_rowid();
            debug!("Inserted member with id {}", id);
            Ok(member.clone().with_id(id))
        })
    }
}
