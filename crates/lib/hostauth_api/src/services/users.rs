//! In-memory user directory with bcrypt password hashes.

use hostauth_core::models::auth::{Role, User};
use tracing::debug;

use crate::error::AppResult;

#[derive(Debug, Clone)]
struct UserRecord {
    user: User,
    password_hash: String,
}

/// Registered users, looked up by email or ID.
#[derive(Debug)]
pub struct UserDirectory {
    records: Vec<UserRecord>,
    cost: u32,
}

impl UserDirectory {
    /// Empty directory hashing passwords at `cost`.
    pub fn new(cost: u32) -> Self {
        Self {
            records: Vec::new(),
            cost,
        }
    }

    /// Directory seeded with the built-in accounts:
    /// `admin@test.com` (admin) and `user@test.com` (user), both with password `1234`.
    pub fn seeded(cost: u32) -> AppResult<Self> {
        let mut dir = Self::new(cost);
        dir.insert(
            User {
                id: "1".into(),
                name: "Admin".into(),
                email: "admin@test.com".into(),
                role: Role::Admin,
            },
            "1234",
        )?;
        dir.insert(
            User {
                id: "2".into(),
                name: "User".into(),
                email: "user@test.com".into(),
                role: Role::User,
            },
            "1234",
        )?;
        Ok(dir)
    }

    /// Add a user with a plaintext password. Replaces any record with the same email.
    pub fn insert(&mut self, user: User, password: &str) -> AppResult<()> {
        let password_hash = bcrypt::hash(password, self.cost)?;
        self.records.retain(|r| r.user.email != user.email);
        self.records.push(UserRecord {
            user,
            password_hash,
        });
        Ok(())
    }

    /// Check credentials. Returns the user on a match.
    pub fn authenticate(&self, email: &str, password: &str) -> AppResult<Option<User>> {
        let Some(record) = self.records.iter().find(|r| r.user.email == email) else {
            debug!(%email, "login for unknown email");
            return Ok(None);
        };
        if bcrypt::verify(password, &record.password_hash)? {
            Ok(Some(record.user.clone()))
        } else {
            Ok(None)
        }
    }

    pub fn find_by_id(&self, id: &str) -> Option<User> {
        self.records
            .iter()
            .find(|r| r.user.id == id)
            .map(|r| r.user.clone())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> UserDirectory {
        UserDirectory::seeded(4).unwrap()
    }

    #[test]
    fn seeded_accounts_authenticate() {
        let dir = directory();
        let admin = dir.authenticate("admin@test.com", "1234").unwrap().unwrap();
        assert_eq!(admin.id, "1");
        assert_eq!(admin.role, Role::Admin);
        let user = dir.authenticate("user@test.com", "1234").unwrap().unwrap();
        assert_eq!(user.role, Role::User);
    }

    #[test]
    fn wrong_password_or_email_fails() {
        let dir = directory();
        assert!(dir.authenticate("admin@test.com", "nope").unwrap().is_none());
        assert!(dir.authenticate("ghost@test.com", "1234").unwrap().is_none());
    }

    #[test]
    fn insert_replaces_same_email() {
        let mut dir = directory();
        dir.insert(
            User {
                id: "9".into(),
                name: "New Admin".into(),
                email: "admin@test.com".into(),
                role: Role::Editor,
            },
            "pw",
        )
        .unwrap();
        assert_eq!(dir.len(), 2);
        assert!(dir.find_by_id("1").is_none());
        assert_eq!(dir.find_by_id("9").unwrap().role, Role::Editor);
    }
}
