//! Authentication domain models.

use serde::{Deserialize, Serialize};

/// Role attached to a user record.
///
/// Unknown role strings deserialize as [`Role::Guest`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
    Editor,
    Viewer,
    #[default]
    #[serde(other)]
    Guest,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
            Role::Editor => "editor",
            Role::Viewer => "viewer",
            Role::Guest => "guest",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The user owning a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: Role,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// True when the user holds any of `roles`.
    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        roles.contains(&self.role)
    }
}

/// Token pair payload returned by login and refresh (`data` of the envelope).
///
/// The renewal credential never appears here; it travels as an HTTP-only cookie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub access_token: String,
    pub user: User,
}

/// Payload of the current-user endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPayload {
    pub user: User,
}

/// Login request body. Absent fields read as empty so the server can answer
/// with its own validation error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
    }

    #[test]
    fn unknown_role_falls_back_to_guest() {
        let role: Role = serde_json::from_str("\"superuser\"").unwrap();
        assert_eq!(role, Role::Guest);
    }

    #[test]
    fn auth_session_uses_camel_case() {
        let json = serde_json::json!({
            "accessToken": "abc",
            "user": { "id": "1", "name": "Admin", "email": "admin@test.com", "role": "admin" }
        });
        let session: AuthSession = serde_json::from_value(json).unwrap();
        assert_eq!(session.access_token, "abc");
        assert!(session.user.is_admin());
    }

    #[test]
    fn login_request_tolerates_missing_fields() {
        let req: LoginRequest =
            serde_json::from_value(serde_json::json!({ "email": "admin@test.com" })).unwrap();
        assert_eq!(req.email, "admin@test.com");
        assert!(req.password.is_empty());
    }

    #[test]
    fn missing_role_defaults_to_guest() {
        let json = serde_json::json!({ "id": "2", "name": "N", "email": "n@test.com" });
        let user: User = serde_json::from_value(json).unwrap();
        assert_eq!(user.role, Role::Guest);
        assert!(user.has_any_role(&[Role::Guest, Role::Viewer]));
    }
}
