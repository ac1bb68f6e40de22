use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

/// The signed-in user's identity, as returned by `/users/me` and cached in
/// the session store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_superuser: bool,
}

/// Registration payload for `/auth/register`.
#[derive(Debug, Clone, Serialize)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}

/// Partial update payload for `/users/{id}`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

/// Successful response from the token login endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub user_id: i64,
    pub email: String,
    #[serde(default)]
    pub is_superuser: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_login_response() {
        let json = r#"{
            "access_token": "eyJhbGciOiJIUzI1NiJ9.abc.def",
            "token_type": "bearer",
            "user_id": 3,
            "email": "ceo@example.com",
            "is_superuser": true
        }"#;
        let login: LoginResponse = serde_json::from_str(json).expect("login response");
        assert_eq!(login.token_type, "bearer");
        assert_eq!(login.user_id, 3);
        assert!(login.is_superuser);
    }

    #[test]
    fn test_profile_defaults() {
        // Minimal payload: flags default, name optional
        let json = r#"{"id": 1, "email": "a@b.c"}"#;
        let profile: UserProfile = serde_json::from_str(json).expect("profile");
        assert!(profile.is_active);
        assert!(!profile.is_superuser);
        assert!(profile.full_name.is_none());
    }

    #[test]
    fn test_user_update_skips_absent_fields() {
        let update = UserUpdate {
            full_name: Some("New Name".to_string()),
            ..UserUpdate::default()
        };
        let json = serde_json::to_string(&update).expect("serialize");
        assert_eq!(json, r#"{"full_name":"New Name"}"#);
    }
}
