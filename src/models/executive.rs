use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A configured AI executive persona (CEO, CTO, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Executive {
    pub id: i64,
    pub name: String,
    pub role: String,
    #[serde(default)]
    pub description: Option<String>,
    pub prompt_template: String,
    pub is_active: bool,
    #[serde(default)]
    pub created_by: Option<i64>,
    pub created_at: NaiveDateTime,
    #[serde(default)]
    pub updated_at: Option<NaiveDateTime>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_executive() {
        let json = r#"{
            "id": 1,
            "name": "Alex",
            "role": "CEO",
            "description": "Chief executive persona",
            "prompt_template": "You are the CEO of...",
            "is_active": true,
            "created_at": "2026-07-01T12:00:00"
        }"#;
        let executive: Executive = serde_json::from_str(json).expect("executive");
        assert_eq!(executive.role, "CEO");
        assert!(executive.is_active);
        assert!(executive.created_by.is_none());
    }
}
