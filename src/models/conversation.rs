use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SenderType {
    User,
    AiCeo,
    System,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub conversation_id: i64,
    pub content: String,
    pub sender_type: SenderType,
    #[serde(default)]
    pub sender_id: Option<i64>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: i64,
    pub user_id: i64,
    #[serde(default)]
    pub title: Option<String>,
    pub created_at: NaiveDateTime,
    #[serde(default)]
    pub updated_at: Option<NaiveDateTime>,
    /// Full message history; list endpoints may omit it.
    #[serde(default)]
    pub messages: Vec<Message>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_conversation_with_messages() {
        let json = r#"{
            "id": 12,
            "user_id": 3,
            "title": "Q3 planning",
            "created_at": "2026-08-06T09:15:00",
            "messages": [
                {
                    "id": 100,
                    "conversation_id": 12,
                    "content": "Summarize the quarterly report",
                    "sender_type": "user",
                    "sender_id": 3,
                    "created_at": "2026-08-06T09:15:05"
                },
                {
                    "id": 101,
                    "conversation_id": 12,
                    "content": "Here is the summary...",
                    "sender_type": "ai_ceo",
                    "created_at": "2026-08-06T09:15:09.482133"
                }
            ]
        }"#;

        let conversation: Conversation = serde_json::from_str(json).expect("conversation");
        assert_eq!(conversation.messages.len(), 2);
        assert_eq!(conversation.messages[0].sender_type, SenderType::User);
        assert_eq!(conversation.messages[1].sender_type, SenderType::AiCeo);
        assert!(conversation.messages[1].sender_id.is_none());
        assert!(conversation.updated_at.is_none());
    }

    #[test]
    fn test_parse_list_entry_without_messages() {
        let json = r#"{"id": 1, "user_id": 3, "created_at": "2026-08-01T00:00:00"}"#;
        let conversation: Conversation = serde_json::from_str(json).expect("conversation");
        assert!(conversation.title.is_none());
        assert!(conversation.messages.is_empty());
    }
}
