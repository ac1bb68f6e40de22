use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(default)]
    pub uploaded_by: Option<i64>,
    pub content_type: String,
    /// Ingestion pipeline state: pending, processing, completed, failed.
    pub processing_status: String,
    #[serde(default)]
    pub processing_error: Option<String>,
    pub created_at: NaiveDateTime,
    #[serde(default)]
    pub updated_at: Option<NaiveDateTime>,
}

/// Acknowledgement returned by the upload endpoint before processing
/// finishes.
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentReceipt {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub content_type: String,
    pub processing_status: String,
    pub created_at: NaiveDateTime,
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DocumentSearchResult {
    pub document_id: i64,
    pub document_title: String,
    pub text: String,
    pub score: f64,
    #[serde(default)]
    pub page_number: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DocumentSearchResponse {
    pub query: String,
    pub results: Vec<DocumentSearchResult>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_document() {
        let json = r#"{
            "id": 42,
            "title": "Board deck",
            "description": null,
            "file_path": "uploads/board-deck.pdf",
            "uploaded_by": 3,
            "content_type": "application/pdf",
            "processing_status": "completed",
            "created_at": "2026-08-05T18:30:00",
            "updated_at": "2026-08-05T18:31:12"
        }"#;
        let document: Document = serde_json::from_str(json).expect("document");
        assert_eq!(document.id, 42);
        assert_eq!(document.processing_status, "completed");
        assert!(document.processing_error.is_none());
    }

    #[test]
    fn test_parse_search_response() {
        let json = r#"{
            "query": "revenue targets",
            "results": [
                {
                    "document_id": 42,
                    "document_title": "Board deck",
                    "text": "Revenue targets for Q3...",
                    "score": 0.87,
                    "page_number": 4
                }
            ]
        }"#;
        let response: DocumentSearchResponse = serde_json::from_str(json).expect("search");
        assert_eq!(response.results.len(), 1);
        assert_eq!(response.results[0].page_number, Some(4));
        assert!(response.results[0].score > 0.8);
    }
}
