//! Wire types for the AI Executive Team API.
//!
//! Every endpoint has an explicit response schema; payloads are validated
//! at the client boundary instead of being shape-checked ad hoc by each
//! caller. Server timestamps are naive UTC (`NaiveDateTime`), matching the
//! backend's serialization.

pub mod conversation;
pub mod document;
pub mod executive;
pub mod user;

pub use conversation::{Conversation, Message, SenderType};
pub use document::{Document, DocumentReceipt, DocumentSearchResponse, DocumentSearchResult};
pub use executive::Executive;
pub use user::{LoginResponse, NewUser, UserProfile, UserUpdate};
