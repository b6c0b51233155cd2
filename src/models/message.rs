// src/models/message.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'messages' table in the database.
/// Immutable once sent, except for `is_read` which only ever flips false -> true.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub sender_id: i64,
    pub receiver_id: i64,

    /// The listing this message is about, if any.
    pub listing_id: Option<i64>,

    pub message_text: String,
    pub is_read: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// DTO for sending a message.
#[derive(Debug, Deserialize, Validate)]
pub struct SendMessageRequest {
    pub receiver_id: i64,

    #[validate(length(
        min = 1,
        max = 2000,
        message = "Message must be between 1 and 2000 characters."
    ))]
    pub message_text: String,

    pub listing_id: Option<i64>,
}

/// Query parameters for listing messages.
#[derive(Debug, Deserialize)]
pub struct MessageListParams {
    /// Only return unread messages received by the current user.
    pub unread_only: Option<bool>,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

/// Inbox summary for one counterparty: last message plus unread count.
/// Derived on demand from the message table, never persisted.
#[derive(Debug, Serialize)]
pub struct ConversationSummary {
    pub other_user_id: i64,
    pub other_user_username: String,
    pub last_message: String,
    pub last_message_time: chrono::DateTime<chrono::Utc>,
    pub unread_count: i64,
}
