// src/handlers/message.rs

use std::collections::HashMap;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::PgPool;
use validator::Validate;

use crate::{
    error::AppError,
    models::message::{ConversationSummary, Message, MessageListParams, SendMessageRequest},
    utils::{guard, jwt::Claims},
};

/// Fold a user's messages (newest first) into per-counterparty summaries.
///
/// The first message seen for a counterparty is the most recent one, so the
/// output order is last-message-time descending. Counterparties only exist
/// through their messages; an empty input produces an empty index.
fn build_conversation_summaries(user_id: i64, messages: &[Message]) -> Vec<ConversationSummary> {
    let mut order: Vec<i64> = Vec::new();
    let mut summaries: HashMap<i64, ConversationSummary> = HashMap::new();

    for msg in messages {
        let other = if msg.sender_id == user_id {
            msg.receiver_id
        } else {
            msg.sender_id
        };

        let entry = summaries.entry(other).or_insert_with(|| {
            order.push(other);
            ConversationSummary {
                other_user_id: other,
                other_user_username: String::new(),
                last_message: msg.message_text.clone(),
                last_message_time: msg.created_at,
                unread_count: 0,
            }
        });

        if msg.receiver_id == user_id && !msg.is_read {
            entry.unread_count += 1;
        }
    }

    order
        .into_iter()
        .filter_map(|id| summaries.remove(&id))
        .collect()
}

/// Send a direct message to another user, optionally about a listing.
pub async fn send_message(
    State(pool): State<PgPool>,
    claims: Claims,
    Json(payload): Json<SendMessageRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    if payload.message_text.trim().is_empty() {
        return Err(AppError::BadRequest("Message cannot be empty".to_string()));
    }

    let sender_id = claims.user_id();
    guard::reject_self_target(sender_id, payload.receiver_id, "message")?;

    let receiver_exists = sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE id = $1")
        .bind(payload.receiver_id)
        .fetch_optional(&pool)
        .await?;

    if receiver_exists.is_none() {
        return Err(AppError::NotFound("Receiver not found".to_string()));
    }

    if let Some(listing_id) = payload.listing_id {
        let listing_exists = sqlx::query_scalar::<_, i64>("SELECT id FROM listings WHERE id = $1")
            .bind(listing_id)
            .fetch_optional(&pool)
            .await?;

        if listing_exists.is_none() {
            return Err(AppError::NotFound("Listing not found".to_string()));
        }
    }

    let message = sqlx::query_as::<_, Message>(
        r#"
        INSERT INTO messages (sender_id, receiver_id, listing_id, message_text)
        VALUES ($1, $2, $3, $4)
        RETURNING id, sender_id, receiver_id, listing_id, message_text, is_read, created_at
        "#,
    )
    .bind(sender_id)
    .bind(payload.receiver_id)
    .bind(payload.listing_id)
    .bind(&payload.message_text)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to send message: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok((StatusCode::CREATED, Json(message)))
}

/// List the current user's messages (sent or received), newest first.
pub async fn list_messages(
    State(pool): State<PgPool>,
    claims: Claims,
    Query(params): Query<MessageListParams>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id();
    let skip = params.skip.unwrap_or(0).max(0);
    let limit = params.limit.unwrap_or(20).clamp(1, 100);
    let unread_only = params.unread_only.unwrap_or(false);

    let messages = sqlx::query_as::<_, Message>(
        r#"
        SELECT id, sender_id, receiver_id, listing_id, message_text, is_read, created_at
        FROM messages
        WHERE (sender_id = $1 OR receiver_id = $1)
          AND (NOT $2 OR (receiver_id = $1 AND is_read = FALSE))
        ORDER BY created_at DESC
        OFFSET $3 LIMIT $4
        "#,
    )
    .bind(user_id)
    .bind(unread_only)
    .bind(skip)
    .bind(limit)
    .fetch_all(&pool)
    .await?;

    Ok(Json(messages))
}

/// Fetch the full conversation with another user, oldest first.
///
/// Every unread message the current user received in this conversation flips
/// to read in the same transaction as the fetch, so a concurrent reader never
/// observes a partially-transitioned set. Refetching is a no-op.
pub async fn get_conversation(
    State(pool): State<PgPool>,
    claims: Claims,
    Path(other_user_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id();

    let other_exists = sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE id = $1")
        .bind(other_user_id)
        .fetch_optional(&pool)
        .await?;

    if other_exists.is_none() {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        UPDATE messages
        SET is_read = TRUE
        WHERE sender_id = $2 AND receiver_id = $1 AND is_read = FALSE
        "#,
    )
    .bind(user_id)
    .bind(other_user_id)
    .execute(&mut *tx)
    .await?;

    let messages = sqlx::query_as::<_, Message>(
        r#"
        SELECT id, sender_id, receiver_id, listing_id, message_text, is_read, created_at
        FROM messages
        WHERE (sender_id = $1 AND receiver_id = $2)
           OR (sender_id = $2 AND receiver_id = $1)
        ORDER BY created_at ASC
        "#,
    )
    .bind(user_id)
    .bind(other_user_id)
    .fetch_all(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(Json(messages))
}

/// Get a single message. Only its two parties may view it; fetching as the
/// receiver marks it read.
pub async fn get_message(
    State(pool): State<PgPool>,
    claims: Claims,
    Path(message_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let actor_id = claims.user_id();

    let mut message = sqlx::query_as::<_, Message>(
        r#"
        SELECT id, sender_id, receiver_id, listing_id, message_text, is_read, created_at
        FROM messages
        WHERE id = $1
        "#,
    )
    .bind(message_id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Message not found".to_string()))?;

    guard::ensure_message_party(message.sender_id, message.receiver_id, actor_id)?;

    if message.receiver_id == actor_id && !message.is_read {
        message = sqlx::query_as::<_, Message>(
            r#"
            UPDATE messages
            SET is_read = TRUE
            WHERE id = $1
            RETURNING id, sender_id, receiver_id, listing_id, message_text, is_read, created_at
            "#,
        )
        .bind(message_id)
        .fetch_one(&pool)
        .await?;
    }

    Ok(Json(message))
}

/// Mark a message as read. Receiver only; already-read messages are left as
/// they are.
pub async fn mark_read(
    State(pool): State<PgPool>,
    claims: Claims,
    Path(message_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let receiver_id = sqlx::query_scalar::<_, i64>("SELECT receiver_id FROM messages WHERE id = $1")
        .bind(message_id)
        .fetch_optional(&pool)
        .await?
        .ok_or(AppError::NotFound("Message not found".to_string()))?;

    guard::ensure_message_receiver(receiver_id, claims.user_id())?;

    let message = sqlx::query_as::<_, Message>(
        r#"
        UPDATE messages
        SET is_read = TRUE
        WHERE id = $1
        RETURNING id, sender_id, receiver_id, listing_id, message_text, is_read, created_at
        "#,
    )
    .bind(message_id)
    .fetch_one(&pool)
    .await?;

    Ok(Json(message))
}

/// Delete a message. Either party may delete it.
pub async fn delete_message(
    State(pool): State<PgPool>,
    claims: Claims,
    Path(message_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let message = sqlx::query_as::<_, Message>(
        r#"
        SELECT id, sender_id, receiver_id, listing_id, message_text, is_read, created_at
        FROM messages
        WHERE id = $1
        "#,
    )
    .bind(message_id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Message not found".to_string()))?;

    guard::ensure_message_party(message.sender_id, message.receiver_id, claims.user_id())?;

    sqlx::query("DELETE FROM messages WHERE id = $1")
        .bind(message_id)
        .execute(&pool)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Count of unread messages for the current user.
pub async fn unread_count(
    State(pool): State<PgPool>,
    claims: Claims,
) -> Result<impl IntoResponse, AppError> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM messages WHERE receiver_id = $1 AND is_read = FALSE",
    )
    .bind(claims.user_id())
    .fetch_one(&pool)
    .await?;

    Ok(Json(serde_json::json!({ "unread_count": count })))
}

/// Inbox view: one summary per counterparty, most recent conversation first.
/// Recomputed from the message table on every call.
pub async fn list_conversations(
    State(pool): State<PgPool>,
    claims: Claims,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id();

    let messages = sqlx::query_as::<_, Message>(
        r#"
        SELECT id, sender_id, receiver_id, listing_id, message_text, is_read, created_at
        FROM messages
        WHERE sender_id = $1 OR receiver_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(&pool)
    .await?;

    let mut summaries = build_conversation_summaries(user_id, &messages);

    let other_ids: Vec<i64> = summaries.iter().map(|s| s.other_user_id).collect();

    let usernames: HashMap<i64, String> = sqlx::query_as::<_, (i64, String)>(
        "SELECT id, username FROM users WHERE id = ANY($1)",
    )
    .bind(&other_ids)
    .fetch_all(&pool)
    .await?
    .into_iter()
    .collect();

    for summary in &mut summaries {
        if let Some(name) = usernames.get(&summary.other_user_id) {
            summary.other_user_username = name.clone();
        }
    }

    Ok(Json(summaries))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn msg(
        id: i64,
        sender_id: i64,
        receiver_id: i64,
        is_read: bool,
        minutes: i64,
    ) -> Message {
        Message {
            id,
            sender_id,
            receiver_id,
            listing_id: None,
            message_text: format!("message {}", id),
            is_read,
            created_at: Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
                + Duration::minutes(minutes),
        }
    }

    #[test]
    fn test_empty_inbox_has_no_conversations() {
        assert!(build_conversation_summaries(1, &[]).is_empty());
    }

    #[test]
    fn test_counts_unread_from_counterparty_only() {
        // Newest first, as the query returns them.
        let messages = vec![
            msg(3, 2, 1, false, 3), // unread, received by 1
            msg(2, 1, 2, false, 2), // sent by 1; unread on 2's side, not ours
            msg(1, 2, 1, true, 1),  // already read
        ];

        let summaries = build_conversation_summaries(1, &messages);
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].other_user_id, 2);
        assert_eq!(summaries[0].unread_count, 1);
        assert_eq!(summaries[0].last_message, "message 3");
    }

    #[test]
    fn test_ordered_by_most_recent_conversation() {
        let messages = vec![
            msg(4, 3, 1, false, 40),
            msg(3, 1, 2, false, 30),
            msg(2, 3, 1, false, 20),
            msg(1, 2, 1, false, 10),
        ];

        let summaries = build_conversation_summaries(1, &messages);
        let order: Vec<i64> = summaries.iter().map(|s| s.other_user_id).collect();
        assert_eq!(order, vec![3, 2]);
        assert_eq!(summaries[0].unread_count, 2);
        assert_eq!(summaries[1].unread_count, 1);
        assert_eq!(summaries[0].last_message, "message 4");
        assert_eq!(summaries[1].last_message, "message 3");
    }
}
