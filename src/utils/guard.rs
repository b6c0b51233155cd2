// src/utils/guard.rs

use crate::error::AppError;

// Authorization predicates shared by the handlers. Callers must confirm the
// target resource exists before invoking these, so probing a missing resource
// always reads as 404, never 403.

/// Listing mutations are restricted to the seller who owns the listing.
pub fn ensure_listing_owner(seller_id: i64, actor_id: i64) -> Result<(), AppError> {
    if seller_id != actor_id {
        return Err(AppError::Forbidden(
            "You can only modify your own listings".to_string(),
        ));
    }
    Ok(())
}

/// Viewing or deleting a message is restricted to its two parties.
pub fn ensure_message_party(
    sender_id: i64,
    receiver_id: i64,
    actor_id: i64,
) -> Result<(), AppError> {
    if actor_id != sender_id && actor_id != receiver_id {
        return Err(AppError::Forbidden(
            "You can only access your own messages".to_string(),
        ));
    }
    Ok(())
}

/// Only the receiver may mark a message as read.
pub fn ensure_message_receiver(receiver_id: i64, actor_id: i64) -> Result<(), AppError> {
    if actor_id != receiver_id {
        return Err(AppError::Forbidden(
            "Only the receiver can mark a message as read".to_string(),
        ));
    }
    Ok(())
}

/// Self-targeted requests (reviewing or messaging yourself) are malformed
/// input, not an authorization failure.
pub fn reject_self_target(actor_id: i64, target_id: i64, action: &str) -> Result<(), AppError> {
    if actor_id == target_id {
        return Err(AppError::BadRequest(format!("Cannot {} yourself", action)));
    }
    Ok(())
}
