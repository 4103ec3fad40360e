//! Conversations and messages between two students.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::MAX_MESSAGE_LENGTH;
use crate::errors::{AppError, AppResult};

static HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());

/// A private channel between two users.
///
/// The pair is stored normalized (`participant_lo < participant_hi` by
/// uuid ordering) so a unique index can guarantee at most one
/// conversation per unordered pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: Uuid,
    pub participant_lo: Uuid,
    pub participant_hi: Uuid,
    /// The request whose acceptance spawned this conversation, if any.
    pub request_id: Option<Uuid>,
    /// Bumped on every new message so lists sort by recency.
    pub updated_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Conversation {
    pub fn includes(&self, user_id: Uuid) -> bool {
        self.participant_lo == user_id || self.participant_hi == user_id
    }

    /// The other participant, from `user_id`'s perspective.
    pub fn partner_of(&self, user_id: Uuid) -> Option<Uuid> {
        if self.participant_lo == user_id {
            Some(self.participant_hi)
        } else if self.participant_hi == user_id {
            Some(self.participant_lo)
        } else {
            None
        }
    }
}

/// Order a participant pair into its canonical (lo, hi) form.
pub fn normalize_pair(a: Uuid, b: Uuid) -> (Uuid, Uuid) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Message domain entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub sender_id: Uuid,
    pub content: String,
    /// Set once the recipient has opened the conversation.
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

/// Sanitize raw message content before it reaches storage.
///
/// Markup is stripped rather than escaped, the result is trimmed, and
/// the outcome must be non-empty. Length is capped on the raw input so
/// oversized payloads are rejected before any processing. The cap
/// counts characters, not bytes; accented text must not hit it early.
pub fn sanitize_message(raw: &str) -> AppResult<String> {
    if raw.chars().count() > MAX_MESSAGE_LENGTH {
        return Err(AppError::validation(format!(
            "Message content exceeds {} characters",
            MAX_MESSAGE_LENGTH
        )));
    }
    let cleaned = HTML_TAG.replace_all(raw, "").trim().to_string();
    if cleaned.is_empty() {
        return Err(AppError::validation("Message content is empty"));
    }
    Ok(cleaned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_normalization_is_order_independent() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_eq!(normalize_pair(a, b), normalize_pair(b, a));
        let (lo, hi) = normalize_pair(a, b);
        assert!(lo <= hi);
    }

    #[test]
    fn partner_is_resolved_from_either_side() {
        let (lo, hi) = normalize_pair(Uuid::new_v4(), Uuid::new_v4());
        let conversation = Conversation {
            id: Uuid::new_v4(),
            participant_lo: lo,
            participant_hi: hi,
            request_id: None,
            updated_at: Utc::now(),
            created_at: Utc::now(),
        };
        assert_eq!(conversation.partner_of(lo), Some(hi));
        assert_eq!(conversation.partner_of(hi), Some(lo));
        assert_eq!(conversation.partner_of(Uuid::new_v4()), None);
    }

    #[test]
    fn sanitize_strips_markup_and_trims() {
        let cleaned = sanitize_message("  <b>Salut</b>, tu es dispo ?  ").unwrap();
        assert_eq!(cleaned, "Salut, tu es dispo ?");
    }

    #[test]
    fn sanitize_rejects_empty_results() {
        assert!(sanitize_message("").is_err());
        assert!(sanitize_message("   ").is_err());
        assert!(sanitize_message("<img src=x>").is_err());
    }

    #[test]
    fn sanitize_caps_raw_length() {
        let oversized = "a".repeat(MAX_MESSAGE_LENGTH + 1);
        assert!(sanitize_message(&oversized).is_err());
        let max = "a".repeat(MAX_MESSAGE_LENGTH);
        assert!(sanitize_message(&max).is_ok());
    }

    #[test]
    fn length_cap_counts_characters_not_bytes() {
        // 1500 accented characters is 3000 bytes of UTF-8; still under
        // the 2000-character cap
        let accented = "é".repeat(1500);
        assert!(sanitize_message(&accented).is_ok());

        let at_cap = "é".repeat(MAX_MESSAGE_LENGTH);
        assert!(sanitize_message(&at_cap).is_ok());
        let over_cap = "é".repeat(MAX_MESSAGE_LENGTH + 1);
        assert!(sanitize_message(&over_cap).is_err());
    }
}
