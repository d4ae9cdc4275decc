//! Extraction of the JSON payload from an assistant reply.

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use crate::sanitize::{SanitizedFilters, sanitize};
use crate::{AssistantError, FALLBACK_MESSAGE};

/// First fenced code block, with or without a `json` tag.
static FENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?:json|JSON)?[ \t]*\r?\n?(.*?)```").expect("valid regex")
});

/// The `filters` object exactly as the assistant wrote it.
///
/// Every field is kept as raw JSON so that one malformed field does not
/// reject the whole reply; [`sanitize`] validates each one separately.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawFilters {
    /// `[{id, weight}]` in percentages.
    pub weights: Option<serde_json::Value>,
    /// Free-form ethnicity terms.
    pub selected_ethnicities: Option<serde_json::Value>,
    /// `[min, max]` in years.
    pub age_range: Option<serde_json::Value>,
    /// `[min, max]` in dollars per year.
    pub income_range: Option<serde_json::Value>,
    /// `[min, max]` in dollars per month.
    pub rent_range: Option<serde_json::Value>,
    /// Gender names.
    pub selected_genders: Option<serde_json::Value>,
    /// Times of day for foot traffic.
    pub selected_time_periods: Option<serde_json::Value>,
}

/// A parsed assistant reply.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AssistantReply {
    /// Proposed filter changes.
    pub filters: RawFilters,
    /// Text to show the user.
    pub message: String,
}

/// What the caller shows and applies after an assistant turn.
#[derive(Debug, Clone, PartialEq)]
pub struct AssistantOutcome {
    /// Text to show the user.
    pub message: String,
    /// Filters to apply, or `None` if the reply was unusable.
    pub filters: Option<SanitizedFilters>,
}

/// Finds the JSON payload in `text` and parses it.
///
/// The first fenced block is used when present. Otherwise the whole text
/// is parsed if it looks like a JSON object.
///
/// # Errors
///
/// * [`AssistantError::NoPayload`] if there is no fenced block and the
///   text is not a JSON object, or the block is empty
/// * [`AssistantError::Json`] if the payload is not a valid reply object
pub fn parse_reply(text: &str) -> Result<AssistantReply, AssistantError> {
    let payload = match FENCE_RE.captures(text).and_then(|c| c.get(1)) {
        Some(block) => block.as_str().trim(),
        None => {
            let trimmed = text.trim();
            if !trimmed.starts_with('{') {
                return Err(AssistantError::NoPayload);
            }
            trimmed
        }
    };

    if payload.is_empty() {
        return Err(AssistantError::NoPayload);
    }

    Ok(serde_json::from_str(payload)?)
}

/// Parses and sanitizes a reply, substituting [`FALLBACK_MESSAGE`] when
/// it cannot be read.
///
/// A reply with filters but an empty message keeps the empty message.
#[must_use]
pub fn reply_or_fallback(text: &str) -> AssistantOutcome {
    match parse_reply(text) {
        Ok(reply) => AssistantOutcome {
            filters: Some(sanitize(&reply.filters)),
            message: reply.message,
        },
        Err(e) => {
            log::warn!("Unusable assistant reply: {e}");
            AssistantOutcome {
                message: FALLBACK_MESSAGE.to_string(),
                filters: None,
            }
        }
    }
}
