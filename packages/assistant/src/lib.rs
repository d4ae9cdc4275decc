#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Turns the map assistant's chat replies into filter state.
//!
//! The assistant answers in prose with a fenced JSON block carrying a
//! `filters` object and a `message`. Nothing in that block is trusted:
//! weights are renormalized, ethnicity terms are resolved against the
//! taxonomy, ranges are reordered or dropped, and unknown values are
//! discarded with a warning. When no usable payload can be found the
//! caller gets [`FALLBACK_MESSAGE`] instead of an error.

pub mod reply;
pub mod sanitize;

pub use reply::{AssistantOutcome, AssistantReply, RawFilters, parse_reply, reply_or_fallback};
pub use sanitize::{SanitizedFilters, TimePeriod, sanitize};

use thiserror::Error;

/// Message shown to the user when a reply cannot be understood.
pub const FALLBACK_MESSAGE: &str =
    "Sorry, I couldn't work out which filters to apply. Could you rephrase that?";

/// Errors that can occur while reading an assistant reply.
#[derive(Debug, Error)]
pub enum AssistantError {
    /// The reply contained no JSON block.
    #[error("No JSON payload found in assistant reply")]
    NoPayload,

    /// The JSON block could not be deserialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
