#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Weight normalization, demographic filtering, and composite resilience
//! scoring.
//!
//! The pieces run in this order for a scoring request:
//!
//! 1. [`weights`] turns an untrusted weight proposal into a canonical
//!    [`WeightSet`](resilience_map_scoring_models::WeightSet).
//! 2. [`ethnicity`] expands free-form ethnicity terms into dataset values.
//! 3. [`filters`] computes per-tract match fractions and applies the rent
//!    filter.
//! 4. [`score`] combines the six component scores into one composite.
//!
//! [`pipeline::score_zones`] chains them the way the scoring endpoint
//! does. Every function here is pure and never fails: malformed or
//! degenerate input falls back to documented defaults.

pub mod ethnicity;
pub mod filters;
pub mod pipeline;
pub mod registry;
pub mod score;
pub mod weights;
