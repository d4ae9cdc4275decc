#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Weight, filter, and census tract types for resilience scoring.
//!
//! Defines the closed set of scoring factors, the percentage and fraction
//! forms of a weight set, census tract identifiers and rows, and the
//! request/response types the scoring endpoint exchanges with the map
//! frontend. All types here are plain data; the normalization and scoring
//! logic lives in `resilience_map_scoring`.

pub mod census;
pub mod ethnicity;
pub mod factor;
pub mod filter;
pub mod geoid;
pub mod range;
pub mod weights;
pub mod zone;

pub use census::{AgeRow, CensusTables, DemographicRow, GenderRow, IncomeRow, canonical_gender};
pub use ethnicity::EthnicityEntry;
pub use factor::Factor;
pub use filter::{FilterSpec, ScoreDebug, ScoreRequest, ScoreResponse};
pub use geoid::Geoid;
pub use range::ValueRange;
pub use weights::{
    DemographicWeights, Normalized, WeightEntry, WeightFractions, WeightProposal, WeightSet,
    WeightSource,
};
pub use zone::{ComponentScores, ZoneRecord};

use thiserror::Error;

/// Errors produced when untrusted input cannot be turned into a model type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// A census tract identifier was not 1-11 ASCII digits.
    #[error("Invalid GEOID '{value}': expected up to 11 digits")]
    InvalidGeoid {
        /// The rejected input.
        value: String,
    },

    /// A range had `min > max` or a non-finite bound.
    #[error("Invalid range [{min}, {max}]")]
    InvalidRange {
        /// Lower bound as given.
        min: String,
        /// Upper bound as given.
        max: String,
    },
}
