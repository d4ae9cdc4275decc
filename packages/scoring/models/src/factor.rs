//! The six scoring factors and their display metadata.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// A component of the composite resilience score.
///
/// The string form (`"foot_traffic"`, `"rent_score"`, ...) is the
/// identifier used on the wire by both the scoring endpoint and the
/// assistant.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Factor {
    /// Pedestrian activity in the tract.
    FootTraffic,
    /// How well the tract's population matches the selected demographics.
    Demographic,
    /// Public safety, higher is safer.
    Crime,
    /// Exposure to flooding, higher is less exposed.
    FloodRisk,
    /// Affordability relative to the selected rent range.
    RentScore,
    /// Density of points of interest.
    Poi,
}

impl Factor {
    /// All factors in canonical order.
    pub const ALL: [Self; 6] = [
        Self::FootTraffic,
        Self::Demographic,
        Self::Crime,
        Self::FloodRisk,
        Self::RentScore,
        Self::Poi,
    ];

    /// Human-readable label shown next to the weight slider.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::FootTraffic => "Foot Traffic",
            Self::Demographic => "Demographics",
            Self::Crime => "Crime",
            Self::FloodRisk => "Flood Risk",
            Self::RentScore => "Rent",
            Self::Poi => "Points of Interest",
        }
    }

    /// Icon name from the frontend's icon set.
    #[must_use]
    pub const fn icon(self) -> &'static str {
        match self {
            Self::FootTraffic => "footprints",
            Self::Demographic => "users",
            Self::Crime => "shield",
            Self::FloodRisk => "droplets",
            Self::RentScore => "home",
            Self::Poi => "map-pin",
        }
    }

    /// Hex color used for the factor's slider and legend swatch.
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::FootTraffic => "#f97316",
            Self::Demographic => "#8b5cf6",
            Self::Crime => "#ef4444",
            Self::FloodRisk => "#0ea5e9",
            Self::RentScore => "#22c55e",
            Self::Poi => "#eab308",
        }
    }
}
