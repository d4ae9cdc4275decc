//! Per-tract zone records as exchanged with the map frontend.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Factor, Geoid};

/// The six component scores of a zone, each on a shared 0-1 scale.
///
/// `demographic` is absent until the filter aggregator has computed a
/// match for the active demographic filters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ComponentScores {
    /// Foot traffic score.
    pub foot_traffic: f64,
    /// Demographic match score.
    pub demographic: Option<f64>,
    /// Crime (safety) score.
    pub crime: f64,
    /// Flood risk score.
    pub flood_risk: f64,
    /// Rent score.
    pub rent_score: f64,
    /// Points-of-interest score.
    pub poi: f64,
}

impl ComponentScores {
    /// Returns the component for `factor`. A missing demographic score
    /// reads as `None`.
    #[must_use]
    pub const fn get(&self, factor: Factor) -> Option<f64> {
        match factor {
            Factor::FootTraffic => Some(self.foot_traffic),
            Factor::Demographic => self.demographic,
            Factor::Crime => Some(self.crime),
            Factor::FloodRisk => Some(self.flood_risk),
            Factor::RentScore => Some(self.rent_score),
            Factor::Poi => Some(self.poi),
        }
    }
}

/// One census tract with its attributes and scores.
///
/// Known fields are typed; anything else the joining step attaches is
/// kept verbatim in [`ZoneRecord::extra`] and written back out flat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneRecord {
    /// Census tract GEOID.
    pub geoid: Geoid,
    /// Neighborhood name, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Borough name, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub borough: Option<String>,
    /// Average monthly rent in dollars. `None` means no data.
    #[serde(default)]
    pub rent: Option<f64>,
    /// Component scores.
    #[serde(flatten)]
    pub scores: ComponentScores,
    /// Composite score (0-1), set by the score calculator.
    #[serde(default)]
    pub custom_score: Option<f64>,
    /// Unrecognized attributes.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl ZoneRecord {
    /// Creates an unscored zone with no attributes.
    #[must_use]
    pub const fn new(geoid: Geoid) -> Self {
        Self {
            geoid,
            name: None,
            borough: None,
            rent: None,
            scores: ComponentScores {
                foot_traffic: 0.0,
                demographic: None,
                crime: 0.0,
                flood_risk: 0.0,
                rent_score: 0.0,
                poi: 0.0,
            },
            custom_score: None,
            extra: BTreeMap::new(),
        }
    }

    /// Sets the average rent.
    #[must_use]
    pub const fn with_rent(mut self, rent: Option<f64>) -> Self {
        self.rent = rent;
        self
    }

    /// Sets the component scores.
    #[must_use]
    pub const fn with_scores(mut self, scores: ComponentScores) -> Self {
        self.scores = scores;
        self
    }
}
