//! Filter and scoring endpoint request/response types.
//!
//! These are rebuilt on every user interaction and never persisted.

use serde::{Deserialize, Serialize};

use crate::weights::deserialize_lenient_proposals;
use crate::{DemographicWeights, ValueRange, WeightProposal, WeightSet, WeightSource, ZoneRecord};

/// The filter state of the explorer, as set by the user or the assistant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterSpec {
    /// Age range in years.
    pub age_range: Option<ValueRange<u32>>,
    /// Household income range in dollars.
    pub income_range: Option<ValueRange<f64>>,
    /// Monthly rent range in dollars.
    pub rent_range: Option<ValueRange<f64>>,
    /// Ethnicity values or free-form terms.
    pub selected_ethnicities: Vec<String>,
    /// Gender names.
    pub selected_genders: Vec<String>,
    /// Weight proposal in percentages.
    #[serde(deserialize_with = "deserialize_lenient_proposals")]
    pub weights: Vec<WeightProposal>,
}

/// Body of a scoring endpoint request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScoreRequest {
    /// Weight proposal in percentages. Malformed entries are dropped.
    #[serde(deserialize_with = "deserialize_lenient_proposals")]
    pub weights: Vec<WeightProposal>,
    /// Monthly rent range.
    pub rent_range: Option<ValueRange<f64>>,
    /// Ethnicity values or free-form terms.
    pub ethnicities: Vec<String>,
    /// Gender names.
    pub genders: Vec<String>,
    /// Age range in years.
    pub age_range: Option<ValueRange<u32>>,
    /// Household income range in dollars.
    pub income_range: Option<ValueRange<f64>>,
    /// Raw demographic sub-weights; validated before use.
    pub demographic_weights: Option<serde_json::Value>,
}

impl From<FilterSpec> for ScoreRequest {
    fn from(filters: FilterSpec) -> Self {
        Self {
            weights: filters.weights,
            rent_range: filters.rent_range,
            ethnicities: filters.selected_ethnicities,
            genders: filters.selected_genders,
            age_range: filters.age_range,
            income_range: filters.income_range,
            demographic_weights: None,
        }
    }
}

/// Body of a scoring endpoint response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResponse {
    /// Scored zones, highest score first.
    pub zones: Vec<ZoneRecord>,
    /// How the request was interpreted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<ScoreDebug>,
}

/// Diagnostics describing how a scoring request was interpreted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreDebug {
    /// Weights actually applied, in percentages.
    pub weights: WeightSet,
    /// Whether the weights were defaulted.
    pub weights_source: WeightSource,
    /// Demographic sub-weights actually applied.
    pub demographic_weights: DemographicWeights,
    /// Whether the demographic sub-weights were defaulted.
    pub demographic_weights_source: WeightSource,
    /// Ethnicity values the request's terms resolved to.
    pub resolved_ethnicities: Vec<String>,
    /// Number of zones received.
    pub zones_in: usize,
    /// Number of zones that passed the rent filter.
    pub zones_kept: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_drops_malformed_weights() {
        let request: ScoreRequest = serde_json::from_value(json!({
            "weights": [
                {"id": "crime", "value": 50},
                {"id": "poi", "value": "lots"},
                {"id": 7, "value": 10},
            ],
            "rentRange": [1000, 2000],
            "ethnicities": ["asian"],
        }))
        .unwrap();

        assert_eq!(request.weights, vec![WeightProposal::new("crime", 50.0)]);
        assert_eq!(request.rent_range, Some(ValueRange::new(1000.0, 2000.0).unwrap()));
        assert_eq!(request.ethnicities, vec!["asian".to_string()]);
        assert!(request.genders.is_empty());
        assert!(request.age_range.is_none());
    }

    #[test]
    fn request_rejects_inverted_range() {
        let result = serde_json::from_value::<ScoreRequest>(json!({"ageRange": [60, 20]}));
        assert!(result.is_err());
    }

    #[test]
    fn filter_spec_converts_to_request() {
        let filters: FilterSpec = serde_json::from_value(json!({
            "ageRange": [20, 30],
            "selectedEthnicities": ["hispanic"],
            "selectedGenders": ["female"],
            "weights": [{"id": "demographic", "weight": 60}],
        }))
        .unwrap();

        let request = ScoreRequest::from(filters);
        assert_eq!(request.ethnicities, vec!["hispanic".to_string()]);
        assert_eq!(request.genders, vec!["female".to_string()]);
        assert_eq!(request.weights[0].id, "demographic");
        assert_eq!(request.age_range.map(|r| r.max()), Some(30));
    }
}
