//! The scoring endpoint's request handling, minus the transport.
//!
//! Given a request, the census tables, and the joined zone records, this
//! normalizes the weights, filters by rent, computes demographic matches,
//! and attaches a composite score to every surviving zone.

use std::collections::BTreeMap;

use resilience_map_scoring_models::{
    CensusTables, DemographicWeights, Geoid, Normalized, ScoreDebug, ScoreRequest, ScoreResponse,
    ZoneRecord,
};

use crate::ethnicity::resolve_ethnicities;
use crate::filters::{
    calculate_age_percentages, calculate_ethnicity_percentages, calculate_gender_percentages,
    calculate_income_percentages, filter_zones_by_rent,
};
use crate::score::{DemographicFractions, demographic_match, score_components};
use crate::weights::{normalize, normalize_demographic_weights};

/// Match fractions for every active demographic filter.
struct ActiveFilters {
    ethnicity: Option<BTreeMap<Geoid, f64>>,
    age: Option<BTreeMap<Geoid, f64>>,
    income: Option<BTreeMap<Geoid, f64>>,
    gender: Option<BTreeMap<Geoid, f64>>,
}

impl ActiveFilters {
    const fn any(&self) -> bool {
        self.ethnicity.is_some()
            || self.age.is_some()
            || self.income.is_some()
            || self.gender.is_some()
    }

    /// Fractions for one tract. A tract missing from an active filter's
    /// table matches 0.
    fn fractions_for(&self, geoid: &Geoid) -> DemographicFractions {
        let lookup = |table: &Option<BTreeMap<Geoid, f64>>| {
            table
                .as_ref()
                .map(|t| t.get(geoid).copied().unwrap_or(0.0))
        };

        DemographicFractions {
            ethnicity: lookup(&self.ethnicity),
            age: lookup(&self.age),
            income: lookup(&self.income),
            gender: lookup(&self.gender),
        }
    }
}

/// Scores `zones` for `request`.
///
/// Zones are dropped only by the rent filter. Each surviving zone gets
/// its demographic component replaced when at least one demographic
/// filter is active, and its `custom_score` set. The result is sorted by
/// score, highest first, then by GEOID.
///
/// # Panics
///
/// Panics if the embedded reference tables fail to parse.
#[must_use]
pub fn score_zones(
    request: &ScoreRequest,
    census: &CensusTables,
    zones: Vec<ZoneRecord>,
) -> ScoreResponse {
    let weights = normalize(&request.weights);
    let fractions = weights.value.to_fractions();

    let demographic_weights = request.demographic_weights.as_ref().map_or_else(
        || Normalized::defaulted(DemographicWeights::DEFAULT),
        |raw| normalize_demographic_weights(DemographicWeights::from_value(raw)),
    );

    let resolved_ethnicities = resolve_ethnicities(&request.ethnicities);
    if resolved_ethnicities.is_empty() && !request.ethnicities.is_empty() {
        log::warn!(
            "Ethnicity filter {:?} resolved to nothing, ignoring it",
            request.ethnicities
        );
    }

    let zones_in = zones.len();
    let mut zones = match &request.rent_range {
        Some(range) => filter_zones_by_rent(zones, range),
        None => zones,
    };

    let active = ActiveFilters {
        ethnicity: (!resolved_ethnicities.is_empty())
            .then(|| calculate_ethnicity_percentages(&census.demographics, &resolved_ethnicities)),
        age: request
            .age_range
            .as_ref()
            .map(|range| calculate_age_percentages(&census.ages, range)),
        income: request
            .income_range
            .as_ref()
            .map(|range| calculate_income_percentages(&census.incomes, range)),
        gender: (!request.genders.is_empty())
            .then(|| calculate_gender_percentages(&census.genders, &request.genders)),
    };

    for zone in &mut zones {
        if active.any() {
            zone.scores.demographic =
                demographic_match(&active.fractions_for(&zone.geoid), &demographic_weights.value);
        }
        zone.custom_score = Some(score_components(&zone.scores, &fractions));
    }

    zones.sort_by(|a, b| {
        let a_score = a.custom_score.unwrap_or(0.0);
        let b_score = b.custom_score.unwrap_or(0.0);
        b_score.total_cmp(&a_score).then_with(|| a.geoid.cmp(&b.geoid))
    });

    log::debug!(
        "Scored {} of {zones_in} zones (weights {:?})",
        zones.len(),
        weights.source
    );

    let zones_kept = zones.len();
    ScoreResponse {
        zones,
        debug: Some(ScoreDebug {
            weights: weights.value,
            weights_source: weights.source,
            demographic_weights: demographic_weights.value,
            demographic_weights_source: demographic_weights.source,
            resolved_ethnicities,
            zones_in,
            zones_kept,
        }),
    }
}
