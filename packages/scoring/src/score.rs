//! Composite score calculation.
//!
//! Components are expected on a shared 0-1 scale; with weights summing to
//! 1 the composite is also 0-1, and the frontend shows it multiplied by
//! 100. Nothing here clamps.

use resilience_map_scoring_models::{ComponentScores, DemographicWeights, WeightFractions};

/// Weighted sum of the six component scores.
///
/// A missing demographic score contributes 0 but its weight is still
/// counted, so the composite of a zone without demographic data is lower
/// than it would be with the weight redistributed.
#[must_use]
pub fn calculate_custom_score(
    foot_traffic: f64,
    demographic: Option<f64>,
    crime: f64,
    flood_risk: f64,
    rent: f64,
    poi: f64,
    weights: &WeightFractions,
) -> f64 {
    foot_traffic * weights.foot_traffic
        + demographic.unwrap_or(0.0) * weights.demographic
        + crime * weights.crime
        + flood_risk * weights.flood_risk
        + rent * weights.rent_score
        + poi * weights.poi
}

/// [`calculate_custom_score`] over a zone's component scores.
#[must_use]
pub fn score_components(scores: &ComponentScores, weights: &WeightFractions) -> f64 {
    calculate_custom_score(
        scores.foot_traffic,
        scores.demographic,
        scores.crime,
        scores.flood_risk,
        scores.rent_score,
        scores.poi,
        weights,
    )
}

/// Converts a 0-1 composite to the 0-100 figure shown in the UI.
#[must_use]
pub fn to_display_score(score: f64) -> f64 {
    score * 100.0
}

/// Per-tract match fractions for each demographic filter. `None` means
/// the filter is not active.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DemographicFractions {
    /// Share of the population in the selected ethnicities.
    pub ethnicity: Option<f64>,
    /// Share of the population in the selected age range.
    pub age: Option<f64>,
    /// Share of households in the selected income range.
    pub income: Option<f64>,
    /// Share of the population of the selected genders.
    pub gender: Option<f64>,
}

/// Demographic match score for one tract.
///
/// Weighted mean of the active filters' fractions, using the sub-weights
/// of the active filters only. Returns `None` when no filter is active,
/// and `Some(0.0)` if the active filters all have zero weight.
#[must_use]
pub fn demographic_match(
    fractions: &DemographicFractions,
    weights: &DemographicWeights,
) -> Option<f64> {
    let parts = [
        (fractions.ethnicity, weights.ethnicity),
        (fractions.age, weights.age),
        (fractions.income, weights.income),
        (fractions.gender, weights.gender),
    ];

    let active: Vec<(f64, f64)> = parts
        .iter()
        .filter_map(|(fraction, weight)| fraction.map(|f| (f, *weight)))
        .collect();

    if active.is_empty() {
        return None;
    }

    let weight_total: f64 = active.iter().map(|(_, w)| w).sum();
    if weight_total <= 0.0 {
        return Some(0.0);
    }

    Some(active.iter().map(|(f, w)| f * w).sum::<f64>() / weight_total)
}
