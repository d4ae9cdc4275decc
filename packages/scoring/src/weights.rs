//! Weight normalization.
//!
//! Weight proposals arrive from the sliders or, more often, from the
//! assistant, and may be partial, malformed, or not sum to 100. These
//! functions turn them into canonical weight sets without ever failing:
//! bad entries are dropped and degenerate input falls back to the
//! documented defaults, flagged as [`WeightSource::Defaulted`].

use std::collections::BTreeMap;
use std::str::FromStr;

use resilience_map_scoring_models::{
    DemographicWeights, Factor, Normalized, WeightFractions, WeightProposal, WeightSet,
    WeightSource,
};

/// A rounded weight set may miss 100 by this much before the residual is
/// moved onto the largest entry.
const RESIDUAL_TOLERANCE: f64 = 0.1;

/// Demographic sub-weights within this distance of 1.0 are left alone.
const DEMOGRAPHIC_TOLERANCE: f64 = 0.01;

/// Rounds to `decimals` decimal places, halves away from zero.
#[must_use]
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10_f64.powi(decimals);
    (value * scale).round() / scale
}

/// Normalizes a weight proposal into a canonical [`WeightSet`] summing to
/// 100 (within 0.1).
///
/// Entries with a negative or non-finite value, an unknown factor id, or
/// a factor already seen earlier in the list are dropped. If nothing
/// survives, or the survivors sum to zero, [`WeightSet::DEFAULT`] is
/// returned as [`WeightSource::Defaulted`].
///
/// Survivors are scaled to sum to 100 and rounded to one decimal. If the
/// rounded total is off by more than 0.1, the whole residual goes to the
/// largest entry (the earliest in the proposal on ties). Factors absent
/// from the proposal get 0.
#[must_use]
pub fn normalize(proposal: &[WeightProposal]) -> Normalized<WeightSet> {
    let mut surviving: Vec<(Factor, f64)> = Vec::with_capacity(Factor::ALL.len());

    for entry in proposal {
        if !entry.value.is_finite() || entry.value < 0.0 {
            log::debug!("Dropping weight '{}' with invalid value {}", entry.id, entry.value);
            continue;
        }
        let Ok(factor) = Factor::from_str(&entry.id) else {
            log::debug!("Dropping unknown weight factor '{}'", entry.id);
            continue;
        };
        if surviving.iter().any(|(seen, _)| *seen == factor) {
            log::debug!("Dropping duplicate weight for '{factor}'");
            continue;
        }
        surviving.push((factor, entry.value));
    }

    // Scale by the largest entry first: a raw sum of huge values overflows
    // and a subnormal sum has no finite reciprocal.
    let largest = surviving.iter().map(|(_, value)| *value).fold(0.0, f64::max);
    if largest <= 0.0 {
        log::debug!("Weight proposal is empty or sums to zero, using defaults");
        return Normalized::defaulted(WeightSet::DEFAULT);
    }

    let total: f64 = surviving.iter().map(|(_, value)| value / largest).sum();
    for (_, value) in &mut surviving {
        *value = round_to(*value / largest / total * 100.0, 1);
    }

    let rounded_total: f64 = surviving.iter().map(|(_, value)| value).sum();
    let residual = 100.0 - rounded_total;
    if residual.abs() > RESIDUAL_TOLERANCE {
        if let Some(index) = largest_index(&surviving) {
            let value = &mut surviving[index].1;
            *value = round_to(*value + residual, 1);
        }
    }

    Normalized::computed(WeightSet::from_fn(|factor| {
        surviving
            .iter()
            .find(|(f, _)| *f == factor)
            .map_or(0.0, |(_, value)| *value)
    }))
}

/// Index of the largest value; the earliest wins ties.
fn largest_index(entries: &[(Factor, f64)]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (index, (_, value)) in entries.iter().enumerate() {
        if best.is_none_or(|(_, best_value)| *value > best_value) {
            best = Some((index, *value));
        }
    }
    best.map(|(index, _)| index)
}

/// Parses an untrusted JSON weight list and normalizes it.
///
/// Entries whose `id` is not a string or whose `value`/`weight` is not a
/// number are skipped. A non-array value is treated as an empty list.
#[must_use]
pub fn normalize_json(value: &serde_json::Value) -> Normalized<WeightSet> {
    normalize(&WeightProposal::list_from_value(value))
}

/// Validates and rescales the demographic sub-weights.
///
/// All four must be finite and within `[0, 1]`, otherwise all four reset
/// to [`DemographicWeights::DEFAULT`]. A zero sum also resets. If the sum
/// is more than 0.01 away from 1, each sub-weight is divided by the sum
/// and rounded to two decimals; the result may still be off by a few
/// hundredths.
#[must_use]
pub fn normalize_demographic_weights(
    weights: DemographicWeights,
) -> Normalized<DemographicWeights> {
    if !weights.as_array().iter().all(|w| (0.0..=1.0).contains(w)) {
        log::debug!("Invalid demographic weights {weights:?}, using defaults");
        return Normalized::defaulted(DemographicWeights::DEFAULT);
    }

    let total = weights.total();
    if total <= 0.0 {
        log::debug!("Demographic weights sum to zero, using defaults");
        return Normalized::defaulted(DemographicWeights::DEFAULT);
    }

    if (total - 1.0).abs() <= DEMOGRAPHIC_TOLERANCE {
        return Normalized::computed(weights);
    }

    Normalized::computed(DemographicWeights {
        ethnicity: round_to(weights.ethnicity / total, 2),
        age: round_to(weights.age / total, 2),
        income: round_to(weights.income / total, 2),
        gender: round_to(weights.gender / total, 2),
    })
}

/// Merges a percentage proposal over [`WeightFractions::SCORING_DEFAULT`].
///
/// Each known factor in the proposal replaces the default with
/// `value / 100`; the rest keep their defaults. Invalid entries are
/// ignored, and the result is not rescaled, so it only sums to 1 if the
/// caller's overrides do.
#[must_use]
pub fn apply_weights(proposal: &[WeightProposal]) -> WeightFractions {
    let mut overrides = BTreeMap::new();
    for entry in proposal {
        if !entry.value.is_finite() || entry.value < 0.0 {
            continue;
        }
        if let Ok(factor) = Factor::from_str(&entry.id) {
            overrides.entry(factor).or_insert(entry.value / 100.0);
        }
    }

    let defaults = WeightFractions::SCORING_DEFAULT;
    WeightFractions::from_fn(|factor| {
        overrides
            .get(&factor)
            .copied()
            .unwrap_or_else(|| defaults.get(factor))
    })
}

/// Whether `weights` already sums to 100 within the residual tolerance.
#[must_use]
pub fn is_canonical(weights: &WeightSet) -> bool {
    (weights.total() - 100.0).abs() <= RESIDUAL_TOLERANCE
        && Factor::ALL.iter().all(|f| weights.get(*f) >= 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn p(id: &str, value: f64) -> WeightProposal {
        WeightProposal::new(id, value)
    }

    fn assert_close(actual: f64, expected: f64, tolerance: f64) {
        assert!(
            (actual - expected).abs() <= tolerance,
            "expected {expected} (±{tolerance}), got {actual}"
        );
    }

    #[test]
    fn empty_proposal_is_default() {
        let result = normalize(&[]);
        assert!(result.is_defaulted());
        assert_eq!(result.value, WeightSet::DEFAULT);
        assert_close(result.value.demographic, 40.0, 0.0);
        assert_close(result.value.foot_traffic, 30.0, 0.0);
        assert_close(result.value.crime, 15.0, 0.0);
        assert_close(result.value.flood_risk, 10.0, 0.0);
        assert_close(result.value.rent_score, 5.0, 0.0);
        assert_close(result.value.poi, 0.0, 0.0);
    }

    #[test]
    fn all_zero_proposal_is_default() {
        let result = normalize(&[p("crime", 0.0), p("poi", 0.0)]);
        assert_eq!(result.source, WeightSource::Defaulted);
        assert_eq!(result.value, WeightSet::DEFAULT);
    }

    #[test]
    fn only_invalid_entries_is_default() {
        let result = normalize(&[p("crime", -5.0), p("walkability", 50.0), p("poi", f64::NAN)]);
        assert!(result.is_defaulted());
    }

    #[test]
    fn single_entry_takes_everything() {
        let result = normalize(&[p("foot_traffic", 50.0)]);
        assert!(!result.is_defaulted());
        assert_close(result.value.foot_traffic, 100.0, 1e-9);
        assert_close(result.value.demographic, 0.0, 0.0);
        assert_close(result.value.to_fractions().foot_traffic, 1.0, 1e-9);
    }

    #[test]
    fn rescales_to_100() {
        let result = normalize(&[p("crime", 1.0), p("flood_risk", 1.0), p("poi", 2.0)]);
        assert_close(result.value.crime, 25.0, 1e-9);
        assert_close(result.value.flood_risk, 25.0, 1e-9);
        assert_close(result.value.poi, 50.0, 1e-9);
        assert_close(result.value.foot_traffic, 0.0, 0.0);
    }

    #[test]
    fn residual_goes_to_largest_entry() {
        // Sixths round to 16.7 each (100.2), so the largest, the first on
        // ties, absorbs -0.2.
        let sixths = normalize(&[
            p("foot_traffic", 1.0),
            p("demographic", 1.0),
            p("crime", 1.0),
            p("flood_risk", 1.0),
            p("rent_score", 1.0),
            p("poi", 1.0),
        ]);
        assert_close(sixths.value.foot_traffic, 16.5, 1e-9);
        assert_close(sixths.value.demographic, 16.7, 1e-9);
        assert_close(sixths.value.poi, 16.7, 1e-9);
        assert_close(sixths.value.total(), 100.0, 1e-9);
    }

    #[test]
    fn residual_ties_follow_proposal_order() {
        let sixths = normalize(&[
            p("poi", 1.0),
            p("rent_score", 1.0),
            p("flood_risk", 1.0),
            p("crime", 1.0),
            p("demographic", 1.0),
            p("foot_traffic", 1.0),
        ]);
        assert_close(sixths.value.poi, 16.5, 1e-9);
        assert_close(sixths.value.foot_traffic, 16.7, 1e-9);
        assert_close(sixths.value.total(), 100.0, 1e-9);
    }

    #[test]
    fn extreme_magnitudes_stay_finite() {
        let tiny = normalize(&[p("crime", 0.0), p("poi", 1e-320)]);
        assert!(!tiny.is_defaulted());
        assert_close(tiny.value.poi, 100.0, 1e-9);
        assert_close(tiny.value.crime, 0.0, 0.0);

        let huge = normalize(&[p("demographic", 1e308), p("crime", 1e308)]);
        assert!(!huge.is_defaulted());
        assert_close(huge.value.demographic, 50.0, 1e-9);
        assert_close(huge.value.crime, 50.0, 1e-9);
        assert!(is_canonical(&huge.value));
    }

    #[test]
    fn residual_prefers_strictly_largest() {
        // 19.86 x4 rounds to 19.9 and 20.56 to 20.6: 100.2 in total.
        let result = normalize(&[
            p("poi", 19.86),
            p("rent_score", 19.86),
            p("flood_risk", 19.86),
            p("crime", 19.86),
            p("foot_traffic", 20.56),
        ]);
        assert_close(result.value.foot_traffic, 20.4, 1e-9);
        assert_close(result.value.poi, 19.9, 1e-9);
        assert_close(result.value.crime, 19.9, 1e-9);
        assert_close(result.value.total(), 100.0, 1e-9);
    }

    #[test]
    fn thirds_stay_within_tolerance() {
        let thirds = normalize(&[p("crime", 1.0), p("poi", 1.0), p("rent_score", 1.0)]);
        assert!(is_canonical(&thirds.value));
        assert!(thirds.value.crime >= 33.3 - 1e-9);
        assert_close(thirds.value.poi, 33.3, 1e-9);
    }

    #[test]
    fn positive_proposals_sum_to_100() {
        let proposals = [
            vec![p("crime", 7.0), p("poi", 13.0), p("demographic", 29.0)],
            vec![p("foot_traffic", 0.3), p("flood_risk", 0.3), p("rent_score", 0.3)],
            vec![
                p("foot_traffic", 3.0),
                p("demographic", 7.0),
                p("crime", 11.0),
                p("flood_risk", 13.0),
                p("rent_score", 17.0),
                p("poi", 19.0),
            ],
            vec![p("demographic", 1e9), p("crime", 1.0)],
        ];
        for proposal in &proposals {
            let result = normalize(proposal);
            assert!(!result.is_defaulted());
            assert!(
                is_canonical(&result.value),
                "{proposal:?} -> {:?}",
                result.value
            );
        }
    }

    #[test]
    fn unknown_and_duplicate_ids_are_dropped() {
        let result = normalize(&[
            p("crime", 60.0),
            p("walkability", 500.0),
            p("crime", 10.0),
            p("poi", 40.0),
        ]);
        assert_close(result.value.crime, 60.0, 1e-9);
        assert_close(result.value.poi, 40.0, 1e-9);
        assert_close(result.value.total(), 100.0, 1e-9);
    }

    #[test]
    fn normalize_is_idempotent() {
        let once = normalize(&[p("crime", 3.0), p("poi", 7.0), p("demographic", 11.0)]).value;
        let twice = normalize(&once.to_proposal()).value;
        for factor in Factor::ALL {
            assert_close(twice.get(factor), once.get(factor), 0.1);
        }

        let default_again = normalize(&WeightSet::DEFAULT.to_proposal());
        assert!(!default_again.is_defaulted());
        assert_eq!(default_again.value, WeightSet::DEFAULT);
    }

    #[test]
    fn normalize_json_skips_malformed_entries() {
        let result = normalize_json(&json!([
            {"id": "crime", "weight": 30},
            {"id": 5, "weight": 30},
            {"id": "poi", "weight": "high"},
            {"id": "flood_risk", "value": 10},
        ]));
        assert_close(result.value.crime, 75.0, 1e-9);
        assert_close(result.value.flood_risk, 25.0, 1e-9);
        assert_close(result.value.poi, 0.0, 0.0);

        assert!(normalize_json(&json!("not a list")).is_defaulted());
    }

    #[test]
    fn demographic_weights_valid_pass_through() {
        let weights = DemographicWeights {
            ethnicity: 0.25,
            age: 0.25,
            income: 0.25,
            gender: 0.25,
        };
        let result = normalize_demographic_weights(weights);
        assert!(!result.is_defaulted());
        assert_eq!(result.value, weights);
    }

    #[test]
    fn demographic_weights_rescaled() {
        let result = normalize_demographic_weights(DemographicWeights {
            ethnicity: 0.5,
            age: 0.5,
            income: 0.5,
            gender: 0.5,
        });
        assert!(!result.is_defaulted());
        assert_close(result.value.ethnicity, 0.25, 1e-9);
        assert_close(result.value.total(), 1.0, 1e-9);

        let thirds = normalize_demographic_weights(DemographicWeights {
            ethnicity: 0.1,
            age: 0.1,
            income: 0.1,
            gender: 0.0,
        });
        assert_close(thirds.value.ethnicity, 0.33, 1e-9);
        assert_close(thirds.value.gender, 0.0, 0.0);
        assert_close(thirds.value.total(), 0.99, 1e-9);
    }

    #[test]
    fn demographic_weights_out_of_range_reset() {
        for bad in [
            DemographicWeights {
                ethnicity: 1.5,
                ..DemographicWeights::DEFAULT
            },
            DemographicWeights {
                gender: -0.1,
                ..DemographicWeights::DEFAULT
            },
            DemographicWeights::from_value(&json!({"ethnicity": 0.5})),
            DemographicWeights {
                ethnicity: 0.0,
                age: 0.0,
                income: 0.0,
                gender: 0.0,
            },
        ] {
            let result = normalize_demographic_weights(bad);
            assert!(result.is_defaulted(), "{bad:?} should reset");
            assert_eq!(result.value, DemographicWeights::DEFAULT);
        }
    }

    #[test]
    fn apply_weights_merges_over_scoring_defaults() {
        let fractions = apply_weights(&[p("foot_traffic", 50.0)]);
        assert_close(fractions.foot_traffic, 0.50, 1e-9);
        assert_close(fractions.demographic, 0.25, 1e-9);
        assert_close(fractions.poi, 0.05, 1e-9);
    }

    #[test]
    fn apply_weights_ignores_invalid_entries() {
        let fractions = apply_weights(&[p("crime", -10.0), p("unknown", 10.0)]);
        assert_eq!(fractions, WeightFractions::SCORING_DEFAULT);
    }

    #[test]
    fn round_to_decimals() {
        assert_close(round_to(16.666_666, 1), 16.7, 1e-12);
        assert_close(round_to(0.333_333, 2), 0.33, 1e-12);
        assert_close(round_to(0.25, 1), 0.3, 1e-12);
    }
}
