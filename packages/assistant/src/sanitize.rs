//! Validation of the assistant's raw filter proposals.

use std::str::FromStr as _;

use resilience_map_scoring::ethnicity::resolve_ethnicities;
use resilience_map_scoring::weights::normalize_json;
use resilience_map_scoring_models::{
    FilterSpec, Normalized, ValueRange, WeightSet, canonical_gender,
};
use serde_json::Value;
use strum::IntoEnumIterator as _;
use strum_macros::{Display, EnumIter, EnumString};

use crate::RawFilters;

/// Time of day the foot-traffic layer is restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum TimePeriod {
    /// 6am to noon.
    Morning,
    /// Noon to 6pm.
    Afternoon,
    /// 6pm to midnight.
    Evening,
}

/// Filter proposals that survived validation.
///
/// `None` means the reply did not mention that filter, so the current
/// value should be left alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SanitizedFilters {
    /// Normalized weights.
    pub weights: Option<Normalized<WeightSet>>,
    /// The ethnicity terms as written, minus non-strings.
    pub ethnicity_terms: Option<Vec<String>>,
    /// Dataset values the terms resolved to.
    pub ethnicities: Vec<String>,
    /// Age range in years.
    pub age_range: Option<ValueRange<u32>>,
    /// Household income range.
    pub income_range: Option<ValueRange<f64>>,
    /// Monthly rent range.
    pub rent_range: Option<ValueRange<f64>>,
    /// Lowercased, deduplicated gender names.
    pub genders: Option<Vec<String>>,
    /// Recognized time periods, deduplicated.
    pub time_periods: Option<Vec<TimePeriod>>,
}

impl SanitizedFilters {
    /// Applies these proposals on top of `base`. Filters the reply did
    /// not mention keep their `base` value.
    ///
    /// Ethnicities are passed on as the original terms so that scoring
    /// resolves them exactly as it would user input.
    #[must_use]
    pub fn into_filter_spec(self, base: FilterSpec) -> FilterSpec {
        FilterSpec {
            age_range: self.age_range.or(base.age_range),
            income_range: self.income_range.or(base.income_range),
            rent_range: self.rent_range.or(base.rent_range),
            selected_ethnicities: self.ethnicity_terms.unwrap_or(base.selected_ethnicities),
            selected_genders: self.genders.unwrap_or(base.selected_genders),
            weights: self.weights.map_or(base.weights, |w| w.value.to_proposal()),
        }
    }
}

/// Validates every field of `filters`. Invalid fields are dropped with a
/// warning; the rest are kept.
#[must_use]
pub fn sanitize(filters: &RawFilters) -> SanitizedFilters {
    let weights = filters.weights.as_ref().map(|raw| {
        let normalized = normalize_json(raw);
        if normalized.is_defaulted() {
            log::warn!("Assistant weights {raw} were unusable, using defaults");
        }
        normalized
    });

    let ethnicity_terms = filters
        .selected_ethnicities
        .as_ref()
        .map(|raw| string_list("selectedEthnicities", raw));
    let ethnicities = ethnicity_terms
        .as_deref()
        .map(resolve_ethnicities::<String>)
        .unwrap_or_default();

    SanitizedFilters {
        weights,
        ethnicity_terms,
        ethnicities,
        age_range: filters
            .age_range
            .as_ref()
            .and_then(|raw| float_range("ageRange", raw))
            .and_then(|range| to_age_range(&range)),
        income_range: filters
            .income_range
            .as_ref()
            .and_then(|raw| float_range("incomeRange", raw)),
        rent_range: filters
            .rent_range
            .as_ref()
            .and_then(|raw| float_range("rentRange", raw)),
        genders: filters.selected_genders.as_ref().map(genders),
        time_periods: filters.selected_time_periods.as_ref().map(time_periods),
    }
}

/// Strings from a JSON array, or a lone string. Anything else is empty.
fn string_list(field: &str, raw: &Value) -> Vec<String> {
    match raw {
        Value::String(s) => vec![s.clone()],
        Value::Array(items) => items
            .iter()
            .filter_map(|item| {
                let s = item.as_str();
                if s.is_none() {
                    log::warn!("Dropping non-string {field} entry {item}");
                }
                s.map(ToString::to_string)
            })
            .collect(),
        Value::Null => Vec::new(),
        other => {
            log::warn!("Ignoring {field}: expected a list, got {other}");
            Vec::new()
        }
    }
}

/// Accepts `[a, b]` or `{"min": a, "max": b}`, swapping reversed bounds.
fn float_range(field: &str, raw: &Value) -> Option<ValueRange<f64>> {
    let bounds = match raw {
        Value::Array(items) if items.len() == 2 => items[0].as_f64().zip(items[1].as_f64()),
        Value::Object(map) => map
            .get("min")
            .and_then(Value::as_f64)
            .zip(map.get("max").and_then(Value::as_f64)),
        _ => None,
    };

    let Some((a, b)) = bounds else {
        log::warn!("Dropping {field}: expected two numbers, got {raw}");
        return None;
    };

    match ValueRange::ordered(a, b) {
        Ok(range) => {
            if b < a {
                log::debug!("Swapped reversed {field} [{a}, {b}]");
            }
            Some(range)
        }
        Err(e) => {
            log::warn!("Dropping {field}: {e}");
            None
        }
    }
}

/// Rounds to whole years, clamping negative ages to 0.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_age_range(range: &ValueRange<f64>) -> Option<ValueRange<u32>> {
    let years = |value: f64| value.round().clamp(0.0, f64::from(u32::MAX)) as u32;
    ValueRange::new(years(range.min()), years(range.max())).ok()
}

fn genders(raw: &Value) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for name in string_list("selectedGenders", raw) {
        let lowered = name.trim().to_lowercase();
        let name = canonical_gender(&lowered).map_or(lowered, ToString::to_string);
        if !name.is_empty() && !out.contains(&name) {
            out.push(name);
        }
    }
    out
}

fn time_periods(raw: &Value) -> Vec<TimePeriod> {
    let mut out = Vec::new();
    for name in string_list("selectedTimePeriods", raw) {
        match TimePeriod::from_str(name.trim()) {
            Ok(period) => {
                if !out.contains(&period) {
                    out.push(period);
                }
            }
            Err(_) => {
                let valid: Vec<String> = TimePeriod::iter().map(|p| p.to_string()).collect();
                log::warn!(
                    "Dropping unknown time period '{name}' (expected one of {})",
                    valid.join(", ")
                );
            }
        }
    }
    out
}
