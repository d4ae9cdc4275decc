//! Weight sets in percentage and fraction form, and the untrusted
//! proposals they are normalized from.
//!
//! A [`WeightSet`] holds percentages (0-100, summing to 100) as shown in
//! the weight sliders and accepted from the assistant. Score math works on
//! [`WeightFractions`] (0-1, summing to 1). The two never convert
//! implicitly; use [`WeightSet::to_fractions`].

use serde::{Deserialize, Deserializer, Serialize};

use crate::Factor;

/// A factor-to-percentage mapping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightSet {
    /// Foot traffic weight.
    pub foot_traffic: f64,
    /// Demographic match weight.
    pub demographic: f64,
    /// Crime weight.
    pub crime: f64,
    /// Flood risk weight.
    pub flood_risk: f64,
    /// Rent weight.
    pub rent_score: f64,
    /// Points-of-interest weight.
    pub poi: f64,
}

impl WeightSet {
    /// Weights used when a proposal is empty or degenerate.
    pub const DEFAULT: Self = Self {
        foot_traffic: 30.0,
        demographic: 40.0,
        crime: 15.0,
        flood_risk: 10.0,
        rent_score: 5.0,
        poi: 0.0,
    };

    /// Builds a weight set by evaluating `f` for every factor.
    #[must_use]
    pub fn from_fn(mut f: impl FnMut(Factor) -> f64) -> Self {
        Self {
            foot_traffic: f(Factor::FootTraffic),
            demographic: f(Factor::Demographic),
            crime: f(Factor::Crime),
            flood_risk: f(Factor::FloodRisk),
            rent_score: f(Factor::RentScore),
            poi: f(Factor::Poi),
        }
    }

    /// Returns the percentage for `factor`.
    #[must_use]
    pub const fn get(&self, factor: Factor) -> f64 {
        match factor {
            Factor::FootTraffic => self.foot_traffic,
            Factor::Demographic => self.demographic,
            Factor::Crime => self.crime,
            Factor::FloodRisk => self.flood_risk,
            Factor::RentScore => self.rent_score,
            Factor::Poi => self.poi,
        }
    }

    /// Sum of all six percentages.
    #[must_use]
    pub fn total(&self) -> f64 {
        Factor::ALL.iter().map(|f| self.get(*f)).sum()
    }

    /// Converts percentages to the fractions used in score math.
    #[must_use]
    pub fn to_fractions(&self) -> WeightFractions {
        WeightFractions::from_fn(|f| self.get(f) / 100.0)
    }

    /// Returns the weights as slider entries in canonical factor order.
    #[must_use]
    pub fn entries(&self) -> Vec<WeightEntry> {
        Factor::ALL
            .iter()
            .map(|f| WeightEntry::new(*f, self.get(*f)))
            .collect()
    }

    /// Re-expresses the set as a proposal, e.g. to feed it back through
    /// normalization.
    #[must_use]
    pub fn to_proposal(&self) -> Vec<WeightProposal> {
        Factor::ALL
            .iter()
            .map(|f| WeightProposal::new(f.as_ref(), self.get(*f)))
            .collect()
    }
}

impl Default for WeightSet {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// A factor-to-fraction mapping used by the score calculator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightFractions {
    /// Foot traffic weight.
    pub foot_traffic: f64,
    /// Demographic match weight.
    pub demographic: f64,
    /// Crime weight.
    pub crime: f64,
    /// Flood risk weight.
    pub flood_risk: f64,
    /// Rent weight.
    pub rent_score: f64,
    /// Points-of-interest weight.
    pub poi: f64,
}

impl WeightFractions {
    /// Fractions the scoring endpoint starts from before applying any
    /// user-supplied weights.
    pub const SCORING_DEFAULT: Self = Self {
        foot_traffic: 0.35,
        demographic: 0.25,
        crime: 0.15,
        flood_risk: 0.10,
        rent_score: 0.10,
        poi: 0.05,
    };

    /// Builds fractions by evaluating `f` for every factor.
    #[must_use]
    pub fn from_fn(mut f: impl FnMut(Factor) -> f64) -> Self {
        Self {
            foot_traffic: f(Factor::FootTraffic),
            demographic: f(Factor::Demographic),
            crime: f(Factor::Crime),
            flood_risk: f(Factor::FloodRisk),
            rent_score: f(Factor::RentScore),
            poi: f(Factor::Poi),
        }
    }

    /// Returns the fraction for `factor`.
    #[must_use]
    pub const fn get(&self, factor: Factor) -> f64 {
        match factor {
            Factor::FootTraffic => self.foot_traffic,
            Factor::Demographic => self.demographic,
            Factor::Crime => self.crime,
            Factor::FloodRisk => self.flood_risk,
            Factor::RentScore => self.rent_score,
            Factor::Poi => self.poi,
        }
    }

    /// Sum of all six fractions.
    #[must_use]
    pub fn total(&self) -> f64 {
        Factor::ALL.iter().map(|f| self.get(*f)).sum()
    }
}

impl Default for WeightFractions {
    fn default() -> Self {
        Self::SCORING_DEFAULT
    }
}

/// One weight slider: a factor, its display metadata, and its percentage.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightEntry {
    /// Factor identifier.
    pub id: Factor,
    /// Display label.
    pub label: &'static str,
    /// Icon name.
    pub icon: &'static str,
    /// Hex color.
    pub color: &'static str,
    /// Percentage value.
    pub value: f64,
}

impl WeightEntry {
    /// Creates an entry with the factor's fixed display metadata.
    #[must_use]
    pub const fn new(id: Factor, value: f64) -> Self {
        Self {
            id,
            label: id.label(),
            icon: id.icon(),
            color: id.color(),
            value,
        }
    }
}

/// An untrusted `{id, value}` pair, before normalization.
///
/// The identifier is kept as a string so unknown factors survive parsing
/// and can be reported when they are dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightProposal {
    /// Factor identifier as received.
    pub id: String,
    /// Intended percentage (0-100).
    #[serde(alias = "weight")]
    pub value: f64,
}

impl WeightProposal {
    /// Creates a proposal entry.
    #[must_use]
    pub fn new(id: impl Into<String>, value: f64) -> Self {
        Self {
            id: id.into(),
            value,
        }
    }

    /// Parses one entry of an untrusted JSON weight list.
    ///
    /// Accepts `value` or the assistant's `weight` key. Returns `None` when
    /// the entry is not an object, `id` is not a string, or the value is
    /// not a number.
    #[must_use]
    pub fn from_value(value: &serde_json::Value) -> Option<Self> {
        let id = value.get("id")?.as_str()?;
        let weight = value
            .get("value")
            .or_else(|| value.get("weight"))?
            .as_f64()?;
        Some(Self::new(id, weight))
    }

    /// Parses an untrusted JSON weight list, skipping malformed entries.
    ///
    /// Anything other than an array yields an empty list.
    #[must_use]
    pub fn list_from_value(value: &serde_json::Value) -> Vec<Self> {
        let Some(items) = value.as_array() else {
            return Vec::new();
        };

        items
            .iter()
            .filter_map(|item| {
                let parsed = Self::from_value(item);
                if parsed.is_none() {
                    log::debug!("Dropping malformed weight entry: {item}");
                }
                parsed
            })
            .collect()
    }
}

/// Serde helper that accepts any JSON for a weight list and keeps only
/// the well-formed entries.
///
/// # Errors
///
/// Only fails if the underlying deserializer cannot produce a JSON value.
pub fn deserialize_lenient_proposals<'de, D>(
    deserializer: D,
) -> Result<Vec<WeightProposal>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = serde_json::Value::deserialize(deserializer)?;
    Ok(WeightProposal::list_from_value(&raw))
}

/// Sub-weights of the demographic match score. Canonically sums to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DemographicWeights {
    /// Ethnicity match weight.
    pub ethnicity: f64,
    /// Age bracket weight.
    pub age: f64,
    /// Income bracket weight.
    pub income: f64,
    /// Gender weight.
    pub gender: f64,
}

impl DemographicWeights {
    /// Sub-weights used when a proposal fails validation.
    pub const DEFAULT: Self = Self {
        ethnicity: 0.4,
        age: 0.3,
        income: 0.2,
        gender: 0.1,
    };

    /// Parses untrusted JSON. Missing or non-numeric fields become NaN so
    /// that validation rejects them.
    #[must_use]
    pub fn from_value(value: &serde_json::Value) -> Self {
        let field = |name: &str| {
            value
                .get(name)
                .and_then(serde_json::Value::as_f64)
                .unwrap_or(f64::NAN)
        };

        Self {
            ethnicity: field("ethnicity"),
            age: field("age"),
            income: field("income"),
            gender: field("gender"),
        }
    }

    /// The four sub-weights in declaration order.
    #[must_use]
    pub const fn as_array(&self) -> [f64; 4] {
        [self.ethnicity, self.age, self.income, self.gender]
    }

    /// Sum of the four sub-weights.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.as_array().iter().sum()
    }
}

impl Default for DemographicWeights {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Whether a normalized value was computed from input or substituted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightSource {
    /// Derived from the caller's input.
    Computed,
    /// Input was empty or invalid; the documented default was used.
    Defaulted,
}

/// A normalization result that records whether a default was substituted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Normalized<T> {
    /// The canonical value.
    pub value: T,
    /// Where the value came from.
    pub source: WeightSource,
}

impl<T> Normalized<T> {
    /// Wraps a value computed from input.
    #[must_use]
    pub const fn computed(value: T) -> Self {
        Self {
            value,
            source: WeightSource::Computed,
        }
    }

    /// Wraps a substituted default.
    #[must_use]
    pub const fn defaulted(value: T) -> Self {
        Self {
            value,
            source: WeightSource::Defaulted,
        }
    }

    /// Returns `true` if the default was substituted.
    #[must_use]
    pub fn is_defaulted(&self) -> bool {
        self.source == WeightSource::Defaulted
    }

    /// Discards the provenance flag.
    #[must_use]
    pub fn into_inner(self) -> T {
        self.value
    }
}
