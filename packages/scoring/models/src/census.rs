//! Raw per-tract census rows, keyed by GEOID.
//!
//! Each row type mirrors one source table. The joining step that loads
//! them is outside this crate; the filter aggregator only reads them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::Geoid;

/// Population counts by ethnicity for one tract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DemographicRow {
    /// Tract identifier.
    pub geoid: Geoid,
    /// Total population. `None` when the source has no figure.
    #[serde(default)]
    pub total_population: Option<f64>,
    /// Population count per ethnicity value (see the ethnicity taxonomy).
    #[serde(default)]
    pub counts: BTreeMap<String, f64>,
}

/// Age bracket shares for one tract, in percent (0-100).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgeRow {
    /// Tract identifier.
    pub geoid: Geoid,
    /// Share of residents under 5.
    #[serde(default)]
    pub under_5: Option<f64>,
    /// Share of residents aged 25-29.
    #[serde(default, rename = "age25To29")]
    pub age_25_29: Option<f64>,
    /// Share of residents 65 and over.
    #[serde(default, rename = "age65Plus")]
    pub age_65_plus: Option<f64>,
}

/// Household income bracket shares for one tract, in percent (0-100),
/// keyed by bracket key (e.g. `"50k_75k"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeRow {
    /// Tract identifier.
    pub geoid: Geoid,
    /// Share per bracket.
    #[serde(default)]
    pub brackets: BTreeMap<String, f64>,
}

/// Gender shares for one tract, in percent (0-100).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenderRow {
    /// Tract identifier.
    pub geoid: Geoid,
    /// Share of male residents.
    #[serde(default)]
    pub male: Option<f64>,
    /// Share of female residents.
    #[serde(default)]
    pub female: Option<f64>,
    /// Share of residents reporting another gender.
    #[serde(default)]
    pub other: Option<f64>,
}

impl GenderRow {
    /// Looks up a share by gender name (see [`canonical_gender`]).
    /// Unknown names and missing values read as `None`.
    #[must_use]
    pub fn share(&self, gender: &str) -> Option<f64> {
        match canonical_gender(gender)? {
            "male" => self.male,
            "female" => self.female,
            _ => self.other,
        }
    }
}

/// Maps a free-form gender name to `"male"`, `"female"`, or `"other"`,
/// case-insensitively. Returns `None` for anything unrecognized.
#[must_use]
pub fn canonical_gender(name: &str) -> Option<&'static str> {
    match name.trim().to_ascii_lowercase().as_str() {
        "male" | "men" | "man" => Some("male"),
        "female" | "women" | "woman" => Some("female"),
        "other" | "nonbinary" | "non-binary" => Some("other"),
        _ => None,
    }
}

/// The census tables the scoring pipeline aggregates over.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CensusTables {
    /// Ethnicity population counts.
    pub demographics: Vec<DemographicRow>,
    /// Age bracket shares.
    pub ages: Vec<AgeRow>,
    /// Income bracket shares.
    pub incomes: Vec<IncomeRow>,
    /// Gender shares.
    pub genders: Vec<GenderRow>,
}
