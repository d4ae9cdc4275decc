//! Per-tract filter aggregation.
//!
//! Turns raw census rows and the user's filter into per-GEOID match
//! fractions, and applies the rent-range filter to zones.
//!
//! Bracket matching is binary: a bracket whose range overlaps the query
//! range at all contributes its whole share. The age brackets are sparse
//! (only the three published in the source table), so most query ranges
//! only pick up part of the population.

use std::collections::{BTreeMap, BTreeSet};

use resilience_map_scoring_models::{
    AgeRow, DemographicRow, GenderRow, Geoid, IncomeRow, ValueRange, ZoneRecord,
};

use crate::registry;

/// An age bracket published in the tract age table.
#[derive(Debug, Clone, Copy)]
pub struct AgeBracket {
    /// Bracket identifier.
    pub key: &'static str,
    /// Youngest age in the bracket.
    pub min: u32,
    /// Oldest age in the bracket.
    pub max: u32,
    read: fn(&AgeRow) -> Option<f64>,
}

impl AgeBracket {
    /// The bracket's share in `row`, in percent.
    #[must_use]
    pub fn share(&self, row: &AgeRow) -> Option<f64> {
        (self.read)(row)
    }
}

const fn under_5(row: &AgeRow) -> Option<f64> {
    row.under_5
}

const fn age_25_29(row: &AgeRow) -> Option<f64> {
    row.age_25_29
}

const fn age_65_plus(row: &AgeRow) -> Option<f64> {
    row.age_65_plus
}

/// The age brackets available per tract.
pub const AGE_BRACKETS: [AgeBracket; 3] = [
    AgeBracket {
        key: "under_5",
        min: 0,
        max: 4,
        read: under_5,
    },
    AgeBracket {
        key: "25_29",
        min: 25,
        max: 29,
        read: age_25_29,
    },
    AgeBracket {
        key: "65_plus",
        min: 65,
        max: u32::MAX,
        read: age_65_plus,
    },
];

/// A household income bracket, in dollars per year.
#[derive(Debug, Clone, Copy)]
pub struct IncomeBracket {
    /// Key in [`IncomeRow::brackets`].
    pub key: &'static str,
    /// Lowest income in the bracket.
    pub min: f64,
    /// Highest income in the bracket.
    pub max: f64,
}

/// The household income brackets available per tract.
pub const INCOME_BRACKETS: [IncomeBracket; 6] = [
    IncomeBracket {
        key: "under_25k",
        min: 0.0,
        max: 24_999.0,
    },
    IncomeBracket {
        key: "25k_50k",
        min: 25_000.0,
        max: 49_999.0,
    },
    IncomeBracket {
        key: "50k_75k",
        min: 50_000.0,
        max: 74_999.0,
    },
    IncomeBracket {
        key: "75k_100k",
        min: 75_000.0,
        max: 99_999.0,
    },
    IncomeBracket {
        key: "100k_150k",
        min: 100_000.0,
        max: 149_999.0,
    },
    IncomeBracket {
        key: "150k_plus",
        min: 150_000.0,
        max: f64::MAX,
    },
];

/// Fraction of each tract's residents in the age brackets overlapping
/// `range`.
///
/// Missing bracket values count as 0. The result is not clamped, so bad
/// source data summing past 100% yields a fraction above 1.
#[must_use]
pub fn calculate_age_percentages(
    rows: &[AgeRow],
    range: &ValueRange<u32>,
) -> BTreeMap<Geoid, f64> {
    let brackets: Vec<&AgeBracket> = AGE_BRACKETS
        .iter()
        .filter(|b| range.overlaps(b.min, b.max))
        .collect();

    rows.iter()
        .map(|row| {
            let percent: f64 = brackets.iter().filter_map(|b| b.share(row)).sum();
            (row.geoid.clone(), percent / 100.0)
        })
        .collect()
}

/// Fraction of each tract's population belonging to any of
/// `ethnicity_ids`.
///
/// A missing or zero total population gives 0.
#[must_use]
pub fn calculate_ethnicity_percentages<S: AsRef<str>>(
    rows: &[DemographicRow],
    ethnicity_ids: &[S],
) -> BTreeMap<Geoid, f64> {
    rows.iter()
        .map(|row| {
            let matched: f64 = ethnicity_ids
                .iter()
                .filter_map(|id| row.counts.get(id.as_ref()))
                .sum();
            let fraction = match row.total_population {
                Some(total) if total > 0.0 => matched / total,
                _ => 0.0,
            };
            (row.geoid.clone(), fraction)
        })
        .collect()
}

/// Fraction of each tract's households in the income brackets
/// overlapping `range`.
#[must_use]
pub fn calculate_income_percentages(
    rows: &[IncomeRow],
    range: &ValueRange<f64>,
) -> BTreeMap<Geoid, f64> {
    let keys: Vec<&str> = INCOME_BRACKETS
        .iter()
        .filter(|b| range.overlaps(b.min, b.max))
        .map(|b| b.key)
        .collect();

    rows.iter()
        .map(|row| {
            let percent: f64 = keys.iter().filter_map(|k| row.brackets.get(*k)).sum();
            (row.geoid.clone(), percent / 100.0)
        })
        .collect()
}

/// Fraction of each tract's residents of any of the selected genders.
///
/// Unrecognized gender names and missing shares count as 0; repeated
/// names are counted once.
#[must_use]
pub fn calculate_gender_percentages<S: AsRef<str>>(
    rows: &[GenderRow],
    genders: &[S],
) -> BTreeMap<Geoid, f64> {
    let selected: BTreeSet<&'static str> = genders
        .iter()
        .filter_map(|g| resilience_map_scoring_models::canonical_gender(g.as_ref()))
        .collect();

    rows.iter()
        .map(|row| {
            let percent: f64 = selected.iter().filter_map(|g| row.share(g)).sum();
            (row.geoid.clone(), percent / 100.0)
        })
        .collect()
}

/// Keeps the zones whose rent lies in `range`, using the embedded
/// watched-zone list. See [`filter_zones_by_rent_with`].
///
/// # Panics
///
/// Panics if the embedded watched-zone table fails to parse.
#[must_use]
pub fn filter_zones_by_rent(zones: Vec<ZoneRecord>, range: &ValueRange<f64>) -> Vec<ZoneRecord> {
    filter_zones_by_rent_with(zones, range, registry::watched_geoids())
}

/// Keeps the zones whose rent lies in `range`, bounds included.
///
/// Zones without rent data are always kept, as are zones in `watched`
/// whatever their rent.
#[must_use]
pub fn filter_zones_by_rent_with(
    zones: Vec<ZoneRecord>,
    range: &ValueRange<f64>,
    watched: &BTreeSet<Geoid>,
) -> Vec<ZoneRecord> {
    zones
        .into_iter()
        .filter(|zone| {
            zone.rent.is_none_or(|rent| range.contains(rent)) || watched.contains(&zone.geoid)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geoid(s: &str) -> Geoid {
        Geoid::parse(s).unwrap()
    }

    fn age_row(id: &str, under_5: f64, age_25_29: f64, age_65_plus: f64) -> AgeRow {
        AgeRow {
            geoid: geoid(id),
            under_5: Some(under_5),
            age_25_29: Some(age_25_29),
            age_65_plus: Some(age_65_plus),
        }
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn age_partial_overlap_counts_whole_bracket() {
        let rows = [age_row("36061000100", 5.0, 12.0, 20.0)];
        let result = calculate_age_percentages(&rows, &ValueRange::new(20, 30).unwrap());
        assert_close(result[&geoid("36061000100")], 0.12);
    }

    #[test]
    fn age_wide_range_sums_all_brackets() {
        let rows = [age_row("36061000100", 5.0, 12.0, 20.0)];
        let result = calculate_age_percentages(&rows, &ValueRange::new(0, 100).unwrap());
        assert_close(result[&geoid("36061000100")], 0.37);
    }

    #[test]
    fn age_gap_between_brackets_matches_nothing() {
        let rows = [age_row("36061000100", 5.0, 12.0, 20.0)];
        let result = calculate_age_percentages(&rows, &ValueRange::new(35, 50).unwrap());
        assert_close(result[&geoid("36061000100")], 0.0);
    }

    #[test]
    fn age_bounds_are_inclusive() {
        let rows = [age_row("36061000100", 5.0, 12.0, 20.0)];
        let at_four = calculate_age_percentages(&rows, &ValueRange::new(4, 10).unwrap());
        let at_sixty_five = calculate_age_percentages(&rows, &ValueRange::new(50, 65).unwrap());
        assert_close(at_four[&geoid("36061000100")], 0.05);
        assert_close(at_sixty_five[&geoid("36061000100")], 0.20);
    }

    #[test]
    fn age_is_not_clamped_and_missing_is_zero() {
        let rows = [
            age_row("36061000100", 60.0, 50.0, 40.0),
            AgeRow {
                geoid: geoid("36061000200"),
                under_5: None,
                age_25_29: Some(10.0),
                age_65_plus: None,
            },
        ];
        let result = calculate_age_percentages(&rows, &ValueRange::new(0, 120).unwrap());
        assert_close(result[&geoid("36061000100")], 1.5);
        assert_close(result[&geoid("36061000200")], 0.1);
    }

    #[test]
    fn ethnicity_fraction_of_total() {
        let rows = [
            DemographicRow {
                geoid: geoid("36047000100"),
                total_population: Some(1000.0),
                counts: BTreeMap::from([
                    ("mexican".to_string(), 150.0),
                    ("dominican".to_string(), 100.0),
                    ("european".to_string(), 500.0),
                ]),
            },
            DemographicRow {
                geoid: geoid("36047000200"),
                total_population: Some(0.0),
                counts: BTreeMap::from([("mexican".to_string(), 10.0)]),
            },
            DemographicRow {
                geoid: geoid("36047000300"),
                total_population: None,
                counts: BTreeMap::from([("mexican".to_string(), 10.0)]),
            },
        ];

        let result = calculate_ethnicity_percentages(&rows, &["mexican", "dominican", "caribbean"]);
        assert_close(result[&geoid("36047000100")], 0.25);
        assert_close(result[&geoid("36047000200")], 0.0);
        assert_close(result[&geoid("36047000300")], 0.0);
    }

    #[test]
    fn income_brackets_overlap() {
        let rows = [IncomeRow {
            geoid: geoid("36005000100"),
            brackets: BTreeMap::from([
                ("under_25k".to_string(), 30.0),
                ("25k_50k".to_string(), 25.0),
                ("50k_75k".to_string(), 20.0),
                ("150k_plus".to_string(), 5.0),
            ]),
        }];
        let result =
            calculate_income_percentages(&rows, &ValueRange::new(40_000.0, 60_000.0).unwrap());
        assert_close(result[&geoid("36005000100")], 0.45);

        let rich =
            calculate_income_percentages(&rows, &ValueRange::new(200_000.0, 500_000.0).unwrap());
        assert_close(rich[&geoid("36005000100")], 0.05);
    }

    #[test]
    fn gender_selected_shares() {
        let rows = [GenderRow {
            geoid: geoid("36081000100"),
            male: Some(48.0),
            female: Some(50.0),
            other: Some(2.0),
        }];
        let result = calculate_gender_percentages(&rows, &["Female", "women", "other", "alien"]);
        assert_close(result[&geoid("36081000100")], 0.52);
        let none = calculate_gender_percentages::<&str>(&rows, &[]);
        assert_close(none[&geoid("36081000100")], 0.0);
    }

    #[test]
    fn rent_filter_keeps_in_range_watched_and_missing() {
        let watched = registry::watched_zones()[0].geoid.clone();
        let zones = vec![
            ZoneRecord::new(geoid("36061000100")).with_rent(Some(1500.0)),
            ZoneRecord::new(geoid("36061000200")).with_rent(Some(3000.0)),
            ZoneRecord::new(watched.clone()).with_rent(Some(4000.0)),
            ZoneRecord::new(geoid("36061000400")).with_rent(None),
        ];

        let kept = filter_zones_by_rent(zones, &ValueRange::new(1000.0, 2000.0).unwrap());
        let ids: Vec<&str> = kept.iter().map(|z| z.geoid.as_str()).collect();
        assert_eq!(ids, ["36061000100", watched.as_str(), "36061000400"]);
    }

    #[test]
    fn rent_filter_bounds_inclusive() {
        let zones = vec![
            ZoneRecord::new(geoid("36061000100")).with_rent(Some(1000.0)),
            ZoneRecord::new(geoid("36061000200")).with_rent(Some(2000.0)),
            ZoneRecord::new(geoid("36061000300")).with_rent(Some(2000.01)),
        ];
        let kept = filter_zones_by_rent_with(
            zones,
            &ValueRange::new(1000.0, 2000.0).unwrap(),
            &BTreeSet::new(),
        );
        assert_eq!(kept.len(), 2);
    }
}
