//! Compile-time reference tables.
//!
//! The ethnicity taxonomy, group definitions, and watched-zone list are
//! TOML files in `data/`, embedded via `include_str!` and parsed once on
//! first use. They are read-only for the life of the process.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use resilience_map_scoring_models::{EthnicityEntry, Geoid};
use serde::Deserialize;

const ETHNICITIES_TOML: &str = include_str!("../data/ethnicities.toml");
const GROUPS_TOML: &str = include_str!("../data/groups.toml");
const WATCHED_ZONES_TOML: &str = include_str!("../data/watched_zones.toml");

#[derive(Deserialize)]
struct TaxonomyFile {
    entries: Vec<EthnicityEntry>,
}

/// Named ethnicity groups and the synonyms that refer to them.
#[derive(Debug, Deserialize)]
pub struct GroupDefinitions {
    /// Groups defined by taxonomy parent (`group_<name>`).
    pub parent_groups: Vec<String>,
    /// Groups defined by label phrases.
    pub label_groups: BTreeMap<String, Vec<String>>,
    /// Cleaned synonyms per group name.
    pub aliases: BTreeMap<String, Vec<String>>,
}

/// A tract that always passes the rent filter.
#[derive(Debug, Clone, Deserialize)]
pub struct WatchedZone {
    /// Tract identifier.
    pub geoid: Geoid,
    /// Why the tract is watched.
    pub name: String,
}

#[derive(Deserialize)]
struct WatchedZonesFile {
    zones: Vec<WatchedZone>,
}

fn parse<T: for<'de> Deserialize<'de>>(name: &str, content: &str) -> T {
    toml::de::from_str(content)
        .unwrap_or_else(|e| panic!("Failed to parse embedded table '{name}': {e}"))
}

static TAXONOMY: LazyLock<Vec<EthnicityEntry>> =
    LazyLock::new(|| parse::<TaxonomyFile>("ethnicities", ETHNICITIES_TOML).entries);

static GROUPS: LazyLock<GroupDefinitions> = LazyLock::new(|| parse("groups", GROUPS_TOML));

static WATCHED_ZONES: LazyLock<Vec<WatchedZone>> =
    LazyLock::new(|| parse::<WatchedZonesFile>("watched_zones", WATCHED_ZONES_TOML).zones);

static WATCHED_GEOIDS: LazyLock<BTreeSet<Geoid>> =
    LazyLock::new(|| WATCHED_ZONES.iter().map(|z| z.geoid.clone()).collect());

/// Returns every taxonomy node, groups and leaves, in file order.
///
/// # Panics
///
/// Panics if the embedded TOML fails to parse. The file is a compile-time
/// constant, so this indicates a development error and is caught by the
/// tests below.
#[must_use]
pub fn taxonomy() -> &'static [EthnicityEntry] {
    &TAXONOMY
}

/// Returns the leaf nodes of the taxonomy.
///
/// # Panics
///
/// See [`taxonomy`].
pub fn leaves() -> impl Iterator<Item = &'static EthnicityEntry> {
    TAXONOMY.iter().filter(|e| !e.is_group())
}

/// Finds a taxonomy node by its `value`.
///
/// # Panics
///
/// See [`taxonomy`].
#[must_use]
pub fn find(value: &str) -> Option<&'static EthnicityEntry> {
    TAXONOMY.iter().find(|e| e.value == value)
}

/// Returns the group definitions and alias lists.
///
/// # Panics
///
/// Panics if the embedded TOML fails to parse.
#[must_use]
pub fn groups() -> &'static GroupDefinitions {
    &GROUPS
}

/// Returns the watched zones.
///
/// # Panics
///
/// Panics if the embedded TOML fails to parse.
#[must_use]
pub fn watched_zones() -> &'static [WatchedZone] {
    &WATCHED_ZONES
}

/// Returns the GEOIDs of the watched zones.
///
/// # Panics
///
/// Panics if the embedded TOML fails to parse.
#[must_use]
pub fn watched_geoids() -> &'static BTreeSet<Geoid> {
    &WATCHED_GEOIDS
}
