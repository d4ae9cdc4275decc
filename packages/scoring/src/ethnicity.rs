//! Resolution of free-form ethnicity terms to dataset values.
//!
//! The assistant and the search box produce terms like `"Latino"`,
//! `"asian"`, or `"Puerto-Rican"`. Each term is reduced to a clean key
//! (lowercase ASCII letters only) and matched against the group alias
//! table and the taxonomy labels and values.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use crate::registry;

static GROUP_MEMBERS: LazyLock<BTreeMap<String, Vec<String>>> = LazyLock::new(build_groups);

/// Lowercases `term` and strips everything that is not an ASCII letter.
#[must_use]
pub fn clean_key(term: &str) -> String {
    term.chars()
        .filter(char::is_ascii_alphabetic)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

fn build_groups() -> BTreeMap<String, Vec<String>> {
    let definitions = registry::groups();
    let mut groups = BTreeMap::new();

    for name in &definitions.parent_groups {
        let members = registry::leaves()
            .filter(|leaf| leaf.parent_group() == Some(name.as_str()))
            .map(|leaf| leaf.value.clone())
            .collect();
        groups.insert(name.clone(), members);
    }

    for (name, phrases) in &definitions.label_groups {
        let phrases: Vec<String> = phrases.iter().map(|p| p.to_lowercase()).collect();
        let members = registry::leaves()
            .filter(|leaf| {
                let label = leaf.label.to_lowercase();
                phrases.iter().any(|p| label.contains(p.as_str()))
            })
            .map(|leaf| leaf.value.clone())
            .collect();
        groups.insert(name.clone(), members);
    }

    groups
}

/// Returns the fixed ethnicity groups and their member leaf values.
///
/// `asian`, `black`, `white`, and `hispanic` contain the leaves under the
/// matching taxonomy group. `middleeastern`, `southasian`,
/// `nativeamerican`, and `pacificislander` contain the leaves whose label
/// contains one of the group's phrases, so a leaf may belong to more than
/// one group (e.g. South Asian is in both `asian` and `southasian`).
///
/// # Panics
///
/// Panics if the embedded reference tables fail to parse.
#[must_use]
pub fn ethnicity_groups() -> &'static BTreeMap<String, Vec<String>> {
    &GROUP_MEMBERS
}

/// Group names whose alias list contains `key`.
fn alias_groups(key: &str) -> Vec<&'static str> {
    registry::groups()
        .aliases
        .iter()
        .filter(|(_, synonyms)| synonyms.iter().any(|s| s == key))
        .map(|(group, _)| group.as_str())
        .collect()
}

/// Expands free-form ethnicity terms into the taxonomy values they refer
/// to.
///
/// Every taxonomy entry, group nodes included, is checked against each
/// term's clean key. An entry matches when its parent group (with the
/// `group_` prefix stripped) is one the key names through the alias
/// table, when its cleaned label contains the key, or when its value
/// equals the key. Alias-only groups with no taxonomy parent, such as
/// `nativeamerican`, therefore contribute nothing through the alias
/// step. Terms that match nothing, including ones with no letters at
/// all, contribute nothing. The result is deduplicated and sorted.
///
/// # Panics
///
/// Panics if the embedded reference tables fail to parse.
#[must_use]
pub fn resolve_ethnicities<S: AsRef<str>>(raw_terms: &[S]) -> Vec<String> {
    let mut resolved = BTreeSet::new();

    for term in raw_terms {
        let key = clean_key(term.as_ref());
        if key.is_empty() {
            continue;
        }

        let matched_groups = alias_groups(&key);
        let mut matched = false;

        for entry in registry::taxonomy() {
            let in_group = entry
                .parent_group()
                .is_some_and(|group| matched_groups.contains(&group));

            if in_group || clean_key(&entry.label).contains(&key) || entry.value == key {
                resolved.insert(entry.value.clone());
                matched = true;
            }
        }

        if !matched {
            log::debug!("Ethnicity term '{}' matched nothing", term.as_ref());
        }
    }

    resolved.into_iter().collect()
}
