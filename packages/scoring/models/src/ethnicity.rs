//! Ethnicity taxonomy nodes.

use serde::{Deserialize, Serialize};

/// Prefix carried by the `value` of every top-level group node.
pub const GROUP_PREFIX: &str = "group_";

/// A node of the two-level ethnicity taxonomy.
///
/// Group nodes have no parent and a `group_`-prefixed value. Leaf nodes
/// name their group in `parent`; their `value` is the key used in
/// [`crate::DemographicRow::counts`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EthnicityEntry {
    /// Stable key for UI lists.
    pub key: String,
    /// Display label.
    pub label: String,
    /// Dataset identifier.
    pub value: String,
    /// Value of the parent group, for leaves.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
}

impl EthnicityEntry {
    /// Whether this node is a top-level group.
    #[must_use]
    pub const fn is_group(&self) -> bool {
        self.parent.is_none()
    }

    /// Parent group name with the `group_` prefix stripped
    /// (e.g. `"asian"` for `"group_asian"`).
    #[must_use]
    pub fn parent_group(&self) -> Option<&str> {
        self.parent
            .as_deref()
            .map(|p| p.strip_prefix(GROUP_PREFIX).unwrap_or(p))
    }
}
