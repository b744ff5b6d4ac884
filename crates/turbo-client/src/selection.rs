//! Capability selection masks.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::capability::CapabilityDefinition;
use crate::error::BuildError;

/// Which capability groups a client exposes.
///
/// A group is exposed only when it is marked `true`. Absent and `false`
/// entries both hide it, so an empty selection exposes nothing. A client
/// built without any selection exposes every merged group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapabilitySelection {
    groups: BTreeMap<String, bool>,
}

impl CapabilitySelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a group as enabled.
    pub fn enable(mut self, group: impl Into<String>) -> Self {
        self.groups.insert(group.into(), true);
        self
    }

    /// Mark a group as explicitly disabled.
    pub fn disable(mut self, group: impl Into<String>) -> Self {
        self.groups.insert(group.into(), false);
        self
    }

    pub fn with(mut self, group: impl Into<String>, enabled: bool) -> Self {
        self.groups.insert(group.into(), enabled);
        self
    }

    /// Whether no entries were given.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Whether `group` survives this selection.
    pub fn is_enabled(&self, group: &str) -> bool {
        self.groups.get(group).copied().unwrap_or(false)
    }

    /// Groups explicitly enabled.
    pub fn enabled_groups(&self) -> impl Iterator<Item = &str> {
        self.groups
            .iter()
            .filter(|(_, enabled)| **enabled)
            .map(|(group, _)| group.as_str())
    }
}

impl<S: Into<String>> FromIterator<(S, bool)> for CapabilitySelection {
    fn from_iter<I: IntoIterator<Item = (S, bool)>>(iter: I) -> Self {
        Self {
            groups: iter.into_iter().map(|(g, e)| (g.into(), e)).collect(),
        }
    }
}

/// Restrict a merged tree to the groups `selection` enables.
///
/// Enabling a group that no provider implements is an error; disabling one
/// is ignored.
pub fn select(
    tree: CapabilityDefinition,
    selection: &CapabilitySelection,
) -> Result<CapabilityDefinition, BuildError> {
    if let Some(missing) = selection
        .enabled_groups()
        .find(|group| !tree.contains_group(group))
    {
        return Err(BuildError::UnknownCapability(missing.to_string()));
    }

    let groups = tree
        .into_groups()
        .into_iter()
        .filter(|(group, _)| selection.is_enabled(group))
        .collect();
    Ok(CapabilityDefinition::from_groups(groups))
}
