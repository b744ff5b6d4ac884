//! Capability trees and merging.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{BuildError, Conflict};
use crate::pipeline::{BoundProcedure, ErasedProcedure};
use crate::procedure::{Procedure, ProcedurePath};

/// Operations of one capability group, keyed by operation name.
pub type Operations = BTreeMap<String, Arc<dyn ErasedProcedure>>;

/// Mapping of capability group → operation → procedure.
///
/// Every leaf remembers which provider contributed it.
#[derive(Clone, Default)]
pub struct CapabilityDefinition {
    groups: BTreeMap<String, Operations>,
}

impl CapabilityDefinition {
    /// Start a definition contributed by `provider`.
    pub fn builder(provider: impl Into<String>) -> DefinitionBuilder {
        DefinitionBuilder {
            provider: provider.into(),
            procedures: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Group names, sorted.
    pub fn groups(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(|g| g.as_str())
    }

    /// Operations of a group.
    pub fn group(&self, name: &str) -> Option<&Operations> {
        self.groups.get(name)
    }

    pub fn contains_group(&self, name: &str) -> bool {
        self.groups.contains_key(name)
    }

    pub fn contains(&self, group: &str, operation: &str) -> bool {
        self.groups
            .get(group)
            .map_or(false, |ops| ops.contains_key(operation))
    }

    /// Every `group.operation` path, sorted.
    pub fn paths(&self) -> Vec<ProcedurePath> {
        self.groups
            .iter()
            .flat_map(|(group, ops)| ops.keys().map(move |op| ProcedurePath::new(group, op)))
            .collect()
    }

    /// Every leaf procedure, in path order.
    pub fn procedures(&self) -> impl Iterator<Item = &Arc<dyn ErasedProcedure>> {
        self.groups.values().flat_map(|ops| ops.values())
    }

    /// Number of operations across all groups.
    pub fn len(&self) -> usize {
        self.groups.values().map(|ops| ops.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn into_groups(self) -> BTreeMap<String, Operations> {
        self.groups
    }

    pub(crate) fn from_groups(groups: BTreeMap<String, Operations>) -> Self {
        Self { groups }
    }
}

impl fmt::Debug for CapabilityDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (group, ops) in &self.groups {
            let leaves: Vec<String> = ops
                .iter()
                .map(|(op, p)| format!("{} ({})", op, p.provider()))
                .collect();
            map.entry(group, &leaves);
        }
        map.finish()
    }
}

/// Collects one provider's procedures into a [`CapabilityDefinition`].
pub struct DefinitionBuilder {
    provider: String,
    procedures: Vec<Arc<dyn ErasedProcedure>>,
    errors: Vec<BuildError>,
}

impl DefinitionBuilder {
    /// Register `procedure` at `group.operation`.
    pub fn procedure<P: Procedure>(
        mut self,
        group: impl Into<String>,
        operation: impl Into<String>,
        procedure: P,
    ) -> Self {
        let path = ProcedurePath::new(group, operation);
        match BoundProcedure::new(self.provider.clone(), path, procedure) {
            Ok(bound) => self.procedures.push(Arc::new(bound)),
            Err(e) => self.errors.push(e),
        }
        self
    }

    /// Finish the definition. Registering one path twice is a conflict, and
    /// a procedure whose schemas could not be built fails the definition.
    pub fn build(self) -> Result<CapabilityDefinition, BuildError> {
        if let Some(error) = self.errors.into_iter().next() {
            return Err(error);
        }

        let mut accumulator = Merger::default();
        for procedure in self.procedures {
            accumulator.insert(procedure);
        }
        accumulator.finish()
    }
}

/// Merge contributed definitions into one tree.
///
/// Fails with every conflicting path if any `group.operation` is contributed
/// more than once. Conflicts are listed in contribution order.
pub fn merge<I>(definitions: I) -> Result<CapabilityDefinition, BuildError>
where
    I: IntoIterator<Item = CapabilityDefinition>,
{
    let mut accumulator = Merger::default();
    for definition in definitions {
        for (_, operations) in definition.groups {
            for (_, procedure) in operations {
                accumulator.insert(procedure);
            }
        }
    }
    accumulator.finish()
}

#[derive(Default)]
struct Merger {
    groups: BTreeMap<String, Operations>,
    conflicts: Vec<Conflict>,
}

impl Merger {
    fn insert(&mut self, procedure: Arc<dyn ErasedProcedure>) {
        let path = procedure.path().clone();
        let operations = self.groups.entry(path.group.clone()).or_default();

        match operations.entry(path.operation.clone()) {
            Entry::Occupied(existing) => self.conflicts.push(Conflict {
                group: path.group,
                operation: path.operation,
                first: existing.get().provider().to_string(),
                second: procedure.provider().to_string(),
            }),
            Entry::Vacant(slot) => {
                slot.insert(procedure);
            }
        }
    }

    fn finish(self) -> Result<CapabilityDefinition, BuildError> {
        if self.conflicts.is_empty() {
            Ok(CapabilityDefinition {
                groups: self.groups,
            })
        } else {
            Err(BuildError::CapabilityConflict(self.conflicts))
        }
    }
}
