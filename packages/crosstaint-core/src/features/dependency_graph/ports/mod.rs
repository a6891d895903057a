//! Dependency graph ports

use crate::features::dependency_graph::domain::LevelSet;
use crate::shared::models::{NetDirection, ProgramId, SourceLocation};

/// Source of level-sets for network call sites
///
/// Implemented by the network-level correlator; the graph builder only needs
/// the lookup.
pub trait LevelLookup {
    /// Level-set of the `direction` call site of `program` at `location`
    /// (empty if the location was never indexed)
    fn node_levels(
        &self,
        program: ProgramId,
        direction: NetDirection,
        location: &SourceLocation,
    ) -> LevelSet;
}

/// Lookup that knows no levels; network nodes built with it never link
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLevels;

impl LevelLookup for NoLevels {
    fn node_levels(&self, _: ProgramId, _: NetDirection, _: &SourceLocation) -> LevelSet {
        LevelSet::new()
    }
}
