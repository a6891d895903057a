//! Network level correlator
//!
//! Approximates which send of one program answers which recv of the other by
//! assuming both ends call their primitives in a similarly layered order.
//! The pairing is a heuristic: textually similar but unrelated call orders
//! can over- or under-connect the two programs.

use super::level_graph::LevelGraph;
use crate::config::NamingConvention;
use crate::features::dependency_graph::domain::LevelSet;
use crate::features::dependency_graph::ports::LevelLookup;
use crate::features::network_levels::domain::{FunctionLevels, LevelVertex, ProgramStructure};
use crate::shared::models::{FunctionBody, NetDirection, ProgramId, SourceLocation};
use crate::shared::ports::ProgramFrontEnd;
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct NetworkLevelCorrelator {
    structures: BTreeMap<(ProgramId, NetDirection), ProgramStructure>,
}

impl NetworkLevelCorrelator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Levels for every function of both programs
    pub fn build(front_end: &dyn ProgramFrontEnd, naming: &NamingConvention) -> Self {
        let mut correlator = Self::new();
        for function in front_end.functions() {
            correlator.add_function(function, naming);
        }
        correlator
    }

    /// Compute one function's levels in both directions and index its call
    /// sites; functions without calls of a direction are skipped for it
    pub fn add_function(&mut self, function: &FunctionBody, naming: &NamingConvention) {
        for direction in NetDirection::ALL {
            let level_graph = LevelGraph::build(function, direction, naming);
            if level_graph.call_count() == 0 {
                continue;
            }

            let levels = level_graph.compute_levels();
            let structure = self
                .structures
                .entry((function.program, direction))
                .or_default();

            let mut resolved = Vec::with_capacity(levels.len());
            for (depth, level) in levels.iter().enumerate() {
                let mut vertices = Vec::with_capacity(level.len());
                for vertex in level {
                    let weight = &level_graph.graph[*vertex];
                    if let LevelVertex::Call {
                        location: Some(location),
                        ..
                    } = weight
                    {
                        structure
                            .index
                            .entry(location.clone())
                            .or_default()
                            .insert(depth as u32);
                    }
                    vertices.push(weight.clone());
                }
                resolved.push(vertices);
            }

            debug!(
                function = %function.name,
                program = %function.program,
                direction = direction.as_str(),
                levels = resolved.len(),
                "network levels computed"
            );
            structure.functions.push(FunctionLevels {
                function: function.name.clone(),
                levels: resolved,
            });
        }
    }

    pub fn structure(&self, program: ProgramId, direction: NetDirection) -> Option<&ProgramStructure> {
        self.structures.get(&(program, direction))
    }

    /// Levels at which the call site at `file:line` was observed
    pub fn get_node_levels(
        &self,
        program: ProgramId,
        direction: NetDirection,
        file: &str,
        line: u32,
    ) -> LevelSet {
        self.node_levels(program, direction, &SourceLocation::new(file, line))
    }
}

impl LevelLookup for NetworkLevelCorrelator {
    fn node_levels(
        &self,
        program: ProgramId,
        direction: NetDirection,
        location: &SourceLocation,
    ) -> LevelSet {
        self.structure(program, direction)
            .and_then(|s| s.levels_at(location))
            .cloned()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::models::BlockLayout;

    fn loc(file: &str, line: u32) -> SourceLocation {
        SourceLocation::new(file, line)
    }

    #[test]
    fn test_levels_indexed_by_location() {
        let naming = NamingConvention::default();
        let mut correlator = NetworkLevelCorrelator::new();
        correlator.add_function(
            &FunctionBody::new("main", ProgramId::First).with_block(
                BlockLayout::new(0)
                    .with_call("send", loc("c.c", 5))
                    .with_call("recv", loc("c.c", 6))
                    .with_call("send", loc("c.c", 7)),
            ),
            &naming,
        );

        let send5 = correlator.get_node_levels(ProgramId::First, NetDirection::Send, "c.c", 5);
        let send7 = correlator.get_node_levels(ProgramId::First, NetDirection::Send, "c.c", 7);
        let recv6 = correlator.get_node_levels(ProgramId::First, NetDirection::Recv, "c.c", 6);
        assert_eq!(send5, [1].into_iter().collect());
        assert_eq!(send7, [2].into_iter().collect());
        assert_eq!(recv6, [1].into_iter().collect());
        assert!(correlator
            .get_node_levels(ProgramId::Second, NetDirection::Send, "c.c", 5)
            .is_empty());
    }

    #[test]
    fn test_location_seen_at_several_levels() {
        let naming = NamingConvention::default();
        let shared = loc("d.c", 40);
        let mut correlator = NetworkLevelCorrelator::new();
        correlator.add_function(
            &FunctionBody::new("P2_a", ProgramId::Second)
                .with_block(BlockLayout::new(0).with_call("SEND", shared.clone())),
            &naming,
        );
        correlator.add_function(
            &FunctionBody::new("P2_b", ProgramId::Second).with_block(
                BlockLayout::new(0)
                    .with_call("SEND", loc("d.c", 39))
                    .with_call("SEND", shared.clone()),
            ),
            &naming,
        );

        let levels = correlator.node_levels(ProgramId::Second, NetDirection::Send, &shared);
        assert_eq!(levels, [1, 2].into_iter().collect());
        let structure = correlator.structure(ProgramId::Second, NetDirection::Send).unwrap();
        assert_eq!(structure.functions.len(), 2);
    }

    #[test]
    fn test_functions_without_calls_skipped() {
        let naming = NamingConvention::default();
        let mut correlator = NetworkLevelCorrelator::new();
        correlator.add_function(
            &FunctionBody::new("helper", ProgramId::First)
                .with_block(BlockLayout::new(0).with_call("memcpy", loc("c.c", 1))),
            &naming,
        );
        assert!(correlator.structure(ProgramId::First, NetDirection::Send).is_none());
        assert!(correlator.structure(ProgramId::First, NetDirection::Recv).is_none());
    }
}
