//! Cross-Program Analysis Service
//!
//! Wires the whole engine for one pair of programs and produces the report.
//!
//! # Architecture
//! ```text
//! ProgramFrontEnd + AliasOracle + EngineConfig
//!       ↓
//! NetworkLevelCorrelator ── InputClassifier
//!       ↓                        ↓
//! GraphBuilder (DependencyGraph + Input nodes)
//!       ↓
//! ReachabilityEngine (local / network / cross passes)
//!       ↓
//! AnalysisReport
//! ```
//!
//! # Usage
//! ```rust,ignore
//! use crosstaint_core::{AnalysisService, EngineConfig};
//!
//! let service = AnalysisService::new(EngineConfig::from_yaml("crosstaint.yaml")?)?;
//! let outcome = service.analyze(&module, &partition)?;
//! println!("{}", outcome.report.to_json()?);
//! ```
//!
//! # Counting
//! Per program P, with Q the other program:
//! - local: P's local inputs, fresh visited set
//! - network: P's network inputs, same visited set (so exclusive of local)
//! - cross: every input of Q, only Mem nodes outside Q, separate visited set
//! - false positive: network count minus the part of it also reached by cross

use std::time::Instant;

use tracing::{debug, info};

use crate::config::{EngineConfig, Validatable};
use crate::errors::Result;
use crate::features::dependency_graph::{BuildContext, DependencyGraph, GraphBuilder, InputOrigin, NodeId};
use crate::features::input_classification::{InputClassifier, InputScope, InputSets};
use crate::features::network_levels::NetworkLevelCorrelator;
use crate::features::reachability::domain::{
    AnalysisReport, BoundCheckCount, Category, CategoryCounts, ProgramReport, ReachabilityError, ReportedPath,
    VisitedSet,
};
use crate::features::reachability::infrastructure::ReachabilityEngine;
use crate::shared::models::ProgramId;
use crate::shared::ports::{AliasOracle, ProgramFrontEnd};

/// Everything one analysis run produced
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub graph: DependencyGraph,
    pub inputs: InputSets,
    pub report: AnalysisReport,
}

pub struct AnalysisService {
    config: EngineConfig,
}

impl AnalysisService {
    /// Service for a validated configuration
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Build the graph for both programs and run every counting pass
    pub fn analyze(&self, front_end: &dyn ProgramFrontEnd, oracle: &dyn AliasOracle) -> Result<AnalysisOutcome> {
        let start = Instant::now();

        let correlator = NetworkLevelCorrelator::build(front_end, &self.config.naming);
        let classifier = InputClassifier::new(&self.config.naming, &self.config.inputs)?;
        let inputs = classifier.classify_all(front_end);

        let graph = self.build_graph(front_end, oracle, &correlator, &inputs)?;
        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "graph ready for counting"
        );

        let report = self.report(&graph, &inputs)?;
        info!(
            nodes = report.graph.nodes,
            cross_program_edges = report.graph.cross_program_edges,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "cross-program analysis finished"
        );

        Ok(AnalysisOutcome { graph, inputs, report })
    }

    fn build_graph(
        &self,
        front_end: &dyn ProgramFrontEnd,
        oracle: &dyn AliasOracle,
        correlator: &NetworkLevelCorrelator,
        inputs: &InputSets,
    ) -> Result<DependencyGraph> {
        let mut graph = DependencyGraph::new();
        let ctx = BuildContext {
            front_end,
            oracle,
            naming: &self.config.naming,
            config: &self.config.graph,
            levels: correlator,
        };

        let mut builder = GraphBuilder::new(&mut graph, ctx);
        let operations = builder.build_all()?;
        let spliced = if self.config.graph.splice_calls {
            builder.splice_known_calls()?
        } else {
            0
        };
        let input_nodes = builder.add_inputs(inputs)?;
        debug!(operations, spliced, input_nodes, "graph construction finished");

        Ok(graph)
    }

    /// Run the counting passes of both programs over a built graph
    pub fn report(&self, graph: &DependencyGraph, inputs: &InputSets) -> Result<AnalysisReport> {
        let mut engine = ReachabilityEngine::new(graph, &self.config.reachability);
        let mut programs = Vec::with_capacity(ProgramId::ALL.len());
        for program in ProgramId::ALL {
            programs.push(self.program_report(&mut engine, inputs, program)?);
        }
        Ok(AnalysisReport {
            programs,
            graph: graph.get_stats(),
        })
    }

    fn program_report(
        &self,
        engine: &mut ReachabilityEngine<'_>,
        inputs: &InputSets,
        program: ProgramId,
    ) -> Result<ProgramReport> {
        let graph = engine.graph();
        let local_sources = source_nodes(graph, inputs, program, InputScope::Local);
        let network_sources = source_nodes(graph, inputs, program, InputScope::Network);
        let other = program.other();
        let cross_sources = source_nodes(graph, inputs, other, InputScope::All);

        let mut visited = VisitedSet::new();
        let local = engine.count_reachable_bound_checks(&local_sources, false, program, &mut visited);
        let network = engine.count_reachable_bound_checks(&network_sources, false, program, &mut visited);
        let cross = engine.count_reachable_bound_checks(&cross_sources, true, other, &mut VisitedSet::new());

        // Only memory counted by both passes is attributable, so the difference
        // stays non-negative even when the cross count exceeds the network one.
        // A failed subtraction means the passes disagree about node counts.
        let attributable = engine.total_count(network.counted.intersection(&cross.counted));
        let false_positive = network
            .count
            .checked_sub(attributable)
            .ok_or(ReachabilityError::NegativeFalsePositive {
                program,
                network: network.count,
                cross: attributable,
            })?;

        let counts = CategoryCounts {
            local: local.count,
            network: network.count,
            cross: cross.count,
            false_positive,
        };
        info!(
            %program,
            local = counts.local,
            network = counts.network,
            cross = counts.cross,
            false_positive = counts.false_positive,
            "vulnerability counts"
        );

        let mut paths = Vec::new();
        for (category, pass) in [(Category::Local, &local), (Category::Network, &network), (Category::Cross, &cross)] {
            paths.extend(reported_paths(engine, category, pass));
        }

        Ok(ProgramReport {
            program,
            array_count: graph.array_count(program),
            counts,
            paths,
        })
    }
}

/// Input nodes of `program`'s records in `scope`
fn source_nodes(graph: &DependencyGraph, inputs: &InputSets, program: ProgramId, scope: InputScope) -> Vec<NodeId> {
    inputs
        .records(program, scope)
        .filter_map(|record| {
            let origin = if record.is_network {
                InputOrigin::Network
            } else {
                InputOrigin::Local
            };
            graph.find_input(record.value, origin)
        })
        .collect()
}

fn reported_paths<'a>(
    engine: &'a ReachabilityEngine<'_>,
    category: Category,
    pass: &'a BoundCheckCount,
) -> impl Iterator<Item = ReportedPath> + 'a {
    pass.paths.iter().map(move |path| ReportedPath {
        category,
        labels: engine.labels(path),
    })
}
