//! Graph construction helpers

use crosstaint_core::config::EngineConfig;
use crosstaint_core::features::alias_analysis::AliasPartition;
use crosstaint_core::features::dependency_graph::{BuildContext, DependencyGraph, GraphBuilder};
use crosstaint_core::features::input_classification::{InputClassifier, InputSets};
use crosstaint_core::features::network_levels::NetworkLevelCorrelator;
use crosstaint_core::shared::models::ProgramModule;

/// Build the graph of `module` the way the analysis service does
pub fn build_graph(module: &ProgramModule, partition: &AliasPartition, config: &EngineConfig) -> (DependencyGraph, InputSets) {
    let correlator = NetworkLevelCorrelator::build(module, &config.naming);
    let inputs = InputClassifier::new(&config.naming, &config.inputs)
        .expect("default naming compiles")
        .classify_all(module);

    let mut graph = DependencyGraph::new();
    let ctx = BuildContext {
        front_end: module,
        oracle: partition,
        naming: &config.naming,
        config: &config.graph,
        levels: &correlator,
    };
    let mut builder = GraphBuilder::new(&mut graph, ctx);
    builder.build_all().expect("graph fits the arena");
    builder.add_inputs(&inputs).expect("graph fits the arena");
    (graph, inputs)
}
