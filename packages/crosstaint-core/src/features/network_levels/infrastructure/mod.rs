pub mod correlator;
pub mod level_graph;

pub use correlator::NetworkLevelCorrelator;
pub use level_graph::{compute_levels, LevelGraph};
