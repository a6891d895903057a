pub mod engine;

pub use engine::{NearestSource, ReachabilityEngine};
