//! Engine configuration
//!
//! - `naming`: the name conventions of the front-end boundary
//! - `engine_config`: graph, input and reachability settings plus YAML I/O
//! - `validation`: the `Validatable` trait every section implements

pub mod engine_config;
pub mod error;
pub mod naming;
pub mod validation;

// Re-exports
pub use engine_config::{EngineConfig, GraphConfig, InputConfig, ReachabilityConfig};
pub use error::{ConfigError, ConfigResult};
pub use naming::{CompiledNaming, NamingConvention, ProgramNaming};
pub use validation::Validatable;
