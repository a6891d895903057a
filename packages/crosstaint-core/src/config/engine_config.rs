//! Engine configuration
//!
//! One `EngineConfig` drives a whole analysis run. It can be built in code
//! (`EngineConfig::default()` plus field overrides) or loaded from a
//! versioned YAML file:
//!
//! ```yaml
//! version: 1
//! naming:
//!   program2_prefix: "srv_"
//! inputs:
//!   message_post_buffer: "shared_buf"
//! reachability:
//!   max_paths: 500
//! ```

use super::error::{ConfigError, ConfigResult};
use super::naming::NamingConvention;
use super::validation::Validatable;
use serde::{Deserialize, Serialize};
use std::path::Path;

const SUPPORTED_VERSIONS: [u32; 1] = [1];

/// Graph construction settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct GraphConfig {
    /// Materialize control-flow terminators as `Op` nodes too
    pub include_control_flow: bool,

    /// Replace calls to functions of the same program by parameter/return
    /// edges once the graph is built
    pub splice_calls: bool,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            include_control_flow: false,
            splice_calls: false,
        }
    }
}

/// Input classification settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct InputConfig {
    /// Names of top-level entry points whose argv is an input
    pub entry_points: Vec<String>,

    /// Index of the argv parameter of an entry point
    pub argv_index: usize,

    /// The only buffer accepted as a message-post payload
    pub message_post_buffer: String,

    /// Tag the front end inserts into network receive wrapper names,
    /// followed by the buffer argument index (e.g. `read__netrecv_1`)
    pub network_tag: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            entry_points: vec!["main".to_string()],
            argv_index: 1,
            message_post_buffer: "msg_buf".to_string(),
            network_tag: "__netrecv_".to_string(),
        }
    }
}

impl Validatable for InputConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.network_tag.is_empty() {
            return Err(ConfigError::empty(
                "inputs.network_tag",
                "Network wrappers cannot be told apart without a tag",
            ));
        }
        if self.message_post_buffer.is_empty() {
            return Err(ConfigError::empty(
                "inputs.message_post_buffer",
                "Name the buffer message-post payloads are read from",
            ));
        }
        if self.argv_index > 16 {
            return Err(ConfigError::range_with_hint(
                "inputs.argv_index",
                self.argv_index,
                0,
                16,
                "argv is normally the second entry-point parameter",
            ));
        }
        Ok(())
    }

    fn config_name(&self) -> &'static str {
        "InputConfig"
    }
}

/// Reachability / counting settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ReachabilityConfig {
    /// Keep the contributing paths for the report
    pub retain_paths: bool,

    /// Maximum paths retained per counting pass (1..=100000)
    pub max_paths: usize,
}

impl Default for ReachabilityConfig {
    fn default() -> Self {
        Self {
            retain_paths: true,
            max_paths: 1000,
        }
    }
}

impl Validatable for ReachabilityConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.max_paths == 0 || self.max_paths > 100_000 {
            return Err(ConfigError::range_with_hint(
                "reachability.max_paths",
                self.max_paths,
                1,
                100_000,
                "Number of retained paths must be reasonable",
            ));
        }
        Ok(())
    }

    fn config_name(&self) -> &'static str {
        "ReachabilityConfig"
    }
}

/// Complete engine configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub naming: NamingConvention,
    pub graph: GraphConfig,
    pub inputs: InputConfig,
    pub reachability: ReachabilityConfig,
}

/// YAML schema v1
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFileV1 {
    version: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    naming: Option<NamingConvention>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    graph: Option<GraphConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    inputs: Option<InputConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    reachability: Option<ReachabilityConfig>,
}

impl EngineConfig {
    /// Load and validate a YAML configuration file
    pub fn from_yaml(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Parse and validate YAML configuration text
    pub fn from_yaml_str(content: &str) -> ConfigResult<Self> {
        let file: ConfigFileV1 = serde_yaml::from_str(content)?;

        let version = file.version.ok_or(ConfigError::MissingVersion)?;
        if !SUPPORTED_VERSIONS.contains(&version) {
            return Err(ConfigError::UnsupportedVersion {
                found: version,
                supported: SUPPORTED_VERSIONS.to_vec(),
            });
        }

        let config = EngineConfig {
            naming: file.naming.unwrap_or_default(),
            graph: file.graph.unwrap_or_default(),
            inputs: file.inputs.unwrap_or_default(),
            reachability: file.reachability.unwrap_or_default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Serialize as YAML schema v1
    pub fn to_yaml(&self) -> ConfigResult<String> {
        let file = ConfigFileV1 {
            version: Some(SUPPORTED_VERSIONS[0]),
            naming: Some(self.naming.clone()),
            graph: Some(self.graph.clone()),
            inputs: Some(self.inputs.clone()),
            reachability: Some(self.reachability.clone()),
        };
        Ok(serde_yaml::to_string(&file)?)
    }
}

impl Validatable for EngineConfig {
    fn validate(&self) -> ConfigResult<()> {
        self.naming.validate()?;
        self.inputs.validate()?;
        self.reachability.validate()?;
        Ok(())
    }

    fn config_name(&self) -> &'static str {
        "EngineConfig"
    }
}
