//! Naming conventions at the front-end boundary
//!
//! The engine recognizes network primitives, callbacks and special input
//! conventions purely by name. All of those names live here so that the
//! algorithms never hard-code them.

use super::error::{ConfigError, ConfigResult};
use super::validation::Validatable;
use crate::shared::models::{NetDirection, ProgramId};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Send/recv callee prefixes of one program
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProgramNaming {
    pub send_prefixes: Vec<String>,
    pub recv_prefixes: Vec<String>,
}

impl ProgramNaming {
    fn direction_of(&self, callee: &str) -> Option<NetDirection> {
        if self.send_prefixes.iter().any(|p| callee.starts_with(p.as_str())) {
            return Some(NetDirection::Send);
        }
        if self.recv_prefixes.iter().any(|p| callee.starts_with(p.as_str())) {
            return Some(NetDirection::Recv);
        }
        None
    }
}

/// Naming convention of the analyzed program pair
///
/// Prefix matches are case-sensitive: by default program 1 uses lower-case
/// `send`/`recv` primitives and program 2 upper-case ones, which is how the
/// two programs' calls stay distinguishable once linked into one module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct NamingConvention {
    /// Symbol prefix carried by every program-2 function and global
    pub program2_prefix: String,

    pub program1: ProgramNaming,
    pub program2: ProgramNaming,

    /// Regex matching receive-callback function names
    pub receive_callback: String,

    /// Regex matching sensor-update callees
    pub sensor_update: String,

    /// Regex matching cross-process message-post callees
    pub message_post: String,
}

impl Default for NamingConvention {
    fn default() -> Self {
        Self {
            program2_prefix: "P2_".to_string(),
            program1: ProgramNaming {
                send_prefixes: vec!["send".to_string()],
                recv_prefixes: vec!["recv".to_string()],
            },
            program2: ProgramNaming {
                send_prefixes: vec!["SEND".to_string(), "P2_send".to_string()],
                recv_prefixes: vec!["RECV".to_string(), "P2_recv".to_string()],
            },
            receive_callback: r"(recv_callback|_recv_cb)$".to_string(),
            sensor_update: r"sensor_update".to_string(),
            message_post: r"(post_message|PostMessage)".to_string(),
        }
    }
}

impl NamingConvention {
    pub fn program(&self, program: ProgramId) -> &ProgramNaming {
        match program {
            ProgramId::First => &self.program1,
            ProgramId::Second => &self.program2,
        }
    }

    /// Direction of a network primitive called from `program`
    pub fn net_direction(&self, program: ProgramId, callee: &str) -> Option<NetDirection> {
        self.program(program).direction_of(callee)
    }

    /// Program a linked symbol belongs to, judged by the program-2 prefix
    pub fn program_of_symbol(&self, symbol: &str) -> ProgramId {
        if !self.program2_prefix.is_empty() && symbol.starts_with(self.program2_prefix.as_str()) {
            ProgramId::Second
        } else {
            ProgramId::First
        }
    }

    /// Compile the regex conventions
    pub fn compile(&self) -> ConfigResult<CompiledNaming> {
        Ok(CompiledNaming {
            receive_callback: compile_pattern("naming.receive_callback", &self.receive_callback)?,
            sensor_update: compile_pattern("naming.sensor_update", &self.sensor_update)?,
            message_post: compile_pattern("naming.message_post", &self.message_post)?,
        })
    }
}

fn compile_pattern(field: &str, pattern: &str) -> ConfigResult<Regex> {
    Regex::new(pattern).map_err(|source| ConfigError::Pattern {
        field: field.to_string(),
        source,
    })
}

impl Validatable for NamingConvention {
    fn validate(&self) -> ConfigResult<()> {
        for (field, naming) in [
            ("naming.program1", &self.program1),
            ("naming.program2", &self.program2),
        ] {
            if naming.send_prefixes.iter().chain(&naming.recv_prefixes).any(|p| p.is_empty()) {
                return Err(ConfigError::empty(
                    field,
                    "An empty prefix would classify every call as a network primitive",
                ));
            }
        }
        self.compile().map(|_| ())
    }

    fn config_name(&self) -> &'static str {
        "NamingConvention"
    }
}

/// Regex conventions, compiled once per analysis run
#[derive(Debug, Clone)]
pub struct CompiledNaming {
    pub receive_callback: Regex,
    pub sensor_update: Regex,
    pub message_post: Regex,
}
