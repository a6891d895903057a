//! Dependency edge types

use serde::{Deserialize, Serialize};

/// Dependency type of an edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeKind {
    Data,
    Control,
}

impl EdgeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeKind::Data => "DATA",
            EdgeKind::Control => "CONTROL",
        }
    }
}

impl Default for EdgeKind {
    fn default() -> Self {
        EdgeKind::Data
    }
}
