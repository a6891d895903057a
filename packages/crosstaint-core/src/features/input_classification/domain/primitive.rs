//! Taint-introducing primitive taxonomy
//!
//! The set of recognized primitives is closed: every match a matcher reports
//! is one of [`PrimitiveKind`], with a [`TaintedOperands`] rule saying which
//! values of the call become inputs.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveKind {
    /// `scanf` family
    FormattedRead,
    /// `read`/`fread` family
    RawByteRead,
    /// `fgets`/`getc` family
    LineRead,
    /// `getenv` and friends
    Environment,
    SensorUpdate,
    /// Cross-process message post; payload must be the well-known buffer
    MessagePost,
    /// Program-level receive primitive or tagged receive wrapper
    NetworkReceive,
    /// First parameter of a receive callback
    ReceiveCallback,
    /// Entry point `argv`
    CommandLine,
}

impl PrimitiveKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrimitiveKind::FormattedRead => "formatted_read",
            PrimitiveKind::RawByteRead => "raw_byte_read",
            PrimitiveKind::LineRead => "line_read",
            PrimitiveKind::Environment => "environment",
            PrimitiveKind::SensorUpdate => "sensor_update",
            PrimitiveKind::MessagePost => "message_post",
            PrimitiveKind::NetworkReceive => "network_receive",
            PrimitiveKind::ReceiveCallback => "receive_callback",
            PrimitiveKind::CommandLine => "command_line",
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which values of a matched call are tainted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaintedOperands {
    /// The call's result
    Return,
    /// One argument by index
    Arg(usize),
    /// Every argument from the index on
    ArgsFrom(usize),
    /// Every pointer-typed argument
    PointerArgs,
    /// The call as a whole (result, or every argument if it has none)
    WholeCall,
}

/// Matcher verdict for one callee
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrimitiveMatch {
    pub kind: PrimitiveKind,
    pub tainted: TaintedOperands,
    pub is_network: bool,
}

impl PrimitiveMatch {
    pub fn local(kind: PrimitiveKind, tainted: TaintedOperands) -> Self {
        Self {
            kind,
            tainted,
            is_network: false,
        }
    }

    pub fn network(kind: PrimitiveKind, tainted: TaintedOperands) -> Self {
        Self {
            kind,
            tainted,
            is_network: true,
        }
    }
}
