//! Default primitive matcher
//!
//! Matching order:
//! 1. tagged network receive wrappers (`<tag><arg index>` in the callee)
//! 2. the program's recv primitives
//! 3. sensor-update and message-post conventions
//! 4. the libc input table

use crate::config::{CompiledNaming, ConfigResult, InputConfig, NamingConvention};
use crate::features::input_classification::domain::{PrimitiveKind, PrimitiveMatch, TaintedOperands};
use crate::features::input_classification::ports::PrimitiveMatcher;
use crate::shared::models::{NetDirection, ProgramId};
use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;
use tracing::warn;

static LIBC_INPUTS: Lazy<FxHashMap<&'static str, (PrimitiveKind, TaintedOperands)>> = Lazy::new(|| {
    use PrimitiveKind::*;
    use TaintedOperands::*;

    let mut table = FxHashMap::default();
    // formatted reads: everything after the format (and stream/string)
    for name in ["scanf", "__isoc99_scanf", "vscanf"] {
        table.insert(name, (FormattedRead, ArgsFrom(1)));
    }
    for name in ["fscanf", "__isoc99_fscanf", "sscanf", "__isoc99_sscanf"] {
        table.insert(name, (FormattedRead, ArgsFrom(2)));
    }
    // raw byte reads
    table.insert("read", (RawByteRead, Arg(1)));
    table.insert("pread", (RawByteRead, Arg(1)));
    table.insert("fread", (RawByteRead, Arg(0)));
    // line/char reads
    for name in ["fgets", "gets", "getline", "getdelim"] {
        table.insert(name, (LineRead, Arg(0)));
    }
    for name in ["fgetc", "getc", "_IO_getc", "getchar"] {
        table.insert(name, (LineRead, Return));
    }
    // environment and system
    table.insert("getenv", (Environment, Return));
    table.insert("secure_getenv", (Environment, Return));
    table.insert("getcwd", (Environment, Arg(0)));
    table.insert("gethostname", (Environment, Arg(0)));
    table.insert("readlink", (Environment, Arg(1)));
    table
});

pub struct DefaultMatcher {
    naming: NamingConvention,
    compiled: CompiledNaming,
    network_tag: String,
}

impl DefaultMatcher {
    pub fn new(naming: &NamingConvention, inputs: &InputConfig) -> ConfigResult<Self> {
        Ok(Self {
            naming: naming.clone(),
            compiled: naming.compile()?,
            network_tag: inputs.network_tag.clone(),
        })
    }

    fn match_network_wrapper(&self, callee: &str) -> Option<PrimitiveMatch> {
        if self.network_tag.is_empty() {
            return None;
        }
        let start = callee.find(self.network_tag.as_str())? + self.network_tag.len();
        let digits: String = callee[start..]
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect();
        let tainted = match digits.parse::<usize>() {
            Ok(index) => TaintedOperands::Arg(index),
            Err(_) => {
                warn!(callee, "receive wrapper without argument index; whole call is the source");
                TaintedOperands::WholeCall
            }
        };
        Some(PrimitiveMatch::network(PrimitiveKind::NetworkReceive, tainted))
    }
}

impl PrimitiveMatcher for DefaultMatcher {
    fn match_callee(&self, program: ProgramId, callee: &str) -> Option<PrimitiveMatch> {
        if let Some(wrapper) = self.match_network_wrapper(callee) {
            return Some(wrapper);
        }
        if self.naming.net_direction(program, callee) == Some(NetDirection::Recv) {
            return Some(PrimitiveMatch::network(
                PrimitiveKind::NetworkReceive,
                TaintedOperands::PointerArgs,
            ));
        }
        if self.compiled.sensor_update.is_match(callee) {
            return Some(PrimitiveMatch::local(
                PrimitiveKind::SensorUpdate,
                TaintedOperands::PointerArgs,
            ));
        }
        if self.compiled.message_post.is_match(callee) {
            return Some(PrimitiveMatch::local(
                PrimitiveKind::MessagePost,
                TaintedOperands::PointerArgs,
            ));
        }
        LIBC_INPUTS
            .get(callee)
            .map(|(kind, tainted)| PrimitiveMatch::local(*kind, *tainted))
    }
}
