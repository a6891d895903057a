//! Input classifier
//!
//! Walks one program's operation streams and records every value into which
//! external data flows:
//! - arguments/results of recognized primitive calls (see the matcher)
//! - `argv` of every entry point
//! - the first parameter of a receive callback, when pointer-typed
//!
//! Message-post payloads are only accepted when they name the configured
//! message buffer; anything else is logged and dropped.

use super::matcher::DefaultMatcher;
use crate::config::{ConfigResult, InputConfig, NamingConvention};
use crate::features::input_classification::domain::{
    InputRecord, InputScope, InputSets, PrimitiveKind, PrimitiveMatch, TaintedOperands,
};
use crate::features::input_classification::ports::PrimitiveMatcher;
use crate::shared::models::{FunctionBody, Operation, ProgramId, Value};
use crate::shared::ports::ProgramFrontEnd;
use regex::Regex;
use tracing::{debug, warn};

pub struct InputClassifier {
    matcher: Box<dyn PrimitiveMatcher>,
    receive_callback: Regex,
    config: InputConfig,
}

impl InputClassifier {
    /// Classifier with the default name-based matcher
    pub fn new(naming: &NamingConvention, config: &InputConfig) -> ConfigResult<Self> {
        let matcher = DefaultMatcher::new(naming, config)?;
        Self::with_matcher(Box::new(matcher), naming, config)
    }

    /// Classifier with a caller-supplied matcher
    pub fn with_matcher(
        matcher: Box<dyn PrimitiveMatcher>,
        naming: &NamingConvention,
        config: &InputConfig,
    ) -> ConfigResult<Self> {
        Ok(Self {
            matcher,
            receive_callback: naming.compile()?.receive_callback,
            config: config.clone(),
        })
    }

    /// Classify every function of `program`
    pub fn classify(&self, front_end: &dyn ProgramFrontEnd, program: ProgramId) -> InputSets {
        let mut sets = InputSets::new();
        for function in front_end.functions().iter().filter(|f| f.program == program) {
            self.classify_function(front_end, function, &mut sets);
        }
        debug!(
            %program,
            local = sets.len(program, InputScope::Local),
            network = sets.len(program, InputScope::Network),
            "inputs classified"
        );
        sets
    }

    /// Classify both programs
    pub fn classify_all(&self, front_end: &dyn ProgramFrontEnd) -> InputSets {
        let mut sets = InputSets::new();
        for program in ProgramId::ALL {
            sets.extend(self.classify(front_end, program));
        }
        sets
    }

    fn classify_function(&self, front_end: &dyn ProgramFrontEnd, function: &FunctionBody, sets: &mut InputSets) {
        let program = function.program;

        if function.is_entry_point || self.config.entry_points.iter().any(|e| *e == function.name) {
            if let Some(argv) = function.params.get(self.config.argv_index) {
                sets.insert(InputRecord::new(*argv, false, function.name.as_str(), PrimitiveKind::CommandLine));
            }
        }

        if self.receive_callback.is_match(&function.name) {
            match function.params.first() {
                Some(first) if self.is_pointer(front_end, *first) => {
                    sets.insert(InputRecord::new(
                        *first,
                        true,
                        function.name.as_str(),
                        PrimitiveKind::ReceiveCallback,
                    ));
                }
                _ => debug!(function = %function.name, "receive callback without pointer payload"),
            }
        }

        for op in &function.operations {
            let Some(callee) = op.callee_name() else { continue };
            let Some(hit) = self.matcher.match_callee(program, callee) else { continue };

            for value in self.tainted_values(front_end, op, hit) {
                if value.program != program {
                    continue;
                }
                if hit.kind == PrimitiveKind::MessagePost && !self.is_message_buffer(front_end, value) {
                    warn!(%value, callee, "message-post payload is not the message buffer; rejected");
                    continue;
                }
                sets.insert(InputRecord::new(value, hit.is_network, callee, hit.kind));
            }
        }
    }

    fn tainted_values(&self, front_end: &dyn ProgramFrontEnd, op: &Operation, hit: PrimitiveMatch) -> Vec<Value> {
        match hit.tainted {
            TaintedOperands::Return => op.result.into_iter().collect(),
            TaintedOperands::Arg(index) => match op.operands.get(index) {
                Some(arg) => vec![*arg],
                None => {
                    warn!(index, args = op.operands.len(), "tainted argument index out of range; whole call is the source");
                    whole_call(op)
                }
            },
            TaintedOperands::ArgsFrom(index) => op.operands.iter().skip(index).copied().collect(),
            TaintedOperands::PointerArgs => op
                .operands
                .iter()
                .copied()
                .filter(|v| self.is_pointer(front_end, *v))
                .collect(),
            TaintedOperands::WholeCall => whole_call(op),
        }
    }

    fn is_pointer(&self, front_end: &dyn ProgramFrontEnd, value: Value) -> bool {
        front_end
            .value_info(value)
            .map(|info| info.is_pointer)
            .unwrap_or(false)
    }

    fn is_message_buffer(&self, front_end: &dyn ProgramFrontEnd, value: Value) -> bool {
        front_end
            .value_info(value)
            .map(|info| info.storage_name() == self.config.message_post_buffer)
            .unwrap_or(false)
    }
}

fn whole_call(op: &Operation) -> Vec<Value> {
    match op.result {
        Some(result) => vec![result],
        None => op.operands.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::models::{ProgramModule, ValueInfo, ValueKind};

    fn classifier() -> InputClassifier {
        InputClassifier::new(&NamingConvention::default(), &InputConfig::default()).unwrap()
    }

    #[test]
    fn test_local_and_network_sources() {
        let mut module = ProgramModule::new();
        let p = ProgramId::First;
        let line = module.pointer(p, "line");
        let packet = module.pointer(p, "packet");
        let fd = module.scalar(p, "fd");
        module.add_function(
            FunctionBody::new("worker", p)
                .with_operation(Operation::call("fgets", vec![line, fd]))
                .with_operation(Operation::call("recv", vec![fd, packet])),
        );

        let sets = classifier().classify(&module, p);
        assert!(sets.contains(p, InputScope::Local, line));
        assert!(sets.contains(p, InputScope::Network, packet));
        assert!(!sets.contains(p, InputScope::Network, fd));
        assert_eq!(sets.len(p, InputScope::All), 2);
    }

    #[test]
    fn test_entry_point_argv() {
        let mut module = ProgramModule::new();
        let p = ProgramId::Second;
        let argc = module.argument(p, "argc", false);
        let argv = module.argument(p, "argv", true);
        module.add_function(FunctionBody::new("P2_main", p).entry_point().with_params(vec![argc, argv]));

        let sets = classifier().classify(&module, p);
        let record = sets.records(p, InputScope::Local).next().unwrap();
        assert_eq!(record.value, argv);
        assert_eq!(record.kind, PrimitiveKind::CommandLine);
        assert_eq!(record.instruction_name, "P2_main");
    }

    #[test]
    fn test_receive_callback_first_pointer_param() {
        let mut module = ProgramModule::new();
        let p = ProgramId::First;
        let data = module.argument(p, "data", true);
        let len = module.argument(p, "len", false);
        module.add_function(FunctionBody::new("on_recv_callback", p).with_params(vec![data, len]));
        let scalar_first = module.argument(p, "n", false);
        module.add_function(FunctionBody::new("other_recv_cb", p).with_params(vec![scalar_first]));

        let sets = classifier().classify(&module, p);
        assert_eq!(sets.len(p, InputScope::Network), 1);
        assert!(sets.contains(p, InputScope::Network, data));
    }

    #[test]
    fn test_message_post_requires_named_buffer() {
        let mut module = ProgramModule::new();
        let p = ProgramId::First;
        let good = module.add_value(
            p,
            ValueInfo::new("gep.msg", ValueKind::ConstantExpr)
                .pointer()
                .resolving_to("msg_buf"),
        );
        let bad = module.add_value(p, ValueInfo::new("other_buf", ValueKind::Global).pointer());
        module.add_function(
            FunctionBody::new("notify", p)
                .with_operation(Operation::call("post_message", vec![good]))
                .with_operation(Operation::call("post_message", vec![bad])),
        );

        let sets = classifier().classify(&module, p);
        assert!(sets.contains(p, InputScope::Local, good));
        assert!(!sets.contains(p, InputScope::All, bad));
    }

    #[test]
    fn test_unparseable_wrapper_taints_whole_call() {
        let mut module = ProgramModule::new();
        let p = ProgramId::First;
        let buf = module.pointer(p, "buf");
        let n = module.scalar(p, "n");
        module.add_function(
            FunctionBody::new("f", p).with_operation(Operation::call("read__netrecv_", vec![buf]).with_result(n)),
        );

        let sets = classifier().classify(&module, p);
        assert!(sets.contains(p, InputScope::Network, n));
        assert!(!sets.contains(p, InputScope::Network, buf));
    }

    #[test]
    fn test_classify_all_separates_programs() {
        let mut module = ProgramModule::new();
        let b1 = module.pointer(ProgramId::First, "b1");
        let b2 = module.pointer(ProgramId::Second, "b2");
        module.add_function(
            FunctionBody::new("main", ProgramId::First).with_operation(Operation::call("recv", vec![b1])),
        );
        module.add_function(
            FunctionBody::new("P2_main", ProgramId::Second).with_operation(Operation::call("RECV", vec![b2])),
        );

        let sets = classifier().classify_all(&module);
        assert!(sets.contains(ProgramId::First, InputScope::Network, b1));
        assert!(sets.contains(ProgramId::Second, InputScope::Network, b2));
        assert!(!sets.contains(ProgramId::First, InputScope::All, b2));
    }

    #[test]
    fn test_custom_matcher() {
        let mut module = ProgramModule::new();
        let p = ProgramId::First;
        let v = module.scalar(p, "v");
        module.add_function(
            FunctionBody::new("f", p).with_operation(Operation::call("read_sensor", vec![]).with_result(v)),
        );
        let matcher = |_: ProgramId, callee: &str| {
            (callee == "read_sensor")
                .then(|| PrimitiveMatch::local(PrimitiveKind::SensorUpdate, TaintedOperands::Return))
        };
        let classifier = InputClassifier::with_matcher(
            Box::new(matcher),
            &NamingConvention::default(),
            &InputConfig::default(),
        )
        .unwrap();

        let sets = classifier.classify(&module, p);
        assert!(sets.contains(p, InputScope::Local, v));
    }
}
