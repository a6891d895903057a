//! Program fixtures
//!
//! `client_daemon` is the canonical two-program exchange: the daemon (P2)
//! reads a local line into `B2` and sends it; the client (P1) receives into
//! `B1` and reads from it. Both primitives sit at level 1 of their function.

use crosstaint_core::features::alias_analysis::AliasPartition;
use crosstaint_core::shared::models::{FunctionBody, Operation, ProgramId, ProgramModule, Value};

pub struct ClientDaemon {
    pub module: ProgramModule,
    pub partition: AliasPartition,
    /// P1 receive buffer
    pub b1: Value,
    /// P2 send buffer
    pub b2: Value,
    /// P1 value loaded from `b1`
    pub consumed: Value,
}

pub fn client_daemon() -> ClientDaemon {
    let p1 = ProgramId::First;
    let p2 = ProgramId::Second;
    let mut module = ProgramModule::new();

    let b1 = module.global_buffer(p1, "B1");
    let sock1 = module.scalar(p1, "sock");
    let consumed = module.scalar(p1, "first_byte");
    module.add_function(
        FunctionBody::new("main", p1)
            .entry_point()
            .with_operation(Operation::call("recv", vec![sock1, b1]).at("client.c", 10))
            .with_operation(Operation::load(b1, consumed).at("client.c", 11)),
    );

    let b2 = module.global_buffer(p2, "B2");
    let stream = module.scalar(p2, "stdin");
    let sock2 = module.scalar(p2, "P2_sock");
    module.add_function(
        FunctionBody::new("P2_main", p2)
            .entry_point()
            .with_operation(Operation::call("fgets", vec![b2, stream]).at("daemon.c", 20))
            .with_operation(Operation::call("SEND", vec![sock2, b2]).at("daemon.c", 21)),
    );

    let partition = AliasPartition::from_classes([vec![b1], vec![b2]]);
    ClientDaemon {
        module,
        partition,
        b1,
        b2,
        consumed,
    }
}

/// Same exchange with the send placed one level deeper than the recv
pub fn misaligned_client_daemon() -> ClientDaemon {
    let mut fixture = client_daemon();
    let p2 = ProgramId::Second;
    let b2 = fixture.module.global_buffer(p2, "B2b");
    let hello = fixture.module.constant(p2, "hello");
    let sock = fixture.module.scalar(p2, "P2_sock2");
    fixture.module.add_function(
        FunctionBody::new("P2_handshake", p2)
            .with_operation(Operation::call("SEND", vec![sock, hello]).at("daemon.c", 40))
            .with_operation(Operation::call("SEND", vec![sock, b2]).at("daemon.c", 41)),
    );
    fixture.partition = AliasPartition::from_classes([vec![fixture.b1], vec![fixture.b2], vec![b2]]);
    fixture
}

/// Exchange plus a P1 receive callback that copies its payload into `B3`
///
/// The callback's payload is network input of P1 that no daemon input can
/// reach, so everything it touches is a network-only finding.
pub fn client_daemon_with_callback() -> (ClientDaemon, Value) {
    let mut fixture = client_daemon();
    let p1 = ProgramId::First;
    let data = fixture.module.argument(p1, "data", true);
    let byte = fixture.module.scalar(p1, "byte");
    let b3 = fixture.module.global_buffer(p1, "B3");
    fixture.module.add_function(
        FunctionBody::new("on_recv_callback", p1)
            .with_params(vec![data])
            .with_operation(Operation::load(data, byte).at("client.c", 31))
            .with_operation(Operation::store(byte, b3).at("client.c", 32)),
    );
    fixture.partition =
        AliasPartition::from_classes([vec![fixture.b1], vec![fixture.b2], vec![data], vec![b3]]);
    (fixture, b3)
}
