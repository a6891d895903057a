//! End-to-end tests over the client/daemon exchange

mod common;

use common::*;
use crosstaint_core::config::EngineConfig;
use crosstaint_core::features::dependency_graph::{EdgeKind, InputOrigin, NodeCategory};
use crosstaint_core::features::reachability::{AnalysisService, Category, CategoryCounts};
use crosstaint_core::shared::models::{NetDirection, ProgramId, SourceLocation};
use pretty_assertions::assert_eq;
use rustc_hash::FxHashSet;

#[test]
fn test_send_links_to_recv_at_shared_level() {
    let fixture = client_daemon();
    let (graph, _) = build_graph(&fixture.module, &fixture.partition, &EngineConfig::default());

    let writes = graph.net_nodes(ProgramId::Second, NetDirection::Send);
    let reads = graph.net_nodes(ProgramId::First, NetDirection::Recv);
    assert_eq!(writes.len(), 1);
    assert_eq!(reads.len(), 1);

    assert!(graph.has_edge(writes[0], reads[0]));
    assert_eq!(graph.edge_kind(writes[0], reads[0]), Some(EdgeKind::Data));
    assert!(!graph.has_edge(reads[0], writes[0]));

    let write = graph.node(writes[0]).unwrap();
    assert_eq!(write.category(), NodeCategory::NetWrite);
    assert_eq!(write.levels.iter().copied().collect::<Vec<_>>(), vec![1]);
    assert_eq!(write.location, Some(SourceLocation::new("daemon.c", 21)));
}

#[test]
fn test_every_dependency_crosses_the_network() {
    let fixture = client_daemon();
    let (graph, _) = build_graph(&fixture.module, &fixture.partition, &EngineConfig::default());

    let consumer = graph.find_node(fixture.consumed, ProgramId::First).unwrap();
    let b2 = graph.find_node(fixture.b2, ProgramId::Second).unwrap();
    let sources: FxHashSet<_> = [b2].into_iter().collect();

    let deps = graph.every_dependency(consumer, &sources, false, false, ProgramId::First);
    assert!(deps.net_dependency);
    let path = &deps.paths[&b2];
    assert_eq!(path.first(), Some(&b2));
    assert_eq!(path.last(), Some(&consumer));
    let categories: Vec<NodeCategory> = path.iter().map(|id| graph.node(*id).unwrap().category()).collect();
    assert_eq!(
        categories,
        vec![
            NodeCategory::Mem,
            NodeCategory::NetWrite,
            NodeCategory::NetRead,
            NodeCategory::Mem,
            NodeCategory::Op,
        ]
    );
}

#[test]
fn test_every_dependency_stops_at_own_net_read() {
    let fixture = client_daemon();
    let (graph, _) = build_graph(&fixture.module, &fixture.partition, &EngineConfig::default());

    let consumer = graph.find_node(fixture.consumed, ProgramId::First).unwrap();
    let b2 = graph.find_node(fixture.b2, ProgramId::Second).unwrap();
    let sources: FxHashSet<_> = [b2].into_iter().collect();

    let deps = graph.every_dependency(consumer, &sources, false, true, ProgramId::First);
    assert!(deps.net_dependency);
    assert!(deps.paths.is_empty());
}

#[test]
fn test_shortest_dependency_distance() {
    let fixture = client_daemon();
    let (graph, _) = build_graph(&fixture.module, &fixture.partition, &EngineConfig::default());

    let consumer = graph.find_node(fixture.consumed, ProgramId::First).unwrap();
    let b2 = graph.find_node(fixture.b2, ProgramId::Second).unwrap();
    let sources: FxHashSet<_> = [b2].into_iter().collect();

    assert_eq!(graph.shortest_dependency(consumer, &sources, false), Some((b2, 4)));
    // Mem(B1) sits on the only route
    assert_eq!(graph.shortest_dependency(consumer, &sources, true), None);
}

#[test]
fn test_level_mismatch_is_not_linked() {
    let fixture = misaligned_client_daemon();
    let (graph, _) = build_graph(&fixture.module, &fixture.partition, &EngineConfig::default());

    let read = graph.net_nodes(ProgramId::First, NetDirection::Recv)[0];
    let deep_send = graph
        .net_nodes(ProgramId::Second, NetDirection::Send)
        .iter()
        .copied()
        .find(|id| graph.node(*id).unwrap().location == Some(SourceLocation::new("daemon.c", 41)))
        .unwrap();

    assert!(!graph.has_edge(deep_send, read));
    let linked: Vec<_> = graph
        .predecessors(read)
        .filter(|p| graph.node(*p).unwrap().category() == NodeCategory::NetWrite)
        .collect();
    assert_eq!(linked.len(), 2);
}

#[test]
fn test_subgraph_of_the_exchange() {
    let fixture = client_daemon();
    let (graph, _) = build_graph(&fixture.module, &fixture.partition, &EngineConfig::default());

    let b2 = graph.find_node(fixture.b2, ProgramId::Second).unwrap();
    let consumer = graph.find_node(fixture.consumed, ProgramId::First).unwrap();
    let sub = graph.subgraph(b2, consumer).unwrap();

    assert_eq!(sub.graph.node_count(), 5);
    assert_eq!(sub.graph.edge_count(), 4);
    let local_b2 = sub.local_id(b2).unwrap();
    let local_consumer = sub.local_id(consumer).unwrap();
    assert_eq!(sub.graph.dfs_forward(local_b2).len(), 5);
    assert!(sub.graph.dfs_backward(local_consumer).contains(&local_b2));
}

#[test]
fn test_service_counts() {
    let fixture = client_daemon();
    let service = AnalysisService::new(EngineConfig::default()).unwrap();
    let outcome = service.analyze(&fixture.module, &fixture.partition).unwrap();

    let client = outcome.report.program(ProgramId::First).unwrap();
    assert_eq!(
        client.counts,
        CategoryCounts {
            local: 0,
            network: 2,
            cross: 2,
            false_positive: 0,
        }
    );
    assert_eq!(client.array_count, 2);

    let network_path = client.paths_of(Category::Network).next().unwrap();
    assert_eq!(network_path.labels, vec!["input:net:recv".to_string(), "mem:B1".to_string()]);
    let cross_path = client.paths_of(Category::Cross).next().unwrap();
    assert_eq!(cross_path.labels.first().map(String::as_str), Some("input:local:fgets"));
    assert_eq!(cross_path.labels.last().map(String::as_str), Some("mem:B1"));

    let daemon = outcome.report.program(ProgramId::Second).unwrap();
    assert_eq!(daemon.counts.network, 0);
    assert_eq!(daemon.counts.cross, 0);
    assert_eq!(daemon.array_count, 0);

    assert_eq!(outcome.report.graph.cross_program_edges, 1);
    assert!(outcome.graph.find_input(fixture.b1, InputOrigin::Network).is_some());
}

#[test]
fn test_network_only_memory_is_a_false_positive() {
    let (fixture, b3) = client_daemon_with_callback();
    let service = AnalysisService::new(EngineConfig::default()).unwrap();
    let outcome = service.analyze(&fixture.module, &fixture.partition).unwrap();

    let client = outcome.report.program(ProgramId::First).unwrap();
    // B1 (recv + load), the callback payload (load) and B3 (store)
    assert_eq!(
        client.counts,
        CategoryCounts {
            local: 0,
            network: 4,
            cross: 2,
            false_positive: 2,
        }
    );
    let b3 = outcome.graph.find_node(b3, ProgramId::First).unwrap();
    assert_eq!(outcome.graph.node(b3).unwrap().count, 1);
    assert!(client
        .paths_of(Category::Network)
        .any(|path| path.labels.last().map(String::as_str) == Some("mem:B3")));
    assert!(client
        .paths_of(Category::Cross)
        .all(|path| path.labels.last().map(String::as_str) == Some("mem:B1")));
}

#[test]
fn test_report_json_round_trip() {
    let fixture = client_daemon();
    let service = AnalysisService::new(EngineConfig::default()).unwrap();
    let outcome = service.analyze(&fixture.module, &fixture.partition).unwrap();

    let json = outcome.report.to_json().unwrap();
    assert!(json.contains("\"false_positive\""));
    let parsed = crosstaint_core::AnalysisReport::from_json(&json).unwrap();
    assert_eq!(parsed, outcome.report);
}
