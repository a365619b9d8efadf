// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared fixtures for the end-to-end scenarios in §8, mirroring the teacher's `TestNode` pattern
//! (`discovery/tests.rs`): a small struct bundling the actor handles for one simulated node, with
//! an async `spawn` constructor and a `shutdown` that stops everything cleanly.

#![allow(dead_code)]

use std::collections::BTreeSet;
use std::time::Duration;

use gossip_shell::test_support::{MaxSetLogic, setup_logging};
use gossip_shell::{
    ClusterEvent, ClusterEvents, ClusterMember, ClusterSource, DiscoveryMode, GossipControl,
    GossipIdentifier, GossipLogicFactory, GossipShell, MemberStatus, NodeId, Peer, PeerResolver,
    ReceptionistListings, ReceptionistSource, Settings, ShellDiscoverySources,
};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

pub type Envelope = BTreeSet<i64>;

/// A running gossip shell plus everything needed to interact with it and shut it down.
pub struct TestNode {
    pub control: GossipControl<Envelope>,
    join_handle: JoinHandle<()>,
}

impl TestNode {
    /// Spawns a node in manual discovery mode with the given logic factory.
    pub async fn spawn(name: &str, settings: Settings, make_logic: GossipLogicFactory<Envelope>) -> Self {
        let (control, join_handle) = GossipShell::start(name, settings, make_logic, None)
            .await
            .expect("shell spawns");
        Self {
            control,
            join_handle,
        }
    }

    /// Spawns a node with a [`MaxSetLogic`] seeded with `seed`, the common case across scenarios.
    pub async fn spawn_with_seed(name: &str, settings: Settings, seed: Vec<i64>) -> Self {
        Self::spawn(
            name,
            settings,
            Box::new(move |ctx| Box::new(MaxSetLogic::with_seed(ctx, seed.clone()))),
        )
        .await
    }

    /// Spawns a node whose discovery sources come from the cluster-events or receptionist
    /// collaborators given in `sources`.
    pub async fn spawn_with_discovery(
        name: &str,
        settings: Settings,
        make_logic: GossipLogicFactory<Envelope>,
        sources: ShellDiscoverySources<Envelope>,
    ) -> Self {
        let (control, join_handle) = GossipShell::start(name, settings, make_logic, Some(sources))
            .await
            .expect("shell spawns");
        Self {
            control,
            join_handle,
        }
    }

    pub fn peer_handle(&self) -> Peer<Envelope> {
        self.control.peer_handle()
    }

    pub async fn shutdown(self) {
        self.control.stop(Some("test teardown".to_string()));
        let _ = self.join_handle.await;
    }
}

pub const TOPIC: &str = "replica";

pub fn topic() -> GossipIdentifier {
    GossipIdentifier::new(TOPIC)
}

/// A [`Settings`] tuned for fast convergence in tests: a short mean interval with no jitter so
/// tests don't need generous sleeps, and a short ACK timeout so timeout-driven scenarios don't
/// need to wait multiple seconds.
pub fn fast_settings() -> Settings {
    Settings::builder()
        .with_gossip_interval(Duration::from_millis(40))
        .with_jitter_factor(0.0)
        .with_ack_timeout(Duration::from_millis(150))
        .build()
        .expect("valid settings")
}

pub fn fast_settings_with_discovery(mode: DiscoveryMode) -> Settings {
    Settings::builder()
        .with_gossip_interval(Duration::from_millis(40))
        .with_jitter_factor(0.0)
        .with_ack_timeout(Duration::from_millis(150))
        .with_discovery_mode(mode)
        .build()
        .expect("valid settings")
}

/// Waits until `predicate` holds, polling every 10ms, panicking if `timeout` elapses first.
pub async fn wait_until(timeout: Duration, mut predicate: impl FnMut() -> bool) {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if predicate() {
            return;
        }
        if tokio::time::Instant::now() >= deadline {
            panic!("condition did not become true within {timeout:?}");
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

pub fn init() {
    setup_logging();
}

/// A [`ClusterEvents`] fed by a channel, so a test can push membership events on demand.
pub struct ChannelClusterEvents {
    rx: mpsc::UnboundedReceiver<ClusterEvent>,
}

impl ChannelClusterEvents {
    pub fn new() -> (mpsc::UnboundedSender<ClusterEvent>, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, Self { rx })
    }
}

#[async_trait::async_trait]
impl ClusterEvents<Envelope> for ChannelClusterEvents {
    async fn next_event(&mut self) -> Option<ClusterEvent> {
        self.rx.recv().await
    }
}

/// A [`PeerResolver`] backed by a fixed node-id-to-peer table, populated up front by the test.
pub struct StaticResolver {
    table: Vec<(NodeId, Peer<Envelope>)>,
}

impl StaticResolver {
    pub fn new(table: Vec<(NodeId, Peer<Envelope>)>) -> Self {
        Self { table }
    }
}

#[async_trait::async_trait]
impl PeerResolver<Envelope> for StaticResolver {
    async fn resolve(&self, node_id: &NodeId) -> Option<Peer<Envelope>> {
        self.table
            .iter()
            .find(|(candidate, _)| candidate == node_id)
            .map(|(_, peer)| peer.clone())
    }
}

pub fn cluster_source(
    self_node: NodeId,
    events: ChannelClusterEvents,
    resolver: StaticResolver,
) -> ClusterSource<Envelope> {
    ClusterSource {
        self_node,
        events: Box::new(events),
        resolver: Box::new(resolver),
    }
}

pub fn member(id: &str, status: MemberStatus) -> ClusterMember {
    ClusterMember {
        node_id: NodeId(id.to_string()),
        status,
    }
}

/// A [`ReceptionistListings`] fed by a channel, so a test can push listing refreshes on demand.
pub struct ChannelReceptionistListings {
    rx: mpsc::UnboundedReceiver<Vec<Peer<Envelope>>>,
}

impl ChannelReceptionistListings {
    pub fn new() -> (mpsc::UnboundedSender<Vec<Peer<Envelope>>>, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, Self { rx })
    }
}

#[async_trait::async_trait]
impl ReceptionistListings<Envelope> for ChannelReceptionistListings {
    async fn next_listing(&mut self) -> Option<Vec<Peer<Envelope>>> {
        self.rx.recv().await
    }
}

pub fn receptionist_source(listings: ChannelReceptionistListings) -> ReceptionistSource<Envelope> {
    ReceptionistSource {
        listings: Box::new(listings),
    }
}
