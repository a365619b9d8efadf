// SPDX-License-Identifier: MIT OR Apache-2.0

use async_trait::async_trait;

use crate::peer::Peer;

/// Opaque identity of a cluster node, independent of any particular actor address.
///
/// A `NodeId` is stable across reconnections; the [`PeerResolver`] is what turns a `NodeId` into
/// the actual `Peer<E>` handle the shell can send gossip to.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub String);

/// Ordinal membership status, totally ordered exactly as real cluster membership services
/// order it: nodes only ever progress monotonically from `Joining` towards `Down`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum MemberStatus {
    Joining,
    WeaklyUp,
    Up,
    Leaving,
    Exiting,
    Down,
}

/// A single member of the cluster as reported by the membership service.
#[derive(Clone, Debug)]
pub struct ClusterMember {
    pub node_id: NodeId,
    pub status: MemberStatus,
}

/// A cluster membership event, as emitted by the host's membership service.
///
/// Leadership changes and reachability events exist in real cluster membership services but are
/// ignored by the gossip core (§4.5) — they are deliberately not represented here.
#[derive(Clone, Debug)]
pub enum ClusterEvent {
    /// A full snapshot of the membership, delivered once on subscription.
    Snapshot(Vec<ClusterMember>),

    /// An incremental change to a single member's status.
    MembershipChange(ClusterMember),
}

/// The cluster membership service the shell consumes for cluster-event-driven discovery.
///
/// This is an external collaborator interface only (§1); hosts implement it on top of whatever
/// real cluster membership mechanism they run (e.g. a SWIM gossip layer, a Raft-backed
/// membership table, or a managed platform's node registry).
#[async_trait]
pub trait ClusterEvents<E>: Send + Sync + 'static
where
    E: Send + Sync + 'static,
{
    /// Returns the next membership event, or `None` once the subscription is permanently closed.
    async fn next_event(&mut self) -> Option<ClusterEvent>;
}

/// Resolves a cluster `NodeId` to an addressable gossip peer.
///
/// Per §4.5/§7, if resolution yields a reference that is not actually a shell of the expected
/// envelope type, the core logs a warning and does not insert the peer — it never treats this as
/// fatal.
#[async_trait]
pub trait PeerResolver<E>: Send + Sync + 'static
where
    E: Send + Sync + 'static,
{
    async fn resolve(&self, node_id: &NodeId) -> Option<Peer<E>>;
}
