// SPDX-License-Identifier: MIT OR Apache-2.0

use async_trait::async_trait;

use crate::error::SideChannelError;
use crate::identifier::GossipIdentifier;
use crate::peer::Peer;
use crate::side_channel::SideChannelMessage;

/// Read-only context handed to a [`GossipLogicFactory`] when a logic instance is created.
///
/// Gives the logic access to the identifier it was created for and the name of the owning shell
/// (useful for log lines), without exposing the shell's internals.
#[derive(Clone, Debug)]
pub struct LogicContext {
    pub identifier: GossipIdentifier,
    pub shell_name: String,
}

/// Caller-supplied policy object: peer selection, payload formation, merging, and ACK handling
/// for one gossip identifier.
///
/// One instance is owned by the shell per active identifier (§4.1); the shell hosts logics of
/// heterogeneous concrete types behind this object-safe, `async_trait`-based interface, the same
/// technique the sibling `p2panda-sync` crate uses for its pluggable `SyncProtocol`.
///
/// All methods run synchronously on the shell's own task and must be bounded and non-blocking —
/// they are never spawned off onto a background task.
#[async_trait]
pub trait GossipLogic<E>: Send
where
    E: Send + Sync + 'static,
{
    /// Choose this round's targets from the currently known peers.
    ///
    /// May return an empty vector; may return a subset; ordering is the logic's concern.
    async fn select_peers(&mut self, all: &[Peer<E>]) -> Vec<Peer<E>>;

    /// Materialize the envelope to send to a specific target, or `None` to skip it this round.
    async fn make_payload(&mut self, target: &Peer<E>) -> Option<E>;

    /// Merge an inbound envelope from `origin`.
    ///
    /// Must be idempotent under retransmission — the engine does not deduplicate.
    async fn receive_gossip(&mut self, origin: Peer<E>, payload: E);

    /// Invoked when a gossip this logic sent to `target` was acknowledged.
    ///
    /// Allows pruning of "delta" state once safely delivered. Never called for a gossip that
    /// timed out or whose transport failed (§7).
    async fn receive_payload_ack(&mut self, target: Peer<E>, confirmed_delivery_of: E);

    /// Absorb an update supplied by the local application.
    async fn local_gossip_update(&mut self, payload: E);

    /// Handle a dynamically-typed, out-of-band application message.
    ///
    /// A rejection is logged at `error` by the shell but does not fail the ask or kill the shell
    /// (§7).
    async fn receive_side_channel_message(
        &mut self,
        msg: SideChannelMessage,
    ) -> Result<(), SideChannelError>;
}

/// Constructs a fresh [`GossipLogic`] instance for a given identifier.
///
/// Supplied once at shell construction; invoked lazily the first time an identifier is
/// referenced (§3), and again if a removed identifier is re-referenced by inbound gossip (§9).
pub type GossipLogicFactory<E> =
    Box<dyn Fn(LogicContext) -> Box<dyn GossipLogic<E>> + Send + Sync>;
