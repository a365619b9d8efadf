// SPDX-License-Identifier: MIT OR Apache-2.0

use std::collections::HashMap;

use ractor::ActorId;

use crate::peer::Peer;

/// Deduplicated collection of peer handles, keyed by [`ActorId`] (§4.2).
///
/// Watch registration is the caller's responsibility (`GossipShell` links peers as they are
/// inserted); this type only owns the membership bookkeeping.
pub struct PeerSet<E>
where
    E: Send + Sync + 'static,
{
    peers: HashMap<ActorId, Peer<E>>,
}

impl<E> PeerSet<E>
where
    E: Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            peers: HashMap::new(),
        }
    }

    /// Inserts `peer`, returning `true` if it was not already a member.
    pub fn insert(&mut self, peer: Peer<E>) -> bool {
        self.peers.insert(peer.id(), peer).is_none()
    }

    pub fn remove(&mut self, id: ActorId) -> Option<Peer<E>> {
        self.peers.remove(&id)
    }

    pub fn contains(&self, id: ActorId) -> bool {
        self.peers.contains_key(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    /// Snapshots current membership as a plain vector (§4.7 step 2).
    pub fn snapshot(&self) -> Vec<Peer<E>> {
        self.peers.values().cloned().collect()
    }
}

impl<E> Default for PeerSet<E>
where
    E: Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
