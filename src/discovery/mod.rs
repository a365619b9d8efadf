// SPDX-License-Identifier: MIT OR Apache-2.0

//! Peer discovery interfaces consumed by the [`crate::actors::shell::GossipShell`].
//!
//! The shell itself only ever learns about peers through one narrow gate
//! (`introduce_peer`, see `crate::actors::shell`); everything in this module describes how a
//! host application feeds that gate for the two automatic discovery modes. The cluster
//! membership service and the receptionist are external collaborators (per §1/§6 of the design)
//! — this module defines the traits they are expected to satisfy, not an implementation of
//! either.

mod cluster;
mod receptionist;

pub use cluster::{ClusterEvent, ClusterEvents, ClusterMember, MemberStatus, NodeId, PeerResolver};
pub use receptionist::ReceptionistListings;
