// SPDX-License-Identifier: MIT OR Apache-2.0

//! A convergent gossip engine embedded in a distributed actor runtime.
//!
//! A [`actors::shell::GossipShell`] equalizes some piece of per-node state (membership views,
//! CRDT replicas, leader elections, ...) across a set of cluster peers by periodically exchanging
//! payloads with randomly selected neighbors. What to gossip, to whom, and when convergence is
//! reached is delegated to a caller-supplied [`logic::GossipLogic`]; the shell owns peer
//! discovery, round scheduling, reliable-delivery acknowledgement, and lifecycle management.
//!
//! Start a shell with [`actors::shell::GossipShell::start`], drive it through the returned
//! [`control::GossipControl`], and feed it peers either manually or through one of the two
//! automatic [`settings::DiscoveryMode`]s.

pub mod actors;
pub mod control;
pub mod discovery;
pub mod error;
pub mod identifier;
pub mod logic;
pub mod peer;
pub mod settings;
pub mod side_channel;

#[cfg(feature = "test_utils")]
pub mod test_support;

pub use actors::shell::{ClusterSource, GossipAck, GossipShell, ReceptionistSource, ShellDiscoverySources};
pub use control::GossipControl;
pub use discovery::{ClusterEvent, ClusterEvents, ClusterMember, MemberStatus, NodeId, PeerResolver, ReceptionistListings};
pub use error::{GossipError, SideChannelError};
pub use identifier::GossipIdentifier;
pub use logic::{GossipLogic, GossipLogicFactory, LogicContext};
pub use peer::Peer;
pub use settings::{DiscoveryMode, Settings, SettingsBuilder};
pub use side_channel::{SideChannelMessage, SideChannelOutcome};
