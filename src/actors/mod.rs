// SPDX-License-Identifier: MIT OR Apache-2.0

pub mod shell;

mod peer_set;
mod registry;

pub use shell::{ClusterSource, GossipShell, ReceptionistSource, ShellDiscoverySources};
