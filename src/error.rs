// SPDX-License-Identifier: MIT OR Apache-2.0

use thiserror::Error;

/// Errors surfaced to callers of [`crate::control::GossipControl`] and
/// [`crate::actors::shell::GossipShell::start`].
///
/// Errors local to a single identifier's logic (a bad side-channel message, a failed ACK) never
/// reach this type — they are logged and isolated per §7 of the design; this enum only covers
/// failures that cross the shell's own boundary.
#[derive(Debug, Error)]
pub enum GossipError {
    #[error("invalid gossip settings: {0}")]
    InvalidSettings(String),

    #[error("failed to spawn gossip shell actor: {0}")]
    Spawn(#[from] ractor::SpawnErr),

    #[error("failed to send message to gossip shell: {0}")]
    Messaging(String),

    #[error("gossip shell did not reply before the call timed out")]
    CallTimeout,

    #[error("gossip shell actor is no longer running")]
    ShellGone,
}

/// A typed rejection a [`crate::logic::GossipLogic`] returns from
/// `receive_side_channel_message` when it cannot handle the message it was given.
///
/// Per §7, this error is logged at `error` level and does not fail the ask; the side channel
/// call itself still reports [`crate::side_channel::SideChannelOutcome::Received`].
#[derive(Debug, Error)]
pub enum SideChannelError {
    #[error("side channel message tagged '{0}' was not of the expected type")]
    UnexpectedType(&'static str),

    #[error("logic rejected side channel message: {0}")]
    Rejected(String),
}
