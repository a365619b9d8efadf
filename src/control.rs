// SPDX-License-Identifier: MIT OR Apache-2.0

use std::time::Duration;

use ractor::{ActorRef, CallResult};
use tracing::debug;

use crate::actors::shell::ShellMsg;
use crate::error::GossipError;
use crate::identifier::GossipIdentifier;
use crate::peer::Peer;
use crate::side_channel::{SideChannelMessage, SideChannelOutcome};

/// How long [`GossipControl::side_channel_tell`] waits for the shell to reply before giving up.
///
/// This is a control-plane ask, unrelated to the gossip-round ACK timeout in
/// [`crate::settings::Settings::ack_timeout`].
const SIDE_CHANNEL_ASK_TIMEOUT: Duration = Duration::from_secs(5);

/// Thin send-only façade bound to a single [`crate::actors::shell::GossipShell`] (§4.8).
///
/// Performs no state management of its own; it exists purely so callers don't need to know the
/// shell's internal message enumeration.
#[derive(Clone)]
pub struct GossipControl<E>
where
    E: Clone + Send + Sync + 'static,
{
    shell: ActorRef<ShellMsg<E>>,
}

impl<E> GossipControl<E>
where
    E: Clone + Send + Sync + 'static,
{
    pub(crate) fn new(shell: ActorRef<ShellMsg<E>>) -> Self {
        Self { shell }
    }

    /// Stops the shell this control is bound to (shell teardown, §4.2). Any peer that had
    /// introduced this shell and is still watching it will observe an `ActorTerminated`
    /// supervision event and drop it from its own peer set.
    pub fn stop(&self, reason: Option<String>) {
        self.shell.stop(reason);
    }

    /// Returns a [`Peer`] handle addressing the shell this control is bound to, so a host can pass
    /// it to another shell's [`GossipControl::introduce`] (§4.5 manual mode: the control handle's
    /// `introduce` is the only source of peers, which requires some way to hand out a reference to
    /// oneself in the first place).
    pub fn peer_handle(&self) -> Peer<E> {
        Peer::new(self.shell.clone())
    }

    /// Returns the shell's current peer set size.
    ///
    /// Read-only introspection, additive to §4.8's original enumeration, so callers (and tests)
    /// can observe §8's self-exclusion and idempotent-introduction invariants from outside the
    /// actor.
    pub async fn peer_count(&self) -> Result<usize, GossipError> {
        let result = self
            .shell
            .call(|reply| ShellMsg::PeerCount { reply }, Some(SIDE_CHANNEL_ASK_TIMEOUT))
            .await
            .map_err(|err| GossipError::Messaging(err.to_string()))?;

        match result {
            CallResult::Success(count) => Ok(count),
            CallResult::Timeout => Err(GossipError::CallTimeout),
            CallResult::SenderError => Err(GossipError::ShellGone),
        }
    }

    /// Introduces a peer hint (§4.5). Self-introduction and duplicate introduction are both
    /// silently absorbed by the shell (§7).
    pub fn introduce(&self, peer: Peer<E>) -> Result<(), GossipError> {
        self.shell
            .cast(ShellMsg::IntroducePeer { peer })
            .map_err(|err| GossipError::Messaging(err.to_string()))
    }

    /// Pushes a local application update for `id` to its logic's `local_gossip_update`.
    pub fn update(&self, id: impl Into<GossipIdentifier>, payload: E) -> Result<(), GossipError> {
        self.shell
            .cast(ShellMsg::UpdatePayload {
                id: id.into(),
                payload,
            })
            .map_err(|err| GossipError::Messaging(err.to_string()))
    }

    /// Drops the logic instance for `id`. A later inbound gossip for the same identifier
    /// re-creates a fresh instance via the factory (§9).
    pub fn remove(&self, id: impl Into<GossipIdentifier>) -> Result<(), GossipError> {
        self.shell
            .cast(ShellMsg::RemovePayload { id: id.into() })
            .map_err(|err| GossipError::Messaging(err.to_string()))
    }

    /// Delivers a dynamically-typed side-channel message to the logic for `id`.
    ///
    /// Ask-style so the caller can react to [`SideChannelOutcome::Unhandled`] with its own
    /// dead-letter policy (§4.6, §7).
    pub async fn side_channel_tell(
        &self,
        id: impl Into<GossipIdentifier>,
        msg: SideChannelMessage,
    ) -> Result<SideChannelOutcome, GossipError> {
        let id = id.into();
        let result = self
            .shell
            .call(
                move |reply| ShellMsg::SideChannel { id, msg, reply },
                Some(SIDE_CHANNEL_ASK_TIMEOUT),
            )
            .await
            .map_err(|err| GossipError::Messaging(err.to_string()))?;

        match result {
            CallResult::Success(outcome) => {
                if outcome == SideChannelOutcome::Unhandled {
                    debug!("side channel message addressed an identifier with no live logic");
                }
                Ok(outcome)
            }
            CallResult::Timeout => Err(GossipError::CallTimeout),
            CallResult::SenderError => Err(GossipError::ShellGone),
        }
    }
}
