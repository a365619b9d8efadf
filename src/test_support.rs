// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reusable test fixtures, enabled by the `test_utils` feature and used across this crate's own
//! integration tests (§8), mirroring the teacher's `test_utils.rs` convention of shipping small
//! reference implementations alongside the crate.

use std::collections::{BTreeSet, HashSet};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::SideChannelError;
use crate::logic::{GossipLogic, LogicContext};
use crate::peer::Peer;
use crate::side_channel::SideChannelMessage;

/// Initializes a `tracing-subscriber` `EnvFilter` subscriber for test output, mirroring the
/// teacher crate's own `test_utils::setup_logging`.
pub fn setup_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Side-channel tag recognized by [`MaxSetLogic::receive_side_channel_message`] as a request to
/// hand back the logic's current value set through a one-shot reply, rather than the default
/// string-log behavior. Lets integration tests observe converged state from outside the actor
/// without a bespoke query message on [`crate::actors::shell::ShellMsg`].
pub const DUMP_TAG: &str = "test_support::dump";

/// Builds a side-channel message that, when delivered to a [`MaxSetLogic`] (or
/// [`FlakyFirstRoundLogic`], which delegates), replies on the returned receiver with a snapshot of
/// the logic's current values.
pub fn dump_request() -> (
    SideChannelMessage,
    tokio::sync::oneshot::Receiver<BTreeSet<i64>>,
) {
    let (tx, rx) = tokio::sync::oneshot::channel();
    (SideChannelMessage::new(DUMP_TAG, tx), rx)
}

/// A CRDT-ish union-of-integers logic used across the end-to-end scenarios (§8).
///
/// Gossips its full local set to every selected peer every round; merging is simply set union,
/// which is trivially idempotent under retransmission. Tracks which values have been confirmed
/// delivered to which peer purely for test assertions — the engine itself doesn't need this.
pub struct MaxSetLogic {
    context: LogicContext,
    values: BTreeSet<i64>,
    acked: Vec<(ractor::ActorId, i64)>,
    received_side_channel: Vec<String>,
    reject_side_channel: bool,
}

impl MaxSetLogic {
    pub fn new(context: LogicContext) -> Self {
        Self {
            context,
            values: BTreeSet::new(),
            acked: Vec::new(),
            received_side_channel: Vec::new(),
            reject_side_channel: false,
        }
    }

    pub fn with_seed(context: LogicContext, seed: impl IntoIterator<Item = i64>) -> Self {
        let mut logic = Self::new(context);
        logic.values.extend(seed);
        logic
    }

    /// Makes every subsequent side-channel message be rejected with
    /// [`SideChannelError::Rejected`], to exercise the "logic errors are logged but non-fatal"
    /// behavior (§7).
    pub fn reject_side_channel(mut self) -> Self {
        self.reject_side_channel = true;
        self
    }

    pub fn values(&self) -> BTreeSet<i64> {
        self.values.clone()
    }

    pub fn acked_count(&self) -> usize {
        self.acked.len()
    }

    pub fn side_channel_log(&self) -> &[String] {
        &self.received_side_channel
    }
}

#[async_trait]
impl GossipLogic<BTreeSet<i64>> for MaxSetLogic {
    async fn select_peers(&mut self, all: &[Peer<BTreeSet<i64>>]) -> Vec<Peer<BTreeSet<i64>>> {
        all.to_vec()
    }

    async fn make_payload(&mut self, _target: &Peer<BTreeSet<i64>>) -> Option<BTreeSet<i64>> {
        if self.values.is_empty() {
            None
        } else {
            Some(self.values.clone())
        }
    }

    async fn receive_gossip(&mut self, _origin: Peer<BTreeSet<i64>>, payload: BTreeSet<i64>) {
        self.values.extend(payload);
    }

    async fn receive_payload_ack(
        &mut self,
        target: Peer<BTreeSet<i64>>,
        confirmed_delivery_of: BTreeSet<i64>,
    ) {
        for value in confirmed_delivery_of {
            self.acked.push((target.id(), value));
        }
    }

    async fn local_gossip_update(&mut self, payload: BTreeSet<i64>) {
        self.values.extend(payload);
    }

    async fn receive_side_channel_message(
        &mut self,
        msg: SideChannelMessage,
    ) -> Result<(), SideChannelError> {
        if self.reject_side_channel {
            return Err(SideChannelError::Rejected(format!(
                "{} refused to process side channel input for {}",
                self.context.shell_name, self.context.identifier
            )));
        }

        if msg.tag() == DUMP_TAG {
            let reply: tokio::sync::oneshot::Sender<BTreeSet<i64>> = msg.downcast()?;
            let _ = reply.send(self.values.clone());
            return Ok(());
        }

        let text: String = msg.downcast()?;
        self.received_side_channel.push(text);
        Ok(())
    }
}

/// A logic that stalls the first gossip it receives from each origin past a configured delay,
/// used to exercise the "lossy round tolerance" scenario (§8 scenario 2): the shell still sends
/// the ACK once `receive_gossip` returns, but by then the sender's `ack_timeout` has already
/// elapsed, so the first round is reported to the sender's logic as a failure even though the
/// merge itself succeeded. Delegates everything else to [`MaxSetLogic`].
pub struct FlakyFirstRoundLogic {
    inner: MaxSetLogic,
    delayed_once: HashSet<ractor::ActorId>,
    delay: Duration,
}

impl FlakyFirstRoundLogic {
    pub fn new(context: LogicContext, seed: impl IntoIterator<Item = i64>, delay: Duration) -> Self {
        Self {
            inner: MaxSetLogic::with_seed(context, seed),
            delayed_once: HashSet::new(),
            delay,
        }
    }

    pub fn values(&self) -> BTreeSet<i64> {
        self.inner.values()
    }
}

#[async_trait]
impl GossipLogic<BTreeSet<i64>> for FlakyFirstRoundLogic {
    async fn select_peers(&mut self, all: &[Peer<BTreeSet<i64>>]) -> Vec<Peer<BTreeSet<i64>>> {
        self.inner.select_peers(all).await
    }

    async fn make_payload(&mut self, target: &Peer<BTreeSet<i64>>) -> Option<BTreeSet<i64>> {
        self.inner.make_payload(target).await
    }

    async fn receive_gossip(&mut self, origin: Peer<BTreeSet<i64>>, payload: BTreeSet<i64>) {
        if self.delayed_once.insert(origin.id()) {
            tokio::time::sleep(self.delay).await;
        }
        self.inner.receive_gossip(origin, payload).await;
    }

    async fn receive_payload_ack(
        &mut self,
        target: Peer<BTreeSet<i64>>,
        confirmed_delivery_of: BTreeSet<i64>,
    ) {
        self.inner
            .receive_payload_ack(target, confirmed_delivery_of)
            .await;
    }

    async fn local_gossip_update(&mut self, payload: BTreeSet<i64>) {
        self.inner.local_gossip_update(payload).await;
    }

    async fn receive_side_channel_message(
        &mut self,
        msg: SideChannelMessage,
    ) -> Result<(), SideChannelError> {
        self.inner.receive_side_channel_message(msg).await
    }
}
