// SPDX-License-Identifier: MIT OR Apache-2.0

//! The Gossip Shell: the single long-lived actor that owns a peer set, a per-identifier logic
//! registry, and a round scheduler (§2, §4.9 in spirit — the orchestrator itself).

use std::marker::PhantomData;
use std::time::Duration;

use ractor::{
    Actor, ActorId, ActorProcessingErr, ActorRef, CallResult, Message, RpcReplyPort,
    SupervisionEvent,
};
use tokio::task::JoinHandle;
use tracing::{debug, error, trace, warn};

use crate::actors::peer_set::PeerSet;
use crate::actors::registry::LogicRegistry;
use crate::control::GossipControl;
use crate::discovery::{ClusterEvent, ClusterEvents, MemberStatus, NodeId, PeerResolver, ReceptionistListings};
use crate::error::GossipError;
use crate::identifier::GossipIdentifier;
use crate::logic::GossipLogicFactory;
use crate::peer::Peer;
use crate::settings::{DiscoveryMode, Settings};
use crate::side_channel::{SideChannelMessage, SideChannelOutcome};

/// Empty reply confirming a [`ShellMsg::Gossip`] was delivered and handed to the logic for
/// merging (§4.6). Carries no information beyond its arrival — it is *not* an application-level
/// acceptance signal (§7).
#[derive(Clone, Copy, Debug, Default)]
pub struct GossipAck;

/// Outcome of a single in-flight gossip send, reported back to the shell via
/// [`ShellMsg::AckCompleted`] once the background ask task resolves (§4.7).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AckResult {
    Acknowledged,
    Failed,
}

/// Host-supplied collaborators feeding the two automatic [`DiscoveryMode`]s (§4.5). `Manual`
/// mode needs none of this — it is fed exclusively through [`GossipControl::introduce`].
pub struct ShellDiscoverySources<E>
where
    E: Send + Sync + 'static,
{
    pub cluster: Option<ClusterSource<E>>,
    pub receptionist: Option<ReceptionistSource<E>>,
}

impl<E> Default for ShellDiscoverySources<E>
where
    E: Send + Sync + 'static,
{
    fn default() -> Self {
        Self {
            cluster: None,
            receptionist: None,
        }
    }
}

/// Collaborators required for [`DiscoveryMode::ClusterEvents`].
pub struct ClusterSource<E>
where
    E: Send + Sync + 'static,
{
    pub self_node: NodeId,
    pub events: Box<dyn ClusterEvents<E>>,
    pub resolver: Box<dyn PeerResolver<E>>,
}

/// Collaborators required for [`DiscoveryMode::Receptionist`].
pub struct ReceptionistSource<E>
where
    E: Send + Sync + 'static,
{
    pub listings: Box<dyn ReceptionistListings<E>>,
}

/// Inbound messages the shell accepts (§4.6).
pub enum ShellMsg<E>
where
    E: Send + Sync + 'static,
{
    /// Peer-to-peer gossip arrival.
    Gossip {
        id: GossipIdentifier,
        origin: Peer<E>,
        payload: E,
        ack_reply: RpcReplyPort<GossipAck>,
    },
    /// Local application update, routed to `local_gossip_update`.
    UpdatePayload { id: GossipIdentifier, payload: E },
    /// Drops the logic for `id`.
    RemovePayload { id: GossipIdentifier },
    /// External peer hint; the single narrow gate into the peer set (§4.5).
    IntroducePeer { peer: Peer<E> },
    /// Dynamically-typed application signal to a specific logic.
    SideChannel {
        id: GossipIdentifier,
        msg: SideChannelMessage,
        reply: RpcReplyPort<SideChannelOutcome>,
    },
    /// Scheduler fire.
    PeriodicTick,
    /// Internal: a background ask task reporting the outcome of one gossip send.
    AckCompleted {
        id: GossipIdentifier,
        target: Peer<E>,
        payload: E,
        result: AckResult,
    },
    /// Internal: forwarded from the `ClusterEvents` subscription task.
    ClusterEvent(ClusterEvent),
    /// Internal: forwarded from the `ReceptionistListings` subscription task.
    ReceptionistListing(Vec<Peer<E>>),
    /// Reports the current peer set size. Not part of §4.6's original enumeration; added purely
    /// as a read-only introspection point so callers (and the test suite) can observe §8's
    /// self-exclusion and idempotent-introduction invariants without reaching into shell state.
    PeerCount { reply: RpcReplyPort<usize> },
}

impl<E> Message for ShellMsg<E> where E: Send + Sync + 'static {}

enum ActiveDiscovery<E>
where
    E: Send + Sync + 'static,
{
    Manual,
    Cluster {
        self_node: NodeId,
        status_floor: MemberStatus,
        resolver: Box<dyn PeerResolver<E>>,
    },
    Receptionist,
}

pub struct ShellState<E>
where
    E: Send + Sync + 'static,
{
    name: String,
    settings: Settings,
    peers: PeerSet<E>,
    registry: LogicRegistry<E>,
    timer: Option<JoinHandle<()>>,
    discovery: ActiveDiscovery<E>,
}

/// The actor implementing the engine described in §2. Parameterized over the envelope type `E`;
/// `E` must be `Clone` so a payload can be both sent in a `Gossip` message and retained for the
/// `receive_payload_ack` callback once the send is confirmed (§4.7).
pub struct GossipShell<E>(PhantomData<E>)
where
    E: Clone + Send + Sync + 'static;

impl<E> Default for GossipShell<E>
where
    E: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self(PhantomData)
    }
}

impl<E> GossipShell<E>
where
    E: Clone + Send + Sync + 'static,
{
    /// Spawns a gossip shell and returns a [`GossipControl`] façade plus the actor's join handle
    /// (§6 "Exposed to callers").
    pub async fn start(
        name: impl Into<String>,
        settings: Settings,
        make_logic: GossipLogicFactory<E>,
        discovery: Option<ShellDiscoverySources<E>>,
    ) -> Result<(GossipControl<E>, JoinHandle<()>), GossipError> {
        let name = name.into();
        let (actor_ref, join_handle) = Actor::spawn(
            None,
            GossipShell::default(),
            (name, settings, make_logic, discovery),
        )
        .await?;
        Ok((GossipControl::new(actor_ref), join_handle))
    }
}

impl<E> Actor for GossipShell<E>
where
    E: Clone + Send + Sync + 'static,
{
    type Msg = ShellMsg<E>;
    type State = ShellState<E>;
    type Arguments = (
        String,
        Settings,
        GossipLogicFactory<E>,
        Option<ShellDiscoverySources<E>>,
    );

    async fn pre_start(
        &self,
        myself: ActorRef<Self::Msg>,
        args: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        let (name, settings, make_logic, discovery) = args;

        let active_discovery = match settings.discovery_mode.clone() {
            DiscoveryMode::Manual => ActiveDiscovery::Manual,
            DiscoveryMode::ClusterEvents { status_floor } => {
                let source = discovery
                    .and_then(|sources| sources.cluster)
                    .ok_or_else(|| -> ActorProcessingErr {
                        "cluster-event discovery mode requires a ClusterSource".into()
                    })?;
                let ClusterSource {
                    self_node,
                    mut events,
                    resolver,
                } = source;

                let forward = myself.clone();
                tokio::spawn(async move {
                    while let Some(event) = events.next_event().await {
                        if forward.cast(ShellMsg::ClusterEvent(event)).is_err() {
                            break;
                        }
                    }
                });

                ActiveDiscovery::Cluster {
                    self_node,
                    status_floor,
                    resolver,
                }
            }
            DiscoveryMode::Receptionist { key } => {
                let source = discovery
                    .and_then(|sources| sources.receptionist)
                    .ok_or_else(|| -> ActorProcessingErr {
                        "receptionist discovery mode requires a ReceptionistSource".into()
                    })?;

                ractor::registry::register(key.clone(), myself.get_cell()).map_err(
                    |err| -> ActorProcessingErr {
                        format!("failed to register under receptionist key '{key}': {err:?}").into()
                    },
                )?;

                let mut listings = source.listings;
                let forward = myself.clone();
                tokio::spawn(async move {
                    while let Some(listing) = listings.next_listing().await {
                        if forward.cast(ShellMsg::ReceptionistListing(listing)).is_err() {
                            break;
                        }
                    }
                });

                ActiveDiscovery::Receptionist
            }
        };

        Ok(ShellState {
            registry: LogicRegistry::new(name.clone(), make_logic),
            name,
            settings,
            peers: PeerSet::new(),
            timer: None,
            discovery: active_discovery,
        })
    }

    async fn post_stop(
        &self,
        _myself: ActorRef<Self::Msg>,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        cancel_timer(state);
        Ok(())
    }

    async fn handle(
        &self,
        myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            ShellMsg::Gossip {
                id,
                origin,
                payload,
                ack_reply,
            } => {
                let logic = state.registry.get_or_create(&id);
                logic.receive_gossip(origin, payload).await;

                if !ack_reply.is_closed() {
                    let _ = ack_reply.send(GossipAck);
                }
            }
            ShellMsg::UpdatePayload { id, payload } => {
                let logic = state.registry.get_or_create(&id);
                logic.local_gossip_update(payload).await;
            }
            ShellMsg::RemovePayload { id } => {
                state.registry.remove(&id);
            }
            ShellMsg::IntroducePeer { peer } => {
                introduce_peer(state, &myself, peer);
            }
            ShellMsg::SideChannel { id, msg, reply } => {
                if state.registry.contains(&id) {
                    let logic = state
                        .registry
                        .get_mut(&id)
                        .expect("presence just checked above");
                    if let Err(err) = logic.receive_side_channel_message(msg).await {
                        error!(identifier = %id, error = %err, "side channel message rejected by logic");
                    }
                    if !reply.is_closed() {
                        let _ = reply.send(SideChannelOutcome::Received);
                    }
                } else if !reply.is_closed() {
                    let _ = reply.send(SideChannelOutcome::Unhandled);
                }
            }
            ShellMsg::PeriodicTick => {
                state.timer = None;
                run_round(state, &myself, state.settings.ack_timeout).await;
            }
            ShellMsg::AckCompleted {
                id,
                target,
                payload,
                result,
            } => match result {
                AckResult::Acknowledged => {
                    if let Some(logic) = state.registry.get_mut(&id) {
                        logic.receive_payload_ack(target, payload).await;
                    }
                }
                AckResult::Failed => {
                    warn!(
                        identifier = %id,
                        peer = ?target.id(),
                        "gossip send failed or timed out; continuing without retry"
                    );
                }
            },
            ShellMsg::ClusterEvent(event) => {
                handle_cluster_event(state, &myself, event).await;
            }
            ShellMsg::ReceptionistListing(listing) => {
                for peer in listing {
                    introduce_peer(state, &myself, peer);
                }
            }
            ShellMsg::PeerCount { reply } => {
                if !reply.is_closed() {
                    let _ = reply.send(state.peers.len());
                }
            }
        }

        ensure_next_round(state, &myself);

        Ok(())
    }

    async fn handle_supervisor_evt(
        &self,
        myself: ActorRef<Self::Msg>,
        message: SupervisionEvent,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            SupervisionEvent::ActorTerminated(actor, _boxed_state, reason) => {
                if state.peers.remove(actor.get_id()).is_some() {
                    debug!(peer = ?actor.get_id(), ?reason, "peer terminated, removed from peer set");
                }
            }
            SupervisionEvent::ActorFailed(actor, err) => {
                if state.peers.remove(actor.get_id()).is_some() {
                    warn!(peer = ?actor.get_id(), error = %err, "peer failed, removed from peer set");
                }
            }
            _ => {}
        }

        if state.peers.is_empty() {
            cancel_timer(state);
        } else {
            ensure_next_round(state, &myself);
        }

        Ok(())
    }
}

/// The single narrow gate all peer discovery funnels through (§4.5): rejects self, links the
/// peer for termination notification, inserts it, and (if this was the first peer) arms the
/// round timer.
fn introduce_peer<E>(state: &mut ShellState<E>, myself: &ActorRef<ShellMsg<E>>, peer: Peer<E>)
where
    E: Clone + Send + Sync + 'static,
{
    if peer.id() == myself.get_id() {
        trace!(shell = %state.name, "ignored self-introduction");
        return;
    }

    if state.peers.insert(peer.clone()) {
        myself.link(peer.actor().clone().into());
        debug!(shell = %state.name, peer = ?peer.id(), "introduced new peer");
    }
}

async fn handle_cluster_event<E>(
    state: &mut ShellState<E>,
    myself: &ActorRef<ShellMsg<E>>,
    event: ClusterEvent,
) where
    E: Clone + Send + Sync + 'static,
{
    let (self_node, status_floor) = match &state.discovery {
        ActiveDiscovery::Cluster {
            self_node,
            status_floor,
            ..
        } => (self_node.clone(), *status_floor),
        _ => return,
    };

    let candidates: Vec<NodeId> = match event {
        ClusterEvent::Snapshot(members) => members
            .into_iter()
            .filter(|member| member.status >= status_floor && member.node_id != self_node)
            .map(|member| member.node_id)
            .collect(),
        ClusterEvent::MembershipChange(member) => {
            if member.status >= status_floor && member.node_id != self_node {
                vec![member.node_id]
            } else {
                Vec::new()
            }
        }
    };

    // Resolve every candidate while only holding an immutable borrow of `state.discovery`, then
    // drop it before mutating the peer set through `introduce_peer` below.
    let mut resolved = Vec::with_capacity(candidates.len());
    for node_id in candidates {
        let peer = match &state.discovery {
            ActiveDiscovery::Cluster { resolver, .. } => resolver.resolve(&node_id).await,
            _ => None,
        };
        resolved.push((node_id, peer));
    }

    for (node_id, peer) in resolved {
        match peer {
            Some(peer) => introduce_peer(state, myself, peer),
            None => warn!(node_id = ?node_id, "cluster member resolved to no usable peer reference"),
        }
    }
}

fn ensure_next_round<E>(state: &mut ShellState<E>, myself: &ActorRef<ShellMsg<E>>)
where
    E: Clone + Send + Sync + 'static,
{
    if state.peers.is_empty() || state.timer.is_some() {
        return;
    }

    let interval = state.settings.sample_interval(&mut rand::rng());
    let handle = myself.send_after(interval, || ShellMsg::PeriodicTick);
    state.timer = Some(handle);
}

fn cancel_timer<E>(state: &mut ShellState<E>)
where
    E: Send + Sync + 'static,
{
    if let Some(handle) = state.timer.take() {
        handle.abort();
    }
}

async fn run_round<E>(state: &mut ShellState<E>, myself: &ActorRef<ShellMsg<E>>, ack_timeout: Duration)
where
    E: Clone + Send + Sync + 'static,
{
    if state.peers.is_empty() {
        return;
    }

    let snapshot = state.peers.snapshot();

    for id in state.registry.ids_in_order().to_vec() {
        let logic = match state.registry.get_mut(&id) {
            Some(logic) => logic,
            None => continue,
        };

        let targets = logic.select_peers(&snapshot).await;
        for target in targets {
            let payload = match logic.make_payload(&target).await {
                Some(payload) => payload,
                None => continue,
            };

            spawn_ack_wait(myself.clone(), id.clone(), target, payload, ack_timeout);
        }
    }
}

fn spawn_ack_wait<E>(
    myself: ActorRef<ShellMsg<E>>,
    id: GossipIdentifier,
    target: Peer<E>,
    payload: E,
    ack_timeout: Duration,
) where
    E: Clone + Send + Sync + 'static,
{
    let peer_actor = target.actor().clone();
    let sender = myself.clone();
    let ack_id = id.clone();
    let outbound_payload = payload.clone();

    tokio::spawn(async move {
        let call_result = peer_actor
            .call(
                move |ack_reply| ShellMsg::Gossip {
                    id,
                    origin: Peer::new(sender),
                    payload: outbound_payload,
                    ack_reply,
                },
                Some(ack_timeout),
            )
            .await;

        let result = match call_result {
            Ok(CallResult::Success(_ack)) => AckResult::Acknowledged,
            _ => AckResult::Failed,
        };

        let _ = myself.cast(ShellMsg::AckCompleted {
            id: ack_id,
            target,
            payload,
            result,
        });
    });
}
