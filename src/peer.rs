// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt;
use std::hash::{Hash, Hasher};

use ractor::{ActorId, ActorRef};

use crate::actors::shell::ShellMsg;

/// An addressable handle to another [`crate::actors::shell::GossipShell`] of the same envelope
/// type.
///
/// Peers are compared by address (their [`ActorId`]), never by the data they currently hold —
/// two `Peer<E>` values referring to the same shell actor are equal even across clones.
#[derive(Clone)]
pub struct Peer<E>(ActorRef<ShellMsg<E>>)
where
    E: Send + Sync + 'static;

impl<E> Peer<E>
where
    E: Send + Sync + 'static,
{
    pub fn new(actor: ActorRef<ShellMsg<E>>) -> Self {
        Self(actor)
    }

    pub fn id(&self) -> ActorId {
        self.0.get_id()
    }

    pub fn actor(&self) -> &ActorRef<ShellMsg<E>> {
        &self.0
    }

    pub fn is_alive(&self) -> bool {
        self.0.get_status() == ractor::ActorStatus::Running
    }
}

impl<E> PartialEq for Peer<E>
where
    E: Send + Sync + 'static,
{
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl<E> Eq for Peer<E> where E: Send + Sync + 'static {}

impl<E> Hash for Peer<E>
where
    E: Send + Sync + 'static,
{
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

impl<E> fmt::Debug for Peer<E>
where
    E: Send + Sync + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Peer").field(&self.id()).finish()
    }
}
