// SPDX-License-Identifier: MIT OR Apache-2.0

use async_trait::async_trait;

use crate::peer::Peer;

/// A stream of listing refreshes for a receptionist key.
///
/// `ractor::registry` gives point lookups (`where_is`); it has no built-in push notification
/// when the set of actors registered under a key changes. This trait is the narrow "sub-receive
/// adapter" (§6) a host wires up on top of `ractor::registry` plus whatever out-of-band signal
/// tells it a listing changed (commonly: poll on an interval, or re-use the same
/// `ClusterEvents` stream to trigger a re-list).
#[async_trait]
pub trait ReceptionistListings<E>: Send + Sync + 'static
where
    E: Send + Sync + 'static,
{
    /// Returns the next listing snapshot for the key this stream was created for, or `None` once
    /// the subscription is permanently closed.
    async fn next_listing(&mut self) -> Option<Vec<Peer<E>>>;
}
