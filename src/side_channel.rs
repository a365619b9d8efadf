// SPDX-License-Identifier: MIT OR Apache-2.0

use std::any::Any;
use std::fmt;

use crate::error::SideChannelError;

/// A dynamically-typed, out-of-band message addressed to a single logic's identifier.
///
/// The reference implementation passes a fully untyped value here; this implementation keeps a
/// small amount of type discipline (a logging tag plus a downcastable payload) instead of
/// spreading `Box<dyn Any>` handling across every call site (§9).
pub struct SideChannelMessage {
    tag: &'static str,
    payload: Box<dyn Any + Send>,
}

impl SideChannelMessage {
    pub fn new<T: Any + Send>(tag: &'static str, payload: T) -> Self {
        Self {
            tag,
            payload: Box::new(payload),
        }
    }

    pub fn tag(&self) -> &'static str {
        self.tag
    }

    /// Downcasts the payload to `T`, returning a [`SideChannelError::UnexpectedType`] tagged
    /// with this message's logging tag if it doesn't match.
    pub fn downcast<T: Any>(self) -> Result<T, SideChannelError> {
        match self.payload.downcast::<T>() {
            Ok(value) => Ok(*value),
            Err(_) => Err(SideChannelError::UnexpectedType(self.tag)),
        }
    }
}

impl fmt::Debug for SideChannelMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SideChannelMessage")
            .field("tag", &self.tag)
            .finish_non_exhaustive()
    }
}

/// Outcome of a [`crate::control::GossipControl::side_channel_tell`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SideChannelOutcome {
    /// A logic for the targeted identifier existed and received the message (even if it
    /// rejected it — rejection is logged, not surfaced here, per §7).
    Received,

    /// No logic exists for the targeted identifier; the runtime applies its dead-letter policy.
    Unhandled,
}
