// SPDX-License-Identifier: MIT OR Apache-2.0

use std::collections::HashMap;

use crate::identifier::GossipIdentifier;
use crate::logic::{GossipLogic, GossipLogicFactory, LogicContext};

/// Insertion-ordered `GossipIdentifier -> Box<dyn GossipLogic<E>>` mapping (§4.3).
///
/// Iteration order matches insertion order via `order`, a plain `Vec` kept alongside the lookup
/// map, so gossip rounds are deterministic without pulling in an external ordered-map crate.
pub struct LogicRegistry<E>
where
    E: Send + Sync + 'static,
{
    logics: HashMap<GossipIdentifier, Box<dyn GossipLogic<E>>>,
    order: Vec<GossipIdentifier>,
    factory: GossipLogicFactory<E>,
    shell_name: String,
}

impl<E> LogicRegistry<E>
where
    E: Send + Sync + 'static,
{
    pub fn new(shell_name: String, factory: GossipLogicFactory<E>) -> Self {
        Self {
            logics: HashMap::new(),
            order: Vec::new(),
            factory,
            shell_name,
        }
    }

    /// Returns the logic for `id`, constructing it via the factory if this is the first
    /// reference (§3: "created lazily on first reference").
    pub fn get_or_create(&mut self, id: &GossipIdentifier) -> &mut Box<dyn GossipLogic<E>> {
        if !self.logics.contains_key(id) {
            let context = LogicContext {
                identifier: id.clone(),
                shell_name: self.shell_name.clone(),
            };
            self.logics.insert(id.clone(), (self.factory)(context));
            self.order.push(id.clone());
        }
        self.logics.get_mut(id).expect("just inserted")
    }

    pub fn get_mut(&mut self, id: &GossipIdentifier) -> Option<&mut Box<dyn GossipLogic<E>>> {
        self.logics.get_mut(id)
    }

    pub fn contains(&self, id: &GossipIdentifier) -> bool {
        self.logics.contains_key(id)
    }

    /// Drops the logic for `id` (§4.6 `RemovePayload`). A subsequent `get_or_create` for the
    /// same identifier re-creates a fresh instance (§9, kept as an explicit open-question call).
    pub fn remove(&mut self, id: &GossipIdentifier) {
        if self.logics.remove(id).is_some() {
            self.order.retain(|existing| existing != id);
        }
    }

    /// Identifiers in insertion order, the iteration order gossip rounds use (§4.7 step 3).
    pub fn ids_in_order(&self) -> &[GossipIdentifier] {
        &self.order
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::error::SideChannelError;
    use crate::peer::Peer;
    use crate::side_channel::SideChannelMessage;

    struct NoopLogic;

    #[async_trait]
    impl GossipLogic<u32> for NoopLogic {
        async fn select_peers(&mut self, _all: &[Peer<u32>]) -> Vec<Peer<u32>> {
            Vec::new()
        }

        async fn make_payload(&mut self, _target: &Peer<u32>) -> Option<u32> {
            None
        }

        async fn receive_gossip(&mut self, _origin: Peer<u32>, _payload: u32) {}

        async fn receive_payload_ack(&mut self, _target: Peer<u32>, _confirmed_delivery_of: u32) {}

        async fn local_gossip_update(&mut self, _payload: u32) {}

        async fn receive_side_channel_message(
            &mut self,
            _msg: SideChannelMessage,
        ) -> Result<(), SideChannelError> {
            Ok(())
        }
    }

    fn factory() -> GossipLogicFactory<u32> {
        Box::new(|_ctx| Box::new(NoopLogic))
    }

    #[test]
    fn creates_at_most_one_logic_per_identifier() {
        let mut registry = LogicRegistry::new("shell".to_string(), factory());
        let id = GossipIdentifier::new("x");

        assert!(!registry.contains(&id));
        registry.get_or_create(&id);
        registry.get_or_create(&id);

        assert_eq!(registry.ids_in_order(), &[id]);
    }

    #[test]
    fn iterates_in_insertion_order() {
        let mut registry = LogicRegistry::new("shell".to_string(), factory());
        let a = GossipIdentifier::new("a");
        let b = GossipIdentifier::new("b");
        let c = GossipIdentifier::new("c");

        registry.get_or_create(&b);
        registry.get_or_create(&a);
        registry.get_or_create(&c);

        assert_eq!(registry.ids_in_order(), &[b, a, c]);
    }

    #[test]
    fn remove_drops_instance_and_order_entry() {
        let mut registry = LogicRegistry::new("shell".to_string(), factory());
        let id = GossipIdentifier::new("x");
        registry.get_or_create(&id);
        registry.remove(&id);

        assert!(!registry.contains(&id));
        assert!(registry.ids_in_order().is_empty());
    }
}
