//! Bridge records and their manager.
//!
//! A bridge is a runtime edge between two nets, owned by the component that
//! created it. The manager holds the canonical records; nets only carry
//! bridge ids. Attach/detach bookkeeping against the net map (membership
//! plus dirtying both endpoints) happens in the engine's action application,
//! which serializes all mutation.

use std::collections::HashMap;

use indexmap::IndexMap;

use relaysim_core::Id;

/// Runtime edge between two nets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bridge {
    pub id: Id,
    pub a: Id,
    pub b: Id,
    pub owner: Id,
}

impl Bridge {
    /// The endpoint opposite `net`, if `net` is an endpoint.
    pub fn other(&self, net: Id) -> Option<Id> {
        if net == self.a {
            Some(self.b)
        } else if net == self.b {
            Some(self.a)
        } else {
            None
        }
    }

    pub fn touches(&self, net: Id) -> bool {
        net == self.a || net == self.b
    }
}

#[derive(Debug, Default)]
pub struct BridgeManager {
    bridges: IndexMap<Id, Bridge>,
    by_owner: HashMap<Id, Vec<Id>>,
}

impl BridgeManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a freshly allocated bridge. Returns `false` (and changes
    /// nothing) when the id is already taken or the endpoints coincide.
    pub fn insert(&mut self, bridge: Bridge) -> bool {
        if bridge.a == bridge.b || self.bridges.contains_key(&bridge.id) {
            return false;
        }
        self.by_owner.entry(bridge.owner).or_default().push(bridge.id);
        self.bridges.insert(bridge.id, bridge);
        true
    }

    pub fn get(&self, id: Id) -> Option<&Bridge> {
        self.bridges.get(&id)
    }

    /// Re-point the endpoint currently at `from` to `to`. Returns the
    /// updated bridge.
    pub fn move_endpoint(&mut self, id: Id, from: Id, to: Id) -> Option<Bridge> {
        let bridge = self.bridges.get_mut(&id)?;
        if bridge.a == from {
            bridge.a = to;
        } else if bridge.b == from {
            bridge.b = to;
        } else {
            return None;
        }
        Some(*bridge)
    }

    /// Detach and drop a bridge, returning the removed record.
    pub fn remove(&mut self, id: Id) -> Option<Bridge> {
        let bridge = self.bridges.shift_remove(&id)?;
        if let Some(owned) = self.by_owner.get_mut(&bridge.owner) {
            owned.retain(|b| *b != id);
            if owned.is_empty() {
                self.by_owner.remove(&bridge.owner);
            }
        }
        Some(bridge)
    }

    /// Bridges owned by a component.
    pub fn owned_by(&self, owner: Id) -> Vec<Bridge> {
        self.by_owner
            .get(&owner)
            .into_iter()
            .flatten()
            .filter_map(|id| self.bridges.get(id))
            .copied()
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Bridge> {
        self.bridges.values()
    }

    pub fn len(&self) -> usize {
        self.bridges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bridges.is_empty()
    }

    /// Drop every bridge owned by one component, returning the removed
    /// records. Used when a component's run ends.
    pub fn clear_owner(&mut self, owner: Id) -> Vec<Bridge> {
        let Some(owned) = self.by_owner.remove(&owner) else {
            return Vec::new();
        };
        owned
            .into_iter()
            .filter_map(|id| self.bridges.shift_remove(&id))
            .collect()
    }

    /// Drop every bridge, returning the removed records.
    pub fn clear(&mut self) -> Vec<Bridge> {
        self.by_owner.clear();
        let drained: Vec<Bridge> = self.bridges.values().copied().collect();
        self.bridges.clear();
        drained
    }
}
