//! Immutable view of a stable engine for observers.

use relaysim_core::{ComponentKind, Id, Point, Signal};

/// A pin and the state it observes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinState {
    pub pin: Id,
    pub state: Signal,
}

/// One component's stable state.
#[derive(Debug, Clone)]
pub struct ComponentSnapshot {
    pub id: Id,
    pub kind: ComponentKind,
    pub position: Point,
    pub pin_states: Vec<PinState>,
    /// Set when the component's last `evaluate` failed; the run continued
    /// without it.
    pub last_error: Option<String>,
}

impl ComponentSnapshot {
    /// The observed state of the component's first pin; what an indicator
    /// shows.
    pub fn primary_state(&self) -> Signal {
        self.pin_states
            .first()
            .map(|p| p.state)
            .unwrap_or_default()
    }
}

/// One net's stable state.
#[derive(Debug, Clone)]
pub struct NetSnapshot {
    pub id: Id,
    /// Page the member tabs live on.
    pub page: Id,
    pub state: Signal,
    /// Member tab ids, ascending.
    pub members: Vec<Id>,
}

/// Stable-state view handed to observers; never aliases engine internals.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub components: Vec<ComponentSnapshot>,
    pub nets: Vec<NetSnapshot>,
}

impl Snapshot {
    pub fn component(&self, id: Id) -> Option<&ComponentSnapshot> {
        self.components.iter().find(|c| c.id == id)
    }

    pub fn net(&self, id: Id) -> Option<&NetSnapshot> {
        self.nets.iter().find(|n| n.id == id)
    }

    /// The net containing a tab.
    pub fn net_of_tab(&self, tab: Id) -> Option<&NetSnapshot> {
        self.nets.iter().find(|n| n.members.contains(&tab))
    }
}
