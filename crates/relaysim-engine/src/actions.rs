//! Recorded component actions and the context that records them.
//!
//! Behaviors never mutate nets directly. Their context reads the net-state
//! snapshot and appends actions; the engine applies the actions at the end
//! of the phase, in component-id order, which keeps every `evaluate` of a
//! pass on the same consistent snapshot and makes the parallel scheduler a
//! drop-in replacement for the serial one.

use std::sync::Mutex;
use std::time::Duration;

use relaysim_components::SimContext;
use relaysim_core::{Id, IdAllocator, Signal};

use crate::netmap::NetMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Action {
    Drive {
        pin: Id,
        state: Signal,
    },
    CreateBridge {
        id: Id,
        a: Id,
        b: Id,
        owner: Id,
    },
    MoveBridge {
        id: Id,
        from: Id,
        to: Id,
        owner: Id,
    },
    DestroyBridge {
        id: Id,
        owner: Id,
    },
    WakeAt {
        component: Id,
        deadline: Duration,
    },
    ScheduleTick {
        component: Id,
        deadline: Duration,
    },
}

/// Context handed to one component for one lifecycle call.
pub(crate) struct RecordingCtx<'a> {
    component: Id,
    nets: &'a NetMap,
    now: Duration,
    run_ids: &'a Mutex<IdAllocator>,
    pub actions: Vec<Action>,
}

impl<'a> RecordingCtx<'a> {
    pub fn new(
        component: Id,
        nets: &'a NetMap,
        now: Duration,
        run_ids: &'a Mutex<IdAllocator>,
    ) -> Self {
        Self {
            component,
            nets,
            now,
            run_ids,
            actions: Vec::new(),
        }
    }
}

impl SimContext for RecordingCtx<'_> {
    fn now(&self) -> Duration {
        self.now
    }

    fn observed(&self, pin: Id) -> Signal {
        self.nets.observed(pin)
    }

    fn driven(&self, pin: Id) -> Signal {
        self.nets.driven(pin)
    }

    fn drive(&mut self, pin: Id, state: Signal) {
        self.actions.push(Action::Drive { pin, state });
    }

    fn net_of_pin(&self, pin: Id) -> Option<Id> {
        self.nets.net_of_pin(pin)
    }

    fn net_of_tab(&self, tab: Id) -> Option<Id> {
        self.nets.net_of_tab(tab)
    }

    fn link_state(&self, name: &str) -> Signal {
        self.nets
            .link_state(self.nets.scope_of_component(self.component), name)
    }

    fn create_bridge(&mut self, a: Id, b: Id) -> Option<Id> {
        if a == b {
            return None;
        }
        let id = self.run_ids.lock().unwrap().allocate();
        self.actions.push(Action::CreateBridge {
            id,
            a,
            b,
            owner: self.component,
        });
        Some(id)
    }

    fn move_bridge(&mut self, bridge: Id, from: Id, to: Id) {
        self.actions.push(Action::MoveBridge {
            id: bridge,
            from,
            to,
            owner: self.component,
        });
    }

    fn destroy_bridge(&mut self, bridge: Id) {
        self.actions.push(Action::DestroyBridge {
            id: bridge,
            owner: self.component,
        });
    }

    fn wake_at(&mut self, deadline: Duration) {
        self.actions.push(Action::WakeAt {
            component: self.component,
            deadline,
        });
    }

    fn schedule_tick(&mut self, deadline: Duration) {
        self.actions.push(Action::ScheduleTick {
            component: self.component,
            deadline,
        });
    }
}
