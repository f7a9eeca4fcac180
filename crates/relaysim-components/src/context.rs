//! The view a component gets of the running simulation.
//!
//! Reads go straight to the engine's net map; writes (pin drives, bridge
//! changes, timed wakeups) are recorded and applied by the engine at the end
//! of the phase, so every `evaluate` in one pass observes the same snapshot
//! of net states.

use std::time::Duration;

use relaysim_core::{Id, Signal};

/// Simulation services available to a component behavior.
pub trait SimContext {
    /// Current simulated time.
    fn now(&self) -> Duration;

    /// Resolved net state observed at a pin (what an indicator would show).
    fn observed(&self, pin: Id) -> Signal;

    /// The state this component is currently driving onto a pin.
    fn driven(&self, pin: Id) -> Signal;

    /// Drive a pin. Takes effect after the phase; a change marks the pin's
    /// net dirty.
    fn drive(&mut self, pin: Id, state: Signal);

    /// Net containing the pin's tabs, if the pin is wired into the build.
    fn net_of_pin(&self, pin: Id) -> Option<Id>;

    /// Net containing a tab.
    fn net_of_tab(&self, tab: Id) -> Option<Id>;

    /// Resolved state of a named link in this component's scope. Bus-reading
    /// components (memory) use this for buses they have no pins on.
    fn link_state(&self, name: &str) -> Signal;

    /// Allocate a bridge between two nets, owned by the current component.
    /// Returns `None` when the endpoints are missing or identical.
    fn create_bridge(&mut self, a: Id, b: Id) -> Option<Id>;

    /// Re-point one endpoint of an owned bridge.
    fn move_bridge(&mut self, bridge: Id, from: Id, to: Id);

    /// Destroy an owned bridge.
    fn destroy_bridge(&mut self, bridge: Id);

    /// Ask to be re-evaluated once simulated time reaches `deadline`.
    ///
    /// Wakeups are transient: the engine waits for them while converging,
    /// so they must die out (a relay armature completing its travel).
    fn wake_at(&mut self, deadline: Duration);

    /// Schedule a periodic tick at `deadline`.
    ///
    /// Unlike [`SimContext::wake_at`], ticks are recurring stimuli (a
    /// free-running clock). Convergence ignores them; the host drives them
    /// through the engine's `run_until`.
    fn schedule_tick(&mut self, deadline: Duration);
}

#[cfg(test)]
pub(crate) mod testing {
    //! Recording context for behavior unit tests.

    use std::collections::HashMap;
    use std::time::Duration;

    use relaysim_core::{Id, Signal};

    use super::SimContext;

    #[derive(Debug, Clone, PartialEq)]
    pub enum Recorded {
        Drive { pin: Id, state: Signal },
        CreateBridge { id: Id, a: Id, b: Id },
        MoveBridge { id: Id, from: Id, to: Id },
        DestroyBridge { id: Id },
        WakeAt { deadline: Duration },
        ScheduleTick { deadline: Duration },
    }

    /// In-memory stand-in for the engine context.
    #[derive(Debug, Default)]
    pub struct MockContext {
        pub now: Duration,
        pub observed: HashMap<Id, Signal>,
        pub driven: HashMap<Id, Signal>,
        pub pin_nets: HashMap<Id, Id>,
        pub tab_nets: HashMap<Id, Id>,
        pub link_states: HashMap<String, Signal>,
        pub recorded: Vec<Recorded>,
        next_bridge: u32,
    }

    impl MockContext {
        pub fn new() -> Self {
            Self {
                next_bridge: 0x9000_0000,
                ..Self::default()
            }
        }

        pub fn observe(&mut self, pin: Id, state: Signal) {
            self.observed.insert(pin, state);
        }

        pub fn set_link(&mut self, name: &str, state: Signal) {
            self.link_states.insert(name.to_string(), state);
        }

        pub fn take(&mut self) -> Vec<Recorded> {
            std::mem::take(&mut self.recorded)
        }
    }

    impl SimContext for MockContext {
        fn now(&self) -> Duration {
            self.now
        }

        fn observed(&self, pin: Id) -> Signal {
            self.observed.get(&pin).copied().unwrap_or_default()
        }

        fn driven(&self, pin: Id) -> Signal {
            self.driven.get(&pin).copied().unwrap_or_default()
        }

        fn drive(&mut self, pin: Id, state: Signal) {
            self.driven.insert(pin, state);
            self.recorded.push(Recorded::Drive { pin, state });
        }

        fn net_of_pin(&self, pin: Id) -> Option<Id> {
            self.pin_nets.get(&pin).copied()
        }

        fn net_of_tab(&self, tab: Id) -> Option<Id> {
            self.tab_nets.get(&tab).copied()
        }

        fn link_state(&self, name: &str) -> Signal {
            self.link_states.get(name).copied().unwrap_or_default()
        }

        fn create_bridge(&mut self, a: Id, b: Id) -> Option<Id> {
            if a == b {
                return None;
            }
            self.next_bridge += 1;
            let id = Id::from_raw(self.next_bridge);
            self.recorded.push(Recorded::CreateBridge { id, a, b });
            Some(id)
        }

        fn move_bridge(&mut self, bridge: Id, from: Id, to: Id) {
            self.recorded.push(Recorded::MoveBridge {
                id: bridge,
                from,
                to,
            });
        }

        fn destroy_bridge(&mut self, bridge: Id) {
            self.recorded.push(Recorded::DestroyBridge { id: bridge });
        }

        fn wake_at(&mut self, deadline: Duration) {
            self.recorded.push(Recorded::WakeAt { deadline });
        }

        fn schedule_tick(&mut self, deadline: Duration) {
            self.recorded.push(Recorded::ScheduleTick { deadline });
        }
    }
}
