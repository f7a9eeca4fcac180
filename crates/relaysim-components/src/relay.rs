//! DPDT relay: two poles switched between NC and NO contacts by the coil.
//!
//! The armature takes a nominal 10 ms to travel, measured on the injected
//! simulation clock. A coil edge arms one deadline; the opposite edge before
//! the deadline cancels it (transitions collapse, they do not queue). On
//! expiry both pole bridges move from the NC contacts to the NO contacts or
//! back, and the affected nets are re-evaluated.

use std::time::Duration;

use relaysim_core::{Component, ComponentKind, Id, PropertyMap, Signal};

use crate::behavior::{Behavior, Lifecycle};
use crate::context::SimContext;
use crate::error::{Error, Result};

/// Armature travel time.
pub const SWITCHING_DELAY: Duration = Duration::from_millis(10);

/// Pin order of a DPDT relay component.
pub mod pins {
    pub const COIL: usize = 0;
    pub const COM1: usize = 1;
    pub const NO1: usize = 2;
    pub const NC1: usize = 3;
    pub const COM2: usize = 4;
    pub const NO2: usize = 5;
    pub const NC2: usize = 6;
    pub const COUNT: usize = 7;
}

#[derive(Debug, Clone, Copy)]
struct PendingSwitch {
    target: bool,
    deadline: Duration,
}

/// One pole's runtime wiring: the bridge and the nets of its contacts.
#[derive(Debug, Clone, Copy, Default)]
struct Pole {
    bridge: Option<Id>,
    com_net: Option<Id>,
    nc_net: Option<Id>,
    no_net: Option<Id>,
}

impl Pole {
    /// Swing the bridge to the contacts for `energized`.
    fn throw(&mut self, ctx: &mut dyn SimContext, energized: bool) {
        let (from, to) = if energized {
            (self.nc_net, self.no_net)
        } else {
            (self.no_net, self.nc_net)
        };
        match (self.bridge, from, to) {
            (Some(bridge), Some(from), Some(to)) if from != to => {
                ctx.move_bridge(bridge, from, to);
            }
            (None, _, Some(to)) => {
                // The contact pair may have been unbridgeable at start
                // (e.g. COM shorted to NC by wire); try again now.
                if let Some(com) = self.com_net {
                    self.bridge = ctx.create_bridge(com, to);
                }
            }
            _ => {}
        }
    }
}

#[derive(Debug)]
pub struct DpdtRelay {
    component: Id,
    pin_ids: [Id; pins::COUNT],
    energized: bool,
    pending: Option<PendingSwitch>,
    pole1: Pole,
    pole2: Pole,
    delay: Duration,
    lifecycle: Lifecycle,
}

impl DpdtRelay {
    pub fn from_component(component: &Component) -> Result<Self> {
        let mut pin_ids = [Id::from_raw(0); pins::COUNT];
        const ROLES: [&str; pins::COUNT] =
            ["COIL", "COM1", "NO1", "NC1", "COM2", "NO2", "NC2"];
        for (index, role) in ROLES.iter().enumerate() {
            pin_ids[index] = component
                .pins
                .get(index)
                .ok_or(Error::MissingPin {
                    component: component.id,
                    role,
                    index,
                })?
                .id;
        }
        Ok(Self {
            component: component.id,
            pin_ids,
            energized: false,
            pending: None,
            pole1: Pole::default(),
            pole2: Pole::default(),
            delay: SWITCHING_DELAY,
            lifecycle: Lifecycle::Idle,
        })
    }

    pub fn is_energized(&self) -> bool {
        self.energized
    }

    pub fn has_pending_switch(&self) -> bool {
        self.pending.is_some()
    }

    fn pin(&self, index: usize) -> Id {
        self.pin_ids[index]
    }

    fn wire_pole(
        &self,
        ctx: &mut dyn SimContext,
        com: usize,
        no: usize,
        nc: usize,
    ) -> Pole {
        let com_net = ctx.net_of_pin(self.pin(com));
        let nc_net = ctx.net_of_pin(self.pin(nc));
        let no_net = ctx.net_of_pin(self.pin(no));
        let bridge = match (com_net, nc_net) {
            (Some(a), Some(b)) if a != b => ctx.create_bridge(a, b),
            _ => None,
        };
        Pole {
            bridge,
            com_net,
            nc_net,
            no_net,
        }
    }

    fn switch_contacts(&mut self, ctx: &mut dyn SimContext, target: bool) {
        self.energized = target;
        let mut pole1 = self.pole1;
        let mut pole2 = self.pole2;
        pole1.throw(ctx, target);
        pole2.throw(ctx, target);
        self.pole1 = pole1;
        self.pole2 = pole2;
    }
}

impl Behavior for DpdtRelay {
    fn component_id(&self) -> Id {
        self.component
    }

    fn kind(&self) -> ComponentKind {
        ComponentKind::DpdtRelay
    }

    fn on_start(&mut self, ctx: &mut dyn SimContext) -> Result<()> {
        self.lifecycle.expect_idle(self.component, "on_start")?;
        self.lifecycle = Lifecycle::Running;
        self.energized = false;
        self.pending = None;

        for pin in self.pin_ids {
            ctx.drive(pin, Signal::Float);
        }

        // De-energized rest position: COM connected to NC on both poles.
        self.pole1 = self.wire_pole(ctx, pins::COM1, pins::NO1, pins::NC1);
        self.pole2 = self.wire_pole(ctx, pins::COM2, pins::NO2, pins::NC2);
        Ok(())
    }

    fn evaluate(&mut self, ctx: &mut dyn SimContext) -> Result<()> {
        self.lifecycle.expect_running(self.component, "evaluate")?;

        let target = ctx.observed(self.pin(pins::COIL)).is_high();

        match self.pending {
            Some(pending) => {
                if target == self.energized {
                    // Coil returned before the armature moved; nothing
                    // happens.
                    self.pending = None;
                } else if ctx.now() >= pending.deadline {
                    self.pending = None;
                    self.switch_contacts(ctx, target);
                } else {
                    ctx.wake_at(pending.deadline);
                }
            }
            None => {
                if target != self.energized {
                    let deadline = ctx.now() + self.delay;
                    self.pending = Some(PendingSwitch { target, deadline });
                    ctx.wake_at(deadline);
                }
            }
        }
        Ok(())
    }

    fn interact(&mut self, _action: &str, _params: &PropertyMap) -> Result<bool> {
        self.lifecycle.expect_running(self.component, "interact")?;
        // Relays are controlled by the coil, not by the user.
        Ok(false)
    }

    fn on_stop(&mut self) -> Result<()> {
        self.energized = false;
        self.pending = None;
        self.pole1 = Pole::default();
        self.pole2 = Pole::default();
        self.lifecycle = Lifecycle::Idle;
        Ok(())
    }
}
