//! Diode: one-way HIGH propagation from anode to cathode.
//!
//! If the anode's net is HIGH the cathode is driven HIGH; otherwise the
//! cathode floats. Nothing ever propagates back to the anode.

use relaysim_core::{Component, ComponentKind, Id, PropertyMap, Signal};

use crate::behavior::{Behavior, Lifecycle};
use crate::context::SimContext;
use crate::error::{Error, Result};

/// Pin order of a diode component.
pub mod pins {
    pub const ANODE: usize = 0;
    pub const CATHODE: usize = 1;
}

#[derive(Debug)]
pub struct Diode {
    component: Id,
    anode: Id,
    cathode: Id,
    lifecycle: Lifecycle,
}

impl Diode {
    pub fn from_component(component: &Component) -> Result<Self> {
        let pin = |index: usize, role: &'static str| {
            component
                .pins
                .get(index)
                .map(|p| p.id)
                .ok_or(Error::MissingPin {
                    component: component.id,
                    role,
                    index,
                })
        };
        Ok(Self {
            component: component.id,
            anode: pin(pins::ANODE, "A")?,
            cathode: pin(pins::CATHODE, "K")?,
            lifecycle: Lifecycle::Idle,
        })
    }
}

impl Behavior for Diode {
    fn component_id(&self) -> Id {
        self.component
    }

    fn kind(&self) -> ComponentKind {
        ComponentKind::Diode
    }

    fn on_start(&mut self, ctx: &mut dyn SimContext) -> Result<()> {
        self.lifecycle.expect_idle(self.component, "on_start")?;
        self.lifecycle = Lifecycle::Running;
        ctx.drive(self.anode, Signal::Float);
        ctx.drive(self.cathode, Signal::Float);
        Ok(())
    }

    fn evaluate(&mut self, ctx: &mut dyn SimContext) -> Result<()> {
        self.lifecycle.expect_running(self.component, "evaluate")?;
        // Forward only: cathode follows anode, anode is never driven.
        ctx.drive(self.cathode, ctx.observed(self.anode));
        Ok(())
    }

    fn interact(&mut self, _action: &str, _params: &PropertyMap) -> Result<bool> {
        self.lifecycle.expect_running(self.component, "interact")?;
        Ok(false)
    }

    fn on_stop(&mut self) -> Result<()> {
        self.lifecycle = Lifecycle::Idle;
        Ok(())
    }
}
