//! Bus: a row of named attachment points.
//!
//! A bus is the N-pin generalization of [`Link`](crate::Link): pin `i`
//! attaches to the link name `{bus_name}_{start_pin + i}`, giving wires a
//! place to meet a numbered set of nets. Passive; never drives.

use relaysim_core::{Component, ComponentKind, Id, PropertyMap};

use crate::behavior::{Behavior, Lifecycle};
use crate::context::SimContext;
use crate::error::Result;

#[derive(Debug)]
pub struct Bus {
    component: Id,
    lifecycle: Lifecycle,
}

impl Bus {
    pub fn from_component(component: &Component) -> Result<Self> {
        Ok(Self {
            component: component.id,
            lifecycle: Lifecycle::Idle,
        })
    }
}

impl Behavior for Bus {
    fn component_id(&self) -> Id {
        self.component
    }

    fn kind(&self) -> ComponentKind {
        ComponentKind::Bus
    }

    fn on_start(&mut self, _ctx: &mut dyn SimContext) -> Result<()> {
        self.lifecycle.expect_idle(self.component, "on_start")?;
        self.lifecycle = Lifecycle::Running;
        Ok(())
    }

    fn evaluate(&mut self, _ctx: &mut dyn SimContext) -> Result<()> {
        self.lifecycle.expect_running(self.component, "evaluate")?;
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
