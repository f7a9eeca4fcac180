//! Link: passive named attachment point.
//!
//! A Link exists to put a `link_name` on a wire; the link resolver does the
//! actual joining. At run time it neither drives nor reads.

use relaysim_core::{Component, ComponentKind, Id, PropertyMap};

use crate::behavior::{Behavior, Lifecycle};
use crate::context::SimContext;
use crate::error::Result;

#[derive(Debug)]
pub struct Link {
    component: Id,
    lifecycle: Lifecycle,
}

impl Link {
    pub fn from_component(component: &Component) -> Result<Self> {
        Ok(Self {
            component: component.id,
            lifecycle: Lifecycle::Idle,
        })
    }
}

impl Behavior for Link {
    fn component_id(&self) -> Id {
        self.component
    }

    fn kind(&self) -> ComponentKind {
        ComponentKind::Link
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
