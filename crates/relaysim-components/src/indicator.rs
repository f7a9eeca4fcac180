//! Indicator: passive signal display.
//!
//! Never drives the net. The lit state is whatever its pin observes; the
//! engine snapshot reads that directly, so `evaluate` has nothing to do
//! beyond caching the value for visual queries.

use relaysim_core::{Component, ComponentKind, Id, PropertyMap, Signal};

use crate::behavior::{Behavior, Lifecycle};
use crate::context::SimContext;
use crate::error::{Error, Result};

#[derive(Debug)]
pub struct Indicator {
    component: Id,
    pin: Id,
    lit: bool,
    lifecycle: Lifecycle,
}

impl Indicator {
    pub fn from_component(component: &Component) -> Result<Self> {
        let pin = component
            .pins
            .first()
            .ok_or(Error::MissingPin {
                component: component.id,
                role: "input",
                index: 0,
            })?
            .id;
        Ok(Self {
            component: component.id,
            pin,
            lit: false,
            lifecycle: Lifecycle::Idle,
        })
    }

    /// Whether the indicator currently shows HIGH.
    pub fn is_lit(&self) -> bool {
        self.lit
    }
}

impl Behavior for Indicator {
    fn component_id(&self) -> Id {
        self.component
    }

    fn kind(&self) -> ComponentKind {
        ComponentKind::Indicator
    }

    fn on_start(&mut self, _ctx: &mut dyn SimContext) -> Result<()> {
        self.lifecycle.expect_idle(self.component, "on_start")?;
        self.lifecycle = Lifecycle::Running;
        self.lit = false;
        Ok(())
    }

    fn evaluate(&mut self, ctx: &mut dyn SimContext) -> Result<()> {
        self.lifecycle.expect_running(self.component, "evaluate")?;
        self.lit = ctx.observed(self.pin) == Signal::High;
        Ok(())
    }

    fn interact(&mut self, _action: &str, _params: &PropertyMap) -> Result<bool> {
        self.lifecycle.expect_running(self.component, "interact")?;
        Ok(false)
    }

    fn on_stop(&mut self) -> Result<()> {
        self.lit = false;
        self.lifecycle = Lifecycle::Idle;
        Ok(())
    }
}
