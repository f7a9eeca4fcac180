//! Vcc: constant HIGH source.

use relaysim_core::{Component, ComponentKind, Id, PropertyMap, Signal};

use crate::behavior::{Behavior, Lifecycle};
use crate::context::SimContext;
use crate::error::{Error, Result};

#[derive(Debug)]
pub struct Vcc {
    component: Id,
    pin: Id,
    lifecycle: Lifecycle,
}

impl Vcc {
    pub fn from_component(component: &Component) -> Result<Self> {
        let pin = component
            .pins
            .first()
            .ok_or(Error::MissingPin {
                component: component.id,
                role: "output",
                index: 0,
            })?
            .id;
        Ok(Self {
            component: component.id,
            pin,
            lifecycle: Lifecycle::Idle,
        })
    }
}

impl Behavior for Vcc {
    fn component_id(&self) -> Id {
        self.component
    }

    fn kind(&self) -> ComponentKind {
        ComponentKind::Vcc
    }

    fn on_start(&mut self, ctx: &mut dyn SimContext) -> Result<()> {
        self.lifecycle.expect_idle(self.component, "on_start")?;
        self.lifecycle = Lifecycle::Running;
        ctx.drive(self.pin, Signal::High);
        Ok(())
    }

    fn evaluate(&mut self, ctx: &mut dyn SimContext) -> Result<()> {
        self.lifecycle.expect_running(self.component, "evaluate")?;
        // Constant source; re-driving the same value is a no-op downstream.
        ctx.drive(self.pin, Signal::High);
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::testing::{MockContext, Recorded};
    use relaysim_core::geom::Point;
    use relaysim_core::IdAllocator;

    #[test]
    fn test_vcc_drives_high_from_start() {
        let mut ids = IdAllocator::new();
        let component = crate::build::vcc(&mut ids, Point::default());
        let mut vcc = Vcc::from_component(&component).unwrap();

        let mut ctx = MockContext::new();
        vcc.on_start(&mut ctx).unwrap();
        assert!(matches!(
            ctx.take()[..],
            [Recorded::Drive {
                state: Signal::High,
                ..
            }]
        ));

        // Idempotent under repeated evaluation.
        vcc.evaluate(&mut ctx).unwrap();
        vcc.evaluate(&mut ctx).unwrap();
        let drives = ctx.take();
        assert_eq!(drives.len(), 2);
        assert!(drives
            .iter()
            .all(|r| matches!(r, Recorded::Drive { state: Signal::High, .. })));
    }
}
