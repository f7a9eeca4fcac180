//! Switch: user-controlled signal source.
//!
//! Two modes, chosen by the `mode` property: a toggle latches on each
//! actuation, a pushbutton is HIGH only while pressed. The switch drives its
//! single pin and never reads the net.

use relaysim_core::{Component, ComponentKind, Id, PropertyMap, Signal};

use crate::behavior::{Behavior, Lifecycle};
use crate::context::SimContext;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SwitchMode {
    #[default]
    Toggle,
    Pushbutton,
}

impl SwitchMode {
    fn from_component(component: &Component) -> SwitchMode {
        match component.text_property("mode") {
            Some("pushbutton") => SwitchMode::Pushbutton,
            _ => SwitchMode::Toggle,
        }
    }
}

#[derive(Debug)]
pub struct Switch {
    component: Id,
    pin: Id,
    mode: SwitchMode,
    on: bool,
    lifecycle: Lifecycle,
}

impl Switch {
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
            mode: SwitchMode::from_component(component),
            on: false,
            lifecycle: Lifecycle::Idle,
        })
    }

    pub fn is_on(&self) -> bool {
        self.on
    }

    fn output(&self) -> Signal {
        if self.on {
            Signal::High
        } else {
            Signal::Float
        }
    }
}

impl Behavior for Switch {
    fn component_id(&self) -> Id {
        self.component
    }

    fn kind(&self) -> ComponentKind {
        ComponentKind::Switch
    }

    fn on_start(&mut self, ctx: &mut dyn SimContext) -> Result<()> {
        self.lifecycle.expect_idle(self.component, "on_start")?;
        self.lifecycle = Lifecycle::Running;
        self.on = false;
        ctx.drive(self.pin, Signal::Float);
        Ok(())
    }

    fn evaluate(&mut self, ctx: &mut dyn SimContext) -> Result<()> {
        self.lifecycle.expect_running(self.component, "evaluate")?;
        ctx.drive(self.pin, self.output());
        Ok(())
    }

    fn interact(&mut self, action: &str, _params: &PropertyMap) -> Result<bool> {
        self.lifecycle.expect_running(self.component, "interact")?;
        let changed = match (self.mode, action) {
            (SwitchMode::Toggle, "toggle" | "click" | "press") => {
                self.on = !self.on;
                true
            }
            (SwitchMode::Pushbutton, "press") if !self.on => {
                self.on = true;
                true
            }
            (SwitchMode::Pushbutton, "release") if self.on => {
                self.on = false;
                true
            }
            _ => false,
        };
        Ok(changed)
    }

    fn on_stop(&mut self) -> Result<()> {
        self.on = false;
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

    fn switch(mode: &str) -> Switch {
        let mut ids = IdAllocator::new();
        let mut component = crate::build::switch(&mut ids, Point::default());
        component.properties.insert(
            "mode".into(),
            relaysim_core::PropertyValue::Text(mode.into()),
        );
        Switch::from_component(&component).unwrap()
    }

    #[test]
    fn test_lifecycle_enforced() {
        let mut sw = switch("toggle");
        let mut ctx = MockContext::new();
        assert!(sw.evaluate(&mut ctx).is_err());
        assert!(sw.interact("toggle", &PropertyMap::new()).is_err());
        sw.on_start(&mut ctx).unwrap();
        assert!(sw.on_start(&mut ctx).is_err());
    }

    #[test]
    fn test_toggle_drives_high_then_float() {
        let mut sw = switch("toggle");
        let mut ctx = MockContext::new();
        sw.on_start(&mut ctx).unwrap();
        ctx.take();

        assert!(sw.interact("toggle", &PropertyMap::new()).unwrap());
        sw.evaluate(&mut ctx).unwrap();
        assert!(matches!(
            ctx.take()[..],
            [Recorded::Drive {
                state: Signal::High,
                ..
            }]
        ));

        assert!(sw.interact("toggle", &PropertyMap::new()).unwrap());
        sw.evaluate(&mut ctx).unwrap();
        assert!(matches!(
            ctx.take()[..],
            [Recorded::Drive {
                state: Signal::Float,
                ..
            }]
        ));
    }

    #[test]
    fn test_double_toggle_restores_state() {
        let mut sw = switch("toggle");
        let mut ctx = MockContext::new();
        sw.on_start(&mut ctx).unwrap();
        let before = sw.is_on();
        sw.interact("toggle", &PropertyMap::new()).unwrap();
        sw.interact("toggle", &PropertyMap::new()).unwrap();
        assert_eq!(sw.is_on(), before);
    }

    #[test]
    fn test_pushbutton_press_release() {
        let mut sw = switch("pushbutton");
        let mut ctx = MockContext::new();
        sw.on_start(&mut ctx).unwrap();

        assert!(sw.interact("press", &PropertyMap::new()).unwrap());
        assert!(sw.is_on());
        // Pressing again does not change anything.
        assert!(!sw.interact("press", &PropertyMap::new()).unwrap());
        assert!(sw.interact("release", &PropertyMap::new()).unwrap());
        assert!(!sw.is_on());
        // A toggle is not a pushbutton action.
        assert!(!sw.interact("toggle", &PropertyMap::new()).unwrap());
    }

    #[test]
    fn test_on_start_resets_to_off() {
        let mut sw = switch("toggle");
        let mut ctx = MockContext::new();
        sw.on_start(&mut ctx).unwrap();
        sw.interact("toggle", &PropertyMap::new()).unwrap();
        sw.on_stop().unwrap();
        sw.on_start(&mut ctx).unwrap();
        assert!(!sw.is_on());
    }
}
