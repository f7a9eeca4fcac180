//! Clock: user-controllable periodic source.
//!
//! When enabled the output alternates HIGH/FLOAT at the configured
//! frequency (50% duty cycle), starting HIGH. An interaction toggles the
//! clock on and off; `enable_on_sim_start` starts it running. Toggle
//! deadlines go onto the engine's periodic tick queue, so a running clock
//! never blocks convergence — the host steps it through `run_until`.

use std::time::Duration;

use relaysim_core::{Component, ComponentKind, Id, PropertyMap, Signal};

use crate::behavior::{Behavior, Lifecycle};
use crate::context::SimContext;
use crate::error::{Error, Result};

/// Supported frequency settings and their half periods.
const FREQUENCIES: [(&str, Duration); 6] = [
    ("4Hz", Duration::from_millis(125)),
    ("2Hz", Duration::from_millis(250)),
    ("1Hz", Duration::from_millis(500)),
    ("2 sec", Duration::from_millis(1000)),
    ("4 sec", Duration::from_millis(2000)),
    ("8 sec", Duration::from_millis(4000)),
];

fn half_period(component: &Component) -> Duration {
    let setting = component.text_property("frequency").unwrap_or("1Hz").trim();
    FREQUENCIES
        .iter()
        .find(|(name, _)| *name == setting)
        .map(|(_, period)| *period)
        .unwrap_or(Duration::from_millis(500))
}

#[derive(Debug)]
pub struct Clock {
    component: Id,
    pin: Id,
    half_period: Duration,
    enable_on_start: bool,
    enabled: bool,
    output_high: bool,
    /// When the output flips next; `None` until (re)armed by `evaluate`.
    next_toggle: Option<Duration>,
    lifecycle: Lifecycle,
}

impl Clock {
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
            half_period: half_period(component),
            enable_on_start: component
                .properties
                .get("enable_on_sim_start")
                .and_then(|v| v.as_bool())
                .unwrap_or(false),
            enabled: false,
            output_high: false,
            next_toggle: None,
            lifecycle: Lifecycle::Idle,
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn output(&self) -> Signal {
        if self.enabled && self.output_high {
            Signal::High
        } else {
            Signal::Float
        }
    }
}

impl Behavior for Clock {
    fn component_id(&self) -> Id {
        self.component
    }

    fn kind(&self) -> ComponentKind {
        ComponentKind::Clock
    }

    fn on_start(&mut self, ctx: &mut dyn SimContext) -> Result<()> {
        self.lifecycle.expect_idle(self.component, "on_start")?;
        self.lifecycle = Lifecycle::Running;

        self.enabled = self.enable_on_start;
        self.output_high = self.enabled;
        self.next_toggle = None;
        if self.enabled {
            let deadline = ctx.now() + self.half_period;
            self.next_toggle = Some(deadline);
            ctx.schedule_tick(deadline);
        }
        ctx.drive(self.pin, self.output());
        Ok(())
    }

    fn evaluate(&mut self, ctx: &mut dyn SimContext) -> Result<()> {
        self.lifecycle.expect_running(self.component, "evaluate")?;

        if self.enabled {
            match self.next_toggle {
                Some(deadline) if ctx.now() >= deadline => {
                    self.output_high = !self.output_high;
                    let next = ctx.now() + self.half_period;
                    self.next_toggle = Some(next);
                    ctx.schedule_tick(next);
                }
                Some(_) => {}
                None => {
                    // Just enabled by interaction: start HIGH, arm the
                    // first toggle.
                    self.output_high = true;
                    let next = ctx.now() + self.half_period;
                    self.next_toggle = Some(next);
                    ctx.schedule_tick(next);
                }
            }
        } else {
            self.next_toggle = None;
        }

        ctx.drive(self.pin, self.output());
        Ok(())
    }

    fn interact(&mut self, action: &str, _params: &PropertyMap) -> Result<bool> {
        self.lifecycle.expect_running(self.component, "interact")?;
        match action {
            "toggle" | "click" | "press" => {
                self.enabled = !self.enabled;
                self.output_high = false;
                self.next_toggle = None;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn on_stop(&mut self) -> Result<()> {
        self.enabled = false;
        self.output_high = false;
        self.next_toggle = None;
        self.lifecycle = Lifecycle::Idle;
        Ok(())
    }
}
