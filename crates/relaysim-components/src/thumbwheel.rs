//! Thumbwheel: interactive 4-bit source.
//!
//! Holds a value 0..=15 and drives one output pin per bit; the link
//! resolver attaches each pin to `{bus_name}_{start_pin + bit}`.
//! Interactions increment, decrement (both with wraparound) or clear.

use relaysim_core::{Component, ComponentKind, Id, PropertyMap, Signal};

use crate::behavior::{Behavior, Lifecycle};
use crate::context::SimContext;
use crate::error::{Error, Result};

/// Number of output bits.
pub const BITS: usize = 4;

#[derive(Debug)]
pub struct Thumbwheel {
    component: Id,
    bit_pins: [Id; BITS],
    value: u8,
    lifecycle: Lifecycle,
}

impl Thumbwheel {
    pub fn from_component(component: &Component) -> Result<Self> {
        let mut bit_pins = [Id::from_raw(0); BITS];
        for (index, slot) in bit_pins.iter_mut().enumerate() {
            *slot = component
                .pins
                .get(index)
                .ok_or(Error::MissingPin {
                    component: component.id,
                    role: "bit",
                    index,
                })?
                .id;
        }
        Ok(Self {
            component: component.id,
            bit_pins,
            value: 0,
            lifecycle: Lifecycle::Idle,
        })
    }

    pub fn value(&self) -> u8 {
        self.value
    }

    fn drive_bits(&self, ctx: &mut dyn SimContext) {
        for (bit, pin) in self.bit_pins.iter().enumerate() {
            let state = if self.value & (1 << bit) != 0 {
                Signal::High
            } else {
                Signal::Float
            };
            ctx.drive(*pin, state);
        }
    }
}

impl Behavior for Thumbwheel {
    fn component_id(&self) -> Id {
        self.component
    }

    fn kind(&self) -> ComponentKind {
        ComponentKind::Thumbwheel
    }

    fn on_start(&mut self, ctx: &mut dyn SimContext) -> Result<()> {
        self.lifecycle.expect_idle(self.component, "on_start")?;
        self.lifecycle = Lifecycle::Running;
        self.value = 0;
        self.drive_bits(ctx);
        Ok(())
    }

    fn evaluate(&mut self, ctx: &mut dyn SimContext) -> Result<()> {
        self.lifecycle.expect_running(self.component, "evaluate")?;
        // Source component: output depends solely on the internal value.
        self.drive_bits(ctx);
        Ok(())
    }

    fn interact(&mut self, action: &str, _params: &PropertyMap) -> Result<bool> {
        self.lifecycle.expect_running(self.component, "interact")?;
        let new_value = match action {
            "inc" => (self.value + 1) & 0xf,
            "dec" => self.value.wrapping_sub(1) & 0xf,
            "c" | "C" | "clear" | "reset" => 0,
            _ => return Ok(false),
        };
        if new_value == self.value {
            return Ok(false);
        }
        self.value = new_value;
        Ok(true)
    }

    fn on_stop(&mut self) -> Result<()> {
        self.value = 0;
        self.lifecycle = Lifecycle::Idle;
        Ok(())
    }
}
