//! Memory: RAM with a bus interface.
//!
//! Control pins Enable/Read/Write are passive inputs; the address is read
//! from the `{address_bus_name}_{bit}` links (the memory has no address
//! pins of its own), and data moves over one pin per bit attached to
//! `{data_bus_name}_{bit}`. With Enable and Read high the addressed cell
//! drives the data bus; with Enable and Write high the data bus is
//! sampled into the cell and the memory's own data pins float. Zero cells
//! are not stored.
//!
//! Initial contents come from the `contents` property (`addr:value` hex
//! lines) or a `default_memory_file`; a volatile memory starts empty on
//! every run instead.

use std::collections::HashMap;

use relaysim_core::{Component, ComponentKind, Id, PropertyMap, Signal};

use crate::behavior::{Behavior, Lifecycle};
use crate::context::SimContext;
use crate::error::{Error, Result};

/// Pin order of a memory component; data bits follow the controls.
pub mod pins {
    pub const ENABLE: usize = 0;
    pub const READ: usize = 1;
    pub const WRITE: usize = 2;
    pub const DATA_BASE: usize = 3;
}

/// The memory's most recent bus operation, for visual state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryOp {
    Read { address: u32, value: u32 },
    Write { address: u32, value: u32 },
}

/// Parse `addr:value` hex lines; `#` starts a comment.
pub fn parse_contents(text: &str) -> HashMap<u32, u32> {
    let mut cells = HashMap::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((addr, value)) = line.split_once(':') else {
            continue;
        };
        let (Ok(addr), Ok(value)) = (
            u32::from_str_radix(addr.trim(), 16),
            u32::from_str_radix(value.trim(), 16),
        ) else {
            continue;
        };
        if value != 0 {
            cells.insert(addr, value);
        }
    }
    cells
}

#[derive(Debug)]
pub struct Memory {
    component: Id,
    enable: Id,
    read: Id,
    write: Id,
    data_pins: Vec<Id>,
    address_bus: String,
    data_bus: String,
    address_bits: u32,
    volatile: bool,
    initial: HashMap<u32, u32>,
    default_file: Option<String>,
    cells: HashMap<u32, u32>,
    last_op: Option<MemoryOp>,
    lifecycle: Lifecycle,
}

impl Memory {
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
        let data_pins: Vec<Id> = component
            .pins
            .iter()
            .skip(pins::DATA_BASE)
            .map(|p| p.id)
            .collect();
        if data_pins.is_empty() {
            return Err(Error::MissingPin {
                component: component.id,
                role: "DATA_0",
                index: pins::DATA_BASE,
            });
        }

        let initial = component
            .text_property("contents")
            .map(parse_contents)
            .unwrap_or_default();

        Ok(Self {
            component: component.id,
            enable: pin(pins::ENABLE, "Enable")?,
            read: pin(pins::READ, "Read")?,
            write: pin(pins::WRITE, "Write")?,
            data_pins,
            address_bus: component
                .text_property("address_bus_name")
                .unwrap_or("ADDR")
                .trim()
                .to_string(),
            data_bus: component
                .text_property("data_bus_name")
                .unwrap_or("DATA")
                .trim()
                .to_string(),
            address_bits: component
                .int_property("address_bits")
                .unwrap_or(8)
                .clamp(3, 16) as u32,
            volatile: component
                .properties
                .get("is_volatile")
                .and_then(|v| v.as_bool())
                .unwrap_or(false),
            initial,
            default_file: component
                .text_property("default_memory_file")
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(String::from),
            cells: HashMap::new(),
            last_op: None,
            lifecycle: Lifecycle::Idle,
        })
    }

    pub fn last_operation(&self) -> Option<MemoryOp> {
        self.last_op
    }

    /// The addressed cell's value (0 when never written).
    pub fn cell(&self, address: u32) -> u32 {
        self.cells.get(&(address & self.address_mask())).copied().unwrap_or(0)
    }

    fn address_mask(&self) -> u32 {
        (1u32 << self.address_bits) - 1
    }

    fn value_mask(&self) -> u32 {
        if self.data_pins.len() >= 32 {
            u32::MAX
        } else {
            (1u32 << self.data_pins.len()) - 1
        }
    }

    fn store(&mut self, address: u32, value: u32) {
        let address = address & self.address_mask();
        let value = value & self.value_mask();
        if value == 0 {
            self.cells.remove(&address);
        } else {
            self.cells.insert(address, value);
        }
    }

    fn read_bus(&self, ctx: &dyn SimContext, bus: &str, bits: u32) -> u32 {
        let mut value = 0;
        for bit in 0..bits {
            if ctx.link_state(&format!("{bus}_{bit}")).is_high() {
                value |= 1 << bit;
            }
        }
        value
    }

    fn drive_data(&self, ctx: &mut dyn SimContext, value: Option<u32>) {
        for (bit, pin) in self.data_pins.iter().enumerate() {
            let state = match value {
                Some(v) if v & (1 << bit) != 0 => Signal::High,
                _ => Signal::Float,
            };
            ctx.drive(*pin, state);
        }
    }
}

impl Behavior for Memory {
    fn component_id(&self) -> Id {
        self.component
    }

    fn kind(&self) -> ComponentKind {
        ComponentKind::Memory
    }

    fn on_start(&mut self, ctx: &mut dyn SimContext) -> Result<()> {
        self.lifecycle.expect_idle(self.component, "on_start")?;
        self.lifecycle = Lifecycle::Running;
        self.last_op = None;

        self.cells = if self.volatile {
            HashMap::new()
        } else {
            self.initial.clone()
        };
        if let Some(path) = &self.default_file {
            match std::fs::read_to_string(path) {
                Ok(text) => self.cells = parse_contents(&text),
                Err(error) => {
                    log::warn!("memory {}: cannot load {path:?}: {error}", self.component);
                }
            }
        }

        self.drive_data(ctx, None);
        Ok(())
    }

    fn evaluate(&mut self, ctx: &mut dyn SimContext) -> Result<()> {
        self.lifecycle.expect_running(self.component, "evaluate")?;
        self.last_op = None;

        if !ctx.observed(self.enable).is_high() {
            self.drive_data(ctx, None);
            return Ok(());
        }

        let address = self.read_bus(ctx, &self.address_bus, self.address_bits);
        let read = ctx.observed(self.read).is_high();
        let write = ctx.observed(self.write).is_high();

        if read && !write {
            let value = self.cell(address);
            self.drive_data(ctx, Some(value));
            self.last_op = Some(MemoryOp::Read { address, value });
        } else if write && !read {
            let value = self.read_bus(ctx, &self.data_bus, self.data_pins.len() as u32);
            self.store(address, value);
            // The bus belongs to the writer while Write is high.
            self.drive_data(ctx, None);
            self.last_op = Some(MemoryOp::Write { address, value });
        } else {
            // Both or neither control asserted: stay off the bus.
            self.drive_data(ctx, None);
        }
        Ok(())
    }

    fn interact(&mut self, _action: &str, _params: &PropertyMap) -> Result<bool> {
        self.lifecycle.expect_running(self.component, "interact")?;
        Ok(false)
    }

    fn on_stop(&mut self) -> Result<()> {
        self.last_op = None;
        self.lifecycle = Lifecycle::Idle;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::testing::{MockContext, Recorded};
    use relaysim_core::geom::Point;
    use relaysim_core::{IdAllocator, PropertyValue};

    struct Fixture {
        memory: Memory,
        ctx: MockContext,
        enable: Id,
        read: Id,
        write: Id,
        data_pins: Vec<Id>,
    }

    fn fixture(contents: Option<&str>) -> Fixture {
        let mut ids = IdAllocator::new();
        let mut component = crate::build::memory(&mut ids, Point::default(), 4, 4);
        if let Some(text) = contents {
            component
                .properties
                .insert("contents".into(), PropertyValue::Text(text.into()));
        }
        let memory = Memory::from_component(&component).unwrap();
        Fixture {
            memory,
            ctx: MockContext::new(),
            enable: component.pins[pins::ENABLE].id,
            read: component.pins[pins::READ].id,
            write: component.pins[pins::WRITE].id,
            data_pins: component.pins[pins::DATA_BASE..].iter().map(|p| p.id).collect(),
        }
    }

    fn set_address(ctx: &mut MockContext, address: u32) {
        for bit in 0..4 {
            let state = if address & (1 << bit) != 0 {
                Signal::High
            } else {
                Signal::Float
            };
            ctx.set_link(&format!("ADDR_{bit}"), state);
        }
    }

    fn driven_value(fx: &Fixture, recorded: &[Recorded]) -> u32 {
        let mut value = 0;
        for r in recorded {
            if let Recorded::Drive {
                pin,
                state: Signal::High,
            } = r
            {
                if let Some(bit) = fx.data_pins.iter().position(|p| p == pin) {
                    value |= 1 << bit;
                }
            }
        }
        value
    }

    #[test]
    fn test_parse_contents() {
        let cells = parse_contents("# header\n00:0F\n01:00\n0A : 3\nbogus\n");
        assert_eq!(cells.get(&0x00), Some(&0x0f));
        assert_eq!(cells.get(&0x01), None); // zero entries dropped
        assert_eq!(cells.get(&0x0a), Some(&0x3));
        assert_eq!(cells.len(), 2);
    }

    #[test]
    fn test_disabled_memory_floats_bus() {
        let mut fx = fixture(Some("00:0F"));
        fx.memory.on_start(&mut fx.ctx).unwrap();
        fx.ctx.take();

        fx.ctx.observe(fx.read, Signal::High);
        fx.memory.evaluate(&mut fx.ctx).unwrap();
        assert_eq!(driven_value(&fx, &fx.ctx.take()), 0);
        assert_eq!(fx.memory.last_operation(), None);
    }

    #[test]
    fn test_read_drives_cell_onto_bus() {
        let mut fx = fixture(Some("02:0A"));
        fx.memory.on_start(&mut fx.ctx).unwrap();
        fx.ctx.take();

        fx.ctx.observe(fx.enable, Signal::High);
        fx.ctx.observe(fx.read, Signal::High);
        set_address(&mut fx.ctx, 2);
        fx.memory.evaluate(&mut fx.ctx).unwrap();

        assert_eq!(driven_value(&fx, &fx.ctx.take()), 0x0a);
        assert_eq!(
            fx.memory.last_operation(),
            Some(MemoryOp::Read {
                address: 2,
                value: 0x0a,
            })
        );
    }

    #[test]
    fn test_write_samples_bus_then_read_back() {
        let mut fx = fixture(None);
        fx.memory.on_start(&mut fx.ctx).unwrap();
        fx.ctx.take();

        // Write 0x9 to address 3.
        fx.ctx.observe(fx.enable, Signal::High);
        fx.ctx.observe(fx.write, Signal::High);
        set_address(&mut fx.ctx, 3);
        fx.ctx.set_link("DATA_0", Signal::High);
        fx.ctx.set_link("DATA_3", Signal::High);
        fx.memory.evaluate(&mut fx.ctx).unwrap();

        // The writer owns the bus: our pins float during the write.
        assert_eq!(driven_value(&fx, &fx.ctx.take()), 0);
        assert_eq!(fx.memory.cell(3), 0x9);
        assert_eq!(
            fx.memory.last_operation(),
            Some(MemoryOp::Write {
                address: 3,
                value: 0x9,
            })
        );

        // Release Write, assert Read: the cell comes back.
        fx.ctx.observe(fx.write, Signal::Float);
        fx.ctx.observe(fx.read, Signal::High);
        fx.ctx.set_link("DATA_0", Signal::Float);
        fx.ctx.set_link("DATA_3", Signal::Float);
        fx.memory.evaluate(&mut fx.ctx).unwrap();
        assert_eq!(driven_value(&fx, &fx.ctx.take()), 0x9);
    }

    #[test]
    fn test_read_and_write_together_float_bus() {
        let mut fx = fixture(Some("00:0F"));
        fx.memory.on_start(&mut fx.ctx).unwrap();
        fx.ctx.take();

        fx.ctx.observe(fx.enable, Signal::High);
        fx.ctx.observe(fx.read, Signal::High);
        fx.ctx.observe(fx.write, Signal::High);
        set_address(&mut fx.ctx, 0);
        fx.memory.evaluate(&mut fx.ctx).unwrap();
        assert_eq!(driven_value(&fx, &fx.ctx.take()), 0);
        assert_eq!(fx.memory.last_operation(), None);
    }

    #[test]
    fn test_volatile_memory_starts_empty() {
        let mut ids = IdAllocator::new();
        let mut component = crate::build::memory(&mut ids, Point::default(), 4, 4);
        component
            .properties
            .insert("contents".into(), PropertyValue::Text("00:0F".into()));
        component
            .properties
            .insert("is_volatile".into(), PropertyValue::Bool(true));
        let mut memory = Memory::from_component(&component).unwrap();

        let mut ctx = MockContext::new();
        memory.on_start(&mut ctx).unwrap();
        assert_eq!(memory.cell(0), 0);
    }

    #[test]
    fn test_writing_zero_clears_the_cell() {
        let mut fx = fixture(Some("01:05"));
        fx.memory.on_start(&mut fx.ctx).unwrap();
        assert_eq!(fx.memory.cell(1), 5);

        fx.ctx.observe(fx.enable, Signal::High);
        fx.ctx.observe(fx.write, Signal::High);
        set_address(&mut fx.ctx, 1);
        fx.memory.evaluate(&mut fx.ctx).unwrap();
        assert_eq!(fx.memory.cell(1), 0);
    }
}
