//! Component behavior kernel for relaysim.
//!
//! Each component kind implements [`Behavior`]: four lifecycle operations
//! (`on_start`, `evaluate`, `interact`, `on_stop`) executed against a
//! [`SimContext`] provided by the engine. Reads see the net-state snapshot
//! of the previous propagation; writes are recorded and applied at the next
//! phase barrier.
//!
//! - [`Switch`] - toggle / pushbutton signal source
//! - [`Indicator`] - passive display of its net
//! - [`Vcc`] - constant HIGH
//! - [`DpdtRelay`] - two-pole changeover with a 10 ms armature delay
//! - [`Clock`] - periodic source stepped by the engine's tick queue
//! - [`Diode`] - one-way HIGH propagation, anode to cathode
//! - [`Link`] - passive named attachment for the link resolver
//! - [`Bus`] - a numbered row of named attachment points
//! - [`Thumbwheel`] - interactive 4-bit source driving bus links
//! - [`Memory`] - RAM read/written over address and data buses
//! - [`SubCircuitInstance`] - transparent wrapper bridging into cloned pages
//!
//! [`factory::behavior_for`] maps a document component onto its behavior;
//! [`build`] constructs document components with the canonical pin layouts.

pub mod behavior;
pub mod build;
pub mod bus;
pub mod clock;
pub mod context;
pub mod diode;
pub mod error;
pub mod factory;
pub mod indicator;
pub mod link;
pub mod memory;
pub mod relay;
pub mod subcircuit;
pub mod switch;
pub mod thumbwheel;
pub mod vcc;

pub use behavior::Behavior;
pub use bus::Bus;
pub use clock::Clock;
pub use context::SimContext;
pub use diode::Diode;
pub use error::{Error, Result};
pub use factory::behavior_for;
pub use indicator::Indicator;
pub use link::Link;
pub use memory::{Memory, MemoryOp};
pub use relay::{DpdtRelay, SWITCHING_DELAY};
pub use subcircuit::SubCircuitInstance;
pub use switch::{Switch, SwitchMode};
pub use thumbwheel::Thumbwheel;
pub use vcc::Vcc;
