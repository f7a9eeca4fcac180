//! Simulation engine for relaysim.
//!
//! Compiles a document's topology into nets, runs every component's
//! lifecycle and drives the dirty-flag convergence loop until the circuit is
//! stable, oscillating or timed out.
//!
//! # Example
//!
//! ```rust
//! use relaysim_components::build;
//! use relaysim_core::geom::Point;
//! use relaysim_core::{Document, PropertyMap, Signal, Wire};
//! use relaysim_engine::{Engine, EngineConfig};
//!
//! // A switch wired to an indicator.
//! let mut doc = Document::new();
//! let page = doc.create_page("Main");
//! let mut ids = std::mem::take(doc.id_allocator_mut());
//! let sw = build::switch(&mut ids, Point::new(0.0, 0.0));
//! let led = build::indicator(&mut ids, Point::new(100.0, 0.0));
//! let sw_id = sw.id;
//! let led_pin = led.pins[0].id;
//! let wire = Wire::new(ids.allocate(), sw.pins[0].tabs[0].id, Some(led.pins[0].tabs[0].id));
//! *doc.id_allocator_mut() = ids;
//! let p = doc.page_mut(page).unwrap();
//! p.add_component(sw);
//! p.add_component(led);
//! p.wires.push(wire);
//!
//! let mut engine = Engine::new(doc, EngineConfig::default()).unwrap();
//! engine.start().unwrap();
//!
//! engine.interact(sw_id, "toggle", &PropertyMap::new()).unwrap();
//! let snapshot = engine.snapshot().unwrap();
//! let led_state = snapshot
//!     .components
//!     .iter()
//!     .flat_map(|c| c.pin_states.iter())
//!     .find(|p| p.pin == led_pin)
//!     .unwrap();
//! assert_eq!(led_state.state, Signal::High);
//! ```

pub mod bridge;
pub mod clock;
pub mod engine;
pub mod error;
pub mod netmap;
pub mod scheduler;
pub mod snapshot;
pub mod stats;

mod actions;
mod eval;

pub use bridge::{Bridge, BridgeManager};
pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::{start, Engine, EngineConfig, EngineState};
pub use error::{Error, Result};
pub use netmap::NetMap;
pub use scheduler::ExecMode;
pub use snapshot::{ComponentSnapshot, NetSnapshot, Snapshot};
pub use stats::{Outcome, Statistics};
