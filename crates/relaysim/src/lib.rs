//! # Relaysim
//!
//! A relay-logic circuit simulator. Schematics made of switches,
//! indicators, relays, power sources and wires are compiled into electrical
//! nets and stepped to a stable state whenever an input changes.
//!
//! The workspace splits into:
//! - `relaysim-core` - the document model and the net compiler
//! - `relaysim-components` - component behaviors (switch, relay, ...)
//! - `relaysim-engine` - the dirty-flag convergence loop and engine API
//! - `relaysim-format` - the `.rsim` / `.rsub` JSON codec
//!
//! ## Quick start
//!
//! ```rust
//! use relaysim::prelude::*;
//!
//! // Build a document: a toggle switch wired to an indicator.
//! let mut doc = Document::new();
//! let page = doc.create_page("Main");
//! let mut ids = std::mem::take(doc.id_allocator_mut());
//! let sw = build::switch(&mut ids, Point::new(0.0, 0.0));
//! let led = build::indicator(&mut ids, Point::new(100.0, 0.0));
//! let sw_id = sw.id;
//! let wire = Wire::new(ids.allocate(), sw.pins[0].tabs[0].id, Some(led.pins[0].tabs[0].id));
//! *doc.id_allocator_mut() = ids;
//! {
//!     let p = doc.page_mut(page).unwrap();
//!     p.add_component(sw);
//!     p.add_component(led);
//!     p.wires.push(wire);
//! }
//!
//! // Run it.
//! let mut engine = Engine::launch(doc).unwrap();
//! engine.interact(sw_id, "toggle", &PropertyMap::new()).unwrap();
//! let snapshot = engine.snapshot().unwrap();
//! assert!(snapshot.nets.iter().any(|n| n.state == Signal::High));
//! ```

// Re-export the member crates.
pub use relaysim_components as components;
pub use relaysim_core as core;
pub use relaysim_engine as engine;
pub use relaysim_format as format;

// ============================================================================
// Convenient re-exports from relaysim_core
// ============================================================================

pub use relaysim_core::{
    Component,
    ComponentKind,
    Document,
    DocumentMeta,
    // Errors
    Error as CoreError,
    Id,
    IdAllocator,
    Net,
    Page,
    Pin,
    Point,
    PropertyMap,
    PropertyValue,
    Rotation,
    // State algebra
    Signal,
    SubCircuitTemplate,
    Tab,
    Wire,
    FOOTPRINT_PAGE,
};

// ============================================================================
// Convenient re-exports from relaysim_components
// ============================================================================

pub use relaysim_components::{
    build, behavior_for, Behavior, Bus, Clock as ClockSource, Diode, DpdtRelay,
    Error as ComponentError, Indicator, Memory, MemoryOp, SimContext, Switch, Thumbwheel, Vcc,
    SWITCHING_DELAY,
};

// ============================================================================
// Convenient re-exports from relaysim_engine
// ============================================================================

pub use relaysim_engine::{
    start, Clock, Engine, EngineConfig, EngineState, Error as EngineError, ExecMode, ManualClock,
    Outcome, Snapshot, Statistics, SystemClock,
};

// ============================================================================
// Convenient re-exports from relaysim_format
// ============================================================================

pub use relaysim_format::{
    check_version, document_from_str, document_to_string, load_document, load_template,
    save_document, Error as FormatError, FORMAT_VERSION,
};

/// Prelude module containing commonly used types.
///
/// ```rust
/// use relaysim::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        build, load_document, save_document, Component, ComponentKind, Document, Engine,
        EngineConfig, EngineState, Id, IdAllocator, Outcome, Page, Point, PropertyMap,
        PropertyValue, Signal, Snapshot, Statistics, Wire,
    };
}
