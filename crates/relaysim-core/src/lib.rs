//! Core document model and net compiler for the relaysim relay-logic
//! simulator.
//!
//! This crate provides the entity model (documents, pages, components, pins,
//! tabs, wires) and the compile steps that turn a schematic into electrical
//! nets:
//!
//! - [`Signal`] - the two-valued state algebra (HIGH / FLOAT)
//! - [`Id`] - stable 8-hex identifiers and the [`IdAllocator`](id::IdAllocator)
//! - [`Document`] - the id-space owner holding pages and sub-circuits
//! - [`netbuilder`] - wire/junction traversal producing [`Net`] partitions
//! - [`links`] - cross-page joining by component link names
//! - [`subcircuit`] - template embedding and instance cloning
//!
//! Runtime concerns (bridges, dirty tracking, the convergence loop) live in
//! `relaysim-engine`; component behavior lives in `relaysim-components`.
//!
//! # Example: compiling a page into nets
//!
//! ```rust
//! use relaysim_core::{Document, IdAllocator};
//! use relaysim_core::component::{Component, ComponentKind};
//! use relaysim_core::geom::Point;
//! use relaysim_core::netbuilder::build_page_nets;
//! use relaysim_core::pin::{Pin, Tab};
//! use relaysim_core::wire::Wire;
//!
//! let mut doc = Document::new();
//! let page_id = doc.create_page("Main");
//!
//! // A switch and an indicator, one pin and tab each.
//! let mut tabs = Vec::new();
//! for kind in [ComponentKind::Switch, ComponentKind::Indicator] {
//!     let mut component = Component::new(doc.allocate_id(), kind, Point::default());
//!     let mut pin = Pin::new(doc.allocate_id());
//!     let tab = doc.allocate_id();
//!     pin.tabs.push(Tab::new(tab, Point::default()));
//!     component.pins.push(pin);
//!     tabs.push(tab);
//!     doc.page_mut(page_id).unwrap().add_component(component);
//! }
//!
//! // Wire them together.
//! let wire = doc.allocate_id();
//! doc.page_mut(page_id).unwrap().wires.push(Wire::new(wire, tabs[0], Some(tabs[1])));
//!
//! let mut ids = IdAllocator::new();
//! let built = build_page_nets(doc.page(page_id).unwrap(), &mut ids);
//! assert_eq!(built.nets.len(), 1);
//! assert_eq!(built.nets[0].tab_count(), 2);
//! ```

pub mod component;
pub mod document;
pub mod error;
pub mod geom;
pub mod id;
pub mod links;
pub mod net;
pub mod netbuilder;
pub mod page;
pub mod pin;
pub mod state;
pub mod subcircuit;
pub mod wire;

pub use component::{Component, ComponentKind, PropertyMap, PropertyValue};
pub use document::{Document, DocumentMeta, InstanceRecord, SubCircuitDef};
pub use error::{Error, Result};
pub use geom::{Point, Rotation};
pub use id::{Id, IdAllocator};
pub use net::Net;
pub use page::{CanvasView, Page};
pub use pin::{Pin, Tab};
pub use state::Signal;
pub use subcircuit::{SubCircuitTemplate, FOOTPRINT_PAGE};
pub use wire::{Junction, Waypoint, Wire};
