//! Pins and tabs.
//!
//! A tab is a physical connection point at a fixed offset from its component
//! center; a pin is the logical terminal that groups one or more tabs. All
//! tabs of a pin are electrically the same point. Entities carry no runtime
//! state; signal values live in the engine, keyed by id.

use crate::geom::Point;
use crate::id::Id;

/// Physical connection point owned by exactly one pin.
#[derive(Debug, Clone, PartialEq)]
pub struct Tab {
    pub id: Id,
    /// Offset from the owning component's center.
    pub position: Point,
}

impl Tab {
    pub fn new(id: Id, position: Point) -> Self {
        Self { id, position }
    }
}

/// Logical electrical terminal on a component.
#[derive(Debug, Clone, PartialEq)]
pub struct Pin {
    pub id: Id,
    /// Tabs of this pin, in layout order. Never empty for a well-formed
    /// component.
    pub tabs: Vec<Tab>,
}

impl Pin {
    pub fn new(id: Id) -> Self {
        Self {
            id,
            tabs: Vec::new(),
        }
    }

    /// Iterate over the tab ids of this pin.
    pub fn tab_ids(&self) -> impl Iterator<Item = Id> + '_ {
        self.tabs.iter().map(|t| t.id)
    }

    /// First tab of the pin, if any.
    pub fn first_tab(&self) -> Option<&Tab> {
        self.tabs.first()
    }

    /// Look up a tab by id.
    pub fn tab(&self, id: Id) -> Option<&Tab> {
        self.tabs.iter().find(|t| t.id == id)
    }
}
