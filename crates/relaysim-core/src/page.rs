//! Pages: one schematic sheet of components and wires.

use indexmap::IndexMap;

use crate::component::Component;
use crate::id::Id;
use crate::pin::{Pin, Tab};
use crate::wire::Wire;

/// Canvas pan/zoom persisted for the UI.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasView {
    pub x: f64,
    pub y: f64,
    pub zoom: f64,
}

impl Default for CanvasView {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            zoom: 1.0,
        }
    }
}

/// Backlink carried by pages cloned from a sub-circuit template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstanceRef {
    /// The sub-circuit instance these pages belong to.
    pub instance_id: Id,
    /// The embedded definition the instance was cloned from.
    pub definition_id: Id,
}

/// One schematic sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub id: Id,
    pub name: String,
    pub components: IndexMap<Id, Component>,
    pub wires: Vec<Wire>,
    pub canvas: CanvasView,
    /// `Some` on pages cloned for a sub-circuit instance.
    pub instance_of: Option<InstanceRef>,
}

/// Location of a tab within the document hierarchy.
#[derive(Debug, Clone, Copy)]
pub struct TabSite<'a> {
    pub component: &'a Component,
    pub pin: &'a Pin,
    pub tab: &'a Tab,
}

impl Page {
    pub fn new(id: Id, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            components: IndexMap::new(),
            wires: Vec::new(),
            canvas: CanvasView::default(),
            instance_of: None,
        }
    }

    /// Add a component, keyed by its id.
    pub fn add_component(&mut self, component: Component) {
        self.components.insert(component.id, component);
    }

    /// Look up a component by id.
    pub fn component(&self, id: Id) -> Option<&Component> {
        self.components.get(&id)
    }

    /// Iterate over components in insertion order.
    pub fn components(&self) -> impl Iterator<Item = &Component> {
        self.components.values()
    }

    /// Find the component, pin and tab owning a tab id.
    pub fn find_tab(&self, tab: Id) -> Option<TabSite<'_>> {
        for component in self.components.values() {
            for pin in &component.pins {
                if let Some(t) = pin.tab(tab) {
                    return Some(TabSite {
                        component,
                        pin,
                        tab: t,
                    });
                }
            }
        }
        None
    }

    /// Whether the page owns a tab with this id.
    pub fn has_tab(&self, tab: Id) -> bool {
        self.find_tab(tab).is_some()
    }

    /// Every tab id on the page, in component/pin/tab layout order.
    pub fn tab_ids(&self) -> impl Iterator<Item = Id> + '_ {
        self.components
            .values()
            .flat_map(|c| c.pins.iter())
            .flat_map(|p| p.tab_ids())
    }

    /// Whether this page was cloned from a sub-circuit template.
    pub fn is_sub_circuit_page(&self) -> bool {
        self.instance_of.is_some()
    }
}
