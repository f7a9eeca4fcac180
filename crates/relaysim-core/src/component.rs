//! Component entities.
//!
//! A component is pure data here: its kind tag, placement, pins and a typed
//! property bag. Behavior (evaluate/interact/lifecycle) is dispatched over
//! [`ComponentKind`] in the components crate.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::geom::{Point, Rotation};
use crate::id::Id;
use crate::pin::{Pin, Tab};

/// Component type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    Switch,
    Indicator,
    Vcc,
    DpdtRelay,
    Clock,
    Diode,
    Link,
    Bus,
    Thumbwheel,
    Memory,
    SubCircuit,
}

impl ComponentKind {
    /// The type tag spelled the way the file format spells it.
    pub fn as_str(self) -> &'static str {
        match self {
            ComponentKind::Switch => "Switch",
            ComponentKind::Indicator => "Indicator",
            ComponentKind::Vcc => "Vcc",
            ComponentKind::DpdtRelay => "DPDTRelay",
            ComponentKind::Clock => "Clock",
            ComponentKind::Diode => "Diode",
            ComponentKind::Link => "Link",
            ComponentKind::Bus => "BUS",
            ComponentKind::Thumbwheel => "Thumbwheel",
            ComponentKind::Memory => "Memory",
            ComponentKind::SubCircuit => "SubCircuit",
        }
    }

    /// Parse a file-format type tag.
    pub fn from_tag(tag: &str) -> Option<ComponentKind> {
        match tag {
            "Switch" => Some(ComponentKind::Switch),
            "Indicator" => Some(ComponentKind::Indicator),
            "Vcc" => Some(ComponentKind::Vcc),
            "DPDTRelay" => Some(ComponentKind::DpdtRelay),
            "Clock" => Some(ComponentKind::Clock),
            "Diode" => Some(ComponentKind::Diode),
            "Link" => Some(ComponentKind::Link),
            "BUS" => Some(ComponentKind::Bus),
            "Thumbwheel" => Some(ComponentKind::Thumbwheel),
            "Memory" => Some(ComponentKind::Memory),
            "SubCircuit" => Some(ComponentKind::SubCircuit),
            _ => None,
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value in a component's property bag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl PropertyValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            PropertyValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PropertyValue::Float(f) => Some(*f),
            PropertyValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }
}

/// Free-form component properties, keyed by short ascii names.
pub type PropertyMap = IndexMap<String, PropertyValue>;

/// A schematic component.
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    pub id: Id,
    pub kind: ComponentKind,
    /// Center position on the page canvas.
    pub position: Point,
    pub rotation: Rotation,
    /// Optional cross-page link name. Empty and whitespace-only names are
    /// treated as absent.
    pub link_name: Option<String>,
    /// Pins in layout order. Role-based access (e.g. a relay's COIL) is by
    /// index into this order.
    pub pins: Vec<Pin>,
    pub properties: PropertyMap,
}

impl Component {
    pub fn new(id: Id, kind: ComponentKind, position: Point) -> Self {
        Self {
            id,
            kind,
            position,
            rotation: Rotation::R0,
            link_name: None,
            pins: Vec::new(),
            properties: PropertyMap::new(),
        }
    }

    /// The effective link name: trimmed, `None` if blank.
    pub fn effective_link_name(&self) -> Option<&str> {
        let name = self.link_name.as_deref()?.trim();
        if name.is_empty() {
            None
        } else {
            Some(name)
        }
    }

    /// Look up a pin by id.
    pub fn pin(&self, id: Id) -> Option<&Pin> {
        self.pins.iter().find(|p| p.id == id)
    }

    /// Iterate over every tab of every pin.
    pub fn tabs(&self) -> impl Iterator<Item = &Tab> {
        self.pins.iter().flat_map(|p| p.tabs.iter())
    }

    /// Whether any pin of this component owns the given tab.
    pub fn has_tab(&self, tab: Id) -> bool {
        self.tabs().any(|t| t.id == tab)
    }

    /// A string property, if present and text-valued.
    pub fn text_property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).and_then(|v| v.as_str())
    }

    /// An integer property, if present and integer-valued.
    pub fn int_property(&self, key: &str) -> Option<i64> {
        self.properties.get(key).and_then(|v| v.as_i64())
    }

    /// A trimmed, non-blank text property.
    fn named_property(&self, key: &str) -> Option<&str> {
        let name = self.text_property(key)?.trim();
        if name.is_empty() {
            None
        } else {
            Some(name)
        }
    }

    /// Per-pin link names for bus-style components.
    ///
    /// Bus and thumbwheel pins attach to `{bus_name}_{start_pin + i}`; a
    /// memory's data pins attach to `{data_bus_name}_{bit}` (its address bus
    /// is read through links alone and has no pins). Components without
    /// per-pin naming return nothing; their component-level
    /// [`Component::effective_link_name`] still applies.
    pub fn link_mappings(&self) -> Vec<(String, &Pin)> {
        match self.kind {
            ComponentKind::Bus | ComponentKind::Thumbwheel => {
                let Some(bus) = self.named_property("bus_name") else {
                    return Vec::new();
                };
                let start = self.int_property("start_pin").unwrap_or(0);
                self.pins
                    .iter()
                    .enumerate()
                    .map(|(i, pin)| (format!("{bus}_{}", start + i as i64), pin))
                    .collect()
            }
            ComponentKind::Memory => {
                let Some(bus) = self.named_property("data_bus_name") else {
                    return Vec::new();
                };
                // Pins 0..3 are Enable/Read/Write; the rest are data bits.
                self.pins
                    .iter()
                    .skip(3)
                    .enumerate()
                    .map(|(bit, pin)| (format!("{bus}_{bit}"), pin))
                    .collect()
            }
            _ => Vec::new(),
        }
    }
}
