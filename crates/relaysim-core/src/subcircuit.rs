//! Sub-circuit templates, embedding and instantiation.
//!
//! A template is a page set with a distinguished FOOTPRINT page whose Link
//! components define the external interface. Instantiation deep-clones the
//! template pages with every identifier regenerated (link names preserved
//! verbatim) and synthesizes a SubCircuit component whose pins mirror the
//! FOOTPRINT layout.

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::component::{Component, ComponentKind, PropertyValue};
use crate::document::{Document, InstanceRecord, SubCircuitDef};
use crate::error::{Error, Result};
use crate::geom::Point;
use crate::id::{Id, IdAllocator};
use crate::page::{InstanceRef, Page};
use crate::pin::{Pin, Tab};
use crate::wire::{Junction, Wire};

/// Name of the page that defines a template's external interface.
pub const FOOTPRINT_PAGE: &str = "FOOTPRINT";

/// A loaded, not-yet-embedded sub-circuit template.
#[derive(Debug, Clone)]
pub struct SubCircuitTemplate {
    pub name: String,
    pub source_path: Option<String>,
    pub pages: Vec<Page>,
}

impl SubCircuitTemplate {
    /// The FOOTPRINT page, if present.
    pub fn footprint(&self) -> Option<&Page> {
        self.pages.iter().find(|p| p.name == FOOTPRINT_PAGE)
    }

    /// Check the template invariants: a FOOTPRINT page exists and every Link
    /// on it carries a non-empty link name.
    pub fn validate(&self) -> Result<()> {
        let footprint = self.footprint().ok_or_else(|| Error::MissingFootprint {
            name: self.name.clone(),
        })?;
        for component in footprint.components() {
            if component.kind == ComponentKind::Link && component.effective_link_name().is_none() {
                return Err(Error::UnnamedFootprintLink {
                    name: self.name.clone(),
                    component: component.id,
                });
            }
        }
        Ok(())
    }
}

/// Old-id to new-id mapping built while cloning.
///
/// Ids are mapped on demand, so forward references (a wire endpoint cloned
/// before its tab) resolve to the same fresh id.
#[derive(Debug, Default)]
pub struct IdMap {
    map: HashMap<Id, Id>,
}

impl IdMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh id for `old`, generating one on first sight.
    pub fn map(&mut self, old: Id, ids: &mut IdAllocator) -> Id {
        *self.map.entry(old).or_insert_with(|| ids.allocate())
    }

    /// The mapped id, if `old` has been seen.
    pub fn get(&self, old: Id) -> Option<Id> {
        self.map.get(&old).copied()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Deep-clone pages, regenerating every id through `mapper`.
pub fn clone_pages(pages: &[Page], ids: &mut IdAllocator, mapper: &mut IdMap) -> Vec<Page> {
    pages.iter().map(|p| clone_page(p, ids, mapper)).collect()
}

fn clone_page(page: &Page, ids: &mut IdAllocator, mapper: &mut IdMap) -> Page {
    let mut cloned = Page::new(mapper.map(page.id, ids), page.name.clone());
    cloned.canvas = page.canvas;
    for component in page.components() {
        let c = clone_component(component, ids, mapper);
        cloned.add_component(c);
    }
    cloned.wires = page
        .wires
        .iter()
        .map(|w| clone_wire(w, ids, mapper))
        .collect();
    cloned
}

fn clone_component(component: &Component, ids: &mut IdAllocator, mapper: &mut IdMap) -> Component {
    let mut cloned = Component::new(
        mapper.map(component.id, ids),
        component.kind,
        component.position,
    );
    cloned.rotation = component.rotation;
    // Link names are logical names, not ids; preserved verbatim.
    cloned.link_name = component.link_name.clone();
    cloned.properties = component.properties.clone();
    for pin in &component.pins {
        let mut p = Pin::new(mapper.map(pin.id, ids));
        for tab in &pin.tabs {
            p.tabs.push(Tab::new(mapper.map(tab.id, ids), tab.position));
        }
        cloned.pins.push(p);
    }
    cloned
}

fn clone_wire(wire: &Wire, ids: &mut IdAllocator, mapper: &mut IdMap) -> Wire {
    let mut cloned = Wire::new(
        mapper.map(wire.id, ids),
        mapper.map(wire.start_tab, ids),
        wire.end_tab.map(|t| mapper.map(t, ids)),
    );
    for waypoint in &wire.waypoints {
        cloned.waypoints.push(crate::wire::Waypoint {
            id: mapper.map(waypoint.id, ids),
            position: waypoint.position,
        });
    }
    for junction in &wire.junctions {
        let mut j = Junction::new(mapper.map(junction.id, ids), junction.position);
        j.child_wires = junction
            .child_wires
            .iter()
            .map(|w| clone_wire(w, ids, mapper))
            .collect();
        cloned.junctions.push(j);
    }
    cloned
}

/// Embed a template as a definition in the document, reusing an existing
/// embedding of the same source file.
///
/// Template ids are regenerated on embed so they cannot collide with host
/// document ids.
pub fn embed_template(document: &mut Document, template: &SubCircuitTemplate) -> Result<Id> {
    template.validate()?;

    if let Some(path) = template.source_path.as_deref() {
        if let Some(existing) = document.sub_circuit_by_source(path) {
            return Ok(existing.id);
        }
    }

    let mut mapper = IdMap::new();
    let template_pages = clone_pages(&template.pages, document.id_allocator_mut(), &mut mapper);
    let def = SubCircuitDef {
        id: document.allocate_id(),
        name: template.name.clone(),
        source_path: template.source_path.clone(),
        template_pages,
        instances: IndexMap::new(),
    };
    let def_id = def.id;
    document.add_sub_circuit(def);
    Ok(def_id)
}

/// Approximate drawn size of a component, for FOOTPRINT bounding boxes.
fn component_extent(component: &Component) -> (f64, f64) {
    match component.kind {
        ComponentKind::Switch | ComponentKind::Vcc => (40.0, 40.0),
        ComponentKind::Indicator => (30.0, 30.0),
        ComponentKind::DpdtRelay => (60.0, 160.0),
        ComponentKind::Link => (30.0, 10.0),
        ComponentKind::SubCircuit => (
            component
                .properties
                .get("width")
                .and_then(|v| v.as_f64())
                .unwrap_or(100.0),
            component
                .properties
                .get("height")
                .and_then(|v| v.as_f64())
                .unwrap_or(100.0),
        ),
    }
}

struct BoundingBox {
    min_x: f64,
    min_y: f64,
    max_x: f64,
    max_y: f64,
}

impl BoundingBox {
    fn of_page(page: &Page) -> BoundingBox {
        let mut bbox = BoundingBox {
            min_x: f64::INFINITY,
            min_y: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            max_y: f64::NEG_INFINITY,
        };
        for component in page.components() {
            let (w, h) = component_extent(component);
            bbox.min_x = bbox.min_x.min(component.position.x - w / 2.0);
            bbox.min_y = bbox.min_y.min(component.position.y - h / 2.0);
            bbox.max_x = bbox.max_x.max(component.position.x + w / 2.0);
            bbox.max_y = bbox.max_y.max(component.position.y + h / 2.0);
        }
        if !bbox.min_x.is_finite() {
            bbox = BoundingBox {
                min_x: 0.0,
                min_y: 0.0,
                max_x: 100.0,
                max_y: 100.0,
            };
        }
        bbox
    }

    fn center(&self) -> Point {
        Point::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }
}

/// Instantiate an embedded definition onto a host page.
///
/// Clones the template pages with fresh ids, records the instance, builds
/// the SubCircuit component (one pin per FOOTPRINT Link, positioned relative
/// to the FOOTPRINT bounding-box center) and returns the component id.
pub fn instantiate(
    document: &mut Document,
    definition: Id,
    host_page: Id,
    position: Point,
) -> Result<Id> {
    let def = document
        .sub_circuit(definition)
        .ok_or(Error::UnknownDefinition(definition))?;
    let template_pages = def.template_pages.clone();
    let def_name = def.name.clone();
    if document.page(host_page).is_none() {
        return Err(Error::UnknownPage(host_page));
    }

    let footprint = template_pages
        .iter()
        .find(|p| p.name == FOOTPRINT_PAGE)
        .ok_or_else(|| Error::MissingFootprint {
            name: def_name.clone(),
        })?;

    let instance_id = document.allocate_id();
    let component_id = document.allocate_id();

    // Clone every template page with a fresh identifier set.
    let mut mapper = IdMap::new();
    let mut cloned_pages = clone_pages(&template_pages, document.id_allocator_mut(), &mut mapper);
    for page in &mut cloned_pages {
        page.instance_of = Some(InstanceRef {
            instance_id,
            definition_id: definition,
        });
    }

    let mut page_map = IndexMap::new();
    for template_page in &template_pages {
        if let Some(new_id) = mapper.get(template_page.id) {
            page_map.insert(template_page.id, new_id);
        }
    }

    // Synthesize the host component from the FOOTPRINT interface.
    let bbox = BoundingBox::of_page(footprint);
    let center = bbox.center();
    let mut component = Component::new(component_id, ComponentKind::SubCircuit, position);
    component.properties.insert(
        "name".to_string(),
        PropertyValue::Text(def_name.clone()),
    );
    component.properties.insert(
        "width".to_string(),
        PropertyValue::Float(bbox.max_x - bbox.min_x),
    );
    component.properties.insert(
        "height".to_string(),
        PropertyValue::Float(bbox.max_y - bbox.min_y),
    );

    let mut pin_links = IndexMap::new();
    for link in footprint.components() {
        if link.kind != ComponentKind::Link {
            continue;
        }
        let Some(_name) = link.effective_link_name() else {
            return Err(Error::UnnamedFootprintLink {
                name: def_name.clone(),
                component: link.id,
            });
        };
        let pin_id = document.allocate_id();
        let tab_id = document.allocate_id();
        let mut pin = Pin::new(pin_id);
        pin.tabs.push(Tab::new(
            tab_id,
            Point::new(link.position.x - center.x, link.position.y - center.y),
        ));
        component.pins.push(pin);

        // The cloned Link on the instance FOOTPRINT page pairs with this pin
        // when the engine wires bridges at start.
        if let Some(instance_link) = mapper.get(link.id) {
            pin_links.insert(pin_id, instance_link);
        }
    }

    for page in cloned_pages {
        document.add_page(page);
    }

    let record = InstanceRecord {
        id: instance_id,
        parent_page: host_page,
        component: component_id,
        page_map,
        pin_links,
    };
    if let Some(def) = document.sub_circuit_mut(definition) {
        def.instances.insert(instance_id, record);
    }

    if let Some(page) = document.page_mut(host_page) {
        page.add_component(component);
    }

    Ok(component_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template_with_footprint() -> SubCircuitTemplate {
        let mut ids = IdAllocator::new();
        let mut footprint = Page::new(ids.allocate(), FOOTPRINT_PAGE);
        for (name, x) in [("IN", 0.0), ("OUT", 100.0)] {
            let mut link = Component::new(ids.allocate(), ComponentKind::Link, Point::new(x, 0.0));
            link.link_name = Some(name.to_string());
            let mut pin = Pin::new(ids.allocate());
            pin.tabs.push(Tab::new(ids.allocate(), Point::new(10.0, 0.0)));
            link.pins.push(pin);
            footprint.add_component(link);
        }

        let mut logic = Page::new(ids.allocate(), "LOGIC");
        let mut inner_in = Component::new(ids.allocate(), ComponentKind::Link, Point::new(0.0, 0.0));
        inner_in.link_name = Some("IN".to_string());
        let mut pin = Pin::new(ids.allocate());
        let in_tab = ids.allocate();
        pin.tabs.push(Tab::new(in_tab, Point::new(10.0, 0.0)));
        inner_in.pins.push(pin);
        logic.add_component(inner_in);

        let mut inner_out =
            Component::new(ids.allocate(), ComponentKind::Link, Point::new(100.0, 0.0));
        inner_out.link_name = Some("OUT".to_string());
        let mut pin = Pin::new(ids.allocate());
        let out_tab = ids.allocate();
        pin.tabs.push(Tab::new(out_tab, Point::new(10.0, 0.0)));
        inner_out.pins.push(pin);
        logic.add_component(inner_out);

        let wire_id = ids.allocate();
        logic.wires.push(Wire::new(wire_id, in_tab, Some(out_tab)));

        SubCircuitTemplate {
            name: "Passthrough".to_string(),
            source_path: Some("passthrough.rsub".to_string()),
            pages: vec![footprint, logic],
        }
    }

    fn collect_ids(page: &Page) -> Vec<Id> {
        let mut out = vec![page.id];
        for component in page.components() {
            out.push(component.id);
            for pin in &component.pins {
                out.push(pin.id);
                out.extend(pin.tab_ids());
            }
        }
        let mut wires = Vec::new();
        let mut visited = std::collections::HashSet::new();
        for wire in &page.wires {
            wire.visit_wires(&mut wires, &mut visited);
        }
        for wire in wires {
            out.push(wire.id);
        }
        out
    }

    #[test]
    fn test_validate_requires_footprint() {
        let mut template = template_with_footprint();
        template.pages.retain(|p| p.name != FOOTPRINT_PAGE);
        assert!(matches!(
            template.validate(),
            Err(Error::MissingFootprint { .. })
        ));
    }

    #[test]
    fn test_validate_requires_named_links() {
        let mut template = template_with_footprint();
        let footprint = template
            .pages
            .iter_mut()
            .find(|p| p.name == FOOTPRINT_PAGE)
            .unwrap();
        let first = *footprint.components.keys().next().unwrap();
        footprint.components.get_mut(&first).unwrap().link_name = Some("  ".to_string());
        assert!(matches!(
            template.validate(),
            Err(Error::UnnamedFootprintLink { .. })
        ));
    }

    #[test]
    fn test_clone_regenerates_every_id_and_keeps_links() {
        let template = template_with_footprint();
        let mut ids = IdAllocator::new();
        let mut mapper = IdMap::new();
        let cloned = clone_pages(&template.pages, &mut ids, &mut mapper);

        let originals: std::collections::HashSet<Id> = template
            .pages
            .iter()
            .flat_map(|p| collect_ids(p))
            .collect();
        let clones: std::collections::HashSet<Id> =
            cloned.iter().flat_map(|p| collect_ids(p)).collect();
        assert!(originals.is_disjoint(&clones));
        assert_eq!(originals.len(), clones.len());

        // Internal wire references are rewritten consistently.
        let logic = cloned.iter().find(|p| p.name == "LOGIC").unwrap();
        let wire = &logic.wires[0];
        assert!(logic.has_tab(wire.start_tab));
        assert!(logic.has_tab(wire.end_tab.unwrap()));

        // Link names survive verbatim.
        let footprint = cloned.iter().find(|p| p.name == FOOTPRINT_PAGE).unwrap();
        let names: Vec<_> = footprint
            .components()
            .filter_map(|c| c.effective_link_name())
            .collect();
        assert_eq!(names, vec!["IN", "OUT"]);
    }

    #[test]
    fn test_embed_reuses_same_source() {
        let mut doc = Document::new();
        doc.create_page("Main");
        let template = template_with_footprint();
        let first = embed_template(&mut doc, &template).unwrap();
        let second = embed_template(&mut doc, &template).unwrap();
        assert_eq!(first, second);
        assert_eq!(doc.sub_circuits().count(), 1);
    }

    #[test]
    fn test_instantiate_builds_pins_and_pages() {
        let mut doc = Document::new();
        let host = doc.create_page("Main");
        let template = template_with_footprint();
        let def = embed_template(&mut doc, &template).unwrap();

        let component_id = instantiate(&mut doc, def, host, Point::new(50.0, 50.0)).unwrap();

        let (_, component) = doc.find_component(component_id).unwrap();
        assert_eq!(component.kind, ComponentKind::SubCircuit);
        assert_eq!(component.pins.len(), 2);

        // Host page plus two cloned instance pages.
        assert_eq!(doc.page_count(), 3);
        let instance_pages: Vec<_> = doc.pages().filter(|p| p.is_sub_circuit_page()).collect();
        assert_eq!(instance_pages.len(), 2);

        let (_, record) = doc.instance_of_component(component_id).unwrap();
        assert_eq!(record.pin_links.len(), 2);
        for link_id in record.pin_links.values() {
            assert!(doc.find_component(*link_id).is_some());
        }
    }

    #[test]
    fn test_double_instantiation_is_disjoint() {
        let mut doc = Document::new();
        let host = doc.create_page("Main");
        let template = template_with_footprint();
        let def = embed_template(&mut doc, &template).unwrap();

        let c1 = instantiate(&mut doc, def, host, Point::new(0.0, 0.0)).unwrap();
        let c2 = instantiate(&mut doc, def, host, Point::new(200.0, 0.0)).unwrap();
        assert_ne!(c1, c2);

        // Every identifier in the document is still unique.
        assert!(doc.clone().rebuild_id_registry().is_ok());

        // The two instances map their pins onto different Link components.
        let (_, r1) = doc.instance_of_component(c1).unwrap();
        let (_, r2) = doc.instance_of_component(c2).unwrap();
        let links_1: std::collections::HashSet<Id> = r1.pin_links.values().copied().collect();
        let links_2: std::collections::HashSet<Id> = r2.pin_links.values().copied().collect();
        assert!(links_1.is_disjoint(&links_2));
    }
}
