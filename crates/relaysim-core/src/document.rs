//! Documents: the owner of pages, sub-circuit definitions and the id space.

use indexmap::IndexMap;

use crate::component::Component;
use crate::error::{Error, Result};
use crate::id::{Id, IdAllocator};
use crate::page::{Page, TabSite};

/// An embedded sub-circuit definition: template pages plus live instances.
#[derive(Debug, Clone, PartialEq)]
pub struct SubCircuitDef {
    pub id: Id,
    pub name: String,
    /// Path of the `.rsub` file this definition came from; used to reuse an
    /// already embedded definition instead of embedding twice.
    pub source_path: Option<String>,
    pub template_pages: Vec<Page>,
    pub instances: IndexMap<Id, InstanceRecord>,
}

/// One instantiation of a sub-circuit definition.
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceRecord {
    pub id: Id,
    /// Page holding the SubCircuit component.
    pub parent_page: Id,
    /// The SubCircuit component representing this instance.
    pub component: Id,
    /// Template page id -> cloned page id.
    pub page_map: IndexMap<Id, Id>,
    /// External pin id -> cloned FOOTPRINT Link component id. Drives bridge
    /// wiring when the engine starts.
    pub pin_links: IndexMap<Id, Id>,
}

/// Free-text document metadata, carried through save/load untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentMeta {
    pub title: Option<String>,
    pub author: Option<String>,
    pub description: Option<String>,
    pub created: Option<String>,
    pub modified: Option<String>,
}

impl DocumentMeta {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.description.is_none()
            && self.created.is_none()
            && self.modified.is_none()
    }
}

/// A complete schematic document.
#[derive(Debug, Clone, Default)]
pub struct Document {
    pub meta: DocumentMeta,
    pages: IndexMap<Id, Page>,
    sub_circuits: IndexMap<Id, SubCircuitDef>,
    ids: IdAllocator,
}

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh document-unique id.
    pub fn allocate_id(&mut self) -> Id {
        self.ids.allocate()
    }

    /// Access the id allocator directly (instantiation clones many entities).
    pub fn id_allocator_mut(&mut self) -> &mut IdAllocator {
        &mut self.ids
    }

    /// Add a page. The page id must already be registered or fresh.
    pub fn add_page(&mut self, page: Page) {
        self.ids.register(page.id);
        self.pages.insert(page.id, page);
    }

    /// Create and add an empty page with a fresh id, returning the id.
    pub fn create_page(&mut self, name: impl Into<String>) -> Id {
        let id = self.ids.allocate();
        self.pages.insert(id, Page::new(id, name));
        id
    }

    pub fn page(&self, id: Id) -> Option<&Page> {
        self.pages.get(&id)
    }

    pub fn page_mut(&mut self, id: Id) -> Option<&mut Page> {
        self.pages.get_mut(&id)
    }

    /// Pages in document order (instance pages included).
    pub fn pages(&self) -> impl Iterator<Item = &Page> {
        self.pages.values()
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Add an embedded sub-circuit definition.
    pub fn add_sub_circuit(&mut self, def: SubCircuitDef) {
        self.ids.register(def.id);
        self.sub_circuits.insert(def.id, def);
    }

    pub fn sub_circuit(&self, id: Id) -> Option<&SubCircuitDef> {
        self.sub_circuits.get(&id)
    }

    pub fn sub_circuit_mut(&mut self, id: Id) -> Option<&mut SubCircuitDef> {
        self.sub_circuits.get_mut(&id)
    }

    pub fn sub_circuits(&self) -> impl Iterator<Item = &SubCircuitDef> {
        self.sub_circuits.values()
    }

    /// Find an embedded definition by the template path it came from.
    pub fn sub_circuit_by_source(&self, source_path: &str) -> Option<&SubCircuitDef> {
        self.sub_circuits
            .values()
            .find(|d| d.source_path.as_deref() == Some(source_path))
    }

    /// Find the instance record owned by a SubCircuit component.
    pub fn instance_of_component(&self, component: Id) -> Option<(&SubCircuitDef, &InstanceRecord)> {
        for def in self.sub_circuits.values() {
            for instance in def.instances.values() {
                if instance.component == component {
                    return Some((def, instance));
                }
            }
        }
        None
    }

    /// Find a component anywhere in the document (instance pages included).
    pub fn find_component(&self, id: Id) -> Option<(&Page, &Component)> {
        for page in self.pages.values() {
            if let Some(component) = page.component(id) {
                return Some((page, component));
            }
        }
        None
    }

    /// Find a tab anywhere in the document.
    pub fn find_tab(&self, tab: Id) -> Option<(&Page, TabSite<'_>)> {
        for page in self.pages.values() {
            if let Some(site) = page.find_tab(tab) {
                return Some((page, site));
            }
        }
        None
    }

    /// Register every identifier in the document, failing on the first
    /// duplicate. Called after deserialization; entity ids created through
    /// [`Document::allocate_id`] are already registered.
    pub fn rebuild_id_registry(&mut self) -> Result<()> {
        let mut ids = IdAllocator::new();
        for page in self.pages.values() {
            register_page_ids(page, &mut ids)?;
        }
        for def in self.sub_circuits.values() {
            ids.register_unique(def.id)?;
            for page in &def.template_pages {
                register_page_ids(page, &mut ids)?;
            }
            for instance in def.instances.values() {
                ids.register_unique(instance.id)?;
            }
        }
        self.ids = ids;
        Ok(())
    }

    /// Structural sanity check: at least one page, all ids unique, and every
    /// wire endpoint resolvable on its page.
    pub fn validate(&self) -> Result<()> {
        if self.pages.is_empty() {
            return Err(Error::EmptyDocument);
        }
        let mut probe = self.clone();
        probe.rebuild_id_registry()?;
        Ok(())
    }
}

fn register_page_ids(page: &Page, ids: &mut IdAllocator) -> Result<()> {
    ids.register_unique(page.id)?;
    for component in page.components() {
        ids.register_unique(component.id)?;
        for pin in &component.pins {
            ids.register_unique(pin.id)?;
            for tab in &pin.tabs {
                ids.register_unique(tab.id)?;
            }
        }
    }
    let mut wires = Vec::new();
    let mut visited = std::collections::HashSet::new();
    for wire in &page.wires {
        wire.visit_wires(&mut wires, &mut visited);
    }
    for wire in wires {
        ids.register_unique(wire.id)?;
        for waypoint in &wire.waypoints {
            ids.register_unique(waypoint.id)?;
        }
        for junction in &wire.junctions {
            ids.register_unique(junction.id)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::ComponentKind;
    use crate::geom::Point;
    use crate::pin::{Pin, Tab};

    fn single_pin_component(doc: &mut Document, kind: ComponentKind) -> Component {
        let mut component = Component::new(doc.allocate_id(), kind, Point::default());
        let mut pin = Pin::new(doc.allocate_id());
        pin.tabs.push(Tab::new(doc.allocate_id(), Point::default()));
        component.pins.push(pin);
        component
    }

    #[test]
    fn test_create_page_allocates_unique_ids() {
        let mut doc = Document::new();
        let a = doc.create_page("A");
        let b = doc.create_page("B");
        assert_ne!(a, b);
        assert_eq!(doc.page_count(), 2);
        assert_eq!(doc.page(a).unwrap().name, "A");
    }

    #[test]
    fn test_find_component_and_tab() {
        let mut doc = Document::new();
        let page_id = doc.create_page("Main");
        let component = single_pin_component(&mut doc, ComponentKind::Switch);
        let comp_id = component.id;
        let tab_id = component.pins[0].tabs[0].id;
        doc.page_mut(page_id).unwrap().add_component(component);

        assert!(doc.find_component(comp_id).is_some());
        let (page, site) = doc.find_tab(tab_id).unwrap();
        assert_eq!(page.id, page_id);
        assert_eq!(site.component.id, comp_id);
    }

    #[test]
    fn test_validate_rejects_empty_document() {
        let doc = Document::new();
        assert!(matches!(doc.validate(), Err(Error::EmptyDocument)));
    }

    #[test]
    fn test_rebuild_id_registry_detects_duplicates() {
        let mut doc = Document::new();
        let page_id = doc.create_page("Main");
        let mut component =
            Component::new(Id::from_raw(42), ComponentKind::Vcc, Point::default());
        let mut pin = Pin::new(Id::from_raw(42)); // collides with component id
        pin.tabs.push(Tab::new(Id::from_raw(43), Point::default()));
        component.pins.push(pin);
        doc.page_mut(page_id).unwrap().add_component(component);

        assert!(matches!(
            doc.rebuild_id_registry(),
            Err(Error::DuplicateId(_))
        ));
    }
}
