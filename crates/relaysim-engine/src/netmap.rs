//! Runtime net storage and the indexes around it.
//!
//! The net map owns every [`Net`] of the current run together with the
//! id-keyed indexes the loop needs: tab -> net, tab -> pin, pin -> owning
//! component, and the per-pin driven signal. Pins *drive* nets; the resolved
//! net state is what components observe at their pins, so driver values and
//! observed values never overwrite each other.

use std::collections::HashMap;

use indexmap::IndexMap;

use relaysim_core::links::{resolve_links, LinkResolution};
use relaysim_core::netbuilder::{build_page_nets, DanglingEndpoint};
use relaysim_core::{Document, Id, IdAllocator, Net, Signal};

#[derive(Debug, Default)]
pub struct NetMap {
    nets: IndexMap<Id, Net>,
    tab_net: HashMap<Id, Id>,
    tab_pin: HashMap<Id, Id>,
    pin_component: HashMap<Id, Id>,
    pin_first_tab: HashMap<Id, Id>,
    /// Link-name scope of each component's page (None = main document).
    component_scope: HashMap<Id, Option<Id>>,
    /// Driven signal per pin; absent means FLOAT.
    driven: HashMap<Id, Signal>,
    /// (scope, link name) -> nets carrying it. The scope keeps sub-circuit
    /// instances from joining through their identical cloned names.
    link_index: HashMap<(Option<Id>, String), Vec<Id>>,
}

impl NetMap {
    /// Compile the document's current topology into nets, resolve links and
    /// build the lookup indexes.
    pub fn build(
        document: &Document,
        ids: &mut IdAllocator,
    ) -> (NetMap, Vec<DanglingEndpoint>, LinkResolution) {
        let mut map = NetMap::default();
        let mut issues = Vec::new();
        let mut all_nets = Vec::new();

        for page in document.pages() {
            let mut built = build_page_nets(page, ids);
            issues.append(&mut built.issues);
            all_nets.append(&mut built.nets);

            let scope = page.instance_of.map(|r| r.instance_id);
            for component in page.components() {
                map.component_scope.insert(component.id, scope);
                for pin in &component.pins {
                    map.pin_component.insert(pin.id, component.id);
                    if let Some(tab) = pin.first_tab() {
                        map.pin_first_tab.insert(pin.id, tab.id);
                    }
                    for tab in &pin.tabs {
                        map.tab_pin.insert(tab.id, pin.id);
                    }
                }
            }
        }

        let resolution = resolve_links(document, &mut all_nets);

        for net in all_nets {
            for tab in &net.tabs {
                map.tab_net.insert(*tab, net.id);
            }
            for name in &net.links {
                map.link_index
                    .entry((net.scope, name.clone()))
                    .or_default()
                    .push(net.id);
            }
            map.nets.insert(net.id, net);
        }

        (map, issues, resolution)
    }

    pub fn net(&self, id: Id) -> Option<&Net> {
        self.nets.get(&id)
    }

    pub fn net_mut(&mut self, id: Id) -> Option<&mut Net> {
        self.nets.get_mut(&id)
    }

    pub fn nets(&self) -> impl Iterator<Item = &Net> {
        self.nets.values()
    }

    pub fn net_count(&self) -> usize {
        self.nets.len()
    }

    /// All net ids in ascending order; the loop's deterministic ordering.
    pub fn net_ids_sorted(&self) -> Vec<Id> {
        let mut ids: Vec<Id> = self.nets.keys().copied().collect();
        ids.sort();
        ids
    }

    pub fn net_of_tab(&self, tab: Id) -> Option<Id> {
        self.tab_net.get(&tab).copied()
    }

    /// The net of a pin (all tabs of one pin share a net by construction).
    pub fn net_of_pin(&self, pin: Id) -> Option<Id> {
        let tab = self.pin_first_tab.get(&pin)?;
        self.net_of_tab(*tab)
    }

    pub fn pin_of_tab(&self, tab: Id) -> Option<Id> {
        self.tab_pin.get(&tab).copied()
    }

    pub fn component_of_pin(&self, pin: Id) -> Option<Id> {
        self.pin_component.get(&pin).copied()
    }

    /// Nets carrying a link name within one scope.
    pub fn nets_with_link(&self, scope: Option<Id>, name: &str) -> &[Id] {
        self.link_index
            .get(&(scope, name.to_string()))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The link-name scope of a component's page.
    pub fn scope_of_component(&self, component: Id) -> Option<Id> {
        self.component_scope.get(&component).copied().flatten()
    }

    /// Resolved state of a named link within a scope: the OR over the nets
    /// carrying it (FLOAT when no net does). This is how a memory reads its
    /// address bus, which has link names but no pins of its own.
    pub fn link_state(&self, scope: Option<Id>, name: &str) -> Signal {
        let mut state = Signal::Float;
        for id in self.nets_with_link(scope, name) {
            if let Some(net) = self.nets.get(id) {
                state |= net.state;
                if state.is_high() {
                    break;
                }
            }
        }
        state
    }

    /// The signal a pin is driving.
    pub fn driven(&self, pin: Id) -> Signal {
        self.driven.get(&pin).copied().unwrap_or_default()
    }

    /// Set a pin's driven signal; returns whether it changed.
    pub fn set_driven(&mut self, pin: Id, state: Signal) -> bool {
        let previous = self.driven.insert(pin, state).unwrap_or_default();
        previous != state
    }

    /// Resolved state a pin observes (its net's state, FLOAT when unwired).
    pub fn observed(&self, pin: Id) -> Signal {
        self.net_of_pin(pin)
            .and_then(|id| self.nets.get(&id))
            .map(|n| n.state)
            .unwrap_or_default()
    }

    /// OR of the driven contributions of every pin with a tab in this net.
    pub fn driven_state_of_net(&self, net: Id) -> Signal {
        let Some(net) = self.nets.get(&net) else {
            return Signal::Float;
        };
        let mut state = Signal::Float;
        for tab in &net.tabs {
            if let Some(pin) = self.tab_pin.get(tab) {
                state |= self.driven(*pin);
                if state.is_high() {
                    break;
                }
            }
        }
        state
    }

    /// Components owning any tab of this net, ascending by id.
    pub fn components_of_net(&self, net: Id) -> Vec<Id> {
        let Some(net) = self.nets.get(&net) else {
            return Vec::new();
        };
        let mut components: Vec<Id> = net
            .tabs
            .iter()
            .filter_map(|tab| self.tab_pin.get(tab))
            .filter_map(|pin| self.pin_component.get(pin))
            .copied()
            .collect();
        components.sort();
        components.dedup();
        components
    }

    // Dirty membership lives on the nets themselves so iteration order is
    // simply net-id order.

    pub fn mark_dirty(&mut self, net: Id) -> bool {
        match self.nets.get_mut(&net) {
            Some(n) => {
                n.dirty = true;
                true
            }
            None => false,
        }
    }

    pub fn clear_dirty(&mut self, net: Id) -> bool {
        match self.nets.get_mut(&net) {
            Some(n) => {
                n.dirty = false;
                true
            }
            None => false,
        }
    }

    pub fn mark_all_dirty(&mut self) {
        for net in self.nets.values_mut() {
            net.dirty = true;
        }
    }

    pub fn any_dirty(&self) -> bool {
        self.nets.values().any(|n| n.dirty)
    }

    pub fn count_dirty(&self) -> usize {
        self.nets.values().filter(|n| n.dirty).count()
    }

    /// Snapshot the dirty membership in ascending id order and clear the
    /// flags.
    pub fn drain_dirty(&mut self) -> Vec<Id> {
        let mut dirty: Vec<Id> = self
            .nets
            .values_mut()
            .filter(|n| n.dirty)
            .map(|n| {
                n.dirty = false;
                n.id
            })
            .collect();
        dirty.sort();
        dirty
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relaysim_components::build;
    use relaysim_core::geom::Point;
    use relaysim_core::Wire;

    fn switch_led_document() -> (Document, Id, Id) {
        let mut doc = Document::new();
        let page = doc.create_page("Main");
        let mut ids = std::mem::take(doc.id_allocator_mut());
        let sw = build::switch(&mut ids, Point::new(0.0, 0.0));
        let led = build::indicator(&mut ids, Point::new(100.0, 0.0));
        let sw_pin = sw.pins[0].id;
        let led_pin = led.pins[0].id;
        let wire = Wire::new(ids.allocate(), sw.pins[0].tabs[0].id, Some(led.pins[0].tabs[0].id));
        *doc.id_allocator_mut() = ids;
        {
            let p = doc.page_mut(page).unwrap();
            p.add_component(sw);
            p.add_component(led);
            p.wires.push(wire);
        }
        (doc, sw_pin, led_pin)
    }

    #[test]
    fn test_build_indexes_pins_and_tabs() {
        let (doc, sw_pin, led_pin) = switch_led_document();
        let mut ids = IdAllocator::new();
        let (map, issues, _) = NetMap::build(&doc, &mut ids);

        assert!(issues.is_empty());
        // Switch pin (4 tabs) and indicator pin (4 tabs) wired into one net.
        assert_eq!(map.net_count(), 1);
        assert_eq!(map.net_of_pin(sw_pin), map.net_of_pin(led_pin));
    }

    #[test]
    fn test_driven_state_folds_pins() {
        let (doc, sw_pin, led_pin) = switch_led_document();
        let mut ids = IdAllocator::new();
        let (mut map, _, _) = NetMap::build(&doc, &mut ids);
        let net = map.net_of_pin(sw_pin).unwrap();

        assert_eq!(map.driven_state_of_net(net), Signal::Float);
        assert!(map.set_driven(sw_pin, Signal::High));
        assert!(!map.set_driven(sw_pin, Signal::High));
        assert_eq!(map.driven_state_of_net(net), Signal::High);
        // The passive pin's drive stays FLOAT and does not latch the net.
        assert!(map.set_driven(sw_pin, Signal::Float));
        assert_eq!(map.driven(led_pin), Signal::Float);
        assert_eq!(map.driven_state_of_net(net), Signal::Float);
    }

    #[test]
    fn test_dirty_drain_is_sorted_and_clears() {
        let (doc, sw_pin, _) = switch_led_document();
        let mut ids = IdAllocator::new();
        let (mut map, _, _) = NetMap::build(&doc, &mut ids);
        let net = map.net_of_pin(sw_pin).unwrap();

        // Built nets start dirty.
        assert!(map.any_dirty());
        let drained = map.drain_dirty();
        assert_eq!(drained, vec![net]);
        assert!(!map.any_dirty());
        assert!(map.drain_dirty().is_empty());

        assert!(map.mark_dirty(net));
        assert_eq!(map.count_dirty(), 1);
        assert!(map.clear_dirty(net));
        assert!(!map.any_dirty());
        assert!(!map.mark_dirty(Id::from_raw(0x0bad)));
    }

    #[test]
    fn test_link_state_reads_named_nets_per_scope() {
        let mut doc = Document::new();
        let page = doc.create_page("Main");
        let mut doc_ids = std::mem::take(doc.id_allocator_mut());
        let probe = build::link(&mut doc_ids, Point::default(), "NET_X");
        *doc.id_allocator_mut() = doc_ids;
        doc.page_mut(page).unwrap().add_component(probe);

        let mut ids = IdAllocator::new();
        let (mut map, _, _) = NetMap::build(&doc, &mut ids);
        let net = map.net_ids_sorted()[0];

        assert_eq!(map.link_state(None, "NET_X"), Signal::Float);
        map.net_mut(net).unwrap().state = Signal::High;
        assert_eq!(map.link_state(None, "NET_X"), Signal::High);
        // Unknown names and foreign scopes read FLOAT.
        assert_eq!(map.link_state(None, "NET_Y"), Signal::Float);
        assert_eq!(map.link_state(Some(Id::from_raw(1)), "NET_X"), Signal::Float);
    }

    #[test]
    fn test_components_of_net() {
        let (doc, sw_pin, _) = switch_led_document();
        let mut ids = IdAllocator::new();
        let (map, _, _) = NetMap::build(&doc, &mut ids);
        let net = map.net_of_pin(sw_pin).unwrap();
        assert_eq!(map.components_of_net(net).len(), 2);
    }
}
