//! Behavior factory: map a document component onto its runtime behavior.

use relaysim_core::{Component, ComponentKind, Document};

use crate::behavior::Behavior;
use crate::bus::Bus;
use crate::clock::Clock;
use crate::diode::Diode;
use crate::error::{Error, Result};
use crate::indicator::Indicator;
use crate::link::Link;
use crate::memory::Memory;
use crate::relay::DpdtRelay;
use crate::subcircuit::{PinWiring, SubCircuitInstance};
use crate::switch::Switch;
use crate::thumbwheel::Thumbwheel;
use crate::vcc::Vcc;

/// Build the behavior for a component.
///
/// SubCircuit components need the document to resolve their instance record
/// (external pin -> cloned FOOTPRINT Link); everything else is
/// self-contained.
pub fn behavior_for(document: &Document, component: &Component) -> Result<Box<dyn Behavior>> {
    Ok(match component.kind {
        ComponentKind::Switch => Box::new(Switch::from_component(component)?),
        ComponentKind::Indicator => Box::new(Indicator::from_component(component)?),
        ComponentKind::Vcc => Box::new(Vcc::from_component(component)?),
        ComponentKind::DpdtRelay => Box::new(DpdtRelay::from_component(component)?),
        ComponentKind::Clock => Box::new(Clock::from_component(component)?),
        ComponentKind::Diode => Box::new(Diode::from_component(component)?),
        ComponentKind::Link => Box::new(Link::from_component(component)?),
        ComponentKind::Bus => Box::new(Bus::from_component(component)?),
        ComponentKind::Thumbwheel => Box::new(Thumbwheel::from_component(component)?),
        ComponentKind::Memory => Box::new(Memory::from_component(component)?),
        ComponentKind::SubCircuit => Box::new(sub_circuit_behavior(document, component)?),
    })
}

fn sub_circuit_behavior(
    document: &Document,
    component: &Component,
) -> Result<SubCircuitInstance> {
    let (_, record) = document
        .instance_of_component(component.id)
        .ok_or(Error::MissingInstance(component.id))?;

    let mut wiring = Vec::with_capacity(record.pin_links.len());
    for (pin_id, link_id) in &record.pin_links {
        let external_tab = component
            .pin(*pin_id)
            .and_then(|p| p.first_tab())
            .ok_or(Error::MissingTab {
                component: component.id,
            })?
            .id;
        let (_, link) = document
            .find_component(*link_id)
            .ok_or(Error::MissingInstanceLink {
                component: component.id,
                link: *link_id,
            })?;
        let internal_tab = link
            .pins
            .first()
            .and_then(|p| p.first_tab())
            .ok_or(Error::MissingTab { component: *link_id })?
            .id;
        wiring.push(PinWiring {
            external_tab,
            internal_tab,
        });
    }
    Ok(SubCircuitInstance::new(component.id, wiring))
}

#[cfg(test)]
mod tests {
    use super::*;
    use relaysim_core::geom::Point;
    use relaysim_core::subcircuit::{embed_template, instantiate, SubCircuitTemplate, FOOTPRINT_PAGE};
    use relaysim_core::{IdAllocator, Page};

    #[test]
    fn test_factory_covers_simple_kinds() {
        let mut ids = IdAllocator::new();
        let doc = Document::new();
        for component in [
            crate::build::switch(&mut ids, Point::default()),
            crate::build::indicator(&mut ids, Point::default()),
            crate::build::vcc(&mut ids, Point::default()),
            crate::build::dpdt_relay(&mut ids, Point::default()),
            crate::build::clock(&mut ids, Point::default()),
            crate::build::diode(&mut ids, Point::default()),
            crate::build::link(&mut ids, Point::default(), "A"),
            crate::build::bus(&mut ids, Point::default(), "Data", 0, 8),
            crate::build::thumbwheel(&mut ids, Point::default(), "Data", 0),
            crate::build::memory(&mut ids, Point::default(), 8, 8),
        ] {
            let behavior = behavior_for(&doc, &component).unwrap();
            assert_eq!(behavior.kind(), component.kind);
            assert_eq!(behavior.component_id(), component.id);
        }
    }

    #[test]
    fn test_sub_circuit_without_record_fails() {
        let mut ids = IdAllocator::new();
        let doc = Document::new();
        let component = relaysim_core::Component::new(
            ids.allocate(),
            ComponentKind::SubCircuit,
            Point::default(),
        );
        assert!(matches!(
            behavior_for(&doc, &component),
            Err(Error::MissingInstance(_))
        ));
    }

    #[test]
    fn test_sub_circuit_wiring_resolves() {
        let mut doc = Document::new();
        let host = doc.create_page("Main");

        // One-link template.
        let mut template_ids = IdAllocator::new();
        let mut footprint = Page::new(template_ids.allocate(), FOOTPRINT_PAGE);
        footprint.add_component(crate::build::link(
            &mut template_ids,
            Point::default(),
            "IO",
        ));
        let template = SubCircuitTemplate {
            name: "t".into(),
            source_path: None,
            pages: vec![footprint],
        };

        let def = embed_template(&mut doc, &template).unwrap();
        let component_id = instantiate(&mut doc, def, host, Point::default()).unwrap();
        let (_, component) = doc.find_component(component_id).unwrap();

        let behavior = behavior_for(&doc, component).unwrap();
        assert_eq!(behavior.kind(), ComponentKind::SubCircuit);
    }
}
