//! Mapping between the on-disk schema and the core entity model.

use indexmap::IndexMap;

use relaysim_core::component::{Component, ComponentKind};
use relaysim_core::document::{Document, DocumentMeta, InstanceRecord, SubCircuitDef};
use relaysim_core::geom::Rotation;
use relaysim_core::page::{CanvasView, InstanceRef, Page};
use relaysim_core::pin::{Pin, Tab};
use relaysim_core::wire::{Junction, Waypoint, Wire};

use crate::error::{Error, Result};
use crate::schema::{
    ComponentFile, DocumentFile, InstanceFile, JunctionFile, MetadataFile, PageFile, PinFile,
    SubCircuitFile, TabFile, WaypointFile, WireFile,
};
use crate::version::FORMAT_VERSION;

pub(crate) fn document_from_file(file: DocumentFile) -> Result<Document> {
    if file.pages.is_empty() {
        return Err(Error::NoPages);
    }

    let mut document = Document::new();
    document.meta = meta_from_file(file.metadata.unwrap_or_default());

    for page_file in file.pages {
        document.add_page(page_from_file(page_file)?);
    }

    for (def_id, def_file) in file.sub_circuits {
        let mut template_pages = Vec::with_capacity(def_file.template_pages.len());
        for page_file in def_file.template_pages {
            template_pages.push(page_from_file(page_file)?);
        }
        let mut instances = IndexMap::new();
        for (instance_id, instance_file) in def_file.instances {
            instances.insert(
                instance_id,
                InstanceRecord {
                    id: instance_id,
                    parent_page: instance_file.parent_page_id,
                    component: instance_file.component_id,
                    page_map: instance_file.page_id_map,
                    pin_links: instance_file.pin_links,
                },
            );
        }
        document.add_sub_circuit(SubCircuitDef {
            id: def_id,
            name: def_file.name,
            source_path: def_file.source_path,
            template_pages,
            instances,
        });
    }

    // Duplicate-id detection over the fully assembled document.
    document.rebuild_id_registry()?;
    Ok(document)
}

pub(crate) fn document_to_file(document: &Document) -> DocumentFile {
    let metadata = meta_to_file(&document.meta);
    DocumentFile {
        version: FORMAT_VERSION.to_string(),
        metadata: if metadata == MetadataFile::default() {
            None
        } else {
            Some(metadata)
        },
        pages: document.pages().map(page_to_file).collect(),
        sub_circuits: document
            .sub_circuits()
            .map(|def| {
                (
                    def.id,
                    SubCircuitFile {
                        name: def.name.clone(),
                        source_path: def.source_path.clone(),
                        template_pages: def.template_pages.iter().map(page_to_file).collect(),
                        instances: def
                            .instances
                            .values()
                            .map(|instance| {
                                (
                                    instance.id,
                                    InstanceFile {
                                        parent_page_id: instance.parent_page,
                                        component_id: instance.component,
                                        page_id_map: instance.page_map.clone(),
                                        pin_links: instance.pin_links.clone(),
                                    },
                                )
                            })
                            .collect(),
                    },
                )
            })
            .collect(),
    }
}

fn meta_from_file(file: MetadataFile) -> DocumentMeta {
    DocumentMeta {
        title: file.title,
        author: file.author,
        description: file.description,
        created: file.created,
        modified: file.modified,
    }
}

fn meta_to_file(meta: &DocumentMeta) -> MetadataFile {
    MetadataFile {
        title: meta.title.clone(),
        author: meta.author.clone(),
        description: meta.description.clone(),
        created: meta.created.clone(),
        modified: meta.modified.clone(),
    }
}

pub(crate) fn page_from_file(file: PageFile) -> Result<Page> {
    let mut page = Page::new(file.page_id, file.name);
    page.canvas = CanvasView {
        x: file.canvas_x.unwrap_or(0.0),
        y: file.canvas_y.unwrap_or(0.0),
        zoom: file.canvas_zoom.unwrap_or(1.0),
    };
    if file.is_sub_circuit_page {
        if let (Some(instance_id), Some(definition_id)) =
            (file.parent_instance_id, file.parent_sub_circuit_id)
        {
            page.instance_of = Some(InstanceRef {
                instance_id,
                definition_id,
            });
        }
    }
    for component_file in file.components {
        page.add_component(component_from_file(component_file)?);
    }
    page.wires = file.wires.into_iter().map(wire_from_file).collect();
    Ok(page)
}

fn page_to_file(page: &Page) -> PageFile {
    let canvas = page.canvas;
    let default = CanvasView::default();
    PageFile {
        page_id: page.id,
        name: page.name.clone(),
        components: page.components().map(component_to_file).collect(),
        wires: page.wires.iter().map(wire_to_file).collect(),
        canvas_x: (canvas.x != default.x).then_some(canvas.x),
        canvas_y: (canvas.y != default.y).then_some(canvas.y),
        canvas_zoom: (canvas.zoom != default.zoom).then_some(canvas.zoom),
        is_sub_circuit_page: page.instance_of.is_some(),
        parent_instance_id: page.instance_of.map(|r| r.instance_id),
        parent_sub_circuit_id: page.instance_of.map(|r| r.definition_id),
    }
}

fn component_from_file(file: ComponentFile) -> Result<Component> {
    let kind = ComponentKind::from_tag(&file.component_type)
        .ok_or_else(|| Error::UnknownComponentType(file.component_type.clone()))?;
    let mut component = Component::new(file.component_id, kind, file.position);
    component.rotation = file.rotation.unwrap_or_default();
    component.link_name = file.link_name;
    component.properties = file.properties;
    for pin_file in file.pins {
        let mut pin = Pin::new(pin_file.pin_id);
        for tab_file in pin_file.tabs {
            pin.tabs.push(Tab::new(tab_file.tab_id, tab_file.position));
        }
        component.pins.push(pin);
    }
    Ok(component)
}

fn component_to_file(component: &Component) -> ComponentFile {
    ComponentFile {
        component_id: component.id,
        component_type: component.kind.as_str().to_string(),
        position: component.position,
        rotation: (component.rotation != Rotation::R0).then_some(component.rotation),
        link_name: component.link_name.clone(),
        pins: component
            .pins
            .iter()
            .map(|pin| PinFile {
                pin_id: pin.id,
                tabs: pin
                    .tabs
                    .iter()
                    .map(|tab| TabFile {
                        tab_id: tab.id,
                        position: tab.position,
                    })
                    .collect(),
            })
            .collect(),
        properties: component.properties.clone(),
    }
}

fn wire_from_file(file: WireFile) -> Wire {
    let mut wire = Wire::new(file.wire_id, file.start_tab_id, file.end_tab_id);
    wire.waypoints = file
        .waypoints
        .into_iter()
        .map(|w| Waypoint {
            id: w.waypoint_id,
            position: w.position,
        })
        .collect();
    wire.junctions = file
        .junctions
        .into_iter()
        .map(|j| {
            let mut junction = Junction::new(j.junction_id, j.position);
            junction.child_wires = j.child_wires.into_iter().map(wire_from_file).collect();
            junction
        })
        .collect();
    wire
}

fn wire_to_file(wire: &Wire) -> WireFile {
    WireFile {
        wire_id: wire.id,
        start_tab_id: wire.start_tab,
        end_tab_id: wire.end_tab,
        waypoints: wire
            .waypoints
            .iter()
            .map(|w| WaypointFile {
                waypoint_id: w.id,
                position: w.position,
            })
            .collect(),
        junctions: wire
            .junctions
            .iter()
            .map(|j| JunctionFile {
                junction_id: j.id,
                position: j.position,
                child_wires: j.child_wires.iter().map(wire_to_file).collect(),
            })
            .collect(),
    }
}
