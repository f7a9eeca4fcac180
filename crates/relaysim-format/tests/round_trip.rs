//! Document and template round-trip tests.

use relaysim_components::build;
use relaysim_core::geom::Point;
use relaysim_core::subcircuit::{embed_template, instantiate, SubCircuitTemplate, FOOTPRINT_PAGE};
use relaysim_core::{Document, Page, Wire};
use relaysim_format::{
    document_from_str, document_to_string, load_document, save_document, template_from_str, Error,
    FORMAT_VERSION,
};

fn sample_document() -> Document {
    let mut doc = Document::new();
    doc.meta.title = Some("Blinker".to_string());
    doc.meta.author = Some("test".to_string());

    let page = doc.create_page("Main");
    let mut ids = std::mem::take(doc.id_allocator_mut());
    let sw = build::switch(&mut ids, Point::new(40.0, 40.0));
    let mut led = build::indicator(&mut ids, Point::new(160.0, 40.0));
    led.link_name = Some("OUT".to_string());
    let relay = build::dpdt_relay(&mut ids, Point::new(300.0, 100.0));
    let wire = Wire::new(
        ids.allocate(),
        sw.pins[0].tabs[1].id,
        Some(led.pins[0].tabs[3].id),
    );
    *doc.id_allocator_mut() = ids;

    let p = doc.page_mut(page).unwrap();
    p.add_component(sw);
    p.add_component(led);
    p.add_component(relay);
    p.wires.push(wire);
    p.canvas.zoom = 1.5;
    doc
}

#[test]
fn test_save_load_save_is_byte_stable() {
    let doc = sample_document();
    let first = document_to_string(&doc).unwrap();
    let reloaded = document_from_str(&first).unwrap();
    let second = document_to_string(&reloaded).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_file_round_trip_via_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("blinker.rsim");

    let doc = sample_document();
    save_document(&path, &doc).unwrap();
    let reloaded = load_document(&path).unwrap();

    assert_eq!(reloaded.meta.title.as_deref(), Some("Blinker"));
    assert_eq!(reloaded.page_count(), 1);
    let page = reloaded.pages().next().unwrap();
    assert_eq!(page.components().count(), 3);
    assert_eq!(page.wires.len(), 1);
    assert_eq!(page.canvas.zoom, 1.5);

    // Entities survive field for field.
    let original_page = doc.pages().next().unwrap();
    assert_eq!(page, original_page);
}

#[test]
fn test_load_missing_file_is_io_error() {
    assert!(matches!(
        load_document("/nonexistent/never.rsim"),
        Err(Error::Io(_))
    ));
}

#[test]
fn test_version_gate() {
    let doc = sample_document();
    let json = document_to_string(&doc).unwrap();
    assert!(json.contains(FORMAT_VERSION));

    let major_bump = json.replace(FORMAT_VERSION, "2.0.0");
    assert!(matches!(
        document_from_str(&major_bump),
        Err(Error::IncompatibleVersion { .. })
    ));

    let minor_bump = json.replace(FORMAT_VERSION, "1.1.0");
    assert!(matches!(
        document_from_str(&minor_bump),
        Err(Error::IncompatibleVersion { .. })
    ));

    let missing = r#"{"pages": [{"page_id": "00000001", "name": "Main"}]}"#;
    assert!(matches!(
        document_from_str(missing),
        Err(Error::MalformedVersion(_))
    ));
}

#[test]
fn test_duplicate_ids_rejected() {
    let json = r#"{
        "version": "1.0.0",
        "pages": [
            {"page_id": "00000001", "name": "A"},
            {"page_id": "00000001", "name": "B"}
        ]
    }"#;
    assert!(matches!(
        document_from_str(json),
        Err(Error::Structure(relaysim_core::Error::DuplicateId(_)))
    ));
}

#[test]
fn test_empty_pages_rejected() {
    let json = r#"{"version": "1.0.0", "pages": []}"#;
    assert!(matches!(document_from_str(json), Err(Error::NoPages)));
}

#[test]
fn test_unknown_component_type_rejected() {
    let json = r#"{
        "version": "1.0.0",
        "pages": [{
            "page_id": "00000001",
            "name": "Main",
            "components": [{
                "component_id": "00000002",
                "component_type": "FluxCapacitor",
                "position": {"x": 0.0, "y": 0.0}
            }]
        }]
    }"#;
    assert!(matches!(
        document_from_str(json),
        Err(Error::UnknownComponentType(_))
    ));
}

#[test]
fn test_malformed_json_is_json_error_not_panic() {
    assert!(matches!(
        document_from_str("{ not json"),
        Err(Error::Json(_))
    ));
    assert!(matches!(document_from_str(""), Err(Error::Json(_))));
}

fn template_json(with_footprint: bool, link_name: &str) -> String {
    let page_name = if with_footprint { "FOOTPRINT" } else { "LOGIC" };
    format!(
        r#"{{
            "version": "1.0.0",
            "metadata": {{"title": "Latch"}},
            "pages": [{{
                "page_id": "00000001",
                "name": "{page_name}",
                "components": [{{
                    "component_id": "00000002",
                    "component_type": "Link",
                    "position": {{"x": 0.0, "y": 0.0}},
                    "link_name": "{link_name}",
                    "pins": [{{
                        "pin_id": "00000003",
                        "tabs": [{{"tab_id": "00000004", "position": {{"x": 10.0, "y": 0.0}}}}]
                    }}]
                }}]
            }}]
        }}"#
    )
}

#[test]
fn test_template_requires_footprint() {
    assert!(matches!(
        template_from_str(&template_json(false, "IN"), Some("latch.rsub")),
        Err(Error::Structure(relaysim_core::Error::MissingFootprint { .. }))
    ));
}

#[test]
fn test_template_requires_named_links() {
    assert!(matches!(
        template_from_str(&template_json(true, " "), Some("latch.rsub")),
        Err(Error::Structure(
            relaysim_core::Error::UnnamedFootprintLink { .. }
        ))
    ));
}

#[test]
fn test_template_loads_with_name_from_metadata() {
    let template = template_from_str(&template_json(true, "IN"), Some("latch.rsub")).unwrap();
    assert_eq!(template.name, "Latch");
    assert_eq!(template.source_path.as_deref(), Some("latch.rsub"));
    assert!(template.footprint().is_some());
}

fn one_link_template() -> SubCircuitTemplate {
    let mut ids = relaysim_core::IdAllocator::new();
    let mut footprint = Page::new(ids.allocate(), FOOTPRINT_PAGE);
    footprint.add_component(build::link(&mut ids, Point::new(0.0, 0.0), "IO"));
    SubCircuitTemplate {
        name: "io".to_string(),
        source_path: Some("io.rsub".to_string()),
        pages: vec![footprint],
    }
}

#[test]
fn test_sub_circuit_definitions_round_trip() {
    let mut doc = Document::new();
    let host = doc.create_page("Main");
    let def = embed_template(&mut doc, &one_link_template()).unwrap();
    let component = instantiate(&mut doc, def, host, Point::new(50.0, 50.0)).unwrap();

    let json = document_to_string(&doc).unwrap();
    let reloaded = document_from_str(&json).unwrap();

    let def_back = reloaded.sub_circuit(def).unwrap();
    assert_eq!(def_back.name, "io");
    assert_eq!(def_back.instances.len(), 1);
    let (_, record) = reloaded.instance_of_component(component).unwrap();
    assert_eq!(record.pin_links.len(), 1);

    // Instance pages keep their backlinks.
    let instance_pages: Vec<&Page> = reloaded
        .pages()
        .filter(|p| p.is_sub_circuit_page())
        .collect();
    assert_eq!(instance_pages.len(), 1);
    assert_eq!(
        instance_pages[0].instance_of.unwrap().definition_id,
        def
    );

    // And the whole thing is still byte-stable.
    assert_eq!(document_to_string(&reloaded).unwrap(), json);
}
