//! Serde model of the on-disk document shape.
//!
//! These structs mirror the JSON layout field for field; `convert` maps them
//! onto the core entity model and back. Optional collections serialize only
//! when non-empty so a saved file stays minimal and byte-stable across a
//! load/save round trip.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use relaysim_core::component::PropertyValue;
use relaysim_core::geom::{Point, Rotation};
use relaysim_core::id::Id;

/// Probe used to read the version field before committing to a full parse.
#[derive(Debug, Deserialize)]
pub(crate) struct VersionProbe {
    #[serde(default)]
    pub version: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetadataFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentFile {
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<MetadataFile>,
    pub pages: Vec<PageFile>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub sub_circuits: IndexMap<Id, SubCircuitFile>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageFile {
    pub page_id: Id,
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<ComponentFile>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub wires: Vec<WireFile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canvas_x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canvas_y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canvas_zoom: Option<f64>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_sub_circuit_page: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_instance_id: Option<Id>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_sub_circuit_id: Option<Id>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentFile {
    pub component_id: Id,
    pub component_type: String,
    pub position: Point,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<Rotation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pins: Vec<PinFile>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, PropertyValue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PinFile {
    pub pin_id: Id,
    pub tabs: Vec<TabFile>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TabFile {
    pub tab_id: Id,
    pub position: Point,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireFile {
    pub wire_id: Id,
    pub start_tab_id: Id,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_tab_id: Option<Id>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub waypoints: Vec<WaypointFile>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub junctions: Vec<JunctionFile>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaypointFile {
    pub waypoint_id: Id,
    pub position: Point,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JunctionFile {
    pub junction_id: Id,
    pub position: Point,
    pub child_wires: Vec<WireFile>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubCircuitFile {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_path: Option<String>,
    pub template_pages: Vec<PageFile>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub instances: IndexMap<Id, InstanceFile>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceFile {
    pub parent_page_id: Id,
    pub component_id: Id,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub page_id_map: IndexMap<Id, Id>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub pin_links: IndexMap<Id, Id>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_document_parses() {
        let json = r#"{
            "version": "1.0.0",
            "pages": [{"page_id": "0000000a", "name": "Main"}]
        }"#;
        let doc: DocumentFile = serde_json::from_str(json).unwrap();
        assert_eq!(doc.pages.len(), 1);
        assert_eq!(doc.pages[0].name, "Main");
        assert!(doc.pages[0].components.is_empty());
        assert!(!doc.pages[0].is_sub_circuit_page);
    }

    #[test]
    fn test_id_pattern_enforced() {
        let json = r#"{
            "version": "1.0.0",
            "pages": [{"page_id": "NOT-HEX!", "name": "Main"}]
        }"#;
        assert!(serde_json::from_str::<DocumentFile>(json).is_err());
    }

    #[test]
    fn test_rotation_values_enforced() {
        let json = r#"{
            "component_id": "0000000b",
            "component_type": "Switch",
            "position": {"x": 0.0, "y": 0.0},
            "rotation": 45
        }"#;
        assert!(serde_json::from_str::<ComponentFile>(json).is_err());
    }
}
