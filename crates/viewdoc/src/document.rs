//! The saved-view document: a versioned, declarative description of one view
//! of an interactive map visualization. Parsing validates and defaults every
//! section; serialization is the exact inverse, so a parsed document
//! round-trips structurally unchanged.

use serde_json::{Map, Value};

use crate::error::{Issues, ParseError};
use crate::layer::Layer;
use crate::map_state::MapState;
use crate::map_style::MapStyle;
use crate::vis_state::VisState;

/// The schema tag this model understands. Documents carrying any other tag
/// are rejected before validation so a migration step can intervene.
pub const DOCUMENT_VERSION: &str = "v1";

#[derive(Debug, Clone, PartialEq)]
pub struct ViewDocument {
    pub version: String,
    pub vis_state: VisState,
    pub map_state: MapState,
    pub map_style: MapStyle,
    /// Unknown root-level keys, preserved for forward compatibility.
    pub extensions: Map<String, Value>,
    /// Unknown keys inside `config`, preserved the same way.
    pub config_extensions: Map<String, Value>,
}

impl ViewDocument {
    pub fn from_json_str(payload: &str) -> Result<Self, ParseError> {
        let value: Value = serde_json::from_str(payload).map_err(ParseError::Syntax)?;
        Self::from_json_value(value)
    }

    pub fn from_json_value(value: Value) -> Result<Self, ParseError> {
        let Some(root) = value.as_object() else {
            return Err(ParseError::UnsupportedVersion { found: None });
        };

        match root.get("version") {
            Some(Value::String(tag)) if tag == DOCUMENT_VERSION => {}
            Some(Value::String(tag)) => {
                return Err(ParseError::UnsupportedVersion {
                    found: Some(tag.clone()),
                });
            }
            _ => return Err(ParseError::UnsupportedVersion { found: None }),
        }

        let mut issues = Issues::new();

        let mut extensions = Map::new();
        for (key, item) in root {
            if key != "version" && key != "config" {
                extensions.insert(key.clone(), item.clone());
            }
        }

        let config = match root.get("config") {
            Some(v) => crate::json::as_object(v, "config", &mut issues),
            None => None,
        };

        let mut config_extensions = Map::new();
        if let Some(config) = config {
            for (key, item) in config {
                if !matches!(key.as_str(), "visState" | "mapState" | "mapStyle") {
                    config_extensions.insert(key.clone(), item.clone());
                }
            }
        }

        let section = |key: &str| config.and_then(|c| c.get(key));
        let vis_state = VisState::from_value(section("visState"), "config.visState", &mut issues);
        let map_state = MapState::from_value(section("mapState"), "config.mapState", &mut issues);
        let map_style = MapStyle::from_value(section("mapStyle"), "config.mapStyle", &mut issues);

        issues.into_result().map_err(ParseError::Invalid)?;

        Ok(Self {
            version: DOCUMENT_VERSION.to_string(),
            vis_state,
            map_state,
            map_style,
            extensions,
            config_extensions,
        })
    }

    pub fn to_json_value(&self) -> Value {
        let mut config = Map::new();
        config.insert("visState".to_string(), self.vis_state.to_json_value());
        config.insert("mapState".to_string(), self.map_state.to_json_value());
        config.insert("mapStyle".to_string(), self.map_style.to_json_value());
        for (key, item) in &self.config_extensions {
            config.insert(key.clone(), item.clone());
        }

        let mut root = Map::new();
        root.insert("version".to_string(), Value::String(self.version.clone()));
        root.insert("config".to_string(), Value::Object(config));
        for (key, item) in &self.extensions {
            root.insert(key.clone(), item.clone());
        }
        Value::Object(root)
    }

    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.to_json_value())
    }

    pub fn to_json_string_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.to_json_value())
    }

    /// Content identity of the document: a blake3 digest over the canonical
    /// serialization. Stable across parse/serialize round-trips, so two
    /// saved views with equal state hash identically.
    pub fn content_hash(&self) -> String {
        let payload = self.to_json_value().to_string();
        blake3::hash(payload.as_bytes()).to_hex().to_string()
    }

    /// Ids of every layer in paint order (bottom first), best-effort for
    /// opaque layer kinds.
    pub fn layer_ids(&self) -> Vec<&str> {
        self.vis_state.layers.iter().filter_map(Layer::id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseError;
    use crate::layer::Layer;
    use crate::vis_state::LayerBlending;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const NAIROBI: &str = include_str!("../fixtures/nairobi_boundary.json");

    fn minimal() -> Value {
        json!({
            "version": "v1",
            "config": {
                "mapState": { "latitude": 52.52, "longitude": 13.405 },
            },
        })
    }

    #[test]
    fn parses_nairobi_boundary_fixture() {
        let doc = ViewDocument::from_json_str(NAIROBI).expect("parse fixture");

        assert_eq!(doc.version, "v1");
        assert_eq!(doc.layer_ids(), ["uedpnzl"]);
        assert_eq!(doc.vis_state.layer_blending, LayerBlending::Normal);

        let Layer::GeoJson(layer) = &doc.vis_state.layers[0] else {
            panic!("expected geojson layer");
        };
        assert_eq!(layer.config.label, "Nairobi Border");
        assert_eq!(layer.config.color, [44, 22, 133]);
        assert_eq!(layer.config.vis_config.opacity, 0.01);
        assert_eq!(layer.config.columns.get("geojson").map(String::as_str), Some("geometry"));

        // All channel fields are null in the source: flat coloring.
        assert!(layer.uses_flat_color());
        assert_eq!(layer.visual_channels.color_field, None);

        assert_eq!(doc.map_state.latitude, -1.2931129550041738);
        assert_eq!(doc.map_state.longitude, 36.862908619037256);
        assert_eq!(doc.map_state.zoom, 10.308313524777773);
        assert!(!doc.map_state.drag_rotate);

        assert_eq!(doc.map_style.style_type.as_str(), "dark");
        assert_eq!(doc.map_style.visible_layer_groups.len(), 7);
        assert!(doc.extensions.is_empty());
    }

    #[test]
    fn fixture_roundtrips_structurally() {
        let doc = ViewDocument::from_json_str(NAIROBI).expect("parse fixture");
        let reparsed =
            ViewDocument::from_json_value(doc.to_json_value()).expect("reparse serialized");
        assert_eq!(reparsed, doc);
    }

    #[test]
    fn defaulting_is_idempotent() {
        let once = ViewDocument::from_json_value(minimal()).expect("parse minimal");
        let twice = ViewDocument::from_json_value(once.to_json_value()).expect("reparse");
        assert_eq!(twice, once);

        assert_eq!(once.map_state.zoom, 0.0);
        assert!(once.vis_state.layers.is_empty());
        assert!(once.vis_state.interaction_config.tooltip.enabled);
        assert_eq!(once.map_style.style_type.as_str(), "dark");
    }

    #[test]
    fn rejects_unsupported_version() {
        let err = ViewDocument::from_json_value(json!({ "version": "v2", "config": {} }))
            .expect_err("expect version error");
        match err {
            ParseError::UnsupportedVersion { found } => assert_eq!(found.as_deref(), Some("v2")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn rejects_missing_version_tag() {
        let err =
            ViewDocument::from_json_value(json!({ "config": {} })).expect_err("expect error");
        assert!(matches!(err, ParseError::UnsupportedVersion { found: None }));
    }

    #[test]
    fn collects_every_violation_in_one_pass() {
        let value = json!({
            "version": "v1",
            "config": {
                "visState": {
                    "layers": [
                        {
                            "id": "a",
                            "type": "geojson",
                            "config": {
                                "dataId": "x",
                                "color": [300, 0, 0],
                                "visConfig": { "opacity": 2.0 },
                            },
                        },
                        { "id": "a", "type": "geojson", "config": { "dataId": "y" } },
                    ],
                },
                "mapState": { "latitude": 95.0, "longitude": 36.8 },
            },
        });
        let err = ViewDocument::from_json_value(value).expect_err("expect validation error");
        let ParseError::Invalid(err) = err else {
            panic!("unexpected error: {err}");
        };

        let paths: Vec<&str> = err.issues().iter().map(|i| i.path.as_str()).collect();
        assert!(paths.contains(&"config.visState.layers[0].config.color[0]"));
        assert!(paths.contains(&"config.visState.layers[0].config.visConfig.opacity"));
        assert!(paths.contains(&"config.visState.layers[1].id"));
        assert!(paths.contains(&"config.mapState.latitude"));
        assert_eq!(err.issues().len(), 4);
    }

    #[test]
    fn unknown_top_level_keys_survive_roundtrip() {
        let value = json!({
            "version": "v1",
            "uiState": { "readOnly": true },
            "config": {
                "mapState": { "latitude": 0.0, "longitude": 0.0 },
                "effects": [{ "kind": "bloom" }],
            },
        });
        let doc = ViewDocument::from_json_value(value).expect("parse");
        assert_eq!(doc.extensions.get("uiState"), Some(&json!({ "readOnly": true })));
        assert_eq!(doc.config_extensions.get("effects"), Some(&json!([{ "kind": "bloom" }])));

        let reparsed = ViewDocument::from_json_value(doc.to_json_value()).expect("reparse");
        assert_eq!(reparsed, doc);
    }

    #[test]
    fn unknown_layer_kinds_survive_roundtrip() {
        let arc = json!({
            "id": "arc-1",
            "type": "arc",
            "config": { "dataId": "trips", "color": [255, 0, 0] },
            "visualChannels": { "colorField": { "name": "fare", "type": "real" } },
        });
        let value = json!({
            "version": "v1",
            "config": {
                "visState": { "layers": [arc] },
                "mapState": { "latitude": 0.0, "longitude": 0.0 },
            },
        });
        let doc = ViewDocument::from_json_value(value).expect("parse");
        assert_eq!(doc.vis_state.layers[0].kind(), "arc");
        assert_eq!(doc.vis_state.layers[0].to_json_value(), arc);

        let reparsed = ViewDocument::from_json_value(doc.to_json_value()).expect("reparse");
        assert_eq!(reparsed, doc);
    }

    #[test]
    fn content_hash_is_stable_across_roundtrips() {
        let doc = ViewDocument::from_json_str(NAIROBI).expect("parse fixture");
        let reparsed = ViewDocument::from_json_value(doc.to_json_value()).expect("reparse");
        assert_eq!(doc.content_hash(), reparsed.content_hash());

        let other = ViewDocument::from_json_value(minimal()).expect("parse minimal");
        assert_ne!(doc.content_hash(), other.content_hash());
    }

    #[test]
    fn syntax_errors_are_distinguished() {
        let err = ViewDocument::from_json_str("{ not json").expect_err("expect error");
        assert!(matches!(err, ParseError::Syntax(_)));
    }
}
