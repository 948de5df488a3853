use std::collections::BTreeSet;

use serde_json::{Value, json};

use crate::error::Issues;
use crate::interaction::InteractionConfig;
use crate::json;
use crate::layer::Layer;

/// How overlapping layers composite.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LayerBlending {
    #[default]
    Normal,
    Additive,
    Subtractive,
}

impl LayerBlending {
    pub fn as_str(self) -> &'static str {
        match self {
            LayerBlending::Normal => "normal",
            LayerBlending::Additive => "additive",
            LayerBlending::Subtractive => "subtractive",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "normal" => Some(LayerBlending::Normal),
            "additive" => Some(LayerBlending::Additive),
            "subtractive" => Some(LayerBlending::Subtractive),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnimationConfig {
    pub current_time: Option<f64>,
    pub speed: f64,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            current_time: None,
            speed: 1.0,
        }
    }
}

impl AnimationConfig {
    pub(crate) fn from_value(value: Option<&Value>, path: &str, issues: &mut Issues) -> Self {
        let defaults = Self::default();
        let Some(value) = value else {
            return defaults;
        };
        let Some(obj) = json::as_object(value, path, issues) else {
            return defaults;
        };
        Self {
            current_time: json::opt_f64(obj, "currentTime", path, issues),
            speed: json::f64_or(obj, "speed", defaults.speed, path, issues),
        }
    }

    pub fn to_json_value(&self) -> Value {
        json!({
            "currentTime": self.current_time,
            "speed": self.speed,
        })
    }
}

/// Visualization-specific state: the layer stack and everything that styles
/// or filters it. Layer order is paint order (first = bottom) and must be
/// preserved verbatim through a load/save cycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VisState {
    /// Filter specs, carried opaquely: their shape is owned by the consuming
    /// engine and this model never reorders or rewrites them.
    pub filters: Vec<Value>,
    pub layers: Vec<Layer>,
    pub interaction_config: InteractionConfig,
    pub layer_blending: LayerBlending,
    /// Split-map panels, carried opaquely like `filters`.
    pub split_maps: Vec<Value>,
    pub animation_config: AnimationConfig,
}

impl VisState {
    pub(crate) fn from_value(value: Option<&Value>, path: &str, issues: &mut Issues) -> Self {
        let Some(value) = value else {
            return Self::default();
        };
        let Some(obj) = json::as_object(value, path, issues) else {
            return Self::default();
        };

        let filters = opaque_list(obj.get("filters"), &json::join(path, "filters"), issues);
        let split_maps = opaque_list(obj.get("splitMaps"), &json::join(path, "splitMaps"), issues);

        let layers_path = json::join(path, "layers");
        let mut layers = Vec::new();
        // Paint order is positional, so ids must be unique per document.
        let mut seen = BTreeSet::new();
        match obj.get("layers") {
            None | Some(Value::Null) => {}
            Some(Value::Array(items)) => {
                for (i, item) in items.iter().enumerate() {
                    let item_path = json::index(&layers_path, i);
                    if let Some(layer) = Layer::from_value(item, &item_path, issues) {
                        if let Some(id) = layer.id()
                            && !seen.insert(id.to_string())
                        {
                            issues.push(
                                json::join(&item_path, "id"),
                                format!("duplicate layer id: {id}"),
                            );
                        }
                        layers.push(layer);
                    }
                }
            }
            Some(_) => issues.push(layers_path, "expected an array of layers"),
        }

        let layer_blending = match obj.get("layerBlending") {
            None | Some(Value::Null) => LayerBlending::default(),
            Some(Value::String(s)) => LayerBlending::from_name(s).unwrap_or_else(|| {
                issues.push(
                    json::join(path, "layerBlending"),
                    format!("unknown layer blending mode: {s}"),
                );
                LayerBlending::default()
            }),
            Some(_) => {
                issues.push(json::join(path, "layerBlending"), "expected a string");
                LayerBlending::default()
            }
        };

        Self {
            filters,
            layers,
            interaction_config: InteractionConfig::from_value(
                obj.get("interactionConfig"),
                &json::join(path, "interactionConfig"),
                issues,
            ),
            layer_blending,
            split_maps,
            animation_config: AnimationConfig::from_value(
                obj.get("animationConfig"),
                &json::join(path, "animationConfig"),
                issues,
            ),
        }
    }

    pub fn to_json_value(&self) -> Value {
        json!({
            "filters": self.filters,
            "layers": self.layers.iter().map(Layer::to_json_value).collect::<Vec<_>>(),
            "interactionConfig": self.interaction_config.to_json_value(),
            "layerBlending": self.layer_blending.as_str(),
            "splitMaps": self.split_maps,
            "animationConfig": self.animation_config.to_json_value(),
        })
    }
}

fn opaque_list(value: Option<&Value>, path: &str, issues: &mut Issues) -> Vec<Value> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.clone(),
        Some(_) => {
            issues.push(path, "expected an array");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn layer_order_is_preserved() {
        let mut issues = Issues::new();
        let value = json!({
            "layers": [
                { "id": "bottom", "type": "geojson", "config": { "dataId": "a" } },
                { "id": "middle", "type": "geojson", "config": { "dataId": "b" } },
                { "id": "top", "type": "geojson", "config": { "dataId": "c" } },
            ],
        });
        let state = VisState::from_value(Some(&value), "config.visState", &mut issues);
        assert!(issues.into_result().is_ok());

        let ids: Vec<&str> = state.layers.iter().filter_map(Layer::id).collect();
        assert_eq!(ids, ["bottom", "middle", "top"]);
    }

    #[test]
    fn duplicate_layer_ids_are_rejected() {
        let mut issues = Issues::new();
        let value = json!({
            "layers": [
                { "id": "a", "type": "geojson", "config": { "dataId": "x" } },
                { "id": "a", "type": "geojson", "config": { "dataId": "y" } },
                { "id": "a", "type": "hexagon" },
            ],
        });
        VisState::from_value(Some(&value), "config.visState", &mut issues);
        let err = issues.into_result().expect_err("expect issues");
        let paths: Vec<&str> = err.issues().iter().map(|i| i.path.as_str()).collect();
        assert_eq!(
            paths,
            ["config.visState.layers[1].id", "config.visState.layers[2].id"]
        );
    }

    #[test]
    fn missing_section_defaults_cleanly() {
        let mut issues = Issues::new();
        let state = VisState::from_value(None, "config.visState", &mut issues);
        assert!(issues.into_result().is_ok());
        assert!(state.layers.is_empty());
        assert!(state.filters.is_empty());
        assert_eq!(state.layer_blending, LayerBlending::Normal);
        assert_eq!(state.animation_config.speed, 1.0);
    }

    #[test]
    fn filters_and_split_maps_pass_through_opaquely() {
        let mut issues = Issues::new();
        let value = json!({
            "filters": [{ "dataId": ["trips"], "name": ["hour"], "value": [0, 12] }],
            "splitMaps": [{ "layers": { "a": true } }, { "layers": { "a": false } }],
        });
        let state = VisState::from_value(Some(&value), "config.visState", &mut issues);
        assert!(issues.into_result().is_ok());
        assert_eq!(state.filters.len(), 1);
        assert_eq!(state.split_maps.len(), 2);

        let out = state.to_json_value();
        assert_eq!(out["filters"], value["filters"]);
        assert_eq!(out["splitMaps"], value["splitMaps"]);
    }
}
