use std::collections::BTreeMap;

use serde_json::{Value, json};

use crate::error::Issues;
use crate::json;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CompareType {
    #[default]
    Absolute,
    Relative,
}

impl CompareType {
    pub fn as_str(self) -> &'static str {
        match self {
            CompareType::Absolute => "absolute",
            CompareType::Relative => "relative",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "absolute" => Some(CompareType::Absolute),
            "relative" => Some(CompareType::Relative),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TooltipConfig {
    /// Dataset id to the ordered list of field names surfaced on hover.
    pub fields_to_show: BTreeMap<String, Vec<String>>,
    pub compare_mode: bool,
    pub compare_type: CompareType,
    pub enabled: bool,
}

impl Default for TooltipConfig {
    fn default() -> Self {
        Self {
            fields_to_show: BTreeMap::new(),
            compare_mode: false,
            compare_type: CompareType::Absolute,
            enabled: true,
        }
    }
}

impl TooltipConfig {
    pub(crate) fn from_value(value: Option<&Value>, path: &str, issues: &mut Issues) -> Self {
        let defaults = Self::default();
        let Some(value) = value else {
            return defaults;
        };
        let Some(obj) = json::as_object(value, path, issues) else {
            return defaults;
        };

        let mut fields_to_show = BTreeMap::new();
        match obj.get("fieldsToShow") {
            None | Some(Value::Null) => {}
            Some(Value::Object(entries)) => {
                let fields_path = json::join(path, "fieldsToShow");
                for (data_id, fields) in entries {
                    let fields =
                        json::string_list(fields, &json::join(&fields_path, data_id), issues);
                    fields_to_show.insert(data_id.clone(), fields);
                }
            }
            Some(_) => issues.push(json::join(path, "fieldsToShow"), "expected an object"),
        }

        let compare_type = match obj.get("compareType") {
            None | Some(Value::Null) => defaults.compare_type,
            Some(Value::String(s)) => CompareType::from_name(s).unwrap_or_else(|| {
                issues.push(json::join(path, "compareType"), format!("unknown compare type: {s}"));
                defaults.compare_type
            }),
            Some(_) => {
                issues.push(json::join(path, "compareType"), "expected a string");
                defaults.compare_type
            }
        };

        Self {
            fields_to_show,
            compare_mode: json::bool_or(obj, "compareMode", defaults.compare_mode, path, issues),
            compare_type,
            enabled: json::bool_or(obj, "enabled", defaults.enabled, path, issues),
        }
    }

    pub fn to_json_value(&self) -> Value {
        json!({
            "fieldsToShow": self.fields_to_show,
            "compareMode": self.compare_mode,
            "compareType": self.compare_type.as_str(),
            "enabled": self.enabled,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BrushConfig {
    pub size: f64,
    pub enabled: bool,
}

impl Default for BrushConfig {
    fn default() -> Self {
        Self {
            size: 0.5,
            enabled: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeocoderConfig {
    pub enabled: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoordinateConfig {
    pub enabled: bool,
}

/// Tooltip, brush, geocoder and coordinate-readout toggles.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InteractionConfig {
    pub tooltip: TooltipConfig,
    pub brush: BrushConfig,
    pub geocoder: GeocoderConfig,
    pub coordinate: CoordinateConfig,
}

impl InteractionConfig {
    pub(crate) fn from_value(value: Option<&Value>, path: &str, issues: &mut Issues) -> Self {
        let Some(value) = value else {
            return Self::default();
        };
        let Some(obj) = json::as_object(value, path, issues) else {
            return Self::default();
        };

        let brush = match obj.get("brush") {
            None | Some(Value::Null) => BrushConfig::default(),
            Some(v) => {
                let brush_path = json::join(path, "brush");
                match json::as_object(v, &brush_path, issues) {
                    Some(brush_obj) => BrushConfig {
                        size: json::f64_or(brush_obj, "size", 0.5, &brush_path, issues),
                        enabled: json::bool_or(brush_obj, "enabled", false, &brush_path, issues),
                    },
                    None => BrushConfig::default(),
                }
            }
        };

        Self {
            tooltip: TooltipConfig::from_value(
                obj.get("tooltip"),
                &json::join(path, "tooltip"),
                issues,
            ),
            brush,
            geocoder: GeocoderConfig {
                enabled: enabled_toggle(obj.get("geocoder"), &json::join(path, "geocoder"), issues),
            },
            coordinate: CoordinateConfig {
                enabled: enabled_toggle(
                    obj.get("coordinate"),
                    &json::join(path, "coordinate"),
                    issues,
                ),
            },
        }
    }

    pub fn to_json_value(&self) -> Value {
        json!({
            "tooltip": self.tooltip.to_json_value(),
            "brush": { "size": self.brush.size, "enabled": self.brush.enabled },
            "geocoder": { "enabled": self.geocoder.enabled },
            "coordinate": { "enabled": self.coordinate.enabled },
        })
    }
}

fn enabled_toggle(value: Option<&Value>, path: &str, issues: &mut Issues) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(v) => match json::as_object(v, path, issues) {
            Some(obj) => json::bool_or(obj, "enabled", false, path, issues),
            None => false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_when_section_is_missing() {
        let mut issues = Issues::new();
        let config = InteractionConfig::from_value(None, "config.interactionConfig", &mut issues);
        assert!(issues.into_result().is_ok());
        assert!(config.tooltip.enabled);
        assert!(!config.brush.enabled);
        assert_eq!(config.brush.size, 0.5);
        assert!(!config.geocoder.enabled);
        assert!(!config.coordinate.enabled);
    }

    #[test]
    fn tooltip_fields_keep_their_order() {
        let mut issues = Issues::new();
        let value = json!({
            "tooltip": {
                "fieldsToShow": { "trips": ["fare", "distance", "hour"] },
                "compareMode": false,
                "compareType": "absolute",
                "enabled": true,
            },
        });
        let config =
            InteractionConfig::from_value(Some(&value), "config.interactionConfig", &mut issues);
        assert!(issues.into_result().is_ok());
        assert_eq!(
            config.tooltip.fields_to_show.get("trips").map(Vec::as_slice),
            Some(["fare".to_string(), "distance".to_string(), "hour".to_string()].as_slice())
        );
    }

    #[test]
    fn unknown_compare_type_is_an_issue() {
        let mut issues = Issues::new();
        let value = json!({ "tooltip": { "compareType": "percent" } });
        InteractionConfig::from_value(Some(&value), "config.interactionConfig", &mut issues);
        let err = issues.into_result().expect_err("expect issues");
        assert_eq!(
            err.issues()[0].path,
            "config.interactionConfig.tooltip.compareType"
        );
    }
}
