use std::collections::BTreeMap;

use serde_json::{Map, Value, json};

use crate::error::Issues;
use crate::json;

/// 3D building tint of the stock dark basemap, pre-scaled to [0, 255] floats
/// by the producing application.
pub const DEFAULT_BUILDING_COLOR: [f64; 3] =
    [9.665468314072013, 17.18305478057247, 31.1442867897876];

/// Basemap appearance kind. Anything outside the stock set is a key into
/// `map_styles` and passes through unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum BasemapStyle {
    #[default]
    Dark,
    Light,
    Satellite,
    Muted,
    MutedNight,
    Custom(String),
}

impl BasemapStyle {
    pub fn as_str(&self) -> &str {
        match self {
            BasemapStyle::Dark => "dark",
            BasemapStyle::Light => "light",
            BasemapStyle::Satellite => "satellite",
            BasemapStyle::Muted => "muted",
            BasemapStyle::MutedNight => "muted_night",
            BasemapStyle::Custom(name) => name,
        }
    }

    pub fn from_name(name: &str) -> Self {
        match name {
            "dark" => BasemapStyle::Dark,
            "light" => BasemapStyle::Light,
            "satellite" => BasemapStyle::Satellite,
            "muted" => BasemapStyle::Muted,
            "muted_night" => BasemapStyle::MutedNight,
            other => BasemapStyle::Custom(other.to_string()),
        }
    }
}

/// Non-data background map appearance: which basemap, and which of its
/// feature groups are drawn above or below the data layers.
#[derive(Debug, Clone, PartialEq)]
pub struct MapStyle {
    pub style_type: BasemapStyle,
    pub top_layer_groups: BTreeMap<String, bool>,
    pub visible_layer_groups: BTreeMap<String, bool>,
    pub three_d_building_color: [f64; 3],
    /// Custom style definitions, keyed by style id; opaque to this model.
    pub map_styles: Map<String, Value>,
}

impl Default for MapStyle {
    fn default() -> Self {
        Self {
            style_type: BasemapStyle::Dark,
            top_layer_groups: BTreeMap::new(),
            visible_layer_groups: BTreeMap::new(),
            three_d_building_color: DEFAULT_BUILDING_COLOR,
            map_styles: Map::new(),
        }
    }
}

impl MapStyle {
    pub(crate) fn from_value(value: Option<&Value>, path: &str, issues: &mut Issues) -> Self {
        let defaults = Self::default();
        let Some(value) = value else {
            return defaults;
        };
        let Some(obj) = json::as_object(value, path, issues) else {
            return defaults;
        };

        let style_type = match obj.get("styleType") {
            None | Some(Value::Null) => defaults.style_type,
            Some(Value::String(s)) => BasemapStyle::from_name(s),
            Some(_) => {
                issues.push(json::join(path, "styleType"), "expected a string");
                defaults.style_type
            }
        };

        let three_d_building_color = match obj.get("threeDBuildingColor") {
            None | Some(Value::Null) => defaults.three_d_building_color,
            Some(v) => json::rgb_f64(v, &json::join(path, "threeDBuildingColor"), issues)
                .unwrap_or(defaults.three_d_building_color),
        };

        let group_map = |key: &str, issues: &mut Issues| match obj.get(key) {
            None | Some(Value::Null) => BTreeMap::new(),
            Some(v) => json::bool_map(v, &json::join(path, key), issues),
        };

        let map_styles = match obj.get("mapStyles") {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(styles)) => styles.clone(),
            Some(_) => {
                issues.push(json::join(path, "mapStyles"), "expected an object");
                Map::new()
            }
        };

        Self {
            style_type,
            top_layer_groups: group_map("topLayerGroups", issues),
            visible_layer_groups: group_map("visibleLayerGroups", issues),
            three_d_building_color,
            map_styles,
        }
    }

    pub fn to_json_value(&self) -> Value {
        json!({
            "styleType": self.style_type.as_str(),
            "topLayerGroups": self.top_layer_groups,
            "visibleLayerGroups": self.visible_layer_groups,
            "threeDBuildingColor": self.three_d_building_color,
            "mapStyles": self.map_styles,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn stock_and_custom_style_names_both_parse() {
        assert_eq!(BasemapStyle::from_name("dark"), BasemapStyle::Dark);
        assert_eq!(BasemapStyle::from_name("muted_night"), BasemapStyle::MutedNight);
        let custom = BasemapStyle::from_name("my_company_style");
        assert_eq!(custom, BasemapStyle::Custom("my_company_style".to_string()));
        assert_eq!(custom.as_str(), "my_company_style");
    }

    #[test]
    fn fractional_building_color_is_legal() {
        let mut issues = Issues::new();
        let value = json!({
            "styleType": "dark",
            "threeDBuildingColor": [9.665468314072013, 17.18305478057247, 31.1442867897876],
        });
        let style = MapStyle::from_value(Some(&value), "config.mapStyle", &mut issues);
        assert!(issues.into_result().is_ok());
        assert_eq!(style.three_d_building_color, DEFAULT_BUILDING_COLOR);
    }

    #[test]
    fn building_color_out_of_range_is_an_issue() {
        let mut issues = Issues::new();
        let value = json!({ "threeDBuildingColor": [0.0, 260.0, 10.0] });
        MapStyle::from_value(Some(&value), "config.mapStyle", &mut issues);
        let err = issues.into_result().expect_err("expect issues");
        assert_eq!(err.issues()[0].path, "config.mapStyle.threeDBuildingColor[1]");
    }

    #[test]
    fn layer_group_toggles_parse_per_key() {
        let mut issues = Issues::new();
        let value = json!({
            "visibleLayerGroups": {
                "label": true,
                "road": true,
                "3d building": false,
            },
        });
        let style = MapStyle::from_value(Some(&value), "config.mapStyle", &mut issues);
        assert!(issues.into_result().is_ok());
        assert_eq!(style.visible_layer_groups.get("3d building"), Some(&false));
        assert_eq!(style.visible_layer_groups.len(), 3);
    }
}
