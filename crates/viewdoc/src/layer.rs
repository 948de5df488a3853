use std::collections::BTreeMap;

use serde_json::{Map, Value, json};

use crate::channels::{FieldRef, VisualChannels};
use crate::color::ColorRange;
use crate::error::Issues;
use crate::json;

/// Fallback flat fill for a layer whose document omits `color`. First entry
/// of the stock categorical palette in the originating ecosystem.
pub const DEFAULT_LAYER_COLOR: [u8; 3] = [18, 147, 154];

pub const DEFAULT_HIGHLIGHT_COLOR: [u8; 4] = [252, 242, 26, 255];

/// One renderable data layer, tagged by `type`. Only the `geojson` kind is
/// modeled in full; any other kind is carried through untouched so documents
/// from newer producers survive a load/save cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum Layer {
    GeoJson(GeoJsonLayer),
    Other { kind: String, raw: Value },
}

impl Layer {
    pub fn kind(&self) -> &str {
        match self {
            Layer::GeoJson(_) => "geojson",
            Layer::Other { kind, .. } => kind,
        }
    }

    /// Layer id, best-effort for opaque kinds.
    pub fn id(&self) -> Option<&str> {
        match self {
            Layer::GeoJson(layer) => Some(&layer.id),
            Layer::Other { raw, .. } => raw.get("id").and_then(Value::as_str),
        }
    }

    /// Dataset this layer draws from, best-effort for opaque kinds.
    pub fn data_id(&self) -> Option<&str> {
        match self {
            Layer::GeoJson(layer) => Some(&layer.config.data_id),
            Layer::Other { raw, .. } => raw
                .get("config")
                .and_then(|config| config.get("dataId"))
                .and_then(Value::as_str),
        }
    }

    pub(crate) fn from_value(value: &Value, path: &str, issues: &mut Issues) -> Option<Self> {
        let obj = json::as_object(value, path, issues)?;
        let kind = json::req_str(obj, "type", path, issues)?;
        if kind == "geojson" {
            Some(Layer::GeoJson(GeoJsonLayer::from_obj(obj, path, issues)))
        } else {
            Some(Layer::Other {
                kind,
                raw: value.clone(),
            })
        }
    }

    pub fn to_json_value(&self) -> Value {
        match self {
            Layer::GeoJson(layer) => layer.to_json_value(),
            Layer::Other { raw, .. } => raw.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeoJsonLayer {
    pub id: String,
    pub config: LayerConfig,
    pub visual_channels: VisualChannels,
}

impl GeoJsonLayer {
    fn from_obj(obj: &Map<String, Value>, path: &str, issues: &mut Issues) -> Self {
        let id = json::req_str(obj, "id", path, issues).unwrap_or_default();
        let config =
            LayerConfig::from_value(obj.get("config"), &json::join(path, "config"), issues);
        let visual_channels = VisualChannels::from_value(
            obj.get("visualChannels"),
            &json::join(path, "visualChannels"),
            issues,
        );
        Self {
            id,
            config,
            visual_channels,
        }
    }

    /// True when the layer paints with its flat `config.color` rather than a
    /// data-driven color scale.
    pub fn uses_flat_color(&self) -> bool {
        self.visual_channels.is_flat_color()
    }

    pub fn to_json_value(&self) -> Value {
        json!({
            "id": self.id,
            "type": "geojson",
            "config": self.config.to_json_value(),
            "visualChannels": self.visual_channels.to_json_value(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayerConfig {
    /// Key into the external dataset registry. Existence is checked by
    /// reference resolution, not here; parse only rejects empty ids.
    pub data_id: String,
    pub label: String,
    pub color: [u8; 3],
    pub highlight_color: [u8; 4],
    /// Semantic role (e.g. `geojson`) to source field name.
    pub columns: BTreeMap<String, String>,
    pub is_visible: bool,
    pub vis_config: VisConfig,
    pub hidden: bool,
    pub text_label: Vec<TextLabel>,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            data_id: String::new(),
            label: String::new(),
            color: DEFAULT_LAYER_COLOR,
            highlight_color: DEFAULT_HIGHLIGHT_COLOR,
            columns: BTreeMap::new(),
            is_visible: true,
            vis_config: VisConfig::default(),
            hidden: false,
            text_label: Vec::new(),
        }
    }
}

impl LayerConfig {
    pub(crate) fn from_value(value: Option<&Value>, path: &str, issues: &mut Issues) -> Self {
        let defaults = Self::default();
        let Some(value) = value else {
            issues.push(json::join(path, "dataId"), "missing required field");
            return defaults;
        };
        let Some(obj) = json::as_object(value, path, issues) else {
            return defaults;
        };

        let data_id = match json::req_str(obj, "dataId", path, issues) {
            Some(id) => {
                if id.trim().is_empty() {
                    issues.push(json::join(path, "dataId"), "must not be empty");
                }
                id
            }
            None => String::new(),
        };

        let color = match obj.get("color") {
            None | Some(Value::Null) => defaults.color,
            Some(v) => {
                json::rgb_u8(v, &json::join(path, "color"), issues).unwrap_or(defaults.color)
            }
        };
        let highlight_color = match obj.get("highlightColor") {
            None | Some(Value::Null) => defaults.highlight_color,
            Some(v) => json::rgba_u8(v, &json::join(path, "highlightColor"), issues)
                .unwrap_or(defaults.highlight_color),
        };

        let columns = match obj.get("columns") {
            None | Some(Value::Null) => defaults.columns,
            Some(v) => json::string_map(v, &json::join(path, "columns"), issues),
        };

        let text_label = match obj.get("textLabel") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => {
                let labels_path = json::join(path, "textLabel");
                items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| {
                        TextLabel::from_value(item, &json::index(&labels_path, i), issues)
                    })
                    .collect()
            }
            Some(_) => {
                issues.push(json::join(path, "textLabel"), "expected an array of label specs");
                Vec::new()
            }
        };

        Self {
            data_id,
            label: json::str_or(obj, "label", "", path, issues),
            color,
            highlight_color,
            columns,
            is_visible: json::bool_or(obj, "isVisible", true, path, issues),
            vis_config: VisConfig::from_value(
                obj.get("visConfig"),
                &json::join(path, "visConfig"),
                issues,
            ),
            hidden: json::bool_or(obj, "hidden", false, path, issues),
            text_label,
        }
    }

    pub fn to_json_value(&self) -> Value {
        json!({
            "dataId": self.data_id,
            "label": self.label,
            "color": self.color,
            "highlightColor": self.highlight_color,
            "columns": self.columns,
            "isVisible": self.is_visible,
            "visConfig": self.vis_config.to_json_value(),
            "hidden": self.hidden,
            "textLabel": self.text_label.iter().map(TextLabel::to_json_value).collect::<Vec<_>>(),
        })
    }
}

/// Fine-grained style knobs for a geojson layer. Defaults mirror the stock
/// values emitted by the originating visualization when a knob is untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct VisConfig {
    pub opacity: f64,
    pub stroke_opacity: f64,
    pub thickness: f64,
    pub stroke_color: Option<[u8; 3]>,
    pub color_range: ColorRange,
    pub stroke_color_range: ColorRange,
    pub radius: f64,
    pub size_range: [f64; 2],
    pub radius_range: [f64; 2],
    pub height_range: [f64; 2],
    pub elevation_scale: f64,
    pub enable_elevation_zoom_factor: bool,
    pub stroked: bool,
    pub filled: bool,
    pub enable3d: bool,
    pub wireframe: bool,
}

impl Default for VisConfig {
    fn default() -> Self {
        Self {
            opacity: 0.8,
            stroke_opacity: 0.8,
            thickness: 0.5,
            stroke_color: None,
            color_range: ColorRange::default(),
            stroke_color_range: ColorRange::default(),
            radius: 10.0,
            size_range: [0.0, 10.0],
            radius_range: [0.0, 50.0],
            height_range: [0.0, 500.0],
            elevation_scale: 5.0,
            enable_elevation_zoom_factor: true,
            stroked: true,
            filled: true,
            enable3d: false,
            wireframe: false,
        }
    }
}

impl VisConfig {
    pub(crate) fn from_value(value: Option<&Value>, path: &str, issues: &mut Issues) -> Self {
        let defaults = Self::default();
        let Some(value) = value else {
            return defaults;
        };
        let Some(obj) = json::as_object(value, path, issues) else {
            return defaults;
        };

        let opacity = json::f64_or(obj, "opacity", defaults.opacity, path, issues);
        if !(0.0..=1.0).contains(&opacity) {
            issues.push(json::join(path, "opacity"), "must be within [0, 1]");
        }
        let stroke_opacity =
            json::f64_or(obj, "strokeOpacity", defaults.stroke_opacity, path, issues);
        if !(0.0..=1.0).contains(&stroke_opacity) {
            issues.push(json::join(path, "strokeOpacity"), "must be within [0, 1]");
        }

        let stroke_color = match obj.get("strokeColor") {
            None | Some(Value::Null) => None,
            Some(v) => json::rgb_u8(v, &json::join(path, "strokeColor"), issues),
        };

        let elevation_scale =
            json::f64_or(obj, "elevationScale", defaults.elevation_scale, path, issues);
        if elevation_scale <= 0.0 {
            issues.push(json::join(path, "elevationScale"), "must be positive");
        }

        let range_or = |key: &str, default: [f64; 2], issues: &mut Issues| match obj.get(key) {
            None | Some(Value::Null) => default,
            Some(v) => json::range_pair(v, &json::join(path, key), issues).unwrap_or(default),
        };

        Self {
            opacity,
            stroke_opacity,
            thickness: json::f64_or(obj, "thickness", defaults.thickness, path, issues),
            stroke_color,
            color_range: ColorRange::from_value(
                obj.get("colorRange"),
                &json::join(path, "colorRange"),
                issues,
            ),
            stroke_color_range: ColorRange::from_value(
                obj.get("strokeColorRange"),
                &json::join(path, "strokeColorRange"),
                issues,
            ),
            radius: json::f64_or(obj, "radius", defaults.radius, path, issues),
            size_range: range_or("sizeRange", defaults.size_range, issues),
            radius_range: range_or("radiusRange", defaults.radius_range, issues),
            height_range: range_or("heightRange", defaults.height_range, issues),
            elevation_scale,
            enable_elevation_zoom_factor: json::bool_or(
                obj,
                "enableElevationZoomFactor",
                defaults.enable_elevation_zoom_factor,
                path,
                issues,
            ),
            stroked: json::bool_or(obj, "stroked", defaults.stroked, path, issues),
            filled: json::bool_or(obj, "filled", defaults.filled, path, issues),
            enable3d: json::bool_or(obj, "enable3d", defaults.enable3d, path, issues),
            wireframe: json::bool_or(obj, "wireframe", defaults.wireframe, path, issues),
        }
    }

    pub fn to_json_value(&self) -> Value {
        json!({
            "opacity": self.opacity,
            "strokeOpacity": self.stroke_opacity,
            "thickness": self.thickness,
            "strokeColor": self.stroke_color,
            "colorRange": self.color_range.to_json_value(),
            "strokeColorRange": self.stroke_color_range.to_json_value(),
            "radius": self.radius,
            "sizeRange": self.size_range,
            "radiusRange": self.radius_range,
            "heightRange": self.height_range,
            "elevationScale": self.elevation_scale,
            "enableElevationZoomFactor": self.enable_elevation_zoom_factor,
            "stroked": self.stroked,
            "filled": self.filled,
            "enable3d": self.enable3d,
            "wireframe": self.wireframe,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelAnchor {
    Start,
    Middle,
    End,
}

impl LabelAnchor {
    pub fn as_str(self) -> &'static str {
        match self {
            LabelAnchor::Start => "start",
            LabelAnchor::Middle => "middle",
            LabelAnchor::End => "end",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "start" => Some(LabelAnchor::Start),
            "middle" => Some(LabelAnchor::Middle),
            "end" => Some(LabelAnchor::End),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelAlignment {
    Top,
    Center,
    Bottom,
}

impl LabelAlignment {
    pub fn as_str(self) -> &'static str {
        match self {
            LabelAlignment::Top => "top",
            LabelAlignment::Center => "center",
            LabelAlignment::Bottom => "bottom",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "top" => Some(LabelAlignment::Top),
            "center" => Some(LabelAlignment::Center),
            "bottom" => Some(LabelAlignment::Bottom),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextLabel {
    pub field: Option<FieldRef>,
    pub color: [u8; 3],
    pub size: f64,
    pub offset: [f64; 2],
    pub anchor: LabelAnchor,
    pub alignment: LabelAlignment,
}

impl Default for TextLabel {
    fn default() -> Self {
        Self {
            field: None,
            color: [255, 255, 255],
            size: 18.0,
            offset: [0.0, 0.0],
            anchor: LabelAnchor::Start,
            alignment: LabelAlignment::Center,
        }
    }
}

impl TextLabel {
    pub(crate) fn from_value(value: &Value, path: &str, issues: &mut Issues) -> Self {
        let defaults = Self::default();
        let Some(obj) = json::as_object(value, path, issues) else {
            return defaults;
        };

        let field = match obj.get("field") {
            None | Some(Value::Null) => None,
            Some(v) => FieldRef::from_value(v, &json::join(path, "field"), issues),
        };
        let color = match obj.get("color") {
            None | Some(Value::Null) => defaults.color,
            Some(v) => {
                json::rgb_u8(v, &json::join(path, "color"), issues).unwrap_or(defaults.color)
            }
        };
        let offset = match obj.get("offset") {
            None | Some(Value::Null) => defaults.offset,
            Some(v) => {
                json::f64_pair(v, &json::join(path, "offset"), issues).unwrap_or(defaults.offset)
            }
        };

        let anchor = match obj.get("anchor") {
            None | Some(Value::Null) => defaults.anchor,
            Some(Value::String(s)) => LabelAnchor::from_name(s).unwrap_or_else(|| {
                issues.push(json::join(path, "anchor"), format!("unknown anchor: {s}"));
                defaults.anchor
            }),
            Some(_) => {
                issues.push(json::join(path, "anchor"), "expected a string");
                defaults.anchor
            }
        };
        let alignment = match obj.get("alignment") {
            None | Some(Value::Null) => defaults.alignment,
            Some(Value::String(s)) => LabelAlignment::from_name(s).unwrap_or_else(|| {
                issues.push(json::join(path, "alignment"), format!("unknown alignment: {s}"));
                defaults.alignment
            }),
            Some(_) => {
                issues.push(json::join(path, "alignment"), "expected a string");
                defaults.alignment
            }
        };

        Self {
            field,
            color,
            size: json::f64_or(obj, "size", defaults.size, path, issues),
            offset,
            anchor,
            alignment,
        }
    }

    pub fn to_json_value(&self) -> Value {
        json!({
            "field": self.field.as_ref().map(FieldRef::to_json_value),
            "color": self.color,
            "size": self.size,
            "offset": self.offset,
            "anchor": self.anchor.as_str(),
            "alignment": self.alignment.as_str(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn geojson_layer_parses_with_defaults() {
        let mut issues = Issues::new();
        let value = json!({
            "id": "a1",
            "type": "geojson",
            "config": { "dataId": "boundaries" },
        });
        let layer = Layer::from_value(&value, "layers[0]", &mut issues).expect("layer");
        assert!(issues.into_result().is_ok());

        let Layer::GeoJson(layer) = layer else {
            panic!("expected geojson layer");
        };
        assert_eq!(layer.id, "a1");
        assert_eq!(layer.config.data_id, "boundaries");
        assert_eq!(layer.config.color, DEFAULT_LAYER_COLOR);
        assert!(layer.config.is_visible);
        assert!(!layer.config.hidden);
        assert!(layer.uses_flat_color());
        assert_eq!(layer.config.vis_config.size_range, [0.0, 10.0]);
    }

    #[test]
    fn unknown_layer_kind_is_preserved_verbatim() {
        let mut issues = Issues::new();
        let value = json!({
            "id": "hex-1",
            "type": "hexagon",
            "config": { "dataId": "trips", "worldUnitSize": 1.5 },
        });
        let layer = Layer::from_value(&value, "layers[0]", &mut issues).expect("layer");
        assert!(issues.into_result().is_ok());

        assert_eq!(layer.kind(), "hexagon");
        assert_eq!(layer.id(), Some("hex-1"));
        assert_eq!(layer.data_id(), Some("trips"));
        assert_eq!(layer.to_json_value(), value);
    }

    #[test]
    fn layer_without_type_is_rejected() {
        let mut issues = Issues::new();
        assert!(Layer::from_value(&json!({ "id": "x" }), "layers[0]", &mut issues).is_none());
        let err = issues.into_result().expect_err("expect issues");
        assert_eq!(err.issues()[0].path, "layers[0].type");
    }

    #[test]
    fn empty_data_id_is_an_issue() {
        let mut issues = Issues::new();
        let value = json!({ "id": "a", "type": "geojson", "config": { "dataId": "  " } });
        Layer::from_value(&value, "layers[0]", &mut issues);
        let err = issues.into_result().expect_err("expect issues");
        assert_eq!(err.issues()[0].path, "layers[0].config.dataId");
        assert_eq!(err.issues()[0].reason, "must not be empty");
    }

    #[test]
    fn near_zero_opacity_is_a_legal_authored_value() {
        let mut issues = Issues::new();
        let value = json!({ "opacity": 0.01 });
        let config = VisConfig::from_value(Some(&value), "visConfig", &mut issues);
        assert!(issues.into_result().is_ok());
        assert_eq!(config.opacity, 0.01);
    }

    #[test]
    fn out_of_range_knobs_are_all_reported() {
        let mut issues = Issues::new();
        let value = json!({
            "opacity": 1.5,
            "strokeOpacity": -0.2,
            "elevationScale": 0,
            "heightRange": [500, 0],
        });
        VisConfig::from_value(Some(&value), "visConfig", &mut issues);
        let err = issues.into_result().expect_err("expect issues");
        let paths: Vec<&str> = err.issues().iter().map(|i| i.path.as_str()).collect();
        assert_eq!(
            paths,
            [
                "visConfig.opacity",
                "visConfig.strokeOpacity",
                "visConfig.elevationScale",
                "visConfig.heightRange",
            ]
        );
    }

    #[test]
    fn text_label_roundtrips() {
        let mut issues = Issues::new();
        let value = json!({
            "field": null,
            "color": [255, 255, 255],
            "size": 18,
            "offset": [0, 0],
            "anchor": "start",
            "alignment": "center",
        });
        let label = TextLabel::from_value(&value, "textLabel[0]", &mut issues);
        assert!(issues.into_result().is_ok());
        assert_eq!(label, TextLabel::default());
    }
}
