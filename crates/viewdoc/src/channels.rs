use serde_json::{Map, Value, json};

use crate::error::Issues;
use crate::json;

/// Scale function applied when a channel is bound to a data field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleType {
    Linear,
    Quantile,
    Quantize,
    Ordinal,
    Sqrt,
    Log,
}

impl ScaleType {
    pub fn as_str(self) -> &'static str {
        match self {
            ScaleType::Linear => "linear",
            ScaleType::Quantile => "quantile",
            ScaleType::Quantize => "quantize",
            ScaleType::Ordinal => "ordinal",
            ScaleType::Sqrt => "sqrt",
            ScaleType::Log => "log",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "linear" => Some(ScaleType::Linear),
            "quantile" => Some(ScaleType::Quantile),
            "quantize" => Some(ScaleType::Quantize),
            "ordinal" => Some(ScaleType::Ordinal),
            "sqrt" => Some(ScaleType::Sqrt),
            "log" => Some(ScaleType::Log),
            _ => None,
        }
    }
}

/// Reference to a dataset field. Accepted either as a bare field name or as
/// a `{ "name": ..., "type": ... }` object; the typed form keeps the declared
/// field type so it survives a round-trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRef {
    pub name: String,
    pub field_type: Option<String>,
}

impl FieldRef {
    pub(crate) fn from_value(value: &Value, path: &str, issues: &mut Issues) -> Option<Self> {
        match value {
            Value::String(name) => Some(Self {
                name: name.clone(),
                field_type: None,
            }),
            Value::Object(obj) => {
                let name = json::req_str(obj, "name", path, issues)?;
                let field_type = match obj.get("type") {
                    None | Some(Value::Null) => None,
                    Some(Value::String(s)) => Some(s.clone()),
                    Some(_) => {
                        issues.push(json::join(path, "type"), "expected a string");
                        None
                    }
                };
                Some(Self { name, field_type })
            }
            _ => {
                issues.push(path, "expected a field name, field object, or null");
                None
            }
        }
    }

    pub fn to_json_value(&self) -> Value {
        match &self.field_type {
            Some(field_type) => json!({ "name": self.name, "type": field_type }),
            None => Value::String(self.name.clone()),
        }
    }
}

/// Field-to-encoding bindings for one layer. A `None` field means the channel
/// is not data-driven: the layer uses its flat style for that channel, and the
/// paired scale type is inert.
#[derive(Debug, Clone, PartialEq)]
pub struct VisualChannels {
    pub color_field: Option<FieldRef>,
    pub color_scale: ScaleType,
    pub stroke_color_field: Option<FieldRef>,
    pub stroke_color_scale: ScaleType,
    pub size_field: Option<FieldRef>,
    pub size_scale: ScaleType,
    pub height_field: Option<FieldRef>,
    pub height_scale: ScaleType,
    pub radius_field: Option<FieldRef>,
    pub radius_scale: ScaleType,
}

impl Default for VisualChannels {
    fn default() -> Self {
        Self {
            color_field: None,
            color_scale: ScaleType::Quantile,
            stroke_color_field: None,
            stroke_color_scale: ScaleType::Quantile,
            size_field: None,
            size_scale: ScaleType::Linear,
            height_field: None,
            height_scale: ScaleType::Linear,
            radius_field: None,
            radius_scale: ScaleType::Linear,
        }
    }
}

impl VisualChannels {
    /// True when fill color is not bound to a data field, i.e. the layer
    /// paints with its flat `color`.
    pub fn is_flat_color(&self) -> bool {
        self.color_field.is_none()
    }

    pub(crate) fn from_value(value: Option<&Value>, path: &str, issues: &mut Issues) -> Self {
        let defaults = Self::default();
        let Some(value) = value else {
            return defaults;
        };
        let Some(obj) = json::as_object(value, path, issues) else {
            return defaults;
        };

        Self {
            color_field: channel_field(obj, "colorField", path, issues),
            color_scale: channel_scale(obj, "colorScale", defaults.color_scale, path, issues),
            stroke_color_field: channel_field(obj, "strokeColorField", path, issues),
            stroke_color_scale: channel_scale(
                obj,
                "strokeColorScale",
                defaults.stroke_color_scale,
                path,
                issues,
            ),
            size_field: channel_field(obj, "sizeField", path, issues),
            size_scale: channel_scale(obj, "sizeScale", defaults.size_scale, path, issues),
            height_field: channel_field(obj, "heightField", path, issues),
            height_scale: channel_scale(obj, "heightScale", defaults.height_scale, path, issues),
            radius_field: channel_field(obj, "radiusField", path, issues),
            radius_scale: channel_scale(obj, "radiusScale", defaults.radius_scale, path, issues),
        }
    }

    pub fn to_json_value(&self) -> Value {
        let field = |f: &Option<FieldRef>| match f {
            Some(field) => field.to_json_value(),
            None => Value::Null,
        };
        json!({
            "colorField": field(&self.color_field),
            "colorScale": self.color_scale.as_str(),
            "strokeColorField": field(&self.stroke_color_field),
            "strokeColorScale": self.stroke_color_scale.as_str(),
            "sizeField": field(&self.size_field),
            "sizeScale": self.size_scale.as_str(),
            "heightField": field(&self.height_field),
            "heightScale": self.height_scale.as_str(),
            "radiusField": field(&self.radius_field),
            "radiusScale": self.radius_scale.as_str(),
        })
    }
}

fn channel_field(
    obj: &Map<String, Value>,
    key: &str,
    path: &str,
    issues: &mut Issues,
) -> Option<FieldRef> {
    match obj.get(key) {
        None | Some(Value::Null) => None,
        Some(value) => FieldRef::from_value(value, &json::join(path, key), issues),
    }
}

fn channel_scale(
    obj: &Map<String, Value>,
    key: &str,
    default: ScaleType,
    path: &str,
    issues: &mut Issues,
) -> ScaleType {
    match obj.get(key) {
        None | Some(Value::Null) => default,
        Some(Value::String(s)) => ScaleType::from_name(s).unwrap_or_else(|| {
            issues.push(json::join(path, key), format!("unknown scale type: {s}"));
            default
        }),
        Some(_) => {
            issues.push(json::join(path, key), "expected a scale type string");
            default
        }
    }
}
