use std::fmt;

use serde_json::{Value, json};

use crate::error::Issues;
use crate::json;

/// A validated `#RRGGBB` color string. Original casing is kept so documents
/// round-trip byte-for-byte on this field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HexColor(String);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidHexColor {
    pub found: String,
}

impl fmt::Display for InvalidHexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "not a valid #RRGGBB color: {:?}", self.found)
    }
}

impl std::error::Error for InvalidHexColor {}

impl HexColor {
    pub fn parse(s: &str) -> Result<Self, InvalidHexColor> {
        let bytes = s.as_bytes();
        let well_formed =
            bytes.len() == 7 && bytes[0] == b'#' && bytes[1..].iter().all(u8::is_ascii_hexdigit);
        if well_formed {
            Ok(Self(s.to_string()))
        } else {
            Err(InvalidHexColor {
                found: s.to_string(),
            })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Decoded channel values. Infallible: the string was validated on entry.
    pub fn rgb(&self) -> [u8; 3] {
        let channel = |i: usize| u8::from_str_radix(&self.0[i..i + 2], 16).unwrap_or(0);
        [channel(1), channel(3), channel(5)]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorRangeKind {
    Sequential,
    Diverging,
    Qualitative,
    Custom,
}

impl ColorRangeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ColorRangeKind::Sequential => "sequential",
            ColorRangeKind::Diverging => "diverging",
            ColorRangeKind::Qualitative => "qualitative",
            ColorRangeKind::Custom => "custom",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "sequential" => Some(ColorRangeKind::Sequential),
            "diverging" => Some(ColorRangeKind::Diverging),
            "qualitative" => Some(ColorRangeKind::Qualitative),
            "custom" => Some(ColorRangeKind::Custom),
            _ => None,
        }
    }
}

/// A named, ordered palette used to map scaled values to colors.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorRange {
    pub name: String,
    pub kind: ColorRangeKind,
    pub category: String,
    pub colors: Vec<HexColor>,
}

impl Default for ColorRange {
    /// The "Global Warming" palette, the stock sequential ramp of the
    /// visualization ecosystem this format comes from.
    fn default() -> Self {
        let colors = ["#5A1846", "#900C3F", "#C70039", "#E3611C", "#F1920E", "#FFC300"]
            .into_iter()
            .map(|s| HexColor(s.to_string()))
            .collect();
        Self {
            name: "Global Warming".to_string(),
            kind: ColorRangeKind::Sequential,
            category: "Uber".to_string(),
            colors,
        }
    }
}

impl ColorRange {
    pub(crate) fn from_value(value: Option<&Value>, path: &str, issues: &mut Issues) -> Self {
        let defaults = Self::default();
        let Some(value) = value else {
            return defaults;
        };
        if value.is_null() {
            return defaults;
        }
        let Some(obj) = json::as_object(value, path, issues) else {
            return defaults;
        };

        let name = json::str_or(obj, "name", &defaults.name, path, issues);
        let category = json::str_or(obj, "category", &defaults.category, path, issues);

        let kind = match obj.get("type") {
            None | Some(Value::Null) => defaults.kind,
            Some(Value::String(s)) => ColorRangeKind::from_name(s).unwrap_or_else(|| {
                issues.push(json::join(path, "type"), format!("unknown color range type: {s}"));
                defaults.kind
            }),
            Some(_) => {
                issues.push(json::join(path, "type"), "expected a string");
                defaults.kind
            }
        };

        let colors = match obj.get("colors") {
            None | Some(Value::Null) => defaults.colors,
            Some(Value::Array(items)) => {
                let colors_path = json::join(path, "colors");
                if items.is_empty() {
                    issues.push(colors_path, "palette must contain at least one color");
                    defaults.colors
                } else {
                    let mut out = Vec::with_capacity(items.len());
                    for (i, item) in items.iter().enumerate() {
                        match item.as_str().map(HexColor::parse) {
                            Some(Ok(color)) => out.push(color),
                            Some(Err(e)) => {
                                issues.push(json::index(&colors_path, i), e.to_string())
                            }
                            None => issues
                                .push(json::index(&colors_path, i), "expected a hex color string"),
                        }
                    }
                    out
                }
            }
            Some(_) => {
                issues.push(json::join(path, "colors"), "expected an array of hex colors");
                defaults.colors
            }
        };

        Self {
            name,
            kind,
            category,
            colors,
        }
    }

    pub fn to_json_value(&self) -> Value {
        json!({
            "name": self.name,
            "type": self.kind.as_str(),
            "category": self.category,
            "colors": self.colors.iter().map(HexColor::as_str).collect::<Vec<_>>(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn hex_color_roundtrips_casing() {
        let color = HexColor::parse("#5A1846").expect("parse hex");
        assert_eq!(color.as_str(), "#5A1846");
        assert_eq!(color.rgb(), [0x5A, 0x18, 0x46]);
    }

    #[test]
    fn hex_color_rejects_malformed_strings() {
        for bad in ["5A1846", "#5A184", "#5A18466", "#GG0000", "#5a18"] {
            assert!(HexColor::parse(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn missing_palette_falls_back_to_global_warming() {
        let mut issues = Issues::new();
        let range = ColorRange::from_value(None, "colorRange", &mut issues);
        assert!(issues.into_result().is_ok());
        assert_eq!(range.name, "Global Warming");
        assert_eq!(range.colors.len(), 6);
        assert_eq!(range.colors[0].as_str(), "#5A1846");
    }

    #[test]
    fn empty_palette_is_an_issue() {
        let mut issues = Issues::new();
        let value = json!({ "name": "x", "type": "custom", "category": "c", "colors": [] });
        ColorRange::from_value(Some(&value), "colorRange", &mut issues);
        let err = issues.into_result().expect_err("expect issues");
        assert_eq!(err.issues()[0].path, "colorRange.colors");
    }

    #[test]
    fn bad_hex_entries_are_each_reported() {
        let mut issues = Issues::new();
        let value = json!({ "colors": ["#C70039", "red", "#12345"] });
        ColorRange::from_value(Some(&value), "colorRange", &mut issues);
        let err = issues.into_result().expect_err("expect issues");
        assert_eq!(err.issues().len(), 2);
        assert_eq!(err.issues()[0].path, "colorRange.colors[1]");
        assert_eq!(err.issues()[1].path, "colorRange.colors[2]");
    }
}
