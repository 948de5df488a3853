use serde_json::{Value, json};

use crate::error::Issues;
use crate::json;

/// Camera state of the saved view. `latitude` and `longitude` are required:
/// a saved view without a camera position cannot be restored meaningfully.
#[derive(Debug, Clone, PartialEq)]
pub struct MapState {
    pub bearing: f64,
    pub drag_rotate: bool,
    pub latitude: f64,
    pub longitude: f64,
    pub pitch: f64,
    pub zoom: f64,
    pub is_split: bool,
}

impl MapState {
    pub(crate) fn from_value(value: Option<&Value>, path: &str, issues: &mut Issues) -> Self {
        let obj = value.and_then(|v| json::as_object(v, path, issues));
        let Some(obj) = obj else {
            if value.is_none() {
                issues.push(json::join(path, "latitude"), "missing required field");
                issues.push(json::join(path, "longitude"), "missing required field");
            }
            return Self {
                bearing: 0.0,
                drag_rotate: false,
                latitude: 0.0,
                longitude: 0.0,
                pitch: 0.0,
                zoom: 0.0,
                is_split: false,
            };
        };

        let latitude = json::req_f64(obj, "latitude", path, issues).inspect(|lat| {
            if !(-90.0..=90.0).contains(lat) {
                issues.push(json::join(path, "latitude"), "must be within [-90, 90]");
            }
        });
        let longitude = json::req_f64(obj, "longitude", path, issues).inspect(|lon| {
            if !(-180.0..=180.0).contains(lon) {
                issues.push(json::join(path, "longitude"), "must be within [-180, 180]");
            }
        });

        let zoom = json::f64_or(obj, "zoom", 0.0, path, issues);
        if zoom < 0.0 {
            issues.push(json::join(path, "zoom"), "must be non-negative");
        }

        Self {
            bearing: json::f64_or(obj, "bearing", 0.0, path, issues),
            drag_rotate: json::bool_or(obj, "dragRotate", false, path, issues),
            latitude: latitude.unwrap_or(0.0),
            longitude: longitude.unwrap_or(0.0),
            pitch: json::f64_or(obj, "pitch", 0.0, path, issues),
            zoom,
            is_split: json::bool_or(obj, "isSplit", false, path, issues),
        }
    }

    pub fn to_json_value(&self) -> Value {
        json!({
            "bearing": self.bearing,
            "dragRotate": self.drag_rotate,
            "latitude": self.latitude,
            "longitude": self.longitude,
            "pitch": self.pitch,
            "zoom": self.zoom,
            "isSplit": self.is_split,
        })
    }
}
