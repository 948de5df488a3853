//! Shared helpers for walking an untyped `serde_json::Value` tree while
//! collecting validation issues instead of failing fast.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::error::Issues;

pub(crate) fn join(path: &str, key: &str) -> String {
    format!("{path}.{key}")
}

pub(crate) fn index(path: &str, i: usize) -> String {
    format!("{path}[{i}]")
}

pub(crate) fn as_object<'a>(
    value: &'a Value,
    path: &str,
    issues: &mut Issues,
) -> Option<&'a Map<String, Value>> {
    match value.as_object() {
        Some(obj) => Some(obj),
        None => {
            issues.push(path, "expected an object");
            None
        }
    }
}

pub(crate) fn req_str(
    obj: &Map<String, Value>,
    key: &str,
    path: &str,
    issues: &mut Issues,
) -> Option<String> {
    match obj.get(key) {
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => {
            issues.push(join(path, key), "expected a string");
            None
        }
        None => {
            issues.push(join(path, key), "missing required field");
            None
        }
    }
}

pub(crate) fn str_or(
    obj: &Map<String, Value>,
    key: &str,
    default: &str,
    path: &str,
    issues: &mut Issues,
) -> String {
    match obj.get(key) {
        None | Some(Value::Null) => default.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(_) => {
            issues.push(join(path, key), "expected a string");
            default.to_string()
        }
    }
}

pub(crate) fn bool_or(
    obj: &Map<String, Value>,
    key: &str,
    default: bool,
    path: &str,
    issues: &mut Issues,
) -> bool {
    match obj.get(key) {
        None | Some(Value::Null) => default,
        Some(Value::Bool(b)) => *b,
        Some(_) => {
            issues.push(join(path, key), "expected a boolean");
            default
        }
    }
}

pub(crate) fn f64_or(
    obj: &Map<String, Value>,
    key: &str,
    default: f64,
    path: &str,
    issues: &mut Issues,
) -> f64 {
    match obj.get(key) {
        None | Some(Value::Null) => default,
        Some(v) => match v.as_f64() {
            Some(n) => n,
            None => {
                issues.push(join(path, key), "expected a number");
                default
            }
        },
    }
}

pub(crate) fn req_f64(
    obj: &Map<String, Value>,
    key: &str,
    path: &str,
    issues: &mut Issues,
) -> Option<f64> {
    match obj.get(key) {
        Some(v) if !v.is_null() => match v.as_f64() {
            Some(n) => Some(n),
            None => {
                issues.push(join(path, key), "expected a number");
                None
            }
        },
        _ => {
            issues.push(join(path, key), "missing required field");
            None
        }
    }
}

/// Missing and `null` both read as absent; any other non-number is an issue.
pub(crate) fn opt_f64(
    obj: &Map<String, Value>,
    key: &str,
    path: &str,
    issues: &mut Issues,
) -> Option<f64> {
    match obj.get(key) {
        None | Some(Value::Null) => None,
        Some(v) => match v.as_f64() {
            Some(n) => Some(n),
            None => {
                issues.push(join(path, key), "expected a number or null");
                None
            }
        },
    }
}

fn channel_u8(value: &Value) -> Option<u8> {
    if let Some(n) = value.as_i64() {
        return u8::try_from(n).ok();
    }
    // Tolerate integral floats (44.0); reject anything fractional.
    let f = value.as_f64()?;
    if f.fract() != 0.0 {
        return None;
    }
    (0.0..=255.0).contains(&f).then_some(f as u8)
}

fn u8_components<const N: usize>(value: &Value, path: &str, issues: &mut Issues) -> Option<[u8; N]> {
    let arr = match value.as_array() {
        Some(a) => a,
        None => {
            issues.push(path, format!("expected an array of {N} color components"));
            return None;
        }
    };
    if arr.len() != N {
        issues.push(path, format!("expected {N} components, found {}", arr.len()));
        return None;
    }

    let mut out = [0u8; N];
    let mut ok = true;
    for (i, item) in arr.iter().enumerate() {
        match channel_u8(item) {
            Some(c) => out[i] = c,
            None => {
                issues.push(index(path, i), "expected an integer in [0, 255]");
                ok = false;
            }
        }
    }
    ok.then_some(out)
}

pub(crate) fn rgb_u8(value: &Value, path: &str, issues: &mut Issues) -> Option<[u8; 3]> {
    u8_components::<3>(value, path, issues)
}

pub(crate) fn rgba_u8(value: &Value, path: &str, issues: &mut Issues) -> Option<[u8; 4]> {
    u8_components::<4>(value, path, issues)
}

/// RGB triple that allows fractional components (some basemap colors are
/// stored pre-scaled), still bounded to [0, 255] per channel.
pub(crate) fn rgb_f64(value: &Value, path: &str, issues: &mut Issues) -> Option<[f64; 3]> {
    let arr = match value.as_array() {
        Some(a) => a,
        None => {
            issues.push(path, "expected an [r, g, b] array");
            return None;
        }
    };
    if arr.len() != 3 {
        issues.push(path, format!("expected 3 components, found {}", arr.len()));
        return None;
    }

    let mut out = [0f64; 3];
    let mut ok = true;
    for (i, item) in arr.iter().enumerate() {
        match item.as_f64() {
            Some(c) if (0.0..=255.0).contains(&c) => out[i] = c,
            _ => {
                issues.push(index(path, i), "expected a number in [0, 255]");
                ok = false;
            }
        }
    }
    ok.then_some(out)
}

/// `[min, max]` pair with `min <= max`.
pub(crate) fn range_pair(value: &Value, path: &str, issues: &mut Issues) -> Option<[f64; 2]> {
    let pair = f64_pair(value, path, issues)?;
    if pair[0] > pair[1] {
        issues.push(path, format!("range minimum {} exceeds maximum {}", pair[0], pair[1]));
        return None;
    }
    Some(pair)
}

pub(crate) fn f64_pair(value: &Value, path: &str, issues: &mut Issues) -> Option<[f64; 2]> {
    let arr = match value.as_array() {
        Some(a) => a,
        None => {
            issues.push(path, "expected a 2-element array");
            return None;
        }
    };
    if arr.len() != 2 {
        issues.push(path, format!("expected 2 elements, found {}", arr.len()));
        return None;
    }

    let mut out = [0f64; 2];
    for (i, item) in arr.iter().enumerate() {
        match item.as_f64() {
            Some(n) => out[i] = n,
            None => {
                issues.push(index(path, i), "expected a number");
                return None;
            }
        }
    }
    Some(out)
}

pub(crate) fn string_map(
    value: &Value,
    path: &str,
    issues: &mut Issues,
) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    let Some(obj) = as_object(value, path, issues) else {
        return out;
    };
    for (key, item) in obj {
        match item {
            Value::String(s) => {
                out.insert(key.clone(), s.clone());
            }
            _ => issues.push(join(path, key), "expected a string"),
        }
    }
    out
}

pub(crate) fn bool_map(value: &Value, path: &str, issues: &mut Issues) -> BTreeMap<String, bool> {
    let mut out = BTreeMap::new();
    let Some(obj) = as_object(value, path, issues) else {
        return out;
    };
    for (key, item) in obj {
        match item {
            Value::Bool(b) => {
                out.insert(key.clone(), *b);
            }
            _ => issues.push(join(path, key), "expected a boolean"),
        }
    }
    out
}

pub(crate) fn string_list(value: &Value, path: &str, issues: &mut Issues) -> Vec<String> {
    let mut out = Vec::new();
    let arr = match value.as_array() {
        Some(a) => a,
        None => {
            issues.push(path, "expected an array of strings");
            return out;
        }
    };
    for (i, item) in arr.iter().enumerate() {
        match item {
            Value::String(s) => out.push(s.clone()),
            _ => issues.push(index(path, i), "expected a string"),
        }
    }
    out
}
