//! Reference resolution: checks every dataset id a document mentions against
//! an externally supplied registry, collecting all misses in one pass so the
//! caller gets a complete diagnostic from a single attempt.

use std::fmt;

use serde::Serialize;

use datasets::{DatasetEntry, DatasetRegistry, RegistryError};

use crate::document::ViewDocument;
use crate::layer::Layer;

/// A dataset id the registry does not know, with the document path that
/// mentions it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnresolvedReference {
    pub path: String,
    pub data_id: String,
}

/// A field name a document mentions that the registry's entry for that
/// dataset does not declare. Best-effort: entries that declare no fields are
/// never reported against, since field sets may be dynamic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnknownField {
    pub path: String,
    pub data_id: String,
    pub field: String,
}

/// Outcome of resolving a document against a registry. Unresolved datasets
/// are recoverable by the caller (load the dataset and retry, or render with
/// the affected layers hidden); unknown fields are advisory only.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Resolution {
    pub unresolved: Vec<UnresolvedReference>,
    pub unknown_fields: Vec<UnknownField>,
}

impl Resolution {
    pub fn is_fully_resolved(&self) -> bool {
        self.unresolved.is_empty()
    }

    /// Hard form of the outcome: an error if any dataset id is unresolved.
    /// Unknown-field warnings never fail this conversion.
    pub fn into_result(self) -> Result<Self, ReferenceError> {
        if self.unresolved.is_empty() {
            Ok(self)
        } else {
            Err(ReferenceError {
                unresolved: self.unresolved,
            })
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceError {
    pub unresolved: Vec<UnresolvedReference>,
}

impl fmt::Display for ReferenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unresolved dataset references:")?;
        for reference in &self.unresolved {
            write!(f, "\n  {} ({})", reference.data_id, reference.path)?;
        }
        Ok(())
    }
}

impl std::error::Error for ReferenceError {}

/// Checks every `dataId` in `layers[].config` and in
/// `interactionConfig.tooltip.fieldsToShow` against the registry. Registry
/// backend failures propagate; lookup misses accumulate in the `Resolution`.
pub fn resolve_references(
    doc: &ViewDocument,
    registry: &dyn DatasetRegistry,
) -> Result<Resolution, RegistryError> {
    let mut resolution = Resolution::default();

    for (i, layer) in doc.vis_state.layers.iter().enumerate() {
        let Some(data_id) = layer.data_id() else {
            continue;
        };
        let path = format!("config.visState.layers[{i}].config.dataId");
        match registry.get(data_id)? {
            None => resolution.unresolved.push(UnresolvedReference {
                path,
                data_id: data_id.to_string(),
            }),
            Some(entry) => {
                if let Layer::GeoJson(layer) = layer {
                    for (role, field) in &layer.config.columns {
                        if !declares_field(&entry, field) {
                            resolution.unknown_fields.push(UnknownField {
                                path: format!("config.visState.layers[{i}].config.columns.{role}"),
                                data_id: data_id.to_string(),
                                field: field.clone(),
                            });
                        }
                    }
                }
            }
        }
    }

    let tooltip = &doc.vis_state.interaction_config.tooltip;
    for (data_id, fields) in &tooltip.fields_to_show {
        let path = format!("config.interactionConfig.tooltip.fieldsToShow.{data_id}");
        match registry.get(data_id)? {
            None => resolution.unresolved.push(UnresolvedReference {
                path,
                data_id: data_id.clone(),
            }),
            Some(entry) => {
                for (i, field) in fields.iter().enumerate() {
                    if !declares_field(&entry, field) {
                        resolution.unknown_fields.push(UnknownField {
                            path: format!("{path}[{i}]"),
                            data_id: data_id.clone(),
                            field: field.clone(),
                        });
                    }
                }
            }
        }
    }

    Ok(resolution)
}

fn declares_field(entry: &DatasetEntry, field: &str) -> bool {
    entry.fields.is_empty() || entry.fields.iter().any(|f| f == field)
}
