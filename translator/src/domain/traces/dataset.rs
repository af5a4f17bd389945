//! Dataset routing.
//!
//! Which dataset a resource group lands in is a policy decision of the
//! caller. [`ServiceNameDataset`] is the default policy: an explicit dataset
//! from the request wins, otherwise the resource's `service.name`.

use crate::ingest::RequestInfo;
use crate::utils::otlp::{AttributeSet, get_str, keys};

/// Dataset used when a resource carries no usable service name.
pub const UNKNOWN_SERVICE_DATASET: &str = "unknown_service";

/// Resolves the destination dataset for one resource group.
pub trait DatasetPolicy: Send + Sync {
    fn dataset(&self, info: &RequestInfo, resource_attrs: &AttributeSet) -> String;
}

impl<F> DatasetPolicy for F
where
    F: Fn(&RequestInfo, &AttributeSet) -> String + Send + Sync,
{
    fn dataset(&self, info: &RequestInfo, resource_attrs: &AttributeSet) -> String {
        self(info, resource_attrs)
    }
}

/// Routes by request dataset, then by `service.name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceNameDataset {
    fallback: String,
}

impl Default for ServiceNameDataset {
    fn default() -> Self {
        Self::new(UNKNOWN_SERVICE_DATASET)
    }
}

impl ServiceNameDataset {
    pub fn new(fallback: impl Into<String>) -> Self {
        Self {
            fallback: fallback.into(),
        }
    }

    pub fn fallback(&self) -> &str {
        &self.fallback
    }
}

impl DatasetPolicy for ServiceNameDataset {
    fn dataset(&self, info: &RequestInfo, resource_attrs: &AttributeSet) -> String {
        let explicit = info.dataset.trim();
        if !explicit.is_empty() {
            return explicit.to_string();
        }

        match get_str(resource_attrs, keys::SERVICE_NAME).map(str::trim) {
            // SDK default names look like "unknown_service:java"
            Some(name) if !name.is_empty() && !name.starts_with(UNKNOWN_SERVICE_DATASET) => {
                name.to_string()
            }
            _ => self.fallback.clone(),
        }
    }
}
