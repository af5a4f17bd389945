//! Translate OTLP trace export requests into flat, classified events.
//!
//! - `domain` - Translation pipeline and span classification
//! - `ingest` - Request metadata and body decoding
//! - `core` - CLI, configuration and application entry point
//! - `utils` - Attribute, time and path helpers

mod app;
pub mod core;
pub mod domain;
pub mod error;
pub mod ingest;
pub mod utils;

pub use domain::traces::{
    Batch, ClassificationLabels, Classifier, DatasetPolicy, Event, ServiceNameDataset,
    TraceTranslator, TransactionType, TranslationResult, translate_trace_request,
};
pub use error::{DecodeError, TranslateError};
pub use ingest::{RequestInfo, translate_trace_request_from_bytes};
pub use utils::otlp::AttributeSet;
