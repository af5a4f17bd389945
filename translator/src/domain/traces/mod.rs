//! Trace translation
//!
//! - `classify` - Transaction labels and their cascade across protocol levels
//! - `dataset` - Destination dataset policy per resource group
//! - `ids` - Trace and span id encoding
//! - `metadata` - Span kind and status decoding
//! - `sample_rate` - Sample rate extraction from merged attributes
//! - `translate` - Pipeline from export request to event batches

pub mod classify;
pub mod dataset;
pub mod ids;
pub mod metadata;
pub mod sample_rate;
pub mod translate;

pub use classify::{ClassificationLabels, Classifier, TransactionType};
pub use dataset::{DatasetPolicy, ServiceNameDataset};
pub use translate::{Batch, Event, TraceTranslator, TranslationResult, translate_trace_request};
