//! Domain logic for trace translation
//!
//! - `traces` - OTLP trace to event translation and classification

pub mod traces;

pub use traces::{
    Batch, ClassificationLabels, Classifier, DatasetPolicy, Event, ServiceNameDataset,
    TraceTranslator, TransactionType, TranslationResult, translate_trace_request,
};
