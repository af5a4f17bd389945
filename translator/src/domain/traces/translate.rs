//! Trace translation pipeline.
//!
//! Collapses the nested OTLP structure into one flat event per span:
//!
//! ```text
//! ExportTraceServiceRequest
//!   └─ ResourceSpans ──▶ resource attributes, dataset, seed labels      ─┐
//!        └─ ScopeSpans ──▶ scope attributes, cascaded labels             │ one Batch
//!             └─ Span ──▶ merged attributes, span labels, sample rate    │ per resource
//!                  └─ Event ──▶ eventAttributes namespace               ─┘
//! ```
//!
//! Attribute layers are merged resource, then scope, then span; later
//! layers win on key collisions. The span's classification is written under
//! the `spanAttributes` namespace and as top-level `transaction.*` keys.

use chrono::{DateTime, Utc};
use opentelemetry_proto::tonic::collector::trace::v1::ExportTraceServiceRequest;
use opentelemetry_proto::tonic::common::v1::InstrumentationScope;
use opentelemetry_proto::tonic::trace::v1::{ResourceSpans, ScopeSpans, Span};
use prost::Message;
use serde::Serialize;
use serde_json::Value as JsonValue;

use super::classify::{ClassificationLabels, Classifier};
use super::dataset::DatasetPolicy;
use super::ids::{encode_id, encode_optional_id};
use super::metadata::{span_kind_name, span_status, status_message};
use super::sample_rate::resolve_sample_rate;
use crate::ingest::RequestInfo;
use crate::utils::otlp::{AttributeSet, build_attribute_set, flatten_attributes, keys};
use crate::utils::time::{duration_ms, nanos_to_datetime, nanos_to_i64};

/// Keys written on every translated event.
pub mod event_keys {
    pub const TRACE_ID: &str = "traceTraceID";
    pub const SPAN_ID: &str = "traceSpanID";
    pub const PARENT_ID: &str = "traceParentID";
    pub const TYPE: &str = "type";
    pub const SPAN_KIND: &str = "spanKind";
    pub const SPAN_NAME: &str = "spanName";
    pub const DURATION_MS: &str = "durationMs";
    pub const START_TIME: &str = "startTime";
    pub const END_TIME: &str = "endTime";
    pub const TIME: &str = "time";
    pub const STATUS_CODE: &str = "statusCode";
    pub const STATUS_MESSAGE: &str = "statusMessage";
    pub const ERROR: &str = "error";
    pub const NUM_LINKS: &str = "spanNumLinks";
    pub const NUM_EVENTS: &str = "spanNumEvents";
    pub const SIGNAL_TYPE: &str = "meta.signal_type";
    pub const RESOURCE_ATTRIBUTES: &str = "resourceAttributes";
    pub const SPAN_ATTRIBUTES: &str = "spanAttributes";
    pub const EVENT_ATTRIBUTES: &str = "eventAttributes";
}

const SIGNAL_TYPE_TRACE: &str = "trace";

// ============================================================================
// OUTPUT TYPES
// ============================================================================

/// One translated span.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    pub attributes: AttributeSet,
    pub timestamp: DateTime<Utc>,
    pub sample_rate: i32,
}

/// Events of one resource group, bound for one dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Batch {
    pub dataset: String,
    /// Encoded size of the originating `ResourceSpans`
    pub size_bytes: usize,
    pub events: Vec<Event>,
}

/// Translated export request.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TranslationResult {
    /// Encoded size of the whole request
    pub request_size: usize,
    pub batches: Vec<Batch>,
}

impl TranslationResult {
    pub fn event_count(&self) -> usize {
        self.batches.iter().map(|b| b.events.len()).sum()
    }
}

// ============================================================================
// TRANSLATOR
// ============================================================================

/// Per-scope state shared by all spans of one `ScopeSpans`.
struct ScopeContext<'a> {
    resource_attrs: &'a AttributeSet,
    /// Resource attributes plus `library.*` keys, for the
    /// `resourceAttributes` namespace
    resource_namespace: AttributeSet,
    scope_attrs: AttributeSet,
    labels: Option<ClassificationLabels>,
}

/// Translates decoded OTLP trace requests into event batches.
pub struct TraceTranslator<'a> {
    classifier: &'a Classifier,
    policy: &'a dyn DatasetPolicy,
}

impl<'a> TraceTranslator<'a> {
    pub fn new(classifier: &'a Classifier, policy: &'a dyn DatasetPolicy) -> Self {
        Self { classifier, policy }
    }

    /// Translate a whole request. Total over missing optional fields.
    pub fn translate(
        &self,
        request: &ExportTraceServiceRequest,
        info: &RequestInfo,
    ) -> TranslationResult {
        let batches: Vec<Batch> = request
            .resource_spans
            .iter()
            .map(|resource_spans| self.translate_resource(resource_spans, info))
            .collect();

        let result = TranslationResult {
            request_size: request.encoded_len(),
            batches,
        };

        tracing::debug!(
            request_size = result.request_size,
            batches = result.batches.len(),
            events = result.event_count(),
            "Translated trace request"
        );

        result
    }

    fn translate_resource(&self, resource_spans: &ResourceSpans, info: &RequestInfo) -> Batch {
        let resource = resource_spans.resource.as_ref();
        let resource_attrs = resource
            .map(|r| build_attribute_set(&r.attributes))
            .unwrap_or_default();
        let dataset = self.policy.dataset(info, &resource_attrs);
        let seed = resource.map(|r| self.classifier.classify(&[&r.attributes]));

        let events: Vec<Event> = resource_spans
            .scope_spans
            .iter()
            .flat_map(|scope_spans| {
                let ctx = self.scope_context(scope_spans, &resource_attrs, seed.as_ref());
                scope_spans
                    .spans
                    .iter()
                    .map(move |span| self.translate_span(span, &ctx))
                    .collect::<Vec<_>>()
            })
            .collect();

        let batch = Batch {
            dataset,
            size_bytes: resource_spans.encoded_len(),
            events,
        };

        tracing::trace!(
            dataset = %batch.dataset,
            size_bytes = batch.size_bytes,
            events = batch.events.len(),
            "Built batch"
        );

        batch
    }

    fn scope_context<'r>(
        &self,
        scope_spans: &ScopeSpans,
        resource_attrs: &'r AttributeSet,
        seed: Option<&ClassificationLabels>,
    ) -> ScopeContext<'r> {
        let scope = scope_spans.scope.as_ref();

        let mut resource_namespace = resource_attrs.clone();
        let mut scope_attrs = AttributeSet::new();
        if let Some(scope) = scope {
            insert_library_keys(scope, &mut resource_namespace);
            insert_library_keys(scope, &mut scope_attrs);
            flatten_attributes(&scope.attributes, &mut scope_attrs);
        }

        let labels = match scope {
            Some(scope) => Some(self.classifier.normalize(seed, &[&scope.attributes])),
            None => seed.cloned(),
        };

        ScopeContext {
            resource_attrs,
            resource_namespace,
            scope_attrs,
            labels,
        }
    }

    fn translate_span(&self, span: &Span, ctx: &ScopeContext<'_>) -> Event {
        use event_keys::*;

        let kind = span_kind_name(span.kind);
        let (status_code, is_error) = span_status(span.status.as_ref());

        let mut attrs = AttributeSet::new();
        attrs.insert(TRACE_ID.into(), encode_id(&span.trace_id).into());
        attrs.insert(SPAN_ID.into(), encode_id(&span.span_id).into());
        if let Some(parent_id) = encode_optional_id(&span.parent_span_id) {
            attrs.insert(PARENT_ID.into(), parent_id.into());
        }
        attrs.insert(TYPE.into(), kind.into());
        attrs.insert(SPAN_KIND.into(), kind.into());
        attrs.insert(SPAN_NAME.into(), span.name.as_str().into());
        attrs.insert(
            DURATION_MS.into(),
            duration_ms(span.start_time_unix_nano, span.end_time_unix_nano).into(),
        );
        let start = nanos_to_i64(span.start_time_unix_nano);
        let end = nanos_to_i64(span.end_time_unix_nano);
        attrs.insert(START_TIME.into(), start.into());
        attrs.insert(END_TIME.into(), end.into());
        attrs.insert(STATUS_CODE.into(), status_code.into());
        attrs.insert(ERROR.into(), is_error.into());
        if let Some(message) = status_message(span.status.as_ref()) {
            attrs.insert(STATUS_MESSAGE.into(), message.into());
        }
        attrs.insert(NUM_LINKS.into(), span.links.len().into());
        attrs.insert(NUM_EVENTS.into(), span.events.len().into());
        attrs.insert(SIGNAL_TYPE.into(), SIGNAL_TYPE_TRACE.into());

        // Resource, then scope, then span
        let span_attrs = build_attribute_set(&span.attributes);
        merge_into(&mut attrs, ctx.resource_attrs);
        merge_into(&mut attrs, &ctx.scope_attrs);
        merge_into(&mut attrs, &span_attrs);

        let sample_rate = resolve_sample_rate(&mut attrs);

        let labels = self
            .classifier
            .normalize(ctx.labels.as_ref(), &[&span.attributes]);

        let mut resource_namespace = ctx.resource_namespace.clone();
        if is_error {
            resource_namespace.insert(ERROR.into(), JsonValue::Bool(true));
        }

        let mut span_namespace = span_attrs;
        labels.write_to(&mut span_namespace);

        let mut event_namespace = AttributeSet::new();
        for span_event in &span.events {
            flatten_attributes(&span_event.attributes, &mut event_namespace);
        }

        labels.write_to(&mut attrs);
        attrs.insert(
            RESOURCE_ATTRIBUTES.into(),
            JsonValue::Object(resource_namespace),
        );
        attrs.insert(SPAN_ATTRIBUTES.into(), JsonValue::Object(span_namespace));
        attrs.insert(EVENT_ATTRIBUTES.into(), JsonValue::Object(event_namespace));
        attrs.insert(TIME.into(), start.into());

        Event {
            attributes: attrs,
            timestamp: nanos_to_datetime(span.start_time_unix_nano),
            sample_rate,
        }
    }
}

fn insert_library_keys(scope: &InstrumentationScope, dest: &mut AttributeSet) {
    if !scope.name.is_empty() {
        dest.insert(keys::LIBRARY_NAME.into(), scope.name.as_str().into());
    }
    if !scope.version.is_empty() {
        dest.insert(keys::LIBRARY_VERSION.into(), scope.version.as_str().into());
    }
}

fn merge_into(dest: &mut AttributeSet, layer: &AttributeSet) {
    dest.extend(layer.iter().map(|(k, v)| (k.clone(), v.clone())));
}

/// Translate a decoded request with the standard classification rules.
pub fn translate_trace_request(
    request: &ExportTraceServiceRequest,
    info: &RequestInfo,
    policy: &dyn DatasetPolicy,
) -> TranslationResult {
    TraceTranslator::new(Classifier::standard(), policy).translate(request, info)
}

#[cfg(test)]
#[path = "translate_tests.rs"]
mod tests;
