//! Tests for the trace translation pipeline

use opentelemetry_proto::tonic::common::v1::{InstrumentationScope, KeyValue, any_value};
use opentelemetry_proto::tonic::resource::v1::Resource;
use opentelemetry_proto::tonic::trace::v1::span::{Event as SpanEvent, Link, SpanKind};
use opentelemetry_proto::tonic::trace::v1::{Status, status::StatusCode};
use serde_json::json;

use crate::domain::traces::dataset::ServiceNameDataset;
use crate::utils::otlp::test_support::{kv, kv_int, kv_str};

use super::*;

const START: u64 = 1_704_067_200_000_000_000;

fn span(name: &str, attributes: Vec<KeyValue>) -> Span {
    Span {
        trace_id: vec![0x0a; 16],
        span_id: vec![0x0b; 8],
        name: name.to_string(),
        kind: SpanKind::Server as i32,
        start_time_unix_nano: START,
        end_time_unix_nano: START + 2_000_000,
        attributes,
        ..Default::default()
    }
}

fn resource(attributes: Vec<KeyValue>) -> Option<Resource> {
    Some(Resource {
        attributes,
        ..Default::default()
    })
}

fn scope(name: &str, version: &str, attributes: Vec<KeyValue>) -> Option<InstrumentationScope> {
    Some(InstrumentationScope {
        name: name.to_string(),
        version: version.to_string(),
        attributes,
        ..Default::default()
    })
}

fn request(
    resource: Option<Resource>,
    scope: Option<InstrumentationScope>,
    spans: Vec<Span>,
) -> ExportTraceServiceRequest {
    ExportTraceServiceRequest {
        resource_spans: vec![ResourceSpans {
            resource,
            scope_spans: vec![ScopeSpans {
                scope,
                spans,
                schema_url: String::new(),
            }],
            schema_url: String::new(),
        }],
    }
}

fn translate(request: &ExportTraceServiceRequest) -> TranslationResult {
    let policy = ServiceNameDataset::default();
    translate_trace_request(request, &RequestInfo::default(), &policy)
}

fn single_event(result: &TranslationResult) -> &Event {
    assert_eq!(result.batches.len(), 1);
    assert_eq!(result.batches[0].events.len(), 1);
    &result.batches[0].events[0]
}

fn namespace<'a>(event: &'a Event, key: &str) -> &'a AttributeSet {
    attr(event, key).as_object().unwrap()
}

fn attr<'a>(event: &'a Event, key: &str) -> &'a JsonValue {
    event.attributes.get(key).unwrap()
}

// ============================================================================
// END TO END
// ============================================================================

#[test]
fn test_rpc_span_end_to_end() {
    let req = request(
        resource(vec![]),
        scope("", "", vec![]),
        vec![span("Say", vec![kv_str("rpc.system", "GRPC")])],
    );
    let result = translate(&req);
    let event = single_event(&result);

    assert_eq!(attr(event, "transaction.type"), "web");
    assert_eq!(attr(event, "transaction.category"), "RPC Systems");
    assert_eq!(attr(event, "transaction.sub_category"), "GRPC");
    let duration = attr(event, "durationMs").as_f64().unwrap();
    assert!((duration - 2.0).abs() < 1e-9);

    let span_ns = namespace(event, "spanAttributes");
    assert_eq!(span_ns.get("rpc.system").unwrap(), "GRPC");
    assert_eq!(span_ns.get("transaction.type").unwrap(), "web");
}

#[test]
fn test_core_metadata_keys() {
    let mut s = span("GET /users", vec![]);
    s.parent_span_id = vec![0x0c; 8];
    s.links = vec![Link::default(), Link::default()];
    s.events = vec![SpanEvent::default()];
    s.status = Some(Status {
        message: "upstream timeout".to_string(),
        code: StatusCode::Error as i32,
    });
    let result = translate(&request(None, None, vec![s]));
    let a = &single_event(&result).attributes;

    assert_eq!(
        a.get("traceTraceID").unwrap(),
        "0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a"
    );
    assert_eq!(a.get("traceSpanID").unwrap(), "0b0b0b0b0b0b0b0b");
    assert_eq!(a.get("traceParentID").unwrap(), "0c0c0c0c0c0c0c0c");
    assert_eq!(a.get("type").unwrap(), "server");
    assert_eq!(a.get("spanKind").unwrap(), "server");
    assert_eq!(a.get("spanName").unwrap(), "GET /users");
    assert_eq!(a.get("startTime").unwrap(), &json!(START as i64));
    let end = (START + 2_000_000) as i64;
    assert_eq!(a.get("endTime").unwrap(), &json!(end));
    assert_eq!(a.get("time").unwrap(), &json!(START as i64));
    assert_eq!(a.get("statusCode").unwrap(), &json!(2));
    assert_eq!(a.get("error").unwrap(), &json!(true));
    assert_eq!(a.get("statusMessage").unwrap(), "upstream timeout");
    assert_eq!(a.get("spanNumLinks").unwrap(), &json!(2));
    assert_eq!(a.get("spanNumEvents").unwrap(), &json!(1));
    assert_eq!(a.get("meta.signal_type").unwrap(), "trace");
}

#[test]
fn test_optional_fields_omitted() {
    let result = translate(&request(None, None, vec![span("op", vec![])]));
    let a = &single_event(&result).attributes;

    assert!(!a.contains_key("traceParentID"));
    assert!(!a.contains_key("statusMessage"));
    assert_eq!(a.get("statusCode").unwrap(), &json!(0));
    assert_eq!(a.get("error").unwrap(), &json!(false));
    let events_ns = namespace(single_event(&result), "eventAttributes");
    assert!(events_ns.is_empty());
}

#[test]
fn test_timestamp_from_start_time() {
    let result = translate(&request(None, None, vec![span("op", vec![])]));
    let event = single_event(&result);
    assert_eq!(event.timestamp, nanos_to_datetime(START));
    assert_eq!(event.timestamp.timestamp(), 1_704_067_200);
}

#[test]
fn test_times_beyond_i64_saturate() {
    let mut s = span("far-future", vec![]);
    s.start_time_unix_nano = u64::MAX;
    s.end_time_unix_nano = u64::MAX;
    let result = translate(&request(None, None, vec![s]));
    let a = &single_event(&result).attributes;

    assert_eq!(a.get("startTime").unwrap(), &json!(i64::MAX));
    assert_eq!(a.get("endTime").unwrap(), &json!(i64::MAX));
    assert_eq!(a.get("time").unwrap(), &json!(i64::MAX));
    assert_eq!(a.get("durationMs").unwrap(), &json!(0.0));
}

#[test]
fn test_empty_request() {
    let result = translate(&ExportTraceServiceRequest::default());
    assert!(result.batches.is_empty());
    assert_eq!(result.request_size, 0);
    assert_eq!(result.event_count(), 0);
}

#[test]
fn test_resource_without_spans_still_emits_batch() {
    let req = ExportTraceServiceRequest {
        resource_spans: vec![ResourceSpans {
            resource: resource(vec![kv_str("service.name", "idle")]),
            scope_spans: vec![],
            schema_url: String::new(),
        }],
    };
    let result = translate(&req);
    assert_eq!(result.batches.len(), 1);
    assert_eq!(result.batches[0].dataset, "idle");
    assert!(result.batches[0].events.is_empty());
}

// ============================================================================
// ATTRIBUTE LAYERING
// ============================================================================

#[test]
fn test_layers_merge_resource_scope_span() {
    let layered = span("op", vec![kv_str("layer", "span"), kv_int("only.span", 3)]);
    let req = request(
        resource(vec![
            kv_str("service.name", "checkout"),
            kv_str("layer", "resource"),
            kv_str("only.resource", "r"),
        ]),
        scope(
            "io.opentelemetry.grpc",
            "1.2.0",
            vec![kv_str("layer", "scope"), kv_str("only.scope", "s")],
        ),
        vec![layered],
    );
    let result = translate(&req);
    let event = single_event(&result);
    let a = &event.attributes;

    assert_eq!(a.get("layer").unwrap(), "span");
    assert_eq!(a.get("only.resource").unwrap(), "r");
    assert_eq!(a.get("only.scope").unwrap(), "s");
    assert_eq!(a.get("only.span").unwrap(), &json!(3));
    assert_eq!(a.get("service.name").unwrap(), "checkout");
    assert_eq!(a.get("library.name").unwrap(), "io.opentelemetry.grpc");
    assert_eq!(a.get("library.version").unwrap(), "1.2.0");

    let resource_ns = namespace(event, "resourceAttributes");
    assert_eq!(resource_ns.get("layer").unwrap(), "resource");
    assert_eq!(
        resource_ns.get("library.name").unwrap(),
        "io.opentelemetry.grpc"
    );
    assert!(!resource_ns.contains_key("error"));

    let span_ns = namespace(event, "spanAttributes");
    assert_eq!(span_ns.get("layer").unwrap(), "span");
    assert!(!span_ns.contains_key("only.resource"));
}

#[test]
fn test_span_attribute_overrides_metadata_key() {
    let result = translate(&request(
        None,
        None,
        vec![span("op", vec![kv_str("spanName", "custom")])],
    ));
    assert_eq!(attr(single_event(&result), "spanName"), "custom");
}

#[test]
fn test_event_attributes_flattened_into_namespace() {
    let mut s = span("op", vec![]);
    s.events = vec![
        SpanEvent {
            name: "exception".to_string(),
            attributes: vec![
                kv_str("exception.type", "IOError"),
                kv_str("exception.message", "first"),
            ],
            ..Default::default()
        },
        SpanEvent {
            name: "log".to_string(),
            attributes: vec![kv_str("exception.message", "second")],
            ..Default::default()
        },
    ];
    let result = translate(&request(None, None, vec![s]));
    let event = single_event(&result);
    let events_ns = namespace(event, "eventAttributes");

    assert_eq!(events_ns.get("exception.type").unwrap(), "IOError");
    assert_eq!(events_ns.get("exception.message").unwrap(), "second");
    // Event attributes do not leak into the top level or the classification
    assert!(!event.attributes.contains_key("exception.type"));
    assert_eq!(attr(event, "transaction.category"), "unknown");
}

#[test]
fn test_error_flag_in_resource_namespace_does_not_leak() {
    let mut failing = span("fails", vec![]);
    failing.status = Some(Status {
        message: String::new(),
        code: StatusCode::Error as i32,
    });
    let ok = span("ok", vec![]);
    let result = translate(&request(resource(vec![]), None, vec![failing, ok]));
    let events = &result.batches[0].events;

    let failing_ns = namespace(&events[0], "resourceAttributes");
    assert_eq!(failing_ns.get("error"), Some(&json!(true)));
    let ok_ns = namespace(&events[1], "resourceAttributes");
    assert!(!ok_ns.contains_key("error"));
}

#[test]
fn test_library_keys_do_not_leak_across_scopes() {
    let req = ExportTraceServiceRequest {
        resource_spans: vec![ResourceSpans {
            resource: resource(vec![]),
            scope_spans: vec![
                ScopeSpans {
                    scope: scope("first-lib", "", vec![]),
                    spans: vec![span("a", vec![])],
                    schema_url: String::new(),
                },
                ScopeSpans {
                    scope: None,
                    spans: vec![span("b", vec![])],
                    schema_url: String::new(),
                },
            ],
            schema_url: String::new(),
        }],
    };
    let result = translate(&req);
    let events = &result.batches[0].events;
    assert_eq!(events.len(), 2);
    assert_eq!(attr(&events[0], "library.name"), "first-lib");
    assert!(!events[0].attributes.contains_key("library.version"));
    assert!(!events[1].attributes.contains_key("library.name"));
    let resource_ns = namespace(&events[1], "resourceAttributes");
    assert!(!resource_ns.contains_key("library.name"));
}

// ============================================================================
// SAMPLE RATE
// ============================================================================

#[test]
fn test_sample_rate_from_resource_is_honored_and_removed() {
    let req = request(
        resource(vec![kv_int("SampleRate", 10)]),
        None,
        vec![span("op", vec![])],
    );
    let result = translate(&req);
    let event = single_event(&result);
    assert_eq!(event.sample_rate, 10);
    assert!(!event.attributes.contains_key("SampleRate"));
}

#[test]
fn test_sample_rate_span_overrides_resource() {
    let req = request(
        resource(vec![kv_int("sampleRate", 10)]),
        scope("lib", "", vec![kv_int("sampleRate", 20)]),
        vec![span("op", vec![kv_str("sampleRate", "40")])],
    );
    let result = translate(&req);
    let event = single_event(&result);
    assert_eq!(event.sample_rate, 40);
    assert!(!event.attributes.contains_key("sampleRate"));
}

#[test]
fn test_sample_rate_defaults_to_one() {
    let result = translate(&request(None, None, vec![span("op", vec![])]));
    assert_eq!(single_event(&result).sample_rate, 1);
}

// ============================================================================
// CLASSIFICATION CASCADE
// ============================================================================

#[test]
fn test_resource_web_type_cascades_to_span() {
    let req = request(
        resource(vec![kv_str("http.scheme", "https")]),
        scope("lib", "", vec![]),
        vec![span("query", vec![kv_str("db.system", "postgresql")])],
    );
    let result = translate(&req);
    let a = &single_event(&result).attributes;
    assert_eq!(a.get("transaction.type").unwrap(), "web");
    assert_eq!(a.get("transaction.category").unwrap(), "Databases");
    assert_eq!(a.get("transaction.sub_category").unwrap(), "postgresql");
}

#[test]
fn test_resource_category_inherited_by_plain_span() {
    let req = request(
        resource(vec![kv_str("telemetry.sdk.language", "rust")]),
        None,
        vec![span("work", vec![kv_str("job.id", "42")])],
    );
    let result = translate(&req);
    let a = &single_event(&result).attributes;
    assert_eq!(a.get("transaction.type").unwrap(), "non-web");
    assert_eq!(
        a.get("transaction.category").unwrap(),
        "Programming Language"
    );
    assert_eq!(a.get("transaction.sub_category").unwrap(), "rust");
    assert_eq!(a.get("transaction.language").unwrap(), "rust");
}

#[test]
fn test_scope_classification_feeds_span() {
    let req = request(
        None,
        scope(
            "kafka-client",
            "",
            vec![kv_str("messaging.system", "kafka")],
        ),
        vec![span("publish", vec![])],
    );
    let result = translate(&req);
    let a = &single_event(&result).attributes;
    assert_eq!(a.get("transaction.category").unwrap(), "Messaging queues");
    assert_eq!(a.get("transaction.sub_category").unwrap(), "kafka");
}

// ============================================================================
// BATCHING
// ============================================================================

#[test]
fn test_one_batch_per_resource_group_with_sizes() {
    let req = ExportTraceServiceRequest {
        resource_spans: vec![
            ResourceSpans {
                resource: resource(vec![kv_str("service.name", "api")]),
                scope_spans: vec![ScopeSpans {
                    scope: None,
                    spans: vec![span("a", vec![]), span("b", vec![])],
                    schema_url: String::new(),
                }],
                schema_url: String::new(),
            },
            ResourceSpans {
                resource: resource(vec![kv_str("service.name", "api")]),
                scope_spans: vec![ScopeSpans {
                    scope: None,
                    spans: vec![span("c", vec![])],
                    schema_url: String::new(),
                }],
                schema_url: String::new(),
            },
        ],
    };
    let result = translate(&req);

    assert_eq!(result.batches.len(), 2);
    assert_eq!(result.batches[0].dataset, "api");
    assert_eq!(result.batches[1].dataset, "api");
    assert_eq!(result.batches[0].events.len(), 2);
    assert_eq!(result.batches[1].events.len(), 1);
    assert_eq!(result.event_count(), 3);

    assert_eq!(result.request_size, req.encoded_len());
    let first = req.resource_spans[0].encoded_len();
    let second = req.resource_spans[1].encoded_len();
    assert_eq!(result.batches[0].size_bytes, first);
    assert_eq!(result.batches[1].size_bytes, second);
    assert!(result.request_size > first + second);
}

#[test]
fn test_dataset_policy_receives_request_info_and_resource() {
    let policy = |info: &RequestInfo, attrs: &AttributeSet| {
        let service = attrs.get("service.name").and_then(|v| v.as_str());
        format!("{}-{}", info.api_key, service.unwrap_or("none"))
    };
    let info = RequestInfo {
        api_key: "team".to_string(),
        ..Default::default()
    };
    let req = request(
        resource(vec![kv_str("service.name", "billing")]),
        None,
        vec![span("op", vec![])],
    );
    let result = translate_trace_request(&req, &info, &policy);
    assert_eq!(result.batches[0].dataset, "team-billing");
}

#[test]
fn test_custom_classifier() {
    const RULES: &[super::super::classify::CategoryRule] = &[];
    let classifier = Classifier::new(RULES);
    let policy = ServiceNameDataset::default();
    let translator = TraceTranslator::new(&classifier, &policy);
    let db_span = span("op", vec![kv_str("db.system", "mysql")]);
    let req = request(None, None, vec![db_span]);
    let result = translator.translate(&req, &RequestInfo::default());
    let event = single_event(&result);
    assert_eq!(attr(event, "transaction.category"), "unknown");
}

#[test]
fn test_typed_span_attribute_values_preserved() {
    let attributes = vec![
        kv("ratio", any_value::Value::DoubleValue(0.25)),
        kv("cached", any_value::Value::BoolValue(true)),
        kv("payload", any_value::Value::BytesValue(vec![0xca, 0xfe])),
    ];
    let req = request(None, None, vec![span("op", attributes)]);
    let result = translate(&req);
    let a = &single_event(&result).attributes;
    assert_eq!(a.get("ratio").unwrap(), &json!(0.25));
    assert_eq!(a.get("cached").unwrap(), &json!(true));
    assert_eq!(a.get("payload").unwrap(), "cafe");
}

#[test]
fn test_result_serializes() {
    let result = translate(&request(None, None, vec![span("op", vec![])]));
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["batches"][0]["dataset"], "unknown_service");
    assert_eq!(json["batches"][0]["events"][0]["sample_rate"], 1);
}
