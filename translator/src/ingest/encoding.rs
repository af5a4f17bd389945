//! OTLP content-type and content-encoding handling
//!
//! Supports protobuf (`application/x-protobuf`, `application/protobuf`) and
//! JSON (`application/json`) bodies, optionally gzip compressed, per the
//! OpenTelemetry Protocol specification.

use std::io::Read;

use flate2::read::GzDecoder;
use opentelemetry_proto::tonic::collector::trace::v1::ExportTraceServiceRequest;
use prost::Message;
use serde::de::DeserializeOwned;

use crate::error::DecodeError;

/// Content type of an OTLP request body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtlpContentType {
    Protobuf,
    Json,
}

impl OtlpContentType {
    /// Parse a `Content-Type` header value. Parameters such as `charset`
    /// are ignored; an empty value means protobuf.
    pub fn parse(value: &str) -> Option<Self> {
        let mime = value.split(';').next().unwrap_or("").trim();
        match mime.to_ascii_lowercase().as_str() {
            "" | "application/x-protobuf" | "application/protobuf" => Some(Self::Protobuf),
            "application/json" => Some(Self::Json),
            _ => None,
        }
    }

    #[inline]
    pub fn as_header_value(self) -> &'static str {
        match self {
            OtlpContentType::Protobuf => "application/x-protobuf",
            OtlpContentType::Json => "application/json",
        }
    }
}

/// Content encoding of an OTLP request body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtlpContentEncoding {
    Identity,
    Gzip,
}

impl OtlpContentEncoding {
    /// Parse a `Content-Encoding` header value; an empty value means identity.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "identity" => Some(Self::Identity),
            "gzip" | "x-gzip" => Some(Self::Gzip),
            _ => None,
        }
    }

    #[inline]
    pub fn as_header_value(self) -> &'static str {
        match self {
            OtlpContentEncoding::Identity => "identity",
            OtlpContentEncoding::Gzip => "gzip",
        }
    }
}

/// Largest request body accepted after decompression (64 MiB).
pub const MAX_BODY_BYTES: usize = 64 * 1024 * 1024;

/// Decode a trace export request body, capped at [`MAX_BODY_BYTES`].
pub fn decode_trace_request(
    body: &[u8],
    content_type: OtlpContentType,
    content_encoding: OtlpContentEncoding,
) -> Result<ExportTraceServiceRequest, DecodeError> {
    decode_trace_request_with_limit(body, content_type, content_encoding, MAX_BODY_BYTES)
}

/// Decode a trace export request body whose decoded size may not exceed
/// `max_bytes`.
///
/// Gzip bodies are inflated through a bounded reader, so a decompression
/// bomb stops at `max_bytes + 1` bytes.
pub fn decode_trace_request_with_limit(
    body: &[u8],
    content_type: OtlpContentType,
    content_encoding: OtlpContentEncoding,
    max_bytes: usize,
) -> Result<ExportTraceServiceRequest, DecodeError> {
    match content_encoding {
        OtlpContentEncoding::Identity => {
            if body.len() > max_bytes {
                return Err(DecodeError::BodyTooLarge { limit: max_bytes });
            }
            decode_body(body, content_type)
        }
        OtlpContentEncoding::Gzip => {
            let limit = u64::try_from(max_bytes).unwrap_or(u64::MAX);
            let mut inflated = Vec::with_capacity(body.len().saturating_mul(4).min(max_bytes));
            GzDecoder::new(body)
                .take(limit.saturating_add(1))
                .read_to_end(&mut inflated)?;
            if inflated.len() > max_bytes {
                return Err(DecodeError::BodyTooLarge { limit: max_bytes });
            }
            decode_body(&inflated, content_type)
        }
    }
}

fn decode_body<T>(body: &[u8], content_type: OtlpContentType) -> Result<T, DecodeError>
where
    T: Message + Default + DeserializeOwned,
{
    match content_type {
        OtlpContentType::Protobuf => Ok(T::decode(body)?),
        OtlpContentType::Json => Ok(serde_json::from_slice(body)?),
    }
}
