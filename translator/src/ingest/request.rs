//! Request metadata supplied alongside an OTLP export request.

use http::HeaderMap;
use http::header;

use super::encoding::{OtlpContentEncoding, OtlpContentType};
use crate::error::TranslateError;

pub const HEADER_API_KEY: &str = "x-api-key";
pub const HEADER_API_KEY_LEGACY: &str = "x-honeycomb-team";
pub const HEADER_DATASET: &str = "x-dataset";
pub const HEADER_DATASET_LEGACY: &str = "x-honeycomb-dataset";

/// Transport-level metadata of an export request.
///
/// Empty strings mean "not supplied".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestInfo {
    pub api_key: String,
    pub dataset: String,
    pub user_agent: String,
    pub content_type: String,
    pub content_encoding: String,
}

impl RequestInfo {
    /// Read request metadata from HTTP headers (or gRPC metadata mapped to
    /// headers).
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            api_key: first_header(headers, &[HEADER_API_KEY, HEADER_API_KEY_LEGACY]),
            dataset: first_header(headers, &[HEADER_DATASET, HEADER_DATASET_LEGACY]),
            user_agent: first_header(headers, &[header::USER_AGENT.as_str()]),
            content_type: first_header(headers, &[header::CONTENT_TYPE.as_str()]),
            content_encoding: first_header(headers, &[header::CONTENT_ENCODING.as_str()]),
        }
    }

    /// Check the headers required to accept a traces export.
    pub fn validate_traces_headers(&self) -> Result<(), TranslateError> {
        if self.api_key.trim().is_empty() {
            return Err(TranslateError::MissingApiKey);
        }
        self.content_type()?;
        Ok(())
    }

    /// Negotiated body content type. An empty header means protobuf.
    pub fn content_type(&self) -> Result<OtlpContentType, TranslateError> {
        OtlpContentType::parse(&self.content_type)
            .ok_or_else(|| TranslateError::UnsupportedContentType(self.content_type.clone()))
    }

    /// Negotiated body content encoding. An empty header means identity.
    pub fn content_encoding(&self) -> Result<OtlpContentEncoding, TranslateError> {
        OtlpContentEncoding::parse(&self.content_encoding).ok_or_else(|| {
            TranslateError::UnsupportedContentEncoding(self.content_encoding.clone())
        })
    }
}

fn first_header(headers: &HeaderMap, names: &[&str]) -> String {
    names
        .iter()
        .find_map(|name| headers.get(*name).and_then(|v| v.to_str().ok()))
        .map(|v| v.trim().to_string())
        .unwrap_or_default()
}
