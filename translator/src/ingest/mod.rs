//! Request decoding boundary
//!
//! - `encoding` - Content type / encoding negotiation and body decoding
//! - `request` - Transport metadata (`RequestInfo`)

pub mod encoding;
pub mod request;

pub use encoding::{
    MAX_BODY_BYTES, OtlpContentEncoding, OtlpContentType, decode_trace_request,
    decode_trace_request_with_limit,
};
pub use request::RequestInfo;

use crate::domain::traces::{DatasetPolicy, TranslationResult, translate_trace_request};
use crate::error::TranslateError;

/// Decode a raw export request body and translate it.
///
/// Content type and encoding come from `info`. A body that fails to decode
/// aborts the whole request; no partial batches are returned.
pub fn translate_trace_request_from_bytes(
    body: &[u8],
    info: &RequestInfo,
    policy: &dyn DatasetPolicy,
) -> Result<TranslationResult, TranslateError> {
    let content_type = info.content_type()?;
    let content_encoding = info.content_encoding()?;

    let request = decode_trace_request(body, content_type, content_encoding).map_err(|e| {
        tracing::warn!(
            error = %e,
            content_type = content_type.as_header_value(),
            body_len = body.len(),
            "Failed to decode trace request"
        );
        TranslateError::from(e)
    })?;

    Ok(translate_trace_request(&request, info, policy))
}
