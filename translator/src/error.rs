//! Error types for request decoding and translation

use thiserror::Error;

/// Failure to decode an OTLP request body.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// Body is not a valid protobuf `ExportTraceServiceRequest`
    #[error("protobuf decode error: {0}")]
    Protobuf(#[from] prost::DecodeError),

    /// Body is not a valid OTLP/JSON `ExportTraceServiceRequest`
    #[error("JSON decode error: {0}")]
    Json(#[from] serde_json::Error),

    /// Compressed body could not be inflated
    #[error("decompression error: {0}")]
    Decompress(#[from] std::io::Error),

    /// Decoded body exceeds the size limit
    #[error("request body exceeds {limit} bytes")]
    BodyTooLarge { limit: usize },
}

/// Error returned by the request-level translation entry points.
///
/// Once a request is decoded, translation itself cannot fail; every
/// variant here is raised before the first batch is built.
#[derive(Error, Debug)]
pub enum TranslateError {
    /// No API key was supplied with the request
    #[error("missing API key")]
    MissingApiKey,

    /// Content type is neither protobuf nor JSON
    #[error("unsupported content type: {0:?}")]
    UnsupportedContentType(String),

    /// Content encoding is neither identity nor gzip
    #[error("unsupported content encoding: {0:?}")]
    UnsupportedContentEncoding(String),

    /// Request body could not be decoded
    #[error("failed to parse OTLP request body: {0}")]
    Decode(#[from] DecodeError),
}

impl TranslateError {
    /// Whether the error was caused by the request headers rather than the body
    pub fn is_header_error(&self) -> bool {
        match self {
            Self::MissingApiKey | Self::UnsupportedContentType(_) => true,
            Self::UnsupportedContentEncoding(_) => true,
            Self::Decode(_) => false,
        }
    }
}
