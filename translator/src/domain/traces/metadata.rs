//! Span kind and status decoding.
//!
//! Events carry plain strings and integers; the OTLP enum types stay
//! behind this module.

use opentelemetry_proto::tonic::trace::v1::{Status, span::SpanKind, status::StatusCode};

/// Canonical lowercase name for an OTLP span kind. Unknown values map to
/// `"unspecified"`.
pub fn span_kind_name(kind: i32) -> &'static str {
    match SpanKind::try_from(kind) {
        Ok(SpanKind::Client) => "client",
        Ok(SpanKind::Server) => "server",
        Ok(SpanKind::Producer) => "producer",
        Ok(SpanKind::Consumer) => "consumer",
        Ok(SpanKind::Internal) => "internal",
        Ok(SpanKind::Unspecified) | Err(_) => "unspecified",
    }
}

/// Integer status code of a span and whether it counts as an error.
///
/// An absent status is reported as `UNSET` and never as an error.
pub fn span_status(status: Option<&Status>) -> (i32, bool) {
    match status {
        None => (StatusCode::Unset as i32, false),
        Some(status) => (status.code, status.code == StatusCode::Error as i32),
    }
}

/// Non-empty status message, if any.
pub fn status_message(status: Option<&Status>) -> Option<&str> {
    status
        .map(|s| s.message.as_str())
        .filter(|message| !message.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(code: StatusCode, message: &str) -> Status {
        Status {
            message: message.to_string(),
            code: code as i32,
        }
    }

    #[test]
    fn test_span_kind_name_known_values() {
        assert_eq!(span_kind_name(SpanKind::Client as i32), "client");
        assert_eq!(span_kind_name(SpanKind::Server as i32), "server");
        assert_eq!(span_kind_name(SpanKind::Producer as i32), "producer");
        assert_eq!(span_kind_name(SpanKind::Consumer as i32), "consumer");
        assert_eq!(span_kind_name(SpanKind::Internal as i32), "internal");
        assert_eq!(span_kind_name(SpanKind::Unspecified as i32), "unspecified");
    }

    #[test]
    fn test_span_kind_name_unknown_value() {
        assert_eq!(span_kind_name(42), "unspecified");
        assert_eq!(span_kind_name(-1), "unspecified");
    }

    #[test]
    fn test_span_status_absent() {
        assert_eq!(span_status(None), (0, false));
    }

    #[test]
    fn test_span_status_error() {
        let st = status(StatusCode::Error, "boom");
        assert_eq!(span_status(Some(&st)), (2, true));
    }

    #[test]
    fn test_span_status_ok_and_unset() {
        let ok = status(StatusCode::Ok, "");
        assert_eq!(span_status(Some(&ok)), (1, false));
        let unset = status(StatusCode::Unset, "");
        assert_eq!(span_status(Some(&unset)), (0, false));
    }

    #[test]
    fn test_span_status_unknown_code_passed_through() {
        let st = Status {
            message: String::new(),
            code: 7,
        };
        assert_eq!(span_status(Some(&st)), (7, false));
    }

    #[test]
    fn test_status_message() {
        assert_eq!(status_message(None), None);
        assert_eq!(status_message(Some(&status(StatusCode::Error, ""))), None);
        assert_eq!(
            status_message(Some(&status(StatusCode::Error, "timeout"))),
            Some("timeout")
        );
    }
}
