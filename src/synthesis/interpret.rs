//! Classifies a service reply into an artifact or a [`SubmissionError`].

use reqwest::StatusCode;
use serde_json::Value;

use super::{ArtifactReference, Endpoint, SubmissionError};

/// JSON field naming the synthesized file on success.
pub const FILE_ID_FIELD: &str = "file_id";
/// JSON field carrying the service's own error message on failure.
pub const ERROR_FIELD: &str = "error";

/// Interpret `status` and `body` returned by `POST /api/tts`.
///
/// * non-2xx: the body's `error` string, or the generic server message.
/// * 2xx: `file_id` becomes an [`ArtifactReference`]; a missing, empty or
///   non-string id is [`SubmissionError::MalformedResponse`].
pub fn interpret(
    status: StatusCode,
    body: &Value,
    endpoint: &Endpoint,
) -> Result<ArtifactReference, SubmissionError> {
    if !status.is_success() {
        let status = status.as_u16();
        return Err(match body[ERROR_FIELD].as_str() {
            Some(message) if !message.is_empty() => SubmissionError::ServerReported {
                status,
                message: message.to_string(),
            },
            _ => SubmissionError::Server { status },
        });
    }

    match body[FILE_ID_FIELD].as_str() {
        Some(id) if !id.is_empty() => Ok(ArtifactReference::new(endpoint, id)),
        _ => Err(SubmissionError::MalformedResponse),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn endpoint() -> Endpoint {
        Endpoint::parse("http://localhost:5000").unwrap()
    }

    #[test]
    fn success_builds_reference() {
        let body = json!({"success": true, "file_id": "abc123", "message": "ok"});
        let r = interpret(StatusCode::OK, &body, &endpoint()).unwrap();
        assert_eq!(r.url(), "http://localhost:5000/api/audio/abc123");
    }

    #[test]
    fn server_message_is_surfaced_verbatim() {
        let body = json!({"error": "voice model unavailable"});
        let err = interpret(StatusCode::INTERNAL_SERVER_ERROR, &body, &endpoint()).unwrap_err();
        assert_eq!(
            err,
            SubmissionError::ServerReported {
                status: 500,
                message: "voice model unavailable".into()
            }
        );
        assert_eq!(err.user_message(), "voice model unavailable");
    }

    #[test]
    fn missing_error_field_uses_fallback() {
        let err = interpret(StatusCode::INTERNAL_SERVER_ERROR, &json!({}), &endpoint()).unwrap_err();
        assert_eq!(err, SubmissionError::Server { status: 500 });
        assert_eq!(
            err.user_message(),
            "An error occurred while generating audio."
        );
    }

    #[test]
    fn non_string_error_field_uses_fallback() {
        let body = json!({"error": {"code": 7}});
        let err = interpret(StatusCode::BAD_REQUEST, &body, &endpoint()).unwrap_err();
        assert_eq!(err, SubmissionError::Server { status: 400 });
    }

    #[test]
    fn unparsed_error_body_uses_fallback() {
        let err = interpret(StatusCode::BAD_GATEWAY, &Value::Null, &endpoint()).unwrap_err();
        assert_eq!(err, SubmissionError::Server { status: 502 });
    }

    #[test]
    fn error_status_wins_over_file_id() {
        let body = json!({"file_id": "abc", "error": "nope"});
        let err = interpret(StatusCode::BAD_GATEWAY, &body, &endpoint()).unwrap_err();
        assert!(matches!(err, SubmissionError::ServerReported { status: 502, .. }));
    }

    #[test]
    fn success_without_file_id_is_malformed() {
        for body in [
            json!({"success": true}),
            json!({"file_id": ""}),
            json!({"file_id": 42}),
            json!(null),
        ] {
            let err = interpret(StatusCode::OK, &body, &endpoint()).unwrap_err();
            assert_eq!(err, SubmissionError::MalformedResponse, "body: {body}");
        }
    }

    #[test]
    fn created_counts_as_success() {
        let body = json!({"file_id": "x1"});
        assert!(interpret(StatusCode::CREATED, &body, &endpoint()).is_ok());
    }
}
