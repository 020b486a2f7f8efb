//! Classifies completed HTTP exchanges into typed values or structured errors.

use reqwest::header::{HeaderMap, LOCATION};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ManagementError, ManagementResult};

/// Body and metadata of a response that completed with a success status.
#[derive(Debug, Clone)]
pub(crate) struct Completed {
    pub(crate) status: StatusCode,
    pub(crate) headers: HeaderMap,
    pub(crate) text: String,
}

impl Completed {
    /// Decode the body, returning `None` for an empty body.
    pub(crate) fn json<T: DeserializeOwned>(&self) -> ManagementResult<Option<T>> {
        if self.text.trim().is_empty() {
            return Ok(None);
        }
        serde_json::from_str(&self.text)
            .map(Some)
            .map_err(|_| ManagementError::parse(&self.text, self.status.as_u16()))
    }

    /// Trailing path segment of the `Location` header, if present.
    pub(crate) fn created_id(&self) -> Option<String> {
        self.headers
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .and_then(trailing_segment)
    }
}

/// Read the full body and split success from failure by status class.
pub(crate) async fn interpret(response: Response) -> ManagementResult<Completed> {
    let status = response.status();
    let headers = response.headers().clone();
    let text = response.text().await.map_err(ManagementError::transport)?;

    if status.is_success() {
        Ok(Completed {
            status,
            headers,
            text,
        })
    } else {
        Err(classify_failure(status, text))
    }
}

/// Build the error for a non-success response.
///
/// JSON object bodies are surfaced intact; anything else becomes
/// `{message: <raw text>, status_code}`.
pub(crate) fn classify_failure(status: StatusCode, text: String) -> ManagementError {
    let status_code = status.as_u16();
    match serde_json::from_str::<Value>(&text) {
        Ok(body) if body.is_object() => ManagementError::Service { body, status_code },
        _ => {
            let message = if text.trim().is_empty() {
                status
                    .canonical_reason()
                    .map_or_else(|| format!("request failed with status {status}"), str::to_string)
            } else {
                text
            };
            ManagementError::Http {
                message,
                status_code,
            }
        }
    }
}

pub(crate) fn trailing_segment(location: &str) -> Option<String> {
    let path = location.split(['?', '#']).next().unwrap_or_default();
    let id = path.rsplit('/').next().unwrap_or_default();
    (!id.is_empty()).then(|| id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use codepush_api_models::AppList;
    use reqwest::header::HeaderValue;
    use serde_json::json;

    fn completed(text: &str, location: Option<&'static str>) -> Completed {
        let mut headers = HeaderMap::new();
        if let Some(location) = location {
            headers.insert(LOCATION, HeaderValue::from_static(location));
        }
        Completed {
            status: StatusCode::OK,
            headers,
            text: text.to_string(),
        }
    }

    #[test]
    fn trailing_segment_extracts_last_path_component() {
        assert_eq!(trailing_segment("/apps/abc123").as_deref(), Some("abc123"));
        assert_eq!(
            trailing_segment("https://svc.example/apps/a1/deployments/d9").as_deref(),
            Some("d9")
        );
        assert_eq!(trailing_segment("/apps/a1?x=1").as_deref(), Some("a1"));
        assert_eq!(trailing_segment("/apps/a1?next=/b").as_deref(), Some("a1"));
        assert_eq!(trailing_segment("bare-id").as_deref(), Some("bare-id"));
    }

    #[test]
    fn trailing_segment_rejects_locations_without_id() {
        assert!(trailing_segment("").is_none());
        assert!(trailing_segment("/apps/").is_none());
    }

    #[test]
    fn empty_body_decodes_to_none() {
        let parsed: Option<AppList> = completed("  ", None).json().expect("empty body");
        assert!(parsed.is_none());
    }

    #[test]
    fn garbage_body_is_a_parse_error() {
        let err = completed("not json", None)
            .json::<AppList>()
            .expect_err("parse failure");
        assert_eq!(err.message(), "Could not parse response: not json");
    }

    #[test]
    fn created_id_reads_location_header() {
        assert_eq!(
            completed("", Some("/apps/new-id")).created_id().as_deref(),
            Some("new-id")
        );
        assert!(completed("", None).created_id().is_none());
    }

    #[test]
    fn json_failure_body_is_kept_intact() {
        let body = json!({"message": "denied", "details": [1, 2]});
        let err = classify_failure(StatusCode::FORBIDDEN, body.to_string());
        assert_eq!(err.service_body(), Some(&body));
        assert_eq!(err.status_code(), Some(403));
    }

    #[test]
    fn text_failure_body_becomes_message() {
        let err = classify_failure(StatusCode::INTERNAL_SERVER_ERROR, "boom".to_string());
        assert!(
            matches!(err, ManagementError::Http { ref message, status_code: 500 } if message == "boom")
        );
    }

    #[test]
    fn empty_failure_body_uses_reason_phrase() {
        let err = classify_failure(StatusCode::NOT_FOUND, String::new());
        assert_eq!(err.message(), "Not Found");
    }
}
