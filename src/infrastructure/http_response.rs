// HTTP response utilities shared by the upstream clients
use crate::application::host_error::HostError;
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Error bodies from both hosts carry a human-readable message under one of these keys
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl From<reqwest::Error> for HostError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            HostError::Decode(err.to_string())
        } else {
            HostError::Transport(err.to_string())
        }
    }
}

/// Turn a non-2xx response into `HostError::Status`, keeping the upstream message
pub async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, HostError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(HostError::Status {
        status: status.as_u16(),
        message: error_message(status, &body),
    })
}

/// Decode a successful JSON body
pub async fn decode_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, HostError> {
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| HostError::Decode(e.to_string()))
}

fn error_message(status: reqwest::StatusCode, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        if let Some(message) = parsed.message.or(parsed.error) {
            return message;
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        status.canonical_reason().unwrap_or("request failed").to_string()
    } else {
        trimmed.to_string()
    }
}

/// Percent-encode a single URL path segment
pub fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_error_message_prefers_json_message() {
        let body = r#"{"message":"Not Found","documentation_url":"https://docs.github.com"}"#;
        assert_eq!(error_message(StatusCode::NOT_FOUND, body), "Not Found");

        let body = r#"{"error":"unauthorized"}"#;
        assert_eq!(error_message(StatusCode::UNAUTHORIZED, body), "unauthorized");
    }

    #[test]
    fn test_error_message_falls_back_to_body_then_reason() {
        assert_eq!(error_message(StatusCode::BAD_GATEWAY, "upstream down\n"), "upstream down");
        assert_eq!(error_message(StatusCode::FORBIDDEN, ""), "Forbidden");
    }

    #[test]
    fn test_segment_encodes_slashes() {
        assert_eq!(segment("feature/login"), "feature%2Flogin");
        assert_eq!(segment("main"), "main");
    }
}
