use serde_json::Value;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AveoError {
    #[error("Database error: {0}")]
    Database(#[from] tokio_rusqlite::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication required")]
    AuthRequired,

    #[error("{0}")]
    Api(#[from] ApiError),
}

impl AveoError {
    /// HTTP status of a backend rejection, if this error is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            AveoError::Api(e) => Some(e.status),
            AveoError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// A non-2xx response from the backend, decoded once at the client boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    pub status: u16,
    pub kind: ApiErrorKind,
    /// Raw response body, `None` when the body was not JSON.
    pub data: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ApiErrorKind {
    /// `detail` was a list of field errors.
    Validation(Vec<ValidationIssue>),
    /// `detail` was a string, or the body carried a `message`.
    Message(String),
    /// Nothing usable in the body.
    Http,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

impl std::error::Error for ApiError {}

/// One entry of a `detail` list.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationIssue {
    Located { msg: String, loc: Vec<String> },
    Raw(Value),
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::Located { msg, loc } if loc.is_empty() => write!(f, "{}", msg),
            ValidationIssue::Located { msg, loc } => write!(f, "{} at {}", msg, loc.join(".")),
            ValidationIssue::Raw(v) => write!(f, "{}", v),
        }
    }
}

impl ValidationIssue {
    fn from_value(value: &Value) -> Self {
        let msg = value
            .get("msg")
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty());

        match msg {
            Some(msg) => {
                let loc = value
                    .get("loc")
                    .and_then(Value::as_array)
                    .map(|parts| parts.iter().map(loc_segment).collect())
                    .unwrap_or_default();
                ValidationIssue::Located {
                    msg: msg.to_string(),
                    loc,
                }
            }
            None => ValidationIssue::Raw(value.clone()),
        }
    }
}

fn loc_segment(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl ApiError {
    pub fn from_response(status: u16, data: Option<Value>) -> Self {
        let kind = match data.as_ref() {
            Some(body) => match body.get("detail") {
                Some(Value::String(detail)) => ApiErrorKind::Message(detail.clone()),
                Some(Value::Array(items)) => ApiErrorKind::Validation(
                    items.iter().map(ValidationIssue::from_value).collect(),
                ),
                _ => match body.get("message").and_then(Value::as_str) {
                    Some(message) if !message.is_empty() => {
                        ApiErrorKind::Message(message.to_string())
                    }
                    _ => ApiErrorKind::Http,
                },
            },
            None => ApiErrorKind::Http,
        };

        Self { status, kind, data }
    }

    pub fn message(&self) -> String {
        match &self.kind {
            ApiErrorKind::Message(m) => m.clone(),
            ApiErrorKind::Validation(issues) => issues
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; "),
            ApiErrorKind::Http => format!("Request failed ({})", self.status),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn string_detail_wins() {
        let err = ApiError::from_response(
            400,
            Some(json!({"detail": "Product not found", "message": "ignored"})),
        );
        assert_eq!(err.message(), "Product not found");
        assert_eq!(err.status, 400);
    }

    #[test]
    fn validation_list_is_joined() {
        let err = ApiError::from_response(
            422,
            Some(json!({"detail": [
                {"msg": "field required", "loc": ["body", "email"]},
                {"msg": "too short", "loc": ["body", "items", 0, "name"]},
                {"msg": "bad"},
                {"code": 7}
            ]})),
        );
        assert_eq!(
            err.message(),
            "field required at body.email; too short at body.items.0.name; bad; {\"code\":7}"
        );
        assert!(matches!(err.kind, ApiErrorKind::Validation(ref v) if v.len() == 4));
    }

    #[test]
    fn empty_location_renders_message_only() {
        let err = ApiError::from_response(422, Some(json!({"detail": [{"msg": "invalid", "loc": []}]})));
        assert_eq!(err.message(), "invalid");
    }

    #[test]
    fn message_field_used_without_detail() {
        let err = ApiError::from_response(500, Some(json!({"message": "boom"})));
        assert_eq!(err.message(), "boom");
    }

    #[test]
    fn falls_back_to_status() {
        let err = ApiError::from_response(503, None);
        assert_eq!(err.message(), "Request failed (503)");

        let err = ApiError::from_response(404, Some(json!({"message": ""})));
        assert_eq!(err.message(), "Request failed (404)");
        assert_eq!(err.to_string(), "Request failed (404)");
    }

    #[test]
    fn api_error_exposes_status() {
        let err: AveoError = ApiError::from_response(401, None).into();
        assert_eq!(err.status(), Some(401));
        assert_eq!(AveoError::AuthRequired.status(), None);
    }
}
