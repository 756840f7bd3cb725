use serde::{Deserialize, Serialize};

pub const METHOD_NOT_ALLOWED: &str = "Method Not Allowed";
pub const BAD_REQUEST: &str = "Bad Request";
pub const INTERNAL_SERVER_ERROR: &str = "Internal Server Error";

/// Body of every non-success response returned to the caller.
///
/// `error` is omitted for `405`, so that body is exactly `{"message":"Method Not Allowed"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ErrorBody {
    pub fn method_not_allowed() -> Self {
        Self {
            message: METHOD_NOT_ALLOWED.to_string(),
            error: None,
        }
    }

    pub fn bad_request(error: impl Into<String>) -> Self {
        Self {
            message: BAD_REQUEST.to_string(),
            error: Some(error.into()),
        }
    }

    pub fn internal(error: impl Into<String>) -> Self {
        Self {
            message: INTERNAL_SERVER_ERROR.to_string(),
            error: Some(error.into()),
        }
    }
}
