use thiserror::Error;

/// Failures talking to the backend job API.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    /// The request never completed (connect, timeout, body read).
    #[error("transport error: {0}")]
    Transport(String),

    /// The backend answered with a non-success status.
    #[error("HTTP {code}: {}", .message.as_deref().unwrap_or("no error message"))]
    Status { code: u16, message: Option<String> },

    /// The response body was not the expected JSON shape.
    #[error("malformed response: {0}")]
    Decode(String),

    /// A snapshot carried a status string outside the known set.
    #[error("unrecognized task status: {0}")]
    UnknownStatus(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}

/// Why a submission did not start a poll session.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    #[error("a download is already in progress")]
    Busy,

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Rejected(String),

    #[error("{0}")]
    Network(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_display() {
        let err = ApiError::Status {
            code: 404,
            message: Some("Task not found".to_string()),
        };
        assert_eq!(err.to_string(), "HTTP 404: Task not found");

        let err = ApiError::Status { code: 502, message: None };
        assert_eq!(err.to_string(), "HTTP 502: no error message");
    }

    #[test]
    fn test_submit_error_displays_message_verbatim() {
        let err = SubmitError::Rejected("Invalid URL".to_string());
        assert_eq!(err.to_string(), "Invalid URL");
    }
}
