use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// The request never produced a response.
    Network(String),
    /// The server answered with a non-2xx status.
    Status(u16),
    /// The response body could not be decoded.
    Decode(String),
    MissingCsrfToken(String),
    /// A request for this control is already in flight.
    Busy,
    Aborted,
    InvalidTransition(String),
}

impl ClientError {
    /// Text shown to the user when an interaction fails.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Status(code) => format!(
                "Your request cannot be processed (error code {}), please reload the page",
                code
            ),
            ClientError::Network(msg) => {
                format!("There has been a problem with your fetch operation: {}", msg)
            }
            ClientError::MissingCsrfToken(_) => {
                "Your session has expired, please reload the page".to_string()
            }
            ClientError::Busy => "Please wait for the previous action to finish".to_string(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Network(msg) => write!(f, "Network error: {}", msg),
            ClientError::Status(code) => write!(f, "Unexpected status: {}", code),
            ClientError::Decode(msg) => write!(f, "Decode error: {}", msg),
            ClientError::MissingCsrfToken(name) => write!(f, "Missing CSRF cookie: {}", name),
            ClientError::Busy => write!(f, "Request already in flight"),
            ClientError::Aborted => write!(f, "Request aborted"),
            ClientError::InvalidTransition(msg) => write!(f, "Invalid transition: {}", msg),
        }
    }
}

impl std::error::Error for ClientError {}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => ClientError::Status(status.as_u16()),
            None if err.is_decode() => ClientError::Decode(err.to_string()),
            None => ClientError::Network(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err.to_string())
    }
}

impl From<futures::future::Aborted> for ClientError {
    fn from(_: futures::future::Aborted) -> Self {
        ClientError::Aborted
    }
}
