use reqwest::StatusCode;

/// User-facing text for a title search that matched nothing
pub const NOT_FOUND_MESSAGE: &str = "Nie znaleziono pozycji o tym tytule.";

/// User-facing text for any transport, status or decoding failure
pub const CONNECTION_MESSAGE: &str = "Błąd połączenia z serwerem.";

/// User-facing text for actions that need a session
pub const LOGIN_REQUIRED_MESSAGE: &str = "Musisz być zalogowany, aby polubić pozycję.";

/// Fallback text when the auth service rejects a request without a message
pub const REJECTED_MESSAGE: &str = "Wystąpił błąd";

/// Client-level errors
#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Connection error: {0}")]
    Connection(#[from] reqwest::Error),

    #[error("Unexpected status {0}")]
    Status(u16),

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Not logged in")]
    Unauthenticated,

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Rejected by server: {0}")]
    Rejected(String),
}

impl ClientError {
    /// Cancellation is not a failure and must never reach view state
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ClientError::Cancelled)
    }

    /// Text shown to the user at the point of the failing operation
    pub fn user_message(&self) -> String {
        match self {
            ClientError::NotFound(_) => NOT_FOUND_MESSAGE.to_string(),
            ClientError::Unauthenticated => LOGIN_REQUIRED_MESSAGE.to_string(),
            ClientError::Rejected(msg) if !msg.is_empty() => msg.clone(),
            ClientError::Rejected(_) => REJECTED_MESSAGE.to_string(),
            ClientError::InvalidInput(msg) => msg.clone(),
            ClientError::Connection(_)
            | ClientError::Status(_)
            | ClientError::Decode(_)
            | ClientError::Cancelled => CONNECTION_MESSAGE.to_string(),
        }
    }

    /// Maps a non-accepted status onto the error taxonomy
    pub fn from_status(status: StatusCode, what: impl Into<String>) -> Self {
        if status == StatusCode::NOT_FOUND {
            ClientError::NotFound(what.into())
        } else {
            ClientError::Status(status.as_u16())
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
