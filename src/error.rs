use thiserror::Error;

/// Failure taxonomy for client operations.
///
/// Every failure a command can hit falls into one of these. Callers either
/// surface the message as a styled alert or log it and move on; nothing is
/// retried automatically.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The microphone could not be opened (no device, or the OS refused).
    #[error("microphone unavailable: {0}")]
    PermissionDenied(String),

    /// No stored token. The user needs to log in before this operation.
    #[error("not logged in — run `voicelens login` first")]
    AuthMissing,

    /// The request never completed (connect, send, or body read failed).
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("server rejected the request ({status}): {message}")]
    Api { status: u16, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_missing_mentions_login() {
        let msg = ClientError::AuthMissing.to_string();
        assert!(msg.contains("login"));
    }

    #[test]
    fn api_error_carries_status() {
        let err = ClientError::Api {
            status: 401,
            message: "bad token".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("401"));
        assert!(msg.contains("bad token"));
    }
}
