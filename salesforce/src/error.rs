use thiserror::Error;

/// Errors returned by the Salesforce client.
#[derive(Debug, Error)]
pub enum SalesforceError {
    /// The SOAP login call was rejected.
    #[error("Salesforce login failed: {0}")]
    AuthenticationFailed(String),

    /// Transport-level failure talking to the org.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The org answered with a structured API error.
    #[error("Salesforce API error {error_code}: {message}")]
    Api {
        /// Salesforce error code, e.g. `INVALID_SESSION_ID` or `MALFORMED_QUERY`.
        error_code: String,
        /// Human-readable message from the org.
        message: String,
    },

    /// A required environment variable is missing or empty.
    #[error("missing configuration: {0}")]
    MissingConfig(&'static str),

    /// The org returned a body the client could not interpret.
    #[error("unexpected response from Salesforce: {0}")]
    UnexpectedResponse(String),
}

impl SalesforceError {
    /// Whether the error indicates an expired or invalid session id.
    ///
    /// The client retries exactly once after re-authenticating when this
    /// returns true.
    #[must_use]
    pub fn is_invalid_session(&self) -> bool {
        matches!(self, Self::Api { error_code, .. } if error_code == "INVALID_SESSION_ID")
    }
}
