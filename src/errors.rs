/// Errors that can occur while planning a night of observing.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Missing credentials or invalid location/window settings. Always fatal,
    /// raised before any network call is made.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Non-2xx status or transport failure talking to an upstream service.
    #[error("Upstream request failed: {0}")]
    UpstreamRequest(String),

    /// Upstream answered, but not with the JSON shape we expected.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn is_configuration(&self) -> bool {
        matches!(self, AppError::Configuration(_))
    }
}
