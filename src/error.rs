// ── Error type ───────────────────────────────────────────────────────────────

/// Every failure is terminal for the current run.
#[derive(Debug, thiserror::Error)]
pub enum CfpError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("invalid model '{0}': expected one of m1, m2")]
    InvalidModel(String),
    #[error("failed to fetch page: {0}")]
    Fetch(String),
    #[error("no call-for-papers text found: {0}")]
    EmptyContent(String),
    #[error("model unavailable: {0}")]
    ModelUnavailable(String),
}

impl CfpError {
    /// Process exit status for this error kind. Clap keeps 2 for usage errors.
    pub fn exit_code(&self) -> i32 {
        match self {
            CfpError::InvalidUrl(_) => 3,
            CfpError::InvalidModel(_) => 4,
            CfpError::Fetch(_) => 5,
            CfpError::EmptyContent(_) => 6,
            CfpError::ModelUnavailable(_) => 7,
        }
    }
}
