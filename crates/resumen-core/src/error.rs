use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResumenError {
    #[error("{service} request failed: {reason}")]
    Upstream { service: &'static str, reason: String },

    #[error(
        "summary provider is not available from this deployment region: {message}. \
         Redeploy in a supported region or route API traffic through one."
    )]
    PermanentConfig { message: String },

    #[error("summary failed after {attempts} attempts: {source}")]
    ExhaustedRetries {
        attempts: u32,
        source: Box<ResumenError>,
    },

    #[error("summary provider returned a malformed response: {reason}")]
    MalformedResponse { reason: String },

    #[error("summary provider rejected the request: {message}")]
    ProviderRejected { message: String },

    #[error("invalid video URL: {reason}")]
    Validation { reason: String },

    #[error("Missing configuration: {env_var} environment variable is not set")]
    MissingConfig { env_var: String },

    #[error("summary endpoint returned HTTP {status}")]
    SummaryStatus { status: u16, body: String },

    #[error("API request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ResumenError {
    /// Whether the summarizer's retry loop may try this failure again.
    /// Everything else in the taxonomy is fatal on first sight.
    pub fn retryable(&self) -> bool {
        matches!(
            self,
            ResumenError::Transport(_) | ResumenError::SummaryStatus { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, ResumenError>;
