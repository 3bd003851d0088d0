use std::time::Duration;

use crate::error::{ResumenError, Result};

/// Playlist processed by batch mode. A fixed parameter of the deployment,
/// overridable through `PLAYLIST_ID`.
const DEFAULT_PLAYLIST_ID: &str = "PL_0E-MP0df5mxMX0NrZxSCufMcK6e9z3b";

const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_TRANSCRIPT_ACTOR: &str = "karamelo~youtube-transcripts";

/// Base URLs for every external collaborator. Defaults point at the real
/// services; tests point them at a local mock server.
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub youtube_api: String,
    pub transcript_api: String,
    pub gemini_api: String,
    pub readwise_api: String,
    pub pushover_api: String,
    pub telegram_api: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            youtube_api: "https://www.googleapis.com/youtube/v3".to_string(),
            transcript_api: "https://api.apify.com".to_string(),
            gemini_api: "https://generativelanguage.googleapis.com".to_string(),
            readwise_api: "https://readwise.io".to_string(),
            pushover_api: "https://api.pushover.net".to_string(),
            telegram_api: "https://api.telegram.org".to_string(),
        }
    }
}

/// Retry policy for the summarizer. Backoff is linear: attempt N sleeps
/// `N * base_delay` before the next try.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(5),
        }
    }
}

/// One request timeout per collaborator class: the bulk transcript run is
/// slow, summarization is medium, metadata and notifications are quick.
#[derive(Debug, Clone)]
pub struct Timeouts {
    pub transcript: Duration,
    pub summary: Duration,
    pub metadata: Duration,
    pub notify: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            transcript: Duration::from_secs(300),
            summary: Duration::from_secs(120),
            metadata: Duration::from_secs(10),
            notify: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PushoverConfig {
    pub token: String,
    pub user: String,
}

/// All credentials and tunables, read from the environment exactly once at
/// process start and passed into the pipeline. Core logic never touches the
/// environment itself.
#[derive(Debug, Clone)]
pub struct Config {
    pub youtube_api_key: String,
    pub transcript_token: String,
    pub gemini_api_key: String,
    pub readwise_token: String,
    /// Phone push channel for batch runs; `None` disables it.
    pub pushover: Option<PushoverConfig>,
    /// Chat reply channel for single-video runs; `None` disables it.
    pub telegram_bot_token: Option<String>,
    pub playlist_id: String,
    pub gemini_model: String,
    pub transcript_actor: String,
    /// Retry count the transcript provider applies internally, forwarded in
    /// the request payload. The caller itself never retries that call.
    pub transcript_provider_retries: u32,
    pub endpoints: Endpoints,
    pub retry: RetryPolicy,
    pub timeouts: Timeouts,
}

impl Config {
    /// Build the configuration from the process environment. Call this once
    /// in the binary, before the pipeline starts.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            youtube_api_key: required("YT_API_KEY")?,
            transcript_token: required("APIFY_TOKEN")?,
            gemini_api_key: required("GEMINI_KEY")?,
            readwise_token: required("READWISE_TOKEN")?,
            pushover: match (optional("PUSHOVER_TOKEN"), optional("PUSHOVER_USER")) {
                (Some(token), Some(user)) => Some(PushoverConfig { token, user }),
                _ => None,
            },
            telegram_bot_token: optional("TELEGRAM_BOT_TOKEN"),
            playlist_id: optional("PLAYLIST_ID")
                .unwrap_or_else(|| DEFAULT_PLAYLIST_ID.to_string()),
            gemini_model: optional("GEMINI_MODEL")
                .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            transcript_actor: DEFAULT_TRANSCRIPT_ACTOR.to_string(),
            transcript_provider_retries: 8,
            endpoints: Endpoints::default(),
            retry: RetryPolicy::default(),
            timeouts: Timeouts::default(),
        })
    }

    /// URL of the batch playlist, used as the document's source link.
    pub fn playlist_url(&self) -> String {
        format!(
            "https://www.youtube.com/playlist?list={}",
            self.playlist_id
        )
    }
}

fn required(env_var: &str) -> Result<String> {
    optional(env_var).ok_or_else(|| ResumenError::MissingConfig {
        env_var: env_var.to_string(),
    })
}

fn optional(env_var: &str) -> Option<String> {
    std::env::var(env_var).ok().filter(|v| !v.trim().is_empty())
}
