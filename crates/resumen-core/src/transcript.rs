use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{info, warn};

use crate::{
    config::Config,
    error::{ResumenError, Result},
    source::extract_video_id,
};

/// The transcript provider does not commit to one payload shape per video.
/// Everything it has been observed to return is decoded here, once, at the
/// boundary; anything else falls through to `Unrecognized`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RawTranscript {
    /// Caption fragments to be concatenated into the full transcript.
    Captions {
        #[serde(default, alias = "videoId", alias = "id")]
        video_id: Option<String>,
        #[serde(default)]
        url: Option<String>,
        captions: Vec<CaptionFragment>,
    },
    /// Already-joined transcript text.
    Flat {
        #[serde(default, alias = "videoId", alias = "id")]
        video_id: Option<String>,
        #[serde(default)]
        url: Option<String>,
        text: String,
    },
    /// A bare transcript string with no metadata at all.
    Bare(String),
}

/// One caption unit; some provider runs emit timestamped objects, others
/// plain strings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum CaptionFragment {
    Timed { text: String },
    Plain(String),
}

impl CaptionFragment {
    fn text(&self) -> &str {
        match self {
            CaptionFragment::Timed { text } => text,
            CaptionFragment::Plain(text) => text,
        }
    }
}

/// A provider entry normalized to (optional id, transcript text). The id is
/// what the alignment resolver keys on when present.
#[derive(Debug, Clone)]
pub struct RawEntry {
    pub video_id: Option<String>,
    pub text: String,
}

impl RawTranscript {
    fn into_entry(self) -> RawEntry {
        match self {
            RawTranscript::Captions {
                video_id,
                url,
                captions,
            } => RawEntry {
                video_id: resolve_entry_id(video_id, url),
                text: captions
                    .iter()
                    .map(|c| c.text().trim())
                    .filter(|t| !t.is_empty())
                    .collect::<Vec<_>>()
                    .join(" "),
            },
            RawTranscript::Flat {
                video_id,
                url,
                text,
            } => RawEntry {
                video_id: resolve_entry_id(video_id, url),
                text,
            },
            RawTranscript::Bare(text) => RawEntry {
                video_id: None,
                text,
            },
        }
    }
}

/// Prefer an explicit id field; fall back to parsing one out of the entry's
/// URL. Ids that do not look like video ids are discarded.
fn resolve_entry_id(video_id: Option<String>, url: Option<String>) -> Option<String> {
    video_id
        .as_deref()
        .or(url.as_deref())
        .and_then(|raw| extract_video_id(raw).ok())
}

/// Issue one bulk transcription run for the given video URLs and normalize
/// the response. The provider applies its own internal retries (configured
/// in the payload); this call is not retried by us, and any provider-side
/// failure aborts the run.
pub async fn fetch_transcripts(
    client: &Client,
    config: &Config,
    video_urls: &[String],
) -> Result<Vec<RawEntry>> {
    let url = format!(
        "{}/v2/acts/{}/run-sync-get-dataset-items",
        config.endpoints.transcript_api, config.transcript_actor
    );
    let payload = json!({
        "urls": video_urls,
        "outputFormat": "captions",
        "proxyOptions": {
            "useApifyProxy": true,
            "apifyProxyGroups": ["RESIDENTIAL"],
        },
        "maxRetries": config.transcript_provider_retries,
        "channelHandleBoolean": true,
        "channelNameBoolean": true,
        "datePublishedBoolean": true,
        "relativeDateTextBoolean": true,
    });

    let response = client
        .post(&url)
        .query(&[("token", config.transcript_token.as_str())])
        .json(&payload)
        .timeout(config.timeouts.transcript)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ResumenError::Upstream {
            service: "transcript provider",
            reason: format!("HTTP {status}: {}", snippet(&body)),
        });
    }

    let body: Value = response.json().await?;
    if let Some(error) = body.get("error") {
        return Err(ResumenError::Upstream {
            service: "transcript provider",
            reason: provider_error_message(error),
        });
    }

    let items = match body {
        Value::Array(items) => items,
        other => {
            return Err(ResumenError::Upstream {
                service: "transcript provider",
                reason: format!("expected a dataset array, got: {}", snippet(&other.to_string())),
            });
        }
    };

    let entries: Vec<RawEntry> = items.into_iter().map(normalize_item).collect();
    info!(
        requested = video_urls.len(),
        received = entries.len(),
        "fetched transcripts"
    );
    Ok(entries)
}

fn normalize_item(item: Value) -> RawEntry {
    match serde_json::from_value::<RawTranscript>(item.clone()) {
        Ok(raw) => raw.into_entry(),
        Err(_) => {
            warn!(
                item = %snippet(&item.to_string()),
                "unrecognized transcript entry shape, treating as no transcript"
            );
            RawEntry {
                video_id: item
                    .get("videoId")
                    .or_else(|| item.get("id"))
                    .and_then(Value::as_str)
                    .and_then(|raw| extract_video_id(raw).ok()),
                text: String::new(),
            }
        }
    }
}

fn provider_error_message(error: &Value) -> String {
    error
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| error.to_string())
}

fn snippet(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.chars().count() > 200 {
        let cut: String = trimmed.chars().take(200).collect();
        format!("{cut}…")
    } else {
        trimmed.to_string()
    }
}
