use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use crate::{
    config::Config,
    error::{ResumenError, Result},
    types::{SummaryResult, TranscriptRecord, VideoRef},
};

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
}

/// The provider reports region restrictions as an error message, not a
/// dedicated code. Matching the message is what the upstream diagnostic
/// tooling does as well.
fn is_region_restricted(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("location") && lower.contains("not supported")
}

fn build_prompt(title: &str, transcript: &str) -> String {
    format!(
        r#"Analyze the following video transcript and produce TWO LEVELS OF ANALYSIS in pure HTML (no markdown):

LEVEL 1 - EXECUTIVE SUMMARY (highly consolidated):
- At most 3-5 key points
- The essentials only, no detail
- Readable in 30 seconds
- Use <h3> for the heading and <ul><li> for the points

LEVEL 2 - DETAILED ANALYSIS (fully developed):
- Every main topic, developed
- Specific data, figures, names, dates
- Structured into sections with <h3> and <h4>
- Include context and how the ideas relate
- Use <p> for paragraphs and <b> for emphasis

REQUIRED FORMAT:
<h2>LEVEL 1: Executive Summary</h2>
[content]

<h2>LEVEL 2: Detailed Analysis</h2>
[content]

IMPORTANT:
- Valid HTML only, do NOT use markdown (##, **, etc.)
- No introductory or closing remarks
- The content must be ready to publish as-is

VIDEO TITLE: {title}

TRANSCRIPT:
{transcript}"#
    )
}

/// Summarize one transcript with bounded retries. Transient failures (HTTP
/// transport, non-success status without a region marker) back off linearly
/// at `attempt * base_delay` and retry up to the configured limit; contract
/// breaks, provider rejections and region restrictions fail on first sight.
pub async fn summarize(
    client: &Client,
    config: &Config,
    title: &str,
    transcript: &str,
) -> Result<String> {
    let max_attempts = config.retry.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match request_summary(client, config, title, transcript).await {
            Ok(html) => {
                info!(attempt, "summary generated");
                return Ok(html);
            }
            Err(err) if err.retryable() && attempt < max_attempts => {
                let delay = config.retry.base_delay * attempt;
                warn!(
                    attempt,
                    delay_secs = delay.as_secs_f64(),
                    error = %err,
                    "summary attempt failed, backing off"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) if err.retryable() => {
                return Err(ResumenError::ExhaustedRetries {
                    attempts: max_attempts,
                    source: Box::new(err),
                });
            }
            Err(err) => return Err(err),
        }
    }
}

async fn request_summary(
    client: &Client,
    config: &Config,
    title: &str,
    transcript: &str,
) -> Result<String> {
    let url = format!(
        "{}/v1beta/models/{}:generateContent",
        config.endpoints.gemini_api, config.gemini_model
    );
    let payload = json!({
        "contents": [{"parts": [{"text": build_prompt(title, transcript)}]}],
    });

    let response = client
        .post(&url)
        .query(&[("key", config.gemini_api_key.as_str())])
        .json(&payload)
        .timeout(config.timeouts.summary)
        .send()
        .await?;

    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        // A failing status usually means transience, except when the error
        // body names a region restriction.
        if let Ok(decoded) = serde_json::from_str::<GenerateResponse>(&body)
            && let Some(error) = decoded.error
            && is_region_restricted(&error.message)
        {
            return Err(ResumenError::PermanentConfig {
                message: error.message,
            });
        }
        return Err(ResumenError::SummaryStatus {
            status: status.as_u16(),
            body,
        });
    }

    let decoded: GenerateResponse = serde_json::from_str(&body)?;
    if let Some(error) = decoded.error {
        if is_region_restricted(&error.message) {
            return Err(ResumenError::PermanentConfig {
                message: error.message,
            });
        }
        return Err(ResumenError::ProviderRejected {
            message: error.message,
        });
    }

    let text: String = decoded
        .candidates
        .first()
        .map(|candidate| {
            candidate
                .content
                .parts
                .iter()
                .map(|part| part.text.as_str())
                .collect()
        })
        .unwrap_or_default();

    if text.is_empty() {
        return Err(ResumenError::MalformedResponse {
            reason: "response carries neither candidates nor an error field".to_string(),
        });
    }

    Ok(text)
}

/// Summarize a batch sequentially, one video at a time. A failed video keeps
/// its slot with the error attached so the document can mark that section,
/// and the remaining videos are still processed.
pub async fn summarize_batch(
    client: &Client,
    config: &Config,
    videos: &[VideoRef],
    transcripts: &[TranscriptRecord],
) -> Vec<SummaryResult> {
    let mut results = Vec::with_capacity(videos.len());
    for (video, transcript) in videos.iter().zip(transcripts) {
        if transcript.is_missing() {
            warn!(video_id = %video.id, "skipping summary, no transcript");
            results.push(SummaryResult::failed(
                &video.id,
                ResumenError::Upstream {
                    service: "transcript provider",
                    reason: format!("no transcript available for video {}", video.id),
                },
            ));
            continue;
        }

        match summarize(client, config, &video.title, &transcript.text).await {
            Ok(html) => results.push(SummaryResult::ok(&video.id, html)),
            Err(err) => {
                warn!(video_id = %video.id, error = %err, "summary failed for video");
                results.push(SummaryResult::failed(&video.id, err));
            }
        }
    }
    results
}
