use reqwest::Client;
use serde::Deserialize;
use tracing::info;

use crate::{
    config::Config,
    error::{ResumenError, Result},
    types::VideoRef,
};

const MAX_VIDEO_ID_LEN: usize = 64;

#[derive(Debug, Deserialize)]
struct PlaylistItemsResponse {
    #[serde(default)]
    items: Vec<PlaylistItem>,
}

#[derive(Debug, Deserialize)]
struct PlaylistItem {
    #[serde(rename = "contentDetails")]
    content_details: ContentDetails,
    snippet: Snippet,
}

#[derive(Debug, Deserialize)]
struct ContentDetails {
    #[serde(rename = "videoId")]
    video_id: String,
}

#[derive(Debug, Deserialize)]
struct Snippet {
    title: String,
    #[serde(
        default,
        rename = "videoOwnerChannelTitle",
        alias = "channelTitle"
    )]
    channel: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VideosResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
struct VideoItem {
    id: String,
    snippet: Snippet,
}

pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={video_id}")
}

/// Resolve the configured playlist into an ordered video list.
pub async fn playlist_videos(client: &Client, config: &Config) -> Result<Vec<VideoRef>> {
    let url = format!("{}/playlistItems", config.endpoints.youtube_api);
    let response = client
        .get(&url)
        .query(&[
            ("part", "contentDetails,snippet"),
            ("playlistId", config.playlist_id.as_str()),
            ("maxResults", "50"),
            ("key", config.youtube_api_key.as_str()),
        ])
        .timeout(config.timeouts.metadata)
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(ResumenError::Upstream {
            service: "youtube",
            reason: format!("HTTP {}", response.status()),
        });
    }

    let body: PlaylistItemsResponse = response.json().await?;
    let videos: Vec<VideoRef> = body
        .items
        .into_iter()
        .enumerate()
        .map(|(position, item)| VideoRef {
            url: watch_url(&item.content_details.video_id),
            id: item.content_details.video_id,
            title: item.snippet.title,
            channel: item.snippet.channel,
            position,
        })
        .collect();

    if videos.is_empty() {
        return Err(ResumenError::Upstream {
            service: "youtube",
            reason: format!("playlist {} has no videos", config.playlist_id),
        });
    }

    info!(count = videos.len(), "resolved playlist videos");
    Ok(videos)
}

/// Resolve a single caller-supplied video URL into a `VideoRef`. The URL is
/// validated before any network call.
pub async fn single_video(client: &Client, config: &Config, video_url: &str) -> Result<VideoRef> {
    let video_id = extract_video_id(video_url)?;

    let url = format!("{}/videos", config.endpoints.youtube_api);
    let response = client
        .get(&url)
        .query(&[
            ("part", "snippet"),
            ("id", video_id.as_str()),
            ("key", config.youtube_api_key.as_str()),
        ])
        .timeout(config.timeouts.metadata)
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(ResumenError::Upstream {
            service: "youtube",
            reason: format!("HTTP {}", response.status()),
        });
    }

    let body: VideosResponse = response.json().await?;
    let item = body
        .items
        .into_iter()
        .next()
        .ok_or_else(|| ResumenError::Upstream {
            service: "youtube",
            reason: format!("video {video_id} not found"),
        })?;

    Ok(VideoRef {
        url: watch_url(&item.id),
        id: item.id,
        title: item.snippet.title,
        channel: item.snippet.channel,
        position: 0,
    })
}

/// Pull the video id out of the common YouTube URL forms, or accept a bare
/// id. Rejects anything that does not reduce to a well-formed id.
pub fn extract_video_id(url: &str) -> Result<String> {
    let raw = if let Some(v_param) = url.split("v=").nth(1) {
        v_param.split('&').next().unwrap_or(v_param)
    } else if let Some(short) = url.split("youtu.be/").nth(1) {
        short.split('?').next().unwrap_or(short)
    } else if let Some(shorts) = url.split("/shorts/").nth(1) {
        shorts.split('?').next().unwrap_or(shorts)
    } else if !url.contains('/') && !url.contains(':') {
        url
    } else {
        return Err(ResumenError::Validation {
            reason: format!("unrecognized YouTube URL: {url}"),
        });
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ResumenError::Validation {
            reason: "video id is empty".to_string(),
        });
    }
    if trimmed.len() > MAX_VIDEO_ID_LEN {
        return Err(ResumenError::Validation {
            reason: "video id is unexpectedly long".to_string(),
        });
    }
    if !trimmed
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'))
    {
        return Err(ResumenError::Validation {
            reason: format!("video id contains unsupported characters: {trimmed}"),
        });
    }

    Ok(trimmed.to_string())
}
