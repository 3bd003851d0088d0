use crate::error::ResumenError;

/// A video as resolved from the source playlist or a caller-supplied URL.
/// `position` is the index in the source list; downstream records refer back
/// to a `VideoRef` by `id` only.
#[derive(Debug, Clone)]
pub struct VideoRef {
    pub id: String,
    pub url: String,
    pub title: String,
    pub channel: Option<String>,
    pub position: usize,
}

/// How a transcript ended up attached to its video.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscriptOrigin {
    /// The provider entry carried the video's id.
    MatchedById,
    /// Paired by list position; only trustworthy if the provider preserves
    /// request order.
    Positional,
    /// No transcript came back for this video.
    Missing,
}

/// One transcript, aligned 1:1 with the input video list. Missing
/// transcripts keep their slot with empty text so positions stay stable.
#[derive(Debug, Clone)]
pub struct TranscriptRecord {
    pub video_id: String,
    pub text: String,
    pub origin: TranscriptOrigin,
}

impl TranscriptRecord {
    pub fn missing(video_id: &str) -> Self {
        Self {
            video_id: video_id.to_string(),
            text: String::new(),
            origin: TranscriptOrigin::Missing,
        }
    }

    pub fn is_missing(&self) -> bool {
        self.origin == TranscriptOrigin::Missing
    }
}

/// Outcome of summarizing one video. A failed summary keeps its slot so the
/// document can render a visible failure marker for that section.
#[derive(Debug)]
pub struct SummaryResult {
    pub video_id: String,
    pub html_fragment: String,
    pub error: Option<ResumenError>,
}

impl SummaryResult {
    pub fn ok(video_id: &str, html_fragment: String) -> Self {
        Self {
            video_id: video_id.to_string(),
            html_fragment,
            error: None,
        }
    }

    pub fn failed(video_id: &str, error: ResumenError) -> Self {
        Self {
            video_id: video_id.to_string(),
            html_fragment: String::new(),
            error: Some(error),
        }
    }
}

/// One per-video section of the assembled document, in source-list order.
#[derive(Debug)]
pub struct DocumentSection {
    pub video: VideoRef,
    pub summary: SummaryResult,
    pub transcript: TranscriptRecord,
}

/// The assembled digest, built once per run and handed to the persistence
/// sink. Rendering is pure; see `document::Document::render_html`.
#[derive(Debug)]
pub struct Document {
    pub title: String,
    pub sections: Vec<DocumentSection>,
}

/// Opaque confirmation returned by the persistence sink.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct SaveConfirmation {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub url: Option<String>,
}
