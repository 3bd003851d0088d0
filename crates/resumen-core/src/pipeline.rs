use chrono::Local;
use reqwest::Client;
use tracing::{Instrument, info, info_span};
use uuid::Uuid;

use crate::{
    align,
    config::Config,
    document,
    error::{ResumenError, Result},
    notify::{Notify, NullChannel, PushoverChannel, TelegramChannel},
    readwise, source, summarize, transcript,
    types::{SaveConfirmation, VideoRef},
};

/// Whether a run reports every phase to its notification channel, or only
/// the start and the outcome. Single-video runs came in through a chat
/// conversation that expects progress; batch runs get one push at the end.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Progress {
    Quiet,
    PerPhase,
}

/// The run orchestrator. One instance is cheap and stateless across runs;
/// each run is a single sequential unit of work with no internal
/// parallelism and no resumption after a failure.
pub struct Pipeline {
    client: Client,
    config: Config,
}

impl Pipeline {
    pub fn new(config: Config) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("resumen/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Process the configured playlist end to end: resolve videos, fetch
    /// and align transcripts, summarize each video, assemble the digest and
    /// save it. Sends a phone push at start and on the outcome; on failure
    /// the error is returned to the caller after the notification.
    pub async fn run_batch(&self) -> Result<SaveConfirmation> {
        let run_id = Uuid::new_v4();
        let span = info_span!("batch_run", %run_id);

        let notifier: Box<dyn Notify> =
            match PushoverChannel::from_config(&self.client, &self.config) {
                Some(channel) => Box::new(channel),
                None => Box::new(NullChannel),
            };

        notifier.send("🚀 Starting video digest run...").await;

        let result = async {
            let videos = source::playlist_videos(&self.client, &self.config).await?;
            let title = format!("Video Resumen - {}", Local::now().format("%Y-%m-%d"));
            let source_url = self.config.playlist_url();
            self.execute(videos, notifier.as_ref(), Progress::Quiet, title, source_url)
                .await
        }
        .instrument(span)
        .await;

        match result {
            Ok(confirmation) => {
                notifier
                    .send("✅ Video digest completed and saved to Readwise!")
                    .await;
                Ok(confirmation)
            }
            Err(err) => {
                notifier.send(&format!("❌ Error in digest run: {err}")).await;
                Err(err)
            }
        }
    }

    /// Process one ad-hoc video submitted from a chat conversation,
    /// replying to `chat_id` as each phase completes. The URL is validated
    /// before any network call.
    pub async fn run_single(&self, video_url: &str, chat_id: &str) -> Result<SaveConfirmation> {
        let run_id = Uuid::new_v4();
        let span = info_span!("single_run", %run_id);

        let notifier: Box<dyn Notify> =
            match TelegramChannel::from_config(&self.client, &self.config, chat_id) {
                Some(channel) => Box::new(channel),
                None => Box::new(NullChannel),
            };

        let result = async {
            let video = source::single_video(&self.client, &self.config, video_url).await?;
            notifier
                .send(&format!("📹 Processing: {}", video.title))
                .await;
            let title = format!("Video Resumen - {}", video.title);
            let source_url = video.url.clone();
            self.execute(
                vec![video],
                notifier.as_ref(),
                Progress::PerPhase,
                title,
                source_url,
            )
            .await
        }
        .instrument(span)
        .await;

        match result {
            Ok(confirmation) => {
                notifier
                    .send("✅ Done! The summary is in your read-later queue.")
                    .await;
                Ok(confirmation)
            }
            Err(err) => {
                notifier
                    .send(&format!("❌ Error processing video: {err}"))
                    .await;
                Err(err)
            }
        }
    }

    /// The shared phase sequence. Any error unwinds to the caller, which
    /// owns the failure notification.
    async fn execute(
        &self,
        videos: Vec<VideoRef>,
        notifier: &dyn Notify,
        progress: Progress,
        title: String,
        source_url: String,
    ) -> Result<SaveConfirmation> {
        info!(videos = videos.len(), "starting pipeline run");

        if progress == Progress::PerPhase {
            notifier.send("📝 Fetching the transcript...").await;
        }
        let video_urls: Vec<String> = videos.iter().map(|video| video.url.clone()).collect();
        let raw = transcript::fetch_transcripts(&self.client, &self.config, &video_urls).await?;
        let records = align::align(&videos, raw);

        if progress == Progress::PerPhase {
            notifier.send("🤖 Generating the summary...").await;
        }
        let summaries =
            summarize::summarize_batch(&self.client, &self.config, &videos, &records).await;

        // Per-video failures become visible markers in the document, but a
        // run where nothing was summarized has nothing worth saving.
        if summaries.iter().all(|summary| summary.error.is_some()) {
            return Err(summaries
                .into_iter()
                .find_map(|summary| summary.error)
                .unwrap_or_else(|| ResumenError::Upstream {
                    service: "summary provider",
                    reason: "no videos to summarize".to_string(),
                }));
        }

        let document = document::assemble(&title, videos, summaries, records);
        let html = document.render_html();

        if progress == Progress::PerPhase {
            notifier.send("💾 Saving to your read-later queue...").await;
        }
        readwise::save_document(&self.client, &self.config, &html, &document.title, &source_url)
            .await
    }
}
