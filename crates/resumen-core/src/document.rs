use html_escape::encode_text;

use crate::types::{Document, DocumentSection, SummaryResult, TranscriptRecord, VideoRef};

/// Build the digest document from per-video results. Sections keep the
/// source-list order; inputs are expected index-aligned (the alignment
/// resolver guarantees this for transcripts, the summarizer for summaries).
pub fn assemble(
    title: &str,
    videos: Vec<VideoRef>,
    summaries: Vec<SummaryResult>,
    transcripts: Vec<TranscriptRecord>,
) -> Document {
    let sections = videos
        .into_iter()
        .zip(summaries)
        .zip(transcripts)
        .map(|((video, summary), transcript)| DocumentSection {
            video,
            summary,
            transcript,
        })
        .collect();

    Document {
        title: title.to_string(),
        sections,
    }
}

impl Document {
    /// Render the document as a single HTML string. Pure: identical input
    /// renders byte-identical output, and sections appear in input order.
    ///
    /// Three detail levels: each video's summary fragment carries the
    /// executive and detailed levels, and the full transcript below it is
    /// the third.
    pub fn render_html(&self) -> String {
        let mut html = String::new();
        html.push_str(&format!("<h1>{}</h1>\n", encode_text(&self.title)));
        html.push_str(&format!(
            "<p><i>Digest of {} video{}. Each section carries a two-level summary; \
             the full transcript follows it for searching specific details.</i></p>\n",
            self.sections.len(),
            if self.sections.len() == 1 { "" } else { "s" },
        ));

        for section in &self.sections {
            let number = section.video.position + 1;
            html.push_str("<hr>\n");
            html.push_str(&format!(
                "<h2>Video {number}: {}</h2>\n",
                encode_text(&section.video.title)
            ));
            if let Some(channel) = &section.video.channel {
                html.push_str(&format!("<p><i>{}</i></p>\n", encode_text(channel)));
            }

            match &section.summary.error {
                None => {
                    html.push_str(&section.summary.html_fragment);
                    html.push('\n');
                }
                Some(error) => {
                    html.push_str(&format!(
                        "<p><b>⚠ Summary unavailable for this video:</b> {}</p>\n",
                        encode_text(&error.to_string())
                    ));
                }
            }

            html.push_str("<h3>LEVEL 3: Full Transcript</h3>\n");
            if section.transcript.is_missing() {
                html.push_str("<p><i>No transcript was available for this video.</i></p>\n");
            } else {
                html.push_str(&format!(
                    "<div style=\"background-color: #f5f5f5; padding: 10px; border-left: 3px solid #ccc;\">\n{}\n</div>\n",
                    encode_text(&section.transcript.text)
                ));
            }
        }

        html
    }
}
