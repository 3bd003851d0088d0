use std::collections::HashMap;

use tracing::warn;

use crate::{
    transcript::RawEntry,
    types::{TranscriptOrigin, TranscriptRecord, VideoRef},
};

/// Reconcile fetched transcripts with the original video list. The output is
/// always exactly one record per input video, in input order; videos without
/// a usable transcript keep their slot as an empty `Missing` record.
///
/// When any entry carries a video id, records are matched through an id map
/// and provider ordering is irrelevant. When no entry does, entries are
/// paired by list position — valid only as long as the provider preserves
/// request order, so that path is logged as a risk and marked `Positional`
/// on every record it produces.
pub fn align(videos: &[VideoRef], raw: Vec<RawEntry>) -> Vec<TranscriptRecord> {
    if raw.is_empty() {
        warn!("transcript response is empty");
        return videos
            .iter()
            .map(|video| TranscriptRecord::missing(&video.id))
            .collect();
    }

    let any_identified = raw.iter().any(|entry| entry.video_id.is_some());
    if any_identified {
        align_by_id(videos, raw)
    } else {
        align_by_position(videos, raw)
    }
}

fn align_by_id(videos: &[VideoRef], raw: Vec<RawEntry>) -> Vec<TranscriptRecord> {
    let mut by_id: HashMap<String, String> = HashMap::new();
    for entry in raw {
        match entry.video_id {
            Some(id) => {
                by_id.insert(id, entry.text);
            }
            None => warn!("discarding transcript entry without a video id in id-keyed response"),
        }
    }

    videos
        .iter()
        .map(|video| match by_id.remove(&video.id) {
            Some(text) if !text.is_empty() => TranscriptRecord {
                video_id: video.id.clone(),
                text,
                origin: TranscriptOrigin::MatchedById,
            },
            _ => {
                warn!(video_id = %video.id, title = %video.title, "no transcript for video");
                TranscriptRecord::missing(&video.id)
            }
        })
        .collect()
}

fn align_by_position(videos: &[VideoRef], raw: Vec<RawEntry>) -> Vec<TranscriptRecord> {
    warn!(
        "no transcript entry carries a video id; pairing by list position. \
         This misaligns silently if the provider reordered its response."
    );

    let mut texts = raw.into_iter().map(|entry| entry.text);
    videos
        .iter()
        .map(|video| match texts.next() {
            Some(text) if !text.is_empty() => TranscriptRecord {
                video_id: video.id.clone(),
                text,
                origin: TranscriptOrigin::Positional,
            },
            _ => {
                warn!(video_id = %video.id, title = %video.title, "no transcript for video");
                TranscriptRecord::missing(&video.id)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video(id: &str, position: usize) -> VideoRef {
        VideoRef {
            id: id.to_string(),
            url: format!("https://www.youtube.com/watch?v={id}"),
            title: format!("Video {id}"),
            channel: None,
            position,
        }
    }

    fn entry(id: Option<&str>, text: &str) -> RawEntry {
        RawEntry {
            video_id: id.map(str::to_string),
            text: text.to_string(),
        }
    }

    #[test]
    fn id_keyed_alignment_ignores_provider_order() {
        let videos = vec![video("aaa", 0), video("bbb", 1)];
        let raw = vec![entry(Some("bbb"), "second"), entry(Some("aaa"), "first")];

        let records = align(&videos, raw);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].video_id, "aaa");
        assert_eq!(records[0].text, "first");
        assert_eq!(records[1].video_id, "bbb");
        assert_eq!(records[1].text, "second");
        assert!(records
            .iter()
            .all(|r| r.origin == TranscriptOrigin::MatchedById));
    }

    #[test]
    fn id_miss_keeps_slot_as_missing() {
        let videos = vec![video("aaa", 0), video("bbb", 1), video("ccc", 2)];
        let raw = vec![entry(Some("ccc"), "third"), entry(Some("aaa"), "first")];

        let records = align(&videos, raw);
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].origin, TranscriptOrigin::MatchedById);
        assert_eq!(records[1].origin, TranscriptOrigin::Missing);
        assert_eq!(records[1].text, "");
        assert_eq!(records[2].origin, TranscriptOrigin::MatchedById);
    }

    #[test]
    fn positional_fallback_pairs_in_order() {
        let videos = vec![video("aaa", 0), video("bbb", 1)];
        let raw = vec![entry(None, "first"), entry(None, "second")];

        let records = align(&videos, raw);
        assert_eq!(records[0].text, "first");
        assert_eq!(records[1].text, "second");
        assert!(records
            .iter()
            .all(|r| r.origin == TranscriptOrigin::Positional));
    }

    #[test]
    fn positional_fallback_pads_short_responses() {
        let videos = vec![video("aaa", 0), video("bbb", 1), video("ccc", 2)];
        let raw = vec![entry(None, "first")];

        let records = align(&videos, raw);
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].origin, TranscriptOrigin::Positional);
        assert_eq!(records[1].origin, TranscriptOrigin::Missing);
        assert_eq!(records[2].origin, TranscriptOrigin::Missing);
    }

    #[test]
    fn single_identified_entry_forces_id_path() {
        // One id is enough to distrust positional pairing.
        let videos = vec![video("aaa", 0), video("bbb", 1)];
        let raw = vec![entry(None, "orphan"), entry(Some("bbb"), "second")];

        let records = align(&videos, raw);
        assert_eq!(records[0].origin, TranscriptOrigin::Missing);
        assert_eq!(records[1].text, "second");
        assert_eq!(records[1].origin, TranscriptOrigin::MatchedById);
    }

    #[test]
    fn empty_response_yields_all_missing() {
        let videos = vec![video("aaa", 0), video("bbb", 1)];
        let records = align(&videos, Vec::new());
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.is_missing()));
    }
}
