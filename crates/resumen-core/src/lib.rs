//! Resumen Core Library
//!
//! Core functionality for turning YouTube playlists and single videos into
//! AI-generated summary documents saved to a read-later queue, with optional
//! push/chat notifications along the way.

pub mod align;
pub mod config;
pub mod document;
pub mod error;
pub mod notify;
pub mod pipeline;
pub mod readwise;
pub mod source;
pub mod summarize;
pub mod transcript;
pub mod types;

// Re-export commonly used items at crate root
pub use align::align;
pub use config::{Config, Endpoints, RetryPolicy, Timeouts};
pub use document::assemble;
pub use error::{ResumenError, Result};
pub use pipeline::Pipeline;
pub use types::{
    Document, SaveConfirmation, SummaryResult, TranscriptOrigin, TranscriptRecord, VideoRef,
};
