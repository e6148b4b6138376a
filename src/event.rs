use std::path::PathBuf;

/// The single payload shape a responder task delivers back to the frame loop.
///
/// `ImageFound` always names a locally materialized file; the textual
/// variants never carry a path, so the channel contract holds by
/// construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultEnvelope {
    /// A regular answer from the local or remote responder.
    Text(String),
    /// A side-effect report, e.g. "opened your browser for this query".
    Notice(String),
    /// An image search hit that was downloaded to disk.
    ImageFound { caption: String, path: PathBuf },
}

impl ResultEnvelope {
    /// Text worth speaking aloud, if any.
    pub fn spoken_text(&self) -> Option<&str> {
        match self {
            ResultEnvelope::Text(text) | ResultEnvelope::Notice(text) => Some(text),
            ResultEnvelope::ImageFound { caption, .. } => Some(caption),
        }
    }
}
