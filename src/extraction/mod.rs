// src/extraction/mod.rs

//! Answer-key recognition from images.

pub mod gemini;
pub mod parse;

use async_trait::async_trait;

use crate::error::GradingError;
use crate::grading::RawKey;

pub use gemini::GeminiKeySource;
pub use parse::parse_model_response;

/// Something that can read an answer key out of an image.
///
/// Results are best effort: entries may be missing or malformed, and the
/// caller is expected to pass whatever comes back through
/// [`crate::grading::AnswerKeyStore::ingest`].
#[async_trait]
pub trait KeySource: Send + Sync {
    async fn extract(&self, image: &[u8], mime_type: &str) -> Result<RawKey, GradingError>;
}
