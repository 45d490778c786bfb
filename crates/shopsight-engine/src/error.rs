use thiserror::Error;

/// Failures that end an extraction run.
///
/// Strategy-level and per-source discovery failures never surface here; they
/// are absorbed and logged where they happen. Only malformed input and an
/// unreachable primary page are fatal. `Extraction` covers the remaining
/// unexpected paths after a successful fetch and indicates a defect rather
/// than bad storefront data.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid storefront URL: {url}")]
    InvalidUrl { url: String },

    #[error("storefront unreachable after all fetch strategies: {url}")]
    Unreachable { url: String },

    #[error("extraction failed for {url}: {reason}")]
    Extraction { url: String, reason: String },
}
