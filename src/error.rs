//! Error taxonomy.
//!
//! Every failure mode in the engine is locally absorbed: annotation failures
//! drop one document, parse failures skip compression for one sentence,
//! classifier failures skip one connective. A partial, slightly degraded
//! summary is always preferable to no summary, so the only fatal error is
//! having nothing to summarize at all.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SummarizerError {
    /// External annotation failed for one document. The document is excluded
    /// and totals recompute from the remaining documents.
    #[error("annotation failed for document `{document}`: {reason}")]
    Annotation { document: String, reason: String },

    /// Discourse classification failed. The sentence pair is treated as
    /// unrelated and no connective is inserted.
    #[error("discourse classification failed: {0}")]
    Classifier(String),

    /// No documents survived annotation, or none were provided.
    #[error("no documents to summarize")]
    EmptyInput,
}

pub type Result<T> = std::result::Result<T, SummarizerError>;
