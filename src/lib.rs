//! Extractive multi-document summarization.
//!
//! The engine condenses a document collection into a paragraph-structured
//! summary in five phases: preprocess the inputs, annotate them into a
//! scored corpus, cluster away redundancy and group by keyword, fill a word
//! budget with the best-ranked sentences (compressing each one), and polish
//! the presentation.
//!
//! Linguistic heavy lifting — tokenization, constituency parsing, discourse
//! classification — is delegated to external collaborators behind the traits
//! in [`external`]. The bundled defaults let the engine run end to end with
//! no toolchain attached.
//!
//! ```
//! use rapid_condense::{summarize, RawDocument, SummarizerConfig};
//!
//! let documents = vec![
//!     RawDocument::new("noticia-1", "O gato cinzento caçou o rato pequeno no quintal."),
//!     RawDocument::new("noticia-2", "O rato pequeno fugiu do gato cinzento pela parede."),
//! ];
//! let config = SummarizerConfig::default()
//!     .with_min_sentence_words(3)
//!     .with_compression_rate(0.5);
//! let summary = summarize(documents, config).unwrap();
//! println!("{}", summary.to_text());
//! ```

pub mod assemble;
pub mod cluster;
pub mod compress;
pub mod error;
pub mod external;
pub mod keywords;
pub mod nlp;
pub mod pipeline;
pub mod scoring;
pub mod similarity;
pub mod types;

pub use error::{Result, SummarizerError};
pub use pipeline::{NoopObserver, PhaseObserver, PhaseTimingObserver, Summarizer};
pub use types::{Document, Paragraph, RawDocument, Sentence, Summary, SummarizerConfig, Word};

/// Summarize a document collection with the default collaborators and no
/// observer attached.
pub fn summarize(
    documents: Vec<RawDocument>,
    config: SummarizerConfig,
) -> Result<Summary> {
    Summarizer::new(config).run(documents, &mut NoopObserver)
}
