//! Contracts for the external linguistic collaborators.
//!
//! The engine consumes three black-box capabilities: annotation (tokens, POS
//! tags, entities), constituency parsing, and discourse-relation
//! classification. Each is a trait with a zero-sized default so the engine
//! runs end to end without any toolchain attached: [`WhitespaceAnnotator`]
//! produces a coarse annotation, [`NoopParser`] makes every sentence
//! non-compressible, and [`NoopClassifier`] treats every pair as unrelated.
//!
//! # Contract
//!
//! Collaborator failures are reported through `Result`, never panics. The
//! caller absorbs them: a failed annotation drops one document, a failed
//! parse skips one compression, a failed classification skips one
//! connective.

pub mod tree;

use crate::error::{Result, SummarizerError};
use crate::types::{PosTag, RawDocument, Sentence};

pub use tree::{ConstituencyTree, RemovableKind, SubTreeId, TreeNode};

// ============================================================================
// Annotation
// ============================================================================

/// One annotated token as produced by the external toolchain.
#[derive(Debug, Clone)]
pub struct AnnotatedToken {
    pub surface: String,
    /// Empty when the annotator has no lemma for the token.
    pub lemma: String,
    pub pos: PosTag,
}

impl AnnotatedToken {
    pub fn new(surface: &str, lemma: &str, pos: PosTag) -> Self {
        AnnotatedToken {
            surface: surface.to_string(),
            lemma: lemma.to_string(),
            pos,
        }
    }
}

/// One annotated sentence: its text, tokens, and entity spans.
#[derive(Debug, Clone, Default)]
pub struct AnnotatedSentence {
    pub text: String,
    pub tokens: Vec<AnnotatedToken>,
    /// Named-entity spans as half-open token index ranges.
    pub entities: Vec<(usize, usize)>,
}

/// Tokenization, tagging, and NER for one document.
///
/// Implementations must be `Sync`: documents are annotated from a worker
/// batch.
pub trait Annotator: Sync {
    fn annotate(&self, document: &RawDocument) -> Result<Vec<AnnotatedSentence>>;
}

/// Fallback annotator: sentence boundaries at `.`/`!`/`?`, whitespace
/// tokens, no lemmas, no entities. Alphabetic tokens are tagged as nouns so
/// keyword extraction has candidates; real deployments plug a tagger here.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhitespaceAnnotator;

impl Annotator for WhitespaceAnnotator {
    fn annotate(&self, document: &RawDocument) -> Result<Vec<AnnotatedSentence>> {
        Ok(split_sentences(&document.body)
            .into_iter()
            .map(|text| AnnotatedSentence {
                tokens: tokenize(&text),
                text,
                entities: Vec::new(),
            })
            .collect())
    }
}

fn split_sentences(body: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    for ch in body.chars() {
        current.push(ch);
        if matches!(ch, '.' | '!' | '?') {
            let trimmed = current.trim();
            if !trimmed.is_empty() {
                out.push(trimmed.to_string());
            }
            current.clear();
        }
    }
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        out.push(trimmed.to_string());
    }
    out
}

fn tokenize(sentence: &str) -> Vec<AnnotatedToken> {
    let mut tokens = Vec::new();
    for raw in sentence.split_whitespace() {
        let trailing: String = raw
            .chars()
            .rev()
            .take_while(|c| is_clause_punctuation(*c))
            .collect();
        let core = &raw[..raw.len() - trailing.len()];
        if !core.is_empty() {
            tokens.push(AnnotatedToken::new(core, "", classify(core)));
        }
        for p in trailing.chars().rev() {
            tokens.push(AnnotatedToken::new(&p.to_string(), "", PosTag::Punctuation));
        }
    }
    tokens
}

fn is_clause_punctuation(c: char) -> bool {
    matches!(c, '.' | ',' | ';' | ':' | '!' | '?')
}

fn classify(token: &str) -> PosTag {
    if token.chars().all(|c| c.is_ascii_digit()) {
        PosTag::Numeral
    } else if token.chars().all(|c| !c.is_alphanumeric()) {
        PosTag::Punctuation
    } else {
        PosTag::Noun
    }
}

// ============================================================================
// Parsing
// ============================================================================

/// Constituency parsing plus the two tree queries the compression search
/// needs. `removable` and `prune` default to the [`ConstituencyTree`]
/// implementations; parsers with their own tree backend override them.
pub trait ConstituencyParser {
    /// Parse one sentence. `None` means the sentence is non-compressible.
    fn parse(&self, sentence: &Sentence) -> Option<ConstituencyTree>;

    /// Handles of every removable constituent in the tree.
    fn removable(&self, tree: &ConstituencyTree) -> Vec<SubTreeId> {
        tree.removable().into_iter().map(|(id, _)| id).collect()
    }

    /// The tree with exactly the given sub-trees pruned, or `None` when the
    /// prune fails or nothing survives.
    fn prune(&self, tree: &ConstituencyTree, remove: &[SubTreeId]) -> Option<ConstituencyTree> {
        tree.prune(remove)
    }
}

/// Parser stub: never parses, so compression keeps every sentence unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopParser;

impl ConstituencyParser for NoopParser {
    fn parse(&self, _sentence: &Sentence) -> Option<ConstituencyTree> {
        None
    }
}

// ============================================================================
// Discourse classification
// ============================================================================

/// Discourse-relation classification over adjacent sentence pairs.
pub trait DiscourseClassifier {
    /// Binary related/unrelated decision.
    fn is_related(&self, previous: &Sentence, current: &Sentence) -> Result<bool>;

    /// Relation subtype label (e.g. `"contrast"`, `"cause"`). Only called
    /// for related pairs.
    fn classify(&self, previous: &Sentence, current: &Sentence) -> Result<String>;

    /// Whether the relation holds in inverted orientation.
    fn is_inverted(&self, previous: &Sentence, current: &Sentence) -> Result<bool>;
}

/// Classifier stub: every pair is unrelated, so no connectives are inserted.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopClassifier;

impl DiscourseClassifier for NoopClassifier {
    fn is_related(&self, _previous: &Sentence, _current: &Sentence) -> Result<bool> {
        Ok(false)
    }

    fn classify(&self, _previous: &Sentence, _current: &Sentence) -> Result<String> {
        Err(SummarizerError::Classifier(
            "no classifier attached".to_string(),
        ))
    }

    fn is_inverted(&self, _previous: &Sentence, _current: &Sentence) -> Result<bool> {
        Ok(false)
    }
}
