//! Core data model: words, sentences, documents, and the engine configuration.
//!
//! Words are a sum type over single tokens and named entities; both expose the
//! same scoring and representation-matching capabilities. Sentences own their
//! words exclusively — compression builds new sentences, it never rewires word
//! ownership across sentences.

use serde::{Deserialize, Serialize};

use crate::external::tree::ConstituencyTree;

// ============================================================================
// Part-of-speech tags
// ============================================================================

/// Coarse part-of-speech tag attached by the external annotator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PosTag {
    Noun,
    ProperNoun,
    Verb,
    Adjective,
    Adverb,
    Determiner,
    Preposition,
    Pronoun,
    Conjunction,
    Numeral,
    Punctuation,
    Other,
}

impl PosTag {
    /// Open-class content words eligible as keywords and counted as
    /// "relevant" in sentence properties.
    pub fn is_relevant(&self) -> bool {
        matches!(self, PosTag::Noun | PosTag::ProperNoun)
    }

    pub fn is_punctuation(&self) -> bool {
        matches!(self, PosTag::Punctuation)
    }
}

// ============================================================================
// Words
// ============================================================================

/// A single annotated token.
#[derive(Debug, Clone, PartialEq)]
pub struct SingleToken {
    /// Surface form as written in the source document.
    pub surface: String,
    /// Normalized (lowercased) token text.
    pub term: String,
    /// Lemma provided by the annotator; may be empty when unknown.
    pub lemma: String,
    pub pos: PosTag,
    pub doc_id: usize,
    pub sentence_id: usize,
    /// Zero-based position within the owning sentence.
    pub position: usize,
    /// Lemma-aware occurrence count within the owning document.
    pub occurrences: usize,
    /// Term frequency. Never exactly zero: an unobserved count is coerced
    /// to one occurrence before division.
    pub frequency: f64,
    pub tfidf: f64,
    pub extra_score: f64,
}

impl SingleToken {
    pub fn new(
        surface: &str,
        lemma: &str,
        pos: PosTag,
        doc_id: usize,
        sentence_id: usize,
        position: usize,
    ) -> Self {
        SingleToken {
            surface: surface.to_string(),
            term: surface.to_lowercase(),
            lemma: lemma.to_string(),
            pos,
            doc_id,
            sentence_id,
            position,
            occurrences: 0,
            frequency: 0.0,
            tfidf: 0.0,
            extra_score: 0.0,
        }
    }

    /// The canonical string used for lemma-aware grouping: the lemma when the
    /// annotator produced one, otherwise the normalized term.
    pub fn representation(&self) -> &str {
        if self.lemma.is_empty() {
            &self.term
        } else {
            &self.lemma
        }
    }

    /// Lexical equivalence used by similarity, TF counting, and keyword
    /// matching. Checks, in order: lemma equality, normalized term equality,
    /// surface equality — all case-insensitive.
    pub fn represents(&self, other: &SingleToken) -> bool {
        if !self.lemma.is_empty()
            && !other.lemma.is_empty()
            && self.lemma.eq_ignore_ascii_case(&other.lemma)
        {
            return true;
        }
        self.term == other.term || self.surface.eq_ignore_ascii_case(&other.surface)
    }

    /// Record the in-document occurrence count and derive the term frequency.
    /// A zero count is coerced to one so later ratios never divide by zero.
    pub fn set_occurrences(&mut self, occurrences: usize, doc_total_words: usize) {
        self.occurrences = occurrences.max(1);
        let total = doc_total_words.max(1);
        self.frequency = self.occurrences as f64 / total as f64;
    }

    pub fn score(&self) -> f64 {
        self.tfidf + self.extra_score
    }
}

/// A named entity: an ordered, non-empty run of tokens treated as one word.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedEntity {
    pub tokens: Vec<SingleToken>,
    /// Joined surface form, precomputed at construction.
    pub surface: String,
}

impl NamedEntity {
    pub fn new(tokens: Vec<SingleToken>) -> Self {
        debug_assert!(!tokens.is_empty(), "named entity needs at least one token");
        let surface = tokens
            .iter()
            .map(|t| t.surface.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        NamedEntity { tokens, surface }
    }

    /// Mean of the member token scores.
    pub fn score(&self) -> f64 {
        if self.tokens.is_empty() {
            return 0.0;
        }
        self.tokens.iter().map(|t| t.score()).sum::<f64>() / self.tokens.len() as f64
    }

    pub fn represents_token(&self, token: &SingleToken) -> bool {
        self.tokens.iter().any(|t| t.represents(token))
    }
}

/// A word in a sentence: either one token or a named entity.
#[derive(Debug, Clone, PartialEq)]
pub enum Word {
    Single(SingleToken),
    Entity(NamedEntity),
}

impl Word {
    pub fn surface(&self) -> &str {
        match self {
            Word::Single(t) => &t.surface,
            Word::Entity(e) => &e.surface,
        }
    }

    pub fn score(&self) -> f64 {
        match self {
            Word::Single(t) => t.score(),
            Word::Entity(e) => e.score(),
        }
    }

    /// Lexical equivalence against a single token. An entity matches when any
    /// of its member tokens does.
    pub fn represents_token(&self, token: &SingleToken) -> bool {
        match self {
            Word::Single(t) => t.represents(token),
            Word::Entity(e) => e.represents_token(token),
        }
    }

    /// Symmetric lexical equivalence between two words.
    pub fn represents(&self, other: &Word) -> bool {
        match other {
            Word::Single(t) => self.represents_token(t),
            Word::Entity(e) => e.tokens.iter().any(|t| self.represents_token(t)),
        }
    }

    /// Open-class content word. Entities always count as relevant.
    pub fn is_relevant(&self) -> bool {
        match self {
            Word::Single(t) => t.pos.is_relevant(),
            Word::Entity(_) => true,
        }
    }

    pub fn is_punctuation(&self) -> bool {
        match self {
            Word::Single(t) => t.pos.is_punctuation(),
            Word::Entity(_) => false,
        }
    }

    pub fn as_single(&self) -> Option<&SingleToken> {
        match self {
            Word::Single(t) => Some(t),
            Word::Entity(_) => None,
        }
    }
}

// ============================================================================
// Sentences
// ============================================================================

/// A sentence plus every score the engine attaches to it.
///
/// Content (text, words, tree) is fixed after construction; the score fields
/// are filled in by the scoring pass and the clusterers. Compression never
/// mutates a sentence — it builds a rescored copy with fewer words.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sentence {
    pub doc_id: usize,
    /// One-based position within the owning document.
    pub absolute_position: usize,
    pub text: String,
    pub words: Vec<Word>,
    pub tree: Option<ConstituencyTree>,

    // -- scoring fields -----------------------------------------------------
    /// Mean word score (tfidf + extra per word).
    pub score: f64,
    pub extra_score: f64,
    /// Score carried by a compression candidate at build time.
    pub simplification_score: f64,
    /// Mean term frequency over single tokens.
    pub frequency: f64,
    pub keyword_cluster_score: f64,
    pub similarity_cluster_score: f64,
    pub number_of_keywords: usize,
    pub keyword_ratio: f64,
    pub keyword_avg_score: f64,
    pub number_of_entities: usize,
    pub entity_ratio: f64,
    pub entity_avg_score: f64,
    pub relevant_words: usize,
    pub relevant_ratio: f64,
    /// Document sentence count divided by this sentence's absolute position.
    pub relative_position: f64,
    pub relative_position_ratio: f64,
    /// Mean relative position over the similarity cluster this sentence
    /// belonged to.
    pub avg_position_sim_cluster: f64,
    pub sim_cluster_size: usize,

    // -- flags and keys -----------------------------------------------------
    pub is_title: bool,
    pub is_subsentence: bool,
    pub has_connective: bool,
    /// Representation of the keyword cluster this sentence was assigned to.
    pub keyword_key: Option<String>,
}

impl Sentence {
    pub fn new(doc_id: usize, absolute_position: usize, text: &str, words: Vec<Word>) -> Self {
        Sentence {
            doc_id,
            absolute_position,
            text: text.to_string(),
            words,
            ..Sentence::default()
        }
    }

    /// A synthetic paragraph-title sentence. Titles carry no words and are
    /// skipped by connective insertion and punctuation correction.
    pub fn title(text: &str) -> Self {
        Sentence {
            text: text.to_string(),
            is_title: true,
            ..Sentence::default()
        }
    }

    /// Word count, always derived from the current word sequence.
    pub fn total_words(&self) -> usize {
        self.words.len()
    }

    /// The single ranking key used everywhere sentences are ordered.
    pub fn complete_score(&self) -> f64 {
        self.score + self.extra_score
    }

    pub fn single_tokens(&self) -> impl Iterator<Item = &SingleToken> {
        self.words.iter().filter_map(|w| w.as_single())
    }

    /// Sentences at or below the minimum length are never summary candidates.
    pub fn is_short(&self, min_words: usize) -> bool {
        self.total_words() <= min_words
    }

    /// Join word surfaces into display text. Used when a sentence is rebuilt
    /// from a pruned parse tree.
    pub fn render_text(words: &[Word]) -> String {
        words
            .iter()
            .map(|w| w.surface())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Prepend a discourse connective, lowercasing the old sentence start.
    pub fn prepend_connective(&mut self, connective: &str) {
        let mut chars = self.text.chars();
        let rest = match chars.next() {
            Some(first) => format!("{}{}", first.to_lowercase(), chars.as_str()),
            None => String::new(),
        };
        self.text = format!("{} {}", connective, rest);
        self.has_connective = true;
    }
}

// ============================================================================
// Documents and summaries
// ============================================================================

/// An unannotated input document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawDocument {
    pub name: String,
    pub body: String,
}

impl RawDocument {
    pub fn new(name: &str, body: &str) -> Self {
        RawDocument {
            name: name.to_string(),
            body: body.to_string(),
        }
    }
}

/// An annotated document: the ordered sentence sequence plus identity.
#[derive(Debug, Clone, Default)]
pub struct Document {
    pub id: usize,
    pub name: String,
    pub sentences: Vec<Sentence>,
}

impl Document {
    pub fn total_sentences(&self) -> usize {
        self.sentences.len()
    }

    pub fn total_words(&self) -> usize {
        self.sentences.iter().map(|s| s.total_words()).sum()
    }

    pub fn total_entities(&self) -> usize {
        self.sentences
            .iter()
            .map(|s| {
                s.words
                    .iter()
                    .filter(|w| matches!(w, Word::Entity(_)))
                    .count()
            })
            .sum()
    }
}

/// One output paragraph: an optional keyword title plus its member sentences.
#[derive(Debug, Clone, Default)]
pub struct Paragraph {
    pub keyword: Option<String>,
    pub title: Option<Sentence>,
    pub sentences: Vec<Sentence>,
}

impl Paragraph {
    pub fn total_words(&self) -> usize {
        self.sentences.iter().map(|s| s.total_words()).sum()
    }
}

/// The final summary: ordered paragraphs.
#[derive(Debug, Clone, Default)]
pub struct Summary {
    pub paragraphs: Vec<Paragraph>,
}

impl Summary {
    pub fn total_words(&self) -> usize {
        self.paragraphs.iter().map(|p| p.total_words()).sum()
    }

    /// All sentences in reading order, titles included.
    pub fn sentences(&self) -> impl Iterator<Item = &Sentence> {
        self.paragraphs
            .iter()
            .flat_map(|p| p.title.iter().chain(p.sentences.iter()))
    }

    /// Render the summary as plain text, one paragraph per block.
    pub fn to_text(&self) -> String {
        self.paragraphs
            .iter()
            .map(|p| {
                let mut lines = Vec::new();
                if let Some(title) = &p.title {
                    lines.push(title.text.clone());
                }
                lines.extend(p.sentences.iter().map(|s| s.text.clone()));
                lines.join(" ")
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// Engine configuration with hand-tuned defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarizerConfig {
    /// Stopword language for keyword extraction.
    pub language: String,
    /// Fraction of the corpus word count allowed into the summary.
    pub compression_rate: f64,
    /// Similarity clustering threshold, compared against 2-decimal-rounded
    /// similarity values.
    pub similarity_threshold: f64,
    /// Bonus applied to cluster centroids; also the unassigned-sentence
    /// penalty unit.
    pub extra_score_bonus: f64,
    /// Bonus added to extracted keyword copies.
    pub keyword_bonus: f64,
    /// Sentences with at most this many words are not summary candidates.
    pub min_sentence_words: usize,
    /// Annotation worker cap; each batch is awaited synchronously.
    pub max_workers: usize,
    /// Bound on connective selection attempts per sentence pair.
    pub max_connective_retries: usize,
    /// Cap on the removable constituents considered by the power-set search.
    pub max_removable: usize,
    /// Overrides the derived keyword cap when set.
    pub max_keywords: Option<usize>,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        SummarizerConfig {
            language: "pt".to_string(),
            compression_rate: 0.2,
            similarity_threshold: 0.75,
            extra_score_bonus: 0.5,
            keyword_bonus: 0.5,
            min_sentence_words: 15,
            max_workers: 7,
            max_connective_retries: 5,
            max_removable: 12,
            max_keywords: None,
        }
    }
}

impl SummarizerConfig {
    pub fn with_language(mut self, language: &str) -> Self {
        self.language = language.to_string();
        self
    }

    pub fn with_compression_rate(mut self, rate: f64) -> Self {
        self.compression_rate = rate;
        self
    }

    pub fn with_similarity_threshold(mut self, threshold: f64) -> Self {
        self.similarity_threshold = threshold;
        self
    }

    pub fn with_min_sentence_words(mut self, min_words: usize) -> Self {
        self.min_sentence_words = min_words;
        self
    }

    pub fn with_max_workers(mut self, workers: usize) -> Self {
        self.max_workers = workers.max(1);
        self
    }

    pub fn with_max_keywords(mut self, cap: usize) -> Self {
        self.max_keywords = Some(cap);
        self
    }

    pub fn with_max_removable(mut self, cap: usize) -> Self {
        self.max_removable = cap;
        self
    }

    /// Word budget for the summary: `round(total_words * compression_rate)`.
    pub fn compression_budget(&self, total_words: usize) -> usize {
        (total_words as f64 * self.compression_rate).round() as usize
    }

    /// Keyword cap: the configured override, or
    /// `round(sqrt(total_words / 2))`.
    pub fn keyword_cap(&self, total_words: usize) -> usize {
        match self.max_keywords {
            Some(cap) => cap,
            None => (total_words as f64 / 2.0).sqrt().round() as usize,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn token(surface: &str, lemma: &str, pos: PosTag, position: usize) -> SingleToken {
        SingleToken::new(surface, lemma, pos, 0, 0, position)
    }

    #[test]
    fn test_represents_by_lemma() {
        let a = token("caçou", "caçar", PosTag::Verb, 2);
        let b = token("caçado", "caçar", PosTag::Verb, 3);
        assert!(a.represents(&b));
        assert!(b.represents(&a));
    }

    #[test]
    fn test_represents_by_surface_when_lemma_missing() {
        let a = token("Gato", "", PosTag::Noun, 0);
        let b = token("gato", "", PosTag::Noun, 4);
        assert!(a.represents(&b));
    }

    #[test]
    fn test_represents_rejects_different_words() {
        let a = token("gato", "gato", PosTag::Noun, 0);
        let b = token("rato", "rato", PosTag::Noun, 0);
        assert!(!a.represents(&b));
    }

    #[test]
    fn test_frequency_coerced_from_zero() {
        let mut t = token("gato", "gato", PosTag::Noun, 0);
        t.set_occurrences(0, 100);
        assert_eq!(t.occurrences, 1);
        assert!(t.frequency > 0.0);
    }

    #[test]
    fn test_named_entity_score_is_member_mean() {
        let mut a = token("São", "", PosTag::ProperNoun, 0);
        let mut b = token("Paulo", "", PosTag::ProperNoun, 1);
        a.tfidf = 0.4;
        b.tfidf = 0.2;
        let entity = NamedEntity::new(vec![a, b]);
        assert!((entity.score() - 0.3).abs() < 1e-9);
        assert_eq!(entity.surface, "São Paulo");
    }

    #[test]
    fn test_sentence_total_words_tracks_word_sequence() {
        let words = vec![
            Word::Single(token("O", "o", PosTag::Determiner, 0)),
            Word::Single(token("gato", "gato", PosTag::Noun, 1)),
        ];
        let s = Sentence::new(0, 1, "O gato", words);
        assert_eq!(s.total_words(), 2);
    }

    #[test]
    fn test_complete_score_is_score_plus_extra() {
        let mut s = Sentence::default();
        s.score = 0.4;
        s.extra_score = 0.25;
        assert!((s.complete_score() - 0.65).abs() < 1e-9);
    }

    #[test]
    fn test_prepend_connective_lowercases_old_start() {
        let mut s = Sentence::new(0, 1, "Além disso era tarde", Vec::new());
        s.prepend_connective("Contudo,");
        assert_eq!(s.text, "Contudo, além disso era tarde");
        assert!(s.has_connective);
    }

    #[test]
    fn test_compression_budget_rounds() {
        let cfg = SummarizerConfig::default();
        assert_eq!(cfg.compression_budget(1000), 200);
        assert_eq!(cfg.compression_budget(1001), 200);
    }

    #[test]
    fn test_keyword_cap_formula() {
        let cfg = SummarizerConfig::default();
        assert_eq!(cfg.keyword_cap(200), 10);
        assert_eq!(SummarizerConfig::default().with_max_keywords(3).keyword_cap(200), 3);
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let cfg = SummarizerConfig::default()
            .with_language("en")
            .with_compression_rate(0.3);
        let json = serde_json::to_string(&cfg).unwrap();
        let back: SummarizerConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.language, "en");
        assert!((back.compression_rate - 0.3).abs() < 1e-9);
        assert_eq!(back.max_workers, 7);
    }

    #[test]
    fn test_config_deserialize_partial_uses_defaults() {
        let json = r#"{ "compression_rate": 0.1 }"#;
        let cfg: SummarizerConfig = serde_json::from_str(json).unwrap();
        assert!((cfg.compression_rate - 0.1).abs() < 1e-9);
        assert!((cfg.similarity_threshold - 0.75).abs() < 1e-9);
        assert_eq!(cfg.min_sentence_words, 15);
    }
}
