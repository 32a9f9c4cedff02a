//! Pipeline runner — the five-phase summarization state machine.
//!
//! [`Summarizer`] holds the engine configuration plus the three external
//! collaborators. Calling [`Summarizer::run`] executes the phases in order —
//! preprocess, identify, map, reduce, present — threading the shrinking
//! corpus between them and notifying a [`PhaseObserver`] at each boundary.
//!
//! # Static dispatch
//!
//! `Summarizer` is generic over the collaborator types, so the compiler
//! monomorphizes each combination into a unique concrete type. The
//! zero-sized defaults ([`WhitespaceAnnotator`], [`NoopParser`],
//! [`NoopClassifier`]) add zero bytes and zero runtime cost.
//!
//! # Failure policy
//!
//! Collaborator failures never abort a run: a failed annotation drops one
//! document, a failed parse skips one compression, a failed classification
//! skips one connective. The only fatal condition is a corpus with no
//! sentences at all.

use rayon::prelude::*;
use tracing::{info_span, warn};

use crate::assemble::{arrange_paragraphs, insert_connectives, normalize_presentation, ConnectiveLexicon};
use crate::cluster::{cluster_by_keywords, cluster_by_similarity};
use crate::compress::compress_sentence;
use crate::error::{Result, SummarizerError};
use crate::external::{
    AnnotatedSentence, Annotator, ConstituencyParser, DiscourseClassifier, NoopClassifier,
    NoopParser, WhitespaceAnnotator,
};
use crate::keywords::extract_keywords;
use crate::nlp::StopwordFilter;
use crate::pipeline::observer::{
    PhaseClock, PhaseObserver, PhaseReportBuilder, PHASE_IDENTIFY, PHASE_MAP, PHASE_PREPROCESS,
    PHASE_PRESENT, PHASE_REDUCE,
};
use crate::scoring::{cmp_complete_score, compute_keyword_properties, score_corpus};
use crate::types::{
    Document, NamedEntity, RawDocument, Sentence, SingleToken, Summary, SummarizerConfig, Word,
};

// ============================================================================
// Summarizer — statically-composed engine
// ============================================================================

/// The summarization engine with its external collaborators.
///
/// # Type parameters
///
/// | Param | Trait | Default impl |
/// |-------|-------|--------------|
/// | `A` | [`Annotator`] | [`WhitespaceAnnotator`] |
/// | `P` | [`ConstituencyParser`] | [`NoopParser`] |
/// | `C` | [`DiscourseClassifier`] | [`NoopClassifier`] |
#[derive(Debug, Clone)]
pub struct Summarizer<A = WhitespaceAnnotator, P = NoopParser, C = NoopClassifier> {
    annotator: A,
    parser: P,
    classifier: C,
    lexicon: ConnectiveLexicon,
    config: SummarizerConfig,
}

impl Summarizer {
    /// Engine with default collaborators: coarse whitespace annotation, no
    /// compression, no connectives.
    pub fn new(config: SummarizerConfig) -> Self {
        Summarizer {
            annotator: WhitespaceAnnotator,
            parser: NoopParser,
            classifier: NoopClassifier,
            lexicon: ConnectiveLexicon::portuguese(),
            config,
        }
    }
}

impl<A, P, C> Summarizer<A, P, C> {
    /// Attach a real annotator.
    pub fn with_annotator<A2: Annotator>(self, annotator: A2) -> Summarizer<A2, P, C> {
        Summarizer {
            annotator,
            parser: self.parser,
            classifier: self.classifier,
            lexicon: self.lexicon,
            config: self.config,
        }
    }

    /// Attach a real constituency parser, enabling compression.
    pub fn with_parser<P2: ConstituencyParser>(self, parser: P2) -> Summarizer<A, P2, C> {
        Summarizer {
            annotator: self.annotator,
            parser,
            classifier: self.classifier,
            lexicon: self.lexicon,
            config: self.config,
        }
    }

    /// Attach a real discourse classifier, enabling connective insertion.
    pub fn with_classifier<C2: DiscourseClassifier>(self, classifier: C2) -> Summarizer<A, P, C2> {
        Summarizer {
            annotator: self.annotator,
            parser: self.parser,
            classifier,
            lexicon: self.lexicon,
            config: self.config,
        }
    }

    /// Replace the connective lexicon.
    pub fn with_lexicon(mut self, lexicon: ConnectiveLexicon) -> Self {
        self.lexicon = lexicon;
        self
    }

    pub fn config(&self) -> &SummarizerConfig {
        &self.config
    }
}

// ============================================================================
// Summarizer::run — execute phases in order
// ============================================================================

impl<A, P, C> Summarizer<A, P, C>
where
    A: Annotator,
    P: ConstituencyParser,
    C: DiscourseClassifier,
{
    /// Summarize a document collection.
    ///
    /// Phases run in order:
    /// 1. Preprocess — drop empty documents
    /// 2. Identify — annotate in worker batches, build the corpus, fix the
    ///    word budget
    /// 3. Map — score, extract keywords, cluster twice
    /// 4. Reduce — rank, fill the budget, compress, arrange paragraphs
    /// 5. Present — capitalization and punctuation
    ///
    /// The `observer` receives callbacks at each phase boundary. Pass
    /// [`crate::pipeline::observer::NoopObserver`] for zero-overhead runs.
    ///
    /// Fails only with [`SummarizerError::EmptyInput`] when annotation
    /// produces no sentences.
    pub fn run(
        &self,
        documents: Vec<RawDocument>,
        observer: &mut impl PhaseObserver,
    ) -> Result<Summary> {
        // Phase 1: Preprocess
        let _span = info_span!("phase", name = PHASE_PREPROCESS).entered();
        observer.on_phase_start(PHASE_PREPROCESS);
        let clock = PhaseClock::start();
        let raw: Vec<RawDocument> = documents
            .into_iter()
            .filter(|d| {
                let keep = !d.body.trim().is_empty();
                if !keep {
                    warn!(document = %d.name, "document body is empty, dropping");
                }
                keep
            })
            .collect();
        let report = PhaseReportBuilder::new(clock.elapsed())
            .documents(raw.len())
            .build();
        observer.on_phase_end(PHASE_PREPROCESS, &report);
        drop(_span);

        // Phase 2: Identify
        let _span = info_span!("phase", name = PHASE_IDENTIFY).entered();
        observer.on_phase_start(PHASE_IDENTIFY);
        let clock = PhaseClock::start();
        let mut corpus = self.annotate_corpus(&raw);
        let total_words: usize = corpus.iter().map(|d| d.total_words()).sum();
        let total_sentences: usize = corpus.iter().map(|d| d.total_sentences()).sum();
        if total_sentences == 0 {
            return Err(SummarizerError::EmptyInput);
        }
        let budget = self.config.compression_budget(total_words);
        let report = PhaseReportBuilder::new(clock.elapsed())
            .documents(corpus.len())
            .sentences(total_sentences)
            .words(total_words)
            .budget(budget)
            .build();
        observer.on_phase_end(PHASE_IDENTIFY, &report);
        drop(_span);

        // Phase 3: Map
        let _span = info_span!("phase", name = PHASE_MAP).entered();
        observer.on_phase_start(PHASE_MAP);
        let clock = PhaseClock::start();
        score_corpus(&mut corpus);
        let stopwords = StopwordFilter::new(&self.config.language);
        let keywords = extract_keywords(&corpus, &self.config, &stopwords);
        for document in corpus.iter_mut() {
            for sentence in document.sentences.iter_mut() {
                compute_keyword_properties(sentence, &keywords);
            }
        }
        let candidates: Vec<Sentence> = corpus
            .iter()
            .flat_map(|d| d.sentences.iter())
            .filter(|s| !s.is_short(self.config.min_sentence_words))
            .cloned()
            .collect();
        let clustering =
            cluster_by_similarity(candidates, self.config.similarity_threshold);
        let sim_clusters = clustering.clusters.len();
        let (representatives, leftovers) =
            clustering.into_representatives(self.config.extra_score_bonus);
        let keyword_clustering =
            cluster_by_keywords(representatives, &keywords, self.config.extra_score_bonus);
        let pool = keyword_clustering.into_sentences();
        let report = PhaseReportBuilder::new(clock.elapsed())
            .sentences(pool.len())
            .clusters(sim_clusters)
            .build();
        observer.on_phase_end(PHASE_MAP, &report);
        drop(_span);

        // Phase 4: Reduce
        let _span = info_span!("phase", name = PHASE_REDUCE).entered();
        observer.on_phase_start(PHASE_REDUCE);
        let clock = PhaseClock::start();
        let mut selected = Vec::new();
        fill_budget(pool, &mut selected, budget);
        fill_budget(leftovers, &mut selected, budget);
        let compressed: Vec<Sentence> = selected
            .iter()
            .map(|s| compress_sentence(s, &self.parser, &keywords, &self.config))
            .collect();
        let selected_words: usize = compressed.iter().map(|s| s.total_words()).sum();
        let mut paragraphs = arrange_paragraphs(compressed, &keywords);
        insert_connectives(
            &mut paragraphs,
            &self.classifier,
            &self.lexicon,
            self.config.max_connective_retries,
        );
        let report = PhaseReportBuilder::new(clock.elapsed())
            .sentences(paragraphs.iter().map(|p| p.sentences.len()).sum())
            .words(selected_words)
            .budget(budget)
            .build();
        observer.on_phase_end(PHASE_REDUCE, &report);
        drop(_span);

        // Phase 5: Present
        let _span = info_span!("phase", name = PHASE_PRESENT).entered();
        observer.on_phase_start(PHASE_PRESENT);
        let clock = PhaseClock::start();
        let mut summary = Summary { paragraphs };
        normalize_presentation(&mut summary);
        let report = PhaseReportBuilder::new(clock.elapsed())
            .words(summary.total_words())
            .build();
        observer.on_phase_end(PHASE_PRESENT, &report);

        Ok(summary)
    }

    /// Annotate documents in fixed-size worker batches. Each batch fans out
    /// across the thread pool and is awaited before the next batch starts.
    /// A failed annotation yields an empty document.
    fn annotate_corpus(&self, raw: &[RawDocument]) -> Vec<Document> {
        let workers = self.config.max_workers.max(1);
        // Only the annotator crosses thread boundaries.
        let annotator = &self.annotator;
        let mut corpus = Vec::with_capacity(raw.len());
        for batch in raw.chunks(workers) {
            let annotated: Vec<Vec<AnnotatedSentence>> = batch
                .par_iter()
                .map(|doc| match annotator.annotate(doc) {
                    Ok(sentences) => sentences,
                    Err(err) => {
                        warn!(document = %doc.name, %err, "annotation failed, dropping document");
                        Vec::new()
                    }
                })
                .collect();
            for (doc, sentences) in batch.iter().zip(annotated) {
                let id = corpus.len();
                corpus.push(build_document(id, &doc.name, sentences));
            }
        }
        corpus
    }
}

/// Greedy budget fill: pool sentences in complete-score order, stopping
/// after the sentence that crosses the budget.
fn fill_budget(mut pool: Vec<Sentence>, selected: &mut Vec<Sentence>, budget: usize) {
    let mut words: usize = selected.iter().map(|s| s.total_words()).sum();
    pool.sort_by(cmp_complete_score);
    for sentence in pool {
        if words >= budget {
            break;
        }
        words += sentence.total_words();
        selected.push(sentence);
    }
}

/// Convert one annotated document into the corpus representation. Entity
/// spans become entity words; overlapping or out-of-range spans are ignored.
fn build_document(id: usize, name: &str, sentences: Vec<AnnotatedSentence>) -> Document {
    let mut converted = Vec::with_capacity(sentences.len());
    for (idx, annotated) in sentences.into_iter().enumerate() {
        let absolute_position = idx + 1;
        let tokens: Vec<SingleToken> = annotated
            .tokens
            .iter()
            .enumerate()
            .map(|(pos, t)| SingleToken::new(&t.surface, &t.lemma, t.pos, id, absolute_position, pos))
            .collect();

        let mut spans = annotated.entities.clone();
        spans.sort_unstable();
        let mut spans = spans.into_iter().peekable();

        let mut words = Vec::with_capacity(tokens.len());
        let mut i = 0;
        while i < tokens.len() {
            match spans.peek().copied() {
                Some((start, end)) if start == i && end > start && end <= tokens.len() => {
                    words.push(Word::Entity(NamedEntity::new(tokens[start..end].to_vec())));
                    i = end;
                    spans.next();
                }
                Some((start, _)) if start < i => {
                    spans.next();
                }
                _ => {
                    words.push(Word::Single(tokens[i].clone()));
                    i += 1;
                }
            }
        }
        converted.push(Sentence::new(id, absolute_position, &annotated.text, words));
    }
    Document {
        id,
        name: name.to_string(),
        sentences: converted,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::AnnotatedToken;
    use crate::pipeline::observer::{NoopObserver, PhaseTimingObserver};
    use crate::types::PosTag;

    fn sample_documents() -> Vec<RawDocument> {
        vec![
            RawDocument::new(
                "gatos",
                "O gato cinzento caçou o rato pequeno no quintal da casa velha. \
                 O gato dorme durante a tarde inteira no sofá grande da sala. \
                 A vizinha alimenta o gato todos os dias pela manhã bem cedo.",
            ),
            RawDocument::new(
                "ratos",
                "O rato pequeno fugiu do gato cinzento pelo buraco da parede. \
                 O rato guarda comida dentro do buraco escuro atrás da parede. \
                 A chuva forte caiu durante toda a noite sobre o quintal.",
            ),
        ]
    }

    fn small_config() -> SummarizerConfig {
        SummarizerConfig::default()
            .with_min_sentence_words(3)
            .with_compression_rate(0.4)
    }

    #[test]
    fn test_run_produces_nonempty_summary() {
        let summarizer = Summarizer::new(small_config());
        let summary = summarizer
            .run(sample_documents(), &mut NoopObserver)
            .unwrap();
        assert!(!summary.paragraphs.is_empty());
        assert!(summary.total_words() > 0);
    }

    #[test]
    fn test_run_notifies_all_phases_in_order() {
        let summarizer = Summarizer::new(small_config());
        let mut obs = PhaseTimingObserver::new();
        summarizer.run(sample_documents(), &mut obs).unwrap();
        let names: Vec<&str> = obs.reports().iter().map(|(n, _)| *n).collect();
        assert_eq!(
            names,
            vec![
                PHASE_PREPROCESS,
                PHASE_IDENTIFY,
                PHASE_MAP,
                PHASE_REDUCE,
                PHASE_PRESENT,
            ]
        );
    }

    #[test]
    fn test_identify_reports_corpus_statistics() {
        let summarizer = Summarizer::new(small_config());
        let mut obs = PhaseTimingObserver::new();
        summarizer.run(sample_documents(), &mut obs).unwrap();
        let (_, identify) = &obs.reports()[1];
        assert_eq!(identify.documents(), Some(2));
        assert_eq!(identify.sentences(), Some(6));
        assert!(identify.words().unwrap() > 0);
        let expected = small_config().compression_budget(identify.words().unwrap());
        assert_eq!(identify.budget(), Some(expected));
    }

    #[test]
    fn test_empty_input_is_an_error() {
        let summarizer = Summarizer::new(small_config());
        let result = summarizer.run(Vec::new(), &mut NoopObserver);
        assert!(matches!(result, Err(SummarizerError::EmptyInput)));
    }

    #[test]
    fn test_blank_documents_are_an_error() {
        let summarizer = Summarizer::new(small_config());
        let docs = vec![RawDocument::new("a", "   "), RawDocument::new("b", "")];
        let result = summarizer.run(docs, &mut NoopObserver);
        assert!(matches!(result, Err(SummarizerError::EmptyInput)));
    }

    /// Annotator that fails on one named document.
    struct FlakyAnnotator {
        bad: &'static str,
    }

    impl Annotator for FlakyAnnotator {
        fn annotate(&self, document: &RawDocument) -> crate::error::Result<Vec<AnnotatedSentence>> {
            if document.name == self.bad {
                return Err(SummarizerError::Annotation {
                    document: document.name.clone(),
                    reason: "tagger crashed".to_string(),
                });
            }
            WhitespaceAnnotator.annotate(document)
        }
    }

    #[test]
    fn test_failed_annotation_drops_one_document() {
        let summarizer =
            Summarizer::new(small_config()).with_annotator(FlakyAnnotator { bad: "ratos" });
        let mut obs = PhaseTimingObserver::new();
        let summary = summarizer.run(sample_documents(), &mut obs).unwrap();
        // Only the surviving document contributes sentences.
        let (_, identify) = &obs.reports()[1];
        assert_eq!(identify.sentences(), Some(3));
        assert!(!summary.paragraphs.is_empty());
    }

    #[test]
    fn test_all_annotations_failing_is_empty_input() {
        let summarizer =
            Summarizer::new(small_config()).with_annotator(FlakyAnnotator { bad: "gatos" });
        let docs = vec![RawDocument::new("gatos", "O gato dorme.")];
        let result = summarizer.run(docs, &mut NoopObserver);
        assert!(matches!(result, Err(SummarizerError::EmptyInput)));
    }

    #[test]
    fn test_summary_sentences_are_presented() {
        let summarizer = Summarizer::new(small_config());
        let summary = summarizer
            .run(sample_documents(), &mut NoopObserver)
            .unwrap();
        for sentence in summary.sentences() {
            let first = sentence.text.chars().next().unwrap();
            assert!(first.is_uppercase() || !first.is_alphabetic());
            if !sentence.is_title {
                assert!(sentence.text.ends_with('.'));
            }
        }
    }

    #[test]
    fn test_selection_stops_after_crossing_budget() {
        let mut selected = Vec::new();
        let pool: Vec<Sentence> = (0..5)
            .map(|i| {
                let words: Vec<Word> = (0..10)
                    .map(|p| {
                        Word::Single(SingleToken::new("palavra", "", PosTag::Noun, 0, i + 1, p))
                    })
                    .collect();
                let mut s = Sentence::new(0, i + 1, "texto", words);
                s.score = 1.0 - i as f64 * 0.1;
                s
            })
            .collect();
        fill_budget(pool, &mut selected, 25);
        // 10 + 10 crosses at 20 < 25, the third crosses to 30, then stop.
        assert_eq!(selected.len(), 3);
    }

    #[test]
    fn test_entity_spans_become_entity_words() {
        let annotated = AnnotatedSentence {
            text: "São Paulo cresceu".to_string(),
            tokens: vec![
                AnnotatedToken::new("São", "", PosTag::ProperNoun),
                AnnotatedToken::new("Paulo", "", PosTag::ProperNoun),
                AnnotatedToken::new("cresceu", "crescer", PosTag::Verb),
            ],
            entities: vec![(0, 2)],
        };
        let document = build_document(0, "d", vec![annotated]);
        let words = &document.sentences[0].words;
        assert_eq!(words.len(), 2);
        assert_eq!(words[0].surface(), "São Paulo");
        assert!(matches!(words[0], Word::Entity(_)));
    }

    #[test]
    fn test_invalid_entity_spans_ignored() {
        let annotated = AnnotatedSentence {
            text: "O gato".to_string(),
            tokens: vec![
                AnnotatedToken::new("O", "", PosTag::Determiner),
                AnnotatedToken::new("gato", "", PosTag::Noun),
            ],
            entities: vec![(1, 9)],
        };
        let document = build_document(0, "d", vec![annotated]);
        assert_eq!(document.sentences[0].words.len(), 2);
        assert!(document.sentences[0]
            .words
            .iter()
            .all(|w| matches!(w, Word::Single(_))));
    }
}
