//! Summary assembly: paragraph arrangement, connective insertion, and the
//! final presentation pass.
//!
//! Sentences arrive grouped by keyword cluster. Each cluster becomes one
//! paragraph titled with its keyword; inside a paragraph sentences read in
//! document order. Adjacent sentence pairs then get at most one discourse
//! connective, chosen from a lexicon filtered by the classified relation,
//! with a bounded retry budget and an explicit already-used set.

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::warn;

use crate::external::DiscourseClassifier;
use crate::scoring::cmp_in_paragraph;
use crate::types::{Paragraph, PosTag, Sentence, SingleToken, Summary};

// ============================================================================
// Connective lexicon
// ============================================================================

/// One discourse connective with its applicability constraints.
#[derive(Debug, Clone)]
pub struct Connective {
    /// Inserted verbatim before the sentence, comma included.
    pub text: String,
    /// Relation subtype this connective expresses (e.g. `"contrast"`).
    pub subtype: String,
    /// Whether it expresses the inverted orientation of the relation.
    pub inverted: bool,
    /// When set, the target sentence's first word must carry this tag.
    pub first_word_pos: Option<PosTag>,
}

impl Connective {
    pub fn new(text: &str, subtype: &str, inverted: bool) -> Self {
        Connective {
            text: text.to_string(),
            subtype: subtype.to_string(),
            inverted,
            first_word_pos: None,
        }
    }

    pub fn with_first_word_pos(mut self, pos: PosTag) -> Self {
        self.first_word_pos = Some(pos);
        self
    }

    /// Check the applicability rule against the target sentence.
    pub fn matches_rule(&self, sentence: &Sentence) -> bool {
        match self.first_word_pos {
            None => true,
            Some(required) => sentence
                .words
                .first()
                .and_then(|w| w.as_single())
                .map(|t| t.pos == required)
                .unwrap_or(false),
        }
    }
}

/// The connective inventory, filterable by subtype and orientation.
#[derive(Debug, Clone, Default)]
pub struct ConnectiveLexicon {
    connectives: Vec<Connective>,
}

impl ConnectiveLexicon {
    pub fn new(connectives: Vec<Connective>) -> Self {
        ConnectiveLexicon { connectives }
    }

    /// A small built-in Portuguese inventory covering the common relation
    /// subtypes.
    pub fn portuguese() -> Self {
        ConnectiveLexicon::new(vec![
            Connective::new("Contudo,", "contrast", false),
            Connective::new("No entanto,", "contrast", false),
            Connective::new("Pelo contrário,", "contrast", true),
            Connective::new("Além disso,", "expansion", false),
            Connective::new("Adicionalmente,", "expansion", false),
            Connective::new("Por isso,", "cause", false),
            Connective::new("Assim,", "cause", false),
            Connective::new("Porque", "cause", true),
            Connective::new("Entretanto,", "temporal", false),
            Connective::new("Depois,", "temporal", false),
        ])
    }

    pub fn candidates<'a>(
        &'a self,
        subtype: &'a str,
        inverted: bool,
    ) -> impl Iterator<Item = &'a Connective> {
        self.connectives
            .iter()
            .filter(move |c| c.subtype == subtype && c.inverted == inverted)
    }

    pub fn len(&self) -> usize {
        self.connectives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connectives.is_empty()
    }
}

/// Pick a connective for one sentence pair.
///
/// Candidates are tried in lexicon order, skipping the already-used set,
/// with at most `max_retries` rule checks. When every candidate for the
/// subtype has been used, the set is reset for that subtype first, so long
/// summaries cycle through the inventory instead of exhausting it.
pub fn select_connective<'a>(
    lexicon: &'a ConnectiveLexicon,
    subtype: &'a str,
    inverted: bool,
    sentence: &Sentence,
    used: &mut FxHashSet<String>,
    max_retries: usize,
) -> Option<&'a Connective> {
    let mut any = false;
    let mut all_used = true;
    for c in lexicon.candidates(subtype, inverted) {
        any = true;
        if !used.contains(&c.text) {
            all_used = false;
        }
    }
    if !any {
        return None;
    }
    if all_used {
        for c in lexicon.candidates(subtype, inverted) {
            used.remove(&c.text);
        }
    }

    let mut attempts = 0;
    for candidate in lexicon.candidates(subtype, inverted) {
        if used.contains(&candidate.text) {
            continue;
        }
        if attempts >= max_retries {
            break;
        }
        attempts += 1;
        if candidate.matches_rule(sentence) {
            used.insert(candidate.text.clone());
            return Some(candidate);
        }
    }
    None
}

// ============================================================================
// Paragraph arrangement
// ============================================================================

/// Arrange sentences into keyword-titled paragraphs.
///
/// Paragraphs follow the keyword list order (best keyword first); sentences
/// without a keyword cluster form a final untitled paragraph. Within a
/// paragraph, sentences read in document-then-position order.
pub fn arrange_paragraphs(sentences: Vec<Sentence>, keywords: &[SingleToken]) -> Vec<Paragraph> {
    let mut groups: FxHashMap<Option<String>, Vec<Sentence>> = FxHashMap::default();
    for sentence in sentences {
        groups
            .entry(sentence.keyword_key.clone())
            .or_default()
            .push(sentence);
    }

    let mut paragraphs = Vec::new();
    for keyword in keywords {
        let key = Some(keyword.representation().to_string());
        if let Some(mut members) = groups.remove(&key) {
            members.sort_by(cmp_in_paragraph);
            paragraphs.push(Paragraph {
                keyword: Some(keyword.representation().to_string()),
                title: Some(Sentence::title(&capitalize_first(&keyword.surface))),
                sentences: members,
            });
        }
    }
    if let Some(mut members) = groups.remove(&None) {
        members.sort_by(cmp_in_paragraph);
        paragraphs.push(Paragraph {
            keyword: None,
            title: None,
            sentences: members,
        });
    }
    paragraphs
}

// ============================================================================
// Connective insertion
// ============================================================================

/// Insert connectives between adjacent sentences of each paragraph.
///
/// Exactly one attempt per pair: classifier failures mean "unrelated", an
/// exhausted retry budget means no connective. Both outcomes leave a log
/// line and the summary intact.
pub fn insert_connectives<C: DiscourseClassifier>(
    paragraphs: &mut [Paragraph],
    classifier: &C,
    lexicon: &ConnectiveLexicon,
    max_retries: usize,
) {
    let mut used: FxHashSet<String> = FxHashSet::default();

    for paragraph in paragraphs.iter_mut() {
        for i in 1..paragraph.sentences.len() {
            let (before, after) = paragraph.sentences.split_at_mut(i);
            let previous = &before[i - 1];
            let current = &mut after[0];
            if previous.is_title || current.is_title || current.has_connective {
                continue;
            }

            let related = match classifier.is_related(previous, current) {
                Ok(related) => related,
                Err(err) => {
                    warn!(%err, "discourse classifier failed, treating pair as unrelated");
                    false
                }
            };
            if !related {
                continue;
            }
            let subtype = match classifier.classify(previous, current) {
                Ok(subtype) => subtype,
                Err(err) => {
                    warn!(%err, "relation classification failed, skipping connective");
                    continue;
                }
            };
            let inverted = match classifier.is_inverted(previous, current) {
                Ok(inverted) => inverted,
                Err(err) => {
                    warn!(%err, "orientation classification failed, skipping connective");
                    continue;
                }
            };

            match select_connective(lexicon, &subtype, inverted, current, &mut used, max_retries)
            {
                Some(connective) => {
                    let text = connective.text.clone();
                    current.prepend_connective(&text);
                }
                None => {
                    warn!(%subtype, "connective selection exhausted, none inserted");
                }
            }
        }
    }
}

// ============================================================================
// Presentation
// ============================================================================

/// Final presentation pass: capitalize sentence starts and normalize
/// terminal punctuation to a period (titles keep their form).
pub fn normalize_presentation(summary: &mut Summary) {
    for paragraph in summary.paragraphs.iter_mut() {
        for sentence in paragraph.sentences.iter_mut() {
            sentence.text = capitalize_first(sentence.text.trim());
            sentence.text = correct_terminal_punctuation(&sentence.text);
        }
    }
}

fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => format!("{}{}", first.to_uppercase(), chars.as_str()),
        None => String::new(),
    }
}

fn correct_terminal_punctuation(text: &str) -> String {
    match text.chars().last() {
        None => String::new(),
        Some(last) if matches!(last, '.' ) => text.to_string(),
        Some(last) if matches!(last, ',' | ';' | ':' | '!' | '?') => {
            let mut out: String = text.chars().take(text.chars().count() - 1).collect();
            out.push('.');
            out
        }
        Some(_) => format!("{text}."),
    }
}

// ============================================================================
// Tests
// ============================================================================
