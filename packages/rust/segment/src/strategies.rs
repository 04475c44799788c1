//! Clause segmentation strategies.
//!
//! Each strategy is a pure function `&str -> Vec<String>`. Strategies are
//! tried in order and the first non-empty result wins.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

/// Clauses must be strictly longer than this many characters once trimmed.
pub const MIN_CLAUSE_CHARS: usize = 20;

/// A numbered clause boundary: newline, one or two digits, period, space.
static CLAUSE_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n[0-9]{1,2}\. ").expect("valid regex"));

/// An upper-case title line such as `WEBSITE DESIGN AGREEMENT`.
static TITLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*((?:[A-Z0-9&,'\-]+[ \t]+)*(?:AGREEMENT|CONTRACT))[ \t\r]*$")
        .expect("valid regex")
});

static PARAGRAPH_BREAK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n[ \t\r]*\n").expect("valid regex"));

static SENTENCE_BREAK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]\s+").expect("valid regex"));

// ---------------------------------------------------------------------------
// Strategy registry
// ---------------------------------------------------------------------------

/// Names of the built-in segmentation strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentStrategy {
    /// `1. ...`, `2. ...` numbered clauses (plus preamble).
    Numbered,
    /// Blank-line separated paragraphs.
    Paragraphs,
    /// Sentence boundaries.
    Sentences,
}

impl SegmentStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Numbered => "numbered",
            Self::Paragraphs => "paragraphs",
            Self::Sentences => "sentences",
        }
    }
}

impl std::fmt::Display for SegmentStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strategies in priority order.
pub(crate) const STRATEGIES: &[(SegmentStrategy, fn(&str) -> Vec<String>)] = &[
    (SegmentStrategy::Numbered, numbered_clauses),
    (SegmentStrategy::Paragraphs, paragraphs),
    (SegmentStrategy::Sentences, sentences),
];

// ---------------------------------------------------------------------------
// Strategy 1: numbered clauses
// ---------------------------------------------------------------------------

/// Split on numbered clause markers, re-attaching each marker to its clause.
///
/// Text before the first marker becomes the preamble. Yields nothing when the
/// text has no numbered structure.
pub fn numbered_clauses(text: &str) -> Vec<String> {
    let text = label_title(text);
    let starts: Vec<usize> = CLAUSE_MARKER_RE
        .find_iter(&text)
        .map(|m| m.start())
        .collect();

    let Some(&first) = starts.first() else {
        return Vec::new();
    };

    let mut clauses = Vec::with_capacity(starts.len() + 1);
    push_if_long(&mut clauses, &text[..first]);

    for (i, &start) in starts.iter().enumerate() {
        let end = starts.get(i + 1).copied().unwrap_or(text.len());
        push_if_long(&mut clauses, &text[start..end]);
    }

    clauses
}

/// Prefix a title line that precedes the first numbered clause with `0. `.
fn label_title(text: &str) -> Cow<'_, str> {
    let Some(first_marker) = CLAUSE_MARKER_RE.find(text) else {
        return Cow::Borrowed(text);
    };

    match TITLE_RE.captures(text).and_then(|caps| caps.get(1)) {
        Some(title) if title.start() < first_marker.start() => {
            let mut labelled = String::with_capacity(text.len() + 3);
            labelled.push_str(&text[..title.start()]);
            labelled.push_str("0. ");
            labelled.push_str(&text[title.start()..]);
            Cow::Owned(labelled)
        }
        _ => Cow::Borrowed(text),
    }
}

// ---------------------------------------------------------------------------
// Strategy 2: paragraphs
// ---------------------------------------------------------------------------

/// Split on blank lines.
pub fn paragraphs(text: &str) -> Vec<String> {
    split_and_filter(&PARAGRAPH_BREAK_RE, text)
}

// ---------------------------------------------------------------------------
// Strategy 3: sentences
// ---------------------------------------------------------------------------

/// Split on a sentence terminator followed by whitespace.
pub fn sentences(text: &str) -> Vec<String> {
    split_and_filter(&SENTENCE_BREAK_RE, text)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn split_and_filter(separator: &Regex, text: &str) -> Vec<String> {
    let mut clauses = Vec::new();
    for piece in separator.split(text) {
        push_if_long(&mut clauses, piece);
    }
    clauses
}

fn push_if_long(clauses: &mut Vec<String>, raw: &str) {
    let trimmed = raw.trim();
    if trimmed.chars().count() > MIN_CLAUSE_CHARS {
        clauses.push(trimmed.to_string());
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
