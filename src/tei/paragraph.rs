//! Paragraph reconstruction.
//!
//! A TEI paragraph is mixed content: runs of text interleaved with `<ref>`
//! markers. Bibliographic markers are replaced by an inline citation built
//! from the reference table; figure and table markers are removed together
//! with the caption lead-in ("Fig.", "Table") that precedes them.
//!
//! Typesetting leaves a stray `)` or space right after a removed marker. The
//! reconstructor tracks this with a two-state lookback ([`Artifact`]) that is
//! folded over the children of the paragraph.

use regex::Regex;
use std::sync::LazyLock;

use crate::models::{ReferenceRecord, ReferenceTable};
use crate::tei::{Element, MarkupNode};

const CITATION_CLOSE: &str = "[/bib_ref]";

/// Trailing caption lead-in left in front of a figure/table marker
static CAPTION_LEAD_IN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s*\(?\b(?:figures?|figs?\.?|tables?)\s*$").unwrap()
});

/// "(Supplementary ...)" and "(see Supplementary ...)" annotations. The
/// closing parenthesis may be missing only for a short lead-in ending the run,
/// e.g. "(Supplementary Fig." right before a figure marker.
static SUPPLEMENTARY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\s*\(\s*,*\s*(?:[a-z]+\s+)?supplementary\b(?:[^()]*\)|(?:\s+[a-z0-9]+\.?){0,3}\s*$)",
    )
    .unwrap()
});

/// Whether the last thing emitted was a marker whose neighbour may carry a
/// typesetting artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Artifact {
    #[default]
    Clean,
    Pending,
}

/// Accumulated paragraph text plus the lookback state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParagraphState {
    text: String,
    artifact: Artifact,
}

impl ParagraphState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn artifact(&self) -> Artifact {
        self.artifact
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn finish(self) -> String {
        self.text
    }

    /// Append a resolved citation, separated by one space from a directly
    /// preceding citation
    pub fn push_citation(mut self, record: &ReferenceRecord) -> Self {
        if self.text.ends_with(CITATION_CLOSE) {
            self.text.push(' ');
        }
        self.text.push_str(&record.citation());
        self.artifact = Artifact::Pending;
        self
    }

    /// Remove the caption lead-in ("(Fig.", "Table") at the end of the buffer
    pub fn elide_caption_lead_in(mut self) -> Self {
        if let Some(m) = CAPTION_LEAD_IN_RE.find(&self.text) {
            self.text.truncate(m.start());
        }
        self.artifact = Artifact::Pending;
        self
    }

    /// Append a text run.
    ///
    /// Right after a marker, a leading `)` is dropped, and a leading space is
    /// dropped when it would double the whitespace already at the end of the
    /// buffer.
    pub fn push_text(mut self, text: &str) -> Self {
        let mut text = text;
        if self.artifact == Artifact::Pending {
            if let Some(rest) = text.strip_prefix(')') {
                text = rest;
            } else if text.starts_with(' ')
                && self.text.chars().last().is_none_or(char::is_whitespace)
            {
                text = &text[1..];
            }
        }
        self.artifact = Artifact::Clean;
        self.text.push_str(&SUPPLEMENTARY_RE.replace_all(text, ""));
        self
    }

    /// Fold one child of the paragraph into the state
    fn step(self, node: &MarkupNode, table: &ReferenceTable) -> Self {
        match node {
            MarkupNode::Text(text) => self.push_text(text),
            MarkupNode::Element(element) => match classify(element, table) {
                Inline::Citation(target) => match resolve(target, table) {
                    Some(record) => self.push_citation(record),
                    None => {
                        tracing::debug!(marker_target = target, "Unresolved citation target, dropping marker");
                        self
                    }
                },
                Inline::Marker => self.elide_caption_lead_in(),
                Inline::Container => element
                    .children
                    .iter()
                    .fold(self, |state, child| state.step(child, table)),
            },
        }
    }
}

/// Inline element kinds inside a paragraph
enum Inline<'a> {
    /// `type="bibr"` with a target, checked against a non-empty table
    Citation(&'a str),
    /// Any other typed element: figure, table, formula references, and
    /// bibliographic markers that cannot be looked up
    Marker,
    /// Untyped wrapper (`<s>`, `<hi>`); its children are inlined
    Container,
}

fn classify<'a>(element: &'a Element, table: &ReferenceTable) -> Inline<'a> {
    match element.attr("type").filter(|t| !t.is_empty()) {
        Some("bibr") if !table.is_empty() => match element.attr("target") {
            Some(target) => Inline::Citation(target),
            None => Inline::Marker,
        },
        Some(_) => Inline::Marker,
        None => Inline::Container,
    }
}

/// Look up a marker target (`#b3`) in the table. Malformed targets resolve to
/// nothing, same as unknown ids.
fn resolve<'t>(target: &str, table: &'t ReferenceTable) -> Option<&'t ReferenceRecord> {
    let target = target.trim();
    let id = target.strip_prefix('#').unwrap_or(target);
    if id.is_empty() || id.contains(char::is_whitespace) {
        return None;
    }
    table.get(id)
}

/// Reconstruct a paragraph node into one normalized string.
///
/// A bare text node goes through the same text rules as a text child would.
pub fn reconstruct_paragraph(node: &MarkupNode, table: &ReferenceTable) -> String {
    let state = match node {
        MarkupNode::Text(text) => ParagraphState::new().push_text(text),
        MarkupNode::Element(element) => element
            .children
            .iter()
            .fold(ParagraphState::new(), |state, child| state.step(child, table)),
    };
    state.finish()
}
