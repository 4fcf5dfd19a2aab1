//! GROBID TEI document handling.
//!
//! The pieces are layered leaf-first:
//!
//! - [`tree`]: parse markup into an owned [`Element`] tree and query it
//! - [`metadata`]: title, language, publisher/journal, year and DOI extractors
//! - [`references`]: build the [`ReferenceTable`](crate::models::ReferenceTable)
//!   from the bibliography
//! - [`paragraph`]: reconstruct one paragraph with citations resolved
//! - [`sections`]: assemble abstract and body sections into one text stream
//!
//! Only [`parse`] can fail. Every extractor degrades to an empty value when the
//! structure it looks for is missing.

pub mod metadata;
pub mod paragraph;
pub mod references;
pub mod sections;
pub mod tree;

pub use metadata::{
    extract_doi, extract_language, extract_publisher_journal, extract_release_year,
    extract_title,
};
pub use paragraph::{reconstruct_paragraph, ParagraphState};
pub use references::build_reference_table;
pub use sections::{assemble_text, classify_heading, HeadingLevel, Section};
pub use tree::{parse, Element, MarkupNode};

/// Errors that can occur while converting a document
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// The input is not well-formed markup
    #[error("Malformed markup at byte {position}: {message}")]
    MalformedMarkup { position: u64, message: String },

    /// The input bytes are not valid UTF-8
    #[error("Encoding error: {0}")]
    Encoding(#[from] std::str::Utf8Error),

    /// IO error reading the document
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConvertError {
    pub(crate) fn malformed(position: u64, message: impl Into<String>) -> Self {
        ConvertError::MalformedMarkup {
            position,
            message: message.into(),
        }
    }
}
