//! Record composition: markup in, [`ArticleRecord`] out.
//!
//! [`Converter`] ties the tree adapter, the metadata extractors, the reference
//! table and the section assembler together. A conversion is a pure function
//! of the markup and the converter's heading vocabulary; log events go to the
//! injected [`Dispatch`] when one is set, otherwise to the caller's current
//! subscriber.

use std::path::Path;
use tracing::Dispatch;

use crate::config::ConverterConfig;
use crate::models::ArticleRecord;
use crate::tei::{self, ConvertError, Element};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Converts GROBID TEI documents into article records
#[derive(Debug, Clone, Default)]
pub struct Converter {
    config: ConverterConfig,
    dispatch: Option<Dispatch>,
}

impl Converter {
    pub fn new(config: ConverterConfig) -> Self {
        Self {
            config,
            dispatch: None,
        }
    }

    /// Route this converter's log events to `dispatch`
    pub fn with_dispatch(mut self, dispatch: Dispatch) -> Self {
        self.dispatch = Some(dispatch);
        self
    }

    /// Parse and convert one document. Fails only on malformed markup.
    pub fn convert(&self, markup: &str) -> Result<ArticleRecord, ConvertError> {
        self.in_scope(|| {
            let root = tei::parse(markup).inspect_err(|e| {
                tracing::debug!(error = %e, "Document is not well-formed");
            })?;
            Ok(self.compose(&root))
        })
    }

    /// Convert a UTF-8 byte buffer, ignoring a leading byte order mark
    pub fn convert_bytes(&self, bytes: &[u8]) -> Result<ArticleRecord, ConvertError> {
        let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
        self.convert(std::str::from_utf8(bytes)?)
    }

    /// Read and convert a document from disk
    pub fn convert_file(&self, path: &Path) -> Result<ArticleRecord, ConvertError> {
        let bytes = std::fs::read(path)?;
        self.in_scope(|| tracing::debug!(path = %path.display(), bytes = bytes.len(), "Read document"));
        self.convert_bytes(&bytes)
    }

    /// Build the record from an already parsed tree
    pub fn compose(&self, root: &Element) -> ArticleRecord {
        self.in_scope(|| {
            let references = tei::build_reference_table(root);
            let (publisher, journal) = tei::extract_publisher_journal(root);

            let record = ArticleRecord {
                title: tei::extract_title(root),
                language: tei::extract_language(root),
                publisher,
                journal,
                release_year: tei::extract_release_year(root),
                doi: tei::extract_doi(root),
                referencecount: references.len(),
                text: tei::assemble_text(root, &references, &self.config),
            };

            if record.doi.is_empty() {
                tracing::debug!("Document has no DOI");
            }
            tracing::info!(
                referencecount = record.referencecount,
                text_len = record.text.len(),
                "Converted document"
            );
            record
        })
    }

    fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        match &self.dispatch {
            Some(dispatch) => tracing::dispatcher::with_default(dispatch, f),
            None => f(),
        }
    }
}

/// Convert with the default heading vocabulary
pub fn convert(markup: &str) -> Result<ArticleRecord, ConvertError> {
    Converter::default().convert(markup)
}
