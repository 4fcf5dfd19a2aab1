//! The flat record handed to downstream consumers.

use serde::{Deserialize, Serialize};

/// Fields extracted from one converted article.
///
/// Every string field is empty when the document lacks the corresponding
/// structure; a missing DOI never prevents the rest of the record from being
/// produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRecord {
    /// Main article title
    pub title: String,

    /// Document language code from the TEI header
    pub language: String,

    /// Publisher name from the imprint
    pub publisher: String,

    /// Journal (monograph) title
    pub journal: String,

    /// Normalized publication date (`when` attribute)
    pub release_year: String,

    /// Digital Object Identifier
    pub doi: String,

    /// Number of bibliography entries kept in the reference table
    pub referencecount: usize,

    /// Section-organized article text
    pub text: String,
}

impl ArticleRecord {
    /// Returns true when nothing at all could be extracted
    pub fn is_empty(&self) -> bool {
        *self == ArticleRecord::default()
    }

    /// DOI suffix usable as a file stem: `10.1038/s41467-024-1` becomes
    /// `s41467_024_1`. `None` without a DOI or a `/` separator.
    pub fn export_stem(&self) -> Option<String> {
        let (_, suffix) = self.doi.split_once('/')?;
        let suffix = suffix.split('/').next().unwrap_or(suffix);
        if suffix.is_empty() {
            return None;
        }
        Some(suffix.replace('-', "_"))
    }
}
