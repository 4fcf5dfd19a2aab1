//! Header metadata extractors.
//!
//! Each extractor takes the document root and returns an empty string when the
//! element or attribute it looks for is missing.

use crate::tei::Element;
use crate::utils::{decode_html_entities, strip_markup_tags};

/// Main article title from `titleStmt/title[@type="main"]`.
///
/// Entities are decoded before embedded tags are stripped, so escaped inline
/// markup such as `&lt;i&gt;` does not survive into the title.
pub fn extract_title(root: &Element) -> String {
    let Some(title_stmt) = root.find_first("titleStmt", &[]) else {
        return String::new();
    };
    let title = title_stmt
        .find_first("title", &[("type", "main")])
        .map(|t| t.text().trim().to_string())
        .unwrap_or_default();

    strip_markup_tags(&decode_html_entities(&title))
}

/// Document language from the `xml:lang` attribute of `teiHeader`
pub fn extract_language(root: &Element) -> String {
    root.find_first("teiHeader", &[])
        .and_then(|header| header.attr("xml:lang"))
        .unwrap_or_default()
        .to_string()
}

/// Publisher and journal from the first `monogr` block, as `(publisher, journal)`
pub fn extract_publisher_journal(root: &Element) -> (String, String) {
    let Some(monogr) = root.find_first("monogr", &[]) else {
        return (String::new(), String::new());
    };

    let journal = monogr
        .find_first("title", &[("type", "main")])
        .map(|t| t.text().trim().to_string())
        .unwrap_or_default();

    let publisher = monogr
        .find_first("imprint", &[])
        .and_then(|imprint| imprint.find_first("publisher", &[]))
        .map(|p| p.text().trim().to_string())
        .unwrap_or_default();

    (publisher, journal)
}

/// Normalized publication date (`when` attribute) from `publicationStmt/date`
pub fn extract_release_year(root: &Element) -> String {
    root.find_first("publicationStmt", &[])
        .and_then(|stmt| stmt.find_first("date", &[]))
        .and_then(|date| date.attr("when"))
        .unwrap_or_default()
        .to_string()
}

/// First `idno[@type="DOI"]` in the document, trimmed
pub fn extract_doi(root: &Element) -> String {
    root.find_first("idno", &[("type", "DOI")])
        .map(|idno| idno.text().trim().to_string())
        .unwrap_or_default()
}
