//! Reference table built from `text//div[@type="references"]/listBibl`.

use crate::models::{ReferenceRecord, ReferenceTable};
use crate::tei::Element;

/// Build the identifier to citation mapping for a document.
///
/// Entries without a title or without a usable first author are left out, so
/// every record in the table renders a complete citation. Later entries with
/// an already-seen id replace earlier ones.
pub fn build_reference_table(root: &Element) -> ReferenceTable {
    let mut table = ReferenceTable::new();

    let Some(references) = root
        .find_first("text", &[])
        .and_then(|text| text.find_first("div", &[("type", "references")]))
    else {
        return table;
    };

    for entry in references.find_all("biblStruct", &[]) {
        let id = entry.attr("xml:id").unwrap_or_default();
        match parse_entry(entry) {
            Some((title, author)) => {
                if table.insert(ReferenceRecord::new(id, title, author)).is_some() {
                    tracing::debug!(id, "Duplicate reference id, keeping the later entry");
                }
            }
            None => tracing::debug!(id, "Skipping reference without title or author"),
        }
    }

    table
}

/// Title and first author of one `biblStruct`, or `None` when either is missing
fn parse_entry(entry: &Element) -> Option<(String, String)> {
    let title = entry
        .find_first("title", &[("level", "a")])
        .or_else(|| entry.find_first("title", &[("level", "m")]))
        .map(|t| t.text().trim().to_string())
        .filter(|t| !t.is_empty())?;

    let author = entry
        .find_first("author", &[])
        .map(format_author)
        .filter(|a| !a.is_empty())?;

    Some((title, author))
}

/// "Surname FirstMiddle", e.g. `Smith JA` for forenames J and A
fn format_author(author: &Element) -> String {
    let first = name_part(author, "forename", &[("type", "first")]);
    let middle = name_part(author, "forename", &[("type", "middle")]);
    let last = name_part(author, "surname", &[]);

    format!("{} {}{}", last, first, middle).trim().to_string()
}

fn name_part(author: &Element, tag: &str, attrs: &[(&str, &str)]) -> String {
    author
        .find_first(tag, attrs)
        .map(|e| e.text().trim().to_string())
        .unwrap_or_default()
}
