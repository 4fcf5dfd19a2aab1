//! Text cleanup helpers shared by the extractors.

use quick_xml::escape::{resolve_html5_entity, unescape_with};
use regex::{Captures, Regex};
use std::sync::LazyLock;

static ENTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(?:#[0-9]+|#[xX][0-9a-fA-F]+|[A-Za-z][A-Za-z0-9]*);").unwrap()
});

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^<>]*>").unwrap());

/// Decode HTML character references (`&amp;`, `&eacute;`, `&#8211;`).
///
/// Unknown references and bare ampersands are left as they are.
pub fn decode_html_entities(text: &str) -> String {
    ENTITY_RE
        .replace_all(text, |caps: &Captures<'_>| {
            let entity = &caps[0];
            match unescape_with(entity, resolve_html5_entity) {
                Ok(decoded) => decoded.into_owned(),
                Err(_) => entity.to_string(),
            }
        })
        .into_owned()
}

/// Remove anything that looks like a markup tag, keeping the text between tags
pub fn strip_markup_tags(text: &str) -> String {
    TAG_RE.replace_all(text, "").into_owned()
}

/// Lowercase and drop all whitespace, so "Materials and  Methods" and
/// "materialsandmethods" compare equal
pub fn normalize_heading(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}
