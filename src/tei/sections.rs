//! Section assembly for the abstract and the body.
//!
//! Every `div` in a region becomes a candidate section. A leading heading
//! (a `<head>` element, or bare text in documents where the heading was
//! flattened to text) names the section; the remaining children are
//! reconstructed as paragraphs. Nested divisions are sections of their own
//! and follow their parent in document order.
//!
//! Output layout: the heading line carries its own newline, interior
//! paragraphs end with `\n`, and the last paragraph of a section ends with
//! `\n\n`.

use crate::config::ConverterConfig;
use crate::models::ReferenceTable;
use crate::tei::{reconstruct_paragraph, Element, MarkupNode};
use crate::utils::normalize_heading;

/// Markdown level of a section heading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadingLevel {
    /// Canonical article section (`# `)
    Top,
    /// Anything else (`## `)
    Sub,
}

impl HeadingLevel {
    pub fn prefix(&self) -> &'static str {
        match self {
            HeadingLevel::Top => "# ",
            HeadingLevel::Sub => "## ",
        }
    }
}

/// Which part of the document a division belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Region {
    Abstract,
    Body,
}

/// One heading with its reconstructed paragraphs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Section {
    /// Rendered heading including prefix and trailing newline(s), or empty
    pub heading: String,

    /// Reconstructed paragraphs, without separators
    pub paragraphs: Vec<String>,
}

impl Section {
    pub fn new(heading: impl Into<String>, paragraphs: Vec<String>) -> Self {
        Self {
            heading: heading.into(),
            paragraphs,
        }
    }

    pub fn heading_only(heading: impl Into<String>) -> Self {
        Self::new(heading, Vec::new())
    }

    /// True when the heading mentions any boilerplate term
    pub fn is_boilerplate(&self, config: &ConverterConfig) -> bool {
        mentions_boilerplate(&self.heading, config)
    }

    /// Append the heading and paragraphs with their separators
    pub fn render_into(&self, out: &mut String) {
        out.push_str(&self.heading);
        let last = self.paragraphs.len().saturating_sub(1);
        for (i, paragraph) in self.paragraphs.iter().enumerate() {
            out.push_str(paragraph);
            out.push_str(if i == last { "\n\n" } else { "\n" });
        }
    }
}

/// Top-level for canonical section names, sub-level for everything else
pub fn classify_heading(text: &str, config: &ConverterConfig) -> HeadingLevel {
    let normalized = normalize_heading(text);
    let canonical = config
        .top_level_headings
        .iter()
        .any(|name| normalize_heading(name) == normalized);

    if canonical {
        HeadingLevel::Top
    } else {
        HeadingLevel::Sub
    }
}

fn mentions_boilerplate(text: &str, config: &ConverterConfig) -> bool {
    let text = text.trim().to_lowercase();
    config
        .boilerplate_headings
        .iter()
        .map(|term| term.trim().to_lowercase())
        .any(|term| !term.is_empty() && text.contains(&term))
}

/// Collect the abstract and body sections in document order, before
/// boilerplate filtering
pub fn collect_sections(
    root: &Element,
    table: &ReferenceTable,
    config: &ConverterConfig,
) -> Vec<Section> {
    let mut sections = Vec::new();

    if let Some(abstract_region) = root.find_first("abstract", &[]) {
        let abstract_sections = region_sections(abstract_region, Region::Abstract, table, config);
        if !abstract_sections.is_empty() {
            sections.push(Section::heading_only(format!(
                "{}{}\n\n",
                HeadingLevel::Top.prefix(),
                config.abstract_heading
            )));
            sections.extend(abstract_sections);
        }
    }

    match root.find_first("text", &[]) {
        Some(text) => sections.extend(region_sections(text, Region::Body, table, config)),
        None => tracing::warn!("Document has no text region, body text will be empty"),
    }

    sections
}

/// Assemble the article text: every surviving section, in document order
pub fn assemble_text(root: &Element, table: &ReferenceTable, config: &ConverterConfig) -> String {
    let mut out = String::new();
    for section in collect_sections(root, table, config) {
        if section.is_boilerplate(config) {
            tracing::debug!(heading = section.heading.trim(), "Dropping boilerplate section");
            continue;
        }
        section.render_into(&mut out);
    }
    out
}

fn region_sections(
    region: &Element,
    kind: Region,
    table: &ReferenceTable,
    config: &ConverterConfig,
) -> Vec<Section> {
    let mut divisions = Vec::new();
    collect_divisions(region, false, config, &mut divisions);

    // An abstract without divisions carries its paragraphs directly
    if divisions.is_empty() && kind == Region::Abstract {
        divisions.push((region, false));
    }

    divisions
        .into_iter()
        .filter(|(division, in_boilerplate)| {
            if *in_boilerplate {
                tracing::debug!(
                    division_type = division.attr("type").unwrap_or_default(),
                    "Dropping division inside boilerplate block"
                );
            }
            !in_boilerplate
        })
        .filter_map(|(division, _)| division_section(division, kind, table, config))
        .collect()
}

/// Pre-order walk over `div` elements, skipping the bibliography. The flag
/// marks divisions nested in a typed boilerplate block such as
/// `<div type="acknowledgement">`.
fn collect_divisions<'a>(
    element: &'a Element,
    in_boilerplate: bool,
    config: &ConverterConfig,
    out: &mut Vec<(&'a Element, bool)>,
) {
    for child in element.child_elements() {
        if !child.is_named("div") {
            collect_divisions(child, in_boilerplate, config, out);
            continue;
        }
        if child.attr("type") == Some("references") {
            continue;
        }
        let boilerplate = in_boilerplate
            || child
                .attr("type")
                .is_some_and(|t| mentions_boilerplate(t, config));
        out.push((child, boilerplate));
        collect_divisions(child, boilerplate, config, out);
    }
}

fn division_section(
    division: &Element,
    kind: Region,
    table: &ReferenceTable,
    config: &ConverterConfig,
) -> Option<Section> {
    let nodes: Vec<&MarkupNode> = division
        .children
        .iter()
        .filter(|node| is_section_content(node))
        .collect();

    let paragraphs = |nodes: &[&MarkupNode]| -> Vec<String> {
        nodes
            .iter()
            .map(|node| reconstruct_paragraph(node, table))
            .collect()
    };

    match nodes.as_slice() {
        [] => None,
        [only] => Some(match heading_text(only) {
            Some(text) => {
                let level = match kind {
                    Region::Abstract => HeadingLevel::Sub,
                    Region::Body => HeadingLevel::Top,
                };
                Section::heading_only(format!("{}{}\n\n", level.prefix(), text))
            }
            None => Section::new(String::new(), paragraphs(nodes.as_slice())),
        }),
        [first, rest @ ..] => Some(match heading_text(first) {
            Some(text) => {
                let level = match kind {
                    Region::Abstract => HeadingLevel::Sub,
                    Region::Body => classify_heading(&text, config),
                };
                Section::new(format!("{}{}\n", level.prefix(), text), paragraphs(rest))
            }
            None => Section::new(String::new(), paragraphs(nodes.as_slice())),
        }),
    }
}

/// Children that make up a section: no indentation whitespace, no nested
/// divisions (handled as their own sections), no empty headings
fn is_section_content(node: &MarkupNode) -> bool {
    match node {
        MarkupNode::Text(_) => !node.is_blank_text(),
        MarkupNode::Element(element) => {
            !element.is_named("div") && !(element.is_named("head") && element.text().trim().is_empty())
        }
    }
}

fn heading_text(node: &MarkupNode) -> Option<String> {
    match node {
        MarkupNode::Text(text) => Some(text.trim().to_string()),
        MarkupNode::Element(element) if element.is_named("head") => {
            Some(element.text().trim().to_string())
        }
        MarkupNode::Element(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ReferenceRecord;
    use crate::tei::parse;

    fn config() -> ConverterConfig {
        ConverterConfig::default()
    }

    fn assemble(xml: &str) -> String {
        let root = parse(xml).unwrap();
        assemble_text(&root, &ReferenceTable::new(), &config())
    }

    #[test]
    fn test_classify_heading() {
        let config = config();
        assert_eq!(classify_heading("Results", &config), HeadingLevel::Top);
        assert_eq!(classify_heading("  RESULTS ", &config), HeadingLevel::Top);
        assert_eq!(classify_heading("Materials and Methods", &config), HeadingLevel::Top);
        assert_eq!(classify_heading("Statistical Methods", &config), HeadingLevel::Sub);
    }

    #[test]
    fn test_heading_and_paragraph_separators() {
        let text = assemble(
            r#"<TEI><text><body>
<div><head n="1">Results</head><p>First.</p><p>Second.</p></div>
<div><head n="1.1">Statistical Methods</head><p>Third.</p></div>
</body></text></TEI>"#,
        );
        assert_eq!(
            text,
            "# Results\nFirst.\nSecond.\n\n## Statistical Methods\nThird.\n\n"
        );
    }

    #[test]
    fn test_bare_text_heading() {
        let text = assemble("<TEI><text><body><div>Discussion<p>Body.</p></div></body></text></TEI>");
        assert_eq!(text, "# Discussion\nBody.\n\n");
    }

    #[test]
    fn test_single_child_divisions() {
        let text = assemble(
            "<TEI><text><body><div><head>Overview</head></div><div><p>Lone paragraph.</p></div><div/></body></text></TEI>",
        );
        assert_eq!(text, "# Overview\n\nLone paragraph.\n\n");
    }

    #[test]
    fn test_division_without_heading() {
        let text = assemble("<TEI><text><body><div><p>One.</p><p>Two.</p></div></body></text></TEI>");
        assert_eq!(text, "One.\nTwo.\n\n");
    }

    #[test]
    fn test_boilerplate_sections_dropped() {
        let text = assemble(
            r#"<TEI><text><body>
<div><head>Statistical Analysis</head><p>Kept.</p></div>
<div><head>Acknowledgements</head><p>We thank.</p></div>
<div><head>Conflict of Interest</head><p>None.</p></div>
</body></text></TEI>"#,
        );
        assert_eq!(text, "## Statistical Analysis\nKept.\n\n");
    }

    #[test]
    fn test_typed_boilerplate_blocks_dropped() {
        let text = assemble(
            r#"<TEI><text><body><div><head>Methods</head><p>Kept.</p></div></body>
<back>
<div type="acknowledgement"><div><p>Thanks to the lab.</p></div></div>
<div type="annex"><div><head>Ethics</head><p>Approved.</p></div></div>
<div type="references"><listBibl><biblStruct><analytic><title level="a">T</title></analytic></biblStruct></listBibl></div>
</back></text></TEI>"#,
        );
        assert_eq!(text, "# Methods\nKept.\n\n## Ethics\nApproved.\n\n");
    }

    #[test]
    fn test_abstract_emitted_first_with_sub_headings() {
        let text = assemble(
            r#"<TEI><teiHeader><profileDesc><abstract>
<div><head>Results</head><p>Abstract results.</p></div>
<div><p>Closing line.</p></div>
</abstract></profileDesc></teiHeader>
<text><body><div><head>Introduction</head><p>Intro.</p></div></body></text></TEI>"#,
        );
        assert_eq!(
            text,
            "# Abstract\n\n## Results\nAbstract results.\n\nClosing line.\n\n# Introduction\nIntro.\n\n"
        );
    }

    #[test]
    fn test_abstract_without_divisions() {
        let text = assemble(
            "<TEI><teiHeader><abstract><p>Plain abstract.</p></abstract></teiHeader><text><body/></text></TEI>",
        );
        assert_eq!(text, "# Abstract\n\nPlain abstract.\n\n");
    }

    #[test]
    fn test_empty_abstract_has_no_heading() {
        let text = assemble("<TEI><teiHeader><abstract/></teiHeader><text><body/></text></TEI>");
        assert_eq!(text, "");
    }

    #[test]
    fn test_missing_text_region() {
        assert_eq!(assemble("<TEI><teiHeader/></TEI>"), "");
    }

    #[test]
    fn test_paragraphs_resolve_citations() {
        let root = parse(
            r##"<TEI><text><body><div><head>Introduction</head><p>Known <ref type="bibr" target="#b0">[1]</ref>.</p></div></body></text></TEI>"##,
        )
        .unwrap();
        let table: ReferenceTable = vec![ReferenceRecord::new("b0", "A Study", "Smith J")]
            .into_iter()
            .collect();

        assert_eq!(
            assemble_text(&root, &table, &config()),
            "# Introduction\nKnown [bib_ref] A Study, Smith J [/bib_ref].\n\n"
        );
    }

    #[test]
    fn test_custom_vocabulary() {
        let root = parse(
            "<TEI><text><body><div><head>Ethics</head><p>A.</p></div><div><head>Background</head><p>B.</p></div></body></text></TEI>",
        )
        .unwrap();
        let config = ConverterConfig {
            top_level_headings: vec!["background".to_string()],
            boilerplate_headings: vec!["ethics".to_string()],
            abstract_heading: "Summary".to_string(),
        };

        assert_eq!(
            assemble_text(&root, &ReferenceTable::new(), &config),
            "# Background\nB.\n\n"
        );
    }
}
