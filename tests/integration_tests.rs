//! Integration tests for TEI Article
//!
//! These tests convert GROBID-shaped documents end to end and check the
//! resulting records, the config layer and the exporters.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use tei_article::config::{load_config, ConverterConfig};
use tei_article::utils::{write_records, ExportFormat};
use tei_article::{convert, ArticleRecord, ConvertError, Converter};

const DOCUMENT: &str = r##"<?xml version="1.0" encoding="UTF-8"?>
<TEI xml:space="preserve" xmlns="http://www.tei-c.org/ns/1.0"
xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
  <teiHeader xml:lang="en">
    <fileDesc>
      <titleStmt>
        <title level="a" type="main">Gut microbiota &amp; host metabolism</title>
      </titleStmt>
      <publicationStmt>
        <publisher>Springer Science and Business Media LLC</publisher>
        <availability status="unknown"><licence/></availability>
        <date type="published" when="2024-05-21">21 May 2024</date>
      </publicationStmt>
      <sourceDesc>
        <biblStruct>
          <analytic>
            <author><persName><forename type="first">Ana</forename><surname>Silva</surname></persName></author>
            <title level="a" type="main">Gut microbiota &amp; host metabolism</title>
          </analytic>
          <monogr>
            <title level="j" type="main">Nature Communications</title>
            <imprint><publisher>Springer Nature</publisher><date type="published" when="2024-05-21"/></imprint>
          </monogr>
          <idno type="DOI">10.1038/s41467-024-48433-1</idno>
        </biblStruct>
      </sourceDesc>
    </fileDesc>
    <profileDesc>
      <abstract>
        <div xmlns="http://www.tei-c.org/ns/1.0"><p>Microbes shape metabolism <ref type="bibr" target="#b0">1</ref>.</p></div>
      </abstract>
    </profileDesc>
  </teiHeader>
  <text xml:lang="en">
    <body>
      <div xmlns="http://www.tei-c.org/ns/1.0"><head n="1">Introduction</head><p>Earlier studies <ref type="bibr" target="#b0">1</ref><ref type="bibr" target="#b1">2</ref> linked diet to growth <ref type="bibr" target="#b5">6</ref>.</p><p>Mice were heavier (Fig. <ref type="figure" target="#fig_0">1a</ref>) than controls.</p></div>
      <div xmlns="http://www.tei-c.org/ns/1.0"><head n="1.1">Statistical Analysis</head><p>Data were analysed in R (Supplementary Table 2).</p></div>
      <div xmlns="http://www.tei-c.org/ns/1.0"><head>Acknowledgements</head><p>We thank the core facility.</p></div>
    </body>
    <back>
      <div type="acknowledgement">
        <div xmlns="http://www.tei-c.org/ns/1.0"><head>Funding</head><p>Funded by the X Foundation.</p></div>
      </div>
      <div type="references">
        <listBibl>
          <biblStruct xml:id="b0">
            <analytic>
              <title level="a" type="main">Diet and growth</title>
              <author><persName><forename type="first">J</forename><forename type="middle">Q</forename><surname>Doe</surname></persName></author>
            </analytic>
            <monogr><title level="j">Cell</title><imprint><date type="published" when="2019"/></imprint></monogr>
          </biblStruct>
          <biblStruct xml:id="b1">
            <monogr>
              <title level="m" type="main">Metabolic Pathways</title>
              <author><persName><forename type="first">R</forename><surname>Smith</surname></persName></author>
              <imprint><date type="published" when="2015"/></imprint>
            </monogr>
          </biblStruct>
          <biblStruct xml:id="b2">
            <monogr><title level="j">Science</title>
              <author><persName><surname>Lee</surname></persName></author>
            </monogr>
          </biblStruct>
          <biblStruct xml:id="b3">
            <analytic><title level="a" type="main">Anonymous report</title></analytic>
          </biblStruct>
        </listBibl>
      </div>
    </back>
  </text>
</TEI>
"##;

const EXPECTED_TEXT: &str = "# Abstract\n\n\
Microbes shape metabolism [bib_ref] Diet and growth, Doe JQ [/bib_ref].\n\n\
# Introduction\n\
Earlier studies [bib_ref] Diet and growth, Doe JQ [/bib_ref] [bib_ref] Metabolic Pathways, Smith R [/bib_ref] linked diet to growth .\n\
Mice were heavier than controls.\n\n\
## Statistical Analysis\n\
Data were analysed in R.\n\n";

/// Shared in-memory sink for formatted log lines
#[derive(Clone, Default)]
struct Capture(Arc<Mutex<Vec<u8>>>);

impl Capture {
    fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_full_record() {
    let record = convert(DOCUMENT).unwrap();

    assert_eq!(record.title, "Gut microbiota & host metabolism");
    assert_eq!(record.language, "en");
    assert_eq!(record.publisher, "Springer Nature");
    assert_eq!(record.journal, "Nature Communications");
    assert_eq!(record.release_year, "2024-05-21");
    assert_eq!(record.doi, "10.1038/s41467-024-48433-1");
    assert_eq!(record.text, EXPECTED_TEXT);
}

#[test]
fn test_referencecount_counts_complete_entries_only() {
    let record = convert(DOCUMENT).unwrap();
    // b2 has no article or monograph title, b3 has no author
    assert_eq!(record.referencecount, 2);
}

#[test]
fn test_boilerplate_sections_removed() {
    let record = convert(DOCUMENT).unwrap();

    assert!(!record.text.contains("Acknowledgements"));
    assert!(!record.text.contains("core facility"));
    assert!(!record.text.contains("X Foundation"));
    assert!(record.text.contains("## Statistical Analysis\n"));
}

#[test]
fn test_missing_doi_still_converts() {
    let without_doi = DOCUMENT.replace(
        r#"<idno type="DOI">10.1038/s41467-024-48433-1</idno>"#,
        "",
    );
    let record = convert(&without_doi).unwrap();

    assert_eq!(record.doi, "");
    assert_eq!(record.export_stem(), None);
    assert_eq!(record.title, "Gut microbiota & host metabolism");
    assert_eq!(record.text, EXPECTED_TEXT);
}

#[test]
fn test_document_without_references() {
    let record = convert(
        r##"<TEI><text><body><div><head>Results</head><p>See <ref type="bibr" target="#b0">[1]</ref> and <ref type="table" target="#tab_0">Table 1</ref>.</p></div></body></text></TEI>"##,
    )
    .unwrap();

    assert_eq!(record.referencecount, 0);
    assert_eq!(record.text, "# Results\nSee and .\n\n");
    assert_eq!(
        ArticleRecord {
            text: String::new(),
            ..record
        },
        ArticleRecord::default()
    );
}

#[test]
fn test_malformed_markup_is_fatal() {
    let truncated = &DOCUMENT[..DOCUMENT.len() / 2];
    let err = convert(truncated).unwrap_err();

    assert!(matches!(err, ConvertError::MalformedMarkup { .. }));
    assert!(err.to_string().starts_with("Malformed markup at byte"));

    assert!(matches!(
        convert("not markup at all"),
        Err(ConvertError::MalformedMarkup { .. })
    ));
}

#[test]
fn test_injected_dispatch_receives_events() {
    let capture = Capture::default();
    let writer = capture.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();

    let converter = Converter::default().with_dispatch(tracing::Dispatch::new(subscriber));
    let record = converter.convert(DOCUMENT).unwrap();
    assert_eq!(record.referencecount, 2);

    let logs = capture.contents();
    assert!(logs.contains("Converted document"));
    assert!(logs.contains("referencecount=2"));
    assert!(logs.contains("Unresolved citation target"));
    assert!(logs.contains("Dropping boilerplate section"));
}

#[test]
fn test_custom_vocabulary() {
    let config = ConverterConfig {
        boilerplate_headings: vec!["statistical".to_string()],
        ..ConverterConfig::default()
    };
    let record = Converter::new(config).convert(DOCUMENT).unwrap();

    assert!(!record.text.contains("Statistical"));
    assert!(record.text.contains("## Acknowledgements\nWe thank the core facility.\n\n"));
    assert!(record.text.contains("## Funding\nFunded by the X Foundation.\n\n"));
}

#[test]
fn test_config_file_drives_converter() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tei-article.toml");
    std::fs::write(
        &path,
        r#"
[converter]
abstract_heading = "Summary"
top_level_headings = ["introduction", "statistical analysis"]
"#,
    )
    .unwrap();

    let config = load_config(&path).unwrap();
    let record = Converter::new(config.converter).convert(DOCUMENT).unwrap();

    assert!(record.text.starts_with("# Summary\n\n"));
    assert!(record.text.contains("# Statistical Analysis\n"));
    assert!(!record.text.contains("## Statistical Analysis"));
}

#[test]
fn test_csv_export() {
    let record = convert(DOCUMENT).unwrap();
    let mut out = Vec::new();
    write_records(&[record.clone()], ExportFormat::Csv, &mut out).unwrap();

    let mut reader = csv::Reader::from_reader(out.as_slice());
    let headers = reader.headers().unwrap().clone();
    assert_eq!(
        headers.iter().collect::<Vec<_>>(),
        vec!["title", "language", "publisher", "journal", "release_year", "doi", "referencecount", "text"]
    );

    let rows: Vec<ArticleRecord> = reader.deserialize().map(|r| r.unwrap()).collect();
    assert_eq!(rows, vec![record]);
}
