//! Utility modules supporting conversion.
//!
//! - [`decode_html_entities`], [`strip_markup_tags`], [`normalize_heading`]:
//!   text cleanup used by the extractors
//! - [`write_records`], [`write_csv`], [`write_json`], [`write_text`]: record
//!   export in the formats of [`ExportFormat`]
//!
//! # Export
//!
//! ```rust
//! use tei_article::models::ArticleRecord;
//! use tei_article::utils::{write_records, ExportFormat};
//!
//! let record = ArticleRecord {
//!     title: "A Study".to_string(),
//!     ..Default::default()
//! };
//! let mut out = Vec::new();
//! write_records(&[record], ExportFormat::Csv, &mut out).unwrap();
//! assert!(String::from_utf8(out).unwrap().starts_with("title,language"));
//! ```

mod export;
mod text;

pub use export::{
    write_csv, write_json, write_records, write_text, ExportError, ExportFormat, CSV_HEADER,
};
pub use text::{decode_html_entities, normalize_heading, strip_markup_tags};
