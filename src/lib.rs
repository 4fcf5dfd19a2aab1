//! # TEI Article
//!
//! Converts GROBID TEI XML into a flat article record: header metadata, a
//! reference count, and the article text organized into markdown-style
//! sections with inline citations resolved.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`models`]: Core data structures (ArticleRecord, ReferenceTable)
//! - [`tei`]: Markup tree, metadata extractors, reference table, paragraph
//!   reconstruction and section assembly
//! - [`convert`]: The [`Converter`] that composes a record from a document
//! - [`config`]: Configuration management
//! - [`utils`]: Text cleanup and record export
//!
//! ## Example
//!
//! ```rust
//! let markup = r#"<TEI><teiHeader xml:lang="en"/><text><body>
//!   <div><head>Results</head><p>It works.</p></div>
//! </body></text></TEI>"#;
//!
//! let record = tei_article::convert(markup).unwrap();
//! assert_eq!(record.language, "en");
//! assert_eq!(record.text, "# Results\nIt works.\n\n");
//! ```

pub mod config;
pub mod convert;
pub mod models;
pub mod tei;
pub mod utils;

// Re-export commonly used types
pub use convert::{convert, Converter};
pub use models::ArticleRecord;
pub use tei::ConvertError;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
