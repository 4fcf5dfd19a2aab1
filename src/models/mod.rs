//! Core data models for converted articles and their bibliography.

mod record;
mod reference;

pub use record::ArticleRecord;
pub use reference::{ReferenceRecord, ReferenceTable};
