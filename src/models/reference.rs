//! Bibliography entries resolved from the TEI references division.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One bibliography entry, reduced to what inline citations need
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceRecord {
    /// Raw identifier from the entry's `xml:id` (e.g. `b3`)
    pub id: String,

    /// Article title, or monograph title when there is no article level
    pub title: String,

    /// First author as "Surname FirstMiddle"
    pub author: String,
}

impl ReferenceRecord {
    pub fn new(id: impl Into<String>, title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            author: author.into(),
        }
    }

    /// Inline citation text substituted for a resolved marker
    pub fn citation(&self) -> String {
        format!("[bib_ref] {}, {} [/bib_ref]", self.title, self.author)
    }
}

/// Identifier to reference mapping for one document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceTable {
    entries: HashMap<String, ReferenceRecord>,
}

impl ReferenceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record, replacing any earlier record with the same id
    pub fn insert(&mut self, record: ReferenceRecord) -> Option<ReferenceRecord> {
        self.entries.insert(record.id.clone(), record)
    }

    pub fn get(&self, id: &str) -> Option<&ReferenceRecord> {
        self.entries.get(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<ReferenceRecord> for ReferenceTable {
    fn from_iter<I: IntoIterator<Item = ReferenceRecord>>(iter: I) -> Self {
        let mut table = ReferenceTable::new();
        for record in iter {
            table.insert(record);
        }
        table
    }
}
