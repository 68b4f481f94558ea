//! Shared strings table.

use deckguide_core::package::{escape_xml, XML_DECLARATION};
use std::collections::HashMap;
use std::fmt::Write as FmtWrite;

/// Unique cell strings in first-seen order.
#[derive(Debug, Default)]
pub struct SharedStrings {
    strings: Vec<String>,
    index: HashMap<String, usize>,
    /// Total number of string cells, including repeats.
    references: usize,
}

impl SharedStrings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a string and return its index, reusing the existing entry for repeats.
    pub fn add(&mut self, s: &str) -> usize {
        self.references += 1;
        if let Some(&idx) = self.index.get(s) {
            return idx;
        }
        let idx = self.strings.len();
        self.strings.push(s.to_string());
        self.index.insert(s.to_string(), idx);
        idx
    }

    /// Number of unique strings.
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    pub fn to_xml(&self) -> String {
        let mut xml = String::with_capacity(256 + self.strings.len() * 64);
        xml.push_str(XML_DECLARATION);
        let _ = write!(
            xml,
            r#"<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="{}" uniqueCount="{}">"#,
            self.references,
            self.strings.len()
        );
        for s in &self.strings {
            // keep leading/trailing spaces and newlines intact
            let _ = write!(xml, r#"<si><t xml:space="preserve">{}</t></si>"#, escape_xml(s));
        }
        xml.push_str("</sst>");
        xml
    }
}
