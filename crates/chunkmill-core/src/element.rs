//! Structural elements — the parser-facing input model.
//!
//! A parsed document arrives as an ordered list of typed elements, each
//! carrying its position in the heading outline. The element kinds form a
//! closed set so table-specific data never appears on text variants.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// The kind of a structural element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Heading,
    Paragraph,
    Table,
    List,
    Figure,
}

impl ElementKind {
    /// Whether this kind carries flowing text (everything but tables).
    pub fn is_text(&self) -> bool {
        !matches!(self, Self::Table)
    }
}

/// A table grid. The first row is the header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableData {
    pub rows: Vec<Vec<String>>,
}

impl TableData {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    /// Header row, if the table has any rows at all.
    pub fn header(&self) -> Option<&[String]> {
        self.rows.first().map(|r| r.as_slice())
    }

    /// Rows after the header.
    pub fn data_rows(&self) -> &[Vec<String>] {
        if self.rows.is_empty() {
            &[]
        } else {
            &self.rows[1..]
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Element content: text for headings/paragraphs/lists/figures, a grid for
/// tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementContent {
    Text(String),
    Table(TableData),
}

impl ElementContent {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(t) => Some(t),
            Self::Table(_) => None,
        }
    }

    pub fn as_table(&self) -> Option<&TableData> {
        match self {
            Self::Text(_) => None,
            Self::Table(t) => Some(t),
        }
    }
}

/// One parsed building block of a document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuralElement {
    pub kind: ElementKind,
    pub content: ElementContent,
    /// Heading labels from the document root down to the containing
    /// section, e.g. `["4", "4.2", "4.2.3"]`. Empty before any heading.
    #[serde(default)]
    pub section_hierarchy: Vec<String>,
    /// Literal text of the nearest enclosing heading, or empty.
    #[serde(default)]
    pub heading_text: String,
    /// 1-based page numbers the element spans.
    #[serde(default)]
    pub page_numbers: BTreeSet<u32>,
    /// Free-form extras: caption text, figure references, etc.
    #[serde(default)]
    pub auxiliary: BTreeMap<String, serde_json::Value>,
}

impl StructuralElement {
    /// A text-bearing element with no outline position.
    pub fn text(kind: ElementKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: ElementContent::Text(content.into()),
            section_hierarchy: Vec::new(),
            heading_text: String::new(),
            page_numbers: BTreeSet::new(),
            auxiliary: BTreeMap::new(),
        }
    }

    /// A table element with no outline position.
    pub fn table(rows: Vec<Vec<String>>) -> Self {
        Self {
            kind: ElementKind::Table,
            content: ElementContent::Table(TableData::new(rows)),
            section_hierarchy: Vec::new(),
            heading_text: String::new(),
            page_numbers: BTreeSet::new(),
            auxiliary: BTreeMap::new(),
        }
    }

    pub fn with_hierarchy(mut self, hierarchy: &[&str], heading: &str) -> Self {
        self.section_hierarchy = hierarchy.iter().map(|s| s.to_string()).collect();
        self.heading_text = heading.to_string();
        self
    }

    pub fn with_pages(mut self, pages: &[u32]) -> Self {
        self.page_numbers = pages.iter().copied().collect();
        self
    }
}
