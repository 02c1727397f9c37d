//! Built-in markdown/plaintext structural parser.
//!
//! Covers the formats the engine can parse without external tooling: ATX
//! headings, pipe tables, list blocks, and blank-line-delimited
//! paragraphs. Rich formats (PDF, DOCX) are external collaborators and
//! register their own `StructuralParser` implementations.

use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use chunkmill_core::{
    DocumentMetadata, ElementKind, Error, Result, StructuralElement,
};

use crate::parser::StructuralParser;

static ATX_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(#{1,6})\s+(.+?)\s*#*\s*$").expect("valid heading regex"));
static CLAUSE_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+(?:\.\d+){0,4})\b").expect("valid clause prefix regex"));
static LIST_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?:[-*+]|\d+[.)])\s+").expect("valid list line regex"));
static TABLE_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\|?[\s:|-]+\|?\s*$").expect("valid separator regex"));

/// Outline label for a heading: its leading clause number when present,
/// otherwise the full heading text.
fn outline_label(heading: &str) -> String {
    CLAUSE_PREFIX
        .captures(heading)
        .map(|caps| caps[1].to_string())
        .unwrap_or_else(|| heading.to_string())
}

fn split_table_row(line: &str) -> Vec<String> {
    line.trim()
        .trim_start_matches('|')
        .trim_end_matches('|')
        .split('|')
        .map(|cell| cell.trim().to_string())
        .collect()
}

fn push_text(
    elements: &mut Vec<StructuralElement>,
    kind: ElementKind,
    content: String,
    outline: &[String],
    heading: &str,
) {
    if content.trim().is_empty() {
        return;
    }
    let mut element = StructuralElement::text(kind, content);
    element.section_hierarchy = outline.to_vec();
    element.heading_text = heading.to_string();
    elements.push(element);
}

#[derive(Clone, Copy)]
pub struct MarkdownParser;

impl MarkdownParser {
    fn parse_text(&self, text: &str, document_id: &str, extension: &str) -> (DocumentMetadata, Vec<StructuralElement>) {
        let mut elements: Vec<StructuralElement> = Vec::new();
        // Heading labels by level, 1-based; truncated on each new heading.
        let mut outline: Vec<String> = Vec::new();
        let mut heading_text = String::new();
        let mut title: Option<String> = None;

        let lines: Vec<&str> = text.lines().collect();
        let mut paragraph: Vec<&str> = Vec::new();
        let mut list: Vec<&str> = Vec::new();
        let mut table_rows: Vec<Vec<String>> = Vec::new();
        let mut i = 0;

        macro_rules! flush_pending {
            () => {
                if !paragraph.is_empty() {
                    push_text(
                        &mut elements,
                        ElementKind::Paragraph,
                        paragraph.join("\n"),
                        &outline,
                        &heading_text,
                    );
                    paragraph.clear();
                }
                if !list.is_empty() {
                    push_text(
                        &mut elements,
                        ElementKind::List,
                        list.join("\n"),
                        &outline,
                        &heading_text,
                    );
                    list.clear();
                }
                if !table_rows.is_empty() {
                    let mut element = StructuralElement::table(std::mem::take(&mut table_rows));
                    element.section_hierarchy = outline.clone();
                    element.heading_text = heading_text.clone();
                    elements.push(element);
                }
            };
        }

        while i < lines.len() {
            let line = lines[i];

            if let Some(caps) = ATX_HEADING.captures(line) {
                flush_pending!();
                let level = caps[1].len();
                let text = caps[2].trim().to_string();
                if title.is_none() {
                    title = Some(text.clone());
                }
                outline.truncate(level.saturating_sub(1));
                outline.push(outline_label(&text));
                heading_text = text.clone();
                push_text(
                    &mut elements,
                    ElementKind::Heading,
                    text,
                    &outline,
                    &heading_text,
                );
            } else if line.trim_start().starts_with('|') {
                if !paragraph.is_empty() || !list.is_empty() {
                    flush_pending!();
                }
                if !TABLE_SEPARATOR.is_match(line) {
                    table_rows.push(split_table_row(line));
                }
            } else if LIST_LINE.is_match(line) {
                if !paragraph.is_empty() || !table_rows.is_empty() {
                    flush_pending!();
                }
                list.push(line.trim());
            } else if line.trim().is_empty() {
                flush_pending!();
            } else {
                if !list.is_empty() || !table_rows.is_empty() {
                    flush_pending!();
                }
                paragraph.push(line.trim());
            }
            i += 1;
        }
        flush_pending!();

        let metadata = DocumentMetadata {
            document_id: document_id.to_string(),
            document_title: title.unwrap_or_else(|| document_id.to_string()),
            document_type: if extension == "txt" { "text" } else { "markdown" }.to_string(),
        };
        (metadata, elements)
    }
}

impl StructuralParser for MarkdownParser {
    fn parse(&self, path: &Path) -> Result<(DocumentMetadata, Vec<StructuralElement>)> {
        if !path.exists() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }
        let raw = std::fs::read_to_string(path)
            .map_err(|e| Error::Parse(format!("{}: {}", path.display(), e)))?;

        let document_id = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("document")
            .to_string();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        Ok(self.parse_text(&raw, &document_id, &extension))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chunkmill_core::ElementContent;

    fn parse(text: &str) -> (DocumentMetadata, Vec<StructuralElement>) {
        MarkdownParser.parse_text(text, "doc", "md")
    }

    #[test]
    fn headings_build_the_outline() {
        let (_, elements) = parse("# 4 Requirements\n\n## 4.2 Interfaces\n\nBody text here.\n");
        let paragraph = elements
            .iter()
            .find(|e| e.kind == ElementKind::Paragraph)
            .unwrap();
        assert_eq!(paragraph.section_hierarchy, vec!["4", "4.2"]);
        assert_eq!(paragraph.heading_text, "4.2 Interfaces");
    }

    #[test]
    fn sibling_heading_replaces_outline_level() {
        let (_, elements) = parse("# 4 One\n\n## 4.1 A\n\n## 4.2 B\n\ntail\n");
        let paragraph = elements.last().unwrap();
        assert_eq!(paragraph.section_hierarchy, vec!["4", "4.2"]);
    }

    #[test]
    fn pipe_table_becomes_a_grid() {
        let (_, elements) = parse("| ID | Name |\n| --- | --- |\n| 1 | alpha |\n| 2 | beta |\n");
        let table = elements
            .iter()
            .find_map(|e| e.content.as_table())
            .expect("table element");
        assert_eq!(table.header().unwrap(), ["ID", "Name"]);
        assert_eq!(table.data_rows().len(), 2);
    }

    #[test]
    fn list_block_is_one_element() {
        let (_, elements) = parse("- first item\n- second item\n- third item\n");
        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].kind, ElementKind::List);
        match &elements[0].content {
            ElementContent::Text(text) => assert_eq!(text.lines().count(), 3),
            _ => panic!("expected text content"),
        }
    }

    #[test]
    fn title_comes_from_first_heading() {
        let (metadata, _) = parse("# Widget Interface Standard\n\nbody\n");
        assert_eq!(metadata.document_title, "Widget Interface Standard");
    }

    #[test]
    fn non_numeric_headings_keep_full_text_as_label() {
        let (_, elements) = parse("# Introduction\n\nbody\n");
        assert_eq!(elements[0].section_hierarchy, vec!["Introduction"]);
    }

    #[test]
    fn missing_file_is_distinguishable() {
        let result = MarkdownParser.parse(Path::new("/nonexistent/standard.md"));
        assert!(matches!(result, Err(Error::FileNotFound(_))));
    }
}
