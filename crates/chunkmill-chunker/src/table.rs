//! Table chunking.
//!
//! A table is never split inside a row. Small tables go out whole; large
//! ones are packed row-by-row under a repeated header. A header plus a
//! single data row that still breaches the ceiling is emitted over-limit
//! rather than truncated — truncating tabular data silently corrupts it.

use tracing::debug;

use chunkmill_core::{
    ChunkKind, ChunkResult, OversizeKind, OversizeWarning, StructuralElement, TableData,
};
use chunkmill_tokens::TokenCounter;

use crate::clause;

/// Auxiliary key set on continuation chunks whose header row is repeated
/// from the source table's first row.
pub const HEADER_REPEATED_KEY: &str = "header_repeated";

/// Render one row as a pipe-separated line.
fn render_row(cells: &[String]) -> String {
    cells.join(" | ")
}

/// Render a header plus a run of data rows, one line per row.
fn render(header: &[String], rows: &[Vec<String>]) -> String {
    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(render_row(header));
    for row in rows {
        lines.push(render_row(row));
    }
    lines.join("\n")
}

/// Build a table chunk from rendered content.
fn table_chunk(
    element: &StructuralElement,
    content: String,
    token_count: usize,
    header_repeated: bool,
) -> ChunkResult {
    let mut auxiliary = element.auxiliary.clone();
    if header_repeated {
        auxiliary.insert(HEADER_REPEATED_KEY.to_string(), serde_json::Value::Bool(true));
    }
    ChunkResult {
        content,
        token_count,
        section_hierarchy: element.section_hierarchy.clone(),
        heading_text: element.heading_text.clone(),
        clause_number: clause::extract(&element.section_hierarchy, &element.heading_text),
        page_numbers: element.page_numbers.clone(),
        has_overlap: false,
        kind: ChunkKind::Table,
        auxiliary,
    }
}

/// Chunk one table element.
///
/// `element_index` is the element's position in the input sequence, used
/// for warning provenance. An empty table (or one whose rows are all
/// blank) yields no chunks.
pub fn chunk_table(
    element_index: usize,
    table: &TableData,
    element: &StructuralElement,
    counter: &dyn TokenCounter,
    max_tokens: usize,
    out: &mut Vec<ChunkResult>,
    warnings: &mut Vec<OversizeWarning>,
) {
    let Some(header) = table.header() else {
        debug!(element_index, "skipping table with no rows");
        return;
    };
    let data_rows = table.data_rows();
    if data_rows.is_empty() && header.iter().all(|c| c.trim().is_empty()) {
        debug!(element_index, "skipping blank table");
        return;
    }

    // Whole table within the ceiling: one chunk.
    let whole = render(header, data_rows);
    let whole_tokens = counter.count(&whole);
    if whole_tokens <= max_tokens {
        out.push(table_chunk(element, whole, whole_tokens, false));
        return;
    }

    // Pack consecutive rows under a repeated header.
    let mut first_emitted = false;
    let mut pending: Vec<Vec<String>> = Vec::new();

    let mut flush =
        |pending: &mut Vec<Vec<String>>, first_emitted: &mut bool, out: &mut Vec<ChunkResult>| {
            if pending.is_empty() {
                return;
            }
            let content = render(header, pending);
            let tokens = counter.count(&content);
            out.push(table_chunk(element, content, tokens, *first_emitted));
            *first_emitted = true;
            pending.clear();
        };

    for row in data_rows {
        let alone = render(header, std::slice::from_ref(row));
        let alone_tokens = counter.count(&alone);
        if alone_tokens > max_tokens {
            // Documented exception: emit the row over-limit, never cut it.
            flush(&mut pending, &mut first_emitted, out);
            warnings.push(OversizeWarning {
                element_index,
                kind: OversizeKind::OverLimitTableRow,
                token_count: alone_tokens,
                max_tokens,
            });
            out.push(table_chunk(element, alone, alone_tokens, first_emitted));
            first_emitted = true;
            continue;
        }

        let mut candidate = pending.clone();
        candidate.push(row.clone());
        let candidate_tokens = counter.count(&render(header, &candidate));
        if candidate_tokens > max_tokens {
            flush(&mut pending, &mut first_emitted, out);
        }
        pending.push(row.clone());
    }
    flush(&mut pending, &mut first_emitted, out);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chunkmill_tokens::HeuristicCounter;

    fn element_for(rows: Vec<Vec<String>>) -> StructuralElement {
        StructuralElement::table(rows).with_hierarchy(&["7", "7.3"], "7.3 Limits")
    }

    fn run(rows: Vec<Vec<String>>, max_tokens: usize) -> (Vec<ChunkResult>, Vec<OversizeWarning>) {
        let element = element_for(rows);
        let table = element.content.as_table().unwrap().clone();
        let mut out = Vec::new();
        let mut warnings = Vec::new();
        chunk_table(0, &table, &element, &HeuristicCounter, max_tokens, &mut out, &mut warnings);
        (out, warnings)
    }

    fn row(a: &str, b: &str) -> Vec<String> {
        vec![a.to_string(), b.to_string()]
    }

    #[test]
    fn small_table_is_one_chunk() {
        let (chunks, warnings) = run(
            vec![row("ID", "Name"), row("1", "alpha"), row("2", "beta")],
            1000,
        );
        assert_eq!(chunks.len(), 1);
        assert!(warnings.is_empty());
        assert!(chunks[0].content.starts_with("ID | Name"));
        assert!(!chunks[0].auxiliary.contains_key(HEADER_REPEATED_KEY));
    }

    #[test]
    fn large_table_repeats_header_and_never_splits_rows() {
        let mut rows = vec![row("ID", "Name")];
        for i in 0..50 {
            rows.push(row(&i.to_string(), &"cell content here ".repeat(7)));
        }
        let (chunks, warnings) = run(rows, 200);
        assert!(chunks.len() > 1);
        assert!(warnings.is_empty());
        for (i, chunk) in chunks.iter().enumerate() {
            // Every chunk parses back into whole rows under the header.
            let mut lines = chunk.content.lines();
            assert_eq!(lines.next().unwrap(), "ID | Name");
            for line in lines {
                assert_eq!(line.matches(" | ").count(), 1);
            }
            assert!(chunk.token_count <= 200);
            assert_eq!(chunk.auxiliary.contains_key(HEADER_REPEATED_KEY), i > 0);
        }
    }

    #[test]
    fn giant_row_is_emitted_over_limit_with_warning() {
        let rows = vec![row("ID", "Name"), row("1", &"x".repeat(2000))];
        let (chunks, warnings) = run(rows, 100);
        assert_eq!(chunks.len(), 1);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, OversizeKind::OverLimitTableRow);
        assert!(chunks[0].token_count > 100);
        // The row survives intact.
        assert!(chunks[0].content.contains(&"x".repeat(2000)));
    }

    #[test]
    fn empty_table_yields_nothing() {
        let (chunks, warnings) = run(vec![], 1000);
        assert!(chunks.is_empty());
        assert!(warnings.is_empty());
    }

    #[test]
    fn table_chunks_carry_clause_number() {
        let (chunks, _) = run(vec![row("A", "B"), row("1", "2")], 1000);
        assert_eq!(chunks[0].clause_number.as_deref(), Some("7.3"));
    }
}
