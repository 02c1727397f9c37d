//! Small-chunk merging post-pass.
//!
//! Chunks below the configured threshold are folded into a neighbor
//! instead of emitted standalone: into the next chunk, or into the
//! previous one when no next is available. Only text chunks merge — a
//! table chunk's content must keep parsing back into header + whole
//! rows — and a merge never pushes the result past the token ceiling.

use chunkmill_core::{ChunkKind, ChunkResult};
use chunkmill_tokens::TokenCounter;

use crate::clause;

/// Fold `second` onto the end of `first` (document order is preserved).
fn combine(first: &ChunkResult, second: &ChunkResult, counter: &dyn TokenCounter) -> ChunkResult {
    let content = format!("{}\n\n{}", first.content, second.content);
    let token_count = counter.count(&content);

    // The deeper outline position wins; the donor usually continues the
    // same section.
    let section_hierarchy = if second.section_hierarchy.len() > first.section_hierarchy.len() {
        second.section_hierarchy.clone()
    } else {
        first.section_hierarchy.clone()
    };
    let heading_text = if !first.heading_text.is_empty() {
        first.heading_text.clone()
    } else {
        second.heading_text.clone()
    };
    let clause_number = clause::extract(&section_hierarchy, &heading_text)
        .or_else(|| first.clause_number.clone())
        .or_else(|| second.clause_number.clone());

    let mut page_numbers = first.page_numbers.clone();
    page_numbers.extend(second.page_numbers.iter().copied());
    let mut auxiliary = first.auxiliary.clone();
    auxiliary.extend(second.auxiliary.clone());

    ChunkResult {
        content,
        token_count,
        section_hierarchy,
        heading_text,
        clause_number,
        page_numbers,
        has_overlap: first.has_overlap,
        kind: first.kind,
        auxiliary,
    }
}

fn mergeable(a: &ChunkResult, b: &ChunkResult) -> bool {
    a.kind == ChunkKind::Text && b.kind == ChunkKind::Text
}

/// Re-apply merging until no chunk remains below `threshold` or no legal
/// merge is left.
pub fn merge_small(
    mut chunks: Vec<ChunkResult>,
    threshold: usize,
    max_tokens: usize,
    counter: &dyn TokenCounter,
) -> Vec<ChunkResult> {
    loop {
        if chunks.len() <= 1 {
            return chunks;
        }

        let mut merged_any = false;
        let mut i = 0;
        while i < chunks.len() && chunks.len() > 1 {
            if chunks[i].token_count >= threshold {
                i += 1;
                continue;
            }

            // Prefer merging forward into the next chunk.
            if i + 1 < chunks.len() && mergeable(&chunks[i], &chunks[i + 1]) {
                let combined = combine(&chunks[i], &chunks[i + 1], counter);
                if combined.token_count <= max_tokens {
                    chunks[i + 1] = combined;
                    chunks.remove(i);
                    merged_any = true;
                    continue;
                }
            }

            // Otherwise fold backward into the previous chunk.
            if i > 0 && mergeable(&chunks[i - 1], &chunks[i]) {
                let combined = combine(&chunks[i - 1], &chunks[i], counter);
                if combined.token_count <= max_tokens {
                    chunks[i - 1] = combined;
                    chunks.remove(i);
                    merged_any = true;
                    continue;
                }
            }

            i += 1;
        }

        if !merged_any {
            return chunks;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chunkmill_tokens::HeuristicCounter;
    use std::collections::{BTreeMap, BTreeSet};

    fn text_chunk(content: &str) -> ChunkResult {
        ChunkResult {
            content: content.to_string(),
            token_count: HeuristicCounter.count(content),
            section_hierarchy: vec![],
            heading_text: String::new(),
            clause_number: None,
            page_numbers: BTreeSet::new(),
            has_overlap: false,
            kind: ChunkKind::Text,
            auxiliary: BTreeMap::new(),
        }
    }

    fn table_chunk(content: &str) -> ChunkResult {
        ChunkResult {
            kind: ChunkKind::Table,
            ..text_chunk(content)
        }
    }

    #[test]
    fn small_chunk_merges_forward() {
        let chunks = vec![text_chunk("tiny"), text_chunk(&"body ".repeat(200))];
        let merged = merge_small(chunks, 100, 1000, &HeuristicCounter);
        assert_eq!(merged.len(), 1);
        assert!(merged[0].content.starts_with("tiny\n\n"));
    }

    #[test]
    fn trailing_small_chunk_merges_backward() {
        let big = "body ".repeat(720);
        let chunks = vec![text_chunk(&big), text_chunk("closing remark")];
        let merged = merge_small(chunks, 100, 1000, &HeuristicCounter);
        assert_eq!(merged.len(), 1);
        assert!(merged[0].content.ends_with("closing remark"));
        assert!(merged[0].content.starts_with(big.trim_end()));
    }

    #[test]
    fn merge_converges_below_threshold() {
        let chunks = vec![
            text_chunk(&"a ".repeat(40)),
            text_chunk(&"b ".repeat(40)),
            text_chunk(&"c ".repeat(40)),
            text_chunk(&"d ".repeat(800)),
        ];
        let merged = merge_small(chunks, 100, 1000, &HeuristicCounter);
        assert!(merged.iter().all(|c| c.token_count >= 100) || merged.len() == 1);
    }

    #[test]
    fn table_chunks_are_left_alone() {
        let chunks = vec![table_chunk("H | V\n1 | 2"), text_chunk(&"body ".repeat(200))];
        let merged = merge_small(chunks, 100, 1000, &HeuristicCounter);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].kind, ChunkKind::Table);
    }

    #[test]
    fn merge_never_breaches_the_ceiling() {
        let chunks = vec![text_chunk(&"a ".repeat(150)), text_chunk(&"b ".repeat(1900))];
        let merged = merge_small(chunks, 100, 1000, &HeuristicCounter);
        // 75 + 950 tokens will not fit under 1000; the small chunk stays.
        assert_eq!(merged.len(), 2);
        assert!(merged.iter().all(|c| c.token_count <= 1000));
    }

    #[test]
    fn pages_and_hierarchy_survive_a_merge() {
        let mut small = text_chunk("tiny");
        small.page_numbers = [3].into_iter().collect();
        let mut big = text_chunk(&"body ".repeat(200));
        big.page_numbers = [4].into_iter().collect();
        big.section_hierarchy = vec!["4".into(), "4.2".into()];
        let merged = merge_small(vec![small, big], 100, 1000, &HeuristicCounter);
        assert_eq!(merged.len(), 1);
        assert!(merged[0].page_numbers.contains(&3));
        assert!(merged[0].page_numbers.contains(&4));
        assert_eq!(merged[0].section_hierarchy, vec!["4", "4.2"]);
        assert_eq!(merged[0].clause_number.as_deref(), Some("4.2"));
    }
}
