//! Overlap injection between consecutive text chunks.
//!
//! The trailing portion of the previous chunk is duplicated at the start
//! of the next one so context survives the cut. Sizing is approximated at
//! word granularity rather than re-tokenizing candidate tails.

use chunkmill_core::{ChunkKind, ChunkResult};
use chunkmill_tokens::TokenCounter;

/// Marker line separating injected overlap from the chunk body.
pub const OVERLAP_MARKER: &str = "[...]";

/// Take the trailing words of `previous` worth roughly `budget_tokens`.
///
/// Words are appended from the end until the running token count reaches
/// the budget. Returns `None` when the budget is zero or the previous
/// content has no words.
pub fn trailing_context(
    previous: &str,
    budget_tokens: usize,
    counter: &dyn TokenCounter,
) -> Option<String> {
    if budget_tokens == 0 {
        return None;
    }
    let words: Vec<&str> = previous.split_whitespace().collect();
    if words.is_empty() {
        return None;
    }

    let mut taken = 0usize;
    let mut tokens = 0usize;
    while taken < words.len() {
        let candidate = words[words.len() - taken - 1..].join(" ");
        let candidate_tokens = counter.count(&candidate);
        if candidate_tokens > budget_tokens && taken > 0 {
            break;
        }
        tokens = candidate_tokens;
        taken += 1;
        if tokens >= budget_tokens {
            break;
        }
    }

    Some(words[words.len() - taken..].join(" "))
}

/// Prefix `body` with overlap drawn from `previous`, keeping the final
/// chunk within `max_tokens`. The tail shrinks word-by-word if the
/// combined content would breach the ceiling; an empty tail means no
/// overlap at all.
///
/// Returns `(content, has_overlap)`.
pub fn inject(
    previous: &str,
    body: &str,
    budget_tokens: usize,
    max_tokens: usize,
    counter: &dyn TokenCounter,
) -> (String, bool) {
    let Some(tail) = trailing_context(previous, budget_tokens, counter) else {
        return (body.to_string(), false);
    };

    let mut tail_words: Vec<&str> = tail.split_whitespace().collect();
    while !tail_words.is_empty() {
        let content = format!("{}\n{}\n{}", tail_words.join(" "), OVERLAP_MARKER, body);
        if counter.count(&content) <= max_tokens {
            return (content, true);
        }
        // Drop the furthest-back word and retry.
        tail_words.remove(0);
    }

    (body.to_string(), false)
}

/// Run the overlap pass over a finished chunk sequence.
///
/// Overlap flows only within same-kind text runs: the document's first
/// chunk, every table chunk, and the first text chunk after a table stay
/// untouched. The overlap budget is the configured token count capped at
/// ~20% of the predecessor's size.
pub fn apply(
    chunks: &mut [ChunkResult],
    overlap_tokens: usize,
    max_tokens: usize,
    counter: &dyn TokenCounter,
) {
    for i in 1..chunks.len() {
        if chunks[i].kind != ChunkKind::Text || chunks[i - 1].kind != ChunkKind::Text {
            continue;
        }
        let budget = overlap_tokens.min(chunks[i - 1].token_count / 5);
        if budget == 0 {
            continue;
        }
        let previous = chunks[i - 1].content.clone();
        let (content, has_overlap) =
            inject(&previous, &chunks[i].content, budget, max_tokens, counter);
        if has_overlap {
            chunks[i].token_count = counter.count(&content);
            chunks[i].content = content;
            chunks[i].has_overlap = true;
        }
    }
}
