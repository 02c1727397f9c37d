//! Token counting trait and the heuristic fallback counter.
//!
//! The `TokenCounter` trait abstracts over token accounting.
//! Implementations:
//! - `HfCounter`: HuggingFace `tokenizers` encoding (requires the `hf` feature)
//! - `HeuristicCounter`: deterministic length-based approximation, always available

/// Trait for token accounting backends.
///
/// Implementations must be deterministic: the same text always yields the
/// same count for the lifetime of the counter. Counters are shared
/// read-only across threads, so no method takes `&mut self`.
pub trait TokenCounter: Send + Sync {
    /// Count tokens in a text.
    fn count(&self, text: &str) -> usize;

    /// Cut `text` down to at most `max_tokens` tokens.
    ///
    /// The result is a prefix of the input ending on a `char` boundary;
    /// re-counting it yields ≤ `max_tokens`.
    fn truncate(&self, text: &str, max_tokens: usize) -> String;

    /// Name of the encoding scheme, for logging.
    fn name(&self) -> &str;
}

/// Bytes per token assumed by the heuristic counter. Average English text
/// runs ~4 characters per BPE token.
const BYTES_PER_TOKEN: usize = 4;

/// Length-based counter used when no tokenizer file is available.
///
/// Approximate but deterministic, which is all the chunker needs: chunk
/// boundaries derived from it are byte-identical across runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicCounter;

impl TokenCounter for HeuristicCounter {
    fn count(&self, text: &str) -> usize {
        if text.is_empty() {
            return 0;
        }
        (text.len() / BYTES_PER_TOKEN).max(1)
    }

    fn truncate(&self, text: &str, max_tokens: usize) -> String {
        if self.count(text) <= max_tokens {
            return text.to_string();
        }
        if max_tokens == 0 {
            return String::new();
        }
        let mut end = (max_tokens * BYTES_PER_TOKEN).min(text.len());
        while end > 0 && !text.is_char_boundary(end) {
            end -= 1;
        }
        text[..end].to_string()
    }

    fn name(&self) -> &str {
        "heuristic"
    }
}
