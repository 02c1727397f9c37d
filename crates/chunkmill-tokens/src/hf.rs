//! HuggingFace tokenizer-backed counter.
//!
//! Loads a `tokenizer.json` encoding and keeps the handle cached for the
//! lifetime of the counter. Requires the `hf` feature.

#[cfg(feature = "hf")]
mod inner {
    use std::path::Path;

    use tokenizers::Tokenizer;
    use tracing::info;

    use chunkmill_core::{Error, Result};

    use crate::counter::TokenCounter;

    /// Exact token accounting via a HuggingFace `tokenizers` encoding.
    ///
    /// The encoder handle is loaded once and shared read-only; `encode`
    /// takes `&self`, so the counter is safe behind an `Arc` across
    /// concurrent callers.
    pub struct HfCounter {
        tokenizer: Tokenizer,
        name: String,
    }

    impl HfCounter {
        /// Load a tokenizer from a `tokenizer.json` file.
        pub fn load(tokenizer_path: &Path) -> Result<Self> {
            if !tokenizer_path.exists() {
                return Err(Error::FileNotFound(tokenizer_path.to_path_buf()));
            }
            let tokenizer = Tokenizer::from_file(tokenizer_path)
                .map_err(|e| Error::Parse(format!("failed to load tokenizer: {}", e)))?;

            let name = tokenizer_path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("tokenizer")
                .to_string();
            info!("Tokenizer loaded: {}", tokenizer_path.display());

            Ok(Self { tokenizer, name })
        }
    }

    impl TokenCounter for HfCounter {
        fn count(&self, text: &str) -> usize {
            // No special tokens: chunk text is counted as raw content.
            match self.tokenizer.encode(text, false) {
                Ok(encoding) => encoding.get_ids().len(),
                Err(_) => 0,
            }
        }

        fn truncate(&self, text: &str, max_tokens: usize) -> String {
            if max_tokens == 0 || text.is_empty() {
                return String::new();
            }
            let encoding = match self.tokenizer.encode(text, false) {
                Ok(e) => e,
                Err(_) => return String::new(),
            };
            let offsets = encoding.get_offsets();
            if offsets.len() <= max_tokens {
                return text.to_string();
            }

            // Cut at the end offset of the last kept token, clamped down
            // to a char boundary.
            let mut end = offsets[max_tokens - 1].1.min(text.len());
            while end > 0 && !text.is_char_boundary(end) {
                end -= 1;
            }
            let mut result = text[..end].to_string();

            // Offsets can disagree with a re-encode near merge points;
            // shrink until the bound holds.
            while !result.is_empty() && self.count(&result) > max_tokens {
                result.pop();
            }
            result
        }

        fn name(&self) -> &str {
            &self.name
        }
    }
}

#[cfg(feature = "hf")]
pub use inner::HfCounter;
