//! ChunkMill Tokens — token accounting for the chunking engine.
//!
//! Provides the `TokenCounter` trait for counting and boundary-safe
//! truncation. When the `hf` feature is enabled and a `tokenizer.json`
//! is present, `HfCounter` gives exact counts for that encoding.
//! Without it, `HeuristicCounter` approximates at ~4 bytes per token.

pub mod counter;
pub mod hf;

pub use counter::{HeuristicCounter, TokenCounter};

#[cfg(feature = "hf")]
pub use hf::HfCounter;

use std::path::Path;
use std::sync::Arc;

/// Create the best available counter for an optional tokenizer file.
///
/// Tries the HuggingFace encoding first (if the feature is enabled and a
/// path is given), falls back to the heuristic counter.
pub fn create_counter(tokenizer_path: Option<&Path>) -> Arc<dyn TokenCounter> {
    #[cfg(feature = "hf")]
    {
        if let Some(path) = tokenizer_path {
            match HfCounter::load(path) {
                Ok(counter) => {
                    tracing::info!("Using tokenizer encoding '{}'", counter.name());
                    return Arc::new(counter);
                }
                Err(e) => {
                    tracing::warn!("Tokenizer unavailable: {}. Falling back to heuristic.", e);
                }
            }
        }
    }

    #[cfg(not(feature = "hf"))]
    {
        let _ = tokenizer_path;
    }

    Arc::new(HeuristicCounter)
}
