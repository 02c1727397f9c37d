//! Chunking configuration.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default soft size chunks are accumulated toward.
pub const DEFAULT_TARGET_TOKENS: usize = 500;
/// Default hard ceiling on chunk size.
pub const DEFAULT_MAX_TOKENS: usize = 1000;
/// Default overlap carried from the previous chunk (20% of target).
pub const DEFAULT_OVERLAP_TOKENS: usize = 100;
/// Below this size a chunk is merged into a neighbor instead of emitted.
pub const DEFAULT_SMALL_CHUNK_THRESHOLD: usize = 100;

/// Knobs for the hierarchical chunker. Supplied programmatically by the
/// calling pipeline layer; there is no file or environment source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkConfig {
    /// Soft size chunks are accumulated toward.
    pub target_tokens: usize,
    /// Hard ceiling; a chunk must never exceed this (save for the single
    /// documented over-limit table-row case).
    pub max_tokens: usize,
    /// Approximate trailing tokens of the previous chunk prefixed onto
    /// the next.
    pub overlap_tokens: usize,
    /// Whether the small-chunk merge post-pass runs.
    pub merge_small_chunks: bool,
    /// Chunks below this token count are merged into a neighbor.
    pub small_chunk_threshold: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            target_tokens: DEFAULT_TARGET_TOKENS,
            max_tokens: DEFAULT_MAX_TOKENS,
            overlap_tokens: DEFAULT_OVERLAP_TOKENS,
            merge_small_chunks: true,
            small_chunk_threshold: DEFAULT_SMALL_CHUNK_THRESHOLD,
        }
    }
}

impl ChunkConfig {
    /// Fail fast on malformed bounds, before any element is processed.
    pub fn validate(&self) -> Result<()> {
        if self.target_tokens == 0 || self.max_tokens == 0 || self.overlap_tokens == 0 {
            return Err(Error::Config(
                "token bounds must be positive".to_string(),
            ));
        }
        if self.target_tokens >= self.max_tokens {
            return Err(Error::Config(format!(
                "target_tokens ({}) must be below max_tokens ({})",
                self.target_tokens, self.max_tokens
            )));
        }
        if self.overlap_tokens >= self.target_tokens {
            return Err(Error::Config(format!(
                "overlap_tokens ({}) must be below target_tokens ({})",
                self.overlap_tokens, self.target_tokens
            )));
        }
        if self.merge_small_chunks && self.small_chunk_threshold == 0 {
            return Err(Error::Config(
                "small_chunk_threshold must be positive when merging is enabled".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(ChunkConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_inverted_target_and_max() {
        let config = ChunkConfig {
            target_tokens: 500,
            max_tokens: 400,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn rejects_overlap_at_or_above_target() {
        let config = ChunkConfig {
            overlap_tokens: 500,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn rejects_zero_bounds() {
        let config = ChunkConfig {
            max_tokens: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }
}
