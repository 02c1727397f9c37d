//! ChunkMill Chunker — structure-aware hierarchical chunking.
//!
//! Turns an ordered list of structural elements into retrieval-ready
//! chunks bounded by a token budget: paragraph accumulation toward a
//! target size, row-aware table splitting under a repeated header,
//! small-chunk merging, cross-chunk overlap, and best-effort clause
//! number extraction.

pub mod chunker;
pub mod clause;
pub mod merge;
pub mod overlap;
pub mod table;

pub use chunker::{ChunkOutput, HierarchicalChunker};
pub use overlap::OVERLAP_MARKER;
pub use table::HEADER_REPEATED_KEY;
