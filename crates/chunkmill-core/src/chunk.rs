//! Chunk records — the chunker's output model and its enriched form.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Document-level metadata, immutable for the duration of a chunking run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub document_id: String,
    pub document_title: String,
    /// Free-form classification, e.g. "standard", "guideline".
    pub document_type: String,
}

/// Whether a chunk came from flowing text or from a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkKind {
    Text,
    Table,
}

/// One emitted retrieval unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkResult {
    /// Final text, including any prepended overlap.
    pub content: String,
    /// Exact token count of `content` under the configured counter.
    pub token_count: usize,
    pub section_hierarchy: Vec<String>,
    pub heading_text: String,
    /// Dotted-numeral clause identifier, when one could be derived.
    pub clause_number: Option<String>,
    /// Union of the source elements' page numbers.
    pub page_numbers: BTreeSet<u32>,
    /// True when the chunk starts with injected trailing context from its
    /// predecessor.
    pub has_overlap: bool,
    pub kind: ChunkKind,
    /// Extras; table continuation chunks carry `header_repeated: true`.
    #[serde(default)]
    pub auxiliary: BTreeMap<String, serde_json::Value>,
}

/// What went over the limit when an [`OversizeWarning`] was recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OversizeKind {
    /// A single paragraph block exceeded `max_tokens` and was truncated.
    TruncatedParagraph,
    /// A table header plus one data row exceeded `max_tokens` and was
    /// emitted over-limit rather than truncated.
    OverLimitTableRow,
}

/// Non-fatal record of content that could not be kept within the token
/// ceiling. Recorded, never raised; the pipeline continues.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OversizeWarning {
    /// Index of the offending element in the input sequence.
    pub element_index: usize,
    pub kind: OversizeKind,
    pub token_count: usize,
    pub max_tokens: usize,
}

/// Final per-chunk record handed to storage: a [`ChunkResult`] plus a
/// stable identity, a content hash, a normative classification, and the
/// document metadata denormalized for standalone consumption.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichedChunk {
    pub id: Uuid,
    /// SHA-256 hex digest of normalized content, for deduplication.
    pub content_hash: String,
    /// `Some(true)` = binding text, `Some(false)` = informative,
    /// `None` = unknown.
    pub normative: Option<bool>,
    pub document_id: String,
    pub document_title: String,
    pub document_type: String,
    #[serde(flatten)]
    pub chunk: ChunkResult,
}
