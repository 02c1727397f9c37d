//! Chunk enrichment: identity, content hashing, normative classification.

use once_cell::sync::Lazy;
use regex::Regex;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use chunkmill_core::{ChunkResult, DocumentMetadata, EnrichedChunk};

/// Obligation language: binding requirements.
static NORMATIVE_KEYWORDS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bshall(?:\s+not)?\b|\bmust\b|\brequired\b|\bmandatory\b")
        .expect("valid normative keyword regex")
});

/// Guidance and example language: descriptive text.
static INFORMATIVE_KEYWORDS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bshould\b|\bmay\b|\bnote\b|\bexample\b|\be\.g\.|\bguidance\b|\binformative\b")
        .expect("valid informative keyword regex")
});

/// Normalize text for hashing: unify line endings and trim, so the same
/// logical content from different sources hashes identically.
pub fn normalize_content(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n").trim().to_string()
}

/// SHA-256 hex digest of normalized content, for deduplication.
pub fn content_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(normalize_content(text).as_bytes());
    hex::encode(hasher.finalize())
}

/// Classify a chunk as normative (binding) or informative.
///
/// Priority order: explicit section markers, then obligation keywords,
/// then guidance keywords. Unmarked body text is conservatively treated
/// as binding; only blank content stays unknown.
pub fn classify_normative(chunk: &ChunkResult) -> Option<bool> {
    if chunk.content.trim().is_empty() {
        return None;
    }

    let heading = chunk.heading_text.to_lowercase();
    let content = &chunk.content;
    for haystack in [heading.as_str(), content] {
        let lower = haystack.to_lowercase();
        if lower.contains("(normative)") {
            return Some(true);
        }
        if lower.contains("(informative)") {
            return Some(false);
        }
    }

    if NORMATIVE_KEYWORDS.is_match(content) {
        return Some(true);
    }
    if INFORMATIVE_KEYWORDS.is_match(content) {
        return Some(false);
    }
    Some(true)
}

/// Produce the final storage-ready record for one chunk.
pub fn enrich(chunk: ChunkResult, metadata: &DocumentMetadata) -> EnrichedChunk {
    EnrichedChunk {
        id: Uuid::new_v4(),
        content_hash: content_hash(&chunk.content),
        normative: classify_normative(&chunk),
        document_id: metadata.document_id.clone(),
        document_title: metadata.document_title.clone(),
        document_type: metadata.document_type.clone(),
        chunk,
    }
}
