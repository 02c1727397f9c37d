//! Hierarchical chunker — the element walk.
//!
//! Consumes parsed structural elements in document order and accumulates
//! paragraph blocks toward the target size, flushing at structural
//! boundaries. Tables go through row-aware packing, then a small-chunk
//! merge pass and the overlap pass run over the finished sequence.
//! `chunk()` is a pure function of its inputs; nothing persists between
//! calls.

use std::collections::BTreeSet;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info};

use chunkmill_core::{
    ChunkConfig, ChunkKind, ChunkResult, DocumentMetadata, ElementContent, ElementKind, Error,
    OversizeKind, OversizeWarning, Result, StructuralElement,
};
use chunkmill_tokens::TokenCounter;

use crate::{clause, merge, overlap, table};

/// Blank-line block boundary (tolerates whitespace-only lines).
static BLOCK_BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n[ \t]*\n").expect("valid block boundary regex"));

/// Everything the chunker produced for one document.
#[derive(Debug, Clone, Default)]
pub struct ChunkOutput {
    pub chunks: Vec<ChunkResult>,
    /// Oversize-content conditions encountered along the way. Recorded,
    /// never raised.
    pub warnings: Vec<OversizeWarning>,
}

/// Running text accumulator. Lives for a single `chunk()` call.
#[derive(Default)]
struct TextBuffer {
    blocks: Vec<String>,
    tokens: usize,
    section_hierarchy: Vec<String>,
    heading_text: String,
    page_numbers: BTreeSet<u32>,
}

impl TextBuffer {
    fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    fn joined(&self) -> String {
        self.blocks.join("\n\n")
    }

    fn note_element(&mut self, element: &StructuralElement) {
        if element.section_hierarchy.len() > self.section_hierarchy.len() {
            self.section_hierarchy = element.section_hierarchy.clone();
        }
        if self.heading_text.is_empty() {
            self.heading_text = element.heading_text.clone();
        }
        self.page_numbers
            .extend(element.page_numbers.iter().copied());
    }

    fn take(&mut self) -> TextBuffer {
        std::mem::take(self)
    }
}

/// Structure-aware chunker bounded by a token budget.
pub struct HierarchicalChunker {
    counter: Arc<dyn TokenCounter>,
    config: ChunkConfig,
}

impl HierarchicalChunker {
    pub fn new(counter: Arc<dyn TokenCounter>, config: ChunkConfig) -> Self {
        Self { counter, config }
    }

    pub fn config(&self) -> &ChunkConfig {
        &self.config
    }

    /// Chunk a document. Deterministic: identical inputs yield
    /// byte-identical output sequences.
    pub fn chunk(
        &self,
        elements: &[StructuralElement],
        metadata: &DocumentMetadata,
    ) -> Result<ChunkOutput> {
        self.config.validate()?;
        if elements.is_empty() {
            return Err(Error::EmptyInput);
        }
        debug!(
            document_id = %metadata.document_id,
            elements = elements.len(),
            "chunking document"
        );

        let mut chunks: Vec<ChunkResult> = Vec::new();
        let mut warnings: Vec<OversizeWarning> = Vec::new();
        let mut buffer = TextBuffer::default();

        for (index, element) in elements.iter().enumerate() {
            match &element.content {
                ElementContent::Table(grid) => {
                    self.flush(&mut buffer, &mut chunks);
                    table::chunk_table(
                        index,
                        grid,
                        element,
                        self.counter.as_ref(),
                        self.config.max_tokens,
                        &mut chunks,
                        &mut warnings,
                    );
                }
                ElementContent::Text(text) => {
                    // A heading opens a new section; pending text from the
                    // previous one flushes so the heading keeps its body.
                    if element.kind == ElementKind::Heading && !buffer.is_empty() {
                        self.flush(&mut buffer, &mut chunks);
                    }

                    let text = effective_text(element, text);
                    for block in split_blocks(&text) {
                        self.push_block(index, element, block, &mut buffer, &mut chunks, &mut warnings);
                    }
                }
            }
        }
        self.flush(&mut buffer, &mut chunks);

        if self.config.merge_small_chunks {
            chunks = merge::merge_small(
                chunks,
                self.config.small_chunk_threshold,
                self.config.max_tokens,
                self.counter.as_ref(),
            );
        }
        overlap::apply(
            &mut chunks,
            self.config.overlap_tokens,
            self.config.max_tokens,
            self.counter.as_ref(),
        );

        info!(
            document_id = %metadata.document_id,
            chunks = chunks.len(),
            warnings = warnings.len(),
            "chunking complete"
        );
        Ok(ChunkOutput { chunks, warnings })
    }

    /// Add one paragraph block to the buffer, flushing around it as the
    /// budgets demand.
    fn push_block(
        &self,
        element_index: usize,
        element: &StructuralElement,
        block: String,
        buffer: &mut TextBuffer,
        chunks: &mut Vec<ChunkResult>,
        warnings: &mut Vec<OversizeWarning>,
    ) {
        let block_tokens = self.counter.count(&block);
        if block_tokens == 0 {
            return;
        }

        // The only case where content is dropped: a lone block past the
        // hard ceiling is cut down to it.
        if block_tokens > self.config.max_tokens {
            self.flush(buffer, chunks);
            warnings.push(OversizeWarning {
                element_index,
                kind: OversizeKind::TruncatedParagraph,
                token_count: block_tokens,
                max_tokens: self.config.max_tokens,
            });
            let truncated = self.counter.truncate(&block, self.config.max_tokens);
            buffer.note_element(element);
            buffer.tokens = self.counter.count(&truncated);
            buffer.blocks.push(truncated);
            self.flush(buffer, chunks);
            return;
        }

        // Flush ahead of a block that would overshoot the target.
        if !buffer.is_empty() && buffer.tokens + block_tokens > self.config.target_tokens {
            self.flush(buffer, chunks);
        }

        buffer.note_element(element);
        buffer.blocks.push(block);
        buffer.tokens = self.counter.count(&buffer.joined());

        if buffer.tokens >= self.config.target_tokens {
            self.flush(buffer, chunks);
        }
    }

    fn flush(&self, buffer: &mut TextBuffer, chunks: &mut Vec<ChunkResult>) {
        if buffer.is_empty() {
            return;
        }
        let buffer = buffer.take();
        let content = buffer.joined();
        let token_count = self.counter.count(&content);
        chunks.push(ChunkResult {
            content,
            token_count,
            clause_number: clause::extract(&buffer.section_hierarchy, &buffer.heading_text),
            section_hierarchy: buffer.section_hierarchy,
            heading_text: buffer.heading_text,
            page_numbers: buffer.page_numbers,
            has_overlap: false,
            kind: ChunkKind::Text,
            auxiliary: Default::default(),
        });
    }
}

/// Split text into blank-line-delimited blocks, dropping empty ones.
fn split_blocks(text: &str) -> Vec<String> {
    BLOCK_BOUNDARY
        .split(text)
        .map(|block| block.trim())
        .filter(|block| !block.is_empty())
        .map(|block| block.to_string())
        .collect()
}

/// Figures sometimes carry their caption in `auxiliary` instead of the
/// content field.
fn effective_text(element: &StructuralElement, text: &str) -> String {
    if !text.trim().is_empty() {
        return text.to_string();
    }
    if element.kind == ElementKind::Figure {
        if let Some(caption) = element.auxiliary.get("caption").and_then(|v| v.as_str()) {
            return caption.to_string();
        }
    }
    String::new()
}
