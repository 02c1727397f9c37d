//! ChunkMill Pipeline — parser selection, enrichment, ingestion orchestration.
//!
//! Ties the engine together: a format registry picks a structural parser,
//! the hierarchical chunker cuts the parsed elements into bounded units,
//! and enrichment stamps each chunk with an id, a content hash, and a
//! normative/informative classification.

pub mod enrich;
pub mod markdown;
pub mod parser;
pub mod pipeline;

pub use enrich::{classify_normative, content_hash, normalize_content};
pub use markdown::MarkdownParser;
pub use parser::{ParserRegistry, StructuralParser};
pub use pipeline::{IngestReport, Pipeline};
