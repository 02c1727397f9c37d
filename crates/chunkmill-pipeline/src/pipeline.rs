//! Ingestion orchestrator: parse → chunk → enrich.
//!
//! All-or-nothing per document: any parser or chunker failure aborts with
//! no partial output, so a caller never stores an incomplete chunk set
//! under a document's identifier. Independent documents may be ingested
//! from separate threads; the token counter is the only shared handle.

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use chunkmill_chunker::HierarchicalChunker;
use chunkmill_core::{
    ChunkConfig, DocumentMetadata, EnrichedChunk, Error, OversizeWarning, Result,
    StructuralElement,
};
use chunkmill_tokens::TokenCounter;

use crate::enrich;
use crate::parser::ParserRegistry;

/// Everything one ingestion run produced.
#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub metadata: DocumentMetadata,
    pub chunks: Vec<EnrichedChunk>,
    /// Oversize-content conditions worth surfacing for quality review.
    pub warnings: Vec<OversizeWarning>,
}

/// Document ingestion pipeline.
pub struct Pipeline {
    registry: ParserRegistry,
    chunker: HierarchicalChunker,
}

impl Pipeline {
    pub fn new(
        registry: ParserRegistry,
        counter: Arc<dyn TokenCounter>,
        config: ChunkConfig,
    ) -> Self {
        Self {
            registry,
            chunker: HierarchicalChunker::new(counter, config),
        }
    }

    /// Pipeline with the built-in parsers and default chunking knobs.
    pub fn with_defaults(counter: Arc<dyn TokenCounter>) -> Self {
        Self::new(ParserRegistry::with_defaults(), counter, ChunkConfig::default())
    }

    /// Ingest a document from disk: select a parser by extension, parse,
    /// chunk, enrich.
    pub fn ingest(&self, path: &Path) -> Result<IngestReport> {
        let parser = self.registry.select(path)?;
        let (metadata, elements) = parser.parse(path).map_err(|e| match e {
            // Keep the selection/lookup failures distinguishable.
            Error::FileNotFound(_) | Error::UnsupportedFormat(_) => e,
            other => Error::Ingestion(format!("{}: {}", path.display(), other)),
        })?;
        self.ingest_elements(metadata, &elements)
    }

    /// Ingest already-parsed structure, bypassing the registry.
    pub fn ingest_elements(
        &self,
        metadata: DocumentMetadata,
        elements: &[StructuralElement],
    ) -> Result<IngestReport> {
        let output = self.chunker.chunk(elements, &metadata)?;

        let chunks: Vec<EnrichedChunk> = output
            .chunks
            .into_iter()
            .map(|chunk| enrich::enrich(chunk, &metadata))
            .collect();

        for warning in &output.warnings {
            warn!(
                document_id = %metadata.document_id,
                element_index = warning.element_index,
                kind = ?warning.kind,
                token_count = warning.token_count,
                "oversize content"
            );
        }
        info!(
            document_id = %metadata.document_id,
            chunks = chunks.len(),
            "ingested document"
        );

        Ok(IngestReport {
            metadata,
            chunks,
            warnings: output.warnings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chunkmill_chunker::HEADER_REPEATED_KEY;
    use chunkmill_core::{ChunkKind, ElementKind};
    use chunkmill_tokens::HeuristicCounter;
    use std::io::Write;

    fn pipeline() -> Pipeline {
        Pipeline::with_defaults(Arc::new(HeuristicCounter))
    }

    fn write_doc(dir: &tempfile::TempDir, name: &str, body: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(body.as_bytes()).unwrap();
        path
    }

    #[test]
    fn ingests_a_markdown_document_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let body = format!(
            "# 4 Requirements\n\n## 4.2 Electrical\n\n{}\n\n| Pin | Signal |\n| --- | --- |\n| 1 | GND |\n| 2 | VCC |\n",
            "The device shall operate at 5 V nominal. ".repeat(30)
        );
        let path = write_doc(&dir, "widget-standard.md", &body);

        let report = pipeline().ingest(&path).unwrap();
        assert_eq!(report.metadata.document_id, "widget-standard");
        assert_eq!(report.metadata.document_title, "4 Requirements");
        assert!(!report.chunks.is_empty());

        let table = report
            .chunks
            .iter()
            .find(|c| c.chunk.kind == ChunkKind::Table)
            .expect("table chunk");
        assert!(table.chunk.content.starts_with("Pin | Signal"));

        for chunk in &report.chunks {
            assert_eq!(chunk.document_id, "widget-standard");
            assert_eq!(chunk.content_hash.len(), 64);
            assert!(chunk.chunk.token_count <= 1000);
        }
    }

    #[test]
    fn unsupported_format_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_doc(&dir, "standard.docx", "irrelevant");
        assert!(matches!(
            pipeline().ingest(&path),
            Err(Error::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn missing_file_fails_distinguishably() {
        let result = pipeline().ingest(Path::new("/nonexistent/standard.md"));
        assert!(matches!(result, Err(Error::FileNotFound(_))));
    }

    #[test]
    fn empty_document_yields_empty_input_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_doc(&dir, "empty.md", "\n\n\n");
        assert!(matches!(
            pipeline().ingest(&path),
            Err(Error::EmptyInput)
        ));
    }

    #[test]
    fn crlf_and_lf_sources_hash_identically() {
        let dir = tempfile::tempdir().unwrap();
        let lf = write_doc(&dir, "a.md", "Plain body text for hashing.\n");
        let crlf = write_doc(&dir, "b.md", "Plain body text for hashing.\r\n");

        let p = pipeline();
        let left = p.ingest(&lf).unwrap();
        let right = p.ingest(&crlf).unwrap();
        assert_eq!(left.chunks[0].content_hash, right.chunks[0].content_hash);
    }

    #[test]
    fn large_table_chunks_repeat_header() {
        let dir = tempfile::tempdir().unwrap();
        let mut body = String::from("# 7 Limits\n\n| ID | Description |\n| --- | --- |\n");
        for i in 0..60 {
            body.push_str(&format!(
                "| {} | {} |\n",
                i,
                "long descriptive cell contents ".repeat(5)
            ));
        }
        let path = write_doc(&dir, "limits.md", &body);

        let report = pipeline().ingest(&path).unwrap();
        let tables: Vec<_> = report
            .chunks
            .iter()
            .filter(|c| c.chunk.kind == ChunkKind::Table)
            .collect();
        assert!(tables.len() > 1);
        for (i, chunk) in tables.iter().enumerate() {
            assert!(chunk.chunk.content.starts_with("ID | Description"));
            assert_eq!(chunk.chunk.auxiliary.contains_key(HEADER_REPEATED_KEY), i > 0);
        }
    }

    #[test]
    fn ingest_elements_bypasses_the_registry() {
        let metadata = DocumentMetadata {
            document_id: "inline".into(),
            document_title: "Inline".into(),
            document_type: "standard".into(),
        };
        let elements = vec![StructuralElement::text(
            ElementKind::Paragraph,
            "The assembly shall be torqued to specification.",
        )];
        let report = pipeline().ingest_elements(metadata, &elements).unwrap();
        assert_eq!(report.chunks.len(), 1);
        assert_eq!(report.chunks[0].normative, Some(true));
    }

    #[test]
    fn rerun_produces_identical_chunk_boundaries() {
        let dir = tempfile::tempdir().unwrap();
        let body = format!(
            "# 1 Scope\n\n{}\n\n# 2 Terms\n\n{}\n",
            "scope sentence goes here. ".repeat(90),
            "terms sentence goes here. ".repeat(90)
        );
        let path = write_doc(&dir, "scope.md", &body);

        let p = pipeline();
        let a = p.ingest(&path).unwrap();
        let b = p.ingest(&path).unwrap();
        let left: Vec<&str> = a.chunks.iter().map(|c| c.chunk.content.as_str()).collect();
        let right: Vec<&str> = b.chunks.iter().map(|c| c.chunk.content.as_str()).collect();
        assert_eq!(left, right);
        // Ids are fresh, hashes are stable.
        assert_ne!(a.chunks[0].id, b.chunks[0].id);
        assert_eq!(a.chunks[0].content_hash, b.chunks[0].content_hash);
    }
}
