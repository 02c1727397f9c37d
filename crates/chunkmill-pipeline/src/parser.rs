//! Structural parser interface and format registry.
//!
//! Format-specific parsers are external collaborators; the pipeline only
//! selects one by file extension. Parsers must keep "not parseable" and
//! "file not found" distinguishable (`Error::Parse` vs
//! `Error::FileNotFound`).

use std::collections::HashMap;
use std::path::Path;

use chunkmill_core::{DocumentMetadata, Error, Result, StructuralElement};

/// A format-specific structural parser.
pub trait StructuralParser: Send + Sync {
    /// Parse a document into its metadata and ordered elements.
    fn parse(&self, path: &Path) -> Result<(DocumentMetadata, Vec<StructuralElement>)>;
}

/// Extension → parser dispatch table.
///
/// Unlike a generic file scanner there is no fallback parser: an
/// unregistered extension is `Error::UnsupportedFormat`, because chunking
/// an unparsed byte blob would only produce garbage chunks.
#[derive(Default)]
pub struct ParserRegistry {
    map: HashMap<String, Box<dyn StructuralParser>>,
}

impl ParserRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in markdown/plaintext parser wired up.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        let parser = crate::markdown::MarkdownParser;
        for ext in ["md", "markdown", "txt"] {
            registry.register(ext, parser);
        }
        registry
    }

    /// Register a parser for an extension (without the dot).
    pub fn register(&mut self, extension: impl Into<String>, parser: impl StructuralParser + 'static) {
        self.map
            .insert(extension.into().to_lowercase(), Box::new(parser));
    }

    /// Select the parser for a path by its extension.
    pub fn select(&self, path: &Path) -> Result<&dyn StructuralParser> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_lowercase())
            .unwrap_or_default();
        self.map
            .get(&ext)
            .map(|p| &**p)
            .ok_or_else(|| Error::UnsupportedFormat(ext))
    }

    /// Registered extensions, sorted for stable output.
    pub fn supported_formats(&self) -> Vec<&str> {
        let mut formats: Vec<&str> = self.map.keys().map(|s| s.as_str()).collect();
        formats.sort_unstable();
        formats
    }
}
