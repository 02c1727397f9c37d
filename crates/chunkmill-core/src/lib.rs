//! ChunkMill Core — data model, error taxonomy, chunking configuration.

pub mod chunk;
pub mod config;
pub mod element;
pub mod error;

pub use chunk::{
    ChunkKind, ChunkResult, DocumentMetadata, EnrichedChunk, OversizeKind, OversizeWarning,
};
pub use config::ChunkConfig;
pub use element::{ElementContent, ElementKind, StructuralElement, TableData};
pub use error::{Error, Result};
