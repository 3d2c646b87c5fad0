//! Description loaders
//! One loader per on-disk format, selected by file extension.

use std::fs;
use std::path::Path;

use log::debug;

use crate::description::CollaborativeStateMachineDescription;
use crate::parser::{parse_pkl, ParseError, ParseResult};

/// Turns raw file contents into a description record.
pub trait DescriptionLoader {
    /// Short format name used in diagnostics.
    fn format(&self) -> &'static str;

    fn load(&self, source: &str) -> ParseResult<CollaborativeStateMachineDescription>;
}

/// Loads the PKL projection emitted by [`crate::codegen::generate_pkl`].
#[derive(Debug, Default, Clone, Copy)]
pub struct PklLoader;

impl DescriptionLoader for PklLoader {
    fn format(&self) -> &'static str {
        "pkl"
    }

    fn load(&self, source: &str) -> ParseResult<CollaborativeStateMachineDescription> {
        parse_pkl(source)
    }
}

/// Loads the same record shapes serialized as JSON.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonLoader;

impl DescriptionLoader for JsonLoader {
    fn format(&self) -> &'static str {
        "json"
    }

    fn load(&self, source: &str) -> ParseResult<CollaborativeStateMachineDescription> {
        Ok(serde_json::from_str(source)?)
    }
}

pub fn loader_for_path(path: &Path) -> ParseResult<Box<dyn DescriptionLoader>> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();

    match extension.as_str() {
        "pkl" => Ok(Box::new(PklLoader)),
        "json" => Ok(Box::new(JsonLoader)),
        _ => Err(ParseError::UnsupportedFormat(path.display().to_string())),
    }
}

/// Read and parse a description file, picking the loader by extension.
pub fn load_file(path: &Path) -> ParseResult<CollaborativeStateMachineDescription> {
    let loader = loader_for_path(path)?;
    let source = fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.display().to_string(),
        source,
    })?;
    debug!("Loading {} as {}", path.display(), loader.format());
    loader.load(&source)
}
