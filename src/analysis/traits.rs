//! Core traits for declaration extraction.

use std::collections::BTreeMap;

use super::ParsedUnit;
use crate::error::Result;

/// Holds a parsed tree-sitter tree and associated metadata.
///
/// Kept separate from the extracted units so the same tree can serve
/// several extraction passes without re-parsing.
pub struct ParsedFile {
    /// The tree-sitter parse tree.
    pub tree: tree_sitter::Tree,
    /// The original source code (kept for node text extraction).
    pub source: Vec<u8>,
    /// The file path (for error reporting).
    pub path: String,
}

impl ParsedFile {
    /// Get text for a tree-sitter node.
    pub fn node_text(&self, node: tree_sitter::Node) -> &str {
        node.utf8_text(&self.source).unwrap_or("")
    }
}

/// Options that decide which methods enter the pipeline at parse time.
#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    /// Capture doc comments above method declarations.
    pub copy_docs: bool,
    /// Method names that are never extracted.
    pub exclude: Vec<String>,
    /// Skip methods whose names are not exported.
    pub exported_only: bool,
}

impl ExtractOptions {
    /// Whether a method with this name should be extracted.
    pub fn accepts(&self, name: &str) -> bool {
        if self.exclude.iter().any(|e| e == name) {
            return false;
        }
        !self.exported_only || name.chars().next().is_some_and(char::is_uppercase)
    }
}

/// Language-specific declaration parser.
///
/// # Thread Safety
///
/// tree_sitter::Parser is not Sync, so implementations create a parser
/// per call and keep only immutable grammar state.
pub trait SourceParser: Send + Sync {
    /// Returns the language identifier (e.g., "go").
    fn language_id(&self) -> &'static str;

    /// Parse a source file into a tree-sitter tree.
    ///
    /// Syntax errors are fatal: a tree containing ERROR or MISSING nodes is
    /// reported as a parse error instead of being returned.
    fn parse(&self, path: &str, source: &[u8]) -> Result<ParsedFile>;

    /// Extract one unit per type name mentioned by the file.
    fn extract_units(
        &self,
        parsed: &ParsedFile,
        options: &ExtractOptions,
    ) -> Result<BTreeMap<String, ParsedUnit>>;

    /// Parse and extract in one step.
    fn parse_units(
        &self,
        path: &str,
        source: &[u8],
        options: &ExtractOptions,
    ) -> Result<BTreeMap<String, ParsedUnit>> {
        let parsed = self.parse(path, source)?;
        self.extract_units(&parsed, options)
    }
}
