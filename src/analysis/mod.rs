//! Tree-sitter backed declaration extraction.
//!
//! This module turns one Go source file into per-type "units":
//! - Struct declarations and their embedded fields
//! - Methods grouped by receiver type, with optional doc comments
//! - File-scope imports, attached to every unit of the file
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌──────────────┐     ┌───────────────┐
//! │ Source Files    │────▶│ GoParser     │────▶│ ParsedUnit    │
//! └─────────────────┘     │ (tree-sitter)│     │ (per type,    │
//!                         └──────────────┘     │  per file)    │
//!                                              └───────────────┘
//!                                                      │
//!                                                      ▼
//!                         ┌──────────────┐     ┌───────────────┐
//!                         │ Resolver     │◀────│ TypeRegistry  │
//!                         │ (promotion)  │     │ (merged)      │
//!                         └──────────────┘     └───────────────┘
//! ```

mod facts;
mod go;
mod traits;

pub use facts::{Import, Method, Param, ParsedUnit, Results, Span};
pub use go::GoParser;
pub use traits::{ExtractOptions, ParsedFile, SourceParser};
