//! ifacegen - Go interface generator.
//!
//! ifacegen extracts the method set of a Go type from one or more source
//! files and synthesizes an interface declaration exposing it. Methods
//! declared on the type in any input file are collected, methods of
//! embedded types are promoted one level, duplicates are dropped, and the
//! result is rendered and re-parsed before it is returned.
//!
//! # Architecture
//!
//! The pipeline uses tree-sitter for parsing and validation:
//!
//! - `analysis`: Go declaration extraction (structs, methods, imports)
//! - `aggregate`: Cross-file merge into one record per type name
//! - `resolve`: Method set resolution with embedded-type promotion
//! - `dedup`: Order-preserving method/import dedup and import pruning
//! - `emit`: Interface rendering and syntax validation
//! - `generate`: Pipeline orchestration and input expansion
//! - `config`: YAML config file schema
//!
//! # Example
//!
//! ```no_run
//! use ifacegen::{GenerateOptions, Generator, InterfaceRequest, SourceFile};
//!
//! let source = SourceFile::new(
//!     "server.go",
//!     "package srv\n\ntype Server struct{}\n\nfunc (s *Server) Start() error { return nil }\n",
//! );
//! let request = InterfaceRequest {
//!     type_name: "Server".to_string(),
//!     interface_name: "Starter".to_string(),
//!     package_name: "api".to_string(),
//! };
//! let generator = Generator::new(GenerateOptions::default())?;
//! let code = generator.generate(&[source], &request)?;
//! assert!(code.contains("Start() error"));
//! # Ok::<(), ifacegen::IfaceError>(())
//! ```

pub mod aggregate;
pub mod analysis;
pub mod cli;
pub mod config;
pub mod dedup;
pub mod emit;
pub mod error;
pub mod generate;
pub mod resolve;

pub use aggregate::{merge, TypeRecord, TypeRegistry};
pub use analysis::{
    ExtractOptions, GoParser, Import, Method, Param, ParsedFile, ParsedUnit, Results,
    SourceParser, Span,
};
pub use config::Config;
pub use dedup::{dedup, prune_unused_imports, DedupMode};
pub use emit::{emit, GeneratedInterface};
pub use error::{IfaceError, Result};
pub use generate::{expand_inputs, GenerateOptions, Generator, InterfaceRequest, SourceFile};
pub use resolve::{resolve, ResolutionResult};
