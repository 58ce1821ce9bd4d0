//! Generation pipeline that orchestrates all stages.
//!
//! files → parse → aggregate → resolve → dedup → emit

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use globset::GlobBuilder;
use rayon::prelude::*;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::aggregate::TypeRegistry;
use crate::analysis::{ExtractOptions, GoParser, SourceParser};
use crate::dedup::{dedup, prune_unused_imports, DedupMode};
use crate::emit::GeneratedInterface;
use crate::error::{IfaceError, Result};
use crate::resolve::resolve;

/// Characters that make a file argument a glob pattern.
const GLOB_CHARS: &[char] = &['*', '?', '[', '{'];

/// Raw text of one input file.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub text: Vec<u8>,
}

impl SourceFile {
    /// Wrap in-memory source text.
    pub fn new(path: impl Into<PathBuf>, text: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
        }
    }

    /// Read a file fully.
    pub fn read(path: &Path) -> Result<Self> {
        let text = fs::read(path).map_err(|source| IfaceError::Input {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(path, text))
    }

    fn name(&self) -> String {
        self.path.to_string_lossy().to_string()
    }
}

/// What to generate: the source type and the names of the result.
#[derive(Debug, Clone)]
pub struct InterfaceRequest {
    /// Type whose method set is extracted.
    pub type_name: String,
    /// Name of the generated interface.
    pub interface_name: String,
    /// Package clause of the generated file.
    pub package_name: String,
}

/// Policy knobs for a generation run.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Copy method doc comments into the interface.
    pub copy_docs: bool,
    /// Method names never included.
    pub exclude: Vec<String>,
    /// Skip unexported methods.
    pub exported_only: bool,
    /// Method equality policy.
    pub dedup: DedupMode,
    /// Drop imports no signature references.
    pub prune_imports: bool,
    /// Comment above the package clause.
    pub header: Option<String>,
    /// Doc comment above the interface declaration.
    pub iface_comment: Option<String>,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            copy_docs: true,
            exclude: Vec::new(),
            exported_only: false,
            dedup: DedupMode::Textual,
            prune_imports: false,
            header: None,
            iface_comment: None,
        }
    }
}

impl GenerateOptions {
    fn extract_options(&self) -> ExtractOptions {
        ExtractOptions {
            copy_docs: self.copy_docs,
            exclude: self.exclude.clone(),
            exported_only: self.exported_only,
        }
    }
}

/// Executes the generation pipeline for one run.
///
/// All state lives in values owned by the caller, so independent runs
/// never interfere.
pub struct Generator {
    parser: GoParser,
    options: GenerateOptions,
}

impl Generator {
    /// Create a generator with the given options.
    pub fn new(options: GenerateOptions) -> Result<Self> {
        Ok(Self {
            parser: GoParser::new()?,
            options,
        })
    }

    /// The options this generator runs with.
    pub fn options(&self) -> &GenerateOptions {
        &self.options
    }

    /// Read every path in order, stopping at the first unreadable one.
    pub fn load(&self, paths: &[PathBuf]) -> Result<Vec<SourceFile>> {
        paths.iter().map(|p| SourceFile::read(p)).collect()
    }

    /// Parse all sources and merge them in input order.
    ///
    /// Parsing runs in parallel; merging does not. When several files fail
    /// to parse, the error of the earliest one is returned.
    pub fn aggregate(&self, sources: &[SourceFile]) -> Result<TypeRegistry> {
        let extract = self.options.extract_options();
        let parsed: Vec<_> = sources
            .par_iter()
            .map(|source| self.parser.parse_units(&source.name(), &source.text, &extract))
            .collect();

        let mut registry = TypeRegistry::new();
        for (source, units) in sources.iter().zip(parsed) {
            let units = units?;
            debug!(file = %source.path.display(), types = units.len(), "parsed");
            registry.merge_file(units);
        }
        Ok(registry)
    }

    /// Resolve, deduplicate, and assemble the interface for `request`.
    pub fn build(&self, registry: &TypeRegistry, request: &InterfaceRequest) -> GeneratedInterface {
        let resolution = resolve(&request.type_name, registry);
        let (methods, mut imports) =
            dedup(resolution.methods, resolution.imports, self.options.dedup);
        if self.options.prune_imports {
            imports = prune_unused_imports(&methods, imports);
        }

        GeneratedInterface {
            package: request.package_name.clone(),
            name: request.interface_name.clone(),
            header: self.options.header.clone(),
            comment: self.options.iface_comment.clone(),
            methods,
            imports,
        }
    }

    /// Run every stage over in-memory sources.
    pub fn generate(&self, sources: &[SourceFile], request: &InterfaceRequest) -> Result<String> {
        let registry = self.aggregate(sources)?;
        let iface = self.build(&registry, request);
        info!(
            files = registry.file_count(),
            type_name = %request.type_name,
            interface = %request.interface_name,
            methods = iface.methods.len(),
            imports = iface.imports.len(),
            "generating interface"
        );
        iface.emit_with(&self.parser)
    }

    /// Read `paths` and run every stage.
    pub fn generate_files(&self, paths: &[PathBuf], request: &InterfaceRequest) -> Result<String> {
        let sources = self.load(paths)?;
        self.generate(&sources, request)
    }
}

/// Expand file arguments into an ordered, duplicate-free list of paths.
///
/// An argument is a file, a directory (its `*.go` files, tests excluded),
/// or a glob pattern. Plain paths are passed through unchecked so that a
/// missing file surfaces as a read error in argument order.
pub fn expand_inputs(args: &[String]) -> Result<Vec<PathBuf>> {
    let mut seen = HashSet::new();
    let mut paths = Vec::new();

    for arg in args {
        let expanded = if arg.contains(GLOB_CHARS) {
            expand_glob(arg)?
        } else if Path::new(arg).is_dir() {
            go_files_in(Path::new(arg))?
        } else {
            vec![PathBuf::from(arg)]
        };

        if expanded.is_empty() {
            return Err(IfaceError::NoMatch(arg.clone()));
        }
        for path in expanded {
            if seen.insert(path.clone()) {
                paths.push(path);
            }
        }
    }

    Ok(paths)
}

/// Go source files directly inside `dir`, sorted by name.
fn go_files_in(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).max_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| IfaceError::Input {
            path: dir.to_path_buf(),
            source: e.into(),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if name.ends_with(".go") && !name.ends_with("_test.go") {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Files under the pattern's literal base directory that match it.
fn expand_glob(pattern: &str) -> Result<Vec<PathBuf>> {
    let matcher = GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map_err(|e| IfaceError::Pattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?
        .compile_matcher();

    let base: PathBuf = Path::new(pattern)
        .components()
        .take_while(|c| !c.as_os_str().to_string_lossy().contains(GLOB_CHARS))
        .collect();
    let relative = base.as_os_str().is_empty();
    let root = if relative { PathBuf::from(".") } else { base };

    let mut files = Vec::new();
    for entry in WalkDir::new(&root).sort_by_file_name() {
        let entry = entry.map_err(|e| IfaceError::Input {
            path: root.clone(),
            source: e.into(),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let candidate = if relative {
            path.strip_prefix(".").unwrap_or(path)
        } else {
            path
        };
        if matcher.is_match(candidate) {
            files.push(candidate.to_path_buf());
        }
    }
    debug!(pattern, matches = files.len(), "expanded glob");
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(type_name: &str) -> InterfaceRequest {
        InterfaceRequest {
            type_name: type_name.to_string(),
            interface_name: "Iface".to_string(),
            package_name: "api".to_string(),
        }
    }

    fn generate(options: GenerateOptions, files: &[(&str, &str)], type_name: &str) -> String {
        let sources: Vec<_> = files
            .iter()
            .map(|(name, text)| SourceFile::new(*name, text.as_bytes()))
            .collect();
        Generator::new(options)
            .unwrap()
            .generate(&sources, &request(type_name))
            .unwrap()
    }

    #[test]
    fn test_parallel_parse_reports_first_failing_file() {
        let sources = vec![
            SourceFile::new("ok.go", "package a\n"),
            SourceFile::new("bad1.go", "package a\nfunc (\n"),
            SourceFile::new("bad2.go", "package a\ntype {\n"),
        ];
        let generator = Generator::new(GenerateOptions::default()).unwrap();
        match generator.aggregate(&sources) {
            Err(IfaceError::Parse { path, .. }) => assert_eq!(path, "bad1.go"),
            other => panic!("expected parse error, got {:?}", other.map(|r| r.len())),
        }
    }

    #[test]
    fn test_load_fails_on_missing_file() {
        let generator = Generator::new(GenerateOptions::default()).unwrap();
        let err = generator
            .load(&[PathBuf::from("/nonexistent/ifacegen/missing.go")])
            .unwrap_err();
        assert!(matches!(err, IfaceError::Input { .. }));
    }

    #[test]
    fn test_prune_imports_option() {
        let source = r#"
package srv

import (
    "context"
    "fmt"
)

type Server struct{}

func (s *Server) Serve(ctx context.Context) error {
    fmt.Println("serving")
    return nil
}
"#;
        let options = GenerateOptions {
            prune_imports: true,
            ..Default::default()
        };
        let output = generate(options, &[("server.go", source)], "Server");
        assert!(output.contains("\"context\""));
        assert!(!output.contains("\"fmt\""));
    }

    #[test]
    fn test_header_and_comment_options() {
        let options = GenerateOptions {
            header: Some("Code generated by ifacegen. DO NOT EDIT.".to_string()),
            iface_comment: Some("Iface wraps Server.".to_string()),
            ..Default::default()
        };
        let source = "package srv\n\ntype Server struct{}\n\nfunc (s *Server) Start() {}\n";
        let output = generate(options, &[("server.go", source)], "Server");
        assert!(output.starts_with("// Code generated by ifacegen. DO NOT EDIT.\n"));
        assert!(output.contains("// Iface wraps Server.\ntype Iface interface {\n\tStart()\n}"));
    }

    #[test]
    fn test_expand_directory_and_glob() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.go", "a.go", "a_test.go", "notes.txt"] {
            fs::write(dir.path().join(name), "package x\n").unwrap();
        }

        let dir_arg = dir.path().to_string_lossy().to_string();
        let files = expand_inputs(&[dir_arg.clone()]).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.go", "b.go"]);

        let pattern = format!("{}/*_test.go", dir_arg);
        let files = expand_inputs(&[pattern]).unwrap();
        assert_eq!(files, vec![dir.path().join("a_test.go")]);
    }

    #[test]
    fn test_expand_keeps_order_and_drops_repeats() {
        let args = vec![
            "z.go".to_string(),
            "a.go".to_string(),
            "z.go".to_string(),
        ];
        let files = expand_inputs(&args).unwrap();
        assert_eq!(files, vec![PathBuf::from("z.go"), PathBuf::from("a.go")]);
    }

    #[test]
    fn test_expand_unmatched_glob_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let pattern = format!("{}/*.go", dir.path().display());
        let err = expand_inputs(&[pattern]).unwrap_err();
        assert!(matches!(err, IfaceError::NoMatch(_)));
    }
}
