//! Integration tests for the generation pipeline.
//!
//! These tests run every stage against Go fixtures under testdata/go and
//! against small inline sources.

use std::path::PathBuf;

use ifacegen::{
    DedupMode, GenerateOptions, Generator, IfaceError, InterfaceRequest, SourceFile,
};

fn testdata(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("testdata")
        .join("go")
        .join(name)
}

fn request(type_name: &str, iface: &str) -> InterfaceRequest {
    InterfaceRequest {
        type_name: type_name.to_string(),
        interface_name: iface.to_string(),
        package_name: "api".to_string(),
    }
}

fn generate_files(options: GenerateOptions, files: &[&str], type_name: &str) -> String {
    let paths: Vec<PathBuf> = files.iter().map(|f| testdata(f)).collect();
    Generator::new(options)
        .expect("generator should build")
        .generate_files(&paths, &request(type_name, "Iface"))
        .expect("generation should succeed")
}

fn generate_inline(options: GenerateOptions, files: &[&str], type_name: &str) -> String {
    let sources: Vec<SourceFile> = files
        .iter()
        .enumerate()
        .map(|(i, text)| SourceFile::new(format!("file{}.go", i), text.as_bytes()))
        .collect();
    Generator::new(options)
        .expect("generator should build")
        .generate(&sources, &request(type_name, "Iface"))
        .expect("generation should succeed")
}

/// Method lines of the interface body, docs excluded.
fn method_lines(output: &str) -> Vec<String> {
    let body = output
        .split_once("interface {\n")
        .map(|(_, rest)| rest)
        .unwrap_or("");
    body.lines()
        .take_while(|l| *l != "}")
        .map(str::trim)
        .filter(|l| !l.starts_with("//"))
        .map(str::to_string)
        .collect()
}

// =============================================================================
// Core scenarios
// =============================================================================

#[test]
fn test_single_file_methods_in_declaration_order() {
    let source = r#"
package srv

type Server struct{}

func (s *Server) Start() {}

func (s *Server) Stop() {}
"#;
    let output = generate_inline(GenerateOptions::default(), &[source], "Server");
    assert_eq!(method_lines(&output), vec!["Start()", "Stop()"]);
}

#[test]
fn test_methods_merge_across_files_in_file_order() {
    let a = "package srv\n\ntype Server struct{}\n\nfunc (s *Server) Start() {}\n";
    let b = "package srv\n\nfunc (s *Server) Stop() {}\n";

    let output = generate_inline(GenerateOptions::default(), &[a, b], "Server");
    assert_eq!(method_lines(&output), vec!["Start()", "Stop()"]);

    let output = generate_inline(GenerateOptions::default(), &[b, a], "Server");
    assert_eq!(method_lines(&output), vec!["Stop()", "Start()"]);
}

#[test]
fn test_embedded_methods_are_promoted_after_own() {
    let source = r#"
package srv

type Server struct{}

func (s *Server) Ping() {}

type Service struct {
    Server
}

func (s *Service) Run() {}
"#;
    let output = generate_inline(GenerateOptions::default(), &[source], "Service");
    assert_eq!(method_lines(&output), vec!["Run()", "Ping()"]);
}

#[test]
fn test_excluded_method_is_absent() {
    let source = r#"
package srv

type Server struct{}

func (s *Server) Start() {}

func (s *Server) Stop() {}
"#;
    let options = GenerateOptions {
        exclude: vec!["Stop".to_string()],
        ..Default::default()
    };
    let output = generate_inline(options, &[source], "Server");
    assert_eq!(method_lines(&output), vec!["Start()"]);
}

#[test]
fn test_unknown_target_produces_empty_interface() {
    let source = "package srv\n\ntype Server struct{}\n\nfunc (s *Server) Start() {}\n";
    let output = generate_inline(GenerateOptions::default(), &[source], "Missing");
    assert_eq!(output, "package api\n\ntype Iface interface {\n}\n");
}

#[test]
fn test_duplicate_signature_kept_once_at_first_position() {
    let a = "package srv\n\nfunc (s *Server) Start() error { return nil }\nfunc (s *Server) Stop() {}\n";
    let b = "package srv\n\nfunc (s *Server) Reload() {}\nfunc (s *Server) Start() error { return nil }\n";

    let output = generate_inline(GenerateOptions::default(), &[a, b], "Server");
    assert_eq!(
        method_lines(&output),
        vec!["Start() error", "Stop()", "Reload()"]
    );
}

// =============================================================================
// Properties
// =============================================================================

#[test]
fn test_exclusion_covers_promoted_methods() {
    let source = r#"
package srv

type Base struct{}

func (b *Base) Close() error { return nil }
func (b *Base) Name() string { return "" }

type Wrapper struct {
    *Base
}

func (w *Wrapper) Open() {}
"#;
    let options = GenerateOptions {
        exclude: vec!["Close".to_string()],
        ..Default::default()
    };
    let output = generate_inline(options, &[source], "Wrapper");
    assert_eq!(method_lines(&output), vec!["Open()", "Name() string"]);
}

#[test]
fn test_promotion_stops_after_one_level() {
    let output = generate_files(GenerateOptions::default(), &["chain.go"], "A");
    assert_eq!(method_lines(&output), vec!["OnA()", "OnB()"]);
    assert!(!output.contains("OnC"));
}

#[test]
fn test_embedded_imports_are_not_pulled_in() {
    let output = generate_files(
        GenerateOptions::default(),
        &["service.go", "server.go"],
        "Service",
    );

    assert_eq!(
        method_lines(&output),
        vec![
            "Run() error",
            "Start(ctx context.Context) error",
            "Stop()",
            "Addr() net.Addr",
            "reset()",
        ]
    );
    assert!(output.contains("import (\n\t\"io\"\n\t\"log\"\n)"));
    assert!(!output.contains("\"context\""));
    assert!(!output.contains("\"net\""));
}

#[test]
fn test_formatting_variants_are_distinct_by_default() {
    let a = "package srv\n\nfunc (c *Cache) Get(key string) map[string]int { return nil }\n";
    let b = "package srv\n\nfunc (c *Cache) Get(key string) map[string] int { return nil }\n";

    let output = generate_inline(GenerateOptions::default(), &[a, b], "Cache");
    assert_eq!(method_lines(&output).len(), 2);

    let structural = GenerateOptions {
        dedup: DedupMode::Structural,
        ..Default::default()
    };
    let output = generate_inline(structural, &[a, b], "Cache");
    assert_eq!(method_lines(&output), vec!["Get(key string) map[string]int"]);
}

// =============================================================================
// Fixtures end to end
// =============================================================================

#[test]
fn test_server_fixture_full_output() {
    let output = generate_files(
        GenerateOptions::default(),
        &["server.go", "server_ops.go"],
        "Server",
    );
    let expected = "package api

import (
\t\"context\"
\t\"net\"
\t\"time\"
)

type Iface interface {
\t// Start begins serving until ctx is cancelled.
\tStart(ctx context.Context) error
\t// Stop halts the server.
\tStop()
\tAddr() net.Addr
\treset()
\t// Restart stops and starts the server.
\tRestart(timeout time.Duration) error
}
";
    assert_eq!(output, expected);
}

#[test]
fn test_server_fixture_without_docs_exported_only() {
    let options = GenerateOptions {
        copy_docs: false,
        exported_only: true,
        ..Default::default()
    };
    let output = generate_files(options, &["server.go"], "Server");
    assert!(!output.contains("//"));
    assert_eq!(
        method_lines(&output),
        vec![
            "Start(ctx context.Context) error",
            "Stop()",
            "Addr() net.Addr",
        ]
    );
}

#[test]
fn test_broken_fixture_aborts_run() {
    let paths = vec![testdata("server.go"), testdata("broken.go")];
    let err = Generator::new(GenerateOptions::default())
        .unwrap()
        .generate_files(&paths, &request("Server", "Iface"))
        .unwrap_err();
    match err {
        IfaceError::Parse { path, .. } => assert!(path.ends_with("broken.go")),
        other => panic!("expected parse error, got {:?}", other),
    }
}

#[test]
fn test_missing_file_aborts_run() {
    let paths = vec![testdata("server.go"), testdata("does_not_exist.go")];
    let err = Generator::new(GenerateOptions::default())
        .unwrap()
        .generate_files(&paths, &request("Server", "Iface"))
        .unwrap_err();
    assert!(matches!(err, IfaceError::Input { .. }));
}

#[test]
fn test_invalid_interface_name_is_synthesis_error() {
    let sources = vec![SourceFile::new(
        "server.go",
        "package srv\n\ntype Server struct{}\n",
    )];
    let err = Generator::new(GenerateOptions::default())
        .unwrap()
        .generate(&sources, &request("Server", "func"))
        .unwrap_err();
    assert!(matches!(err, IfaceError::Synthesis { .. }));
}

#[test]
fn test_runs_are_independent() {
    let generator = Generator::new(GenerateOptions::default()).unwrap();
    let a = vec![SourceFile::new(
        "a.go",
        "package srv\n\nfunc (s *Server) Start() {}\n",
    )];
    let b = vec![SourceFile::new(
        "b.go",
        "package srv\n\nfunc (s *Server) Stop() {}\n",
    )];

    let first = generator.generate(&a, &request("Server", "Iface")).unwrap();
    let second = generator.generate(&b, &request("Server", "Iface")).unwrap();
    assert_eq!(method_lines(&first), vec!["Start()"]);
    assert_eq!(method_lines(&second), vec!["Stop()"]);
}

#[test]
fn test_trailing_comments_do_not_become_docs() {
    let source = r#"
package srv

type Server struct{} // Server is nice
// Start begins serving.
func (s *Server) Start() {}
func (s *Server) Stop() {} // halts
func (s *Server) Reset() {}
"#;
    let output = generate_inline(GenerateOptions::default(), &[source], "Server");
    assert_eq!(
        output,
        "package api\n\ntype Iface interface {\n\t// Start begins serving.\n\tStart()\n\tStop()\n\tReset()\n}\n"
    );
}

#[test]
fn test_keyword_package_name_is_synthesis_error() {
    let sources = vec![SourceFile::new("server.go", "package srv\n\ntype Server struct{}\n")];
    let err = Generator::new(GenerateOptions::default())
        .unwrap()
        .generate(
            &sources,
            &InterfaceRequest {
                type_name: "Server".to_string(),
                interface_name: "API".to_string(),
                package_name: "package".to_string(),
            },
        )
        .unwrap_err();
    assert!(matches!(err, IfaceError::Synthesis { .. }));
}
