//! Interface declaration rendering.
//!
//! The emitter assembles the package clause, import block, and interface
//! body, then re-parses the result. Text that does not parse is rejected
//! as a whole; there is no partial output.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::analysis::{GoParser, Import, Method};
use crate::error::{IfaceError, Result};

static GO_IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\p{L}_][\p{L}\p{Nd}_]*$").unwrap());

/// Reserved words that the grammar still accepts in identifier position.
const GO_KEYWORDS: [&str; 25] = [
    "break", "case", "chan", "const", "continue", "default", "defer", "else", "fallthrough",
    "for", "func", "go", "goto", "if", "import", "interface", "map", "package", "range",
    "return", "select", "struct", "switch", "type", "var",
];

/// A fully resolved interface, ready to render.
#[derive(Debug, Clone, Default)]
pub struct GeneratedInterface {
    /// Package clause name.
    pub package: String,
    /// Interface type name.
    pub name: String,
    /// Optional comment placed above the package clause.
    pub header: Option<String>,
    /// Optional doc comment placed above the type declaration.
    pub comment: Option<String>,
    /// Methods in output order, already deduplicated.
    pub methods: Vec<Method>,
    /// Imports in output order, already deduplicated.
    pub imports: Vec<Import>,
}

impl GeneratedInterface {
    /// Create an interface with no header or doc comment.
    pub fn new(
        package: impl Into<String>,
        name: impl Into<String>,
        methods: Vec<Method>,
        imports: Vec<Import>,
    ) -> Self {
        Self {
            package: package.into(),
            name: name.into(),
            methods,
            imports,
            ..Default::default()
        }
    }

    /// Render to Go source without validating it.
    pub fn render(&self) -> String {
        let mut out = String::new();

        if let Some(header) = &self.header {
            push_comment(&mut out, header);
            out.push('\n');
        }

        out.push_str(&format!("package {}\n\n", self.package));

        if !self.imports.is_empty() {
            out.push_str("import (\n");
            for import in &self.imports {
                out.push_str(&format!("\t{}\n", import));
            }
            out.push_str(")\n\n");
        }

        if let Some(comment) = &self.comment {
            push_comment(&mut out, comment);
        }

        out.push_str(&format!("type {} interface {{\n", self.name));
        for method in &self.methods {
            for line in method.lines() {
                out.push_str(&format!("\t{}\n", line));
            }
        }
        out.push_str("}\n");

        out
    }

    /// Render and validate with the given parser.
    pub fn emit_with(&self, parser: &GoParser) -> Result<String> {
        let text = self.render();
        let line_of = |prefix: &str| {
            text.lines()
                .position(|l| l.starts_with(prefix))
                .map_or(1, |i| i + 1)
        };
        check_identifier("package", &self.package, line_of("package "))?;
        check_identifier("interface", &self.name, line_of("type "))?;

        if let Some(span) = parser.syntax_error(text.as_bytes())? {
            let line = text
                .lines()
                .nth(span.start_line.saturating_sub(1))
                .unwrap_or("")
                .trim();
            return Err(IfaceError::Synthesis {
                message: format!("unexpected syntax in {:?}", line),
                line: span.start_line,
                column: span.start_col,
            });
        }

        Ok(text)
    }

    /// Render and validate.
    pub fn emit(&self) -> Result<String> {
        self.emit_with(&GoParser::new()?)
    }
}

/// Render an interface declaration from its parts.
pub fn emit(package: &str, name: &str, methods: &[Method], imports: &[Import]) -> Result<String> {
    GeneratedInterface::new(package, name, methods.to_vec(), imports.to_vec()).emit()
}

fn check_identifier(role: &str, name: &str, line: usize) -> Result<()> {
    let blank_package = role == "package" && name == "_";
    if GO_IDENTIFIER.is_match(name) && !GO_KEYWORDS.contains(&name) && !blank_package {
        return Ok(());
    }
    Err(IfaceError::Synthesis {
        message: format!("{} name {:?} is not a valid Go identifier", role, name),
        line,
        column: 1,
    })
}

fn push_comment(out: &mut String, text: &str) {
    for line in text.lines() {
        if line.trim().is_empty() {
            out.push_str("//\n");
        } else {
            out.push_str(&format!("// {}\n", line));
        }
    }
}
