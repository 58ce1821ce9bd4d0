//! Fact structures extracted from Go source.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

/// Any run of whitespace, collapsed away for structural comparison.
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Source location with line/column positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    /// Start byte offset (0-indexed).
    pub start_byte: usize,
    /// Start line (1-indexed).
    pub start_line: usize,
    /// Start column (1-indexed).
    pub start_col: usize,
}

impl Span {
    /// Create a span from a tree-sitter node.
    pub fn from_node(node: tree_sitter::Node) -> Self {
        let start = node.start_position();
        Self {
            start_byte: node.start_byte(),
            start_line: start.row + 1, // tree-sitter is 0-indexed
            start_col: start.column + 1,
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start_line, self.start_col)
    }
}

/// One parameter declaration, possibly naming several parameters of the
/// same type (`a, b int`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    /// Declared names; empty for unnamed parameters.
    pub names: Vec<String>,
    /// Type text exactly as written in the source.
    pub ty: String,
    /// Whether this is a `...T` parameter.
    pub variadic: bool,
}

impl Param {
    /// Create an unnamed parameter of the given type.
    pub fn unnamed(ty: impl Into<String>) -> Self {
        Self {
            names: Vec::new(),
            ty: ty.into(),
            variadic: false,
        }
    }

    /// Create a named parameter.
    pub fn named(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            names: vec![name.into()],
            ty: ty.into(),
            variadic: false,
        }
    }

    fn type_text(&self) -> String {
        if self.variadic {
            format!("...{}", self.ty)
        } else {
            self.ty.clone()
        }
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.names.is_empty() {
            write!(f, "{}", self.type_text())
        } else {
            write!(f, "{} {}", self.names.join(", "), self.type_text())
        }
    }
}

/// Result list of a method.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Results {
    /// No results.
    #[default]
    None,
    /// A single unparenthesised result type.
    Single(String),
    /// A parenthesised result list, named or not.
    List(Vec<Param>),
}

/// A method signature bound to a receiver type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Method {
    /// Method name.
    pub name: String,
    /// Base name of the receiver type (`Server` for `func (s *Server[T])`).
    pub receiver: String,
    /// Ordered parameter declarations.
    pub params: Vec<Param>,
    /// Result declarations.
    pub results: Results,
    /// Documentation comments, verbatim; empty unless doc copying was on.
    pub docs: Vec<String>,
    /// Position of the method declaration in its file.
    pub span: Span,
}

impl Method {
    /// Whether the method name starts with an uppercase letter.
    pub fn is_exported(&self) -> bool {
        self.name.chars().next().is_some_and(char::is_uppercase)
    }

    /// The rendered signature as it appears inside an interface body.
    pub fn signature(&self) -> String {
        let params = join_params(&self.params);
        match &self.results {
            Results::None => format!("{}({})", self.name, params),
            Results::Single(ty) => format!("{}({}) {}", self.name, params, ty),
            Results::List(list) => format!("{}({}) ({})", self.name, params, join_params(list)),
        }
    }

    /// Textual identity: the rendered signature, docs excluded.
    ///
    /// Two methods whose types are spelled with different whitespace are
    /// distinct under this key.
    pub fn identity_key(&self) -> String {
        self.signature()
    }

    /// Structural identity: name plus parameter and result types, with
    /// parameter names and all whitespace ignored.
    pub fn structural_key(&self) -> String {
        let params = structural_types(&self.params);
        let results = match &self.results {
            Results::None => String::new(),
            Results::Single(ty) => strip_ws(ty),
            Results::List(list) => structural_types(list),
        };
        format!("{}({})({})", self.name, params, results)
    }

    /// Doc comment lines followed by the signature.
    pub fn lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = self
            .docs
            .iter()
            .flat_map(|doc| doc.lines().map(|l| l.trim().to_string()))
            .collect();
        lines.push(self.signature());
        lines
    }
}

fn join_params(params: &[Param]) -> String {
    params
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn structural_types(params: &[Param]) -> String {
    let mut types = Vec::new();
    for param in params {
        let ty = strip_ws(&param.type_text());
        for _ in 0..param.names.len().max(1) {
            types.push(ty.clone());
        }
    }
    types.join(",")
}

fn strip_ws(text: &str) -> String {
    WHITESPACE.replace_all(text, "").into_owned()
}

/// A file-scope import.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Import {
    /// Explicit package name (`log`, `_`, `.`), if any.
    pub alias: Option<String>,
    /// Import path without quotes.
    pub path: String,
}

impl Import {
    /// Create an import without an alias.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            alias: None,
            path: path.into(),
        }
    }

    /// Create an aliased import.
    pub fn aliased(alias: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            alias: Some(alias.into()),
            path: path.into(),
        }
    }

    /// Whether this is a blank (`_`) or dot (`.`) import.
    pub fn is_side_effect(&self) -> bool {
        matches!(self.alias.as_deref(), Some("_") | Some("."))
    }

    /// The name the imported package is referenced by in code.
    ///
    /// Without an alias this is guessed from the path: the last element,
    /// skipping a trailing `vN` major-version element, with a `.vN` suffix
    /// (`gopkg.in/yaml.v3`) and a `go-` prefix removed.
    pub fn package_name(&self) -> String {
        if let Some(alias) = &self.alias {
            return alias.clone();
        }

        let mut elements = self.path.rsplit('/');
        let mut last = elements.next().unwrap_or("");
        if is_major_version(last) {
            last = elements.next().unwrap_or(last);
        }
        let last = match last.split_once('.') {
            Some((head, tail)) if is_major_version(tail) => head,
            _ => last,
        };
        let last = last.strip_prefix("go-").unwrap_or(last);
        last.replace('-', "_")
    }
}

fn is_major_version(element: &str) -> bool {
    element.len() > 1
        && element.starts_with('v')
        && element[1..].chars().all(|c| c.is_ascii_digit())
}

impl fmt::Display for Import {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.alias {
            Some(alias) => write!(f, "{} \"{}\"", alias, self.path),
            None => write!(f, "\"{}\"", self.path),
        }
    }
}

/// Everything one file says about one named type.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedUnit {
    /// The type name.
    pub type_name: String,
    /// Methods whose receiver is this type, in file order.
    pub methods: Vec<Method>,
    /// Embedded field type names, in field order.
    ///
    /// `None` when the file declares methods on the type but not the type
    /// itself, so there is no embedding information to contribute.
    pub embedded: Option<Vec<String>>,
    /// Every import of the file, verbatim and in order.
    pub imports: Vec<Import>,
}

impl ParsedUnit {
    /// Create an empty unit for a type name.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            ..Default::default()
        }
    }

    /// Embedded names, empty when none are known.
    pub fn embedded_names(&self) -> &[String] {
        self.embedded.as_deref().unwrap_or(&[])
    }
}
