//! Go declaration parser using tree-sitter.
//!
//! Extracts, per file:
//! - Struct type declarations and their embedded fields
//! - Method declarations, grouped by receiver base type
//! - File-scope imports

use std::collections::BTreeMap;

use streaming_iterator::StreamingIterator;
use tracing::debug;
use tree_sitter::{Language, Node, Parser, Query, QueryCursor};

use crate::analysis::{
    ExtractOptions, Import, Method, Param, ParsedFile, ParsedUnit, Results, SourceParser, Span,
};
use crate::error::{IfaceError, Result};

/// Tree-sitter query for struct types and methods.
const DECLARATION_QUERY: &str = r#"
; Struct type declarations
(type_spec
  name: (type_identifier) @struct_name
  type: (struct_type) @struct_body
) @struct

; Method declarations (with receiver)
(method_declaration
  receiver: (parameter_list) @receiver
  name: (field_identifier) @method_name
) @method
"#;

/// Tree-sitter query for import specs, single or grouped.
const IMPORT_QUERY: &str = r#"
(import_spec) @import
"#;

/// A struct declaration found at file scope.
struct StructDecl {
    name: String,
    embedded: Vec<String>,
}

/// Go declaration parser.
pub struct GoParser {
    language: Language,
    declarations: Query,
    imports: Query,
}

impl GoParser {
    /// Create a new Go parser, compiling its queries once.
    pub fn new() -> Result<Self> {
        let language: Language = tree_sitter_go::LANGUAGE.into();
        let declarations = Query::new(&language, DECLARATION_QUERY)?;
        let imports = Query::new(&language, IMPORT_QUERY)?;
        Ok(Self {
            language,
            declarations,
            imports,
        })
    }

    /// Create a new tree-sitter parser for this call.
    fn create_parser(&self) -> Result<Parser> {
        let mut parser = Parser::new();
        parser.set_language(&self.language)?;
        Ok(parser)
    }

    fn parse_tree(&self, source: &[u8]) -> Result<tree_sitter::Tree> {
        self.create_parser()?
            .parse(source, None)
            .ok_or_else(|| IfaceError::Grammar("tree-sitter returned no tree".to_string()))
    }

    /// Locate the first syntax error in `source`, if any.
    pub fn syntax_error(&self, source: &[u8]) -> Result<Option<Span>> {
        let tree = self.parse_tree(source)?;
        Ok(first_error(tree.root_node()).map(Span::from_node))
    }

    /// Extract struct declarations at file scope.
    fn extract_structs(&self, parsed: &ParsedFile) -> Vec<StructDecl> {
        let query = &self.declarations;
        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(query, parsed.tree.root_node(), &parsed.source[..]);

        let mut structs = Vec::new();
        while let Some(m) = matches.next() {
            let mut name = None;
            let mut body = None;
            let mut spec = None;

            for capture in m.captures {
                match query.capture_names()[capture.index as usize] {
                    "struct_name" => name = Some(parsed.node_text(capture.node).to_string()),
                    "struct_body" => body = Some(capture.node),
                    "struct" => spec = Some(capture.node),
                    _ => {}
                }
            }

            if let (Some(name), Some(body), Some(spec)) = (name, body, spec) {
                if !is_file_scope(spec) {
                    continue;
                }
                structs.push(StructDecl {
                    name,
                    embedded: self.embedded_fields(parsed, body),
                });
            }
        }
        structs
    }

    /// Names of the anonymous fields of a struct body.
    fn embedded_fields(&self, parsed: &ParsedFile, struct_body: Node) -> Vec<String> {
        let mut embedded = Vec::new();
        let mut cursor = struct_body.walk();
        let Some(fields) = struct_body
            .named_children(&mut cursor)
            .find(|n| n.kind() == "field_declaration_list")
        else {
            return embedded;
        };

        let mut cursor = fields.walk();
        for field in fields.named_children(&mut cursor) {
            if field.kind() != "field_declaration" || field.child_by_field_name("name").is_some() {
                continue;
            }
            let Some(ty) = field.child_by_field_name("type") else {
                continue;
            };
            if let Some(name) = base_type_name(parsed, ty) {
                embedded.push(name.to_string());
            }
        }
        embedded
    }

    /// Extract method declarations in file order.
    ///
    /// Excluded methods still report their receiver (with no method) so the
    /// type is known to the file.
    fn extract_methods(
        &self,
        parsed: &ParsedFile,
        options: &ExtractOptions,
    ) -> Vec<(String, Option<Method>)> {
        let query = &self.declarations;
        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(query, parsed.tree.root_node(), &parsed.source[..]);

        let mut methods = Vec::new();
        while let Some(m) = matches.next() {
            let mut decl = None;
            let mut receiver = None;
            let mut name = None;

            for capture in m.captures {
                match query.capture_names()[capture.index as usize] {
                    "method" => decl = Some(capture.node),
                    "receiver" => receiver = Some(capture.node),
                    "method_name" => name = Some(parsed.node_text(capture.node)),
                    _ => {}
                }
            }

            let (Some(decl), Some(receiver), Some(name)) = (decl, receiver, name) else {
                continue;
            };
            let Some(receiver) = receiver_type_name(parsed, receiver) else {
                debug!(file = %parsed.path, method = name, "unrecognized receiver, skipping");
                continue;
            };

            if !options.accepts(name) {
                debug!(file = %parsed.path, receiver, method = name, "method excluded");
                methods.push((receiver.to_string(), None));
                continue;
            }

            let params = decl
                .child_by_field_name("parameters")
                .map(|list| parameter_list(parsed, list))
                .unwrap_or_default();
            let results = match decl.child_by_field_name("result") {
                None => Results::None,
                Some(node) if node.kind() == "parameter_list" => {
                    Results::List(parameter_list(parsed, node))
                }
                Some(node) => Results::Single(parsed.node_text(node).to_string()),
            };
            let docs = if options.copy_docs {
                doc_comments(parsed, decl)
            } else {
                Vec::new()
            };

            methods.push((
                receiver.to_string(),
                Some(Method {
                    name: name.to_string(),
                    receiver: receiver.to_string(),
                    params,
                    results,
                    docs,
                    span: Span::from_node(decl),
                }),
            ));
        }
        methods
    }

    /// Extract file-scope imports in declaration order.
    fn extract_imports(&self, parsed: &ParsedFile) -> Vec<Import> {
        let query = &self.imports;
        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(query, parsed.tree.root_node(), &parsed.source[..]);

        let mut imports = Vec::new();
        while let Some(m) = matches.next() {
            for capture in m.captures {
                let spec = capture.node;
                let Some(path) = spec.child_by_field_name("path") else {
                    continue;
                };
                let path = parsed
                    .node_text(path)
                    .trim_matches(|c| c == '"' || c == '`')
                    .to_string();
                let alias = spec
                    .child_by_field_name("name")
                    .map(|n| parsed.node_text(n).to_string());
                imports.push(Import { alias, path });
            }
        }
        imports
    }
}

impl SourceParser for GoParser {
    fn language_id(&self) -> &'static str {
        "go"
    }

    fn parse(&self, path: &str, source: &[u8]) -> Result<ParsedFile> {
        let tree = self.parse_tree(source)?;

        if let Some(error) = first_error(tree.root_node()) {
            let span = Span::from_node(error);
            return Err(IfaceError::Parse {
                path: path.to_string(),
                line: span.start_line,
                column: span.start_col,
            });
        }

        Ok(ParsedFile {
            tree,
            source: source.to_vec(),
            path: path.to_string(),
        })
    }

    fn extract_units(
        &self,
        parsed: &ParsedFile,
        options: &ExtractOptions,
    ) -> Result<BTreeMap<String, ParsedUnit>> {
        let mut units: BTreeMap<String, ParsedUnit> = BTreeMap::new();

        for decl in self.extract_structs(parsed) {
            let unit = units
                .entry(decl.name.clone())
                .or_insert_with(|| ParsedUnit::new(decl.name.as_str()));
            unit.embedded.get_or_insert_with(Vec::new).extend(decl.embedded);
        }

        for (receiver, method) in self.extract_methods(parsed, options) {
            let unit = units
                .entry(receiver.clone())
                .or_insert_with(|| ParsedUnit::new(receiver.as_str()));
            if let Some(method) = method {
                unit.methods.push(method);
            }
        }

        let imports = self.extract_imports(parsed);
        for unit in units.values_mut() {
            unit.methods.sort_by_key(|m| m.span.start_byte);
            unit.imports = imports.clone();
        }

        debug!(
            file = %parsed.path,
            types = units.len(),
            imports = imports.len(),
            "extracted declarations"
        );
        Ok(units)
    }
}

/// Whether a type spec belongs to a top-level `type` declaration.
fn is_file_scope(spec: Node) -> bool {
    spec.parent()
        .filter(|decl| decl.kind() == "type_declaration")
        .and_then(|decl| decl.parent())
        .is_some_and(|parent| parent.kind() == "source_file")
}

/// First ERROR or MISSING node in document order.
fn first_error(node: Node) -> Option<Node> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if let Some(found) = first_error(child) {
            return Some(found);
        }
    }
    Some(node)
}

/// Name of the named type under pointer, parenthesis, and type arguments.
fn base_type_name<'a>(parsed: &'a ParsedFile, node: Node) -> Option<&'a str> {
    match node.kind() {
        "type_identifier" | "qualified_type" => Some(parsed.node_text(node)),
        "pointer_type" | "parenthesized_type" => node
            .named_child(0)
            .and_then(|inner| base_type_name(parsed, inner)),
        "generic_type" => node
            .child_by_field_name("type")
            .and_then(|inner| base_type_name(parsed, inner)),
        _ => None,
    }
}

/// Base type name of a method receiver list.
fn receiver_type_name<'a>(parsed: &'a ParsedFile, receiver: Node) -> Option<&'a str> {
    let mut cursor = receiver.walk();
    let decl = receiver
        .named_children(&mut cursor)
        .find(|n| n.kind() == "parameter_declaration")?;
    base_type_name(parsed, decl.child_by_field_name("type")?)
}

/// Render a parameter list, keeping source grouping.
fn parameter_list(parsed: &ParsedFile, list: Node) -> Vec<Param> {
    let mut params = Vec::new();
    let mut cursor = list.walk();
    for decl in list.named_children(&mut cursor) {
        let variadic = match decl.kind() {
            "parameter_declaration" => false,
            "variadic_parameter_declaration" => true,
            _ => continue,
        };
        let Some(ty) = decl.child_by_field_name("type") else {
            continue;
        };
        let mut name_cursor = decl.walk();
        let names = decl
            .children_by_field_name("name", &mut name_cursor)
            .map(|n| parsed.node_text(n).to_string())
            .collect();
        params.push(Param {
            names,
            ty: parsed.node_text(ty).to_string(),
            variadic,
        });
    }
    params
}

/// The run of comments ending on the line directly above `decl`.
fn doc_comments(parsed: &ParsedFile, decl: Node) -> Vec<String> {
    let mut docs = Vec::new();
    let mut next_row = decl.start_position().row;
    let mut current = decl.prev_named_sibling();

    while let Some(node) = current {
        if node.kind() != "comment"
            || node.end_position().row + 1 != next_row
            || !starts_line(parsed, node)
        {
            break;
        }
        docs.push(parsed.node_text(node).to_string());
        next_row = node.start_position().row;
        current = node.prev_named_sibling();
    }

    docs.reverse();
    docs
}

/// Whether only whitespace precedes `node` on its first line.
fn starts_line(parsed: &ParsedFile, node: Node) -> bool {
    let start = node.start_byte();
    parsed.source[..start]
        .iter()
        .rev()
        .take_while(|&&b| b != b'\n')
        .all(|b| b.is_ascii_whitespace())
}
