//! Parser adapter: Python source text → tree of top-level declarations.
//!
//! Parsing goes through tree-sitter with the Python grammar. The concrete
//! syntax tree is only walked once, here; everything downstream works on the
//! owned [`SourceTree`] / [`Declaration`] model so the merge engine never has
//! to juggle tree-sitter lifetimes.
//!
//! # Comment handling
//!
//! tree-sitter reports comments as standalone nodes. They are not declarations
//! of their own:
//! - a comment on the same line as the end of the previous declaration stays
//!   attached to that declaration as its inline comment;
//! - any other comment becomes a *leading* comment of the next declaration
//!   and travels with it;
//! - comments after the last declaration land in the tree's trailer.

use std::fmt;
use std::path::Path;

use serde::Serialize;
use tree_sitter::{Language, Node, Parser};

use crate::error::SyntaxError;

/// Body indentation used when the source gives no usable hint.
pub const DEFAULT_INDENT: &str = "    ";

// ---------------------------------------------------------------------------
// Language detection
// ---------------------------------------------------------------------------

/// Languages the merge engine understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SourceLanguage {
    Python,
}

impl SourceLanguage {
    /// Detect language from file extension.
    ///
    /// Returns `None` for unsupported or unrecognized extensions.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "py" | "pyi" => Some(Self::Python),
            _ => None,
        }
    }

    /// Get the tree-sitter `Language` for this language.
    fn tree_sitter_language(self) -> Language {
        match self {
            Self::Python => tree_sitter_python::LANGUAGE.into(),
        }
    }
}

impl fmt::Display for SourceLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Python => write!(f, "python"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tree model
// ---------------------------------------------------------------------------

/// The four declaration buckets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclKind {
    Import,
    Function,
    Class,
    Other,
}

impl fmt::Display for DeclKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Import => write!(f, "import"),
            Self::Function => write!(f, "function"),
            Self::Class => write!(f, "class"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// A parsed source file: ordered top-level declarations.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SourceTree {
    pub declarations: Vec<Declaration>,
    /// Comment lines after the last declaration.
    pub trailer: Vec<String>,
}

impl SourceTree {
    #[must_use]
    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }
}

/// One top-level construct, or one member of a class body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Declaration {
    pub kind: DeclKind,
    /// Function or class name. `None` for imports and other statements.
    pub name: Option<String>,
    /// Standalone comment lines directly above the declaration.
    pub leading: Vec<String>,
    /// Source of the node, decorators included. Continuation lines are
    /// relative to the node's own indentation.
    pub text: String,
    /// Lines of `text` (0-based) that start inside a multi-line string
    /// literal. They are emitted exactly as written, never re-indented.
    pub verbatim: Vec<usize>,
    /// Comment written on the last line of the node, after the code.
    pub inline_comment: Option<String>,
    /// Every comment and bare string statement inside a function. This is
    /// what the deletion-marker predicate looks at.
    pub notes: Vec<String>,
    /// Member breakdown, present for classes only.
    pub class: Option<ClassBody>,
}

impl Declaration {
    /// Whitespace-normalized node text, inline comment excluded. Two
    /// declarations with the same signature are the same code.
    #[must_use]
    pub fn signature(&self) -> String {
        self.text.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Human-readable label used in logs and listings.
    #[must_use]
    pub fn label(&self) -> String {
        self.name.as_ref().map_or_else(
            || {
                let first = self.text.lines().next().unwrap_or_default();
                format!("{} `{}`", self.kind, first.trim())
            },
            |name| format!("{} `{name}`", self.kind),
        )
    }

    /// Glue a same-line trailing comment onto the end of this declaration.
    fn append_inline_comment(&mut self, comment: &str) {
        if self.kind == DeclKind::Function {
            self.notes.push(comment.to_owned());
        }
        if let Some(body) = self.class.as_mut()
            && let Some(last) = body.members.last_mut()
        {
            last.append_inline_comment(comment);
            return;
        }
        match self.inline_comment.as_mut() {
            Some(existing) => {
                existing.push_str("  ");
                existing.push_str(comment);
            }
            None => self.inline_comment = Some(comment.to_owned()),
        }
    }
}

/// The inside of a class: header plus members in source order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassBody {
    /// Decorators and the `class Name(...):` line.
    pub header: String,
    /// Indentation of the members, as written in the source.
    pub indent: String,
    /// Methods (kind `Function`) and opaque members (kind `Other`).
    pub members: Vec<Declaration>,
    /// Comment lines after the last member.
    pub trailer: Vec<String>,
}

impl ClassBody {
    /// Iterate over the methods of the class, skipping opaque members.
    pub fn methods(&self) -> impl Iterator<Item = &Declaration> {
        self.members.iter().filter(|m| m.kind == DeclKind::Function)
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse Python source into a [`SourceTree`].
///
/// # Errors
/// Returns [`SyntaxError::Invalid`] if the tree-sitter tree contains any
/// ERROR or MISSING node, with the position of the first one.
pub fn parse(text: &str) -> Result<SourceTree, SyntaxError> {
    let mut parser = Parser::new();
    parser
        .set_language(&SourceLanguage::Python.tree_sitter_language())
        .map_err(|e| SyntaxError::Setup(format!("{e}")))?;

    let tree = parser.parse(text, None).ok_or(SyntaxError::NoTree)?;
    let root = tree.root_node();
    if root.has_error() {
        return Err(describe_error(root, text));
    }

    let mut declarations: Vec<Declaration> = Vec::new();
    let mut pending = Vec::new();
    let mut last_row = None;

    let mut cursor = root.walk();
    for child in root.named_children(&mut cursor) {
        if child.kind() == "comment" {
            let comment = node_text(child, text);
            match declarations.last_mut() {
                Some(previous) if last_row == Some(child.start_position().row) => {
                    previous.append_inline_comment(comment);
                }
                _ => pending.push(comment.to_owned()),
            }
            continue;
        }

        let mut decl = extract_top_level(child, text);
        decl.leading = std::mem::take(&mut pending);
        last_row = Some(child.end_position().row);
        declarations.push(decl);
    }

    Ok(SourceTree {
        declarations,
        trailer: pending,
    })
}

fn extract_top_level(node: Node<'_>, source: &str) -> Declaration {
    let definition = definition_of(node);
    match definition.kind() {
        "class_definition" => extract_class(node, definition, source),
        "function_definition" => extract_function(node, definition, source),
        "import_statement" | "import_from_statement" | "future_import_statement" => {
            plain(DeclKind::Import, node, source)
        }
        _ => plain(DeclKind::Other, node, source),
    }
}

/// Class members are methods or opaque content. Nested classes are never
/// merged member-by-member, so they count as opaque.
fn extract_member(node: Node<'_>, source: &str) -> Declaration {
    let definition = definition_of(node);
    match definition.kind() {
        "function_definition" => extract_function(node, definition, source),
        _ => plain(DeclKind::Other, node, source),
    }
}

/// Unwrap `decorated_definition` to the definition it decorates.
fn definition_of(node: Node<'_>) -> Node<'_> {
    if node.kind() == "decorated_definition" {
        node.child_by_field_name("definition").unwrap_or(node)
    } else {
        node
    }
}

fn plain(kind: DeclKind, node: Node<'_>, source: &str) -> Declaration {
    let verbatim = string_lines(node);
    Declaration {
        kind,
        name: None,
        leading: Vec::new(),
        text: rebase(node_text(node, source), node.start_position().column, &verbatim),
        verbatim,
        inline_comment: None,
        notes: Vec::new(),
        class: None,
    }
}

fn extract_function(outer: Node<'_>, definition: Node<'_>, source: &str) -> Declaration {
    let mut notes = Vec::new();
    collect_notes(definition, source, &mut notes);
    let verbatim = string_lines(outer);
    Declaration {
        kind: DeclKind::Function,
        name: name_of(definition, source),
        leading: Vec::new(),
        text: rebase(node_text(outer, source), outer.start_position().column, &verbatim),
        verbatim,
        inline_comment: None,
        notes,
        class: None,
    }
}

fn extract_class(outer: Node<'_>, definition: Node<'_>, source: &str) -> Declaration {
    let column = outer.start_position().column;
    let verbatim = string_lines(outer);
    let text = rebase(node_text(outer, source), column, &verbatim);
    let name = name_of(definition, source);

    let Some(body) = definition.child_by_field_name("body") else {
        return Declaration {
            kind: DeclKind::Class,
            name,
            leading: Vec::new(),
            class: Some(ClassBody {
                header: text.clone(),
                indent: DEFAULT_INDENT.to_owned(),
                members: Vec::new(),
                trailer: Vec::new(),
            }),
            text,
            verbatim,
            inline_comment: None,
            notes: Vec::new(),
        };
    };

    let header = source
        .get(outer.start_byte()..body.start_byte())
        .unwrap_or_default()
        .trim_end();

    let mut members: Vec<Declaration> = Vec::new();
    let mut pending = Vec::new();
    let mut indent = None;
    let mut last_row = None;

    let mut cursor = body.walk();
    for child in body.named_children(&mut cursor) {
        if child.kind() == "comment" {
            let comment = node_text(child, source);
            match members.last_mut() {
                Some(previous) if last_row == Some(child.start_position().row) => {
                    previous.append_inline_comment(comment);
                }
                _ => pending.push(comment.to_owned()),
            }
            continue;
        }

        if indent.is_none() {
            indent = line_indent(child, source);
        }
        let mut member = extract_member(child, source);
        member.leading = std::mem::take(&mut pending);
        last_row = Some(child.end_position().row);
        members.push(member);
    }

    Declaration {
        kind: DeclKind::Class,
        name,
        leading: Vec::new(),
        text,
        verbatim: verbatim.clone(),
        inline_comment: None,
        notes: Vec::new(),
        class: Some(ClassBody {
            header: rebase(header, column, &verbatim),
            indent: indent.unwrap_or_else(|| DEFAULT_INDENT.to_owned()),
            members,
            trailer: pending,
        }),
    }
}

fn name_of(definition: Node<'_>, source: &str) -> Option<String> {
    definition
        .child_by_field_name("name")
        .map(|n| node_text(n, source).to_owned())
}

/// Collect comments and bare string statements below `node`. Nested
/// functions and classes carry their own notes and are not searched.
fn collect_notes(node: Node<'_>, source: &str, notes: &mut Vec<String>) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "comment" => notes.push(node_text(child, source).to_owned()),
            "expression_statement" if is_bare_string(child) => {
                notes.push(node_text(child, source).to_owned());
            }
            "function_definition" | "class_definition" | "decorated_definition" => continue,
            _ => {}
        }
        collect_notes(child, source, notes);
    }
}

/// Line numbers, relative to the first line of `node`, that begin inside a
/// string literal spanning several lines.
fn string_lines(node: Node<'_>) -> Vec<usize> {
    let mut lines = Vec::new();
    collect_string_lines(node, node.start_position().row, &mut lines);
    lines
}

fn collect_string_lines(node: Node<'_>, first_row: usize, lines: &mut Vec<usize>) {
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if child.kind() == "string" {
            let start = child.start_position().row;
            let end = child.end_position().row;
            lines.extend((start + 1..=end).map(|row| row - first_row));
        } else {
            collect_string_lines(child, first_row, lines);
        }
    }
}

fn is_bare_string(statement: Node<'_>) -> bool {
    let mut cursor = statement.walk();
    let named: Vec<Node<'_>> = statement.named_children(&mut cursor).collect();
    matches!(named.as_slice(), [only] if matches!(only.kind(), "string" | "concatenated_string"))
}

/// Whitespace in front of `node` on its own line, if the node starts the line.
fn line_indent(node: Node<'_>, source: &str) -> Option<String> {
    let start = node.start_byte();
    let before = source.get(..start)?;
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    let prefix = &before[line_start..];
    let is_indent = !prefix.is_empty() && prefix.chars().all(|c| c == ' ' || c == '\t');
    is_indent.then(|| prefix.to_owned())
}

fn node_text<'s>(node: Node<'_>, source: &'s str) -> &'s str {
    source.get(node.byte_range()).unwrap_or_default()
}

/// Strip up to `column` bytes of leading whitespace from every line but the
/// first (the first line starts at the node and carries no indentation).
/// Lines listed in `verbatim` belong to a string literal and are kept as is.
pub(crate) fn rebase(text: &str, column: usize, verbatim: &[usize]) -> String {
    if column == 0 {
        return text.to_owned();
    }
    let mut out = String::with_capacity(text.len());
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 && verbatim.binary_search(&i).is_ok() {
            out.push('\n');
            out.push_str(line);
        } else if i > 0 {
            out.push('\n');
            let strip = line
                .bytes()
                .take(column)
                .take_while(|b| *b == b' ' || *b == b'\t')
                .count();
            out.push_str(&line[strip..]);
        } else {
            out.push_str(line);
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Error reporting
// ---------------------------------------------------------------------------

fn describe_error(root: Node<'_>, source: &str) -> SyntaxError {
    let node = first_error(root).unwrap_or(root);
    let position = node.start_position();
    let near = if node.is_missing() {
        format!("missing {}", node.kind())
    } else {
        source
            .get(node.start_byte()..)
            .unwrap_or_default()
            .lines()
            .next()
            .unwrap_or_default()
            .chars()
            .take(32)
            .collect()
    };
    SyntaxError::Invalid {
        line: position.row + 1,
        column: position.column + 1,
        near,
    }
}

fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
    children
        .into_iter()
        .filter(|child| child.has_error())
        .find_map(first_error)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
