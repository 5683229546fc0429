//! Renderer: [`SourceTree`] → Python source text.
//!
//! The whole file is re-rendered from the tree. Declaration text is emitted
//! as parsed, and lines inside multi-line strings are never re-indented.
//! Only the layout between declarations is normalized:
//!
//! - consecutive imports, and consecutive other statements, sit on adjacent
//!   lines;
//! - functions and classes are surrounded by two blank lines;
//! - any other kind change gets one blank line;
//! - inside a class, methods are separated from their neighbours by one
//!   blank line.
//!
//! The output always ends with exactly one newline, except for an empty tree
//! which renders as the empty string.

use crate::syntax::{ClassBody, DeclKind, Declaration, SourceTree};

/// Render a tree back to source text. Total for any tree.
#[must_use]
pub fn render(tree: &SourceTree) -> String {
    let mut out = String::new();
    let mut previous: Option<DeclKind> = None;

    for decl in &tree.declarations {
        if let Some(prev) = previous {
            out.push_str(top_level_gap(prev, decl.kind));
        }
        render_declaration(decl, &mut out);
        out.push('\n');
        previous = Some(decl.kind);
    }

    if !tree.trailer.is_empty() {
        if previous.is_some() {
            out.push('\n');
        }
        for line in &tree.trailer {
            out.push_str(line);
            out.push('\n');
        }
    }

    out
}

/// Extra newlines between two top-level declarations (each declaration
/// already ends its own line).
const fn top_level_gap(previous: DeclKind, next: DeclKind) -> &'static str {
    match (previous, next) {
        (DeclKind::Import, DeclKind::Import) | (DeclKind::Other, DeclKind::Other) => "",
        (DeclKind::Function | DeclKind::Class, _) | (_, DeclKind::Function | DeclKind::Class) => {
            "\n\n"
        }
        _ => "\n",
    }
}

/// Render one declaration without a trailing newline.
fn render_declaration(decl: &Declaration, out: &mut String) {
    for comment in &decl.leading {
        out.push_str(comment);
        out.push('\n');
    }
    match &decl.class {
        Some(body) => render_class(body, out),
        None => out.push_str(&decl.text),
    }
    if let Some(comment) = &decl.inline_comment {
        out.push_str("  ");
        out.push_str(comment);
    }
}

fn render_class(body: &ClassBody, out: &mut String) {
    out.push_str(&body.header);

    if body.members.is_empty() {
        out.push('\n');
        out.push_str(&body.indent);
        out.push_str("pass");
    }

    let mut previous: Option<DeclKind> = None;
    for member in &body.members {
        out.push('\n');
        if let Some(prev) = previous
            && (prev == DeclKind::Function || member.kind == DeclKind::Function)
        {
            out.push('\n');
        }
        let mut flat = String::new();
        render_declaration(member, &mut flat);
        let verbatim: Vec<usize> = member
            .verbatim
            .iter()
            .map(|line| line + member.leading.len())
            .collect();
        push_indented(&flat, &body.indent, &verbatim, out);
        previous = Some(member.kind);
    }

    for comment in &body.trailer {
        out.push('\n');
        out.push_str(&body.indent);
        out.push_str(comment);
    }
}

/// Prefix every non-empty line of `text` with `indent`, except the lines
/// listed in `verbatim`.
fn push_indented(text: &str, indent: &str, verbatim: &[usize], out: &mut String) {
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
        }
        if verbatim.binary_search(&i).is_ok() {
            out.push_str(line);
        } else if !line.is_empty() {
            out.push_str(indent);
            out.push_str(line);
        }
    }
}
