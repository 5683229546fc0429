//! Deletion markers: schedule removal of a function by annotating it.
//!
//! A function or method whose body carries one of [`DELETION_MARKERS`] (in a
//! comment or a bare string statement, case-insensitive) is dropped from the
//! *base* tree before merging. Snippets are never scanned, so a snippet
//! cannot delete its own code.

use crate::syntax::{DeclKind, Declaration, SourceTree};

/// Closed marker vocabulary, lowercase.
pub const DELETION_MARKERS: [&str; 5] = [
    "remove me",
    "delete me",
    "delete this",
    "delete func",
    "delete function",
];

/// Does this function or method carry a deletion marker?
///
/// Always `false` for anything that is not a function.
#[must_use]
pub fn is_marked(decl: &Declaration) -> bool {
    decl.kind == DeclKind::Function
        && decl.notes.iter().any(|note| {
            let note = note.to_lowercase();
            DELETION_MARKERS.iter().any(|marker| note.contains(marker))
        })
}

/// Drop every marked top-level function and every marked method.
///
/// Returns the pruned tree and the names of what was removed, methods as
/// `Class.method`, in source order.
#[must_use]
pub fn prune(mut tree: SourceTree) -> (SourceTree, Vec<String>) {
    let mut removed = Vec::new();

    tree.declarations.retain_mut(|decl| {
        if is_marked(decl) {
            removed.push(decl.name.clone().unwrap_or_default());
            return false;
        }
        if let Some(body) = decl.class.as_mut() {
            let class_name = decl.name.as_deref().unwrap_or_default();
            body.members.retain(|member| {
                let marked = is_marked(member);
                if marked {
                    let method = member.name.as_deref().unwrap_or_default();
                    removed.push(format!("{class_name}.{method}"));
                }
                !marked
            });
        }
        true
    });

    (tree, removed)
}
