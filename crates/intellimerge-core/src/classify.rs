//! Declaration classifier: partition a tree's top-level body into buckets.

use crate::syntax::{DeclKind, Declaration, SourceTree};

/// The four ordered declaration buckets of one tree.
///
/// Each bucket preserves the top-level order of the source tree. The
/// partition is exhaustive: every declaration lands in exactly one bucket.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Buckets {
    pub imports: Vec<Declaration>,
    pub functions: Vec<Declaration>,
    pub classes: Vec<Declaration>,
    pub others: Vec<Declaration>,
}

impl Buckets {
    /// Total number of declarations across all buckets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.imports.len() + self.functions.len() + self.classes.len() + self.others.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reassemble in the fixed merge order: imports, classes, functions,
    /// others.
    #[must_use]
    pub fn into_declarations(self) -> Vec<Declaration> {
        let mut declarations = Vec::with_capacity(self.len());
        declarations.extend(self.imports);
        declarations.extend(self.classes);
        declarations.extend(self.functions);
        declarations.extend(self.others);
        declarations
    }
}

/// Partition `tree` into buckets. The tree's trailer is not a declaration
/// and is dropped; callers that need it take it first.
#[must_use]
pub fn classify(tree: SourceTree) -> Buckets {
    let mut buckets = Buckets::default();
    for decl in tree.declarations {
        match decl.kind {
            DeclKind::Import => buckets.imports.push(decl),
            DeclKind::Function => buckets.functions.push(decl),
            DeclKind::Class => buckets.classes.push(decl),
            DeclKind::Other => buckets.others.push(decl),
        }
    }
    buckets
}
