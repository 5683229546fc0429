//! The structural merge engine.
//!
//! Combines a *base* tree (the existing file) with an *incoming* tree (a
//! snippet) into one merged tree:
//!
//! 1. Drop base functions/methods carrying a deletion marker.
//! 2. Classify both trees into import / function / class / other buckets.
//! 3. Imports: union, base first, deduplicated by signature.
//! 4. Functions: name-keyed upsert. A same-named incoming function replaces
//!    the base one in place; a new one is appended.
//! 5. Classes: a same-named incoming class has its methods upserted into the
//!    base class (opaque members untouched); a new class is appended whole.
//! 6. Others: incoming others, if any, replace the base others wholesale.
//! 7. Assemble imports ++ classes ++ functions ++ others.
//!
//! # Determinism guarantee
//!
//! Identity is purely nominal: (bucket, name). Name maps are only used for
//! lookup and never iterated, so output order always follows the input
//! vectors. The same two texts always render byte-identical output.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, instrument};

use crate::classify::{Buckets, classify};
use crate::deletion;
use crate::error::{InputSide, ParseError};
use crate::render::render;
use crate::syntax::{self, DeclKind, Declaration, SourceTree};

/// Merge `snippet_text` into `base_text` and render the result.
///
/// Pure: no I/O, no state kept between calls, safe to call concurrently on
/// independent inputs.
///
/// # Errors
/// Returns a [`ParseError`] tagged with the failing side if either input is
/// not valid Python. Nothing is merged in that case.
#[instrument(skip_all, fields(base_len = base_text.len(), snippet_len = snippet_text.len()))]
pub fn merge(base_text: &str, snippet_text: &str) -> Result<String, ParseError> {
    let base = syntax::parse(base_text).map_err(|e| ParseError::new(InputSide::Base, e))?;
    let incoming =
        syntax::parse(snippet_text).map_err(|e| ParseError::new(InputSide::Snippet, e))?;
    Ok(render(&merge_trees(base, incoming)))
}

/// Tree-to-tree merge. See the module docs for the policy.
#[must_use]
pub fn merge_trees(base: SourceTree, incoming: SourceTree) -> SourceTree {
    let (mut base, removed) = deletion::prune(base);
    for name in &removed {
        debug!(name = %name, "dropped declaration carrying a deletion marker");
    }

    let trailer = std::mem::take(&mut base.trailer);
    let base = classify(base);
    let incoming = classify(incoming);

    let merged = Buckets {
        imports: merge_imports(base.imports, incoming.imports),
        functions: upsert(base.functions, incoming.functions),
        classes: merge_classes(base.classes, incoming.classes),
        others: merge_others(base.others, incoming.others),
    };

    SourceTree {
        declarations: merged.into_declarations(),
        trailer,
    }
}

/// Union of both import lists, first occurrence of each signature kept.
fn merge_imports(base: Vec<Declaration>, incoming: Vec<Declaration>) -> Vec<Declaration> {
    let mut seen = BTreeSet::new();
    base.into_iter()
        .chain(incoming)
        .filter(|import| {
            let fresh = seen.insert(import.signature());
            if !fresh {
                debug!(import = %import.signature(), "dropped duplicate import");
            }
            fresh
        })
        .collect()
}

/// Name-keyed upsert of functions into `target`.
///
/// Only `Function` entries of either side take part; other entries of
/// `target` keep their position and `incoming` non-functions are ignored.
/// When `target` holds several functions with one name, the last one is the
/// one replaced. Appended functions join the map, so a name repeated within
/// `incoming` replaces its own earlier copy.
fn upsert(
    mut target: Vec<Declaration>,
    incoming: impl IntoIterator<Item = Declaration>,
) -> Vec<Declaration> {
    let mut slots: BTreeMap<String, usize> = BTreeMap::new();
    for (index, decl) in target.iter().enumerate() {
        if decl.kind != DeclKind::Function {
            continue;
        }
        if let Some(name) = &decl.name
            && slots.insert(name.clone(), index).is_some()
        {
            debug!(name = %name, "duplicate base name, last definition wins");
        }
    }

    for decl in incoming {
        if decl.kind != DeclKind::Function {
            continue;
        }
        let Some(name) = decl.name.clone() else {
            target.push(decl);
            continue;
        };
        match slots.get(&name) {
            Some(&index) => {
                debug!(name = %name, "replacing function");
                replace_keeping_comments(&mut target[index], decl);
            }
            None => {
                debug!(name = %name, "appending function");
                slots.insert(name, target.len());
                target.push(decl);
            }
        }
    }

    target
}

/// Replace `slot` with `incoming`. An incoming declaration without its own
/// leading comments inherits the ones of the declaration it replaces.
fn replace_keeping_comments(slot: &mut Declaration, mut incoming: Declaration) {
    if incoming.leading.is_empty() {
        incoming.leading = std::mem::take(&mut slot.leading);
    }
    *slot = incoming;
}

/// Same-named classes merge method-by-method; new classes are appended.
fn merge_classes(mut target: Vec<Declaration>, incoming: Vec<Declaration>) -> Vec<Declaration> {
    let mut slots: BTreeMap<String, usize> = BTreeMap::new();
    for (index, class) in target.iter().enumerate() {
        if let Some(name) = &class.name
            && slots.insert(name.clone(), index).is_some()
        {
            debug!(class = %name, "duplicate base class, last definition wins");
        }
    }

    for class in incoming {
        let existing = class.name.as_ref().and_then(|name| slots.get(name)).copied();
        match existing {
            Some(index) => merge_methods(&mut target[index], class),
            None => {
                debug!(class = ?class.name, "appending class");
                if let Some(name) = &class.name {
                    slots.insert(name.clone(), target.len());
                }
                target.push(class);
            }
        }
    }

    target
}

/// Upsert the incoming class's methods into `target`'s member list. The base
/// header, opaque members and member order are kept.
fn merge_methods(target: &mut Declaration, incoming: Declaration) {
    debug!(class = ?target.name, "merging class by method");
    let Some(incoming_body) = incoming.class else {
        return;
    };
    let Some(body) = target.class.as_mut() else {
        return;
    };
    let members = std::mem::take(&mut body.members);
    body.members = upsert(members, incoming_body.members);
}

/// Incoming top-level statements, when there are any, replace the base ones
/// as a block. Anonymous statements have no identity to merge on.
fn merge_others(base: Vec<Declaration>, incoming: Vec<Declaration>) -> Vec<Declaration> {
    if incoming.is_empty() {
        base
    } else {
        debug!(
            replaced = base.len(),
            incoming = incoming.len(),
            "replacing top-level statements"
        );
        incoming
    }
}
