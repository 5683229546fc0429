//! Property tests for merge determinism and idempotence.
//!
//! Modules are generated from a small name alphabet so that base and snippet
//! collide on function, class and method names often. Every property runs
//! over 200 generated scenarios.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use intellimerge_core::{merge, parse, render};
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
struct Module {
    imports: Vec<String>,
    classes: BTreeMap<String, BTreeMap<String, u8>>,
    functions: BTreeMap<String, u8>,
    statements: Vec<(String, u8)>,
}

impl Module {
    fn source(&self) -> String {
        let mut out = String::new();
        for import in &self.imports {
            let _ = writeln!(out, "import {import}");
        }
        for (class, methods) in &self.classes {
            let _ = writeln!(out, "class {class}:");
            if methods.is_empty() {
                out.push_str("    pass\n");
            }
            for (method, value) in methods {
                let _ = writeln!(out, "    def {method}(self):\n        return {value}");
            }
        }
        for (function, value) in &self.functions {
            let _ = writeln!(out, "def {function}():\n    return {value}");
        }
        for (name, value) in &self.statements {
            let _ = writeln!(out, "{name} = {value}");
        }
        out
    }
}

fn ident(prefix: &'static str) -> impl Strategy<Value = String> {
    (0u8..4).prop_map(move |i| format!("{prefix}{i}"))
}

fn module() -> impl Strategy<Value = Module> {
    (
        prop::collection::btree_set(prop::sample::select(vec!["os", "sys", "re", "json"]), 0..3),
        prop::collection::btree_map(
            ident("C"),
            prop::collection::btree_map(ident("m"), any::<u8>(), 0..3),
            0..3,
        ),
        prop::collection::btree_map(ident("f"), any::<u8>(), 0..4),
        prop::collection::vec((ident("v"), any::<u8>()), 0..3),
    )
        .prop_map(|(imports, classes, functions, statements)| Module {
            imports: imports.into_iter().map(str::to_owned).collect(),
            classes,
            functions,
            statements,
        })
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn same_inputs_give_identical_output(base in module(), snippet in module()) {
        let base = base.source();
        let snippet = snippet.source();
        let first = merge(&base, &snippet).unwrap();
        let second = merge(&base, &snippet).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn empty_snippet_matches_plain_rerender(base in module()) {
        let base = base.source();
        let expected = render(&parse(&base).unwrap());
        prop_assert_eq!(merge(&base, "").unwrap(), expected);
    }

    #[test]
    fn reapplying_a_snippet_changes_nothing(base in module(), snippet in module()) {
        let snippet = snippet.source();
        let once = merge(&base.source(), &snippet).unwrap();
        let twice = merge(&once, &snippet).unwrap();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn rendering_is_a_fixpoint(base in module()) {
        let once = render(&parse(&base.source()).unwrap());
        let twice = render(&parse(&once).unwrap());
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn merged_output_always_parses(base in module(), snippet in module()) {
        let merged = merge(&base.source(), &snippet.source()).unwrap();
        prop_assert!(parse(&merged).is_ok(), "unparsable merge:\n{}", merged);
    }

    #[test]
    fn every_snippet_function_is_present_once(base in module(), snippet in module()) {
        let merged = merge(&base.source(), &snippet.source()).unwrap();
        for name in snippet.functions.keys() {
            let header = format!("\ndef {name}():");
            let count = format!("\n{merged}").matches(&header).count();
            prop_assert_eq!(count, 1, "function {} in:\n{}", name, merged);
        }
    }
}
