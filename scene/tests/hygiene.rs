//! Hygiene — source-level budgets for the scene crate.
//!
//! The reducer and codec run on the server's only event loop, so anything
//! that can panic there takes every session down with it. Budgets are zero;
//! test files (`*_test.rs`) are exempt.

use std::fs;
use std::path::Path;

const BUDGETS: &[(&str, usize)] = &[
    (".unwrap()", 0),
    (".expect(", 0),
    ("panic!(", 0),
    ("unreachable!(", 0),
    ("todo!(", 0),
    ("unimplemented!(", 0),
    ("let _ =", 0),
    (".ok()", 0),
    ("#[allow(dead_code)]", 0),
];

fn production_sources(dir: &Path, out: &mut Vec<(String, String)>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            production_sources(&path, out);
            continue;
        }
        let name = path.to_string_lossy().to_string();
        if path.extension().is_some_and(|e| e == "rs") && !name.ends_with("_test.rs") {
            if let Ok(content) = fs::read_to_string(&path) {
                out.push((name, content));
            }
        }
    }
}

#[test]
fn source_tree_is_not_empty() {
    let mut files = Vec::new();
    production_sources(Path::new("src"), &mut files);
    assert!(files.iter().any(|(name, _)| name.ends_with("action.rs")));
}

#[test]
fn antipattern_budgets_hold() {
    let mut files = Vec::new();
    production_sources(Path::new("src"), &mut files);

    for (pattern, max) in BUDGETS {
        let hits: Vec<(String, usize)> = files
            .iter()
            .map(|(name, content)| (name.clone(), content.lines().filter(|l| l.contains(pattern)).count()))
            .filter(|(_, count)| *count > 0)
            .collect();
        let count: usize = hits.iter().map(|(_, c)| c).sum();
        assert!(count <= *max, "`{pattern}` budget exceeded: found {count}, max {max}.\n{hits:?}");
    }
}
