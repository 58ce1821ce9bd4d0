//! Method and import deduplication, and optional import pruning.

use std::collections::HashSet;
use std::hash::Hash;

use clap::ValueEnum;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analysis::{Import, Method};

/// Package-qualified identifier inside a signature (`ctx` in `ctx.Context`).
static QUALIFIER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b([A-Za-z_][A-Za-z0-9_]*)\.").unwrap());

/// How two methods are judged to be the same.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DedupMode {
    /// Exact rendered signature text. Types spelled with different
    /// whitespace are different methods.
    #[default]
    Textual,
    /// Name plus parameter and result types, ignoring parameter names and
    /// whitespace.
    Structural,
}

impl DedupMode {
    fn key(self, method: &Method) -> String {
        match self {
            DedupMode::Textual => method.identity_key(),
            DedupMode::Structural => method.structural_key(),
        }
    }
}

/// Keep the first occurrence of every key, preserving order.
fn first_by_key<T, K, F>(items: Vec<T>, mut key: F) -> Vec<T>
where
    K: Eq + Hash,
    F: FnMut(&T) -> K,
{
    let mut seen = HashSet::new();
    items.into_iter().filter(|item| seen.insert(key(item))).collect()
}

/// Drop duplicate methods and imports. First occurrence wins.
pub fn dedup(
    methods: Vec<Method>,
    imports: Vec<Import>,
    mode: DedupMode,
) -> (Vec<Method>, Vec<Import>) {
    let method_count = methods.len();
    let import_count = imports.len();

    let methods = first_by_key(methods, |m| mode.key(m));
    let imports = first_by_key(imports, |i| i.to_string());

    debug!(
        methods_dropped = method_count - methods.len(),
        imports_dropped = import_count - imports.len(),
        ?mode,
        "deduplicated"
    );
    (methods, imports)
}

/// Keep only imports whose package name is referenced by a signature.
///
/// Blank and dot imports are always kept. Doc comments do not count as
/// references.
pub fn prune_unused_imports(methods: &[Method], imports: Vec<Import>) -> Vec<Import> {
    let referenced: HashSet<String> = methods
        .iter()
        .flat_map(|m| {
            let signature = m.signature();
            QUALIFIER
                .captures_iter(&signature)
                .map(|c| c[1].to_string())
                .collect::<Vec<_>>()
        })
        .collect();

    imports
        .into_iter()
        .filter(|import| {
            let keep = import.is_side_effect() || referenced.contains(&import.package_name());
            if !keep {
                debug!(import = %import, "pruning unreferenced import");
            }
            keep
        })
        .collect()
}
