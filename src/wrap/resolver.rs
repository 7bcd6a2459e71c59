//! Expansion of a `packages`/`subs` request into concrete subroutine names.

use super::introspect::list_callables;
use super::pattern::{is_descendant, PackageTargets};
use crate::host::Runtime;
use std::collections::HashSet;

/// Loaded namespaces selected by `targets`.
///
/// Literals come first in listed order, followed by family members in name
/// order. Unmatched families contribute nothing.
pub fn loaded_matches(rt: &Runtime, targets: &PackageTargets) -> Vec<String> {
    let mut selected: Vec<String> = targets
        .literals
        .iter()
        .filter(|name| rt.is_loaded(name))
        .cloned()
        .collect();

    if !targets.families.is_empty() {
        for namespace in rt.loaded_namespaces() {
            let in_family = targets
                .families
                .iter()
                .any(|prefix| is_descendant(prefix, &namespace));
            if in_family && !selected.contains(&namespace) {
                selected.push(namespace);
            }
        }
    }
    selected
}

/// The part of `targets` a future module load can still satisfy: every family,
/// and each literal whose module has not been loaded yet.
pub fn pending(rt: &Runtime, targets: &PackageTargets) -> PackageTargets {
    PackageTargets {
        families: targets.families.clone(),
        literals: targets
            .literals
            .iter()
            .filter(|name| !rt.is_required(name))
            .cloned()
            .collect(),
    }
}

/// Callables of `namespaces` followed by the explicit `subs`, without duplicates.
pub fn target_subs(rt: &Runtime, namespaces: &[String], subs: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    namespaces
        .iter()
        .flat_map(|ns| list_callables(rt, ns))
        .chain(subs.iter().cloned())
        .filter(|name| seen.insert(name.clone()))
        .collect()
}
