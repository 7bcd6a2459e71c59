//! Module resolution: the loader hook chain and search-path lookup.
//!
//! `Runtime::require` asks every registered [`LoaderHook`] in order, front to
//! back, for the source of a module path such as `Orchard/Tree.pm`. The first
//! hook that answers wins. When all of them decline, the search paths are
//! scanned on disk. Hooks never get removed by the runtime itself; a hook may
//! suspend itself for the duration of a nested lookup through
//! [`Runtime::with_hook_suspended`](super::Runtime::with_hook_suspended).

use super::namespace::SEPARATOR;
use super::runtime::Runtime;
use crate::Result;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::debug;

/// File suffix of module sources.
pub const MODULE_SUFFIX: &str = ".pm";

/// Lines that end the code portion of a module source.
pub const END_MARKERS: [&str; 2] = ["__END__", "__DATA__"];

/// Action run right after a module's own top-level code has been evaluated.
pub type AfterInit = Box<dyn FnOnce(&mut Runtime) -> Result<()>>;

/// A module load in progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    /// Logical path with `/` separators and the module suffix, e.g. `Orchard/Tree.pm`.
    pub module_path: String,
}

impl LoadRequest {
    pub fn for_namespace(namespace: &str) -> Self {
        Self {
            module_path: module_path_for(namespace),
        }
    }

    /// The namespace this request would define, if the path names a module.
    pub fn namespace(&self) -> Option<String> {
        namespace_for_path(&self.module_path)
    }
}

/// Source text handed back by a hook or read from disk.
pub struct ModuleSource {
    pub origin: PathBuf,
    /// Text up to the end-of-code marker.
    pub code: String,
    /// Text after the end-of-code marker, verbatim. `None` without a marker.
    pub data: Option<String>,
    after_init: Vec<AfterInit>,
}

impl ModuleSource {
    /// Build a source from raw text, separating trailing data.
    pub fn from_text(origin: impl Into<PathBuf>, text: &str) -> Self {
        let (code, data) = split_at_end_marker(text);
        Self {
            origin: origin.into(),
            code: code.to_string(),
            data: data.map(str::to_string),
            after_init: Vec::new(),
        }
    }

    /// Queue an action to run once the module's code has been evaluated.
    pub fn after_init(mut self, action: AfterInit) -> Self {
        self.after_init.push(action);
        self
    }

    pub(crate) fn take_after_init(&mut self) -> Vec<AfterInit> {
        std::mem::take(&mut self.after_init)
    }
}

impl fmt::Debug for ModuleSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleSource")
            .field("origin", &self.origin)
            .field("code_len", &self.code.len())
            .field("has_data", &self.data.is_some())
            .field("after_init", &self.after_init.len())
            .finish()
    }
}

/// A handler in the module-resolution chain.
pub trait LoaderHook {
    /// Label used in logs.
    fn name(&self) -> &str {
        "loader-hook"
    }

    /// Return `Ok(None)` to decline and let the next handler try.
    fn load(&self, rt: &mut Runtime, request: &LoadRequest) -> Result<Option<ModuleSource>>;
}

/// Identifies a hook inside a [`LoaderChain`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HookId(u64);

pub(crate) type HookEntry = (HookId, Rc<dyn LoaderHook>);

/// Ordered hooks plus the on-disk search paths consulted after them.
#[derive(Default)]
pub struct LoaderChain {
    hooks: Vec<HookEntry>,
    search_paths: Vec<PathBuf>,
    next_id: u64,
}

impl LoaderChain {
    /// Insert at the front: the hook sees every load before anyone else.
    pub fn prepend(&mut self, hook: Rc<dyn LoaderHook>) -> HookId {
        let id = self.allocate_id();
        debug!(hook = hook.name(), "Prepending loader hook");
        self.hooks.insert(0, (id, hook));
        id
    }

    pub fn append(&mut self, hook: Rc<dyn LoaderHook>) -> HookId {
        let id = self.allocate_id();
        debug!(hook = hook.name(), "Appending loader hook");
        self.hooks.push((id, hook));
        id
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    pub fn contains(&self, id: HookId) -> bool {
        self.hooks.iter().any(|(hook_id, _)| *hook_id == id)
    }

    pub fn add_search_path(&mut self, path: impl Into<PathBuf>) {
        self.search_paths.push(path.into());
    }

    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    pub(crate) fn snapshot(&self) -> Vec<HookEntry> {
        self.hooks.clone()
    }

    pub(crate) fn detach(&mut self, id: HookId) -> Option<(usize, HookEntry)> {
        let pos = self.hooks.iter().position(|(hook_id, _)| *hook_id == id)?;
        Some((pos, self.hooks.remove(pos)))
    }

    pub(crate) fn reattach(&mut self, pos: usize, entry: HookEntry) {
        let pos = pos.min(self.hooks.len());
        self.hooks.insert(pos, entry);
    }

    /// First existing file for `module_path` across the search paths.
    pub fn find_on_disk(&self, module_path: &str) -> Option<PathBuf> {
        self.search_paths
            .iter()
            .map(|dir| join_module_path(dir, module_path))
            .find(|candidate| candidate.is_file())
    }

    fn allocate_id(&mut self) -> HookId {
        self.next_id += 1;
        HookId(self.next_id)
    }
}

/// Serves module sources from memory, keyed by module path.
#[derive(Debug, Default, Clone)]
pub struct MemoryModules {
    sources: HashMap<String, String>,
}

impl MemoryModules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `text` as the source of `namespace`.
    pub fn with_module(mut self, namespace: &str, text: impl Into<String>) -> Self {
        self.sources.insert(module_path_for(namespace), text.into());
        self
    }
}

impl LoaderHook for MemoryModules {
    fn name(&self) -> &str {
        "memory-modules"
    }

    fn load(&self, _rt: &mut Runtime, request: &LoadRequest) -> Result<Option<ModuleSource>> {
        Ok(self.sources.get(&request.module_path).map(|text| {
            ModuleSource::from_text(format!("(memory)/{}", request.module_path), text)
        }))
    }
}

/// `Orchard::Tree` becomes `Orchard/Tree.pm`.
pub fn module_path_for(namespace: &str) -> String {
    format!("{}{}", namespace.replace(SEPARATOR, "/"), MODULE_SUFFIX)
}

/// `Orchard/Tree.pm` becomes `Orchard::Tree`. Paths without the suffix are not modules.
pub fn namespace_for_path(module_path: &str) -> Option<String> {
    let stem = module_path.strip_prefix("./").unwrap_or(module_path);
    let stem = stem.strip_suffix(MODULE_SUFFIX)?;
    if stem.is_empty() {
        return None;
    }
    Some(stem.replace('/', SEPARATOR))
}

/// Split text at the first line consisting of an end-of-code marker.
///
/// Returns the code before the marker line and everything after it. The
/// marker line itself belongs to neither part.
pub fn split_at_end_marker(text: &str) -> (&str, Option<&str>) {
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        let trimmed = line.trim_end_matches(|c| c == '\n' || c == '\r');
        if END_MARKERS.contains(&trimmed) {
            return (&text[..offset], Some(&text[offset + line.len()..]));
        }
        offset += line.len();
    }
    (text, None)
}

fn join_module_path(dir: &Path, module_path: &str) -> PathBuf {
    module_path
        .split('/')
        .fold(dir.to_path_buf(), |path, component| path.join(component))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn namespace_path_conversion_round_trips() {
        assert_eq!(module_path_for("Orchard::Tree::Pear"), "Orchard/Tree/Pear.pm");
        assert_eq!(
            namespace_for_path("Orchard/Tree/Pear.pm").as_deref(),
            Some("Orchard::Tree::Pear")
        );
        assert_eq!(namespace_for_path("config.toml"), None);
        assert_eq!(namespace_for_path(".pm"), None);
    }

    #[test]
    fn split_keeps_trailing_portion_verbatim() {
        let text = "sub a = args\n__END__\nline one\n  line two\n";
        let (code, data) = split_at_end_marker(text);
        assert_eq!(code, "sub a = args\n");
        assert_eq!(data, Some("line one\n  line two\n"));
    }

    #[test]
    fn split_recognises_data_marker_and_first_occurrence_only() {
        let text = "sub a = args\n__DATA__\n__END__\n";
        let (code, data) = split_at_end_marker(text);
        assert_eq!(code, "sub a = args\n");
        assert_eq!(data, Some("__END__\n"));
    }

    #[test]
    fn split_without_marker_returns_everything_as_code() {
        let (code, data) = split_at_end_marker("sub a = args\nsub b = sum");
        assert_eq!(code, "sub a = args\nsub b = sum");
        assert_eq!(data, None);
    }

    #[test]
    fn marker_must_be_whole_line() {
        let (code, data) = split_at_end_marker("scalar NOTE = \"__END__\"\n");
        assert_eq!(code, "scalar NOTE = \"__END__\"\n");
        assert_eq!(data, None);
    }

    #[test]
    fn marker_at_end_yields_empty_trailing_portion() {
        let (code, data) = split_at_end_marker("sub a = args\n__END__");
        assert_eq!(code, "sub a = args\n");
        assert_eq!(data, Some(""));
    }
}
