//! The host runtime: symbol table, loaded-modules table, and dispatch.

use super::loader::{HookId, LoadRequest, LoaderChain, LoaderHook, ModuleSource};
use super::namespace::{qualify, split_qualified, Binding, Namespace, Sub};
use super::source::{ModuleEvaluator, SourceEvaluator};
use super::value::{CallShape, Reply, Value};
use crate::{Error, Result};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::PathBuf;
use std::rc::Rc;
use tracing::{debug, info};

/// A single-threaded dynamic runtime whose subroutines can be rebound at will.
pub struct Runtime {
    namespaces: BTreeMap<String, Namespace>,
    /// Module path to the location its source came from.
    loaded: BTreeMap<String, PathBuf>,
    data: HashMap<String, String>,
    loader: LoaderChain,
    evaluator: Rc<dyn ModuleEvaluator>,
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

impl Runtime {
    /// A runtime evaluating module sources with [`SourceEvaluator`].
    pub fn new() -> Self {
        Self::with_evaluator(Rc::new(SourceEvaluator))
    }

    pub fn with_evaluator(evaluator: Rc<dyn ModuleEvaluator>) -> Self {
        Self {
            namespaces: BTreeMap::new(),
            loaded: BTreeMap::new(),
            data: HashMap::new(),
            loader: LoaderChain::default(),
            evaluator,
        }
    }

    // ── symbol table ──────────────────────────────────────────────────────────

    pub fn namespace(&self, name: &str) -> Option<&Namespace> {
        self.namespaces.get(name)
    }

    fn namespace_entry(&mut self, name: &str) -> &mut Namespace {
        self.namespaces
            .entry(name.to_string())
            .or_insert_with(|| Namespace::new(name))
    }

    /// Bind `binding` under a fully qualified name, replacing any previous binding.
    pub fn bind(&mut self, qualified: &str, binding: Binding) -> Result<()> {
        let (namespace, member) =
            split_qualified(qualified).ok_or_else(|| Error::InvalidName(qualified.to_string()))?;
        self.namespace_entry(namespace).bind(member, binding);
        Ok(())
    }

    pub fn define_sub(&mut self, qualified: &str, sub: Sub) -> Result<()> {
        self.bind(qualified, Binding::Code(sub))
    }

    /// Define a subroutine from a closure; the closure's reply is conformed by the caller.
    pub fn define_fn<F>(&mut self, qualified: &str, body: F) -> Result<()>
    where
        F: Fn(&mut Runtime, CallShape, Vec<Value>) -> Result<Reply> + 'static,
    {
        self.define_sub(qualified, Sub::new(qualified, body))
    }

    pub fn set_scalar(&mut self, qualified: &str, value: Value) -> Result<()> {
        self.bind(qualified, Binding::Scalar(value))
    }

    pub fn set_array(&mut self, qualified: &str, values: Vec<Value>) -> Result<()> {
        self.bind(qualified, Binding::Array(values))
    }

    pub fn set_parents(&mut self, namespace: &str, parents: Vec<String>) {
        self.namespace_entry(namespace).set_parents(parents);
    }

    pub fn parents(&self, namespace: &str) -> &[String] {
        self.namespaces
            .get(namespace)
            .map(Namespace::parents)
            .unwrap_or(&[])
    }

    pub fn lookup_sub(&self, qualified: &str) -> Option<Sub> {
        let (namespace, member) = split_qualified(qualified)?;
        self.namespaces.get(namespace)?.code(member).cloned()
    }

    pub fn scalar(&self, qualified: &str) -> Option<&Value> {
        let (namespace, member) = split_qualified(qualified)?;
        match self.namespaces.get(namespace)?.get(member)? {
            Binding::Scalar(value) => Some(value),
            _ => None,
        }
    }

    // ── dispatch ──────────────────────────────────────────────────────────────

    /// Call a subroutine by fully qualified name.
    pub fn call(&mut self, qualified: &str, shape: CallShape, args: Vec<Value>) -> Result<Reply> {
        let sub = self
            .lookup_sub(qualified)
            .ok_or_else(|| Error::UndefinedSub(qualified.to_string()))?;
        Ok(sub.call(self, shape, args)?.conform(shape))
    }

    /// Depth-first, left-to-right ancestry of `namespace`, itself first.
    pub fn linearize(&self, namespace: &str) -> Vec<String> {
        let mut order = Vec::new();
        let mut seen = HashSet::new();
        self.linearize_into(namespace, &mut order, &mut seen);
        order
    }

    fn linearize_into(&self, namespace: &str, order: &mut Vec<String>, seen: &mut HashSet<String>) {
        if !seen.insert(namespace.to_string()) {
            return;
        }
        order.push(namespace.to_string());
        for parent in self.parents(namespace) {
            self.linearize_into(parent, order, seen);
        }
    }

    /// Method lookup starting at `class` itself.
    pub fn resolve_method(&self, class: &str, method: &str) -> Option<Sub> {
        self.linearize(class)
            .iter()
            .find_map(|ns| self.lookup_sub(&qualify(ns, method)))
    }

    /// Method lookup among the ancestors of `namespace`, skipping `namespace` itself.
    pub fn resolve_method_above(&self, namespace: &str, method: &str) -> Option<Sub> {
        self.linearize(namespace)
            .iter()
            .skip(1)
            .find_map(|ns| self.lookup_sub(&qualify(ns, method)))
    }

    /// Invoke `method` on `invocant`, which is passed as the leading argument.
    pub fn call_method(
        &mut self,
        invocant: Value,
        method: &str,
        shape: CallShape,
        args: Vec<Value>,
    ) -> Result<Reply> {
        let class = invocant
            .class_name()
            .ok_or_else(|| {
                Error::Died(format!(
                    "Can't call method \"{}\" on unblessed value {}",
                    method, invocant
                ))
            })?
            .to_string();
        let sub = self
            .resolve_method(&class, method)
            .ok_or_else(|| Error::MethodNotFound {
                class: class.clone(),
                method: method.to_string(),
            })?;
        let mut full_args = Vec::with_capacity(args.len() + 1);
        full_args.push(invocant);
        full_args.extend(args);
        Ok(sub.call(self, shape, full_args)?.conform(shape))
    }

    // ── module loading ────────────────────────────────────────────────────────

    pub fn loader(&self) -> &LoaderChain {
        &self.loader
    }

    pub fn add_search_path(&mut self, path: impl Into<PathBuf>) {
        self.loader.add_search_path(path);
    }

    /// Put `hook` ahead of every existing loader hook.
    pub fn prepend_hook(&mut self, hook: Rc<dyn LoaderHook>) -> HookId {
        self.loader.prepend(hook)
    }

    pub fn append_hook(&mut self, hook: Rc<dyn LoaderHook>) -> HookId {
        self.loader.append(hook)
    }

    /// Run `f` with hook `id` taken out of the chain, restoring it afterwards
    /// at its previous position whatever `f` returns.
    pub fn with_hook_suspended<T>(&mut self, id: HookId, f: impl FnOnce(&mut Self) -> T) -> T {
        match self.loader.detach(id) {
            Some((pos, entry)) => {
                let out = f(self);
                self.loader.reattach(pos, entry);
                out
            }
            None => f(self),
        }
    }

    /// Ask the hook chain, then the search paths, for the source of `request`.
    pub fn locate_source(&mut self, request: &LoadRequest) -> Result<Option<ModuleSource>> {
        for (_, hook) in self.loader.snapshot() {
            if let Some(source) = hook.load(self, request)? {
                debug!(hook = hook.name(), module = %request.module_path, "Module served by hook");
                return Ok(Some(source));
            }
        }
        match self.loader.find_on_disk(&request.module_path) {
            Some(path) => {
                let text = std::fs::read_to_string(&path)?;
                Ok(Some(ModuleSource::from_text(path, &text)))
            }
            None => Ok(None),
        }
    }

    /// Load `namespace` unless it has been loaded already.
    ///
    /// The module counts as loaded from the moment its evaluation starts, so a
    /// circular `require` is a no-op. Actions queued on the source through
    /// [`ModuleSource::after_init`] run after evaluation, before returning.
    /// If evaluation or any of those actions fails the module is unmarked, so
    /// a later `require` loads it again; bindings made so far are kept.
    #[tracing::instrument(skip(self))]
    pub fn require(&mut self, namespace: &str) -> Result<()> {
        let request = LoadRequest::for_namespace(namespace);
        if self.loaded.contains_key(&request.module_path) {
            return Ok(());
        }

        let mut source = self.locate_source(&request)?.ok_or_else(|| Error::Load {
            module: request.module_path.clone(),
            searched: self.loader.search_paths().to_vec(),
        })?;

        self.loaded
            .insert(request.module_path.clone(), source.origin.clone());
        let evaluator = Rc::clone(&self.evaluator);
        if let Err(e) = evaluator.evaluate(self, namespace, &source) {
            self.loaded.remove(&request.module_path);
            return Err(e);
        }
        self.namespace_entry(namespace);
        if let Some(data) = source.data.take() {
            self.data.insert(namespace.to_string(), data);
        }
        info!(origin = %source.origin.display(), "Loaded module");

        for action in source.take_after_init() {
            if let Err(e) = action(self) {
                self.loaded.remove(&request.module_path);
                return Err(e);
            }
        }
        Ok(())
    }

    /// True once `namespace` has been loaded through [`Runtime::require`].
    pub fn is_required(&self, namespace: &str) -> bool {
        self.loaded
            .contains_key(&LoadRequest::for_namespace(namespace).module_path)
    }

    /// A namespace is loaded once it was required or holds any binding.
    pub fn is_loaded(&self, namespace: &str) -> bool {
        self.is_required(namespace)
            || self
                .namespaces
                .get(namespace)
                .is_some_and(|ns| !ns.is_empty())
    }

    /// Every loaded namespace, sorted by name.
    pub fn loaded_namespaces(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .loaded
            .keys()
            .filter_map(|path| LoadRequest { module_path: path.clone() }.namespace())
            .chain(
                self.namespaces
                    .values()
                    .filter(|ns| !ns.is_empty())
                    .map(|ns| ns.name.clone()),
            )
            .collect();
        names.sort();
        names.dedup();
        names
    }

    /// Trailing data of a loaded module, if its source had an end-of-code marker.
    pub fn module_data(&self, namespace: &str) -> Option<&str> {
        self.data.get(namespace).map(String::as_str)
    }
}
