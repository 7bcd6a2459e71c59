//! Wrap configuration: the in-memory [`WrapConfig`] and the declarative
//! [`WrapOptions`] it can be built from.

use crate::host::{CallShape, Runtime, Value};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::rc::Rc;

/// A `pre` or `post` callback: `(runtime, shape, qualified sub name, values)`.
///
/// `pre` receives the call's arguments, `post` the values the original returned.
pub type Hook = Rc<dyn Fn(&mut Runtime, CallShape, &str, &[Value]) -> Result<()>>;

/// Whether `post` fires when the original fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostPolicy {
    /// `post` runs only after the original returned normally.
    #[default]
    OnSuccess,
    /// `post` also runs, with no values, before a failure propagates.
    Always,
}

/// One request to wrap subroutines.
#[derive(Clone, Default)]
pub struct WrapConfig {
    /// Namespace names; a trailing `::*` selects the namespace and all descendants.
    pub packages: Vec<String>,
    /// Fully qualified subroutine names wrapped regardless of namespace.
    pub subs: Vec<String>,
    pub wrap_inherited: bool,
    pub pre: Option<Hook>,
    pub post: Option<Hook>,
    pub post_policy: PostPolicy,
}

impl WrapConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn packages<I, S>(mut self, packages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.packages.extend(packages.into_iter().map(Into::into));
        self
    }

    pub fn subs<I, S>(mut self, subs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.subs.extend(subs.into_iter().map(Into::into));
        self
    }

    pub fn wrap_inherited(mut self, yes: bool) -> Self {
        self.wrap_inherited = yes;
        self
    }

    pub fn pre<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut Runtime, CallShape, &str, &[Value]) -> Result<()> + 'static,
    {
        self.pre = Some(Rc::new(hook));
        self
    }

    pub fn post<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut Runtime, CallShape, &str, &[Value]) -> Result<()> + 'static,
    {
        self.post = Some(Rc::new(hook));
        self
    }

    pub fn post_policy(mut self, policy: PostPolicy) -> Self {
        self.post_policy = policy;
        self
    }

    pub fn has_hooks(&self) -> bool {
        self.pre.is_some() || self.post.is_some()
    }

    /// The same request restricted to a single namespace.
    pub fn narrowed_to(&self, namespace: &str) -> Self {
        Self {
            packages: vec![namespace.to_string()],
            ..self.clone()
        }
    }
}

impl fmt::Debug for WrapConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WrapConfig")
            .field("packages", &self.packages)
            .field("subs", &self.subs)
            .field("wrap_inherited", &self.wrap_inherited)
            .field("pre", &self.pre.is_some())
            .field("post", &self.post.is_some())
            .field("post_policy", &self.post_policy)
            .finish()
    }
}

/// Serializable part of a [`WrapConfig`], read from TOML or JSON.
///
/// ```toml
/// packages = ["Orchard::Tree::*", "Util"]
/// subs = ["Main::run"]
/// wrap_inherited = true
/// post_policy = "always"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WrapOptions {
    #[serde(default)]
    pub packages: Vec<String>,
    #[serde(default)]
    pub subs: Vec<String>,
    #[serde(default)]
    pub wrap_inherited: bool,
    #[serde(default)]
    pub post_policy: PostPolicy,
}

impl WrapOptions {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let de = toml::Deserializer::new(text);
        serde_path_to_error::deserialize(de).map_err(|e| config_error(e.path(), e.inner()))
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let mut de = serde_json::Deserializer::from_str(text);
        serde_path_to_error::deserialize(&mut de).map_err(|e| config_error(e.path(), e.inner()))
    }

    /// Read options from a `.json` file, or TOML for any other extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&text),
            _ => Self::from_toml_str(&text),
        }
    }

    pub fn into_config(self) -> WrapConfig {
        WrapConfig {
            packages: self.packages,
            subs: self.subs,
            wrap_inherited: self.wrap_inherited,
            post_policy: self.post_policy,
            ..WrapConfig::default()
        }
    }
}

fn config_error(path: &serde_path_to_error::Path, inner: &dyn fmt::Display) -> Error {
    let location = path.to_string();
    if location == "." {
        Error::Config(inner.to_string())
    } else {
        Error::Config(format!("{}: {}", location, inner))
    }
}
