//! Namespace patterns: literal names and `Prefix::*` families.

use crate::host::namespace::SEPARATOR;
use crate::{Error, Result};
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// Marks a namespace family when appended to a namespace name.
pub const WILDCARD_SUFFIX: &str = "::*";

static NAMESPACE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(::[A-Za-z_][A-Za-z0-9_]*)*$")
        .expect("namespace name pattern is valid")
});

/// One entry of the `packages` list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PackagePattern {
    /// Exactly this namespace.
    Literal(String),
    /// This namespace and every namespace below it.
    Family(String),
}

impl PackagePattern {
    pub fn parse(entry: &str) -> Result<Self> {
        let (name, family) = match entry.strip_suffix(WILDCARD_SUFFIX) {
            Some(prefix) => (prefix, true),
            None => (entry, false),
        };
        if !NAMESPACE_NAME.is_match(name) {
            return Err(Error::Config(format!(
                "'{}' is neither a namespace name nor a `Namespace::*` pattern",
                entry
            )));
        }
        Ok(if family {
            PackagePattern::Family(name.to_string())
        } else {
            PackagePattern::Literal(name.to_string())
        })
    }

    pub fn matches(&self, namespace: &str) -> bool {
        match self {
            PackagePattern::Literal(name) => name == namespace,
            PackagePattern::Family(prefix) => is_descendant(prefix, namespace),
        }
    }
}

impl fmt::Display for PackagePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PackagePattern::Literal(name) => write!(f, "{}", name),
            PackagePattern::Family(prefix) => write!(f, "{}{}", prefix, WILDCARD_SUFFIX),
        }
    }
}

/// `namespace` equals `prefix` or lies below it on a separator boundary.
pub fn is_descendant(prefix: &str, namespace: &str) -> bool {
    match namespace.strip_prefix(prefix) {
        Some("") => true,
        Some(rest) => rest.starts_with(SEPARATOR),
        None => false,
    }
}

/// A parsed `packages` list, partitioned into families and literals.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageTargets {
    pub families: Vec<String>,
    pub literals: Vec<String>,
}

impl PackageTargets {
    pub fn parse<I, S>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut targets = Self::default();
        for entry in entries {
            match PackagePattern::parse(entry.as_ref())? {
                PackagePattern::Family(prefix) => push_unique(&mut targets.families, prefix),
                PackagePattern::Literal(name) => push_unique(&mut targets.literals, name),
            }
        }
        Ok(targets)
    }

    pub fn matches(&self, namespace: &str) -> bool {
        self.literals.iter().any(|name| name == namespace)
            || self
                .families
                .iter()
                .any(|prefix| is_descendant(prefix, namespace))
    }

    pub fn is_empty(&self) -> bool {
        self.families.is_empty() && self.literals.is_empty()
    }
}

fn push_unique(list: &mut Vec<String>, item: String) {
    if !list.contains(&item) {
        list.push(item);
    }
}
