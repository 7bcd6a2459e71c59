//! Namespaces, their bindings, and callable subroutines.

use super::runtime::Runtime;
use super::value::{CallShape, Reply, Value};
use crate::Result;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

/// Separator between namespace components and between a namespace and a member.
pub const SEPARATOR: &str = "::";

type SubBody = dyn Fn(&mut Runtime, CallShape, Vec<Value>) -> Result<Reply>;

/// A callable bound in a namespace.
///
/// Cloning is cheap and yields the same underlying body, so a captured
/// original stays callable after its binding has been replaced.
#[derive(Clone)]
pub struct Sub {
    origin: Rc<str>,
    body: Rc<SubBody>,
}

impl Sub {
    /// `origin` is the fully qualified name the body was first defined under.
    pub fn new<F>(origin: impl Into<String>, body: F) -> Self
    where
        F: Fn(&mut Runtime, CallShape, Vec<Value>) -> Result<Reply> + 'static,
    {
        let origin: String = origin.into();
        Self {
            origin: Rc::from(origin),
            body: Rc::new(body),
        }
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn call(&self, rt: &mut Runtime, shape: CallShape, args: Vec<Value>) -> Result<Reply> {
        (self.body)(rt, shape, args)
    }

    /// True when both handles share one body.
    pub fn same_body(&self, other: &Sub) -> bool {
        Rc::ptr_eq(&self.body, &other.body)
    }
}

impl fmt::Debug for Sub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sub({})", self.origin)
    }
}

/// One slot in a namespace.
#[derive(Debug, Clone)]
pub enum Binding {
    Code(Sub),
    Scalar(Value),
    Array(Vec<Value>),
}

/// A named container of bindings plus its declared parents.
#[derive(Debug, Clone, Default)]
pub struct Namespace {
    pub name: String,
    members: BTreeMap<String, Binding>,
    parents: Vec<String>,
}

impl Namespace {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn bind(&mut self, member: impl Into<String>, binding: Binding) {
        self.members.insert(member.into(), binding);
    }

    pub fn get(&self, member: &str) -> Option<&Binding> {
        self.members.get(member)
    }

    pub fn code(&self, member: &str) -> Option<&Sub> {
        match self.members.get(member) {
            Some(Binding::Code(sub)) => Some(sub),
            _ => None,
        }
    }

    /// Short names of members bound to code.
    pub fn callable_members(&self) -> impl Iterator<Item = &str> {
        self.members.iter().filter_map(|(name, binding)| match binding {
            Binding::Code(_) => Some(name.as_str()),
            _ => None,
        })
    }

    pub fn parents(&self) -> &[String] {
        &self.parents
    }

    pub fn set_parents(&mut self, parents: Vec<String>) {
        self.parents = parents;
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty() && self.parents.is_empty()
    }
}

/// Split `Foo::Bar::baz` into (`Foo::Bar`, `baz`).
pub fn split_qualified(name: &str) -> Option<(&str, &str)> {
    let idx = name.rfind(SEPARATOR)?;
    let (namespace, member) = (&name[..idx], &name[idx + SEPARATOR.len()..]);
    if namespace.is_empty() || member.is_empty() {
        return None;
    }
    Some((namespace, member))
}

pub fn qualify(namespace: &str, member: &str) -> String {
    format!("{}{}{}", namespace, SEPARATOR, member)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_qualified_takes_last_component() {
        assert_eq!(
            split_qualified("Orchard::Tree::grow"),
            Some(("Orchard::Tree", "grow"))
        );
        assert_eq!(split_qualified("grow"), None);
        assert_eq!(split_qualified("::grow"), None);
    }

    #[test]
    fn callable_members_skip_data_bindings() {
        let mut ns = Namespace::new("Orchard::Tree");
        ns.bind("VERSION", Binding::Scalar(Value::str("1.0")));
        ns.bind("SEEDS", Binding::Array(vec![Value::Int(1)]));
        ns.bind(
            "grow",
            Binding::Code(Sub::new("Orchard::Tree::grow", |_, _, _| Ok(Reply::Nothing))),
        );
        let names: Vec<_> = ns.callable_members().collect();
        assert_eq!(names, vec!["grow"]);
    }
}
