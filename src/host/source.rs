//! Evaluation of module source text into namespace bindings.
//!
//! The runtime only knows that a module's code has to be evaluated; how is
//! decided by the injected [`ModuleEvaluator`]. [`SourceEvaluator`] handles a
//! small line-oriented declaration format:
//!
//! ```text
//! package Orchard::Tree
//! parent Orchard::Plant
//! import Orchard::Util::measure as height
//! scalar VERSION = "1.0"
//! array SEEDS = 1 2 3
//! sub grow = sum
//! ```
//!
//! Sub bodies are one of `value <json>`, `list <json>...`, `args`, `sum`,
//! `shape`, `call <Namespace::sub>` or `die <message>`. Blank lines and lines
//! starting with `#` are ignored. `parent` and `import` load the namespaces
//! they name unless those are loaded already.

use super::loader::ModuleSource;
use super::namespace::{qualify, split_qualified, Binding, Sub};
use super::runtime::Runtime;
use super::value::{CallShape, Reply, Value};
use crate::{Error, Result};

/// Turns a module's code into bindings inside a runtime.
pub trait ModuleEvaluator {
    fn evaluate(&self, rt: &mut Runtime, namespace: &str, source: &ModuleSource) -> Result<()>;
}

/// Evaluator for the built-in declaration format.
#[derive(Debug, Default, Clone, Copy)]
pub struct SourceEvaluator;

impl ModuleEvaluator for SourceEvaluator {
    fn evaluate(&self, rt: &mut Runtime, namespace: &str, source: &ModuleSource) -> Result<()> {
        let origin = source.origin.display().to_string();
        for (idx, raw) in source.code.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let syntax = |message: String| Error::Syntax {
                path: origin.clone(),
                line: idx + 1,
                message,
            };
            let (keyword, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
            let rest = rest.trim();
            match keyword {
                "package" => {
                    if rest != namespace {
                        return Err(syntax(format!(
                            "package {} declared in source for {}",
                            rest, namespace
                        )));
                    }
                }
                "parent" => {
                    if rest.is_empty() {
                        return Err(syntax("parent needs at least one namespace".into()));
                    }
                    let mut parents = rt.parents(namespace).to_vec();
                    for parent in rest.split_whitespace() {
                        if !rt.is_loaded(parent) {
                            rt.require(parent)?;
                        }
                        parents.push(parent.to_string());
                    }
                    rt.set_parents(namespace, parents);
                }
                "import" => import(rt, namespace, rest).map_err(|e| match e {
                    Error::InvalidName(m) => syntax(format!("bad import {}", m)),
                    other => other,
                })?,
                "scalar" => {
                    let (name, expr) = assignment(rest).ok_or_else(|| {
                        syntax("expected `scalar NAME = <json>`".into())
                    })?;
                    let mut values = json_values(expr).map_err(syntax)?;
                    if values.len() != 1 {
                        return Err(syntax("scalar takes exactly one value".into()));
                    }
                    rt.set_scalar(&qualify(namespace, name), values.remove(0))?;
                }
                "array" => {
                    let (name, expr) = assignment(rest).ok_or_else(|| {
                        syntax("expected `array NAME = <json>...`".into())
                    })?;
                    let values = json_values(expr).map_err(syntax)?;
                    rt.set_array(&qualify(namespace, name), values)?;
                }
                "sub" => {
                    let (name, body) = assignment(rest)
                        .ok_or_else(|| syntax("expected `sub NAME = <body>`".into()))?;
                    let qualified = qualify(namespace, name);
                    let sub = compile_body(&qualified, body).map_err(syntax)?;
                    rt.define_sub(&qualified, sub)?;
                }
                other => return Err(syntax(format!("unknown directive `{}`", other))),
            }
        }
        Ok(())
    }
}

/// `import Some::Module::name [as alias]`: load the module and bind its sub locally.
fn import(rt: &mut Runtime, namespace: &str, clause: &str) -> Result<()> {
    let mut words = clause.split_whitespace();
    let target = words.next().unwrap_or_default();
    let alias = match (words.next(), words.next(), words.next()) {
        (None, _, _) => None,
        (Some("as"), Some(alias), None) => Some(alias),
        _ => return Err(Error::InvalidName(clause.to_string())),
    };
    let (from, member) =
        split_qualified(target).ok_or_else(|| Error::InvalidName(target.to_string()))?;
    if !rt.is_loaded(from) {
        rt.require(from)?;
    }
    let sub = rt
        .lookup_sub(target)
        .ok_or_else(|| Error::UndefinedSub(target.to_string()))?;
    rt.bind(&qualify(namespace, alias.unwrap_or(member)), Binding::Code(sub))
}

fn assignment(rest: &str) -> Option<(&str, &str)> {
    let (name, expr) = rest.split_once('=')?;
    let name = name.trim();
    if name.is_empty() || name.contains(char::is_whitespace) {
        return None;
    }
    Some((name, expr.trim()))
}

fn json_values(expr: &str) -> std::result::Result<Vec<Value>, String> {
    serde_json::Deserializer::from_str(expr)
        .into_iter::<serde_json::Value>()
        .map(|v| v.map(Value::from).map_err(|e| format!("bad value: {}", e)))
        .collect()
}

fn compile_body(qualified: &str, body: &str) -> std::result::Result<Sub, String> {
    let (kind, rest) = body.split_once(char::is_whitespace).unwrap_or((body, ""));
    let rest = rest.trim();
    let sub = match kind {
        "value" => {
            let mut values = json_values(rest)?;
            if values.len() != 1 {
                return Err("value takes exactly one value".into());
            }
            let value = values.remove(0);
            Sub::new(qualified, move |_, _, _| Ok(Reply::Single(value.clone())))
        }
        "list" => {
            let values = json_values(rest)?;
            Sub::new(qualified, move |_, shape, _| {
                Ok(match shape {
                    CallShape::Single => Reply::Single(Value::Int(values.len() as i64)),
                    _ => Reply::Many(values.clone()),
                })
            })
        }
        "args" => Sub::new(qualified, |_, _, args| Ok(Reply::Many(args))),
        "sum" => Sub::new(qualified, |_, _, args| Ok(Reply::Single(sum(&args)))),
        "shape" => Sub::new(qualified, |_, shape, _| {
            Ok(Reply::Single(Value::Str(shape.to_string())))
        }),
        "call" => {
            if split_qualified(rest).is_none() {
                return Err(format!("call needs a qualified sub name, got `{}`", rest));
            }
            let target = rest.to_string();
            Sub::new(qualified, move |rt, shape, args| rt.call(&target, shape, args))
        }
        "die" => {
            let message = rest.to_string();
            Sub::new(qualified, move |_, _, _| Err(Error::Died(message.clone())))
        }
        other => return Err(format!("unknown sub body `{}`", other)),
    };
    Ok(sub)
}

/// Numeric sum of the numeric arguments; invocants and other strings are skipped.
///
/// Stays an integer while every operand is one and the total fits in `i64`,
/// otherwise the sum is computed in floating point.
fn sum(args: &[Value]) -> Value {
    let numbers: Vec<&Value> = args.iter().filter(|v| v.as_f64().is_some()).collect();
    let exact = numbers.iter().try_fold(0i64, |total, v| match v {
        Value::Int(i) => total.checked_add(*i),
        _ => None,
    });
    match exact {
        Some(total) => Value::Int(total),
        None => Value::Float(numbers.iter().filter_map(|v| v.as_f64()).sum()),
    }
}
