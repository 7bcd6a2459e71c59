//! Dynamic values and the call-shape convention.
//!
//! Every call into the host carries a [`CallShape`] describing what the caller
//! wants back. Callables may inspect it and answer differently (a list body
//! answers with its element count when a single value is wanted), and the
//! runtime conforms whatever [`Reply`] comes back to the requested shape.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A dynamic value flowing through subroutine calls.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Undef,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    Object {
        class: String,
        fields: BTreeMap<String, Value>,
    },
}

impl Value {
    pub fn str(s: impl Into<String>) -> Self {
        Value::Str(s.into())
    }

    /// Construct an instance blessed into `class`.
    pub fn object(class: impl Into<String>) -> Self {
        Value::Object {
            class: class.into(),
            fields: BTreeMap::new(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric view used by arithmetic bodies. Strings and containers are not numbers.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    /// The class a method call on this invocant dispatches through.
    ///
    /// An empty name is no class: objects built from JSON without a `class`
    /// key are unblessed.
    pub fn class_name(&self) -> Option<&str> {
        match self {
            Value::Str(name) | Value::Object { class: name, .. } if !name.is_empty() => {
                Some(name.as_str())
            }
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undef => write!(f, "undef"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Str(s) => write!(f, "{:?}", s),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Object { class, .. } => write!(f, "{}=OBJECT", class),
        }
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Undef,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::Str(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => {
                let mut fields = BTreeMap::new();
                let mut class = String::new();
                for (key, value) in map {
                    if key == "class" {
                        if let serde_json::Value::String(name) = &value {
                            class = name.clone();
                            continue;
                        }
                    }
                    fields.insert(key, Value::from(value));
                }
                Value::Object { class, fields }
            }
        }
    }
}

/// How many values the caller of a subroutine expects back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallShape {
    /// No return value wanted.
    Void,
    /// Exactly one value wanted.
    Single,
    /// A sequence of values wanted.
    Sequence,
}

impl fmt::Display for CallShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CallShape::Void => "void",
            CallShape::Single => "single",
            CallShape::Sequence => "sequence",
        };
        write!(f, "{}", s)
    }
}

/// What a callable handed back.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Nothing,
    Single(Value),
    Many(Vec<Value>),
}

impl Reply {
    /// Reshape the reply to what a caller of `shape` may observe.
    ///
    /// A sequence squeezed into a single value keeps its last element, the
    /// way a comma expression evaluates in scalar position.
    pub fn conform(self, shape: CallShape) -> Reply {
        match (shape, self) {
            (CallShape::Void, _) => Reply::Nothing,
            (CallShape::Single, Reply::Nothing) => Reply::Single(Value::Undef),
            (CallShape::Single, Reply::Many(mut values)) => {
                Reply::Single(values.pop().unwrap_or_default())
            }
            (CallShape::Single, single @ Reply::Single(_)) => single,
            (CallShape::Sequence, Reply::Nothing) => Reply::Many(Vec::new()),
            (CallShape::Sequence, Reply::Single(value)) => Reply::Many(vec![value]),
            (CallShape::Sequence, many @ Reply::Many(_)) => many,
        }
    }

    /// Flatten into an argument list, as handed to a `post` hook.
    pub fn values(&self) -> Vec<Value> {
        match self {
            Reply::Nothing => Vec::new(),
            Reply::Single(value) => vec![value.clone()],
            Reply::Many(values) => values.clone(),
        }
    }

    /// The single value of the reply, `Undef` if there is none.
    pub fn into_single(self) -> Value {
        match self.conform(CallShape::Single) {
            Reply::Single(value) => value,
            _ => Value::Undef,
        }
    }

    pub fn into_values(self) -> Vec<Value> {
        match self {
            Reply::Nothing => Vec::new(),
            Reply::Single(value) => vec![value],
            Reply::Many(values) => values,
        }
    }
}
