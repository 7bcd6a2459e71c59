use crate::cli::{CallArgs, ListArgs, Verbosity};
use crate::host::namespace::split_qualified;
use crate::host::{CallShape, Reply, Runtime, Value};
use crate::wrap::{list_callables, Interceptor, PostPolicy, WrapOptions};
use anyhow::{anyhow, bail, Context, Result};
use colored::Colorize;
use std::path::PathBuf;
use tracing::info;

fn runtime(lib: &[PathBuf]) -> Runtime {
    let mut rt = Runtime::new();
    for dir in lib {
        rt.add_search_path(dir.clone());
    }
    rt
}

/// Execute the list command.
pub fn list(lib: &[PathBuf], args: ListArgs, _verbosity: Verbosity) -> Result<()> {
    let mut rt = runtime(lib);
    rt.require(&args.namespace)
        .with_context(|| format!("Failed to load {}", args.namespace))?;

    for name in list_callables(&rt, &args.namespace) {
        println!("{}", name);
    }
    let parents = rt.parents(&args.namespace);
    if !parents.is_empty() {
        eprintln!("{} {}", "parents:".dimmed(), parents.join(", "));
    }
    Ok(())
}

/// Execute the call command.
pub fn call(lib: &[PathBuf], args: CallArgs, verbosity: Verbosity) -> Result<()> {
    let (namespace, member) = split_qualified(&args.target)
        .ok_or_else(|| anyhow!("'{}' is not a fully qualified name", args.target))?;
    let shape = CallShape::from(args.shape);
    let call_args = parse_call_args(args.args.as_deref())?;

    let mut options = match &args.options {
        Some(path) => WrapOptions::from_path(path)
            .with_context(|| format!("Failed to read wrap options from {:?}", path))?,
        None => WrapOptions::default(),
    };
    options.packages.extend(args.packages.iter().cloned());
    options.subs.extend(args.subs.iter().cloned());
    options.wrap_inherited |= args.inherited;
    if args.always_post {
        options.post_policy = PostPolicy::Always;
    }
    if options.packages.is_empty() && options.subs.is_empty() {
        options.packages.push(namespace.to_string());
    }

    let show = verbosity != Verbosity::Quiet;
    let config = options
        .into_config()
        .pre(move |_, shape, name, values| {
            if show {
                eprintln!("{} {}({}) [{}]", "->".cyan(), name, join(values), shape);
            }
            Ok(())
        })
        .post(move |_, shape, name, values| {
            if show {
                eprintln!("{} {} = ({}) [{}]", "<-".green(), name, join(values), shape);
            }
            Ok(())
        });

    let mut rt = runtime(lib);
    let report = Interceptor::new().wrap_packages(&mut rt, config)?;
    info!(
        wrapped = report.wrapped.len(),
        deferred = report.deferred.is_some(),
        "Wrap configuration applied"
    );

    rt.require(namespace)
        .with_context(|| format!("Failed to load {}", namespace))?;

    let reply = if args.method {
        rt.call_method(Value::str(namespace), member, shape, call_args)
    } else {
        rt.call(&args.target, shape, call_args)
    }
    .with_context(|| format!("Call to {} failed", args.target))?;

    println!("{}", serde_json::to_string(&reply_json(reply))?);
    Ok(())
}

fn parse_call_args(raw: Option<&str>) -> Result<Vec<Value>> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };
    match serde_json::from_str::<serde_json::Value>(raw).context("Invalid JSON in --args")? {
        serde_json::Value::Array(items) => Ok(items.into_iter().map(Value::from).collect()),
        other => bail!("--args must be a JSON array, got {}", other),
    }
}

fn reply_json(reply: Reply) -> Value {
    match reply {
        Reply::Nothing => Value::Undef,
        Reply::Single(value) => value,
        Reply::Many(values) => Value::List(values),
    }
}

fn join(values: &[Value]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
