//! The interception engine: replaces bindings with `pre`/original/`post` wrappers.

use super::config::{Hook, PostPolicy, WrapConfig};
use crate::host::{CallShape, Reply, Runtime, Sub, Value};
use crate::Result;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Every subroutine ever intercepted, mapped to its captured original.
///
/// Entries are only ever added, and only once per name.
#[derive(Debug, Default)]
pub struct InterceptRegistry {
    originals: BTreeMap<String, Sub>,
}

impl InterceptRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `original` for `name` unless `name` is already known. Returns
    /// whether it was recorded.
    pub fn register_if_absent(&mut self, name: &str, original: Sub) -> bool {
        if self.originals.contains_key(name) {
            return false;
        }
        self.originals.insert(name.to_string(), original);
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.originals.contains_key(name)
    }

    pub fn original(&self, name: &str) -> Option<&Sub> {
        self.originals.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.originals.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.originals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.originals.is_empty()
    }
}

/// Result of one pass of the engine over a list of names.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EngineOutcome {
    pub wrapped: Vec<String>,
    pub already_wrapped: Vec<String>,
    pub missing: Vec<String>,
}

/// Wrap each of `names` not yet in `registry` with the hooks of `config`.
///
/// Names without a code binding are reported as missing and left unregistered
/// so a later request can still wrap them once they exist.
pub fn wrap_subs(
    rt: &mut Runtime,
    registry: &mut InterceptRegistry,
    names: &[String],
    config: &WrapConfig,
) -> Result<EngineOutcome> {
    let mut outcome = EngineOutcome::default();
    for name in names {
        if registry.contains(name) {
            outcome.already_wrapped.push(name.clone());
            continue;
        }
        let Some(original) = rt.lookup_sub(name) else {
            warn!(sub = %name, "No subroutine to wrap");
            outcome.missing.push(name.clone());
            continue;
        };
        registry.register_if_absent(name, original.clone());
        let wrapper = make_wrapper(
            name,
            original,
            config.pre.clone(),
            config.post.clone(),
            config.post_policy,
        );
        rt.define_sub(name, wrapper)?;
        debug!(sub = %name, "Wrapped subroutine");
        outcome.wrapped.push(name.clone());
    }
    Ok(outcome)
}

fn make_wrapper(
    name: &str,
    original: Sub,
    pre: Option<Hook>,
    post: Option<Hook>,
    policy: PostPolicy,
) -> Sub {
    let label = name.to_string();
    Sub::new(name, move |rt: &mut Runtime, shape: CallShape, args: Vec<Value>| {
        if let Some(pre) = &pre {
            pre(rt, shape, &label, &args)?;
        }
        let reply = match original.call(rt, shape, args) {
            Ok(reply) => reply.conform(shape),
            Err(e) => {
                if let (PostPolicy::Always, Some(post)) = (policy, &post) {
                    if let Err(post_err) = post(rt, shape, &label, &[]) {
                        warn!(sub = %label, error = %post_err, "post hook failed after original failure");
                    }
                }
                return Err(e);
            }
        };
        if let Some(post) = &post {
            post(rt, shape, &label, &reply.values())?;
        }
        Ok::<Reply, crate::Error>(reply)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<(String, CallShape, Vec<Value>)>>>;

    fn recording(
        log: &Log,
        tag: &'static str,
    ) -> impl Fn(&mut Runtime, CallShape, &str, &[Value]) -> Result<()> {
        let log = Rc::clone(log);
        move |_: &mut Runtime, shape: CallShape, name: &str, values: &[Value]| {
            log.borrow_mut()
                .push((format!("{}:{}", tag, name), shape, values.to_vec()));
            Ok(())
        }
    }

    #[test]
    fn registry_accepts_each_name_once() {
        let mut registry = InterceptRegistry::new();
        let first = Sub::new("A::a", |_, _, _| Ok(Reply::Nothing));
        let second = Sub::new("A::a", |_, _, _| Ok(Reply::Nothing));
        assert!(registry.register_if_absent("A::a", first.clone()));
        assert!(!registry.register_if_absent("A::a", second));
        assert!(registry.original("A::a").unwrap().same_body(&first));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn wrapper_sees_arguments_and_results() {
        let mut rt = Runtime::new();
        rt.define_fn("Calc::add", |_, _, args| {
            let total = args.iter().filter_map(Value::as_f64).sum::<f64>();
            Ok(Reply::Single(Value::Int(total as i64)))
        })
        .unwrap();

        let log: Log = Rc::default();
        let config = WrapConfig::new()
            .pre(recording(&log, "pre"))
            .post(recording(&log, "post"));
        let mut registry = InterceptRegistry::new();
        let outcome =
            wrap_subs(&mut rt, &mut registry, &["Calc::add".to_string()], &config).unwrap();
        assert_eq!(outcome.wrapped, vec!["Calc::add".to_string()]);

        let reply = rt
            .call("Calc::add", CallShape::Single, vec![Value::Int(2), Value::Int(3)])
            .unwrap();
        assert_eq!(reply, Reply::Single(Value::Int(5)));
        assert_eq!(
            *log.borrow(),
            vec![
                (
                    "pre:Calc::add".to_string(),
                    CallShape::Single,
                    vec![Value::Int(2), Value::Int(3)]
                ),
                ("post:Calc::add".to_string(), CallShape::Single, vec![Value::Int(5)]),
            ]
        );
    }

    #[test]
    fn missing_subs_are_not_registered() {
        let mut rt = Runtime::new();
        let mut registry = InterceptRegistry::new();
        let config = WrapConfig::new().pre(|_, _, _, _| Ok(()));
        let outcome =
            wrap_subs(&mut rt, &mut registry, &["Ghost::boo".to_string()], &config).unwrap();
        assert_eq!(outcome.missing, vec!["Ghost::boo".to_string()]);
        assert!(registry.is_empty());
    }

    #[test]
    fn failure_skips_post_by_default() {
        let mut rt = Runtime::new();
        rt.define_fn("Risky::go", |_, _, _| Err(Error::Died("boom".into())))
            .unwrap();
        let log: Log = Rc::default();
        let config = WrapConfig::new().post(recording(&log, "post"));
        let mut registry = InterceptRegistry::new();
        wrap_subs(&mut rt, &mut registry, &["Risky::go".to_string()], &config).unwrap();

        let err = rt.call("Risky::go", CallShape::Void, vec![]).unwrap_err();
        assert!(matches!(err, Error::Died(msg) if msg == "boom"));
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn failure_runs_post_when_policy_is_always() {
        let mut rt = Runtime::new();
        rt.define_fn("Risky::go", |_, _, _| Err(Error::Died("boom".into())))
            .unwrap();
        let log: Log = Rc::default();
        let config = WrapConfig::new()
            .pre(recording(&log, "pre"))
            .post(recording(&log, "post"))
            .post_policy(PostPolicy::Always);
        let mut registry = InterceptRegistry::new();
        wrap_subs(&mut rt, &mut registry, &["Risky::go".to_string()], &config).unwrap();

        let err = rt.call("Risky::go", CallShape::Single, vec![]).unwrap_err();
        assert!(matches!(err, Error::Died(msg) if msg == "boom"));
        let log = log.borrow();
        assert_eq!(log.len(), 2);
        assert_eq!(log[1], ("post:Risky::go".to_string(), CallShape::Single, vec![]));
    }

    #[test]
    fn failing_post_does_not_mask_original_failure() {
        let mut rt = Runtime::new();
        rt.define_fn("Risky::go", |_, _, _| Err(Error::Died("boom".into())))
            .unwrap();
        let config = WrapConfig::new()
            .post(|_, _, _, _| Err(Error::Died("post failed too".into())))
            .post_policy(PostPolicy::Always);
        let mut registry = InterceptRegistry::new();
        wrap_subs(&mut rt, &mut registry, &["Risky::go".to_string()], &config).unwrap();

        let err = rt.call("Risky::go", CallShape::Void, vec![]).unwrap_err();
        assert!(matches!(err, Error::Died(msg) if msg == "boom"));
    }

    #[test]
    fn failing_pre_stops_the_call() {
        let mut rt = Runtime::new();
        let called = Rc::new(RefCell::new(false));
        let flag = Rc::clone(&called);
        rt.define_fn("Guarded::go", move |_, _, _| {
            *flag.borrow_mut() = true;
            Ok(Reply::Nothing)
        })
        .unwrap();
        let config = WrapConfig::new().pre(|_, _, _, _| Err(Error::Died("denied".into())));
        let mut registry = InterceptRegistry::new();
        wrap_subs(&mut rt, &mut registry, &["Guarded::go".to_string()], &config).unwrap();

        assert!(rt.call("Guarded::go", CallShape::Void, vec![]).is_err());
        assert!(!*called.borrow());
    }
}
