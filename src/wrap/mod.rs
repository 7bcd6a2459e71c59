//! Subroutine interception over a [`Runtime`].
//!
//! Sub-modules:
//! - [`config`]    : [`WrapConfig`], hook types, declarative [`WrapOptions`].
//! - [`pattern`]   : Literal namespaces and `Prefix::*` families.
//! - [`introspect`]: Callable members of a namespace.
//! - [`resolver`]  : Target expansion against loaded namespaces.
//! - [`inherit`]   : Forwarders for inherited methods.
//! - [`engine`]    : The wrapper and the intercepted-subroutine registry.
//! - [`deferred`]  : Loader hook wrapping namespaces as they get loaded.
//!
//! # Limitations
//!
//! A wrapped subroutine runs one call level deeper than its caller, inside the
//! wrapper. Anything that inspects "who called me" sees the wrapper, not the
//! real caller. This is accepted and not worked around.

pub mod config;
pub mod deferred;
pub mod engine;
pub mod inherit;
pub mod introspect;
pub mod pattern;
pub mod resolver;

pub use config::{Hook, PostPolicy, WrapConfig, WrapOptions};
pub use deferred::DeferredWrap;
pub use engine::{EngineOutcome, InterceptRegistry};
pub use introspect::list_callables;
pub use pattern::{PackagePattern, PackageTargets};

use crate::host::{HookId, Runtime, Sub};
use crate::Result;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::info;

/// Summary of one [`Interceptor::wrap_packages`] invocation.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WrapReport {
    /// Loaded namespaces the request resolved to.
    pub namespaces: Vec<String>,
    /// Forwarders synthesized for inherited methods.
    pub forwarders: Vec<String>,
    /// Subroutines wrapped by this invocation.
    pub wrapped: Vec<String>,
    /// Targets that were intercepted earlier and left as they were.
    pub already_wrapped: Vec<String>,
    /// Explicit targets with no subroutine behind them.
    pub missing: Vec<String>,
    /// Loader hook installed for namespaces still to be loaded.
    pub deferred: Option<HookId>,
}

/// Entry point for wrapping; owns the registry of intercepted subroutines.
///
/// Clones share the registry, so a name is wrapped at most once no matter
/// which clone or how many requests ask for it.
#[derive(Clone, Default)]
pub struct Interceptor {
    registry: Rc<RefCell<InterceptRegistry>>,
}

impl Interceptor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap every subroutine selected by `config`.
    ///
    /// Loaded namespaces are handled now. For namespaces that may still be
    /// loaded later a [`DeferredWrap`] handler is put at the front of the
    /// loader chain; it stays there for the lifetime of the runtime.
    #[tracing::instrument(skip_all, fields(packages = ?config.packages, subs = config.subs.len()))]
    pub fn wrap_packages(&self, rt: &mut Runtime, config: WrapConfig) -> Result<WrapReport> {
        let targets = PackageTargets::parse(&config.packages)?;
        let mut report = WrapReport {
            namespaces: resolver::loaded_matches(rt, &targets),
            ..WrapReport::default()
        };

        let pending = resolver::pending(rt, &targets);
        if !pending.is_empty() {
            report.deferred = Some(DeferredWrap::install(
                rt,
                pending,
                config.clone(),
                self.clone(),
            ));
        }

        if config.wrap_inherited {
            for namespace in &report.namespaces {
                report.forwarders.extend(inherit::expand(rt, namespace)?);
            }
        }

        if !config.has_hooks() {
            info!("Neither pre nor post given; nothing to install");
            return Ok(report);
        }

        let names = resolver::target_subs(rt, &report.namespaces, &config.subs);
        let outcome = {
            let mut registry = self.registry.borrow_mut();
            engine::wrap_subs(rt, &mut registry, &names, &config)?
        };
        info!(
            wrapped = outcome.wrapped.len(),
            already_wrapped = outcome.already_wrapped.len(),
            "Wrap request complete"
        );
        report.wrapped = outcome.wrapped;
        report.already_wrapped = outcome.already_wrapped;
        report.missing = outcome.missing;
        Ok(report)
    }

    pub fn is_wrapped(&self, name: &str) -> bool {
        self.registry.borrow().contains(name)
    }

    /// The implementation captured when `name` was wrapped.
    pub fn original(&self, name: &str) -> Option<Sub> {
        self.registry.borrow().original(name).cloned()
    }

    pub fn wrapped_names(&self) -> Vec<String> {
        self.registry.borrow().names().map(str::to_string).collect()
    }
}
