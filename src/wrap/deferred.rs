//! Deferred interception of namespaces that are not loaded yet.
//!
//! [`DeferredWrap`] sits at the front of the loader hook chain. When a load
//! targets a matching namespace it finds the real source itself, with its own
//! entry taken out of the chain so the lookup cannot re-enter it, and queues
//! a post-initialisation action on that source. The action re-runs the wrap
//! request narrowed to the namespace, right after the module's own top-level
//! code (including anything it imports) has run and before `require` returns.

use super::config::WrapConfig;
use super::pattern::PackageTargets;
use super::Interceptor;
use crate::host::{HookId, LoadRequest, LoaderHook, ModuleSource, Runtime};
use crate::{Error, Result};
use std::cell::Cell;
use std::rc::Rc;
use tracing::{debug, info};

pub struct DeferredWrap {
    targets: PackageTargets,
    config: WrapConfig,
    interceptor: Interceptor,
    id: Cell<Option<HookId>>,
}

impl DeferredWrap {
    /// Insert a handler for `targets` at the front of the runtime's loader chain.
    pub fn install(
        rt: &mut Runtime,
        targets: PackageTargets,
        config: WrapConfig,
        interceptor: Interceptor,
    ) -> HookId {
        let hook = Rc::new(Self {
            targets,
            config,
            interceptor,
            id: Cell::new(None),
        });
        let id = rt.prepend_hook(Rc::clone(&hook) as Rc<dyn LoaderHook>);
        hook.id.set(Some(id));
        info!(
            families = ?hook.targets.families,
            literals = ?hook.targets.literals,
            "Installed deferred wrap handler"
        );
        id
    }
}

impl LoaderHook for DeferredWrap {
    fn name(&self) -> &str {
        "subwrap-deferred"
    }

    fn load(&self, rt: &mut Runtime, request: &LoadRequest) -> Result<Option<ModuleSource>> {
        let Some(namespace) = request.namespace() else {
            return Ok(None);
        };
        if !self.targets.matches(&namespace) {
            return Ok(None);
        }
        let Some(id) = self.id.get() else {
            return Ok(None);
        };

        debug!(namespace = %namespace, "Deferring wrap until module initialised");
        let source = rt
            .with_hook_suspended(id, |rt| rt.locate_source(request))?
            .ok_or_else(|| Error::Load {
                module: request.module_path.clone(),
                searched: rt.loader().search_paths().to_vec(),
            })?;

        let config = self.config.narrowed_to(&namespace);
        let interceptor = self.interceptor.clone();
        Ok(Some(source.after_init(Box::new(move |rt: &mut Runtime| {
            interceptor.wrap_packages(rt, config).map(|_| ())
        }))))
    }
}
