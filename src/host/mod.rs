//! Embeddable dynamic runtime that the interception layer operates on.
//!
//! Sub-modules:
//! - [`runtime`]  : Symbol table, dispatch, and `require`.
//! - [`namespace`]: Namespaces, bindings, and callable [`Sub`]s.
//! - [`loader`]   : Loader hook chain, search paths, end-of-code splitting.
//! - [`source`]   : Module evaluation and the built-in declaration format.
//! - [`value`]    : Dynamic values and the [`CallShape`] convention.

pub mod loader;
pub mod namespace;
pub mod runtime;
pub mod source;
pub mod value;

pub use loader::{HookId, LoadRequest, LoaderHook, MemoryModules, ModuleSource};
pub use namespace::{Binding, Namespace, Sub};
pub use runtime::Runtime;
pub use source::{ModuleEvaluator, SourceEvaluator};
pub use value::{CallShape, Reply, Value};
