//! Dynamic subroutine interception for an embeddable namespace runtime.
//!
//! A [`host::Runtime`] keeps subroutines in mutable namespaces and loads
//! modules through a hook chain. [`wrap::Interceptor`] replaces selected
//! subroutines with wrappers that run caller-supplied `pre` and `post` hooks
//! around the original, including in namespaces that are only loaded later.
//!
//! ```no_run
//! use subwrap::host::{CallShape, Runtime};
//! use subwrap::wrap::{Interceptor, WrapConfig};
//!
//! # fn main() -> subwrap::Result<()> {
//! let mut rt = Runtime::new();
//! rt.add_search_path("lib");
//! let config = WrapConfig::new()
//!     .packages(["Orchard::*"])
//!     .pre(|_, shape, name, args| {
//!         println!("{name} called in {shape} context with {} args", args.len());
//!         Ok(())
//!     });
//! Interceptor::new().wrap_packages(&mut rt, config)?;
//! rt.require("Orchard::Tree")?;
//! rt.call("Orchard::Tree::grow", CallShape::Void, vec![])?;
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod error;
pub mod host;
pub mod wrap;

pub use error::{Error, Result};
