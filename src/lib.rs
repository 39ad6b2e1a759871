//! Declarative combinatorial configuration expansion.
//!
//! A [`Template`] describes a space of configurations using choice points
//! ([`alt`]), positional sequences, and objects whose fields may be inherited
//! through an override chain, computed from their siblings, or gated by the
//! reserved `is` predicate. [`expand`] enumerates every concrete
//! configuration the template describes.
//!
//! ```rust
//! use cartesian::{Template, alt, expand};
//!
//! let matrix = Template::object()
//!     .field("os", alt(["linux", "windows"]))
//!     .field("arch", alt(["x86-64", "arm"]))
//!     .is(|c| Ok(!(c.str("os")? == "windows" && c.str("arch")? == "arm")))
//!     .build();
//!
//! assert_eq!(expand(&matrix).unwrap().len(), 3);
//! ```

mod engine;
mod error;
mod template;
mod value;

// Public exports.
pub use engine::{expand, resolve_field, visible_fields};
pub use error::{DeriveError, ExpandError, ExpandResult};
pub use template::{Derived, FieldSpec, IS, ObjectBuilder, ObjectTemplate, Template, alt};
pub use value::{Record, Value};

#[cfg(feature = "tracing")]
#[allow(unused_imports, reason = "not every level is used")]
pub(crate) use tracing::{debug, trace};

/// Forwards to tracing::trace when the tracing feature is enabled
#[cfg(not(feature = "tracing"))]
macro_rules! trace {
    ($($tt:tt)*) => {};
}

/// Forwards to tracing::debug when the tracing feature is enabled
#[cfg(not(feature = "tracing"))]
macro_rules! debug {
    ($($tt:tt)*) => {};
}

#[cfg(not(feature = "tracing"))]
pub(crate) use {debug, trace};
