//! Concrete fixture support: the class registry and the `fixture!` macro
//! fixtures use to register themselves, built on top of `slim-engine`'s
//! `FixtureClass`/`FixtureInstance` traits.

pub mod macros;
pub mod registry;

pub use macros::convert_args;
pub use registry::FixtureRegistry;

/// Re-exported so the `fixture!` macro can refer to these types by a path
/// that stays stable regardless of what the caller itself imports.
pub use slim_engine;
