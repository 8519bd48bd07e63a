//! Collaborator interfaces between the engine and fixture implementations.
//!
//! The engine never knows what a fixture class *is* — no reflection, no
//! runtime class loading. It only knows these three traits. `slim-fixture`
//! supplies the concrete registry and a registration macro that produces
//! objects satisfying them; this crate just declares the seam.

use std::sync::Arc;

use crate::converters::{ConverterRegistry, FixtureValue};

/// A constructible fixture class, resolved by dotted-import-path + class
/// name. Constructors receive raw strings — there is no typed conversion
/// step for constructor arguments, matching the Make instruction's
/// contract.
pub trait FixtureClass: Send + Sync {
    fn construct(&self, args: &[String]) -> Result<Arc<dyn FixtureInstance>, String>;
}

/// A live fixture instance capable of dispatching a method call by name.
pub trait FixtureInstance: Send + Sync {
    /// Declared arity for `method`, if the instance exposes it at all.
    /// The engine uses this to validate argument counts before invoking.
    fn method_arity(&self, method: &str) -> Option<usize>;

    /// Invoke `method` with raw wire-argument strings. Implementations
    /// (generated by `slim_fixture::fixture!`) convert each argument using
    /// `converters` before calling the underlying typed method.
    fn invoke(
        &self,
        method: &str,
        args: &[String],
        converters: &ConverterRegistry,
    ) -> Result<FixtureValue, String>;
}

/// Resolves a class name against the import paths accumulated so far.
/// `slim-fixture::FixtureRegistry` is the only implementation shipped in
/// this repository, but the engine depends only on this trait.
pub trait ClassResolver: Send + Sync {
    fn resolve(&self, imports: &[String], class_name: &str) -> Option<Arc<dyn FixtureClass>>;
}
