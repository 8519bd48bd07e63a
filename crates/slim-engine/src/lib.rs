//! Instruction engine: converters, execution context, and instruction
//! dispatch sitting on top of `slim-core`'s wire codec.
//!
//! `slim-fixture` and `slimd` are the only expected consumers: fixtures
//! implement the traits in [`fixture`], `slimd` drives [`batch::run`] once
//! per decoded message.

pub mod batch;
pub mod context;
pub mod converters;
pub mod error;
pub mod fixture;
pub mod instruction;
pub mod results;

pub use converters::{ConverterRegistry, FixtureValue};
pub use error::EngineError;
pub use fixture::{ClassResolver, FixtureClass, FixtureInstance};
