//! Example fixtures preloaded by `slimd` so a fresh checkout has something
//! to point FitNesse at without writing a fixture first.

mod division;
mod values_and_symbols;

use std::cell::Cell;
use std::sync::Arc;

use slim_fixture::FixtureRegistry;

pub use division::Division;
pub use values_and_symbols::SomeDecisionTable;

/// Register every demo fixture under its bare class name.
///
/// The registered value is the *class* object: its `construct` builds a
/// fresh instance from scratch and ignores its own fields, so any value of
/// the right type serves as the registry entry.
pub fn register_all(registry: &mut FixtureRegistry) {
    registry.register(
        "SomeDecisionTable",
        Arc::new(SomeDecisionTable { input: Cell::new(0) })
            as Arc<dyn slim_fixture::slim_engine::FixtureClass>,
    );
    registry.register(
        "Division",
        Arc::new(Division {
            numerator: Cell::new(0.0),
            denominator: Cell::new(1.0),
        }) as Arc<dyn slim_fixture::slim_engine::FixtureClass>,
    );
}
