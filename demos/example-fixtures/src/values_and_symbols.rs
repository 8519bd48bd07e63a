//! Demo fixture exercising symbol assignment and integer conversion.
//!
//! Grounded on `waferslim.examples.values_and_symbols.SomeDecisionTable`:
//! a fixture with one typed setter and one getter, meant to be driven by a
//! `callAndAssign` followed by a `call` that reads the stored value back
//! through `$symbol` substitution.

use std::cell::Cell;

use slim_fixture::slim_engine::{FixtureClass, FixtureInstance, FixtureValue};

pub struct SomeDecisionTable {
    pub(crate) input: Cell<i64>,
}

slim_fixture::fixture! {
    class SomeDecisionTable;
    construct(_args) {
        Ok(std::sync::Arc::new(SomeDecisionTable { input: Cell::new(0) }))
    }
    methods {
        "setInput"(["int"]) => |me: &SomeDecisionTable, args: &[FixtureValue]| {
            let FixtureValue::Int(n) = &args[0] else {
                return Err("setInput expects an integer".into());
            };
            me.input.set(*n);
            Ok(FixtureValue::Void)
        },
        "output"([]) => |me: &SomeDecisionTable, _args: &[FixtureValue]| {
            let n = me.input.get();
            let doubled = if n % 2 == 0 { n * 2 } else { n + 1 };
            Ok(FixtureValue::Int(doubled))
        },
    }
}
