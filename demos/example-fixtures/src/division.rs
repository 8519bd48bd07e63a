//! Classic division decision-table fixture, the kind every SLIM tutorial
//! leads with: two float setters and a computed getter, here used to
//! exercise the float converter and a `COULD_NOT_INVOKE_CONSTRUCTOR` path
//! when a fixture chooses to reject its constructor arguments.

use std::cell::Cell;

use slim_fixture::slim_engine::{FixtureClass, FixtureInstance, FixtureValue};

pub struct Division {
    pub(crate) numerator: Cell<f64>,
    pub(crate) denominator: Cell<f64>,
}

slim_fixture::fixture! {
    class Division;
    construct(args) {
        if !args.is_empty() {
            return Err(format!("Division takes no constructor arguments, got {}", args.len()));
        }
        Ok(std::sync::Arc::new(Division {
            numerator: Cell::new(0.0),
            denominator: Cell::new(1.0),
        }))
    }
    methods {
        "setNumerator"(["float"]) => |me: &Division, args: &[FixtureValue]| {
            let FixtureValue::Float(f) = &args[0] else {
                return Err("setNumerator expects a float".into());
            };
            me.numerator.set(*f);
            Ok(FixtureValue::Void)
        },
        "setDenominator"(["float"]) => |me: &Division, args: &[FixtureValue]| {
            let FixtureValue::Float(f) = &args[0] else {
                return Err("setDenominator expects a float".into());
            };
            me.denominator.set(*f);
            Ok(FixtureValue::Void)
        },
        "quotient"([]) => |me: &Division, _args: &[FixtureValue]| {
            let denominator = me.denominator.get();
            if denominator == 0.0 {
                return Err("division by zero".into());
            }
            Ok(FixtureValue::Float(me.numerator.get() / denominator))
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn computes_quotient_from_set_values() {
        let d = Division { numerator: Cell::new(0.0), denominator: Cell::new(1.0) };
        let converters = slim_fixture::slim_engine::ConverterRegistry::new();
        d.invoke("setNumerator", &["10".to_string()], &converters).unwrap();
        d.invoke("setDenominator", &["4".to_string()], &converters).unwrap();
        assert_eq!(
            d.invoke("quotient", &[], &converters).unwrap(),
            FixtureValue::Float(2.5)
        );
    }

    #[test]
    fn rejects_constructor_arguments() {
        let d = Division { numerator: Cell::new(0.0), denominator: Cell::new(1.0) };
        assert!(d.construct(&["unexpected".to_string()]).is_err());
    }

    #[test]
    fn zero_denominator_raises_method_error() {
        let d = Division { numerator: Cell::new(1.0), denominator: Cell::new(0.0) };
        let converters = slim_fixture::slim_engine::ConverterRegistry::new();
        assert!(d.invoke("quotient", &[], &converters).is_err());
    }
}
