//! The `fixture!` registration shim.
//!
//! Reflective dispatch — scanning a classpath, inspecting method arity at
//! runtime — has nothing to grab onto in a statically-typed, compiled
//! target. This macro is the replacement: it generates the
//! [`slim_engine::FixtureClass`] and [`slim_engine::FixtureInstance`] impls
//! for a struct from a declarative method table, so the only thing a
//! fixture author writes is the constructor and each method's body.

use slim_engine::{ConverterRegistry, FixtureValue};

/// Convert each raw wire argument according to its declared type tag, in
/// order. Used by the code [`fixture!`] generates; not meant to be called
/// directly by fixture authors.
pub fn convert_args(
    tags: &[&str],
    args: &[String],
    converters: &ConverterRegistry,
) -> Result<Vec<FixtureValue>, String> {
    if tags.len() != args.len() {
        return Err(format!(
            "expected {} argument(s), got {}",
            tags.len(),
            args.len()
        ));
    }
    tags.iter()
        .zip(args.iter())
        .map(|(tag, raw)| converters.convert_arg(tag, raw))
        .collect()
}

#[doc(hidden)]
#[macro_export]
macro_rules! __count_args {
    () => { 0usize };
    ($head:literal $(, $tail:literal)* $(,)?) => {
        1usize + $crate::__count_args!($($tail),*)
    };
}

/// Declare a fixture class: its constructor and a table of callable
/// methods, each with the wire type tags its arguments convert through.
///
/// ```ignore
/// fixture! {
///     class Adder;
///     construct(_args) { Ok(std::sync::Arc::new(Adder { total: 0 })) }
///     methods {
///         "add"(["int"]) => |_self: &Adder, args: &[FixtureValue]| {
///             Ok(args[0].clone())
///         },
///     }
/// }
/// ```
#[macro_export]
macro_rules! fixture {
    (
        class $class:ident;
        construct($ctor_args:ident) $ctor:block
        methods {
            $( $name:literal ( [ $($argty:literal),* $(,)? ] ) => $body:expr ),* $(,)?
        }
    ) => {
        impl $crate::slim_engine::FixtureClass for $class {
            fn construct(
                &self,
                $ctor_args: &[String],
            ) -> ::std::result::Result<::std::sync::Arc<dyn $crate::slim_engine::FixtureInstance>, String> {
                $ctor
            }
        }

        impl $crate::slim_engine::FixtureInstance for $class {
            fn method_arity(&self, method: &str) -> ::std::option::Option<usize> {
                match method {
                    $( $name => ::std::option::Option::Some($crate::__count_args!($($argty),*)), )*
                    _ => ::std::option::Option::None,
                }
            }

            fn invoke(
                &self,
                method: &str,
                args: &[String],
                converters: &$crate::slim_engine::ConverterRegistry,
            ) -> ::std::result::Result<$crate::slim_engine::FixtureValue, String> {
                match method {
                    $(
                        $name => {
                            let tags: &[&str] = &[$($argty),*];
                            let typed = $crate::convert_args(tags, args, converters)?;
                            let body: fn(&$class, &[$crate::slim_engine::FixtureValue]) -> ::std::result::Result<$crate::slim_engine::FixtureValue, String> = $body;
                            body(self, &typed)
                        }
                    )*
                    other => ::std::result::Result::Err(format!("no method named {other}")),
                }
            }
        }
    };
}
