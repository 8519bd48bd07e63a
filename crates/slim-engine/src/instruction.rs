//! Instruction parsing and execution.
//!
//! An instruction batch is a top-level wire list of instruction tuples; each
//! tuple is itself a list whose first element is an opaque id echoed back in
//! the result, second is the instruction kind tag, and the rest are
//! kind-specific operands. A malformed tuple fails only that instruction —
//! the batch still runs to completion.

use slim_core::wire::Value;

use crate::context::ExecutionContext;
use crate::converters::{ConverterRegistry, FixtureValue};
use crate::error::EngineError;

#[derive(Debug, Clone)]
pub enum Instruction {
    Import {
        id: String,
        path: String,
    },
    Make {
        id: String,
        instance_id: String,
        class_name: String,
        args: Vec<String>,
    },
    Call {
        id: String,
        instance_id: String,
        method: String,
        args: Vec<String>,
    },
    CallAndAssign {
        id: String,
        symbol: String,
        instance_id: String,
        method: String,
        args: Vec<String>,
    },
}

impl Instruction {
    pub fn id(&self) -> &str {
        match self {
            Instruction::Import { id, .. }
            | Instruction::Make { id, .. }
            | Instruction::Call { id, .. }
            | Instruction::CallAndAssign { id, .. } => id,
        }
    }

    /// Parse one instruction tuple. The only failure this can report is
    /// `MALFORMED_INSTRUCTION` — anything about resolving a class or method
    /// is deferred to `execute`.
    pub fn parse(tuple: &Value) -> Result<Instruction, (Option<String>, EngineError)> {
        let items = tuple
            .as_list()
            .ok_or_else(|| (None, EngineError::Malformed("instruction is not a list".into())))?;

        let id = scalar_at(items, 0).ok_or_else(|| {
            (None, EngineError::Malformed("instruction missing id".into()))
        })?;
        let kind = scalar_at(items, 1).ok_or_else(|| {
            (
                Some(id.to_string()),
                EngineError::Malformed("instruction missing kind".into()),
            )
        })?;

        let fail = |msg: &str| (Some(id.to_string()), EngineError::Malformed(msg.into()));

        match kind {
            "import" => {
                let path = scalar_at(items, 2).ok_or_else(|| fail("import missing path"))?;
                Ok(Instruction::Import {
                    id: id.to_string(),
                    path: path.to_string(),
                })
            }
            "make" => {
                let instance_id =
                    scalar_at(items, 2).ok_or_else(|| fail("make missing instance id"))?;
                let class_name =
                    scalar_at(items, 3).ok_or_else(|| fail("make missing class name"))?;
                let args = scalars_from(items, 4);
                Ok(Instruction::Make {
                    id: id.to_string(),
                    instance_id: instance_id.to_string(),
                    class_name: class_name.to_string(),
                    args,
                })
            }
            "call" => {
                let instance_id =
                    scalar_at(items, 2).ok_or_else(|| fail("call missing instance id"))?;
                let method = scalar_at(items, 3).ok_or_else(|| fail("call missing method"))?;
                let args = scalars_from(items, 4);
                Ok(Instruction::Call {
                    id: id.to_string(),
                    instance_id: instance_id.to_string(),
                    method: method.to_string(),
                    args,
                })
            }
            "callAndAssign" => {
                let symbol =
                    scalar_at(items, 2).ok_or_else(|| fail("callAndAssign missing symbol"))?;
                let instance_id = scalar_at(items, 3)
                    .ok_or_else(|| fail("callAndAssign missing instance id"))?;
                let method =
                    scalar_at(items, 4).ok_or_else(|| fail("callAndAssign missing method"))?;
                let args = scalars_from(items, 5);
                Ok(Instruction::CallAndAssign {
                    id: id.to_string(),
                    symbol: symbol.to_string(),
                    instance_id: instance_id.to_string(),
                    method: method.to_string(),
                    args,
                })
            }
            other => Err((
                Some(id.to_string()),
                EngineError::Malformed(format!("unknown instruction kind {:?}", other)),
            )),
        }
    }
}

fn scalar_at(items: &[Value], i: usize) -> Option<&str> {
    items.get(i).and_then(|v| v.as_scalar())
}

fn scalars_from(items: &[Value], start: usize) -> Vec<String> {
    items
        .iter()
        .skip(start)
        .map(|v| v.as_scalar().unwrap_or_default().to_string())
        .collect()
}

/// Outcome of a single instruction: the engine never raises past this
/// boundary, it only ever returns an outcome to be folded into the result
/// list by the caller.
pub enum Outcome {
    /// The `OK` literal with no computed value — `import`'s only outcome.
    Ok,
    Value(FixtureValue),
    Exception(EngineError),
}

pub fn execute(
    instruction: &Instruction,
    ctx: &mut ExecutionContext,
    converters: &ConverterRegistry,
) -> Outcome {
    match instruction {
        Instruction::Import { path, .. } => {
            ctx.add_import(path.clone());
            Outcome::Ok
        }
        Instruction::Make {
            instance_id,
            class_name,
            args,
            ..
        } => {
            let substituted: Vec<String> = args.iter().map(|a| ctx.substitute(a)).collect();
            match ctx.resolve_class(class_name) {
                None => Outcome::Exception(EngineError::NoClass(class_name.clone())),
                Some(class) => match class.construct(&substituted) {
                    Ok(instance) => match ctx.store_instance(instance_id.clone(), instance) {
                        Ok(()) => Outcome::Value(FixtureValue::Str("OK".to_string())),
                        Err(name) => Outcome::Exception(EngineError::InstanceAlreadyBound(name)),
                    },
                    Err(msg) => Outcome::Exception(EngineError::ConstructorFailed(msg)),
                },
            }
        }
        Instruction::Call {
            instance_id,
            method,
            args,
            ..
        } => invoke(ctx, converters, instance_id, method, args),
        Instruction::CallAndAssign {
            symbol,
            instance_id,
            method,
            args,
            ..
        } => {
            let outcome = invoke(ctx, converters, instance_id, method, args);
            if let Outcome::Value(ref value) = outcome {
                ctx.set_symbol(symbol.clone(), converters.convert_value(value));
            }
            outcome
        }
    }
}

fn invoke(
    ctx: &ExecutionContext,
    converters: &ConverterRegistry,
    instance_id: &str,
    method: &str,
    args: &[String],
) -> Outcome {
    let instance = match ctx.get_instance(instance_id) {
        Some(instance) => instance,
        None => return Outcome::Exception(EngineError::NoInstance(instance_id.to_string())),
    };

    let arity = match instance.method_arity(method) {
        Some(n) => n,
        None => {
            return Outcome::Exception(EngineError::NoMethod {
                class: instance_id.to_string(),
                method: method.to_string(),
            })
        }
    };
    if arity != args.len() {
        return Outcome::Exception(EngineError::NoMethod {
            class: instance_id.to_string(),
            method: method.to_string(),
        });
    }

    let substituted: Vec<String> = args.iter().map(|a| ctx.substitute(a)).collect();

    match instance.invoke(method, &substituted, converters) {
        Ok(value) => Outcome::Value(value),
        Err(msg) => Outcome::Exception(EngineError::MethodFailed(msg)),
    }
}
