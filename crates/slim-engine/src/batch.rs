//! Runs one decoded instruction list end to end and produces the reply.

use slim_core::wire;
use slim_core::wire::Value;

use crate::context::ExecutionContext;
use crate::converters::ConverterRegistry;
use crate::instruction::{self, Instruction, Outcome};
use crate::results::ResultsCollector;

/// Execute every instruction in `body` in order against `ctx`, folding each
/// outcome into a fresh [`ResultsCollector`], and return the packed reply
/// ready to send back over the wire. A single malformed or failing
/// instruction never aborts the rest of the batch.
pub fn run(body: &[Value], ctx: &mut ExecutionContext, converters: &ConverterRegistry) -> String {
    let mut collector = ResultsCollector::new();

    for tuple in body {
        match Instruction::parse(tuple) {
            Ok(instr) => {
                let id = instr.id().to_string();
                tracing::debug!(id, "executing instruction");
                match instruction::execute(&instr, ctx, converters) {
                    Outcome::Ok => collector.completed_ok(&id),
                    Outcome::Value(crate::converters::FixtureValue::Void) => {
                        collector.completed_void(&id)
                    }
                    Outcome::Value(value) => collector.completed(&id, &value, converters),
                    Outcome::Exception(err) => {
                        tracing::debug!(id, tag = err.tag(), %err, "instruction raised");
                        collector.raised(&id, &err)
                    }
                }
            }
            Err((id, err)) => {
                tracing::debug!(?id, %err, "malformed instruction");
                match id {
                    Some(id) => collector.raised(&id, &err),
                    None => collector.raised("", &err),
                }
            }
        }
    }

    wire::encode(&collector.snapshot())
}
