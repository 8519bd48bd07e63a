//! Results collector: accumulates per-instruction outcomes for one batch.

use slim_core::wire::Value;

use crate::converters::{ConverterRegistry, FixtureValue};
use crate::error::EngineError;

pub struct ResultsCollector {
    entries: Vec<Value>,
}

impl ResultsCollector {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// A list-valued return packs as a genuine nested chunk, not a single
    /// joined string — `to_wire_list` converts element-wise and recursively.
    pub fn completed(&mut self, id: &str, value: &FixtureValue, converters: &ConverterRegistry) {
        let wire = converters.to_wire_list(value);
        self.entries.push(Value::List(vec![Value::scalar(id.to_string()), wire]));
    }

    /// `import`'s only outcome: the bare `OK` literal, no computed value.
    pub fn completed_ok(&mut self, id: &str) {
        self.entries.push(Value::List(vec![
            Value::scalar(id.to_string()),
            Value::scalar("OK"),
        ]));
    }

    pub fn completed_void(&mut self, id: &str) {
        self.entries.push(Value::List(vec![
            Value::scalar(id.to_string()),
            Value::scalar("/__VOID__/"),
        ]));
    }

    pub fn raised(&mut self, id: &str, error: &EngineError) {
        self.entries.push(Value::List(vec![
            Value::scalar(id.to_string()),
            Value::scalar(error.to_wire()),
        ]));
    }

    /// A stable snapshot of everything collected so far; the caller owns
    /// encoding it onto the wire. Collecting further after a snapshot does
    /// not retroactively change it.
    pub fn snapshot(&self) -> Vec<Value> {
        self.entries.clone()
    }
}

impl Default for ResultsCollector {
    fn default() -> Self {
        Self::new()
    }
}
