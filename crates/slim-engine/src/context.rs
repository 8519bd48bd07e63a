//! Execution context: imports, live instances, and the symbol table.
//!
//! One context per session/connection — nothing here is shared across
//! lanes. Built fresh when a session starts and dropped when it ends.

use std::collections::HashMap;
use std::sync::Arc;

use crate::fixture::{ClassResolver, FixtureClass, FixtureInstance};

pub struct ExecutionContext {
    resolver: Arc<dyn ClassResolver>,
    /// Import paths, most-recently-added first: resolution tries each in
    /// turn and the newest import wins on a name collision.
    imports: Vec<String>,
    instances: HashMap<String, Arc<dyn FixtureInstance>>,
    symbols: HashMap<String, String>,
}

impl ExecutionContext {
    pub fn new(resolver: Arc<dyn ClassResolver>) -> Self {
        Self {
            resolver,
            imports: Vec::new(),
            instances: HashMap::new(),
            symbols: HashMap::new(),
        }
    }

    pub fn add_import(&mut self, path: String) {
        self.imports.retain(|p| p != &path);
        self.imports.insert(0, path);
    }

    pub fn resolve_class(&self, class_name: &str) -> Option<Arc<dyn FixtureClass>> {
        self.resolver.resolve(&self.imports, class_name)
    }

    /// Binds `id` to `instance`. Fails if `id` already names a live
    /// instance — a second `make` under a reused name never replaces the
    /// first (spec.md §3 invariant: "No instance is ever replaced").
    pub fn store_instance(
        &mut self,
        id: String,
        instance: Arc<dyn FixtureInstance>,
    ) -> Result<(), String> {
        if self.instances.contains_key(&id) {
            return Err(id);
        }
        self.instances.insert(id, instance);
        Ok(())
    }

    pub fn get_instance(&self, id: &str) -> Option<Arc<dyn FixtureInstance>> {
        self.instances.get(id).cloned()
    }

    pub fn set_symbol(&mut self, name: String, value: String) {
        self.symbols.insert(name, value);
    }

    pub fn get_symbol(&self, name: &str) -> Option<&str> {
        self.symbols.get(name).map(|s| s.as_str())
    }

    /// Replace every `$name` reference in a top-level string argument with
    /// the stored symbol's text. Unknown symbols are left as literal text —
    /// SLIM never fails an instruction purely because a symbol is unset.
    /// This is never applied to nested-list arguments.
    pub fn substitute(&self, arg: &str) -> String {
        let mut out = String::with_capacity(arg.len());
        let mut chars = arg.char_indices().peekable();
        while let Some((i, c)) = chars.next() {
            if c != '$' {
                out.push(c);
                continue;
            }
            let rest = &arg[i + 1..];
            let name_len = rest
                .char_indices()
                .take_while(|(_, c)| c.is_alphanumeric() || *c == '_')
                .count();
            if name_len == 0 {
                out.push(c);
                continue;
            }
            let name = &rest[..name_len];
            match self.get_symbol(name) {
                Some(value) => out.push_str(value),
                None => {
                    out.push('$');
                    out.push_str(name);
                }
            }
            for _ in 0..name_len {
                chars.next();
            }
        }
        out
    }
}
