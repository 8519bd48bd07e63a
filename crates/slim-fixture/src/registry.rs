//! Maps import path + class name onto a registered fixture class.
//!
//! This is the "registration shim" standing in for reflective class
//! loading: there is no classpath scan, a fixture exists in the registry
//! only because something called [`FixtureRegistry::register`] for it.

use std::collections::HashMap;
use std::sync::Arc;

use slim_engine::{ClassResolver, FixtureClass};

pub struct FixtureRegistry {
    classes: HashMap<String, Arc<dyn FixtureClass>>,
}

impl FixtureRegistry {
    pub fn new() -> Self {
        Self {
            classes: HashMap::new(),
        }
    }

    /// Register a fixture class under its bare name. Import paths are
    /// matched as an optional `module.ClassName` prefix at resolution time,
    /// so one registration serves both `make foo Bar` after `import module`
    /// and a fully-qualified `make foo module.Bar`.
    pub fn register(&mut self, class_name: impl Into<String>, class: Arc<dyn FixtureClass>) {
        self.classes.insert(class_name.into(), class);
    }
}

impl Default for FixtureRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ClassResolver for FixtureRegistry {
    fn resolve(&self, imports: &[String], class_name: &str) -> Option<Arc<dyn FixtureClass>> {
        // A dotted class name is tried as fully-qualified first, its leading
        // component treated as an implicit module; only once that lookup
        // fails do we fall through to scanning the import path.
        if class_name.contains('.') {
            if let Some(class) = self.classes.get(class_name) {
                return Some(class.clone());
            }
        }
        for import in imports {
            let qualified = format!("{import}.{class_name}");
            if let Some(class) = self.classes.get(&qualified) {
                return Some(class.clone());
            }
        }
        self.classes.get(class_name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    struct StubInstance;
    impl slim_engine::FixtureInstance for StubInstance {
        fn method_arity(&self, _method: &str) -> Option<usize> {
            None
        }
        fn invoke(
            &self,
            _method: &str,
            _args: &[String],
            _converters: &slim_engine::ConverterRegistry,
        ) -> Result<slim_engine::FixtureValue, String> {
            Err("unused".into())
        }
    }

    struct StubClass;
    impl FixtureClass for StubClass {
        fn construct(
            &self,
            _args: &[String],
        ) -> Result<Arc<dyn slim_engine::FixtureInstance>, String> {
            Ok(Arc::new(StubInstance))
        }
    }

    #[test]
    fn resolves_bare_name_without_any_import() {
        let mut registry = FixtureRegistry::new();
        registry.register("Widget", Arc::new(StubClass));
        assert!(registry.resolve(&[], "Widget").is_some());
    }

    #[test]
    fn resolves_qualified_name_when_import_present() {
        let mut registry = FixtureRegistry::new();
        registry.register("fixtures.Widget", Arc::new(StubClass));
        assert!(registry.resolve(&["fixtures".to_string()], "Widget").is_some());
    }

    #[test]
    fn unregistered_class_resolves_to_none() {
        let registry = FixtureRegistry::new();
        assert!(registry.resolve(&[], "Nope").is_none());
    }

    #[test]
    fn dotted_class_name_resolves_fully_qualified_before_import_scan() {
        let mut registry = FixtureRegistry::new();
        registry.register("fixtures.Widget", Arc::new(StubClass));
        // No import needed: the dotted name is itself fully qualified.
        assert!(registry.resolve(&[], "fixtures.Widget").is_some());
        // Also still resolves when an unrelated import path is present.
        assert!(registry
            .resolve(&["other".to_string()], "fixtures.Widget")
            .is_some());
    }
}
