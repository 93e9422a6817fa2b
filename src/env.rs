// ABOUTME: Environment module mapping names to values during evaluation

use crate::error::EvalError;
use crate::value::Value;
use std::collections::HashMap;

/// The symbol table in effect during evaluation.
///
/// blox scoping is flat: assignments mutate the live table and persist across
/// block boundaries. Isolation exists in exactly one place — a function call
/// with parameters evaluates its body against a [`Environment::sub_scope`]
/// copy, so callee bindings never reach the caller.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    bindings: HashMap<String, Value>,
}

impl Environment {
    pub fn new() -> Self {
        Environment {
            bindings: HashMap::new(),
        }
    }

    /// Binds a name, replacing any previous binding
    pub fn bind(&mut self, name: impl Into<String>, value: Value) {
        self.bindings.insert(name.into(), value);
    }

    /// Looks up a name; failure is the UnboundName error
    pub fn lookup(&self, name: &str) -> Result<&Value, EvalError> {
        self.bindings
            .get(name)
            .ok_or_else(|| EvalError::UnboundName(name.to_string()))
    }

    /// Removes a binding (used to drop loop iterators after the loop)
    pub fn remove(&mut self, name: &str) {
        self.bindings.remove(name);
    }

    /// Returns a shallow-copied snapshot extended with overriding bindings.
    /// Mutations to the copy never reach this environment.
    pub fn sub_scope(&self, overrides: Vec<(String, Value)>) -> Environment {
        let mut bindings = self.bindings.clone();
        for (name, value) in overrides {
            bindings.insert(name, value);
        }
        Environment { bindings }
    }
}
