// Parameter-name environment for lambda invocations

use rustc_hash::FxHashMap;

use crate::value::Value;

/// Scope holding the bindings visible to one invocation
///
/// A fresh scope is built per call from the fixed parameters, the rest
/// array (if any), and block-local declarations. Nothing outside the scope
/// is ever visible to a compiled unit.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    bindings: FxHashMap<String, Value>,
}

impl Scope {
    /// Create an empty scope
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a name, creating or replacing it
    pub fn bind(&mut self, name: impl Into<String>, value: Value) {
        self.bindings.insert(name.into(), value);
    }

    /// Look up a binding
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.bindings.get(name)
    }

    /// Re-bind an existing name; returns false when the name is unbound
    pub fn assign(&mut self, name: &str, value: Value) -> bool {
        match self.bindings.get_mut(name) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }
}
