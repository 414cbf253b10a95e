use crate::runtime::{
    error::RuntimeError,
    value::{FunctionValue, Value},
};
use std::collections::HashMap;

#[derive(Clone, Default)]
struct Scope {
    bindings: HashMap<String, Value>,
}

/// Global scopes, innermost last: prelude builtins, trait dispatchers and
/// dictionaries, then user definitions.
#[derive(Clone)]
pub struct Environment {
    scopes: Vec<Scope>,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment {
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::default()],
        }
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(Scope::default());
    }

    pub fn pop_scope(&mut self) {
        self.scopes.pop();
        if self.scopes.is_empty() {
            self.scopes.push(Scope::default());
        }
    }

    pub fn declare(&mut self, name: &str, value: Value) -> Result<(), RuntimeError> {
        if let Some(scope) = self.scopes.last_mut() {
            scope.bindings.insert(name.to_string(), value);
            Ok(())
        } else {
            Err(RuntimeError::Panic {
                message: format!("No scope available for binding `{}`", name),
            })
        }
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        for scope in self.scopes.iter().rev() {
            if let Some(value) = scope.bindings.get(name) {
                return Some(value.clone());
            }
        }
        None
    }

    pub fn fallback(&self, name: &str) -> Option<Value> {
        self.scopes
            .iter()
            .rev()
            .filter_map(|scope| scope.bindings.get(name))
            .find(|value| !matches!(value, Value::Function(FunctionValue::TraitMethod(_))))
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::dispatch::FMAP;

    #[test]
    fn inner_scopes_shadow_outer_bindings() {
        let mut env = Environment::new();
        env.declare("x", Value::Int(1)).expect("declare");
        env.push_scope();
        env.declare("x", Value::Int(2)).expect("declare");
        assert_eq!(env.get("x"), Some(Value::Int(2)));
        env.pop_scope();
        assert_eq!(env.get("x"), Some(Value::Int(1)));
    }

    #[test]
    fn fallback_skips_dispatchers() {
        let mut env = Environment::new();
        env.declare("fmap", Value::string("plain")).expect("declare");
        env.push_scope();
        env.declare("fmap", FMAP.to_value()).expect("declare");
        assert_eq!(env.fallback("fmap"), Some(Value::string("plain")));
        assert_eq!(env.get("fmap"), Some(FMAP.to_value()));
    }

    #[test]
    fn root_scope_is_never_dropped() {
        let mut env = Environment::new();
        env.pop_scope();
        env.declare("y", Value::Unit).expect("declare");
        assert_eq!(env.get("y"), Some(Value::Unit));
    }
}
