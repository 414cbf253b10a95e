use crate::config::RuntimeConfig;
use crate::language::facts::TypeFacts;
use crate::runtime::{
    context::CallContext,
    dictionary::{dictionary_name, Dictionary},
    dispatch::{TraitMethodRef, METHODS},
    environment::Environment,
    error::{RuntimeError, RuntimeResult},
    prelude,
    traits::{TraitName, TraitRegistry, TypeKey},
    value::{FunctionValue, Value},
};
use std::rc::Rc;
use tracing::debug;

/// Owns the instance registry and the global environment the evaluator
/// resolves trait methods, dictionaries and prelude functions from.
pub struct Interpreter {
    registry: Rc<TraitRegistry>,
    env: Environment,
    facts: TypeFacts,
    config: RuntimeConfig,
}

impl Interpreter {
    pub fn new() -> RuntimeResult<Self> {
        Self::with_config(RuntimeConfig::default())
    }

    pub fn with_config(config: RuntimeConfig) -> RuntimeResult<Self> {
        let registry = Rc::new(TraitRegistry::with_builtins()?);
        let mut interp = Self {
            registry,
            env: Environment::new(),
            facts: TypeFacts::default(),
            config,
        };
        interp.bootstrap()?;
        Ok(interp)
    }

    fn bootstrap(&mut self) -> RuntimeResult<()> {
        prelude::install(&mut self.env)?;

        self.env.push_scope();
        for method in METHODS.iter() {
            if let Some(binding) = method.binding {
                self.env.declare(binding, method.to_value())?;
            }
        }
        let registry = self.registry.clone();
        let mut dictionaries = 0usize;
        for table in registry.tables() {
            if let Some(dictionary) =
                Dictionary::from_registry(&registry, table.trait_name(), table.type_key())
            {
                self.env.declare(
                    &dictionary_name(table.trait_name(), table.type_key()),
                    Value::Dictionary(dictionary),
                )?;
                dictionaries += 1;
            }
        }
        debug!(dictionaries, "trait dispatchers installed");

        self.env.push_scope();
        Ok(())
    }

    pub fn registry(&self) -> &TraitRegistry {
        &self.registry
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn facts(&self) -> &TypeFacts {
        &self.facts
    }

    pub fn set_type_facts(&mut self, facts: TypeFacts) {
        self.facts = facts;
    }

    pub fn define(&mut self, name: &str, value: Value) -> RuntimeResult<()> {
        self.env.declare(name, value)
    }

    pub fn lookup(&self, name: &str) -> RuntimeResult<Value> {
        self.env.get(name).ok_or_else(|| RuntimeError::UnknownSymbol {
            name: name.to_string(),
        })
    }

    pub fn dispatcher(&self, binding: &str) -> RuntimeResult<Value> {
        TraitMethodRef::by_binding(binding)
            .map(|method| method.to_value())
            .ok_or_else(|| RuntimeError::UnknownSymbol {
                name: binding.to_string(),
            })
    }

    pub(crate) fn global_fallback(&self, name: &str) -> Option<Value> {
        self.env.fallback(name)
    }

    pub fn dictionary(&self, trait_name: TraitName, type_key: &TypeKey) -> Option<Rc<Dictionary>> {
        match self.env.get(&dictionary_name(trait_name, type_key)) {
            Some(Value::Dictionary(dictionary)) => Some(dictionary),
            _ => None,
        }
    }

    pub fn apply(&self, ctx: &CallContext, callee: &Value, args: Vec<Value>) -> RuntimeResult<Value> {
        match callee {
            Value::Function(FunctionValue::Native(native)) => native.call(self, ctx, args),
            Value::Function(FunctionValue::TraitMethod(method)) => self.dispatch(ctx, method, args),
            other => Err(RuntimeError::TypeMismatch {
                message: format!("`{}` is not callable", other),
            }),
        }
    }

    pub fn call(&self, ctx: &CallContext, name: &str, args: Vec<Value>) -> RuntimeResult<Value> {
        let callee = self.lookup(name)?;
        self.apply(ctx, &callee, args)
    }
}
