use crate::runtime::{
    error::{RuntimeError, RuntimeResult},
    traits::{TraitName, TraitRegistry, TypeKey},
    value::Value,
};
use std::fmt;
use std::rc::Rc;

/// A trait instance reified as a value.
pub struct Dictionary {
    pub name: String,
    methods: Vec<(String, Value)>,
    supers: Vec<Rc<Dictionary>>,
}

impl Dictionary {
    pub fn synthesize(
        name: impl Into<String>,
        methods: Vec<(String, Value)>,
        supers: Vec<Rc<Dictionary>>,
    ) -> Rc<Dictionary> {
        let methods = methods
            .into_iter()
            .map(|(method, value)| (bare_method_name(&method).to_string(), value))
            .collect();
        Rc::new(Dictionary {
            name: name.into(),
            methods,
            supers,
        })
    }

    /// Dictionary for a registered (trait, type) table, with dictionaries of
    /// the trait's parents for the same type attached as supers.
    pub fn from_registry(
        registry: &TraitRegistry,
        trait_name: TraitName,
        type_key: &TypeKey,
    ) -> Option<Rc<Dictionary>> {
        let table = registry.table(trait_name, type_key)?;
        let methods = table
            .methods()
            .map(|(name, native)| (name.to_string(), native.to_value()))
            .collect();
        let supers = trait_name
            .supers()
            .iter()
            .filter_map(|parent| Dictionary::from_registry(registry, *parent, type_key))
            .collect();
        Some(Rc::new(Dictionary {
            name: dictionary_name(trait_name, type_key),
            methods,
            supers,
        }))
    }

    /// Resolves `method` against this dictionary, then its supers depth-first
    /// in declaration order.
    pub fn method(&self, method: &str) -> Option<Value> {
        let method = bare_method_name(method);
        if let Some((_, value)) = self.methods.iter().find(|(name, _)| name == method) {
            return Some(value.clone());
        }
        self.supers.iter().find_map(|parent| parent.method(method))
    }

    pub fn methods(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.methods
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    pub fn supers(&self) -> &[Rc<Dictionary>] {
        &self.supers
    }
}

impl fmt::Debug for Dictionary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dictionary")
            .field("name", &self.name)
            .field(
                "methods",
                &self.methods.iter().map(|(name, _)| name).collect::<Vec<_>>(),
            )
            .field(
                "supers",
                &self.supers.iter().map(|s| &s.name).collect::<Vec<_>>(),
            )
            .finish()
    }
}

pub fn dictionary_name(trait_name: TraitName, type_key: &TypeKey) -> String {
    format!("{trait_name}[{type_key}]")
}

pub fn bare_method_name(method: &str) -> &str {
    method
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'))
        .unwrap_or(method)
}

pub fn dictionary_from_values(name: &Value, methods: &Value, supers: &Value) -> RuntimeResult<Value> {
    let Value::String(name) = name else {
        return Err(RuntimeError::TypeMismatch {
            message: format!("dictionary name must be a String, found {name}"),
        });
    };
    let Value::List(entries) = methods else {
        return Err(RuntimeError::TypeMismatch {
            message: "dictionary methods must be a List of (name, function) tuples".into(),
        });
    };
    let mut collected = Vec::with_capacity(entries.len());
    for entry in entries.iter() {
        match entry {
            Value::Tuple(parts) if parts.len() == 2 => match (&parts[0], &parts[1]) {
                (Value::String(method), func) if func.is_callable() => {
                    collected.push((method.clone(), func.clone()));
                }
                _ => {
                    return Err(RuntimeError::TypeMismatch {
                        message: format!("invalid dictionary method entry {entry}"),
                    })
                }
            },
            other => {
                return Err(RuntimeError::TypeMismatch {
                    message: format!("invalid dictionary method entry {other}"),
                })
            }
        }
    }
    let Value::List(parents) = supers else {
        return Err(RuntimeError::TypeMismatch {
            message: "dictionary supers must be a List of dictionaries".into(),
        });
    };
    let mut super_dicts = Vec::with_capacity(parents.len());
    for parent in parents.iter() {
        match parent {
            Value::Dictionary(dict) => super_dicts.push(dict.clone()),
            other => {
                return Err(RuntimeError::TypeMismatch {
                    message: format!("expected dictionary in supers, found {other}"),
                })
            }
        }
    }
    Ok(Value::Dictionary(Dictionary::synthesize(
        name.clone(),
        collected,
        super_dicts,
    )))
}
