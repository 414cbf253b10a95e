//! Built-in trait instances, registered once at interpreter boot.

pub mod effects;
pub mod structural;
pub mod transformers;

use crate::runtime::{
    error::{RuntimeError, RuntimeResult},
    traits::{runtime_type, TraitName, TraitRegistry},
    value::{Value, OPTION, RESULT},
};
use std::rc::Rc;

impl TraitRegistry {
    pub fn with_builtins() -> RuntimeResult<Self> {
        let mut registry = TraitRegistry::new();
        structural::register(&mut registry)?;
        effects::register(&mut registry)?;
        transformers::register(&mut registry)?;
        Ok(registry)
    }
}

pub(crate) fn found(value: &Value) -> String {
    runtime_type(value).to_string()
}

pub(crate) fn option_payload(
    trait_name: TraitName,
    method: &str,
    value: &Value,
) -> RuntimeResult<Option<Value>> {
    match value.data_of(OPTION) {
        Some(data) if data.is("Some") => data
            .field(0)
            .cloned()
            .map(Some)
            .ok_or_else(|| RuntimeError::shape(trait_name, method, "Some(value)", "Some")),
        Some(data) if data.is("Zero") || data.is("None") => Ok(None),
        _ => Err(RuntimeError::shape(trait_name, method, OPTION, found(value))),
    }
}

pub(crate) fn result_payload(
    trait_name: TraitName,
    method: &str,
    value: &Value,
) -> RuntimeResult<Result<Value, Value>> {
    let data = value
        .data_of(RESULT)
        .ok_or_else(|| RuntimeError::shape(trait_name, method, RESULT, found(value)))?;
    let field = data
        .field(0)
        .cloned()
        .ok_or_else(|| RuntimeError::shape(trait_name, method, RESULT, data.name.clone()))?;
    match data.name.as_str() {
        "Ok" => Ok(Ok(field)),
        "Fail" => Ok(Err(field)),
        other => Err(RuntimeError::shape(trait_name, method, RESULT, other)),
    }
}

pub(crate) fn expect_list(
    trait_name: TraitName,
    method: &str,
    value: &Value,
) -> RuntimeResult<Rc<Vec<Value>>> {
    match value {
        Value::List(items) => Ok(items.clone()),
        other => Err(RuntimeError::shape(trait_name, method, "List", found(other))),
    }
}

pub(crate) fn show_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::List(items) if !items.is_empty() && items.iter().all(|v| matches!(v, Value::Char(_))) => {
            items
                .iter()
                .filter_map(|v| match v {
                    Value::Char(c) => Some(*c),
                    _ => None,
                })
                .collect()
        }
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_is_accepted_as_empty_option() {
        let none = Value::data(OPTION, "None", Vec::new());
        assert_eq!(
            option_payload(TraitName::Functor, "fmap", &none).expect("payload"),
            None
        );
        assert_eq!(
            option_payload(TraitName::Functor, "fmap", &Value::some(Value::Int(1)))
                .expect("payload"),
            Some(Value::Int(1))
        );
    }

    #[test]
    fn payload_of_wrong_carrier_is_a_shape_error() {
        let err = result_payload(TraitName::Monad, ">>=", &Value::Int(1)).unwrap_err();
        assert_eq!(
            err,
            RuntimeError::shape(TraitName::Monad, ">>=", RESULT, "Int")
        );
    }

    #[test]
    fn show_renders_text_plainly() {
        assert_eq!(show_text(&Value::string("hi")), "hi");
        assert_eq!(
            show_text(&Value::list(vec![Value::Char('o'), Value::Char('k')])),
            "ok"
        );
        assert_eq!(show_text(&Value::list(Vec::new())), "[]");
        assert_eq!(show_text(&Value::some(Value::string("a"))), "Some(\"a\")");
    }
}
