use crate::language::types::TypeExpr;
use crate::runtime::{
    context::CallContext,
    error::{RuntimeError, RuntimeResult},
    interpreter::Interpreter,
    value::{self, NativeFunction, Value},
};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use tracing::debug;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TraitName {
    Show,
    Empty,
    Semigroup,
    Monoid,
    Functor,
    Applicative,
    Monad,
    Optional,
}

impl TraitName {
    pub const ALL: [TraitName; 8] = [
        TraitName::Show,
        TraitName::Empty,
        TraitName::Semigroup,
        TraitName::Monoid,
        TraitName::Functor,
        TraitName::Applicative,
        TraitName::Monad,
        TraitName::Optional,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TraitName::Show => "Show",
            TraitName::Empty => "Empty",
            TraitName::Semigroup => "Semigroup",
            TraitName::Monoid => "Monoid",
            TraitName::Functor => "Functor",
            TraitName::Applicative => "Applicative",
            TraitName::Monad => "Monad",
            TraitName::Optional => "Optional",
        }
    }

    pub fn from_name(name: &str) -> Option<TraitName> {
        TraitName::ALL
            .into_iter()
            .find(|candidate| candidate.as_str() == name)
    }

    pub fn supers(self) -> &'static [TraitName] {
        match self {
            TraitName::Monoid => &[TraitName::Semigroup],
            TraitName::Applicative => &[TraitName::Functor],
            TraitName::Monad => &[TraitName::Applicative],
            _ => &[],
        }
    }
}

impl fmt::Display for TraitName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Runtime type used as the second level of instance lookup. Built-in
/// carriers are closed variants; `User` is the extension point for data
/// types declared in user code.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypeKey {
    Unit,
    Int,
    Float,
    Bool,
    Char,
    String,
    Tuple,
    Function,
    Dictionary,
    List,
    Option,
    Result,
    Identity,
    Reader,
    State,
    Writer,
    OptionT,
    ResultT,
    User(Rc<str>),
}

impl TypeKey {
    pub fn from_name(name: &str) -> TypeKey {
        match name {
            "Unit" | "()" => TypeKey::Unit,
            "Int" => TypeKey::Int,
            "Float" => TypeKey::Float,
            "Bool" => TypeKey::Bool,
            "Char" => TypeKey::Char,
            "String" => TypeKey::String,
            "Tuple" => TypeKey::Tuple,
            "Function" => TypeKey::Function,
            "Dictionary" => TypeKey::Dictionary,
            "List" => TypeKey::List,
            value::OPTION => TypeKey::Option,
            value::RESULT => TypeKey::Result,
            value::IDENTITY => TypeKey::Identity,
            value::READER => TypeKey::Reader,
            value::STATE => TypeKey::State,
            value::WRITER => TypeKey::Writer,
            value::OPTION_T => TypeKey::OptionT,
            value::RESULT_T => TypeKey::ResultT,
            other => TypeKey::User(Rc::from(other)),
        }
    }

    pub fn of(value: &Value) -> TypeKey {
        match value {
            Value::Unit => TypeKey::Unit,
            Value::Int(_) => TypeKey::Int,
            Value::Float(_) => TypeKey::Float,
            Value::Bool(_) => TypeKey::Bool,
            Value::Char(_) => TypeKey::Char,
            Value::String(_) => TypeKey::String,
            Value::List(_) => TypeKey::List,
            Value::Tuple(_) => TypeKey::Tuple,
            Value::Data(data) => TypeKey::from_name(&data.type_name),
            Value::Function(_) => TypeKey::Function,
            Value::Dictionary(_) => TypeKey::Dictionary,
        }
    }

    pub fn of_type(ty: &TypeExpr) -> Option<TypeKey> {
        ty.head().map(TypeKey::from_name)
    }

    pub fn name(&self) -> &str {
        match self {
            TypeKey::Unit => "Unit",
            TypeKey::Int => "Int",
            TypeKey::Float => "Float",
            TypeKey::Bool => "Bool",
            TypeKey::Char => "Char",
            TypeKey::String => "String",
            TypeKey::Tuple => "Tuple",
            TypeKey::Function => "Function",
            TypeKey::Dictionary => "Dictionary",
            TypeKey::List => "List",
            TypeKey::Option => value::OPTION,
            TypeKey::Result => value::RESULT,
            TypeKey::Identity => value::IDENTITY,
            TypeKey::Reader => value::READER,
            TypeKey::State => value::STATE,
            TypeKey::Writer => value::WRITER,
            TypeKey::OptionT => value::OPTION_T,
            TypeKey::ResultT => value::RESULT_T,
            TypeKey::User(name) => name,
        }
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Best-effort type of a runtime value. Writers carry their log type.
pub fn runtime_type(value: &Value) -> TypeExpr {
    match value {
        Value::Data(data) => match TypeKey::from_name(&data.type_name) {
            TypeKey::Writer => match data.field(1) {
                Some(log) => TypeExpr::apply(value::WRITER, vec![runtime_type(log)]),
                None => TypeExpr::named(value::WRITER),
            },
            TypeKey::OptionT | TypeKey::ResultT => match data.field(0) {
                Some(inner) => TypeExpr::apply(data.type_name.clone(), vec![runtime_type(inner)]),
                None => TypeExpr::named(data.type_name.clone()),
            },
            _ => TypeExpr::named(data.type_name.clone()),
        },
        Value::Unit => TypeExpr::Unit,
        other => TypeExpr::named(TypeKey::of(other).name()),
    }
}

#[derive(Clone, Debug)]
pub struct MethodTable {
    trait_name: TraitName,
    type_key: TypeKey,
    methods: Vec<(String, NativeFunction)>,
}

impl MethodTable {
    pub fn new(trait_name: TraitName, type_key: TypeKey) -> Self {
        Self {
            trait_name,
            type_key,
            methods: Vec::new(),
        }
    }

    pub fn with(
        mut self,
        method: &str,
        arity: usize,
        func: impl Fn(&Interpreter, &CallContext, Vec<Value>) -> RuntimeResult<Value> + 'static,
    ) -> Self {
        // Natives carry the qualified label so arity errors name the instance.
        let label = format!("{}[{}].{}", self.trait_name, self.type_key, method);
        self.methods.retain(|(existing, _)| existing != method);
        self.methods
            .push((method.to_string(), NativeFunction::new(&label, arity, func)));
        self
    }

    pub fn trait_name(&self) -> TraitName {
        self.trait_name
    }

    pub fn type_key(&self) -> &TypeKey {
        &self.type_key
    }

    pub fn get(&self, method: &str) -> Option<&NativeFunction> {
        self.methods
            .iter()
            .find(|(name, _)| name == method)
            .map(|(_, native)| native)
    }

    pub fn methods(&self) -> impl Iterator<Item = (&str, &NativeFunction)> {
        self.methods
            .iter()
            .map(|(name, native)| (name.as_str(), native))
    }
}

#[derive(Default)]
pub struct TraitRegistry {
    instances: HashMap<TraitName, HashMap<TypeKey, MethodTable>>,
    defaults: HashMap<TraitName, MethodTable>,
}

impl TraitRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_instance(&mut self, table: MethodTable) -> RuntimeResult<()> {
        let by_type = self.instances.entry(table.trait_name).or_default();
        if by_type.contains_key(&table.type_key) {
            return Err(RuntimeError::Panic {
                message: format!(
                    "`{}` already implemented for `{}`",
                    table.trait_name, table.type_key
                ),
            });
        }
        debug!(
            trait_name = %table.trait_name,
            type_name = %table.type_key,
            methods = table.methods.len(),
            "registered instance"
        );
        by_type.insert(table.type_key.clone(), table);
        Ok(())
    }

    pub fn register_default(&mut self, table: MethodTable) {
        debug!(trait_name = %table.trait_name, "registered default instance");
        self.defaults.insert(table.trait_name, table);
    }

    pub fn table(&self, trait_name: TraitName, type_key: &TypeKey) -> Option<&MethodTable> {
        self.instances
            .get(&trait_name)
            .and_then(|by_type| by_type.get(type_key))
    }

    pub fn has_instance(&self, trait_name: TraitName, type_key: &TypeKey) -> bool {
        self.table(trait_name, type_key).is_some()
    }

    pub fn lookup(
        &self,
        trait_name: TraitName,
        method: &str,
        type_key: &TypeKey,
    ) -> Option<&NativeFunction> {
        self.table(trait_name, type_key)
            .and_then(|table| table.get(method))
            .or_else(|| {
                self.defaults
                    .get(&trait_name)
                    .and_then(|table| table.get(method))
            })
    }

    pub fn tables(&self) -> Vec<&MethodTable> {
        let mut tables: Vec<&MethodTable> = self
            .instances
            .values()
            .flat_map(|by_type| by_type.values())
            .collect();
        tables.sort_by(|a, b| {
            (a.trait_name, &a.type_key).cmp(&(b.trait_name, &b.type_key))
        });
        tables
    }
}

pub struct OperatorMap;

impl OperatorMap {
    pub const OPERATORS: [&'static str; 5] = ["<>", "<*>", ">>=", "??", "?."];

    pub fn trait_for(token: &str) -> Option<TraitName> {
        match token {
            "<>" => Some(TraitName::Semigroup),
            "<*>" => Some(TraitName::Applicative),
            ">>=" => Some(TraitName::Monad),
            "??" | "?." => Some(TraitName::Optional),
            _ => None,
        }
    }

    pub fn method_for(token: &str) -> Option<&'static str> {
        match token {
            "<>" => Some("(<>)"),
            "<*>" => Some("(<*>)"),
            ">>=" => Some("(>>=)"),
            "??" => Some("(??)"),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(trait_name: TraitName, key: TypeKey) -> MethodTable {
        MethodTable::new(trait_name, key).with("isEmpty", 1, |_, _, _| Ok(Value::Bool(true)))
    }

    #[test]
    fn rejects_second_table_for_same_pair() {
        let mut registry = TraitRegistry::new();
        registry
            .register_instance(table(TraitName::Empty, TypeKey::List))
            .expect("first registration");
        let err = registry
            .register_instance(table(TraitName::Empty, TypeKey::List))
            .unwrap_err();
        assert!(err.to_string().contains("already implemented"));
    }

    #[test]
    fn lookup_misses_are_ordinary_results() {
        let mut registry = TraitRegistry::new();
        registry
            .register_instance(table(TraitName::Empty, TypeKey::List))
            .expect("register");
        assert!(registry
            .lookup(TraitName::Empty, "isEmpty", &TypeKey::List)
            .is_some());
        assert!(registry
            .lookup(TraitName::Empty, "isEmpty", &TypeKey::Int)
            .is_none());
        assert!(registry
            .lookup(TraitName::Empty, "missing", &TypeKey::List)
            .is_none());
    }

    #[test]
    fn default_table_covers_unregistered_types() {
        let mut registry = TraitRegistry::new();
        registry.register_default(
            MethodTable::new(TraitName::Show, TypeKey::User(Rc::from("*")))
                .with("show", 1, |_, _, _| Ok(Value::string("x"))),
        );
        assert!(registry
            .lookup(TraitName::Show, "show", &TypeKey::Int)
            .is_some());
    }

    #[test]
    fn method_labels_keep_bare_names_addressable() {
        let table = MethodTable::new(TraitName::Monad, TypeKey::Option)
            .with(">>=", 2, |_, _, _| Ok(Value::Unit));
        let native = table.get(">>=").expect("bind");
        assert_eq!(&*native.name, "Monad[Option].>>=");
        assert_eq!(table.methods().map(|(name, _)| name).collect::<Vec<_>>(), vec![">>="]);
    }

    #[test]
    fn user_types_map_to_the_extension_variant() {
        assert_eq!(TypeKey::from_name("Tree"), TypeKey::User(Rc::from("Tree")));
        assert_eq!(TypeKey::from_name("Option"), TypeKey::Option);
        assert_eq!(
            runtime_type(&Value::data("Writer", "Writer", vec![Value::Unit, Value::list(vec![])])),
            TypeExpr::apply("Writer", vec![TypeExpr::named("List")])
        );
    }

    #[test]
    fn operators_bind_to_traits() {
        assert_eq!(OperatorMap::trait_for("<*>"), Some(TraitName::Applicative));
        assert_eq!(OperatorMap::trait_for("?."), Some(TraitName::Optional));
        assert_eq!(OperatorMap::method_for("?."), None);
        assert_eq!(OperatorMap::trait_for("+"), None);
    }
}
