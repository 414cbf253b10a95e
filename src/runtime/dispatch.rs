use crate::config::DictionaryPassing;
use crate::language::facts::WitnessEntry;
use crate::language::types::TypeExpr;
use crate::runtime::{
    context::CallContext,
    dictionary::Dictionary,
    error::{RuntimeError, RuntimeResult},
    interpreter::Interpreter,
    traits::{TraitName, TypeKey},
    value::{NativeFunction, Value},
};
use std::rc::Rc;
use tracing::{trace, warn};

/// How the dispatching type of a trait method is found.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dispatch {
    Argument(usize),
    TypeDirected,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TraitMethodRef {
    pub trait_name: TraitName,
    pub name: &'static str,
    pub arity: usize,
    pub dispatch: Dispatch,
    pub binding: Option<&'static str>,
}

impl TraitMethodRef {
    const fn new(
        trait_name: TraitName,
        name: &'static str,
        arity: usize,
        dispatch: Dispatch,
        binding: Option<&'static str>,
    ) -> Self {
        Self {
            trait_name,
            name,
            arity,
            dispatch,
            binding,
        }
    }

    pub fn display_name(&self) -> &'static str {
        self.binding.unwrap_or(self.name)
    }

    pub fn capability(&self) -> String {
        format!("{}.{}", self.trait_name, self.name)
    }

    pub fn find(trait_name: TraitName, name: &str) -> Option<&'static TraitMethodRef> {
        let name = crate::runtime::dictionary::bare_method_name(name);
        METHODS
            .iter()
            .find(|method| method.trait_name == trait_name && method.name == name)
    }

    pub fn by_binding(binding: &str) -> Option<&'static TraitMethodRef> {
        METHODS
            .iter()
            .find(|method| method.binding == Some(binding))
    }

    pub fn to_value(self) -> Value {
        Value::Function(crate::runtime::value::FunctionValue::TraitMethod(self))
    }
}

pub const SHOW: TraitMethodRef =
    TraitMethodRef::new(TraitName::Show, "show", 1, Dispatch::Argument(0), Some("show"));
pub const IS_EMPTY: TraitMethodRef = TraitMethodRef::new(
    TraitName::Empty,
    "isEmpty",
    1,
    Dispatch::Argument(0),
    Some("isEmpty"),
);
pub const APPEND: TraitMethodRef = TraitMethodRef::new(
    TraitName::Semigroup,
    "<>",
    2,
    Dispatch::Argument(0),
    Some("(<>)"),
);
pub const MEMPTY: TraitMethodRef = TraitMethodRef::new(
    TraitName::Monoid,
    "mempty",
    0,
    Dispatch::TypeDirected,
    Some("mempty"),
);
pub const FMAP: TraitMethodRef =
    TraitMethodRef::new(TraitName::Functor, "fmap", 2, Dispatch::Argument(1), Some("fmap"));
pub const PURE: TraitMethodRef = TraitMethodRef::new(
    TraitName::Applicative,
    "pure",
    1,
    Dispatch::TypeDirected,
    Some("pure"),
);
pub const AP: TraitMethodRef = TraitMethodRef::new(
    TraitName::Applicative,
    "<*>",
    2,
    Dispatch::Argument(0),
    Some("(<*>)"),
);
pub const BIND: TraitMethodRef = TraitMethodRef::new(
    TraitName::Monad,
    ">>=",
    2,
    Dispatch::Argument(0),
    Some("(>>=)"),
);
pub const COALESCE: TraitMethodRef = TraitMethodRef::new(
    TraitName::Optional,
    "??",
    2,
    Dispatch::Argument(0),
    Some("(??)"),
);
pub const OPTIONAL_IS_EMPTY: TraitMethodRef = TraitMethodRef::new(
    TraitName::Optional,
    "isEmpty",
    1,
    Dispatch::Argument(0),
    None,
);
pub const UNWRAP: TraitMethodRef =
    TraitMethodRef::new(TraitName::Optional, "unwrap", 1, Dispatch::Argument(0), None);
pub const WRAP: TraitMethodRef =
    TraitMethodRef::new(TraitName::Optional, "wrap", 1, Dispatch::TypeDirected, None);

pub const METHODS: [TraitMethodRef; 12] = [
    SHOW,
    IS_EMPTY,
    APPEND,
    MEMPTY,
    FMAP,
    PURE,
    AP,
    BIND,
    COALESCE,
    OPTIONAL_IS_EMPTY,
    UNWRAP,
    WRAP,
];

#[derive(Clone, Debug)]
pub enum Resolved {
    Dictionary(Value),
    Instance(NativeFunction),
    Global(Value),
}

impl Resolved {
    fn source(&self) -> &'static str {
        match self {
            Resolved::Dictionary(_) => "dictionary",
            Resolved::Instance(_) => "instance",
            Resolved::Global(_) => "global",
        }
    }
}

/// The `isEmpty`/`unwrap`/`wrap` trio the evaluator drives `??` and `?.` with.
#[derive(Clone, Debug)]
pub struct OptionalCapability {
    pub type_key: TypeKey,
    is_empty: NativeFunction,
    unwrap: NativeFunction,
    wrap: NativeFunction,
}

impl OptionalCapability {
    pub fn is_empty(
        &self,
        interp: &Interpreter,
        ctx: &CallContext,
        value: Value,
    ) -> RuntimeResult<bool> {
        match self.is_empty.call(interp, ctx, vec![value])? {
            Value::Bool(flag) => Ok(flag),
            other => Err(RuntimeError::shape(
                TraitName::Optional,
                "isEmpty",
                "Bool",
                TypeKey::of(&other).to_string(),
            )),
        }
    }

    pub fn unwrap(
        &self,
        interp: &Interpreter,
        ctx: &CallContext,
        value: Value,
    ) -> RuntimeResult<Value> {
        self.unwrap.call(interp, ctx, vec![value])
    }

    pub fn wrap(&self, interp: &Interpreter, ctx: &CallContext, value: Value) -> RuntimeResult<Value> {
        self.wrap.call(interp, ctx, vec![value])
    }
}

impl Interpreter {
    pub(crate) fn dispatch(
        &self,
        ctx: &CallContext,
        method: &TraitMethodRef,
        args: Vec<Value>,
    ) -> RuntimeResult<Value> {
        let (dictionary, args) = self.strip_dictionary(ctx, method, args);
        if args.len() != method.arity {
            return Err(RuntimeError::ArityMismatch {
                name: method.display_name().to_string(),
                expected: method.arity,
                received: args.len(),
            });
        }
        let ctx = match dictionary {
            Some(dictionary) => {
                if let Some(implementation) = dictionary.method(method.name) {
                    trace!(
                        method = method.display_name(),
                        dictionary = %dictionary.name,
                        "dispatching through explicit dictionary"
                    );
                    // Nested calls inside the implementation dispatch on their own arguments.
                    return self.apply(&ctx.without_dictionary(), &implementation, args);
                }
                ctx.with_dictionary(dictionary)
            }
            None => ctx.clone(),
        };

        let type_key = match method.dispatch {
            Dispatch::Argument(index) => TypeKey::of(&args[index]),
            Dispatch::TypeDirected => {
                let target = self.resolve_target_type(&ctx, method)?;
                TypeKey::of_type(&target).ok_or_else(|| {
                    RuntimeError::witness_unresolved(method.trait_name, method.display_name())
                })?
            }
        };

        let resolved = self
            .resolve_method(&ctx, method, &type_key)
            .ok_or_else(|| RuntimeError::DispatchMiss {
                trait_name: method.trait_name.to_string(),
                method: method.display_name().to_string(),
                type_name: type_key.to_string(),
            })?;
        trace!(
            method = method.display_name(),
            type_name = %type_key,
            source = resolved.source(),
            "dispatched"
        );
        self.invoke(&ctx, &resolved, args)
    }

    fn strip_dictionary(
        &self,
        ctx: &CallContext,
        method: &TraitMethodRef,
        mut args: Vec<Value>,
    ) -> (Option<Rc<Dictionary>>, Vec<Value>) {
        let eligible = match self.config().dictionary_passing {
            DictionaryPassing::Leading => args.len() == method.arity + 1,
            DictionaryPassing::Tagged => ctx
                .call_site()
                .map_or(false, |site| site.passes_dictionary),
        };
        if eligible && matches!(args.first(), Some(Value::Dictionary(_))) {
            if let Value::Dictionary(dictionary) = args.remove(0) {
                return (Some(dictionary), args);
            }
        }
        (None, args)
    }

    /// Explicit dictionary in the context, then the registry entry for
    /// `type_key`, then a global binding of the same name.
    pub fn resolve_method(
        &self,
        ctx: &CallContext,
        method: &TraitMethodRef,
        type_key: &TypeKey,
    ) -> Option<Resolved> {
        if let Some(implementation) = ctx
            .dictionary()
            .and_then(|dictionary| dictionary.method(method.name))
        {
            return Some(Resolved::Dictionary(implementation));
        }
        if let Some(native) = self
            .registry()
            .lookup(method.trait_name, method.name, type_key)
        {
            return Some(Resolved::Instance(native.clone()));
        }
        let fallback = self.global_fallback(method.display_name())?;
        warn!(
            method = method.display_name(),
            type_name = %type_key,
            "no instance, using global binding"
        );
        Some(Resolved::Global(fallback))
    }

    pub fn invoke(
        &self,
        ctx: &CallContext,
        resolved: &Resolved,
        args: Vec<Value>,
    ) -> RuntimeResult<Value> {
        match resolved {
            Resolved::Instance(native) => native.call(self, ctx, args),
            Resolved::Dictionary(value) | Resolved::Global(value) => self.apply(ctx, value, args),
        }
    }

    pub fn call_method(
        &self,
        ctx: &CallContext,
        trait_name: TraitName,
        method: &str,
        args: Vec<Value>,
    ) -> RuntimeResult<Value> {
        let method = TraitMethodRef::find(trait_name, method).ok_or_else(|| {
            RuntimeError::UnknownSymbol {
                name: format!("{trait_name}.{method}"),
            }
        })?;
        self.dispatch(ctx, method, args)
    }

    /// Decides the instance type of a type-directed method: call-site
    /// annotation, witness stack, inferred call-site type, and for
    /// Applicative/Optional the enclosing bind's container.
    pub fn resolve_target_type(
        &self,
        ctx: &CallContext,
        method: &TraitMethodRef,
    ) -> RuntimeResult<TypeExpr> {
        let trait_name = method.trait_name;
        if let Some(ty) = ctx
            .annotated(trait_name)
            .and_then(|entry| self.pick_candidate(entry))
        {
            trace!(method = method.display_name(), %ty, "witness from call-site annotation");
            return Ok(ty);
        }
        if let Some(ty) = ctx
            .witnesses()
            .top(trait_name)
            .and_then(|entry| self.pick_candidate(entry))
        {
            trace!(method = method.display_name(), %ty, "witness from witness stack");
            return Ok(ty);
        }
        if let Some(ty) = self.inferred_type(ctx) {
            if ty.head().is_some() {
                trace!(method = method.display_name(), %ty, "witness from inferred type");
                return Ok(ty);
            }
        }
        if trait_name != TraitName::Monoid {
            if let Some(container) = ctx.container() {
                trace!(method = method.display_name(), %container, "witness from bind container");
                return Ok(container.clone());
            }
        }
        Err(RuntimeError::witness_unresolved(
            trait_name,
            method.display_name(),
        ))
    }

    fn pick_candidate(&self, entry: &WitnessEntry) -> Option<TypeExpr> {
        let expanded: Vec<TypeExpr> = entry
            .candidates
            .iter()
            .map(|ty| self.expand_aliases(ty))
            .filter(|ty| ty.head().is_some())
            .collect();
        expanded
            .iter()
            .find(|ty| {
                TypeKey::of_type(ty)
                    .map_or(false, |key| self.registry().has_instance(entry.trait_name, &key))
            })
            .or_else(|| expanded.first())
            .cloned()
    }

    pub fn inferred_type(&self, ctx: &CallContext) -> Option<TypeExpr> {
        let site = ctx.call_site()?.id?;
        self.facts()
            .resolved_inferred(site, self.config().alias_expansion_limit)
    }

    pub fn expand_aliases(&self, ty: &TypeExpr) -> TypeExpr {
        self.facts()
            .aliases
            .expand(ty, self.config().alias_expansion_limit)
    }

    pub fn optional_capability(&self, value: &Value) -> RuntimeResult<OptionalCapability> {
        let type_key = TypeKey::of(value);
        let find = |method: &TraitMethodRef| {
            self.registry()
                .table(TraitName::Optional, &type_key)
                .and_then(|table| table.get(method.name))
                .cloned()
                .ok_or_else(|| RuntimeError::DispatchMiss {
                    trait_name: TraitName::Optional.to_string(),
                    method: method.name.to_string(),
                    type_name: type_key.to_string(),
                })
        };
        Ok(OptionalCapability {
            is_empty: find(&OPTIONAL_IS_EMPTY)?,
            unwrap: find(&UNWRAP)?,
            wrap: find(&WRAP)?,
            type_key: type_key.clone(),
        })
    }
}
