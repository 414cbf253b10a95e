//! OptionT and ResultT over an inner monad M discovered at runtime.

use super::{found, option_payload, result_payload};
use crate::language::types::TypeExpr;
use crate::runtime::{
    context::CallContext,
    dispatch::{Resolved, TraitMethodRef, AP, BIND, FMAP, PURE},
    error::{RuntimeError, RuntimeResult},
    interpreter::Interpreter,
    traits::{runtime_type, MethodTable, TraitName, TraitRegistry, TypeKey},
    value::{Value, OPTION_T, RESULT_T},
};
use tracing::trace;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Layer {
    Option,
    Result,
}

/// An inner layer value split into the part `>>=` continues with and the
/// part it short-circuits on.
enum Split {
    Present(Value),
    Empty(Value),
}

impl Layer {
    fn transformer(self) -> &'static str {
        match self {
            Layer::Option => OPTION_T,
            Layer::Result => RESULT_T,
        }
    }

    fn key(self) -> TypeKey {
        match self {
            Layer::Option => TypeKey::OptionT,
            Layer::Result => TypeKey::ResultT,
        }
    }

    fn present(self, value: Value) -> Value {
        match self {
            Layer::Option => Value::some(value),
            Layer::Result => Value::ok(value),
        }
    }

    pub(crate) fn wrap(self, inner: Value) -> Value {
        match self {
            Layer::Option => Value::option_t(inner),
            Layer::Result => Value::result_t(inner),
        }
    }

    fn split(self, method: &str, value: Value) -> RuntimeResult<Split> {
        match self {
            Layer::Option => Ok(match option_payload(TraitName::Monad, method, &value)? {
                Some(inner) => Split::Present(inner),
                None => Split::Empty(value),
            }),
            Layer::Result => Ok(match result_payload(TraitName::Monad, method, &value)? {
                Ok(inner) => Split::Present(inner),
                Err(_) => Split::Empty(value),
            }),
        }
    }

    fn expect_inner(self, trait_name: TraitName, method: &str, value: &Value) -> RuntimeResult<()> {
        match self {
            Layer::Option => option_payload(trait_name, method, value).map(|_| ()),
            Layer::Result => result_payload(trait_name, method, value).map(|_| ()),
        }
    }

    pub(crate) fn unwrap(self, trait_name: TraitName, method: &str, value: &Value) -> RuntimeResult<Value> {
        value
            .data_of(self.transformer())
            .and_then(|data| data.field(0))
            .cloned()
            .ok_or_else(|| RuntimeError::shape(trait_name, method, self.transformer(), found(value)))
    }
}

struct Inner {
    ty: TypeExpr,
    key: TypeKey,
}

impl Inner {
    fn missing(&self, layer: Layer, method: &TraitMethodRef) -> RuntimeError {
        RuntimeError::InnerCapabilityMissing {
            transformer: layer.transformer().to_string(),
            inner: self.key.to_string(),
            capability: method.capability(),
        }
    }
}

fn inner_of(interp: &Interpreter, layer: Layer, ty: &TypeExpr) -> Option<TypeExpr> {
    let ty = interp.expand_aliases(ty);
    if ty.head() != Some(layer.transformer()) {
        return None;
    }
    ty.args()
        .first()
        .map(|inner| interp.expand_aliases(inner))
        .filter(|inner| inner.head().is_some())
}

fn annotated_inner(interp: &Interpreter, ctx: &CallContext, layer: Layer) -> Option<TypeExpr> {
    ctx.call_site()?
        .witnesses
        .iter()
        .flat_map(|entry| entry.candidates.iter())
        .find_map(|ty| inner_of(interp, layer, ty))
}

/// M for an operation that has an M-value in hand: the call-site
/// annotation `T M` if there is one, else the value's runtime type.
fn inner_for_value(interp: &Interpreter, ctx: &CallContext, layer: Layer, m: &Value) -> Inner {
    let ty = annotated_inner(interp, ctx, layer).unwrap_or_else(|| runtime_type(m));
    let key = TypeKey::of_type(&ty).unwrap_or_else(|| TypeKey::of(m));
    Inner { ty, key }
}

/// M for `pure`, which has no M-value to inspect.
fn inner_for_pure(interp: &Interpreter, ctx: &CallContext, layer: Layer) -> RuntimeResult<Inner> {
    let from_stack = || {
        ctx.witnesses()
            .top(TraitName::Applicative)?
            .candidates
            .iter()
            .find_map(|ty| inner_of(interp, layer, ty))
    };
    let from_inferred = || {
        interp
            .inferred_type(ctx)
            .and_then(|ty| inner_of(interp, layer, &ty))
    };
    let ty = ctx
        .annotated(TraitName::Applicative)
        .and_then(|entry| {
            entry
                .candidates
                .iter()
                .find_map(|ty| inner_of(interp, layer, ty))
        })
        .or_else(from_stack)
        .or_else(from_inferred)
        .ok_or_else(|| RuntimeError::witness_unresolved(TraitName::Applicative, "pure"))?;
    let key = TypeKey::of_type(&ty)
        .ok_or_else(|| RuntimeError::witness_unresolved(TraitName::Applicative, "pure"))?;
    Ok(Inner { ty, key })
}

fn resolve_inner(
    interp: &Interpreter,
    ctx: &CallContext,
    layer: Layer,
    inner: &Inner,
    method: &TraitMethodRef,
) -> RuntimeResult<Resolved> {
    let resolved = interp
        .resolve_method(ctx, method, &inner.key)
        .ok_or_else(|| inner.missing(layer, method))?;
    trace!(
        transformer = layer.transformer(),
        inner = %inner.ty,
        method = method.display_name(),
        "resolved inner monad method"
    );
    Ok(resolved)
}

fn fmap(interp: &Interpreter, ctx: &CallContext, layer: Layer, func: Value, t: &Value) -> RuntimeResult<Value> {
    let m = layer.unwrap(TraitName::Functor, "fmap", t)?;
    let inner = inner_for_value(interp, ctx, layer, &m);
    let nested = ctx.nested();
    let map_fmap = resolve_inner(interp, &nested, layer, &inner, &FMAP)?;
    let mapper = Value::native(&format!("{}.fmap", layer.transformer()), 1, move |interp, ctx, mut args| {
        let value = args.remove(0);
        layer.expect_inner(TraitName::Functor, "fmap", &value)?;
        interp.call_method(&ctx.nested(), TraitName::Functor, "fmap", vec![func.clone(), value])
    });
    let mapped = interp.invoke(&nested, &map_fmap, vec![mapper, m])?;
    Ok(layer.wrap(mapped))
}

fn pure(interp: &Interpreter, ctx: &CallContext, layer: Layer, value: Value) -> RuntimeResult<Value> {
    let inner = inner_for_pure(interp, ctx, layer)?;
    let scoped = ctx
        .nested()
        .with_type_witness(TraitName::Applicative, inner.ty.clone());
    let inner_pure = resolve_inner(interp, &scoped, layer, &inner, &PURE)?;
    let m = interp.invoke(&scoped, &inner_pure, vec![layer.present(value)])?;
    Ok(layer.wrap(m))
}

fn ap(interp: &Interpreter, ctx: &CallContext, layer: Layer, tf: &Value, tx: &Value) -> RuntimeResult<Value> {
    let mf = layer.unwrap(TraitName::Applicative, "<*>", tf)?;
    let mx = layer.unwrap(TraitName::Applicative, "<*>", tx)?;
    let inner = inner_for_value(interp, ctx, layer, &mf);
    let nested = ctx.nested();
    let inner_fmap = resolve_inner(interp, &nested, layer, &inner, &FMAP)?;
    let inner_ap = resolve_inner(interp, &nested, layer, &inner, &AP)?;
    // combine f x = f <*> x over the inner Option/Result, curried.
    let combine = Value::native(&format!("{}.combine", layer.transformer()), 1, move |_, _, mut args| {
        let func = args.remove(0);
        layer.expect_inner(TraitName::Applicative, "<*>", &func)?;
        Ok(Value::native("combine", 1, move |interp, ctx, mut args| {
            let value = args.remove(0);
            interp.call_method(&ctx.nested(), TraitName::Applicative, "<*>", vec![func.clone(), value])
        }))
    });
    let lifted = interp.invoke(&nested, &inner_fmap, vec![combine, mf])?;
    let applied = interp.invoke(&nested, &inner_ap, vec![lifted, mx])?;
    Ok(layer.wrap(applied))
}

fn bind(interp: &Interpreter, ctx: &CallContext, layer: Layer, t: &Value, func: Value) -> RuntimeResult<Value> {
    let m = layer.unwrap(TraitName::Monad, ">>=", t)?;
    let inner = inner_for_value(interp, ctx, layer, &m);
    let nested = ctx.nested();
    let inner_bind = resolve_inner(interp, &nested, layer, &inner, &BIND)?;
    let Inner { ty: inner_ty, key: inner_key } = inner;
    let continuation = Value::native(&format!("{}.>>=", layer.transformer()), 1, move |interp, ctx, mut args| {
        match layer.split(">>=", args.remove(0))? {
            Split::Empty(empty) => {
                let scoped = ctx
                    .nested()
                    .with_type_witness(TraitName::Applicative, inner_ty.clone());
                let inner = Inner { ty: inner_ty.clone(), key: inner_key.clone() };
                let inner_pure = resolve_inner(interp, &scoped, layer, &inner, &PURE)?;
                interp.invoke(&scoped, &inner_pure, vec![empty])
            }
            Split::Present(value) => {
                let witness = TypeExpr::apply(layer.transformer(), vec![inner_ty.clone()]);
                let cont = ctx
                    .for_continuation(witness.clone())
                    .with_type_witness(TraitName::Applicative, witness);
                let produced = interp.apply(&cont, &func, vec![value])?;
                layer.unwrap(TraitName::Monad, ">>=", &produced)
            }
        }
    });
    let bound = interp.invoke(&nested, &inner_bind, vec![m, continuation])?;
    Ok(layer.wrap(bound))
}

pub(crate) fn lift(interp: &Interpreter, ctx: &CallContext, layer: Layer, m: Value) -> RuntimeResult<Value> {
    let inner = inner_for_value(interp, ctx, layer, &m);
    let nested = ctx.nested();
    let inner_fmap = resolve_inner(interp, &nested, layer, &inner, &FMAP)?;
    let present = Value::native("lift", 1, move |_, _, mut args| Ok(layer.present(args.remove(0))));
    let mapped = interp.invoke(&nested, &inner_fmap, vec![present, m])?;
    Ok(layer.wrap(mapped))
}

pub fn register(registry: &mut TraitRegistry) -> RuntimeResult<()> {
    for layer in [Layer::Option, Layer::Result] {
        registry.register_instance(MethodTable::new(TraitName::Functor, layer.key()).with(
            "fmap",
            2,
            move |interp, ctx, mut args| {
                let t = args.remove(1);
                fmap(interp, ctx, layer, args.remove(0), &t)
            },
        ))?;
        registry.register_instance(
            MethodTable::new(TraitName::Applicative, layer.key())
                .with("pure", 1, move |interp, ctx, mut args| {
                    pure(interp, ctx, layer, args.remove(0))
                })
                .with("<*>", 2, move |interp, ctx, args| {
                    ap(interp, ctx, layer, &args[0], &args[1])
                }),
        )?;
        registry.register_instance(MethodTable::new(TraitName::Monad, layer.key()).with(
            ">>=",
            2,
            move |interp, ctx, mut args| {
                let func = args.remove(1);
                bind(interp, ctx, layer, &args[0], func)
            },
        ))?;
    }
    Ok(())
}
