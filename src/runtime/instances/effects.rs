use super::found;
use crate::language::{facts::WitnessEntry, types::TypeExpr};
use crate::runtime::{
    context::CallContext,
    dispatch::{APPEND, MEMPTY},
    error::{RuntimeError, RuntimeResult},
    interpreter::Interpreter,
    traits::{runtime_type, MethodTable, TraitName, TraitRegistry, TypeKey},
    value::{Value, IDENTITY, READER, STATE, WRITER},
};
use tracing::trace;

pub fn register(registry: &mut TraitRegistry) -> RuntimeResult<()> {
    register_identity(registry)?;
    register_reader(registry)?;
    register_state(registry)?;
    register_writer(registry)?;
    Ok(())
}

fn identity_field(trait_name: TraitName, method: &str, value: &Value) -> RuntimeResult<Value> {
    value
        .data_of(IDENTITY)
        .and_then(|data| data.field(0))
        .cloned()
        .ok_or_else(|| RuntimeError::shape(trait_name, method, IDENTITY, found(value)))
}

fn register_identity(registry: &mut TraitRegistry) -> RuntimeResult<()> {
    registry.register_instance(MethodTable::new(TraitName::Functor, TypeKey::Identity).with(
        "fmap",
        2,
        |interp, ctx, args| {
            let inner = identity_field(TraitName::Functor, "fmap", &args[1])?;
            Ok(Value::identity(interp.apply(&ctx.nested(), &args[0], vec![inner])?))
        },
    ))?;
    registry.register_instance(
        MethodTable::new(TraitName::Applicative, TypeKey::Identity)
            .with("pure", 1, |_, _, mut args| Ok(Value::identity(args.remove(0))))
            .with("<*>", 2, |interp, ctx, args| {
                let func = identity_field(TraitName::Applicative, "<*>", &args[0])?;
                let item = identity_field(TraitName::Applicative, "<*>", &args[1])?;
                Ok(Value::identity(interp.apply(&ctx.nested(), &func, vec![item])?))
            }),
    )?;
    registry.register_instance(MethodTable::new(TraitName::Monad, TypeKey::Identity).with(
        ">>=",
        2,
        |interp, ctx, args| {
            let inner = identity_field(TraitName::Monad, ">>=", &args[0])?;
            let cont = ctx.for_continuation(runtime_type(&args[0]));
            let produced = interp.apply(&cont, &args[1], vec![inner])?;
            identity_field(TraitName::Monad, ">>=", &produced)?;
            Ok(produced)
        },
    ))?;
    Ok(())
}

pub(crate) fn reader_fn(
    name: &str,
    func: impl Fn(&Interpreter, &CallContext, Value) -> RuntimeResult<Value> + 'static,
) -> Value {
    Value::data(
        READER,
        READER,
        vec![Value::native(name, 1, move |interp, ctx, mut args| {
            func(interp, ctx, args.remove(0))
        })],
    )
}

pub(crate) fn run_reader(
    interp: &Interpreter,
    ctx: &CallContext,
    reader: &Value,
    env: Value,
) -> RuntimeResult<Value> {
    let run = reader
        .data_of(READER)
        .and_then(|data| data.field(0))
        .ok_or_else(|| RuntimeError::shape(TraitName::Monad, "runReader", READER, found(reader)))?;
    interp.apply(ctx, run, vec![env])
}

fn register_reader(registry: &mut TraitRegistry) -> RuntimeResult<()> {
    registry.register_instance(MethodTable::new(TraitName::Functor, TypeKey::Reader).with(
        "fmap",
        2,
        |_, _, mut args| {
            let reader = args.remove(1);
            let func = args.remove(0);
            Ok(reader_fn("Reader.fmap", move |interp, ctx, env| {
                let value = run_reader(interp, ctx, &reader, env)?;
                interp.apply(ctx, &func, vec![value])
            }))
        },
    ))?;
    registry.register_instance(
        MethodTable::new(TraitName::Applicative, TypeKey::Reader)
            .with("pure", 1, |_, _, mut args| {
                let value = args.remove(0);
                Ok(reader_fn("Reader.pure", move |_, _, _| Ok(value.clone())))
            })
            .with("<*>", 2, |_, _, mut args| {
                let item = args.remove(1);
                let func = args.remove(0);
                Ok(reader_fn("Reader.<*>", move |interp, ctx, env| {
                    let f = run_reader(interp, ctx, &func, env.clone())?;
                    let x = run_reader(interp, ctx, &item, env)?;
                    interp.apply(ctx, &f, vec![x])
                }))
            }),
    )?;
    registry.register_instance(MethodTable::new(TraitName::Monad, TypeKey::Reader).with(
        ">>=",
        2,
        |_, _, mut args| {
            let func = args.remove(1);
            let reader = args.remove(0);
            Ok(reader_fn("Reader.>>=", move |interp, ctx, env| {
                let value = run_reader(interp, ctx, &reader, env.clone())?;
                let next = interp.apply(
                    &ctx.for_continuation(TypeExpr::named(READER)),
                    &func,
                    vec![value],
                )?;
                run_reader(interp, ctx, &next, env)
            }))
        },
    ))?;
    Ok(())
}

pub(crate) fn state_fn(
    name: &str,
    func: impl Fn(&Interpreter, &CallContext, Value) -> RuntimeResult<(Value, Value)> + 'static,
) -> Value {
    Value::data(
        STATE,
        STATE,
        vec![Value::native(name, 1, move |interp, ctx, mut args| {
            let (value, state) = func(interp, ctx, args.remove(0))?;
            Ok(Value::pair(value, state))
        })],
    )
}

pub(crate) fn run_state(
    interp: &Interpreter,
    ctx: &CallContext,
    computation: &Value,
    state: Value,
) -> RuntimeResult<(Value, Value)> {
    let run = computation
        .data_of(STATE)
        .and_then(|data| data.field(0))
        .ok_or_else(|| {
            RuntimeError::shape(TraitName::Monad, "runState", STATE, found(computation))
        })?;
    match interp.apply(ctx, run, vec![state])? {
        Value::Tuple(mut parts) if parts.len() == 2 => {
            let next = parts.remove(1);
            Ok((parts.remove(0), next))
        }
        other => Err(RuntimeError::shape(
            TraitName::Monad,
            "runState",
            "(value, state)",
            found(&other),
        )),
    }
}

fn register_state(registry: &mut TraitRegistry) -> RuntimeResult<()> {
    registry.register_instance(MethodTable::new(TraitName::Functor, TypeKey::State).with(
        "fmap",
        2,
        |_, _, mut args| {
            let computation = args.remove(1);
            let func = args.remove(0);
            Ok(state_fn("State.fmap", move |interp, ctx, state| {
                let (value, state) = run_state(interp, ctx, &computation, state)?;
                Ok((interp.apply(ctx, &func, vec![value])?, state))
            }))
        },
    ))?;
    registry.register_instance(
        MethodTable::new(TraitName::Applicative, TypeKey::State)
            .with("pure", 1, |_, _, mut args| {
                let value = args.remove(0);
                Ok(state_fn("State.pure", move |_, _, state| Ok((value.clone(), state))))
            })
            .with("<*>", 2, |_, _, mut args| {
                let item = args.remove(1);
                let func = args.remove(0);
                Ok(state_fn("State.<*>", move |interp, ctx, state| {
                    let (f, state) = run_state(interp, ctx, &func, state)?;
                    let (x, state) = run_state(interp, ctx, &item, state)?;
                    Ok((interp.apply(ctx, &f, vec![x])?, state))
                }))
            }),
    )?;
    registry.register_instance(MethodTable::new(TraitName::Monad, TypeKey::State).with(
        ">>=",
        2,
        |_, _, mut args| {
            let func = args.remove(1);
            let computation = args.remove(0);
            Ok(state_fn("State.>>=", move |interp, ctx, state| {
                let (value, state) = run_state(interp, ctx, &computation, state)?;
                let next = interp.apply(
                    &ctx.for_continuation(TypeExpr::named(STATE)),
                    &func,
                    vec![value],
                )?;
                run_state(interp, ctx, &next, state)
            }))
        },
    ))?;
    Ok(())
}

pub(crate) fn writer(value: Value, log: Value) -> Value {
    Value::data(WRITER, WRITER, vec![value, log])
}

pub(crate) fn writer_parts(
    trait_name: TraitName,
    method: &str,
    value: &Value,
) -> RuntimeResult<(Value, Value)> {
    match value.data_of(WRITER).map(|data| data.fields.as_slice()) {
        Some([inner, log]) => Ok((inner.clone(), log.clone())),
        _ => Err(RuntimeError::shape(trait_name, method, WRITER, found(value))),
    }
}

/// Appends two logs with the Semigroup instance of the left log's type.
fn combine_logs(
    interp: &Interpreter,
    ctx: &CallContext,
    left: Value,
    right: Value,
) -> RuntimeResult<Value> {
    let type_key = TypeKey::of(&left);
    let append = interp
        .resolve_method(ctx, &APPEND, &type_key)
        .ok_or_else(|| RuntimeError::DispatchMiss {
            trait_name: TraitName::Semigroup.to_string(),
            method: APPEND.display_name().to_string(),
            type_name: type_key.to_string(),
        })?;
    interp.invoke(&ctx.nested(), &append, vec![left, right])
}

/// Type of the log a `Writer` pure should start from. The witness stack is
/// read innermost first across Monoid and `Applicative (Writer W)` entries.
fn writer_log_type(interp: &Interpreter, ctx: &CallContext) -> Option<TypeExpr> {
    let monoid = |entry: &WitnessEntry| {
        entry
            .candidates
            .iter()
            .map(|ty| interp.expand_aliases(ty))
            .find(|ty| ty.head().is_some())
    };
    let applicative_writer = |entry: &WitnessEntry| {
        entry
            .candidates
            .iter()
            .map(|ty| interp.expand_aliases(ty))
            .find_map(|ty| log_of_writer(&ty))
    };
    ctx.annotated(TraitName::Monoid)
        .and_then(monoid)
        .or_else(|| ctx.annotated(TraitName::Applicative).and_then(applicative_writer))
        .or_else(|| {
            ctx.witnesses().iter().find_map(|entry| match entry.trait_name {
                TraitName::Monoid => monoid(entry),
                TraitName::Applicative => applicative_writer(entry),
                _ => None,
            })
        })
        .or_else(|| {
            interp
                .inferred_type(ctx)
                .and_then(|ty| log_of_writer(&ty))
        })
        .or_else(|| ctx.container().and_then(log_of_writer))
}

fn log_of_writer(ty: &TypeExpr) -> Option<TypeExpr> {
    if ty.head() != Some(WRITER) {
        return None;
    }
    ty.args().first().filter(|log| log.head().is_some()).cloned()
}

fn writer_pure(interp: &Interpreter, ctx: &CallContext, value: Value) -> RuntimeResult<Value> {
    if let Some(mempty) = ctx
        .dictionary()
        .and_then(|dictionary| dictionary.method(MEMPTY.name))
    {
        trace!("writer log identity from explicit dictionary");
        let log = interp.apply(&ctx.nested(), &mempty, Vec::new())?;
        return Ok(writer(value, log));
    }
    let log_type = writer_log_type(interp, ctx)
        .ok_or_else(|| RuntimeError::witness_unresolved(TraitName::Applicative, "pure"))?;
    trace!(%log_type, "writer log identity from witness");
    let scoped = ctx
        .nested()
        .with_type_witness(TraitName::Monoid, log_type);
    let log = interp.dispatch(&scoped, &MEMPTY, Vec::new())?;
    Ok(writer(value, log))
}

fn register_writer(registry: &mut TraitRegistry) -> RuntimeResult<()> {
    registry.register_instance(MethodTable::new(TraitName::Functor, TypeKey::Writer).with(
        "fmap",
        2,
        |interp, ctx, args| {
            let (value, log) = writer_parts(TraitName::Functor, "fmap", &args[1])?;
            let mapped = interp.apply(&ctx.nested(), &args[0], vec![value])?;
            Ok(writer(mapped, log))
        },
    ))?;
    registry.register_instance(
        MethodTable::new(TraitName::Applicative, TypeKey::Writer)
            .with("pure", 1, |interp, ctx, mut args| {
                writer_pure(interp, ctx, args.remove(0))
            })
            .with("<*>", 2, |interp, ctx, args| {
                let (func, left) = writer_parts(TraitName::Applicative, "<*>", &args[0])?;
                let (item, right) = writer_parts(TraitName::Applicative, "<*>", &args[1])?;
                let value = interp.apply(&ctx.nested(), &func, vec![item])?;
                Ok(writer(value, combine_logs(interp, ctx, left, right)?))
            }),
    )?;
    registry.register_instance(MethodTable::new(TraitName::Monad, TypeKey::Writer).with(
        ">>=",
        2,
        |interp, ctx, args| {
            let (value, left) = writer_parts(TraitName::Monad, ">>=", &args[0])?;
            let cont = ctx.for_continuation(runtime_type(&args[0]));
            let produced = interp.apply(&cont, &args[1], vec![value])?;
            let (next, right) = writer_parts(TraitName::Monad, ">>=", &produced)?;
            Ok(writer(next, combine_logs(interp, ctx, left, right)?))
        },
    ))?;
    Ok(())
}
