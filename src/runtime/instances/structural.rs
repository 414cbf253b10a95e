use super::{expect_list, found, option_payload, result_payload, show_text};
use crate::runtime::{
    error::{RuntimeError, RuntimeResult},
    traits::{runtime_type, MethodTable, TraitName, TraitRegistry, TypeKey},
    value::{Value, OPTION, RESULT},
};
use std::rc::Rc;

pub fn register(registry: &mut TraitRegistry) -> RuntimeResult<()> {
    registry.register_default(
        MethodTable::new(TraitName::Show, TypeKey::User(Rc::from("_")))
            .with("show", 1, |_, _, args| Ok(Value::String(show_text(&args[0])))),
    );
    register_list(registry)?;
    register_string(registry)?;
    register_option(registry)?;
    register_result(registry)?;
    Ok(())
}

fn register_list(registry: &mut TraitRegistry) -> RuntimeResult<()> {
    registry.register_instance(
        MethodTable::new(TraitName::Show, TypeKey::List)
            .with("show", 1, |_, _, args| Ok(Value::String(show_text(&args[0])))),
    )?;
    registry.register_instance(MethodTable::new(TraitName::Empty, TypeKey::List).with(
        "isEmpty",
        1,
        |_, _, args| {
            let items = expect_list(TraitName::Empty, "isEmpty", &args[0])?;
            Ok(Value::Bool(items.is_empty()))
        },
    ))?;
    registry.register_instance(MethodTable::new(TraitName::Semigroup, TypeKey::List).with(
        "<>",
        2,
        |_, _, args| {
            let left = expect_list(TraitName::Semigroup, "<>", &args[0])?;
            let right = expect_list(TraitName::Semigroup, "<>", &args[1])?;
            let mut joined = Vec::with_capacity(left.len() + right.len());
            joined.extend(left.iter().cloned());
            joined.extend(right.iter().cloned());
            Ok(Value::list(joined))
        },
    ))?;
    registry.register_instance(
        MethodTable::new(TraitName::Monoid, TypeKey::List)
            .with("mempty", 0, |_, _, _| Ok(Value::list(Vec::new()))),
    )?;
    registry.register_instance(MethodTable::new(TraitName::Functor, TypeKey::List).with(
        "fmap",
        2,
        |interp, ctx, mut args| {
            let items = expect_list(TraitName::Functor, "fmap", &args[1])?;
            let func = args.remove(0);
            let inner = ctx.nested();
            let mapped = items
                .iter()
                .map(|item| interp.apply(&inner, &func, vec![item.clone()]))
                .collect::<RuntimeResult<Vec<_>>>()?;
            Ok(Value::list(mapped))
        },
    ))?;
    registry.register_instance(
        MethodTable::new(TraitName::Applicative, TypeKey::List)
            .with("pure", 1, |_, _, mut args| Ok(Value::list(vec![args.remove(0)])))
            .with("<*>", 2, |interp, ctx, args| {
                let funcs = expect_list(TraitName::Applicative, "<*>", &args[0])?;
                let items = expect_list(TraitName::Applicative, "<*>", &args[1])?;
                let inner = ctx.nested();
                let mut out = Vec::with_capacity(funcs.len() * items.len());
                for func in funcs.iter() {
                    for item in items.iter() {
                        out.push(interp.apply(&inner, func, vec![item.clone()])?);
                    }
                }
                Ok(Value::list(out))
            }),
    )?;
    registry.register_instance(MethodTable::new(TraitName::Monad, TypeKey::List).with(
        ">>=",
        2,
        |interp, ctx, args| {
            let items = expect_list(TraitName::Monad, ">>=", &args[0])?;
            let cont = ctx.for_continuation(runtime_type(&args[0]));
            let mut out = Vec::new();
            for item in items.iter() {
                let produced = interp.apply(&cont, &args[1], vec![item.clone()])?;
                out.extend(expect_list(TraitName::Monad, ">>=", &produced)?.iter().cloned());
            }
            Ok(Value::list(out))
        },
    ))?;
    Ok(())
}

fn expect_string<'a>(trait_name: TraitName, method: &str, value: &'a Value) -> RuntimeResult<&'a str> {
    match value {
        Value::String(text) => Ok(text),
        other => Err(RuntimeError::shape(trait_name, method, "String", found(other))),
    }
}

fn register_string(registry: &mut TraitRegistry) -> RuntimeResult<()> {
    registry.register_instance(
        MethodTable::new(TraitName::Show, TypeKey::String)
            .with("show", 1, |_, _, args| Ok(Value::String(show_text(&args[0])))),
    )?;
    registry.register_instance(MethodTable::new(TraitName::Empty, TypeKey::String).with(
        "isEmpty",
        1,
        |_, _, args| {
            let text = expect_string(TraitName::Empty, "isEmpty", &args[0])?;
            Ok(Value::Bool(text.is_empty()))
        },
    ))?;
    registry.register_instance(MethodTable::new(TraitName::Semigroup, TypeKey::String).with(
        "<>",
        2,
        |_, _, args| {
            let left = expect_string(TraitName::Semigroup, "<>", &args[0])?;
            let right = expect_string(TraitName::Semigroup, "<>", &args[1])?;
            Ok(Value::String(format!("{left}{right}")))
        },
    ))?;
    registry.register_instance(
        MethodTable::new(TraitName::Monoid, TypeKey::String)
            .with("mempty", 0, |_, _, _| Ok(Value::string(""))),
    )?;
    Ok(())
}

fn register_option(registry: &mut TraitRegistry) -> RuntimeResult<()> {
    registry.register_instance(MethodTable::new(TraitName::Empty, TypeKey::Option).with(
        "isEmpty",
        1,
        |_, _, args| {
            let payload = option_payload(TraitName::Empty, "isEmpty", &args[0])?;
            Ok(Value::Bool(payload.is_none()))
        },
    ))?;
    registry.register_instance(MethodTable::new(TraitName::Semigroup, TypeKey::Option).with(
        "<>",
        2,
        |_, _, mut args| {
            let left = option_payload(TraitName::Semigroup, "<>", &args[0])?;
            option_payload(TraitName::Semigroup, "<>", &args[1])?;
            Ok(if left.is_some() {
                args.swap_remove(0)
            } else {
                args.remove(1)
            })
        },
    ))?;
    registry.register_instance(
        MethodTable::new(TraitName::Monoid, TypeKey::Option)
            .with("mempty", 0, |_, _, _| Ok(Value::zero())),
    )?;
    registry.register_instance(MethodTable::new(TraitName::Functor, TypeKey::Option).with(
        "fmap",
        2,
        |interp, ctx, mut args| match option_payload(TraitName::Functor, "fmap", &args[1])? {
            Some(inner) => Ok(Value::some(interp.apply(&ctx.nested(), &args[0], vec![inner])?)),
            None => Ok(args.remove(1)),
        },
    ))?;
    registry.register_instance(
        MethodTable::new(TraitName::Applicative, TypeKey::Option)
            .with("pure", 1, |_, _, mut args| Ok(Value::some(args.remove(0))))
            .with("<*>", 2, |interp, ctx, args| {
                let func = option_payload(TraitName::Applicative, "<*>", &args[0])?;
                let item = option_payload(TraitName::Applicative, "<*>", &args[1])?;
                match (func, item) {
                    (Some(func), Some(item)) => {
                        Ok(Value::some(interp.apply(&ctx.nested(), &func, vec![item])?))
                    }
                    _ => Ok(Value::zero()),
                }
            }),
    )?;
    registry.register_instance(MethodTable::new(TraitName::Monad, TypeKey::Option).with(
        ">>=",
        2,
        |interp, ctx, mut args| match option_payload(TraitName::Monad, ">>=", &args[0])? {
            Some(inner) => {
                let cont = ctx.for_continuation(runtime_type(&args[0]));
                let produced = interp.apply(&cont, &args[1], vec![inner])?;
                option_payload(TraitName::Monad, ">>=", &produced)?;
                Ok(produced)
            }
            None => Ok(args.remove(0)),
        },
    ))?;
    registry.register_instance(
        MethodTable::new(TraitName::Optional, TypeKey::Option)
            .with("isEmpty", 1, |_, _, args| {
                let payload = option_payload(TraitName::Optional, "isEmpty", &args[0])?;
                Ok(Value::Bool(payload.is_none()))
            })
            .with("unwrap", 1, |_, _, args| {
                option_payload(TraitName::Optional, "unwrap", &args[0])?.ok_or_else(|| {
                    RuntimeError::UnwrapEmpty {
                        trait_name: TraitName::Optional.to_string(),
                        type_name: OPTION.to_string(),
                    }
                })
            })
            .with("wrap", 1, |_, _, mut args| Ok(Value::some(args.remove(0))))
            .with("??", 2, |_, _, mut args| {
                match option_payload(TraitName::Optional, "??", &args[0])? {
                    Some(inner) => Ok(inner),
                    None => Ok(args.remove(1)),
                }
            }),
    )?;
    Ok(())
}

fn register_result(registry: &mut TraitRegistry) -> RuntimeResult<()> {
    registry.register_instance(MethodTable::new(TraitName::Empty, TypeKey::Result).with(
        "isEmpty",
        1,
        |_, _, args| {
            let payload = result_payload(TraitName::Empty, "isEmpty", &args[0])?;
            Ok(Value::Bool(payload.is_err()))
        },
    ))?;
    registry.register_instance(MethodTable::new(TraitName::Functor, TypeKey::Result).with(
        "fmap",
        2,
        |interp, ctx, mut args| match result_payload(TraitName::Functor, "fmap", &args[1])? {
            Ok(inner) => Ok(Value::ok(interp.apply(&ctx.nested(), &args[0], vec![inner])?)),
            Err(_) => Ok(args.remove(1)),
        },
    ))?;
    registry.register_instance(
        MethodTable::new(TraitName::Applicative, TypeKey::Result)
            .with("pure", 1, |_, _, mut args| Ok(Value::ok(args.remove(0))))
            .with("<*>", 2, |interp, ctx, mut args| {
                let func = match result_payload(TraitName::Applicative, "<*>", &args[0])? {
                    Ok(func) => func,
                    Err(_) => return Ok(args.swap_remove(0)),
                };
                match result_payload(TraitName::Applicative, "<*>", &args[1])? {
                    Ok(item) => Ok(Value::ok(interp.apply(&ctx.nested(), &func, vec![item])?)),
                    Err(_) => Ok(args.remove(1)),
                }
            }),
    )?;
    registry.register_instance(MethodTable::new(TraitName::Monad, TypeKey::Result).with(
        ">>=",
        2,
        |interp, ctx, mut args| match result_payload(TraitName::Monad, ">>=", &args[0])? {
            Ok(inner) => {
                let cont = ctx.for_continuation(runtime_type(&args[0]));
                let produced = interp.apply(&cont, &args[1], vec![inner])?;
                result_payload(TraitName::Monad, ">>=", &produced)?;
                Ok(produced)
            }
            Err(_) => Ok(args.remove(0)),
        },
    ))?;
    registry.register_instance(
        MethodTable::new(TraitName::Optional, TypeKey::Result)
            .with("isEmpty", 1, |_, _, args| {
                let payload = result_payload(TraitName::Optional, "isEmpty", &args[0])?;
                Ok(Value::Bool(payload.is_err()))
            })
            .with("unwrap", 1, |_, _, args| {
                result_payload(TraitName::Optional, "unwrap", &args[0])?.map_err(|_| {
                    RuntimeError::UnwrapEmpty {
                        trait_name: TraitName::Optional.to_string(),
                        type_name: RESULT.to_string(),
                    }
                })
            })
            .with("wrap", 1, |_, _, mut args| Ok(Value::ok(args.remove(0))))
            .with("??", 2, |_, _, mut args| {
                match result_payload(TraitName::Optional, "??", &args[0])? {
                    Ok(inner) => Ok(inner),
                    Err(_) => Ok(args.remove(1)),
                }
            }),
    )?;
    Ok(())
}
