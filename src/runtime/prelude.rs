//! Constructors, runners and effect primitives bound in the root scope.

use crate::runtime::{
    context::CallContext,
    dictionary::dictionary_from_values,
    environment::Environment,
    error::{RuntimeError, RuntimeResult},
    instances::{
        effects::{reader_fn, run_reader, run_state, state_fn, writer, writer_parts},
        found,
        transformers::{lift, Layer},
    },
    interpreter::Interpreter,
    traits::TraitName,
    value::{NativeFunction, Value, IDENTITY, READER, STATE},
};

type Builtin = fn(&Interpreter, &CallContext, Vec<Value>) -> RuntimeResult<Value>;

const BUILTINS: &[(&str, usize, Builtin)] = &[
    ("Some", 1, builtin_some),
    ("Ok", 1, builtin_ok),
    ("Fail", 1, builtin_fail),
    ("Identity", 1, builtin_identity),
    ("runIdentity", 1, builtin_run_identity),
    ("reader", 1, builtin_reader),
    ("runReader", 2, builtin_run_reader),
    ("ask", 0, builtin_ask),
    ("asks", 1, builtin_asks),
    ("local", 2, builtin_local),
    ("state", 1, builtin_state),
    ("runState", 2, builtin_run_state),
    ("evalState", 2, builtin_eval_state),
    ("execState", 2, builtin_exec_state),
    ("sGet", 0, builtin_s_get),
    ("sPut", 1, builtin_s_put),
    ("sModify", 1, builtin_s_modify),
    ("writer", 2, builtin_writer),
    ("runWriter", 1, builtin_run_writer),
    ("execWriter", 1, builtin_exec_writer),
    ("wTell", 1, builtin_w_tell),
    ("optionT", 1, builtin_option_t),
    ("runOptionT", 1, builtin_run_option_t),
    ("liftOptionT", 1, builtin_lift_option_t),
    ("resultT", 1, builtin_result_t),
    ("runResultT", 1, builtin_run_result_t),
    ("liftResultT", 1, builtin_lift_result_t),
    ("inspect", 1, builtin_inspect),
    ("__dictionary", 3, builtin_dictionary),
];

pub fn install(env: &mut Environment) -> RuntimeResult<()> {
    env.declare("Zero", Value::zero())?;
    for (name, arity, func) in BUILTINS {
        env.declare(name, NativeFunction::new(name, *arity, *func).to_value())?;
    }
    Ok(())
}

fn expect_callable(name: &str, value: Value) -> RuntimeResult<Value> {
    if value.is_callable() {
        Ok(value)
    } else {
        Err(RuntimeError::TypeMismatch {
            message: format!("{name} expects a function, found {value}"),
        })
    }
}

fn builtin_some(_: &Interpreter, _: &CallContext, mut args: Vec<Value>) -> RuntimeResult<Value> {
    Ok(Value::some(args.remove(0)))
}

fn builtin_ok(_: &Interpreter, _: &CallContext, mut args: Vec<Value>) -> RuntimeResult<Value> {
    Ok(Value::ok(args.remove(0)))
}

fn builtin_fail(_: &Interpreter, _: &CallContext, mut args: Vec<Value>) -> RuntimeResult<Value> {
    Ok(Value::fail(args.remove(0)))
}

fn builtin_identity(_: &Interpreter, _: &CallContext, mut args: Vec<Value>) -> RuntimeResult<Value> {
    Ok(Value::identity(args.remove(0)))
}

fn builtin_run_identity(
    _: &Interpreter,
    _: &CallContext,
    args: Vec<Value>,
) -> RuntimeResult<Value> {
    args[0]
        .data_of(IDENTITY)
        .and_then(|data| data.field(0))
        .cloned()
        .ok_or_else(|| RuntimeError::TypeMismatch {
            message: format!("runIdentity expects Identity, found {}", found(&args[0])),
        })
}

fn builtin_reader(_: &Interpreter, _: &CallContext, mut args: Vec<Value>) -> RuntimeResult<Value> {
    let func = expect_callable("reader", args.remove(0))?;
    Ok(Value::data(READER, READER, vec![func]))
}

fn builtin_run_reader(
    interp: &Interpreter,
    ctx: &CallContext,
    mut args: Vec<Value>,
) -> RuntimeResult<Value> {
    let env = args.remove(1);
    run_reader(interp, &ctx.nested(), &args[0], env)
}

fn builtin_ask(_: &Interpreter, _: &CallContext, _: Vec<Value>) -> RuntimeResult<Value> {
    Ok(reader_fn("ask", |_, _, env| Ok(env)))
}

fn builtin_asks(_: &Interpreter, _: &CallContext, mut args: Vec<Value>) -> RuntimeResult<Value> {
    let func = expect_callable("asks", args.remove(0))?;
    Ok(reader_fn("asks", move |interp, ctx, env| {
        interp.apply(ctx, &func, vec![env])
    }))
}

fn builtin_local(_: &Interpreter, _: &CallContext, mut args: Vec<Value>) -> RuntimeResult<Value> {
    let reader = args.remove(1);
    let func = expect_callable("local", args.remove(0))?;
    Ok(reader_fn("local", move |interp, ctx, env| {
        let env = interp.apply(ctx, &func, vec![env])?;
        run_reader(interp, ctx, &reader, env)
    }))
}

fn builtin_state(_: &Interpreter, _: &CallContext, mut args: Vec<Value>) -> RuntimeResult<Value> {
    let func = expect_callable("state", args.remove(0))?;
    Ok(Value::data(STATE, STATE, vec![func]))
}

fn builtin_run_state(
    interp: &Interpreter,
    ctx: &CallContext,
    mut args: Vec<Value>,
) -> RuntimeResult<Value> {
    let initial = args.remove(1);
    let (value, state) = run_state(interp, &ctx.nested(), &args[0], initial)?;
    Ok(Value::pair(value, state))
}

fn builtin_eval_state(
    interp: &Interpreter,
    ctx: &CallContext,
    mut args: Vec<Value>,
) -> RuntimeResult<Value> {
    let initial = args.remove(1);
    Ok(run_state(interp, &ctx.nested(), &args[0], initial)?.0)
}

fn builtin_exec_state(
    interp: &Interpreter,
    ctx: &CallContext,
    mut args: Vec<Value>,
) -> RuntimeResult<Value> {
    let initial = args.remove(1);
    Ok(run_state(interp, &ctx.nested(), &args[0], initial)?.1)
}

fn builtin_s_get(_: &Interpreter, _: &CallContext, _: Vec<Value>) -> RuntimeResult<Value> {
    Ok(state_fn("sGet", |_, _, state| Ok((state.clone(), state))))
}

fn builtin_s_put(_: &Interpreter, _: &CallContext, mut args: Vec<Value>) -> RuntimeResult<Value> {
    let next = args.remove(0);
    Ok(state_fn("sPut", move |_, _, _| Ok((Value::Unit, next.clone()))))
}

fn builtin_s_modify(
    _: &Interpreter,
    _: &CallContext,
    mut args: Vec<Value>,
) -> RuntimeResult<Value> {
    let func = expect_callable("sModify", args.remove(0))?;
    Ok(state_fn("sModify", move |interp, ctx, state| {
        Ok((Value::Unit, interp.apply(ctx, &func, vec![state])?))
    }))
}

fn builtin_writer(_: &Interpreter, _: &CallContext, mut args: Vec<Value>) -> RuntimeResult<Value> {
    let log = args.remove(1);
    Ok(writer(args.remove(0), log))
}

fn builtin_run_writer(
    _: &Interpreter,
    _: &CallContext,
    args: Vec<Value>,
) -> RuntimeResult<Value> {
    let (value, log) = writer_parts(TraitName::Monad, "runWriter", &args[0])?;
    Ok(Value::pair(value, log))
}

fn builtin_exec_writer(
    _: &Interpreter,
    _: &CallContext,
    args: Vec<Value>,
) -> RuntimeResult<Value> {
    Ok(writer_parts(TraitName::Monad, "execWriter", &args[0])?.1)
}

fn builtin_w_tell(_: &Interpreter, _: &CallContext, mut args: Vec<Value>) -> RuntimeResult<Value> {
    Ok(writer(Value::Unit, args.remove(0)))
}

fn builtin_option_t(_: &Interpreter, _: &CallContext, mut args: Vec<Value>) -> RuntimeResult<Value> {
    Ok(Layer::Option.wrap(args.remove(0)))
}

fn builtin_run_option_t(
    _: &Interpreter,
    _: &CallContext,
    args: Vec<Value>,
) -> RuntimeResult<Value> {
    Layer::Option.unwrap(TraitName::Monad, "runOptionT", &args[0])
}

fn builtin_lift_option_t(
    interp: &Interpreter,
    ctx: &CallContext,
    mut args: Vec<Value>,
) -> RuntimeResult<Value> {
    lift(interp, ctx, Layer::Option, args.remove(0))
}

fn builtin_result_t(_: &Interpreter, _: &CallContext, mut args: Vec<Value>) -> RuntimeResult<Value> {
    Ok(Layer::Result.wrap(args.remove(0)))
}

fn builtin_run_result_t(
    _: &Interpreter,
    _: &CallContext,
    args: Vec<Value>,
) -> RuntimeResult<Value> {
    Layer::Result.unwrap(TraitName::Monad, "runResultT", &args[0])
}

fn builtin_lift_result_t(
    interp: &Interpreter,
    ctx: &CallContext,
    mut args: Vec<Value>,
) -> RuntimeResult<Value> {
    lift(interp, ctx, Layer::Result, args.remove(0))
}

fn builtin_inspect(_: &Interpreter, _: &CallContext, args: Vec<Value>) -> RuntimeResult<Value> {
    Ok(Value::String(args[0].to_string()))
}

fn builtin_dictionary(
    _: &Interpreter,
    _: &CallContext,
    args: Vec<Value>,
) -> RuntimeResult<Value> {
    dictionary_from_values(&args[0], &args[1], &args[2])
}

#[cfg(test)]
mod tests {
    use crate::runtime::{
        context::CallContext, error::RuntimeError, interpreter::Interpreter, value::Value,
    };

    fn increment() -> Value {
        Value::native("increment", 1, |_, _, args| match &args[0] {
            Value::Int(n) => Ok(Value::Int(n + 1)),
            other => Err(RuntimeError::TypeMismatch {
                message: format!("expected Int, found {other}"),
            }),
        })
    }

    #[test]
    fn reader_primitives_see_the_environment() {
        let interp = Interpreter::new().expect("boot");
        let ctx = CallContext::new();
        let ask = interp.call(&ctx, "ask", Vec::new()).expect("ask");
        let local = interp
            .call(&ctx, "local", vec![increment(), ask])
            .expect("local");
        assert_eq!(
            interp
                .call(&ctx, "runReader", vec![local, Value::Int(1)])
                .expect("runReader"),
            Value::Int(2)
        );
        let asks = interp.call(&ctx, "asks", vec![increment()]).expect("asks");
        assert_eq!(
            interp
                .call(&ctx, "runReader", vec![asks, Value::Int(9)])
                .expect("runReader"),
            Value::Int(10)
        );
    }

    #[test]
    fn state_runners_split_value_and_state() {
        let interp = Interpreter::new().expect("boot");
        let ctx = CallContext::new();
        let modify = interp
            .call(&ctx, "sModify", vec![increment()])
            .expect("sModify");
        assert_eq!(
            interp
                .call(&ctx, "execState", vec![modify.clone(), Value::Int(1)])
                .expect("execState"),
            Value::Int(2)
        );
        assert_eq!(
            interp
                .call(&ctx, "evalState", vec![modify, Value::Int(1)])
                .expect("evalState"),
            Value::Unit
        );
    }

    #[test]
    fn state_constructor_requires_a_function() {
        let interp = Interpreter::new().expect("boot");
        let err = interp
            .call(&CallContext::new(), "state", vec![Value::Int(1)])
            .unwrap_err();
        assert!(matches!(err, RuntimeError::TypeMismatch { .. }));
    }

    #[test]
    fn inspect_is_structural() {
        let interp = Interpreter::new().expect("boot");
        assert_eq!(
            interp
                .call(&CallContext::new(), "inspect", vec![Value::string("a")])
                .expect("inspect"),
            Value::string("\"a\"")
        );
    }
}
