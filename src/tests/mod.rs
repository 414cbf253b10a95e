mod laws;
mod transformers;

use crate::language::facts::{CallSiteId, WitnessEntry};
use crate::language::parser::parse_type;
use crate::runtime::{
    context::{CallContext, CallSite},
    error::{RuntimeError, RuntimeResult},
    traits::TraitName,
    value::Value,
    Interpreter,
};
use std::cell::Cell;
use std::rc::Rc;

pub(crate) fn boot() -> Interpreter {
    Interpreter::new().expect("interpreter boots")
}

pub(crate) fn call(interp: &Interpreter, name: &str, args: Vec<Value>) -> RuntimeResult<Value> {
    interp.call(&CallContext::new(), name, args)
}

pub(crate) fn annotated(trait_name: TraitName, ty: &str) -> CallContext {
    CallContext::at(
        CallSite::new(CallSiteId(0)).with_witness(WitnessEntry::single(
            trait_name,
            parse_type(ty).expect("witness type"),
        )),
    )
}

pub(crate) fn ints(values: &[i128]) -> Value {
    Value::list(values.iter().copied().map(Value::Int).collect())
}

pub(crate) fn int_fn(name: &str, f: fn(i128) -> i128) -> Value {
    Value::native(name, 1, move |_, _, args| match &args[0] {
        Value::Int(n) => Ok(Value::Int(f(*n))),
        other => Err(RuntimeError::TypeMismatch {
            message: format!("expected Int, found {other}"),
        }),
    })
}

pub(crate) fn compose(f: Value, g: Value) -> Value {
    Value::native("compose", 1, move |interp, ctx, args| {
        let inner = interp.apply(ctx, &f, args)?;
        interp.apply(ctx, &g, vec![inner])
    })
}

pub(crate) fn spy() -> (Value, Rc<Cell<usize>>) {
    let calls = Rc::new(Cell::new(0));
    let seen = calls.clone();
    let func = Value::native("spy", 1, move |_, _, mut args| {
        seen.set(seen.get() + 1);
        Ok(args.remove(0))
    });
    (func, calls)
}
