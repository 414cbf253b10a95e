use super::{annotated, boot, call, int_fn, ints, spy};
use crate::language::types::TypeExpr;
use crate::runtime::{
    context::CallContext,
    error::RuntimeError,
    traits::TraitName,
    value::{Value, OPTION_T},
};

fn option_t(interp: &crate::runtime::Interpreter, inner: Value) -> Value {
    call(interp, "optionT", vec![inner]).expect("optionT")
}

#[test]
fn run_option_t_inverts_option_t() {
    let interp = boot();
    let m = Value::identity(Value::some(Value::Int(1)));
    let wrapped = option_t(&interp, m.clone());
    assert_eq!(call(&interp, "runOptionT", vec![wrapped]).expect("runOptionT"), m);
}

#[test]
fn option_t_over_identity_binds_like_option() {
    let interp = boot();
    let start = option_t(&interp, Value::identity(Value::some(Value::Int(1))));
    let step = Value::native("step", 1, |interp, ctx, args| match &args[0] {
        Value::Int(n) => interp.call(
            ctx,
            "optionT",
            vec![Value::identity(Value::some(Value::Int(n + 1)))],
        ),
        other => Err(RuntimeError::TypeMismatch {
            message: format!("expected Int, found {other}"),
        }),
    });
    let bound = call(&interp, "(>>=)", vec![start, step]).expect(">>=");
    assert_eq!(
        call(&interp, "runOptionT", vec![bound]).expect("runOptionT"),
        Value::identity(Value::some(Value::Int(2)))
    );
}

#[test]
fn empty_inner_value_short_circuits_bind() {
    let interp = boot();
    let (func, calls) = spy();
    let start = option_t(&interp, Value::identity(Value::zero()));
    let bound = call(&interp, "(>>=)", vec![start, func]).expect(">>=");
    assert_eq!(
        call(&interp, "runOptionT", vec![bound]).expect("runOptionT"),
        Value::identity(Value::zero())
    );
    assert_eq!(calls.get(), 0);

    let failed = call(
        &interp,
        "resultT",
        vec![Value::identity(Value::fail(Value::string("e")))],
    )
    .expect("resultT");
    let (func, calls) = spy();
    let bound = call(&interp, "(>>=)", vec![failed, func]).expect(">>=");
    assert_eq!(
        call(&interp, "runResultT", vec![bound]).expect("runResultT"),
        Value::identity(Value::fail(Value::string("e")))
    );
    assert_eq!(calls.get(), 0);
}

#[test]
fn fmap_maps_through_both_layers() {
    let interp = boot();
    let start = option_t(
        &interp,
        Value::list(vec![Value::some(Value::Int(1)), Value::zero()]),
    );
    let mapped = call(&interp, "fmap", vec![int_fn("inc", |n| n + 1), start]).expect("fmap");
    assert_eq!(
        call(&interp, "runOptionT", vec![mapped]).expect("runOptionT"),
        Value::list(vec![Value::some(Value::Int(2)), Value::zero()])
    );
}

#[test]
fn ap_combines_inner_layers_inside_m() {
    let interp = boot();
    let func = option_t(
        &interp,
        Value::identity(Value::some(int_fn("double", |n| n * 2))),
    );
    let item = option_t(&interp, Value::identity(Value::some(Value::Int(21))));
    let applied = call(&interp, "(<*>)", vec![func, item]).expect("<*>");
    assert_eq!(
        call(&interp, "runOptionT", vec![applied]).expect("runOptionT"),
        Value::identity(Value::some(Value::Int(42)))
    );

    let missing = option_t(&interp, Value::identity(Value::zero()));
    let func = option_t(
        &interp,
        Value::identity(Value::some(int_fn("double", |n| n * 2))),
    );
    let applied = call(&interp, "(<*>)", vec![func, missing]).expect("<*>");
    assert_eq!(
        call(&interp, "runOptionT", vec![applied]).expect("runOptionT"),
        Value::identity(Value::zero())
    );
}

#[test]
fn pure_finds_inner_monad_from_annotation() {
    let interp = boot();
    let ctx = annotated(TraitName::Applicative, "OptionT Identity");
    let out = interp.call(&ctx, "pure", vec![Value::Int(4)]).expect("pure");
    assert_eq!(
        out,
        Value::option_t(Value::identity(Value::some(Value::Int(4))))
    );

    let ctx = annotated(TraitName::Applicative, "ResultT (Writer (List Int))");
    let out = interp.call(&ctx, "pure", vec![Value::Int(4)]).expect("pure");
    let m = call(&interp, "runResultT", vec![out]).expect("runResultT");
    assert_eq!(
        call(&interp, "runWriter", vec![m]).expect("runWriter"),
        Value::pair(Value::ok(Value::Int(4)), ints(&[]))
    );
}

#[test]
fn pure_without_inner_monad_is_unresolved() {
    let interp = boot();
    let ctx = annotated(TraitName::Applicative, "OptionT");
    let err = interp.call(&ctx, "pure", vec![Value::Int(1)]).unwrap_err();
    assert_eq!(
        err,
        RuntimeError::witness_unresolved(TraitName::Applicative, "pure")
    );

    let dictionary = interp
        .lookup("Applicative[OptionT]")
        .expect("Applicative[OptionT]");
    let err = call(&interp, "pure", vec![dictionary, Value::Int(1)]).unwrap_err();
    assert_eq!(
        err,
        RuntimeError::witness_unresolved(TraitName::Applicative, "pure")
    );
}

#[test]
fn inner_monad_without_functor_is_reported() {
    let interp = boot();
    let start = option_t(&interp, Value::Int(3));
    let err = call(&interp, "fmap", vec![int_fn("inc", |n| n + 1), start]).unwrap_err();
    assert_eq!(
        err,
        RuntimeError::InnerCapabilityMissing {
            transformer: OPTION_T.to_string(),
            inner: "Int".to_string(),
            capability: "Functor.fmap".to_string(),
        }
    );
}

#[test]
fn result_t_over_state_threads_state() {
    let interp = boot();
    let get = call(&interp, "sGet", Vec::new()).expect("sGet");
    let lifted = call(&interp, "liftResultT", vec![get]).expect("liftResultT");
    let put_next = Value::native("putNext", 1, |interp, ctx, args| match &args[0] {
        Value::Int(n) => {
            let put = interp.call(ctx, "sPut", vec![Value::Int(n + 1)])?;
            interp.call(ctx, "liftResultT", vec![put])
        }
        other => Err(RuntimeError::TypeMismatch {
            message: format!("expected Int state, found {other}"),
        }),
    });
    let program = call(&interp, "(>>=)", vec![lifted, put_next]).expect(">>=");
    let inner = call(&interp, "runResultT", vec![program]).expect("runResultT");
    assert_eq!(
        call(&interp, "runState", vec![inner, Value::Int(5)]).expect("runState"),
        Value::pair(Value::ok(Value::Unit), Value::Int(6))
    );
}

#[test]
fn continuation_pure_targets_the_transformer() {
    let interp = boot();
    let start = option_t(&interp, Value::list(vec![Value::some(Value::Int(1))]));
    let lift_back = Value::native("liftBack", 1, |interp, ctx, args| {
        interp.call(ctx, "pure", vec![args[0].clone()])
    });
    let bound = call(&interp, "(>>=)", vec![start, lift_back]).expect(">>=");
    assert_eq!(
        call(&interp, "runOptionT", vec![bound]).expect("runOptionT"),
        Value::list(vec![Value::some(Value::Int(1))])
    );
}

#[test]
fn lift_option_t_wraps_every_inner_value() {
    let interp = boot();
    let lifted = call(&interp, "liftOptionT", vec![ints(&[1, 2])]).expect("liftOptionT");
    assert_eq!(
        call(&interp, "runOptionT", vec![lifted]).expect("runOptionT"),
        Value::list(vec![Value::some(Value::Int(1)), Value::some(Value::Int(2))])
    );
}

#[test]
fn empty_bind_over_writer_rebuilds_with_the_inner_log_type() {
    let interp = boot();
    let ctx = CallContext::new().with_type_witness(TraitName::Monoid, TypeExpr::named("String"));
    let inner = call(&interp, "writer", vec![Value::zero(), ints(&[1])]).expect("writer");
    let start = option_t(&interp, inner);
    let (func, calls) = spy();
    let bound = interp
        .call(&ctx, "(>>=)", vec![start, func])
        .expect(">>=");
    let m = call(&interp, "runOptionT", vec![bound]).expect("runOptionT");
    assert_eq!(
        call(&interp, "runWriter", vec![m]).expect("runWriter"),
        Value::pair(Value::zero(), ints(&[1]))
    );
    assert_eq!(calls.get(), 0);
}
