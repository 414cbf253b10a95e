use super::{annotated, boot, call, compose, int_fn, ints, spy};
use crate::runtime::{traits::TraitName, value::Value};

#[test]
fn functor_composition_holds_for_structural_carriers() {
    let interp = boot();
    let f = int_fn("inc", |n| n + 1);
    let g = int_fn("double", |n| n * 2);
    for carrier in [
        ints(&[1, 2, 3]),
        Value::some(Value::Int(4)),
        Value::zero(),
        Value::ok(Value::Int(5)),
        Value::fail(Value::string("no")),
    ] {
        let composed = call(
            &interp,
            "fmap",
            vec![compose(f.clone(), g.clone()), carrier.clone()],
        )
        .expect("fmap composed");
        let inner = call(&interp, "fmap", vec![f.clone(), carrier.clone()]).expect("fmap f");
        let chained = call(&interp, "fmap", vec![g.clone(), inner]).expect("fmap g");
        assert_eq!(composed, chained, "composition law for {carrier}");
    }
}

#[test]
fn functor_identity_holds() {
    let interp = boot();
    let id = int_fn("id", |n| n);
    for carrier in [ints(&[7, 8]), Value::some(Value::Int(1)), Value::ok(Value::Int(2))] {
        assert_eq!(
            call(&interp, "fmap", vec![id.clone(), carrier.clone()]).expect("fmap"),
            carrier
        );
    }
}

#[test]
fn list_ap_is_row_major() {
    let interp = boot();
    let funcs = Value::list(vec![int_fn("add10", |n| n + 10), int_fn("double", |n| n * 2)]);
    let out = call(&interp, "(<*>)", vec![funcs, ints(&[1, 2])]).expect("<*>");
    assert_eq!(out, ints(&[11, 12, 2, 4]));
}

#[test]
fn list_mempty_is_identity_for_append() {
    let interp = boot();
    let dictionary = interp.lookup("Monoid[List]").expect("Monoid[List]");
    let empty = call(&interp, "mempty", vec![dictionary]).expect("mempty");
    assert_eq!(empty, ints(&[]));

    let xs = ints(&[1, 2]);
    assert_eq!(
        call(&interp, "(<>)", vec![xs.clone(), empty.clone()]).expect("<>"),
        xs
    );
    assert_eq!(
        call(&interp, "(<>)", vec![empty, xs.clone()]).expect("<>"),
        xs
    );
}

#[test]
fn option_append_is_left_biased() {
    let interp = boot();
    let some = |n| Value::some(Value::Int(n));
    assert_eq!(
        call(&interp, "(<>)", vec![some(1), some(2)]).expect("<>"),
        some(1)
    );
    assert_eq!(
        call(&interp, "(<>)", vec![Value::zero(), some(2)]).expect("<>"),
        some(2)
    );
    assert_eq!(
        call(&interp, "(<>)", vec![Value::zero(), Value::zero()]).expect("<>"),
        Value::zero()
    );
}

#[test]
fn pure_then_bind_is_application() {
    let interp = boot();
    let to_option = Value::native("half", 1, |_, _, args| match &args[0] {
        Value::Int(n) if n % 2 == 0 => Ok(Value::some(Value::Int(n / 2))),
        _ => Ok(Value::zero()),
    });
    let to_result = Value::native("check", 1, |_, _, args| match &args[0] {
        Value::Int(n) if *n > 0 => Ok(Value::ok(Value::Int(*n))),
        other => Ok(Value::fail(other.clone())),
    });
    for (carrier, func) in [("Option", to_option), ("Result", to_result)] {
        let ctx = annotated(TraitName::Applicative, carrier);
        for x in [4, -3] {
            let lifted = interp
                .call(&ctx, "pure", vec![Value::Int(x)])
                .expect("pure");
            let bound = call(&interp, "(>>=)", vec![lifted, func.clone()]).expect(">>=");
            let direct = interp
                .apply(&ctx, &func, vec![Value::Int(x)])
                .expect("direct");
            assert_eq!(bound, direct, "left identity for {carrier} at {x}");
        }
    }
}

#[test]
fn failures_skip_callbacks() {
    let interp = boot();
    let failed = Value::fail(Value::string("boom"));
    let (func, calls) = spy();
    assert_eq!(
        call(&interp, "(>>=)", vec![failed.clone(), func.clone()]).expect(">>="),
        failed
    );
    assert_eq!(
        call(&interp, "fmap", vec![func, failed.clone()]).expect("fmap"),
        failed
    );
    assert_eq!(calls.get(), 0);
}

#[test]
fn option_ap_is_empty_when_either_side_is() {
    let interp = boot();
    let inc = int_fn("inc", |n| n + 1);
    assert_eq!(
        call(&interp, "(<*>)", vec![Value::some(inc.clone()), Value::zero()]).expect("<*>"),
        Value::zero()
    );
    assert_eq!(
        call(&interp, "(<*>)", vec![Value::zero(), Value::some(Value::Int(1))]).expect("<*>"),
        Value::zero()
    );
    assert_eq!(
        call(&interp, "(<*>)", vec![Value::some(inc), Value::some(Value::Int(1))]).expect("<*>"),
        Value::some(Value::Int(2))
    );
}

#[test]
fn list_bind_flattens_in_order() {
    let interp = boot();
    let twice = Value::native("twice", 1, |_, _, args| {
        Ok(Value::list(vec![args[0].clone(), args[0].clone()]))
    });
    assert_eq!(
        call(&interp, "(>>=)", vec![ints(&[1, 2]), twice]).expect(">>="),
        ints(&[1, 1, 2, 2])
    );
}
