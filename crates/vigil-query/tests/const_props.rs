use pretty_assertions::assert_eq;
use proptest::prelude::*;
use vigil_query::{const_value, CompilationContext};
use vigil_syntax::{Constant, NodeKind};
use vigil_test_utils::compile;

fn fold(a: i32, op: &str, b: i32) -> i32 {
    match op {
        "+" => a.wrapping_add(b),
        "-" => a.wrapping_sub(b),
        "*" => a.wrapping_mul(b),
        "/" => a.wrapping_div(b),
        "%" => a.wrapping_rem(b),
        "&" => a & b,
        "|" => a | b,
        "^" => a ^ b,
        _ => unreachable!("unexpected operator {op}"),
    }
}

fn operator() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec!["+", "-", "*", "/", "%", "&", "|", "^"])
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn int_arithmetic_wraps_like_java(a in 0..=i32::MAX, b in 1..=i32::MAX, op in operator()) {
        let expr = format!("{a} {op} {b}");
        let f = compile(&format!("class T {{ int v = {expr}; }}"));
        let comp = CompilationContext::new(f.store());
        let ctx = comp.context(f.unit());
        assert_eq!(
            const_value(&ctx, f.find(NodeKind::Binary, &expr)),
            Some(Constant::Int(fold(a, op, b)))
        );
    }

    #[test]
    fn parameters_are_never_constant(b in 1..1000i32, op in operator()) {
        let expr = format!("p {op} {b}");
        let f = compile(&format!("class T {{ int m(int p) {{ return {expr}; }} }}"));
        let comp = CompilationContext::new(f.store());
        let ctx = comp.context(f.unit());
        assert_eq!(const_value(&ctx, f.find(NodeKind::Binary, &expr)), None);
    }
}
