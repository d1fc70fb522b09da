use std::sync::OnceLock;

use proptest::prelude::*;
use vigil_matchers::{
    all_of, any_of, anything, argument_count, has_argument, ignore_parens, instance_method,
    int_literal, is_array_type, is_primitive_type, is_same_type, is_subtype_of, kind_is, not,
    nothing, null_literal, parent_node, BoxMatcher, Matcher, MatcherExt,
};
use vigil_query::CompilationContext;
use vigil_syntax::NodeKind;
use vigil_test_utils::{compile, JavaFixture};

const PROPTEST_CASES: u32 = 256;

const SOURCE: &str = r#"
    import java.util.*;
    class Sample {
        int[] values = new int[3];
        String label = null;
        boolean check(List<String> items, Object other) {
            int total = (values.length + 1) * 2;
            items.add(label);
            return other.equals(items) || total > 4;
        }
    }
"#;

fn fixture() -> &'static JavaFixture {
    static FIXTURE: OnceLock<JavaFixture> = OnceLock::new();
    FIXTURE.get_or_init(|| compile(SOURCE))
}

fn base_matchers() -> Vec<BoxMatcher> {
    vec![
        anything().boxed(),
        nothing().boxed(),
        kind_is(NodeKind::Identifier).boxed(),
        kind_is(NodeKind::Literal).boxed(),
        kind_is(NodeKind::MethodInvocation).boxed(),
        is_primitive_type().boxed(),
        is_array_type().boxed(),
        is_same_type("java.lang.String").boxed(),
        is_subtype_of("java.util.Collection").boxed(),
        int_literal(1).boxed(),
        null_literal().boxed(),
        argument_count(1).boxed(),
        has_argument(kind_is(NodeKind::Identifier)).boxed(),
        instance_method().named("equals").boxed(),
        parent_node(kind_is(NodeKind::Binary)).boxed(),
        ignore_parens(kind_is(NodeKind::Binary)).boxed(),
    ]
}

fn arb_index() -> impl Strategy<Value = usize> {
    0..base_matchers().len()
}

/// Evaluates `check` on every node of the sample unit.
fn for_every_node(check: impl Fn(vigil_syntax::NodeRef<'_>, &vigil_query::Context<'_>)) {
    let f = fixture();
    let comp = CompilationContext::new(f.store());
    let ctx = comp.context(f.unit());
    for node in f.unit().root().descendants() {
        check(node, &ctx);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(PROPTEST_CASES))]

    #[test]
    fn all_of_is_conjunction(a in arb_index(), b in arb_index()) {
        let ms = base_matchers();
        let combined = all_of([ms[a].clone(), ms[b].clone()]);
        for_every_node(|node, ctx| {
            assert_eq!(
                combined.matches(node, ctx),
                ms[a].matches(node, ctx) && ms[b].matches(node, ctx)
            );
        });
    }

    #[test]
    fn any_of_is_disjunction(a in arb_index(), b in arb_index()) {
        let ms = base_matchers();
        let combined = any_of([ms[a].clone(), ms[b].clone()]);
        for_every_node(|node, ctx| {
            assert_eq!(
                combined.matches(node, ctx),
                ms[a].matches(node, ctx) || ms[b].matches(node, ctx)
            );
        });
    }

    #[test]
    fn double_negation_is_identity(a in arb_index()) {
        let ms = base_matchers();
        let twice = not(not(ms[a].clone()));
        for_every_node(|node, ctx| {
            assert_eq!(twice.matches(node, ctx), ms[a].matches(node, ctx));
        });
    }

    #[test]
    fn grouping_does_not_matter(a in arb_index(), b in arb_index(), c in arb_index()) {
        let ms = base_matchers();
        let left = ms[a].clone().and(ms[b].clone()).and(ms[c].clone());
        let right = ms[a].clone().and(ms[b].clone().and(ms[c].clone()));
        let flat = all_of([ms[a].clone(), ms[b].clone(), ms[c].clone()]);
        let either_left = ms[a].clone().or(ms[b].clone()).or(ms[c].clone());
        let either_flat = any_of([ms[a].clone(), ms[b].clone(), ms[c].clone()]);
        for_every_node(|node, ctx| {
            assert_eq!(left.matches(node, ctx), right.matches(node, ctx));
            assert_eq!(left.matches(node, ctx), flat.matches(node, ctx));
            assert_eq!(either_left.matches(node, ctx), either_flat.matches(node, ctx));
        });
    }
}

#[test]
fn matchers_are_shareable_across_threads() {
    let shared: BoxMatcher = all_of(base_matchers()).boxed();
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let shared = shared.clone();
            std::thread::spawn(move || {
                let f = fixture();
                let comp = CompilationContext::new(f.store());
                let ctx = comp.context(f.unit());
                f.unit()
                    .root()
                    .descendants()
                    .filter(|node| shared.matches(*node, &ctx))
                    .count()
            })
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), 0);
    }
}
