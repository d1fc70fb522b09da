use std::sync::Arc;

use vigil_query::Context;
use vigil_syntax::NodeRef;

use crate::Matcher;

/// A shared, type-erased matcher.
pub type BoxMatcher = Arc<dyn Matcher>;

impl<M: Matcher + ?Sized> Matcher for Arc<M> {
    fn matches(&self, node: NodeRef<'_>, ctx: &Context<'_>) -> bool {
        (**self).matches(node, ctx)
    }
}

impl<M: Matcher + ?Sized> Matcher for Box<M> {
    fn matches(&self, node: NodeRef<'_>, ctx: &Context<'_>) -> bool {
        (**self).matches(node, ctx)
    }
}

/// Adapts a closure; see [`matcher`].
#[derive(Clone, Copy)]
pub struct FnMatcher<F>(F);

impl<F> Matcher for FnMatcher<F>
where
    F: Fn(NodeRef<'_>, &Context<'_>) -> bool + Send + Sync,
{
    fn matches(&self, node: NodeRef<'_>, ctx: &Context<'_>) -> bool {
        (self.0)(node, ctx)
    }
}

/// Turns a closure into a [`Matcher`].
///
/// ```
/// use vigil_matchers::{matcher, Matcher};
/// use vigil_syntax::NodeKind;
///
/// let is_literal = matcher(|node, _ctx| node.kind() == NodeKind::Literal);
/// # let _ = &is_literal as &dyn Matcher;
/// ```
pub fn matcher<F>(f: F) -> FnMatcher<F>
where
    F: Fn(NodeRef<'_>, &Context<'_>) -> bool + Send + Sync,
{
    FnMatcher(f)
}

pub trait MatcherExt: Matcher + Sized + 'static {
    fn boxed(self) -> BoxMatcher {
        Arc::new(self)
    }

    fn and<M: Matcher>(self, other: M) -> And<Self, M> {
        And(self, other)
    }

    fn or<M: Matcher>(self, other: M) -> Or<Self, M> {
        Or(self, other)
    }
}

impl<M: Matcher + 'static> MatcherExt for M {}

#[derive(Clone, Copy, Debug)]
pub struct And<A, B>(A, B);

impl<A: Matcher, B: Matcher> Matcher for And<A, B> {
    fn matches(&self, node: NodeRef<'_>, ctx: &Context<'_>) -> bool {
        self.0.matches(node, ctx) && self.1.matches(node, ctx)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Or<A, B>(A, B);

impl<A: Matcher, B: Matcher> Matcher for Or<A, B> {
    fn matches(&self, node: NodeRef<'_>, ctx: &Context<'_>) -> bool {
        self.0.matches(node, ctx) || self.1.matches(node, ctx)
    }
}

#[derive(Clone)]
pub struct AllOf(Vec<BoxMatcher>);

impl Matcher for AllOf {
    fn matches(&self, node: NodeRef<'_>, ctx: &Context<'_>) -> bool {
        self.0.iter().all(|m| m.matches(node, ctx))
    }
}

/// True when every matcher is, evaluated left to right and stopping at the
/// first failure. An empty list matches everything.
pub fn all_of(matchers: impl IntoIterator<Item = BoxMatcher>) -> AllOf {
    AllOf(matchers.into_iter().collect())
}

#[derive(Clone)]
pub struct AnyOf(Vec<BoxMatcher>);

impl Matcher for AnyOf {
    fn matches(&self, node: NodeRef<'_>, ctx: &Context<'_>) -> bool {
        self.0.iter().any(|m| m.matches(node, ctx))
    }
}

/// True when some matcher is, stopping at the first success. An empty list
/// matches nothing.
pub fn any_of(matchers: impl IntoIterator<Item = BoxMatcher>) -> AnyOf {
    AnyOf(matchers.into_iter().collect())
}

#[derive(Clone, Copy, Debug)]
pub struct Not<M>(M);

impl<M: Matcher> Matcher for Not<M> {
    fn matches(&self, node: NodeRef<'_>, ctx: &Context<'_>) -> bool {
        !self.0.matches(node, ctx)
    }
}

pub fn not<M: Matcher>(inner: M) -> Not<M> {
    Not(inner)
}

#[derive(Clone, Copy, Debug)]
pub struct Fixed(bool);

impl Matcher for Fixed {
    fn matches(&self, _node: NodeRef<'_>, _ctx: &Context<'_>) -> bool {
        self.0
    }
}

pub fn anything() -> Fixed {
    Fixed(true)
}

pub fn nothing() -> Fixed {
    Fixed(false)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use vigil_query::CompilationContext;
    use vigil_syntax::NodeKind;
    use vigil_test_utils::compile;

    #[test]
    fn all_of_and_any_of_short_circuit_left_to_right() {
        let f = compile("class Test { int x = 1; }");
        let comp = CompilationContext::new(f.store());
        let ctx = comp.context(f.unit());
        let node = f.find(NodeKind::Literal, "1");

        let calls = Arc::new(AtomicUsize::new(0));
        let counting = {
            let calls = Arc::clone(&calls);
            matcher(move |_node, _ctx| {
                calls.fetch_add(1, Ordering::SeqCst);
                true
            })
        }
        .boxed();

        assert!(!all_of([nothing().boxed(), counting.clone()]).matches(node, &ctx));
        assert!(any_of([anything().boxed(), counting.clone()]).matches(node, &ctx));
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        assert!(all_of([anything().boxed(), counting.clone()]).matches(node, &ctx));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn empty_combinations() {
        let f = compile("class Test {}");
        let comp = CompilationContext::new(f.store());
        let ctx = comp.context(f.unit());
        let root = f.unit().root();
        assert!(all_of(Vec::new()).matches(root, &ctx));
        assert!(!any_of(Vec::new()).matches(root, &ctx));
        assert!(not(nothing()).matches(root, &ctx));
        assert!(anything().and(not(nothing())).matches(root, &ctx));
        assert!(nothing().or(anything()).matches(root, &ctx));
    }
}
