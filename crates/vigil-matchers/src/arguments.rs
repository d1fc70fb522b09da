//! Matchers over the receiver and actual arguments of calls and instance
//! creations.
//!
//! Indices count actual arguments as written. For a varargs callee there can
//! be more actual arguments than formal parameters; use
//! [`argument_for_parameter`] to address a formal slot instead.

use vigil_query::{
    formal_parameter_index, get_receiver, is_this, same_variable, strip_parentheses, Context,
};
use vigil_syntax::{NodeKind, NodeRef};

use crate::Matcher;

fn actual_argument<'u>(node: NodeRef<'u>, index: usize) -> Option<NodeRef<'u>> {
    node.data().arguments().get(index).map(|&id| node.at(id))
}

fn same_value(a: NodeRef<'_>, b: NodeRef<'_>) -> bool {
    let (a, b) = (strip_parentheses(a), strip_parentheses(b));
    (is_this(a) && is_this(b)) || same_variable(a, b)
}

#[derive(Clone, Copy, Debug)]
pub struct Argument<M> {
    index: usize,
    inner: M,
}

impl<M: Matcher> Matcher for Argument<M> {
    fn matches(&self, node: NodeRef<'_>, ctx: &Context<'_>) -> bool {
        actual_argument(node, self.index).is_some_and(|arg| self.inner.matches(arg, ctx))
    }
}

/// The `index`-th actual argument matches `inner`.
pub fn argument<M: Matcher>(index: usize, inner: M) -> Argument<M> {
    Argument { index, inner }
}

#[derive(Clone, Copy, Debug)]
pub struct ArgumentCount(usize);

impl Matcher for ArgumentCount {
    fn matches(&self, node: NodeRef<'_>, _ctx: &Context<'_>) -> bool {
        matches!(node.kind(), NodeKind::MethodInvocation | NodeKind::NewClass)
            && node.data().arguments().len() == self.0
    }
}

pub fn argument_count(count: usize) -> ArgumentCount {
    ArgumentCount(count)
}

#[derive(Clone, Copy, Debug)]
pub struct HasArgument<M>(M);

impl<M: Matcher> Matcher for HasArgument<M> {
    fn matches(&self, node: NodeRef<'_>, ctx: &Context<'_>) -> bool {
        node.data()
            .arguments()
            .iter()
            .any(|&id| self.0.matches(node.at(id), ctx))
    }
}

/// Some actual argument matches `inner`.
pub fn has_argument<M: Matcher>(inner: M) -> HasArgument<M> {
    HasArgument(inner)
}

#[derive(Clone, Copy, Debug)]
pub struct ArgumentForParameter<M> {
    param: usize,
    inner: M,
}

impl<M: Matcher> Matcher for ArgumentForParameter<M> {
    fn matches(&self, node: NodeRef<'_>, ctx: &Context<'_>) -> bool {
        node.data().arguments().iter().any(|&id| {
            let arg = node.at(id);
            formal_parameter_index(ctx, node, arg) == Some(self.param)
                && self.inner.matches(arg, ctx)
        })
    }
}

/// Some actual argument passed for formal parameter `param` matches `inner`.
///
/// All trailing arguments of a varargs call are passed for the last formal.
pub fn argument_for_parameter<M: Matcher>(param: usize, inner: M) -> ArgumentForParameter<M> {
    ArgumentForParameter { param, inner }
}

#[derive(Clone, Copy, Debug)]
pub struct SameArgument(usize, usize);

impl Matcher for SameArgument {
    fn matches(&self, node: NodeRef<'_>, _ctx: &Context<'_>) -> bool {
        match (actual_argument(node, self.0), actual_argument(node, self.1)) {
            (Some(a), Some(b)) => same_value(a, b),
            _ => false,
        }
    }
}

/// Arguments `first` and `second` name the same variable.
pub fn same_argument(first: usize, second: usize) -> SameArgument {
    SameArgument(first, second)
}

#[derive(Clone, Copy, Debug)]
pub struct ReceiverOfInvocation<M>(M);

impl<M: Matcher> Matcher for ReceiverOfInvocation<M> {
    fn matches(&self, node: NodeRef<'_>, ctx: &Context<'_>) -> bool {
        get_receiver(node).is_some_and(|receiver| self.0.matches(receiver, ctx))
    }
}

/// The explicit receiver matches `inner`. Unqualified calls have none.
pub fn receiver_of_invocation<M: Matcher>(inner: M) -> ReceiverOfInvocation<M> {
    ReceiverOfInvocation(inner)
}

#[derive(Clone, Copy, Debug)]
pub struct ReceiverSameAsArgument(usize);

impl Matcher for ReceiverSameAsArgument {
    fn matches(&self, node: NodeRef<'_>, _ctx: &Context<'_>) -> bool {
        match (get_receiver(node), actual_argument(node, self.0)) {
            (Some(receiver), Some(arg)) => same_value(receiver, arg),
            _ => false,
        }
    }
}

/// `x.equals(x)`: the receiver and argument `index` are the same variable.
pub fn receiver_same_as_argument(index: usize) -> ReceiverSameAsArgument {
    ReceiverSameAsArgument(index)
}
