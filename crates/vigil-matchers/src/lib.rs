//! Composable predicates over attributed tree nodes.
//!
//! A [`Matcher`] answers one yes/no question about a node in the context of
//! its compilation. Matchers hold no per-compilation state: build them once
//! (typically when a checker is constructed) and share them across threads and
//! units. Names of types are resolved on every match through the
//! compilation's memoized lookups, so the same matcher works against any
//! [`vigil_types::TypeEnv`].
//!
//! Nodes without a resolved symbol or type never match a matcher that needs
//! one.

mod arguments;
mod combinators;
mod method;
mod nodes;

use vigil_query::Context;
use vigil_syntax::NodeRef;

pub use arguments::{
    argument, argument_count, argument_for_parameter, has_argument, receiver_of_invocation,
    receiver_same_as_argument, same_argument, Argument, ArgumentCount, ArgumentForParameter,
    HasArgument, ReceiverOfInvocation, ReceiverSameAsArgument, SameArgument,
};
pub use combinators::{
    all_of, any_of, anything, matcher, not, nothing, AllOf, And, AnyOf, BoxMatcher, Fixed,
    FnMatcher, MatcherExt, Not, Or,
};
pub use method::{any_method, constructor, instance_method, static_method, MethodMatcher};
pub use nodes::{
    binary_tree, boolean_literal, contains, enclosing_class, enclosing_method, has_annotation,
    has_modifier, ignore_parens, int_literal, is_array_type, is_boxed_primitive_type,
    is_primitive_type, is_same_type, is_static, is_subtype_of, is_void_type, kind_any_of, kind_is,
    method_has_arity, method_is_named, null_literal, parent_node, string_literal,
    symbol_has_annotation, BinaryTree, Contains, Enclosing, HasAnnotation, HasModifier,
    IgnoreParens, IsStatic, KindAnyOf, KindIs, Literal, MethodHasArity, MethodIsNamed, TypeIs,
    TypeShapeIs,
};

pub trait Matcher: Send + Sync {
    fn matches(&self, node: NodeRef<'_>, ctx: &Context<'_>) -> bool;
}
