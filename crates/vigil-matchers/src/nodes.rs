//! Matchers over a single node: its kind, type, symbol and surroundings.

use vigil_query::{
    get_symbol, get_type, has_annotation as symbol_annotated, is_static as symbol_is_static,
    match_binary_tree, strip_parentheses, symbol_modifiers, symbol_type, types, Context,
};
use vigil_syntax::{Constant, NodeData, NodeKind, NodeRef};
use vigil_types::{erasure, Modifier, Type};

use crate::Matcher;

/// The static type of an expression, or the declared type of a declaration.
pub(crate) fn node_type(ctx: &Context<'_>, node: NodeRef<'_>) -> Option<Type> {
    if let Some(ty) = get_type(node) {
        return Some(ty.clone());
    }
    if node.kind().is_declaration() {
        return symbol_type(ctx, get_symbol(node)?);
    }
    None
}

/// Resolves `name` in the current compilation and erases it.
pub(crate) fn erased_named(ctx: &Context<'_>, name: &str) -> Option<Type> {
    let ty = ctx.type_from_string(name)?;
    Some(erasure(ctx.env(), &ty))
}

pub(crate) fn is_exact_type(ctx: &Context<'_>, ty: &Type, name: &str) -> bool {
    erased_named(ctx, name)
        .is_some_and(|named| types::is_same_type(ctx, &erasure(ctx.env(), ty), &named))
}

pub(crate) fn is_descendant_of(ctx: &Context<'_>, ty: &Type, name: &str) -> bool {
    erased_named(ctx, name)
        .is_some_and(|named| types::is_subtype(ctx, &erasure(ctx.env(), ty), &named))
}

#[derive(Clone, Copy, Debug)]
pub struct KindIs(NodeKind);

impl Matcher for KindIs {
    fn matches(&self, node: NodeRef<'_>, _ctx: &Context<'_>) -> bool {
        node.kind() == self.0
    }
}

pub fn kind_is(kind: NodeKind) -> KindIs {
    KindIs(kind)
}

#[derive(Clone, Debug)]
pub struct KindAnyOf(Vec<NodeKind>);

impl Matcher for KindAnyOf {
    fn matches(&self, node: NodeRef<'_>, _ctx: &Context<'_>) -> bool {
        self.0.contains(&node.kind())
    }
}

pub fn kind_any_of(kinds: &[NodeKind]) -> KindAnyOf {
    KindAnyOf(kinds.to_vec())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TypeRelation {
    Same,
    Subtype,
}

/// Compares the erasure of a node's type with a named type.
#[derive(Clone, Debug)]
pub struct TypeIs {
    name: String,
    relation: TypeRelation,
}

impl Matcher for TypeIs {
    fn matches(&self, node: NodeRef<'_>, ctx: &Context<'_>) -> bool {
        let Some(ty) = node_type(ctx, node) else {
            return false;
        };
        match self.relation {
            TypeRelation::Same => is_exact_type(ctx, &ty, &self.name),
            TypeRelation::Subtype => is_descendant_of(ctx, &ty, &self.name),
        }
    }
}

/// The node's type erases to the type spelled `name`.
pub fn is_same_type(name: &str) -> TypeIs {
    TypeIs {
        name: name.to_string(),
        relation: TypeRelation::Same,
    }
}

/// The node's erased type is a subtype of the erased type spelled `name`.
pub fn is_subtype_of(name: &str) -> TypeIs {
    TypeIs {
        name: name.to_string(),
        relation: TypeRelation::Subtype,
    }
}

#[derive(Clone, Copy, Debug)]
enum TypeShape {
    Array,
    Primitive,
    BoxedPrimitive,
    Void,
}

#[derive(Clone, Copy, Debug)]
pub struct TypeShapeIs(TypeShape);

impl Matcher for TypeShapeIs {
    fn matches(&self, node: NodeRef<'_>, ctx: &Context<'_>) -> bool {
        let Some(ty) = node_type(ctx, node) else {
            return false;
        };
        match self.0 {
            TypeShape::Array => ty.is_array(),
            TypeShape::Primitive => ty.is_primitive(),
            TypeShape::BoxedPrimitive => types::is_boxed_primitive(ctx.env(), &ty),
            TypeShape::Void => matches!(ty, Type::Void),
        }
    }
}

pub fn is_array_type() -> TypeShapeIs {
    TypeShapeIs(TypeShape::Array)
}

pub fn is_primitive_type() -> TypeShapeIs {
    TypeShapeIs(TypeShape::Primitive)
}

pub fn is_boxed_primitive_type() -> TypeShapeIs {
    TypeShapeIs(TypeShape::BoxedPrimitive)
}

pub fn is_void_type() -> TypeShapeIs {
    TypeShapeIs(TypeShape::Void)
}

#[derive(Clone, Debug)]
pub struct HasAnnotation {
    name: String,
    inherited: bool,
}

impl Matcher for HasAnnotation {
    fn matches(&self, node: NodeRef<'_>, ctx: &Context<'_>) -> bool {
        let Some(symbol) = get_symbol(node) else {
            return false;
        };
        if self.inherited {
            return symbol_annotated(ctx, symbol, &self.name);
        }
        let Some(wanted) = ctx.class_by_name(&self.name) else {
            return false;
        };
        vigil_query::declared_annotations(ctx, symbol).contains(&wanted)
    }
}

/// The declared or referenced symbol carries the annotation, directly or
/// through an `@Inherited` annotation on a superclass.
pub fn has_annotation(name: &str) -> HasAnnotation {
    HasAnnotation {
        name: name.to_string(),
        inherited: true,
    }
}

/// The symbol itself is annotated; inheritance is not considered.
pub fn symbol_has_annotation(name: &str) -> HasAnnotation {
    HasAnnotation {
        name: name.to_string(),
        inherited: false,
    }
}

#[derive(Clone, Copy, Debug)]
pub struct HasModifier(Modifier);

impl Matcher for HasModifier {
    fn matches(&self, node: NodeRef<'_>, ctx: &Context<'_>) -> bool {
        get_symbol(node)
            .and_then(|symbol| symbol_modifiers(ctx, symbol))
            .or_else(|| node.data().modifiers())
            .is_some_and(|modifiers| modifiers.contains(self.0))
    }
}

pub fn has_modifier(modifier: Modifier) -> HasModifier {
    HasModifier(modifier)
}

#[derive(Clone, Copy, Debug)]
pub struct IsStatic;

impl Matcher for IsStatic {
    fn matches(&self, node: NodeRef<'_>, ctx: &Context<'_>) -> bool {
        get_symbol(node).is_some_and(|symbol| symbol_is_static(ctx, symbol))
    }
}

/// The node declares or refers to a static member.
pub fn is_static() -> IsStatic {
    IsStatic
}

#[derive(Clone, Copy, Debug)]
enum Surrounding {
    Parent,
    Class,
    Method,
}

#[derive(Clone, Copy, Debug)]
pub struct Enclosing<M> {
    which: Surrounding,
    inner: M,
}

impl<M: Matcher> Matcher for Enclosing<M> {
    fn matches(&self, node: NodeRef<'_>, ctx: &Context<'_>) -> bool {
        let target = match self.which {
            Surrounding::Parent => node.parent(),
            Surrounding::Class => vigil_query::enclosing_class(node),
            Surrounding::Method => vigil_query::enclosing_method(node),
        };
        target.is_some_and(|target| self.inner.matches(target, ctx))
    }
}

pub fn parent_node<M: Matcher>(inner: M) -> Enclosing<M> {
    Enclosing {
        which: Surrounding::Parent,
        inner,
    }
}

pub fn enclosing_class<M: Matcher>(inner: M) -> Enclosing<M> {
    Enclosing {
        which: Surrounding::Class,
        inner,
    }
}

pub fn enclosing_method<M: Matcher>(inner: M) -> Enclosing<M> {
    Enclosing {
        which: Surrounding::Method,
        inner,
    }
}

#[derive(Clone, Copy, Debug)]
pub struct IgnoreParens<M>(M);

impl<M: Matcher> Matcher for IgnoreParens<M> {
    fn matches(&self, node: NodeRef<'_>, ctx: &Context<'_>) -> bool {
        self.0.matches(strip_parentheses(node), ctx)
    }
}

pub fn ignore_parens<M: Matcher>(inner: M) -> IgnoreParens<M> {
    IgnoreParens(inner)
}

#[derive(Clone, Copy, Debug)]
pub struct Contains<M>(M);

impl<M: Matcher> Matcher for Contains<M> {
    fn matches(&self, node: NodeRef<'_>, ctx: &Context<'_>) -> bool {
        node.descendants()
            .skip(1)
            .any(|descendant| self.0.matches(descendant, ctx))
    }
}

/// Some node strictly below this one matches.
pub fn contains<M: Matcher>(inner: M) -> Contains<M> {
    Contains(inner)
}

#[derive(Clone, Debug)]
enum LiteralValue {
    String(String),
    Int(i32),
    Boolean(bool),
    Null,
}

#[derive(Clone, Debug)]
pub struct Literal(LiteralValue);

impl Matcher for Literal {
    fn matches(&self, node: NodeRef<'_>, _ctx: &Context<'_>) -> bool {
        let NodeData::Literal { value } = node.data() else {
            return false;
        };
        match (&self.0, value) {
            (LiteralValue::String(want), Some(Constant::String(got))) => want == got,
            (LiteralValue::Int(want), Some(Constant::Int(got))) => want == got,
            (LiteralValue::Boolean(want), Some(Constant::Bool(got))) => want == got,
            (LiteralValue::Null, None) => true,
            _ => false,
        }
    }
}

pub fn string_literal(value: &str) -> Literal {
    Literal(LiteralValue::String(value.to_string()))
}

pub fn int_literal(value: i32) -> Literal {
    Literal(LiteralValue::Int(value))
}

pub fn boolean_literal(value: bool) -> Literal {
    Literal(LiteralValue::Boolean(value))
}

pub fn null_literal() -> Literal {
    Literal(LiteralValue::Null)
}

#[derive(Clone, Debug)]
pub struct MethodIsNamed(String);

impl Matcher for MethodIsNamed {
    fn matches(&self, node: NodeRef<'_>, _ctx: &Context<'_>) -> bool {
        matches!(node.data(), NodeData::Method { name, .. } if name == self.0.as_str())
    }
}

/// A method declaration with the given name.
pub fn method_is_named(name: &str) -> MethodIsNamed {
    MethodIsNamed(name.to_string())
}

#[derive(Clone, Copy, Debug)]
pub struct MethodHasArity(usize);

impl Matcher for MethodHasArity {
    fn matches(&self, node: NodeRef<'_>, _ctx: &Context<'_>) -> bool {
        matches!(node.data(), NodeData::Method { params, .. } if params.len() == self.0)
    }
}

/// A method declaration with exactly `arity` formal parameters.
pub fn method_has_arity(arity: usize) -> MethodHasArity {
    MethodHasArity(arity)
}

#[derive(Clone, Copy, Debug)]
pub struct BinaryTree<A, B>(A, B);

impl<A: Matcher, B: Matcher> Matcher for BinaryTree<A, B> {
    fn matches(&self, node: NodeRef<'_>, ctx: &Context<'_>) -> bool {
        match_binary_tree(
            node,
            |operand| self.0.matches(operand, ctx),
            |operand| self.1.matches(operand, ctx),
        )
        .is_some()
    }
}

/// A binary expression whose operands match `first` and `second`, in either
/// order.
pub fn binary_tree<A: Matcher, B: Matcher>(first: A, second: B) -> BinaryTree<A, B> {
    BinaryTree(first, second)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_query::CompilationContext;
    use vigil_test_utils::compile;

    const SOURCE: &str = r#"
        import java.util.*;
        class Test {
            static final int LIMIT = 10;
            @Deprecated private String name = "vigil";
            int[] values = new int[3];
            Integer boxed = 4;
            void run(List<String> items, ArrayList<String> list) {
                boolean flag = true;
                Object nothing = null;
                if ((LIMIT + 1) > 2) { items.size(); }
                list.add(name);
            }
            int twice(int a, int b) { return a * 2; }
        }
    "#;

    #[test]
    fn kinds_and_types() {
        let f = compile(SOURCE);
        let comp = CompilationContext::new(f.store());
        let ctx = comp.context(f.unit());

        let list_param = f.find_starting(NodeKind::Variable, "List<String> items");
        assert!(is_same_type("java.util.List").matches(list_param, &ctx));
        assert!(is_subtype_of("java.util.Collection").matches(list_param, &ctx));
        assert!(!is_subtype_of("java.util.ArrayList").matches(list_param, &ctx));
        assert!(!is_same_type("com.example.Missing").matches(list_param, &ctx));

        let array_list = f.find_starting(NodeKind::Variable, "ArrayList<String> list");
        assert!(is_subtype_of("java.util.List").matches(array_list, &ctx));
        assert!(!is_same_type("java.util.List").matches(array_list, &ctx));

        assert!(is_array_type().matches(f.find_starting(NodeKind::Variable, "int[] values"), &ctx));
        let boxed = f.find_starting(NodeKind::Variable, "Integer boxed");
        assert!(is_boxed_primitive_type().matches(boxed, &ctx));
        assert!(is_primitive_type().matches(f.find(NodeKind::Literal, "4"), &ctx));
        assert!(is_void_type().matches(f.find_starting(NodeKind::Method, "void run"), &ctx));
        assert!(!is_void_type().matches(f.find_starting(NodeKind::Method, "int twice"), &ctx));

        let literal = f.find(NodeKind::Literal, "\"vigil\"");
        assert!(kind_is(NodeKind::Literal).matches(literal, &ctx));
        assert!(kind_any_of(&[NodeKind::Identifier, NodeKind::Literal]).matches(literal, &ctx));
        assert!(!kind_any_of(&[NodeKind::Identifier]).matches(literal, &ctx));
    }

    #[test]
    fn symbols_and_modifiers() {
        let f = compile(SOURCE);
        let comp = CompilationContext::new(f.store());
        let ctx = comp.context(f.unit());

        let name_field = f.find_starting(NodeKind::Variable, "@Deprecated private String name");
        assert!(has_annotation("java.lang.Deprecated").matches(name_field, &ctx));
        assert!(symbol_has_annotation("Deprecated").matches(name_field, &ctx));
        assert!(has_modifier(Modifier::Private).matches(name_field, &ctx));
        assert!(!is_static().matches(name_field, &ctx));

        let limit_use = f.find(NodeKind::Identifier, "LIMIT");
        assert!(is_static().matches(limit_use, &ctx));
        assert!(has_modifier(Modifier::Final).matches(limit_use, &ctx));

        let name_use = f.find(NodeKind::Identifier, "name");
        assert!(has_annotation("Deprecated").matches(name_use, &ctx));
    }

    #[test]
    fn literals() {
        let f = compile(SOURCE);
        let comp = CompilationContext::new(f.store());
        let ctx = comp.context(f.unit());
        assert!(string_literal("vigil").matches(f.find(NodeKind::Literal, "\"vigil\""), &ctx));
        assert!(!string_literal("other").matches(f.find(NodeKind::Literal, "\"vigil\""), &ctx));
        assert!(int_literal(10).matches(f.find(NodeKind::Literal, "10"), &ctx));
        assert!(boolean_literal(true).matches(f.find(NodeKind::Literal, "true"), &ctx));
        assert!(null_literal().matches(f.find(NodeKind::Literal, "null"), &ctx));
        assert!(!null_literal().matches(f.find(NodeKind::Literal, "true"), &ctx));
    }

    #[test]
    fn surroundings() {
        let f = compile(SOURCE);
        let comp = CompilationContext::new(f.store());
        let ctx = comp.context(f.unit());

        let size_call = f.find(NodeKind::MethodInvocation, "items.size()");
        assert!(parent_node(kind_is(NodeKind::ExpressionStatement)).matches(size_call, &ctx));
        assert!(enclosing_method(method_is_named("run")).matches(size_call, &ctx));
        assert!(!enclosing_method(method_is_named("twice")).matches(size_call, &ctx));
        assert!(enclosing_class(kind_is(NodeKind::Class)).matches(size_call, &ctx));
        assert!(!enclosing_class(has_modifier(Modifier::Static)).matches(size_call, &ctx));

        let condition = f.find(NodeKind::Parenthesized, "((LIMIT + 1) > 2)");
        assert!(!kind_is(NodeKind::Binary).matches(condition, &ctx));
        assert!(ignore_parens(kind_is(NodeKind::Binary)).matches(condition, &ctx));
        assert!(contains(int_literal(1)).matches(condition, &ctx));
        let two = f.find(NodeKind::Literal, "2");
        assert!(!contains(kind_is(NodeKind::Parenthesized)).matches(two, &ctx));

        let sum = f.find(NodeKind::Binary, "LIMIT + 1");
        assert!(binary_tree(int_literal(1), kind_is(NodeKind::Identifier)).matches(sum, &ctx));
        assert!(binary_tree(kind_is(NodeKind::Identifier), int_literal(1)).matches(sum, &ctx));
        assert!(!binary_tree(int_literal(1), int_literal(1)).matches(sum, &ctx));

        let twice = f.find_starting(NodeKind::Method, "int twice");
        assert!(method_has_arity(2).matches(twice, &ctx));
        assert!(!method_has_arity(1).matches(twice, &ctx));
    }

    #[test]
    fn unresolved_nodes_never_match() {
        let f = compile("class Test { void m() { undefined.call(); Missing x = null; } }");
        let comp = CompilationContext::new(f.store());
        let ctx = comp.context(f.unit());
        let call = f.find(NodeKind::MethodInvocation, "undefined.call()");
        assert!(!is_same_type("java.lang.Object").matches(call, &ctx));
        assert!(!is_subtype_of("java.lang.Object").matches(call, &ctx));
        assert!(!has_annotation("Deprecated").matches(call, &ctx));
        assert!(!is_static().matches(call, &ctx));
        let missing = f.find_starting(NodeKind::Variable, "Missing x");
        assert!(!is_subtype_of("java.lang.Object").matches(missing, &ctx));
    }
}
