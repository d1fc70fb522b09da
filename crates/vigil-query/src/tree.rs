//! Structural queries that only look at the tree.

use vigil_syntax::{BinaryOp, NodeData, NodeKind, NodeRef};

/// Unwraps any number of enclosing parentheses.
pub fn strip_parentheses(node: NodeRef<'_>) -> NodeRef<'_> {
    let mut current = node;
    while let NodeData::Parenthesized { expr } = current.data() {
        current = current.at(*expr);
    }
    current
}

/// The nearest proper ancestor of `node` with the given kind.
pub fn enclosing_node<'u>(node: NodeRef<'u>, kind: NodeKind) -> Option<NodeRef<'u>> {
    node.ancestors().find(|ancestor| ancestor.kind() == kind)
}

/// The class declaration (named or anonymous) that contains `node`.
pub fn enclosing_class(node: NodeRef<'_>) -> Option<NodeRef<'_>> {
    enclosing_node(node, NodeKind::Class)
}

/// The method or constructor whose body contains `node`.
///
/// Stops at the nearest class boundary: code in a field initializer of an
/// anonymous class has no enclosing method even if the class expression sits
/// inside one. Lambdas are looked through.
pub fn enclosing_method(node: NodeRef<'_>) -> Option<NodeRef<'_>> {
    for ancestor in node.ancestors() {
        match ancestor.kind() {
            NodeKind::Method => return Some(ancestor),
            NodeKind::Class => return None,
            _ => {}
        }
    }
    None
}

/// The explicit target of a call, field access or method reference.
///
/// `a.b()` gives `a`, `a.b` gives `a`, `A::m` gives `A`. Unqualified calls,
/// statically imported members and constructor calls have no receiver.
pub fn get_receiver(node: NodeRef<'_>) -> Option<NodeRef<'_>> {
    match node.data() {
        NodeData::MethodInvocation { method_select, .. } => match node.at(*method_select).data() {
            NodeData::MemberSelect { expr, .. } => Some(node.at(*expr)),
            _ => None,
        },
        NodeData::MemberSelect { expr, .. } | NodeData::MemberReference { expr, .. } => {
            Some(node.at(*expr))
        }
        _ => None,
    }
}

/// The called method's simple name for invocations and method references.
pub fn method_name(node: NodeRef<'_>) -> Option<&str> {
    match node.data() {
        NodeData::MethodInvocation { method_select, .. } => {
            node.at(*method_select).name().map(|name| name.as_str())
        }
        NodeData::MemberReference { name, .. } => Some(name.as_str()),
        _ => None,
    }
}

/// The operands of a binary node, `lhs` first.
pub fn binary_operands(node: NodeRef<'_>) -> Option<(BinaryOp, NodeRef<'_>, NodeRef<'_>)> {
    match node.data() {
        NodeData::Binary { op, lhs, rhs } => Some((*op, node.at(*lhs), node.at(*rhs))),
        _ => None,
    }
}

/// Matches the two operands of a binary node against `first` and `second` in
/// either order.
///
/// On success the operands are returned in predicate order: the one accepted
/// by `first`, then the one accepted by `second`. The source order is tried
/// first.
pub fn match_binary_tree<'u>(
    node: NodeRef<'u>,
    mut first: impl FnMut(NodeRef<'u>) -> bool,
    mut second: impl FnMut(NodeRef<'u>) -> bool,
) -> Option<[NodeRef<'u>; 2]> {
    let (_, lhs, rhs) = binary_operands(node)?;
    if first(lhs) && second(rhs) {
        return Some([lhs, rhs]);
    }
    if first(rhs) && second(lhs) {
        return Some([rhs, lhs]);
    }
    None
}

/// Is `node` an identifier spelled `this`?
pub fn is_this(node: NodeRef<'_>) -> bool {
    matches!(node.data(), NodeData::Identifier { name } if name == "this")
}
