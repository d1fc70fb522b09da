//! Target typing: the type an expression is converted to by its context.

use vigil_syntax::{BinaryOp, NodeData, NodeKind, NodeRef, UnaryOp};
use vigil_types::{erasure, is_assignable, PrimitiveType, Type, TypeEnv};

use crate::symbols::{get_symbol, get_type, receiver_type, symbol_type};
use crate::types::{binary_promotion, functional_method, member_type, unary_promotion};
use crate::{formal_parameter_index, Context};

/// The type an expression is being coerced into, and the node that imposes
/// it.
#[derive(Clone, Debug, PartialEq)]
pub struct TargetType<'u> {
    pub ty: Type,
    pub context: NodeRef<'u>,
}

/// Infers the target type of `expr` from its parent.
///
/// Covers assignment and initializer targets, `return` in methods and
/// lambdas, method and constructor arguments (varargs aware), conditional
/// joins, conditions, numeric and shift operands, array indices and
/// dimensions, array initializers, casts and `switch` labels. `None` when
/// the context imposes no type or the type is unknown.
pub fn target_type<'u>(ctx: &Context<'_>, expr: NodeRef<'u>) -> Option<TargetType<'u>> {
    let parent = expr.parent()?;
    let ty = target_in(ctx, expr, parent)?;
    if ty.is_errorish() {
        return None;
    }
    Some(TargetType {
        ty,
        context: parent,
    })
}

fn target_in(ctx: &Context<'_>, expr: NodeRef<'_>, parent: NodeRef<'_>) -> Option<Type> {
    let env = ctx.env();
    let id = expr.id();
    let boolean = || Some(Type::boolean());
    match parent.data() {
        NodeData::Parenthesized { .. } => target_type(ctx, parent).map(|t| t.ty),
        NodeData::Variable { init, .. } if *init == Some(id) => {
            get_type(parent).cloned()
        }
        NodeData::Assignment { lhs, rhs } if *rhs == id => get_type(parent.at(*lhs)).cloned(),
        NodeData::CompoundAssignment { op, lhs, rhs } if *rhs == id => {
            if op.is_shift() {
                return get_type(expr).and_then(|t| unary_promotion(env, t)).map(Type::Primitive);
            }
            get_type(parent.at(*lhs)).cloned()
        }
        NodeData::Return { expr: Some(e) } if *e == id => return_target(ctx, parent),
        NodeData::Lambda { body, .. } if *body == id => lambda_return(ctx, parent),
        NodeData::MethodInvocation { args, .. } | NodeData::NewClass { args, .. }
            if args.contains(&id) =>
        {
            argument_target(ctx, parent, expr)
        }
        NodeData::Conditional { cond, .. } if *cond == id => boolean(),
        NodeData::Conditional { .. } => get_type(parent).cloned(),
        NodeData::If { cond, .. }
        | NodeData::While { cond, .. }
        | NodeData::DoWhile { cond, .. }
        | NodeData::Assert { cond, .. }
            if *cond == id =>
        {
            boolean()
        }
        NodeData::For { cond: Some(c), .. } if *c == id => boolean(),
        NodeData::Assert { detail: Some(d), .. } if *d == id => get_type(expr).cloned(),
        NodeData::Unary { op, .. } => match op {
            UnaryOp::Not => boolean(),
            UnaryOp::Plus | UnaryOp::Minus | UnaryOp::BitNot => {
                get_type(expr).and_then(|t| unary_promotion(env, t)).map(Type::Primitive)
            }
            _ => get_type(expr).cloned(),
        },
        NodeData::Binary { op, lhs, rhs } => {
            binary_target(ctx, parent, *op, expr, parent.at(*lhs), parent.at(*rhs))
        }
        NodeData::ArrayAccess { index, .. } if *index == id => Some(Type::int()),
        NodeData::NewArray { dims, init, .. } => {
            if dims.contains(&id) {
                return Some(Type::int());
            }
            if init.as_ref().is_some_and(|init| init.contains(&id)) {
                return get_type(parent)?.array_element().cloned();
            }
            None
        }
        NodeData::TypeCast { ty, expr: e } if *e == id => get_type(parent.at(*ty)).cloned(),
        NodeData::Switch { selector, .. } if *selector == id => get_type(expr).cloned(),
        NodeData::Case { labels, .. } if labels.contains(&id) => {
            let switch = parent.parent()?;
            match switch.data() {
                NodeData::Switch { selector, .. } => get_type(switch.at(*selector)).cloned(),
                _ => None,
            }
        }
        NodeData::Synchronized { lock, .. } if *lock == id => Some(env.object_type()),
        _ => None,
    }
}

fn return_target(ctx: &Context<'_>, ret: NodeRef<'_>) -> Option<Type> {
    for ancestor in ret.ancestors() {
        match ancestor.kind() {
            NodeKind::Lambda => return lambda_return(ctx, ancestor),
            NodeKind::Method => {
                let method = ancestor.symbol()?;
                return symbol_type(ctx, method);
            }
            NodeKind::Class => return None,
            _ => {}
        }
    }
    None
}

fn lambda_return(ctx: &Context<'_>, lambda: NodeRef<'_>) -> Option<Type> {
    let ty = get_type(lambda)?;
    let (_, _, ret) = functional_method(ctx.env(), ty)?;
    (ret != Type::Void).then_some(ret)
}

fn argument_target(ctx: &Context<'_>, call: NodeRef<'_>, arg: NodeRef<'_>) -> Option<Type> {
    let env = ctx.env();
    let method = get_symbol(call)?.as_method()?;
    let def = env.method(method)?;
    let slot = formal_parameter_index(ctx, call, arg)?;
    let declared = def.params.get(slot)?;
    let site = match call.kind() {
        NodeKind::NewClass => get_type(call).cloned(),
        _ => receiver_type(ctx, call),
    };
    let formal = match site {
        Some(site) => member_type(env, &site, method.owner, declared),
        None => declared.clone(),
    };
    // Method type variables are not inferred here; fall back to their bounds.
    let formal = if mentions_method_type_var(&formal, &def.type_params) {
        erasure(env, &formal)
    } else {
        formal
    };
    let position = call
        .data()
        .arguments()
        .iter()
        .position(|&a| a == arg.id())?;
    let is_last = slot + 1 == def.params.len();
    if def.is_varargs && is_last {
        let args = call.data().arguments().len();
        let passes_array = args == def.params.len()
            && get_type(arg).is_some_and(|t| is_assignable(env, t, &formal));
        if position >= slot && !passes_array {
            return formal.array_element().cloned();
        }
    }
    Some(formal)
}

fn mentions_method_type_var(ty: &Type, vars: &[vigil_types::TypeVarId]) -> bool {
    match ty {
        Type::TypeVar(v) => vars.contains(v),
        Type::Array(elem) => mentions_method_type_var(elem, vars),
        Type::Class(c) => c.args.iter().any(|a| mentions_method_type_var(a, vars)),
        Type::Wildcard(vigil_types::WildcardBound::Extends(b))
        | Type::Wildcard(vigil_types::WildcardBound::Super(b)) => {
            mentions_method_type_var(b, vars)
        }
        Type::Intersection(parts) => parts.iter().any(|p| mentions_method_type_var(p, vars)),
        _ => false,
    }
}

fn binary_target(
    ctx: &Context<'_>,
    binary: NodeRef<'_>,
    op: BinaryOp,
    expr: NodeRef<'_>,
    lhs: NodeRef<'_>,
    rhs: NodeRef<'_>,
) -> Option<Type> {
    let env = ctx.env();
    if op.is_conditional() {
        return Some(Type::boolean());
    }
    if op.is_shift() {
        return unary_promotion(env, get_type(expr)?).map(Type::Primitive);
    }
    let (l, r) = (get_type(lhs)?, get_type(rhs)?);
    if op == BinaryOp::Add && get_type(binary).is_some_and(|t| is_string(env, t)) {
        return Some(env.string_type());
    }
    let both_boolean = [l, r]
        .iter()
        .all(|t| crate::types::unboxed(env, t) == Some(PrimitiveType::Boolean));
    if both_boolean {
        return Some(Type::boolean());
    }
    if matches!(op, BinaryOp::Eq | BinaryOp::Ne) && !l.is_primitive() && !r.is_primitive() {
        // Reference comparison; no conversion happens.
        return Some(env.object_type());
    }
    binary_promotion(env, l, r).map(Type::Primitive)
}

fn is_string(env: &dyn TypeEnv, ty: &Type) -> bool {
    ty.class_id() == Some(env.well_known().string)
}
