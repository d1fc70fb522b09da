use std::collections::{HashMap, HashSet, VecDeque};

use crate::{ClassId, ClassType, Type, TypeEnv, TypeVarId, WildcardBound};

/// Resolve `Type::Named` to a class type when the name is known.
pub fn canonicalize_named(env: &dyn TypeEnv, ty: &Type) -> Type {
    match ty {
        Type::Named(name) => match env.lookup_class(name) {
            Some(id) => Type::class(id, vec![]),
            None => Type::Unknown,
        },
        other => other.clone(),
    }
}

/// Replace type variables according to `subst`.
pub fn substitute(ty: &Type, subst: &HashMap<TypeVarId, Type>) -> Type {
    match ty {
        Type::TypeVar(id) => subst.get(id).cloned().unwrap_or_else(|| ty.clone()),
        Type::Class(ClassType { def, args }) => Type::class(
            *def,
            args.iter().map(|arg| substitute(arg, subst)).collect(),
        ),
        Type::Array(elem) => Type::array(substitute(elem, subst)),
        Type::Wildcard(WildcardBound::Extends(upper)) => {
            Type::Wildcard(WildcardBound::Extends(Box::new(substitute(upper, subst))))
        }
        Type::Wildcard(WildcardBound::Super(lower)) => {
            Type::Wildcard(WildcardBound::Super(Box::new(substitute(lower, subst))))
        }
        Type::Intersection(parts) => {
            Type::Intersection(parts.iter().map(|p| substitute(p, subst)).collect())
        }
        other => other.clone(),
    }
}

/// The direct supertypes of a class type, with the instantiation of `ty`
/// applied. A raw `ty` yields raw supertypes.
///
/// Interfaces (and classes without a declared superclass) report `Object`.
pub fn direct_supertypes(env: &dyn TypeEnv, ty: &Type) -> Vec<Type> {
    let ty = canonicalize_named(env, ty);
    let Type::Class(ClassType { def, args }) = ty else {
        return Vec::new();
    };
    let Some(class_def) = env.class(def) else {
        return Vec::new();
    };

    let object = env.well_known().object;
    let raw = args.is_empty() && !class_def.type_params.is_empty();
    let subst: HashMap<TypeVarId, Type> = class_def
        .type_params
        .iter()
        .copied()
        .enumerate()
        .map(|(idx, formal)| (formal, args.get(idx).cloned().unwrap_or(Type::Unknown)))
        .collect();

    let view = |super_ty: &Type| -> Option<Type> {
        let resolved = canonicalize_named(env, super_ty);
        match resolved {
            Type::Class(ClassType { def, .. }) if raw => Some(Type::class(def, vec![])),
            Type::Class(_) => Some(canonicalize_named(env, &substitute(&resolved, &subst))),
            _ => None,
        }
    };

    let mut out = Vec::with_capacity(1 + class_def.interfaces.len());
    match &class_def.super_class {
        Some(sc) => out.extend(view(sc)),
        None if def != object && !class_def.is_interface() => {
            out.push(Type::class(object, vec![]));
        }
        None => {}
    }
    out.extend(class_def.interfaces.iter().filter_map(view));
    if class_def.is_interface() {
        out.push(Type::class(object, vec![]));
    }
    out
}

/// Every class reachable from `class` through superclass and interface edges,
/// starting with `class` itself, in breadth-first order.
///
/// Each class is visited at most once, so cyclic hierarchies from broken code
/// terminate.
pub fn supertype_closure(env: &dyn TypeEnv, class: ClassId) -> Vec<ClassId> {
    let mut out = Vec::new();
    let mut seen = HashSet::new();
    let mut queue = VecDeque::from([class]);
    while let Some(current) = queue.pop_front() {
        if !seen.insert(current) {
            continue;
        }
        out.push(current);
        for sup in direct_supertypes(env, &Type::class(current, vec![])) {
            if let Some(id) = sup.class_id() {
                queue.push_back(id);
            }
        }
    }
    out
}

/// Return `ty` viewed as `target` by walking the supertype graph and applying
/// type argument substitution along the way.
///
/// Example: `ArrayList<String>` instantiated as `List` returns `List<String>`.
pub fn instantiate_as_supertype(env: &dyn TypeEnv, ty: &Type, target: ClassId) -> Option<Type> {
    fn inner(
        env: &dyn TypeEnv,
        ty: &Type,
        target: ClassId,
        seen_type_vars: &mut HashSet<TypeVarId>,
    ) -> Option<Type> {
        match ty {
            Type::Array(_) => {
                let wk = env.well_known();
                if target == wk.object || target == wk.cloneable || target == wk.serializable {
                    return Some(Type::class(target, vec![]));
                }
                return None;
            }
            Type::Intersection(parts) => {
                return parts
                    .iter()
                    .find_map(|part| inner(env, part, target, seen_type_vars));
            }
            Type::TypeVar(id) => {
                if !seen_type_vars.insert(*id) {
                    return None;
                }
                let out = match env.type_param(*id) {
                    Some(tp) if !tp.upper_bounds.is_empty() => tp
                        .upper_bounds
                        .iter()
                        .find_map(|bound| inner(env, bound, target, seen_type_vars)),
                    _ => inner(env, &env.object_type(), target, seen_type_vars),
                };
                seen_type_vars.remove(id);
                return out;
            }
            _ => {}
        }

        let ty = canonicalize_named(env, ty);
        if !matches!(ty, Type::Class(_)) {
            return None;
        }

        let mut queue: VecDeque<Type> = VecDeque::from([ty]);
        let mut seen: HashSet<ClassId> = HashSet::new();
        while let Some(current) = queue.pop_front() {
            let Some(def) = current.class_id() else {
                continue;
            };
            if !seen.insert(def) {
                continue;
            }
            if def == target {
                return Some(current);
            }
            queue.extend(direct_supertypes(env, &current));
        }
        None
    }

    let mut seen_type_vars = HashSet::new();
    inner(env, ty, target, &mut seen_type_vars)
}
