//! Subtyping, type identity, erasure, castability and assignability.
//!
//! Every predicate answers `false` when either side is `Unknown`/`Error`, so
//! callers built on top of them skip code that did not fully resolve.

use std::collections::HashSet;

use crate::supertypes::{canonicalize_named, instantiate_as_supertype};
use crate::{ClassType, PrimitiveType, Type, TypeEnv, TypeVarId, WildcardBound};

pub fn boxed_class_name(primitive: PrimitiveType) -> &'static str {
    match primitive {
        PrimitiveType::Boolean => "java.lang.Boolean",
        PrimitiveType::Byte => "java.lang.Byte",
        PrimitiveType::Short => "java.lang.Short",
        PrimitiveType::Char => "java.lang.Character",
        PrimitiveType::Int => "java.lang.Integer",
        PrimitiveType::Long => "java.lang.Long",
        PrimitiveType::Float => "java.lang.Float",
        PrimitiveType::Double => "java.lang.Double",
    }
}

/// The box class type of `primitive`, if the environment defines it.
pub fn box_primitive(env: &dyn TypeEnv, primitive: PrimitiveType) -> Option<Type> {
    env.lookup_class(boxed_class_name(primitive))
        .map(|id| Type::class(id, vec![]))
}

/// The primitive type a box class unboxes to.
pub fn unbox_type(env: &dyn TypeEnv, ty: &Type) -> Option<PrimitiveType> {
    let def = canonicalize_named(env, ty).class_id()?;
    let name = env.class(def)?.name.as_str();
    PrimitiveType::ALL
        .into_iter()
        .find(|p| boxed_class_name(*p) == name)
}

/// Strict primitive widening (JLS 5.1.2); `from == to` is not a widening.
pub fn is_widening(from: PrimitiveType, to: PrimitiveType) -> bool {
    use PrimitiveType::*;
    matches!(
        (from, to),
        (Byte, Short | Int | Long | Float | Double)
            | (Short, Int | Long | Float | Double)
            | (Char, Int | Long | Float | Double)
            | (Int, Long | Float | Double)
            | (Long, Float | Double)
            | (Float, Double)
    )
}

/// Widenings that may lose precision.
pub fn is_lossy_widening(from: PrimitiveType, to: PrimitiveType) -> bool {
    use PrimitiveType::*;
    matches!((from, to), (Int, Float) | (Long, Float) | (Long, Double))
}

pub fn erasure(env: &dyn TypeEnv, ty: &Type) -> Type {
    fn erase(env: &dyn TypeEnv, ty: &Type, seen: &mut HashSet<TypeVarId>) -> Type {
        match canonicalize_named(env, ty) {
            Type::Class(ClassType { def, .. }) => Type::class(def, vec![]),
            Type::Array(elem) => Type::array(erase(env, &elem, seen)),
            Type::TypeVar(id) => {
                if !seen.insert(id) {
                    return env.object_type();
                }
                let bound = env
                    .type_param(id)
                    .and_then(|tp| tp.upper_bounds.first().cloned());
                let out = match bound {
                    Some(bound) => erase(env, &bound, seen),
                    None => env.object_type(),
                };
                seen.remove(&id);
                out
            }
            Type::Intersection(parts) => match parts.first() {
                Some(first) => erase(env, first, seen),
                None => env.object_type(),
            },
            Type::Wildcard(WildcardBound::Extends(upper)) => erase(env, &upper, seen),
            Type::Wildcard(_) => env.object_type(),
            other => other,
        }
    }

    erase(env, ty, &mut HashSet::new())
}

/// Structural type identity; wildcards compare by bound, intersections as sets.
pub fn is_same_type(env: &dyn TypeEnv, a: &Type, b: &Type) -> bool {
    let a = canonicalize_named(env, a);
    let b = canonicalize_named(env, b);
    if a.is_errorish() || b.is_errorish() {
        return false;
    }
    match (&a, &b) {
        (Type::Class(x), Type::Class(y)) => {
            x.def == y.def
                && x.args.len() == y.args.len()
                && x.args
                    .iter()
                    .zip(&y.args)
                    .all(|(l, r)| is_same_type(env, l, r))
        }
        (Type::Array(x), Type::Array(y)) => is_same_type(env, x, y),
        (Type::Wildcard(x), Type::Wildcard(y)) => match (x, y) {
            (WildcardBound::Unbounded, WildcardBound::Unbounded) => true,
            (WildcardBound::Extends(l), WildcardBound::Extends(r))
            | (WildcardBound::Super(l), WildcardBound::Super(r)) => is_same_type(env, l, r),
            _ => false,
        },
        (Type::Intersection(xs), Type::Intersection(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|x| ys.iter().any(|y| is_same_type(env, x, y)))
        }
        _ => a == b,
    }
}

/// `true` when both types have the same erasure.
pub fn is_same_erasure(env: &dyn TypeEnv, a: &Type, b: &Type) -> bool {
    is_same_type(env, &erasure(env, a), &erasure(env, b))
}

/// JLS 4.10 subtyping.
///
/// Reflexive and transitive; generic type arguments are invariant unless the
/// supertype uses a wildcard; a raw type is not a subtype of a parameterization
/// of the same class.
pub fn is_subtype(env: &dyn TypeEnv, sub: &Type, sup: &Type) -> bool {
    let mut seen = HashSet::new();
    subtype(env, sub, sup, &mut seen)
}

fn subtype(env: &dyn TypeEnv, s: &Type, t: &Type, seen: &mut HashSet<TypeVarId>) -> bool {
    let s = canonicalize_named(env, s);
    let t = canonicalize_named(env, t);
    if s.is_errorish() || t.is_errorish() {
        return false;
    }
    if is_same_type(env, &s, &t) {
        return true;
    }

    match (&s, &t) {
        (Type::Void, _) | (_, Type::Void) => false,
        (Type::Primitive(a), Type::Primitive(b)) => is_widening(*a, *b),
        (Type::Primitive(_), _) | (_, Type::Primitive(_)) => false,
        (Type::Wildcard(_), _) | (_, Type::Wildcard(_)) => false,
        (Type::Null, _) => t.is_reference(),
        (_, Type::Null) => false,
        (_, Type::Intersection(parts)) => parts.iter().all(|p| subtype(env, &s, p, seen)),
        (Type::Intersection(parts), _) => parts.iter().any(|p| subtype(env, p, &t, seen)),
        (Type::TypeVar(id), _) => {
            if !seen.insert(*id) {
                return false;
            }
            let via_bound = match env.type_param(*id) {
                Some(tp) if !tp.upper_bounds.is_empty() => tp
                    .upper_bounds
                    .iter()
                    .any(|bound| subtype(env, bound, &t, seen)),
                _ => subtype(env, &env.object_type(), &t, seen),
            };
            seen.remove(id);
            via_bound || below_lower_bound(env, &s, &t, seen)
        }
        (_, Type::TypeVar(_)) => below_lower_bound(env, &s, &t, seen),
        (Type::Array(se), Type::Array(te)) => match (se.as_ref(), te.as_ref()) {
            (Type::Primitive(a), Type::Primitive(b)) => a == b,
            (Type::Primitive(_), _) | (_, Type::Primitive(_)) => false,
            (se, te) => subtype(env, se, te, seen),
        },
        (Type::Array(_), Type::Class(ClassType { def, args })) => {
            let wk = env.well_known();
            args.is_empty()
                && (*def == wk.object || *def == wk.cloneable || *def == wk.serializable)
        }
        (Type::Class(_), Type::Class(ClassType { def, args: targs })) => {
            let Some(view) = instantiate_as_supertype(env, &s, *def) else {
                return false;
            };
            if targs.is_empty() {
                return true;
            }
            let sargs = view.type_args();
            if sargs.len() != targs.len() {
                return false;
            }
            targs
                .iter()
                .zip(sargs)
                .all(|(ta, sa)| contains(env, ta, sa, seen))
        }
        _ => false,
    }
}

fn below_lower_bound(env: &dyn TypeEnv, s: &Type, t: &Type, seen: &mut HashSet<TypeVarId>) -> bool {
    let Type::TypeVar(id) = t else {
        return false;
    };
    match env.type_param(*id).and_then(|tp| tp.lower_bound.clone()) {
        Some(lower) => subtype(env, s, &lower, seen),
        None => false,
    }
}

/// Type argument containment (JLS 4.5.1): does `t_arg` contain `s_arg`?
fn contains(env: &dyn TypeEnv, t_arg: &Type, s_arg: &Type, seen: &mut HashSet<TypeVarId>) -> bool {
    match t_arg {
        Type::Wildcard(WildcardBound::Unbounded) => true,
        Type::Wildcard(WildcardBound::Extends(upper)) => match s_arg {
            Type::Wildcard(WildcardBound::Extends(s_upper)) => subtype(env, s_upper, upper, seen),
            Type::Wildcard(_) => subtype(env, &env.object_type(), upper, seen),
            other => subtype(env, other, upper, seen),
        },
        Type::Wildcard(WildcardBound::Super(lower)) => match s_arg {
            Type::Wildcard(WildcardBound::Super(s_lower)) => subtype(env, lower, s_lower, seen),
            Type::Wildcard(_) => false,
            other => subtype(env, lower, other, seen),
        },
        other => is_same_type(env, other, s_arg),
    }
}

/// Cast legality (JLS 5.5), ignoring unchecked warnings.
pub fn is_castable(env: &dyn TypeEnv, from: &Type, to: &Type) -> bool {
    let s = canonicalize_named(env, from);
    let t = canonicalize_named(env, to);
    if s.is_errorish() || t.is_errorish() {
        return false;
    }
    match (&s, &t) {
        (Type::Void, _) | (_, Type::Void) => false,
        (Type::Primitive(a), Type::Primitive(b)) => a == b || (a.is_numeric() && b.is_numeric()),
        (Type::Primitive(p), _) => {
            box_primitive(env, *p).is_some_and(|boxed| is_subtype(env, &boxed, &t))
        }
        (_, Type::Primitive(p)) => match unbox_type(env, &s) {
            Some(unboxed) => unboxed == *p || is_widening(unboxed, *p),
            None => box_primitive(env, *p).is_some_and(|boxed| reference_castable(env, &s, &boxed)),
        },
        (Type::Null, _) => t.is_reference(),
        _ => reference_castable(env, &s, &t),
    }
}

fn reference_castable(env: &dyn TypeEnv, s: &Type, t: &Type) -> bool {
    let s = erasure(env, s);
    let t = erasure(env, t);
    if is_subtype(env, &s, &t) || is_subtype(env, &t, &s) {
        return true;
    }
    match (&s, &t) {
        (Type::Array(se), Type::Array(te)) => match (se.as_ref(), te.as_ref()) {
            (Type::Primitive(a), Type::Primitive(b)) => a == b,
            (Type::Primitive(_), _) | (_, Type::Primitive(_)) => false,
            (se, te) => reference_castable(env, se, te),
        },
        (Type::Class(a), Type::Class(b)) => {
            let (Some(a), Some(b)) = (env.class(a.def), env.class(b.def)) else {
                return false;
            };
            match (a.is_interface(), b.is_interface()) {
                (true, true) => true,
                (true, false) => !b.modifiers.is_final(),
                (false, true) => !a.modifiers.is_final(),
                (false, false) => false,
            }
        }
        _ => false,
    }
}

/// Assignment compatibility (JLS 5.2) without constant narrowing.
pub fn is_assignable(env: &dyn TypeEnv, from: &Type, to: &Type) -> bool {
    let s = canonicalize_named(env, from);
    let t = canonicalize_named(env, to);
    if s.is_errorish() || t.is_errorish() {
        return false;
    }
    if is_subtype(env, &s, &t) {
        return true;
    }
    match (&s, &t) {
        (Type::Primitive(p), _) if t.is_reference() => {
            box_primitive(env, *p).is_some_and(|boxed| is_subtype(env, &boxed, &t))
        }
        (_, Type::Primitive(p)) if s.is_reference() => {
            unbox_type(env, &s).is_some_and(|u| u == *p || is_widening(u, *p))
        }
        (_, Type::Class(ClassType { def, args })) if !args.is_empty() => {
            // Unchecked conversion from a raw type.
            instantiate_as_supertype(env, &s, *def).is_some_and(|view| view.type_args().is_empty())
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{TypeStore, WildcardBound};

    fn class(env: &TypeStore, name: &str, args: Vec<Type>) -> Type {
        Type::class(env.class_id(name).unwrap(), args)
    }

    #[test]
    fn primitive_widening_lattice() {
        use PrimitiveType::*;
        let env = TypeStore::with_minimal_jdk();
        let p = Type::Primitive;
        assert!(is_subtype(&env, &p(Byte), &p(Short)));
        assert!(is_subtype(&env, &p(Char), &p(Int)));
        assert!(is_subtype(&env, &p(Int), &p(Double)));
        assert!(!is_subtype(&env, &p(Byte), &p(Char)));
        assert!(!is_subtype(&env, &p(Long), &p(Int)));
        assert!(!is_subtype(&env, &p(Boolean), &p(Int)));
        assert!(is_lossy_widening(Long, Double));
        assert!(!is_lossy_widening(Int, Double));
    }

    #[test]
    fn arrays_are_covariant_for_references_only() {
        let env = TypeStore::with_minimal_jdk();
        let string_array = Type::array(env.string_type());
        let object_array = Type::array(env.object_type());
        assert!(is_subtype(&env, &string_array, &object_array));
        assert!(!is_subtype(&env, &object_array, &string_array));
        assert!(!is_subtype(
            &env,
            &Type::array(Type::int()),
            &Type::array(Type::Primitive(PrimitiveType::Long))
        ));
        assert!(is_subtype(&env, &Type::array(Type::int()), &env.object_type()));
        assert!(is_subtype(
            &env,
            &Type::array(Type::int()),
            &class(&env, "java.lang.Cloneable", vec![])
        ));
    }

    #[test]
    fn generics_are_invariant_unless_wildcarded() {
        let env = TypeStore::with_minimal_jdk();
        let string = env.string_type();
        let object = env.object_type();
        let list_string = class(&env, "java.util.List", vec![string.clone()]);
        let list_object = class(&env, "java.util.List", vec![object.clone()]);
        let array_list_string = class(&env, "java.util.ArrayList", vec![string.clone()]);
        let list_extends_object = class(
            &env,
            "java.util.List",
            vec![Type::Wildcard(WildcardBound::Extends(Box::new(object)))],
        );
        let list_super_string = class(
            &env,
            "java.util.Collection",
            vec![Type::Wildcard(WildcardBound::Super(Box::new(string)))],
        );

        assert!(!is_subtype(&env, &list_string, &list_object));
        assert!(is_subtype(&env, &array_list_string, &list_string));
        assert!(is_subtype(&env, &list_string, &list_extends_object));
        assert!(is_subtype(&env, &list_object, &list_super_string));
    }

    #[test]
    fn raw_and_parameterized() {
        let env = TypeStore::with_minimal_jdk();
        let raw_list = class(&env, "java.util.List", vec![]);
        let list_string = class(&env, "java.util.List", vec![env.string_type()]);
        assert!(is_subtype(&env, &list_string, &raw_list));
        assert!(!is_subtype(&env, &raw_list, &list_string));
        assert!(is_assignable(&env, &raw_list, &list_string));
    }

    #[test]
    fn null_and_errorish() {
        let env = TypeStore::with_minimal_jdk();
        assert!(is_subtype(&env, &Type::Null, &env.string_type()));
        assert!(!is_subtype(&env, &Type::Null, &Type::int()));
        assert!(!is_subtype(&env, &Type::Unknown, &Type::Unknown));
        assert!(!is_same_type(&env, &Type::Error, &Type::Error));
        assert!(!is_castable(&env, &Type::Unknown, &env.object_type()));
    }

    #[test]
    fn boxing_in_assignment_and_casts() {
        let env = TypeStore::with_minimal_jdk();
        let integer = class(&env, "java.lang.Integer", vec![]);
        let long = class(&env, "java.lang.Long", vec![]);
        let number = class(&env, "java.lang.Number", vec![]);
        assert!(is_assignable(&env, &Type::int(), &integer));
        assert!(is_assignable(&env, &Type::int(), &number));
        assert!(is_assignable(&env, &integer, &Type::Primitive(PrimitiveType::Long)));
        assert!(!is_assignable(&env, &Type::int(), &long));
        assert_eq!(unbox_type(&env, &integer), Some(PrimitiveType::Int));

        assert!(is_castable(&env, &env.object_type(), &Type::int()));
        assert!(!is_castable(&env, &long, &Type::int()));
        assert!(is_castable(&env, &Type::Primitive(PrimitiveType::Double), &Type::int()));
        assert!(!is_castable(&env, &Type::boolean(), &Type::int()));
    }

    #[test]
    fn reference_casts() {
        let env = TypeStore::with_minimal_jdk();
        let string = env.string_type();
        let integer = class(&env, "java.lang.Integer", vec![]);
        let runnable = class(&env, "java.lang.Runnable", vec![]);
        let list = class(&env, "java.util.List", vec![]);
        let array_list = class(&env, "java.util.ArrayList", vec![]);

        assert!(is_castable(&env, &env.object_type(), &string));
        assert!(!is_castable(&env, &string, &integer));
        // String is final and does not implement Runnable.
        assert!(!is_castable(&env, &string, &runnable));
        assert!(is_castable(&env, &list, &runnable));
        assert!(is_castable(&env, &list, &array_list));
    }

    #[test]
    fn erasure_of_type_variables_uses_first_bound() {
        let mut env = TypeStore::with_minimal_jdk();
        let number = class(&env, "java.lang.Number", vec![]);
        let t = env.add_type_param("T", vec![number.clone()]);
        assert_eq!(erasure(&env, &Type::TypeVar(t)), number);
        let u = env.add_type_param("U", vec![]);
        assert_eq!(erasure(&env, &Type::TypeVar(u)), env.object_type());
        let list_string = class(&env, "java.util.List", vec![env.string_type()]);
        assert_eq!(erasure(&env, &list_string), class(&env, "java.util.List", vec![]));
    }

    #[test]
    fn type_variables_follow_bounds() {
        let mut env = TypeStore::with_minimal_jdk();
        let number = class(&env, "java.lang.Number", vec![]);
        let t = env.add_type_param("T", vec![number.clone()]);
        assert!(is_subtype(&env, &Type::TypeVar(t), &number));
        assert!(is_subtype(&env, &Type::TypeVar(t), &env.object_type()));
        assert!(!is_subtype(&env, &number, &Type::TypeVar(t)));
    }
}
