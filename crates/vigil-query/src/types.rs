//! Type predicates over possibly missing type information.
//!
//! Every predicate answers `false` when either side is erroneous or unknown.

use std::collections::HashMap;

use vigil_types::{
    erasure, instantiate_as_supertype, substitute, supertype_closure, unbox_type, ClassId,
    MethodId, PrimitiveType, Type, TypeEnv,
};

use crate::Context;

pub fn is_same_type(ctx: &Context<'_>, a: &Type, b: &Type) -> bool {
    !a.is_errorish() && !b.is_errorish() && vigil_types::is_same_type(ctx.env(), a, b)
}

pub fn is_subtype(ctx: &Context<'_>, sub: &Type, sup: &Type) -> bool {
    !sub.is_errorish() && !sup.is_errorish() && vigil_types::is_subtype(ctx.env(), sub, sup)
}

pub fn is_castable(ctx: &Context<'_>, from: &Type, to: &Type) -> bool {
    !from.is_errorish() && !to.is_errorish() && vigil_types::is_castable(ctx.env(), from, to)
}

pub fn is_assignable(ctx: &Context<'_>, from: &Type, to: &Type) -> bool {
    !from.is_errorish() && !to.is_errorish() && vigil_types::is_assignable(ctx.env(), from, to)
}

/// Do the erasures of `a` and `b` agree?
pub fn is_same_erasure(ctx: &Context<'_>, a: &Type, b: &Type) -> bool {
    !a.is_errorish() && !b.is_errorish() && vigil_types::is_same_erasure(ctx.env(), a, b)
}

/// The primitive a type denotes directly or after unboxing.
pub fn unboxed(env: &dyn TypeEnv, ty: &Type) -> Option<PrimitiveType> {
    ty.as_primitive().or_else(|| unbox_type(env, ty))
}

pub fn is_boxed_primitive(env: &dyn TypeEnv, ty: &Type) -> bool {
    !ty.is_primitive() && unbox_type(env, ty).is_some()
}

/// Unary numeric promotion: `byte`, `short` and `char` become `int`.
pub fn unary_promotion(env: &dyn TypeEnv, ty: &Type) -> Option<PrimitiveType> {
    let p = unboxed(env, ty)?;
    if !p.is_numeric() {
        return None;
    }
    Some(match p {
        PrimitiveType::Byte | PrimitiveType::Short | PrimitiveType::Char => PrimitiveType::Int,
        other => other,
    })
}

/// Binary numeric promotion of two operand types.
pub fn binary_promotion(env: &dyn TypeEnv, a: &Type, b: &Type) -> Option<PrimitiveType> {
    let a = unary_promotion(env, a)?;
    let b = unary_promotion(env, b)?;
    Some(
        [
            PrimitiveType::Double,
            PrimitiveType::Float,
            PrimitiveType::Long,
        ]
        .into_iter()
        .find(|p| a == *p || b == *p)
        .unwrap_or(PrimitiveType::Int),
    )
}

/// `ty` as seen from a member of `owner` accessed through `site`.
///
/// `E` in `List<E>.get` becomes `String` when accessed through a
/// `List<String>`. Raw sites erase.
pub fn member_type(env: &dyn TypeEnv, site: &Type, owner: ClassId, ty: &Type) -> Type {
    let Some(def) = env.class(owner) else {
        return ty.clone();
    };
    if def.type_params.is_empty() {
        return ty.clone();
    }
    match instantiate_as_supertype(env, site, owner) {
        Some(view) if view.type_args().len() == def.type_params.len() => {
            let subst: HashMap<_, _> = def
                .type_params
                .iter()
                .copied()
                .zip(view.type_args().iter().cloned())
                .collect();
            substitute(ty, &subst)
        }
        _ => erasure(env, ty),
    }
}

/// The single abstract method of a functional interface type, with its
/// parameter and return types instantiated for `ty`.
pub fn functional_method(env: &dyn TypeEnv, ty: &Type) -> Option<(MethodId, Vec<Type>, Type)> {
    let class = ty.class_id()?;
    if !env.class(class)?.is_interface() {
        return None;
    }
    for owner in supertype_closure(env, class) {
        let Some(def) = env.class(owner) else {
            continue;
        };
        if !def.is_interface() {
            continue;
        }
        let found = def
            .method_ids(owner)
            .find(|(_, m)| m.modifiers.is_abstract() && !m.is_static());
        if let Some((id, m)) = found {
            let params = m
                .params
                .iter()
                .map(|p| member_type(env, ty, owner, p))
                .collect();
            let ret = member_type(env, ty, owner, &m.return_type);
            return Some((id, params, ret));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CompilationContext;
    use vigil_types::{format_type, TypeStore};

    #[test]
    fn errorish_types_never_match() {
        let store = TypeStore::with_minimal_jdk();
        let comp = CompilationContext::new(&store);
        let unit = vigil_test_utils::compile("class Test {}");
        let ctx = comp.context(unit.unit());
        let string = ctx.type_from_string("String").unwrap();
        assert!(is_subtype(&ctx, &string, &string));
        assert!(!is_subtype(&ctx, &Type::Error, &string));
        assert!(!is_same_type(&ctx, &Type::Unknown, &Type::Unknown));
        assert!(!is_castable(&ctx, &string, &Type::Error));
    }

    #[test]
    fn promotions() {
        let store = TypeStore::with_minimal_jdk();
        let int = Type::Primitive(PrimitiveType::Int);
        let char_ = Type::Primitive(PrimitiveType::Char);
        let long_box = store
            .class_id("java.lang.Long")
            .map(|id| Type::class(id, vec![]))
            .unwrap();
        assert_eq!(unary_promotion(&store, &char_), Some(PrimitiveType::Int));
        assert_eq!(binary_promotion(&store, &int, &long_box), Some(PrimitiveType::Long));
        assert_eq!(binary_promotion(&store, &int, &Type::boolean()), None);
        assert!(is_boxed_primitive(&store, &long_box));
        assert!(!is_boxed_primitive(&store, &int));
    }

    #[test]
    fn functional_methods_are_instantiated() {
        let store = TypeStore::with_minimal_jdk();
        let function = vigil_types::parse_type(
            &store,
            "java.util.function.Function<java.lang.String, java.lang.Integer>",
        )
        .unwrap();
        let (id, params, ret) = functional_method(&store, &function).unwrap();
        assert_eq!(store.method(id).unwrap().name, "apply");
        assert_eq!(format_type(&store, &params[0]), "java.lang.String");
        assert_eq!(format_type(&store, &ret), "java.lang.Integer");
        let string = store.string_type();
        assert!(functional_method(&store, &string).is_none());
    }
}
