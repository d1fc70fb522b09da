//! Override resolution over the supertype closure.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::subtyping::{erasure, is_same_type};
use crate::supertypes::{direct_supertypes, instantiate_as_supertype, substitute};
use crate::{ClassId, MethodDef, MethodId, Type, TypeEnv, TypeVarId};

/// Lazily yields the methods that `method` overrides, nearest supertypes first.
///
/// Created by [`super_methods`].
pub struct SuperMethods<'env> {
    env: &'env dyn TypeEnv,
    owner: ClassId,
    name: String,
    erased_params: Vec<Type>,
    queue: VecDeque<Type>,
    seen: HashSet<ClassId>,
    pending: VecDeque<MethodId>,
}

impl Iterator for SuperMethods<'_> {
    type Item = MethodId;

    fn next(&mut self) -> Option<MethodId> {
        loop {
            if let Some(found) = self.pending.pop_front() {
                return Some(found);
            }
            let current = self.queue.pop_front()?;
            let Some(def) = current.class_id() else {
                continue;
            };
            if !self.seen.insert(def) {
                continue;
            }
            self.queue.extend(direct_supertypes(self.env, &current));
            if def == self.owner {
                continue;
            }
            self.pending.extend(overridden_in(
                self.env,
                &current,
                &self.name,
                &self.erased_params,
            ));
        }
    }
}

/// The declared type of `owner` with its own type parameters as arguments.
fn declared_type(env: &dyn TypeEnv, owner: ClassId) -> Type {
    let args = env
        .class(owner)
        .map(|def| def.type_params.iter().copied().map(Type::TypeVar).collect())
        .unwrap_or_default();
    Type::class(owner, args)
}

fn can_override(method: &MethodDef) -> bool {
    !method.is_static() && !method.modifiers.is_private() && !method.is_constructor()
}

/// Methods declared directly in `current` (a supertype instantiation) with the
/// given name and erased signature.
fn overridden_in(
    env: &dyn TypeEnv,
    current: &Type,
    name: &str,
    erased_params: &[Type],
) -> Vec<MethodId> {
    let Some(def_id) = current.class_id() else {
        return Vec::new();
    };
    let Some(class_def) = env.class(def_id) else {
        return Vec::new();
    };
    let subst: HashMap<TypeVarId, Type> = class_def
        .type_params
        .iter()
        .copied()
        .zip(current.type_args().iter().cloned())
        .collect();

    class_def
        .method_ids(def_id)
        .filter(|(_, candidate)| {
            can_override(candidate)
                && candidate.name == name
                && candidate.params.len() == erased_params.len()
                && candidate
                    .params
                    .iter()
                    .zip(erased_params)
                    .all(|(param, expected)| {
                        let param = erasure(env, &substitute(param, &subst));
                        is_same_type(env, &param, expected)
                    })
        })
        .map(|(id, _)| id)
        .collect()
}

/// Lazily enumerate the methods `method` overrides.
///
/// Static, private and constructor methods override nothing. Matching is by
/// name and erased parameter types after the supertype's instantiation has been
/// applied; return types are not compared.
pub fn super_methods(env: &dyn TypeEnv, method: MethodId) -> SuperMethods<'_> {
    let mut iter = SuperMethods {
        env,
        owner: method.owner,
        name: String::new(),
        erased_params: Vec::new(),
        queue: VecDeque::new(),
        seen: HashSet::new(),
        pending: VecDeque::new(),
    };
    let Some(def) = env.method(method) else {
        return iter;
    };
    if !can_override(def) {
        return iter;
    }
    iter.name = def.name.clone();
    iter.erased_params = def.params.iter().map(|p| erasure(env, p)).collect();
    iter.queue.push_back(declared_type(env, method.owner));
    iter
}

/// Every method `method` overrides, de-duplicated, nearest first.
pub fn find_super_methods(env: &dyn TypeEnv, method: MethodId) -> Vec<MethodId> {
    super_methods(env, method).collect()
}

/// The first overridden method that is declared by a class rather than an
/// interface.
pub fn find_super_method(env: &dyn TypeEnv, method: MethodId) -> Option<MethodId> {
    super_methods(env, method).find(|sup| {
        env.class(sup.owner)
            .is_some_and(|owner| !owner.is_interface())
    })
}

/// The method in `super_class` that `method` overrides, if any.
///
/// Returns `None` when `super_class` is the method's own class or is not a
/// supertype of it.
pub fn find_super_method_in_type(
    env: &dyn TypeEnv,
    method: MethodId,
    super_class: ClassId,
) -> Option<MethodId> {
    if super_class == method.owner {
        return None;
    }
    let def = env.method(method)?;
    if !can_override(def) {
        return None;
    }
    let view = instantiate_as_supertype(env, &declared_type(env, method.owner), super_class)?;
    let erased: Vec<Type> = def.params.iter().map(|p| erasure(env, p)).collect();
    overridden_in(env, &view, &def.name, &erased)
        .into_iter()
        .next()
}
