//! Override queries.

use vigil_syntax::{NodeRef, Symbol};
use vigil_types::{ClassId, MethodId, SuperMethods};

use crate::symbols::get_symbol;
use crate::Context;

/// Every method `method` overrides, nearest first, without duplicates from
/// interfaces inherited along several paths.
pub fn find_super_methods(ctx: &Context<'_>, method: MethodId) -> Vec<MethodId> {
    vigil_types::find_super_methods(ctx.env(), method)
}

/// Lazily yields the methods `method` overrides.
pub fn stream_super_methods<'a>(ctx: &Context<'a>, method: MethodId) -> SuperMethods<'a> {
    vigil_types::super_methods(ctx.env(), method)
}

/// The overridden method declared in a class (not an interface), if any.
pub fn find_super_method(ctx: &Context<'_>, method: MethodId) -> Option<MethodId> {
    vigil_types::find_super_method(ctx.env(), method)
}

/// The method of `super_class` that `method` overrides.
pub fn find_super_method_in(
    ctx: &Context<'_>,
    method: MethodId,
    super_class: ClassId,
) -> Option<MethodId> {
    vigil_types::find_super_method_in_type(ctx.env(), method, super_class)
}

/// Does the method declared by `decl` override anything?
pub fn overrides_anything(ctx: &Context<'_>, decl: NodeRef<'_>) -> bool {
    match get_symbol(decl) {
        Some(Symbol::Method(method)) => stream_super_methods(ctx, method).next().is_some(),
        _ => false,
    }
}
