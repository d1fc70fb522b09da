//! Annotation queries.

use std::collections::HashSet;

use vigil_syntax::{NodeData, Symbol};
use vigil_types::{ClassId, TypeEnv};

use crate::Context;

const INHERITED: &str = "java.lang.annotation.Inherited";

/// Annotation types applied directly to `symbol`.
pub fn declared_annotations(ctx: &Context<'_>, symbol: Symbol) -> Vec<ClassId> {
    let env = ctx.env();
    match symbol {
        Symbol::Class(id) => env.class(id).map(|d| d.annotations.clone()),
        Symbol::Method(id) => env.method(id).map(|d| d.annotations.clone()),
        Symbol::Field(id) => env.field(id).map(|d| d.annotations.clone()),
        Symbol::Local(_) => Some(local_annotations(ctx, symbol)),
    }
    .unwrap_or_default()
}

fn local_annotations(ctx: &Context<'_>, symbol: Symbol) -> Vec<ClassId> {
    let Some(decl) = ctx.unit().semantics().decl(symbol).and_then(|id| ctx.node(id)) else {
        return Vec::new();
    };
    decl.data()
        .annotations()
        .iter()
        .filter_map(|&a| decl.at(a).ty()?.class_id())
        .collect()
}

/// Is `symbol` annotated with the annotation type named `annotation`?
///
/// Annotation types that are themselves `@Inherited` are also found on
/// superclasses of a class symbol.
pub fn has_annotation(ctx: &Context<'_>, symbol: Symbol, annotation: &str) -> bool {
    let Some(wanted) = ctx.class_by_name(annotation) else {
        return false;
    };
    effective_annotations(ctx, symbol).contains(&wanted)
}

/// The names from `names` that annotate `symbol`, in the order given.
pub fn annotations_among(ctx: &Context<'_>, symbol: Symbol, names: &[&str]) -> Vec<String> {
    let present = effective_annotations(ctx, symbol);
    names
        .iter()
        .filter(|name| {
            ctx.class_by_name(name)
                .is_some_and(|id| present.contains(&id))
        })
        .map(|name| name.to_string())
        .collect()
}

fn effective_annotations(ctx: &Context<'_>, symbol: Symbol) -> HashSet<ClassId> {
    let env = ctx.env();
    let mut found: HashSet<ClassId> = declared_annotations(ctx, symbol).into_iter().collect();
    let Symbol::Class(class) = symbol else {
        return found;
    };
    let inherited = ctx.class_by_name(INHERITED);
    let mut seen = HashSet::from([class]);
    let mut current = env
        .class(class)
        .and_then(|d| d.super_class.as_ref())
        .and_then(|t| t.class_id());
    while let Some(id) = current {
        if !seen.insert(id) {
            break;
        }
        let Some(def) = env.class(id) else {
            break;
        };
        found.extend(
            def.annotations
                .iter()
                .copied()
                .filter(|&a| is_inherited(env, a, inherited)),
        );
        current = def.super_class.as_ref().and_then(|t| t.class_id());
    }
    found
}

fn is_inherited(env: &dyn TypeEnv, annotation: ClassId, inherited: Option<ClassId>) -> bool {
    inherited.is_some_and(|marker| {
        env.class(annotation)
            .is_some_and(|d| d.annotations.contains(&marker))
    })
}

/// String values of a `@SuppressWarnings`-style annotation node: a single
/// string, an array of strings, or a `value = ...` pair.
pub fn annotation_strings(ctx: &Context<'_>, annotation: vigil_syntax::NodeRef<'_>) -> Vec<String> {
    let NodeData::Annotation { args, .. } = annotation.data() else {
        return Vec::new();
    };
    let mut out = Vec::new();
    for &arg in args {
        let mut node = annotation.at(arg);
        if let NodeData::Assignment { lhs, rhs } = node.data() {
            if annotation.at(*lhs).name().map(|n| n.as_str()) != Some("value") {
                continue;
            }
            node = annotation.at(*rhs);
        }
        match node.data() {
            NodeData::NewArray { init: Some(items), .. } => {
                for &item in items {
                    if let Some(value) = crate::const_value(ctx, node.at(item)) {
                        out.extend(value.as_str().map(str::to_string));
                    }
                }
            }
            _ => {
                if let Some(value) = crate::const_value(ctx, node) {
                    out.extend(value.as_str().map(str::to_string));
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CompilationContext;
    use vigil_syntax::NodeKind;
    use vigil_test_utils::compile;

    #[test]
    fn direct_and_inherited_annotations() {
        let f = compile(
            r#"
            import java.lang.annotation.Inherited;
            @Inherited @interface Marker {}
            @interface Plain {}
            @Marker @Plain class Base {}
            class Derived extends Base {
                @Deprecated void old() {}
                void m(@Deprecated int p) {}
            }
            "#,
        );
        let comp = CompilationContext::new(f.store());
        let ctx = comp.context(f.unit());
        let derived = Symbol::Class(f.store().class_id("Derived").unwrap());
        let base = Symbol::Class(f.store().class_id("Base").unwrap());
        assert!(has_annotation(&ctx, base, "Plain"));
        assert!(has_annotation(&ctx, derived, "Marker"));
        assert!(!has_annotation(&ctx, derived, "Plain"));
        assert!(!has_annotation(&ctx, derived, "com.example.Missing"));
        assert_eq!(
            annotations_among(&ctx, base, &["Plain", "java.lang.Deprecated", "Marker"]),
            vec!["Plain", "Marker"]
        );

        let old = f.find_starting(NodeKind::Method, "@Deprecated void old").symbol().unwrap();
        assert!(has_annotation(&ctx, old, "java.lang.Deprecated"));
        let param = f.find_starting(NodeKind::Variable, "@Deprecated int p").symbol().unwrap();
        assert!(has_annotation(&ctx, param, "java.lang.Deprecated"));
    }

    #[test]
    fn suppress_warnings_values() {
        let f = compile(
            r#"
            class Test {
                @SuppressWarnings("unchecked") void a() {}
                @SuppressWarnings({"rawtypes", "ArrayToString"}) void b() {}
                @SuppressWarnings(value = "all") void c() {}
            }
            "#,
        );
        let comp = CompilationContext::new(f.store());
        let ctx = comp.context(f.unit());
        let values =
            |prefix: &str| annotation_strings(&ctx, f.find_starting(NodeKind::Annotation, prefix));
        assert_eq!(values("@SuppressWarnings(\"unchecked\")"), vec!["unchecked"]);
        assert_eq!(values("@SuppressWarnings({"), vec!["rawtypes", "ArrayToString"]);
        assert_eq!(values("@SuppressWarnings(value"), vec!["all"]);
    }
}
