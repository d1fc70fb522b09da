//! Fluent matchers for method and constructor calls.
//!
//! A chain starts from [`instance_method`], [`static_method`], [`any_method`]
//! or [`constructor`] and narrows the callee by owner, name and parameters:
//!
//! ```
//! use vigil_matchers::instance_method;
//!
//! let identity_equals = instance_method()
//!     .on_exact_class("java.util.IdentityHashMap")
//!     .named("equals");
//! # let _ = identity_equals;
//! ```
//!
//! The owner of an instance or static method is the static type of the
//! receiver the call goes through (the enclosing class for unqualified calls),
//! not the class that declares the method, so `on_exact_class` distinguishes
//! a call through an `IdentityHashMap` from one through a `Map`. Owner and
//! parameter types are compared after erasure. Method references such as
//! `Integer::parseInt` and `Foo::new` match exactly like the equivalent calls.

use regex::Regex;
use vigil_query::{declared_class_type, get_symbol, receiver_type, Context};
use vigil_syntax::{NodeKind, NodeRef, Symbol};
use vigil_types::{erasure, MethodDef, Type};

use crate::nodes::{erased_named, is_descendant_of, is_exact_type};
use crate::Matcher;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CallKind {
    Instance,
    Static,
    Any,
    Constructor,
}

#[derive(Clone, Debug)]
enum Constraint {
    ExactClass(Vec<String>),
    DescendantOf(Vec<String>),
    Names(Vec<String>),
    NameMatching(Regex),
    Parameters(Vec<String>),
    Arity(usize),
    Varargs,
}

struct Callee<'a> {
    def: &'a MethodDef,
    owner: Type,
}

#[derive(Clone, Debug)]
pub struct MethodMatcher {
    kind: CallKind,
    constraints: Vec<Constraint>,
}

/// Calls of non-static methods.
pub fn instance_method() -> MethodMatcher {
    MethodMatcher::new(CallKind::Instance)
}

/// Calls of static methods.
pub fn static_method() -> MethodMatcher {
    MethodMatcher::new(CallKind::Static)
}

/// Calls of any method, static or not, but not constructors.
pub fn any_method() -> MethodMatcher {
    MethodMatcher::new(CallKind::Any)
}

/// Instance creations and constructor references.
pub fn constructor() -> MethodMatcher {
    MethodMatcher::new(CallKind::Constructor)
}

impl MethodMatcher {
    fn new(kind: CallKind) -> Self {
        Self {
            kind,
            constraints: Vec::new(),
        }
    }

    fn with(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// The owner is exactly `class`; subclasses do not match.
    #[must_use]
    pub fn on_exact_class(self, class: &str) -> Self {
        self.with(Constraint::ExactClass(vec![class.to_string()]))
    }

    /// Same as [`MethodMatcher::on_exact_class`].
    #[must_use]
    pub fn on_class(self, class: &str) -> Self {
        self.on_exact_class(class)
    }

    #[must_use]
    pub fn on_class_any(self, classes: &[&str]) -> Self {
        self.with(Constraint::ExactClass(
            classes.iter().map(|c| c.to_string()).collect(),
        ))
    }

    /// The owner is `class` or any subtype of it.
    #[must_use]
    pub fn on_descendant_of(self, class: &str) -> Self {
        self.with(Constraint::DescendantOf(vec![class.to_string()]))
    }

    #[must_use]
    pub fn on_descendant_of_any(self, classes: &[&str]) -> Self {
        self.with(Constraint::DescendantOf(
            classes.iter().map(|c| c.to_string()).collect(),
        ))
    }

    /// Accepts any owner.
    #[must_use]
    pub fn any_class(self) -> Self {
        self
    }

    /// The constructed class is exactly `class`.
    #[must_use]
    pub fn for_class(self, class: &str) -> Self {
        self.on_exact_class(class)
    }

    #[must_use]
    pub fn named(self, name: &str) -> Self {
        self.with(Constraint::Names(vec![name.to_string()]))
    }

    #[must_use]
    pub fn named_any_of(self, names: &[&str]) -> Self {
        self.with(Constraint::Names(names.iter().map(|n| n.to_string()).collect()))
    }

    #[must_use]
    pub fn with_any_name(self) -> Self {
        self
    }

    /// The method name matches `pattern` as `Regex::is_match` decides; anchor
    /// the pattern to require a whole-name match.
    #[must_use]
    pub fn with_name_matching(self, pattern: Regex) -> Self {
        self.with(Constraint::NameMatching(pattern))
    }

    /// The erased formal parameter types are exactly `params`, spelled like
    /// `java.lang.String` or `int[]`.
    #[must_use]
    pub fn with_parameters(self, params: &[&str]) -> Self {
        self.with(Constraint::Parameters(
            params.iter().map(|p| p.to_string()).collect(),
        ))
    }

    #[must_use]
    pub fn with_no_parameters(self) -> Self {
        self.with(Constraint::Parameters(Vec::new()))
    }

    /// The callee declares exactly `arity` formals; a varargs parameter
    /// counts once.
    #[must_use]
    pub fn with_arity(self, arity: usize) -> Self {
        self.with(Constraint::Arity(arity))
    }

    /// The callee is a varargs method.
    #[must_use]
    pub fn with_varargs(self) -> Self {
        self.with(Constraint::Varargs)
    }

    fn callee<'a>(&self, node: NodeRef<'_>, ctx: &Context<'a>) -> Option<Callee<'a>> {
        if !matches!(
            node.kind(),
            NodeKind::MethodInvocation | NodeKind::MemberReference | NodeKind::NewClass
        ) {
            return None;
        }
        let Some(Symbol::Method(id)) = get_symbol(node) else {
            return None;
        };
        let def = ctx.env().method(id)?;
        let kind_ok = match self.kind {
            CallKind::Constructor => def.is_constructor(),
            CallKind::Instance => !def.is_constructor() && !def.is_static(),
            CallKind::Static => !def.is_constructor() && def.is_static(),
            CallKind::Any => !def.is_constructor(),
        };
        if !kind_ok {
            return None;
        }
        let owner = if def.is_constructor() {
            declared_class_type(ctx.env(), id.owner)?
        } else {
            receiver_type(ctx, node)?
        };
        if owner.is_errorish() {
            return None;
        }
        Some(Callee { def, owner })
    }

    fn satisfies(&self, constraint: &Constraint, callee: &Callee<'_>, ctx: &Context<'_>) -> bool {
        match constraint {
            Constraint::ExactClass(names) => {
                names.iter().any(|name| is_exact_type(ctx, &callee.owner, name))
            }
            Constraint::DescendantOf(names) => {
                names.iter().any(|name| is_descendant_of(ctx, &callee.owner, name))
            }
            Constraint::Names(names) => names.iter().any(|name| *name == callee.def.name),
            Constraint::NameMatching(pattern) => pattern.is_match(&callee.def.name),
            Constraint::Parameters(names) => {
                callee.def.params.len() == names.len()
                    && callee.def.params.iter().zip(names).all(|(param, name)| {
                        erased_named(ctx, name).is_some_and(|expected| {
                            vigil_query::types::is_same_type(
                                ctx,
                                &erasure(ctx.env(), param),
                                &expected,
                            )
                        })
                    })
            }
            Constraint::Arity(arity) => callee.def.params.len() == *arity,
            Constraint::Varargs => callee.def.is_varargs,
        }
    }
}

impl Matcher for MethodMatcher {
    fn matches(&self, node: NodeRef<'_>, ctx: &Context<'_>) -> bool {
        let Some(callee) = self.callee(node, ctx) else {
            return false;
        };
        self.constraints
            .iter()
            .all(|constraint| self.satisfies(constraint, &callee, ctx))
    }
}
