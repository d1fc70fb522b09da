//! Symbol and type lookups over attributed nodes.

use vigil_syntax::{NodeData, NodeKind, NodeRef, Symbol};
use vigil_types::{
    ClassId, ClassKind, Modifier, Modifiers, Type, TypeEnv, CONSTRUCTOR_NAME,
};

use crate::tree::{enclosing_class, get_receiver, is_this, strip_parentheses};
use crate::Context;

/// The symbol `node` refers to or declares.
///
/// Generated nodes and anything the host could not resolve have none.
pub fn get_symbol(node: NodeRef<'_>) -> Option<Symbol> {
    if node.is_generated() {
        return None;
    }
    node.symbol()
}

/// The static type of an expression or declaration.
///
/// Erroneous and unknown types are reported as absent.
pub fn get_type(node: NodeRef<'_>) -> Option<&Type> {
    node.ty().filter(|ty| !ty.is_errorish())
}

/// The declared type of a symbol: a field or local's type, a method's return
/// type, or a class's type with its own type variables as arguments.
pub fn symbol_type(ctx: &Context<'_>, symbol: Symbol) -> Option<Type> {
    let env = ctx.env();
    let ty = match symbol {
        Symbol::Class(id) => declared_class_type(env, id)?,
        Symbol::Method(id) => env.method(id)?.return_type.clone(),
        Symbol::Field(id) => env.field(id)?.ty.clone(),
        Symbol::Local(id) => ctx.unit().semantics().local(id)?.ty.clone(),
    };
    (!ty.is_errorish()).then_some(ty)
}

/// `C<T1..Tn>` for a class declared with type parameters `T1..Tn`.
pub fn declared_class_type(env: &dyn TypeEnv, class: ClassId) -> Option<Type> {
    let def = env.class(class)?;
    let args = def.type_params.iter().map(|&tv| Type::TypeVar(tv)).collect();
    Some(Type::class(class, args))
}

pub fn symbol_modifiers(ctx: &Context<'_>, symbol: Symbol) -> Option<Modifiers> {
    let env = ctx.env();
    Some(match symbol {
        Symbol::Class(id) => env.class(id)?.modifiers,
        Symbol::Method(id) => env.method(id)?.modifiers,
        Symbol::Field(id) => env.field(id)?.modifiers,
        Symbol::Local(id) => ctx.unit().semantics().local(id)?.modifiers,
    })
}

pub fn symbol_name(ctx: &Context<'_>, symbol: Symbol) -> Option<String> {
    let env = ctx.env();
    Some(match symbol {
        Symbol::Class(id) => env.class(id)?.name.clone(),
        Symbol::Method(id) => env.method(id)?.name.clone(),
        Symbol::Field(id) => env.field(id)?.name.clone(),
        Symbol::Local(id) => ctx.unit().semantics().local(id)?.name.to_string(),
    })
}

/// The class that declares a member; a nested class's outer class. Top-level
/// classes and locals have no owning class.
pub fn owner_class(ctx: &Context<'_>, symbol: Symbol) -> Option<ClassId> {
    match symbol {
        Symbol::Method(id) => Some(id.owner),
        Symbol::Field(id) => Some(id.owner),
        Symbol::Class(id) => ctx.env().class(id)?.outer,
        Symbol::Local(_) => None,
    }
}

pub fn is_static(ctx: &Context<'_>, symbol: Symbol) -> bool {
    symbol_modifiers(ctx, symbol).is_some_and(Modifiers::is_static)
}

/// The type of the receiver a member is accessed through.
///
/// With an explicit receiver this is the receiver's static type (or the
/// class itself for `Type.member`). Without one it is the declaring class for
/// static members and the enclosing class otherwise.
pub fn receiver_type(ctx: &Context<'_>, node: NodeRef<'_>) -> Option<Type> {
    let symbol = get_symbol(node);
    if let Some(receiver) = get_receiver(node) {
        if let Some(Symbol::Class(class)) = get_symbol(receiver) {
            if !receiver.ty().is_some_and(|ty| !ty.is_errorish()) {
                return declared_class_type(ctx.env(), class);
            }
        }
        return get_type(receiver).cloned();
    }
    let symbol = symbol?;
    if is_static(ctx, symbol) {
        return declared_class_type(ctx.env(), owner_class(ctx, symbol)?);
    }
    let class = get_symbol(enclosing_class(node)?)?.as_class()?;
    declared_class_type(ctx.env(), class)
}

/// The type a call, instance creation or method reference produces.
///
/// For method declarations this is the declared return type.
pub fn result_type(ctx: &Context<'_>, node: NodeRef<'_>) -> Option<Type> {
    match node.kind() {
        NodeKind::Method => {
            let method = node.symbol()?.as_method()?;
            let def = ctx.env().method(method)?;
            if def.is_constructor() {
                return Some(Type::Void);
            }
            Some(def.return_type.clone())
        }
        NodeKind::MemberReference => {
            let method = get_symbol(node)?.as_method()?;
            let def = ctx.env().method(method)?;
            if def.is_constructor() {
                return declared_class_type(ctx.env(), method.owner);
            }
            Some(def.return_type.clone())
        }
        _ => get_type(node).cloned(),
    }
}

/// Do `a` and `b` name the same variable?
///
/// Both must be plain or qualified names resolving to the same field or local.
/// Qualified names also need the same qualifier: `this.x` and `x` agree, as do
/// `a.x` and `a.x`, but `a.x` and `b.x` do not.
pub fn same_variable(a: NodeRef<'_>, b: NodeRef<'_>) -> bool {
    let a = strip_parentheses(a);
    let b = strip_parentheses(b);
    let (Some(sa), Some(sb)) = (get_symbol(a), get_symbol(b)) else {
        return false;
    };
    if sa != sb || !sa.is_variable() {
        return false;
    }
    match (a.data(), b.data()) {
        (NodeData::Identifier { .. }, NodeData::Identifier { .. }) => true,
        (NodeData::MemberSelect { expr: ea, .. }, NodeData::MemberSelect { expr: eb, .. }) => {
            same_qualifier(a.at(*ea), b.at(*eb))
        }
        (NodeData::Identifier { .. }, NodeData::MemberSelect { expr, .. }) => {
            is_this(strip_parentheses(b.at(*expr)))
        }
        (NodeData::MemberSelect { expr, .. }, NodeData::Identifier { .. }) => {
            is_this(strip_parentheses(a.at(*expr)))
        }
        _ => false,
    }
}

fn same_qualifier(a: NodeRef<'_>, b: NodeRef<'_>) -> bool {
    let a = strip_parentheses(a);
    let b = strip_parentheses(b);
    if is_this(a) && is_this(b) {
        return true;
    }
    match (get_symbol(a), get_symbol(b)) {
        (Some(Symbol::Class(x)), Some(Symbol::Class(y))) => x == y,
        _ => same_variable(a, b),
    }
}

/// Is the symbol invisible outside its top-level class?
///
/// True for private members, for members of private classes (at any level of
/// nesting) and for locals.
pub fn is_effectively_private(ctx: &Context<'_>, symbol: Symbol) -> bool {
    let env = ctx.env();
    let mut class = match symbol {
        Symbol::Local(_) => return true,
        Symbol::Class(id) => Some(id),
        Symbol::Method(_) | Symbol::Field(_) => {
            if symbol_modifiers(ctx, symbol).is_some_and(Modifiers::is_private) {
                return true;
            }
            owner_class(ctx, symbol)
        }
    };
    let mut hops = 0;
    while let Some(id) = class {
        let Some(def) = env.class(id) else {
            return false;
        };
        if def.modifiers.is_private() {
            return true;
        }
        hops += 1;
        if hops > 64 {
            break;
        }
        class = def.outer;
    }
    false
}

/// Is `node` a constructor the host synthesized because the class declares
/// none?
pub fn is_generated_constructor(node: NodeRef<'_>) -> bool {
    node.is_generated()
        && matches!(node.data(), NodeData::Method { name, .. } if name == CONSTRUCTOR_NAME)
}

/// Constant names of an enum, in declaration order.
///
/// Empty for anything that is not an enum.
pub fn enum_values(ctx: &Context<'_>, class: ClassId) -> Vec<String> {
    let Some(def) = ctx.env().class(class) else {
        return Vec::new();
    };
    if def.kind != ClassKind::Enum {
        return Vec::new();
    }
    let constant = Modifiers::of(&[Modifier::Public, Modifier::Static, Modifier::Final]);
    def.fields
        .iter()
        .filter(|f| {
            constant.iter().all(|m| f.modifiers.contains(m))
                && f.ty.class_id() == Some(class)
                && f.ty.type_args().is_empty()
        })
        .map(|f| f.name.clone())
        .collect()
}

/// The formal parameter index that receives argument `arg` of the call or
/// instance creation `invocation`.
///
/// Arguments past the last formal of a varargs method all map to the varargs
/// slot. `None` if `arg` is not an argument of `invocation` or the callee is
/// unknown.
pub fn formal_parameter_index(
    ctx: &Context<'_>,
    invocation: NodeRef<'_>,
    arg: NodeRef<'_>,
) -> Option<usize> {
    let position = invocation
        .data()
        .arguments()
        .iter()
        .position(|&id| id == arg.id())?;
    let method = get_symbol(invocation)?.as_method()?;
    let def = ctx.env().method(method)?;
    let count = def.params.len();
    if def.is_varargs && count > 0 && position >= count - 1 {
        return Some(count - 1);
    }
    (position < count).then_some(position)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CompilationContext;
    use pretty_assertions::assert_eq;
    use vigil_test_utils::compile;
    use vigil_types::format_type;

    #[test]
    fn receiver_type_falls_back_to_owner_or_enclosing_class() {
        let f = compile(
            r#"
            import java.util.List;
            class Test {
                void helper() {}
                void m(List<String> xs) {
                    xs.size();
                    helper();
                    Math.abs(1);
                }
            }
            "#,
        );
        let comp = CompilationContext::new(f.store());
        let ctx = comp.context(f.unit());
        let fmt = |node| {
            receiver_type(&ctx, node)
                .map(|t| format_type(f.store(), &t))
                .unwrap_or_default()
        };
        assert_eq!(
            fmt(f.find(NodeKind::MethodInvocation, "xs.size()")),
            "java.util.List<java.lang.String>"
        );
        assert_eq!(fmt(f.find(NodeKind::MethodInvocation, "helper()")), "Test");
        assert_eq!(fmt(f.find(NodeKind::MethodInvocation, "Math.abs(1)")), "java.lang.Math");
    }

    #[test]
    fn same_variable_compares_symbols_and_qualifiers() {
        let f = compile(
            r#"
            class Test {
                int x;
                Test other;
                void m(int y) {
                    x = x;
                    this.x = x;
                    other.x = x;
                    y = y;
                    x = y;
                }
            }
            "#,
        );
        let assignment = |text: &str| {
            let node = f.find(NodeKind::Assignment, text);
            match node.data() {
                NodeData::Assignment { lhs, rhs } => (node.at(*lhs), node.at(*rhs)),
                _ => unreachable!(),
            }
        };
        let (l, r) = assignment("x = x");
        assert!(same_variable(l, r));
        let (l, r) = assignment("this.x = x");
        assert!(same_variable(l, r));
        let (l, r) = assignment("other.x = x");
        assert!(!same_variable(l, r));
        let (l, r) = assignment("y = y");
        assert!(same_variable(l, r));
        let (l, r) = assignment("x = y");
        assert!(!same_variable(l, r));
    }

    #[test]
    fn varargs_arguments_share_the_last_formal() {
        let f = compile(
            r#"
            class Test {
                void m() {
                    System.out.printf("%s %s", "a", "b");
                }
            }
            "#,
        );
        let comp = CompilationContext::new(f.store());
        let ctx = comp.context(f.unit());
        let call = f.find(NodeKind::MethodInvocation, "System.out.printf(\"%s %s\", \"a\", \"b\")");
        let args: Vec<_> = call.data().arguments().iter().map(|&a| call.at(a)).collect();
        let slots: Vec<_> = args
            .iter()
            .map(|&a| formal_parameter_index(&ctx, call, a))
            .collect();
        assert_eq!(slots, vec![Some(0), Some(1), Some(1)]);
        assert_eq!(formal_parameter_index(&ctx, call, call), None);
    }

    #[test]
    fn private_nesting_and_enum_constants() {
        let f = compile(
            r#"
            class Test {
                private static class Hidden { void visible() {} }
                public void open() {}
                enum Level { LOW, HIGH; static final Level DEFAULT = LOW; }
            }
            "#,
        );
        let comp = CompilationContext::new(f.store());
        let ctx = comp.context(f.unit());
        let visible = f.find_starting(NodeKind::Method, "void visible").symbol().unwrap();
        let open = f.find_starting(NodeKind::Method, "public void open").symbol().unwrap();
        assert!(is_effectively_private(&ctx, visible));
        assert!(!is_effectively_private(&ctx, open));

        let level = f.store().class_id("Test.Level").unwrap();
        assert_eq!(enum_values(&ctx, level), vec!["LOW", "HIGH"]);
        let test = f.store().class_id("Test").unwrap();
        assert!(enum_values(&ctx, test).is_empty());
    }

    #[test]
    fn generated_constructors_have_no_symbol() {
        let f = compile("class Test { }");
        let ctor = f
            .unit()
            .root()
            .descendants()
            .find(|n| n.kind() == NodeKind::Method)
            .unwrap();
        assert!(is_generated_constructor(ctor));
        assert_eq!(get_symbol(ctor), None);
        assert!(ctor.symbol().is_some());
    }
}
