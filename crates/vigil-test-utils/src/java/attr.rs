//! Name resolution and attribution for fixture sources.
//!
//! Three passes over every unit: classes are interned first so that forward
//! and cross-file references resolve, then class headers and member
//! signatures are defined in the shared [`TypeStore`], then method bodies are
//! typed into each unit's [`Semantics`]. Anything that does not resolve is
//! typed as [`Type::Error`] rather than rejected.

use std::collections::HashMap;

use vigil_syntax::{
    BinaryOp, Comments, CompilationUnit, LocalId, LocalKind, LocalVar, Name, NodeData, NodeId,
    Semantics, Symbol, SyntaxTree, UnaryOp,
};
use vigil_types::{
    box_primitive, erasure, instantiate_as_supertype, is_assignable, is_same_type, is_subtype,
    substitute, supertype_closure, unbox_type, ClassDef, ClassId, ClassKind, FieldDef, FieldId,
    MethodDef, MethodId, Modifier, Modifiers, PrimitiveType, Type, TypeEnv, TypeStore, TypeVarId,
    WildcardBound, CONSTRUCTOR_NAME,
};

use super::parser::{ParsedUnit, TypeArg, TypeRef};

pub(crate) struct SourceFile {
    pub path: String,
    pub text: String,
    pub parsed: ParsedUnit,
}

type NodeKey = (usize, NodeId);

/// What a unit's import list and top-level declarations make nameable.
struct UnitScope {
    package: Option<String>,
    imports: Vec<(String, bool, bool)>,
}

impl UnitScope {
    fn new(tree: &SyntaxTree) -> Self {
        let mut package = None;
        let mut imports = Vec::new();
        if let Some(NodeData::CompilationUnit {
            package: pkg,
            imports: ids,
            ..
        }) = tree.data(tree.root())
        {
            if let Some(NodeData::Package { name }) = pkg.and_then(|id| tree.data(id)) {
                package = Some(name.to_string());
            }
            for &id in ids {
                if let Some(NodeData::Import {
                    path,
                    is_static,
                    is_wildcard,
                }) = tree.data(id)
                {
                    imports.push((path.to_string(), *is_static, *is_wildcard));
                }
            }
        }
        UnitScope { package, imports }
    }

    fn qualify(&self, simple: &str) -> String {
        match &self.package {
            Some(pkg) => format!("{pkg}.{simple}"),
            None => simple.to_string(),
        }
    }
}

/// The names visible at one point of a unit.
#[derive(Clone, Copy)]
struct NameCtx<'a> {
    unit: &'a UnitScope,
    /// Enclosing classes, outermost first.
    enclosing: &'a [ClassId],
    type_params: &'a [TypeVarId],
}

fn primitive_type(name: &str) -> Option<Type> {
    if name == "void" {
        return Some(Type::Void);
    }
    PrimitiveType::from_keyword(name).map(Type::Primitive)
}

fn resolve_simple_class(store: &TypeStore, ctx: NameCtx<'_>, simple: &str) -> Option<ClassId> {
    for &outer in ctx.enclosing.iter().rev() {
        let Some(def) = store.class(outer) else {
            continue;
        };
        if def.simple_name() == simple {
            return Some(outer);
        }
        if let Some(id) = store.class_id(&format!("{}.{simple}", def.name)) {
            return Some(id);
        }
    }
    if let Some(id) = store.class_id(&ctx.unit.qualify(simple)) {
        return Some(id);
    }
    for (path, is_static, is_wildcard) in &ctx.unit.imports {
        if !is_static && !is_wildcard && path.rsplit('.').next() == Some(simple) {
            return store.class_id(path);
        }
    }
    for (path, is_static, is_wildcard) in &ctx.unit.imports {
        if *is_wildcard {
            if let Some(id) = store.class_id(&format!("{path}.{simple}")) {
                return Some(id);
            }
        }
        // `import static a.B.Inner;` names a member type too.
        if *is_static && !is_wildcard && path.rsplit('.').next() == Some(simple) {
            if let Some(id) = store.class_id(path) {
                return Some(id);
            }
        }
    }
    store.class_id(&format!("java.lang.{simple}"))
}

fn resolve_class(store: &TypeStore, ctx: NameCtx<'_>, name: &str) -> Option<ClassId> {
    match name.split_once('.') {
        None => resolve_simple_class(store, ctx, name),
        Some((head, rest)) => match resolve_simple_class(store, ctx, head) {
            Some(outer) => {
                let outer_name = &store.class(outer)?.name;
                store.class_id(&format!("{outer_name}.{rest}"))
            }
            None => store.class_id(name),
        },
    }
}

fn resolve_type_param(store: &TypeStore, ctx: NameCtx<'_>, name: &str) -> Option<TypeVarId> {
    ctx.type_params
        .iter()
        .rev()
        .copied()
        .find(|&tv| store.type_param(tv).is_some_and(|tp| tp.name == name))
}

fn resolve_type(store: &TypeStore, ctx: NameCtx<'_>, tref: &TypeRef) -> Type {
    let base = if let Some(prim) = primitive_type(&tref.name) {
        prim
    } else if let Some(tv) = (!tref.name.contains('.'))
        .then(|| resolve_type_param(store, ctx, &tref.name))
        .flatten()
    {
        Type::TypeVar(tv)
    } else {
        match resolve_class(store, ctx, &tref.name) {
            Some(id) => Type::class(
                id,
                tref.args
                    .iter()
                    .map(|arg| resolve_type_arg(store, ctx, arg))
                    .collect(),
            ),
            None => Type::Error,
        }
    };
    (0..tref.dims).fold(base, |ty, _| Type::array(ty))
}

fn resolve_type_arg(store: &TypeStore, ctx: NameCtx<'_>, arg: &TypeArg) -> Type {
    match arg {
        TypeArg::Type(t) => resolve_type(store, ctx, t),
        TypeArg::Unbounded => Type::Wildcard(WildcardBound::Unbounded),
        TypeArg::Extends(t) => {
            Type::Wildcard(WildcardBound::Extends(Box::new(resolve_type(store, ctx, t))))
        }
        TypeArg::Super(t) => {
            Type::Wildcard(WildcardBound::Super(Box::new(resolve_type(store, ctx, t))))
        }
    }
}

/// The declared type of a class, parameterized by its own type variables.
fn declared_type(store: &TypeStore, class: ClassId) -> Type {
    let args = store
        .class(class)
        .map(|def| def.type_params.iter().copied().map(Type::TypeVar).collect())
        .unwrap_or_default();
    Type::class(class, args)
}

struct DeclaredClass {
    unit: usize,
    node: NodeId,
    id: ClassId,
    /// Enclosing classes, outermost first.
    enclosing: Vec<ClassId>,
}

/// Shared results of the declaration passes.
struct Declarations {
    classes: HashMap<NodeKey, ClassId>,
    members: HashMap<NodeKey, Symbol>,
    method_type_params: HashMap<NodeKey, Vec<TypeVarId>>,
    /// Type variables visible inside each class, outer classes' first.
    class_scope: HashMap<ClassId, Vec<TypeVarId>>,
}

pub(crate) fn attribute(
    store: &mut TypeStore,
    files: Vec<SourceFile>,
) -> Vec<CompilationUnit> {
    let scopes: Vec<UnitScope> = files.iter().map(|f| UnitScope::new(&f.parsed.tree)).collect();
    let declared = declare_classes(store, &files, &scopes);
    let decls = define_headers(store, &files, &scopes, &declared);

    let store = &*store;
    files
        .into_iter()
        .enumerate()
        .map(|(unit, file)| {
            let mut body = BodyAttr {
                store,
                unit,
                parsed: &file.parsed,
                tree: &file.parsed.tree,
                scope: &scopes[unit],
                decls: &decls,
                sem: Semantics::default(),
                locals: Vec::new(),
                enclosing: Vec::new(),
                type_params: Vec::new(),
                returns: Vec::new(),
            };
            body.unit();
            let sem = body.sem;
            let ParsedUnit { tree, comments, .. } = file.parsed;
            CompilationUnit::new(file.path, file.text, tree, sem, Comments::new(comments))
        })
        .collect()
}

fn declare_classes(
    store: &mut TypeStore,
    files: &[SourceFile],
    scopes: &[UnitScope],
) -> Vec<DeclaredClass> {
    let mut out = Vec::new();
    for (unit, file) in files.iter().enumerate() {
        let tree = &file.parsed.tree;
        // (node, enclosing chain) in pre-order.
        let mut anonymous: HashMap<ClassId, usize> = HashMap::new();
        let mut stack: Vec<(NodeId, Vec<ClassId>)> = vec![(tree.root(), Vec::new())];
        while let Some((node, enclosing)) = stack.pop() {
            let Some(data) = tree.data(node) else {
                continue;
            };
            let mut inner = enclosing.clone();
            if let NodeData::Class { name, .. } = data {
                let fqn = match enclosing.last() {
                    None => scopes[unit].qualify(name),
                    Some(&outer) => {
                        let outer_name = store
                            .class(outer)
                            .map(|def| def.name.clone())
                            .unwrap_or_default();
                        if name.is_empty() {
                            let counter = anonymous.entry(outer).or_default();
                            *counter += 1;
                            format!("{outer_name}${counter}")
                        } else {
                            format!("{outer_name}.{name}")
                        }
                    }
                };
                let id = store.intern_class_id(&fqn);
                out.push(DeclaredClass {
                    unit,
                    node,
                    id,
                    enclosing: enclosing.clone(),
                });
                inner.push(id);
            }
            for child in data.children().into_iter().rev() {
                stack.push((child, inner.clone()));
            }
        }
    }
    out
}

fn modifiers_with(modifiers: Modifiers, extra: &[Modifier]) -> Modifiers {
    extra.iter().fold(modifiers, |acc, m| acc.with(*m))
}

fn annotation_ids(
    store: &TypeStore,
    ctx: NameCtx<'_>,
    tree: &SyntaxTree,
    annotations: &[NodeId],
) -> Vec<ClassId> {
    annotations
        .iter()
        .filter_map(|&a| match tree.data(a) {
            Some(NodeData::Annotation { name, .. }) => resolve_class(store, ctx, name),
            _ => None,
        })
        .collect()
}

fn define_headers(
    store: &mut TypeStore,
    files: &[SourceFile],
    scopes: &[UnitScope],
    declared: &[DeclaredClass],
) -> Declarations {
    let mut decls = Declarations {
        classes: declared.iter().map(|d| ((d.unit, d.node), d.id)).collect(),
        members: HashMap::new(),
        method_type_params: HashMap::new(),
        class_scope: HashMap::new(),
    };

    // Type parameters first, so that headers may mention any of them.
    let mut own_params: HashMap<ClassId, Vec<TypeVarId>> = HashMap::new();
    for class in declared {
        let params = files[class.unit]
            .parsed
            .type_params
            .get(&class.node)
            .map(|params| {
                params
                    .iter()
                    .map(|p| {
                        let object = store.object_type();
                        store.add_type_param(p.name.clone(), vec![object])
                    })
                    .collect()
            })
            .unwrap_or_default();
        own_params.insert(class.id, params);
    }
    for class in declared {
        let mut scope: Vec<TypeVarId> = class
            .enclosing
            .iter()
            .flat_map(|outer| own_params.get(outer).cloned().unwrap_or_default())
            .collect();
        scope.extend(own_params.get(&class.id).cloned().unwrap_or_default());
        decls.class_scope.insert(class.id, scope);
    }

    for class in declared {
        let file = &files[class.unit];
        let tree = &file.parsed.tree;
        let Some(NodeData::Class {
            name,
            kind,
            modifiers,
            annotations,
            extends,
            implements,
            members,
        }) = tree.data(class.node)
        else {
            continue;
        };
        let mut chain = class.enclosing.clone();
        chain.push(class.id);
        let type_scope = decls.class_scope.get(&class.id).cloned().unwrap_or_default();
        let own = own_params.get(&class.id).cloned().unwrap_or_default();
        let ctx = NameCtx {
            unit: &scopes[class.unit],
            enclosing: &chain,
            type_params: &type_scope,
        };
        let self_type = Type::class(class.id, own.iter().copied().map(Type::TypeVar).collect());

        if let Some(params) = file.parsed.type_params.get(&class.node) {
            let bounds: Vec<Vec<Type>> = params
                .iter()
                .map(|p| p.bounds.iter().map(|b| resolve_type(store, ctx, b)).collect())
                .collect();
            for (&tv, bounds) in own.iter().zip(bounds) {
                if !bounds.is_empty() {
                    store.set_type_param_bounds(tv, bounds);
                }
            }
        }

        let fqn = store
            .class(class.id)
            .map(|def| def.name.clone())
            .unwrap_or_default();
        let mut def = ClassDef::new(fqn, *kind).with_type_params(own.clone());
        def.modifiers = *modifiers;
        def.outer = class.enclosing.last().copied();
        def.annotations = annotation_ids(store, ctx, tree, annotations);
        let resolve_node = |store: &TypeStore, node: NodeId| {
            file.parsed
                .type_refs
                .get(&node)
                .map_or(Type::Error, |tref| resolve_type(store, ctx, tref))
        };
        match kind {
            ClassKind::Enum => {
                def.super_class = Some(Type::class(
                    store.intern_class_id("java.lang.Enum"),
                    vec![self_type.clone()],
                ));
                def.modifiers = def.modifiers.with(Modifier::Final);
            }
            ClassKind::Interface | ClassKind::Annotation => {}
            _ => {
                def.super_class = Some(match extends {
                    Some(node) => resolve_node(store, *node),
                    None => store.object_type(),
                });
            }
        }
        def.interfaces = implements.iter().map(|&n| resolve_node(store, n)).collect();
        if *kind == ClassKind::Annotation {
            def.interfaces.push(Type::class(
                store.intern_class_id("java.lang.annotation.Annotation"),
                vec![],
            ));
        }

        if name.is_empty() {
            // Anonymous: the supertype comes from the enclosing `new`.
            let outer_ctx = NameCtx {
                enclosing: &class.enclosing,
                ..ctx
            };
            if let Some(NodeData::NewClass { class_name, .. }) =
                tree.parent(class.node).and_then(|p| tree.data(p))
            {
                let sup = file
                    .parsed
                    .type_refs
                    .get(class_name)
                    .map_or(Type::Error, |tref| resolve_type(store, outer_ctx, tref));
                let is_interface = sup
                    .class_id()
                    .and_then(|id| store.class(id))
                    .is_some_and(|d| d.is_interface());
                if is_interface {
                    def.super_class = Some(store.object_type());
                    def.interfaces.push(sup);
                } else {
                    def.super_class = Some(sup);
                }
            }
        }

        let is_interface = kind.is_interface();
        for &member in members {
            match tree.data(member) {
                Some(NodeData::Variable {
                    name,
                    modifiers,
                    annotations,
                    ty,
                    ..
                }) => {
                    let field_ty = if file.parsed.enum_constants.contains(&member) {
                        self_type.clone()
                    } else {
                        ty.map_or(Type::Error, |t| resolve_node(store, t))
                    };
                    let mut field = FieldDef::new(name.to_string(), field_ty);
                    field.modifiers = if is_interface {
                        modifiers_with(
                            *modifiers,
                            &[Modifier::Public, Modifier::Static, Modifier::Final],
                        )
                    } else {
                        *modifiers
                    };
                    field.annotations = annotation_ids(store, ctx, tree, annotations);
                    let index = def.fields.len() as u32;
                    def.fields.push(field);
                    decls.members.insert(
                        (class.unit, member),
                        Symbol::Field(FieldId::new(class.id, index)),
                    );
                }
                Some(NodeData::Method {
                    name,
                    modifiers,
                    annotations,
                    return_type,
                    params,
                    body,
                }) => {
                    let method_params: Vec<TypeVarId> = file
                        .parsed
                        .type_params
                        .get(&member)
                        .map(|tps| {
                            tps.iter()
                                .map(|p| {
                                    let object = store.object_type();
                                    store.add_type_param(p.name.clone(), vec![object])
                                })
                                .collect()
                        })
                        .unwrap_or_default();
                    let mut method_scope = type_scope.clone();
                    method_scope.extend(method_params.iter().copied());
                    let mctx = NameCtx {
                        type_params: &method_scope,
                        ..ctx
                    };
                    if let Some(tps) = file.parsed.type_params.get(&member) {
                        for (&tv, p) in method_params.iter().zip(tps) {
                            let bounds: Vec<Type> =
                                p.bounds.iter().map(|b| resolve_type(store, mctx, b)).collect();
                            if !bounds.is_empty() {
                                store.set_type_param_bounds(tv, bounds);
                            }
                        }
                    }
                    let resolve_in_method = |node: NodeId| {
                        file.parsed
                            .type_refs
                            .get(&node)
                            .map_or(Type::Error, |tref| resolve_type(store, mctx, tref))
                    };
                    let param_types: Vec<Type> = params
                        .iter()
                        .map(|&p| match tree.data(p) {
                            Some(NodeData::Variable { ty: Some(t), .. }) => resolve_in_method(*t),
                            _ => Type::Error,
                        })
                        .collect();
                    let ret = return_type.map_or(Type::Void, resolve_in_method);
                    let mut method = MethodDef::new(name.to_string(), param_types, ret)
                        .with_type_params(method_params.clone());
                    method.modifiers = *modifiers;
                    if is_interface && !modifiers.contains(Modifier::Private) {
                        method.modifiers = method.modifiers.with(Modifier::Public);
                        if body.is_none() && !modifiers.is_static() {
                            method.modifiers = method.modifiers.with(Modifier::Abstract);
                        }
                    }
                    if *kind == ClassKind::Enum && name == CONSTRUCTOR_NAME {
                        method.modifiers = Modifiers::of(&[Modifier::Private]);
                    }
                    method.is_varargs = params
                        .last()
                        .is_some_and(|p| file.parsed.varargs.contains(p));
                    method.annotations = annotation_ids(store, mctx, tree, annotations);
                    let index = def.methods.len() as u32;
                    def.methods.push(method);
                    decls.members.insert(
                        (class.unit, member),
                        Symbol::Method(MethodId::new(class.id, index)),
                    );
                    decls
                        .method_type_params
                        .insert((class.unit, member), method_params);
                }
                _ => {}
            }
        }

        if *kind == ClassKind::Enum {
            let string = store.string_type();
            def.methods.push(
                MethodDef::new("values", vec![], Type::array(self_type.clone()))
                    .with_modifiers(&[Modifier::Public, Modifier::Static]),
            );
            def.methods.push(
                MethodDef::new("valueOf", vec![string], self_type.clone())
                    .with_modifiers(&[Modifier::Public, Modifier::Static]),
            );
        }
        store.define_class(class.id, def);
    }
    decls
}

/// One overload candidate, viewed from the receiver.
struct Candidate {
    id: MethodId,
    /// Parameter types after receiver substitution.
    params: Vec<Type>,
    ret: Type,
    is_varargs: bool,
    type_params: Vec<TypeVarId>,
}

struct BodyAttr<'a> {
    store: &'a TypeStore,
    unit: usize,
    parsed: &'a ParsedUnit,
    tree: &'a SyntaxTree,
    scope: &'a UnitScope,
    decls: &'a Declarations,
    sem: Semantics,
    locals: Vec<(Name, LocalId)>,
    enclosing: Vec<ClassId>,
    type_params: Vec<TypeVarId>,
    returns: Vec<Type>,
}

impl<'a> BodyAttr<'a> {
    fn tree(&self) -> &'a SyntaxTree {
        self.tree
    }

    fn ctx<R>(&self, f: impl FnOnce(NameCtx<'_>) -> R) -> R {
        f(NameCtx {
            unit: self.scope,
            enclosing: &self.enclosing,
            type_params: &self.type_params,
        })
    }

    fn record(&mut self, id: NodeId, ty: Type) -> Type {
        self.sem.set_type(id, ty.clone());
        ty
    }

    fn this_type(&self) -> Type {
        self.enclosing
            .last()
            .map_or(Type::Error, |&c| declared_type(self.store, c))
    }

    fn unit(&mut self) {
        let tree = self.tree;
        if let Some(NodeData::CompilationUnit { imports, types, .. }) = tree.data(tree.root()) {
            for &import in imports {
                self.import(import);
            }
            for &ty in types {
                self.class(ty);
            }
        }
    }

    fn import(&mut self, id: NodeId) {
        let Some(NodeData::Import {
            path,
            is_static,
            is_wildcard,
        }) = self.tree().data(id)
        else {
            return;
        };
        if *is_wildcard {
            return;
        }
        if let Some(class) = self.store.class_id(path) {
            self.sem.set_symbol(id, Symbol::Class(class));
        } else if *is_static {
            if let Some((owner, member)) = path.rsplit_once('.') {
                if let Some(owner) = self.store.class_id(owner) {
                    if let Some(sym) = self.static_member(owner, member) {
                        self.sem.set_symbol(id, sym);
                    }
                }
            }
        }
    }

    fn static_member(&self, owner: ClassId, name: &str) -> Option<Symbol> {
        let def = self.store.class(owner)?;
        if let Some(idx) = def.fields.iter().position(|f| f.name == name) {
            return Some(Symbol::Field(FieldId::new(owner, idx as u32)));
        }
        def.method_ids(owner)
            .find(|(_, m)| m.name == name)
            .map(|(id, _)| Symbol::Method(id))
    }

    // --- declarations ---------------------------------------------------

    fn class(&mut self, id: NodeId) {
        let tree = self.tree;
        let Some(NodeData::Class {
            annotations,
            extends,
            implements,
            members,
            ..
        }) = tree.data(id)
        else {
            return;
        };
        let Some(&class_id) = self.decls.classes.get(&(self.unit, id)) else {
            return;
        };
        self.sem.set_symbol(id, Symbol::Class(class_id));
        self.sem.set_decl(Symbol::Class(class_id), id);
        let ty = declared_type(self.store, class_id);
        self.record(id, ty);

        for &a in annotations {
            self.annotation(a);
        }
        let saved_params = std::mem::replace(
            &mut self.type_params,
            self.decls
                .class_scope
                .get(&class_id)
                .cloned()
                .unwrap_or_default(),
        );
        for &t in extends.iter().chain(implements) {
            self.type_node(t);
        }
        self.enclosing.push(class_id);
        let saved_locals = self.locals.len();
        for &member in members {
            match tree.data(member) {
                Some(NodeData::Method { .. }) => self.method(member),
                Some(NodeData::Variable { .. }) => self.field(member),
                Some(NodeData::Class { .. }) => self.class(member),
                Some(NodeData::Block { .. }) => {
                    self.returns.push(Type::Void);
                    self.statement(member);
                    self.returns.pop();
                }
                _ => {}
            }
        }
        self.locals.truncate(saved_locals);
        self.enclosing.pop();
        self.type_params = saved_params;
    }

    fn field(&mut self, id: NodeId) {
        let Some(NodeData::Variable {
            annotations,
            ty,
            init,
            ..
        }) = self.tree().data(id)
        else {
            return;
        };
        for &a in annotations {
            self.annotation(a);
        }
        let Some(sym) = self.decls.members.get(&(self.unit, id)).copied() else {
            return;
        };
        self.sem.set_symbol(id, sym);
        self.sem.set_decl(sym, id);
        let declared = sym
            .as_field()
            .and_then(|f| self.store.field(f))
            .map_or(Type::Error, |f| f.ty.clone());
        if let Some(t) = ty {
            self.type_node(*t);
        }
        self.record(id, declared.clone());
        if let Some(init) = init {
            self.returns.push(Type::Void);
            self.expr(*init, Some(&declared));
            self.returns.pop();
        }
    }

    fn method(&mut self, id: NodeId) {
        let Some(NodeData::Method {
            annotations,
            return_type,
            params,
            body,
            ..
        }) = self.tree().data(id)
        else {
            return;
        };
        for &a in annotations {
            self.annotation(a);
        }
        let Some(sym) = self.decls.members.get(&(self.unit, id)).copied() else {
            return;
        };
        self.sem.set_symbol(id, sym);
        self.sem.set_decl(sym, id);
        let store = self.store;
        let Some(def) = sym.as_method().and_then(|m| store.method(m)) else {
            return;
        };
        let saved_params = self.type_params.len();
        if let Some(tps) = self.decls.method_type_params.get(&(self.unit, id)) {
            self.type_params.extend(tps.iter().copied());
        }
        if let Some(t) = return_type {
            self.type_node(*t);
        }
        self.record(id, def.return_type.clone());
        let saved_locals = self.locals.len();
        for (&param, ty) in params.iter().zip(&def.params) {
            self.declare_local(param, ty.clone(), LocalKind::Parameter);
        }
        if let Some(body) = body {
            self.returns.push(def.return_type.clone());
            self.statement(*body);
            self.returns.pop();
        }
        self.locals.truncate(saved_locals);
        self.type_params.truncate(saved_params);
    }

    fn annotation(&mut self, id: NodeId) {
        let Some(NodeData::Annotation { name, args }) = self.tree().data(id) else {
            return;
        };
        let class = self.ctx(|ctx| resolve_class(self.store, ctx, name));
        let Some(class) = class else {
            self.record(id, Type::Error);
            for &arg in args {
                self.expr(arg, None);
            }
            return;
        };
        self.sem.set_symbol(id, Symbol::Class(class));
        self.record(id, Type::class(class, vec![]));
        for &arg in args {
            let (element, value) = match self.tree().data(arg) {
                Some(NodeData::Assignment { lhs, rhs }) => {
                    let key = self.tree().data(*lhs).and_then(|d| d.name()).cloned();
                    (key.unwrap_or_default(), Some((*lhs, *rhs)))
                }
                _ => (Name::new("value"), None),
            };
            let element = self
                .store
                .class(class)
                .and_then(|def| def.method_ids(class).find(|(_, m)| m.name == element.as_str()))
                .map(|(mid, m)| (mid, m.return_type.clone()));
            let expected = element.as_ref().map(|(_, t)| t.clone());
            match value {
                Some((lhs, rhs)) => {
                    if let Some((mid, _)) = &element {
                        self.sem.set_symbol(lhs, Symbol::Method(*mid));
                    }
                    let ty = expected.clone().unwrap_or(Type::Error);
                    self.record(lhs, ty.clone());
                    self.expr(rhs, expected.as_ref());
                    self.record(arg, ty);
                }
                None => {
                    self.expr(arg, expected.as_ref());
                }
            }
        }
    }

    fn type_node(&mut self, id: NodeId) -> Type {
        let ty = match self.parsed.type_refs.get(&id) {
            Some(tref) => self.ctx(|ctx| resolve_type(self.store, ctx, tref)),
            None => Type::Error,
        };
        let mut base = &ty;
        while let Type::Array(elem) = base {
            base = elem;
        }
        if let Some(class) = base.class_id() {
            self.sem.set_symbol(id, Symbol::Class(class));
        }
        self.record(id, ty)
    }

    fn declare_local(&mut self, id: NodeId, ty: Type, kind: LocalKind) -> LocalId {
        let (name, modifiers, annotations) = match self.tree().data(id) {
            Some(NodeData::Variable {
                name,
                modifiers,
                annotations,
                ..
            }) => (name.clone(), *modifiers, annotations.as_slice()),
            _ => (Name::default(), Modifiers::NONE, &[][..]),
        };
        for &a in annotations {
            self.annotation(a);
        }
        if let Some(NodeData::Variable { ty: Some(t), .. }) = self.tree().data(id) {
            self.type_node(*t);
        }
        let local = self.sem.add_local(LocalVar {
            name: name.clone(),
            ty: ty.clone(),
            modifiers,
            decl: id,
            kind,
        });
        self.sem.set_symbol(id, Symbol::Local(local));
        self.record(id, ty);
        self.locals.push((name, local));
        local
    }

    fn declared_type_of(&self, var: NodeId) -> Type {
        match self.tree().data(var) {
            Some(NodeData::Variable { ty: Some(t), .. }) => match self.parsed.type_refs.get(t) {
                Some(tref) => self.ctx(|ctx| resolve_type(self.store, ctx, tref)),
                None => Type::Error,
            },
            _ => Type::Error,
        }
    }

    // --- statements -----------------------------------------------------

    fn statement(&mut self, id: NodeId) {
        let tree = self.tree;
        let Some(data) = tree.data(id) else {
            return;
        };
        match data {
            NodeData::Block { stmts } => {
                let mark = self.locals.len();
                for &s in stmts {
                    self.statement(s);
                }
                self.locals.truncate(mark);
            }
            NodeData::Variable { init, .. } => {
                let ty = self.declared_type_of(id);
                self.declare_local(id, ty.clone(), LocalKind::Local);
                if let Some(init) = init {
                    self.expr(*init, Some(&ty));
                }
            }
            NodeData::Class { .. } => self.class(id),
            NodeData::ExpressionStatement { expr } => {
                self.expr(*expr, None);
            }
            NodeData::Return { expr } => {
                if let Some(expr) = expr {
                    let expected = self.returns.last().cloned();
                    self.expr(*expr, expected.as_ref());
                }
            }
            NodeData::If {
                cond,
                then_branch,
                else_branch,
            } => {
                self.expr(*cond, Some(&Type::boolean()));
                self.statement(*then_branch);
                if let Some(e) = else_branch {
                    self.statement(*e);
                }
            }
            NodeData::While { cond, body } | NodeData::DoWhile { body, cond } => {
                self.expr(*cond, Some(&Type::boolean()));
                self.statement(*body);
            }
            NodeData::For {
                init,
                cond,
                update,
                body,
            } => {
                let mark = self.locals.len();
                for &s in init.iter().chain(update) {
                    self.statement(s);
                }
                if let Some(cond) = cond {
                    self.expr(*cond, Some(&Type::boolean()));
                }
                self.statement(*body);
                self.locals.truncate(mark);
            }
            NodeData::EnhancedFor { var, expr, body } => {
                let mark = self.locals.len();
                self.expr(*expr, None);
                let ty = self.declared_type_of(*var);
                self.declare_local(*var, ty, LocalKind::Local);
                self.statement(*body);
                self.locals.truncate(mark);
            }
            NodeData::Throw { expr } => {
                self.expr(*expr, None);
            }
            NodeData::Assert { cond, detail } => {
                self.expr(*cond, Some(&Type::boolean()));
                if let Some(d) = detail {
                    self.expr(*d, None);
                }
            }
            NodeData::Synchronized { lock, body } => {
                self.expr(*lock, None);
                self.statement(*body);
            }
            NodeData::Switch { selector, cases } => {
                let selector_ty = self.expr(*selector, None);
                let enum_class = selector_ty.class_id().filter(|&c| {
                    self.store
                        .class(c)
                        .is_some_and(|d| d.kind == ClassKind::Enum)
                });
                let mark = self.locals.len();
                for &case in cases {
                    let Some(NodeData::Case { labels, body }) = tree.data(case) else {
                        continue;
                    };
                    for &label in labels {
                        let constant = enum_class.and_then(|c| {
                            let name = tree.data(label)?.name()?;
                            let fields = &self.store.class(c)?.fields;
                            let idx = fields.iter().position(|f| f.name == name.as_str())?;
                            Some(FieldId::new(c, idx as u32))
                        });
                        match constant {
                            Some(field)
                                if tree.kind(label) == Some(vigil_syntax::NodeKind::Identifier) =>
                            {
                                self.sem.set_symbol(label, Symbol::Field(field));
                                self.record(label, selector_ty.clone());
                            }
                            _ => {
                                self.expr(label, Some(&selector_ty));
                            }
                        }
                    }
                    for &s in body {
                        self.statement(s);
                    }
                }
                self.locals.truncate(mark);
            }
            NodeData::Try {
                resources,
                body,
                catches,
                finally,
            } => {
                let mark = self.locals.len();
                for &r in resources {
                    let ty = self.declared_type_of(r);
                    self.declare_local(r, ty.clone(), LocalKind::Resource);
                    if let Some(NodeData::Variable { init: Some(init), .. }) = tree.data(r) {
                        self.expr(*init, Some(&ty));
                    }
                }
                self.statement(*body);
                self.locals.truncate(mark);
                for &c in catches {
                    let Some(NodeData::Catch { param, body }) = tree.data(c) else {
                        continue;
                    };
                    let mark = self.locals.len();
                    let ty = self.declared_type_of(*param);
                    self.declare_local(*param, ty, LocalKind::ExceptionParameter);
                    self.statement(*body);
                    self.locals.truncate(mark);
                }
                if let Some(f) = finally {
                    self.statement(*f);
                }
            }
            NodeData::Case { body, .. } => {
                for &s in body {
                    self.statement(s);
                }
            }
            NodeData::Break { .. } | NodeData::Continue { .. } => {}
            _ if data.kind().is_expression() => {
                self.expr(id, None);
            }
            _ => {}
        }
    }

    // --- expressions ----------------------------------------------------

    fn lookup_local(&self, name: &str) -> Option<LocalId> {
        self.locals
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, id)| *id)
    }

    fn unboxed(&self, ty: &Type) -> Option<PrimitiveType> {
        ty.as_primitive().or_else(|| unbox_type(self.store, ty))
    }

    fn boxed(&self, ty: &Type) -> Type {
        match ty {
            Type::Primitive(p) => box_primitive(self.store, *p).unwrap_or(Type::Error),
            other => other.clone(),
        }
    }

    fn is_string(&self, ty: &Type) -> bool {
        is_same_type(self.store, ty, &self.store.string_type())
    }

    fn numeric_promotion(&self, a: &Type, b: &Type) -> Type {
        match (self.unboxed(a), self.unboxed(b)) {
            (Some(x), Some(y)) if x.is_numeric() && y.is_numeric() => {
                let widest = [
                    PrimitiveType::Double,
                    PrimitiveType::Float,
                    PrimitiveType::Long,
                ]
                .into_iter()
                .find(|p| x == *p || y == *p)
                .unwrap_or(PrimitiveType::Int);
                Type::Primitive(widest)
            }
            _ => Type::Error,
        }
    }

    fn unary_promotion(&self, a: &Type) -> Type {
        match self.unboxed(a) {
            Some(PrimitiveType::Byte | PrimitiveType::Short | PrimitiveType::Char) => Type::int(),
            Some(p) => Type::Primitive(p),
            None => Type::Error,
        }
    }

    /// Replaces wildcard arguments by a usable bound.
    fn capture(&self, ty: Type) -> Type {
        match ty {
            Type::Wildcard(WildcardBound::Extends(bound)) => *bound,
            Type::Wildcard(_) => self.store.object_type(),
            other => other,
        }
    }

    /// Substitution that views `owner`'s members from `site`; `None` for raw
    /// views.
    fn site_subst(&self, site: &Type, owner: ClassId) -> Option<HashMap<TypeVarId, Type>> {
        let def = self.store.class(owner)?;
        if def.type_params.is_empty() {
            return Some(HashMap::new());
        }
        let view = instantiate_as_supertype(self.store, site, owner)?;
        if view.type_args().is_empty() {
            return None;
        }
        Some(
            def.type_params
                .iter()
                .copied()
                .zip(view.type_args().iter().cloned().map(|a| self.capture(a)))
                .collect(),
        )
    }

    fn member_type(&self, site: &Type, owner: ClassId, ty: &Type) -> Type {
        match self.site_subst(site, owner) {
            Some(subst) => substitute(ty, &subst),
            None => erasure(self.store, ty),
        }
    }

    /// The class whose members `site` exposes.
    fn class_view(&self, site: &Type) -> Option<(Type, ClassId)> {
        match site {
            Type::Class(ct) => Some((site.clone(), ct.def)),
            Type::TypeVar(tv) => {
                let bound = self
                    .store
                    .type_param(*tv)
                    .and_then(|tp| tp.upper_bounds.first().cloned())
                    .unwrap_or_else(|| self.store.object_type());
                self.class_view(&bound)
            }
            Type::Intersection(parts) => parts.first().and_then(|p| self.class_view(p)),
            Type::Array(_) => Some((self.store.object_type(), self.store.well_known().object)),
            _ => None,
        }
    }

    fn find_field(&self, site: &Type, name: &str) -> Option<(FieldId, Type)> {
        let (site, class) = self.class_view(site)?;
        for owner in supertype_closure(self.store, class) {
            let Some(def) = self.store.class(owner) else {
                continue;
            };
            if let Some(idx) = def.fields.iter().position(|f| f.name == name) {
                let ty = self.member_type(&site, owner, &def.fields[idx].ty);
                return Some((FieldId::new(owner, idx as u32), ty));
            }
        }
        None
    }

    fn candidates(&self, site: &Type, name: &str) -> Vec<Candidate> {
        let Some((site, class)) = self.class_view(site) else {
            return Vec::new();
        };
        let owners = if name == CONSTRUCTOR_NAME {
            vec![class]
        } else {
            supertype_closure(self.store, class)
        };
        let mut out: Vec<Candidate> = Vec::new();
        for owner in owners {
            let Some(def) = self.store.class(owner) else {
                continue;
            };
            let subst = self.site_subst(&site, owner);
            for (id, method) in def.method_ids(owner) {
                if method.name != name {
                    continue;
                }
                let view = |ty: &Type| match &subst {
                    Some(subst) => substitute(ty, subst),
                    None => erasure(self.store, ty),
                };
                let params: Vec<Type> = method.params.iter().map(view).collect();
                let erased: Vec<Type> = params.iter().map(|p| erasure(self.store, p)).collect();
                let overridden = out.iter().any(|c| {
                    c.params.len() == erased.len()
                        && c.params
                            .iter()
                            .zip(&erased)
                            .all(|(a, b)| is_same_type(self.store, &erasure(self.store, a), b))
                });
                if overridden {
                    continue;
                }
                out.push(Candidate {
                    id,
                    ret: view(&method.return_type),
                    params,
                    is_varargs: method.is_varargs,
                    type_params: method.type_params.clone(),
                });
            }
        }
        out
    }

    /// Method type variables replaced by their erasure, for applicability.
    fn erase_method_vars(&self, ty: &Type, vars: &[TypeVarId]) -> Type {
        let subst: HashMap<TypeVarId, Type> = vars
            .iter()
            .map(|&tv| (tv, erasure(self.store, &Type::TypeVar(tv))))
            .collect();
        substitute(ty, &subst)
    }

    fn applicable(&self, c: &Candidate, args: &[Type], phase: u8) -> bool {
        let params: Vec<Type> = c
            .params
            .iter()
            .map(|p| self.erase_method_vars(p, &c.type_params))
            .collect();
        let fits = |arg: &Type, param: &Type| {
            arg.is_errorish()
                || match phase {
                    1 => is_subtype(self.store, arg, param),
                    _ => is_assignable(self.store, arg, param),
                }
        };
        if phase < 3 {
            return params.len() == args.len()
                && args.iter().zip(&params).all(|(a, p)| fits(a, p));
        }
        if !c.is_varargs || params.is_empty() || args.len() + 1 < params.len() {
            return false;
        }
        let fixed = params.len() - 1;
        let Some(elem) = params[fixed].array_element() else {
            return false;
        };
        args[..fixed].iter().zip(&params).all(|(a, p)| fits(a, p))
            && args[fixed..].iter().all(|a| fits(a, elem))
    }

    fn more_specific(&self, a: &Candidate, b: &Candidate) -> bool {
        a.params.len() == b.params.len()
            && a.params.iter().zip(&b.params).all(|(x, y)| {
                is_subtype(
                    self.store,
                    &self.erase_method_vars(x, &a.type_params),
                    &self.erase_method_vars(y, &b.type_params),
                )
            })
    }

    /// Picks an overload: strict, then loose, then varargs invocation.
    fn select(&self, candidates: &[Candidate], args: &[Type]) -> Option<(usize, bool)> {
        for phase in 1..=3 {
            let applicable: Vec<usize> = (0..candidates.len())
                .filter(|&i| self.applicable(&candidates[i], args, phase))
                .collect();
            let best = applicable.iter().copied().find(|&i| {
                applicable
                    .iter()
                    .all(|&j| i == j || self.more_specific(&candidates[i], &candidates[j]))
            });
            if let Some(best) = best.or_else(|| applicable.first().copied()) {
                return Some((best, phase == 3));
            }
        }
        None
    }

    fn unify(
        &self,
        param: &Type,
        arg: &Type,
        vars: &[TypeVarId],
        out: &mut HashMap<TypeVarId, Type>,
    ) {
        match (param, arg) {
            (_, arg) if arg.is_errorish() || *arg == Type::Null => {}
            (Type::TypeVar(tv), _) if vars.contains(tv) => {
                out.entry(*tv).or_insert_with(|| self.boxed(arg));
            }
            (Type::Array(p), Type::Array(a)) => self.unify(p, a, vars, out),
            (Type::Class(p), _) if !p.args.is_empty() => {
                if let Some(view) = instantiate_as_supertype(self.store, arg, p.def) {
                    for (pa, aa) in p.args.iter().zip(view.type_args()) {
                        let pa = match pa {
                            Type::Wildcard(WildcardBound::Extends(b) | WildcardBound::Super(b)) => {
                                b.as_ref()
                            }
                            other => other,
                        };
                        let aa = self.capture(aa.clone());
                        self.unify(pa, &aa, vars, out);
                    }
                }
            }
            _ => {}
        }
    }

    fn instantiate(
        &self,
        c: &Candidate,
        args: &[Type],
        varargs: bool,
        expected: Option<&Type>,
    ) -> HashMap<TypeVarId, Type> {
        let mut out = HashMap::new();
        if c.type_params.is_empty() {
            return out;
        }
        for (idx, arg) in args.iter().enumerate() {
            let param = if varargs && idx + 1 >= c.params.len() {
                c.params
                    .last()
                    .and_then(|p| p.array_element().cloned())
                    .unwrap_or(Type::Error)
            } else {
                c.params.get(idx).cloned().unwrap_or(Type::Error)
            };
            self.unify(&param, arg, &c.type_params, &mut out);
        }
        if let Some(expected) = expected {
            self.unify(&c.ret, expected, &c.type_params, &mut out);
        }
        for &tv in &c.type_params {
            out.entry(tv)
                .or_insert_with(|| erasure(self.store, &Type::TypeVar(tv)));
        }
        out
    }

    /// The single abstract method of a functional interface type, as
    /// `(params, return)` viewed from `ty`.
    fn functional_signature(&self, ty: &Type) -> Option<(Vec<Type>, Type)> {
        let (site, class) = self.class_view(ty)?;
        if !self.store.class(class)?.is_interface() {
            return None;
        }
        let site = match &site {
            Type::Class(ct) => Type::class(
                ct.def,
                ct.args.iter().cloned().map(|a| match a {
                    Type::Wildcard(WildcardBound::Super(b)) => *b,
                    other => self.capture(other),
                })
                .collect(),
            ),
            other => other.clone(),
        };
        for owner in supertype_closure(self.store, class) {
            let def = self.store.class(owner)?;
            if let Some(m) = def
                .methods
                .iter()
                .find(|m| m.modifiers.is_abstract() && !m.is_static())
            {
                let params = m
                    .params
                    .iter()
                    .map(|p| self.member_type(&site, owner, p))
                    .collect();
                let ret = self.member_type(&site, owner, &m.return_type);
                return Some((params, ret));
            }
        }
        None
    }

    fn is_poly(&self, id: NodeId) -> bool {
        matches!(
            self.tree().data(id),
            Some(NodeData::Lambda { .. } | NodeData::MemberReference { .. })
        )
    }

    /// Attributes arguments, deferring lambdas and method references until the
    /// target method is known.
    fn arguments(&mut self, args: &[NodeId]) -> Vec<Type> {
        args.iter()
            .map(|&a| {
                if self.is_poly(a) {
                    Type::Unknown
                } else {
                    self.expr(a, None)
                }
            })
            .collect()
    }

    fn finish_arguments(&mut self, args: &[NodeId], params: &[Type], varargs: bool) {
        for (idx, &arg) in args.iter().enumerate() {
            if !self.is_poly(arg) {
                continue;
            }
            let param = if varargs && idx + 1 >= params.len() {
                params.last().and_then(|p| p.array_element().cloned())
            } else {
                params.get(idx).cloned()
            };
            self.expr(arg, param.as_ref());
        }
    }

    fn invoke(
        &mut self,
        node: NodeId,
        select: Option<NodeId>,
        site: &Type,
        name: &str,
        args: &[NodeId],
        arg_types: &[Type],
        expected: Option<&Type>,
    ) -> Type {
        let candidates = self.candidates(site, name);
        let Some((idx, varargs)) = self.select(&candidates, arg_types) else {
            self.finish_arguments(args, &[], false);
            return self.record(node, Type::Error);
        };
        let chosen = &candidates[idx];
        let inferred = self.instantiate(chosen, arg_types, varargs, expected);
        let params: Vec<Type> = chosen
            .params
            .iter()
            .map(|p| substitute(p, &inferred))
            .collect();
        let ret = substitute(&chosen.ret, &inferred);
        let id = chosen.id;
        self.sem.set_symbol(node, Symbol::Method(id));
        if let Some(select) = select {
            self.sem.set_symbol(select, Symbol::Method(id));
        }
        self.finish_arguments(args, &params, varargs);
        if name == CONSTRUCTOR_NAME {
            return Type::Void;
        }
        self.record(node, ret)
    }

    fn expr(&mut self, id: NodeId, expected: Option<&Type>) -> Type {
        let tree = self.tree;
        let Some(data) = tree.data(id) else {
            return Type::Error;
        };
        let ty = match data {
            NodeData::Literal { value } => match value {
                None => Type::Null,
                Some(c) => c
                    .primitive_type()
                    .map_or_else(|| self.store.string_type(), Type::Primitive),
            },
            NodeData::Identifier { name } => return self.identifier(id, name),
            NodeData::MemberSelect { expr, name } => return self.member_select(id, *expr, name),
            NodeData::MethodInvocation {
                method_select,
                args,
            } => return self.method_invocation(id, *method_select, args, expected),
            NodeData::NewClass {
                class_name,
                args,
                body,
            } => return self.new_class(id, *class_name, args, *body, expected),
            NodeData::NewArray {
                elem_type,
                dims,
                init,
            } => {
                if let Some(t) = elem_type {
                    self.type_node(*t);
                }
                let ty = match self.parsed.type_refs.get(&id) {
                    Some(tref) => self.ctx(|ctx| resolve_type(self.store, ctx, tref)),
                    None => expected.cloned().unwrap_or(Type::Error),
                };
                for &d in dims {
                    self.expr(d, Some(&Type::int()));
                }
                let elem = ty.array_element().cloned();
                for &e in init.iter().flatten() {
                    self.expr(e, elem.as_ref());
                }
                ty
            }
            NodeData::MemberReference { expr, name } => {
                self.member_reference(id, *expr, name, expected);
                expected.cloned().unwrap_or(Type::Unknown)
            }
            NodeData::Binary { op, lhs, rhs } => {
                let l = self.expr(*lhs, None);
                let r = self.expr(*rhs, None);
                match op {
                    _ if op.is_comparison() || op.is_conditional() => Type::boolean(),
                    BinaryOp::Add if self.is_string(&l) || self.is_string(&r) => {
                        self.store.string_type()
                    }
                    _ if op.is_shift() => self.unary_promotion(&l),
                    BinaryOp::BitAnd | BinaryOp::BitOr | BinaryOp::BitXor
                        if self.unboxed(&l) == Some(PrimitiveType::Boolean) =>
                    {
                        Type::boolean()
                    }
                    _ => self.numeric_promotion(&l, &r),
                }
            }
            NodeData::Unary { op, operand } => {
                let t = self.expr(*operand, None);
                match op {
                    UnaryOp::Not => Type::boolean(),
                    _ if op.is_increment_or_decrement() => t,
                    _ => self.unary_promotion(&t),
                }
            }
            NodeData::Assignment { lhs, rhs } => {
                let l = self.expr(*lhs, None);
                self.expr(*rhs, Some(&l));
                l
            }
            NodeData::CompoundAssignment { lhs, rhs, .. } => {
                let l = self.expr(*lhs, None);
                self.expr(*rhs, None);
                l
            }
            NodeData::Conditional {
                cond,
                then_expr,
                else_expr,
            } => {
                self.expr(*cond, Some(&Type::boolean()));
                let a = self.expr(*then_expr, expected);
                let b = self.expr(*else_expr, expected);
                self.conditional_type(&a, &b)
            }
            NodeData::Parenthesized { expr } => self.expr(*expr, expected),
            NodeData::TypeCast { ty, expr } => {
                let target = self.type_node(*ty);
                self.expr(*expr, Some(&target));
                target
            }
            NodeData::InstanceOf { expr, ty } => {
                self.expr(*expr, None);
                self.type_node(*ty);
                Type::boolean()
            }
            NodeData::ArrayAccess { array, index } => {
                let a = self.expr(*array, None);
                self.expr(*index, Some(&Type::int()));
                a.array_element().cloned().unwrap_or(Type::Error)
            }
            NodeData::Lambda { params, body } => {
                self.lambda(params, *body, expected);
                expected.cloned().unwrap_or(Type::Unknown)
            }
            NodeData::Type { .. } => return self.type_node(id),
            NodeData::Annotation { .. } => {
                self.annotation(id);
                return self.sem.type_of(id).cloned().unwrap_or(Type::Error);
            }
            _ => Type::Error,
        };
        self.record(id, ty)
    }

    fn conditional_type(&self, a: &Type, b: &Type) -> Type {
        if is_same_type(self.store, a, b) {
            return a.clone();
        }
        match (a, b) {
            (Type::Null, other) | (other, Type::Null) => self.boxed(other),
            _ if a.is_primitive() || b.is_primitive() => {
                match (self.unboxed(a), self.unboxed(b)) {
                    (Some(x), Some(y)) if x == y => Type::Primitive(x),
                    _ => self.numeric_promotion(a, b),
                }
            }
            _ if is_subtype(self.store, a, b) => b.clone(),
            _ if is_subtype(self.store, b, a) => a.clone(),
            _ => self.store.object_type(),
        }
    }

    fn identifier(&mut self, id: NodeId, name: &str) -> Type {
        if name == "this" {
            let ty = self.this_type();
            return self.record(id, ty);
        }
        if name == "super" {
            let ty = self
                .enclosing
                .last()
                .and_then(|&c| self.store.class(c))
                .and_then(|d| d.super_class.clone())
                .unwrap_or_else(|| self.store.object_type());
            return self.record(id, ty);
        }
        if let Some(local) = self.lookup_local(name) {
            self.sem.set_symbol(id, Symbol::Local(local));
            let ty = self
                .sem
                .local(local)
                .map_or(Type::Error, |l| l.ty.clone());
            return self.record(id, ty);
        }
        for &class in self.enclosing.clone().iter().rev() {
            let site = declared_type(self.store, class);
            if let Some((field, ty)) = self.find_field(&site, name) {
                self.sem.set_symbol(id, Symbol::Field(field));
                return self.record(id, ty);
            }
        }
        if let Some((field, ty)) = self.static_import_field(name) {
            self.sem.set_symbol(id, Symbol::Field(field));
            return self.record(id, ty);
        }
        if let Some(class) = self.ctx(|ctx| resolve_class(self.store, ctx, name)) {
            self.sem.set_symbol(id, Symbol::Class(class));
            return self.record(id, Type::class(class, vec![]));
        }
        // A package name; leave it untyped.
        Type::Unknown
    }

    fn static_import_field(&self, name: &str) -> Option<(FieldId, Type)> {
        self.static_import_owners(name).find_map(|owner| {
            let def = self.store.class(owner)?;
            let idx = def.fields.iter().position(|f| f.name == name && f.is_static())?;
            Some((FieldId::new(owner, idx as u32), def.fields[idx].ty.clone()))
        })
    }

    fn static_import_owners<'s>(&'s self, name: &'s str) -> impl Iterator<Item = ClassId> + 's {
        self.scope
            .imports
            .iter()
            .filter(|(_, is_static, _)| *is_static)
            .filter_map(move |(path, _, is_wildcard)| {
                if *is_wildcard {
                    self.store.class_id(path)
                } else {
                    let (owner, member) = path.rsplit_once('.')?;
                    (member == name).then(|| self.store.class_id(owner)).flatten()
                }
            })
    }

    /// Dotted text of an identifier chain, if `id` is one.
    fn qualified_text(&self, id: NodeId) -> Option<String> {
        match self.tree().data(id)? {
            NodeData::Identifier { name } => Some(name.to_string()),
            NodeData::MemberSelect { expr, name } => {
                Some(format!("{}.{name}", self.qualified_text(*expr)?))
            }
            _ => None,
        }
    }

    fn member_select(&mut self, id: NodeId, expr: NodeId, name: &str) -> Type {
        let site = self.expr(expr, None);
        let qualifier = self.sem.symbol(expr);
        if site == Type::Unknown && qualifier.is_none() {
            // Qualified by a package.
            if let Some(class) = self
                .qualified_text(id)
                .and_then(|text| self.store.class_id(&text))
            {
                self.sem.set_symbol(id, Symbol::Class(class));
                return self.record(id, Type::class(class, vec![]));
            }
            return Type::Unknown;
        }
        if name == "length" && site.is_array() {
            return self.record(id, Type::int());
        }
        if name == "this" {
            return self.record(id, site);
        }
        if let Some((field, ty)) = self.find_field(&site, name) {
            self.sem.set_symbol(id, Symbol::Field(field));
            return self.record(id, ty);
        }
        if let Some(Symbol::Class(outer)) = qualifier {
            let nested = self
                .store
                .class(outer)
                .and_then(|d| self.store.class_id(&format!("{}.{name}", d.name)));
            if let Some(nested) = nested {
                self.sem.set_symbol(id, Symbol::Class(nested));
                return self.record(id, Type::class(nested, vec![]));
            }
        }
        self.record(id, Type::Error)
    }

    fn method_invocation(
        &mut self,
        id: NodeId,
        select: NodeId,
        args: &[NodeId],
        expected: Option<&Type>,
    ) -> Type {
        match self.tree().data(select) {
            Some(NodeData::Identifier { name }) => {
                let arg_types = self.arguments(args);
                if name == "this" || name == "super" {
                    let site = self.expr(select, None);
                    self.invoke(id, Some(select), &site, CONSTRUCTOR_NAME, args, &arg_types, None);
                    return self.record(id, Type::Void);
                }
                for &class in self.enclosing.clone().iter().rev() {
                    let site = declared_type(self.store, class);
                    if !self.candidates(&site, name).is_empty() {
                        return self
                            .invoke(id, Some(select), &site, name, args, &arg_types, expected);
                    }
                }
                let owner = self
                    .static_import_owners(name)
                    .find(|&owner| {
                        self.store
                            .class(owner)
                            .is_some_and(|d| d.methods.iter().any(|m| m.name == name.as_str()))
                    });
                match owner {
                    Some(owner) => {
                        let site = Type::class(owner, vec![]);
                        self.invoke(id, Some(select), &site, name, args, &arg_types, expected)
                    }
                    None => {
                        self.finish_arguments(args, &[], false);
                        self.record(id, Type::Error)
                    }
                }
            }
            Some(NodeData::MemberSelect { expr, name }) => {
                let site = self.expr(*expr, None);
                let arg_types = self.arguments(args);
                self.invoke(id, Some(select), &site, name, args, &arg_types, expected)
            }
            _ => {
                self.expr(select, None);
                self.arguments(args);
                self.record(id, Type::Error)
            }
        }
    }

    fn new_class(
        &mut self,
        id: NodeId,
        class_name: NodeId,
        args: &[NodeId],
        body: Option<NodeId>,
        expected: Option<&Type>,
    ) -> Type {
        let mut ty = self.type_node(class_name);
        let diamond = self
            .parsed
            .type_refs
            .get(&class_name)
            .is_some_and(|t| t.diamond);
        if diamond {
            if let (Type::Class(ct), Some(expected)) = (&ty, expected) {
                let arity = self
                    .store
                    .class(ct.def)
                    .map_or(0, |d| d.type_params.len());
                let args: Vec<Type> = expected
                    .type_args()
                    .iter()
                    .cloned()
                    .map(|a| self.capture(a))
                    .collect();
                if args.len() == arity {
                    ty = Type::class(ct.def, args);
                }
            }
            self.record(class_name, ty.clone());
        }
        let arg_types = self.arguments(args);
        let is_interface = ty
            .class_id()
            .and_then(|c| self.store.class(c))
            .is_some_and(|d| d.is_interface());
        let ctor_site = if is_interface {
            self.store.object_type()
        } else {
            ty.clone()
        };
        self.invoke(id, None, &ctor_site, CONSTRUCTOR_NAME, args, &arg_types, None);
        let result = match body {
            Some(body) => {
                self.class(body);
                self.decls
                    .classes
                    .get(&(self.unit, body))
                    .map_or(ty, |&anon| Type::class(anon, vec![]))
            }
            None => ty,
        };
        self.record(id, result)
    }

    fn member_reference(&mut self, id: NodeId, expr: NodeId, name: &str, expected: Option<&Type>) {
        let site = self.expr(expr, None);
        let is_type = matches!(self.sem.symbol(expr), Some(Symbol::Class(_)));
        let Some((params, _)) = expected.and_then(|e| self.functional_signature(e)) else {
            return;
        };
        let arity = params.len();
        let found = self.candidates(&site, name).into_iter().find(|c| {
            let is_static = self.store.method(c.id).is_some_and(|m| m.is_static());
            if name == CONSTRUCTOR_NAME || is_static || !is_type {
                c.params.len() == arity
            } else {
                c.params.len() + 1 == arity
            }
        });
        if let Some(c) = found {
            self.sem.set_symbol(id, Symbol::Method(c.id));
        }
    }

    fn lambda(&mut self, params: &[NodeId], body: NodeId, expected: Option<&Type>) {
        let signature = expected.and_then(|e| self.functional_signature(e));
        let mark = self.locals.len();
        for (idx, &param) in params.iter().enumerate() {
            let explicit = matches!(
                self.tree().data(param),
                Some(NodeData::Variable { ty: Some(_), .. })
            );
            let ty = if explicit {
                self.declared_type_of(param)
            } else {
                signature
                    .as_ref()
                    .and_then(|(ps, _)| ps.get(idx).cloned())
                    .unwrap_or(Type::Unknown)
            };
            self.declare_local(param, ty, LocalKind::Parameter);
        }
        let ret = signature.map(|(_, r)| r);
        if matches!(self.tree().data(body), Some(NodeData::Block { .. })) {
            self.returns.push(ret.unwrap_or(Type::Unknown));
            self.statement(body);
            self.returns.pop();
        } else {
            self.expr(body, ret.as_ref());
        }
        self.locals.truncate(mark);
    }
}
