use vigil_core::TextRange;
use vigil_types::{ClassKind, Constant, Modifiers};

use crate::{BinaryOp, Name, NodeId, NodeKind, UnaryOp};

/// Payload of one tree node. Child links are [`NodeId`]s into the owning
/// [`SyntaxTree`].
#[derive(Clone, Debug, PartialEq)]
pub enum NodeData {
    CompilationUnit {
        package: Option<NodeId>,
        imports: Vec<NodeId>,
        types: Vec<NodeId>,
    },
    Package {
        name: Name,
    },
    Import {
        /// Dotted path without the trailing `.*` of wildcard imports.
        path: Name,
        is_static: bool,
        is_wildcard: bool,
    },
    Class {
        name: Name,
        kind: ClassKind,
        modifiers: Modifiers,
        annotations: Vec<NodeId>,
        extends: Option<NodeId>,
        implements: Vec<NodeId>,
        members: Vec<NodeId>,
    },
    Method {
        name: Name,
        modifiers: Modifiers,
        annotations: Vec<NodeId>,
        /// `None` for constructors.
        return_type: Option<NodeId>,
        params: Vec<NodeId>,
        body: Option<NodeId>,
    },
    /// Fields, locals, parameters, resources and catch parameters.
    Variable {
        name: Name,
        modifiers: Modifiers,
        annotations: Vec<NodeId>,
        /// `None` for implicitly typed lambda parameters.
        ty: Option<NodeId>,
        init: Option<NodeId>,
    },
    Block {
        stmts: Vec<NodeId>,
    },
    ExpressionStatement {
        expr: NodeId,
    },
    Return {
        expr: Option<NodeId>,
    },
    If {
        cond: NodeId,
        then_branch: NodeId,
        else_branch: Option<NodeId>,
    },
    While {
        cond: NodeId,
        body: NodeId,
    },
    DoWhile {
        body: NodeId,
        cond: NodeId,
    },
    For {
        init: Vec<NodeId>,
        cond: Option<NodeId>,
        update: Vec<NodeId>,
        body: NodeId,
    },
    EnhancedFor {
        var: NodeId,
        expr: NodeId,
        body: NodeId,
    },
    Throw {
        expr: NodeId,
    },
    Break {
        label: Option<Name>,
    },
    Continue {
        label: Option<Name>,
    },
    Assert {
        cond: NodeId,
        detail: Option<NodeId>,
    },
    Synchronized {
        lock: NodeId,
        body: NodeId,
    },
    Switch {
        selector: NodeId,
        cases: Vec<NodeId>,
    },
    Case {
        /// Empty for `default:`.
        labels: Vec<NodeId>,
        body: Vec<NodeId>,
    },
    Try {
        resources: Vec<NodeId>,
        body: NodeId,
        catches: Vec<NodeId>,
        finally: Option<NodeId>,
    },
    Catch {
        param: NodeId,
        body: NodeId,
    },
    MethodInvocation {
        /// An `Identifier` for unqualified calls, a `MemberSelect` otherwise.
        method_select: NodeId,
        args: Vec<NodeId>,
    },
    NewClass {
        class_name: NodeId,
        args: Vec<NodeId>,
        /// Anonymous class body.
        body: Option<NodeId>,
    },
    NewArray {
        elem_type: Option<NodeId>,
        dims: Vec<NodeId>,
        init: Option<Vec<NodeId>>,
    },
    MemberSelect {
        expr: NodeId,
        name: Name,
    },
    MemberReference {
        expr: NodeId,
        name: Name,
    },
    Identifier {
        name: Name,
    },
    /// `value` is `None` for the `null` literal.
    Literal {
        value: Option<Constant>,
    },
    Binary {
        op: BinaryOp,
        lhs: NodeId,
        rhs: NodeId,
    },
    Unary {
        op: UnaryOp,
        operand: NodeId,
    },
    Assignment {
        lhs: NodeId,
        rhs: NodeId,
    },
    CompoundAssignment {
        op: BinaryOp,
        lhs: NodeId,
        rhs: NodeId,
    },
    Conditional {
        cond: NodeId,
        then_expr: NodeId,
        else_expr: NodeId,
    },
    Parenthesized {
        expr: NodeId,
    },
    TypeCast {
        ty: NodeId,
        expr: NodeId,
    },
    InstanceOf {
        expr: NodeId,
        ty: NodeId,
    },
    ArrayAccess {
        array: NodeId,
        index: NodeId,
    },
    Lambda {
        params: Vec<NodeId>,
        /// An expression or a block.
        body: NodeId,
    },
    Annotation {
        /// The annotation type as spelled.
        name: Name,
        /// Expressions, or `Assignment`s for `name = value` pairs.
        args: Vec<NodeId>,
    },
    /// A type as spelled in source, e.g. `List<String>[]`.
    Type {
        spelled: Name,
    },
    Erroneous,
}

impl NodeData {
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeData::CompilationUnit { .. } => NodeKind::CompilationUnit,
            NodeData::Package { .. } => NodeKind::Package,
            NodeData::Import { .. } => NodeKind::Import,
            NodeData::Class { .. } => NodeKind::Class,
            NodeData::Method { .. } => NodeKind::Method,
            NodeData::Variable { .. } => NodeKind::Variable,
            NodeData::Block { .. } => NodeKind::Block,
            NodeData::ExpressionStatement { .. } => NodeKind::ExpressionStatement,
            NodeData::Return { .. } => NodeKind::Return,
            NodeData::If { .. } => NodeKind::If,
            NodeData::While { .. } => NodeKind::While,
            NodeData::DoWhile { .. } => NodeKind::DoWhile,
            NodeData::For { .. } => NodeKind::For,
            NodeData::EnhancedFor { .. } => NodeKind::EnhancedFor,
            NodeData::Throw { .. } => NodeKind::Throw,
            NodeData::Break { .. } => NodeKind::Break,
            NodeData::Continue { .. } => NodeKind::Continue,
            NodeData::Assert { .. } => NodeKind::Assert,
            NodeData::Synchronized { .. } => NodeKind::Synchronized,
            NodeData::Switch { .. } => NodeKind::Switch,
            NodeData::Case { .. } => NodeKind::Case,
            NodeData::Try { .. } => NodeKind::Try,
            NodeData::Catch { .. } => NodeKind::Catch,
            NodeData::MethodInvocation { .. } => NodeKind::MethodInvocation,
            NodeData::NewClass { .. } => NodeKind::NewClass,
            NodeData::NewArray { .. } => NodeKind::NewArray,
            NodeData::MemberSelect { .. } => NodeKind::MemberSelect,
            NodeData::MemberReference { .. } => NodeKind::MemberReference,
            NodeData::Identifier { .. } => NodeKind::Identifier,
            NodeData::Literal { .. } => NodeKind::Literal,
            NodeData::Binary { .. } => NodeKind::Binary,
            NodeData::Unary { .. } => NodeKind::Unary,
            NodeData::Assignment { .. } => NodeKind::Assignment,
            NodeData::CompoundAssignment { .. } => NodeKind::CompoundAssignment,
            NodeData::Conditional { .. } => NodeKind::Conditional,
            NodeData::Parenthesized { .. } => NodeKind::Parenthesized,
            NodeData::TypeCast { .. } => NodeKind::TypeCast,
            NodeData::InstanceOf { .. } => NodeKind::InstanceOf,
            NodeData::ArrayAccess { .. } => NodeKind::ArrayAccess,
            NodeData::Lambda { .. } => NodeKind::Lambda,
            NodeData::Annotation { .. } => NodeKind::Annotation,
            NodeData::Type { .. } => NodeKind::Type,
            NodeData::Erroneous => NodeKind::Erroneous,
        }
    }

    /// Direct children in source order.
    pub fn children(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        match self {
            NodeData::CompilationUnit {
                package,
                imports,
                types,
            } => {
                out.extend(*package);
                out.extend(imports);
                out.extend(types);
            }
            NodeData::Class {
                annotations,
                extends,
                implements,
                members,
                ..
            } => {
                out.extend(annotations);
                out.extend(*extends);
                out.extend(implements);
                out.extend(members);
            }
            NodeData::Method {
                annotations,
                return_type,
                params,
                body,
                ..
            } => {
                out.extend(annotations);
                out.extend(*return_type);
                out.extend(params);
                out.extend(*body);
            }
            NodeData::Variable {
                annotations,
                ty,
                init,
                ..
            } => {
                out.extend(annotations);
                out.extend(*ty);
                out.extend(*init);
            }
            NodeData::Block { stmts } => out.extend(stmts),
            NodeData::ExpressionStatement { expr }
            | NodeData::Throw { expr }
            | NodeData::Parenthesized { expr }
            | NodeData::MemberSelect { expr, .. }
            | NodeData::MemberReference { expr, .. } => out.push(*expr),
            NodeData::Return { expr } => out.extend(*expr),
            NodeData::If {
                cond,
                then_branch,
                else_branch,
            } => {
                out.push(*cond);
                out.push(*then_branch);
                out.extend(*else_branch);
            }
            NodeData::While { cond, body } => out.extend([*cond, *body]),
            NodeData::DoWhile { body, cond } => out.extend([*body, *cond]),
            NodeData::For {
                init,
                cond,
                update,
                body,
            } => {
                out.extend(init);
                out.extend(*cond);
                out.extend(update);
                out.push(*body);
            }
            NodeData::EnhancedFor { var, expr, body } => out.extend([*var, *expr, *body]),
            NodeData::Assert { cond, detail } => {
                out.push(*cond);
                out.extend(*detail);
            }
            NodeData::Synchronized { lock, body } => out.extend([*lock, *body]),
            NodeData::Switch { selector, cases } => {
                out.push(*selector);
                out.extend(cases);
            }
            NodeData::Case { labels, body } => {
                out.extend(labels);
                out.extend(body);
            }
            NodeData::Try {
                resources,
                body,
                catches,
                finally,
            } => {
                out.extend(resources);
                out.push(*body);
                out.extend(catches);
                out.extend(*finally);
            }
            NodeData::Catch { param, body } => out.extend([*param, *body]),
            NodeData::MethodInvocation {
                method_select,
                args,
            } => {
                out.push(*method_select);
                out.extend(args);
            }
            NodeData::NewClass {
                class_name,
                args,
                body,
            } => {
                out.push(*class_name);
                out.extend(args);
                out.extend(*body);
            }
            NodeData::NewArray {
                elem_type,
                dims,
                init,
            } => {
                out.extend(*elem_type);
                out.extend(dims);
                if let Some(init) = init {
                    out.extend(init);
                }
            }
            NodeData::Binary { lhs, rhs, .. }
            | NodeData::Assignment { lhs, rhs }
            | NodeData::CompoundAssignment { lhs, rhs, .. } => out.extend([*lhs, *rhs]),
            NodeData::Unary { operand, .. } => out.push(*operand),
            NodeData::Conditional {
                cond,
                then_expr,
                else_expr,
            } => out.extend([*cond, *then_expr, *else_expr]),
            NodeData::TypeCast { ty, expr } => out.extend([*ty, *expr]),
            NodeData::InstanceOf { expr, ty } => out.extend([*expr, *ty]),
            NodeData::ArrayAccess { array, index } => out.extend([*array, *index]),
            NodeData::Lambda { params, body } => {
                out.extend(params);
                out.push(*body);
            }
            NodeData::Annotation { args, .. } => out.extend(args),
            NodeData::Package { .. }
            | NodeData::Import { .. }
            | NodeData::Identifier { .. }
            | NodeData::Literal { .. }
            | NodeData::Break { .. }
            | NodeData::Continue { .. }
            | NodeData::Type { .. }
            | NodeData::Erroneous => {}
        }
        out
    }

    /// Declared name of a class, method or variable; identifier and member
    /// names for references.
    pub fn name(&self) -> Option<&Name> {
        match self {
            NodeData::Class { name, .. }
            | NodeData::Method { name, .. }
            | NodeData::Variable { name, .. }
            | NodeData::Identifier { name }
            | NodeData::MemberSelect { name, .. }
            | NodeData::MemberReference { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn modifiers(&self) -> Option<Modifiers> {
        match self {
            NodeData::Class { modifiers, .. }
            | NodeData::Method { modifiers, .. }
            | NodeData::Variable { modifiers, .. } => Some(*modifiers),
            _ => None,
        }
    }

    pub fn annotations(&self) -> &[NodeId] {
        match self {
            NodeData::Class { annotations, .. }
            | NodeData::Method { annotations, .. }
            | NodeData::Variable { annotations, .. } => annotations,
            _ => &[],
        }
    }

    /// Actual arguments of a call or instance creation.
    pub fn arguments(&self) -> &[NodeId] {
        match self {
            NodeData::MethodInvocation { args, .. } | NodeData::NewClass { args, .. } => args,
            _ => &[],
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub range: TextRange,
    pub data: NodeData,
    pub parent: Option<NodeId>,
    /// Synthesized by the host (e.g. an implicit default constructor); has no
    /// source text of its own.
    pub generated: bool,
}

/// An immutable arena of nodes with parent links.
#[derive(Clone, Debug, PartialEq)]
pub struct SyntaxTree {
    pub(crate) nodes: Vec<Node>,
    pub(crate) root: NodeId,
}

impl SyntaxTree {
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.idx())
    }

    pub fn data(&self, id: NodeId) -> Option<&NodeData> {
        self.get(id).map(|node| &node.data)
    }

    pub fn kind(&self, id: NodeId) -> Option<NodeKind> {
        self.data(id).map(NodeData::kind)
    }

    pub fn range(&self, id: NodeId) -> Option<TextRange> {
        self.get(id).map(|node| node.range)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)?.parent
    }

    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.data(id).map(NodeData::children).unwrap_or_default()
    }

    /// Every node reachable from the root, parents before children and
    /// siblings in source order.
    pub fn preorder(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            if id.idx() >= self.nodes.len() {
                continue;
            }
            out.push(id);
            let children = self.children(id);
            stack.extend(children.into_iter().rev());
        }
        out
    }

    /// `id` followed by its parents up to the root.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(Some(id), move |current| self.parent(*current))
    }
}
