//! The typed syntax tree vigil analyzes.
//!
//! A host compiler parses and attributes a compilation unit, then hands vigil a
//! [`CompilationUnit`]: the source text, an immutable node arena with parent
//! links, semantic side tables (node types, resolved symbols, locals) and the
//! comment stream. Nothing in vigil mutates a unit once it is built.

mod builder;
mod comments;
mod semantics;
mod tree;
mod unit;

use std::fmt;

pub use smol_str::SmolStr as Name;
pub use vigil_core::{LineCol, LineIndex, TextRange, TextSize};
pub use vigil_types::Constant;

pub use builder::TreeBuilder;
pub use comments::{Comment, CommentKind, Comments};
pub use semantics::{LocalKind, LocalVar, Semantics, Symbol};
pub use tree::{Node, NodeData, SyntaxTree};
pub use unit::{CompilationUnit, ImportDecl, NodeRef};

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub(crate) fn from_raw(raw: u32) -> Self {
        NodeId(raw)
    }

    #[must_use]
    pub fn idx(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LocalId(u32);

impl LocalId {
    pub(crate) fn from_raw(raw: u32) -> Self {
        LocalId(raw)
    }

    #[must_use]
    pub fn idx(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for LocalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LocalId({})", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeKind {
    CompilationUnit,
    Package,
    Import,
    Class,
    Method,
    Variable,
    Block,
    ExpressionStatement,
    Return,
    If,
    While,
    DoWhile,
    For,
    EnhancedFor,
    Throw,
    Break,
    Continue,
    Assert,
    Synchronized,
    Switch,
    Case,
    Try,
    Catch,
    MethodInvocation,
    NewClass,
    NewArray,
    MemberSelect,
    MemberReference,
    Identifier,
    Literal,
    Binary,
    Unary,
    Assignment,
    CompoundAssignment,
    Conditional,
    Parenthesized,
    TypeCast,
    InstanceOf,
    ArrayAccess,
    Lambda,
    Annotation,
    Type,
    Erroneous,
}

impl NodeKind {
    /// Kinds that produce a value.
    pub fn is_expression(self) -> bool {
        matches!(
            self,
            NodeKind::MethodInvocation
                | NodeKind::NewClass
                | NodeKind::NewArray
                | NodeKind::MemberSelect
                | NodeKind::MemberReference
                | NodeKind::Identifier
                | NodeKind::Literal
                | NodeKind::Binary
                | NodeKind::Unary
                | NodeKind::Assignment
                | NodeKind::CompoundAssignment
                | NodeKind::Conditional
                | NodeKind::Parenthesized
                | NodeKind::TypeCast
                | NodeKind::InstanceOf
                | NodeKind::ArrayAccess
                | NodeKind::Lambda
        )
    }

    /// Declarations that may carry modifiers and annotations.
    pub fn is_declaration(self) -> bool {
        matches!(self, NodeKind::Class | NodeKind::Method | NodeKind::Variable)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Mul,
    Div,
    Rem,
    Add,
    Sub,
    Shl,
    Shr,
    UShr,
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
    BitAnd,
    BitXor,
    BitOr,
    And,
    Or,
}

impl BinaryOp {
    pub const ALL: [BinaryOp; 19] = [
        BinaryOp::Mul,
        BinaryOp::Div,
        BinaryOp::Rem,
        BinaryOp::Add,
        BinaryOp::Sub,
        BinaryOp::Shl,
        BinaryOp::Shr,
        BinaryOp::UShr,
        BinaryOp::Lt,
        BinaryOp::Gt,
        BinaryOp::Le,
        BinaryOp::Ge,
        BinaryOp::Eq,
        BinaryOp::Ne,
        BinaryOp::BitAnd,
        BinaryOp::BitXor,
        BinaryOp::BitOr,
        BinaryOp::And,
        BinaryOp::Or,
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::UShr => ">>>",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::Le => "<=",
            BinaryOp::Ge => ">=",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitXor => "^",
            BinaryOp::BitOr => "|",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.symbol() == symbol)
    }

    pub fn is_shift(self) -> bool {
        matches!(self, BinaryOp::Shl | BinaryOp::Shr | BinaryOp::UShr)
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Lt | BinaryOp::Gt | BinaryOp::Le | BinaryOp::Ge | BinaryOp::Eq | BinaryOp::Ne
        )
    }

    pub fn is_conditional(self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }

    /// `true` when `a op b == b op a` for every operand pair.
    pub fn is_commutative(self) -> bool {
        matches!(
            self,
            BinaryOp::Mul
                | BinaryOp::Add
                | BinaryOp::Eq
                | BinaryOp::Ne
                | BinaryOp::BitAnd
                | BinaryOp::BitXor
                | BinaryOp::BitOr
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Plus,
    Minus,
    Not,
    BitNot,
    PreInc,
    PreDec,
    PostInc,
    PostDec,
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Plus => "+",
            UnaryOp::Minus => "-",
            UnaryOp::Not => "!",
            UnaryOp::BitNot => "~",
            UnaryOp::PreInc | UnaryOp::PostInc => "++",
            UnaryOp::PreDec | UnaryOp::PostDec => "--",
        }
    }

    pub fn is_increment_or_decrement(self) -> bool {
        matches!(
            self,
            UnaryOp::PreInc | UnaryOp::PreDec | UnaryOp::PostInc | UnaryOp::PostDec
        )
    }
}
