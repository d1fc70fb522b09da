use std::collections::HashMap;

use vigil_types::{ClassId, FieldId, MethodId, Modifiers, Type};

use crate::{LocalId, Name, NodeId};

/// A resolved named entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Symbol {
    Class(ClassId),
    Method(MethodId),
    Field(FieldId),
    Local(LocalId),
}

impl Symbol {
    pub fn as_class(self) -> Option<ClassId> {
        match self {
            Symbol::Class(id) => Some(id),
            _ => None,
        }
    }

    pub fn as_method(self) -> Option<MethodId> {
        match self {
            Symbol::Method(id) => Some(id),
            _ => None,
        }
    }

    pub fn as_field(self) -> Option<FieldId> {
        match self {
            Symbol::Field(id) => Some(id),
            _ => None,
        }
    }

    pub fn as_local(self) -> Option<LocalId> {
        match self {
            Symbol::Local(id) => Some(id),
            _ => None,
        }
    }

    /// Fields and locals.
    pub fn is_variable(self) -> bool {
        matches!(self, Symbol::Field(_) | Symbol::Local(_))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LocalKind {
    Local,
    Parameter,
    Resource,
    ExceptionParameter,
}

/// A method-local variable or parameter.
#[derive(Clone, Debug, PartialEq)]
pub struct LocalVar {
    pub name: Name,
    pub ty: Type,
    pub modifiers: Modifiers,
    /// The `Variable` node that declares it.
    pub decl: NodeId,
    pub kind: LocalKind,
}

/// Side tables the host fills after attribution.
#[derive(Clone, Debug, Default)]
pub struct Semantics {
    types: HashMap<NodeId, Type>,
    symbols: HashMap<NodeId, Symbol>,
    locals: Vec<LocalVar>,
    decls: HashMap<Symbol, NodeId>,
}

impl Semantics {
    pub fn set_type(&mut self, node: NodeId, ty: Type) {
        self.types.insert(node, ty);
    }

    pub fn type_of(&self, node: NodeId) -> Option<&Type> {
        self.types.get(&node)
    }

    pub fn set_symbol(&mut self, node: NodeId, symbol: Symbol) {
        self.symbols.insert(node, symbol);
    }

    pub fn symbol(&self, node: NodeId) -> Option<Symbol> {
        self.symbols.get(&node).copied()
    }

    pub fn add_local(&mut self, local: LocalVar) -> LocalId {
        let id = LocalId::from_raw(self.locals.len() as u32);
        self.decls.insert(Symbol::Local(id), local.decl);
        self.locals.push(local);
        id
    }

    pub fn local(&self, id: LocalId) -> Option<&LocalVar> {
        self.locals.get(id.idx())
    }

    pub fn locals(&self) -> impl Iterator<Item = (LocalId, &LocalVar)> {
        self.locals
            .iter()
            .enumerate()
            .map(|(idx, local)| (LocalId::from_raw(idx as u32), local))
    }

    /// Records that `symbol` is declared by `node` in this unit.
    pub fn set_decl(&mut self, symbol: Symbol, node: NodeId) {
        self.decls.insert(symbol, node);
    }

    pub fn decl(&self, symbol: Symbol) -> Option<NodeId> {
        self.decls.get(&symbol).copied()
    }
}
