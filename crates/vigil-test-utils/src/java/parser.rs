use std::collections::{HashMap, HashSet};

use vigil_core::{TextRange, TextSize};
use vigil_syntax::{
    BinaryOp, Comment, Name, NodeData, NodeId, SyntaxTree, TreeBuilder, UnaryOp,
};
use vigil_types::{ClassKind, Modifier, Modifiers, CONSTRUCTOR_NAME};

use super::lexer::{Lexer, Token, TokenKind};
use super::FixtureError;

/// A type as spelled, before name resolution.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct TypeRef {
    pub name: String,
    pub args: Vec<TypeArg>,
    pub dims: usize,
    /// `new Foo<>()`
    pub diamond: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum TypeArg {
    Type(TypeRef),
    Unbounded,
    Extends(TypeRef),
    Super(TypeRef),
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct TypeParamRef {
    pub name: String,
    pub bounds: Vec<TypeRef>,
}

pub(crate) struct ParsedUnit {
    pub tree: SyntaxTree,
    pub comments: Vec<Comment>,
    /// Spelled types of `Type` nodes, and the full array type of `NewArray`s.
    pub type_refs: HashMap<NodeId, TypeRef>,
    /// Type parameters of generic classes and methods.
    pub type_params: HashMap<NodeId, Vec<TypeParamRef>>,
    /// Variable nodes declared `T...`.
    pub varargs: HashSet<NodeId>,
    pub enum_constants: HashSet<NodeId>,
}

pub(crate) fn parse(text: &str) -> Result<ParsedUnit, FixtureError> {
    let (tokens, comments) = Lexer::new(text).tokenize()?;
    let mut parser = Parser {
        text,
        tokens,
        pos: 0,
        b: TreeBuilder::default(),
        type_refs: HashMap::new(),
        type_params: HashMap::new(),
        varargs: HashSet::new(),
        enum_constants: HashSet::new(),
    };
    let root = parser.compilation_unit()?;
    Ok(ParsedUnit {
        tree: parser.b.finish(root),
        comments,
        type_refs: parser.type_refs,
        type_params: parser.type_params,
        varargs: parser.varargs,
        enum_constants: parser.enum_constants,
    })
}

type PResult<T> = Result<T, FixtureError>;

const PRIMITIVES: &[&str] = &[
    "boolean", "byte", "short", "char", "int", "long", "float", "double", "void",
];

fn modifier_keyword(text: &str) -> Option<Modifier> {
    Modifier::ALL.into_iter().find(|m| m.keyword() == text)
}

fn binary_precedence(op: BinaryOp) -> u8 {
    match op {
        BinaryOp::Or => 1,
        BinaryOp::And => 2,
        BinaryOp::BitOr => 3,
        BinaryOp::BitXor => 4,
        BinaryOp::BitAnd => 5,
        BinaryOp::Eq | BinaryOp::Ne => 6,
        BinaryOp::Lt | BinaryOp::Gt | BinaryOp::Le | BinaryOp::Ge => 7,
        BinaryOp::Shl | BinaryOp::Shr | BinaryOp::UShr => 8,
        BinaryOp::Add | BinaryOp::Sub => 9,
        BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => 10,
    }
}

const INSTANCEOF_PRECEDENCE: u8 = 7;

struct Parser<'a> {
    text: &'a str,
    tokens: Vec<Token<'a>>,
    pos: usize,
    b: TreeBuilder,
    type_refs: HashMap<NodeId, TypeRef>,
    type_params: HashMap<NodeId, Vec<TypeParamRef>>,
    varargs: HashSet<NodeId>,
    enum_constants: HashSet<NodeId>,
}

impl<'a> Parser<'a> {
    // --- token plumbing -------------------------------------------------

    fn peek(&self) -> Option<&Token<'a>> {
        self.tokens.get(self.pos)
    }

    fn peek_at(&self, n: usize) -> Option<&Token<'a>> {
        self.tokens.get(self.pos + n)
    }

    fn at(&self, punct: &str) -> bool {
        self.peek().is_some_and(|t| t.is_punct(punct))
    }

    fn at_kw(&self, kw: &str) -> bool {
        self.peek().is_some_and(|t| t.is_ident() && t.text == kw)
    }

    fn eat(&mut self, punct: &str) -> bool {
        if self.at(punct) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_kw(&mut self, kw: &str) -> bool {
        if self.at_kw(kw) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn error(&self, message: impl Into<String>) -> FixtureError {
        FixtureError::Syntax {
            offset: self.peek().map_or(self.text.len(), |t| t.start as usize),
            message: message.into(),
        }
    }

    fn expect(&mut self, punct: &str) -> PResult<()> {
        if self.eat(punct) {
            Ok(())
        } else {
            Err(self.error(format!("expected `{punct}`")))
        }
    }

    fn expect_kw(&mut self, kw: &str) -> PResult<()> {
        if self.eat_kw(kw) {
            Ok(())
        } else {
            Err(self.error(format!("expected `{kw}`")))
        }
    }

    fn ident(&mut self) -> PResult<Name> {
        match self.peek() {
            Some(t) if t.is_ident() => {
                let name = Name::new(t.text);
                self.pos += 1;
                Ok(name)
            }
            _ => Err(self.error("expected identifier")),
        }
    }

    fn start(&self) -> u32 {
        self.peek().map_or(self.text.len() as u32, |t| t.start)
    }

    fn last_end(&self) -> u32 {
        self.pos
            .checked_sub(1)
            .and_then(|idx| self.tokens.get(idx))
            .map_or(0, |t| t.end)
    }

    fn range_from(&self, start: u32) -> TextRange {
        TextRange::new(TextSize::from(start), TextSize::from(self.last_end().max(start)))
    }

    fn alloc(&mut self, start: u32, data: NodeData) -> NodeId {
        let range = self.range_from(start);
        self.b.alloc(range, data)
    }

    fn start_of(&self, id: NodeId) -> u32 {
        self.b.range(id).map_or(0, |r| u32::from(r.start()))
    }

    /// Counts adjacent `>` tokens at the cursor (up to three) and whether an
    /// adjacent `=` follows them.
    fn gt_run(&self) -> (usize, bool) {
        let mut count = 0;
        let mut end = None;
        while count < 3 {
            match self.peek_at(count) {
                Some(t) if t.is_punct(">") && end.map_or(true, |e| e == t.start) => {
                    end = Some(t.end);
                    count += 1;
                }
                _ => break,
            }
        }
        let eq = count > 0
            && self
                .peek_at(count)
                .is_some_and(|t| t.is_punct("=") && Some(t.start) == end);
        (count, eq)
    }

    // --- declarations ---------------------------------------------------

    fn qualified_name(&mut self) -> PResult<String> {
        let mut name = self.ident()?.to_string();
        while self.at(".") && self.peek_at(1).is_some_and(|t| t.is_ident()) {
            self.pos += 1;
            name.push('.');
            name.push_str(&self.ident()?);
        }
        Ok(name)
    }

    fn compilation_unit(&mut self) -> PResult<NodeId> {
        let mut package = None;
        if self.at_kw("package") {
            let start = self.start();
            self.pos += 1;
            let name = self.qualified_name()?;
            self.expect(";")?;
            package = Some(self.alloc(start, NodeData::Package { name: name.into() }));
        }
        let mut imports = Vec::new();
        while self.at_kw("import") {
            let start = self.start();
            self.pos += 1;
            let is_static = self.eat_kw("static");
            let path = self.qualified_name()?;
            let is_wildcard = self.eat(".") && {
                self.expect("*")?;
                true
            };
            self.expect(";")?;
            imports.push(self.alloc(
                start,
                NodeData::Import {
                    path: path.into(),
                    is_static,
                    is_wildcard,
                },
            ));
        }
        let mut types = Vec::new();
        while self.peek().is_some() {
            if self.eat(";") {
                continue;
            }
            let start = self.start();
            let (modifiers, annotations) = self.modifiers()?;
            types.push(self.type_decl(start, modifiers, annotations)?);
        }
        let range = TextRange::new(0.into(), TextSize::from(self.text.len() as u32));
        Ok(self.b.alloc(
            range,
            NodeData::CompilationUnit {
                package,
                imports,
                types,
            },
        ))
    }

    fn modifiers(&mut self) -> PResult<(Modifiers, Vec<NodeId>)> {
        let mut modifiers = Modifiers::NONE;
        let mut annotations = Vec::new();
        loop {
            if self.at("@") && !self.peek_at(1).is_some_and(|t| t.text == "interface") {
                annotations.push(self.annotation()?);
                continue;
            }
            let Some(token) = self.peek() else { break };
            if !token.is_ident() {
                break;
            }
            // `default:` in a switch is not a modifier.
            if token.text == "default" && self.peek_at(1).is_some_and(|t| t.is_punct(":")) {
                break;
            }
            match modifier_keyword(token.text) {
                Some(m) => {
                    modifiers = modifiers.with(m);
                    self.pos += 1;
                }
                None if token.text == "non" => {
                    // non-sealed
                    self.pos += 3;
                }
                None => break,
            }
        }
        Ok((modifiers, annotations))
    }

    fn annotation(&mut self) -> PResult<NodeId> {
        let start = self.start();
        self.expect("@")?;
        let name = self.qualified_name()?;
        let mut args = Vec::new();
        if self.eat("(") {
            while !self.at(")") {
                if self.peek().is_some_and(|t| t.is_ident())
                    && self.peek_at(1).is_some_and(|t| t.is_punct("="))
                {
                    let lhs_start = self.start();
                    let key = self.ident()?;
                    let lhs = self.alloc(lhs_start, NodeData::Identifier { name: key });
                    self.expect("=")?;
                    let rhs = self.element_value()?;
                    args.push(self.alloc(lhs_start, NodeData::Assignment { lhs, rhs }));
                } else {
                    args.push(self.element_value()?);
                }
                if !self.eat(",") {
                    break;
                }
            }
            self.expect(")")?;
        }
        Ok(self.alloc(
            start,
            NodeData::Annotation {
                name: name.into(),
                args,
            },
        ))
    }

    fn element_value(&mut self) -> PResult<NodeId> {
        if self.at("{") {
            self.array_initializer()
        } else if self.at("@") {
            self.annotation()
        } else {
            self.conditional()
        }
    }

    fn array_initializer(&mut self) -> PResult<NodeId> {
        let start = self.start();
        self.expect("{")?;
        let mut elems = Vec::new();
        while !self.at("}") {
            elems.push(if self.at("{") {
                self.array_initializer()?
            } else if self.at("@") {
                self.annotation()?
            } else {
                self.expr()?
            });
            if !self.eat(",") {
                break;
            }
        }
        self.expect("}")?;
        Ok(self.alloc(
            start,
            NodeData::NewArray {
                elem_type: None,
                dims: Vec::new(),
                init: Some(elems),
            },
        ))
    }

    fn type_params(&mut self) -> PResult<Vec<TypeParamRef>> {
        let mut out = Vec::new();
        if !self.eat("<") {
            return Ok(out);
        }
        loop {
            let name = self.ident()?.to_string();
            let mut bounds = Vec::new();
            if self.eat_kw("extends") {
                bounds.push(self.type_ref()?);
                while self.eat("&") {
                    bounds.push(self.type_ref()?);
                }
            }
            out.push(TypeParamRef { name, bounds });
            if !self.eat(",") {
                break;
            }
        }
        self.expect(">")?;
        Ok(out)
    }

    fn type_decl(
        &mut self,
        start: u32,
        modifiers: Modifiers,
        annotations: Vec<NodeId>,
    ) -> PResult<NodeId> {
        let kind = if self.eat_kw("class") {
            ClassKind::Class
        } else if self.eat_kw("interface") {
            ClassKind::Interface
        } else if self.eat_kw("enum") {
            ClassKind::Enum
        } else if self.at("@") && self.peek_at(1).is_some_and(|t| t.text == "interface") {
            self.pos += 2;
            ClassKind::Annotation
        } else {
            return Err(self.error("expected a type declaration"));
        };
        let name = self.ident()?;
        let type_params = self.type_params()?;
        let mut extends = None;
        let mut implements = Vec::new();
        if self.eat_kw("extends") {
            if kind == ClassKind::Interface {
                implements = self.type_list()?;
            } else {
                extends = Some(self.type_node()?);
            }
        }
        if self.eat_kw("implements") {
            implements.extend(self.type_list()?);
        }
        if self.eat_kw("permits") {
            // Not modeled.
            self.type_list()?;
        }
        let mut members = self.class_body(kind, &name)?;
        if matches!(kind, ClassKind::Class | ClassKind::Enum) {
            self.add_default_constructor(start, kind, modifiers, &mut members);
        }
        let node = self.alloc(
            start,
            NodeData::Class {
                name,
                kind,
                modifiers,
                annotations,
                extends,
                implements,
                members,
            },
        );
        if !type_params.is_empty() {
            self.type_params.insert(node, type_params);
        }
        Ok(node)
    }

    /// Classes without a declared constructor get a generated no-arg one.
    fn add_default_constructor(
        &mut self,
        class_start: u32,
        kind: ClassKind,
        class_modifiers: Modifiers,
        members: &mut Vec<NodeId>,
    ) {
        let has_ctor = members.iter().any(|&m| {
            matches!(
                self.b.data(m),
                Some(NodeData::Method { name, .. }) if name == CONSTRUCTOR_NAME
            )
        });
        if has_ctor {
            return;
        }
        let at = TextRange::empty(TextSize::from(class_start));
        let modifiers = if kind == ClassKind::Enum {
            Modifiers::of(&[Modifier::Private])
        } else {
            [Modifier::Public, Modifier::Protected, Modifier::Private]
                .into_iter()
                .filter(|m| class_modifiers.contains(*m))
                .fold(Modifiers::NONE, Modifiers::with)
        };
        let body = self
            .b
            .alloc_generated(at, NodeData::Block { stmts: Vec::new() });
        let ctor = self.b.alloc_generated(
            at,
            NodeData::Method {
                name: Name::new(CONSTRUCTOR_NAME),
                modifiers,
                annotations: Vec::new(),
                return_type: None,
                params: Vec::new(),
                body: Some(body),
            },
        );
        members.insert(0, ctor);
    }

    fn type_list(&mut self) -> PResult<Vec<NodeId>> {
        let mut out = vec![self.type_node()?];
        while self.eat(",") {
            out.push(self.type_node()?);
        }
        Ok(out)
    }

    fn class_body(&mut self, kind: ClassKind, class_name: &str) -> PResult<Vec<NodeId>> {
        self.expect("{")?;
        let mut members = Vec::new();
        if kind == ClassKind::Enum {
            self.enum_constants(class_name, &mut members)?;
        }
        while !self.eat("}") {
            if self.peek().is_none() {
                return Err(self.error("unterminated class body"));
            }
            if self.eat(";") {
                continue;
            }
            let static_block =
                self.at_kw("static") && self.peek_at(1).is_some_and(|t| t.is_punct("{"));
            if self.at("{") || static_block {
                self.eat_kw("static");
                members.push(self.block()?);
                continue;
            }
            self.member(class_name, &mut members)?;
        }
        Ok(members)
    }

    fn enum_constants(&mut self, enum_name: &str, members: &mut Vec<NodeId>) -> PResult<()> {
        while self.peek().is_some_and(|t| t.is_ident()) {
            let start = self.start();
            let name = self.ident()?;
            let mut init = None;
            if self.at("(") {
                let args = self.arguments()?;
                let range = self.range_from(start);
                let class_name = self.b.alloc_generated(
                    TextRange::empty(TextSize::from(start)),
                    NodeData::Type {
                        spelled: Name::new(enum_name),
                    },
                );
                self.type_refs.insert(class_name, simple_type_ref(enum_name));
                init = Some(self.b.alloc_generated(
                    range,
                    NodeData::NewClass {
                        class_name,
                        args,
                        body: None,
                    },
                ));
            }
            if self.at("{") {
                return Err(self.error("enum constant bodies are not supported"));
            }
            let node = self.alloc(
                start,
                NodeData::Variable {
                    name,
                    modifiers: Modifiers::of(&[
                        Modifier::Public,
                        Modifier::Static,
                        Modifier::Final,
                    ]),
                    annotations: Vec::new(),
                    ty: None,
                    init,
                },
            );
            self.enum_constants.insert(node);
            members.push(node);
            if !self.eat(",") {
                break;
            }
        }
        if !self.eat(";") && !self.at("}") {
            return Err(self.error("expected `;` after enum constants"));
        }
        Ok(())
    }

    fn member(&mut self, class_name: &str, members: &mut Vec<NodeId>) -> PResult<()> {
        let start = self.start();
        let (modifiers, annotations) = self.modifiers()?;
        if self.at_kw("class")
            || self.at_kw("interface")
            || self.at_kw("enum")
            || (self.at("@") && self.peek_at(1).is_some_and(|t| t.text == "interface"))
        {
            members.push(self.type_decl(start, modifiers, annotations)?);
            return Ok(());
        }
        let type_params = self.type_params()?;
        let is_ctor = self.at_kw(class_name) && self.peek_at(1).is_some_and(|t| t.is_punct("("));
        let return_type = if is_ctor {
            None
        } else {
            Some(self.type_node()?)
        };
        let name = if is_ctor {
            self.pos += 1;
            Name::new(CONSTRUCTOR_NAME)
        } else {
            self.ident()?
        };
        if self.at("(") {
            let params = self.params()?;
            while self.eat("[") {
                self.expect("]")?;
            }
            if self.eat_kw("throws") {
                self.type_list()?;
            }
            let body = if self.at("{") {
                Some(self.block()?)
            } else {
                if self.eat_kw("default") {
                    // Annotation element default; not modeled.
                    self.element_value()?;
                }
                self.expect(";")?;
                None
            };
            let node = self.alloc(
                start,
                NodeData::Method {
                    name,
                    modifiers,
                    annotations,
                    return_type,
                    params,
                    body,
                },
            );
            if !type_params.is_empty() {
                self.type_params.insert(node, type_params);
            }
            members.push(node);
            return Ok(());
        }
        let Some(ty) = return_type else {
            return Err(self.error("expected a field or method"));
        };
        self.declarators(start, modifiers, annotations, ty, Some(name), members)?;
        self.expect(";")?;
        self.extend_last_to_semicolon(members);
        Ok(())
    }

    fn extend_last_to_semicolon(&mut self, decls: &[NodeId]) {
        if let Some(&last) = decls.last() {
            let start = self.start_of(last);
            let range = self.range_from(start);
            self.b.set_range(last, range);
        }
    }

    /// Parses `name [= init] {, name [= init]}` after a declared type. The
    /// first declarator's name may already have been consumed.
    fn declarators(
        &mut self,
        start: u32,
        modifiers: Modifiers,
        annotations: Vec<NodeId>,
        ty: NodeId,
        mut first_name: Option<Name>,
        out: &mut Vec<NodeId>,
    ) -> PResult<()> {
        let base_range = self.b.range(ty).unwrap_or_default();
        let base_spelled = match self.b.data(ty) {
            Some(NodeData::Type { spelled }) => spelled.clone(),
            _ => Name::default(),
        };
        let base_ref = self.type_refs.get(&ty).cloned();
        let mut annotations = Some(annotations);
        let mut ty = Some(ty);
        let mut decl_start = start;
        loop {
            let name = match first_name.take() {
                Some(name) => name,
                None => self.ident()?,
            };
            let ty_node = match ty.take() {
                Some(node) => node,
                None => {
                    // Every declarator owns its own type node.
                    let node = self.b.alloc(
                        base_range,
                        NodeData::Type {
                            spelled: base_spelled.clone(),
                        },
                    );
                    if let Some(tref) = base_ref.clone() {
                        self.type_refs.insert(node, tref);
                    }
                    node
                }
            };
            while self.eat("[") {
                self.expect("]")?;
                if let Some(tref) = self.type_refs.get_mut(&ty_node) {
                    tref.dims += 1;
                }
            }
            let init = if self.eat("=") {
                Some(if self.at("{") {
                    self.array_initializer()?
                } else {
                    self.expr()?
                })
            } else {
                None
            };
            let node = self.alloc(
                decl_start,
                NodeData::Variable {
                    name,
                    modifiers,
                    annotations: annotations.take().unwrap_or_default(),
                    ty: Some(ty_node),
                    init,
                },
            );
            out.push(node);
            if !self.eat(",") {
                return Ok(());
            }
            decl_start = self.start();
        }
    }

    fn params(&mut self) -> PResult<Vec<NodeId>> {
        self.expect("(")?;
        let mut params = Vec::new();
        while !self.at(")") {
            let start = self.start();
            let (modifiers, annotations) = self.modifiers()?;
            let ty = self.type_node()?;
            let is_varargs = self.eat("...");
            if is_varargs {
                if let Some(tref) = self.type_refs.get_mut(&ty) {
                    tref.dims += 1;
                }
            }
            let name = self.ident()?;
            while self.eat("[") {
                self.expect("]")?;
                if let Some(tref) = self.type_refs.get_mut(&ty) {
                    tref.dims += 1;
                }
            }
            let node = self.alloc(
                start,
                NodeData::Variable {
                    name,
                    modifiers,
                    annotations,
                    ty: Some(ty),
                    init: None,
                },
            );
            if is_varargs {
                self.varargs.insert(node);
            }
            params.push(node);
            if !self.eat(",") {
                break;
            }
        }
        self.expect(")")?;
        Ok(params)
    }

    // --- types ----------------------------------------------------------

    fn type_node(&mut self) -> PResult<NodeId> {
        let start = self.start();
        let tref = self.type_ref()?;
        let range = self.range_from(start);
        let spelled = Name::new(&self.text[std::ops::Range::<usize>::from(range)]);
        let node = self.b.alloc(range, NodeData::Type { spelled });
        self.type_refs.insert(node, tref);
        Ok(node)
    }

    fn type_ref(&mut self) -> PResult<TypeRef> {
        let mut tref = self.type_ref_no_dims()?;
        while self.at("[") && self.peek_at(1).is_some_and(|t| t.is_punct("]")) {
            self.pos += 2;
            tref.dims += 1;
        }
        Ok(tref)
    }

    fn type_ref_no_dims(&mut self) -> PResult<TypeRef> {
        let name = self.qualified_name()?;
        let mut args = Vec::new();
        let mut diamond = false;
        if self.eat("<") {
            if self.at(">") {
                diamond = true;
            } else {
                loop {
                    args.push(self.type_arg()?);
                    if !self.eat(",") {
                        break;
                    }
                }
            }
            self.expect(">")?;
        }
        Ok(TypeRef {
            name,
            args,
            dims: 0,
            diamond,
        })
    }

    fn type_arg(&mut self) -> PResult<TypeArg> {
        if self.eat("?") {
            if self.eat_kw("extends") {
                return Ok(TypeArg::Extends(self.type_ref()?));
            }
            if self.eat_kw("super") {
                return Ok(TypeArg::Super(self.type_ref()?));
            }
            return Ok(TypeArg::Unbounded);
        }
        Ok(TypeArg::Type(self.type_ref()?))
    }

    /// Token index just past a type starting at `p`, without consuming.
    fn scan_type(&self, mut p: usize) -> Option<usize> {
        let token = |idx: usize| self.tokens.get(idx);
        if !token(p)?.is_ident() {
            return None;
        }
        p += 1;
        while token(p).is_some_and(|t| t.is_punct("."))
            && token(p + 1).is_some_and(|t| t.is_ident())
        {
            p += 2;
        }
        if token(p).is_some_and(|t| t.is_punct("<")) {
            let mut depth = 0usize;
            loop {
                let t = token(p)?;
                match t.kind {
                    TokenKind::Punct("<") => depth += 1,
                    TokenKind::Punct(">") => {
                        depth -= 1;
                        if depth == 0 {
                            p += 1;
                            break;
                        }
                    }
                    TokenKind::Punct("," | "." | "?" | "&" | "[" | "]") | TokenKind::Ident => {}
                    _ => return None,
                }
                p += 1;
            }
        }
        while token(p).is_some_and(|t| t.is_punct("["))
            && token(p + 1).is_some_and(|t| t.is_punct("]"))
        {
            p += 2;
        }
        Some(p)
    }

    fn looks_like_local_decl(&self) -> bool {
        if self.at_kw("final") || self.at("@") {
            return true;
        }
        let Some(after) = self.scan_type(self.pos) else {
            return false;
        };
        let name = self.tokens.get(after);
        let next = self.tokens.get(after + 1);
        name.is_some_and(|t| t.is_ident() && t.text != "instanceof")
            && next.is_some_and(|t| {
                ["=", ";", ",", ":", "["].iter().any(|p| t.is_punct(p))
            })
    }

    // --- statements -----------------------------------------------------

    fn block(&mut self) -> PResult<NodeId> {
        let start = self.start();
        self.expect("{")?;
        let mut stmts = Vec::new();
        while !self.eat("}") {
            if self.peek().is_none() {
                return Err(self.error("unterminated block"));
            }
            self.block_statement(&mut stmts)?;
        }
        Ok(self.alloc(start, NodeData::Block { stmts }))
    }

    fn block_statement(&mut self, out: &mut Vec<NodeId>) -> PResult<()> {
        if self.looks_like_local_decl() {
            self.local_decl(out)?;
            self.expect(";")?;
            self.extend_last_to_semicolon(out);
            return Ok(());
        }
        out.push(self.statement()?);
        Ok(())
    }

    fn local_decl(&mut self, out: &mut Vec<NodeId>) -> PResult<()> {
        let start = self.start();
        let (modifiers, annotations) = self.modifiers()?;
        let ty = self.type_node()?;
        self.declarators(start, modifiers, annotations, ty, None, out)
    }

    fn paren_expr(&mut self) -> PResult<NodeId> {
        let start = self.start();
        self.expect("(")?;
        let expr = self.expr()?;
        self.expect(")")?;
        Ok(self.alloc(start, NodeData::Parenthesized { expr }))
    }

    fn statement(&mut self) -> PResult<NodeId> {
        let start = self.start();
        if self.at("{") {
            return self.block();
        }
        if self.eat(";") {
            return Ok(self.alloc(start, NodeData::Block { stmts: Vec::new() }));
        }
        let keyword = self.peek().filter(|t| t.is_ident()).map(|t| t.text);
        let data = match keyword {
            Some("if") => {
                self.pos += 1;
                let cond = self.paren_expr()?;
                let then_branch = self.statement()?;
                let else_branch = if self.eat_kw("else") {
                    Some(self.statement()?)
                } else {
                    None
                };
                NodeData::If {
                    cond,
                    then_branch,
                    else_branch,
                }
            }
            Some("while") => {
                self.pos += 1;
                let cond = self.paren_expr()?;
                let body = self.statement()?;
                NodeData::While { cond, body }
            }
            Some("do") => {
                self.pos += 1;
                let body = self.statement()?;
                self.expect_kw("while")?;
                let cond = self.paren_expr()?;
                self.expect(";")?;
                NodeData::DoWhile { body, cond }
            }
            Some("for") => return self.for_statement(),
            Some("return") => {
                self.pos += 1;
                let expr = if self.at(";") {
                    None
                } else {
                    Some(self.expr()?)
                };
                self.expect(";")?;
                NodeData::Return { expr }
            }
            Some("throw") => {
                self.pos += 1;
                let expr = self.expr()?;
                self.expect(";")?;
                NodeData::Throw { expr }
            }
            Some(kw @ ("break" | "continue")) => {
                self.pos += 1;
                let label = if self.at(";") { None } else { Some(self.ident()?) };
                self.expect(";")?;
                if kw == "break" {
                    NodeData::Break { label }
                } else {
                    NodeData::Continue { label }
                }
            }
            Some("assert") => {
                self.pos += 1;
                let cond = self.expr()?;
                let detail = if self.eat(":") {
                    Some(self.expr()?)
                } else {
                    None
                };
                self.expect(";")?;
                NodeData::Assert { cond, detail }
            }
            Some("synchronized") => {
                self.pos += 1;
                let lock = self.paren_expr()?;
                let body = self.block()?;
                NodeData::Synchronized { lock, body }
            }
            Some("switch") => return self.switch_statement(),
            Some("try") => return self.try_statement(),
            Some("class" | "interface" | "enum") => {
                return Err(self.error("local classes are not supported"));
            }
            _ => {
                let expr = self.expr()?;
                self.expect(";")?;
                NodeData::ExpressionStatement { expr }
            }
        };
        Ok(self.alloc(start, data))
    }

    fn for_statement(&mut self) -> PResult<NodeId> {
        let start = self.start();
        self.expect_kw("for")?;
        self.expect("(")?;
        let mut init = Vec::new();
        if self.looks_like_local_decl() {
            let var_start = self.start();
            let (modifiers, annotations) = self.modifiers()?;
            let ty = self.type_node()?;
            let name = self.ident()?;
            if self.eat(":") {
                let var = self.alloc(
                    var_start,
                    NodeData::Variable {
                        name,
                        modifiers,
                        annotations,
                        ty: Some(ty),
                        init: None,
                    },
                );
                let expr = self.expr()?;
                self.expect(")")?;
                let body = self.statement()?;
                return Ok(self.alloc(start, NodeData::EnhancedFor { var, expr, body }));
            }
            self.declarators(var_start, modifiers, annotations, ty, Some(name), &mut init)?;
        } else {
            while !self.at(";") {
                init.push(self.expression_statement_no_semi()?);
                if !self.eat(",") {
                    break;
                }
            }
        }
        self.expect(";")?;
        let cond = if self.at(";") {
            None
        } else {
            Some(self.expr()?)
        };
        self.expect(";")?;
        let mut update = Vec::new();
        while !self.at(")") {
            update.push(self.expression_statement_no_semi()?);
            if !self.eat(",") {
                break;
            }
        }
        self.expect(")")?;
        let body = self.statement()?;
        Ok(self.alloc(
            start,
            NodeData::For {
                init,
                cond,
                update,
                body,
            },
        ))
    }

    fn expression_statement_no_semi(&mut self) -> PResult<NodeId> {
        let start = self.start();
        let expr = self.expr()?;
        Ok(self.alloc(start, NodeData::ExpressionStatement { expr }))
    }

    fn switch_statement(&mut self) -> PResult<NodeId> {
        let start = self.start();
        self.expect_kw("switch")?;
        let selector = self.paren_expr()?;
        self.expect("{")?;
        let mut cases = Vec::new();
        while !self.eat("}") {
            let case_start = self.start();
            let mut labels = Vec::new();
            if self.eat_kw("default") {
                self.expect(":")?;
            } else {
                self.expect_kw("case")?;
                loop {
                    labels.push(self.conditional()?);
                    if !self.eat(",") {
                        break;
                    }
                }
                self.expect(":")?;
            }
            let mut body = Vec::new();
            while !(self.at_kw("case") || self.at("}") || self.at_default_label()) {
                if self.peek().is_none() {
                    return Err(self.error("unterminated switch"));
                }
                self.block_statement(&mut body)?;
            }
            cases.push(self.alloc(case_start, NodeData::Case { labels, body }));
        }
        Ok(self.alloc(start, NodeData::Switch { selector, cases }))
    }

    fn at_default_label(&self) -> bool {
        self.at_kw("default") && self.peek_at(1).is_some_and(|t| t.is_punct(":"))
    }

    fn try_statement(&mut self) -> PResult<NodeId> {
        let start = self.start();
        self.expect_kw("try")?;
        let mut resources = Vec::new();
        if self.eat("(") {
            while !self.at(")") {
                let var_start = self.start();
                let (modifiers, annotations) = self.modifiers()?;
                let ty = self.type_node()?;
                let name = self.ident()?;
                self.expect("=")?;
                let init = Some(self.expr()?);
                resources.push(self.alloc(
                    var_start,
                    NodeData::Variable {
                        name,
                        modifiers,
                        annotations,
                        ty: Some(ty),
                        init,
                    },
                ));
                if !self.eat(";") {
                    break;
                }
            }
            self.expect(")")?;
        }
        let body = self.block()?;
        let mut catches = Vec::new();
        while self.at_kw("catch") {
            let catch_start = self.start();
            self.pos += 1;
            self.expect("(")?;
            let var_start = self.start();
            let (modifiers, annotations) = self.modifiers()?;
            let ty = self.type_node()?;
            while self.eat("|") {
                // Multi-catch is typed by its first alternative.
                self.type_ref()?;
            }
            let name = self.ident()?;
            self.expect(")")?;
            let param = self.alloc(
                var_start,
                NodeData::Variable {
                    name,
                    modifiers,
                    annotations,
                    ty: Some(ty),
                    init: None,
                },
            );
            let catch_body = self.block()?;
            catches.push(self.alloc(
                catch_start,
                NodeData::Catch {
                    param,
                    body: catch_body,
                },
            ));
        }
        let finally = if self.eat_kw("finally") {
            Some(self.block()?)
        } else {
            None
        };
        Ok(self.alloc(
            start,
            NodeData::Try {
                resources,
                body,
                catches,
                finally,
            },
        ))
    }

    // --- expressions ----------------------------------------------------

    fn assignment_op(&self) -> Option<(Option<BinaryOp>, usize)> {
        let (gts, eq) = self.gt_run();
        if gts >= 2 && eq {
            let op = if gts == 2 { BinaryOp::Shr } else { BinaryOp::UShr };
            return Some((Some(op), gts + 1));
        }
        let token = self.peek()?;
        let TokenKind::Punct(p) = token.kind else {
            return None;
        };
        let op = match p {
            "=" => None,
            "+=" => Some(BinaryOp::Add),
            "-=" => Some(BinaryOp::Sub),
            "*=" => Some(BinaryOp::Mul),
            "/=" => Some(BinaryOp::Div),
            "%=" => Some(BinaryOp::Rem),
            "&=" => Some(BinaryOp::BitAnd),
            "|=" => Some(BinaryOp::BitOr),
            "^=" => Some(BinaryOp::BitXor),
            "<<=" => Some(BinaryOp::Shl),
            _ => return None,
        };
        Some((op, 1))
    }

    fn expr(&mut self) -> PResult<NodeId> {
        if self.lambda_ahead() {
            return self.lambda();
        }
        let lhs = self.conditional()?;
        let Some((op, tokens)) = self.assignment_op() else {
            return Ok(lhs);
        };
        self.pos += tokens;
        let rhs = self.expr()?;
        let start = self.start_of(lhs);
        let data = match op {
            None => NodeData::Assignment { lhs, rhs },
            Some(op) => NodeData::CompoundAssignment { op, lhs, rhs },
        };
        Ok(self.alloc(start, data))
    }

    fn conditional(&mut self) -> PResult<NodeId> {
        let cond = self.binary(1)?;
        if !self.eat("?") {
            return Ok(cond);
        }
        let then_expr = self.expr()?;
        self.expect(":")?;
        let else_expr = if self.lambda_ahead() {
            self.lambda()?
        } else {
            self.conditional()?
        };
        let start = self.start_of(cond);
        Ok(self.alloc(
            start,
            NodeData::Conditional {
                cond,
                then_expr,
                else_expr,
            },
        ))
    }

    fn binary_op(&self) -> Option<(BinaryOp, usize)> {
        match self.gt_run() {
            (1, false) => return Some((BinaryOp::Gt, 1)),
            (1, true) => return Some((BinaryOp::Ge, 2)),
            (2, false) => return Some((BinaryOp::Shr, 2)),
            (3, false) => return Some((BinaryOp::UShr, 3)),
            (0, _) => {}
            _ => return None,
        }
        let token = self.peek()?;
        let TokenKind::Punct(p) = token.kind else {
            return None;
        };
        BinaryOp::from_symbol(p).map(|op| (op, 1))
    }

    fn binary(&mut self, min_prec: u8) -> PResult<NodeId> {
        let mut lhs = self.unary()?;
        loop {
            if self.at_kw("instanceof") {
                if INSTANCEOF_PRECEDENCE < min_prec {
                    break;
                }
                self.pos += 1;
                self.eat_kw("final");
                let ty = self.type_node()?;
                let start = self.start_of(lhs);
                lhs = self.alloc(start, NodeData::InstanceOf { expr: lhs, ty });
                continue;
            }
            let Some((op, tokens)) = self.binary_op() else {
                break;
            };
            let prec = binary_precedence(op);
            if prec < min_prec {
                break;
            }
            self.pos += tokens;
            let rhs = self.binary(prec + 1)?;
            let start = self.start_of(lhs);
            lhs = self.alloc(start, NodeData::Binary { op, lhs, rhs });
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> PResult<NodeId> {
        let start = self.start();
        let prefix = match self.peek().map(|t| &t.kind) {
            Some(TokenKind::Punct("+")) => Some(UnaryOp::Plus),
            Some(TokenKind::Punct("-")) => Some(UnaryOp::Minus),
            Some(TokenKind::Punct("!")) => Some(UnaryOp::Not),
            Some(TokenKind::Punct("~")) => Some(UnaryOp::BitNot),
            Some(TokenKind::Punct("++")) => Some(UnaryOp::PreInc),
            Some(TokenKind::Punct("--")) => Some(UnaryOp::PreDec),
            _ => None,
        };
        if let Some(op) = prefix {
            self.pos += 1;
            let operand = self.unary()?;
            return Ok(self.alloc(start, NodeData::Unary { op, operand }));
        }
        if self.at("(") {
            if self.lambda_ahead() {
                return self.lambda();
            }
            if self.cast_ahead() {
                self.pos += 1;
                let ty = self.type_node()?;
                self.expect(")")?;
                let expr = if self.lambda_ahead() {
                    self.lambda()?
                } else {
                    self.unary()?
                };
                return Ok(self.alloc(start, NodeData::TypeCast { ty, expr }));
            }
        }
        let primary = self.primary()?;
        self.postfix(primary)
    }

    fn cast_ahead(&self) -> bool {
        let Some(after) = self.scan_type(self.pos + 1) else {
            return false;
        };
        if !self.tokens.get(after).is_some_and(|t| t.is_punct(")")) {
            return false;
        }
        let is_primitive = self
            .peek_at(1)
            .is_some_and(|t| PRIMITIVES.contains(&t.text));
        if is_primitive {
            return true;
        }
        self.tokens.get(after + 1).is_some_and(|t| match &t.kind {
            TokenKind::Literal(_) => true,
            TokenKind::Ident => t.text != "instanceof",
            TokenKind::Punct(p) => matches!(*p, "(" | "!" | "~"),
        })
    }

    fn lambda_ahead(&self) -> bool {
        if self.peek().is_some_and(|t| t.is_ident())
            && self.peek_at(1).is_some_and(|t| t.is_punct("->"))
        {
            return true;
        }
        if !self.at("(") {
            return false;
        }
        let mut depth = 0usize;
        let mut p = self.pos;
        while let Some(t) = self.tokens.get(p) {
            if t.is_punct("(") {
                depth += 1;
            } else if t.is_punct(")") {
                depth -= 1;
                if depth == 0 {
                    return self.tokens.get(p + 1).is_some_and(|t| t.is_punct("->"));
                }
            }
            p += 1;
        }
        false
    }

    fn lambda(&mut self) -> PResult<NodeId> {
        let start = self.start();
        let mut params = Vec::new();
        if self.eat("(") {
            while !self.at(")") {
                let param_start = self.start();
                let implicit = self.peek().is_some_and(|t| t.is_ident())
                    && self.peek_at(1).is_some_and(|t| t.is_punct(",") || t.is_punct(")"));
                let (modifiers, annotations, ty) = if implicit {
                    (Modifiers::NONE, Vec::new(), None)
                } else {
                    let (modifiers, annotations) = self.modifiers()?;
                    (modifiers, annotations, Some(self.type_node()?))
                };
                let name = self.ident()?;
                params.push(self.alloc(
                    param_start,
                    NodeData::Variable {
                        name,
                        modifiers,
                        annotations,
                        ty,
                        init: None,
                    },
                ));
                if !self.eat(",") {
                    break;
                }
            }
            self.expect(")")?;
        } else {
            let name = self.ident()?;
            params.push(self.alloc(
                start,
                NodeData::Variable {
                    name,
                    modifiers: Modifiers::NONE,
                    annotations: Vec::new(),
                    ty: None,
                    init: None,
                },
            ));
        }
        self.expect("->")?;
        let body = if self.at("{") {
            self.block()?
        } else {
            self.expr()?
        };
        Ok(self.alloc(start, NodeData::Lambda { params, body }))
    }

    fn arguments(&mut self) -> PResult<Vec<NodeId>> {
        self.expect("(")?;
        let mut args = Vec::new();
        while !self.at(")") {
            args.push(self.expr()?);
            if !self.eat(",") {
                break;
            }
        }
        self.expect(")")?;
        Ok(args)
    }

    fn primary(&mut self) -> PResult<NodeId> {
        let start = self.start();
        let Some(token) = self.peek().cloned() else {
            return Err(self.error("expected an expression"));
        };
        match token.kind {
            TokenKind::Literal(value) => {
                self.pos += 1;
                Ok(self.alloc(start, NodeData::Literal { value: Some(value) }))
            }
            TokenKind::Punct("(") => self.paren_expr(),
            TokenKind::Ident if token.text == "null" => {
                self.pos += 1;
                Ok(self.alloc(start, NodeData::Literal { value: None }))
            }
            TokenKind::Ident if token.text == "new" => self.creator(),
            TokenKind::Ident if PRIMITIVES.contains(&token.text) => {
                // `int.class`, `int[]::new` and friends.
                let ty = self.type_node()?;
                Ok(ty)
            }
            TokenKind::Ident => {
                self.pos += 1;
                Ok(self.alloc(
                    start,
                    NodeData::Identifier {
                        name: Name::new(token.text),
                    },
                ))
            }
            _ => Err(self.error("expected an expression")),
        }
    }

    fn postfix(&mut self, mut expr: NodeId) -> PResult<NodeId> {
        let start = self.start_of(expr);
        loop {
            if self.at("(")
                && matches!(self.b.data(expr), Some(NodeData::Identifier { .. }))
            {
                let args = self.arguments()?;
                expr = self.alloc(
                    start,
                    NodeData::MethodInvocation {
                        method_select: expr,
                        args,
                    },
                );
            } else if self.eat(".") {
                if self.at("<") {
                    // Explicit type arguments are not modeled.
                    self.type_ref_args_skip()?;
                }
                let name = if self.eat_kw("new") {
                    return Err(self.error("qualified instance creation is not supported"));
                } else {
                    self.ident()?
                };
                let select = self.alloc(start, NodeData::MemberSelect { expr, name });
                expr = if self.at("(") {
                    let args = self.arguments()?;
                    self.alloc(
                        start,
                        NodeData::MethodInvocation {
                            method_select: select,
                            args,
                        },
                    )
                } else {
                    select
                };
            } else if self.at("[") {
                self.pos += 1;
                let index = self.expr()?;
                self.expect("]")?;
                expr = self.alloc(start, NodeData::ArrayAccess { array: expr, index });
            } else if self.eat("::") {
                let name = if self.eat_kw("new") {
                    Name::new(CONSTRUCTOR_NAME)
                } else {
                    self.ident()?
                };
                expr = self.alloc(start, NodeData::MemberReference { expr, name });
            } else if self.at("++") || self.at("--") {
                let op = if self.at("++") {
                    UnaryOp::PostInc
                } else {
                    UnaryOp::PostDec
                };
                self.pos += 1;
                expr = self.alloc(start, NodeData::Unary { op, operand: expr });
            } else {
                return Ok(expr);
            }
        }
    }

    fn type_ref_args_skip(&mut self) -> PResult<()> {
        self.expect("<")?;
        loop {
            self.type_arg()?;
            if !self.eat(",") {
                break;
            }
        }
        self.expect(">")
    }

    fn creator(&mut self) -> PResult<NodeId> {
        let start = self.start();
        self.expect_kw("new")?;
        let type_start = self.start();
        let base = self.type_ref_no_dims()?;
        let type_range = self.range_from(type_start);
        let spelled = Name::new(&self.text[std::ops::Range::<usize>::from(type_range)]);
        let type_node = self.b.alloc(type_range, NodeData::Type { spelled });
        self.type_refs.insert(type_node, base.clone());

        if self.at("[") {
            let mut dims = Vec::new();
            let mut total = 0;
            while self.eat("[") {
                total += 1;
                if self.eat("]") {
                    continue;
                }
                dims.push(self.expr()?);
                self.expect("]")?;
            }
            let init = if self.at("{") {
                let list = self.array_initializer()?;
                match self.b.data(list) {
                    Some(NodeData::NewArray { init: Some(elems), .. }) => Some(elems.clone()),
                    _ => None,
                }
            } else {
                None
            };
            let node = self.alloc(
                start,
                NodeData::NewArray {
                    elem_type: Some(type_node),
                    dims,
                    init,
                },
            );
            self.type_refs.insert(
                node,
                TypeRef {
                    dims: total,
                    ..base
                },
            );
            return Ok(node);
        }

        let args = self.arguments()?;
        let body = if self.at("{") {
            let body_start = self.start();
            let members = self.class_body(ClassKind::Class, "")?;
            Some(self.alloc(
                body_start,
                NodeData::Class {
                    name: Name::default(),
                    kind: ClassKind::Class,
                    modifiers: Modifiers::NONE,
                    annotations: Vec::new(),
                    extends: None,
                    implements: Vec::new(),
                    members,
                },
            ))
        } else {
            None
        };
        Ok(self.alloc(
            start,
            NodeData::NewClass {
                class_name: type_node,
                args,
                body,
            },
        ))
    }
}

fn simple_type_ref(name: &str) -> TypeRef {
    TypeRef {
        name: name.to_string(),
        args: Vec::new(),
        dims: 0,
        diamond: false,
    }
}
