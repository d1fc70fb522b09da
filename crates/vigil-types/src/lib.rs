//! The type model shared by every vigil crate.
//!
//! Types and class definitions are owned by a [`TypeStore`] that lives exactly as
//! long as one compilation. Everything that needs to look at classes goes through
//! the [`TypeEnv`] trait so tests and hosts can supply their own store.

mod format;
mod minimal_jdk;
mod overrides;
mod subtyping;
mod supertypes;

use std::collections::HashMap;
use std::fmt;

pub use format::{format_type, format_type_simple, parse_type};
pub use overrides::{
    find_super_method, find_super_method_in_type, find_super_methods, super_methods,
    SuperMethods,
};
pub use subtyping::{
    box_primitive, boxed_class_name, erasure, is_assignable, is_castable, is_lossy_widening,
    is_same_erasure, is_same_type, is_subtype, is_widening, unbox_type,
};
pub use supertypes::{
    canonicalize_named, direct_supertypes, instantiate_as_supertype, substitute,
    supertype_closure,
};

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(u32);

        impl $name {
            pub const fn from_raw(raw: u32) -> Self {
                $name(raw)
            }

            #[must_use]
            pub const fn to_raw(self) -> u32 {
                self.0
            }

            #[must_use]
            pub fn idx(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }
    };
}

id_type!(
    /// Index of a class definition inside a [`TypeStore`].
    ClassId
);
id_type!(
    /// Index of a type parameter definition inside a [`TypeStore`].
    TypeVarId
);

/// A method declared by `owner`, addressed by its position in `ClassDef::methods`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MethodId {
    pub owner: ClassId,
    pub index: u32,
}

impl MethodId {
    pub const fn new(owner: ClassId, index: u32) -> Self {
        Self { owner, index }
    }
}

/// A field declared by `owner`, addressed by its position in `ClassDef::fields`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldId {
    pub owner: ClassId,
    pub index: u32,
}

impl FieldId {
    pub const fn new(owner: ClassId, index: u32) -> Self {
        Self { owner, index }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PrimitiveType {
    Boolean,
    Byte,
    Short,
    Char,
    Int,
    Long,
    Float,
    Double,
}

impl PrimitiveType {
    pub const ALL: [PrimitiveType; 8] = [
        PrimitiveType::Boolean,
        PrimitiveType::Byte,
        PrimitiveType::Short,
        PrimitiveType::Char,
        PrimitiveType::Int,
        PrimitiveType::Long,
        PrimitiveType::Float,
        PrimitiveType::Double,
    ];

    pub fn keyword(self) -> &'static str {
        match self {
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::Byte => "byte",
            PrimitiveType::Short => "short",
            PrimitiveType::Char => "char",
            PrimitiveType::Int => "int",
            PrimitiveType::Long => "long",
            PrimitiveType::Float => "float",
            PrimitiveType::Double => "double",
        }
    }

    pub fn from_keyword(text: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.keyword() == text)
    }

    pub fn is_numeric(self) -> bool {
        self != PrimitiveType::Boolean
    }

    pub fn is_integral(self) -> bool {
        matches!(
            self,
            PrimitiveType::Byte
                | PrimitiveType::Short
                | PrimitiveType::Char
                | PrimitiveType::Int
                | PrimitiveType::Long
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Modifier {
    Public,
    Protected,
    Private,
    Abstract,
    Static,
    Final,
    Transient,
    Volatile,
    Synchronized,
    Native,
    Strictfp,
    Default,
    Sealed,
}

impl Modifier {
    pub const ALL: [Modifier; 13] = [
        Modifier::Public,
        Modifier::Protected,
        Modifier::Private,
        Modifier::Abstract,
        Modifier::Static,
        Modifier::Final,
        Modifier::Transient,
        Modifier::Volatile,
        Modifier::Synchronized,
        Modifier::Native,
        Modifier::Strictfp,
        Modifier::Default,
        Modifier::Sealed,
    ];

    fn bit(self) -> u16 {
        1 << (self as u16)
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Modifier::Public => "public",
            Modifier::Protected => "protected",
            Modifier::Private => "private",
            Modifier::Abstract => "abstract",
            Modifier::Static => "static",
            Modifier::Final => "final",
            Modifier::Transient => "transient",
            Modifier::Volatile => "volatile",
            Modifier::Synchronized => "synchronized",
            Modifier::Native => "native",
            Modifier::Strictfp => "strictfp",
            Modifier::Default => "default",
            Modifier::Sealed => "sealed",
        }
    }
}

/// A set of [`Modifier`]s.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Modifiers(u16);

impl Modifiers {
    pub const NONE: Modifiers = Modifiers(0);

    pub fn of(modifiers: &[Modifier]) -> Self {
        modifiers
            .iter()
            .fold(Self::NONE, |acc, m| acc.with(*m))
    }

    #[must_use]
    pub fn with(self, modifier: Modifier) -> Self {
        Modifiers(self.0 | modifier.bit())
    }

    pub fn contains(self, modifier: Modifier) -> bool {
        self.0 & modifier.bit() != 0
    }

    pub fn is_static(self) -> bool {
        self.contains(Modifier::Static)
    }

    pub fn is_private(self) -> bool {
        self.contains(Modifier::Private)
    }

    pub fn is_final(self) -> bool {
        self.contains(Modifier::Final)
    }

    pub fn is_abstract(self) -> bool {
        self.contains(Modifier::Abstract)
    }

    pub fn iter(self) -> impl Iterator<Item = Modifier> {
        Modifier::ALL.into_iter().filter(move |m| self.contains(*m))
    }
}

impl fmt::Debug for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set()
            .entries(self.iter().map(Modifier::keyword))
            .finish()
    }
}

/// A compile-time constant value.
#[derive(Clone, Debug, PartialEq)]
pub enum Constant {
    Bool(bool),
    Char(char),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
}

impl Constant {
    /// The primitive type of the constant, `None` for strings.
    pub fn primitive_type(&self) -> Option<PrimitiveType> {
        Some(match self {
            Constant::Bool(_) => PrimitiveType::Boolean,
            Constant::Char(_) => PrimitiveType::Char,
            Constant::Byte(_) => PrimitiveType::Byte,
            Constant::Short(_) => PrimitiveType::Short,
            Constant::Int(_) => PrimitiveType::Int,
            Constant::Long(_) => PrimitiveType::Long,
            Constant::Float(_) => PrimitiveType::Float,
            Constant::Double(_) => PrimitiveType::Double,
            Constant::String(_) => return None,
        })
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Constant::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Constant::String(v) => Some(v),
            _ => None,
        }
    }

    /// Integral value widened to `i64`, including `char`.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Constant::Char(v) => Some(*v as i64),
            Constant::Byte(v) => Some(*v as i64),
            Constant::Short(v) => Some(*v as i64),
            Constant::Int(v) => Some(*v as i64),
            Constant::Long(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Constant::Float(v) => Some(*v as f64),
            Constant::Double(v) => Some(*v),
            other => other.as_i64().map(|v| v as f64),
        }
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constant::Bool(v) => write!(f, "{v}"),
            Constant::Char(v) => write!(f, "{v}"),
            Constant::Byte(v) => write!(f, "{v}"),
            Constant::Short(v) => write!(f, "{v}"),
            Constant::Int(v) => write!(f, "{v}"),
            Constant::Long(v) => write!(f, "{v}"),
            Constant::Float(v) => write!(f, "{v:?}"),
            Constant::Double(v) => write!(f, "{v:?}"),
            Constant::String(v) => f.write_str(v),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ClassType {
    pub def: ClassId,
    pub args: Vec<Type>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum WildcardBound {
    Unbounded,
    Extends(Box<Type>),
    Super(Box<Type>),
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Type {
    Void,
    Primitive(PrimitiveType),
    Class(ClassType),
    Array(Box<Type>),
    TypeVar(TypeVarId),
    Wildcard(WildcardBound),
    Intersection(Vec<Type>),
    /// The type of the `null` literal.
    Null,
    /// A spelled but not yet resolved class name.
    Named(String),
    /// No type information is available.
    Unknown,
    /// The host reported an error for this type.
    Error,
}

impl Type {
    pub fn class(def: ClassId, args: Vec<Type>) -> Self {
        Type::Class(ClassType { def, args })
    }

    pub fn array(elem: Type) -> Self {
        Type::Array(Box::new(elem))
    }

    pub fn int() -> Self {
        Type::Primitive(PrimitiveType::Int)
    }

    pub fn boolean() -> Self {
        Type::Primitive(PrimitiveType::Boolean)
    }

    /// `Unknown`, `Error`, or a composite that contains one at the top level.
    pub fn is_errorish(&self) -> bool {
        match self {
            Type::Unknown | Type::Error => true,
            Type::Array(elem) => elem.is_errorish(),
            _ => false,
        }
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, Type::Primitive(_))
    }

    pub fn as_primitive(&self) -> Option<PrimitiveType> {
        match self {
            Type::Primitive(p) => Some(*p),
            _ => None,
        }
    }

    pub fn is_reference(&self) -> bool {
        matches!(
            self,
            Type::Class(_)
                | Type::Array(_)
                | Type::TypeVar(_)
                | Type::Intersection(_)
                | Type::Null
                | Type::Named(_)
        )
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Type::Array(_))
    }

    pub fn array_element(&self) -> Option<&Type> {
        match self {
            Type::Array(elem) => Some(elem),
            _ => None,
        }
    }

    pub fn class_id(&self) -> Option<ClassId> {
        match self {
            Type::Class(ClassType { def, .. }) => Some(*def),
            _ => None,
        }
    }

    pub fn type_args(&self) -> &[Type] {
        match self {
            Type::Class(ClassType { args, .. }) => args,
            _ => &[],
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ClassKind {
    Class,
    Interface,
    Enum,
    Record,
    Annotation,
}

impl ClassKind {
    pub fn is_interface(self) -> bool {
        matches!(self, ClassKind::Interface | ClassKind::Annotation)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeParamDef {
    pub name: String,
    pub upper_bounds: Vec<Type>,
    pub lower_bound: Option<Type>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FieldDef {
    pub name: String,
    pub ty: Type,
    pub modifiers: Modifiers,
    pub annotations: Vec<ClassId>,
    /// Value of a `static final` field initialized with a constant expression.
    pub constant: Option<Constant>,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
            modifiers: Modifiers::NONE,
            annotations: Vec::new(),
            constant: None,
        }
    }

    #[must_use]
    pub fn with_modifiers(mut self, modifiers: &[Modifier]) -> Self {
        self.modifiers = Modifiers::of(modifiers);
        self
    }

    #[must_use]
    pub fn with_constant(mut self, value: Constant) -> Self {
        self.constant = Some(value);
        self
    }

    pub fn is_static(&self) -> bool {
        self.modifiers.is_static()
    }
}

pub const CONSTRUCTOR_NAME: &str = "<init>";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodDef {
    pub name: String,
    pub type_params: Vec<TypeVarId>,
    pub params: Vec<Type>,
    pub return_type: Type,
    pub modifiers: Modifiers,
    pub is_varargs: bool,
    pub annotations: Vec<ClassId>,
}

impl MethodDef {
    pub fn new(name: impl Into<String>, params: Vec<Type>, return_type: Type) -> Self {
        Self {
            name: name.into(),
            type_params: Vec::new(),
            params,
            return_type,
            modifiers: Modifiers::of(&[Modifier::Public]),
            is_varargs: false,
            annotations: Vec::new(),
        }
    }

    pub fn constructor(params: Vec<Type>) -> Self {
        Self::new(CONSTRUCTOR_NAME, params, Type::Void)
    }

    #[must_use]
    pub fn with_modifiers(mut self, modifiers: &[Modifier]) -> Self {
        self.modifiers = Modifiers::of(modifiers);
        self
    }

    #[must_use]
    pub fn with_type_params(mut self, type_params: Vec<TypeVarId>) -> Self {
        self.type_params = type_params;
        self
    }

    #[must_use]
    pub fn varargs(mut self) -> Self {
        self.is_varargs = true;
        self
    }

    #[must_use]
    pub fn with_annotation(mut self, annotation: ClassId) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn is_static(&self) -> bool {
        self.modifiers.is_static()
    }

    pub fn is_constructor(&self) -> bool {
        self.name == CONSTRUCTOR_NAME
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ClassDef {
    /// Fully qualified name (`java.util.Map.Entry` for nested classes).
    pub name: String,
    pub kind: ClassKind,
    pub outer: Option<ClassId>,
    pub modifiers: Modifiers,
    pub annotations: Vec<ClassId>,
    pub type_params: Vec<TypeVarId>,
    pub super_class: Option<Type>,
    pub interfaces: Vec<Type>,
    pub fields: Vec<FieldDef>,
    pub methods: Vec<MethodDef>,
}

impl ClassDef {
    pub fn new(name: impl Into<String>, kind: ClassKind) -> Self {
        Self {
            name: name.into(),
            kind,
            outer: None,
            modifiers: Modifiers::of(&[Modifier::Public]),
            annotations: Vec::new(),
            type_params: Vec::new(),
            super_class: None,
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_super(mut self, super_class: Type) -> Self {
        self.super_class = Some(super_class);
        self
    }

    #[must_use]
    pub fn with_interface(mut self, iface: Type) -> Self {
        self.interfaces.push(iface);
        self
    }

    #[must_use]
    pub fn with_type_params(mut self, type_params: Vec<TypeVarId>) -> Self {
        self.type_params = type_params;
        self
    }

    #[must_use]
    pub fn with_modifiers(mut self, modifiers: &[Modifier]) -> Self {
        self.modifiers = Modifiers::of(modifiers);
        self
    }

    #[must_use]
    pub fn with_annotation(mut self, annotation: ClassId) -> Self {
        self.annotations.push(annotation);
        self
    }

    #[must_use]
    pub fn with_outer(mut self, outer: ClassId) -> Self {
        self.outer = Some(outer);
        self
    }

    #[must_use]
    pub fn with_field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    #[must_use]
    pub fn with_method(mut self, method: MethodDef) -> Self {
        self.methods.push(method);
        self
    }

    pub fn simple_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }

    pub fn is_interface(&self) -> bool {
        self.kind.is_interface()
    }

    pub fn method_ids(&self, owner: ClassId) -> impl Iterator<Item = (MethodId, &MethodDef)> {
        self.methods
            .iter()
            .enumerate()
            .map(move |(idx, m)| (MethodId::new(owner, idx as u32), m))
    }
}

/// Classes every store defines, looked up once at construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WellKnownTypes {
    pub object: ClassId,
    pub string: ClassId,
    pub cloneable: ClassId,
    pub serializable: ClassId,
}

/// Read access to class and type-parameter definitions.
pub trait TypeEnv {
    fn class(&self, id: ClassId) -> Option<&ClassDef>;
    fn type_param(&self, id: TypeVarId) -> Option<&TypeParamDef>;
    fn lookup_class(&self, name: &str) -> Option<ClassId>;
    fn well_known(&self) -> &WellKnownTypes;

    fn method(&self, id: MethodId) -> Option<&MethodDef> {
        self.class(id.owner)?.methods.get(id.index as usize)
    }

    fn field(&self, id: FieldId) -> Option<&FieldDef> {
        self.class(id.owner)?.fields.get(id.index as usize)
    }

    fn object_type(&self) -> Type {
        Type::class(self.well_known().object, vec![])
    }

    fn string_type(&self) -> Type {
        Type::class(self.well_known().string, vec![])
    }
}

#[derive(Clone, Debug)]
pub struct TypeStore {
    classes: Vec<ClassDef>,
    type_params: Vec<TypeParamDef>,
    by_name: HashMap<String, ClassId>,
    well_known: WellKnownTypes,
}

impl Default for TypeStore {
    fn default() -> Self {
        let placeholder = ClassId::from_raw(0);
        let mut store = TypeStore {
            classes: Vec::new(),
            type_params: Vec::new(),
            by_name: HashMap::new(),
            well_known: WellKnownTypes {
                object: placeholder,
                string: placeholder,
                cloneable: placeholder,
                serializable: placeholder,
            },
        };
        let object = store.upsert_class(ClassDef::new("java.lang.Object", ClassKind::Class));
        let object_ty = Type::class(object, vec![]);
        let cloneable =
            store.upsert_class(ClassDef::new("java.lang.Cloneable", ClassKind::Interface));
        let serializable =
            store.upsert_class(ClassDef::new("java.io.Serializable", ClassKind::Interface));
        let string = store.upsert_class(
            ClassDef::new("java.lang.String", ClassKind::Class)
                .with_modifiers(&[Modifier::Public, Modifier::Final])
                .with_super(object_ty)
                .with_interface(Type::class(serializable, vec![])),
        );
        store.well_known = WellKnownTypes {
            object,
            string,
            cloneable,
            serializable,
        };
        store
    }
}

impl TypeStore {
    /// Returns the id for `name`, reserving an empty class definition when the
    /// name has not been seen yet.
    pub fn intern_class_id(&mut self, name: &str) -> ClassId {
        if let Some(id) = self.by_name.get(name) {
            return *id;
        }
        let id = ClassId::from_raw(self.classes.len() as u32);
        let mut placeholder = ClassDef::new(name, ClassKind::Class);
        if !self.classes.is_empty() {
            placeholder.super_class = Some(Type::class(self.well_known.object, vec![]));
        }
        self.classes.push(placeholder);
        self.by_name.insert(name.to_string(), id);
        id
    }

    pub fn define_class(&mut self, id: ClassId, def: ClassDef) {
        if let Some(old) = self.classes.get(id.idx()) {
            if old.name != def.name {
                self.by_name.remove(&old.name);
            }
        }
        self.by_name.insert(def.name.clone(), id);
        if let Some(slot) = self.classes.get_mut(id.idx()) {
            *slot = def;
        }
    }

    /// Defines `def`, replacing any existing definition with the same name.
    pub fn upsert_class(&mut self, def: ClassDef) -> ClassId {
        let id = self.intern_class_id(&def.name);
        self.define_class(id, def);
        id
    }

    pub fn add_type_param(
        &mut self,
        name: impl Into<String>,
        upper_bounds: Vec<Type>,
    ) -> TypeVarId {
        let id = TypeVarId::from_raw(self.type_params.len() as u32);
        self.type_params.push(TypeParamDef {
            name: name.into(),
            upper_bounds,
            lower_bound: None,
        });
        id
    }

    /// Replaces the bounds of a type parameter; used for self-referential bounds
    /// such as `E extends Enum<E>`.
    pub fn set_type_param_bounds(&mut self, id: TypeVarId, upper_bounds: Vec<Type>) {
        if let Some(tp) = self.type_params.get_mut(id.idx()) {
            tp.upper_bounds = upper_bounds;
        }
    }

    pub fn class_id(&self, name: &str) -> Option<ClassId> {
        self.by_name.get(name).copied()
    }

    pub fn class_mut(&mut self, id: ClassId) -> Option<&mut ClassDef> {
        self.classes.get_mut(id.idx())
    }

    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    /// Looks up `method` by name and erased parameter spelling, e.g.
    /// `("java.util.Map", "get", &["java.lang.Object"])`.
    pub fn method_id(&self, class: &str, name: &str, params: &[&str]) -> Option<MethodId> {
        let owner = self.class_id(class)?;
        let def = self.class(owner)?;
        def.method_ids(owner)
            .find(|(_, m)| {
                m.name == name
                    && m.params.len() == params.len()
                    && m.params
                        .iter()
                        .zip(params)
                        .all(|(p, spelled)| format_type(self, &erasure(self, p)) == *spelled)
            })
            .map(|(id, _)| id)
    }
}

impl TypeEnv for TypeStore {
    fn class(&self, id: ClassId) -> Option<&ClassDef> {
        self.classes.get(id.idx())
    }

    fn type_param(&self, id: TypeVarId) -> Option<&TypeParamDef> {
        self.type_params.get(id.idx())
    }

    fn lookup_class(&self, name: &str) -> Option<ClassId> {
        self.class_id(name)
    }

    fn well_known(&self) -> &WellKnownTypes {
        &self.well_known
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intern_class_id_is_idempotent() {
        let mut store = TypeStore::default();
        let first = store.intern_class_id("com.example.Foo");
        let second = store.intern_class_id("com.example.Foo");
        assert_eq!(first, second);
    }

    #[test]
    fn upsert_class_overwrites_without_changing_id() {
        let mut store = TypeStore::default();
        let first = store.upsert_class(ClassDef::new("com.example.Bar", ClassKind::Class));
        let second = store.upsert_class(
            ClassDef::new("com.example.Bar", ClassKind::Interface)
                .with_method(MethodDef::new("m", vec![], Type::Void)),
        );
        assert_eq!(first, second);
        let def = store.class(first).unwrap();
        assert_eq!(def.kind, ClassKind::Interface);
        assert_eq!(def.methods.len(), 1);
    }

    #[test]
    fn modifiers_set_operations() {
        let mods = Modifiers::of(&[Modifier::Public, Modifier::Static]);
        assert!(mods.is_static());
        assert!(!mods.is_final());
        assert_eq!(
            mods.iter().collect::<Vec<_>>(),
            vec![Modifier::Public, Modifier::Static]
        );
    }

    #[test]
    fn default_store_defines_well_known_classes() {
        let store = TypeStore::default();
        let wk = store.well_known();
        assert_eq!(store.class(wk.object).unwrap().name, "java.lang.Object");
        assert_eq!(store.class(wk.string).unwrap().simple_name(), "String");
        assert_eq!(store.class(wk.object).unwrap().super_class, None);
    }
}
