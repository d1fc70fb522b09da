//! A small, hand-written slice of the JDK.
//!
//! Enough of `java.lang`, `java.io` and `java.util` for rules and tests to
//! resolve the classes and members they talk about. Signatures follow the real
//! JDK; members nobody needs are left out.

use crate::{
    ClassDef, ClassKind, Constant, FieldDef, MethodDef, Modifier, PrimitiveType, Type, TypeStore,
    TypeVarId,
};

const PUBLIC_STATIC: &[Modifier] = &[Modifier::Public, Modifier::Static];
const PUBLIC_FINAL: &[Modifier] = &[Modifier::Public, Modifier::Final];
const PUBLIC_ABSTRACT: &[Modifier] = &[Modifier::Public, Modifier::Abstract];
const CONSTANT: &[Modifier] = &[Modifier::Public, Modifier::Static, Modifier::Final];

struct MinimalJdk<'s> {
    store: &'s mut TypeStore,
}

impl MinimalJdk<'_> {
    fn ty(&mut self, name: &str) -> Type {
        Type::class(self.store.intern_class_id(name), vec![])
    }

    fn generic(&mut self, name: &str, args: Vec<Type>) -> Type {
        Type::class(self.store.intern_class_id(name), args)
    }

    fn object(&mut self) -> Type {
        self.ty("java.lang.Object")
    }

    fn string(&mut self) -> Type {
        self.ty("java.lang.String")
    }

    fn type_param(&mut self, name: &str) -> TypeVarId {
        let object = self.object();
        self.store.add_type_param(name, vec![object])
    }

    fn define(&mut self, def: ClassDef) {
        self.store.upsert_class(def);
    }

    fn object_methods(&mut self) -> Vec<MethodDef> {
        let object = self.object();
        let string = self.string();
        vec![
            MethodDef::new("equals", vec![object], Type::boolean()),
            MethodDef::new("hashCode", vec![], Type::int()),
            MethodDef::new("toString", vec![], string),
        ]
    }

    fn lang(&mut self) {
        let object = self.object();
        let string = self.string();
        let mut object_def = ClassDef::new("java.lang.Object", ClassKind::Class)
            .with_method(MethodDef::constructor(vec![]));
        object_def.methods.extend(self.object_methods());
        self.define(object_def);

        let comparable_t = self.type_param("T");
        self.define(
            ClassDef::new("java.lang.Comparable", ClassKind::Interface)
                .with_type_params(vec![comparable_t])
                .with_method(
                    MethodDef::new("compareTo", vec![Type::TypeVar(comparable_t)], Type::int())
                        .with_modifiers(PUBLIC_ABSTRACT),
                ),
        );
        self.define(
            ClassDef::new("java.lang.CharSequence", ClassKind::Interface)
                .with_method(MethodDef::new("length", vec![], Type::int()))
                .with_method(MethodDef::new(
                    "charAt",
                    vec![Type::int()],
                    Type::Primitive(PrimitiveType::Char),
                )),
        );
        let iterable_t = self.type_param("T");
        self.define(
            ClassDef::new("java.lang.Iterable", ClassKind::Interface)
                .with_type_params(vec![iterable_t]),
        );
        self.define(
            ClassDef::new("java.lang.Runnable", ClassKind::Interface)
                .with_method(
                    MethodDef::new("run", vec![], Type::Void).with_modifiers(PUBLIC_ABSTRACT),
                ),
        );

        let serializable = self.ty("java.io.Serializable");
        let char_sequence = self.ty("java.lang.CharSequence");
        let comparable_string = self.generic("java.lang.Comparable", vec![string.clone()]);
        let mut string_def = ClassDef::new("java.lang.String", ClassKind::Class)
            .with_modifiers(PUBLIC_FINAL)
            .with_super(object.clone())
            .with_interface(serializable.clone())
            .with_interface(comparable_string)
            .with_interface(char_sequence.clone())
            .with_method(MethodDef::constructor(vec![]))
            .with_method(MethodDef::new("length", vec![], Type::int()))
            .with_method(MethodDef::new("isEmpty", vec![], Type::boolean()))
            .with_method(MethodDef::new(
                "charAt",
                vec![Type::int()],
                Type::Primitive(PrimitiveType::Char),
            ))
            .with_method(MethodDef::new("compareTo", vec![string.clone()], Type::int()))
            .with_method(MethodDef::new("concat", vec![string.clone()], string.clone()))
            .with_method(MethodDef::new("trim", vec![], string.clone()))
            .with_method(
                MethodDef::new("valueOf", vec![object.clone()], string.clone())
                    .with_modifiers(PUBLIC_STATIC),
            )
            .with_method(
                MethodDef::new("valueOf", vec![Type::int()], string.clone())
                    .with_modifiers(PUBLIC_STATIC),
            )
            .with_method(
                MethodDef::new(
                    "format",
                    vec![string.clone(), Type::array(object.clone())],
                    string.clone(),
                )
                .with_modifiers(PUBLIC_STATIC)
                .varargs(),
            )
            .with_method(
                MethodDef::new(
                    "join",
                    vec![char_sequence.clone(), Type::array(char_sequence)],
                    string.clone(),
                )
                .with_modifiers(PUBLIC_STATIC)
                .varargs(),
            );
        string_def.methods.extend(self.object_methods());
        self.define(string_def);

        self.define(
            ClassDef::new("java.lang.Number", ClassKind::Class)
                .with_modifiers(PUBLIC_ABSTRACT)
                .with_super(object.clone())
                .with_interface(serializable.clone())
                .with_method(
                    MethodDef::new("intValue", vec![], Type::int()).with_modifiers(PUBLIC_ABSTRACT),
                )
                .with_method(
                    MethodDef::new("longValue", vec![], Type::Primitive(PrimitiveType::Long))
                        .with_modifiers(PUBLIC_ABSTRACT),
                )
                .with_method(
                    MethodDef::new("doubleValue", vec![], Type::Primitive(PrimitiveType::Double))
                        .with_modifiers(PUBLIC_ABSTRACT),
                ),
        );

        self.boxes();

        let pi = FieldDef::new("PI", Type::Primitive(PrimitiveType::Double))
            .with_modifiers(CONSTANT)
            .with_constant(Constant::Double(std::f64::consts::PI));
        let mut math = ClassDef::new("java.lang.Math", ClassKind::Class)
            .with_modifiers(PUBLIC_FINAL)
            .with_super(object.clone())
            .with_field(pi);
        for p in [PrimitiveType::Int, PrimitiveType::Long, PrimitiveType::Double] {
            let p = Type::Primitive(p);
            math.methods.push(
                MethodDef::new("abs", vec![p.clone()], p.clone()).with_modifiers(PUBLIC_STATIC),
            );
            math.methods.push(
                MethodDef::new("max", vec![p.clone(), p.clone()], p.clone())
                    .with_modifiers(PUBLIC_STATIC),
            );
            math.methods.push(
                MethodDef::new("min", vec![p.clone(), p.clone()], p).with_modifiers(PUBLIC_STATIC),
            );
        }
        math.methods.push(
            MethodDef::new(
                "round",
                vec![Type::Primitive(PrimitiveType::Double)],
                Type::Primitive(PrimitiveType::Long),
            )
            .with_modifiers(PUBLIC_STATIC),
        );
        self.define(math);

        let print_stream = self.ty("java.io.PrintStream");
        self.define(
            ClassDef::new("java.lang.System", ClassKind::Class)
                .with_modifiers(PUBLIC_FINAL)
                .with_super(object.clone())
                .with_field(FieldDef::new("out", print_stream.clone()).with_modifiers(CONSTANT))
                .with_field(FieldDef::new("err", print_stream.clone()).with_modifiers(CONSTANT))
                .with_method(
                    MethodDef::new(
                        "currentTimeMillis",
                        vec![],
                        Type::Primitive(PrimitiveType::Long),
                    )
                    .with_modifiers(PUBLIC_STATIC),
                )
                .with_method(
                    MethodDef::new(
                        "arraycopy",
                        vec![object.clone(), Type::int(), object.clone(), Type::int(), Type::int()],
                        Type::Void,
                    )
                    .with_modifiers(PUBLIC_STATIC),
                ),
        );

        let mut print = ClassDef::new("java.io.PrintStream", ClassKind::Class)
            .with_super(object.clone())
            .with_method(MethodDef::new("println", vec![], Type::Void));
        let printable = [
            object.clone(),
            string.clone(),
            Type::int(),
            Type::Primitive(PrimitiveType::Long),
            Type::Primitive(PrimitiveType::Double),
            Type::Primitive(PrimitiveType::Char),
            Type::boolean(),
            Type::array(Type::Primitive(PrimitiveType::Char)),
        ];
        for ty in printable {
            print.methods.push(MethodDef::new("println", vec![ty.clone()], Type::Void));
            print.methods.push(MethodDef::new("print", vec![ty], Type::Void));
        }
        print.methods.push(
            MethodDef::new(
                "printf",
                vec![string.clone(), Type::array(object.clone())],
                print_stream,
            )
            .varargs(),
        );
        self.define(print);

        let enum_e = self.type_param("E");
        let enum_of_e = self.generic("java.lang.Enum", vec![Type::TypeVar(enum_e)]);
        self.store.set_type_param_bounds(enum_e, vec![enum_of_e]);
        let comparable_e = self.generic("java.lang.Comparable", vec![Type::TypeVar(enum_e)]);
        let mut enum_def = ClassDef::new("java.lang.Enum", ClassKind::Class)
            .with_modifiers(PUBLIC_ABSTRACT)
            .with_type_params(vec![enum_e])
            .with_super(object.clone())
            .with_interface(comparable_e)
            .with_interface(serializable.clone())
            .with_method(
                MethodDef::new("name", vec![], string.clone()).with_modifiers(PUBLIC_FINAL),
            )
            .with_method(
                MethodDef::new("ordinal", vec![], Type::int()).with_modifiers(PUBLIC_FINAL),
            )
            .with_method(
                MethodDef::new("compareTo", vec![Type::TypeVar(enum_e)], Type::int())
                    .with_modifiers(PUBLIC_FINAL),
            );
        enum_def.methods.extend(self.object_methods());
        self.define(enum_def);

        let mut record = ClassDef::new("java.lang.Record", ClassKind::Class)
            .with_modifiers(PUBLIC_ABSTRACT)
            .with_super(object.clone());
        record.methods.extend(self.object_methods());
        self.define(record);

        self.define(
            ClassDef::new("java.lang.Void", ClassKind::Class)
                .with_modifiers(PUBLIC_FINAL)
                .with_super(object.clone()),
        );

        let throwable = self.ty("java.lang.Throwable");
        self.define(
            ClassDef::new("java.lang.Throwable", ClassKind::Class)
                .with_super(object.clone())
                .with_interface(serializable)
                .with_method(MethodDef::constructor(vec![]))
                .with_method(MethodDef::constructor(vec![string.clone()]))
                .with_method(MethodDef::new("getMessage", vec![], string.clone()))
                .with_method(MethodDef::new("getCause", vec![], throwable.clone()))
                .with_method(MethodDef::new("printStackTrace", vec![], Type::Void)),
        );
        let mut parent = throwable;
        for name in ["java.lang.Exception", "java.lang.RuntimeException"] {
            self.define(
                ClassDef::new(name, ClassKind::Class)
                    .with_super(parent)
                    .with_method(MethodDef::constructor(vec![]))
                    .with_method(MethodDef::constructor(vec![string.clone()])),
            );
            parent = self.ty(name);
        }
    }

    fn boxes(&mut self) {
        let object = self.object();
        let string = self.string();
        let serializable = self.ty("java.io.Serializable");
        let number = self.ty("java.lang.Number");

        let limits: [(PrimitiveType, Option<(Constant, Constant)>); 8] = [
            (PrimitiveType::Boolean, None),
            (
                PrimitiveType::Byte,
                Some((Constant::Byte(i8::MIN), Constant::Byte(i8::MAX))),
            ),
            (
                PrimitiveType::Short,
                Some((Constant::Short(i16::MIN), Constant::Short(i16::MAX))),
            ),
            (
                PrimitiveType::Char,
                Some((Constant::Char('\u{0}'), Constant::Char('\u{FFFF}'))),
            ),
            (
                PrimitiveType::Int,
                Some((Constant::Int(i32::MIN), Constant::Int(i32::MAX))),
            ),
            (
                PrimitiveType::Long,
                Some((Constant::Long(i64::MIN), Constant::Long(i64::MAX))),
            ),
            (
                PrimitiveType::Float,
                Some((Constant::Float(f32::from_bits(1)), Constant::Float(f32::MAX))),
            ),
            (
                PrimitiveType::Double,
                Some((Constant::Double(f64::from_bits(1)), Constant::Double(f64::MAX))),
            ),
        ];

        for (primitive, limits) in limits {
            let name = crate::boxed_class_name(primitive);
            let boxed = self.ty(name);
            let prim = Type::Primitive(primitive);
            let comparable = self.generic("java.lang.Comparable", vec![boxed.clone()]);
            let numeric = primitive.is_numeric() && primitive != PrimitiveType::Char;

            let mut def = ClassDef::new(name, ClassKind::Class)
                .with_modifiers(PUBLIC_FINAL)
                .with_super(if numeric { number.clone() } else { object.clone() })
                .with_interface(comparable);
            if !numeric {
                def = def.with_interface(serializable.clone());
            }
            def = def
                .with_method(
                    MethodDef::new("valueOf", vec![prim.clone()], boxed.clone())
                        .with_modifiers(PUBLIC_STATIC),
                )
                .with_method(
                    MethodDef::new("compare", vec![prim.clone(), prim.clone()], Type::int())
                        .with_modifiers(PUBLIC_STATIC),
                )
                .with_method(
                    MethodDef::new("toString", vec![prim.clone()], string.clone())
                        .with_modifiers(PUBLIC_STATIC),
                )
                .with_method(MethodDef::new("compareTo", vec![boxed.clone()], Type::int()))
                .with_method(MethodDef::new(
                    format!("{}Value", primitive.keyword()),
                    vec![],
                    prim.clone(),
                ));
            if let Some((min, max)) = limits {
                def = def
                    .with_field(
                        FieldDef::new("MIN_VALUE", prim.clone())
                            .with_modifiers(CONSTANT)
                            .with_constant(min),
                    )
                    .with_field(
                        FieldDef::new("MAX_VALUE", prim.clone())
                            .with_modifiers(CONSTANT)
                            .with_constant(max),
                    );
            }
            match primitive {
                PrimitiveType::Int => {
                    def = def.with_method(
                        MethodDef::new("parseInt", vec![string.clone()], prim.clone())
                            .with_modifiers(PUBLIC_STATIC),
                    );
                }
                PrimitiveType::Float | PrimitiveType::Double => {
                    def = def.with_method(
                        MethodDef::new("isNaN", vec![prim.clone()], Type::boolean())
                            .with_modifiers(PUBLIC_STATIC),
                    );
                }
                _ => {}
            }
            def.methods.extend(self.object_methods());
            self.define(def);
        }
    }

    fn annotations(&mut self) {
        let annotation = self.ty("java.lang.annotation.Annotation");
        self.define(ClassDef::new("java.lang.annotation.Annotation", ClassKind::Interface));
        let string = self.string();
        for name in [
            "java.lang.Override",
            "java.lang.Deprecated",
            "java.lang.FunctionalInterface",
            "java.lang.SuppressWarnings",
            "java.lang.annotation.Inherited",
        ] {
            let mut def =
                ClassDef::new(name, ClassKind::Annotation).with_interface(annotation.clone());
            if name == "java.lang.SuppressWarnings" {
                def = def.with_method(
                    MethodDef::new("value", vec![], Type::array(string.clone()))
                        .with_modifiers(PUBLIC_ABSTRACT),
                );
            }
            self.define(def);
        }
    }

    fn collections(&mut self) {
        let object = self.object();
        let string = self.string();

        let collection_e = self.type_param("E");
        let e = Type::TypeVar(collection_e);
        let iterable_e = self.generic("java.lang.Iterable", vec![e.clone()]);
        self.define(
            ClassDef::new("java.util.Collection", ClassKind::Interface)
                .with_type_params(vec![collection_e])
                .with_interface(iterable_e)
                .with_method(MethodDef::new("size", vec![], Type::int()))
                .with_method(MethodDef::new("isEmpty", vec![], Type::boolean()))
                .with_method(MethodDef::new("contains", vec![object.clone()], Type::boolean()))
                .with_method(MethodDef::new("add", vec![e.clone()], Type::boolean()))
                .with_method(MethodDef::new("remove", vec![object.clone()], Type::boolean()))
                .with_method(MethodDef::new("toArray", vec![], Type::array(object.clone()))),
        );

        let list_e = self.type_param("E");
        let e = Type::TypeVar(list_e);
        let of_e = self.type_param("E");
        let collection_of = self.generic("java.util.Collection", vec![e.clone()]);
        let list_of_of_e = self.generic("java.util.List", vec![Type::TypeVar(of_e)]);
        self.define(
            ClassDef::new("java.util.List", ClassKind::Interface)
                .with_type_params(vec![list_e])
                .with_interface(collection_of)
                .with_method(MethodDef::new("get", vec![Type::int()], e.clone()))
                .with_method(MethodDef::new("set", vec![Type::int(), e.clone()], e.clone()))
                .with_method(MethodDef::new("add", vec![e.clone()], Type::boolean()))
                .with_method(MethodDef::new("indexOf", vec![object.clone()], Type::int()))
                .with_method(
                    MethodDef::new("of", vec![Type::array(Type::TypeVar(of_e))], list_of_of_e)
                        .with_type_params(vec![of_e])
                        .with_modifiers(PUBLIC_STATIC)
                        .varargs(),
                ),
        );

        let array_list_e = self.type_param("E");
        let e = Type::TypeVar(array_list_e);
        let list_of = self.generic("java.util.List", vec![e.clone()]);
        self.define(
            ClassDef::new("java.util.ArrayList", ClassKind::Class)
                .with_type_params(vec![array_list_e])
                .with_super(object.clone())
                .with_interface(list_of)
                .with_method(MethodDef::constructor(vec![]))
                .with_method(MethodDef::constructor(vec![Type::int()]))
                .with_method(MethodDef::new("get", vec![Type::int()], e.clone()))
                .with_method(MethodDef::new("add", vec![e.clone()], Type::boolean()))
                .with_method(MethodDef::new("size", vec![], Type::int())),
        );

        let set_e = self.type_param("E");
        let collection_of = self.generic("java.util.Collection", vec![Type::TypeVar(set_e)]);
        self.define(
            ClassDef::new("java.util.Set", ClassKind::Interface)
                .with_type_params(vec![set_e])
                .with_interface(collection_of),
        );
        let hash_set_e = self.type_param("E");
        let set_of = self.generic("java.util.Set", vec![Type::TypeVar(hash_set_e)]);
        self.define(
            ClassDef::new("java.util.HashSet", ClassKind::Class)
                .with_type_params(vec![hash_set_e])
                .with_super(object.clone())
                .with_interface(set_of)
                .with_method(MethodDef::constructor(vec![])),
        );

        let map_k = self.type_param("K");
        let map_v = self.type_param("V");
        let (k, v) = (Type::TypeVar(map_k), Type::TypeVar(map_v));
        self.define(
            ClassDef::new("java.util.Map", ClassKind::Interface)
                .with_type_params(vec![map_k, map_v])
                .with_method(MethodDef::new("get", vec![object.clone()], v.clone()))
                .with_method(MethodDef::new("put", vec![k.clone(), v.clone()], v.clone()))
                .with_method(MethodDef::new("containsKey", vec![object.clone()], Type::boolean()))
                .with_method(MethodDef::new("size", vec![], Type::int()))
                .with_method(MethodDef::new("isEmpty", vec![], Type::boolean()))
                .with_method(MethodDef::new("equals", vec![object.clone()], Type::boolean()))
                .with_method(MethodDef::new("hashCode", vec![], Type::int())),
        );

        for name in ["java.util.HashMap", "java.util.IdentityHashMap"] {
            let class_k = self.type_param("K");
            let class_v = self.type_param("V");
            let (k, v) = (Type::TypeVar(class_k), Type::TypeVar(class_v));
            let map_of = self.generic("java.util.Map", vec![k.clone(), v.clone()]);
            let mut def = ClassDef::new(name, ClassKind::Class)
                .with_type_params(vec![class_k, class_v])
                .with_super(object.clone())
                .with_interface(map_of)
                .with_method(MethodDef::constructor(vec![]))
                .with_method(MethodDef::new("get", vec![object.clone()], v.clone()))
                .with_method(MethodDef::new("put", vec![k, v.clone()], v));
            if name == "java.util.IdentityHashMap" {
                def = def
                    .with_method(MethodDef::new("equals", vec![object.clone()], Type::boolean()))
                    .with_method(MethodDef::new("hashCode", vec![], Type::int()));
            }
            self.define(def);
        }

        let optional_t = self.type_param("T");
        let t = Type::TypeVar(optional_t);
        let of_t = self.type_param("T");
        let optional_of_t = self.generic("java.util.Optional", vec![Type::TypeVar(of_t)]);
        self.define(
            ClassDef::new("java.util.Optional", ClassKind::Class)
                .with_modifiers(PUBLIC_FINAL)
                .with_type_params(vec![optional_t])
                .with_super(object.clone())
                .with_method(
                    MethodDef::new("of", vec![Type::TypeVar(of_t)], optional_of_t.clone())
                        .with_type_params(vec![of_t])
                        .with_modifiers(PUBLIC_STATIC),
                )
                .with_method(
                    MethodDef::new("ofNullable", vec![Type::TypeVar(of_t)], optional_of_t.clone())
                        .with_type_params(vec![of_t])
                        .with_modifiers(PUBLIC_STATIC),
                )
                .with_method(
                    MethodDef::new("empty", vec![], optional_of_t)
                        .with_type_params(vec![of_t])
                        .with_modifiers(PUBLIC_STATIC),
                )
                .with_method(MethodDef::new("isPresent", vec![], Type::boolean()))
                .with_method(MethodDef::new("get", vec![], t.clone()))
                .with_method(MethodDef::new("orElse", vec![t.clone()], t)),
        );

        let mut arrays = ClassDef::new("java.util.Arrays", ClassKind::Class)
            .with_modifiers(PUBLIC_FINAL)
            .with_super(object.clone());
        let element_types = [
            Type::int(),
            Type::Primitive(PrimitiveType::Long),
            Type::Primitive(PrimitiveType::Char),
            Type::Primitive(PrimitiveType::Double),
            Type::boolean(),
            object.clone(),
        ];
        for elem in element_types {
            let array = Type::array(elem);
            arrays.methods.push(
                MethodDef::new("toString", vec![array.clone()], string.clone())
                    .with_modifiers(PUBLIC_STATIC),
            );
            arrays.methods.push(
                MethodDef::new("hashCode", vec![array.clone()], Type::int())
                    .with_modifiers(PUBLIC_STATIC),
            );
            arrays.methods.push(
                MethodDef::new("equals", vec![array.clone(), array], Type::boolean())
                    .with_modifiers(PUBLIC_STATIC),
            );
        }
        arrays.methods.push(
            MethodDef::new("deepToString", vec![Type::array(object.clone())], string.clone())
                .with_modifiers(PUBLIC_STATIC),
        );
        let as_list_t = self.type_param("T");
        let list_of_t = self.generic("java.util.List", vec![Type::TypeVar(as_list_t)]);
        arrays.methods.push(
            MethodDef::new("asList", vec![Type::array(Type::TypeVar(as_list_t))], list_of_t)
                .with_type_params(vec![as_list_t])
                .with_modifiers(PUBLIC_STATIC)
                .varargs(),
        );
        self.define(arrays);

        let require_t = self.type_param("T");
        self.define(
            ClassDef::new("java.util.Objects", ClassKind::Class)
                .with_modifiers(PUBLIC_FINAL)
                .with_super(object.clone())
                .with_method(
                    MethodDef::new("equals", vec![object.clone(), object.clone()], Type::boolean())
                        .with_modifiers(PUBLIC_STATIC),
                )
                .with_method(
                    MethodDef::new("hashCode", vec![object.clone()], Type::int())
                        .with_modifiers(PUBLIC_STATIC),
                )
                .with_method(
                    MethodDef::new("toString", vec![object], string)
                        .with_modifiers(PUBLIC_STATIC),
                )
                .with_method(
                    MethodDef::new(
                        "requireNonNull",
                        vec![Type::TypeVar(require_t)],
                        Type::TypeVar(require_t),
                    )
                    .with_type_params(vec![require_t])
                    .with_modifiers(PUBLIC_STATIC),
                ),
        );
    }

    fn functions(&mut self) {
        let function_t = self.type_param("T");
        let function_r = self.type_param("R");
        self.define(
            ClassDef::new("java.util.function.Function", ClassKind::Interface)
                .with_type_params(vec![function_t, function_r])
                .with_method(
                    MethodDef::new(
                        "apply",
                        vec![Type::TypeVar(function_t)],
                        Type::TypeVar(function_r),
                    )
                    .with_modifiers(PUBLIC_ABSTRACT),
                ),
        );
        let supplier_t = self.type_param("T");
        self.define(
            ClassDef::new("java.util.function.Supplier", ClassKind::Interface)
                .with_type_params(vec![supplier_t])
                .with_method(
                    MethodDef::new("get", vec![], Type::TypeVar(supplier_t))
                        .with_modifiers(PUBLIC_ABSTRACT),
                ),
        );
        let predicate_t = self.type_param("T");
        self.define(
            ClassDef::new("java.util.function.Predicate", ClassKind::Interface)
                .with_type_params(vec![predicate_t])
                .with_method(
                    MethodDef::new("test", vec![Type::TypeVar(predicate_t)], Type::boolean())
                        .with_modifiers(PUBLIC_ABSTRACT),
                ),
        );
    }
}

impl TypeStore {
    /// A store preloaded with a minimal JDK model.
    pub fn with_minimal_jdk() -> Self {
        let mut store = TypeStore::default();
        let mut jdk = MinimalJdk { store: &mut store };
        jdk.lang();
        jdk.annotations();
        jdk.collections();
        jdk.functions();
        store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{is_subtype, TypeEnv};

    #[test]
    fn minimal_jdk_interfaces_are_subtypes_of_object() {
        let env = TypeStore::with_minimal_jdk();
        let object = env.object_type();
        let list = env.class_id("java.util.List").unwrap();
        let list_string = Type::class(list, vec![env.string_type()]);
        assert!(is_subtype(&env, &list_string, &object));

        let cloneable = Type::class(env.well_known().cloneable, vec![]);
        assert!(is_subtype(&env, &cloneable, &object));
    }

    #[test]
    fn boxes_are_numbers_and_comparable() {
        let env = TypeStore::with_minimal_jdk();
        let integer = Type::class(env.class_id("java.lang.Integer").unwrap(), vec![]);
        let number = Type::class(env.class_id("java.lang.Number").unwrap(), vec![]);
        let comparable_integer = Type::class(
            env.class_id("java.lang.Comparable").unwrap(),
            vec![integer.clone()],
        );
        assert!(is_subtype(&env, &integer, &number));
        assert!(is_subtype(&env, &integer, &comparable_integer));
        let max = env
            .class(env.class_id("java.lang.Integer").unwrap())
            .and_then(|def| def.fields.iter().find(|f| f.name == "MAX_VALUE"))
            .and_then(|f| f.constant.clone());
        assert_eq!(max, Some(Constant::Int(i32::MAX)));
    }
}
