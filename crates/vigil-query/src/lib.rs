//! Semantic queries over an attributed compilation unit.
//!
//! Everything here is read-only and tolerant of missing information: a node
//! without a symbol or a type simply answers `None` (or `false`), it never
//! panics. Checkers and matchers reach the type system through a
//! [`Context`], which pairs the unit being scanned with the compilation-wide
//! [`CompilationContext`] and its memoized name lookups.

mod annotations;
mod constants;
mod context;
mod supers;
mod symbols;
mod target;
mod tree;
pub mod types;

pub use annotations::{annotation_strings, annotations_among, declared_annotations, has_annotation};
pub use constants::{boolean_value, const_value};
pub use context::{CompilationContext, Context, LookupCache};
pub use supers::{
    find_super_method, find_super_method_in, find_super_methods, overrides_anything,
    stream_super_methods,
};
pub use symbols::{
    declared_class_type, enum_values, formal_parameter_index, get_symbol, get_type,
    is_effectively_private, is_generated_constructor, is_static, owner_class, receiver_type,
    result_type, same_variable, symbol_modifiers, symbol_name, symbol_type,
};
pub use target::{target_type, TargetType};
pub use tree::{
    binary_operands, enclosing_class, enclosing_method, enclosing_node, get_receiver, is_this,
    match_binary_tree, method_name, strip_parentheses,
};
