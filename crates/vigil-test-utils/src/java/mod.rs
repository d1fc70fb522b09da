//! A small Java front end for test fixtures.
//!
//! vigil itself never parses Java; a host compiler hands it attributed
//! [`CompilationUnit`]s. Tests need such units without a JDK, so this module
//! lexes, parses and attributes the subset of Java that rule fixtures use:
//! classes, interfaces, enums and annotations, generics, the usual statements,
//! lambdas and method references. Types resolve against a [`TypeStore`]
//! preloaded with [`TypeStore::with_minimal_jdk`].

mod attr;
mod lexer;
mod parser;

use thiserror::Error;
use vigil_syntax::{CompilationUnit, NodeKind, NodeRef};
use vigil_types::TypeStore;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FixtureError {
    #[error("syntax error at byte {offset}: {message}")]
    Syntax { offset: usize, message: String },
    #[error("{path}: {source}")]
    InFile {
        path: String,
        #[source]
        source: Box<FixtureError>,
    },
}

/// Attributed compilation units sharing one type store.
#[derive(Debug)]
pub struct JavaFixture {
    store: TypeStore,
    units: Vec<CompilationUnit>,
}

impl JavaFixture {
    /// Compiles a single `Test.java`.
    pub fn compile(text: &str) -> Result<Self, FixtureError> {
        Self::compile_files(&[("Test.java", text)])
    }

    /// Compiles several files against one store, so they can refer to each
    /// other's classes.
    pub fn compile_files(files: &[(&str, &str)]) -> Result<Self, FixtureError> {
        Self::compile_with(TypeStore::with_minimal_jdk(), files)
    }

    pub fn compile_with(
        mut store: TypeStore,
        files: &[(&str, &str)],
    ) -> Result<Self, FixtureError> {
        let mut sources = Vec::with_capacity(files.len());
        for (path, text) in files {
            let parsed = parser::parse(text).map_err(|source| FixtureError::InFile {
                path: path.to_string(),
                source: Box::new(source),
            })?;
            sources.push(attr::SourceFile {
                path: path.to_string(),
                text: text.to_string(),
                parsed,
            });
        }
        let units = attr::attribute(&mut store, sources);
        tracing::debug!(
            target: "vigil.test_utils",
            files = units.len(),
            classes = store.class_count(),
            "compiled java fixture"
        );
        Ok(Self { store, units })
    }

    pub fn store(&self) -> &TypeStore {
        &self.store
    }

    /// The first unit.
    pub fn unit(&self) -> &CompilationUnit {
        &self.units[0]
    }

    pub fn units(&self) -> &[CompilationUnit] {
        &self.units
    }

    pub fn unit_at(&self, path: &str) -> Option<&CompilationUnit> {
        self.units.iter().find(|u| u.path() == path)
    }

    pub fn into_parts(self) -> (TypeStore, Vec<CompilationUnit>) {
        (self.store, self.units)
    }

    /// The first node of `kind` in the first unit whose source text is exactly
    /// `text`.
    ///
    /// # Panics
    ///
    /// When there is no such node.
    pub fn find(&self, kind: NodeKind, text: &str) -> NodeRef<'_> {
        self.find_nth(kind, text, 0)
    }

    pub fn find_nth(&self, kind: NodeKind, text: &str, n: usize) -> NodeRef<'_> {
        self.unit()
            .root()
            .descendants()
            .filter(|node| node.kind() == kind && node.text() == text && !node.is_generated())
            .nth(n)
            .unwrap_or_else(|| panic!("no {kind:?} node #{n} with text {text:?}"))
    }

    /// The first node of `kind` whose text starts with `prefix`.
    pub fn find_starting(&self, kind: NodeKind, prefix: &str) -> NodeRef<'_> {
        self.unit()
            .root()
            .descendants()
            .find(|node| node.kind() == kind && node.text().starts_with(prefix))
            .unwrap_or_else(|| panic!("no {kind:?} node starting with {prefix:?}"))
    }
}

/// Compiles `text` as `Test.java`, panicking on syntax errors.
pub fn compile(text: &str) -> JavaFixture {
    JavaFixture::compile(text).unwrap_or_else(|err| panic!("fixture does not parse: {err}"))
}

/// Compiles a `//- /path` multi-file fixture, panicking on syntax errors.
pub fn compile_multi(fixture: &str) -> JavaFixture {
    let files = crate::parse_files(fixture);
    let borrowed: Vec<(&str, &str)> = files
        .iter()
        .map(|(path, text)| (path.as_str(), text.as_str()))
        .collect();
    JavaFixture::compile_files(&borrowed)
        .unwrap_or_else(|err| panic!("fixture does not parse: {err}"))
}
