use std::collections::HashMap;
use std::sync::Mutex;

use vigil_syntax::{CompilationUnit, NodeId, NodeRef};
use vigil_types::{parse_type, ClassId, Type, TypeEnv};

/// Memoized name lookups for one compilation.
///
/// Owned by a [`CompilationContext`] and dropped with it, so types from one
/// compilation's store never leak into another.
#[derive(Debug, Default)]
pub struct LookupCache {
    types: Mutex<HashMap<String, Option<Type>>>,
}

impl LookupCache {
    fn type_from_string(&self, env: &dyn TypeEnv, name: &str) -> Option<Type> {
        let mut types = self.types.lock().unwrap_or_else(|err| err.into_inner());
        if let Some(cached) = types.get(name) {
            return cached.clone();
        }
        let resolved = parse_type(env, name);
        tracing::trace!(
            target: "vigil.query",
            name,
            found = resolved.is_some(),
            "type lookup"
        );
        types.insert(name.to_string(), resolved.clone());
        resolved
    }

    /// Number of distinct names looked up so far, hits and misses alike.
    pub fn len(&self) -> usize {
        self.types
            .lock()
            .unwrap_or_else(|err| err.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Compilation-wide state shared by every unit of one compilation.
pub struct CompilationContext<'env> {
    env: &'env dyn TypeEnv,
    cache: LookupCache,
}

impl std::fmt::Debug for CompilationContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompilationContext")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl<'env> CompilationContext<'env> {
    pub fn new(env: &'env dyn TypeEnv) -> Self {
        Self {
            env,
            cache: LookupCache::default(),
        }
    }

    pub fn env(&self) -> &'env dyn TypeEnv {
        self.env
    }

    pub fn cache(&self) -> &LookupCache {
        &self.cache
    }

    /// Resolves a Java type spelling such as `java.util.List<String>` or
    /// `int[]`, memoized for the lifetime of this context.
    pub fn type_from_string(&self, name: &str) -> Option<Type> {
        self.cache.type_from_string(self.env, name)
    }

    pub fn class_by_name(&self, name: &str) -> Option<ClassId> {
        self.type_from_string(name)?.class_id()
    }

    /// A view of this compilation positioned in `unit`.
    pub fn context<'a>(&'a self, unit: &'a CompilationUnit) -> Context<'a> {
        Context {
            compilation: self,
            unit,
        }
    }
}

/// What queries and matchers see: the compilation plus the unit being
/// scanned.
#[derive(Clone, Copy, Debug)]
pub struct Context<'a> {
    compilation: &'a CompilationContext<'a>,
    unit: &'a CompilationUnit,
}

impl<'a> Context<'a> {
    pub fn env(&self) -> &'a dyn TypeEnv {
        self.compilation.env
    }

    pub fn compilation(&self) -> &'a CompilationContext<'a> {
        self.compilation
    }

    pub fn unit(&self) -> &'a CompilationUnit {
        self.unit
    }

    pub fn root(&self) -> NodeRef<'a> {
        self.unit.root()
    }

    pub fn node(&self, id: NodeId) -> Option<NodeRef<'a>> {
        self.unit.node(id)
    }

    pub fn source(&self) -> &'a str {
        self.unit.text()
    }

    pub fn type_from_string(&self, name: &str) -> Option<Type> {
        self.compilation.type_from_string(name)
    }

    pub fn class_by_name(&self, name: &str) -> Option<ClassId> {
        self.compilation.class_by_name(name)
    }

    /// The nodes from the root down to and including `node`.
    pub fn path(&self, node: NodeRef<'a>) -> Vec<NodeRef<'a>> {
        let mut path: Vec<_> = node.ancestors().collect();
        path.reverse();
        path.push(node);
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_syntax::NodeKind;
    use vigil_types::TypeStore;

    #[test]
    fn lookups_are_memoized_per_context() {
        let store = TypeStore::with_minimal_jdk();
        let first = CompilationContext::new(&store);
        assert!(first.type_from_string("java.util.List<String>").is_some());
        assert!(first.type_from_string("java.util.List<String>").is_some());
        assert!(first.type_from_string("com.example.Missing").is_none());
        assert_eq!(first.cache().len(), 2);

        let second = CompilationContext::new(&store);
        assert!(second.cache().is_empty());
    }

    #[test]
    fn path_runs_from_root_to_node() {
        let fixture = vigil_test_utils::compile("class Test { int x = 1; }");
        let comp = CompilationContext::new(fixture.store());
        let ctx = comp.context(fixture.unit());
        let literal = fixture.find(NodeKind::Literal, "1");
        let kinds: Vec<_> = ctx.path(literal).into_iter().map(|n| n.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                NodeKind::CompilationUnit,
                NodeKind::Class,
                NodeKind::Variable,
                NodeKind::Literal
            ]
        );
    }
}
