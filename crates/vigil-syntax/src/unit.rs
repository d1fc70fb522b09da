use std::fmt;

use vigil_core::{LineCol, LineIndex, TextRange};
use vigil_types::Type;

use crate::comments::Comments;
use crate::semantics::{Semantics, Symbol};
use crate::tree::{NodeData, SyntaxTree};
use crate::{Name, NodeId, NodeKind};

/// One `import` declaration as written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportDecl {
    /// Dotted path; wildcard imports omit the trailing `.*`.
    pub path: Name,
    pub is_static: bool,
    pub is_wildcard: bool,
    /// Span of the whole declaration, `import` through `;`.
    pub range: TextRange,
    pub node: NodeId,
}

impl ImportDecl {
    /// The last path segment, which is what unqualified code refers to.
    pub fn simple_name(&self) -> &str {
        self.path.rsplit('.').next().unwrap_or(&self.path)
    }

    /// Does this import make `fqn` nameable by its simple name?
    pub fn covers(&self, fqn: &str) -> bool {
        if self.is_wildcard {
            fqn.rsplit_once('.')
                .is_some_and(|(pkg, _)| pkg == self.path.as_str())
        } else {
            self.path == fqn
        }
    }
}

/// A parsed, attributed source file.
#[derive(Clone, Debug)]
pub struct CompilationUnit {
    path: String,
    text: String,
    tree: SyntaxTree,
    semantics: Semantics,
    comments: Comments,
    line_index: LineIndex,
    package: Option<Name>,
    imports: Vec<ImportDecl>,
}

impl CompilationUnit {
    pub fn new(
        path: impl Into<String>,
        text: impl Into<String>,
        tree: SyntaxTree,
        semantics: Semantics,
        comments: Comments,
    ) -> Self {
        let text = text.into();
        let line_index = LineIndex::new(&text);
        let mut package = None;
        let mut imports = Vec::new();
        if let Some(NodeData::CompilationUnit {
            package: pkg,
            imports: import_ids,
            ..
        }) = tree.data(tree.root())
        {
            package = pkg.and_then(|id| match tree.data(id) {
                Some(NodeData::Package { name }) => Some(name.clone()),
                _ => None,
            });
            for &id in import_ids {
                if let Some(node) = tree.get(id) {
                    if let NodeData::Import {
                        path,
                        is_static,
                        is_wildcard,
                    } = &node.data
                    {
                        imports.push(ImportDecl {
                            path: path.clone(),
                            is_static: *is_static,
                            is_wildcard: *is_wildcard,
                            range: node.range,
                            node: id,
                        });
                    }
                }
            }
        }
        Self {
            path: path.into(),
            text,
            tree,
            semantics,
            comments,
            line_index,
            package,
            imports,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn tree(&self) -> &SyntaxTree {
        &self.tree
    }

    pub fn semantics(&self) -> &Semantics {
        &self.semantics
    }

    pub fn comments(&self) -> &Comments {
        &self.comments
    }

    pub fn line_index(&self) -> &LineIndex {
        &self.line_index
    }

    pub fn package(&self) -> Option<&str> {
        self.package.as_deref()
    }

    pub fn imports(&self) -> &[ImportDecl] {
        &self.imports
    }

    pub fn root(&self) -> NodeRef<'_> {
        NodeRef {
            unit: self,
            id: self.tree.root(),
        }
    }

    pub fn node(&self, id: NodeId) -> Option<NodeRef<'_>> {
        self.tree.get(id)?;
        Some(NodeRef { unit: self, id })
    }

    /// Source text covered by `range`, empty if it is out of bounds.
    pub fn slice(&self, range: TextRange) -> &str {
        self.text.get(std::ops::Range::<usize>::from(range)).unwrap_or("")
    }

    pub fn line_col(&self, id: NodeId) -> Option<LineCol> {
        let range = self.tree.range(id)?;
        Some(self.line_index.line_col(range.start()))
    }
}

/// A node together with the unit it belongs to.
#[derive(Clone, Copy)]
pub struct NodeRef<'u> {
    unit: &'u CompilationUnit,
    id: NodeId,
}

impl<'u> NodeRef<'u> {
    pub fn id(self) -> NodeId {
        self.id
    }

    pub fn unit(self) -> &'u CompilationUnit {
        self.unit
    }

    pub fn data(self) -> &'u NodeData {
        static ERRONEOUS: NodeData = NodeData::Erroneous;
        // Constructed only for ids present in the tree.
        self.unit.tree.data(self.id).unwrap_or(&ERRONEOUS)
    }

    pub fn kind(self) -> NodeKind {
        self.data().kind()
    }

    pub fn range(self) -> TextRange {
        self.unit
            .tree
            .range(self.id)
            .unwrap_or_else(|| TextRange::empty(0.into()))
    }

    pub fn text(self) -> &'u str {
        self.unit.slice(self.range())
    }

    pub fn is_generated(self) -> bool {
        self.unit
            .tree
            .get(self.id)
            .is_some_and(|node| node.generated)
    }

    fn wrap(self, id: NodeId) -> NodeRef<'u> {
        NodeRef {
            unit: self.unit,
            id,
        }
    }

    pub fn parent(self) -> Option<NodeRef<'u>> {
        self.unit.tree.parent(self.id).map(|id| self.wrap(id))
    }

    pub fn children(self) -> impl Iterator<Item = NodeRef<'u>> {
        self.data()
            .children()
            .into_iter()
            .map(move |id| self.wrap(id))
    }

    /// Parents of this node, nearest first; does not include the node itself.
    pub fn ancestors(self) -> impl Iterator<Item = NodeRef<'u>> {
        std::iter::successors(self.parent(), |node| node.parent())
    }

    /// This node and everything below it, in pre-order.
    pub fn descendants(self) -> impl Iterator<Item = NodeRef<'u>> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            let children: Vec<_> = node.children().collect();
            stack.extend(children.into_iter().rev());
            Some(node)
        })
    }

    /// The host-attributed static type, if any.
    pub fn ty(self) -> Option<&'u Type> {
        self.unit.semantics.type_of(self.id)
    }

    pub fn symbol(self) -> Option<Symbol> {
        self.unit.semantics.symbol(self.id)
    }

    pub fn name(self) -> Option<&'u Name> {
        self.data().name()
    }

    /// Another node of the same unit.
    pub fn at(self, id: NodeId) -> NodeRef<'u> {
        self.wrap(id)
    }
}

impl PartialEq for NodeRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && std::ptr::eq(self.unit, other.unit)
    }
}

impl Eq for NodeRef<'_> {}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}@{:?} {:?}", self.kind(), self.range(), self.text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use crate::{Comment, CommentKind, TreeBuilder};

    fn range(start: u32, end: u32) -> TextRange {
        TextRange::new(start.into(), end.into())
    }

    #[test]
    fn imports_and_navigation() {
        let text = "package p;\nimport java.util.List;\nimport static java.lang.Math.*;\n// c\n";
        let mut b = TreeBuilder::default();
        let pkg = b.alloc(range(0, 10), NodeData::Package { name: "p".into() });
        let list = b.alloc(
            range(11, 33),
            NodeData::Import {
                path: "java.util.List".into(),
                is_static: false,
                is_wildcard: false,
            },
        );
        let math = b.alloc(
            range(34, 65),
            NodeData::Import {
                path: "java.lang.Math".into(),
                is_static: true,
                is_wildcard: true,
            },
        );
        let root = b.alloc(
            range(0, text.len() as u32),
            NodeData::CompilationUnit {
                package: Some(pkg),
                imports: vec![list, math],
                types: vec![],
            },
        );
        let tree = b.finish(root);
        let comments = Comments::new(vec![Comment {
            range: range(66, 70),
            kind: CommentKind::Line,
        }]);
        let unit = CompilationUnit::new("P.java", text, tree, Semantics::default(), comments);

        assert_eq!(unit.package(), Some("p"));
        assert_eq!(unit.imports().len(), 2);
        assert_eq!(unit.imports()[0].simple_name(), "List");
        assert!(unit.imports()[0].covers("java.util.List"));
        assert!(unit.imports()[1].covers("java.lang.Math.max"));
        assert_eq!(unit.node(list).unwrap().text(), "import java.util.List;");
        assert_eq!(unit.line_col(list), Some(LineCol { line: 1, col: 0 }));

        let kinds: Vec<_> = unit.root().descendants().map(|n| n.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                NodeKind::CompilationUnit,
                NodeKind::Package,
                NodeKind::Import,
                NodeKind::Import
            ]
        );
        let parent = unit.node(math).unwrap().parent().unwrap();
        assert_eq!(parent.kind(), NodeKind::CompilationUnit);
        assert_eq!(unit.node(math).unwrap().ancestors().count(), 1);
    }
}
