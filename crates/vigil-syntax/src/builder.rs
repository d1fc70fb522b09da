use vigil_core::TextRange;

use crate::tree::{Node, NodeData, SyntaxTree};
use crate::NodeId;

/// Allocates nodes bottom-up and links parents when the tree is finished.
///
/// ```
/// use vigil_syntax::{NodeData, TreeBuilder, TextRange, TextSize};
///
/// let mut b = TreeBuilder::default();
/// let range = TextRange::new(TextSize::from(0), TextSize::from(1));
/// let x = b.alloc(range, NodeData::Identifier { name: "x".into() });
/// let stmt = b.alloc(range, NodeData::ExpressionStatement { expr: x });
/// let tree = b.finish(stmt);
/// assert_eq!(tree.parent(x), Some(stmt));
/// ```
#[derive(Debug, Default)]
pub struct TreeBuilder {
    nodes: Vec<Node>,
}

impl TreeBuilder {
    pub fn alloc(&mut self, range: TextRange, data: NodeData) -> NodeId {
        self.push(range, data, false)
    }

    /// Allocates a node the host synthesized. `range` is usually empty.
    pub fn alloc_generated(&mut self, range: TextRange, data: NodeData) -> NodeId {
        self.push(range, data, true)
    }

    fn push(&mut self, range: TextRange, data: NodeData, generated: bool) -> NodeId {
        let id = NodeId::from_raw(self.nodes.len() as u32);
        self.nodes.push(Node {
            range,
            data,
            parent: None,
            generated,
        });
        id
    }

    pub fn set_range(&mut self, id: NodeId, range: TextRange) {
        if let Some(node) = self.nodes.get_mut(id.idx()) {
            node.range = range;
        }
    }

    pub fn range(&self, id: NodeId) -> Option<TextRange> {
        self.nodes.get(id.idx()).map(|node| node.range)
    }

    pub fn data(&self, id: NodeId) -> Option<&NodeData> {
        self.nodes.get(id.idx()).map(|node| &node.data)
    }

    pub fn data_mut(&mut self, id: NodeId) -> Option<&mut NodeData> {
        self.nodes.get_mut(id.idx()).map(|node| &mut node.data)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Freezes the arena. Parent links are derived from each node's children;
    /// nodes unreachable from `root` keep `parent == None`.
    pub fn finish(mut self, root: NodeId) -> SyntaxTree {
        for idx in 0..self.nodes.len() {
            let parent = NodeId::from_raw(idx as u32);
            for child in self.nodes[idx].data.children() {
                if let Some(node) = self.nodes.get_mut(child.idx()) {
                    node.parent = Some(parent);
                }
            }
        }
        SyntaxTree {
            nodes: self.nodes,
            root,
        }
    }
}
