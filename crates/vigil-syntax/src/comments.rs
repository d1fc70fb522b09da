use vigil_core::{TextRange, TextSize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CommentKind {
    /// `// ...` up to (not including) the line terminator.
    Line,
    /// `/* ... */`
    Block,
    /// `/** ... */`
    Doc,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Comment {
    pub range: TextRange,
    pub kind: CommentKind,
}

/// The unit's comments, sorted by start offset.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Comments {
    items: Vec<Comment>,
}

impl Comments {
    pub fn new(mut items: Vec<Comment>) -> Self {
        items.sort_by_key(|c| (c.range.start(), c.range.end()));
        Self { items }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Comment> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Comments lying entirely inside `range`.
    pub fn within(&self, range: TextRange) -> impl Iterator<Item = &Comment> {
        let first = self.items.partition_point(|c| c.range.start() < range.start());
        self.items[first..]
            .iter()
            .take_while(move |c| c.range.start() < range.end())
            .filter(move |c| range.contains_range(c.range))
    }

    /// The first comment starting at or after `offset`.
    pub fn next_after(&self, offset: TextSize) -> Option<&Comment> {
        let idx = self.items.partition_point(|c| c.range.start() < offset);
        self.items.get(idx)
    }

    /// The last comment ending at or before `offset`.
    pub fn prev_before(&self, offset: TextSize) -> Option<&Comment> {
        self.items.iter().rev().find(|c| c.range.end() <= offset)
    }
}
