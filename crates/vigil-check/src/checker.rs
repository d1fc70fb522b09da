use std::cell::RefCell;
use std::fmt;

use vigil_query::Context;
use vigil_syntax::{NodeKind, NodeRef};

use crate::{BugPatternInfo, Description, DescriptionBuilder};

/// One bug pattern.
///
/// The scanner calls [`check`](Self::check) for every node whose kind is
/// listed in [`node_kinds`](Self::node_kinds). Returning `None` means no
/// finding. Checkers are shared across threads and units; they must keep
/// no per-unit state.
pub trait BugChecker: Send + Sync {
    fn info(&self) -> &BugPatternInfo;

    fn node_kinds(&self) -> &[NodeKind];

    fn check(&self, node: NodeRef<'_>, state: &VisitorState<'_>) -> Option<Description>;

    fn name(&self) -> &str {
        &self.info().name
    }

    /// A description builder for a finding of this pattern at `node`.
    fn describe(&self, node: NodeRef<'_>) -> DescriptionBuilder {
        Description::builder(node, self.info())
    }
}

/// What a checker sees while a unit is scanned.
pub struct VisitorState<'a> {
    ctx: Context<'a>,
    extra: RefCell<Vec<Description>>,
}

impl<'a> VisitorState<'a> {
    pub fn new(ctx: Context<'a>) -> Self {
        Self {
            ctx,
            extra: RefCell::new(Vec::new()),
        }
    }

    pub fn ctx(&self) -> &Context<'a> {
        &self.ctx
    }

    pub fn source(&self) -> &'a str {
        self.ctx.source()
    }

    /// Reports a finding besides the one `check` returns, e.g. when one node
    /// yields several.
    pub fn report(&self, description: Description) {
        self.extra.borrow_mut().push(description);
    }

    pub(crate) fn take_reports(&self) -> Vec<Description> {
        std::mem::take(&mut *self.extra.borrow_mut())
    }
}

impl fmt::Debug for VisitorState<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VisitorState")
            .field("unit", &self.ctx.unit().path())
            .finish()
    }
}

type CheckFn =
    dyn Fn(&FnChecker, NodeRef<'_>, &VisitorState<'_>) -> Option<Description> + Send + Sync;

/// A checker backed by a closure.
///
/// ```
/// use vigil_check::{checker, BugChecker, BugPatternInfo, Severity};
/// use vigil_syntax::{NodeKind, NodeData};
///
/// let null_return = checker(
///     BugPatternInfo::new("NullReturn", "Returns null", Severity::Suggestion),
///     [NodeKind::Return],
///     |this, node, _state| match node.data() {
///         NodeData::Return { expr: Some(expr) } if node.at(*expr).text() == "null" => {
///             Some(this.describe(node).build())
///         }
///         _ => None,
///     },
/// );
/// assert_eq!(null_return.name(), "NullReturn");
/// ```
pub struct FnChecker {
    info: BugPatternInfo,
    kinds: Vec<NodeKind>,
    check: Box<CheckFn>,
}

impl fmt::Debug for FnChecker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnChecker")
            .field("name", &self.info.name)
            .field("kinds", &self.kinds)
            .finish()
    }
}

impl BugChecker for FnChecker {
    fn info(&self) -> &BugPatternInfo {
        &self.info
    }

    fn node_kinds(&self) -> &[NodeKind] {
        &self.kinds
    }

    fn check(&self, node: NodeRef<'_>, state: &VisitorState<'_>) -> Option<Description> {
        (self.check)(self, node, state)
    }
}

pub fn checker<F>(
    info: BugPatternInfo,
    kinds: impl IntoIterator<Item = NodeKind>,
    check: F,
) -> FnChecker
where
    F: Fn(&FnChecker, NodeRef<'_>, &VisitorState<'_>) -> Option<Description>
        + Send
        + Sync
        + 'static,
{
    FnChecker {
        info,
        kinds: kinds.into_iter().collect(),
        check: Box::new(check),
    }
}
