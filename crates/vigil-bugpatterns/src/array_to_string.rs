use vigil_check::{BugChecker, BugPatternInfo, Description, Severity, VisitorState};
use vigil_fix::SuggestedFix;
use vigil_matchers::{
    instance_method, is_array_type, receiver_of_invocation, Matcher, MethodMatcher,
    ReceiverOfInvocation, TypeShapeIs,
};
use vigil_query::{get_receiver, get_type};
use vigil_syntax::{NodeKind, NodeRef};

/// `array.toString()` prints the array's identity, not its contents.
pub struct ArrayToString {
    info: BugPatternInfo,
    to_string: MethodMatcher,
    on_array: ReceiverOfInvocation<TypeShapeIs>,
}

impl ArrayToString {
    pub fn new() -> Self {
        Self {
            info: BugPatternInfo::new(
                "ArrayToString",
                "Calling toString on an array does not provide useful information",
                Severity::Error,
            ),
            to_string: instance_method().named("toString").with_no_parameters(),
            on_array: receiver_of_invocation(is_array_type()),
        }
    }
}

impl Default for ArrayToString {
    fn default() -> Self {
        Self::new()
    }
}

impl BugChecker for ArrayToString {
    fn info(&self) -> &BugPatternInfo {
        &self.info
    }

    fn node_kinds(&self) -> &[NodeKind] {
        &[NodeKind::MethodInvocation]
    }

    fn check(&self, node: NodeRef<'_>, state: &VisitorState<'_>) -> Option<Description> {
        let ctx = state.ctx();
        if !self.to_string.matches(node, ctx) || !self.on_array.matches(node, ctx) {
            return None;
        }
        let receiver = get_receiver(node)?;
        let nested = get_type(receiver)
            .and_then(|ty| ty.array_element())
            .is_some_and(|element| element.is_array());
        let method = if nested { "deepToString" } else { "toString" };

        let mut fix = SuggestedFix::builder();
        let arrays = fix.qualify_type(ctx.unit(), "java.util.Arrays");
        fix.replace(node, format!("{arrays}.{method}({})", receiver.text()));
        let fix = fix.build().ok()?;
        Some(self.describe(node).add_fix(fix).build())
    }
}
