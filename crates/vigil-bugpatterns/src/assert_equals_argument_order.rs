use regex::Regex;
use vigil_check::{BugChecker, BugPatternInfo, Description, Severity, VisitorState};
use vigil_fix::SuggestedFix;
use vigil_matchers::{
    has_argument, is_subtype_of, static_method, HasArgument, Matcher, MethodMatcher, TypeIs,
};
use vigil_query::types::is_same_type;
use vigil_query::{const_value, get_type, strip_parentheses, Context};
use vigil_syntax::{NodeData, NodeKind, NodeRef};
use vigil_types::{ClassKind, Type};

const ASSERT_CLASSES: [&str; 3] = [
    "org.junit.Assert",
    "junit.framework.TestCase",
    "junit.framework.Assert",
];

/// `assertEquals(actual, expected)`: the expected value goes first.
///
/// An argument looks like an expected value when it is a constant, an enum
/// constant, or named `expected...`; one named `actual...` looks like the
/// value under test. The arguments are swapped when that costs less than
/// keeping them.
pub struct AssertEqualsArgumentOrder {
    info: BugPatternInfo,
    assert_method: MethodMatcher,
    throwable_argument: HasArgument<TypeIs>,
}

impl AssertEqualsArgumentOrder {
    pub fn new() -> Self {
        Self {
            info: BugPatternInfo::new(
                "AssertEqualsArgumentOrder",
                "Arguments are swapped in assertEquals-like call",
                Severity::Warning,
            ),
            assert_method: static_method()
                .on_class_any(&ASSERT_CLASSES)
                .with_name_matching(Regex::new("^assert").expect("valid regex")),
            // People like to call the exception they expect `expected`.
            throwable_argument: has_argument(is_subtype_of("java.lang.Throwable")),
        }
    }

    /// Indices of the `(expected, actual)` arguments, if the callee has an
    /// assertEquals-like signature.
    fn slots(node: NodeRef<'_>, ctx: &Context<'_>) -> Option<(usize, usize)> {
        let method = node.symbol()?.as_method()?;
        let params = &ctx.env().method(method)?.params;
        match params.as_slice() {
            [expected, actual] if is_same_type(ctx, expected, actual) => Some((0, 1)),
            [message, expected, actual]
                if is_string(ctx, message) && is_same_type(ctx, expected, actual) =>
            {
                Some((1, 2))
            }
            _ => None,
        }
    }
}

impl Default for AssertEqualsArgumentOrder {
    fn default() -> Self {
        Self::new()
    }
}

impl BugChecker for AssertEqualsArgumentOrder {
    fn info(&self) -> &BugPatternInfo {
        &self.info
    }

    fn node_kinds(&self) -> &[NodeKind] {
        &[NodeKind::MethodInvocation]
    }

    fn check(&self, node: NodeRef<'_>, state: &VisitorState<'_>) -> Option<Description> {
        let ctx = state.ctx();
        if !self.assert_method.matches(node, ctx) || self.throwable_argument.matches(node, ctx) {
            return None;
        }
        let (expected_slot, actual_slot) = Self::slots(node, ctx)?;
        let args = node.data().arguments();
        let expected = node.at(*args.get(expected_slot)?);
        let actual = node.at(*args.get(actual_slot)?);

        let original = expected_cost(ctx, expected) + actual_cost(ctx, actual);
        let swapped = expected_cost(ctx, actual) + actual_cost(ctx, expected);
        if swapped >= original {
            return None;
        }
        let fix = SuggestedFix::builder()
            .set_short_description("swap arguments")
            .swap(expected, actual)
            .build()
            .ok()?;
        Some(self.describe(node).add_fix(fix).build())
    }
}

fn is_string(ctx: &Context<'_>, ty: &Type) -> bool {
    ctx.type_from_string("java.lang.String")
        .is_some_and(|string| is_same_type(ctx, ty, &string))
}

fn expected_cost(ctx: &Context<'_>, arg: NodeRef<'_>) -> u32 {
    if is_constant_like(ctx, arg) {
        return 0;
    }
    if argument_name(arg).is_some_and(|n| n.starts_with("expected")) {
        0
    } else {
        1
    }
}

fn actual_cost(ctx: &Context<'_>, arg: NodeRef<'_>) -> u32 {
    if is_constant_like(ctx, arg) {
        return 1;
    }
    if argument_name(arg).is_some_and(|n| n.starts_with("actual")) {
        0
    } else {
        1
    }
}

fn is_constant_like(ctx: &Context<'_>, arg: NodeRef<'_>) -> bool {
    let arg = strip_parentheses(arg);
    if arg.kind() == NodeKind::Literal || const_value(ctx, arg).is_some() {
        return true;
    }
    get_type(arg)
        .and_then(Type::class_id)
        .and_then(|class| ctx.env().class(class))
        .is_some_and(|def| def.kind == ClassKind::Enum)
}

/// The name an argument is known by: a variable or field name, or a
/// getter's property name.
fn argument_name(arg: NodeRef<'_>) -> Option<String> {
    let arg = strip_parentheses(arg);
    match arg.data() {
        NodeData::Identifier { name } | NodeData::MemberSelect { name, .. } => {
            Some(name.to_string())
        }
        NodeData::MethodInvocation { method_select, .. } => {
            let name = arg.at(*method_select).name()?.as_str();
            let property = name.strip_prefix("get").unwrap_or(name);
            let mut chars = property.chars();
            let first = chars.next()?;
            Some(first.to_lowercase().chain(chars).collect())
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{findings, patched};
    use pretty_assertions::assert_eq;
    use vigil_test_utils::compile_multi;

    const FIXTURE: &str = r#"
//- /Test.java
import static org.junit.Assert.assertEquals;
import org.junit.Assert;
enum Color { RED }
class Test {
    void m(int actual, int expected, Object result, Color color, Exception error) {
        assertEquals(actual, 5);
        assertEquals(expected, actual);
        assertEquals(actual, expected);
        Assert.assertEquals("message", result, "x");
        assertEquals(Color.RED, color);
        assertEquals(error, result);
        assertEquals(expected, result);
    }
    int getActual() { return 0; }
    void n() {
        assertEquals(getActual(), 1);
    }
}
//- /org/junit/Assert.java
package org.junit;
public class Assert {
    public static void assertEquals(Object expected, Object actual) {}
    public static void assertEquals(long expected, long actual) {}
    public static void assertEquals(String message, Object expected, Object actual) {}
}
"#;

    #[test]
    fn flags_swapped_arguments() {
        let f = compile_multi(FIXTURE);
        let lines: Vec<u32> = findings(AssertEqualsArgumentOrder::new(), &f)
            .iter()
            .map(|d| d.line_col.line + 1)
            .collect();
        assert_eq!(lines, vec![6, 8, 9, 16]);
    }

    #[test]
    fn swaps_them_back() {
        let f = compile_multi(FIXTURE);
        let text = patched(AssertEqualsArgumentOrder::new(), &f);
        let calls: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|line| line.contains("assertEquals("))
            .collect();
        assert_eq!(
            calls,
            vec![
                "assertEquals(5, actual);",
                "assertEquals(expected, actual);",
                "assertEquals(expected, actual);",
                "Assert.assertEquals(\"message\", \"x\", result);",
                "assertEquals(Color.RED, color);",
                "assertEquals(error, result);",
                "assertEquals(expected, result);",
                "assertEquals(1, getActual());",
            ]
        );
    }
}
