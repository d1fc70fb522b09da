use vigil_check::{BugChecker, BugPatternInfo, Description, Severity, VisitorState};
use vigil_fix::SuggestedFix;
use vigil_query::types::unary_promotion;
use vigil_query::{binary_operands, const_value, get_type, strip_parentheses};
use vigil_syntax::{BinaryOp, Constant, NodeData, NodeKind, NodeRef};
use vigil_types::PrimitiveType;

/// An `int` shifted by a constant outside `0..=31`; only the low five bits of
/// the amount are used.
pub struct BadShiftAmount {
    info: BugPatternInfo,
}

impl BadShiftAmount {
    pub fn new() -> Self {
        Self {
            info: BugPatternInfo::new(
                "BadShiftAmount",
                "Shift by an amount that is out of range",
                Severity::Error,
            ),
        }
    }
}

impl Default for BadShiftAmount {
    fn default() -> Self {
        Self::new()
    }
}

impl BugChecker for BadShiftAmount {
    fn info(&self) -> &BugPatternInfo {
        &self.info
    }

    fn node_kinds(&self) -> &[NodeKind] {
        &[NodeKind::Binary]
    }

    fn check(&self, node: NodeRef<'_>, state: &VisitorState<'_>) -> Option<Description> {
        let ctx = state.ctx();
        let (op, lhs, rhs) = binary_operands(node)?;
        if !matches!(op, BinaryOp::Shl | BinaryOp::Shr | BinaryOp::UShr) {
            return None;
        }
        if unary_promotion(ctx.env(), get_type(lhs)?)? != PrimitiveType::Int {
            return None;
        }
        let amount = const_value(ctx, rhs)?.as_i64()?;
        if (0..=31).contains(&amount) {
            return None;
        }

        let description = self.describe(node).set_message(format!(
            "A 32-bit value is shifted by {amount}, which is outside the range 0..31"
        ));
        if !(32..=63).contains(&amount) {
            return Some(description.build());
        }
        // Widening the shifted value to `long` keeps every bit of the amount.
        let operand = strip_parentheses(lhs);
        let mut fix = SuggestedFix::builder();
        fix.set_short_description("shift a long");
        match operand.data() {
            NodeData::Literal {
                value: Some(Constant::Int(_)),
            } => {
                fix.postfix_with(operand, "L");
            }
            NodeData::Identifier { .. }
            | NodeData::MemberSelect { .. }
            | NodeData::MethodInvocation { .. } => {
                fix.prefix_with(lhs, "(long) ");
            }
            // Already grouped: the cast binds to the parenthesized operand.
            _ if lhs.kind() == NodeKind::Parenthesized => {
                fix.prefix_with(lhs, "(long) ");
            }
            _ => {
                fix.replace(lhs, format!("(long) ({})", lhs.text()));
            }
        }
        let fix = fix.build().ok()?;
        Some(description.add_fix(fix).build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{findings, patched};
    use pretty_assertions::assert_eq;
    use vigil_test_utils::compile;

    #[test]
    fn flags_int_shifts_out_of_range() {
        let f = compile(
            r#"class Test {
    void m(int x, long y, Integer boxed, char c) {
        int a = x << 32;
        long b = y << 32;
        int d = boxed >>> 40;
        int e = c >> -1;
        int g = x << 31;
        int h = x << 2 + 30;
    }
}
"#,
        );
        let found: Vec<(u32, String)> = findings(BadShiftAmount::new(), &f)
            .iter()
            .map(|d| (d.line_col.line + 1, d.raw_message().to_string()))
            .collect();
        assert_eq!(
            found,
            vec![
                (3, "A 32-bit value is shifted by 32, which is outside the range 0..31".into()),
                (5, "A 32-bit value is shifted by 40, which is outside the range 0..31".into()),
                (6, "A 32-bit value is shifted by -1, which is outside the range 0..31".into()),
                (8, "A 32-bit value is shifted by 32, which is outside the range 0..31".into()),
            ]
        );
    }

    #[test]
    fn widens_the_shifted_value() {
        let f = compile(
            r#"class Test {
    long m(int x, int y) {
        long a = 1 << 40;
        long b = x << 33;
        long c = (x + y) >> 48;
        long d = x * y << 63;
        return a + b + c + d + (x << 70);
    }
}
"#,
        );
        assert_eq!(
            patched(BadShiftAmount::new(), &f),
            r#"class Test {
    long m(int x, int y) {
        long a = 1L << 40;
        long b = (long) x << 33;
        long c = (long) (x + y) >> 48;
        long d = (long) (x * y) << 63;
        return a + b + c + d + (x << 70);
    }
}
"#
        );
    }

    #[test]
    fn parenthesized_operands_are_not_wrapped_twice() {
        let f = compile(
            r#"class Test {
    long m(int x, int y) {
        long a = (x - y) << 32;
        long b = ((x)) << 40;
        long c = (7) >>> 35;
        return a + b + c;
    }
}
"#,
        );
        assert_eq!(
            patched(BadShiftAmount::new(), &f),
            r#"class Test {
    long m(int x, int y) {
        long a = (long) (x - y) << 32;
        long b = (long) ((x)) << 40;
        long c = (7L) >>> 35;
        return a + b + c;
    }
}
"#
        );
    }
}
