use vigil_check::{BugChecker, BugPatternInfo, Description, Severity, VisitorState};
use vigil_fix::SuggestedFix;
use vigil_matchers::{static_method, Matcher, MethodMatcher};
use vigil_query::{get_type, types::binary_promotion};
use vigil_syntax::{NodeData, NodeKind, NodeRef};
use vigil_types::{is_lossy_widening, PrimitiveType};

/// `Float.compare` and `Double.compare` on integral values that do not fit
/// the floating-point mantissa.
pub struct LossyPrimitiveCompare {
    info: BugPatternInfo,
    compare: MethodMatcher,
}

impl LossyPrimitiveCompare {
    pub fn new() -> Self {
        Self {
            info: BugPatternInfo::new(
                "LossyPrimitiveCompare",
                "Using an unnecessarily-wide comparison method can lead to lossy comparison",
                Severity::Error,
            ),
            compare: static_method()
                .on_class_any(&["java.lang.Float", "java.lang.Double"])
                .named("compare")
                .with_arity(2),
        }
    }
}

impl Default for LossyPrimitiveCompare {
    fn default() -> Self {
        Self::new()
    }
}

impl BugChecker for LossyPrimitiveCompare {
    fn info(&self) -> &BugPatternInfo {
        &self.info
    }

    fn node_kinds(&self) -> &[NodeKind] {
        &[NodeKind::MethodInvocation]
    }

    fn check(&self, node: NodeRef<'_>, state: &VisitorState<'_>) -> Option<Description> {
        let ctx = state.ctx();
        if !self.compare.matches(node, ctx) {
            return None;
        }
        let NodeData::MethodInvocation {
            method_select,
            args,
        } = node.data()
        else {
            return None;
        };
        let [lhs, rhs] = args.as_slice() else {
            return None;
        };
        let target = node
            .symbol()
            .and_then(|symbol| symbol.as_method())
            .and_then(|method| ctx.env().method(method))
            .and_then(|def| def.params.first())
            .and_then(|param| param.as_primitive())?;
        let lhs_ty = get_type(node.at(*lhs))?;
        let rhs_ty = get_type(node.at(*rhs))?;
        let operands = binary_promotion(ctx.env(), lhs_ty, rhs_ty)?;
        if !is_lossy_widening(operands, target) {
            return None;
        }
        let replacement = match operands {
            PrimitiveType::Int => "Integer.compare",
            PrimitiveType::Long => "Long.compare",
            _ => return Some(self.describe(node).build()),
        };
        let fix = SuggestedFix::replace(node.at(*method_select), replacement).ok()?;
        Some(self.describe(node).add_fix(fix).build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{findings, patched};
    use pretty_assertions::assert_eq;
    use vigil_test_utils::compile;

    const SOURCE: &str = r#"class Test {
    void m(int i, int j, long a, long b, short s, double d) {
        Float.compare(i, j);
        Double.compare(a, b);
        Float.compare(s, a);
        Double.compare(i, j);
        Float.compare(s, s);
        Double.compare(d, a);
    }
}
"#;

    #[test]
    fn flags_integral_arguments_that_lose_precision() {
        let f = compile(SOURCE);
        let found: Vec<_> = findings(LossyPrimitiveCompare::new(), &f)
            .iter()
            .map(|d| d.line_col.line + 1)
            .collect();
        // `Double.compare(i, j)` is exact and `d` is already a double.
        assert_eq!(found, vec![3, 4, 5, 7]);
    }

    #[test]
    fn switches_to_the_integral_compare() {
        let f = compile(SOURCE);
        assert_eq!(
            patched(LossyPrimitiveCompare::new(), &f),
            r#"class Test {
    void m(int i, int j, long a, long b, short s, double d) {
        Integer.compare(i, j);
        Long.compare(a, b);
        Long.compare(s, a);
        Double.compare(i, j);
        Integer.compare(s, s);
        Double.compare(d, a);
    }
}
"#
        );
    }
}
