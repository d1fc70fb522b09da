use vigil_check::{BugChecker, BugPatternInfo, Description, Severity, VisitorState};
use vigil_fix::SuggestedFix;
use vigil_query::{find_super_methods, has_annotation, is_static};
use vigil_syntax::{NodeKind, NodeRef, Symbol};

const OVERRIDE: &str = "java.lang.Override";

/// A method that overrides or implements a supertype method without saying
/// so.
pub struct MissingOverride {
    info: BugPatternInfo,
}

impl MissingOverride {
    pub fn new() -> Self {
        Self {
            info: BugPatternInfo::new(
                "MissingOverride",
                "method overrides method in supertype; expected @Override",
                Severity::Warning,
            ),
        }
    }
}

impl Default for MissingOverride {
    fn default() -> Self {
        Self::new()
    }
}

impl BugChecker for MissingOverride {
    fn info(&self) -> &BugPatternInfo {
        &self.info
    }

    fn node_kinds(&self) -> &[NodeKind] {
        &[NodeKind::Method]
    }

    fn check(&self, node: NodeRef<'_>, state: &VisitorState<'_>) -> Option<Description> {
        let ctx = state.ctx();
        let symbol = node.symbol()?;
        let Symbol::Method(method) = symbol else {
            return None;
        };
        if is_static(ctx, symbol) || has_annotation(ctx, symbol, OVERRIDE) {
            return None;
        }
        let overridden = *find_super_methods(ctx, method).first()?;
        let owner = ctx.env().class(overridden.owner)?;
        let name = ctx.env().method(method)?.name.as_str();
        let verb = if owner.is_interface() {
            "implements"
        } else {
            "overrides"
        };

        let fix = SuggestedFix::builder()
            .set_short_description("add @Override")
            .prefix_with(node, "@Override ")
            .build()
            .ok()?;
        Some(
            self.describe(node)
                .set_message(format!(
                    "{name} {verb} method in {}; expected @Override",
                    owner.simple_name()
                ))
                .add_fix(fix)
                .build(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{findings, patched};
    use pretty_assertions::assert_eq;
    use vigil_test_utils::compile;

    const SOURCE: &str = r#"class Base {
    void run() {}
    static void helper() {}
}
class Task extends Base implements Runnable {
    public void run() {}
    static void helper() {}
    public String toString() { return "task"; }
    @Override public int hashCode() { return 1; }
    void own() {}
}
"#;

    #[test]
    fn names_the_overridden_supertype() {
        let f = compile(SOURCE);
        let messages: Vec<String> = findings(MissingOverride::new(), &f)
            .iter()
            .map(|d| d.message())
            .collect();
        assert_eq!(
            messages,
            vec![
                "[MissingOverride] run overrides method in Base; expected @Override",
                "[MissingOverride] toString overrides method in Object; expected @Override",
            ]
        );
    }

    #[test]
    fn implementing_an_interface_method() {
        let f = compile("class Task implements Runnable {\n    public void run() {}\n}\n");
        let found = findings(MissingOverride::new(), &f);
        assert_eq!(found.len(), 1);
        assert_eq!(
            found[0].raw_message(),
            "run implements method in Runnable; expected @Override"
        );
        assert_eq!(found[0].first_fix().unwrap().short_description(), "add @Override");
    }

    #[test]
    fn adds_the_annotation() {
        let f = compile(SOURCE);
        let text = patched(MissingOverride::new(), &f);
        assert!(text.contains("    @Override public void run() {}\n"));
        assert!(text.contains("    @Override public String toString() { return \"task\"; }\n"));
        assert!(text.contains("    static void helper() {}\n    @Override public String"));
        assert!(!text.contains("@Override @Override"));
        assert!(text.contains("    void own() {}\n"));
    }
}
