use vigil_check::{BugChecker, BugPatternInfo, Description, Severity, VisitorState};
use vigil_matchers::{
    argument, instance_method, is_subtype_of, not, Argument, Matcher, MethodMatcher, Not, TypeIs,
};
use vigil_syntax::{NodeKind, NodeRef};

const IDENTITY_HASH_MAP: &str = "java.util.IdentityHashMap";

/// `identityMap.equals(otherMap)` where the other map is not known to be an
/// `IdentityHashMap`: one side compares keys by reference, the other by
/// `equals`, so the result is not symmetric.
pub struct IdentityHashMapEquals {
    info: BugPatternInfo,
    identity_equals: MethodMatcher,
    other_not_identity: Argument<Not<TypeIs>>,
}

impl IdentityHashMapEquals {
    pub fn new() -> Self {
        Self {
            info: BugPatternInfo::new(
                "IdentityHashMapEquals",
                "IdentityHashMap.equals compares keys by reference; comparing it with \
                 another kind of map is not symmetric",
                Severity::Warning,
            ),
            identity_equals: instance_method()
                .on_exact_class(IDENTITY_HASH_MAP)
                .named("equals")
                .with_parameters(&["java.lang.Object"]),
            other_not_identity: argument(0, not(is_subtype_of(IDENTITY_HASH_MAP))),
        }
    }
}

impl Default for IdentityHashMapEquals {
    fn default() -> Self {
        Self::new()
    }
}

impl BugChecker for IdentityHashMapEquals {
    fn info(&self) -> &BugPatternInfo {
        &self.info
    }

    fn node_kinds(&self) -> &[NodeKind] {
        &[NodeKind::MethodInvocation]
    }

    fn check(&self, node: NodeRef<'_>, state: &VisitorState<'_>) -> Option<Description> {
        let ctx = state.ctx();
        (self.identity_equals.matches(node, ctx) && self.other_not_identity.matches(node, ctx))
            .then(|| self.describe(node).build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::findings;
    use pretty_assertions::assert_eq;
    use vigil_test_utils::compile;

    #[test]
    fn flags_equals_against_other_maps() {
        let f = compile(
            r#"import java.util.*;
class Test {
    boolean m(IdentityHashMap<String, Integer> identity, Map<String, Integer> map,
              IdentityHashMap<String, Integer> other, HashMap<String, Integer> hash) {
        return identity.equals(map)
            || identity.equals(other)
            || map.equals(identity)
            || identity.equals(hash);
    }
}
"#,
        );
        let found = findings(IdentityHashMapEquals::new(), &f);
        let calls: Vec<&str> = found.iter().map(|d| &f.unit().text()[d.range]).collect();
        assert_eq!(calls, vec!["identity.equals(map)", "identity.equals(hash)"]);
        assert!(found.iter().all(|d| d.fixes().is_empty()));
        assert_eq!(found[0].severity, Severity::Warning);
    }
}
