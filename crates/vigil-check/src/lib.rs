//! Bug checkers, their findings, and the scanner that runs them.
//!
//! A [`BugChecker`] names the node kinds it wants and inspects one node at a
//! time through the query facade, returning a [`Description`] when it finds
//! something. Checkers are registered in a [`ScannerSupplier`], which applies
//! [`CheckOptions`] (enablement and severity overrides) and hands out a
//! [`Scanner`]. The scanner walks each unit once and fans nodes out to the
//! checks interested in their kind.
//!
//! ```
//! use std::sync::Arc;
//! use vigil_check::{checker, BugChecker, BugPatternInfo, ScannerSupplier, Severity};
//! use vigil_query::CompilationContext;
//! use vigil_syntax::NodeKind;
//!
//! let empty_block = checker(
//!     BugPatternInfo::new("EmptyBlock", "Empty block", Severity::Suggestion),
//!     [NodeKind::Block],
//!     |this, node, _state| {
//!         (node.children().count() == 0).then(|| this.describe(node).build())
//!     },
//! );
//! let checks: [Arc<dyn BugChecker>; 1] = [Arc::new(empty_block)];
//! let supplier = ScannerSupplier::from_checkers(checks).unwrap();
//!
//! let fixture = vigil_test_utils::compile("class A { void m() {} }");
//! let comp = CompilationContext::new(fixture.store());
//! let findings = supplier.scanner().scan(&comp.context(fixture.unit()));
//! assert_eq!(findings.len(), 1);
//! assert_eq!(findings[0].message(), "[EmptyBlock] Empty block");
//! ```

mod checker;
mod description;
mod info;
mod options;
mod scanner;
mod supplier;

pub use checker::{checker, BugChecker, FnChecker, VisitorState};
pub use description::{Description, DescriptionBuilder};
pub use info::{BugPatternInfo, Severity};
pub use options::{CheckOptions, OptionsError, SeverityOverride};
pub use scanner::{Patched, Scanner};
pub use supplier::{RegisterError, ScannerSupplier};
