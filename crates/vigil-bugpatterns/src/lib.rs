//! Built-in bug patterns.
//!
//! Each pattern is a small [`BugChecker`] built from the matcher, query and
//! fix layers. [`builtin_checkers`] is the one place that lists them, so
//! hosts register the whole set with [`builtin_supplier`] and then narrow it
//! with [`vigil_check::CheckOptions`].

mod array_to_string;
mod assert_equals_argument_order;
mod bad_shift_amount;
mod identity_hash_map_equals;
mod lossy_primitive_compare;
mod missing_override;

use std::sync::Arc;

use vigil_check::{BugChecker, RegisterError, ScannerSupplier};

pub use array_to_string::ArrayToString;
pub use assert_equals_argument_order::AssertEqualsArgumentOrder;
pub use bad_shift_amount::BadShiftAmount;
pub use identity_hash_map_equals::IdentityHashMapEquals;
pub use lossy_primitive_compare::LossyPrimitiveCompare;
pub use missing_override::MissingOverride;

/// Construct the built-in checkers.
pub fn builtin_checkers() -> Vec<Arc<dyn BugChecker>> {
    vec![
        Arc::new(ArrayToString::new()),
        Arc::new(AssertEqualsArgumentOrder::new()),
        Arc::new(BadShiftAmount::new()),
        Arc::new(IdentityHashMapEquals::new()),
        Arc::new(LossyPrimitiveCompare::new()),
        Arc::new(MissingOverride::new()),
    ]
}

/// A [`ScannerSupplier`] with every built-in checker registered at its
/// default severity.
pub fn builtin_supplier() -> Result<ScannerSupplier, RegisterError> {
    let checkers = builtin_checkers();
    tracing::debug!(
        target: "vigil.bugpatterns",
        count = checkers.len(),
        "registering built-in checkers"
    );
    ScannerSupplier::from_checkers(checkers)
}
