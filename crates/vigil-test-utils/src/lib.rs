//! Utilities shared by vigil tests.
//!
//! - [`java`] compiles small Java fixtures into attributed
//!   [`CompilationUnit`](vigil_syntax::CompilationUnit)s so rules and queries
//!   can be tested without a host compiler.
//! - [`extract_range`], [`span`] and [`parse_files`] locate text in fixtures.
//! - [`capture_logs`] records `tracing` events emitted while a closure runs.

pub mod java;
mod logs;
mod ranges;

pub use java::{compile, compile_multi, FixtureError, JavaFixture};
pub use logs::{capture_logs, events_for, CapturedEvent};
pub use ranges::{extract_range, parse_files, span, span_nth};
