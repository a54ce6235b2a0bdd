//! Comparison oracle and store verification for shipyard.

pub mod engine;
pub mod errors;
pub mod model;
pub mod oracle;
pub mod report;

pub use engine::{ReportFiles, verify_all, verify_kind, write_report};
pub use errors::EvalError;
pub use model::{ComparisonFailure, KindVerification, Mismatch, VerificationReport};
pub use oracle::{compare, diff};
pub use report::render_report;
