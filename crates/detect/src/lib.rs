//! `concilio-detect`: turns a matching outcome into reviewable discrepancies.
//!
//! Detection is rule-based and deterministic. Severity and machine reasons are
//! fixed here; narrative text can be attached afterwards with
//! [`Discrepancy::enrich`].

pub mod classifier;
pub mod detector;
pub mod model;

pub use classifier::DiscrepancyClassifier;
pub use detector::DiscrepancyDetector;
pub use model::{Discrepancy, DiscrepancyResult, DiscrepancyType, Severity};
