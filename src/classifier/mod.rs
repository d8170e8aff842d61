//! Keyword-rule query classifier.
//!
//! Assigns category tags and a single priority to free-form text:
//! - Each tag rule is a keyword list matched independently against the
//!   lowercased text, so one query can carry several tags
//! - Priority is decided by an ordered escalation ladder (first match wins)
//! - Text that matches no rule is tagged `General Inquiry`
//!
//! ## Design
//! - Rule tables live in [`rules`] as plain constants
//! - [`Classifier`] compiles them once and is shared read-only across requests
//! - Classification is pure and infallible for any `&str`

pub mod engine;
pub mod rules;

pub use engine::{BuildError, ClassificationResult, Classifier};
pub use rules::{Priority, Tag};
