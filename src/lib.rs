//! querytag: keyword-rule text classification over HTTP.
//!
//! [`classifier`] holds the pure tagging and prioritization logic,
//! [`gateway`] exposes it at `POST /classify`, and [`config`] resolves the
//! listening address and transport limits.

pub mod classifier;
pub mod config;
pub mod gateway;
pub mod util;

pub use classifier::{ClassificationResult, Classifier, Priority, Tag};
pub use config::Config;
