//! Satisfaction scoring and thematic aggregation for customer-feedback exports.
//!
//! The pipeline reads a tabular export, resolves one sentiment label per visit,
//! partitions visits into canonical area groups, and assembles the nested
//! report consumed by the chart, word-cloud, and document renderers.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
