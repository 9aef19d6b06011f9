//! edulens – analytics engine for school infrastructure and student
//! retention data.
//!
//! The engine behind a multi-page dashboard over per-school
//! administrative records. It cleans raw tabular sources into typed
//! records, derives composite indicators, applies hierarchical filters,
//! reduces records into the summary tables every view consumes, and
//! encodes user-supplied attributes into the fixed-order vectors the
//! pretrained retention models expect. Rendering is someone else's job:
//! everything here returns plain data or markdown text.

pub mod data;
pub mod predict;
pub mod report;
pub mod session;
