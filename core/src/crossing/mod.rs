//! Output side of a detection run.

pub mod record;

pub use record::{CrossingRecord, CrossingSummary, LineCrossings};
