//! Line-crossing detection for aeromagnetic survey data.
//!
//! A survey is a table of readings flown along numbered lines. Where two
//! lines pass within `max_dist` of each other the readings from both passes
//! should agree, and their differences give a quick tie/levelling check.
//! The detector runs as a chain of stages over the point table: spatial
//! index, radius pair query, cross-line filter, per-line-pair reduction and
//! difference diagnostics.

pub mod crossing;
pub mod math;
pub mod prelude;
pub mod processing;
pub mod survey;
pub mod telemetry;

pub use crossing::{CrossingRecord, CrossingSummary, LineCrossings};
pub use prelude::{
    CrossingError, DetectionConfig, PairGrouping, ProcessingStage, StageResult, SurveyError,
    SurveyResult, DEFAULT_MAX_DIST,
};
pub use processing::CrossingDetector;
pub use survey::{LineId, MagData, Reprojector, SamplePoint, SurveyMeta};
