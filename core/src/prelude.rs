use crate::survey::LineId;
use serde::{Deserialize, Serialize};

/// Search radius used when the caller does not pick one, in the dataset's linear unit.
pub const DEFAULT_MAX_DIST: f64 = 10.0;

/// How cross-line candidates are grouped before the closest one is kept.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PairGrouping {
    /// One crossing per unordered pair of lines. Each pair is oriented so
    /// that `line_1 < line_2`.
    #[default]
    LinePair,
    /// One crossing per (first line, second line) in enumeration order.
    /// Two records can come out for the same two lines.
    Directed,
}

/// Shared configuration for a detection run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    pub max_dist: f64,
    pub grouping: PairGrouping,
    pub parallel: bool,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            max_dist: DEFAULT_MAX_DIST,
            grouping: PairGrouping::default(),
            parallel: true,
        }
    }
}

impl DetectionConfig {
    pub fn with_max_dist(max_dist: f64) -> Self {
        Self {
            max_dist,
            ..Default::default()
        }
    }

    /// Rejects radii that cannot describe a proximity query.
    pub fn validate(&self) -> StageResult<()> {
        if self.max_dist.is_finite() && self.max_dist > 0.0 {
            Ok(())
        } else {
            Err(CrossingError::InvalidRadius(self.max_dist))
        }
    }
}

/// Errors raised by the crossing detector.
#[derive(thiserror::Error, Debug)]
pub enum CrossingError {
    #[error("invalid search radius {0}: must be finite and greater than zero")]
    InvalidRadius(f64),
    #[error("non-finite coordinate at row {row} (line {line}, fidcount {fidcount})")]
    InvalidCoordinate {
        row: usize,
        line: LineId,
        fidcount: i64,
    },
}

pub type StageResult<T> = Result<T, CrossingError>;

/// Errors raised while loading, combining or reprojecting survey data.
#[derive(thiserror::Error, Debug)]
pub enum SurveyError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("missing required column `{0}`")]
    MissingColumn(&'static str),
    #[error("row {row}: cannot parse {column} value {value:?}")]
    InvalidValue {
        row: usize,
        column: &'static str,
        value: String,
    },
    #[error("point {row} carries {found} passthrough values, expected {expected}")]
    ColumnMismatch {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("datasets use different CRS ({left:?} vs {right:?}); reproject one of them first")]
    CrsMismatch {
        left: Option<String>,
        right: Option<String>,
    },
    #[error("reprojection failed: {0}")]
    Reprojection(String),
}

pub type SurveyResult<T> = Result<T, SurveyError>;

/// A single step of the detection pipeline.
///
/// Stages borrow the point table they work on and consume the previous
/// stage's output, so a run reads as a straight chain of `execute` calls.
pub trait ProcessingStage {
    type Input;
    type Output;

    fn name(&self) -> &'static str;
    fn execute(&mut self, input: Self::Input) -> StageResult<Self::Output>;
}
