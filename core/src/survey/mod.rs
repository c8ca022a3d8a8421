//! Survey data model: sample points, the dataset container and its
//! surrounding I/O and reprojection hooks.

pub mod dataset;
pub mod io;
pub mod point;
pub mod reproject;

pub use dataset::{MagData, SurveyMeta};
pub use point::{LineId, SamplePoint};
pub use reproject::Reprojector;
