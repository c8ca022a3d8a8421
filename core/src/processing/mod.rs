pub mod detector;
pub mod diagnostics;
pub mod filter;
pub mod index;
pub mod proximity;
pub mod reducer;

pub use detector::CrossingDetector;
pub use diagnostics::DiagnosticsStage;
pub use filter::CrossLineFilter;
pub use index::{IndexStage, PointIndex};
pub use proximity::{PointPair, ProximityStage};
pub use reducer::{OrientedPair, PairwiseReducer};
