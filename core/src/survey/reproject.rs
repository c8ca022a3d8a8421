use crate::prelude::SurveyResult;

/// Coordinate transformation supplied by a geodesy backend.
///
/// `source` is `None` when the dataset does not declare its CRS.
pub trait Reprojector {
    fn reproject(
        &self,
        source: Option<&str>,
        target: &str,
        easting: f64,
        northing: f64,
    ) -> SurveyResult<(f64, f64)>;
}

impl<F> Reprojector for F
where
    F: Fn(Option<&str>, &str, f64, f64) -> SurveyResult<(f64, f64)>,
{
    fn reproject(
        &self,
        source: Option<&str>,
        target: &str,
        easting: f64,
        northing: f64,
    ) -> SurveyResult<(f64, f64)> {
        self(source, target, easting, northing)
    }
}
