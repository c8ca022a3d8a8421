use crate::prelude::{ProcessingStage, StageResult};
use crate::processing::proximity::PointPair;
use crate::survey::SamplePoint;
use crate::telemetry::{LogManager, MetricsRecorder};

/// Drops pairs recorded on the same line.
pub struct CrossLineFilter<'a> {
    points: &'a [SamplePoint],
    metrics: &'a MetricsRecorder,
    logger: LogManager,
}

impl<'a> CrossLineFilter<'a> {
    pub fn new(points: &'a [SamplePoint], metrics: &'a MetricsRecorder) -> Self {
        Self {
            points,
            metrics,
            logger: LogManager::new("filter"),
        }
    }
}

impl ProcessingStage for CrossLineFilter<'_> {
    type Input = Vec<PointPair>;
    type Output = Vec<PointPair>;

    fn name(&self) -> &'static str {
        "cross-line filter"
    }

    fn execute(&mut self, mut pairs: Vec<PointPair>) -> StageResult<Vec<PointPair>> {
        let before = pairs.len();
        let points = self.points;
        pairs.retain(|pair| points[pair.first].line != points[pair.second].line);

        self.metrics.record_cross_line(pairs.len());
        self.logger.detail(&format!(
            "kept {} of {} pairs across lines",
            pairs.len(),
            before
        ));
        Ok(pairs)
    }
}
