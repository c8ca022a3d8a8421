use crate::crossing::CrossingRecord;
use crate::prelude::{ProcessingStage, StageResult};
use crate::processing::reducer::OrientedPair;
use crate::survey::SamplePoint;
use crate::telemetry::{LogManager, MetricsRecorder};

/// Turns the reduced pairs into crossing records with their difference metrics.
pub struct DiagnosticsStage<'a> {
    points: &'a [SamplePoint],
    metrics: &'a MetricsRecorder,
    logger: LogManager,
}

impl<'a> DiagnosticsStage<'a> {
    pub fn new(points: &'a [SamplePoint], metrics: &'a MetricsRecorder) -> Self {
        Self {
            points,
            metrics,
            logger: LogManager::new("diagnostics"),
        }
    }
}

impl ProcessingStage for DiagnosticsStage<'_> {
    type Input = Vec<OrientedPair>;
    type Output = Vec<CrossingRecord>;

    fn name(&self) -> &'static str {
        "diagnostics"
    }

    fn execute(&mut self, pairs: Vec<OrientedPair>) -> StageResult<Vec<CrossingRecord>> {
        let records: Vec<CrossingRecord> = pairs
            .iter()
            .map(|pair| CrossingRecord::between(&self.points[pair.first], &self.points[pair.second]))
            .collect();

        self.metrics.record_crossings(records.len());
        self.logger
            .record(&format!("{} line crossings", records.len()));
        Ok(records)
    }
}
