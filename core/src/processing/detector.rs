use crate::crossing::LineCrossings;
use crate::prelude::{DetectionConfig, ProcessingStage, StageResult};
use crate::processing::{
    CrossLineFilter, DiagnosticsStage, IndexStage, PairwiseReducer, ProximityStage,
};
use crate::survey::MagData;
use crate::telemetry::{LogManager, MetricsRecorder};

/// Runs index → proximity → cross-line filter → reducer → diagnostics over a dataset.
pub struct CrossingDetector {
    config: DetectionConfig,
    logger: LogManager,
}

impl CrossingDetector {
    pub fn new(config: DetectionConfig) -> Self {
        Self {
            config,
            logger: LogManager::default(),
        }
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    pub fn detect<'d>(&self, data: &'d MagData) -> StageResult<LineCrossings<'d>> {
        self.config.validate()?;

        let points = data.points();
        let metrics = MetricsRecorder::new();
        let index = IndexStage::new(&metrics).execute(points)?;

        let records = if data.lines().len() < 2 {
            self.logger
                .record("fewer than two lines in dataset, no crossings possible");
            Vec::new()
        } else {
            let candidates =
                ProximityStage::new(points, self.config.max_dist, self.config.parallel, &metrics)
                    .execute(&index)?;
            let cross_line = CrossLineFilter::new(points, &metrics).execute(candidates)?;
            let reduced = PairwiseReducer::new(points, self.config.grouping).execute(cross_line)?;
            DiagnosticsStage::new(points, &metrics).execute(reduced)?
        };

        let counts = metrics.snapshot();
        self.logger.record(&format!(
            "{} points, {} candidate pairs, {} across lines, {} crossings (max_dist {})",
            counts.points_indexed,
            counts.candidate_pairs,
            counts.cross_line_pairs,
            counts.crossings,
            self.config.max_dist
        ));

        Ok(LineCrossings::new(
            data,
            self.config.max_dist,
            self.config.grouping,
            records,
            counts,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::{CrossingError, PairGrouping};
    use crate::survey::{SamplePoint, SurveyMeta};

    fn dataset(points: Vec<SamplePoint>) -> MagData {
        MagData::new(points, SurveyMeta::default())
    }

    fn detect(data: &MagData, max_dist: f64) -> LineCrossings<'_> {
        CrossingDetector::new(DetectionConfig::with_max_dist(max_dist))
            .detect(data)
            .unwrap()
    }

    #[test]
    fn three_four_five_crossing_respects_inclusive_radius() {
        let data = dataset(vec![
            SamplePoint::new("A", 0, 0.0, 0.0),
            SamplePoint::new("B", 0, 3.0, 4.0),
        ]);

        let found = detect(&data, 5.0);
        assert_eq!(found.len(), 1);
        assert_eq!(found.crossings()[0].distance, 5.0);

        assert!(detect(&data, 4.999).is_empty());
    }

    #[test]
    fn keeps_closest_point_of_the_line_pair() {
        let data = dataset(vec![
            SamplePoint::new("A", 0, 0.0, 0.0),
            SamplePoint::new("A", 1, 0.0, 1.0),
            SamplePoint::new("B", 0, 0.0, 0.5),
        ]);
        let found = detect(&data, 1.0);
        assert_eq!(found.len(), 1);
        let record = &found.crossings()[0];
        assert_eq!(record.distance, 0.5);
        assert_eq!(record.first.line.as_str(), "A");
        assert_eq!(record.first.fidcount, 0);
        assert_eq!(record.second.line.as_str(), "B");
    }

    #[test]
    fn non_positive_radius_is_rejected() {
        let data = dataset(vec![SamplePoint::new("A", 0, 0.0, 0.0)]);
        for radius in [0.0, -1.0, f64::NAN] {
            let err = CrossingDetector::new(DetectionConfig::with_max_dist(radius))
                .detect(&data)
                .unwrap_err();
            assert!(matches!(err, CrossingError::InvalidRadius(_)));
        }
    }

    #[test]
    fn missing_coordinate_fails_before_querying() {
        let data = dataset(vec![
            SamplePoint::new("A", 0, 0.0, 0.0),
            SamplePoint::new("B", 0, f64::NAN, 0.0),
        ]);
        let err = CrossingDetector::new(DetectionConfig::default())
            .detect(&data)
            .unwrap_err();
        assert!(matches!(err, CrossingError::InvalidCoordinate { row: 1, .. }));
    }

    #[test]
    fn single_line_and_empty_inputs_yield_nothing() {
        let single = dataset((0..20).map(|i| SamplePoint::new("A", i, 0.0, i as f64)).collect());
        assert!(detect(&single, 1000.0).is_empty());

        let empty = dataset(Vec::new());
        let found = detect(&empty, 10.0);
        assert!(found.is_empty());
        assert_eq!(found.counts().points_indexed, 0);
    }

    #[test]
    fn directed_grouping_can_report_both_orientations() {
        let data = dataset(vec![
            SamplePoint::new("B", 0, 0.0, 0.0),
            SamplePoint::new("A", 0, 1.0, 0.0),
            SamplePoint::new("A", 1, 100.0, 0.0),
            SamplePoint::new("B", 1, 100.5, 0.0),
        ]);

        let line_pair = detect(&data, 2.0);
        assert_eq!(line_pair.len(), 1);
        assert_eq!(line_pair.crossings()[0].distance, 0.5);

        let directed = CrossingDetector::new(DetectionConfig {
            max_dist: 2.0,
            grouping: PairGrouping::Directed,
            parallel: false,
        })
        .detect(&data)
        .unwrap();
        assert_eq!(directed.len(), 2);
        assert_eq!(directed.grouping(), PairGrouping::Directed);
    }

    #[test]
    fn counts_track_each_stage() {
        let data = dataset(vec![
            SamplePoint::new("A", 0, 0.0, 0.0),
            SamplePoint::new("A", 1, 0.0, 1.0),
            SamplePoint::new("B", 0, 0.0, 0.5),
        ]);
        let counts = detect(&data, 1.0).counts();
        assert_eq!(counts.points_indexed, 3);
        assert_eq!(counts.candidate_pairs, 3);
        assert_eq!(counts.cross_line_pairs, 2);
        assert_eq!(counts.crossings, 1);
    }

    #[test]
    fn dataset_shortcut_uses_default_settings() {
        let data = dataset(vec![
            SamplePoint::new("A", 0, 0.0, 0.0),
            SamplePoint::new("B", 0, 6.0, 8.0),
        ]);
        let found = data.find_line_crossings(10.0).unwrap();
        assert_eq!(found.max_dist(), 10.0);
        assert_eq!(found.grouping(), PairGrouping::LinePair);
        assert_eq!(found.len(), 1);
        assert!(std::ptr::eq(found.source(), &data));
    }
}
