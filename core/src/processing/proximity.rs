use crate::prelude::{ProcessingStage, StageResult};
use crate::processing::index::PointIndex;
use crate::survey::SamplePoint;
use crate::telemetry::{LogManager, MetricsRecorder};
use rayon::prelude::*;

/// Unordered pair of table rows, stored with `first < second`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PointPair {
    pub first: usize,
    pub second: usize,
}

impl PointPair {
    pub fn new(a: usize, b: usize) -> Self {
        Self {
            first: a.min(b),
            second: a.max(b),
        }
    }
}

/// Fixed-radius pair enumeration over a [`PointIndex`].
///
/// Each row queries its own neighbourhood and keeps only higher rows, so a
/// pair is produced once and never with itself. The output is sorted, which
/// makes the parallel and sequential paths return the same vector.
pub struct ProximityStage<'a> {
    points: &'a [SamplePoint],
    max_dist: f64,
    parallel: bool,
    metrics: &'a MetricsRecorder,
    logger: LogManager,
}

impl<'a> ProximityStage<'a> {
    pub fn new(
        points: &'a [SamplePoint],
        max_dist: f64,
        parallel: bool,
        metrics: &'a MetricsRecorder,
    ) -> Self {
        Self {
            points,
            max_dist,
            parallel,
            metrics,
            logger: LogManager::new("proximity"),
        }
    }

    fn neighbours<'i>(
        index: &'i PointIndex,
        points: &'i [SamplePoint],
        row: usize,
        max_dist: f64,
    ) -> impl Iterator<Item = PointPair> + 'i {
        index
            .within(points[row].coords(), max_dist)
            .filter(move |&other| other > row)
            .map(move |other| PointPair {
                first: row,
                second: other,
            })
    }
}

impl<'a> ProcessingStage for ProximityStage<'a> {
    type Input = &'a PointIndex;
    type Output = Vec<PointPair>;

    fn name(&self) -> &'static str {
        "proximity"
    }

    fn execute(&mut self, index: Self::Input) -> StageResult<Vec<PointPair>> {
        let points = self.points;
        let max_dist = self.max_dist;

        let mut pairs: Vec<PointPair> = if self.parallel {
            (0..points.len())
                .into_par_iter()
                .flat_map_iter(|row| Self::neighbours(index, points, row, max_dist))
                .collect()
        } else {
            (0..points.len())
                .flat_map(|row| Self::neighbours(index, points, row, max_dist))
                .collect()
        };
        pairs.sort_unstable();

        self.metrics.record_candidates(pairs.len());
        self.logger.detail(&format!(
            "{} pairs within {} (parallel: {})",
            pairs.len(),
            max_dist,
            self.parallel
        ));
        Ok(pairs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(points: &[SamplePoint], max_dist: f64, parallel: bool) -> Vec<PointPair> {
        let metrics = MetricsRecorder::new();
        let index = PointIndex::build(points).unwrap();
        ProximityStage::new(points, max_dist, parallel, &metrics)
            .execute(&index)
            .unwrap()
    }

    #[test]
    fn pairs_are_canonical_and_unique() {
        let points = vec![
            SamplePoint::new("A", 0, 0.0, 0.0),
            SamplePoint::new("A", 1, 1.0, 0.0),
            SamplePoint::new("B", 0, 0.5, 0.5),
            SamplePoint::new("B", 1, 50.0, 50.0),
        ];
        let pairs = run(&points, 1.0, false);
        assert_eq!(
            pairs,
            vec![PointPair::new(0, 1), PointPair::new(0, 2), PointPair::new(1, 2)]
        );
        assert!(pairs.iter().all(|p| p.first < p.second));
    }

    #[test]
    fn coincident_points_pair_once() {
        let points = vec![SamplePoint::new("A", 0, 2.0, 2.0), SamplePoint::new("B", 0, 2.0, 2.0)];
        assert_eq!(run(&points, 0.1, true), vec![PointPair::new(1, 0)]);
    }

    #[test]
    fn parallel_matches_sequential() {
        let points: Vec<SamplePoint> = (0..400)
            .map(|i| {
                let t = i as f64;
                SamplePoint::new(if i % 2 == 0 { "E" } else { "O" }, i, (t * 7.3) % 97.0, (t * 3.1) % 41.0)
            })
            .collect();
        assert_eq!(run(&points, 4.0, true), run(&points, 4.0, false));
    }

    #[test]
    fn empty_table_yields_no_pairs() {
        assert!(run(&[], 10.0, true).is_empty());
    }
}
