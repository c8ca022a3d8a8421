use crate::prelude::{PairGrouping, ProcessingStage, StageResult};
use crate::processing::proximity::PointPair;
use crate::survey::{LineId, SamplePoint};
use crate::telemetry::LogManager;
use std::cmp::Ordering;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

/// A pair in record orientation: `first` becomes the `_1` side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientedPair {
    pub first: usize,
    pub second: usize,
    pub distance: f64,
}

/// Keeps the closest candidate per grouping key.
///
/// Ties on distance go to the smallest
/// `(line_1, fidcount_1, line_2, fidcount_2)`, then the smallest row pair.
/// Output is ordered by grouping key.
pub struct PairwiseReducer<'a> {
    points: &'a [SamplePoint],
    grouping: PairGrouping,
    logger: LogManager,
}

impl<'a> PairwiseReducer<'a> {
    pub fn new(points: &'a [SamplePoint], grouping: PairGrouping) -> Self {
        Self {
            points,
            grouping,
            logger: LogManager::new("reducer"),
        }
    }

    fn orient(&self, pair: PointPair) -> OrientedPair {
        let (first, second) = match self.grouping {
            PairGrouping::Directed => (pair.first, pair.second),
            PairGrouping::LinePair => {
                if self.points[pair.second].line < self.points[pair.first].line {
                    (pair.second, pair.first)
                } else {
                    (pair.first, pair.second)
                }
            }
        };
        OrientedPair {
            first,
            second,
            distance: self.points[first].distance(&self.points[second]),
        }
    }

    fn key(&self, pair: &OrientedPair) -> (&'a LineId, &'a LineId) {
        let points = self.points;
        (&points[pair.first].line, &points[pair.second].line)
    }

    fn tie_order(&self, pair: &OrientedPair) -> (&'a LineId, i64, &'a LineId, i64, usize, usize) {
        let points = self.points;
        let (p1, p2) = (&points[pair.first], &points[pair.second]);
        (&p1.line, p1.fidcount, &p2.line, p2.fidcount, pair.first, pair.second)
    }

    fn compare(&self, a: &OrientedPair, b: &OrientedPair) -> Ordering {
        a.distance
            .total_cmp(&b.distance)
            .then_with(|| self.tie_order(a).cmp(&self.tie_order(b)))
    }
}

impl ProcessingStage for PairwiseReducer<'_> {
    type Input = Vec<PointPair>;
    type Output = Vec<OrientedPair>;

    fn name(&self) -> &'static str {
        "pairwise reducer"
    }

    fn execute(&mut self, pairs: Vec<PointPair>) -> StageResult<Vec<OrientedPair>> {
        let candidates = pairs.len();
        let mut best = BTreeMap::new();
        for pair in pairs {
            let candidate = self.orient(pair);
            match best.entry(self.key(&candidate)) {
                Entry::Vacant(slot) => {
                    slot.insert(candidate);
                }
                Entry::Occupied(mut slot) => {
                    if self.compare(&candidate, slot.get()) == Ordering::Less {
                        slot.insert(candidate);
                    }
                }
            }
        }

        self.logger.detail(&format!(
            "{} candidates reduced to {} groups ({:?})",
            candidates,
            best.len(),
            self.grouping
        ));
        Ok(best.into_values().collect())
    }
}
