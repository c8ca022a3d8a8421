use crate::prelude::{CrossingError, ProcessingStage, StageResult};
use crate::survey::SamplePoint;
use crate::telemetry::{LogManager, MetricsRecorder};
use rstar::primitives::GeomWithData;
use rstar::RTree;

type IndexedPoint = GeomWithData<[f64; 2], usize>;

/// R*-tree over point coordinates; each entry carries its row in the table.
pub struct PointIndex {
    tree: RTree<IndexedPoint>,
}

impl PointIndex {
    /// Fails on the first non-finite coordinate without building anything.
    pub fn build(points: &[SamplePoint]) -> StageResult<Self> {
        if let Some((row, point)) = points
            .iter()
            .enumerate()
            .find(|(_, p)| !p.has_finite_coords())
        {
            return Err(CrossingError::InvalidCoordinate {
                row,
                line: point.line.clone(),
                fidcount: point.fidcount,
            });
        }

        let entries = points
            .iter()
            .enumerate()
            .map(|(row, p)| GeomWithData::new(p.coords(), row))
            .collect();
        Ok(Self {
            tree: RTree::bulk_load(entries),
        })
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Rows whose point lies within `max_dist` of `centre`, boundary included.
    pub fn within(&self, centre: [f64; 2], max_dist: f64) -> impl Iterator<Item = usize> + '_ {
        self.tree
            .locate_within_distance(centre, max_dist * max_dist)
            .map(|entry| entry.data)
    }
}

/// Validates coordinates and bulk-loads the spatial index.
pub struct IndexStage<'a> {
    metrics: &'a MetricsRecorder,
    logger: LogManager,
}

impl<'a> IndexStage<'a> {
    pub fn new(metrics: &'a MetricsRecorder) -> Self {
        Self {
            metrics,
            logger: LogManager::new("index"),
        }
    }
}

impl<'a> ProcessingStage for IndexStage<'a> {
    type Input = &'a [SamplePoint];
    type Output = PointIndex;

    fn name(&self) -> &'static str {
        "index"
    }

    fn execute(&mut self, points: Self::Input) -> StageResult<PointIndex> {
        let index = PointIndex::build(points)?;
        self.metrics.record_indexed(index.len());
        self.logger
            .detail(&format!("indexed {} points", index.len()));
        Ok(index)
    }
}
