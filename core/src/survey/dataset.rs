use crate::crossing::LineCrossings;
use crate::math::stats::{StatsHelper, Summary};
use crate::prelude::{DetectionConfig, StageResult, SurveyError, SurveyResult};
use crate::processing::CrossingDetector;
use crate::survey::point::{LineId, SamplePoint};
use crate::survey::reproject::Reprojector;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::OnceLock;

/// Descriptive metadata attached to a dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SurveyMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// Coordinate reference system of easting/northing, e.g. `EPSG:28355`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crs: Option<String>,
    #[serde(default, flatten)]
    pub attributes: Map<String, Value>,
}

impl SurveyMeta {
    /// Combines two metadata sets. Keys found on one side only are kept;
    /// on conflict nested objects merge recursively and `self` wins otherwise.
    pub fn merged(&self, other: &SurveyMeta) -> SurveyMeta {
        SurveyMeta {
            filename: self.filename.clone().or_else(|| other.filename.clone()),
            crs: self.crs.clone().or_else(|| other.crs.clone()),
            attributes: merge_maps(&self.attributes, &other.attributes),
        }
    }
}

fn merge_maps(left: &Map<String, Value>, right: &Map<String, Value>) -> Map<String, Value> {
    let mut merged = left.clone();
    for (key, value) in right {
        match merged.get_mut(key) {
            Some(Value::Object(existing)) => {
                if let Value::Object(incoming) = value {
                    *existing = merge_maps(existing, incoming);
                }
            }
            Some(_) => {}
            None => {
                merged.insert(key.clone(), value.clone());
            }
        }
    }
    merged
}

/// In-memory survey table: ordered points, passthrough column names and metadata.
#[derive(Debug, Clone, Default)]
pub struct MagData {
    points: Vec<SamplePoint>,
    columns: Vec<String>,
    meta: SurveyMeta,
    sample_frequency: OnceLock<Option<f64>>,
}

impl MagData {
    /// Dataset without passthrough columns.
    pub fn new(points: Vec<SamplePoint>, meta: SurveyMeta) -> Self {
        Self {
            points,
            columns: Vec::new(),
            meta,
            sample_frequency: OnceLock::new(),
        }
    }

    /// Dataset whose points carry one passthrough value per entry of `columns`.
    pub fn from_parts(
        points: Vec<SamplePoint>,
        columns: Vec<String>,
        meta: SurveyMeta,
    ) -> SurveyResult<Self> {
        if let Some((row, point)) = points
            .iter()
            .enumerate()
            .find(|(_, p)| p.extra.len() != columns.len())
        {
            return Err(SurveyError::ColumnMismatch {
                row,
                expected: columns.len(),
                found: point.extra.len(),
            });
        }
        Ok(Self {
            points,
            columns,
            meta,
            sample_frequency: OnceLock::new(),
        })
    }

    pub fn points(&self) -> &[SamplePoint] {
        &self.points
    }

    /// Mutable access to the table. Clears every memoized derived value.
    pub fn points_mut(&mut self) -> &mut Vec<SamplePoint> {
        self.sample_frequency.take();
        &mut self.points
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn meta(&self) -> &SurveyMeta {
        &self.meta
    }

    pub fn meta_mut(&mut self) -> &mut SurveyMeta {
        &mut self.meta
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Distinct line identifiers in order of first appearance.
    pub fn lines(&self) -> Vec<&LineId> {
        let mut seen = HashSet::new();
        self.points
            .iter()
            .map(|p| &p.line)
            .filter(|line| seen.insert(*line))
            .collect()
    }

    pub fn line_points<'a>(&'a self, line: &'a LineId) -> impl Iterator<Item = &'a SamplePoint> {
        self.points.iter().filter(move |p| &p.line == line)
    }

    /// Samples per second, from the most common `utctime` step between
    /// consecutive rows of the same line. Memoized until the table changes.
    pub fn sample_frequency(&self) -> Option<f64> {
        *self
            .sample_frequency
            .get_or_init(|| sample_frequency_of(&self.points))
    }

    /// Count/mean/std/percentiles of each numeric column.
    pub fn describe(&self) -> Vec<(&'static str, Summary)> {
        let column = |f: fn(&SamplePoint) -> f64| StatsHelper::describe(self.points.iter().map(f));
        let mut rows = vec![
            ("fidcount", column(|p| p.fidcount as f64)),
            ("easting", column(|p| p.easting)),
            ("northing", column(|p| p.northing)),
            ("gpsalt", column(|p| p.gpsalt)),
            ("magcom", column(|p| p.magcom)),
            ("maguncom", column(|p| p.maguncom)),
        ];
        if self.points.iter().any(|p| p.utctime.is_some()) {
            rows.push((
                "utctime",
                StatsHelper::describe(self.points.iter().filter_map(|p| p.utctime)),
            ));
        }
        rows
    }

    /// Concatenates two datasets sharing one CRS. Passthrough columns are
    /// unioned; cells a side does not have are left empty.
    pub fn append(&self, other: &MagData) -> SurveyResult<MagData> {
        if self.meta.crs != other.meta.crs {
            return Err(SurveyError::CrsMismatch {
                left: self.meta.crs.clone(),
                right: other.meta.crs.clone(),
            });
        }

        let mut columns = self.columns.clone();
        for name in &other.columns {
            if !columns.contains(name) {
                columns.push(name.clone());
            }
        }

        let points = self
            .points
            .iter()
            .map(|p| realign(p, &self.columns, &columns))
            .chain(other.points.iter().map(|p| realign(p, &other.columns, &columns)))
            .collect();

        MagData::from_parts(points, columns, self.meta.merged(&other.meta))
    }

    /// Copy of the dataset with coordinates moved into `target`.
    pub fn to_crs<R: Reprojector + ?Sized>(
        &self,
        target: &str,
        reprojector: &R,
    ) -> SurveyResult<MagData> {
        let source = self.meta.crs.as_deref();
        let points = self
            .points
            .iter()
            .map(|p| {
                let (easting, northing) =
                    reprojector.reproject(source, target, p.easting, p.northing)?;
                Ok(SamplePoint {
                    easting,
                    northing,
                    ..p.clone()
                })
            })
            .collect::<SurveyResult<Vec<_>>>()?;

        let mut meta = self.meta.clone();
        meta.crs = Some(target.to_string());
        MagData::from_parts(points, self.columns.clone(), meta)
    }

    /// Runs the detector with default settings and the given radius.
    pub fn find_line_crossings(&self, max_dist: f64) -> StageResult<LineCrossings<'_>> {
        CrossingDetector::new(DetectionConfig::with_max_dist(max_dist)).detect(self)
    }
}

fn realign(point: &SamplePoint, own: &[String], target: &[String]) -> SamplePoint {
    let extra = target
        .iter()
        .map(|name| {
            own.iter()
                .position(|c| c == name)
                .and_then(|i| point.extra.get(i).cloned())
                .unwrap_or_default()
        })
        .collect();
    SamplePoint {
        extra,
        ..point.clone()
    }
}

fn sample_frequency_of(points: &[SamplePoint]) -> Option<f64> {
    let mut steps: BTreeMap<OrderedFloat<f64>, usize> = BTreeMap::new();
    for window in points.windows(2) {
        let (prev, next) = (&window[0], &window[1]);
        if prev.line != next.line {
            continue;
        }
        if let (Some(t0), Some(t1)) = (prev.utctime, next.utctime) {
            let step = t1 - t0;
            if step.is_finite() {
                *steps.entry(OrderedFloat(step)).or_default() += 1;
            }
        }
    }

    // Ascending iteration keeps the smallest step on a tie.
    let mut mode: Option<(f64, usize)> = None;
    for (step, count) in steps {
        if mode.map_or(true, |(_, best)| count > best) {
            mode = Some((step.into_inner(), count));
        }
    }
    mode.map(|(step, _)| step)
        .filter(|step| *step > 0.0)
        .map(|step| 1.0 / step)
}

impl fmt::Display for MagData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "filename: {}", self.meta.filename.as_deref().unwrap_or(""))?;
        writeln!(f, "crs: {}", self.meta.crs.as_deref().unwrap_or(""))?;
        match self.sample_frequency() {
            Some(hz) => writeln!(f, "sample_frequency: {hz}")?,
            None => writeln!(f, "sample_frequency: unknown")?,
        }
        for (key, value) in &self.meta.attributes {
            writeln!(f, "{key}: {value}")?;
        }
        writeln!(f)?;
        f.write_str(&StatsHelper::describe_table(&self.describe()))
    }
}
