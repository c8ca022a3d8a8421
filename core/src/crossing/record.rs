use crate::math::stats::{StatsHelper, Summary};
use crate::prelude::{PairGrouping, SurveyResult};
use crate::survey::point::field_names;
use crate::survey::{LineId, MagData, SamplePoint};
use crate::telemetry::StageCounts;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;

/// One line crossing: the two readings and how far apart they disagree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossingRecord {
    pub first: SamplePoint,
    pub second: SamplePoint,
    pub distance: f64,
    pub gpsalt_diff: f64,
    pub magcom_diff: f64,
    pub maguncom_diff: f64,
}

impl CrossingRecord {
    pub fn between(first: &SamplePoint, second: &SamplePoint) -> Self {
        Self {
            distance: first.distance(second),
            gpsalt_diff: (first.gpsalt - second.gpsalt).abs(),
            magcom_diff: (first.magcom - second.magcom).abs(),
            maguncom_diff: (first.maguncom - second.maguncom).abs(),
            first: first.clone(),
            second: second.clone(),
        }
    }

    pub fn lines(&self) -> (&LineId, &LineId) {
        (&self.first.line, &self.second.line)
    }

    /// Map position of the crossing, taken from the first reading.
    pub fn location(&self) -> [f64; 2] {
        self.first.coords()
    }
}

/// Quick-look statistics over a crossing set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossingSummary {
    pub max_dist: f64,
    pub filename: Option<String>,
    pub crossings: usize,
    pub gpsalt_diff: Summary,
    pub magcom_diff: Summary,
    pub maguncom_diff: Summary,
    pub distance: Summary,
}

impl CrossingSummary {
    pub fn rows(&self) -> [(&'static str, Summary); 4] {
        [
            ("gpsalt_diff", self.gpsalt_diff),
            ("magcom_diff", self.magcom_diff),
            ("maguncom_diff", self.maguncom_diff),
            ("distance", self.distance),
        ]
    }
}

/// Result of one detection run. Borrows the dataset it was computed from.
#[derive(Debug, Clone)]
pub struct LineCrossings<'a> {
    source: &'a MagData,
    max_dist: f64,
    grouping: PairGrouping,
    crossings: Vec<CrossingRecord>,
    counts: StageCounts,
}

impl<'a> LineCrossings<'a> {
    pub(crate) fn new(
        source: &'a MagData,
        max_dist: f64,
        grouping: PairGrouping,
        crossings: Vec<CrossingRecord>,
        counts: StageCounts,
    ) -> Self {
        Self {
            source,
            max_dist,
            grouping,
            crossings,
            counts,
        }
    }

    pub fn source(&self) -> &'a MagData {
        self.source
    }

    pub fn max_dist(&self) -> f64 {
        self.max_dist
    }

    pub fn grouping(&self) -> PairGrouping {
        self.grouping
    }

    pub fn crossings(&self) -> &[CrossingRecord] {
        &self.crossings
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CrossingRecord> {
        self.crossings.iter()
    }

    pub fn len(&self) -> usize {
        self.crossings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.crossings.is_empty()
    }

    pub fn counts(&self) -> StageCounts {
        self.counts
    }

    pub fn into_records(self) -> Vec<CrossingRecord> {
        self.crossings
    }

    pub fn summary(&self) -> CrossingSummary {
        let column = |f: fn(&CrossingRecord) -> f64| StatsHelper::describe(self.crossings.iter().map(f));
        CrossingSummary {
            max_dist: self.max_dist,
            filename: self.source.meta().filename.clone(),
            crossings: self.crossings.len(),
            gpsalt_diff: column(|c| c.gpsalt_diff),
            magcom_diff: column(|c| c.magcom_diff),
            maguncom_diff: column(|c| c.maguncom_diff),
            distance: column(|c| c.distance),
        }
    }

    /// Writes the crossing table: point columns suffixed `_1`, then `_2`,
    /// then `distance` and the three differences.
    pub fn write_csv<W: Write>(&self, writer: W) -> SurveyResult<()> {
        let with_utctime = self.source.points().iter().any(|p| p.utctime.is_some());
        let names = field_names(with_utctime, self.source.columns());

        let mut header: Vec<String> = Vec::with_capacity(names.len() * 2 + 4);
        header.extend(names.iter().map(|n| format!("{n}_1")));
        header.extend(names.iter().map(|n| format!("{n}_2")));
        header.extend(
            ["distance", "gpsalt_diff", "magcom_diff", "maguncom_diff"].map(String::from),
        );

        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(&header)?;
        for crossing in &self.crossings {
            let mut row = crossing.first.field_values(with_utctime);
            row.extend(crossing.second.field_values(with_utctime));
            row.extend(
                [
                    crossing.distance,
                    crossing.gpsalt_diff,
                    crossing.magcom_diff,
                    crossing.maguncom_diff,
                ]
                .map(|v| v.to_string()),
            );
            csv_writer.write_record(&row)?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}

impl<'a, 'b> IntoIterator for &'b LineCrossings<'a> {
    type Item = &'b CrossingRecord;
    type IntoIter = std::slice::Iter<'b, CrossingRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.crossings.iter()
    }
}

impl fmt::Display for LineCrossings<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let summary = self.summary();
        writeln!(f, "Max distance: {}", self.max_dist)?;
        writeln!(f, "Filename: {}", summary.filename.as_deref().unwrap_or(""))?;
        writeln!(f)?;
        f.write_str(&StatsHelper::describe_table(&summary.rows()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::survey::SurveyMeta;

    fn sample() -> MagData {
        let mut a = SamplePoint::new("A", 3, 0.0, 0.0).with_readings(60.0, 100.0, 110.0);
        a.extra = vec!["x".into()];
        let mut b = SamplePoint::new("B", 9, 3.0, 4.0).with_readings(57.5, 101.5, 108.0);
        b.extra = vec!["y".into()];
        MagData::from_parts(
            vec![a, b],
            vec!["flag".into()],
            SurveyMeta {
                filename: Some("survey.csv".into()),
                ..Default::default()
            },
        )
        .unwrap()
    }

    #[test]
    fn record_differences_are_absolute() {
        let data = sample();
        let record = CrossingRecord::between(&data.points()[1], &data.points()[0]);
        assert_eq!(record.distance, 5.0);
        assert_eq!(record.gpsalt_diff, 2.5);
        assert_eq!(record.magcom_diff, 1.5);
        assert_eq!(record.maguncom_diff, 2.0);
        assert_eq!(record.location(), [3.0, 4.0]);
    }

    #[test]
    fn csv_export_suffixes_columns() {
        let data = sample();
        let record = CrossingRecord::between(&data.points()[0], &data.points()[1]);
        let crossings = LineCrossings::new(
            &data,
            10.0,
            PairGrouping::LinePair,
            vec![record],
            StageCounts::default(),
        );

        let mut out = Vec::new();
        crossings.write_csv(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "line_1,fidcount_1,easting_1,northing_1,gpsalt_1,magcom_1,maguncom_1,flag_1,\
             line_2,fidcount_2,easting_2,northing_2,gpsalt_2,magcom_2,maguncom_2,flag_2,\
             distance,gpsalt_diff,magcom_diff,maguncom_diff"
        );
        assert_eq!(
            lines.next().unwrap(),
            "A,3,0,0,60,100,110,x,B,9,3,4,57.5,101.5,108,y,5,2.5,1.5,2"
        );
    }

    #[test]
    fn display_lists_radius_filename_and_columns() {
        let data = sample();
        let record = CrossingRecord::between(&data.points()[0], &data.points()[1]);
        let crossings = LineCrossings::new(
            &data,
            10.0,
            PairGrouping::LinePair,
            vec![record],
            StageCounts::default(),
        );
        let text = crossings.to_string();
        assert!(text.starts_with("Max distance: 10\nFilename: survey.csv\n"));
        for column in ["gpsalt_diff", "magcom_diff", "maguncom_diff", "distance"] {
            assert!(text.contains(column));
        }
        assert_eq!(crossings.summary().crossings, 1);
    }
}
