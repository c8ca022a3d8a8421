//! Plain CSV load/save for survey tables.
//!
//! Required headers are matched case-insensitively. Empty numeric cells are
//! read as NaN so that missing coordinates surface as a detector validation
//! error instead of being dropped here.

use crate::prelude::{SurveyError, SurveyResult};
use crate::survey::dataset::{MagData, SurveyMeta};
use crate::survey::point::{field_names, LineId, SamplePoint, POINT_COLUMNS, UTCTIME_COLUMN};
use csv::StringRecord;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

struct ColumnLayout {
    required: [usize; 7],
    utctime: Option<usize>,
    extra: Vec<(usize, String)>,
}

impl ColumnLayout {
    fn from_headers(headers: &StringRecord) -> SurveyResult<Self> {
        let find = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));

        let mut required = [0usize; 7];
        for (slot, name) in required.iter_mut().zip(POINT_COLUMNS) {
            *slot = find(name).ok_or(SurveyError::MissingColumn(name))?;
        }
        let utctime = find(UTCTIME_COLUMN);
        let extra = headers
            .iter()
            .enumerate()
            .filter(|(i, _)| !required.contains(i) && Some(*i) != utctime)
            .map(|(i, name)| (i, name.to_string()))
            .collect();

        Ok(Self {
            required,
            utctime,
            extra,
        })
    }

    fn extra_names(&self) -> Vec<String> {
        self.extra.iter().map(|(_, name)| name.clone()).collect()
    }

    fn parse(&self, row: usize, record: &StringRecord) -> SurveyResult<SamplePoint> {
        let cell = |i: usize| record.get(i).unwrap_or("");
        let number = |slot: usize| parse_float(row, POINT_COLUMNS[slot], cell(self.required[slot]));

        Ok(SamplePoint {
            line: LineId::new(cell(self.required[0])),
            fidcount: parse_fidcount(row, cell(self.required[1]))?,
            easting: number(2)?,
            northing: number(3)?,
            gpsalt: number(4)?,
            magcom: number(5)?,
            maguncom: number(6)?,
            utctime: match self.utctime.map(cell) {
                Some(text) if !text.is_empty() => Some(parse_float(row, UTCTIME_COLUMN, text)?),
                _ => None,
            },
            extra: self.extra.iter().map(|(i, _)| cell(*i).to_string()).collect(),
        })
    }
}

fn parse_float(row: usize, column: &'static str, text: &str) -> SurveyResult<f64> {
    if text.is_empty() {
        return Ok(f64::NAN);
    }
    text.parse().map_err(|_| SurveyError::InvalidValue {
        row,
        column,
        value: text.to_string(),
    })
}

fn parse_fidcount(row: usize, text: &str) -> SurveyResult<i64> {
    if let Ok(value) = text.parse::<i64>() {
        return Ok(value);
    }
    // Spreadsheet exports often write integer columns as `12.0`.
    match text.parse::<f64>() {
        Ok(value) if value.is_finite() && value.fract() == 0.0 => Ok(value as i64),
        _ => Err(SurveyError::InvalidValue {
            row,
            column: "fidcount",
            value: text.to_string(),
        }),
    }
}

impl MagData {
    /// Reads a CSV file and records its file name in the metadata.
    pub fn load<P: AsRef<Path>>(path: P) -> SurveyResult<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let mut data = Self::from_csv_reader(BufReader::new(file))?;
        data.meta_mut().filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned());
        Ok(data)
    }

    pub fn from_csv_reader<R: Read>(reader: R) -> SurveyResult<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let layout = ColumnLayout::from_headers(csv_reader.headers()?)?;

        let mut points = Vec::new();
        for (row, record) in csv_reader.records().enumerate() {
            points.push(layout.parse(row, &record?)?);
        }
        log::debug!("read {} survey points", points.len());

        MagData::from_parts(points, layout.extra_names(), SurveyMeta::default())
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> SurveyResult<()> {
        let file = File::create(path.as_ref())?;
        self.write_csv(BufWriter::new(file))
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> SurveyResult<()> {
        let with_utctime = self.points().iter().any(|p| p.utctime.is_some());
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(field_names(with_utctime, self.columns()))?;
        for point in self.points() {
            csv_writer.write_record(point.field_values(with_utctime))?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}
