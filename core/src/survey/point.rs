use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of one survey line.
///
/// Kept as the text found in the source table. Ordering is plain string
/// ordering and is only used to make tie-breaks deterministic.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineId(String);

impl LineId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LineId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for LineId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Column names every point carries, in export order.
pub const POINT_COLUMNS: [&str; 7] = [
    "line", "fidcount", "easting", "northing", "gpsalt", "magcom", "maguncom",
];

/// Optional acquisition-time column.
pub const UTCTIME_COLUMN: &str = "utctime";

/// One magnetometer reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplePoint {
    pub line: LineId,
    pub fidcount: i64,
    pub easting: f64,
    pub northing: f64,
    pub gpsalt: f64,
    pub magcom: f64,
    pub maguncom: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utctime: Option<f64>,
    /// Passthrough values, aligned with the owning dataset's column list.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra: Vec<String>,
}

impl SamplePoint {
    pub fn new(line: impl Into<LineId>, fidcount: i64, easting: f64, northing: f64) -> Self {
        Self {
            line: line.into(),
            fidcount,
            easting,
            northing,
            gpsalt: 0.0,
            magcom: 0.0,
            maguncom: 0.0,
            utctime: None,
            extra: Vec::new(),
        }
    }

    pub fn with_readings(mut self, gpsalt: f64, magcom: f64, maguncom: f64) -> Self {
        self.gpsalt = gpsalt;
        self.magcom = magcom;
        self.maguncom = maguncom;
        self
    }

    pub fn with_utctime(mut self, utctime: f64) -> Self {
        self.utctime = Some(utctime);
        self
    }

    pub fn coords(&self) -> [f64; 2] {
        [self.easting, self.northing]
    }

    pub fn has_finite_coords(&self) -> bool {
        self.easting.is_finite() && self.northing.is_finite()
    }

    pub fn distance_2(&self, other: &SamplePoint) -> f64 {
        let de = self.easting - other.easting;
        let dn = self.northing - other.northing;
        de * de + dn * dn
    }

    /// Planar Euclidean distance.
    pub fn distance(&self, other: &SamplePoint) -> f64 {
        self.distance_2(other).sqrt()
    }

    /// Cell values in [`POINT_COLUMNS`] order, then `utctime` when requested,
    /// then the passthrough values.
    pub(crate) fn field_values(&self, with_utctime: bool) -> Vec<String> {
        let mut fields = vec![
            self.line.to_string(),
            self.fidcount.to_string(),
            self.easting.to_string(),
            self.northing.to_string(),
            self.gpsalt.to_string(),
            self.magcom.to_string(),
            self.maguncom.to_string(),
        ];
        if with_utctime {
            fields.push(self.utctime.map(|t| t.to_string()).unwrap_or_default());
        }
        fields.extend(self.extra.iter().cloned());
        fields
    }
}

/// Header names matching [`SamplePoint::field_values`].
pub(crate) fn field_names(with_utctime: bool, extra: &[String]) -> Vec<String> {
    let mut names: Vec<String> = POINT_COLUMNS.iter().map(|c| c.to_string()).collect();
    if with_utctime {
        names.push(UTCTIME_COLUMN.to_string());
    }
    names.extend(extra.iter().cloned());
    names
}
