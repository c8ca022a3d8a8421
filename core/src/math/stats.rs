use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Descriptive statistics of one column. NaN inputs are skipped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (n - 1 denominator).
    pub std: f64,
    pub min: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub max: f64,
}

impl Summary {
    fn empty() -> Self {
        Self {
            count: 0,
            mean: f64::NAN,
            std: f64::NAN,
            min: f64::NAN,
            p25: f64::NAN,
            p50: f64::NAN,
            p75: f64::NAN,
            max: f64::NAN,
        }
    }
}

pub struct StatsHelper;

impl StatsHelper {
    pub fn describe(values: impl IntoIterator<Item = f64>) -> Summary {
        let mut sorted: Vec<f64> = values.into_iter().filter(|v| !v.is_nan()).collect();
        if sorted.is_empty() {
            return Summary::empty();
        }
        sorted.sort_by(f64::total_cmp);

        let count = sorted.len();
        let mean = sorted.iter().sum::<f64>() / count as f64;
        let std = if count > 1 {
            let ss: f64 = sorted.iter().map(|v| (v - mean) * (v - mean)).sum();
            (ss / (count - 1) as f64).sqrt()
        } else {
            f64::NAN
        };

        Summary {
            count,
            mean,
            std,
            min: sorted[0],
            p25: Self::quantile_sorted(&sorted, 0.25),
            p50: Self::quantile_sorted(&sorted, 0.5),
            p75: Self::quantile_sorted(&sorted, 0.75),
            max: sorted[count - 1],
        }
    }

    /// Linear interpolation between closest ranks; `sorted` must be ascending.
    pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
        if sorted.is_empty() {
            return f64::NAN;
        }
        let position = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
        let lower = position.floor() as usize;
        let upper = position.ceil() as usize;
        let fraction = position - lower as f64;
        sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
    }

    /// Renders one row per column, `describe().T` style.
    pub fn describe_table(rows: &[(&str, Summary)]) -> String {
        let width = rows.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
        let mut table = format!(
            "{:width$} {:>8} {:>12} {:>12} {:>12} {:>12} {:>12} {:>12} {:>12}\n",
            "", "count", "mean", "std", "min", "25%", "50%", "75%", "max"
        );
        for (name, s) in rows {
            let _ = writeln!(
                table,
                "{:width$} {:>8} {:>12.4} {:>12.4} {:>12.4} {:>12.4} {:>12.4} {:>12.4} {:>12.4}",
                name, s.count, s.mean, s.std, s.min, s.p25, s.p50, s.p75, s.max
            );
        }
        table
    }
}
