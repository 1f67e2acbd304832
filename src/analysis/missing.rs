use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::data::model::Dataset;

// ---------------------------------------------------------------------------
// Missing-value report
// ---------------------------------------------------------------------------

/// Missing-cell statistics for one column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissingEntry {
    #[serde(rename = "Column")]
    pub column: String,
    #[serde(rename = "Missing Count")]
    pub count: usize,
    #[serde(rename = "Percentage (%)")]
    pub percentage: f64,
}

/// Per-column missing counts over a fixed set of columns, in column order.
#[derive(Debug, Clone, PartialEq)]
pub struct MissingReport {
    pub entries: Vec<MissingEntry>,
}

/// Count missing cells in each of `columns`. Unknown names are ignored.
pub fn missing_report(dataset: &Dataset, columns: &[String]) -> MissingReport {
    let rows = dataset.len();
    let entries = columns
        .iter()
        .filter_map(|name| dataset.column(name))
        .map(|col| {
            let count = col.null_count();
            MissingEntry {
                column: col.name.clone(),
                count,
                percentage: percentage(count, rows),
            }
        })
        .collect();
    MissingReport { entries }
}

/// `count / rows * 100`, rounded to two decimals with ties going to the even
/// digit (so 0.125 becomes 0.12). An empty table is 0%.
fn percentage(count: usize, rows: usize) -> f64 {
    if rows == 0 {
        return 0.0;
    }
    (count as f64 / rows as f64 * 100.0 * 100.0).round_ties_even() / 100.0
}

impl MissingReport {
    /// Only the columns with at least one missing cell.
    pub fn with_missing(&self) -> MissingReport {
        MissingReport {
            entries: self.entries.iter().filter(|e| e.count > 0).cloned().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_missing(&self) -> usize {
        self.entries.iter().map(|e| e.count).sum()
    }

    /// Write the report as CSV (`Column,Missing Count,Percentage (%)`).
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)
            .with_context(|| format!("creating {}", path.display()))?;
        if self.entries.is_empty() {
            writer.write_record(["Column", "Missing Count", "Percentage (%)"])?;
        }
        for entry in &self.entries {
            writer.serialize(entry).context("writing report row")?;
        }
        writer.flush().context("flushing report")?;
        log::info!("Missing values report saved to: {}", path.display());
        Ok(())
    }

    /// Two-column listing of counts only, like a plain `isnull().sum()`.
    pub fn counts(&self) -> Counts<'_> {
        Counts(self)
    }
}

impl fmt::Display for MissingReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.entries.is_empty() {
            return write!(f, "(no missing values)");
        }
        let width = name_width(self).max("Column".len());
        write!(f, "{:<width$}  {:>13}  {:>14}", "Column", "Missing Count", "Percentage (%)")?;
        for e in &self.entries {
            write!(f, "\n{:<width$}  {:>13}  {:>14.2}", e.column, e.count, e.percentage)?;
        }
        Ok(())
    }
}

pub struct Counts<'a>(&'a MissingReport);

impl fmt::Display for Counts<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = name_width(self.0);
        for (i, e) in self.0.entries.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{:<width$}  {}", e.column, e.count)?;
        }
        Ok(())
    }
}

fn name_width(report: &MissingReport) -> usize {
    report
        .entries
        .iter()
        .map(|e| e.column.chars().count())
        .max()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Column, ColumnKind, Value};

    fn dataset() -> Dataset {
        Dataset::new(vec![
            Column {
                name: "a".into(),
                kind: ColumnKind::Float,
                values: vec![Value::Null, Value::Float(2.0), Value::Float(3.0)],
            },
            Column {
                name: "b".into(),
                kind: ColumnKind::Integer,
                values: vec![Value::Integer(1), Value::Integer(2), Value::Integer(3)],
            },
            Column {
                name: "note".into(),
                kind: ColumnKind::Text,
                values: vec![Value::Null, Value::Null, Value::String("x".into())],
            },
        ])
    }

    #[test]
    fn percentages_round_to_two_decimals() {
        let ds = dataset();
        let report = missing_report(&ds, &ds.numeric_columns());
        assert_eq!(report.entries.len(), 2);
        assert_eq!(report.entries[0].count, 1);
        assert_eq!(report.entries[0].percentage, 33.33);
        assert_eq!(report.entries[1].percentage, 0.0);
    }

    #[test]
    fn filtered_view_keeps_only_gaps() {
        let ds = dataset();
        let filtered = missing_report(&ds, &ds.numeric_columns()).with_missing();
        let names: Vec<_> = filtered.entries.iter().map(|e| e.column.as_str()).collect();
        assert_eq!(names, vec!["a"]);
    }

    #[test]
    fn empty_table_reports_zero_percent() {
        assert_eq!(percentage(0, 0), 0.0);
        assert_eq!(percentage(2, 3), 66.67);
    }

    #[test]
    fn exact_halves_round_to_even() {
        // 1/800 = 0.125%, 3/800 = 0.375%
        assert_eq!(percentage(1, 800), 0.12);
        assert_eq!(percentage(3, 800), 0.38);
    }

    #[test]
    fn csv_has_expected_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.csv");
        let ds = dataset();
        missing_report(&ds, &ds.numeric_columns())
            .with_missing()
            .write_csv(&path)
            .unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "Column,Missing Count,Percentage (%)\na,1,33.33\n");
    }

    #[test]
    fn csv_without_rows_still_has_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.csv");
        MissingReport { entries: vec![] }.write_csv(&path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "Column,Missing Count,Percentage (%)\n");
    }
}
