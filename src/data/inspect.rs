use std::fmt;

use super::model::Dataset;

/// Rows shown in the preview section.
pub const PREVIEW_ROWS: usize = 3;

/// Read-only description of a freshly loaded table.
pub struct Inspection<'a> {
    dataset: &'a Dataset,
    pub numeric: Vec<String>,
    pub non_numeric: Vec<String>,
}

/// Classify columns by kind. Numeric columns are fixed here and reused downstream.
pub fn inspect(dataset: &Dataset) -> Inspection<'_> {
    Inspection {
        dataset,
        numeric: dataset.numeric_columns(),
        non_numeric: dataset.non_numeric_columns(),
    }
}

impl fmt::Display for Inspection<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (rows, cols) = self.dataset.shape();
        writeln!(f, "=== Dataset Info ===")?;
        writeln!(f, "Shape: ({rows}, {cols})")?;
        writeln!(f)?;
        writeln!(f, "Data Types:")?;
        let width = self
            .dataset
            .columns
            .iter()
            .map(|c| c.name.chars().count())
            .max()
            .unwrap_or(0);
        for col in &self.dataset.columns {
            writeln!(f, "{:<width$}  {}", col.name, col.kind.dtype_name())?;
        }
        writeln!(f)?;
        writeln!(f, "First {PREVIEW_ROWS} rows:")?;
        write!(f, "{}", self.dataset.head(PREVIEW_ROWS))?;
        writeln!(f)?;
        writeln!(f, "Numeric columns: {:?}", self.numeric)?;
        write!(f, "Non-numeric columns: {:?}", self.non_numeric)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Column, ColumnKind, Value};

    #[test]
    fn splits_numeric_and_prints_dtypes() {
        let ds = Dataset::new(vec![
            Column {
                name: "iso3".into(),
                kind: ColumnKind::Text,
                values: vec![Value::String("TCD".into())],
            },
            Column {
                name: "e_pop_num".into(),
                kind: ColumnKind::Integer,
                values: vec![Value::Integer(17_000_000)],
            },
        ]);
        let inspection = inspect(&ds);
        assert_eq!(inspection.numeric, vec!["e_pop_num"]);
        assert_eq!(inspection.non_numeric, vec!["iso3"]);

        let text = inspection.to_string();
        assert!(text.contains("Shape: (1, 2)"));
        assert!(text.contains("e_pop_num  int64"));
        assert!(text.contains("iso3       object"));
    }
}
