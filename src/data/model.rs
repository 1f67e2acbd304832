use std::fmt;

// ---------------------------------------------------------------------------
// Value – a single cell
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring common Pandas dtypes.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{s}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v:.4}"),
            Value::Bool(b) => write!(f, "{}", if *b { "True" } else { "False" }),
            Value::Null => write!(f, "NaN"),
        }
    }
}

impl Value {
    /// Interpret the value as an `f64`, `None` for missing or non-numeric cells.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

// ---------------------------------------------------------------------------
// Column
// ---------------------------------------------------------------------------

/// Inferred storage kind of a column, decided once at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Integer,
    Float,
    Bool,
    Text,
}

impl ColumnKind {
    pub fn is_numeric(self) -> bool {
        matches!(self, ColumnKind::Integer | ColumnKind::Float)
    }

    /// Dtype label in the notation analysts know from Pandas.
    pub fn dtype_name(self) -> &'static str {
        match self {
            ColumnKind::Integer => "int64",
            ColumnKind::Float => "float64",
            ColumnKind::Bool => "bool",
            ColumnKind::Text => "object",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
    pub values: Vec<Value>,
}

impl Column {
    pub fn null_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_null()).count()
    }

    /// Numeric view of the column; missing cells become `None`.
    pub fn as_f64_vec(&self) -> Vec<Option<f64>> {
        self.values.iter().map(Value::as_f64).collect()
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// Which columns a fill operation touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillScope {
    /// Only integer/float columns; text and boolean gaps stay missing.
    NumericOnly,
    /// Every column. Text columns receive the fill value as a string.
    All,
}

/// Column-oriented table. Transformations return a new `Dataset`.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub columns: Vec<Column>,
    n_rows: usize,
}

impl Dataset {
    /// Build a dataset from columns that all share the same length.
    pub fn new(columns: Vec<Column>) -> Self {
        let n_rows = columns.first().map(|c| c.values.len()).unwrap_or(0);
        debug_assert!(columns.iter().all(|c| c.values.len() == n_rows));
        Dataset { columns, n_rows }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.n_rows
    }

    /// Whether the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.n_rows == 0
    }

    /// `(rows, columns)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.n_rows, self.columns.len())
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn numeric_columns(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| c.kind.is_numeric())
            .map(|c| c.name.clone())
            .collect()
    }

    pub fn non_numeric_columns(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| !c.kind.is_numeric())
            .map(|c| c.name.clone())
            .collect()
    }

    /// Copy of the dataset with missing cells replaced by `value`.
    ///
    /// Numeric columns receive `Value::Float(value)`; under
    /// [`FillScope::All`] text and boolean columns receive the value rendered
    /// as a string.
    pub fn fill_missing(&self, value: f64, scope: FillScope) -> Dataset {
        let columns = self
            .columns
            .iter()
            .map(|col| {
                let replacement = if col.kind.is_numeric() {
                    Some(Value::Float(value))
                } else if scope == FillScope::All {
                    Some(Value::String(format_fill(value)))
                } else {
                    None
                };
                let values = match replacement {
                    Some(fill) => col
                        .values
                        .iter()
                        .map(|v| if v.is_null() { fill.clone() } else { v.clone() })
                        .collect(),
                    None => col.values.clone(),
                };
                Column {
                    name: col.name.clone(),
                    kind: col.kind,
                    values,
                }
            })
            .collect();
        Dataset::new(columns)
    }

    /// First `n` rows for display.
    pub fn head(&self, n: usize) -> Preview<'_> {
        Preview {
            dataset: self,
            rows: n.min(self.n_rows),
        }
    }
}

fn format_fill(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

// ---------------------------------------------------------------------------
// Preview – aligned text rendering of the first rows
// ---------------------------------------------------------------------------

/// Borrowed view printing the leading rows as an aligned table.
pub struct Preview<'a> {
    dataset: &'a Dataset,
    rows: usize,
}

const MAX_CELL_WIDTH: usize = 24;

fn clip(s: String) -> String {
    if s.chars().count() > MAX_CELL_WIDTH {
        let mut out: String = s.chars().take(MAX_CELL_WIDTH - 3).collect();
        out.push_str("...");
        out
    } else {
        s
    }
}

impl fmt::Display for Preview<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let index_width = self.rows.saturating_sub(1).to_string().len();
        let cells: Vec<Vec<String>> = self
            .dataset
            .columns
            .iter()
            .map(|col| {
                std::iter::once(clip(col.name.clone()))
                    .chain(col.values[..self.rows].iter().map(|v| clip(v.to_string())))
                    .collect()
            })
            .collect();
        let widths: Vec<usize> = cells
            .iter()
            .map(|c| c.iter().map(|s| s.chars().count()).max().unwrap_or(0))
            .collect();

        for line in 0..=self.rows {
            if line == 0 {
                write!(f, "{:index_width$}", "")?;
            } else {
                write!(f, "{:<index_width$}", line - 1)?;
            }
            for (col, &width) in cells.iter().zip(&widths) {
                write!(f, "  {:>width$}", col[line])?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dataset {
        Dataset::new(vec![
            Column {
                name: "a".into(),
                kind: ColumnKind::Float,
                values: vec![Value::Float(1.0), Value::Null, Value::Float(3.0)],
            },
            Column {
                name: "country".into(),
                kind: ColumnKind::Text,
                values: vec![
                    Value::String("Chad".into()),
                    Value::Null,
                    Value::String("Peru".into()),
                ],
            },
        ])
    }

    #[test]
    fn numeric_only_fill_leaves_text_gaps() {
        let ds = sample();
        let filled = ds.fill_missing(0.0, FillScope::NumericOnly);

        assert_eq!(filled.column("a").unwrap().values[1], Value::Float(0.0));
        assert_eq!(filled.column("country").unwrap().values[1], Value::Null);
        // source untouched
        assert_eq!(ds.column("a").unwrap().values[1], Value::Null);
    }

    #[test]
    fn global_fill_writes_zero_into_text() {
        let filled = sample().fill_missing(0.0, FillScope::All);
        assert_eq!(
            filled.column("country").unwrap().values[1],
            Value::String("0".into())
        );
        assert!(filled.columns.iter().all(|c| c.null_count() == 0));
    }

    #[test]
    fn preview_is_limited_to_available_rows() {
        let ds = sample();
        let text = ds.head(10).to_string();
        assert_eq!(text.lines().count(), 4);
        assert!(text.contains("Chad"));
        assert!(text.contains("NaN"));
    }

    #[test]
    fn column_partition() {
        let ds = sample();
        assert_eq!(ds.numeric_columns(), vec!["a".to_string()]);
        assert_eq!(ds.non_numeric_columns(), vec!["country".to_string()]);
        assert_eq!(ds.shape(), (3, 2));
    }
}
