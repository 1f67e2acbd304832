use std::path::PathBuf;

use eframe::egui::load::Bytes;

use crate::analysis::correlation::CorrelationPair;
use crate::analysis::missing::MissingEntry;
use crate::pipeline::AnalysisOutcome;

// ---------------------------------------------------------------------------
// Viewer state
// ---------------------------------------------------------------------------

/// Everything the results window shows, independent of rendering.
pub struct ViewerState {
    /// Input file the figure was computed from.
    pub source: PathBuf,

    /// Encoded heatmap PNG and the URI egui caches it under.
    pub figure: Bytes,
    pub figure_uri: String,

    /// Strongest correlations after imputation.
    pub top_pairs: Vec<CorrelationPair>,

    /// False when there were fewer than two numeric columns to correlate.
    pub has_correlation: bool,

    /// Numeric columns with at least one gap.
    pub missing: Vec<MissingEntry>,

    /// Where the report files were written.
    pub output_dir: PathBuf,

    /// Scale the figure down to the window instead of showing it 1:1.
    pub fit_to_window: bool,
}

impl ViewerState {
    pub fn from_outcome(source: PathBuf, output_dir: PathBuf, outcome: &AnalysisOutcome) -> Self {
        Self {
            source,
            figure: Bytes::from(outcome.heatmap_png.clone()),
            figure_uri: format!("bytes://{}", outcome.heatmap_path.display()),
            top_pairs: outcome.top_pairs.clone(),
            has_correlation: outcome.after.is_some(),
            missing: outcome.numeric_missing.with_missing().entries,
            output_dir,
            fit_to_window: true,
        }
    }

    pub fn toggle_fit(&mut self) {
        self.fit_to_window = !self.fit_to_window;
    }

    /// Message shown in place of the top-pairs table, if it is empty.
    pub fn correlation_note(&self) -> Option<&'static str> {
        if !self.has_correlation {
            Some("Not enough numeric columns.")
        } else if self.top_pairs.is_empty() {
            Some("No defined correlations (constant columns).")
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Column, ColumnKind, Dataset, Value};
    use crate::pipeline::{analyze, AnalysisOptions};

    fn column(name: &str, values: &[f64]) -> Column {
        Column {
            name: name.into(),
            kind: ColumnKind::Float,
            values: values.iter().copied().map(Value::Float).collect(),
        }
    }

    fn state_for(dataset: &Dataset) -> ViewerState {
        let dir = tempfile::tempdir().unwrap();
        let options = AnalysisOptions {
            output_dir: dir.path().to_path_buf(),
            ..Default::default()
        };
        let outcome = analyze(dataset, &options, &mut std::io::sink()).unwrap();
        ViewerState::from_outcome("in.csv".into(), dir.path().to_path_buf(), &outcome)
    }

    #[test]
    fn constant_columns_are_not_reported_as_too_few() {
        let ds = Dataset::new(vec![column("a", &[1.0, 1.0, 1.0]), column("b", &[2.0, 2.0, 2.0])]);
        let state = state_for(&ds);
        assert!(state.top_pairs.is_empty());
        assert_eq!(
            state.correlation_note(),
            Some("No defined correlations (constant columns).")
        );
    }

    #[test]
    fn single_numeric_column_has_no_matrix() {
        let state = state_for(&Dataset::new(vec![column("a", &[1.0, 2.0])]));
        assert_eq!(state.correlation_note(), Some("Not enough numeric columns."));
    }

    #[test]
    fn defined_pairs_need_no_note() {
        let ds = Dataset::new(vec![column("a", &[1.0, 2.0, 3.0]), column("b", &[2.0, 4.0, 7.0])]);
        let state = state_for(&ds);
        assert_eq!(state.top_pairs.len(), 1);
        assert_eq!(state.correlation_note(), None);
    }
}
