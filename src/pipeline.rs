use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::analysis::correlation::{correlation_matrix, CorrelationMatrix, CorrelationPair, PairTable};
use crate::analysis::missing::{missing_report, MissingReport};
use crate::data::inspect::inspect;
use crate::data::loader::load_csv;
use crate::data::model::{Dataset, FillScope};
use crate::render::heatmap::{render_comparison, Panel};
use crate::render::missing_map::render_missing_map;

pub const HEATMAP_FILE: &str = "heatmap_comparison.png";
pub const REPORT_FILE: &str = "missing_values_report.csv";
pub const MISSING_MAP_FILE: &str = "missing_values_map.png";

/// Constant written into missing numeric cells.
pub const FILL_VALUE: f64 = 0.0;

/// Knobs for one analysis run.
#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    pub output_dir: PathBuf,
    /// How many of the strongest correlations to print.
    pub top_pairs: usize,
    /// Also render the null-mask figure.
    pub missing_map: bool,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            top_pairs: 5,
            missing_map: false,
        }
    }
}

/// Everything a run produced, for callers that want more than the console text.
#[derive(Debug)]
pub struct AnalysisOutcome {
    /// Copy of the input with numeric gaps filled.
    pub imputed: Dataset,
    /// Missing counts over every numeric column.
    pub numeric_missing: MissingReport,
    /// Missing counts over text/boolean columns (never filled).
    pub non_numeric_missing: MissingReport,
    pub before: Option<CorrelationMatrix>,
    pub after: Option<CorrelationMatrix>,
    pub top_pairs: Vec<CorrelationPair>,
    pub heatmap_path: PathBuf,
    /// Encoded PNG, identical to the file at `heatmap_path`.
    pub heatmap_png: Vec<u8>,
    pub report_path: PathBuf,
    pub missing_map_path: Option<PathBuf>,
}

/// Load `path` and run [`analyze`] on it, writing console text to `out`.
///
/// The output directory is created before the input is read, so it exists
/// even when loading fails.
pub fn run(path: &Path, options: &AnalysisOptions, out: &mut impl Write) -> Result<AnalysisOutcome> {
    ensure_output_dir(&options.output_dir)?;
    writeln!(out, "Loading data from: {}", path.display())?;
    let table = load_csv(path).with_context(|| format!("loading {}", path.display()))?;
    writeln!(out, "Loaded with {} encoding", table.encoding.name())?;
    analyze(&table.dataset, options, out)
}

fn ensure_output_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))
}

/// Inspect, impute, correlate, render and report on an already loaded table.
pub fn analyze(
    dataset: &Dataset,
    options: &AnalysisOptions,
    out: &mut impl Write,
) -> Result<AnalysisOutcome> {
    ensure_output_dir(&options.output_dir)?;

    let inspection = inspect(dataset);
    writeln!(out, "\n{inspection}")?;
    let numeric = inspection.numeric.clone();
    let non_numeric = inspection.non_numeric.clone();

    // ---- Missing values (numeric) ----
    let numeric_missing = missing_report(dataset, &numeric);
    writeln!(out, "\n=== Missing Values in Numeric Columns ===")?;
    writeln!(out, "Original missing values:")?;
    writeln!(out, "{}", numeric_missing.counts())?;

    let imputed = dataset.fill_missing(FILL_VALUE, FillScope::NumericOnly);
    log::debug!(
        "filled {} numeric cells with {FILL_VALUE}",
        numeric_missing.total_missing()
    );

    // ---- Correlation heatmaps ----
    let before = correlation_matrix(dataset, &numeric);
    let after = correlation_matrix(&imputed, &numeric);
    let panels = [
        Panel {
            title: "Correlation (With Original Missing Values)",
            matrix: before.as_ref(),
        },
        Panel {
            title: "Correlation (Numeric Missing Values -> 0)",
            matrix: after.as_ref(),
        },
    ];
    let heatmap_path = options.output_dir.join(HEATMAP_FILE);
    let heatmap_png = render_comparison(&panels)?
        .save_png(&heatmap_path)
        .context("saving heatmap")?;
    writeln!(out, "Heatmap saved to: {}", heatmap_path.display())?;

    // ---- Missing value report ----
    let filtered = numeric_missing.with_missing();
    writeln!(out, "\n=== Missing Value Report ===")?;
    writeln!(out, "{filtered}")?;
    let report_path = options.output_dir.join(REPORT_FILE);
    filtered.write_csv(&report_path)?;
    writeln!(out, "Missing values report saved to: {}", report_path.display())?;

    // ---- Strongest correlations ----
    let top_pairs = after
        .as_ref()
        .map(|m| m.top_pairs(options.top_pairs))
        .unwrap_or_default();
    if after.is_some() {
        writeln!(out, "\n=== Top Correlations After Imputation ===")?;
        writeln!(out, "{}", PairTable(&top_pairs))?;
    }

    // ---- Non-numeric gaps (reported only) ----
    let non_numeric_missing = missing_report(dataset, &non_numeric);
    if !non_numeric.is_empty() {
        writeln!(out, "\n=== Non-Numeric Missing Values (Not Imputed) ===")?;
        writeln!(out, "{}", non_numeric_missing.counts())?;
    }

    // ---- Optional null-mask figure ----
    let missing_map_path = if options.missing_map {
        let filled_all = dataset.fill_missing(FILL_VALUE, FillScope::All);
        let path = options.output_dir.join(MISSING_MAP_FILE);
        render_missing_map(&[
            ("Missing Values (Original)", dataset),
            ("After Filling NaN with 0", &filled_all),
        ])?
        .save_png(&path)
        .context("saving missing-value map")?;
        writeln!(out, "Missing-value map saved to: {}", path.display())?;
        Some(path)
    } else {
        None
    };

    Ok(AnalysisOutcome {
        imputed,
        numeric_missing,
        non_numeric_missing,
        before,
        after,
        top_pairs,
        heatmap_path,
        heatmap_png,
        report_path,
        missing_map_path,
    })
}
