//! Missing-value and correlation report for tabular health-indicator data.
//!
//! The library half of `tb-correlate`: encoding-aware CSV loading,
//! zero imputation of numeric gaps, Pearson correlation before and after
//! imputation, and PNG heatmaps. The binary adds argument parsing, a file
//! picker and a results window on top of [`pipeline::run`].

pub mod analysis;
pub mod app;
pub mod color;
pub mod data;
pub mod error;
pub mod pipeline;
pub mod render;
pub mod state;
pub mod ui;

pub use error::{LoadError, RenderError};
pub use pipeline::{analyze, run, AnalysisOptions, AnalysisOutcome};
