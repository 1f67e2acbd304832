use std::path::PathBuf;

use thiserror::Error;

/// Terminal failures while loading the input table.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not determine proper encoding for {} (tried {}): {last_error}", path.display(), tried.join(", "))]
    EncodingExhausted {
        path: PathBuf,
        tried: Vec<&'static str>,
        last_error: String,
    },
}

/// Failures while drawing or writing a figure.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("bundled font could not be parsed")]
    Font(#[from] ab_glyph::InvalidFont),

    #[error("PNG encoding failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
