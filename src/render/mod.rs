/// Figure rendering: rasterised PNG output for the analysis results.
///
/// ```text
///   CorrelationMatrix ×2 ──► heatmap      ──┐
///                                           ├──► Canvas ──► PNG bytes ──► file / viewer
///   Dataset (+ filled)   ──► missing_map  ──┘
/// ```

pub mod canvas;
pub mod heatmap;
pub mod missing_map;

/// Width of one figure panel in pixels.
pub const PANEL_WIDTH: u32 = 800;
/// Minimum figure height in pixels.
pub const PANEL_HEIGHT: u32 = 600;

const MAX_LABEL_CHARS: usize = 28;

/// Shorten long column names for axis labels.
pub(crate) fn clip_label(name: &str) -> String {
    if name.chars().count() > MAX_LABEL_CHARS {
        let mut out: String = name.chars().take(MAX_LABEL_CHARS - 3).collect();
        out.push_str("...");
        out
    } else {
        name.to_string()
    }
}
