use crate::color::{FOREGROUND, MISSING, PRESENT};
use crate::data::model::Dataset;
use crate::error::RenderError;

use super::canvas::{Canvas, HAlign};
use super::{clip_label, PANEL_HEIGHT, PANEL_WIDTH};

const PAD: f64 = 16.0;
const TITLE_BAND: f64 = 48.0;
const ROW_AXIS: f64 = 40.0;
const LABEL_GAP: f64 = 6.0;
const MIN_GRID_HEIGHT: f64 = 200.0;

/// Render the null mask of each dataset as its own panel. Yellow marks a
/// missing cell; tall tables are binned so a bin with any gap shows yellow.
pub fn render_missing_map(panels: &[(&str, &Dataset)]) -> Result<Canvas, RenderError> {
    let probe = Canvas::new(1, 1)?;
    let n_cols = panels.iter().map(|(_, ds)| ds.columns.len()).max().unwrap_or(0).max(1);
    let grid_width = PANEL_WIDTH as f64 - 2.0 * PAD - ROW_AXIS;
    let cell_w = grid_width / n_cols as f64;
    let label_size = ((cell_w * 0.85) as f32).clamp(6.0, 12.0);
    let label_width = panels
        .iter()
        .flat_map(|(_, ds)| ds.columns.iter())
        .map(|c| probe.text_width(&clip_label(&c.name), label_size) as f64)
        .fold(0.0, f64::max);

    let fixed = TITLE_BAND + LABEL_GAP + label_width + PAD;
    let grid_height = (PANEL_HEIGHT as f64 - fixed).max(MIN_GRID_HEIGHT).floor();
    let height = (fixed + grid_height).ceil() as u32;

    let mut canvas = Canvas::new(PANEL_WIDTH * panels.len().max(1) as u32, height)?;
    for (k, (title, dataset)) in panels.iter().enumerate() {
        let x0 = (k as u32 * PANEL_WIDTH) as f64;
        let geometry = Grid {
            left: x0 + PAD + ROW_AXIS,
            top: TITLE_BAND,
            width: grid_width,
            height: grid_height,
            label_size,
        };
        canvas.draw_text(
            (x0 + PANEL_WIDTH as f64 / 2.0) as f32,
            (TITLE_BAND / 2.0) as f32,
            title,
            16.0,
            FOREGROUND,
            HAlign::Center,
        );
        draw_mask(&mut canvas, dataset, &geometry);
    }
    Ok(canvas)
}

struct Grid {
    left: f64,
    top: f64,
    width: f64,
    height: f64,
    label_size: f32,
}

fn draw_mask(canvas: &mut Canvas, dataset: &Dataset, grid: &Grid) {
    let rows = dataset.len();
    let n_cols = dataset.columns.len();
    if n_cols == 0 {
        return;
    }
    let cell_w = grid.width / n_cols as f64;
    let bins = (grid.height as usize).min(rows.max(1));
    let bin_h = grid.height / bins as f64;

    if rows > 0 {
        for (j, col) in dataset.columns.iter().enumerate() {
            for b in 0..bins {
                let start = b * rows / bins;
                let end = ((b + 1) * rows / bins).max(start + 1).min(rows);
                let any_missing = col.values[start..end].iter().any(|v| v.is_null());
                let color = if any_missing { MISSING } else { PRESENT };
                canvas.fill_rect(
                    grid.left + j as f64 * cell_w,
                    grid.top + b as f64 * bin_h,
                    cell_w,
                    bin_h,
                    color,
                );
            }
        }
    }
    canvas.stroke_rect(grid.left, grid.top, grid.width, grid.height, FOREGROUND);

    // first and last row index on the left edge
    let axis_x = (grid.left - LABEL_GAP) as f32;
    canvas.draw_text(axis_x, (grid.top + 6.0) as f32, "0", 11.0, FOREGROUND, HAlign::Right);
    if rows > 1 {
        canvas.draw_text(
            axis_x,
            (grid.top + grid.height - 6.0) as f32,
            &(rows - 1).to_string(),
            11.0,
            FOREGROUND,
            HAlign::Right,
        );
    }

    for (j, col) in dataset.columns.iter().enumerate() {
        canvas.draw_text_vertical(
            (grid.left + (j as f64 + 0.5) * cell_w) as f32,
            (grid.top + grid.height + LABEL_GAP) as f32,
            &clip_label(&col.name),
            grid.label_size,
            FOREGROUND,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Column, ColumnKind, FillScope, Value};

    #[test]
    fn gaps_show_in_original_but_not_after_fill() {
        let ds = Dataset::new(vec![
            Column {
                name: "a".into(),
                kind: ColumnKind::Float,
                values: vec![Value::Null, Value::Float(1.0)],
            },
            Column {
                name: "b".into(),
                kind: ColumnKind::Text,
                values: vec![Value::Null, Value::String("x".into())],
            },
        ]);
        let filled = ds.fill_missing(0.0, FillScope::All);

        let original = render_missing_map(&[("original", &ds)]).unwrap();
        let after = render_missing_map(&[("filled", &filled)]).unwrap();
        let count = |c: &Canvas| c.image().pixels().filter(|p| **p == MISSING).count();
        assert!(count(&original) > 0);
        assert_eq!(count(&after), 0);
    }
}
