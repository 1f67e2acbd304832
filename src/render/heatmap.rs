use crate::analysis::correlation::CorrelationMatrix;
use crate::color::{DivergingScale, FOREGROUND};
use crate::error::RenderError;

use super::canvas::{Canvas, HAlign};
use super::{clip_label, PANEL_HEIGHT, PANEL_WIDTH};

/// Shown in place of a heatmap when correlation was skipped.
pub const PLACEHOLDER: &str = "Not enough numeric columns";

const PAD: f64 = 16.0;
const TITLE_BAND: f64 = 48.0;
const TITLE_SIZE: f32 = 16.0;
const LABEL_GAP: f64 = 6.0;
const MAX_LABEL_SIZE: f32 = 12.0;
const MAX_GRID: f64 = 560.0;
const COLORBAR_GAP: f64 = 14.0;
const COLORBAR_WIDTH: f64 = 16.0;
const COLORBAR_TICKS: f64 = 44.0;
const COLORBAR_MIN_HEIGHT: f64 = 120.0;
const TICKS: [f64; 5] = [1.0, 0.5, 0.0, -0.5, -1.0];

/// One half of the comparison figure.
pub struct Panel<'a> {
    pub title: &'a str,
    pub matrix: Option<&'a CorrelationMatrix>,
}

/// Geometry shared by every panel so the halves line up.
struct Layout {
    height: u32,
    cell: f64,
    label_size: f32,
    label_width: f64,
}

impl Layout {
    fn compute(probe: &Canvas, panels: &[Panel<'_>]) -> Layout {
        let labels: Vec<String> = panels
            .iter()
            .filter_map(|p| p.matrix)
            .flat_map(|m| m.columns.iter().map(|c| clip_label(c)))
            .collect();
        let n = panels
            .iter()
            .filter_map(|p| p.matrix)
            .map(|m| m.size())
            .max()
            .unwrap_or(0);
        if n == 0 {
            return Layout {
                height: PANEL_HEIGHT,
                cell: 0.0,
                label_size: MAX_LABEL_SIZE,
                label_width: 0.0,
            };
        }

        let widest = |size: f32| -> f64 {
            labels
                .iter()
                .map(|l| probe.text_width(l, size) as f64)
                .fold(0.0, f64::max)
        };
        let cell_for = |label_width: f64| -> f64 {
            let avail = PANEL_WIDTH as f64
                - 2.0 * PAD
                - label_width
                - LABEL_GAP
                - COLORBAR_GAP
                - COLORBAR_WIDTH
                - COLORBAR_TICKS;
            (avail.min(MAX_GRID) / n as f64).floor().max(2.0)
        };

        let mut label_size = MAX_LABEL_SIZE;
        let mut label_width = widest(label_size);
        let mut cell = cell_for(label_width);
        if cell < 14.0 {
            label_size = ((cell * 0.85) as f32).max(6.0);
            label_width = widest(label_size);
            cell = cell_for(label_width);
        }

        let needed = TITLE_BAND + cell * n as f64 + LABEL_GAP + label_width + PAD;
        Layout {
            height: (needed.ceil() as u32).max(PANEL_HEIGHT),
            cell,
            label_size,
            label_width,
        }
    }
}

/// Render panels side by side as annotated correlation heatmaps on a fixed
/// `[-1, 1]` colour scale.
pub fn render_comparison(panels: &[Panel<'_>]) -> Result<Canvas, RenderError> {
    let probe = Canvas::new(1, 1)?;
    let layout = Layout::compute(&probe, panels);
    let mut canvas = Canvas::new(PANEL_WIDTH * panels.len().max(1) as u32, layout.height)?;
    for (k, panel) in panels.iter().enumerate() {
        let x0 = (k as u32 * PANEL_WIDTH) as f64;
        draw_panel(&mut canvas, x0, panel, &layout);
    }
    Ok(canvas)
}

fn draw_panel(canvas: &mut Canvas, x0: f64, panel: &Panel<'_>, layout: &Layout) {
    let center_x = (x0 + PANEL_WIDTH as f64 / 2.0) as f32;
    canvas.draw_text(center_x, (TITLE_BAND / 2.0) as f32, panel.title, TITLE_SIZE, FOREGROUND, HAlign::Center);

    let Some(matrix) = panel.matrix else {
        canvas.draw_text(
            center_x,
            layout.height as f32 / 2.0,
            PLACEHOLDER,
            TITLE_SIZE,
            FOREGROUND,
            HAlign::Center,
        );
        return;
    };

    let scale = DivergingScale::default();
    let n = matrix.size();
    let cell = layout.cell;
    let left = x0 + PAD + layout.label_width + LABEL_GAP;
    let top = TITLE_BAND;
    let grid = cell * n as f64;
    let annotation_size = ((cell * 0.3) as f32).clamp(5.0, 14.0);

    for i in 0..n {
        for j in 0..n {
            let r = matrix.get(i, j);
            let (x, y) = (left + j as f64 * cell, top + i as f64 * cell);
            canvas.fill_rect(x, y, cell, cell, scale.color_for(r));
            if !r.is_nan() {
                canvas.draw_text(
                    (x + cell / 2.0) as f32,
                    (y + cell / 2.0) as f32,
                    &format!("{r:.2}"),
                    annotation_size,
                    scale.text_color_for(r),
                    HAlign::Center,
                );
            }
        }
    }

    for (i, name) in matrix.columns.iter().enumerate() {
        let label = clip_label(name);
        let mid = i as f64 * cell + cell / 2.0;
        canvas.draw_text(
            (left - LABEL_GAP) as f32,
            (top + mid) as f32,
            &label,
            layout.label_size,
            FOREGROUND,
            HAlign::Right,
        );
        canvas.draw_text_vertical(
            (left + mid) as f32,
            (top + grid + LABEL_GAP) as f32,
            &label,
            layout.label_size,
            FOREGROUND,
        );
    }

    draw_colorbar(canvas, left + grid + COLORBAR_GAP, top, grid.max(COLORBAR_MIN_HEIGHT), &scale);
}

/// Vertical gradient from `scale.max` (top) to `scale.min` (bottom) with ticks.
fn draw_colorbar(canvas: &mut Canvas, x: f64, top: f64, height: f64, scale: &DivergingScale) {
    let span = scale.max - scale.min;
    let rows = height.round() as i64;
    for dy in 0..rows {
        let value = scale.max - (dy as f64 + 0.5) / height * span;
        canvas.fill_rect(x, top + dy as f64, COLORBAR_WIDTH, 1.0, scale.color_for(value));
    }
    canvas.stroke_rect(x, top, COLORBAR_WIDTH, height, FOREGROUND);

    for tick in TICKS {
        let y = top + (scale.max - tick) / span * height;
        canvas.fill_rect(x + COLORBAR_WIDTH, y, 4.0, 1.0, FOREGROUND);
        canvas.draw_text(
            (x + COLORBAR_WIDTH + 7.0) as f32,
            y as f32,
            &format!("{tick:.1}"),
            11.0,
            FOREGROUND,
            HAlign::Left,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::correlation::correlation_matrix;
    use crate::data::model::{Column, ColumnKind, Dataset, Value};

    fn matrix(n_cols: usize) -> CorrelationMatrix {
        let columns = (0..n_cols)
            .map(|k| Column {
                name: format!("indicator_{k}"),
                kind: ColumnKind::Float,
                values: (0..6).map(|r| Value::Float(((r * (k + 1)) % 5) as f64)).collect(),
            })
            .collect();
        let ds = Dataset::new(columns);
        correlation_matrix(&ds, &ds.numeric_columns()).unwrap()
    }

    #[test]
    fn two_panels_side_by_side() {
        let m = matrix(3);
        let panels = [
            Panel { title: "before", matrix: Some(&m) },
            Panel { title: "after", matrix: Some(&m) },
        ];
        let canvas = render_comparison(&panels).unwrap();
        assert_eq!(canvas.width(), 2 * PANEL_WIDTH);
        assert!(canvas.height() >= PANEL_HEIGHT);
    }

    #[test]
    fn placeholder_panels_render() {
        let panels = [
            Panel { title: "before", matrix: None },
            Panel { title: "after", matrix: None },
        ];
        let canvas = render_comparison(&panels).unwrap();
        assert_eq!(canvas.height(), PANEL_HEIGHT);
        let inked = canvas.image().pixels().filter(|p| p.0[0] < 128).count();
        assert!(inked > 0);
    }

    #[test]
    fn many_columns_grow_the_figure() {
        let m = matrix(60);
        let panels = [Panel { title: "wide", matrix: Some(&m) }];
        let canvas = render_comparison(&panels).unwrap();
        assert_eq!(canvas.width(), PANEL_WIDTH);
        assert!(canvas.height() >= PANEL_HEIGHT);
    }
}
