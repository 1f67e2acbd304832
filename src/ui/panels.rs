use eframe::egui::{self, RichText, ScrollArea, Ui};

use crate::state::ViewerState;

// ---------------------------------------------------------------------------
// Left side panel – textual summary
// ---------------------------------------------------------------------------

/// Render the summary panel: strongest correlations and missing counts.
pub fn side_panel(ui: &mut Ui, state: &ViewerState) {
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading("Top correlations");
            ui.label("after imputation, by |r|");
            ui.separator();
            if let Some(note) = state.correlation_note() {
                ui.label(note);
            } else {
                egui::Grid::new("top_pairs")
                    .striped(true)
                    .show(ui, |ui: &mut Ui| {
                        for pair in &state.top_pairs {
                            ui.label(&pair.first);
                            ui.label(&pair.second);
                            ui.label(RichText::new(format!("{:.4}", pair.coefficient)).monospace());
                            ui.end_row();
                        }
                    });
            }

            ui.add_space(12.0);
            ui.heading("Missing values");
            ui.separator();
            if state.missing.is_empty() {
                ui.label("No numeric column has missing values.");
            } else {
                egui::Grid::new("missing_values")
                    .striped(true)
                    .show(ui, |ui: &mut Ui| {
                        ui.strong("Column");
                        ui.strong("Count");
                        ui.strong("%");
                        ui.end_row();
                        for entry in &state.missing {
                            ui.label(&entry.column);
                            ui.label(entry.count.to_string());
                            ui.label(format!("{:.2}", entry.percentage));
                            ui.end_row();
                        }
                    });
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut ViewerState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.label(format!("Source: {}", state.source.display()));

        ui.separator();

        ui.label(format!("Output: {}", state.output_dir.display()));

        ui.separator();

        if ui
            .selectable_label(state.fit_to_window, "Fit to window")
            .clicked()
        {
            state.toggle_fit();
        }
    });
}
