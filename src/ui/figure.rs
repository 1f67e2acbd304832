use eframe::egui::{self, ScrollArea, Ui};

use crate::state::ViewerState;

// ---------------------------------------------------------------------------
// Central figure
// ---------------------------------------------------------------------------

/// Render the saved heatmap PNG in the central panel.
pub fn heatmap_figure(ui: &mut Ui, state: &ViewerState) {
    let image = egui::Image::from_bytes(state.figure_uri.clone(), state.figure.clone());

    if state.fit_to_window {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.add(image.shrink_to_fit());
        });
    } else {
        ScrollArea::both()
            .auto_shrink([false, false])
            .show(ui, |ui: &mut Ui| {
                ui.add(image.fit_to_original_size(1.0));
            });
    }
}
