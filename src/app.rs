use anyhow::{anyhow, Result};
use eframe::egui;

use crate::state::ViewerState;
use crate::ui::{figure, panels};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct ViewerApp {
    pub state: ViewerState,
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: source + view toggle ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: textual summary ----
        egui::SidePanel::left("summary_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &self.state);
            });

        // ---- Central panel: heatmap figure ----
        egui::CentralPanel::default().show(ctx, |ui| {
            figure::heatmap_figure(ui, &self.state);
        });
    }
}

/// Open the results window and block until it is closed.
pub fn show(state: ViewerState) -> Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "TB-HIV Correlation Heatmaps",
        options,
        Box::new(move |cc| {
            // PNG loader for Image::from_bytes
            egui_extras::install_image_loaders(&cc.egui_ctx);
            Ok(Box::new(ViewerApp { state }))
        }),
    )
    .map_err(|e| anyhow!("viewer window failed: {e}"))
}
