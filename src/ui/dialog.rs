use std::path::PathBuf;

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

/// Ask the user for a CSV file. `None` when the dialog is cancelled.
pub fn pick_csv_file() -> Option<PathBuf> {
    let file = rfd::FileDialog::new()
        .set_title("Select TB-HIV CSV file")
        .add_filter("CSV files", &["csv"])
        .add_filter("All files", &["*"])
        .pick_file();

    match &file {
        Some(path) => log::info!("Selected {}", path.display()),
        None => log::info!("File dialog cancelled"),
    }
    file
}

/// Use `explicit` when given and non-empty, otherwise fall back to `pick`.
pub fn resolve_input(
    explicit: Option<PathBuf>,
    pick: impl FnOnce() -> Option<PathBuf>,
) -> Option<PathBuf> {
    explicit
        .filter(|p| !p.as_os_str().is_empty())
        .or_else(pick)
        .filter(|p| !p.as_os_str().is_empty())
}
