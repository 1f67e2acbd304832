use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

use tb_correlate::state::ViewerState;
use tb_correlate::ui::dialog::{pick_csv_file, resolve_input};
use tb_correlate::{app, run, AnalysisOptions};

/// TB-HIV Data Analysis Tool
#[derive(Debug, Parser)]
#[command(name = "tb-correlate", version, about)]
struct Cli {
    /// Path to the CSV file (opens a file picker when omitted)
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Output directory for results
    #[arg(short, long, default_value = ".")]
    output: PathBuf,

    /// Number of strongest correlations to print
    #[arg(long, default_value_t = 5)]
    top: usize,

    /// Do not open the results window
    #[arg(long)]
    no_show: bool,

    /// Also render the missing-value map
    #[arg(long)]
    missing_map: bool,
}

/// How a run that did not error ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Completed,
    NoInput,
}

impl From<Status> for ExitCode {
    fn from(status: Status) -> Self {
        match status {
            Status::Completed => ExitCode::SUCCESS,
            Status::NoInput => ExitCode::from(1),
        }
    }
}

fn main() -> ExitCode {
    env_logger::init();

    let cli = Cli::parse();
    match try_main(cli, app::show) {
        Ok(status) => status.into(),
        Err(e) => {
            log::error!("{e:#}");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// `display` opens the results window. Its failure is logged, not returned:
/// the report files are already on disk by then.
fn try_main(cli: Cli, display: impl FnOnce(ViewerState) -> Result<()>) -> Result<Status> {
    let file = resolve_input(cli.file, || {
        println!("No file path provided. Opening file selection dialog...");
        pick_csv_file()
    });
    let Some(file) = file else {
        println!("No file selected. Exiting.");
        return Ok(Status::NoInput);
    };

    let options = AnalysisOptions {
        output_dir: cli.output.clone(),
        top_pairs: cli.top,
        missing_map: cli.missing_map,
    };
    let outcome = run(&file, &options, &mut std::io::stdout().lock())?;

    println!("\nAnalysis complete!");
    println!("Results saved to: {}", cli.output.display());

    if !cli.no_show {
        if let Err(e) = display(ViewerState::from_outcome(file, cli.output, &outcome)) {
            log::warn!("could not open results window: {e:#}");
        }
    }
    Ok(Status::Completed)
}
