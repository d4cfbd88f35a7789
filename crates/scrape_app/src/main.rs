//! Batch converter for scrape artifacts: `scrape_app <json|csv> FILE...`.
mod settings;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use engine_logging::{engine_warn, LogDestination};
use log::LevelFilter;
use scrape_engine::{convert_files, ConversionReport, Mime};

const USAGE: &str = "usage: scrape_app <json|csv> FILE...";

fn main() -> ExitCode {
    engine_logging::initialize(LogDestination::Terminal, LevelFilter::Info);

    let mut args = std::env::args().skip(1);
    let Some(target) = args.next() else {
        eprintln!("{USAGE}");
        return ExitCode::from(2);
    };
    let target: Mime = match target.parse() {
        Ok(mime) => mime,
        Err(err) => {
            eprintln!("{err}\n{USAGE}");
            return ExitCode::from(2);
        }
    };
    let sources: Vec<PathBuf> = args.map(PathBuf::from).collect();
    if sources.is_empty() {
        eprintln!("{USAGE}");
        return ExitCode::from(2);
    }
    for missing in sources.iter().filter(|p| !p.exists()) {
        engine_warn!("Source {:?} does not exist", missing);
    }

    let settings = settings::load_settings(Path::new("."));
    let report = convert_files(&sources, target, &settings.convert_options());
    print_report(&report);

    if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn print_report(report: &ConversionReport) {
    for (source, output) in report.succeeded() {
        println!("{} -> {}", source.display(), output.display());
    }
    for (source, err) in report.failed() {
        eprintln!("{}: {}", source.display(), err);
    }
    println!(
        "{} converted, {} failed",
        report.succeeded().count(),
        report.failed().count()
    );
}
