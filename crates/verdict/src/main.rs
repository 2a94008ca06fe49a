use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};
use verdict::{ErrorReport, VerdictError};

mod commands;
mod console;

#[derive(Parser)]
#[command(name = "verdict")]
#[command(about = "Verdict - Review Sentiment Reports\nScore review datasets and render PDF and DOCX reports")]
#[command(version)]
struct Cli {
  /// Enable verbose logging
  #[arg(short, long, global = true)]
  verbose: bool,

  /// Print results and errors as JSON
  #[arg(long, global = true)]
  json: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Score a review dataset and print its sentiment distribution
  Analyze {
    /// Dataset file (.csv, .xlsx or .xls)
    dataset: PathBuf,
    /// Also write the analysis as JSON to this file
    #[arg(short, long)]
    output: Option<PathBuf>,
  },
  /// Generate the PDF and DOCX report
  Report {
    #[command(flatten)]
    options: commands::ReportOptions,
  },
  /// Compare the sentiment distributions of two datasets
  Compare {
    /// Dataset used as the reference point
    baseline: PathBuf,
    /// Dataset compared against the baseline
    candidate: PathBuf,
  },
  /// Show or create the configuration file
  Config {
    #[command(subcommand)]
    action: commands::ConfigAction,
  },
}

fn init_tracing(verbose: bool) {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
    if verbose {
      EnvFilter::new("verdict=debug,lexis=debug,warn")
    } else {
      EnvFilter::new("verdict=warn,warn")
    }
  });

  tracing_subscriber::registry().with(fmt::layer().with_writer(std::io::stderr)).with(filter).init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
  let json = cli.json;
  match cli.command {
    Commands::Analyze { dataset, output } => {
      commands::analyze(&dataset, output.as_deref(), json)?;
    }
    Commands::Report { options } => {
      commands::report(&options, json)?;
    }
    Commands::Compare { baseline, candidate } => {
      commands::compare(&baseline, &candidate, json)?;
    }
    Commands::Config { action } => {
      commands::config(action)?;
    }
  }

  Ok(())
}

/// Library failures keep their own kind; anything else is reported as internal
fn error_report(err: &anyhow::Error) -> ErrorReport {
  match err.chain().find_map(|cause| cause.downcast_ref::<VerdictError>()) {
    Some(verdict) => verdict.report(),
    None => ErrorReport { kind: "internal", message: format!("{err:#}") },
  }
}

fn main() {
  let cli = Cli::parse();
  let json = cli.json;
  init_tracing(cli.verbose);

  if let Err(err) = run(cli) {
    let report = error_report(&err);
    if json {
      match serde_json::to_string(&report) {
        Ok(line) => eprintln!("{line}"),
        Err(_) => console::error(&report.message),
      }
    } else {
      console::log(&format!("error[{}]: {}", report.kind, report.message));
    }
    std::process::exit(1);
  }
}
