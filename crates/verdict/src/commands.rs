use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use colored::*;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use verdict::pipeline::report_stem;
use verdict::{
  AnalysisResult, Comparison, FeedbackCollections, FeedbackKind, FeedbackSet, Palette, Pipeline,
  RenderedReport, SentimentLabel, VerdictConfig, VerdictError,
};

use crate::console;

const DEFAULT_CONFIG_FILE: &str = ".verdict.json";

#[derive(Args)]
pub struct ReportOptions {
  /// Dataset file (.csv, .xlsx or .xls)
  #[arg(required_unless_present = "analysis", conflicts_with = "analysis")]
  pub dataset: Option<PathBuf>,
  /// Render from an analysis written by `analyze --output` instead of a dataset
  #[arg(short, long)]
  pub analysis: Option<PathBuf>,
  /// JSON array of feedback about the application interface
  #[arg(long)]
  pub interface_feedback: Option<PathBuf>,
  /// JSON array of rated feedback about the reviews
  #[arg(long)]
  pub review_feedback: Option<PathBuf>,
  /// Chart colors, one per label (e.g. green,yellow,red)
  #[arg(short, long)]
  pub colors: Option<String>,
  /// Directory the documents are written to
  #[arg(short, long, default_value = ".")]
  pub out_dir: PathBuf,
  /// Identifier used in the file names (report_<id>.pdf)
  #[arg(long, default_value = "1")]
  pub id: String,
}

#[derive(Subcommand)]
pub enum ConfigAction {
  /// Print the effective configuration
  Show,
  /// Write the default configuration to a file
  Init {
    /// Where to write it
    #[arg(default_value = DEFAULT_CONFIG_FILE)]
    path: PathBuf,
    /// Overwrite an existing file
    #[arg(short, long)]
    force: bool,
  },
}

#[derive(Serialize)]
struct ReportSummary<'a> {
  analysis: &'a AnalysisResult,
  pdf: PathBuf,
  docx: PathBuf,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
  println!("{}", serde_json::to_string_pretty(value).context("failed to serialize output")?);
  Ok(())
}

fn label_name(label: SentimentLabel) -> ColoredString {
  let name = format!("{:<10}", label.display_name());
  match label {
    SentimentLabel::Positive => name.green(),
    SentimentLabel::Neutral => name.yellow(),
    SentimentLabel::Negative => name.red(),
  }
}

fn print_analysis(analysis: &AnalysisResult) {
  println!("{}", "Sentiment distribution".bold());
  for (label, count, percentage) in analysis.summary().rows() {
    println!("  {} {:>7} {:>9}", label_name(label), count, format!("{percentage:.2}%"));
  }
  println!("  {:<10} {:>7}", "Total", analysis.total_rows());
  println!();
  println!("{}", analysis.narrative());
}

/// Score a dataset and print the result, optionally saving it for later reports
pub fn analyze(dataset: &Path, output: Option<&Path>, json: bool) -> Result<()> {
  let pipeline = Pipeline::with_lexicon(VerdictConfig::load()?);

  console::info(&format!("Scoring {}", dataset.display()));
  let analysis = pipeline.analyze(dataset)?;
  if analysis.no_data() {
    console::warn("Dataset has no rows");
  }

  if let Some(output) = output {
    analysis.save_to_file(output)?;
    console::success(&format!("Saved analysis to {}", output.display()));
  }

  if json {
    print_json(&analysis)
  } else {
    print_analysis(&analysis);
    Ok(())
  }
}

fn load_feedback(interface: Option<&Path>, review: Option<&Path>) -> Result<FeedbackCollections> {
  let load = |kind: FeedbackKind, path: Option<&Path>| match path {
    Some(path) => FeedbackSet::load(kind, path),
    None => Ok(FeedbackSet::empty(kind)),
  };
  Ok(FeedbackCollections {
    interface: load(FeedbackKind::Interface, interface)?,
    review: load(FeedbackKind::Review, review)?,
  })
}

/// Render both documents and write them to the output directory
pub fn report(options: &ReportOptions, json: bool) -> Result<()> {
  let config = VerdictConfig::load()?;
  let palette = match &options.colors {
    Some(list) => Palette::parse_list(list)?,
    None => config.palette.clone(),
  };
  let feedback =
    load_feedback(options.interface_feedback.as_deref(), options.review_feedback.as_deref())?;
  let stem = report_stem(&config.report.file_stem, &options.id);
  let pipeline = Pipeline::with_lexicon(config);

  console::announce(&format!("Generating {stem}"));
  let (analysis, rendered) = match (&options.analysis, &options.dataset) {
    (Some(path), _) => {
      let analysis = AnalysisResult::load_from_file(path)?;
      let rendered = pipeline.render(&analysis, &feedback, &palette)?;
      (analysis, rendered)
    }
    (None, Some(dataset)) => {
      let output = pipeline.run(dataset, &feedback, &palette)?;
      (output.analysis, RenderedReport { pdf: output.pdf, docx: output.docx })
    }
    (None, None) => {
      return Err(VerdictError::validation("dataset", "a dataset or --analysis file is required").into());
    }
  };

  fs::create_dir_all(&options.out_dir).map_err(|e| {
    VerdictError::resource(format!("cannot create {}: {e}", options.out_dir.display()))
  })?;
  let pdf = rendered.pdf.persist(&options.out_dir, &stem)?;
  let docx = match rendered.docx.persist(&options.out_dir, &stem) {
    Ok(path) => path,
    Err(err) => {
      // a lone PDF would look like a finished report
      let _ = fs::remove_file(&pdf);
      return Err(err.into());
    }
  };

  if json {
    return print_json(&ReportSummary { analysis: &analysis, pdf, docx });
  }

  println!("{} Wrote {}", "✓".green(), pdf.display().to_string().cyan());
  println!("{} Wrote {}", "✓".green(), docx.display().to_string().cyan());
  console::flourish(&format!("Report {stem} complete ({} reviews)", analysis.total_rows()));
  Ok(())
}

fn print_comparison(baseline: &Path, candidate: &Path, comparison: &Comparison) {
  println!("{} {}", "Baseline: ".bold(), baseline.display());
  println!("{} {}", "Candidate:".bold(), candidate.display());
  println!();
  println!("  {:<10} {:>10} {:>10} {:>11}", "", "Baseline", "Candidate", "Change");
  for delta in &comparison.deltas {
    let change = format!("{:>11}", format!("{:+.2} pp", delta.delta));
    let change = if delta.delta > 0.0 {
      change.green()
    } else if delta.delta < 0.0 {
      change.red()
    } else {
      change.normal()
    };
    println!(
      "  {} {:>10} {:>10} {}",
      label_name(delta.label),
      format!("{:.2}%", delta.baseline_percentage),
      format!("{:.2}%", delta.candidate_percentage),
      change
    );
  }
  println!(
    "  {:<10} {:>10} {:>10}",
    "Reviews", comparison.baseline.total_rows(), comparison.candidate.total_rows()
  );
  if let Some(shift) = comparison.largest_shift().filter(|d| d.delta != 0.0) {
    println!();
    println!("{} {} ({:+.2} pp)", "Largest shift:".bold(), shift.label, shift.delta);
  }
}

/// Analyze two datasets and show how the distribution moved
pub fn compare(baseline: &Path, candidate: &Path, json: bool) -> Result<()> {
  let pipeline = Pipeline::with_lexicon(VerdictConfig::load()?);

  console::info(&format!("Scoring {}", baseline.display()));
  let before = pipeline.analyze(baseline)?;
  console::info(&format!("Scoring {}", candidate.display()));
  let after = pipeline.analyze(candidate)?;
  let comparison = Comparison::new(before, after);

  if json {
    print_json(&comparison)
  } else {
    print_comparison(baseline, candidate, &comparison);
    Ok(())
  }
}

pub fn config(action: ConfigAction) -> Result<()> {
  match action {
    ConfigAction::Show => print_json(&VerdictConfig::load()?),
    ConfigAction::Init { path, force } => {
      if path.exists() && !force {
        return Err(
          VerdictError::config(format!("{} already exists; use --force to overwrite", path.display()))
            .into(),
        );
      }
      VerdictConfig::default().save_to_file(&path)?;
      println!("{} Wrote default configuration to {}", "✓".green(), path.display().to_string().cyan());
      Ok(())
    }
  }
}
