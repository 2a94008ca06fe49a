//! Review dataset ingestion from CSV files and spreadsheet workbooks.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use tracing::debug;

use crate::{Result, VerdictError};

pub const HEADLINE_COLUMN: &str = "review_headline";
pub const BODY_COLUMN: &str = "review_body";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewRecord {
  pub headline: String,
  pub body: String,
}

impl ReviewRecord {
  pub fn new(headline: impl Into<String>, body: impl Into<String>) -> Self {
    Self { headline: headline.into(), body: body.into() }
  }

  /// Text that gets scored for this record
  pub fn combined_text(&self) -> String {
    format!("{} {}", self.headline, self.body)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetFormat {
  Csv,
  Workbook,
}

impl DatasetFormat {
  pub fn from_path(path: &Path) -> Result<Self> {
    let extension = path
      .extension()
      .and_then(|ext| ext.to_str())
      .map(|ext| ext.to_ascii_lowercase())
      .unwrap_or_default();

    match extension.as_str() {
      "csv" => Ok(DatasetFormat::Csv),
      "xlsx" | "xls" => Ok(DatasetFormat::Workbook),
      _ => Err(VerdictError::input_format(format!(
        "unsupported format for {} (expected .csv, .xlsx or .xls)",
        path.display()
      ))),
    }
  }
}

/// An ordered, read-only collection of review records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
  records: Vec<ReviewRecord>,
}

impl Dataset {
  pub fn new(records: Vec<ReviewRecord>) -> Self {
    Self { records }
  }

  pub fn load(path: &Path) -> Result<Self> {
    let format = DatasetFormat::from_path(path)?;
    let dataset = match format {
      DatasetFormat::Csv => load_csv(path)?,
      DatasetFormat::Workbook => load_workbook(path)?,
    };
    debug!(path = %path.display(), rows = dataset.len(), "loaded dataset");
    Ok(dataset)
  }

  pub fn records(&self) -> &[ReviewRecord] {
    &self.records
  }

  pub fn len(&self) -> usize {
    self.records.len()
  }

  pub fn is_empty(&self) -> bool {
    self.records.is_empty()
  }
}

/// Positions of the required columns within a header row.
struct ColumnMap {
  headline: usize,
  body: usize,
}

impl ColumnMap {
  fn from_headers<'a, I>(headers: I) -> Result<Self>
  where
    I: IntoIterator<Item = &'a str>,
  {
    let names: Vec<String> = headers.into_iter().map(|name| name.trim().to_string()).collect();
    let find = |column: &str| {
      names.iter().position(|name| name == column).ok_or_else(|| {
        VerdictError::input_format(format!("missing required column '{column}'"))
      })
    };

    Ok(Self { headline: find(HEADLINE_COLUMN)?, body: find(BODY_COLUMN)? })
  }

  fn record<'a, F>(&self, cell: F) -> ReviewRecord
  where
    F: Fn(usize) -> Option<&'a str>,
  {
    ReviewRecord::new(cell(self.headline).unwrap_or(""), cell(self.body).unwrap_or(""))
  }
}

fn load_csv(path: &Path) -> Result<Dataset> {
  let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path).map_err(|e| {
    VerdictError::input_format(format!("cannot read {}: {e}", path.display()))
  })?;

  let headers = reader
    .headers()
    .map_err(|e| VerdictError::input_format(format!("cannot read CSV header: {e}")))?
    .clone();
  let columns = ColumnMap::from_headers(headers.iter())?;

  let mut records = Vec::new();
  for (index, row) in reader.records().enumerate() {
    let row = row.map_err(|e| {
      VerdictError::input_format(format!("malformed CSV row {}: {e}", index + 2))
    })?;
    records.push(columns.record(|i| row.get(i)));
  }

  Ok(Dataset::new(records))
}

fn load_workbook(path: &Path) -> Result<Dataset> {
  let mut workbook = open_workbook_auto(path).map_err(|e| {
    VerdictError::input_format(format!("cannot open workbook {}: {e}", path.display()))
  })?;

  let range = workbook
    .worksheet_range_at(0)
    .ok_or_else(|| VerdictError::input_format("workbook has no worksheets"))?
    .map_err(|e| VerdictError::input_format(format!("cannot read worksheet: {e}")))?;

  let mut rows = range.rows();
  let header_cells: Vec<String> = match rows.next() {
    Some(header) => header.iter().map(cell_text).collect(),
    None => {
      return Err(VerdictError::input_format(format!(
        "missing required column '{HEADLINE_COLUMN}'"
      )))
    }
  };
  let columns = ColumnMap::from_headers(header_cells.iter().map(String::as_str))?;

  let records = rows
    .map(|row| {
      let cells: Vec<String> = row.iter().map(cell_text).collect();
      columns.record(|i| cells.get(i).map(String::as_str))
    })
    .collect();

  Ok(Dataset::new(records))
}

fn cell_text(cell: &Data) -> String {
  match cell {
    Data::Empty => String::new(),
    other => other.to_string(),
  }
}
