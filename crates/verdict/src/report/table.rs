use crate::{Result, VerdictError};

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
  pub header: String,
  /// Share of the page width given to this column
  pub width_fraction: f32,
}

impl Column {
  pub fn new(header: impl Into<String>, width_fraction: f32) -> Self {
    Self { header: header.into(), width_fraction }
  }
}

/// A titled grid of text cells with one header row.
///
/// Every row has exactly one cell per column. A table with no rows still renders
/// its title and header.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
  title: Option<String>,
  columns: Vec<Column>,
  rows: Vec<Vec<String>>,
}

impl Table {
  pub fn new(title: Option<String>, columns: Vec<Column>) -> Result<Self> {
    if columns.is_empty() {
      return Err(VerdictError::validation("table.columns", "a table needs at least one column"));
    }
    let total: f32 = columns.iter().map(|c| c.width_fraction).sum();
    let positive = columns.iter().all(|c| c.width_fraction.is_finite() && c.width_fraction > 0.0);
    if !positive || total > 1.0 + 1e-4 {
      return Err(VerdictError::validation(
        "table.columns",
        format!("column widths must be positive and fit the page, got a total of {total}"),
      ));
    }
    Ok(Self { title, columns, rows: Vec::new() })
  }

  pub fn with_rows(mut self, rows: Vec<Vec<String>>) -> Result<Self> {
    for row in rows {
      self.push_row(row)?;
    }
    Ok(self)
  }

  pub fn push_row(&mut self, row: Vec<String>) -> Result<()> {
    if row.len() != self.columns.len() {
      return Err(VerdictError::validation(
        format!("table.rows[{}]", self.rows.len()),
        format!("expected {} cells, got {}", self.columns.len(), row.len()),
      ));
    }
    self.rows.push(row);
    Ok(())
  }

  pub fn title(&self) -> Option<&str> {
    self.title.as_deref()
  }

  pub fn columns(&self) -> &[Column] {
    &self.columns
  }

  pub fn rows(&self) -> &[Vec<String>] {
    &self.rows
  }

  pub fn headers(&self) -> Vec<&str> {
    self.columns.iter().map(|c| c.header.as_str()).collect()
  }

  pub fn is_header_only(&self) -> bool {
    self.rows.is_empty()
  }
}
