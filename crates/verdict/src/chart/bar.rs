use plotters::chart::ChartBuilder;
use plotters::element::{Rectangle, Text};
use plotters::style::{Color as _, IntoFont};

use super::{centered_text, check_inputs, rgb, Area, DrawResult, BAR_TITLE, FONT_FAMILY};
use crate::aggregate::SentimentSummary;
use crate::color::{Color, Palette};
use crate::config::ChartSettings;
use crate::sentiment::SentimentLabel;
use crate::Result;

/// Share of each slot taken by its bar
const BAR_FILL: f64 = 0.8;
const MARGIN: i32 = 16;

/// Pixel bounds of the region bars are drawn in. `bottom` is the x axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlotArea {
  pub left: i32,
  pub right: i32,
  pub top: i32,
  pub bottom: i32,
}

/// One bar. `left` and `right` are in slot units: bar `i` sits inside `i..i + 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct BarColumn {
  pub label: SentimentLabel,
  pub color: Color,
  pub count: usize,
  pub left: f64,
  pub right: f64,
}

impl BarColumn {
  pub fn center(&self) -> f64 {
    (self.left + self.right) / 2.0
  }

  fn value(&self) -> u32 {
    u32::try_from(self.count).unwrap_or(u32::MAX)
  }
}

/// Columns in summary order, one per slot
pub fn bar_columns(summary: &SentimentSummary, palette: &Palette) -> Result<Vec<BarColumn>> {
  check_inputs(summary, palette)?;

  let inset = (1.0 - BAR_FILL) / 2.0;
  let columns = summary
    .rows()
    .zip(palette.colors())
    .enumerate()
    .map(|(index, ((label, count, _), color))| BarColumn {
      label,
      color: *color,
      count,
      left: index as f64 + inset,
      right: index as f64 + 1.0 - inset,
    })
    .collect();
  Ok(columns)
}

/// Top of the count axis: the largest count plus room for its label. Never zero, so
/// an all-zero summary still gets a drawable axis.
pub fn axis_top(columns: &[BarColumn]) -> u32 {
  let max = columns.iter().map(BarColumn::value).max().unwrap_or(0);
  max.saturating_add(max / 10).max(max.saturating_add(1))
}

pub(super) fn draw(root: &Area, columns: &[BarColumn], settings: &ChartSettings) -> DrawResult<PlotArea> {
  let font = settings.font_size as i32;
  let mut chart = ChartBuilder::on(root)
    .caption(BAR_TITLE, (FONT_FAMILY, font))
    .margin(MARGIN)
    .x_label_area_size(font * 2)
    .y_label_area_size(font * 3)
    .build_cartesian_2d(0f64..columns.len() as f64, 0u32..axis_top(columns))?;

  chart
    .configure_mesh()
    .disable_x_mesh()
    .x_labels(columns.len())
    .x_label_formatter(&|_| String::new())
    .label_style((FONT_FAMILY, font * 3 / 4).into_font())
    .draw()?;

  chart.draw_series(columns.iter().filter(|column| column.count > 0).map(|column| {
    Rectangle::new([(column.left, 0), (column.right, column.value())], rgb(column.color).filled())
  }))?;

  for column in columns {
    let (x, top) = chart.backend_coord(&(column.center(), column.value()));
    let count_at = (x, top - font / 2 - 4);
    root.draw(&Text::new(column.count.to_string(), count_at, centered_text(settings, Color::BLACK)))?;

    let (_, bottom) = chart.backend_coord(&(column.center(), 0));
    let name_at = (x, bottom + font);
    root.draw(&Text::new(column.label.display_name(), name_at, centered_text(settings, Color::BLACK)))?;
  }

  let (x_range, y_range) = chart.plotting_area().get_pixel_range();
  let plot = PlotArea { left: x_range.start, right: x_range.end, top: y_range.start, bottom: y_range.end };

  if columns.iter().all(|column| column.count == 0) {
    let center = ((plot.left + plot.right) / 2, (plot.top + plot.bottom) / 2);
    root.draw(&Text::new("No data", center, centered_text(settings, Color::GREY)))?;
  }
  Ok(plot)
}
