//! Pie and bar chart rasters for a sentiment distribution.
//!
//! Charts are drawn with plotters into an in-memory RGB buffer and encoded as PNG.
//! Nothing is written to disk here. Geometry is computed separately from drawing
//! (`pie_wedges`, `bar_columns`) so callers and tests can inspect proportions without
//! decoding pixels.

mod bar;
mod pie;

use std::io::Cursor;

use image::{DynamicImage, RgbImage};
use plotters::backend::{BitMapBackend, DrawingBackend};
use plotters::coord::Shift;
use plotters::drawing::{DrawingArea, DrawingAreaErrorKind, IntoDrawingArea};
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::{IntoFont, RGBColor, TextStyle};
use tracing::debug;

pub use bar::{axis_top, bar_columns, BarColumn, PlotArea};
pub use pie::{pie_wedges, Wedge};

use crate::aggregate::SentimentSummary;
use crate::color::{Color, Palette};
use crate::config::ChartSettings;
use crate::{Result, VerdictError};

const FONT_FAMILY: &str = "sans-serif";

type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;
type DrawResult<T = ()> =
  std::result::Result<T, DrawingAreaErrorKind<<BitMapBackend<'static> as DrawingBackend>::ErrorType>>;

pub const PIE_TITLE: &str = "Pie Chart - Sentiment Distribution";
pub const BAR_TITLE: &str = "Bar Chart - Sentiment Counts";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
  Pie,
  Bar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
  Png,
}

impl ImageFormat {
  pub fn extension(&self) -> &'static str {
    match self {
      ImageFormat::Png => "png",
    }
  }

  pub fn mime_type(&self) -> &'static str {
    match self {
      ImageFormat::Png => "image/png",
    }
  }
}

/// An encoded chart raster
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartImage {
  pub kind: ChartKind,
  pub format: ImageFormat,
  pub width: u32,
  pub height: u32,
  pub bytes: Vec<u8>,
}

impl ChartImage {
  /// Decodes the raster back to RGB pixels
  pub fn decode_rgb(&self) -> Result<RgbImage> {
    image::load_from_memory(&self.bytes)
      .map(|decoded| decoded.to_rgb8())
      .map_err(|e| VerdictError::resource(format!("cannot decode {:?} chart: {e}", self.kind)))
  }
}

pub struct ChartRenderer {
  settings: ChartSettings,
}

impl ChartRenderer {
  pub fn new(settings: ChartSettings) -> Self {
    Self { settings }
  }

  pub fn render_pie(&self, summary: &SentimentSummary, palette: &Palette) -> Result<ChartImage> {
    let wedges = pie_wedges(summary, palette)?;
    let raster = self.rasterize(ChartKind::Pie, |root| pie::draw(root, &wedges, &self.settings))?;
    self.encode(ChartKind::Pie, raster)
  }

  pub fn render_bar(&self, summary: &SentimentSummary, palette: &Palette) -> Result<ChartImage> {
    let columns = bar_columns(summary, palette)?;
    let raster = self.rasterize(ChartKind::Bar, |root| {
      let plot = bar::draw(root, &columns, &self.settings)?;
      debug!(?plot, "bar plot area");
      Ok(())
    })?;
    self.encode(ChartKind::Bar, raster)
  }

  /// Runs `draw` on a white canvas of the configured size and returns the pixels
  fn rasterize<F>(&self, kind: ChartKind, draw: F) -> Result<RgbImage>
  where
    F: FnOnce(&Area<'_>) -> DrawResult,
  {
    let (width, height) = (self.settings.width, self.settings.height);
    let mut buffer = vec![0u8; width as usize * height as usize * 3];
    {
      let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
      root
        .fill(&rgb(Color::WHITE))
        .and_then(|_| draw(&root))
        .and_then(|_| root.present())
        .map_err(|e| VerdictError::resource(format!("cannot draw {kind:?} chart: {e}")))?;
    }
    RgbImage::from_raw(width, height, buffer)
      .ok_or_else(|| VerdictError::resource(format!("{kind:?} chart buffer does not match {width}x{height}")))
  }

  fn encode(&self, kind: ChartKind, raster: RgbImage) -> Result<ChartImage> {
    let (width, height) = raster.dimensions();
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(raster)
      .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
      .map_err(|e| VerdictError::resource(format!("cannot encode {kind:?} chart: {e}")))?;
    debug!(?kind, width, height, size = bytes.len(), "rendered chart");
    Ok(ChartImage { kind, format: ImageFormat::Png, width, height, bytes })
  }
}

fn rgb(color: Color) -> RGBColor {
  let [r, g, b] = color.to_array();
  RGBColor(r, g, b)
}

/// Text centred on its anchor point
fn centered_text(settings: &ChartSettings, color: Color) -> TextStyle<'static> {
  (FONT_FAMILY, settings.font_size).into_font().color(&rgb(color)).pos(Pos::new(HPos::Center, VPos::Center))
}

/// Shared precondition for both chart kinds
fn check_inputs(summary: &SentimentSummary, palette: &Palette) -> Result<()> {
  if summary.is_empty() {
    return Err(VerdictError::validation("summary.labels", "cannot chart a summary without labels"));
  }
  palette.ensure_matches(summary.len())
}
