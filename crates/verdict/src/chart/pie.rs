use std::f64::consts::TAU;

use plotters::element::{Circle, Polygon, Text};
use plotters::style::Color as _;

use super::{centered_text, check_inputs, rgb, Area, DrawResult, PIE_TITLE};
use crate::aggregate::SentimentSummary;
use crate::color::{Color, Palette};
use crate::config::ChartSettings;
use crate::sentiment::SentimentLabel;
use crate::Result;

/// Percentage labels sit this far out along the wedge bisector
const PERCENT_RADIUS: f64 = 0.6;
/// Label names sit just outside the rim
const NAME_RADIUS: f64 = 1.18;
/// Largest angle between neighbouring arc points
const ARC_STEP: f64 = TAU / 360.0;

/// One slice of the pie. Angles are radians, counter-clockwise from 3 o'clock.
#[derive(Debug, Clone, PartialEq)]
pub struct Wedge {
  pub label: SentimentLabel,
  pub color: Color,
  pub count: usize,
  pub percentage: f64,
  pub start_angle: f64,
  pub sweep: f64,
}

impl Wedge {
  pub fn fraction(&self) -> f64 {
    self.sweep / TAU
  }

  pub fn mid_angle(&self) -> f64 {
    self.start_angle + self.sweep / 2.0
  }
}

/// Wedges in summary order. An all-zero summary yields wedges with zero sweep.
pub fn pie_wedges(summary: &SentimentSummary, palette: &Palette) -> Result<Vec<Wedge>> {
  check_inputs(summary, palette)?;

  let total = summary.total();
  let mut start_angle = 0.0;
  let wedges = summary
    .rows()
    .zip(palette.colors())
    .map(|((label, count, percentage), color)| {
      let sweep = if total == 0 { 0.0 } else { count as f64 / total as f64 * TAU };
      let wedge = Wedge { label, color: *color, count, percentage, start_angle, sweep };
      start_angle += sweep;
      wedge
    })
    .collect();
  Ok(wedges)
}

/// Centre and radius of the disc, in pixels
pub(super) struct Disc {
  pub cx: f64,
  pub cy: f64,
  pub radius: f64,
}

impl Disc {
  pub fn for_settings(settings: &ChartSettings) -> Self {
    let band = title_band(settings);
    let (width, height) = (settings.width as f64, settings.height as f64);
    let room = (height - band).min(width) / 2.0;
    Self { cx: width / 2.0, cy: band + (height - band) / 2.0, radius: room * 0.78 }
  }

  /// Pixel at `reach` radii from the centre along `angle`; y grows downwards
  fn point(&self, angle: f64, reach: f64) -> (i32, i32) {
    let distance = self.radius * reach;
    ((self.cx + distance * angle.cos()).round() as i32, (self.cy - distance * angle.sin()).round() as i32)
  }

  /// Closed outline of a wedge: the centre followed by its arc
  fn outline(&self, wedge: &Wedge) -> Vec<(i32, i32)> {
    let steps = ((wedge.sweep / ARC_STEP).ceil() as usize).max(1);
    let mut points = Vec::with_capacity(steps + 2);
    points.push((self.cx.round() as i32, self.cy.round() as i32));
    for step in 0..=steps {
      let angle = wedge.start_angle + wedge.sweep * step as f64 / steps as f64;
      points.push(self.point(angle, 1.0));
    }
    points
  }
}

fn title_band(settings: &ChartSettings) -> f64 {
  settings.font_size as f64 + 24.0
}

pub(super) fn draw(root: &Area, wedges: &[Wedge], settings: &ChartSettings) -> DrawResult {
  let disc = Disc::for_settings(settings);
  let title_at = ((settings.width / 2) as i32, (title_band(settings) / 2.0) as i32);
  root.draw(&Text::new(PIE_TITLE, title_at, centered_text(settings, Color::BLACK)))?;

  let filled: Vec<&Wedge> = wedges.iter().filter(|w| w.sweep > 0.0).collect();
  if filled.is_empty() {
    let center = (disc.cx.round() as i32, disc.cy.round() as i32);
    root.draw(&Circle::new(center, disc.radius.round() as i32, rgb(Color::BLACK).stroke_width(2)))?;
    return root.draw(&Text::new("No data", center, centered_text(settings, Color::GREY)));
  }

  for wedge in &filled {
    root.draw(&Polygon::new(disc.outline(wedge), rgb(wedge.color).filled()))?;
  }

  for wedge in &filled {
    let text = format!("{:.1}%", wedge.percentage);
    let at = disc.point(wedge.mid_angle(), PERCENT_RADIUS);
    root.draw(&Text::new(text, at, centered_text(settings, wedge.color.contrasting_text())))?;

    let at = disc.point(wedge.mid_angle(), NAME_RADIUS);
    root.draw(&Text::new(wedge.label.display_name(), at, centered_text(settings, Color::BLACK)))?;
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::chart::{ChartKind, ChartRenderer};
  use crate::sentiment::SentimentLabel::*;
  use image::RgbImage;

  fn summary(labels: &[SentimentLabel]) -> SentimentSummary {
    SentimentSummary::from_labels(labels)
  }

  #[test]
  fn test_one_wedge_per_label() {
    let wedges = pie_wedges(&summary(&[Positive, Negative]), &Palette::default()).unwrap();
    assert_eq!(wedges.len(), 3);
    assert_eq!(wedges.iter().map(|w| w.label).collect::<Vec<_>>(), vec![Positive, Neutral, Negative]);
  }

  #[test]
  fn test_sweeps_follow_percentages() {
    let summary = summary(&[Positive, Positive, Positive, Neutral, Negative, Negative]);
    let wedges = pie_wedges(&summary, &Palette::default()).unwrap();

    for (wedge, percentage) in wedges.iter().zip(summary.percentages()) {
      assert!((wedge.fraction() * 100.0 - percentage).abs() < 1e-9);
    }
    let total: f64 = wedges.iter().map(|w| w.sweep).sum();
    assert!((total - TAU).abs() < 1e-9);
  }

  #[test]
  fn test_wedges_are_contiguous_from_zero() {
    let wedges = pie_wedges(&summary(&[Positive, Neutral, Negative]), &Palette::default()).unwrap();
    assert_eq!(wedges[0].start_angle, 0.0);
    for pair in wedges.windows(2) {
      assert!((pair[0].start_angle + pair[0].sweep - pair[1].start_angle).abs() < 1e-12);
    }
  }

  fn raster(wedges: &[Wedge], settings: &ChartSettings) -> RgbImage {
    ChartRenderer::new(settings.clone())
      .rasterize(ChartKind::Pie, |root| draw(root, wedges, settings))
      .unwrap()
  }

  #[test]
  fn test_pixels_show_wedge_colors() {
    let settings = ChartSettings::default();
    let palette = Palette::default();
    let wedges = pie_wedges(&summary(&[Positive, Positive, Neutral, Negative]), &palette).unwrap();
    let image = raster(&wedges, &settings);
    let disc = Disc::for_settings(&settings);

    for wedge in &wedges {
      let (x, y) = disc.point(wedge.mid_angle(), 0.3);
      assert_eq!(image.get_pixel(x as u32, y as u32).0, wedge.color.to_array(), "{}", wedge.label);
    }
  }

  #[test]
  fn test_single_label_fills_the_disc() {
    let settings = ChartSettings::default();
    let wedges = pie_wedges(&summary(&[Negative, Negative]), &Palette::default()).unwrap();
    let image = raster(&wedges, &settings);
    let disc = Disc::for_settings(&settings);

    let red = wedges[2].color.to_array();
    for angle in [0.5, 2.0, 4.0, 5.5] {
      let (x, y) = disc.point(angle, 0.4);
      assert_eq!(image.get_pixel(x as u32, y as u32).0, red);
    }
  }

  #[test]
  fn test_outline_follows_the_arc() {
    let disc = Disc::for_settings(&ChartSettings::default());
    let wedges = pie_wedges(&summary(&[Positive, Negative]), &Palette::default()).unwrap();
    let outline = disc.outline(&wedges[0]);

    assert_eq!(outline[0], (disc.cx.round() as i32, disc.cy.round() as i32));
    assert_eq!(outline[1], disc.point(0.0, 1.0));
    assert_eq!(*outline.last().unwrap(), disc.point(TAU / 2.0, 1.0));
    // centre plus one point per degree of a half turn, both ends included
    assert!((182..=183).contains(&outline.len()), "{} points", outline.len());
  }

  #[test]
  fn test_zero_count_label_gets_no_pixels() {
    let settings = ChartSettings::default();
    let palette = Palette::default();
    let wedges = pie_wedges(&summary(&[Positive, Negative]), &palette).unwrap();
    assert_eq!(wedges[1].sweep, 0.0);

    let image = raster(&wedges, &settings);
    let yellow = palette.colors()[1].to_array();
    assert!(image.pixels().all(|p| p.0 != yellow));
  }

  #[test]
  fn test_all_zero_summary_draws_empty_disc() {
    let settings = ChartSettings::default();
    let palette = Palette::default();
    let wedges = pie_wedges(&summary(&[]), &palette).unwrap();
    assert!(wedges.iter().all(|w| w.sweep == 0.0));

    let image = raster(&wedges, &settings);
    for color in palette.colors() {
      assert!(image.pixels().all(|p| p.0 != color.to_array()));
    }

    // the outline crosses the horizontal through the centre near the rim
    let disc = Disc::for_settings(&settings);
    let (rim, y) = disc.point(0.0, 1.0);
    let dark = (rim - 4..=rim + 4).any(|x| image.get_pixel(x as u32, y as u32).0.iter().all(|c| *c < 128));
    assert!(dark);
  }
}
