//! Chart colors and palette validation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Result, VerdictError};

const NAMED_COLORS: &[(&str, [u8; 3])] = &[
  ("black", [0, 0, 0]),
  ("white", [255, 255, 255]),
  ("red", [255, 0, 0]),
  ("green", [0, 128, 0]),
  ("blue", [0, 0, 255]),
  ("yellow", [255, 255, 0]),
  ("orange", [255, 165, 0]),
  ("pink", [255, 192, 203]),
  ("purple", [128, 0, 128]),
  ("grey", [128, 128, 128]),
  ("gray", [128, 128, 128]),
  ("lightgrey", [211, 211, 211]),
  ("lightgray", [211, 211, 211]),
  ("beige", [245, 245, 220]),
  ("whitesmoke", [245, 245, 245]),
  ("cyan", [0, 255, 255]),
  ("magenta", [255, 0, 255]),
  ("brown", [165, 42, 42]),
  ("navy", [0, 0, 128]),
  ("teal", [0, 128, 128]),
  ("lime", [0, 255, 0]),
  ("olive", [128, 128, 0]),
  ("maroon", [128, 0, 0]),
  ("gold", [255, 215, 0]),
  ("skyblue", [135, 206, 235]),
  ("salmon", [250, 128, 114]),
  ("crimson", [220, 20, 60]),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
  pub r: u8,
  pub g: u8,
  pub b: u8,
}

impl Color {
  pub const BLACK: Color = Color::rgb(0, 0, 0);
  pub const WHITE: Color = Color::rgb(255, 255, 255);
  pub const GREY: Color = Color::rgb(128, 128, 128);
  pub const LIGHT_GREY: Color = Color::rgb(211, 211, 211);
  pub const BEIGE: Color = Color::rgb(245, 245, 220);
  pub const WHITE_SMOKE: Color = Color::rgb(245, 245, 245);

  pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
    Self { r, g, b }
  }

  pub fn to_array(self) -> [u8; 3] {
    [self.r, self.g, self.b]
  }

  /// `RRGGBB` without a leading `#`, as used by WordprocessingML shading
  pub fn hex(self) -> String {
    format!("{:02X}{:02X}{:02X}", self.r, self.g, self.b)
  }

  /// Components scaled to `0.0..=1.0` for PDF color operators
  pub fn unit(self) -> [f32; 3] {
    [self.r as f32 / 255.0, self.g as f32 / 255.0, self.b as f32 / 255.0]
  }

  /// Black or white, whichever reads better on top of this color
  pub fn contrasting_text(self) -> Color {
    let luma = 0.299 * self.r as f64 + 0.587 * self.g as f64 + 0.114 * self.b as f64;
    if luma > 140.0 {
      Color::BLACK
    } else {
      Color::WHITE
    }
  }
}

impl FromStr for Color {
  type Err = VerdictError;

  fn from_str(value: &str) -> Result<Self> {
    let trimmed = value.trim();
    if let Some(hex) = trimmed.strip_prefix('#') {
      return parse_hex(hex).ok_or_else(|| invalid_color(value));
    }

    let name = trimmed.to_ascii_lowercase();
    NAMED_COLORS
      .iter()
      .find(|(known, _)| *known == name)
      .map(|(_, [r, g, b])| Color::rgb(*r, *g, *b))
      .ok_or_else(|| invalid_color(value))
  }
}

fn parse_hex(hex: &str) -> Option<Color> {
  if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
    return None;
  }
  let channel = |s: &str| u8::from_str_radix(s, 16).ok();
  match hex.len() {
    6 => Some(Color::rgb(channel(&hex[0..2])?, channel(&hex[2..4])?, channel(&hex[4..6])?)),
    3 => {
      let expand = |i: usize| channel(&hex[i..i + 1]).map(|v| v * 17);
      Some(Color::rgb(expand(0)?, expand(1)?, expand(2)?))
    }
    _ => None,
  }
}

fn invalid_color(value: &str) -> VerdictError {
  VerdictError::validation("colors", format!("'{value}' is not a color name or #rrggbb value"))
}

impl fmt::Display for Color {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "#{}", self.hex().to_lowercase())
  }
}

impl Serialize for Color {
  fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&self.to_string())
  }
}

impl<'de> Deserialize<'de> for Color {
  fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
    let raw = String::deserialize(deserializer)?;
    raw.parse().map_err(serde::de::Error::custom)
  }
}

/// Ordered chart colors, one per summary label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Palette {
  colors: Vec<Color>,
}

impl Palette {
  pub fn new(colors: Vec<Color>) -> Self {
    Self { colors }
  }

  /// Parses a comma-separated list such as `green,yellow,#ff0000`
  pub fn parse_list(list: &str) -> Result<Self> {
    let colors = list
      .split(',')
      .filter(|part| !part.trim().is_empty())
      .map(str::parse)
      .collect::<Result<Vec<Color>>>()?;
    Ok(Self::new(colors))
  }

  pub fn colors(&self) -> &[Color] {
    &self.colors
  }

  pub fn len(&self) -> usize {
    self.colors.len()
  }

  pub fn is_empty(&self) -> bool {
    self.colors.is_empty()
  }

  /// Colors must line up one-to-one with the labels being drawn
  pub fn ensure_matches(&self, label_count: usize) -> Result<()> {
    if self.colors.len() != label_count {
      return Err(VerdictError::validation(
        "colors",
        format!("expected {label_count} colors, one per label, got {}", self.colors.len()),
      ));
    }
    Ok(())
  }
}

impl Default for Palette {
  fn default() -> Self {
    Self::new(vec![Color::rgb(0, 128, 0), Color::rgb(255, 255, 0), Color::rgb(255, 0, 0)])
  }
}
