//! Glyph widths for the standard Helvetica faces and greedy line wrapping.
//!
//! Widths are in thousandths of an em for the printable ASCII range. Anything else
//! in Latin-1 uses the width of a digit; characters outside Latin-1 are written as
//! `?` and measured as such.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontFace {
  Regular,
  Bold,
}

impl FontFace {
  pub fn base_font(&self) -> &'static str {
    match self {
      FontFace::Regular => "Helvetica",
      FontFace::Bold => "Helvetica-Bold",
    }
  }

  /// Name the face is registered under in page resources
  pub fn resource_name(&self) -> &'static str {
    match self {
      FontFace::Regular => "F1",
      FontFace::Bold => "F2",
    }
  }
}

// ' ' (32) through '~' (126)
#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
  278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
  556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
  1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
  667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
  333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
  556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
  278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
  556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
  975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
  667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
  333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
  611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

const FALLBACK_WIDTH: u16 = 556;

/// Maps text onto the single-byte encoding used by the standard fonts
pub fn encode_latin1(text: &str) -> Vec<u8> {
  text.chars().map(latin1_byte).collect()
}

fn latin1_byte(ch: char) -> u8 {
  match ch as u32 {
    // C1 controls have no glyphs in WinAnsi
    0x80..=0x9F => b'?',
    code @ 0x20..=0xFF => code as u8,
    _ => b'?',
  }
}

pub fn char_width(ch: char, face: FontFace) -> u16 {
  let byte = latin1_byte(ch);
  let table = match face {
    FontFace::Regular => &HELVETICA,
    FontFace::Bold => &HELVETICA_BOLD,
  };
  match byte {
    32..=126 => table[(byte - 32) as usize],
    _ => FALLBACK_WIDTH,
  }
}

/// Width of `text` in points at `size`
pub fn text_width(text: &str, face: FontFace, size: f32) -> f32 {
  let units: u32 = text.chars().map(|ch| char_width(ch, face) as u32).sum();
  units as f32 * size / 1000.0
}

/// Breaks `text` into lines no wider than `max_width`, splitting on whitespace.
/// Words wider than a whole line are split between characters. Always returns at
/// least one (possibly empty) line.
pub fn wrap(text: &str, face: FontFace, size: f32, max_width: f32) -> Vec<String> {
  let mut lines = Vec::new();
  let mut current = String::new();

  for word in text.split_whitespace() {
    let candidate = if current.is_empty() { word.to_string() } else { format!("{current} {word}") };
    if text_width(&candidate, face, size) <= max_width {
      current = candidate;
      continue;
    }

    if !current.is_empty() {
      lines.push(std::mem::take(&mut current));
    }
    if text_width(word, face, size) <= max_width {
      current = word.to_string();
    } else {
      for piece in split_long_word(word, face, size, max_width) {
        if !current.is_empty() {
          lines.push(std::mem::take(&mut current));
        }
        current = piece;
      }
    }
  }

  if !current.is_empty() || lines.is_empty() {
    lines.push(current);
  }
  lines
}

fn split_long_word(word: &str, face: FontFace, size: f32, max_width: f32) -> Vec<String> {
  let mut pieces = Vec::new();
  let mut piece = String::new();
  let mut width = 0.0;
  for ch in word.chars() {
    let advance = char_width(ch, face) as f32 * size / 1000.0;
    if !piece.is_empty() && width + advance > max_width {
      pieces.push(std::mem::take(&mut piece));
      width = 0.0;
    }
    piece.push(ch);
    width += advance;
  }
  if !piece.is_empty() {
    pieces.push(piece);
  }
  pieces
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_known_widths() {
    assert_eq!(char_width('A', FontFace::Regular), 667);
    assert_eq!(char_width('A', FontFace::Bold), 722);
    assert_eq!(char_width(' ', FontFace::Regular), 278);
    assert_eq!(char_width('~', FontFace::Bold), 584);
    assert!((text_width("Report", FontFace::Bold, 16.0) - 16.0 * 3.222).abs() < 1e-3);
  }

  #[test]
  fn test_non_latin1_becomes_question_mark() {
    assert_eq!(encode_latin1("café ✓"), vec![b'c', b'a', b'f', 0xE9, b' ', b'?']);
    assert_eq!(char_width('✓', FontFace::Regular), char_width('?', FontFace::Regular));
  }

  #[test]
  fn test_wrap_respects_width() {
    let text = "The quick brown fox jumps over the lazy dog and keeps running far away";
    let lines = wrap(text, FontFace::Regular, 12.0, 120.0);
    assert!(lines.len() > 1);
    for line in &lines {
      assert!(text_width(line, FontFace::Regular, 12.0) <= 120.0, "{line}");
    }
    assert_eq!(lines.join(" "), text);
  }

  #[test]
  fn test_wrap_splits_long_words() {
    let word = "x".repeat(100);
    let lines = wrap(&word, FontFace::Regular, 12.0, 60.0);
    assert!(lines.len() > 1);
    assert_eq!(lines.concat(), word);
  }

  #[test]
  fn test_wrap_empty_text() {
    assert_eq!(wrap("", FontFace::Regular, 12.0, 100.0), vec![String::new()]);
  }
}
