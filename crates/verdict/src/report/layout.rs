//! Fixed-page placement of a report.
//!
//! Offsets are measured in points down from the top edge of the page. The PDF
//! encoder flips them into PDF user space.

use tracing::warn;

use super::metrics::{self, FontFace};
use super::table::Table;
use super::{Block, ReportDocument};
use crate::chart::ChartImage;
use crate::color::Color;
use crate::config::{ChartSettings, PageSettings};

pub const TITLE_SIZE: f32 = 16.0;
pub const SECTION_SIZE: f32 = 14.0;
pub const BODY_SIZE: f32 = 12.0;
pub const BODY_LEADING: f32 = 15.0;
pub const CELL_SIZE: f32 = 10.0;
const CELL_LEADING: f32 = 12.0;
const CELL_PAD_X: f32 = 6.0;
const CELL_PAD_TOP: f32 = 3.0;
const CELL_PAD_BOTTOM: f32 = 3.0;
const HEADER_PAD_BOTTOM: f32 = 12.0;
const TABLE_TITLE_GAP: f32 = 6.0;
pub const GRID_WIDTH: f32 = 1.0;

fn heading_size(level: u8) -> f32 {
  if level <= 1 {
    TITLE_SIZE
  } else {
    SECTION_SIZE
  }
}

fn leading_for(size: f32) -> f32 {
  size * 1.25
}

/// Where the next block goes. Moves strictly forward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cursor {
  pub page_index: usize,
  pub y_offset: f32,
  top: f32,
  bottom: f32,
}

impl Cursor {
  pub fn new(page: &PageSettings) -> Self {
    let top = page.margin_top;
    Self { page_index: 0, y_offset: top, top, bottom: page.height - page.margin_bottom }
  }

  pub fn remaining(&self) -> f32 {
    self.bottom - self.y_offset
  }

  pub fn fits(&self, height: f32) -> bool {
    height <= self.remaining() + 1e-3
  }

  pub fn at_top(&self) -> bool {
    (self.y_offset - self.top).abs() < 1e-3
  }

  pub fn next_page(&mut self) {
    self.page_index += 1;
    self.y_offset = self.top;
  }

  pub fn advance(&mut self, height: f32) {
    self.y_offset += height;
  }

  /// Usable height of a fresh page
  pub fn page_capacity(&self) -> f32 {
    self.bottom - self.top
  }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Element<'a> {
  Text { x: f32, baseline: f32, text: String, face: FontFace, size: f32, color: Color },
  Rect { x: f32, top: f32, width: f32, height: f32, fill: Option<Color>, stroke: Option<Color> },
  Image { x: f32, top: f32, width: f32, height: f32, image: &'a ChartImage },
}

impl Element<'_> {
  pub fn top(&self) -> f32 {
    match self {
      Element::Text { baseline, size, .. } => baseline - size,
      Element::Rect { top, .. } | Element::Image { top, .. } => *top,
    }
  }

  pub fn bottom(&self) -> f32 {
    match self {
      Element::Text { baseline, .. } => *baseline,
      Element::Rect { top, height, .. } | Element::Image { top, height, .. } => top + height,
    }
  }
}

/// An element tagged with the index of the block it came from
#[derive(Debug, Clone, PartialEq)]
pub struct Placed<'a> {
  pub block: usize,
  pub element: Element<'a>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page<'a> {
  pub items: Vec<Placed<'a>>,
}

impl Page<'_> {
  pub fn texts(&self) -> Vec<&str> {
    self
      .items
      .iter()
      .filter_map(|placed| match &placed.element {
        Element::Text { text, .. } => Some(text.as_str()),
        _ => None,
      })
      .collect()
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LaidOutDocument<'a> {
  pub width: f32,
  pub height: f32,
  pub pages: Vec<Page<'a>>,
}

impl<'a> LaidOutDocument<'a> {
  pub fn page_count(&self) -> usize {
    self.pages.len()
  }

  /// Page index and top offset of the first element placed for `block`
  pub fn block_start(&self, block: usize) -> Option<(usize, f32)> {
    self.pages.iter().enumerate().find_map(|(index, page)| {
      page.items.iter().find(|p| p.block == block).map(|p| (index, p.element.top()))
    })
  }

  /// Sorted page indices `block` has elements on
  pub fn pages_of(&self, block: usize) -> Vec<usize> {
    self
      .pages
      .iter()
      .enumerate()
      .filter(|(_, page)| page.items.iter().any(|p| p.block == block))
      .map(|(index, _)| index)
      .collect()
  }

  pub fn images(&self) -> Vec<&'a ChartImage> {
    let mut images: Vec<&'a ChartImage> = Vec::new();
    for placed in self.pages.iter().flat_map(|page| &page.items) {
      if let Element::Image { image, .. } = placed.element {
        if !images.iter().any(|seen| std::ptr::eq(*seen, image)) {
          images.push(image);
        }
      }
    }
    images
  }
}

pub struct LayoutEngine {
  page: PageSettings,
  chart: ChartSettings,
}

impl LayoutEngine {
  pub fn new(page: PageSettings, chart: ChartSettings) -> Self {
    Self { page, chart }
  }

  pub fn layout<'a>(&self, document: &'a ReportDocument) -> LaidOutDocument<'a> {
    let mut pager = Pager::new(&self.page);

    for (index, block) in document.blocks().iter().enumerate() {
      pager.block = index;
      match block {
        Block::Heading { text, level } => {
          let size = heading_size(*level);
          let lines = metrics::wrap(text, FontFace::Bold, size, self.page.content_width());
          let centered = *level <= 1;
          self.place_lines(&mut pager, &lines, FontFace::Bold, size, leading_for(size), centered);
          pager.pad(self.page.block_padding);
        }
        Block::Paragraph(text) => {
          let lines = metrics::wrap(text, FontFace::Regular, BODY_SIZE, self.page.content_width());
          self.place_lines(&mut pager, &lines, FontFace::Regular, BODY_SIZE, BODY_LEADING, false);
          pager.pad(self.page.block_padding);
        }
        Block::Image(image) => {
          self.place_image(&mut pager, image);
          pager.pad(self.page.block_padding);
        }
        Block::Table(table) => {
          self.place_table(&mut pager, table);
          pager.pad(self.page.block_padding);
        }
        Block::PageBreak => {
          // a page with nothing on it already counts as the new page
          if !pager.current_page_is_empty() {
            pager.break_page();
          }
        }
        Block::Spacer(height) => {
          if pager.cursor.fits(*height) {
            pager.cursor.advance(*height);
          } else {
            pager.break_page();
          }
        }
      }
    }

    LaidOutDocument { width: self.page.width, height: self.page.height, pages: pager.pages }
  }

  /// Keeps the lines together when they fit on one page, otherwise flows them line by line
  fn place_lines<'a>(
    &self,
    pager: &mut Pager<'a>,
    lines: &[String],
    face: FontFace,
    size: f32,
    leading: f32,
    centered: bool,
  ) {
    let total = lines.len() as f32 * leading;
    if !pager.cursor.fits(total) && total <= pager.cursor.page_capacity() {
      pager.break_page();
    }

    for line in lines {
      pager.ensure_room(leading);
      let width = metrics::text_width(line, face, size);
      let x = if centered { (self.page.width - width) / 2.0 } else { self.page.margin_left };
      let baseline = pager.cursor.y_offset + size;
      pager.place(Element::Text {
        x,
        baseline,
        text: line.clone(),
        face,
        size,
        color: Color::BLACK,
      });
      pager.cursor.advance(leading);
    }
  }

  fn place_image<'a>(&self, pager: &mut Pager<'a>, image: &'a ChartImage) {
    let mut width = self.chart.display_width;
    let mut height = self.chart.display_height;
    if width > self.page.content_width() {
      height *= self.page.content_width() / width;
      width = self.page.content_width();
    }

    pager.ensure_room(height);
    pager.place(Element::Image {
      x: self.page.margin_left,
      top: pager.cursor.y_offset,
      width,
      height,
      image,
    });
    pager.cursor.advance(height);
  }

  fn place_table<'a>(&self, pager: &mut Pager<'a>, table: &Table) {
    let widths = self.column_widths(table);
    let title_lines = table
      .title()
      .map(|title| metrics::wrap(title, FontFace::Bold, SECTION_SIZE, self.page.content_width()))
      .unwrap_or_default();
    let title_height = if title_lines.is_empty() {
      0.0
    } else {
      title_lines.len() as f32 * leading_for(SECTION_SIZE) + TABLE_TITLE_GAP
    };

    let header: Vec<String> = table.headers().into_iter().map(str::to_string).collect();
    let header_cells = wrap_cells(&header, &widths, FontFace::Bold);
    let header_height = row_height(&header_cells, HEADER_PAD_BOTTOM);

    let body: Vec<Vec<Vec<String>>> =
      table.rows().iter().map(|row| wrap_cells(row, &widths, FontFace::Regular)).collect();

    // title, header and first row stay together
    let first_row = body.first().map(|cells| row_height(cells, CELL_PAD_BOTTOM)).unwrap_or(0.0);
    let lead_in = title_height + header_height + first_row;
    if !pager.cursor.fits(lead_in) && lead_in <= pager.cursor.page_capacity() {
      pager.break_page();
    }

    if !title_lines.is_empty() {
      self.place_lines(pager, &title_lines, FontFace::Bold, SECTION_SIZE, leading_for(SECTION_SIZE), false);
      pager.cursor.advance(TABLE_TITLE_GAP);
    }
    self.place_row(pager, &widths, &header_cells, RowStyle::Header);

    for cells in &body {
      let height = row_height(cells, CELL_PAD_BOTTOM);
      if !pager.cursor.fits(height) {
        pager.break_page();
        self.place_row(pager, &widths, &header_cells, RowStyle::Header);
        if !pager.cursor.fits(height) {
          warn!(height, "table row is taller than a page; it will overflow the bottom margin");
        }
      }
      self.place_row(pager, &widths, cells, RowStyle::Body);
    }
  }

  fn place_row<'a>(&self, pager: &mut Pager<'a>, widths: &[f32], cells: &[Vec<String>], style: RowStyle) {
    let (fill, text_color, face, pad_bottom) = match style {
      RowStyle::Header => (Color::GREY, Color::WHITE_SMOKE, FontFace::Bold, HEADER_PAD_BOTTOM),
      RowStyle::Body => (Color::BEIGE, Color::BLACK, FontFace::Regular, CELL_PAD_BOTTOM),
    };
    let height = row_height(cells, pad_bottom);
    let top = pager.cursor.y_offset;
    let mut x = self.page.margin_left;

    for (lines, width) in cells.iter().zip(widths) {
      pager.place(Element::Rect {
        x,
        top,
        width: *width,
        height,
        fill: Some(fill),
        stroke: Some(Color::BLACK),
      });
      for (index, line) in lines.iter().enumerate() {
        let text_width = metrics::text_width(line, face, CELL_SIZE);
        pager.place(Element::Text {
          x: x + (width - text_width) / 2.0,
          baseline: top + CELL_PAD_TOP + index as f32 * CELL_LEADING + CELL_SIZE,
          text: line.clone(),
          face,
          size: CELL_SIZE,
          color: text_color,
        });
      }
      x += width;
    }
    pager.cursor.advance(height);
  }

  /// Column widths are fractions of the full page width, starting at the left margin
  fn column_widths(&self, table: &Table) -> Vec<f32> {
    let fractions: Vec<f32> = table.columns().iter().map(|c| c.width_fraction).collect();
    let total: f32 = fractions.iter().sum::<f32>() * self.page.width;
    let available = self.page.width - self.page.margin_left;
    let shrink = if total > available { available / total } else { 1.0 };
    fractions.iter().map(|f| f * self.page.width * shrink).collect()
  }
}

#[derive(Clone, Copy)]
enum RowStyle {
  Header,
  Body,
}

fn wrap_cells(cells: &[String], widths: &[f32], face: FontFace) -> Vec<Vec<String>> {
  cells
    .iter()
    .zip(widths)
    .map(|(cell, width)| metrics::wrap(cell, face, CELL_SIZE, (width - 2.0 * CELL_PAD_X).max(CELL_SIZE)))
    .collect()
}

fn row_height(cells: &[Vec<String>], pad_bottom: f32) -> f32 {
  let lines = cells.iter().map(Vec::len).max().unwrap_or(1).max(1);
  CELL_PAD_TOP + lines as f32 * CELL_LEADING + pad_bottom
}

/// Pages under construction plus the cursor into them
struct Pager<'a> {
  cursor: Cursor,
  pages: Vec<Page<'a>>,
  block: usize,
}

impl<'a> Pager<'a> {
  fn new(page: &PageSettings) -> Self {
    Self { cursor: Cursor::new(page), pages: vec![Page::default()], block: 0 }
  }

  fn place(&mut self, element: Element<'a>) {
    let block = self.block;
    if let Some(page) = self.pages.get_mut(self.cursor.page_index) {
      page.items.push(Placed { block, element });
    }
  }

  fn break_page(&mut self) {
    self.cursor.next_page();
    self.pages.push(Page::default());
  }

  /// Starts a new page unless `height` fits or the page is still fresh
  fn ensure_room(&mut self, height: f32) {
    if !self.cursor.fits(height) && !self.cursor.at_top() {
      self.break_page();
    }
  }

  fn pad(&mut self, height: f32) {
    self.cursor.advance(height);
  }

  fn current_page_is_empty(&self) -> bool {
    self.pages.get(self.cursor.page_index).map(|page| page.items.is_empty()).unwrap_or(true)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::chart::{ChartKind, ImageFormat};
  use crate::report::table::Column;

  fn engine() -> LayoutEngine {
    LayoutEngine::new(PageSettings::default(), ChartSettings::default())
  }

  fn chart() -> ChartImage {
    ChartImage { kind: ChartKind::Pie, format: ImageFormat::Png, width: 800, height: 400, bytes: vec![] }
  }

  fn paragraph(words: usize) -> Block {
    Block::Paragraph(vec!["sentiment"; words].join(" "))
  }

  fn feedback_table(rows: usize) -> Table {
    let columns = vec![Column::new("Comment", 0.4), Column::new("Created Date", 0.4)];
    let rows = (0..rows).map(|i| vec![format!("comment {i}"), "2024-03-09 10:00:00".to_string()]).collect();
    Table::new(Some("User Interface Feedback".into()), columns).unwrap().with_rows(rows).unwrap()
  }

  fn assert_within_margins(laid_out: &LaidOutDocument) {
    let page = PageSettings::default();
    for p in &laid_out.pages {
      for placed in &p.items {
        assert!(placed.element.top() >= page.margin_top - 1e-3);
        assert!(placed.element.bottom() <= page.height - page.margin_bottom + 1e-3);
      }
    }
  }

  #[test]
  fn test_cursor_state_machine() {
    let page = PageSettings::default();
    let mut cursor = Cursor::new(&page);
    assert!(cursor.at_top());
    assert_eq!(cursor.remaining(), 782.0);

    cursor.advance(700.0);
    assert!(!cursor.fits(100.0));
    cursor.next_page();
    assert_eq!(cursor.page_index, 1);
    assert_eq!(cursor.y_offset, 30.0);
  }

  #[test]
  fn test_first_block_starts_at_top_margin() {
    let mut document = ReportDocument::new();
    document.push(Block::Heading { text: "Report".into(), level: 1 });
    let laid_out = engine().layout(&document);
    assert_eq!(laid_out.block_start(0), Some((0, 30.0)));
  }

  #[test]
  fn test_title_is_centered() {
    let mut document = ReportDocument::new();
    document.push(Block::Heading { text: "Report".into(), level: 1 });
    let laid_out = engine().layout(&document);
    match &laid_out.pages[0].items[0].element {
      Element::Text { x, text, .. } => {
        let width = metrics::text_width(text, FontFace::Bold, TITLE_SIZE);
        assert!((x + width / 2.0 - 297.5).abs() < 1e-3);
      }
      other => panic!("expected text, got {other:?}"),
    }
  }

  #[test]
  fn test_block_that_does_not_fit_moves_to_fresh_page() {
    let mut document = ReportDocument::new();
    document.push(paragraph(5));
    document.push(Block::Spacer(650.0));
    document.push(Block::Image(chart()));
    let laid_out = engine().layout(&document);

    // under 100pt remain on the first page; the 200pt image starts the next one
    assert_eq!(laid_out.block_start(0), Some((0, 30.0)));
    assert_eq!(laid_out.block_start(2), Some((1, 30.0)));
    assert_eq!(laid_out.pages_of(2).len(), 1);
    assert_eq!(laid_out.page_count(), 2);
    assert_within_margins(&laid_out);
  }

  #[test]
  fn test_long_paragraph_flows_across_pages() {
    let mut document = ReportDocument::new();
    document.push(paragraph(4000));
    let laid_out = engine().layout(&document);
    assert!(laid_out.page_count() > 1);
    assert_within_margins(&laid_out);
  }

  #[test]
  fn test_explicit_page_break() {
    let mut document = ReportDocument::new();
    document.push(Block::Paragraph("before".into()));
    document.push(Block::PageBreak);
    document.push(Block::Paragraph("after".into()));
    let laid_out = engine().layout(&document);
    assert_eq!(laid_out.page_count(), 2);
    assert_eq!(laid_out.block_start(2), Some((1, 30.0)));
  }

  #[test]
  fn test_page_break_on_empty_page_adds_no_blank_page() {
    let mut document = ReportDocument::new();
    document.push(Block::PageBreak);
    document.push(Block::Paragraph("first".into()));
    let laid_out = engine().layout(&document);
    assert_eq!(laid_out.page_count(), 1);
  }

  #[test]
  fn test_header_only_table() {
    let mut document = ReportDocument::new();
    document.push(Block::Table(feedback_table(0)));
    let laid_out = engine().layout(&document);
    let texts = laid_out.pages[0].texts();
    assert_eq!(texts, vec!["User Interface Feedback", "Comment", "Created Date"]);
  }

  #[test]
  fn test_long_table_repeats_header_on_each_page() {
    let mut document = ReportDocument::new();
    document.push(Block::Table(feedback_table(120)));
    let laid_out = engine().layout(&document);

    assert!(laid_out.page_count() > 1);
    for page in &laid_out.pages {
      assert!(page.texts().contains(&"Comment"));
    }
    let title_count = laid_out
      .pages
      .iter()
      .flat_map(|p| p.texts())
      .filter(|t| *t == "User Interface Feedback")
      .count();
    assert_eq!(title_count, 1);

    let rows: usize = laid_out
      .pages
      .iter()
      .map(|p| p.texts().iter().filter(|t| t.starts_with("comment ")).count())
      .sum();
    assert_eq!(rows, 120);
    assert_within_margins(&laid_out);
  }

  #[test]
  fn test_table_title_is_kept_with_header() {
    let mut document = ReportDocument::new();
    document.push(paragraph(790));
    document.push(Block::Table(feedback_table(3)));
    let laid_out = engine().layout(&document);

    let title_page = laid_out
      .pages
      .iter()
      .position(|p| p.texts().contains(&"User Interface Feedback"))
      .unwrap();
    assert_eq!(title_page, 2);
    assert!(laid_out.pages[title_page].texts().contains(&"Comment"));
    assert!(laid_out.pages[title_page].texts().contains(&"comment 0"));
  }

  #[test]
  fn test_table_columns_use_page_width_fractions() {
    let mut document = ReportDocument::new();
    document.push(Block::Table(feedback_table(1)));
    let laid_out = engine().layout(&document);
    let widths: Vec<f32> = laid_out.pages[0]
      .items
      .iter()
      .filter_map(|p| match p.element {
        Element::Rect { width, .. } => Some(width),
        _ => None,
      })
      .collect();
    assert_eq!(widths.len(), 4);
    assert!(widths.iter().all(|w| (w - 238.0).abs() < 1e-3));
  }

  #[test]
  fn test_images_are_deduplicated_by_identity() {
    let mut document = ReportDocument::new();
    document.push(Block::Image(chart()));
    document.push(Block::Image(chart()));
    let laid_out = engine().layout(&document);
    assert_eq!(laid_out.images().len(), 2);
  }
}
