//! Flow-mode DOCX output.
//!
//! Writes a minimal WordprocessingML package: content types, package and document
//! relationships, a small style sheet, the document body and one PNG part per
//! chart. Entries carry a fixed timestamp so identical reports produce identical
//! archives.

use std::io::{Cursor, Write};

use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use super::table::Table;
use super::{Block, ReportDocument};
use crate::chart::ChartImage;
use crate::color::Color;
use crate::config::PageSettings;
use crate::{Result, VerdictError};

const EMU_PER_INCH: u64 = 914_400;
/// Pictures are inserted 6 inches wide
const PICTURE_WIDTH_EMU: u64 = 6 * EMU_PER_INCH;
const TWIPS_PER_POINT: f32 = 20.0;
/// Table cell text size in half-points
const CELL_FONT_HALF_POINTS: u32 = 22;
const HEADER_SHADING: Color = Color::LIGHT_GREY;

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Default Extension="png" ContentType="image/png"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/></Types>"#;

const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:docDefaults><w:rPrDefault><w:rPr><w:rFonts w:ascii="Helvetica" w:hAnsi="Helvetica" w:cs="Helvetica"/><w:sz w:val="24"/></w:rPr></w:rPrDefault></w:docDefaults><w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/><w:pPr><w:spacing w:after="200"/></w:pPr></w:style><w:style w:type="paragraph" w:styleId="Heading1"><w:name w:val="heading 1"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:pPr><w:keepNext/><w:jc w:val="center"/><w:outlineLvl w:val="0"/></w:pPr><w:rPr><w:b/><w:sz w:val="32"/></w:rPr></w:style><w:style w:type="paragraph" w:styleId="Heading2"><w:name w:val="heading 2"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:pPr><w:keepNext/><w:outlineLvl w:val="1"/></w:pPr><w:rPr><w:b/><w:sz w:val="28"/></w:rPr></w:style><w:style w:type="table" w:styleId="TableGrid"><w:name w:val="Table Grid"/><w:tblPr><w:tblBorders><w:top w:val="single" w:sz="8" w:space="0" w:color="000000"/><w:left w:val="single" w:sz="8" w:space="0" w:color="000000"/><w:bottom w:val="single" w:sz="8" w:space="0" w:color="000000"/><w:right w:val="single" w:sz="8" w:space="0" w:color="000000"/><w:insideH w:val="single" w:sz="8" w:space="0" w:color="000000"/><w:insideV w:val="single" w:sz="8" w:space="0" w:color="000000"/></w:tblBorders></w:tblPr></w:style></w:styles>"#;

const DOCUMENT_OPEN: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing" xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:pic="http://schemas.openxmlformats.org/drawingml/2006/picture"><w:body>"#;

pub struct DocxEncoder {
  page: PageSettings,
}

impl DocxEncoder {
  pub fn new(page: PageSettings) -> Self {
    Self { page }
  }

  pub fn encode(&self, document: &ReportDocument) -> Result<Vec<u8>> {
    let mut body = String::from(DOCUMENT_OPEN);
    let mut pictures: Vec<&ChartImage> = Vec::new();

    for block in document.blocks() {
      match block {
        Block::Heading { text, level } => body.push_str(&heading(text, *level)),
        Block::Paragraph(text) => body.push_str(&paragraph(text)),
        Block::Image(image) => {
          pictures.push(image);
          body.push_str(&picture(image, pictures.len()));
        }
        Block::Table(table) => {
          if let Some(title) = table.title() {
            body.push_str(&heading(title, 2));
          }
          body.push_str(&self.table(table));
        }
        Block::PageBreak => body.push_str(r#"<w:p><w:r><w:br w:type="page"/></w:r></w:p>"#),
        Block::Spacer(points) => body.push_str(&format!(
          r#"<w:p><w:pPr><w:spacing w:before="0" w:after="{}"/></w:pPr></w:p>"#,
          twips(*points)
        )),
      }
    }
    body.push_str(&self.section_properties());
    body.push_str("</w:body></w:document>");

    let bytes = package(&body, &pictures)?;
    debug!(pictures = pictures.len(), size = bytes.len(), "encoded DOCX");
    Ok(bytes)
  }

  /// Column widths in twips, shrunk together when the table is wider than the text area
  fn grid_widths(&self, table: &Table) -> Vec<u32> {
    let points: Vec<f32> = table.columns().iter().map(|c| c.width_fraction * self.page.width).collect();
    let total: f32 = points.iter().sum();
    let available = self.page.content_width();
    let shrink = if total > available { available / total } else { 1.0 };
    // rounded down so the columns never add up past the margin
    points.iter().map(|p| (p * shrink * TWIPS_PER_POINT).floor() as u32).collect()
  }

  fn table(&self, table: &Table) -> String {
    let grid = self.grid_widths(table);
    let total: u32 = grid.iter().sum();

    let mut xml = format!(
      r#"<w:tbl><w:tblPr><w:tblStyle w:val="TableGrid"/><w:tblW w:w="{total}" w:type="dxa"/><w:tblLayout w:type="fixed"/></w:tblPr><w:tblGrid>"#
    );
    for width in &grid {
      xml.push_str(&format!(r#"<w:gridCol w:w="{width}"/>"#));
    }
    xml.push_str("</w:tblGrid>");

    xml.push_str(r#"<w:tr><w:trPr><w:tblHeader/></w:trPr>"#);
    for (header, width) in table.headers().iter().zip(&grid) {
      xml.push_str(&cell(header, *width, true));
    }
    xml.push_str("</w:tr>");

    for row in table.rows() {
      xml.push_str("<w:tr>");
      for (text, width) in row.iter().zip(&grid) {
        xml.push_str(&cell(text, *width, false));
      }
      xml.push_str("</w:tr>");
    }
    xml.push_str("</w:tbl>");
    xml
  }

  fn section_properties(&self) -> String {
    let page = &self.page;
    format!(
      r#"<w:sectPr><w:pgSz w:w="{}" w:h="{}"/><w:pgMar w:top="{}" w:right="{}" w:bottom="{}" w:left="{}" w:header="0" w:footer="0" w:gutter="0"/></w:sectPr>"#,
      twips(page.width),
      twips(page.height),
      twips(page.margin_top),
      twips(page.margin_right),
      twips(page.margin_bottom),
      twips(page.margin_left),
    )
  }
}

fn twips(points: f32) -> u32 {
  (points * TWIPS_PER_POINT).round().max(0.0) as u32
}

pub fn escape(text: &str) -> String {
  let mut escaped = String::with_capacity(text.len());
  for ch in text.chars() {
    match ch {
      '&' => escaped.push_str("&amp;"),
      '<' => escaped.push_str("&lt;"),
      '>' => escaped.push_str("&gt;"),
      '"' => escaped.push_str("&quot;"),
      '\'' => escaped.push_str("&apos;"),
      // not representable in XML 1.0
      c if (c as u32) < 0x20 && !matches!(c, '\t' | '\n' | '\r') => {}
      c => escaped.push(c),
    }
  }
  escaped
}

fn run(text: &str) -> String {
  format!(r#"<w:r><w:t xml:space="preserve">{}</w:t></w:r>"#, escape(text))
}

fn heading(text: &str, level: u8) -> String {
  let style = if level <= 1 { "Heading1" } else { "Heading2" };
  format!(r#"<w:p><w:pPr><w:pStyle w:val="{style}"/></w:pPr>{}</w:p>"#, run(text))
}

fn paragraph(text: &str) -> String {
  format!("<w:p>{}</w:p>", run(text))
}

fn cell(text: &str, width: u32, header: bool) -> String {
  let shading = if header {
    format!(r#"<w:shd w:val="clear" w:color="auto" w:fill="{}"/>"#, HEADER_SHADING.hex())
  } else {
    String::new()
  };
  let bold = if header { "<w:b/>" } else { "" };
  format!(
    r#"<w:tc><w:tcPr><w:tcW w:w="{width}" w:type="dxa"/>{shading}</w:tcPr><w:p><w:pPr><w:spacing w:after="0"/><w:jc w:val="center"/></w:pPr><w:r><w:rPr>{bold}<w:sz w:val="{size}"/></w:rPr><w:t xml:space="preserve">{text}</w:t></w:r></w:p></w:tc>"#,
    size = CELL_FONT_HALF_POINTS,
    text = escape(text),
  )
}

/// Extent of a picture 6 inches wide with the chart's aspect ratio
pub fn picture_extent(image: &ChartImage) -> (u64, u64) {
  let height = if image.width == 0 {
    0
  } else {
    PICTURE_WIDTH_EMU * image.height as u64 / image.width as u64
  };
  (PICTURE_WIDTH_EMU, height)
}

fn picture_part(number: usize) -> String {
  format!("media/image{number}.png")
}

fn picture(image: &ChartImage, number: usize) -> String {
  let (cx, cy) = picture_extent(image);
  let name = format!("Chart {number}");
  format!(
    r#"<w:p><w:pPr><w:jc w:val="center"/></w:pPr><w:r><w:drawing><wp:inline distT="0" distB="0" distL="0" distR="0"><wp:extent cx="{cx}" cy="{cy}"/><wp:docPr id="{number}" name="{name}"/><a:graphic><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/picture"><pic:pic><pic:nvPicPr><pic:cNvPr id="{number}" name="{name}"/><pic:cNvPicPr/></pic:nvPicPr><pic:blipFill><a:blip r:embed="rIdImage{number}"/><a:stretch><a:fillRect/></a:stretch></pic:blipFill><pic:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></pic:spPr></pic:pic></a:graphicData></a:graphic></wp:inline></w:drawing></w:r></w:p>"#
  )
}

fn document_relationships(pictures: usize) -> String {
  let mut xml = String::from(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rIdStyles" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>"#,
  );
  for number in 1..=pictures {
    xml.push_str(&format!(
      r#"<Relationship Id="rIdImage{number}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="{}"/>"#,
      picture_part(number)
    ));
  }
  xml.push_str("</Relationships>");
  xml
}

fn package(body: &str, pictures: &[&ChartImage]) -> Result<Vec<u8>> {
  let zip_error = |e: zip::result::ZipError| VerdictError::resource(format!("cannot write DOCX: {e}"));
  let options = SimpleFileOptions::default()
    .compression_method(CompressionMethod::Deflated)
    .last_modified_time(DateTime::default());

  let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
  let add = |writer: &mut ZipWriter<Cursor<Vec<u8>>>, name: &str, bytes: &[u8]| -> Result<()> {
    writer.start_file(name, options).map_err(zip_error)?;
    writer.write_all(bytes)?;
    Ok(())
  };

  add(&mut writer, "[Content_Types].xml", CONTENT_TYPES.as_bytes())?;
  add(&mut writer, "_rels/.rels", PACKAGE_RELS.as_bytes())?;
  add(&mut writer, "word/document.xml", body.as_bytes())?;
  add(&mut writer, "word/styles.xml", STYLES.as_bytes())?;
  add(&mut writer, "word/_rels/document.xml.rels", document_relationships(pictures.len()).as_bytes())?;
  for (index, image) in pictures.iter().enumerate() {
    add(&mut writer, &format!("word/{}", picture_part(index + 1)), &image.bytes)?;
  }

  let cursor = writer.finish().map_err(zip_error)?;
  Ok(cursor.into_inner())
}
