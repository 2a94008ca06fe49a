//! Fixed-page PDF output.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use tracing::debug;

use super::layout::{Element, LaidOutDocument, LayoutEngine, GRID_WIDTH};
use super::metrics::{self, FontFace};
use super::ReportDocument;
use crate::chart::ChartImage;
use crate::color::Color;
use crate::config::{ChartSettings, PageSettings};
use crate::{Result, VerdictError};

pub struct PdfEncoder {
  layout: LayoutEngine,
}

impl PdfEncoder {
  pub fn new(page: PageSettings, chart: ChartSettings) -> Self {
    Self { layout: LayoutEngine::new(page, chart) }
  }

  pub fn encode(&self, document: &ReportDocument) -> Result<Vec<u8>> {
    let laid_out = self.layout.layout(document);
    write_pdf(&laid_out)
  }
}

fn pdf_error(context: &str, error: lopdf::Error) -> VerdictError {
  VerdictError::resource(format!("cannot write PDF {context}: {error}"))
}

pub fn write_pdf(laid_out: &LaidOutDocument) -> Result<Vec<u8>> {
  let mut doc = Document::with_version("1.5");
  let pages_id = doc.new_object_id();

  let mut fonts = Dictionary::new();
  for face in [FontFace::Regular, FontFace::Bold] {
    let font_id = doc.add_object(dictionary! {
      "Type" => "Font",
      "Subtype" => "Type1",
      "BaseFont" => face.base_font(),
      "Encoding" => "WinAnsiEncoding",
    });
    fonts.set(face.resource_name(), font_id);
  }

  let images = laid_out.images();
  let mut xobjects = Dictionary::new();
  for (index, image) in images.iter().enumerate() {
    let image_id = doc.add_object(image_stream(image)?);
    xobjects.set(image_name(index), image_id);
  }

  let resources_id = doc.add_object(dictionary! {
    "Font" => fonts,
    "XObject" => xobjects,
  });

  let mut kids: Vec<Object> = Vec::new();
  for page in &laid_out.pages {
    let mut operations = Vec::new();
    for placed in &page.items {
      draw(&mut operations, &placed.element, laid_out.height, &images);
    }
    let content = Content { operations }.encode().map_err(|e| pdf_error("page content", e))?;
    let mut stream = Stream::new(Dictionary::new(), content);
    stream.compress().map_err(|e| pdf_error("page content", e))?;
    let content_id = doc.add_object(stream);

    let page_id: ObjectId = doc.add_object(dictionary! {
      "Type" => "Page",
      "Parent" => pages_id,
      "Contents" => content_id,
    });
    kids.push(page_id.into());
  }

  let page_count = kids.len() as i64;
  doc.objects.insert(
    pages_id,
    Object::Dictionary(dictionary! {
      "Type" => "Pages",
      "Kids" => kids,
      "Count" => page_count,
      "Resources" => resources_id,
      "MediaBox" => vec![
        Object::Integer(0),
        Object::Integer(0),
        Object::Real(laid_out.width),
        Object::Real(laid_out.height),
      ],
    }),
  );

  let catalog_id = doc.add_object(dictionary! {
    "Type" => "Catalog",
    "Pages" => pages_id,
  });
  doc.trailer.set("Root", catalog_id);

  let mut bytes = Vec::new();
  doc
    .save_to(&mut bytes)
    .map_err(|e| VerdictError::resource(format!("cannot write PDF document: {e}")))?;
  debug!(pages = page_count, images = images.len(), size = bytes.len(), "encoded PDF");
  Ok(bytes)
}

fn image_name(index: usize) -> String {
  format!("Im{}", index + 1)
}

fn image_stream(image: &ChartImage) -> Result<Stream> {
  let pixels = image.decode_rgb()?;
  let (width, height) = pixels.dimensions();
  let mut stream = Stream::new(
    dictionary! {
      "Type" => "XObject",
      "Subtype" => "Image",
      "Width" => width as i64,
      "Height" => height as i64,
      "ColorSpace" => "DeviceRGB",
      "BitsPerComponent" => 8,
    },
    pixels.into_raw(),
  );
  stream.compress().map_err(|e| pdf_error("chart image", e))?;
  Ok(stream)
}

fn rgb(operator: &str, color: Color) -> Operation {
  let [r, g, b] = color.unit();
  Operation::new(operator, vec![r.into(), g.into(), b.into()])
}

fn draw(operations: &mut Vec<Operation>, element: &Element, page_height: f32, images: &[&ChartImage]) {
  match element {
    Element::Text { x, baseline, text, face, size, color } => {
      operations.extend([
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec![face.resource_name().into(), (*size).into()]),
        rgb("rg", *color),
        Operation::new("Td", vec![(*x).into(), (page_height - baseline).into()]),
        Operation::new("Tj", vec![Object::string_literal(metrics::encode_latin1(text))]),
        Operation::new("ET", vec![]),
      ]);
    }
    Element::Rect { x, top, width, height, fill, stroke } => {
      operations.push(Operation::new("q", vec![]));
      if let Some(fill) = fill {
        operations.push(rgb("rg", *fill));
      }
      if let Some(stroke) = stroke {
        operations.push(rgb("RG", *stroke));
        operations.push(Operation::new("w", vec![GRID_WIDTH.into()]));
      }
      let y = page_height - top - height;
      operations.push(Operation::new("re", vec![(*x).into(), y.into(), (*width).into(), (*height).into()]));
      let paint = match (fill.is_some(), stroke.is_some()) {
        (true, true) => "B",
        (true, false) => "f",
        (false, true) => "S",
        (false, false) => "n",
      };
      operations.push(Operation::new(paint, vec![]));
      operations.push(Operation::new("Q", vec![]));
    }
    Element::Image { x, top, width, height, image } => {
      let Some(index) = images.iter().position(|seen| std::ptr::eq(*seen, *image)) else {
        return;
      };
      let y = page_height - top - height;
      operations.extend([
        Operation::new("q", vec![]),
        Operation::new(
          "cm",
          vec![(*width).into(), 0.into(), 0.into(), (*height).into(), (*x).into(), y.into()],
        ),
        Operation::new("Do", vec![image_name(index).into()]),
        Operation::new("Q", vec![]),
      ]);
    }
  }
}

#[cfg(test)]
pub(crate) mod tests {
  use super::*;
  use crate::report::Block;

  /// Text shown on each page, in drawing order
  pub(crate) fn page_texts(bytes: &[u8]) -> Vec<Vec<String>> {
    let doc = Document::load_mem(bytes).unwrap();
    doc
      .get_pages()
      .values()
      .map(|page_id| {
        let content = Content::decode(&doc.get_page_content(*page_id).unwrap()).unwrap();
        content
          .operations
          .iter()
          .filter(|op| op.operator == "Tj")
          .filter_map(|op| match op.operands.first() {
            Some(Object::String(bytes, _)) => Some(bytes.iter().map(|b| *b as char).collect()),
            _ => None,
          })
          .collect()
      })
      .collect()
  }

  fn encoder() -> PdfEncoder {
    PdfEncoder::new(PageSettings::default(), ChartSettings::default())
  }

  #[test]
  fn test_pdf_header_and_pages() {
    let mut document = ReportDocument::new();
    document.push(Block::Heading { text: "Report".into(), level: 1 });
    document.push(Block::PageBreak);
    document.push(Block::Paragraph("Second page".into()));

    let bytes = encoder().encode(&document).unwrap();
    assert!(bytes.starts_with(b"%PDF-1.5"));
    assert_eq!(page_texts(&bytes), vec![vec!["Report".to_string()], vec!["Second page".to_string()]]);
  }

  #[test]
  fn test_non_latin1_text_is_replaced() {
    let mut document = ReportDocument::new();
    document.push(Block::Paragraph("naïve → ok".into()));
    let bytes = encoder().encode(&document).unwrap();
    assert_eq!(page_texts(&bytes)[0], vec!["naïve ? ok".to_string()]);
  }

  #[test]
  fn test_encoding_is_deterministic() {
    let mut document = ReportDocument::new();
    document.push(Block::Paragraph("same bytes every time".into()));
    assert_eq!(encoder().encode(&document).unwrap(), encoder().encode(&document).unwrap());
  }
}
