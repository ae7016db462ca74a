//! PDF writer for report export
//!
//! Layout happens in two steps. A cursor-driven layout pass places every
//! line of text on a page (millimetre coordinates, origin top-left, y is
//! the baseline), starting a new page whenever the remaining space drops
//! below a threshold. The placed lines are then rendered with `lopdf`
//! using the standard Helvetica fonts.
//!
//! Page breaks are only taken before a case block (50 mm left), before an
//! operative part (30 mm left) or between wrapped lines that would cross
//! the bottom margin. A case header therefore always shares its page with
//! the first line of its title, and a part label with the first line of
//! its text.

use chrono::{DateTime, Local};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use tracing::debug;

use crate::error::{ExportError, Result};
use crate::export::ExportFormat;
use crate::model::{ExportData, ReportCase};

use super::ReportWriter;
use super::metrics::{Font, split_text_to_size};

/// Points per millimetre
pub const MM_TO_PT: f64 = 72.0 / 25.4;

/// Minimum space left on a page before a case starts
pub const CASE_BREAK_THRESHOLD: f64 = 50.0;
/// Minimum space left on a page before an operative part starts
pub const PART_BREAK_THRESHOLD: f64 = 30.0;
/// Extra indent of operative part text
pub const PART_INDENT: f64 = 10.0;

/// Page size and margin in millimetres
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f64,
    pub height: f64,
    pub margin: f64,
}

impl PageGeometry {
    pub const A4: PageGeometry = PageGeometry {
        width: 210.0,
        height: 297.0,
        margin: 20.0,
    };

    pub fn content_width(&self) -> f64 {
        self.width - 2.0 * self.margin
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::A4
    }
}

/// A line of text placed on a page
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedText {
    pub x: f64,
    pub y: f64,
    pub font: Font,
    pub size: f64,
    pub text: String,
}

/// Content of one page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PdfPage {
    pub items: Vec<PlacedText>,
}

/// Cursor-based page layout
#[derive(Debug, Clone)]
struct PdfLayout {
    geometry: PageGeometry,
    pages: Vec<PdfPage>,
    y: f64,
    font: Font,
    size: f64,
}

impl PdfLayout {
    fn new(geometry: PageGeometry) -> Self {
        Self {
            geometry,
            pages: vec![PdfPage::default()],
            y: geometry.margin,
            font: Font::Regular,
            size: 10.0,
        }
    }

    fn set_font(&mut self, font: Font, size: f64) {
        self.font = font;
        self.size = size;
    }

    fn new_page(&mut self) {
        self.pages.push(PdfPage::default());
        self.y = self.geometry.margin;
    }

    /// Start a new page if less than `min_remaining` is left
    fn ensure_space(&mut self, min_remaining: f64) {
        if self.y > self.geometry.height - min_remaining {
            self.new_page();
        }
    }

    fn place(&mut self, text: &str, x: f64) {
        if text.is_empty() {
            return;
        }
        let item = PlacedText {
            x,
            y: self.y,
            font: self.font,
            size: self.size,
            text: text.to_string(),
        };
        if let Some(page) = self.pages.last_mut() {
            page.items.push(item);
        }
    }

    /// Wrap `text` to `width` and place it line by line
    ///
    /// The cursor advances by `lines × line_height + gap`.
    fn paragraph(&mut self, text: &str, x: f64, width: f64, line_height: f64, gap: f64) {
        // Text sizes are in points, layout widths in millimetres
        let lines = split_text_to_size(text, width * MM_TO_PT, self.font, self.size);
        for (i, line) in lines.iter().enumerate() {
            if i > 0 {
                self.y += line_height;
            }
            if self.y > self.geometry.height - self.geometry.margin {
                self.new_page();
            }
            self.place(line, x);
        }
        self.y += line_height + gap;
    }

    fn line(&mut self, text: &str, advance: f64) {
        let margin = self.geometry.margin;
        let width = self.geometry.content_width();
        self.paragraph(text, margin, width, advance, 0.0);
    }
}

/// Writer for paginated PDF documents
#[derive(Debug)]
pub struct PdfWriter {
    layout: PdfLayout,
    generated_at: DateTime<Local>,
}

impl Default for PdfWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfWriter {
    /// Writer with A4 pages and a 20 mm margin
    pub fn new() -> Self {
        Self::with_geometry(PageGeometry::A4)
    }

    pub fn with_geometry(geometry: PageGeometry) -> Self {
        Self {
            layout: PdfLayout::new(geometry),
            generated_at: Local::now(),
        }
    }

    /// Pages laid out so far
    pub fn pages(&self) -> &[PdfPage] {
        &self.layout.pages
    }

    /// Render the laid out pages into a PDF file
    fn render(&self, title: &str) -> Result<Vec<u8>> {
        let geometry = self.layout.geometry;
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();

        let regular_id = doc.add_object(font_dictionary(Font::Regular));
        let bold_id = doc.add_object(font_dictionary(Font::Bold));
        let fonts = Dictionary::from_iter(vec![
            (Font::Regular.resource_name(), Object::Reference(regular_id)),
            (Font::Bold.resource_name(), Object::Reference(bold_id)),
        ]);
        let resources_id = doc.add_object(Dictionary::from_iter(vec![(
            "Font",
            Object::Dictionary(fonts),
        )]));

        let mut page_ids: Vec<ObjectId> = Vec::with_capacity(self.layout.pages.len());
        for page in &self.layout.pages {
            let content = Content {
                operations: page_operations(page, &geometry),
            };
            let encoded = content
                .encode()
                .map_err(|e| ExportError::Pdf(format!("Failed to encode page content: {e}")))?;
            let content_id = doc.add_object(Stream::new(Dictionary::new(), encoded));

            let page_dict = Dictionary::from_iter(vec![
                ("Type", Object::Name(b"Page".to_vec())),
                ("Parent", Object::Reference(pages_id)),
                ("Contents", Object::Reference(content_id)),
            ]);
            page_ids.push(doc.add_object(page_dict));
        }

        let pages = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Count", Object::Integer(page_ids.len() as i64)),
            (
                "Kids",
                Object::Array(page_ids.iter().map(|id| Object::Reference(*id)).collect()),
            ),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Real((geometry.width * MM_TO_PT) as f32),
                    Object::Real((geometry.height * MM_TO_PT) as f32),
                ]),
            ),
            ("Resources", Object::Reference(resources_id)),
        ]);
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(pages_id)),
        ]));
        doc.trailer.set("Root", Object::Reference(catalog_id));

        let info_id = doc.add_object(Dictionary::from_iter(vec![
            ("Title", Object::String(to_win_ansi(title), StringFormat::Literal)),
            (
                "CreationDate",
                Object::String(
                    self.generated_at
                        .format("D:%Y%m%d%H%M%S")
                        .to_string()
                        .into_bytes(),
                    StringFormat::Literal,
                ),
            ),
        ]));
        doc.trailer.set("Info", Object::Reference(info_id));
        doc.compress();

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer)
            .map_err(|e| ExportError::Pdf(format!("Failed to save document: {e}")))?;
        Ok(buffer)
    }
}

fn font_dictionary(font: Font) -> Dictionary {
    Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Font".to_vec())),
        ("Subtype", Object::Name(b"Type1".to_vec())),
        ("BaseFont", Object::Name(font.base_font().as_bytes().to_vec())),
        ("Encoding", Object::Name(b"WinAnsiEncoding".to_vec())),
    ])
}

fn page_operations(page: &PdfPage, geometry: &PageGeometry) -> Vec<Operation> {
    let mut operations = Vec::with_capacity(page.items.len() * 5);
    for item in &page.items {
        let x = item.x * MM_TO_PT;
        let y = (geometry.height - item.y) * MM_TO_PT;
        operations.push(Operation::new("BT", vec![]));
        operations.push(Operation::new(
            "Tf",
            vec![
                Object::Name(item.font.resource_name().as_bytes().to_vec()),
                Object::Real(item.size as f32),
            ],
        ));
        operations.push(Operation::new(
            "Tm",
            vec![
                Object::Integer(1),
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(1),
                Object::Real(x as f32),
                Object::Real(y as f32),
            ],
        ));
        operations.push(Operation::new(
            "Tj",
            vec![Object::String(to_win_ansi(&item.text), StringFormat::Literal)],
        ));
        operations.push(Operation::new("ET", vec![]));
    }
    operations
}

/// Encode text for a WinAnsiEncoding font, replacing unsupported characters
fn to_win_ansi(text: &str) -> Vec<u8> {
    text.chars().map(|c| win_ansi_byte(c).unwrap_or(b'?')).collect()
}

/// Number of characters `to_win_ansi` replaces with `?`
fn unsupported_chars(text: &str) -> usize {
    text.chars().filter(|c| win_ansi_byte(*c).is_none()).count()
}

fn win_ansi_byte(c: char) -> Option<u8> {
    let byte = match c {
        ' '..='~' => c as u8,
        '\u{a0}'..='\u{ff}' => c as u32 as u8,
        '€' => 0x80,
        '…' => 0x85,
        '‘' => 0x91,
        '’' => 0x92,
        '“' => 0x93,
        '”' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        '\t' => b' ',
        _ => return None,
    };
    Some(byte)
}

impl ReportWriter for PdfWriter {
    fn format(&self) -> ExportFormat {
        ExportFormat::Pdf
    }

    fn begin(&mut self, data: &ExportData) -> Result<()> {
        let layout = &mut self.layout;
        *layout = PdfLayout::new(layout.geometry);
        let margin = layout.geometry.margin;
        let width = layout.geometry.content_width();

        layout.set_font(Font::Bold, 20.0);
        layout.paragraph(&data.title, margin, width, 8.0, 7.0);

        if let Some(subtitle) = data.subtitle_text() {
            layout.set_font(Font::Regular, 14.0);
            layout.paragraph(subtitle, margin, width, 6.0, 4.0);
        }

        layout.set_font(Font::Regular, 10.0);
        let generated = self.generated_at.format("%Y-%m-%d").to_string();
        layout.line(&format!("Generated on: {generated}"), 7.0);
        layout.line(&format!("Total cases: {}", data.cases.len()), 7.0);
        layout.line(&format!("Text format: {}", data.text_variant_label()), 15.0);
        Ok(())
    }

    fn write_case(&mut self, case: &ReportCase, data: &ExportData) -> Result<()> {
        let layout = &mut self.layout;
        let margin = layout.geometry.margin;
        let width = layout.geometry.content_width();

        layout.ensure_space(CASE_BREAK_THRESHOLD);

        layout.set_font(Font::Bold, 14.0);
        layout.line(&case.case_id_text, 10.0);

        layout.set_font(Font::Bold, 12.0);
        layout.paragraph(&case.title, margin, width, 7.0, 5.0);

        layout.set_font(Font::Regular, 10.0);
        layout.line(&format!("Court: {}", case.court), 7.0);
        layout.line(&format!("Date: {}", case.date_of_judgment), 7.0);
        if let Some(parties) = case.parties_text() {
            layout.paragraph(&format!("Parties: {parties}"), margin, width, 7.0, 5.0);
        }

        if case.has_operative_parts() {
            layout.set_font(Font::Bold, 10.0);
            layout.line("Operative Parts:", 10.0);

            for part in &case.operative_parts {
                layout.ensure_space(PART_BREAK_THRESHOLD);

                layout.set_font(Font::Bold, 10.0);
                layout.line(&format!("Part {}:", part.part_number), 7.0);

                layout.set_font(Font::Regular, 10.0);
                layout.paragraph(
                    part.text(data.show_simplified),
                    margin + PART_INDENT,
                    width - PART_INDENT,
                    5.0,
                    8.0,
                );
            }
        }

        layout.y += 10.0;
        Ok(())
    }

    fn finish(&mut self, data: &ExportData) -> Result<Vec<u8>> {
        let replaced = unsupported_chars(&data.title)
            + self
                .layout
                .pages
                .iter()
                .flat_map(|page| &page.items)
                .map(|item| unsupported_chars(&item.text))
                .sum::<usize>();
        if replaced > 0 {
            debug!("{} character(s) outside WinAnsiEncoding replaced with '?'", replaced);
        }

        let bytes = self.render(&data.title)?;
        debug!(
            "Rendered PDF: {} pages, {} bytes",
            self.layout.pages.len(),
            bytes.len()
        );
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::writers::metrics::text_width;
    use crate::model::fixtures;

    fn build(data: &ExportData) -> (PdfWriter, Vec<u8>) {
        let mut writer = PdfWriter::new();
        writer.begin(data).unwrap();
        for case in &data.cases {
            writer.write_case(case, data).unwrap();
        }
        let bytes = writer.finish(data).unwrap();
        (writer, bytes)
    }

    fn all_text(writer: &PdfWriter) -> Vec<String> {
        writer
            .pages()
            .iter()
            .flat_map(|p| p.items.iter().map(|i| i.text.clone()))
            .collect()
    }

    fn long_case(i: usize) -> ReportCase {
        let text = "The provisions of the Regulation must be interpreted as meaning that \
                    the supervisory authority is required to suspend or prohibit a transfer. "
            .repeat(3);
        fixtures::case(
            &format!("C-{i}/22"),
            (1..=3)
                .map(|n| fixtures::part(n, &format!("{text} verbatim"), &format!("{text} simplified")))
                .collect(),
        )
    }

    #[test]
    fn test_pdf_single_page_document() {
        let data = fixtures::data(vec![fixtures::case("C-1/20", vec![])], true);
        let (writer, bytes) = build(&data);

        assert_eq!(writer.pages().len(), 1);
        assert!(bytes.starts_with(b"%PDF-1.7"));

        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);

        let text = all_text(&writer);
        assert_eq!(text[0], "EU Law Report: GDPR");
        assert!(text.contains(&"C-1/20".to_string()));
        assert!(!text.contains(&"Operative Parts:".to_string()));
    }

    #[test]
    fn test_pdf_paginates_and_keeps_part_label_with_text() {
        let data = fixtures::data((0..12).map(long_case).collect(), true);
        let (writer, bytes) = build(&data);

        let pages = writer.pages();
        assert!(pages.len() > 1);
        assert_eq!(Document::load_mem(&bytes).unwrap().get_pages().len(), pages.len());

        let geometry = PageGeometry::A4;
        for page in pages {
            for (i, item) in page.items.iter().enumerate() {
                assert!(item.y <= geometry.height - geometry.margin + 1e-9);

                if item.font == Font::Bold && item.text.starts_with("Part ") {
                    let next = page.items.get(i + 1).expect("part label ends a page");
                    assert_eq!(next.font, Font::Regular);
                    assert_eq!(next.x, geometry.margin + PART_INDENT);
                }
                if item.font == Font::Bold && item.size == 14.0 {
                    let title = page.items.get(i + 1).expect("case header ends a page");
                    assert_eq!(title.size, 12.0);
                }
            }
        }
    }

    #[test]
    fn test_pdf_wraps_long_text_within_content_width() {
        let data = fixtures::data(vec![long_case(1)], false);
        let (writer, _) = build(&data);

        let geometry = PageGeometry::A4;
        for item in writer.pages().iter().flat_map(|p| p.items.iter()) {
            let width_mm = text_width(&item.text, item.font, item.size) / MM_TO_PT;
            assert!(item.x + width_mm <= geometry.width - geometry.margin + 1e-6);
        }
    }

    #[test]
    fn test_pdf_variant_selection() {
        let parts = vec![fixtures::part(1, "VERBATIM-ONLY", "SIMPLIFIED-ONLY")];
        let data = fixtures::data(vec![fixtures::case("C-4/20", parts)], true);
        let (writer, _) = build(&data);

        let text = all_text(&writer).join("\n");
        assert!(text.contains("SIMPLIFIED-ONLY"));
        assert!(!text.contains("VERBATIM-ONLY"));
    }

    #[test]
    fn test_win_ansi_encoding() {
        assert_eq!(to_win_ansi("Café – €"), vec![b'C', b'a', b'f', 0xe9, b' ', 0x96, b' ', 0x80]);
        assert_eq!(to_win_ansi("Ω"), b"?".to_vec());
    }

    #[test]
    fn test_unsupported_chars_are_counted() {
        // ó is Latin-1, Ł ź č are not
        assert_eq!(unsupported_chars("Łódź č"), 3);
        assert_eq!(to_win_ansi("Łódź č"), vec![b'?', 0xf3, b'd', b'?', b' ', b'?']);
        assert_eq!(unsupported_chars("Café – €"), 0);
    }
}
