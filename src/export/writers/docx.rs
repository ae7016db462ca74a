//! Word writer for report export
//!
//! Builds a small document model (styled paragraphs made of plain or bold
//! runs) and packs it as an Office Open XML `.docx` archive.

use std::io::{Cursor, Write};

use chrono::{DateTime, Local, Utc};
use tracing::debug;
use zip::CompressionMethod;
use zip::write::SimpleFileOptions;

use crate::error::{ExportError, Result};
use crate::export::ExportFormat;
use crate::model::{ExportData, ReportCase};
use crate::utils::markup::{escape, strip_invalid_xml_chars};

use super::ReportWriter;

/// Paragraph style, mapped to the styles in `word/styles.xml`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParagraphStyle {
    Title,
    Heading1,
    Heading2,
    Heading3,
}

impl ParagraphStyle {
    fn style_id(&self) -> &'static str {
        match self {
            ParagraphStyle::Title => "Title",
            ParagraphStyle::Heading1 => "Heading1",
            ParagraphStyle::Heading2 => "Heading2",
            ParagraphStyle::Heading3 => "Heading3",
        }
    }
}

/// A run of text with uniform formatting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRun {
    pub text: String,
    pub bold: bool,
}

/// A paragraph of the document body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paragraph {
    pub style: Option<ParagraphStyle>,
    pub runs: Vec<TextRun>,
}

impl Paragraph {
    pub fn heading(style: ParagraphStyle, text: impl Into<String>) -> Self {
        Self {
            style: Some(style),
            runs: vec![TextRun {
                text: text.into(),
                bold: false,
            }],
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self {
            style: None,
            runs: vec![TextRun {
                text: text.into(),
                bold: false,
            }],
        }
    }

    /// Bold label followed by plain text
    pub fn labelled(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            style: None,
            runs: vec![
                TextRun {
                    text: label.into(),
                    bold: true,
                },
                TextRun {
                    text: value.into(),
                    bold: false,
                },
            ],
        }
    }

    pub fn empty() -> Self {
        Self {
            style: None,
            runs: Vec::new(),
        }
    }

    /// Concatenated text of all runs
    pub fn plain_text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    fn to_xml(&self, out: &mut String) {
        out.push_str("<w:p>");
        if let Some(style) = self.style {
            out.push_str(&format!(
                r#"<w:pPr><w:pStyle w:val="{}"/></w:pPr>"#,
                style.style_id()
            ));
        }
        for run in &self.runs {
            out.push_str("<w:r>");
            if run.bold {
                out.push_str("<w:rPr><w:b/></w:rPr>");
            }
            let text = strip_invalid_xml_chars(&run.text);
            for (i, line) in text.split('\n').enumerate() {
                if i > 0 {
                    out.push_str("<w:br/>");
                }
                out.push_str(r#"<w:t xml:space="preserve">"#);
                out.push_str(&escape(line.trim_end_matches('\r')));
                out.push_str("</w:t>");
            }
            out.push_str("</w:r>");
        }
        out.push_str("</w:p>");
    }
}

/// Writer for Word documents
#[derive(Debug)]
pub struct DocxWriter {
    paragraphs: Vec<Paragraph>,
    generated_at: DateTime<Local>,
}

impl Default for DocxWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl DocxWriter {
    pub fn new() -> Self {
        Self {
            paragraphs: Vec::new(),
            generated_at: Local::now(),
        }
    }

    /// Document body built so far
    pub fn paragraphs(&self) -> &[Paragraph] {
        &self.paragraphs
    }

    fn push(&mut self, paragraph: Paragraph) {
        self.paragraphs.push(paragraph);
    }

    fn document_xml(&self) -> String {
        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>"#,
        );
        for paragraph in &self.paragraphs {
            paragraph.to_xml(&mut xml);
        }
        xml.push_str(
            r#"<w:sectPr><w:pgSz w:w="11906" w:h="16838"/><w:pgMar w:top="1440" w:right="1440" w:bottom="1440" w:left="1440" w:header="708" w:footer="708" w:gutter="0"/></w:sectPr></w:body></w:document>"#,
        );
        xml
    }

    fn core_xml(&self, title: &str) -> String {
        let created = self.generated_at.with_timezone(&Utc).format("%Y-%m-%dT%H:%M:%SZ");
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"><dc:title>{}</dc:title><dcterms:created xsi:type="dcterms:W3CDTF">{}</dcterms:created></cp:coreProperties>"#,
            escape(&strip_invalid_xml_chars(title)),
            created
        )
    }

    /// Pack the document parts into a zip container
    fn pack(&self, title: &str) -> Result<Vec<u8>> {
        let parts = [
            ("[Content_Types].xml", CONTENT_TYPES_XML.to_string()),
            ("_rels/.rels", ROOT_RELS_XML.to_string()),
            ("docProps/core.xml", self.core_xml(title)),
            ("word/_rels/document.xml.rels", DOCUMENT_RELS_XML.to_string()),
            ("word/styles.xml", STYLES_XML.to_string()),
            ("word/document.xml", self.document_xml()),
        ];

        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        for (name, content) in parts {
            zip.start_file(name, options)?;
            zip.write_all(content.as_bytes())
                .map_err(|e| ExportError::Archive(format!("Failed to write {name}: {e}")))?;
        }
        let cursor = zip.finish()?;
        Ok(cursor.into_inner())
    }
}

impl ReportWriter for DocxWriter {
    fn format(&self) -> ExportFormat {
        ExportFormat::Word
    }

    fn begin(&mut self, data: &ExportData) -> Result<()> {
        self.paragraphs.clear();
        self.push(Paragraph::heading(ParagraphStyle::Title, &data.title));
        if let Some(subtitle) = data.subtitle_text() {
            self.push(Paragraph::heading(ParagraphStyle::Heading2, subtitle));
        }
        let generated = self.generated_at.format("%Y-%m-%d").to_string();
        self.push(Paragraph::text(format!("Generated on: {generated}")));
        self.push(Paragraph::text(format!("Total cases: {}", data.cases.len())));
        self.push(Paragraph::text(format!(
            "Text format: {}",
            data.text_variant_label()
        )));
        self.push(Paragraph::empty());
        Ok(())
    }

    fn write_case(&mut self, case: &ReportCase, data: &ExportData) -> Result<()> {
        self.push(Paragraph::heading(ParagraphStyle::Heading1, &case.case_id_text));
        self.push(Paragraph::heading(ParagraphStyle::Heading2, &case.title));
        self.push(Paragraph::labelled("Court: ", &case.court));
        self.push(Paragraph::labelled("Date: ", &case.date_of_judgment));
        if let Some(parties) = case.parties_text() {
            self.push(Paragraph::labelled("Parties: ", parties));
        }

        if case.has_operative_parts() {
            self.push(Paragraph::heading(ParagraphStyle::Heading3, "Operative Parts:"));
            for part in &case.operative_parts {
                self.push(Paragraph::labelled(
                    format!("Part {}: ", part.part_number),
                    part.text(data.show_simplified),
                ));
            }
        }

        self.push(Paragraph::empty());
        Ok(())
    }

    fn finish(&mut self, data: &ExportData) -> Result<Vec<u8>> {
        let bytes = self.pack(&data.title)?;
        debug!(
            "Packed Word document: {} paragraphs, {} bytes",
            self.paragraphs.len(),
            bytes.len()
        );
        Ok(bytes)
    }
}

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/><Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/></Types>"#;

const ROOT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/></Relationships>"#;

const DOCUMENT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#;

const STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:docDefaults><w:rPrDefault><w:rPr><w:rFonts w:ascii="Calibri" w:hAnsi="Calibri" w:cs="Calibri"/><w:sz w:val="22"/></w:rPr></w:rPrDefault><w:pPrDefault><w:pPr><w:spacing w:after="120"/></w:pPr></w:pPrDefault></w:docDefaults><w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/></w:style><w:style w:type="paragraph" w:styleId="Title"><w:name w:val="Title"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:pPr><w:spacing w:after="240"/></w:pPr><w:rPr><w:b/><w:sz w:val="56"/></w:rPr></w:style><w:style w:type="paragraph" w:styleId="Heading1"><w:name w:val="heading 1"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:pPr><w:keepNext/><w:spacing w:before="240"/><w:outlineLvl w:val="0"/></w:pPr><w:rPr><w:b/><w:color w:val="1E40AF"/><w:sz w:val="32"/></w:rPr></w:style><w:style w:type="paragraph" w:styleId="Heading2"><w:name w:val="heading 2"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:pPr><w:keepNext/><w:outlineLvl w:val="1"/></w:pPr><w:rPr><w:b/><w:sz w:val="26"/></w:rPr></w:style><w:style w:type="paragraph" w:styleId="Heading3"><w:name w:val="heading 3"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:pPr><w:keepNext/><w:outlineLvl w:val="2"/></w:pPr><w:rPr><w:b/><w:sz w:val="24"/></w:rPr></w:style></w:styles>"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures;
    use std::io::Read;

    fn build(data: &ExportData) -> (DocxWriter, Vec<u8>) {
        let mut writer = DocxWriter::new();
        writer.begin(data).unwrap();
        for case in &data.cases {
            writer.write_case(case, data).unwrap();
        }
        let bytes = writer.finish(data).unwrap();
        (writer, bytes)
    }

    fn read_part(bytes: &[u8], name: &str) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut file = archive.by_name(name).unwrap();
        let mut content = String::new();
        file.read_to_string(&mut content).unwrap();
        content
    }

    #[test]
    fn test_docx_case_structure() {
        let case = fixtures::case(
            "C-362/14",
            vec![
                fixtures::part(1, "verbatim one", "simple one"),
                fixtures::part(2, "verbatim two", "simple two"),
            ],
        );
        let data = fixtures::data(vec![case], true);
        let (writer, _) = build(&data);

        let paragraphs = writer.paragraphs();
        assert_eq!(paragraphs[0].style, Some(ParagraphStyle::Title));
        assert_eq!(paragraphs[3].plain_text(), "Text format: Simplified");

        let case_start = paragraphs
            .iter()
            .position(|p| p.style == Some(ParagraphStyle::Heading1))
            .unwrap();
        let case_block: Vec<String> =
            paragraphs[case_start..].iter().map(Paragraph::plain_text).collect();
        assert_eq!(
            case_block,
            vec![
                "C-362/14",
                "Judgment in C-362/14",
                "Court: Court of Justice",
                "Date: 2021-06-15",
                "Parties: Facebook Ireland v Gegevensbeschermingsautoriteit",
                "Operative Parts:",
                "Part 1: simple one",
                "Part 2: simple two",
                "",
            ]
        );
        assert!(paragraphs[case_start + 6].runs[0].bold);
        assert!(!paragraphs[case_start + 6].runs[1].bold);
    }

    #[test]
    fn test_docx_omits_empty_sections() {
        let mut case = fixtures::case("C-5/20", vec![]);
        case.parties = String::new();
        let data = fixtures::data(vec![case], false);
        let (writer, _) = build(&data);

        let texts: Vec<String> = writer.paragraphs().iter().map(Paragraph::plain_text).collect();
        assert!(texts.contains(&"C-5/20".to_string()));
        assert!(!texts.iter().any(|t| t.starts_with("Parties")));
        assert!(!texts.iter().any(|t| t == "Operative Parts:"));
    }

    #[test]
    fn test_docx_archive_contents() {
        let mut case = fixtures::case("C-6/20", vec![fixtures::part(1, "A & B", "<simple>")]);
        case.title = "Line one\nLine two".to_string();
        let data = fixtures::data(vec![case], true);
        let (_, bytes) = build(&data);

        assert_eq!(&bytes[..2], b"PK");
        let document = read_part(&bytes, "word/document.xml");
        assert!(document.contains(r#"<w:pStyle w:val="Heading1"/>"#));
        assert!(document.contains("&lt;simple&gt;"));
        assert!(!document.contains("A &amp; B"));
        assert!(document.contains("Line one</w:t><w:br/>"));

        let types = read_part(&bytes, "[Content_Types].xml");
        assert!(types.contains("/word/document.xml"));
        let core = read_part(&bytes, "docProps/core.xml");
        assert!(core.contains("<dc:title>EU Law Report: GDPR</dc:title>"));
    }
}
