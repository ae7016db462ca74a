//! HTML writer for report export
//!
//! Produces a standalone document with an embedded stylesheet: header,
//! optional filter block, one card per case, and a footer with export
//! details. All interpolated content is escaped.

use std::fmt::Write as _;

use chrono::{DateTime, Local};
use tracing::debug;

use crate::error::{ExportError, Result};
use crate::export::ExportFormat;
use crate::model::{ExportData, ReportCase};
use crate::utils::markup::escape;

use super::ReportWriter;

/// Placeholder shown for cases without operative parts
pub const NO_OPERATIVE_PARTS: &str = "No operative parts available";

const STYLESHEET: &str = r#"
    body { font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif; margin: 0; padding: 20px; background-color: #f8f9fa; color: #333; }
    .container { max-width: 1200px; margin: 0 auto; background: white; padding: 30px; border-radius: 8px; box-shadow: 0 2px 10px rgba(0,0,0,0.1); }
    h1 { color: #2563eb; border-bottom: 3px solid #2563eb; padding-bottom: 10px; margin-bottom: 20px; }
    .subtitle { color: #6b7280; font-size: 1.1em; margin-bottom: 30px; }
    .filters { background-color: #f3f4f6; padding: 15px; border-radius: 6px; margin-bottom: 30px; }
    .filters h3 { margin-top: 0; color: #374151; }
    .filters ul { margin: 10px 0 0 0; padding-left: 20px; }
    .case-card { border: 1px solid #e5e7eb; border-radius: 8px; margin-bottom: 25px; overflow: hidden; }
    .case-header { background: linear-gradient(135deg, #f8fafc 0%, #e2e8f0 100%); padding: 20px; border-bottom: 1px solid #e5e7eb; }
    .case-id { font-weight: bold; color: #1e40af; font-size: 1.1em; margin-bottom: 8px; }
    .case-title { font-size: 1.2em; font-weight: 600; margin-bottom: 10px; color: #111827; }
    .case-meta { display: flex; gap: 20px; font-size: 0.9em; color: #6b7280; flex-wrap: wrap; }
    .case-content { padding: 20px; }
    .parties { background-color: #fef3c7; padding: 12px; border-radius: 6px; margin-bottom: 20px; border-left: 4px solid #f59e0b; }
    .operative-part { background-color: #f0f9ff; border: 1px solid #bae6fd; border-radius: 6px; padding: 15px; margin-bottom: 15px; }
    .operative-part-header { font-weight: bold; color: #0369a1; margin-bottom: 10px; font-size: 0.9em; }
    .operative-part-text { line-height: 1.6; color: #374151; white-space: pre-wrap; }
    .no-operative-parts { color: #9ca3af; font-style: italic; text-align: center; padding: 20px; }
    .export-info { text-align: center; margin-top: 40px; padding-top: 20px; border-top: 1px solid #e5e7eb; color: #6b7280; font-size: 0.9em; }
    @media print { body { background-color: white; } .container { box-shadow: none; } .case-card { break-inside: avoid; } }
"#;

/// Writer for standalone HTML documents
#[derive(Debug)]
pub struct HtmlWriter {
    html: String,
    generated_at: DateTime<Local>,
}

impl Default for HtmlWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl HtmlWriter {
    pub fn new() -> Self {
        Self {
            html: String::new(),
            generated_at: Local::now(),
        }
    }

    /// Use a fixed generation time (footer timestamp)
    pub fn with_generated_at(mut self, generated_at: DateTime<Local>) -> Self {
        self.generated_at = generated_at;
        self
    }

    fn render_filters(&mut self, data: &ExportData) -> std::fmt::Result {
        let Some(filters) = data.active_filters() else {
            return Ok(());
        };

        writeln!(self.html, r#"<div class="filters">"#)?;
        writeln!(self.html, "<h3>Applied Filters:</h3>")?;
        writeln!(self.html, "<ul>")?;
        let entries = [
            ("Date From", &filters.date_from),
            ("Date To", &filters.date_to),
            ("Court", &filters.court),
        ];
        for (label, value) in entries {
            if let Some(value) = value.as_deref().filter(|v| !v.trim().is_empty()) {
                writeln!(
                    self.html,
                    "<li><strong>{}:</strong> {}</li>",
                    label,
                    escape(value)
                )?;
            }
        }
        writeln!(self.html, "</ul>")?;
        writeln!(self.html, "</div>")
    }

    fn render_case(&mut self, case: &ReportCase, show_simplified: bool) -> std::fmt::Result {
        let html = &mut self.html;
        writeln!(html, r#"<div class="case-card">"#)?;
        writeln!(html, r#"<div class="case-header">"#)?;
        writeln!(html, r#"<div class="case-id">{}</div>"#, escape(&case.case_id_text))?;
        writeln!(html, r#"<div class="case-title">{}</div>"#, escape(&case.title))?;
        writeln!(html, r#"<div class="case-meta">"#)?;
        writeln!(html, "<span><strong>Court:</strong> {}</span>", escape(&case.court))?;
        writeln!(
            html,
            "<span><strong>Date:</strong> {}</span>",
            escape(&case.date_of_judgment)
        )?;
        writeln!(html, "</div>\n</div>")?;

        writeln!(html, r#"<div class="case-content">"#)?;
        if let Some(parties) = case.parties_text() {
            writeln!(
                html,
                r#"<div class="parties"><strong>Parties:</strong> {}</div>"#,
                escape(parties)
            )?;
        }
        writeln!(html, r#"<div class="operative-parts">"#)?;
        writeln!(html, "<h4>Operative Parts:</h4>")?;
        if case.has_operative_parts() {
            for part in &case.operative_parts {
                writeln!(html, r#"<div class="operative-part">"#)?;
                writeln!(
                    html,
                    r#"<div class="operative-part-header">Part {}</div>"#,
                    part.part_number
                )?;
                writeln!(
                    html,
                    r#"<div class="operative-part-text">{}</div>"#,
                    escape(part.text(show_simplified))
                )?;
                writeln!(html, "</div>")?;
            }
        } else {
            writeln!(html, r#"<div class="no-operative-parts">{NO_OPERATIVE_PARTS}</div>"#)?;
        }
        writeln!(html, "</div>\n</div>\n</div>")
    }

    fn render_footer(&mut self, data: &ExportData) -> std::fmt::Result {
        writeln!(self.html, "</div>")?;
        writeln!(self.html, r#"<div class="export-info">"#)?;
        writeln!(
            self.html,
            "<p>Report generated on {}</p>",
            self.generated_at.format("%Y-%m-%d %H:%M:%S")
        )?;
        writeln!(self.html, "<p>Total cases: {}</p>", data.cases.len())?;
        writeln!(self.html, "<p>Text format: {}</p>", data.text_variant_label())?;
        writeln!(self.html, "</div>\n</div>\n</body>\n</html>")
    }
}

fn fmt_error(err: std::fmt::Error) -> ExportError {
    ExportError::Encoding {
        format: "HTML".to_string(),
        message: err.to_string(),
    }
}

impl ReportWriter for HtmlWriter {
    fn format(&self) -> ExportFormat {
        ExportFormat::Html
    }

    fn begin(&mut self, data: &ExportData) -> Result<()> {
        self.html.clear();
        let title = escape(&data.title);
        write!(
            self.html,
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"UTF-8\">\n\
             <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n\
             <title>{title}</title>\n<style>{STYLESHEET}</style>\n</head>\n<body>\n\
             <div class=\"container\">\n<h1>{title}</h1>\n"
        )
        .map_err(fmt_error)?;
        if let Some(subtitle) = data.subtitle_text() {
            writeln!(self.html, r#"<div class="subtitle">{}</div>"#, escape(subtitle))
                .map_err(fmt_error)?;
        }
        self.render_filters(data).map_err(fmt_error)?;
        writeln!(self.html, r#"<div class="cases">"#).map_err(fmt_error)?;
        Ok(())
    }

    fn write_case(&mut self, case: &ReportCase, data: &ExportData) -> Result<()> {
        self.render_case(case, data.show_simplified)
            .map_err(fmt_error)?;
        Ok(())
    }

    fn finish(&mut self, data: &ExportData) -> Result<Vec<u8>> {
        self.render_footer(data).map_err(fmt_error)?;
        debug!("Finalized HTML document ({} bytes)", self.html.len());
        Ok(std::mem::take(&mut self.html).into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ExportFilters, fixtures};

    fn encode(data: &ExportData) -> String {
        let mut writer = HtmlWriter::new();
        writer.begin(data).unwrap();
        for case in &data.cases {
            writer.write_case(case, data).unwrap();
        }
        String::from_utf8(writer.finish(data).unwrap()).unwrap()
    }

    #[test]
    fn test_html_contains_case_card_and_footer() {
        let mut data = fixtures::data(
            vec![fixtures::case("C-131/12", vec![fixtures::part(1, "verbatim", "simple")])],
            true,
        );
        data.subtitle = Some("Right to be forgotten".to_string());

        let html = encode(&data);

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(r#"<div class="subtitle">Right to be forgotten</div>"#));
        assert!(html.contains(r#"<div class="case-id">C-131/12</div>"#));
        assert!(html.contains("Part 1"));
        assert!(html.contains("<p>Total cases: 1</p>"));
        assert!(html.contains("<p>Text format: Simplified</p>"));
        assert!(html.trim_end().ends_with("</html>"));
    }

    #[test]
    fn test_html_escapes_content() {
        let mut case = fixtures::case("C-1/20", vec![fixtures::part(1, "a < b", "x & y")]);
        case.title = "<script>alert('x')</script>".to_string();
        case.parties = "A \"B\" & C".to_string();
        let data = fixtures::data(vec![case], true);

        let html = encode(&data);

        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;"));
        assert!(html.contains("A &quot;B&quot; &amp; C"));
        assert!(html.contains("x &amp; y"));
    }

    #[test]
    fn test_html_placeholder_for_no_parts() {
        let data = fixtures::data(vec![fixtures::case("C-2/20", vec![])], false);
        let html = encode(&data);
        assert!(html.contains(NO_OPERATIVE_PARTS));
        assert!(html.contains("C-2/20"));
    }

    #[test]
    fn test_html_filters_only_when_present() {
        let mut data = fixtures::data(vec![], true);
        data.filters = Some(ExportFilters::default());
        assert!(!encode(&data).contains("Applied Filters"));

        data.filters = Some(ExportFilters {
            court: Some("General Court".to_string()),
            ..Default::default()
        });
        let html = encode(&data);
        assert!(html.contains("Applied Filters"));
        assert!(html.contains("<li><strong>Court:</strong> General Court</li>"));
        assert!(!html.contains("Date From"));
    }

    #[test]
    fn test_html_variant_selection() {
        let parts = vec![fixtures::part(1, "VERBATIM-TEXT", "SIMPLE-TEXT")];
        let data = fixtures::data(vec![fixtures::case("C-3/20", parts)], false);
        let html = encode(&data);
        assert!(html.contains("VERBATIM-TEXT"));
        assert!(!html.contains("SIMPLE-TEXT"));
        assert!(html.contains("Full verbatim"));
    }
}
