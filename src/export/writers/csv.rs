//! CSV writer for report export
//!
//! One row per case under a fixed header. Every field is quoted, and
//! embedded quotes are doubled, regardless of content.

use tracing::debug;

use crate::error::Result;
use crate::export::ExportFormat;
use crate::model::{ExportData, ReportCase};

use super::ReportWriter;

/// Fixed header row
pub const HEADERS: [&str; 6] = [
    "Case ID",
    "Title",
    "Court",
    "Date",
    "Parties",
    "Operative Parts",
];

/// Separator between operative parts inside the last column
pub const PART_SEPARATOR: &str = " | ";

/// Writer for CSV format
#[derive(Debug, Default)]
pub struct CsvWriter {
    /// Rendered lines, header first
    lines: Vec<String>,
}

impl CsvWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Quote a CSV value
    ///
    /// # Arguments
    /// * `value` - Value to quote
    ///
    /// # Returns
    /// * `String` - Value wrapped in quotes with internal quotes doubled
    fn quote(value: &str) -> String {
        format!("\"{}\"", value.replace('"', "\"\""))
    }

    fn row<'a>(fields: impl IntoIterator<Item = &'a str>) -> String {
        fields
            .into_iter()
            .map(Self::quote)
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Join the selected text of every operative part
    fn operative_parts_cell(case: &ReportCase, show_simplified: bool) -> String {
        case.operative_parts
            .iter()
            .map(|part| part.text(show_simplified))
            .collect::<Vec<_>>()
            .join(PART_SEPARATOR)
    }
}

impl ReportWriter for CsvWriter {
    fn format(&self) -> ExportFormat {
        ExportFormat::Csv
    }

    fn begin(&mut self, _data: &ExportData) -> Result<()> {
        self.lines.clear();
        self.lines.push(Self::row(HEADERS));
        Ok(())
    }

    fn write_case(&mut self, case: &ReportCase, data: &ExportData) -> Result<()> {
        let parts = Self::operative_parts_cell(case, data.show_simplified);
        self.lines.push(Self::row([
            case.case_id_text.as_str(),
            case.title.as_str(),
            case.court.as_str(),
            case.date_of_judgment.as_str(),
            case.parties.as_str(),
            parts.as_str(),
        ]));
        Ok(())
    }

    fn finish(&mut self, _data: &ExportData) -> Result<Vec<u8>> {
        debug!("Finalized CSV: {} rows", self.lines.len().saturating_sub(1));
        Ok(std::mem::take(&mut self.lines).join("\n").into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures;

    fn encode(data: &ExportData) -> String {
        let mut writer = CsvWriter::new();
        writer.begin(data).unwrap();
        for case in &data.cases {
            writer.write_case(case, data).unwrap();
        }
        String::from_utf8(writer.finish(data).unwrap()).unwrap()
    }

    /// Minimal RFC 4180 reader for quoted fields
    fn parse_csv(content: &str) -> Vec<Vec<String>> {
        let mut rows = Vec::new();
        let mut row = Vec::new();
        let mut field = String::new();
        let mut in_quotes = false;
        let mut chars = content.chars().peekable();

        while let Some(c) = chars.next() {
            match (c, in_quotes) {
                ('"', true) if chars.peek() == Some(&'"') => {
                    field.push('"');
                    chars.next();
                }
                ('"', _) => in_quotes = !in_quotes,
                (',', false) => row.push(std::mem::take(&mut field)),
                ('\n', false) => {
                    row.push(std::mem::take(&mut field));
                    rows.push(std::mem::take(&mut row));
                }
                _ => field.push(c),
            }
        }
        row.push(field);
        rows.push(row);
        rows
    }

    #[test]
    fn test_csv_round_trip() {
        let mut case = fixtures::case(
            "C-311/18",
            vec![fixtures::part(
                1,
                "Article 46(1) \"appropriate safeguards\", must be read",
                "Safeguards must give \"essentially equivalent\" protection",
            )],
        );
        case.title = "Data Protection Commissioner v \"Schrems\"".to_string();
        case.parties = "Facebook Ireland Ltd, Maximillian Schrems".to_string();
        let data = fixtures::data(vec![case.clone()], true);

        let rows = parse_csv(&encode(&data));

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], HEADERS.map(String::from).to_vec());
        assert_eq!(
            rows[1],
            vec![
                case.case_id_text,
                case.title,
                case.court,
                case.date_of_judgment,
                case.parties,
                case.operative_parts[0].simplified_text.clone(),
            ]
        );
    }

    #[test]
    fn test_csv_quotes_every_field() {
        let data = fixtures::data(vec![fixtures::case("C-1/20", vec![])], false);
        let content = encode(&data);
        let row = content.lines().nth(1).unwrap();
        assert!(row.starts_with("\"C-1/20\","));
        assert!(row.ends_with(",\"\""));
    }

    #[test]
    fn test_csv_joins_parts_in_supplied_order() {
        let parts = vec![
            fixtures::part(2, "second verbatim", "second simple"),
            fixtures::part(1, "first verbatim", "first simple"),
        ];
        let data = fixtures::data(vec![fixtures::case("C-9/20", parts)], false);

        let rows = parse_csv(&encode(&data));
        assert_eq!(rows[1][5], "second verbatim | first verbatim");
        assert!(!rows[1][5].contains("simple"));
    }

    #[test]
    fn test_csv_header_only_for_no_cases() {
        let data = fixtures::data(vec![], true);
        assert_eq!(
            encode(&data),
            "\"Case ID\",\"Title\",\"Court\",\"Date\",\"Parties\",\"Operative Parts\""
        );
    }

    #[test]
    fn test_csv_escape_value() {
        assert_eq!(CsvWriter::quote("simple"), "\"simple\"");
        assert_eq!(CsvWriter::quote("with,comma"), "\"with,comma\"");
        assert_eq!(CsvWriter::quote("with\"quote"), "\"with\"\"quote\"");
    }
}
