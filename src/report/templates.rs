//! Report template catalog
//!
//! A template names the case fields a report includes and optionally how
//! cases are grouped. Applying a template drops the excluded sections and
//! reorders cases by group.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ReportError, Result};
use crate::model::{ExportData, ReportCase};

/// Template category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateCategory {
    Standard,
    Analytical,
    Compliance,
}

impl TemplateCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateCategory::Standard => "standard",
            TemplateCategory::Analytical => "analytical",
            TemplateCategory::Compliance => "compliance",
        }
    }
}

impl fmt::Display for TemplateCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemplateCategory {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(TemplateCategory::Standard),
            "analytical" => Ok(TemplateCategory::Analytical),
            "compliance" => Ok(TemplateCategory::Compliance),
            other => Err(format!(
                "Unknown template category '{other}' (expected standard, analytical or compliance)"
            )),
        }
    }
}

/// Case field a template can include
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportField {
    CaseId,
    Title,
    Court,
    Date,
    Parties,
    OperativeParts,
    FullText,
}

impl ReportField {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportField::CaseId => "case_id",
            ReportField::Title => "title",
            ReportField::Court => "court",
            ReportField::Date => "date",
            ReportField::Parties => "parties",
            ReportField::OperativeParts => "operative_parts",
            ReportField::FullText => "full_text",
        }
    }
}

/// Case ordering applied by a template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    Court,
    /// Year of the judgment date
    Year,
}

impl GroupBy {
    fn key(&self, case: &ReportCase) -> String {
        match self {
            GroupBy::Court => case.court.trim().to_string(),
            GroupBy::Year => judgment_year(&case.date_of_judgment),
        }
    }
}

/// Leading four-digit year of a judgment date, empty if there is none
fn judgment_year(date: &str) -> String {
    let year: String = date.trim().chars().take(4).collect();
    if year.len() == 4 && year.chars().all(|c| c.is_ascii_digit()) {
        year
    } else {
        String::new()
    }
}

/// A predefined report layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportTemplate {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub category: TemplateCategory,
    pub fields: &'static [ReportField],
    pub group_by: Option<GroupBy>,
}

use ReportField::*;

static TEMPLATES: [ReportTemplate; 4] = [
    ReportTemplate {
        id: "standard-case-report",
        name: "Standard Case Report",
        description: "Basic case listing with operative parts",
        category: TemplateCategory::Standard,
        fields: &[CaseId, Title, Court, Date, OperativeParts],
        group_by: None,
    },
    ReportTemplate {
        id: "court-analysis",
        name: "Court Analysis",
        description: "Cases grouped by court with statistics",
        category: TemplateCategory::Analytical,
        fields: &[CaseId, Title, Court, Date, Parties, OperativeParts],
        group_by: Some(GroupBy::Court),
    },
    ReportTemplate {
        id: "temporal-analysis",
        name: "Temporal Analysis",
        description: "Cases over time with trend analysis",
        category: TemplateCategory::Analytical,
        fields: &[CaseId, Title, Court, Date, OperativeParts],
        group_by: Some(GroupBy::Year),
    },
    ReportTemplate {
        id: "compliance-report",
        name: "Compliance Report",
        description: "Detailed report for compliance purposes",
        category: TemplateCategory::Compliance,
        fields: &[CaseId, Title, Court, Date, Parties, OperativeParts, FullText],
        group_by: None,
    },
];

/// Every template in catalog order
pub fn all() -> &'static [ReportTemplate] {
    &TEMPLATES
}

/// Templates of one category, or all of them for `None`
pub fn by_category(category: Option<TemplateCategory>) -> Vec<&'static ReportTemplate> {
    TEMPLATES
        .iter()
        .filter(|t| category.is_none_or(|c| t.category == c))
        .collect()
}

/// Look a template up by id
pub fn find(id: &str) -> Result<&'static ReportTemplate> {
    TEMPLATES
        .iter()
        .find(|t| t.id == id.trim())
        .ok_or_else(|| ReportError::Template(id.to_string()))
}

impl ReportTemplate {
    pub fn includes(&self, field: ReportField) -> bool {
        self.fields.contains(&field)
    }

    /// Comma separated field names
    pub fn field_list(&self) -> String {
        self.fields
            .iter()
            .map(ReportField::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Return a copy of `data` shaped by this template
    ///
    /// Excluded parties are blanked and excluded operative parts dropped.
    /// Grouping is a stable sort of the cases by group key; operative parts
    /// keep their order.
    pub fn apply(&self, data: &ExportData) -> ExportData {
        let mut out = data.clone();

        for case in &mut out.cases {
            if !self.includes(Parties) {
                case.parties.clear();
            }
            if !self.includes(OperativeParts) {
                case.operative_parts.clear();
            }
        }

        if let Some(group_by) = self.group_by {
            out.cases.sort_by_cached_key(|case| group_by.key(case));
        }
        out
    }
}
