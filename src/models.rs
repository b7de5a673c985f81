//! Row types for the report engine tables

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A named report layout with HTML/CSS fragments
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[sqlx(rename_all = "PascalCase")]
#[serde(rename_all = "camelCase")]
pub struct ReportTemplate {
    pub id: i32,
    pub name: String,
    pub css: Option<String>,
    pub header_html: Option<String>,
    pub body_html: Option<String>,
    pub footer_html: Option<String>,
    pub active: bool,
    pub version: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: Option<NaiveDateTime>,
    /// Loaded separately, ordered by display order
    #[sqlx(skip)]
    #[serde(default)]
    pub fields: Vec<ReportField>,
}

impl ReportTemplate {
    /// Header, body and footer fragments joined for placeholder scanning
    pub fn all_html(&self) -> String {
        [&self.header_html, &self.body_html, &self.footer_html]
            .iter()
            .filter_map(|s| s.as_deref())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// A typed slot within a template
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[sqlx(rename_all = "PascalCase")]
#[serde(rename_all = "camelCase")]
pub struct ReportField {
    pub id: i32,
    pub report_template_id: i32,
    pub field_name: String,
    pub label: Option<String>,
    pub section: Option<String>,
    pub field_type: Option<String>,
    pub display_order: Option<i32>,
    pub required: Option<bool>,
}

impl ReportField {
    pub fn is_required(&self) -> bool {
        self.required.unwrap_or(false)
    }

    pub fn field_type_or_default(&self) -> &str {
        self.field_type.as_deref().unwrap_or("Texto")
    }
}

/// A free-standing key/value submission
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[sqlx(rename_all = "PascalCase")]
#[serde(rename_all = "camelCase")]
pub struct ReportData {
    pub id: i32,
    pub field_name: String,
    pub value: Option<String>,
    pub created_at: Option<NaiveDateTime>,
}
