//! Read access to seeded report definitions and data
//!
//! Works over the provisioner's single connection rather than a pool.

use std::collections::HashMap;

use sqlx::PgConnection;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::models::{ReportData, ReportField, ReportTemplate};

pub struct ReportRepository<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> ReportRepository<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    /// Loads an active template by name together with its fields,
    /// ordered by display order
    pub async fn template_by_name(&mut self, name: &str) -> Result<Option<ReportTemplate>> {
        info!("Loading template: {}", name);

        let template = sqlx::query_as::<_, ReportTemplate>(
            r#"
            SELECT "Id", "Name", "Css", "HeaderHtml", "BodyHtml", "FooterHtml",
                   "Active", "Version", "CreatedAt", "UpdatedAt"
            FROM "ReportTemplate"
            WHERE "Name" = $1 AND "Active" = TRUE
            "#,
        )
        .bind(name)
        .fetch_optional(&mut *self.conn)
        .await?;

        let Some(mut template) = template else {
            warn!("Template not found: {}", name);
            return Ok(None);
        };

        template.fields = sqlx::query_as::<_, ReportField>(
            r#"
            SELECT "Id", "ReportTemplateId", "FieldName", "Label", "Section",
                   "FieldType", "DisplayOrder", "Required"
            FROM "ReportField"
            WHERE "ReportTemplateId" = $1
            ORDER BY "DisplayOrder", "Id"
            "#,
        )
        .bind(template.id)
        .fetch_all(&mut *self.conn)
        .await?;

        info!(
            "Template {} loaded with {} field(s)",
            template.name,
            template.fields.len()
        );
        Ok(Some(template))
    }

    /// All data rows ordered by field name, oldest first within a name
    pub async fn report_data(&mut self) -> Result<Vec<ReportData>> {
        let rows = sqlx::query_as::<_, ReportData>(
            r#"
            SELECT "Id", "FieldName", "Value", "CreatedAt"
            FROM "ReportData"
            ORDER BY "FieldName", "CreatedAt", "Id"
            "#,
        )
        .fetch_all(&mut *self.conn)
        .await?;

        info!("Loaded {} data row(s)", rows.len());
        Ok(rows)
    }

    /// Most recent value recorded for a field name
    pub async fn field_value(&mut self, field_name: &str) -> Result<Option<String>> {
        debug!("Loading value for field: {}", field_name);

        let value: Option<Option<String>> = sqlx::query_scalar(
            r#"
            SELECT "Value"
            FROM "ReportData"
            WHERE "FieldName" = $1
            ORDER BY "CreatedAt" DESC, "Id" DESC
            LIMIT 1
            "#,
        )
        .bind(field_name)
        .fetch_optional(&mut *self.conn)
        .await?;

        Ok(value.flatten())
    }

    /// Field name to most recent value; NULL values become empty strings
    pub async fn latest_values(&mut self) -> Result<HashMap<String, String>> {
        Ok(latest_by_field(self.report_data().await?))
    }
}

/// Collapses rows to one value per field name; rows must be ordered oldest
/// first within a name, so later rows win.
pub fn latest_by_field(rows: impl IntoIterator<Item = ReportData>) -> HashMap<String, String> {
    rows.into_iter()
        .map(|row| (row.field_name, row.value.unwrap_or_default()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn row(id: i32, name: &str, value: Option<&str>, day: u32) -> ReportData {
        ReportData {
            id,
            field_name: name.into(),
            value: value.map(String::from),
            created_at: NaiveDate::from_ymd_opt(2024, 1, day).and_then(|d| d.and_hms_opt(0, 0, 0)),
        }
    }

    #[test]
    fn test_latest_by_field_later_rows_win() {
        let values = latest_by_field(vec![
            row(1, "Periodo", Some("Dezembro/2023"), 1),
            row(2, "Periodo", Some("Janeiro/2024"), 2),
            row(3, "Regiao", None, 1),
        ]);
        assert_eq!(values.len(), 2);
        assert_eq!(values["Periodo"], "Janeiro/2024");
        assert_eq!(values["Regiao"], "");
    }
}
