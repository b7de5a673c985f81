//! Template consistency checks
//!
//! Compares the `{{Token}}` placeholders in a template's HTML against its
//! field definitions. Messages are observations; nothing here rejects a
//! template on its own.

use crate::models::ReportTemplate;
use regex::Regex;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::LazyLock;

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{([^}]+)\}\}").unwrap());

static URL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^https?://").unwrap());

/// Field type whose placeholder must appear in the HTML
const IMAGE_FIELD_TYPE: &str = "Imagem";

/// Distinct placeholder names in `html`, trimmed and sorted
pub fn extract_placeholders(html: &str) -> BTreeSet<String> {
    PLACEHOLDER_RE
        .captures_iter(html)
        .map(|c| c[1].trim().to_string())
        .collect()
}

pub fn is_valid_url(url: &str) -> bool {
    !url.trim().is_empty() && URL_RE.is_match(url)
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TemplateValidator;

impl TemplateValidator {
    pub fn new() -> Self {
        Self
    }

    /// Returns one message per problem found; empty means consistent
    pub fn validate(&self, template: &ReportTemplate) -> Vec<String> {
        let mut errors = Vec::new();

        if template.name.trim().is_empty() {
            errors.push("Template name is required".to_string());
        }

        let blank = |s: &Option<String>| s.as_deref().map_or(true, |v| v.trim().is_empty());
        if blank(&template.header_html) && blank(&template.body_html) && blank(&template.footer_html)
        {
            errors.push(
                "Template must have at least one section (Header, Body or Footer) with content"
                    .to_string(),
            );
        }

        if template.fields.is_empty() {
            errors.push("Template must define at least one field".to_string());
        }

        let placeholders = extract_placeholders(&template.all_html());
        let field_names: HashSet<&str> = template
            .fields
            .iter()
            .map(|f| f.field_name.as_str())
            .collect();

        let missing: Vec<&str> = placeholders
            .iter()
            .map(String::as_str)
            .filter(|p| !field_names.contains(p))
            .collect();
        if !missing.is_empty() {
            errors.push(format!(
                "Placeholders without matching fields: {}",
                missing.join(", ")
            ));
        }

        for field in template
            .fields
            .iter()
            .filter(|f| f.field_type_or_default().eq_ignore_ascii_case(IMAGE_FIELD_TYPE))
        {
            if !placeholders.contains(&field.field_name) {
                errors.push(format!(
                    "Image field '{}' is not used by the template",
                    field.field_name
                ));
            }
        }

        errors
    }

    /// Checks submitted values against the template: required fields must
    /// be present and non-blank, image fields must hold http(s) URLs.
    pub fn validate_values(
        &self,
        template: &ReportTemplate,
        values: &HashMap<String, String>,
    ) -> Vec<String> {
        let mut errors = Vec::new();

        let missing: Vec<&str> = template
            .fields
            .iter()
            .filter(|f| f.is_required())
            .filter(|f| values.get(&f.field_name).map_or(true, |v| v.trim().is_empty()))
            .map(|f| f.field_name.as_str())
            .collect();
        if !missing.is_empty() {
            errors.push(format!("Missing required fields: {}", missing.join(", ")));
        }

        for field in template
            .fields
            .iter()
            .filter(|f| f.field_type_or_default().eq_ignore_ascii_case(IMAGE_FIELD_TYPE))
        {
            if let Some(value) = values.get(&field.field_name) {
                if !is_valid_url(value) {
                    errors.push(format!(
                        "Image field '{}' does not hold a valid URL",
                        field.field_name
                    ));
                }
            }
        }

        errors
    }
}
