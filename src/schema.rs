//! Table layout for the report engine
//!
//! Identifiers are double-quoted so the PascalCase names the report engine
//! queries against survive PostgreSQL's case folding.

/// The three tables, in creation (dependency) order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    ReportTemplate,
    ReportField,
    ReportData,
}

impl Table {
    /// Creation order: ReportField references ReportTemplate
    pub const CREATE_ORDER: [Table; 3] = [Table::ReportTemplate, Table::ReportField, Table::ReportData];

    /// Drop order: dependants first
    pub const DROP_ORDER: [Table; 3] = [Table::ReportData, Table::ReportField, Table::ReportTemplate];

    pub fn name(self) -> &'static str {
        match self {
            Table::ReportTemplate => "ReportTemplate",
            Table::ReportField => "ReportField",
            Table::ReportData => "ReportData",
        }
    }

    pub fn quoted(self) -> String {
        format!("\"{}\"", self.name())
    }

    pub fn drop_sql(self) -> String {
        format!("DROP TABLE IF EXISTS {}", self.quoted())
    }

    pub fn create_sql(self) -> &'static str {
        match self {
            Table::ReportTemplate => CREATE_REPORT_TEMPLATE,
            Table::ReportField => CREATE_REPORT_FIELD,
            Table::ReportData => CREATE_REPORT_DATA,
        }
    }

    pub fn count_sql(self) -> String {
        format!("SELECT COUNT(*) FROM {}", self.quoted())
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

const CREATE_REPORT_TEMPLATE: &str = r#"
    CREATE TABLE "ReportTemplate" (
        "Id" INT GENERATED BY DEFAULT AS IDENTITY PRIMARY KEY,
        "Name" VARCHAR(100) NOT NULL UNIQUE,
        "Css" TEXT NULL,
        "HeaderHtml" TEXT NULL,
        "BodyHtml" TEXT NULL,
        "FooterHtml" TEXT NULL,
        "Active" BOOLEAN NOT NULL DEFAULT TRUE,
        "Version" INT NOT NULL DEFAULT 1,
        "CreatedAt" TIMESTAMP NOT NULL DEFAULT now(),
        "UpdatedAt" TIMESTAMP NULL
    )
"#;

const CREATE_REPORT_FIELD: &str = r#"
    CREATE TABLE "ReportField" (
        "Id" INT GENERATED BY DEFAULT AS IDENTITY PRIMARY KEY,
        "ReportTemplateId" INT NOT NULL REFERENCES "ReportTemplate"("Id") ON DELETE CASCADE,
        "FieldName" VARCHAR(100) NOT NULL,
        "Label" VARCHAR(100) NULL,
        "Section" VARCHAR(50) DEFAULT 'Body',
        "FieldType" VARCHAR(50) DEFAULT 'Texto',
        "DisplayOrder" INT DEFAULT 0,
        "Required" BOOLEAN DEFAULT FALSE
    )
"#;

const CREATE_REPORT_DATA: &str = r#"
    CREATE TABLE "ReportData" (
        "Id" INT GENERATED BY DEFAULT AS IDENTITY PRIMARY KEY,
        "FieldName" VARCHAR(100) NOT NULL,
        "Value" TEXT NULL,
        "CreatedAt" TIMESTAMP DEFAULT now()
    )
"#;

/// A secondary index created after the tables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexDef {
    pub name: &'static str,
    pub table: Table,
    pub column: &'static str,
}

impl IndexDef {
    pub fn create_sql(&self) -> String {
        format!(
            "CREATE INDEX \"{}\" ON {}(\"{}\")",
            self.name,
            self.table.quoted(),
            self.column
        )
    }
}

pub const INDEXES: [IndexDef; 2] = [
    IndexDef {
        name: "IX_ReportField_TemplateId",
        table: Table::ReportField,
        column: "ReportTemplateId",
    },
    IndexDef {
        name: "IX_ReportData_FieldName",
        table: Table::ReportData,
        column: "FieldName",
    },
];

// =============================================================================
// SEED STATEMENTS
// =============================================================================

pub const INSERT_TEMPLATE: &str = r#"
    INSERT INTO "ReportTemplate" ("Name", "Css", "HeaderHtml", "BodyHtml", "FooterHtml")
    VALUES ($1, $2, $3, $4, $5)
"#;

/// Template id is resolved by name, so a missing template row yields zero
/// inserted rows rather than an error.
pub const INSERT_FIELD_BY_TEMPLATE_NAME: &str = r#"
    INSERT INTO "ReportField"
        ("ReportTemplateId", "FieldName", "Label", "Section", "FieldType", "DisplayOrder", "Required")
    SELECT "Id", $1, $2, $3, $4, $5, $6
    FROM "ReportTemplate" WHERE "Name" = $7
"#;

pub const INSERT_DATA: &str = r#"
    INSERT INTO "ReportData" ("FieldName", "Value") VALUES ($1, $2)
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_order_respects_foreign_key() {
        let pos = |t| Table::CREATE_ORDER.iter().position(|x| *x == t).unwrap();
        assert!(pos(Table::ReportTemplate) < pos(Table::ReportField));

        let drop_pos = |t| Table::DROP_ORDER.iter().position(|x| *x == t).unwrap();
        assert!(drop_pos(Table::ReportField) < drop_pos(Table::ReportTemplate));
    }

    #[test]
    fn test_drop_sql_is_conditional() {
        assert_eq!(
            Table::ReportData.drop_sql(),
            r#"DROP TABLE IF EXISTS "ReportData""#
        );
    }

    #[test]
    fn test_field_table_cascades() {
        let sql = Table::ReportField.create_sql();
        assert!(sql.contains(r#"REFERENCES "ReportTemplate"("Id") ON DELETE CASCADE"#));
        assert!(sql.contains(r#""Section" VARCHAR(50) DEFAULT 'Body'"#));
        assert!(sql.contains(r#""FieldType" VARCHAR(50) DEFAULT 'Texto'"#));
    }

    #[test]
    fn test_data_table_has_no_foreign_key() {
        assert!(!Table::ReportData.create_sql().contains("REFERENCES"));
    }

    #[test]
    fn test_template_name_unique() {
        assert!(Table::ReportTemplate
            .create_sql()
            .contains(r#""Name" VARCHAR(100) NOT NULL UNIQUE"#));
    }

    #[test]
    fn test_index_sql() {
        assert_eq!(
            INDEXES[0].create_sql(),
            r#"CREATE INDEX "IX_ReportField_TemplateId" ON "ReportField"("ReportTemplateId")"#
        );
        assert_eq!(
            INDEXES[1].create_sql(),
            r#"CREATE INDEX "IX_ReportData_FieldName" ON "ReportData"("FieldName")"#
        );
    }

    #[test]
    fn test_field_insert_resolves_template_by_name() {
        assert!(INSERT_FIELD_BY_TEMPLATE_NAME.contains(r#"FROM "ReportTemplate" WHERE "Name" = $7"#));
    }
}
