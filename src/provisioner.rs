//! Provisioner - drop, recreate and seed the report engine tables
//!
//! A run is five fixed phases executed over one connection:
//!
//! 1. **cleanup** - conditional drop of the three tables
//! 2. **create-schema** - tables in dependency order, then indexes
//! 3. **seed-template** - the `RelatorioVendas` template row
//! 4. **seed-fields** - field rows, attached to the template by name
//! 5. **seed-data** - free-standing data rows
//!
//! followed by a row count and a consistency check of the seeded template.
//!
//! Each statement runs inside a savepoint, so a failed statement is rolled
//! back on its own and the rest of its phase still applies. Failures are
//! recorded in the returned [`ProvisionReport`]; only connection,
//! transaction and verification errors are fatal.

use std::time::Duration;

use sqlx::postgres::PgArguments;
use sqlx::query::Query;
use sqlx::{Connection, PgConnection, Postgres, Transaction};
use tracing::{debug, info, warn};

use crate::config::{CommitMode, ProvisionConfig};
use crate::error::{ProvisionError, Result};
use crate::report::{Phase, ProvisionReport, StatementOutcome, TableCounts};
use crate::repository::ReportRepository;
use crate::schema::{self, Table, INDEXES};
use crate::seed::{SeedDatum, SeedField, SeedTemplate, SALES_DATA, SALES_FIELDS, SALES_TEMPLATE};
use crate::validator::TemplateValidator;

pub struct Provisioner {
    conn: PgConnection,
    commit_mode: CommitMode,
}

impl Provisioner {
    /// Opens the single session used for the whole run
    pub async fn connect(config: &ProvisionConfig) -> Result<Self> {
        let options = config.connect_options()?;
        let target = config.display_target();
        info!("Connecting to database: {}", target);

        let connecting = PgConnection::connect_with(&options);
        let connected = if config.connect_timeout_secs == 0 {
            connecting.await
        } else {
            match tokio::time::timeout(config.connect_timeout(), connecting).await {
                Ok(result) => result,
                Err(_) => Err(timed_out(config.connect_timeout())),
            }
        };

        let conn = connected.map_err(|source| {
            warn!("Failed to connect to database: {}", source);
            ProvisionError::Connect {
                target: target.clone(),
                source,
            }
        })?;

        info!("Connected to {}", target);
        Ok(Self::from_connection(conn, config.commit_mode))
    }

    pub fn from_connection(conn: PgConnection, commit_mode: CommitMode) -> Self {
        Self { conn, commit_mode }
    }

    /// The underlying session, for follow-up queries
    pub fn connection(&mut self) -> &mut PgConnection {
        &mut self.conn
    }

    pub async fn close(self) -> Result<()> {
        info!("Closing database connection");
        self.conn.close().await?;
        Ok(())
    }

    // =========================================================================
    // PHASES
    // =========================================================================

    /// Drops a single table if present, committed on its own
    pub async fn drop_if_exists(&mut self, table: Table) -> Result<StatementOutcome> {
        let mut tx = begin(&mut self.conn, Phase::Cleanup).await?;
        let outcome = drop_table(&mut tx, table).await;
        commit(tx, Phase::Cleanup).await?;
        Ok(outcome)
    }

    /// Drops all three tables, dependants first
    pub async fn cleanup(&mut self) -> Result<Vec<StatementOutcome>> {
        let mut tx = begin(&mut self.conn, Phase::Cleanup).await?;
        let outcomes = run_cleanup(&mut tx).await;
        commit(tx, Phase::Cleanup).await?;
        Ok(outcomes)
    }

    pub async fn create_schema(&mut self) -> Result<Vec<StatementOutcome>> {
        let mut tx = begin(&mut self.conn, Phase::CreateSchema).await?;
        let outcomes = run_create_schema(&mut tx).await;
        commit(tx, Phase::CreateSchema).await?;
        Ok(outcomes)
    }

    pub async fn seed_template(&mut self, template: &SeedTemplate) -> Result<StatementOutcome> {
        let mut tx = begin(&mut self.conn, Phase::SeedTemplate).await?;
        let outcome = run_seed_template(&mut tx, template).await;
        commit(tx, Phase::SeedTemplate).await?;
        Ok(outcome)
    }

    /// Inserts fields for the template called `template_name`. When no such
    /// template exists every insert succeeds with zero rows affected.
    pub async fn seed_fields(
        &mut self,
        template_name: &str,
        fields: &[SeedField],
    ) -> Result<Vec<StatementOutcome>> {
        let mut tx = begin(&mut self.conn, Phase::SeedFields).await?;
        let outcomes = run_seed_fields(&mut tx, template_name, fields).await;
        commit(tx, Phase::SeedFields).await?;
        Ok(outcomes)
    }

    pub async fn seed_data(&mut self, data: &[SeedDatum]) -> Result<Vec<StatementOutcome>> {
        let mut tx = begin(&mut self.conn, Phase::SeedData).await?;
        let outcomes = run_seed_data(&mut tx, data).await;
        commit(tx, Phase::SeedData).await?;
        Ok(outcomes)
    }

    /// Counts rows in each table
    pub async fn verify(&mut self) -> Result<TableCounts> {
        let templates = count_rows(&mut self.conn, Table::ReportTemplate).await?;
        let fields = count_rows(&mut self.conn, Table::ReportField).await?;
        let data = count_rows(&mut self.conn, Table::ReportData).await?;

        let counts = TableCounts {
            templates,
            fields,
            data,
        };
        info!("Row counts - {}", counts);
        Ok(counts)
    }

    /// Loads the seeded template and reports any inconsistencies between its
    /// placeholders, fields and the stored data
    pub async fn check_template(&mut self, name: &str) -> Vec<String> {
        let mut repo = ReportRepository::new(&mut self.conn);

        let template = match repo.template_by_name(name).await {
            Ok(Some(template)) => template,
            Ok(None) => {
                return vec![ProvisionError::TemplateNotFound {
                    name: name.to_string(),
                }
                .to_string()]
            }
            Err(e) => return vec![format!("Template check failed: {}", e)],
        };

        let validator = TemplateValidator::new();
        let mut issues = validator.validate(&template);
        match repo.latest_values().await {
            Ok(values) => issues.extend(validator.validate_values(&template, &values)),
            Err(e) => issues.push(format!("Loading report data failed: {}", e)),
        }

        for issue in &issues {
            warn!("Template {}: {}", name, issue);
        }
        issues
    }

    // =========================================================================
    // FULL RUN
    // =========================================================================

    /// Runs every phase with the sales report seed, then verifies
    pub async fn run(&mut self) -> Result<ProvisionReport> {
        let mut report = match self.commit_mode {
            CommitMode::PerPhase => self.run_per_phase().await?,
            CommitMode::Atomic => self.run_atomic().await?,
        };

        if report.rolled_back {
            return Ok(report);
        }

        report.counts = Some(self.verify().await?);
        report.template_issues = self.check_template(SALES_TEMPLATE.name).await;
        info!("Provisioning finished: {}", report);
        Ok(report)
    }

    async fn run_per_phase(&mut self) -> Result<ProvisionReport> {
        let mut report = ProvisionReport::new();

        announce(Phase::Cleanup);
        report.extend(self.cleanup().await?);

        announce(Phase::CreateSchema);
        report.extend(self.create_schema().await?);

        announce(Phase::SeedTemplate);
        report.extend([self.seed_template(&SALES_TEMPLATE).await?]);

        announce(Phase::SeedFields);
        report.extend(self.seed_fields(SALES_TEMPLATE.name, &SALES_FIELDS).await?);

        announce(Phase::SeedData);
        report.extend(self.seed_data(&SALES_DATA).await?);

        Ok(report)
    }

    /// All phases in one transaction; rolled back if any statement failed
    async fn run_atomic(&mut self) -> Result<ProvisionReport> {
        let mut report = ProvisionReport::new();
        let mut tx = begin(&mut self.conn, "atomic run").await?;

        announce(Phase::Cleanup);
        report.extend(run_cleanup(&mut tx).await);

        announce(Phase::CreateSchema);
        report.extend(run_create_schema(&mut tx).await);

        announce(Phase::SeedTemplate);
        report.extend([run_seed_template(&mut tx, &SALES_TEMPLATE).await]);

        announce(Phase::SeedFields);
        report.extend(run_seed_fields(&mut tx, SALES_TEMPLATE.name, &SALES_FIELDS).await);

        announce(Phase::SeedData);
        report.extend(run_seed_data(&mut tx, &SALES_DATA).await);

        if report.is_clean() {
            commit(tx, "atomic run").await?;
        } else {
            warn!(
                "{} statement(s) failed, rolling back the whole run",
                report.failure_count()
            );
            tx.rollback()
                .await
                .map_err(|e| ProvisionError::transaction("atomic run", e))?;
            report.rolled_back = true;
        }

        Ok(report)
    }
}

// =============================================================================
// STATEMENT EXECUTION
// =============================================================================

fn announce(phase: Phase) {
    info!("[{}/{}] {}...", phase.ordinal(), Phase::ALL.len(), phase.title());
}

fn timed_out(after: Duration) -> sqlx::Error {
    sqlx::Error::Io(std::io::Error::new(
        std::io::ErrorKind::TimedOut,
        format!("no connection after {}s", after.as_secs()),
    ))
}

async fn begin(
    conn: &mut PgConnection,
    phase: impl std::fmt::Display,
) -> Result<Transaction<'_, Postgres>> {
    conn.begin()
        .await
        .map_err(|e| ProvisionError::transaction(phase, e))
}

async fn commit(tx: Transaction<'_, Postgres>, phase: impl std::fmt::Display) -> Result<()> {
    tx.commit()
        .await
        .map_err(|e| ProvisionError::transaction(phase, e))
}

/// Runs one statement inside a savepoint and records the outcome
async fn execute_step(
    conn: &mut PgConnection,
    phase: Phase,
    description: String,
    query: Query<'_, Postgres, PgArguments>,
) -> StatementOutcome {
    debug!("{}: {}", phase, description);

    let mut savepoint = match conn.begin().await {
        Ok(sp) => sp,
        Err(e) => {
            warn!("{} - {}", description, e);
            return StatementOutcome::failed(phase, description, e.to_string());
        }
    };

    match query.execute(&mut *savepoint).await {
        Ok(result) => match savepoint.commit().await {
            Ok(()) => {
                info!("{} - done", description);
                StatementOutcome::applied(phase, description, result.rows_affected())
            }
            Err(e) => {
                warn!("{} - {}", description, e);
                StatementOutcome::failed(phase, description, e.to_string())
            }
        },
        Err(e) => {
            warn!("{} - {}", description, e);
            if let Err(rollback) = savepoint.rollback().await {
                warn!("Rolling back savepoint failed: {}", rollback);
            }
            StatementOutcome::failed(phase, description, e.to_string())
        }
    }
}

async fn drop_table(conn: &mut PgConnection, table: Table) -> StatementOutcome {
    let sql = table.drop_sql();
    execute_step(
        conn,
        Phase::Cleanup,
        format!("Dropping table {}", table),
        sqlx::query(&sql),
    )
    .await
}

async fn run_cleanup(conn: &mut PgConnection) -> Vec<StatementOutcome> {
    let mut outcomes = Vec::with_capacity(Table::DROP_ORDER.len());
    for table in Table::DROP_ORDER {
        outcomes.push(drop_table(conn, table).await);
    }
    outcomes
}

async fn run_create_schema(conn: &mut PgConnection) -> Vec<StatementOutcome> {
    let mut outcomes = Vec::with_capacity(Table::CREATE_ORDER.len() + INDEXES.len());

    for table in Table::CREATE_ORDER {
        outcomes.push(
            execute_step(
                conn,
                Phase::CreateSchema,
                format!("Creating table {}", table),
                sqlx::query(table.create_sql()),
            )
            .await,
        );
    }

    for index in &INDEXES {
        let sql = index.create_sql();
        outcomes.push(
            execute_step(
                conn,
                Phase::CreateSchema,
                format!("Creating index {}", index.name),
                sqlx::query(&sql),
            )
            .await,
        );
    }

    outcomes
}

async fn run_seed_template(conn: &mut PgConnection, template: &SeedTemplate) -> StatementOutcome {
    let query = sqlx::query(schema::INSERT_TEMPLATE)
        .bind(template.name)
        .bind(template.css)
        .bind(template.header_html)
        .bind(template.body_html)
        .bind(template.footer_html);

    execute_step(
        conn,
        Phase::SeedTemplate,
        format!("Inserting template {}", template.name),
        query,
    )
    .await
}

async fn run_seed_fields(
    conn: &mut PgConnection,
    template_name: &str,
    fields: &[SeedField],
) -> Vec<StatementOutcome> {
    let mut outcomes = Vec::with_capacity(fields.len());

    for field in fields {
        let query = sqlx::query(schema::INSERT_FIELD_BY_TEMPLATE_NAME)
            .bind(field.field_name)
            .bind(field.label)
            .bind(field.section)
            .bind(field.field_type)
            .bind(field.display_order)
            .bind(field.required)
            .bind(template_name);

        let outcome = execute_step(
            conn,
            Phase::SeedFields,
            format!("Inserting field {}", field.field_name),
            query,
        )
        .await;

        if outcome.rows_affected() == Some(0) {
            warn!(
                "Field {} not inserted: template '{}' does not exist",
                field.field_name, template_name
            );
        }
        outcomes.push(outcome);
    }

    outcomes
}

async fn run_seed_data(conn: &mut PgConnection, data: &[SeedDatum]) -> Vec<StatementOutcome> {
    let mut outcomes = Vec::with_capacity(data.len());

    for datum in data {
        let query = sqlx::query(schema::INSERT_DATA)
            .bind(datum.field_name)
            .bind(datum.value);

        outcomes.push(
            execute_step(
                conn,
                Phase::SeedData,
                format!("Inserting datum {}", datum.field_name),
                query,
            )
            .await,
        );
    }

    outcomes
}

async fn count_rows(conn: &mut PgConnection, table: Table) -> Result<i64> {
    let sql = table.count_sql();
    sqlx::query_scalar::<_, i64>(&sql)
        .fetch_one(conn)
        .await
        .map_err(|source| ProvisionError::Verify {
            table: table.name().to_string(),
            source,
        })
}
