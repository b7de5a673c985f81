//! Structured results of a provisioning run
//!
//! Every statement executed during cleanup, schema creation and seeding is
//! recorded as a [`StatementOutcome`]. The run as a whole produces a
//! [`ProvisionReport`] that the binary prints and tests assert against.

use serde::Serialize;

/// The fixed phases of a run, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    Cleanup,
    CreateSchema,
    SeedTemplate,
    SeedFields,
    SeedData,
}

impl Phase {
    pub const ALL: [Phase; 5] = [
        Phase::Cleanup,
        Phase::CreateSchema,
        Phase::SeedTemplate,
        Phase::SeedFields,
        Phase::SeedData,
    ];

    /// 1-based position, for "[n/5]" progress lines
    pub fn ordinal(self) -> usize {
        Phase::ALL.iter().position(|p| *p == self).unwrap_or(0) + 1
    }

    pub fn title(self) -> &'static str {
        match self {
            Phase::Cleanup => "Dropping existing tables",
            Phase::CreateSchema => "Creating tables",
            Phase::SeedTemplate => "Inserting report template",
            Phase::SeedFields => "Inserting template fields",
            Phase::SeedData => "Inserting sample data",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Phase::Cleanup => "cleanup",
            Phase::CreateSchema => "create-schema",
            Phase::SeedTemplate => "seed-template",
            Phase::SeedFields => "seed-fields",
            Phase::SeedData => "seed-data",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OutcomeStatus {
    Applied { rows_affected: u64 },
    Failed { error: String },
}

/// Result of one statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatementOutcome {
    pub phase: Phase,
    pub description: String,
    #[serde(flatten)]
    pub status: OutcomeStatus,
}

impl StatementOutcome {
    pub fn applied(phase: Phase, description: impl Into<String>, rows_affected: u64) -> Self {
        Self {
            phase,
            description: description.into(),
            status: OutcomeStatus::Applied { rows_affected },
        }
    }

    pub fn failed(phase: Phase, description: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            phase,
            description: description.into(),
            status: OutcomeStatus::Failed {
                error: error.into(),
            },
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.status, OutcomeStatus::Failed { .. })
    }

    pub fn rows_affected(&self) -> Option<u64> {
        match self.status {
            OutcomeStatus::Applied { rows_affected } => Some(rows_affected),
            OutcomeStatus::Failed { .. } => None,
        }
    }
}

/// Row counts observed after seeding
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TableCounts {
    pub templates: i64,
    pub fields: i64,
    pub data: i64,
}

impl std::fmt::Display for TableCounts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Templates: {}, Fields: {}, Data: {}",
            self.templates, self.fields, self.data
        )
    }
}

/// Everything a run produced
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProvisionReport {
    pub outcomes: Vec<StatementOutcome>,
    pub counts: Option<TableCounts>,
    /// Validator messages for the seeded template; observational only
    pub template_issues: Vec<String>,
    /// Set when an atomic run was rolled back; nothing was applied
    pub rolled_back: bool,
}

impl ProvisionReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extend(&mut self, outcomes: impl IntoIterator<Item = StatementOutcome>) {
        self.outcomes.extend(outcomes);
    }

    pub fn failures(&self) -> impl Iterator<Item = &StatementOutcome> {
        self.outcomes.iter().filter(|o| o.is_failed())
    }

    pub fn failure_count(&self) -> usize {
        self.failures().count()
    }

    pub fn is_clean(&self) -> bool {
        self.failure_count() == 0
    }

    pub fn phase_outcomes(&self, phase: Phase) -> impl Iterator<Item = &StatementOutcome> {
        self.outcomes.iter().filter(move |o| o.phase == phase)
    }

    /// Total rows inserted by a phase; failed statements count as zero
    pub fn rows_for(&self, phase: Phase) -> u64 {
        self.phase_outcomes(phase)
            .filter_map(StatementOutcome::rows_affected)
            .sum()
    }
}

impl std::fmt::Display for ProvisionReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} statement(s), {} failed",
            self.outcomes.len(),
            self.failure_count()
        )?;
        if let Some(counts) = &self.counts {
            write!(f, "; {}", counts)?;
        }
        if self.rolled_back {
            write!(f, "; rolled back")?;
        }
        Ok(())
    }
}
