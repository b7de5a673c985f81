//! Schema provisioning for the dynamic report engine
//!
//! Drops and recreates the `ReportTemplate`, `ReportField` and `ReportData`
//! tables, seeds the `RelatorioVendas` sales report example and verifies
//! the resulting row counts.
//!
//! ```no_run
//! use report_db_setup::{ProvisionConfig, Provisioner};
//!
//! # async fn example() -> report_db_setup::Result<()> {
//! let config = ProvisionConfig::from_url("postgres://localhost/ReportDB");
//! let mut provisioner = Provisioner::connect(&config).await?;
//! let report = provisioner.run().await?;
//! println!("{}", report);
//! provisioner.close().await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod models;
pub mod provisioner;
pub mod report;
pub mod repository;
pub mod schema;
pub mod seed;
pub mod validator;

pub use config::{CommitMode, ProvisionConfig};
pub use error::{ProvisionError, Result};
pub use models::{ReportData, ReportField, ReportTemplate};
pub use provisioner::Provisioner;
pub use report::{OutcomeStatus, Phase, ProvisionReport, StatementOutcome, TableCounts};
pub use repository::ReportRepository;
pub use validator::TemplateValidator;
