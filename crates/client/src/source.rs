//! Seams between the data-fetching layer and the backend.
//!
//! [`ListSource`] serves list pages, [`Mutations`] runs the admin actions.
//! [`BackendApi`](crate::api::BackendApi) implements both over HTTP; tests
//! substitute in-memory fakes.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use clinica_core::error::CoreError;
use clinica_core::masking::strip_digits;
use clinica_core::pagination::PaginatedResult;
use clinica_core::query::{Filter, ListQuery};
use clinica_core::resources::Resource;

use crate::error::ClientResult;

/// Anything that can answer a list query with one page of raw rows.
#[async_trait]
pub trait ListSource: Send + Sync {
    async fn fetch_page(
        &self,
        resource: Resource,
        query: &ListQuery,
        filters: &[Filter],
    ) -> ClientResult<PaginatedResult<serde_json::Value>>;
}

/// Backend operations that change data behind cached list pages.
#[async_trait]
pub trait Mutations: Send + Sync {
    /// Ask the backend to recompute billing divergences.
    async fn run_divergence_audit(&self, request: &AuditRequest) -> ClientResult<AuditSummary>;

    /// Ask the backend to migrate carteirinhas between the two stores.
    async fn migrate_carteirinhas(
        &self,
        request: &MigrationRequest,
    ) -> ClientResult<MigrationSummary>;
}

// ---------------------------------------------------------------------------
// Divergence audit
// ---------------------------------------------------------------------------

/// Scope of a divergence audit. Unset bounds mean "everything".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_inicio: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_fim: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub convenio_id: Option<i64>,
}

impl AuditRequest {
    /// Reject an inverted date range before calling the backend.
    pub fn validate(&self) -> Result<(), CoreError> {
        if let (Some(inicio), Some(fim)) = (self.data_inicio, self.data_fim) {
            if inicio > fim {
                return Err(CoreError::InvalidArgument(format!(
                    "audit range starts after it ends ({inicio} > {fim})"
                )));
            }
        }
        Ok(())
    }
}

/// What the backend reports after an audit run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditSummary {
    /// Service executions examined.
    pub checked: i64,
    /// Divergences recorded by this run.
    pub divergences_found: i64,
}

// ---------------------------------------------------------------------------
// Carteirinha migration
// ---------------------------------------------------------------------------

/// Which carteirinhas to migrate. An empty list lets the backend pick every
/// eligible card.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationRequest {
    numeros: Vec<String>,
    dry_run: bool,
}

impl MigrationRequest {
    /// Normalize card numbers to bare digits, dropping duplicates.
    ///
    /// A number with no digits at all is rejected rather than sent.
    pub fn new<I, S>(numeros: I, dry_run: bool) -> Result<Self, CoreError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalized: Vec<String> = Vec::new();
        for raw in numeros {
            let digits = strip_digits(raw.as_ref());
            if digits.is_empty() {
                return Err(CoreError::InvalidArgument(format!(
                    "carteirinha number '{}' has no digits",
                    raw.as_ref()
                )));
            }
            if !normalized.contains(&digits) {
                normalized.push(digits);
            }
        }
        Ok(Self {
            numeros: normalized,
            dry_run,
        })
    }

    /// Card numbers as bare digits.
    pub fn numeros(&self) -> &[String] {
        &self.numeros
    }

    /// Whether the backend should only report what it would migrate.
    pub fn dry_run(&self) -> bool {
        self.dry_run
    }
}

/// Outcome of a carteirinha migration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationSummary {
    /// Cards that qualified for migration.
    pub eligible: i64,
    /// Cards actually written (zero on a dry run).
    pub migrated: i64,
    pub skipped: i64,
    #[serde(default)]
    pub errors: Vec<String>,
}
