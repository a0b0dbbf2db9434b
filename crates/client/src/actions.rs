//! Admin actions that change backend data behind cached list pages.
//!
//! Each action runs through [`Mutations`] and, only when it succeeds,
//! invalidates the cached pages it affected.

use std::sync::Arc;

use clinica_core::resources::Resource;

use crate::error::ClientResult;
use crate::loader::{invalidate_with_dependents, PageCache};
use crate::source::{AuditRequest, AuditSummary, MigrationRequest, MigrationSummary, Mutations};

/// Runs admin mutations and invalidates the cached pages each one affects.
///
/// Shares its [`PageCache`] with the [`ListLoader`](crate::loader::ListLoader)
/// instances serving the affected lists.
pub struct AdminActions<M> {
    mutations: M,
    cache: Arc<PageCache>,
}

impl<M: Mutations> AdminActions<M> {
    pub fn new(mutations: M, cache: Arc<PageCache>) -> Self {
        Self { mutations, cache }
    }

    pub fn mutations(&self) -> &M {
        &self.mutations
    }

    /// Run a divergence audit, then mark divergence pages stale.
    pub async fn run_divergence_audit(&self, request: &AuditRequest) -> ClientResult<AuditSummary> {
        let summary = self.mutations.run_divergence_audit(request).await?;

        tracing::info!(
            checked = summary.checked,
            divergences = summary.divergences_found,
            "Divergence audit finished",
        );
        invalidate_with_dependents(&self.cache, Resource::Divergencias);
        Ok(summary)
    }

    /// Migrate carteirinhas. A real run marks carteirinha and patient pages
    /// stale; a dry run leaves the cache alone.
    pub async fn migrate_carteirinhas(
        &self,
        request: &MigrationRequest,
    ) -> ClientResult<MigrationSummary> {
        let summary = self.mutations.migrate_carteirinhas(request).await?;

        tracing::info!(
            dry_run = request.dry_run(),
            eligible = summary.eligible,
            migrated = summary.migrated,
            skipped = summary.skipped,
            errors = summary.errors.len(),
            "Carteirinha migration finished",
        );
        if !request.dry_run() {
            invalidate_with_dependents(&self.cache, Resource::Carteirinhas);
        }
        Ok(summary)
    }
}
