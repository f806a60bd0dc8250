//! SyncEngine implementation
//!
//! The SyncEngine ties the pieces of a sync together: it compares a source
//! model with the target's current model, checks that every required
//! reference will resolve, looks up referenced items and assets, and hands
//! the resulting Diff Model to the [`SyncExecutor`].

use chrono::{DateTime, Utc};
use cms_diff::DiffModel;
use cms_model::{EntityFilter, SyncModel};
use serde::{Deserialize, Serialize};

use crate::Result;
use crate::client::ManagementClient;
use crate::executor::SyncExecutor;
use crate::plan::SyncPlan;
use crate::resolver::{ReferenceResolver, collect_references, verify_required};

/// Report from a sync run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncReport {
    /// Whether every unit of work succeeded
    pub success: bool,
    /// Actions taken, in execution order
    pub actions: Vec<String>,
    /// Failures recorded under `continue_on_error`
    pub errors: Vec<String>,
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

impl SyncReport {
    /// Create a successful sync report
    pub fn success() -> Self {
        Self {
            success: true,
            actions: Vec::new(),
            errors: Vec::new(),
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    pub(crate) fn record_error(&mut self, error: String) {
        self.success = false;
        self.errors.push(error);
    }

    pub(crate) fn finish(mut self) -> Self {
        self.finished_at = Some(Utc::now());
        self
    }
}

/// Options for sync operations
#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    /// If true, simulate changes without calling the target.
    /// Actions will be prefixed with "[dry-run] Would ..."
    pub dry_run: bool,
    /// Record a failed unit of work and carry on with the next one
    /// instead of aborting
    pub continue_on_error: bool,
    /// Entity kinds taking part in the sync
    pub entities: EntityFilter,
}

/// Engine for synchronizing a content model into a target environment
///
/// - **diff**: Compare a source model with the target's model
/// - **execute**: Apply a previously computed diff
/// - **sync**: Both, in one call
pub struct SyncEngine<C> {
    client: C,
    plan: SyncPlan,
    options: SyncOptions,
}

impl<C: ManagementClient> SyncEngine<C> {
    pub fn new(client: C, plan: SyncPlan, options: SyncOptions) -> Self {
        Self { client, plan, options }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn options(&self) -> &SyncOptions {
        &self.options
    }

    /// Compare `source` with `target`, restricted to the configured entities
    pub fn diff(&self, source: &SyncModel, target: &SyncModel) -> DiffModel {
        DiffModel::compute(source, target, &self.options.entities)
    }

    /// Apply `diff`, computed from `source` and `target`, to the client's
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnresolvedReference`](crate::Error::UnresolvedReference)
    /// before anything is applied when a required reference cannot be
    /// resolved, and [`Error::Apply`](crate::Error::Apply) for the first
    /// failed unit unless `continue_on_error` is set.
    pub async fn execute(&self, source: &SyncModel, target: &SyncModel, diff: &DiffModel) -> Result<SyncReport> {
        verify_required(source, target, &self.options.entities)?;

        let references = collect_references(&source.filtered(&self.options.entities));
        tracing::debug!(count = references.len(), "Resolving item and asset references");
        let resolver = ReferenceResolver::build(&self.client, &references).await?;

        SyncExecutor::new(&self.client, &resolver, &self.options)
            .execute(&self.plan, diff, source)
            .await
    }

    /// Diff, then execute
    pub async fn sync(&self, source: &SyncModel, target: &SyncModel) -> Result<SyncReport> {
        let diff = self.diff(source, target);
        if diff.is_empty() {
            tracing::info!("Target already matches the source");
            return Ok(SyncReport::success().finish());
        }
        self.execute(source, target, &diff).await
    }
}
