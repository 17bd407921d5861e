//! Fetch, select, transform, patch.

use storefix_rest::{PatchOutcome, Shop, ShopId, ShopPatch};
use tracing::info;

use crate::{MigrateError, Migration, SelectError, ShopStore};

/// What a migration intends to write, before any write happens.
#[derive(Debug, Clone, PartialEq)]
pub struct MigrationPlan {
    pub shop_id: ShopId,
    /// Selector tier that picked the shop.
    pub tier: &'static str,
    /// Only the fields whose value actually changes.
    pub patch: ShopPatch,
}

/// How a migration run ended.
#[derive(Debug, Clone, PartialEq)]
pub enum MigrationReport {
    /// No shop satisfied the selector; nothing was written.
    NoTarget { criteria: String },
    /// The selected shop already holds the corrected values.
    UpToDate { shop_id: ShopId },
    /// Dry run: the plan that would have been sent.
    DryRun(MigrationPlan),
    /// The patch was sent and the store answered.
    Patched {
        plan: MigrationPlan,
        outcome: PatchOutcome,
    },
}

/// Select a shop and compute its patch without touching the store.
pub fn plan(migration: &dyn Migration, shops: &[Shop]) -> Result<MigrationPlan, SelectError> {
    let selection = migration.select(shops)?;
    let patch = migration
        .transform(selection.shop)
        .without_unchanged(selection.shop);

    Ok(MigrationPlan {
        shop_id: selection.shop.id.clone(),
        tier: selection.tier,
        patch,
    })
}

/// Where a run stands after fetching and planning.
#[derive(Debug, Clone, PartialEq)]
pub enum Prepared {
    /// The run is over without a write.
    Done(MigrationReport),
    /// A patch is ready to send.
    Ready(MigrationPlan),
}

/// Fetch the collection and plan the update, without writing.
///
/// Fetch errors, an empty collection and an ambiguous tenant abort the run.
/// A selector that matches nothing ends the run cleanly without a write.
pub async fn prepare_migration(
    store: &dyn ShopStore,
    migration: &dyn Migration,
) -> Result<Prepared, MigrateError> {
    let shops = store.list_shops().await?;
    info!(migration = migration.name(), count = shops.len(), "fetched shops");

    let plan = match plan(migration, &shops) {
        Ok(plan) => plan,
        Err(SelectError::NotFound { criteria }) => {
            info!(migration = migration.name(), %criteria, "no suitable shop");
            return Ok(Prepared::Done(MigrationReport::NoTarget { criteria }));
        }
        Err(e) => return Err(e.into()),
    };

    info!(
        migration = migration.name(),
        id = %plan.shop_id,
        tier = plan.tier,
        fields = ?plan.patch.field_names(),
        "planned shop update"
    );

    if plan.patch.is_empty() {
        return Ok(Prepared::Done(MigrationReport::UpToDate {
            shop_id: plan.shop_id,
        }));
    }

    Ok(Prepared::Ready(plan))
}

/// Send a planned patch and classify the answer.
pub async fn apply_plan(
    store: &dyn ShopStore,
    plan: MigrationPlan,
) -> Result<MigrationReport, MigrateError> {
    let outcome = store.patch_shop(&plan.shop_id, &plan.patch).await?;
    info!(
        id = %plan.shop_id,
        success = outcome.is_success(),
        "patch answered"
    );

    Ok(MigrationReport::Patched { plan, outcome })
}

/// Run one migration against the store from fetch to patch.
pub async fn run_migration(
    store: &dyn ShopStore,
    migration: &dyn Migration,
    dry_run: bool,
) -> Result<MigrationReport, MigrateError> {
    match prepare_migration(store, migration).await? {
        Prepared::Done(report) => Ok(report),
        Prepared::Ready(plan) if dry_run => Ok(MigrationReport::DryRun(plan)),
        Prepared::Ready(plan) => apply_plan(store, plan).await,
    }
}
