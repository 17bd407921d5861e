//! Migrate command for storefix.
//!
//! This module wires the CLI to the migration pipeline and supports:
//! - `--dry-run` mode to preview the patch without sending it
//! - `--list` to show every migration and whether it still has work to do
//! - plain status lines for the operator on stdout

use miette::Result;
use tracing::{info, warn};

use storefix_migrate::{
    MigrationPlan, MigrationReport, MigrationSettings, Prepared, SelectError, apply_plan,
    available_migrations, find_migration, plan, prepare_migration,
};
use storefix_rest::{PatchOutcome, RestClient, RestConfig, RetryPolicy};

/// Everything the migrate command needs, already resolved from flags and env.
pub struct MigrateOptions {
    pub connection: RestConfig,
    pub settings: MigrationSettings,
    pub fetch_retries: u32,
    pub migration: Option<String>,
    pub list: bool,
    pub dry_run: bool,
}

/// Run the migrate command with the given options.
pub async fn run_migrate_command(opts: MigrateOptions) -> Result<()> {
    let client = RestClient::new(opts.connection)
        .map_err(|e| miette::miette!("{}", e))?
        .with_retry(RetryPolicy {
            max_retries: opts.fetch_retries,
            ..RetryPolicy::default()
        });

    if opts.list {
        return list_migrations(&client, &opts.settings).await;
    }

    let name = opts
        .migration
        .as_deref()
        .ok_or_else(|| miette::miette!("Specify a migration name or --list"))?;
    let migration = find_migration(&opts.settings, name).map_err(|e| miette::miette!("{}", e))?;

    println!("=== {} ===", migration.name());
    println!("{}\n", migration.description());

    let prepared = prepare_migration(&client, migration.as_ref())
        .await
        .map_err(|e| miette::miette!("{}", e))?;

    let report = match prepared {
        Prepared::Done(report) => report,
        Prepared::Ready(plan) if opts.dry_run => MigrationReport::DryRun(plan),
        Prepared::Ready(plan) => {
            // Name the target before the write so a transport failure still shows it
            for line in target_lines(&plan) {
                println!("{}", line);
            }
            apply_plan(&client, plan)
                .await
                .map_err(|e| miette::miette!("{}", e))?
        }
    };

    if let MigrationReport::Patched {
        outcome: PatchOutcome::Failure { status, .. },
        ..
    } = &report
    {
        warn!(status, migration = migration.name(), "store rejected the update");
    }

    for line in report_lines(&report) {
        println!("{}", line);
    }

    Ok(())
}

/// Lines naming the shop about to be patched.
pub fn target_lines(plan: &MigrationPlan) -> Vec<String> {
    vec![
        format!("Updating shop {} (matched {})", plan.shop_id, plan.tier),
        format!("Fields: {}", plan.patch.field_names().join(", ")),
    ]
}

/// Status tag for `--list`, with the reason when a migration cannot run.
pub fn list_status(planned: &Result<MigrationPlan, SelectError>) -> String {
    match planned {
        Ok(p) if p.patch.is_empty() => "[APPLIED]".to_string(),
        Ok(_) => "[PENDING]".to_string(),
        Err(SelectError::NotFound { .. }) => "[NO TARGET]".to_string(),
        Err(e) => format!("[BLOCKED: {}]", e),
    }
}

/// Print every migration with its status against the current snapshot.
async fn list_migrations(client: &RestClient, settings: &MigrationSettings) -> Result<()> {
    let shops = client
        .list_records()
        .await
        .map_err(|e| miette::miette!("{}", e))?;
    info!(count = shops.len(), "fetched shops for listing");

    println!("Available migrations:\n");
    for m in available_migrations(settings) {
        let status = list_status(&plan(m.as_ref(), &shops));
        println!("  {} {}", status, m.name());
        println!("      {}\n", m.description());
    }

    Ok(())
}

/// Operator-facing lines describing how a run ended.
///
/// For a patched shop the target was already announced by [`target_lines`].
pub fn report_lines(report: &MigrationReport) -> Vec<String> {
    match report {
        MigrationReport::NoTarget { criteria } => {
            vec![format!(
                "No suitable record found ({}); nothing updated.",
                criteria
            )]
        }
        MigrationReport::UpToDate { shop_id } => {
            vec![format!("Shop {} is already up to date; nothing updated.", shop_id)]
        }
        MigrationReport::DryRun(plan) => {
            let body = serde_json::to_string_pretty(&plan.patch)
                .unwrap_or_else(|e| format!("<unprintable patch: {}>", e));
            vec![
                format!(
                    "Dry-run: would update shop {} (matched {})",
                    plan.shop_id, plan.tier
                ),
                format!("Fields: {}", plan.patch.field_names().join(", ")),
                format!("Patch body:\n{}", body),
            ]
        }
        MigrationReport::Patched { plan, outcome } => {
            let mut lines = Vec::new();
            match outcome {
                PatchOutcome::Success { status } => {
                    lines.push(format!(
                        "Successfully updated shop {} ({}).",
                        plan.shop_id, status
                    ));
                }
                PatchOutcome::Failure { status, body } => {
                    lines.push(format!("Failed to update: {}", status));
                    lines.push(body.clone());
                }
            }
            lines
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use storefix_rest::{ShopId, ShopPatch};

    fn gallery_plan() -> MigrationPlan {
        MigrationPlan {
            shop_id: ShopId::Int(2),
            tier: "banner-suffix",
            patch: ShopPatch {
                gallery_images: Some(vec!["https://x/a.mp4".to_string()]),
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_report_no_target() {
        let lines = report_lines(&MigrationReport::NoTarget {
            criteria: "banner-suffix, then any-banner".to_string(),
        });
        assert_eq!(
            lines,
            vec!["No suitable record found (banner-suffix, then any-banner); nothing updated."]
        );
    }

    #[test]
    fn test_report_success() {
        let lines = report_lines(&MigrationReport::Patched {
            plan: gallery_plan(),
            outcome: PatchOutcome::Success { status: 204 },
        });
        assert_eq!(lines, vec!["Successfully updated shop 2 (204)."]);
    }

    #[test]
    fn test_target_lines_name_shop() {
        assert_eq!(
            target_lines(&gallery_plan()),
            vec![
                "Updating shop 2 (matched banner-suffix)",
                "Fields: gallery_images",
            ]
        );
    }

    #[test]
    fn test_list_status_blocked_shows_reason() {
        let status = list_status(&Err(SelectError::AmbiguousTenant { count: 2 }));
        assert_eq!(
            status,
            "[BLOCKED: collection holds 2 shops, expected exactly one]"
        );
    }

    #[test]
    fn test_list_status_states() {
        assert_eq!(list_status(&Ok(gallery_plan())), "[PENDING]");

        let mut applied = gallery_plan();
        applied.patch = ShopPatch::default();
        assert_eq!(list_status(&Ok(applied)), "[APPLIED]");

        let not_found = Err(SelectError::NotFound {
            criteria: "any-banner".to_string(),
        });
        assert_eq!(list_status(&not_found), "[NO TARGET]");
    }

    #[test]
    fn test_report_failure_includes_body() {
        let lines = report_lines(&MigrationReport::Patched {
            plan: gallery_plan(),
            outcome: PatchOutcome::Failure {
                status: 400,
                body: "bad column".to_string(),
            },
        });
        assert_eq!(lines, vec!["Failed to update: 400", "bad column"]);
    }

    #[test]
    fn test_report_dry_run_shows_body() {
        let lines = report_lines(&MigrationReport::DryRun(gallery_plan()));
        assert_eq!(lines[0], "Dry-run: would update shop 2 (matched banner-suffix)");
        assert!(lines[2].contains("\"gallery_images\""));
        assert!(lines[2].contains("https://x/a.mp4"));
    }
}
