//! storefix: one-shot repairs for hosted shop records
//!
//! Main binary with subcommands:
//! - `migrate`: run or preview a named shop migration

use clap::{Parser, Subcommand};
use miette::Result;
use storefix_migrate::{
    DEFAULT_BANNER_SUFFIX, DEFAULT_FEATURED_VIDEO_URL, MigrationSettings, TenantPolicy,
};
use storefix_rest::{RestConfig, SHOP_TABLE};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Parse boolean from environment variable, accepting common truthy values.
/// Accepts "1", "true", "yes", "on" (case-insensitive) as true.
/// Accepts "0", "false", "no", "off", "" (case-insensitive) as false.
fn parse_bool_env(s: &str) -> Result<bool, String> {
    match s.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(format!(
            "invalid boolean value '{}', expected 1/true/yes/on or 0/false/no/off",
            s
        )),
    }
}

mod migrate;

#[derive(Parser)]
#[command(name = "storefix")]
#[command(about = "One-shot repairs for hosted shop records", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a shop data migration
    Migrate {
        /// Project URL of the REST API
        #[arg(long, env = "STOREFIX_REST_URL")]
        rest_url: String,

        /// API key sent in the `apikey` header
        #[arg(long, env = "STOREFIX_API_KEY", hide_env_values = true)]
        api_key: String,

        /// Bearer token (defaults to the API key)
        #[arg(long, env = "STOREFIX_BEARER_TOKEN", hide_env_values = true)]
        bearer_token: Option<String>,

        /// Table holding the shop rows
        #[arg(long, env = "STOREFIX_TABLE", default_value = SHOP_TABLE)]
        table: String,

        /// Migration name to run
        #[arg(value_name = "MIGRATION")]
        migration: Option<String>,

        /// List available migrations
        #[arg(long)]
        list: bool,

        /// Preview changes without applying (dry-run)
        #[arg(long)]
        dry_run: bool,

        /// Banner suffix preferred when picking the shop to mirror
        #[arg(long, default_value = DEFAULT_BANNER_SUFFIX)]
        banner_suffix: String,

        /// Featured video URL written into social_links
        #[arg(long, env = "STOREFIX_FEATURED_VIDEO_URL", default_value = DEFAULT_FEATURED_VIDEO_URL)]
        featured_video_url: String,

        /// Use the first shop when the collection holds more than one tenant.
        /// Accepts "1", "true", "yes", or "on".
        #[arg(
            long,
            env = "STOREFIX_ALLOW_MULTIPLE_TENANTS",
            action = clap::ArgAction::Set,
            value_parser = parse_bool_env,
            default_value = "false",
            num_args = 0..=1,
            default_missing_value = "true"
        )]
        allow_multiple_tenants: bool,

        /// Retries for transient fetch failures (patches are never retried)
        #[arg(long, default_value = "0")]
        fetch_retries: u32,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Initialize tracing; stdout is reserved for operator status lines
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "storefix=info".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Migrate {
            rest_url,
            api_key,
            bearer_token,
            table,
            migration,
            list,
            dry_run,
            banner_suffix,
            featured_video_url,
            allow_multiple_tenants,
            fetch_retries,
        } => {
            let connection = RestConfig {
                base_url: rest_url,
                table,
                api_key,
                bearer_token,
            };
            let settings = MigrationSettings {
                banner_suffix,
                featured_video_url,
                tenant_policy: if allow_multiple_tenants {
                    TenantPolicy::FirstRecord
                } else {
                    TenantPolicy::Strict
                },
            };

            migrate::run_migrate_command(migrate::MigrateOptions {
                connection,
                settings,
                fetch_retries,
                migration,
                list,
                dry_run,
            })
            .await
        }
    }
}
