//! Usage billing CLI
//!
//! ```sh
//! # Cost a billing group with its modifiers
//! billing-calc cost --group group.json --modifiers modifiers.json
//!
//! # Pick one month out of a multi-month usage file
//! billing-calc cost --group group.json --period 2019-11
//!
//! # Sum raw environment counters of one project
//! billing-calc env-totals --environments envs.json --availability HIGH
//!
//! # Validate config and pricing table
//! billing-calc --check
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::{error, info, warn};

use usage_billing::config::AppConfig;
use usage_billing::domain::modifier::decode_modifiers;
use usage_billing::domain::usage::{billing_period, RawEnvironmentUsage};
use usage_billing::domain::{Availability, BillingGroup, BillingPeriod};
use usage_billing::{
    calculate_project_environments_totals_to_bill, init_tracing, normalize_environments,
    BillingService, InMemoryModifierStore,
};

/// Monthly usage billing calculator.
#[derive(Parser, Debug)]
#[command(
    name = "billing-calc",
    version,
    about = "Cost monthly project usage for billing groups",
    long_about = "Prices hits, storage and environment hours per currency and \
                  availability, then applies the group's discounts and surcharges.\n\n\
                  Default config: ~/.config/usage-billing/config.toml"
)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = "BILLING_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Override the pricing table file (TOML).
    #[arg(long, global = true)]
    pricing: Option<PathBuf>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    /// Validate the configuration and pricing table, then exit.
    #[arg(long)]
    check: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Cost a billing group and print the breakdown as JSON.
    Cost {
        /// Billing group JSON file.
        #[arg(short, long)]
        group: PathBuf,

        /// Modifiers JSON file (array of modifiers or modifier records).
        #[arg(short, long)]
        modifiers: Option<PathBuf>,

        /// Month to bill (YYYY-MM). Required when the group spans months.
        #[arg(short, long)]
        period: Option<BillingPeriod>,
    },

    /// Sum raw environment counters of one project and print them as JSON.
    EnvTotals {
        /// Environments JSON file.
        #[arg(short, long)]
        environments: PathBuf,

        /// Emit a full usage record with this availability.
        #[arg(short, long)]
        availability: Option<Availability>,

        /// Project name used in the usage record.
        #[arg(short, long, default_value = "")]
        name: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // ── Load configuration ─────────────────────────────────────
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(usage_billing::default_config_path);

    let (mut config, load_error) = match AppConfig::load(&config_path) {
        Ok(cfg) => (cfg, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };

    // ── Apply CLI overrides ────────────────────────────────────
    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }

    // Init tracing first so subsequent logs are formatted properly
    init_tracing(&config);
    match load_error {
        None => info!("Configuration loaded from {}", config_path.display()),
        Some(e) => {
            if config_path.exists() {
                error!("Failed to load config from {}: {}", config_path.display(), e);
            }
            info!("Using default configuration.");
        }
    }

    run(cli, config, &config_path).await
}

async fn run(
    cli: Cli,
    mut config: AppConfig,
    config_path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(path) = cli.pricing {
        info!("CLI override: pricing = {}", path.display());
        config.pricing.path = Some(path);
    }

    let pricing = config.pricing_config()?;
    pricing.validate()?;

    // ── Config validation mode ─────────────────────────────────
    if cli.check {
        println!("Configuration is valid");
        println!("   Config file : {}", config_path.display());
        match &config.pricing.path {
            Some(path) => println!("   Pricing     : {}", path.display()),
            None => println!("   Pricing     : built-in"),
        }
        println!("   Currencies  : {}", pricing.currencies.len());
        println!("   Hit tiers   : {}", pricing.hit_tiers.len());
        println!("   Log level   : {}", config.logging.level);
        return Ok(());
    }

    match cli.command {
        Some(Command::Cost {
            group,
            modifiers,
            period,
        }) => {
            let group: BillingGroup = serde_json::from_str(&std::fs::read_to_string(&group)?)?;
            let period = match period {
                Some(period) => period,
                None => billing_period(&group.projects)?,
            };

            let store = Arc::new(InMemoryModifierStore::new());
            if let Some(path) = modifiers {
                for modifier in decode_modifiers(&std::fs::read_to_string(&path)?)? {
                    if modifier.group_ref != group.name {
                        warn!(
                            group = %group.name,
                            group_ref = %modifier.group_ref,
                            "Modifier belongs to another group, skipping"
                        );
                        continue;
                    }
                    store.add(modifier);
                }
            }

            let service = BillingService::new(Arc::new(pricing), store);
            let costs = service.group_costs(&group, period).await?;
            println!("{}", serde_json::to_string_pretty(&costs)?);
        }
        Some(Command::EnvTotals {
            environments,
            availability,
            name,
        }) => {
            let environments: Vec<RawEnvironmentUsage> =
                serde_json::from_str(&std::fs::read_to_string(&environments)?)?;
            let output = match availability {
                Some(availability) => serde_json::to_string_pretty(&normalize_environments(
                    name,
                    &environments,
                    availability,
                )?)?,
                None => serde_json::to_string_pretty(
                    &calculate_project_environments_totals_to_bill(&environments)?,
                )?,
            };
            println!("{output}");
        }
        None => {
            warn!("No command given, see --help");
        }
    }

    Ok(())
}
