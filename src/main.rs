mod analysis;
mod api;
mod calculator;
mod cli;
mod config;
mod db;

use crate::cli::{Cli, Commands, ConfigCommands};
use crate::config::Config;
use crate::db::Database;
use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use clap::Parser;
use std::sync::Arc;
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve => handle_serve().await,
        Commands::Add {
            activity_type,
            value,
            unit,
            owner,
        } => handle_add(&activity_type, value, &unit, owner),
        Commands::Entries { days, owner } => handle_entries(days, owner),
        Commands::Totals { days, owner } => handle_totals(days, owner),
        Commands::Analyze { owner } => handle_analyze(owner),
        Commands::History { limit, owner } => handle_history(limit, owner),
        Commands::Status => handle_status(),
        Commands::Config { command } => handle_config_command(command),
    }
}

async fn handle_serve() -> Result<()> {
    let config = Config::load_or_default()?;
    let _ = Database::open(&config.db_path)?;

    let shared_config = Arc::new(config);
    info!("carbontrack service started");

    tokio::select! {
        api_result = api::run_server(Arc::clone(&shared_config)) => {
            api_result?;
        }
        _ = signal::ctrl_c() => {
            info!("shutdown signal received");
        }
    }

    Ok(())
}

fn handle_add(activity_type: &str, value: f64, unit: &str, owner: Option<String>) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        bail!("value must be a positive number");
    }

    let config = Config::load_or_default()?;
    let owner = resolve_owner(&config, owner);

    let estimate = calculator::calculate(activity_type, value, unit);
    let database = Database::open(&config.db_path)?;
    let entry = database.insert_entry(
        &owner,
        activity_type,
        value,
        unit,
        estimate.calculated_co2,
        estimate.category,
        Utc::now().timestamp(),
    )?;

    println!("Logged entry #{}", entry.id);
    println!("- activity: {} ({} {})", entry.activity_type, entry.activity_value, entry.unit);
    println!("- category: {}", entry.category);
    println!("- co2: {} kg", entry.calculated_co2);

    Ok(())
}

fn handle_entries(days: u32, owner: Option<String>) -> Result<()> {
    let config = Config::load_or_default()?;
    let owner = resolve_owner(&config, owner);
    let database = Database::open(&config.db_path)?;

    let entries = database.entries_since(&owner, db::window_start_ts(days))?;
    if entries.is_empty() {
        println!("No entries for {owner} in the last {days} day(s)");
        return Ok(());
    }

    for entry in entries {
        println!(
            "#{} {} | {} {} {} -> {} kg ({})",
            entry.id,
            format_ts(entry.created_at),
            entry.activity_type,
            entry.activity_value,
            entry.unit,
            entry.calculated_co2,
            entry.category
        );
    }

    Ok(())
}

fn handle_totals(days: u32, owner: Option<String>) -> Result<()> {
    let config = Config::load_or_default()?;
    let owner = resolve_owner(&config, owner);
    let database = Database::open(&config.db_path)?;

    let totals = database.daily_totals(&owner, days)?;
    if totals.is_empty() {
        println!("No entries for {owner} in the last {days} day(s)");
        return Ok(());
    }

    for total in totals {
        println!(
            "{} | {} kg across {} activity(ies)",
            total.date, total.total_co2, total.activity_count
        );
    }

    Ok(())
}

fn handle_analyze(owner: Option<String>) -> Result<()> {
    let config = Config::load_or_default()?;
    let owner = resolve_owner(&config, owner);
    let database = Database::open(&config.db_path)?;

    let report = analysis::run_analysis(&database, &owner, &mut rand::thread_rng())?;
    let payload = serde_json::to_string_pretty(&report).context("Failed to serialize analysis")?;
    println!("{payload}");

    Ok(())
}

fn handle_history(limit: usize, owner: Option<String>) -> Result<()> {
    let config = Config::load_or_default()?;
    let owner = resolve_owner(&config, owner);
    let database = Database::open(&config.db_path)?;

    let history = database.list_analysis_history(&owner, limit)?;
    if history.is_empty() {
        println!("No stored analyses for {owner}");
        return Ok(());
    }

    for row in history {
        println!(
            "#{} {} | total {} kg",
            row.id,
            format_ts(row.created_at),
            row.total_co2
        );
    }

    Ok(())
}

fn handle_status() -> Result<()> {
    let config = Config::load_or_default()?;
    let database = Database::open(&config.db_path)?;
    let owner = config.default_owner.clone();

    println!("carbontrack status");
    println!("- config: {}", Config::config_path().display());
    println!("- db_path: {}", config.db_path.display());
    println!("- api_port: {}", config.api_port);
    println!("- default_owner: {owner}");
    println!("- entry_count: {}", database.entry_count(&owner)?);
    println!(
        "- last_entry_at: {}",
        database
            .latest_entry_timestamp(&owner)?
            .map(format_ts)
            .unwrap_or_else(|| "none".to_string())
    );

    Ok(())
}

fn handle_config_command(command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Set { key, value } => {
            let mut config = Config::load_or_default()?;
            config.set_value(&key, &value)?;
            config.save()?;

            println!("Config saved: {key} = {value}");
            Ok(())
        }
        ConfigCommands::Get { key } => {
            let config = Config::load_or_default()?;
            let value = config
                .get_value(&key)
                .with_context(|| format!("Unsupported config key: {key}"))?;

            println!("{value}");
            Ok(())
        }
    }
}

fn resolve_owner(config: &Config, owner: Option<String>) -> String {
    owner
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| config.default_owner.clone())
}

fn format_ts(timestamp: i64) -> String {
    DateTime::<Utc>::from_timestamp(timestamp, 0)
        .map(|datetime| datetime.to_rfc3339())
        .unwrap_or_else(|| timestamp.to_string())
}
