use edlt_core::monitor::replay_file;
use edlt_core::storage::queries;
use edlt_core::{AppConfig, IngestionStore, MonitorController, StatsSnapshot};
use edlt_types::formatting::{format_credits, format_mega_credits, format_progress};
use edlt_types::{ProfitCategory, ProgressStyle};
use std::path::{Path, PathBuf};

fn print_stats(stats: &StatsSnapshot) {
    println!(
        "ingested {}, duplicates {}, rejected {}, failed {}, rotations {}",
        stats.ingested, stats.duplicates, stats.rejected, stats.failed, stats.rotations
    );
}

pub async fn watch(config: AppConfig, dir: Option<PathBuf>) -> Result<(), String> {
    let dir = dir.unwrap_or_else(|| config.journal_directory.clone());
    let mut controller = MonitorController::new(config);
    controller.start(&dir).await.map_err(|e| e.to_string())?;

    if let Some(file) = controller.active_file() {
        println!("Tailing {} (Ctrl-C to stop)", file.display());
    }
    tokio::signal::ctrl_c().await.map_err(|e| e.to_string())?;

    controller.stop().await;
    print_stats(&controller.stats());
    Ok(())
}

pub fn replay(config: &AppConfig, path: &Path) -> Result<(), String> {
    let store = IngestionStore::open(&config.database_path).map_err(|e| e.to_string())?;
    let stats = replay_file(path, store).map_err(|e| e.to_string())?;
    print_stats(&stats);
    Ok(())
}

pub fn status(config: &AppConfig, json: bool) -> Result<(), String> {
    let Some(status) = queries::pilot_status(&config.database_path).map_err(|e| e.to_string())?
    else {
        println!("No pilot data yet");
        return Ok(());
    };

    if json {
        let text = serde_json::to_string_pretty(&status).map_err(|e| e.to_string())?;
        println!("{text}");
        return Ok(());
    }

    println!("CMDR {}", status.pilot_name);
    let location = match (&status.system_name, &status.station_name) {
        (Some(system), Some(station)) => format!("{station}, {system}"),
        (Some(system), None) => system.clone(),
        _ => "unknown".to_string(),
    };
    println!("  Location: {location}");
    if let Some(model) = &status.ship_model {
        let name = status.ship_name.as_deref().unwrap_or("-");
        println!("  Ship:     {model} \"{name}\"");
    }
    for rank in &status.ranks {
        let next = rank.track.next_level_name(rank.index).unwrap_or("max");
        let label = match rank.track.progress_style() {
            ProgressStyle::Percentage => "to",
            ProgressStyle::Superpower => "reputation towards",
        };
        println!(
            "  {:<10} {:<20} {} {label} {next}",
            rank.track.to_string(),
            rank.name,
            format_progress(rank.progress)
        );
    }
    println!("  Updated:  {}", status.last_update);
    Ok(())
}

pub fn profit(config: &AppConfig, category: Option<&str>, european: bool) -> Result<(), String> {
    let db = &config.database_path;
    let totals = match category {
        Some(name) => {
            let category: ProfitCategory = name.parse()?;
            let total = queries::profit_total(db, category).map_err(|e| e.to_string())?;
            vec![(category, total)]
        }
        None => queries::profit_totals(db).map_err(|e| e.to_string())?,
    };

    let mut sum = 0i64;
    for (category, total) in &totals {
        sum = sum.saturating_add(*total);
        println!(
            "{:<14} {:>18} Cr  ({} MCr)",
            category.label(),
            format_credits(*total, european),
            format_mega_credits(*total, european)
        );
    }
    if totals.len() > 1 {
        println!("{:<14} {:>18} Cr", "Total", format_credits(sum, european));
    }
    Ok(())
}

pub fn materials(config: &AppConfig, over_capacity: bool) -> Result<(), String> {
    let db = &config.database_path;
    let stock = if over_capacity {
        queries::over_capacity_materials(db)
    } else {
        queries::materials(db)
    }
    .map_err(|e| e.to_string())?;

    for item in &stock {
        let cap = item
            .capacity
            .map(|c| c.to_string())
            .unwrap_or_else(|| "?".to_string());
        let flag = if item.over_capacity() { "  over capacity" } else { "" };
        println!(
            "{:<13} {:<32} {:>4}/{cap}{flag}",
            item.category.to_string(),
            item.label(),
            item.count
        );
    }
    println!("{} materials", stock.len());
    Ok(())
}

pub fn system(config: &AppConfig) -> Result<(), String> {
    let entries = queries::system_data(&config.database_path).map_err(|e| e.to_string())?;
    if entries.is_empty() {
        println!("No system data yet");
        return Ok(());
    }
    println!("{}", entries[0].system_name);
    for entry in &entries {
        let distance = entry
            .distance_ls
            .map(|d| format!("{d:.1} ls"))
            .unwrap_or_default();
        println!("  {:<40} {:<28} {distance}", entry.name, entry.kind);
    }
    Ok(())
}

pub fn visited(config: &AppConfig) -> Result<(), String> {
    let systems = queries::star_systems(&config.database_path).map_err(|e| e.to_string())?;
    for system in &systems {
        let position = system
            .position
            .map(|[x, y, z]| format!("({x:.2}, {y:.2}, {z:.2})"))
            .unwrap_or_default();
        println!(
            "{:<28} {:<12} {:<16} {position}",
            system.name,
            system.allegiance.as_deref().unwrap_or("-"),
            system.government.as_deref().unwrap_or("-")
        );
    }
    println!("{} systems", systems.len());
    Ok(())
}

pub fn trades(config: &AppConfig, european: bool) -> Result<(), String> {
    let trades = queries::transactions(&config.database_path).map_err(|e| e.to_string())?;
    let mut net = 0i64;
    for trade in &trades {
        let signed = if trade.kind == "BUY" { -trade.total } else { trade.total };
        net = net.saturating_add(signed);
        println!(
            "{} {:<4} {:>5} x {:<28} {:>14} Cr  {}",
            trade.timestamp,
            trade.kind,
            trade.quantity,
            trade.commodity,
            format_credits(trade.total, european),
            trade.station_name.as_deref().unwrap_or("")
        );
    }
    println!("Net: {} Cr", format_credits(net, european));
    Ok(())
}

pub fn modules(config: &AppConfig, ship_id: Option<i64>) -> Result<(), String> {
    let db = &config.database_path;
    let ship_id = match ship_id {
        Some(id) => id,
        None => queries::pilot_status(db)
            .map_err(|e| e.to_string())?
            .and_then(|s| s.ship_id)
            .ok_or("no current ship known, pass --ship-id")?,
    };

    let modules = queries::ship_modules(db, ship_id).map_err(|e| e.to_string())?;
    println!("Ship {ship_id}: {} modules", modules.len());
    for module in &modules {
        println!(
            "  {:<28} {:<40} {}",
            module.slot,
            module.module,
            format_progress(module.health)
        );
    }
    Ok(())
}

pub fn config(
    mut config: AppConfig,
    journal_dir: Option<PathBuf>,
    database_path: Option<PathBuf>,
    poll_interval_ms: Option<u64>,
) -> Result<(), String> {
    let changed = journal_dir.is_some() || database_path.is_some() || poll_interval_ms.is_some();
    if let Some(dir) = journal_dir {
        config.journal_directory = dir;
    }
    if let Some(path) = database_path {
        config.database_path = path;
    }
    if let Some(ms) = poll_interval_ms {
        config.poll_interval_ms = ms;
    }
    if changed {
        config.save().map_err(|e| e.to_string())?;
    }

    if let Ok(path) = AppConfig::location() {
        println!("Config file:     {}", path.display());
    }
    println!("Journal dir:     {}", config.journal_directory.display());
    println!("Database:        {}", config.database_path.display());
    println!("Poll interval:   {} ms", config.poll_interval_ms);
    println!(
        "Attach retries:  {} (backoff {} ms)",
        config.attach_retries, config.attach_backoff_ms
    );
    println!("Stop timeout:    {} ms", config.stop_timeout_ms);
    Ok(())
}
