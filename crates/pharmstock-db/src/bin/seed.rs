//! # Seed Data Generator
//!
//! Populates the database with demo pharmacy stock and runs sales through
//! the real sale path.
//!
//! ## Usage
//! ```bash
//! # Demo items plus 40 sales (default)
//! cargo run -p pharmstock-db --bin seed
//!
//! # Custom sale count and database
//! cargo run -p pharmstock-db --bin seed -- --sales 200 --db ./data/shop.db
//! ```
//!
//! ## Generated Items
//! - Strip medicines (tablets and capsules, 10 or 15 per strip)
//! - Opaque items (syrup bottles, ointment tubes, inhalers)
//!
//! Sales cycle through the items in every unit each item accepts. Sales
//! that would oversell are reported and skipped, exactly as at the counter.
//! The run ends by saving the day's report snapshot.

use chrono::{Days, Utc};
use pharmstock_core::alerts::stock_alerts;
use pharmstock_core::reports::{daily_sales, daily_snapshot, inventory_summary};
use pharmstock_core::stock::stock_info;
use pharmstock_core::{
    filter_items, ItemCategory, ItemFilter, Money, SaleError, SaleService, SaleUnit, SortKey,
    SortOrder, StockItem, StockThresholds,
};
use pharmstock_db::{Database, LedgerConfig};
use std::env;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// (name, units per strip, strips, loose, price per strip in paise, base label)
const STRIP_ITEMS: &[(&str, i64, i64, i64, i64, &str)] = &[
    ("Paracetamol 500mg", 10, 12, 0, 3_000, "tablet"),
    ("Amoxicillin 250mg", 10, 4, 6, 8_500, "capsule"),
    ("Cetirizine 10mg", 10, 2, 0, 1_800, "tablet"),
    ("Metformin 500mg", 15, 6, 9, 4_500, "tablet"),
    ("Omeprazole 20mg", 15, 1, 3, 6_000, "capsule"),
];

/// (name, count, price per unit in paise, label)
const OPAQUE_ITEMS: &[(&str, i64, i64, &str)] = &[
    ("Cough Syrup 100ml", 18, 12_000, "bottle"),
    ("Betadine Ointment 20g", 7, 9_500, "tube"),
    ("Salbutamol Inhaler", 3, 25_000, "inhaler"),
];

/// Quantities the generated sales cycle through.
const QUANTITIES: &[i64] = &[1, 3, 2, 5, 1, 12, 2];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,pharmstock=debug,sqlx=warn")),
        )
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut sales: usize = 40;
    let mut db_path: Option<String> = None;
    let mut config_path: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--sales" | "-s" => {
                if i + 1 < args.len() {
                    sales = args[i + 1].parse().unwrap_or(40);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    config_path = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("pharmstock Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -s, --sales <N>      Number of sales to run (default: 40)");
                println!("  -d, --db <PATH>      Database file path (default: from config)");
                println!("  -c, --config <PATH>  Config file (default: platform config dir)");
                println!("  -h, --help           Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    let mut config = LedgerConfig::load_or_default(config_path.map(Into::into));
    if let Some(path) = db_path {
        config.database.path = path.into();
    }

    println!("🌱 pharmstock Seed Data Generator");
    println!("=================================");
    println!("Database: {}", config.database.path.display());
    println!("Sales:    {}", sales);
    println!();

    let db = Database::new(config.db_config()).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let account_id = config.account.id.clone();
    let settings = db
        .settings()
        .get_or(config.account_defaults(&account_id))
        .await?;
    let thresholds = StockThresholds::from(&settings);

    let existing = db.items().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} items", existing);
        println!("  Skipping item creation, selling from existing stock.");
    } else {
        let start = std::time::Instant::now();
        let mut created = 0;
        for item in demo_items(&account_id) {
            if let Err(e) = db.items().insert(&item).await {
                eprintln!("Failed to insert {}: {}", item.name, e);
                continue;
            }
            created += 1;
        }
        println!("✓ Created {} items in {:?}", created, start.elapsed());
    }

    // Run sales
    println!();
    println!("Running sales...");

    let items = db.items().list(&account_id, 500).await?;
    if items.is_empty() {
        println!("  No items to sell.");
        return Ok(());
    }

    let service = SaleService::new(db.stock_store()).with_thresholds(thresholds);
    let mut completed = 0;
    let mut rejected = 0;

    for n in 0..sales {
        let item = &items[n % items.len()];
        let unit = unit_for(item, n);
        let quantity = QUANTITIES[n % QUANTITIES.len()];

        match service
            .sell_with_retry(&item.id, unit, quantity, config.sales.max_attempts)
            .await
        {
            Ok(outcome) => {
                completed += 1;
                if !outcome.is_fully_recorded() {
                    eprintln!("  ⚠ {}: stock updated but record not stored", item.name);
                }
            }
            Err(SaleError::InsufficientStock {
                available,
                requested,
                ..
            }) => {
                rejected += 1;
                println!(
                    "  ✗ {}: wanted {} base units, only {} left",
                    item.name, requested, available
                );
            }
            Err(e) => return Err(e.into()),
        }
    }

    println!("✓ {} sales completed, {} rejected", completed, rejected);

    // Stock after sales
    println!();
    println!("Stock:");
    let items = db.items().list(&account_id, 500).await?;
    for item in &items {
        let info = stock_info(item, &thresholds);
        println!("  {:<24} {:<8} {}", item.name, info.level, info.message);
    }

    let summary = inventory_summary(&items, &thresholds);
    println!();
    println!(
        "Inventory: {} items, {} out of stock, {} critical, {} low, value {}",
        summary.item_count,
        summary.out_of_stock,
        summary.critical,
        summary.low,
        settings.format_money(Money::from_cents(summary.stock_value_cents))
    );

    // Daily report
    let today = Utc::now().date_naive();
    let week_ago = today.checked_sub_days(Days::new(6)).unwrap_or(today);
    let records = db.sales().list_between(&account_id, week_ago, today).await?;

    println!();
    println!("Daily sales:");
    for day in daily_sales(&records) {
        println!(
            "  {}  {} sales, {} units, {}",
            day.date,
            day.sale_count,
            day.base_units_sold,
            settings.format_money(day.revenue())
        );
        for line in &day.items {
            println!(
                "      {:<24} {:>5} units  {}",
                line.item_name,
                line.base_units,
                settings.format_money(Money::from_cents(line.revenue_cents))
            );
        }
    }

    let attention = ItemFilter::default()
        .low_stock_only()
        .sort(SortKey::Stock, SortOrder::Asc);
    let restock = filter_items(&items, &attention, &thresholds);
    if !restock.is_empty() {
        println!();
        println!("Restock first:");
        for item in restock {
            println!("  {}", item.name);
        }
    }

    let snapshot = daily_snapshot(
        &records,
        &items,
        &thresholds,
        today,
        settings.expiry_alert_days,
    );
    db.reports().upsert(&account_id, &snapshot).await?;
    println!();
    println!(
        "✓ Saved report for {}: {} sales, {}, {} low, {} expiring, {} items",
        snapshot.report_date,
        snapshot.sale_count,
        settings.format_money(snapshot.revenue()),
        snapshot.low_stock_items,
        snapshot.expiring_items,
        snapshot.total_items
    );

    let alerts = stock_alerts(&items, &thresholds, today, settings.expiry_alert_days);
    if !alerts.is_empty() {
        println!();
        println!("Alerts:");
        for alert in &alerts {
            println!("  {} {}", alert.title, alert.message);
        }
    }

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Demo stock: strip medicines and opaque items, some expiring soon.
fn demo_items(account_id: &str) -> Vec<StockItem> {
    let now = Utc::now();
    let today = now.date_naive();
    let mut items = Vec::new();

    for (idx, (name, per, strips, loose, price, label)) in STRIP_ITEMS.iter().enumerate() {
        items.push(StockItem {
            id: Uuid::new_v4().to_string(),
            account_id: account_id.to_string(),
            name: name.to_string(),
            category: ItemCategory::Standard,
            container_count: *strips,
            units_per_container: *per,
            loose_units: *loose,
            price_per_container_cents: *price,
            declared_sale_unit: SaleUnit::BaseUnit,
            container_label: Some("strip".to_string()),
            base_unit_label: Some(label.to_string()),
            expiry_date: today.checked_add_days(Days::new(20 + 90 * idx as u64)),
            barcode: Some(format!("890{:010}", 1_000 + idx)),
            batch_number: Some(format!("B{:04}", 1000 + idx)),
            manufacturer: None,
            description: None,
            created_at: now,
            updated_at: now,
            sync_version: 1,
        });
    }

    for (idx, (name, count, price, label)) in OPAQUE_ITEMS.iter().enumerate() {
        items.push(StockItem {
            id: Uuid::new_v4().to_string(),
            account_id: account_id.to_string(),
            name: name.to_string(),
            category: ItemCategory::Opaque,
            container_count: *count,
            units_per_container: 1,
            loose_units: 0,
            price_per_container_cents: *price,
            declared_sale_unit: SaleUnit::Opaque,
            container_label: Some(label.to_string()),
            base_unit_label: None,
            expiry_date: today.checked_add_days(Days::new(200 + 30 * idx as u64)),
            barcode: Some(format!("890{:010}", 2_000 + idx)),
            batch_number: Some(format!("O{:04}", 1000 + idx)),
            manufacturer: None,
            description: None,
            created_at: now,
            updated_at: now,
            sync_version: 1,
        });
    }

    items
}

/// Alternates between the units `item` accepts.
fn unit_for(item: &StockItem, n: usize) -> SaleUnit {
    match (item.category, n % 3) {
        (ItemCategory::Opaque, _) => SaleUnit::Opaque,
        (ItemCategory::Standard, 2) => SaleUnit::Container,
        (ItemCategory::Standard, _) => SaleUnit::BaseUnit,
    }
}
