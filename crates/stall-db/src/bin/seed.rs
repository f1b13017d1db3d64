//! # Seed Data Generator
//!
//! Populates a development database with a small arts-marketplace catalog,
//! one curated sale session, and a handful of ledger transactions, then
//! prints the session report.
//!
//! ## Usage
//! ```bash
//! cargo run -p stall-db --bin seed
//! cargo run -p stall-db --bin seed -- --db ./data/stall.db
//! cargo run -p stall-db --bin seed -- --json   # report as JSON
//! ```

use std::env;

use stall_core::{LineInput, NewItem, NewSession, Organizer, SalesSettings};
use stall_db::{Database, DbConfig};
use tracing_subscriber::EnvFilter;

/// Catalog seeded per category: (category, [(name, cost_cents, price_cents, stock)]).
const CATALOG: &[(&str, &[(&str, i64, i64, i64)])] = &[
    (
        "Prints",
        &[
            ("Screen Print 'Harbour'", 200, 500, 40),
            ("Riso Print 'Northern Lights'", 350, 900, 25),
            ("Linocut 'Birch Grove'", 400, 1200, 15),
        ],
    ),
    (
        "Ceramics",
        &[
            ("Stoneware Mug", 250, 900, 30),
            ("Glazed Bowl", 420, 1500, 12),
        ],
    ),
    (
        "Printed Matter",
        &[
            ("Members' Zine Vol. 4", 120, 400, 60),
            ("Exhibition Catalogue", 600, 1800, 20),
        ],
    ),
    (
        "Apparel",
        &[
            ("Tote Bag", 300, 1200, 50),
            ("Logo T-Shirt", 550, 2000, 35),
        ],
    ),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();
    let mut db_path = String::from("./stall_dev.db");
    let mut json_report = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--json" | "-j" => {
                json_report = true;
            }
            "--help" | "-h" => {
                println!("Stall Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./stall_dev.db)");
                println!("  -j, --json         Print the session report as JSON");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Stall Seed Data Generator");
    println!("=========================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("- Connected, migrations applied");

    // Skip if already populated
    let existing = db.items().count().await?;
    if existing > 0 {
        println!("! Database already has {} items", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    // BC-style rates for the demo data
    db.settings()
        .update(SalesSettings::from_bps(700, 500))
        .await?;
    println!("- Sales settings: PST 7.00%, GST 5.00%");

    // Catalog
    let mut item_ids = Vec::new();
    for (category_name, items) in CATALOG {
        let category = db.categories().insert(category_name).await?;
        for (name, cost, price, stock) in *items {
            let item = db
                .items()
                .insert(NewItem {
                    category_id: Some(category.id.clone()),
                    name: (*name).to_string(),
                    cost_cents: *cost,
                    price_cents: *price,
                    track_stock: true,
                    current_stock: *stock,
                })
                .await?;
            item_ids.push(item.id);
        }
    }
    println!("- Seeded {} catalog items", item_ids.len());

    // One curated session with a few transactions
    let session = db
        .sessions()
        .create(NewSession {
            name: "Winter Market 2026".to_string(),
            event_id: None,
            project_id: None,
            organizer: Organizer::House,
            expected_revenue_cents: Some(150_000),
        })
        .await?;
    db.sessions().curate(&session.id, &item_ids).await?;
    println!("- Session '{}' curated with full catalog", session.name);

    let sales: &[&[LineInput]] = &[
        &[
            LineInput::sale(&item_ids[0], 3),
            LineInput::sale(&item_ids[3], 1),
        ],
        &[LineInput::sale(&item_ids[7], 2)],
        &[
            LineInput::sale(&item_ids[5], 4),
            // Comped copies for the featured artist
            LineInput::voucher(&item_ids[5], 2),
        ],
        &[LineInput::voucher(&item_ids[0], 1)],
    ];
    for lines in sales {
        let tx = db.ledger().record_transaction(&session.id, lines).await?;
        println!(
            "  recorded {}: total {} (promo cost {})",
            &tx.id[..8],
            tx.total(),
            tx.promo_cost()
        );
    }

    // Report
    let report = db.reports().build_report(&session.id).await?;

    if json_report {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!();
    println!("Session report: {}", session.name);
    println!("  transactions:     {}", report.transaction_count);
    println!("  actual revenue:   {}", report.actual_revenue());
    println!("  cogs:             ${:.2}", report.cogs_cents as f64 / 100.0);
    println!(
        "  promotional cost: ${:.2}",
        report.promotional_cost_cents as f64 / 100.0
    );
    println!("  net profit:       {}", report.net_profit());
    if let Some(variance) = report.revenue_variance_cents {
        println!("  vs plan:          ${:.2}", variance as f64 / 100.0);
    }
    println!("  best sellers:");
    for best in report.best_sellers.iter().take(5) {
        println!("    {:>3} × {}", best.units_sold, best.name);
    }

    println!();
    println!("Seed complete.");

    Ok(())
}
