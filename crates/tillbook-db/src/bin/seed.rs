//! # Seed Data Generator
//!
//! Populates a database with a demo shop, catalog and transactions for
//! development.
//!
//! ## Usage
//! ```bash
//! # Seed the default database file
//! cargo run -p tillbook-db --bin seed
//!
//! # Generate a custom number of products
//! cargo run -p tillbook-db --bin seed -- --count 200
//!
//! # Specify database path
//! cargo run -p tillbook-db --bin seed -- --db ./data/tillbook.db
//! ```
//!
//! Besides the catalog, the seeder drives one full quick sale and one
//! received supply through the commit engine, so a fresh database shows
//! realistic stock movement out of the box.

use chrono::Utc;
use std::env;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use tillbook_core::{validation, Catalog, Product, Shop, Supply, SupplyItem, SupplyStatus, TransactionDraft};
use tillbook_db::{Database, DbConfig, SqliteStore};
use tillbook_engine::{CommitMode, Committer, TransactionStore};

/// Product name pool for realistic demo data.
const PRODUCTS: &[(&str, &str, i64, i64)] = &[
    // (sku, name, price_cents, cost_cents)
    ("ESP-250", "Espresso Beans 250g", 899, 520),
    ("ESP-1KG", "Espresso Beans 1kg", 2799, 1700),
    ("FLT-V60", "V60 Paper Filters (100)", 649, 310),
    ("MUG-CLS", "Classic Ceramic Mug", 1250, 480),
    ("MUG-TRV", "Travel Mug 400ml", 1999, 850),
    ("TEA-EGY", "Earl Grey Tin 125g", 1149, 600),
    ("TEA-SEN", "Sencha Green Tin 100g", 1349, 720),
    ("CHO-70D", "Dark Chocolate 70% Bar", 450, 210),
    ("CHO-MLK", "Milk Chocolate Bar", 399, 180),
    ("GFT-BOX", "Gift Box Assortment", 3499, 1900),
    ("SYR-VAN", "Vanilla Syrup 250ml", 799, 390),
    ("SYR-CRM", "Caramel Syrup 250ml", 799, 390),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut count: usize = PRODUCTS.len();
    let mut db_path = String::from("./tillbook_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(PRODUCTS.len());
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Tillbook Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of products to generate");
                println!("  -d, --db <PATH>    Database file path (default: ./tillbook_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Tillbook Seed Data Generator");
    println!("============================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected, migrations applied");

    // One demo shop at the default 10% VAT
    let shop = Shop {
        id: Uuid::new_v4().to_string(),
        name: "Demo Roastery".to_string(),
        vat_rate_bps: None,
        currency: "USD".to_string(),
        created_at: Utc::now(),
    };
    db.shops().insert(&shop).await?;
    println!("✓ Shop '{}' created ({})", shop.name, shop.id);

    // Catalog
    let mut generated = 0;
    for (index, (sku, name, price_cents, cost_cents)) in PRODUCTS.iter().cycle().enumerate() {
        if generated >= count {
            break;
        }

        // The pool cycles for large counts; suffix repeats to keep SKUs unique
        let sku = if index < PRODUCTS.len() {
            (*sku).to_string()
        } else {
            format!("{}-{}", sku, index / PRODUCTS.len())
        };

        validation::validate_sku(&sku)?;
        validation::validate_product_name(name)?;
        validation::validate_price_cents(*price_cents)?;

        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            shop_id: shop.id.clone(),
            sku,
            name: (*name).to_string(),
            price_cents: *price_cents,
            cost_cents: Some(*cost_cents),
            stock: 20 + ((index * 7) % 40) as i64,
            min_stock: Some(5),
            category_id: None,
            created_at: now,
            updated_at: now,
        };

        db.products().insert(&product).await?;
        generated += 1;
    }
    println!("✓ Generated {} products", generated);

    let store = SqliteStore::new(db.clone());
    let committer = Committer::new(store);

    // One received supply: the first product gets restocked
    let products = committer.store().list_products(&shop.id).await?;
    let Some(first) = products.first() else {
        println!("No products generated; skipping demo transactions");
        return Ok(());
    };
    let supply = Supply {
        id: Uuid::new_v4().to_string(),
        shop_id: shop.id.clone(),
        supplier_name: "Harbor Imports".to_string(),
        status: SupplyStatus::Ordered,
        created_at: Utc::now(),
        received_at: None,
        items: vec![SupplyItem {
            product_id: first.id.clone(),
            quantity: 24,
            unit_cost_cents: first.cost_cents.unwrap_or(0),
        }],
    };
    db.supplies().insert(&supply).await?;
    committer.receive_supply(&supply.id).await?;
    println!("✓ Supply received: +24 {}", first.name);

    // One quick sale through the commit engine
    let catalog = Catalog::new(committer.store().list_products(&shop.id).await?);
    let mut draft = TransactionDraft::sale(shop.id.as_str());
    draft.set_line_product(0, first.id.clone(), &catalog);
    draft.set_line_quantity(0, 2);

    let tx = committer
        .commit(&draft, &catalog, shop.vat_rate(), CommitMode::Create)
        .await?;
    println!(
        "✓ Demo sale {} committed: {} cents total",
        tx.number(),
        tx.total_cents()
    );

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
