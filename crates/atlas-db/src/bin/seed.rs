//! # Seed Data Generator
//!
//! Populates a development database with the bootstrap defaults plus a
//! batch of demo products.
//!
//! ## Usage
//! ```bash
//! # Default: 200 products into ./atlas_dev.db
//! cargo run -p atlas-db --bin seed
//!
//! # Custom amount and path
//! cargo run -p atlas-db --bin seed -- --count 1000 --db ./data/atlas.db
//! ```
//!
//! Each product gets a deterministic EAN-13-shaped barcode, a price
//! between 0.99 and 19.99, and a stock level between 0 and 100 so that
//! the low-stock and out-of-stock reports have something to show.

use std::env;

use atlas_core::NewProduct;
use atlas_db::bootstrap;
use atlas_db::{Database, DbConfig};

const PRODUCT_NAMES: &[&str] = &[
    "Coca-Cola",
    "Pepsi",
    "Sprite",
    "Orange Juice",
    "Mineral Water",
    "Espresso Beans",
    "Green Tea",
    "Potato Chips",
    "Tortilla Chips",
    "Chocolate Bar",
    "Gummy Bears",
    "Oat Cookies",
    "Whole Milk",
    "Greek Yogurt",
    "Cheddar Cheese",
    "Butter",
    "White Bread",
    "Croissant",
    "Spaghetti",
    "Basmati Rice",
    "Olive Oil",
    "Tomato Sauce",
    "Canned Tuna",
    "Black Pepper",
    "Paper Towels",
];

const SIZES: &[(&str, i64)] = &[
    ("330ml", 0),
    ("500ml", 50),
    ("1L", 120),
    ("Small", 0),
    ("Large", 200),
    ("6-Pack", 400),
    ("Family Pack", 600),
    ("250g", 30),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    let mut count: usize = 200;
    let mut db_path = String::from("./atlas_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(200);
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
                println!("Atlas POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of products to generate (default: 200)");
                println!("  -d, --db <PATH>    Database file path (default: ./atlas_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Atlas POS Seed Data Generator");
    println!("=============================");
    println!("Database: {}", db_path);
    println!("Products: {}", count);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected, migrations applied");

    bootstrap::ensure_defaults(&db).await?;
    println!("✓ Bootstrap defaults ensured (admin / categories / settings)");

    let existing = db.products().list(None, None).await?.len();
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let categories = db.categories().list().await?;

    println!();
    println!("Generating products...");

    let start = std::time::Instant::now();
    let mut generated = 0usize;

    'outer: for (name_idx, name) in PRODUCT_NAMES.iter().enumerate() {
        for (size_idx, (size, price_addon)) in SIZES.iter().enumerate() {
            if generated >= count {
                break 'outer;
            }

            let serial = name_idx * SIZES.len() + size_idx;

            let product = NewProduct {
                name: format!("{} {}", name, size),
                barcode: Some(format!("200{:010}", serial)),
                category_id: pick_category_id(&categories, serial),
                price_cents: 99 + (serial as i64 * 137) % 1900 + price_addon,
                cost_price_cents: None,
                quantity: (serial as i64 * 7) % 101,
                min_quantity: 5,
                description: None,
                image_path: None,
            };

            if let Err(e) = db.products().insert(&product).await {
                eprintln!("Failed to insert {}: {}", product.name, e);
                continue;
            }

            generated += 1;
            if generated % 100 == 0 {
                println!("  Generated {} products...", generated);
            }
        }
    }

    println!();
    println!("✓ Generated {} products in {:.2?}", generated, start.elapsed());
    println!();
    println!("Login with: admin / admin123 (change it on first login)");

    db.close().await;
    Ok(())
}

/// Rotates products across the available categories. A database that
/// already has an admin may have no categories at all; those products
/// are seeded uncategorized.
fn pick_category_id(categories: &[atlas_core::CategoryWithCount], serial: usize) -> Option<i64> {
    if categories.is_empty() {
        return None;
    }
    Some(categories[serial % categories.len()].category.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use atlas_core::{Category, CategoryWithCount};
    use chrono::Utc;

    fn category(id: i64) -> CategoryWithCount {
        CategoryWithCount {
            category: Category {
                id,
                name: format!("Category {}", id),
                description: None,
                created_at: Utc::now(),
            },
            product_count: 0,
        }
    }

    #[test]
    fn test_pick_category_rotates() {
        let categories = vec![category(10), category(20)];
        assert_eq!(pick_category_id(&categories, 0), Some(10));
        assert_eq!(pick_category_id(&categories, 1), Some(20));
        assert_eq!(pick_category_id(&categories, 2), Some(10));
    }

    #[test]
    fn test_pick_category_empty_list() {
        assert_eq!(pick_category_id(&[], 0), None);
        assert_eq!(pick_category_id(&[], 7), None);
    }
}
