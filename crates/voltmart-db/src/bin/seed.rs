//! # Seed Data Generator
//!
//! Populates the database with a demo electronics catalog for development.
//!
//! ## Usage
//! ```bash
//! # Generate the full demo catalog (default: 500 products)
//! cargo run -p voltmart-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p voltmart-db --bin seed -- --count 1000
//!
//! # Specify database path
//! cargo run -p voltmart-db --bin seed -- --db ./data/voltmart.db
//! ```
//!
//! ## Generated Products
//! Realistic electronics data across categories:
//! - Audio (headphones, speakers, earbuds)
//! - Computing (laptops, keyboards, monitors)
//! - Mobile (phones, chargers, power banks)
//! - Accessory (cables, mounts, cases)
//! - Smart Home (plugs, cameras, bulbs)
//!
//! Each product has:
//! - Unique code: `PRD-NNNN`
//! - Deterministic price: $4.99 - $1,299.99
//! - Deterministic stock: 0 - 60 with a reorder threshold
//! - Catalog discount: 0%, 5%, 10% or 25% (in basis points)

use chrono::Utc;
use std::env;
use uuid::Uuid;
use voltmart_core::Product;
use voltmart_db::{Database, DbConfig};

/// Product categories for realistic demo data
const CATEGORIES: &[(&str, &[&str])] = &[
    (
        "Audio",
        &[
            "Wireless Headphones",
            "Noise-Cancelling Headphones",
            "Bluetooth Earbuds",
            "Studio Monitors",
            "Portable Speaker",
            "Soundbar",
            "USB Microphone",
            "DJ Headphones",
            "Bookshelf Speakers",
            "Gaming Headset",
        ],
    ),
    (
        "Computing",
        &[
            "Ultrabook 14\"",
            "Gaming Laptop 15\"",
            "Mechanical Keyboard",
            "Wireless Mouse",
            "27\" 4K Monitor",
            "USB-C Dock",
            "External SSD 1TB",
            "Webcam 1080p",
            "Laptop Stand",
            "Graphics Tablet",
        ],
    ),
    (
        "Mobile",
        &[
            "Smartphone 128GB",
            "Smartphone 256GB",
            "Fast Charger 65W",
            "Power Bank 20000mAh",
            "Wireless Charging Pad",
            "Car Charger",
            "Screen Protector",
            "Phone Gimbal",
            "Bluetooth Tracker",
            "Smartwatch",
        ],
    ),
    (
        "Accessory",
        &[
            "USB-C Cable 2m",
            "HDMI Cable 4K",
            "Ethernet Cable 5m",
            "Laptop Sleeve",
            "Phone Case",
            "Monitor Mount",
            "Cable Organizer",
            "Surge Protector",
            "SD Card 256GB",
            "Card Reader",
        ],
    ),
    (
        "Smart Home",
        &[
            "Smart Plug",
            "Smart Bulb",
            "Security Camera",
            "Video Doorbell",
            "Smart Thermostat",
            "Motion Sensor",
            "Smart Lock",
            "Mesh Router",
            "Smart Display",
            "Robot Vacuum",
        ],
    ),
];

/// Variants to multiply the base names into a fuller catalog
const VARIANTS: &[(&str, i64)] = &[
    ("", 0),
    ("Pro", 4000),
    ("Lite", -1500),
    ("Max", 8000),
    ("2nd Gen", 1000),
    ("Refurbished", -3000),
];

/// Catalog discounts in basis points
const DISCOUNTS: &[u32] = &[0, 0, 0, 500, 1000, 2500];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 500;
    let mut db_path = String::from("./voltmart_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(500);
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
                println!("VoltMart Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of products to generate (default: 500)");
                println!("  -d, --db <PATH>    Database file path (default: ./voltmart_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 VoltMart Seed Data Generator");
    println!("===============================");
    println!("Database: {}", db_path);
    println!("Products: {}", count);
    println!();

    // Connect to database
    let config = DbConfig::new(&db_path);
    let db = Database::new(config).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    // Check existing products
    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    // Generate products
    println!();
    println!("Generating products...");

    let mut generated = 0;
    let start = std::time::Instant::now();

    'outer: for (category, names) in CATEGORIES {
        for name in *names {
            for (variant, price_addon) in VARIANTS {
                if generated >= count {
                    break 'outer;
                }

                let product = generate_product(category, name, variant, *price_addon, generated);

                if let Err(e) = db.products().insert(&product).await {
                    eprintln!("Failed to insert {}: {}", product.product_code, e);
                    continue;
                }

                generated += 1;

                if generated % 100 == 0 {
                    println!("  Generated {} products...", generated);
                }
            }
        }
    }

    let elapsed = start.elapsed();
    println!();
    println!("✓ Generated {} products in {:?}", generated, elapsed);

    // Verify the reorder report has something to show
    let low = db.products().low_stock().await?;
    println!("  Low-stock products: {}", low.len());

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Generates a single product with deterministic pseudo-random data.
fn generate_product(
    category: &str,
    name: &str,
    variant: &str,
    price_addon: i64,
    seq: usize,
) -> Product {
    let now = Utc::now();

    let full_name = if variant.is_empty() {
        name.to_string()
    } else {
        format!("{name} {variant}")
    };

    // Base price $4.99 - $1,299.99, nudged by the variant
    let base_price = 499 + ((seq * 7919) % 125_000) as i64;
    let price_cents = (base_price + price_addon).max(499);

    // Stock 0-60 so some products land on the reorder report immediately
    let stock = ((seq * 31) % 61) as i64;

    Product {
        id: Uuid::new_v4().to_string(),
        product_code: format!("PRD-{:04}", seq + 1),
        name: full_name,
        category: category.to_string(),
        price_cents,
        discount_bps: DISCOUNTS[seq % DISCOUNTS.len()],
        stock,
        min_stock: 5,
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}
