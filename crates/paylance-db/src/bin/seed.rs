//! # Seed Data Generator
//!
//! Populates the database with sample invoices for development.
//!
//! ## Usage
//! ```bash
//! # Generate 25 invoices (default)
//! cargo run -p paylance-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p paylance-db --bin seed -- --count 200
//!
//! # Specify database path
//! cargo run -p paylance-db --bin seed -- --db ./data/paylance.db
//! ```
//!
//! Invoices cycle through clients, services, currencies and statuses, with
//! dates spread over the past months so the dashboard shows paid, pending
//! and overdue figures.

use std::env;

use chrono::{Duration, Utc};
use paylance_core::{ClientInfo, Invoice, InvoiceStatus, LineItem, Surcharge, SurchargeKind};
use paylance_db::{Database, DbConfig};

const CLIENTS: &[(&str, &str, &str)] = &[
    ("Acme Corporation", "billing@acme.test", "1 Road Runner Way, Phoenix AZ"),
    ("Globex Inc", "ap@globex.test", "42 Cypress Creek, Springfield"),
    ("Initech", "accounts@initech.test", "4120 Freidrich Lane, Austin TX"),
    ("Umbrella Health", "finance@umbrella.test", "545 S Birch St, Raccoon City"),
    ("Stark Studio", "pay@stark.test", "10880 Malibu Point, Malibu CA"),
    ("Wayne Foundation", "grants@wayne.test", "1007 Mountain Drive, Gotham"),
];

const SERVICES: &[(&str, f64)] = &[
    ("Logo design", 450.0),
    ("Website development", 2400.0),
    ("Monthly hosting", 35.0),
    ("SEO audit", 600.0),
    ("Copywriting (per page)", 120.0),
    ("Consulting (hourly)", 95.0),
    ("Photography session", 300.0),
    ("Maintenance retainer", 800.0),
];

const CURRENCIES: &[&str] = &["USD", "EUR", "GBP", "CAD"];

const TAX_RATES: &[f64] = &[0.0, 5.0, 8.25, 10.0, 20.0];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 25;
    let mut db_path = String::from("./paylance_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(25);
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
                println!("PayLance Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of invoices to generate (default: 25)");
                println!("  -d, --db <PATH>    Database file path (default: ./paylance_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 PayLance Seed Data Generator");
    println!("===============================");
    println!("Database: {}", db_path);
    println!("Invoices: {}", count);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.invoices().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} invoices", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Generating invoices...");

    let start = std::time::Instant::now();
    let mut generated = 0;

    for index in 0..count {
        let invoice = generate_invoice(index);

        if let Err(e) = db.invoices().save(&invoice).await {
            eprintln!("Failed to insert {}: {}", invoice.invoice_number, e);
            continue;
        }

        db.clients().remember(invoice.client()).await?;
        for item in invoice.items() {
            db.items().remember(&item.description, item.rate()).await?;
        }

        generated += 1;
    }

    println!("✓ Generated {} invoices in {:?}", generated, start.elapsed());
    println!(
        "✓ Remembered {} clients, {} items",
        db.clients().all().await?.len(),
        db.items().all().await?.len()
    );

    Ok(())
}

/// Builds one deterministic sample invoice.
fn generate_invoice(index: usize) -> Invoice {
    let (name, email, address) = CLIENTS[index % CLIENTS.len()];
    let today = Utc::now().date_naive();
    let issued = today - Duration::days((index as i64 * 7) % 120);

    let mut invoice = Invoice::new();
    invoice.invoice_number = format!("INV-{:04}", 1000 + index);
    invoice.apply_client(ClientInfo {
        name: name.to_string(),
        email: Some(email.to_string()),
        address: Some(address.to_string()),
    });
    invoice.invoice_date = Some(issued);
    invoice.due_date = Some(issued + Duration::days(paylance_core::DEFAULT_DUE_DAYS));
    invoice.currency = CURRENCIES[index % CURRENCIES.len()].to_string();
    invoice.payment_terms = Some(paylance_core::DEFAULT_PAYMENT_TERMS.to_string());
    invoice.status = match index % 4 {
        0 => InvoiceStatus::Paid,
        1 => InvoiceStatus::Sent,
        2 => InvoiceStatus::Draft,
        _ => InvoiceStatus::Paid,
    };

    let line_count = 1 + index % 3;
    for offset in 0..line_count {
        let (description, rate) = SERVICES[(index + offset * 3) % SERVICES.len()];
        let quantity = (1 + (index + offset) % 4) as f64;
        invoice.add_item(LineItem::new(description, quantity, rate));
    }

    invoice.set_tax_rate(TAX_RATES[index % TAX_RATES.len()]);

    if index % 5 == 0 {
        invoice.add_surcharge(Surcharge::new("Rush fee", 50.0, SurchargeKind::Fixed));
    }
    if index % 7 == 0 {
        invoice.add_surcharge(Surcharge::new(
            "Card processing",
            2.9,
            SurchargeKind::Percentage,
        ));
    }

    invoice
}
