//! Category and currency listings

use anyhow::Result;
use tally_core::Ledger;

pub fn cmd_categories(ledger: &Ledger) -> Result<()> {
    let categories = ledger.database().list_categories()?;

    if categories.is_empty() {
        println!("No categories yet. They are created when you record an expense.");
        return Ok(());
    }

    println!();
    println!("🏷️  Categories");
    println!("{:>6}  Name", "ID");
    println!("{}", "-".repeat(30));
    for category in &categories {
        println!("{:>6}  {}", category.id, category.name);
    }

    Ok(())
}

pub fn cmd_currencies(ledger: &Ledger) -> Result<()> {
    let currencies = ledger.database().list_currencies()?;

    if currencies.is_empty() {
        println!("No currencies yet. They are created when you record an expense.");
        return Ok(());
    }

    println!();
    println!("💱 Currencies");
    println!("{:>6}  Name", "ID");
    println!("{}", "-".repeat(30));
    for currency in &currencies {
        println!("{:>6}  {}", currency.id, currency.name);
    }

    Ok(())
}
