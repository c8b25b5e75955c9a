//! Database seeder for Folio development and testing.
//!
//! Seeds the standard chart of accounts, an explicit mapping for every
//! transaction type the chart can resolve, and one calendar fiscal year.
//! A database that already holds accounts is left alone.
//!
//! Usage: seeder [YEAR]

use std::sync::Arc;

use anyhow::Context;
use chrono::{Datelike, NaiveDate, Utc};
use folio_core::chart::STANDARD_CHART;
use folio_core::determination::TransactionType;
use folio_core::ledger::{Ledger, LedgerState};
use folio_db::LedgerRepository;
use folio_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    let database = config
        .database
        .as_ref()
        .context("FOLIO__DATABASE__URL must be set")?;
    let year = match std::env::args().nth(1) {
        Some(arg) => arg.parse::<i32>().context("YEAR must be a number")?,
        None => Utc::now().year(),
    };

    println!("Connecting to database...");
    let db = folio_db::connect(&database.url).await?;
    let repository = LedgerRepository::new(db);

    if !repository.is_empty().await? {
        println!("  Ledger already has accounts, skipping...");
        return Ok(());
    }

    let start = NaiveDate::from_ymd_opt(year, 1, 1).context("invalid year")?;
    let end = NaiveDate::from_ymd_opt(year, 12, 31).context("invalid year")?;

    let ledger = Ledger::with_sink(
        LedgerState::new(config.ledger.clone()),
        Arc::new(repository),
    );
    let (accounts, mappings) = ledger
        .transact(move |s| {
            println!("Seeding chart of accounts...");
            for account in STANDARD_CHART {
                s.create_account(account.to_new_account())?;
            }

            println!("Seeding account mappings...");
            let mut mappings = 0;
            for transaction_type in TransactionType::ALL {
                let code = transaction_type.fallback_code();
                if s.chart().is_postable(code) {
                    s.set_mapping(transaction_type, code)?;
                    mappings += 1;
                }
            }

            println!("Seeding fiscal year FY{year}...");
            s.create_fiscal_year(format!("FY{year}"), start, end)?;
            Ok((s.chart().len(), mappings))
        })
        .await?;

    println!("Seeding complete! {accounts} accounts, {mappings} mappings");
    Ok(())
}
