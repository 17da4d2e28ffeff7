// Copyright (c) 2025 Smartbill.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use rusqlite::Connection;
use rust_decimal::Decimal;

use crate::category;
use crate::models::NewTransaction;
use crate::utils::{insert_transaction, parse_date, today};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("csv", sub)) => import_csv(conn, sub),
        _ => Ok(()),
    }
}

/// Pull external records (bank exports, the passive listener's output) into
/// the ledger. Imported rows land in the confirmation queue: they are
/// excluded from every aggregate until `tx confirm`, unlike entries from the
/// chat pipeline which are trusted immediately.
fn import_csv(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let path = sub.get_one::<String>("file").unwrap();
    let trusted = sub.get_flag("trusted");

    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Could not open '{}'", path))?;

    let mut imported = 0usize;
    let mut skipped = 0usize;
    for record in rdr.records() {
        let record = record?;
        let date = record
            .get(0)
            .and_then(|d| parse_date(d).ok())
            .unwrap_or_else(today);
        let amount = record
            .get(1)
            .and_then(|a| a.trim().parse::<Decimal>().ok())
            .unwrap_or(Decimal::ZERO);
        if amount <= Decimal::ZERO {
            skipped += 1;
            continue;
        }
        let merchant = record
            .get(2)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or("导入记录")
            .to_string();
        let cat = category::normalize(record.get(3).unwrap_or(""));

        insert_transaction(
            conn,
            &NewTransaction {
                date,
                amount,
                category: cat,
                merchant,
                is_auto_imported: true,
                need_confirmation: !trusted,
            },
        )?;
        imported += 1;
    }

    println!(
        "Imported {} record(s), skipped {}{}",
        imported,
        skipped,
        if trusted {
            ""
        } else {
            "; run `smartbill tx list --pending` to review"
        }
    );
    Ok(())
}
