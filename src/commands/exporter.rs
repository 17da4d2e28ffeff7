// Copyright (c) 2025 Smartbill.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rusqlite::Connection;
use serde_json::json;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => export_transactions(conn, sub),
        _ => Ok(()),
    }
}

fn export_transactions(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub.get_one::<String>("format").unwrap().to_lowercase();
    let out = sub.get_one::<String>("out").unwrap();

    let mut stmt = conn.prepare(
        "SELECT id, date, amount, category, merchant, is_auto_imported, need_confirmation
         FROM transactions ORDER BY id",
    )?;
    let rows = stmt.query_map([], |r| {
        Ok((
            r.get::<_, i64>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, String>(2)?,
            r.get::<_, String>(3)?,
            r.get::<_, String>(4)?,
            r.get::<_, i64>(5)?,
            r.get::<_, i64>(6)?,
        ))
    })?;

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record([
                "id",
                "date",
                "amount",
                "category",
                "merchant",
                "is_auto_imported",
                "need_confirmation",
            ])?;
            for row in rows {
                let (id, d, amt, cat, merchant, auto, pending) = row?;
                wtr.write_record([
                    id.to_string(),
                    d,
                    amt,
                    cat,
                    merchant,
                    auto.to_string(),
                    pending.to_string(),
                ])?;
            }
            wtr.flush()?;
        }
        "json" => {
            let mut items = Vec::new();
            for row in rows {
                let (id, d, amt, cat, merchant, auto, pending) = row?;
                items.push(json!({
                    "id": id, "date": d, "amount": amt, "category": cat,
                    "merchant": merchant,
                    "is_auto_imported": auto != 0,
                    "need_confirmation": pending != 0
                }));
            }
            std::fs::write(out, serde_json::to_string_pretty(&items)?)?;
        }
        _ => {
            eprintln!("Unknown format: {} (use csv|json)", fmt);
            return Ok(());
        }
    }
    println!("Exported transactions to {}", out);
    Ok(())
}
