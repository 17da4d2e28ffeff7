// Copyright (c) 2025 Smartbill.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rusqlite::Connection;

use crate::models::{Category, ChatMessage};
use crate::utils::{get_api_key, get_setting, pretty_table};

pub fn handle(conn: &Connection) -> Result<()> {
    let mut rows = Vec::new();

    // 1) Credential presence (absence degrades chat to the setup guide)
    if get_api_key(conn)?.is_none() {
        rows.push(vec![
            "no_api_key".into(),
            "chat will reply with setup guidance only".into(),
        ]);
    }

    // 2) Stored amounts that no longer parse as decimals
    let mut stmt = conn.prepare("SELECT id, amount FROM transactions")?;
    let mut cur = stmt.query([])?;
    while let Some(r) = cur.next()? {
        let id: i64 = r.get(0)?;
        let amount: String = r.get(1)?;
        if amount.trim().parse::<rust_decimal::Decimal>().is_err() {
            rows.push(vec![
                "bad_amount".into(),
                format!("#{} '{}' (treated as 0 in totals)", id, amount),
            ]);
        }
    }

    // 3) Category keys outside the closed set
    let mut stmt2 = conn.prepare("SELECT DISTINCT category FROM transactions")?;
    let mut cur2 = stmt2.query([])?;
    while let Some(r) = cur2.next()? {
        let c: String = r.get(0)?;
        if Category::from_key(&c).is_none() {
            rows.push(vec!["unknown_category".into(), c]);
        }
    }

    // 4) Pending confirmation backlog
    let pending: i64 = conn.query_row(
        "SELECT COUNT(*) FROM transactions WHERE need_confirmation=1",
        [],
        |r| r.get(0),
    )?;
    if pending > 0 {
        rows.push(vec![
            "pending_confirmations".into(),
            format!("{} entries excluded from totals", pending),
        ]);
    }

    // 5) Transcript snapshot parseability (corrupt data reseeds on load)
    if let Some(raw) = get_setting(conn, "chat_history")? {
        if serde_json::from_str::<Vec<ChatMessage>>(&raw).is_err() {
            rows.push(vec![
                "corrupt_chat_history".into(),
                "transcript will reseed with a greeting on next chat".into(),
            ]);
        }
    }

    if rows.is_empty() {
        println!("doctor: no issues found");
    } else {
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}
