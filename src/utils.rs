// Copyright (c) 2025 Smartbill.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use comfy_table::{presets::UTF8_FULL, Cell, Table};
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::{params, Connection, OptionalExtension};
use rust_decimal::Decimal;

use crate::models::{Category, NewTransaction, Transaction};

const UA: &str = concat!(
    "smartbill/",
    env!("CARGO_PKG_VERSION"),
    " (+https://github.com/smartbill/smartbill)"
);

pub const DEFAULT_MONTHLY_BUDGET: &str = "3000";

pub fn http_client() -> Result<reqwest::blocking::Client> {
    let c = reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(60))
        .user_agent(UA)
        .build()?;
    Ok(c)
}

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

pub fn parse_decimal(s: &str) -> Result<Decimal> {
    s.parse::<Decimal>()
        .with_context(|| format!("Invalid decimal '{}'", s))
}

/// Parse a stored amount, coercing anything unparseable to zero. Displayed
/// totals must never inherit garbage from a single bad row.
pub fn decimal_or_zero(s: &str) -> Decimal {
    s.trim().parse::<Decimal>().unwrap_or(Decimal::ZERO)
}

pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}

// --- Settings key/value store ---

pub fn get_setting(conn: &Connection, key: &str) -> Result<Option<String>> {
    let v: Option<String> = conn
        .query_row("SELECT value FROM settings WHERE key=?1", params![key], |r| {
            r.get(0)
        })
        .optional()?;
    Ok(v)
}

pub fn set_setting(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO settings(key, value) VALUES(?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![key, value],
    )?;
    Ok(())
}

/// Monthly budget, stored string-encoded. Missing or corrupt values fall
/// back to the default rather than erroring.
pub fn get_monthly_budget(conn: &Connection) -> Result<Decimal> {
    let raw = get_setting(conn, "monthly_budget")?
        .unwrap_or_else(|| DEFAULT_MONTHLY_BUDGET.to_string());
    Ok(raw
        .trim()
        .parse::<Decimal>()
        .unwrap_or_else(|_| DEFAULT_MONTHLY_BUDGET.parse().unwrap()))
}

pub fn set_monthly_budget(conn: &Connection, amount: Decimal) -> Result<()> {
    set_setting(conn, "monthly_budget", &amount.to_string())
}

/// The model credential. An empty string counts as absent; absence is not an
/// error here — the gateway degrades to its setup-guide reply.
pub fn get_api_key(conn: &Connection) -> Result<Option<String>> {
    Ok(get_setting(conn, "api_key")?.filter(|k| !k.trim().is_empty()))
}

// --- Ledger access ---

/// Full ledger in insertion order, newest first. The context formatter's
/// "recent" view is defined over this order, not date order.
pub fn load_ledger(conn: &Connection) -> Result<Vec<Transaction>> {
    let mut stmt = conn.prepare(
        "SELECT id, date, amount, category, merchant, is_auto_imported, need_confirmation
         FROM transactions ORDER BY id DESC",
    )?;
    let mut rows = stmt.query([])?;
    let mut out = Vec::new();
    while let Some(r) = rows.next()? {
        let id: i64 = r.get(0)?;
        let date_s: String = r.get(1)?;
        let amount_s: String = r.get(2)?;
        let category_s: String = r.get(3)?;
        let merchant: String = r.get(4)?;
        let auto: i64 = r.get(5)?;
        let pending: i64 = r.get(6)?;
        out.push(Transaction {
            id,
            date: parse_date(&date_s)?,
            amount: decimal_or_zero(&amount_s),
            category: Category::from_key(&category_s).unwrap_or(Category::Other),
            merchant,
            is_auto_imported: auto != 0,
            need_confirmation: pending != 0,
        });
    }
    Ok(out)
}

pub fn insert_transaction(conn: &Connection, t: &NewTransaction) -> Result<i64> {
    conn.execute(
        "INSERT INTO transactions(date, amount, category, merchant, is_auto_imported, need_confirmation)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            t.date.to_string(),
            t.amount.to_string(),
            t.category.key(),
            t.merchant,
            t.is_auto_imported as i64,
            t.need_confirmation as i64
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

// --- Display helpers ---

static AMOUNT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(¥\s?\d+(\.\d+)?|\d+(\.\d+)?\s?元)").unwrap());

/// Emphasize embedded currency tokens (¥35, 12.5元) in an assistant reply
/// for terminal display. The raw text is preserved in the transcript.
pub fn highlight_amounts(text: &str) -> String {
    AMOUNT_RE
        .replace_all(text, |caps: &regex::Captures| {
            format!("\x1b[1;32m{}\x1b[0m", &caps[0])
        })
        .into_owned()
}
