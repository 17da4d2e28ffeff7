// Copyright (c) 2025 Smartbill.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rusqlite::Connection;

use crate::gateway::{DEFAULT_API_BASE, DEFAULT_MODEL};
use crate::utils::{get_setting, pretty_table, set_setting};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("set-key", sub)) => {
            set_setting(conn, "api_key", sub.get_one::<String>("key").unwrap())?;
            println!("API key stored");
        }
        Some(("set-model", sub)) => {
            set_setting(conn, "model", sub.get_one::<String>("model").unwrap())?;
            println!("Model set");
        }
        Some(("set-base-url", sub)) => {
            set_setting(conn, "api_base", sub.get_one::<String>("url").unwrap())?;
            println!("API base URL set");
        }
        Some(("show", _)) => show(conn)?,
        _ => {}
    }
    Ok(())
}

fn show(conn: &Connection) -> Result<()> {
    let key = get_setting(conn, "api_key")?.unwrap_or_default();
    let masked = if key.trim().is_empty() {
        "(not set)".to_string()
    } else {
        mask(&key)
    };
    let rows = vec![
        vec!["api_key".to_string(), masked],
        vec![
            "model".to_string(),
            get_setting(conn, "model")?.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        ],
        vec![
            "api_base".to_string(),
            get_setting(conn, "api_base")?.unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
        ],
    ];
    println!("{}", pretty_table(&["Key", "Value"], rows));
    Ok(())
}

fn mask(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        "****".to_string()
    } else {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    }
}
