// Copyright (c) 2025 Smartbill.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{bail, Context, Result};
use base64::Engine;
use rusqlite::Connection;

use crate::gateway::Gateway;
use crate::history::ChatHistory;
use crate::models::{ChatMessage, ModelReply, Role};
use crate::reconcile;
use crate::utils::{self, highlight_amounts};
use crate::{context, prompt};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    let text = m.get_one::<String>("text");
    let image = m.get_one::<String>("image");

    match (text, image) {
        (_, Some(path)) => send_image(conn, path),
        (Some(t), None) if !t.trim().is_empty() => send_text(conn, t),
        _ => bail!("Nothing to send: pass some text or --image FILE"),
    }
}

fn send_text(conn: &Connection, input: &str) -> Result<()> {
    let mut history = ChatHistory::load(conn)?;
    let ledger = utils::load_ledger(conn)?;
    let budget = utils::get_monthly_budget(conn)?;
    let ctx = context::build_context(&ledger, budget, utils::today());

    let messages = prompt::build_text_messages(input, &ctx, history.messages());
    let gateway = Gateway::from_settings(conn)?;

    println!("财伴思考中...");
    let reply = gateway.send(&messages);

    history.append(ChatMessage::user(input));
    finish(conn, &mut history, reply)
}

fn send_image(conn: &Connection, path: &str) -> Result<()> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Could not read image '{}'", path))?;
    let b64 = base64::engine::general_purpose::STANDARD.encode(&bytes);
    let mime = mime_for(path);

    let mut history = ChatHistory::load(conn)?;
    let ledger = utils::load_ledger(conn)?;
    let budget = utils::get_monthly_budget(conn)?;
    let ctx = context::build_context(&ledger, budget, utils::today());

    let messages = prompt::build_image_messages(&b64, mime, &ctx);
    let gateway = Gateway::from_settings(conn)?;

    println!("正在识别图片...");
    let reply = gateway.send(&messages);

    history.append(ChatMessage::user(format!("[图片] {}", path)));
    finish(conn, &mut history, reply)
}

/// Shared tail of the pipeline: reconcile extracted candidates into the
/// ledger, append the assistant turn, persist the transcript, print.
fn finish(conn: &Connection, history: &mut ChatHistory, reply: ModelReply) -> Result<()> {
    let mut committed = Vec::new();
    let outcome = reconcile::apply(&reply, utils::today(), |t| {
        utils::insert_transaction(conn, &t)?;
        committed.push(t);
        Ok(())
    })?;

    let mut assistant = ChatMessage::assistant(reply.chat_response.clone());
    assistant.extracted = reply.transactions.clone();
    if !reply.ai_persona.vibe_check.is_empty() {
        assistant.vibe_check = Some(reply.ai_persona.vibe_check.clone());
    }
    if !reply.ai_persona.mood_color.is_empty() {
        assistant.mood_color = Some(reply.ai_persona.mood_color.clone());
    }
    history.append(assistant);
    history.save(conn)?;

    println!();
    println!("{}", highlight_amounts(&reply.chat_response));
    if let Some(vibe) = non_empty(&reply.ai_persona.vibe_check) {
        println!("  [{}]", vibe);
    }
    if outcome.added > 0 {
        println!();
        for t in &committed {
            println!("  + {} ¥{} {} ({})", t.category.label(), t.amount, t.merchant, t.date);
        }
        println!("已添加 {} 笔记录", outcome.added);
    }
    Ok(())
}

fn non_empty(s: &str) -> Option<&str> {
    let t = s.trim();
    (!t.is_empty()).then_some(t)
}

fn mime_for(path: &str) -> &'static str {
    match path.rsplit('.').next().map(|e| e.to_lowercase()).as_deref() {
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("bmp") => "image/bmp",
        _ => "image/jpeg",
    }
}

/// `smartbill history` — render the persisted transcript. Read-only; the
/// transcript has no delete or edit operations.
pub fn show_history(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    let history = ChatHistory::load(conn)?;
    let messages = match m.get_one::<usize>("limit") {
        Some(&n) => history.recent(n),
        None => history.messages(),
    };
    for msg in messages {
        let who = match msg.role {
            Role::User => "你",
            Role::Assistant => "财伴",
        };
        println!("{}: {}", who, msg.text);
        if let Some(vibe) = &msg.vibe_check {
            println!("  [{}]", vibe);
        }
    }
    Ok(())
}
