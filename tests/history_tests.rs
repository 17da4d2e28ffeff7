// Copyright (c) 2025 Smartbill.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::Connection;
use smartbill::db::init_schema;
use smartbill::history::ChatHistory;
use smartbill::models::{ChatMessage, Role};
use smartbill::utils::set_setting;

fn setup() -> Connection {
    let mut conn = Connection::open_in_memory().unwrap();
    init_schema(&mut conn).unwrap();
    conn
}

#[test]
fn fresh_store_seeds_a_single_greeting() {
    let conn = setup();
    let history = ChatHistory::load(&conn).unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history.messages()[0].role, Role::Assistant);
    assert!(!history.messages()[0].text.is_empty());
}

#[test]
fn transcript_round_trips_through_the_store() {
    let conn = setup();
    let mut history = ChatHistory::load(&conn).unwrap();
    history.append(ChatMessage::user("午饭花了35"));
    let mut assistant = ChatMessage::assistant("记好了，¥35 午饭");
    assistant.vibe_check = Some("开心".into());
    assistant.mood_color = Some("#22c55e".into());
    history.append(assistant);
    history.save(&conn).unwrap();

    let restored = ChatHistory::load(&conn).unwrap();
    assert_eq!(restored.len(), history.len());
    assert_eq!(
        serde_json::to_string(restored.messages()).unwrap(),
        serde_json::to_string(history.messages()).unwrap()
    );
}

#[test]
fn corrupt_snapshot_reseeds_instead_of_failing() {
    let conn = setup();
    set_setting(&conn, "chat_history", "{definitely not an array").unwrap();
    let history = ChatHistory::load(&conn).unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history.messages()[0].role, Role::Assistant);
}

#[test]
fn empty_snapshot_also_reseeds() {
    let conn = setup();
    set_setting(&conn, "chat_history", "[]").unwrap();
    let history = ChatHistory::load(&conn).unwrap();
    assert_eq!(history.len(), 1);
}

#[test]
fn recent_returns_chronological_tail_without_mutating() {
    let conn = setup();
    let mut history = ChatHistory::load(&conn).unwrap();
    for i in 0..25 {
        history.append(ChatMessage::user(format!("msg {}", i)));
    }
    let total = history.len();
    let tail = history.recent(10);
    assert_eq!(tail.len(), 10);
    assert_eq!(tail[9].text, "msg 24");
    assert_eq!(tail[0].text, "msg 15");
    assert_eq!(history.len(), total);

    // Asking for more than exists returns everything
    assert_eq!(history.recent(1000).len(), total);
}
