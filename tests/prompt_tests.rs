// Copyright (c) 2025 Smartbill.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use smartbill::context::build_context;
use smartbill::models::ChatMessage;
use smartbill::prompt::{
    build_image_messages, build_text_messages, ApiContent, HISTORY_WINDOW,
};

fn ctx() -> smartbill::context::ContextSummary {
    build_context(
        &[],
        Decimal::from(3000),
        NaiveDate::parse_from_str("2025-08-25", "%Y-%m-%d").unwrap(),
    )
}

fn text_of(content: &ApiContent) -> &str {
    match content {
        ApiContent::Text(s) => s,
        ApiContent::Parts(_) => panic!("expected text content"),
    }
}

#[test]
fn system_message_carries_contract_and_grounding() {
    let messages = build_text_messages("还能花多少？", &ctx(), &[]);
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, "system");
    let system = text_of(&messages[0].content);
    assert!(system.contains("chat_response"));
    assert!(system.contains("ai_persona"));
    assert!(system.contains("月度预算"));
    // Text mode never includes the image directive
    assert!(!system.contains("图片分析任务"));
    assert_eq!(messages[1].role, "user");
    assert_eq!(text_of(&messages[1].content), "还能花多少？");
}

#[test]
fn history_window_caps_replayed_turns() {
    // 25 stored turns, only the newest HISTORY_WINDOW travel on the wire
    let history: Vec<ChatMessage> = (0..25)
        .map(|i| {
            if i % 2 == 0 {
                ChatMessage::user(format!("u{}", i))
            } else {
                ChatMessage::assistant(format!("a{}", i))
            }
        })
        .collect();
    let messages = build_text_messages("下一句", &ctx(), &history);
    // system + window + current input
    assert_eq!(messages.len(), 1 + HISTORY_WINDOW + 1);
    assert_eq!(text_of(&messages[1].content), "a5");
    assert_eq!(text_of(&messages[messages.len() - 2].content), "u24");
    // Source history untouched
    assert_eq!(history.len(), 25);
}

#[test]
fn history_roles_map_onto_wire_roles() {
    let history = vec![ChatMessage::user("hi"), ChatMessage::assistant("yo")];
    let messages = build_text_messages("again", &ctx(), &history);
    assert_eq!(messages[1].role, "user");
    assert_eq!(messages[2].role, "assistant");
}

#[test]
fn image_request_embeds_data_uri_and_directive() {
    let messages = build_image_messages("QUJD", "image/png", &ctx());
    assert_eq!(messages.len(), 2);
    let system = text_of(&messages[0].content);
    assert!(system.contains("图片分析任务"));

    let json = serde_json::to_value(&messages[1]).unwrap();
    assert_eq!(json["role"], "user");
    let parts = json["content"].as_array().unwrap();
    assert_eq!(parts[0]["type"], "image_url");
    assert_eq!(parts[0]["image_url"]["url"], "data:image/png;base64,QUJD");
    assert_eq!(parts[1]["type"], "text");
}

#[test]
fn builders_are_pure_assembly() {
    let c = ctx();
    let a = build_text_messages("x", &c, &[]);
    let b = build_text_messages("x", &c, &[]);
    assert_eq!(
        serde_json::to_string(&a).unwrap(),
        serde_json::to_string(&b).unwrap()
    );
}
