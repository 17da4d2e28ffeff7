// Copyright (c) 2025 Smartbill.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use smartbill::gateway::{extract_json_object, parse_reply, Gateway};
use smartbill::prompt::{ApiContent, ApiMessage};

fn probe() -> Vec<ApiMessage> {
    vec![ApiMessage {
        role: "user",
        content: ApiContent::Text("记一笔".into()),
    }]
}

#[test]
fn missing_credential_returns_setup_guide_not_error() {
    let gw = Gateway::new("https://example.invalid/v1", "qwen-vl-plus", None).unwrap();
    let reply = gw.send(&probe());
    assert!(reply.chat_response.contains("API Key"));
    assert!(reply.chat_response.contains("set-key"));
    assert!(reply.transactions.is_empty());
    assert_eq!(reply.ai_persona.vibe_check, "等待配置");
}

#[test]
fn transport_failure_degrades_to_apology() {
    // Nothing listens on this port; the connection is refused immediately
    let gw = Gateway::new(
        "http://127.0.0.1:1/v1",
        "qwen-vl-plus",
        Some("sk-test".into()),
    )
    .unwrap();
    let reply = gw.send(&probe());
    assert!(reply.chat_response.contains("AI服务暂时不可用"));
    assert!(reply.transactions.is_empty());
    assert_eq!(reply.ai_persona.vibe_check, "沮丧");
}

#[test]
fn parses_clean_contract_json() {
    let content = r##"{"chat_response":"记好了","transactions":[{"amount":35,"category":"餐饮","merchant":"食堂","date":"2025-08-25"}],"ai_persona":{"vibe_check":"开心","mood_color":"#22c55e"}}"##;
    let reply = parse_reply(content);
    assert_eq!(reply.chat_response, "记好了");
    assert_eq!(reply.transactions.len(), 1);
    assert_eq!(reply.ai_persona.vibe_check, "开心");
}

#[test]
fn extracts_contract_json_out_of_commentary() {
    let content = "好的，这是结果：\n```json\n{\"chat_response\":\"ok\",\"transactions\":[],\"ai_persona\":{\"vibe_check\":\"正常\",\"mood_color\":\"#fff\"}}\n```\n希望有帮助";
    let reply = parse_reply(content);
    assert_eq!(reply.chat_response, "ok");
    assert!(reply.transactions.is_empty());
}

#[test]
fn braces_inside_strings_do_not_break_extraction() {
    let text = r#"note {"chat_response":"含括号 } 和 { 的回复","transactions":[]} tail"#;
    let region = extract_json_object(text).unwrap();
    let reply = parse_reply(text);
    assert!(region.starts_with('{') && region.ends_with('}'));
    assert_eq!(reply.chat_response, "含括号 } 和 { 的回复");
}

#[test]
fn unparseable_content_becomes_the_reply_verbatim() {
    let content = "今天天气不错，你少花点钱。";
    let reply = parse_reply(content);
    assert_eq!(reply.chat_response, content);
    assert!(reply.transactions.is_empty());
}

#[test]
fn partial_json_falls_back_to_raw_text() {
    let content = r#"{"chat_response": "truncated"#;
    let reply = parse_reply(content);
    assert_eq!(reply.chat_response, content.trim());
    assert!(reply.transactions.is_empty());
}

#[test]
fn missing_fields_default_instead_of_failing() {
    let reply = parse_reply(r#"{"chat_response":"只有回复"}"#);
    assert_eq!(reply.chat_response, "只有回复");
    assert!(reply.transactions.is_empty());
    assert_eq!(reply.ai_persona.vibe_check, "");
}

#[test]
fn extract_json_object_edge_cases() {
    assert!(extract_json_object("no braces at all").is_none());
    assert!(extract_json_object("{unclosed").is_none());
    assert_eq!(extract_json_object(r#"{"a":1}{"b":2}"#), Some(r#"{"a":1}"#));
    assert_eq!(
        extract_json_object(r#"pre {"a":{"b":2}} post"#),
        Some(r#"{"a":{"b":2}}"#)
    );
    assert_eq!(
        extract_json_object(r#"{"s":"escaped \" quote }"}"#),
        Some(r#"{"s":"escaped \" quote }"}"#)
    );
}
