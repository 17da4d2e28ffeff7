// Copyright (c) 2025 Smartbill.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rusqlite::Connection;

use crate::models::ChatMessage;
use crate::utils;

const STORAGE_KEY: &str = "chat_history";

const GREETINGS: &[&str] = &[
    "嗨！我是财伴，你的智能财务管家～有啥财务问题尽管问我！",
    "哟！今儿想聊点啥？记账、查账、还是想知道自己还有多少钱可以造？",
    "Hey~ 准备好了吗？让我帮你盯着钱包！",
];

/// The persisted conversation transcript. Append-only from the user's
/// perspective: turns are added, never edited or removed, and the whole
/// sequence is written back after each append.
#[derive(Debug, Clone)]
pub struct ChatHistory {
    messages: Vec<ChatMessage>,
}

impl ChatHistory {
    /// Restore the transcript from the settings store. An absent or corrupt
    /// snapshot seeds a fresh transcript with a single greeting instead of
    /// failing.
    pub fn load(conn: &Connection) -> Result<ChatHistory> {
        let messages = utils::get_setting(conn, STORAGE_KEY)?
            .and_then(|raw| serde_json::from_str::<Vec<ChatMessage>>(&raw).ok())
            .filter(|msgs| !msgs.is_empty())
            .unwrap_or_else(Self::seeded);
        Ok(ChatHistory { messages })
    }

    fn seeded() -> Vec<ChatMessage> {
        let pick = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.subsec_nanos() as usize % GREETINGS.len())
            .unwrap_or(0);
        let mut greeting = ChatMessage::assistant(GREETINGS[pick]);
        greeting.vibe_check = Some("聊天".to_string());
        vec![greeting]
    }

    pub fn append(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    /// Last `n` turns in chronological order, for replay as model context.
    pub fn recent(&self, n: usize) -> &[ChatMessage] {
        let start = self.messages.len().saturating_sub(n);
        &self.messages[start..]
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Persist the full transcript.
    pub fn save(&self, conn: &Connection) -> Result<()> {
        utils::set_setting(conn, STORAGE_KEY, &serde_json::to_string(&self.messages)?)
    }
}
