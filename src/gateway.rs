// Copyright (c) 2025 Smartbill.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rusqlite::Connection;
use serde::Deserialize;
use thiserror::Error;

use crate::models::ModelReply;
use crate::prompt::ApiMessage;
use crate::utils;

pub const DEFAULT_API_BASE: &str = "https://dashscope.aliyuncs.com/compatible-mode/v1";
pub const DEFAULT_MODEL: &str = "qwen-vl-plus";

const SETUP_GUIDE: &str = "\
嘿，你还没配置 API Key 呢！没它我可没法帮你干活。

配置步骤很简单：
1. 打开阿里云DashScope：https://dashscope.console.aliyun.com/
2. 点击\"开通服务\"（新人有免费额度）
3. 左侧菜单找\"API-KEY管理\"
4. 点击\"创建API-KEY\"，复制那串密钥
5. 回到这里，运行 `smartbill config set-key <密钥>`

搞定了告诉我，咱们就开始记账！";

/// Internal failure taxonomy. Nothing here crosses the gateway boundary:
/// every variant is converted into a displayable `ModelReply` before
/// returning, so the chat surface never sees an error.
#[derive(Debug, Error)]
enum GatewayError {
    #[error("transport: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },
    #[error("response had no choices")]
    EmptyResponse,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    choices: Vec<ApiChoice>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ApiChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Client for the OpenAI-compatible chat completions endpoint. Constructed
/// once and passed into the pipeline; holds the credential explicitly
/// rather than reading ambient state.
pub struct Gateway {
    client: reqwest::blocking::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl Gateway {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
    ) -> Result<Self> {
        Ok(Gateway {
            client: utils::http_client()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key,
        })
    }

    /// Build a gateway from the settings store. A missing credential is not
    /// an error; `send` degrades to the setup guide.
    pub fn from_settings(conn: &Connection) -> Result<Self> {
        let base_url = utils::get_setting(conn, "api_base")?
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        let model =
            utils::get_setting(conn, "model")?.unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let api_key = utils::get_api_key(conn)?;
        Gateway::new(base_url, model, api_key)
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    /// Issue one request and always come back with a displayable reply.
    /// No credential, transport failure, non-2xx status and malformed bodies
    /// all resolve to fallback replies with empty transaction lists; none of
    /// them surface as errors.
    pub fn send(&self, messages: &[ApiMessage]) -> ModelReply {
        let Some(api_key) = self.api_key.as_deref() else {
            return ModelReply::plain(SETUP_GUIDE, "等待配置", "#3b82f6");
        };

        match self.request(api_key, messages) {
            Ok(content) => parse_reply(&content),
            Err(e) => ModelReply::plain(
                format!("AI服务暂时不可用: {}", e),
                "沮丧",
                "#ff6b6b",
            ),
        }
    }

    fn request(
        &self,
        api_key: &str,
        messages: &[ApiMessage],
    ) -> std::result::Result<String, GatewayError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = serde_json::json!({
            "model": self.model,
            "messages": messages,
            "response_format": { "type": "json_object" },
        });

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(GatewayError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let api_response: ApiResponse = response.json()?;
        api_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(GatewayError::EmptyResponse)
    }
}

/// Parse the model's textual content into the three-field reply contract.
/// Models wrap JSON in commentary often enough that the first balanced
/// `{...}` region is extracted before parsing; if nothing parses, the raw
/// text verbatim becomes the reply so the user always gets an answer.
pub fn parse_reply(content: &str) -> ModelReply {
    if let Ok(reply) = serde_json::from_str::<ModelReply>(content.trim()) {
        return reply;
    }
    if let Some(region) = extract_json_object(content) {
        if let Ok(reply) = serde_json::from_str::<ModelReply>(region) {
            return reply;
        }
    }
    ModelReply::plain(content.trim(), "聊天", "#a1a1aa")
}

/// First balanced `{...}` region of `text`, tracking string literals and
/// escapes so braces inside JSON strings don't skew the depth count.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (i, ch) in text[start..].char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + i + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}
