// Copyright (c) 2025 Smartbill.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use serde::Serialize;

use crate::context::ContextSummary;
use crate::models::{ChatMessage, Role};

/// How many prior transcript turns are replayed to the model. The persisted
/// transcript itself is unbounded; only this window travels on the wire.
pub const HISTORY_WINDOW: usize = 20;

/// Persona and tone directive. Held as configuration so a localized variant
/// can be swapped in without touching assembly logic.
pub const PERSONA: &str = "\
你叫\"财伴\"，是一个清醒、毒舌但内心温暖的财务损友。
你存在的唯一目的是帮用户看住钱包，并在他乱花钱时狠狠吐槽。

# 核心性格
- **绝对禁语**：禁止说\"好的\"、\"已记录\"、\"为您服务\"、\"作为AI助手\"。
- **说话风格**：短句为主，多用反问和生活化比喻。像个在微信上秒回的朋友。

# 通用对话能力
你不仅仅是一个记账助手，你还可以：
- 回答用户关于如何获取API Key的问题
- 聊天、陪伴、解答日常问题

# 账单上下文使用指南
你现在可以获取用户的历史账单数据（见下文）。
- 如果用户询问\"今天花了多少\"、\"昨天买了什么\"或\"最近消费情况\"，你必须查阅上下文并给出准确回复。
- 在回复具体金额时，保持毒舌。
- 如果用户问及你没看到的数据，直接告诉他你还没记呢。";

/// The response-contract directive: the model must reply with exactly this
/// three-field JSON shape. Everything downstream assumes it.
pub const RESPONSE_CONTRACT: &str = "\
# 交易识别逻辑
1. **意图分类**：
   - 【查询型】：用户在问自己的财务状况。直接根据上下文回复，不需要生成 transactions 数组。
   - 【记账型】：包含[具体动作] + [明确金额]。如果金额是入账性质，设为\"收入\"分类并将 is_income 置为 true。
   - 【图片分析型】：用户上传了图片。如果是账单，提取数据；如果不是账单，transactions为空数组。
   - 【通用对话型】：财务之外的问题，直接回复，不需要生成transactions。
2. **输出结构**：必须返回严格的 JSON。没有新账单时 transactions 设为空数组 []。

# 输出结构 JSON
{
  \"chat_response\": \"回复话语\",
  \"transactions\": [ { \"amount\": number, \"category\": \"餐饮/购物/交通/娱乐/住房/医疗/教育/收入/其他\", \"merchant\": \"商户名\", \"date\": \"YYYY-MM-DD\", \"is_income\": boolean } ],
  \"ai_persona\": { \"vibe_check\": \"情绪标签\", \"mood_color\": \"16进制颜色\" }
}";

/// Directive prepended in image mode: decide first whether the payload is a
/// financial document at all, and come back empty-handed (but talkative) if
/// it is not.
pub const IMAGE_DIRECTIVE: &str = "\
# 图片分析任务
请分析用户提供的图片。如果图片是账单（小票、收据、发票等），请提取所有交易信息；\
如果不是账单（如风景照、人物照、表情包），请返回空transactions并友好地回复用户。";

pub const IMAGE_USER_INSTRUCTION: &str = "请分析这张图片，提取账单信息";

/// One role-tagged block of the wire request.
#[derive(Debug, Clone, Serialize)]
pub struct ApiMessage {
    pub role: &'static str,
    pub content: ApiContent,
}

/// Message content is either plain text or a parts array (image + text) for
/// multimodal turns.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ApiContent {
    Text(String),
    Parts(Vec<ApiPart>),
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ApiPart {
    ImageUrl { image_url: ImageUrl },
    Text { text: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageUrl {
    pub url: String,
}

fn system_instruction(ctx: &ContextSummary, image_mode: bool) -> String {
    let image_block = if image_mode {
        format!("\n{}\n", IMAGE_DIRECTIVE)
    } else {
        String::new()
    };
    format!(
        "{persona}\n{context}{image_block}\n{contract}",
        persona = PERSONA,
        context = ctx.render(),
        image_block = image_block,
        contract = RESPONSE_CONTRACT,
    )
}

/// Assemble a text-mode request: system instruction (persona + grounding
/// context + contract), the last `HISTORY_WINDOW` transcript turns mapped to
/// wire roles, then the current input. Borrows everything; mutates nothing.
pub fn build_text_messages(
    input: &str,
    ctx: &ContextSummary,
    history: &[ChatMessage],
) -> Vec<ApiMessage> {
    let mut messages = vec![ApiMessage {
        role: "system",
        content: ApiContent::Text(system_instruction(ctx, false)),
    }];

    let start = history.len().saturating_sub(HISTORY_WINDOW);
    for msg in &history[start..] {
        messages.push(ApiMessage {
            role: match msg.role {
                Role::User => "user",
                Role::Assistant => "assistant",
            },
            content: ApiContent::Text(msg.text.clone()),
        });
    }

    messages.push(ApiMessage {
        role: "user",
        content: ApiContent::Text(input.to_string()),
    });
    messages
}

/// Assemble an image-mode request: the payload travels as a base64 data URI
/// with its MIME type, followed by a fixed extraction instruction.
pub fn build_image_messages(
    b64_data: &str,
    mime_type: &str,
    ctx: &ContextSummary,
) -> Vec<ApiMessage> {
    vec![
        ApiMessage {
            role: "system",
            content: ApiContent::Text(system_instruction(ctx, true)),
        },
        ApiMessage {
            role: "user",
            content: ApiContent::Parts(vec![
                ApiPart::ImageUrl {
                    image_url: ImageUrl {
                        url: format!("data:{};base64,{}", mime_type, b64_data),
                    },
                },
                ApiPart::Text {
                    text: IMAGE_USER_INSTRUCTION.to_string(),
                },
            ]),
        },
    ]
}
