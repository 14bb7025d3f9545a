use serde::{Deserialize, Serialize};

use crate::value_objects::Timestamp;

/// 单条消息正文的最大长度（字符数）。
pub const MAX_MESSAGE_CHARS: usize = 500;

/// 聊天消息记录。
///
/// 字段名按线上协议序列化为 camelCase，与历史接口返回的记录一致。
/// 一旦创建即不可变，作用域内不会被删除。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    pub text: String,
    pub timestamp: Timestamp,
}

impl ChatMessage {
    /// 根据入站 chat 事件组装消息。
    ///
    /// 正文先去除首尾空白，空内容返回 `None`；超长内容截断到
    /// [`MAX_MESSAGE_CHARS`] 个字符。发送者缺省为匿名身份。
    pub fn compose(
        user_id: Option<String>,
        user_name: Option<String>,
        text: &str,
        now: Timestamp,
    ) -> Option<Self> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }

        let text = match trimmed.char_indices().nth(MAX_MESSAGE_CHARS) {
            Some((cut, _)) => trimmed[..cut].to_owned(),
            None => trimmed.to_owned(),
        };

        let user_id = user_id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| "anonymous".to_owned());
        let user_name = user_name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| "Anonymous".to_owned());

        Some(Self {
            id: Self::create_id(now),
            user_id,
            user_name,
            text,
            timestamp: now,
        })
    }

    /// 生成消息标识：`msg-{毫秒时间戳}-{随机十六进制}`。
    ///
    /// 同一毫秒内的冲突由随机后缀规避。
    fn create_id(now: Timestamp) -> String {
        format!("msg-{}-{:x}", now, rand::random::<u64>())
    }
}
