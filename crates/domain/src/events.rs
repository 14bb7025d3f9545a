//! WebSocket 线上协议事件定义
//!
//! 每个 JSON 帧承载一个逻辑事件，通过 `type` 字段区分。无法解码、
//! 缺少 `type` 或类型未知的帧在上层被静默丢弃，连接保持打开。

use serde::{Deserialize, Serialize};

use crate::message::ChatMessage;

/// 入站帧中客户端自报的用户引用。
///
/// 协议层宽松接受：字段可以缺失，校验交给路由器。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientUserRef {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl ClientUserRef {
    /// 取出非空白的用户标识，没有则为 `None`。
    pub fn valid_id(&self) -> Option<&str> {
        self.id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }
}

/// 出站帧中的用户引用，标识已经过校验。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
    pub id: String,
    pub name: String,
}

/// 客户端到服务端的事件。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientEvent {
    /// 发送聊天消息
    Chat {
        #[serde(default)]
        user: Option<ClientUserRef>,
        #[serde(default)]
        text: String,
    },
    /// 声明上线
    Join {
        #[serde(default)]
        user: Option<ClientUserRef>,
    },
    /// 声明下线
    Leave {
        #[serde(default)]
        user: Option<ClientUserRef>,
    },
    /// 活跃心跳（仅供客户端 UI 参考，不影响权威在线状态）
    Ping {
        #[serde(default)]
        user: Option<ClientUserRef>,
    },
}

/// 服务端广播给所有连接的事件。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerEvent {
    Chat { message: ChatMessage },
    Join { user: UserRef },
    Leave { user: UserRef },
    Ping { user: UserRef },
}
