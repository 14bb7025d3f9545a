//! 广播路由器
//!
//! 校验入站事件、通过消息日志持久化聊天事件，并把规范化后的
//! 事件扇出到所有登记的连接。自身不持有业务状态，只是在线状态
//! 跟踪器、连接注册表和消息日志之上的协调者。
//!
//! 并发模型：在线状态表和连接表共用一把
//! `tokio::sync::Mutex`，所有变更由此串行化。聊天消息的持久化
//! 在拿锁之前 await 完成，日志失败不会污染在线状态；扇出只向
//! 每连接的无界通道写入，慢连接不会反压路由器。

use std::sync::Arc;

use domain::{
    ChatMessage, ClientEvent, ClientUserRef, MessageRepository, ServerEvent, UserId, UserRef,
};
use tokio::sync::{mpsc, Mutex};

use crate::clock::Clock;
use crate::presence::PresenceTracker;
use crate::registry::{ConnectionId, ConnectionRegistry};

struct HubState {
    presence: PresenceTracker,
    registry: ConnectionRegistry,
}

pub struct ChatHub {
    state: Mutex<HubState>,
    messages: Arc<dyn MessageRepository>,
    clock: Arc<dyn Clock>,
}

impl ChatHub {
    pub fn new(messages: Arc<dyn MessageRepository>, clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Mutex::new(HubState {
                presence: PresenceTracker::new(),
                registry: ConnectionRegistry::new(),
            }),
            messages,
            clock,
        }
    }

    /// 登记一个新连接，返回后续操作使用的句柄。
    pub async fn connect(&self, sender: mpsc::UnboundedSender<String>) -> ConnectionId {
        let mut state = self.state.lock().await;
        let id = state.registry.register(sender);
        tracing::debug!(connection_id = %id, connections = state.registry.len(), "连接已登记");
        id
    }

    /// 处理一个入站文本帧。
    ///
    /// 无法解码、缺少 `type` 或形状不对的帧静默丢弃，连接保持
    /// 打开——协议层对坏输入不可见。
    pub async fn handle_frame(&self, connection_id: ConnectionId, raw: &str) {
        let event = match serde_json::from_str::<ClientEvent>(raw) {
            Ok(event) => event,
            Err(err) => {
                tracing::debug!(connection_id = %connection_id, error = %err, "丢弃无法解析的帧");
                return;
            }
        };

        match event {
            ClientEvent::Chat { user, text } => self.handle_chat(user, &text).await,
            ClientEvent::Join { user } => self.handle_join(connection_id, user).await,
            ClientEvent::Leave { user } => self.handle_leave(connection_id, user).await,
            ClientEvent::Ping { user } => self.handle_ping(user).await,
        }
    }

    /// 传输关闭时的清理：注销连接，必要时补发 leave 广播。
    ///
    /// 客户端没有发过显式 leave 就断开时，这里保证仍然恰好触发
    /// 一次下线转换。
    pub async fn disconnect(&self, connection_id: ConnectionId) {
        let mut state = self.state.lock().await;
        let (bound, already_left) = state.registry.unregister(connection_id);
        let Some(bound) = bound else {
            return;
        };

        if already_left {
            return;
        }

        if state.presence.leave(&bound.user_id).is_some() {
            tracing::info!(user_id = %bound.user_id, "用户因连接断开而下线");
            Self::broadcast_event(
                &state,
                &ServerEvent::Leave {
                    user: UserRef {
                        id: bound.user_id.into(),
                        name: bound.user_name,
                    },
                },
            );
        }
    }

    async fn handle_chat(&self, user: Option<ClientUserRef>, text: &str) {
        let user = user.unwrap_or_default();
        let Some(message) =
            ChatMessage::compose(user.id.clone(), user.name.clone(), text, self.clock.now())
        else {
            return;
        };

        // 先持久化再广播，且不持有状态锁；写入失败时不把一条
        // 无法回放的消息展示给其他人。
        if let Err(err) = self.messages.append(&message).await {
            tracing::warn!(message_id = %message.id, error = %err, "消息持久化失败，放弃广播");
            return;
        }

        let state = self.state.lock().await;
        Self::broadcast_event(&state, &ServerEvent::Chat { message });
    }

    async fn handle_join(&self, connection_id: ConnectionId, user: Option<ClientUserRef>) {
        let Some((user_id, user_name)) = Self::identify(user) else {
            return;
        };

        let mut state = self.state.lock().await;
        let transition = state.presence.join(&user_id, self.clock.now());
        state
            .registry
            .bind(connection_id, user_id.clone(), user_name.clone());

        if transition.is_some() {
            tracing::info!(user_id = %user_id, "用户上线");
            Self::broadcast_event(
                &state,
                &ServerEvent::Join {
                    user: UserRef {
                        id: user_id.into(),
                        name: user_name,
                    },
                },
            );
        }
    }

    async fn handle_leave(&self, connection_id: ConnectionId, user: Option<ClientUserRef>) {
        let Some((user_id, user_name)) = Self::identify(user) else {
            return;
        };

        let mut state = self.state.lock().await;
        let transition = state.presence.leave(&user_id);
        state.registry.mark_left_cleanly(connection_id);

        if transition.is_some() {
            tracing::info!(user_id = %user_id, "用户下线");
            Self::broadcast_event(
                &state,
                &ServerEvent::Leave {
                    user: UserRef {
                        id: user_id.into(),
                        name: user_name,
                    },
                },
            );
        }
    }

    async fn handle_ping(&self, user: Option<ClientUserRef>) {
        let Some((user_id, user_name)) = Self::identify(user) else {
            return;
        };

        let mut state = self.state.lock().await;
        state.presence.ping(&user_id, self.clock.now());

        // ping 无条件转发，不做在线状态判定
        Self::broadcast_event(
            &state,
            &ServerEvent::Ping {
                user: UserRef {
                    id: user_id.into(),
                    name: user_name,
                },
            },
        );
    }

    /// 当前在线用户数（引用计数 > 0 的用户）。
    pub async fn online_count(&self) -> usize {
        self.state.lock().await.presence.online_count()
    }

    /// 从宽松的入站引用提取有效身份；标识为空白则整个事件被忽略。
    fn identify(user: Option<ClientUserRef>) -> Option<(UserId, String)> {
        let user = user?;
        let id = user.valid_id()?;
        let user_id = UserId::parse(id).ok()?;
        Some((user_id, user.name.unwrap_or_default()))
    }

    fn broadcast_event(state: &HubState, event: &ServerEvent) {
        match serde_json::to_string(event) {
            Ok(payload) => state.registry.broadcast(&payload),
            Err(err) => {
                tracing::warn!(error = %err, "failed to serialize broadcast payload");
            }
        }
    }
}
