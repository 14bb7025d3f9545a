//! 连接注册表
//!
//! 跟踪所有存活的传输连接。每个连接的出站通道是一个无界 mpsc
//! 发送端，由 web 层的发送任务消费，因此广播从不阻塞在慢连接上。
//!
//! 注册表持有 connection→userId 的弱引用（仅用于断开清理，计数
//! 的权威在 [`crate::PresenceTracker`]）。与跟踪器一样，所有变更
//! 都经过 hub 的互斥锁串行化。

use std::collections::HashMap;

use domain::UserId;
use tokio::sync::mpsc;
use uuid::Uuid;

/// 连接的不透明句柄。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 绑定到连接上的用户身份。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundUser {
    pub user_id: UserId,
    pub user_name: String,
}

#[derive(Debug)]
struct Connection {
    sender: mpsc::UnboundedSender<String>,
    user: Option<BoundUser>,
    /// 显式 leave 后置位，防止传输关闭时二次递减在线计数。
    left_cleanly: bool,
}

#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: HashMap<ConnectionId, Connection>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 登记一个尚未关联用户的新连接。
    pub fn register(&mut self, sender: mpsc::UnboundedSender<String>) -> ConnectionId {
        let id = ConnectionId(Uuid::new_v4());
        self.connections.insert(
            id,
            Connection {
                sender,
                user: None,
                left_cleanly: false,
            },
        );
        id
    }

    /// 把连接关联到用户。正常流程只绑定一次；重复绑定以最后
    /// 一次为准，不会导致错误。重新绑定意味着连接再次活跃，
    /// 之前的显式 leave 标记随之失效。
    pub fn bind(&mut self, id: ConnectionId, user_id: UserId, user_name: String) {
        if let Some(connection) = self.connections.get_mut(&id) {
            connection.user = Some(BoundUser { user_id, user_name });
            connection.left_cleanly = false;
        }
    }

    /// 标记连接已通过显式 leave 离开。
    pub fn mark_left_cleanly(&mut self, id: ConnectionId) {
        if let Some(connection) = self.connections.get_mut(&id) {
            connection.left_cleanly = true;
        }
    }

    /// 移除连接，返回绑定的用户（如有）以及是否已显式离开，
    /// 由调用方决定是否还需要递减在线计数。
    pub fn unregister(&mut self, id: ConnectionId) -> (Option<BoundUser>, bool) {
        match self.connections.remove(&id) {
            Some(connection) => (connection.user, connection.left_cleanly),
            None => (None, false),
        }
    }

    /// 向所有登记的连接投递载荷，尽力而为：发送端已关闭的连接
    /// 直接跳过，单个连接的失败不会中断整个扇出循环。
    pub fn broadcast(&self, payload: &str) {
        for (id, connection) in &self.connections {
            if connection.sender.send(payload.to_owned()).is_err() {
                tracing::debug!(connection_id = %id, "skipping closed connection during broadcast");
            }
        }
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}
