//! 仓储接口定义
//!
//! 消息日志与凭据存储是外部协作者，核心只依赖这两个接口。

use async_trait::async_trait;

use crate::errors::RepositoryError;
use crate::message::ChatMessage;
use crate::user::Credential;

/// 消息日志：按插入顺序保存的有序消息序列。
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// 追加一条消息。
    async fn append(&self, message: &ChatMessage) -> Result<(), RepositoryError>;

    /// 返回最近的 `limit` 条消息，按时间升序（最旧在前）。
    async fn recent(&self, limit: u32) -> Result<Vec<ChatMessage>, RepositoryError>;
}

/// 凭据存储：用户名唯一性在这里保证。
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// 插入新用户；用户名冲突返回 [`RepositoryError::Conflict`]。
    async fn insert(&self, credential: &Credential) -> Result<(), RepositoryError>;

    /// 按用户名查找用户记录。
    async fn find_by_username(&self, username: &str)
        -> Result<Option<Credential>, RepositoryError>;
}
