//! JSON 文件存储
//!
//! 消息日志与凭据存储的文件实现：整个文档一次读入、整个重写。
//! 读到损坏的文件内容时退化为空文档，而不是让服务崩溃。
//! 单个文件的读写通过互斥锁串行化。

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use domain::{ChatMessage, Credential, MessageRepository, RepositoryError, UserRepository};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tokio::sync::Mutex;

/// 读取并解析文档；文件不存在或内容损坏时返回缺省值。
async fn read_document<T: DeserializeOwned + Default>(path: &Path) -> Result<T, RepositoryError> {
    let raw = match tokio::fs::read(path).await {
        Ok(raw) => raw,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(T::default()),
        Err(err) => {
            return Err(RepositoryError::storage(format!(
                "read {}: {err}",
                path.display()
            )))
        }
    };

    match serde_json::from_slice(&raw) {
        Ok(document) => Ok(document),
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "存储文件内容损坏，按空文档处理");
            Ok(T::default())
        }
    }
}

async fn write_document<T: Serialize>(path: &Path, document: &T) -> Result<(), RepositoryError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|err| RepositoryError::storage(format!("mkdir {}: {err}", parent.display())))?;
    }
    let raw = serde_json::to_vec_pretty(document)
        .map_err(|err| RepositoryError::storage(format!("serialize: {err}")))?;
    tokio::fs::write(path, raw)
        .await
        .map_err(|err| RepositoryError::storage(format!("write {}: {err}", path.display())))
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct MessagesDocument {
    #[serde(default)]
    messages: Vec<ChatMessage>,
}

/// `messages.json` 支撑的消息日志。
pub struct JsonFileMessageStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileMessageStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }
}

#[async_trait]
impl MessageRepository for JsonFileMessageStore {
    async fn append(&self, message: &ChatMessage) -> Result<(), RepositoryError> {
        let _guard = self.lock.lock().await;
        let mut document: MessagesDocument = read_document(&self.path).await?;
        document.messages.push(message.clone());
        write_document(&self.path, &document).await
    }

    async fn recent(&self, limit: u32) -> Result<Vec<ChatMessage>, RepositoryError> {
        let _guard = self.lock.lock().await;
        let document: MessagesDocument = read_document(&self.path).await?;
        let skip = document.messages.len().saturating_sub(limit as usize);
        Ok(document.messages[skip..].to_vec())
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct UsersDocument {
    #[serde(default)]
    users: Vec<Credential>,
}

/// `users.json` 支撑的凭据存储，保证用户名唯一。
pub struct JsonFileUserStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileUserStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }
}

#[async_trait]
impl UserRepository for JsonFileUserStore {
    async fn insert(&self, credential: &Credential) -> Result<(), RepositoryError> {
        let _guard = self.lock.lock().await;
        let mut document: UsersDocument = read_document(&self.path).await?;
        if document
            .users
            .iter()
            .any(|existing| existing.username == credential.username)
        {
            return Err(RepositoryError::Conflict);
        }
        document.users.push(credential.clone());
        write_document(&self.path, &document).await
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<Credential>, RepositoryError> {
        let _guard = self.lock.lock().await;
        let document: UsersDocument = read_document(&self.path).await?;
        Ok(document
            .users
            .into_iter()
            .find(|credential| credential.username.as_str() == username))
    }
}
