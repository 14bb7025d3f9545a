use serde::{Deserialize, Serialize};

use crate::value_objects::{PasswordHash, Timestamp, UserId, Username};

/// 对客户端可见的用户信息。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub username: Username,
    pub display_name: String,
}

/// 凭据存储中的用户记录。
///
/// 只在存储层序列化；对客户端永远通过 [`Credential::to_user`]
/// 转换，密码哈希不会离开服务端。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    pub id: UserId,
    pub username: Username,
    pub display_name: String,
    pub password: PasswordHash,
    pub created_at: Timestamp,
}

impl Credential {
    pub fn register(
        id: UserId,
        username: Username,
        display_name: String,
        password: PasswordHash,
        now: Timestamp,
    ) -> Self {
        Self {
            id,
            username,
            display_name,
            password,
            created_at: now,
        }
    }

    /// 转换为对外公开的用户视图。
    pub fn to_user(&self) -> User {
        User {
            id: self.id.clone(),
            username: self.username.clone(),
            display_name: self.display_name.clone(),
        }
    }
}
