//! 基础设施层。
//!
//! 核心之外的外部协作者在这里落地：JSON 文件消息日志与凭据
//! 存储、bcrypt 密码哈希。

pub mod json_store;
pub mod password;

pub use json_store::{JsonFileMessageStore, JsonFileUserStore};
pub use password::BcryptPasswordHasher;
