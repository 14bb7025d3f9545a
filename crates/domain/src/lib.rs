//! 聊天服务核心领域模型
//!
//! 包含用户、消息、在线状态等核心实体，以及 WebSocket 线上协议的事件定义。

pub mod errors;
pub mod events;
pub mod message;
pub mod repositories;
pub mod user;
pub mod value_objects;

// 重新导出常用类型
pub use errors::*;
pub use events::*;
pub use message::*;
pub use repositories::*;
pub use user::*;
pub use value_objects::*;
