//! 应用层实现。
//!
//! 这里提供围绕领域模型的用例服务：在线状态跟踪、连接注册表、
//! 广播路由器，以及对外部适配器（密码哈希、消息日志）的抽象。

pub mod clock;
pub mod error;
pub mod hub;
pub mod password;
pub mod presence;
pub mod registry;
pub mod services;

pub use clock::{Clock, SystemClock};
pub use error::ApplicationError;
pub use hub::ChatHub;
pub use password::{PasswordHasher, PasswordHasherError};
pub use presence::{PresenceEvent, PresenceTracker};
pub use registry::{BoundUser, ConnectionId, ConnectionRegistry};
pub use services::{
    HistoryService, UserService, UserServiceDependencies, AuthenticateUserRequest,
    RegisterUserRequest,
};
