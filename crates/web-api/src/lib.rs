//! Web API 层。
//!
//! 提供 Axum 路由，把 HTTP 请求委托给应用层的用例服务，
//! 把 WebSocket 连接接到广播路由器上。

mod error;
mod routes;
mod state;
mod ws_connection;

pub use error::ApiError;
pub use routes::router;
pub use state::AppState;
