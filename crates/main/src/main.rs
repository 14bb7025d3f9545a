//! 主应用程序入口
//!
//! 装配存储、用例服务和广播路由器，启动 Axum Web 服务。

use std::sync::Arc;

use application::{ChatHub, HistoryService, SystemClock, UserService, UserServiceDependencies};
use config::AppConfig;
use domain::{MessageRepository, UserRepository};
use infrastructure::{BcryptPasswordHasher, JsonFileMessageStore, JsonFileUserStore};
use tracing_subscriber::EnvFilter;
use web_api::{router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // 读取环境变量配置
    let config = AppConfig::from_env();
    config.validate()?;

    tracing::info!(data_dir = %config.storage.data_dir.display(), "使用 JSON 文件存储");

    // 外部协作者：消息日志、凭据存储、密码哈希
    let messages: Arc<dyn MessageRepository> =
        Arc::new(JsonFileMessageStore::new(config.storage.messages_path()));
    let users: Arc<dyn UserRepository> =
        Arc::new(JsonFileUserStore::new(config.storage.users_path()));
    let password_hasher = Arc::new(BcryptPasswordHasher::new(config.security.bcrypt_cost));
    let clock = Arc::new(SystemClock);

    // 核心：广播路由器（在线状态 + 连接注册表）
    let hub = Arc::new(ChatHub::new(messages.clone(), clock.clone()));

    // 应用层服务
    let user_service = UserService::new(UserServiceDependencies {
        user_repository: users,
        password_hasher,
        clock,
    });
    let history_service = HistoryService::new(messages);

    let state = AppState::new(hub, Arc::new(user_service), Arc::new(history_service));

    // 启动 Web 服务器
    let app = router(state);
    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    tracing::info!("聊天服务器启动在 http://{}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
