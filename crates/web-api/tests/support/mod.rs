use std::{net::SocketAddr, sync::Arc, time::Duration};

use application::{
    ChatHub, HistoryService, SystemClock, UserService, UserServiceDependencies,
};
use axum::Router;
use domain::{MessageRepository, UserRepository};
use infrastructure::{BcryptPasswordHasher, JsonFileMessageStore, JsonFileUserStore};
use tokio::{net::TcpListener, sync::oneshot, time::sleep};
use uuid::Uuid;
use web_api::{router, AppState};

/// 用真实的 JSON 文件存储搭建完整路由，每次调用使用独立的临时目录。
pub fn build_router() -> Router {
    let data_dir = std::env::temp_dir().join(format!("lounge-it-{}", Uuid::new_v4()));

    let messages: Arc<dyn MessageRepository> =
        Arc::new(JsonFileMessageStore::new(data_dir.join("messages.json")));
    let users: Arc<dyn UserRepository> =
        Arc::new(JsonFileUserStore::new(data_dir.join("users.json")));
    let clock = Arc::new(SystemClock);

    let hub = Arc::new(ChatHub::new(messages.clone(), clock.clone()));
    let user_service = UserService::new(UserServiceDependencies {
        user_repository: users,
        // 最低 cost，让测试跑得快
        password_hasher: Arc::new(BcryptPasswordHasher::new(Some(4))),
        clock,
    });
    let history_service = HistoryService::new(messages);

    router(AppState::new(
        hub,
        Arc::new(user_service),
        Arc::new(history_service),
    ))
}

/// 绑在临时端口上的测试服务器，Drop 时触发优雅停机。
pub struct TestApp {
    pub addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
}

impl TestApp {
    pub fn http(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn ws_url(&self) -> String {
        format!("ws://{}/api/ws", self.addr)
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}

pub async fn spawn_app() -> TestApp {
    let router = build_router();
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        axum::serve(listener, router.into_make_service())
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
            .ok();
    });

    // 等待服务器启动
    sleep(Duration::from_millis(50)).await;

    TestApp {
        addr,
        shutdown: Some(shutdown_tx),
    }
}
