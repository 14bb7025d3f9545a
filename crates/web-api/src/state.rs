use std::sync::Arc;

use application::{ChatHub, HistoryService, UserService};

#[derive(Clone)]
pub struct AppState {
    pub hub: Arc<ChatHub>,
    pub user_service: Arc<UserService>,
    pub history_service: Arc<HistoryService>,
}

impl AppState {
    pub fn new(
        hub: Arc<ChatHub>,
        user_service: Arc<UserService>,
        history_service: Arc<HistoryService>,
    ) -> Self {
        Self {
            hub,
            user_service,
            history_service,
        }
    }
}
