//! 消息历史查询用例

use std::sync::Arc;

use domain::{ChatMessage, MessageRepository};

use crate::error::ApplicationError;

/// 历史查询的条数边界，与原始接口一致。
const MIN_LIMIT: u32 = 10;
const MAX_LIMIT: u32 = 200;
const DEFAULT_LIMIT: u32 = 80;

pub struct HistoryService {
    messages: Arc<dyn MessageRepository>,
}

impl HistoryService {
    pub fn new(messages: Arc<dyn MessageRepository>) -> Self {
        Self { messages }
    }

    /// 返回最近的 N 条消息，按时间升序。
    ///
    /// `limit` 缺省 80，收敛到 10..=200；调用方解析失败时传
    /// `None` 即可落回缺省值。
    pub async fn recent_messages(
        &self,
        limit: Option<u32>,
    ) -> Result<Vec<ChatMessage>, ApplicationError> {
        let limit = limit.unwrap_or(DEFAULT_LIMIT).clamp(MIN_LIMIT, MAX_LIMIT);
        Ok(self.messages.recent(limit).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use domain::RepositoryError;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryMessageLog {
        messages: Mutex<Vec<ChatMessage>>,
        seen_limits: Mutex<Vec<u32>>,
    }

    #[async_trait]
    impl MessageRepository for MemoryMessageLog {
        async fn append(&self, message: &ChatMessage) -> Result<(), RepositoryError> {
            self.messages.lock().unwrap().push(message.clone());
            Ok(())
        }

        async fn recent(&self, limit: u32) -> Result<Vec<ChatMessage>, RepositoryError> {
            self.seen_limits.lock().unwrap().push(limit);
            let messages = self.messages.lock().unwrap();
            let skip = messages.len().saturating_sub(limit as usize);
            Ok(messages[skip..].to_vec())
        }
    }

    fn seeded(count: usize) -> Arc<MemoryMessageLog> {
        let log = Arc::new(MemoryMessageLog::default());
        let mut messages = log.messages.lock().unwrap();
        for index in 0..count {
            messages.push(
                ChatMessage::compose(
                    Some("u1".into()),
                    Some("Alice".into()),
                    &format!("message {index}"),
                    index as i64,
                )
                .expect("message"),
            );
        }
        drop(messages);
        log
    }

    #[tokio::test]
    async fn returns_most_recent_in_ascending_order() {
        let log = seeded(10);
        let service = HistoryService::new(log as Arc<dyn MessageRepository>);

        // 夹取下限：limit=5 被收敛到 10，但只存了 10 条
        let messages = service.recent_messages(Some(10)).await.expect("history");
        assert_eq!(messages.len(), 10);
        assert!(messages.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
        assert_eq!(messages.last().unwrap().text, "message 9");
    }

    #[tokio::test]
    async fn limit_is_clamped_into_bounds() {
        let log = seeded(0);
        let service = HistoryService::new(log.clone() as Arc<dyn MessageRepository>);

        service.recent_messages(Some(5)).await.expect("low");
        service.recent_messages(Some(1000)).await.expect("high");
        service.recent_messages(None).await.expect("default");

        assert_eq!(*log.seen_limits.lock().unwrap(), vec![10, 200, 80]);
    }
}
