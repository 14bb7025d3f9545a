//! 在线状态跟踪器
//!
//! 维护每个用户标识在并发连接上的引用计数，并计算上线/下线
//! 转换事件。同一用户打开多个标签页时只在 0→1 和 →0 的边沿
//! 各产生一次事件。
//!
//! 跟踪器本身不加锁：所有调用都经过 [`crate::ChatHub`] 的单一
//! 互斥锁串行化，引用计数因此不会为负、不会丢失更新。

use std::collections::HashMap;

use domain::{Timestamp, UserId};

/// 上线/下线转换事件。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresenceEvent {
    /// 引用计数 0→1：用户上线
    Online(UserId),
    /// 引用计数归零：用户下线
    Offline(UserId),
}

/// 单个用户的在线状态条目。
///
/// 不变量：`ref_count == 0` 的条目必须从表中移除。
#[derive(Debug, Clone)]
struct PresenceEntry {
    ref_count: u32,
    /// 最近一次 ping 的时间，仅供消费端做软超时展示，
    /// 不参与权威在线状态判定。
    last_seen: Timestamp,
}

#[derive(Debug, Default)]
pub struct PresenceTracker {
    entries: HashMap<UserId, PresenceEntry>,
}

impl PresenceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// 用户的一个连接声明上线。
    ///
    /// 只有引用计数从 0 变为 1 时返回上线事件；同一用户的后续
    /// 连接是幂等的，不再产生事件。
    pub fn join(&mut self, user_id: &UserId, now: Timestamp) -> Option<PresenceEvent> {
        match self.entries.get_mut(user_id) {
            Some(entry) => {
                entry.ref_count += 1;
                entry.last_seen = now;
                None
            }
            None => {
                self.entries.insert(
                    user_id.clone(),
                    PresenceEntry {
                        ref_count: 1,
                        last_seen: now,
                    },
                );
                Some(PresenceEvent::Online(user_id.clone()))
            }
        }
    }

    /// 用户的一个连接声明下线。
    ///
    /// 计数归零时移除条目并返回下线事件；条目不存在时是防御性
    /// 空操作（重复 leave 不会让计数为负）。
    pub fn leave(&mut self, user_id: &UserId) -> Option<PresenceEvent> {
        let entry = self.entries.get_mut(user_id)?;
        entry.ref_count = entry.ref_count.saturating_sub(1);
        if entry.ref_count == 0 {
            self.entries.remove(user_id);
            return Some(PresenceEvent::Offline(user_id.clone()));
        }
        None
    }

    /// 刷新最近活跃时间。不影响引用计数，没有对应条目时忽略。
    pub fn ping(&mut self, user_id: &UserId, now: Timestamp) {
        if let Some(entry) = self.entries.get_mut(user_id) {
            entry.last_seen = now;
        }
    }

    /// 当前在线（引用计数 > 0）的用户数量。
    pub fn online_count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_online(&self, user_id: &UserId) -> bool {
        self.entries.contains_key(user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uid(value: &str) -> UserId {
        UserId::parse(value).expect("valid user id")
    }

    #[test]
    fn first_join_emits_online() {
        let mut tracker = PresenceTracker::new();
        assert_eq!(
            tracker.join(&uid("u1"), 1),
            Some(PresenceEvent::Online(uid("u1")))
        );
        assert!(tracker.is_online(&uid("u1")));
    }

    #[test]
    fn second_tab_is_idempotent() {
        // 两个标签页：只有一次上线事件，双双离开后才下线
        let mut tracker = PresenceTracker::new();
        assert!(tracker.join(&uid("u1"), 1).is_some());
        assert!(tracker.join(&uid("u1"), 2).is_none());

        assert!(tracker.leave(&uid("u1")).is_none());
        assert_eq!(
            tracker.leave(&uid("u1")),
            Some(PresenceEvent::Offline(uid("u1")))
        );
        assert!(!tracker.is_online(&uid("u1")));
    }

    #[test]
    fn duplicate_leave_is_noop() {
        let mut tracker = PresenceTracker::new();
        assert!(tracker.leave(&uid("u1")).is_none());

        tracker.join(&uid("u1"), 1);
        assert!(tracker.leave(&uid("u1")).is_some());
        // 条目已移除，再次 leave 不会让计数为负
        assert!(tracker.leave(&uid("u1")).is_none());
        assert_eq!(tracker.online_count(), 0);
    }

    #[test]
    fn transitions_fire_exactly_once_per_edge() {
        let mut tracker = PresenceTracker::new();
        let user = uid("u1");
        let mut online = 0;
        let mut offline = 0;

        // 任意 join/leave 交错序列下每个边沿只触发一次
        for _ in 0..3 {
            for _ in 0..5 {
                if matches!(tracker.join(&user, 0), Some(PresenceEvent::Online(_))) {
                    online += 1;
                }
            }
            for _ in 0..5 {
                if matches!(tracker.leave(&user), Some(PresenceEvent::Offline(_))) {
                    offline += 1;
                }
            }
        }

        assert_eq!(online, 3);
        assert_eq!(offline, 3);
        assert_eq!(tracker.online_count(), 0);
    }

    #[test]
    fn ping_does_not_touch_ref_count() {
        let mut tracker = PresenceTracker::new();
        tracker.ping(&uid("ghost"), 10);
        assert_eq!(tracker.online_count(), 0);

        tracker.join(&uid("u1"), 1);
        tracker.ping(&uid("u1"), 99);
        assert!(tracker.is_online(&uid("u1")));
        assert_eq!(
            tracker.leave(&uid("u1")),
            Some(PresenceEvent::Offline(uid("u1")))
        );
    }
}
