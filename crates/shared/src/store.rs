//! 内存存储
//!
//! 使用 DashMap 实现的并发安全内存存储，作为外部服务（用户、购物车、订单）的本地替身。

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use dashmap::DashMap;

/// 以自增 i64 为主键的内存存储
///
/// 克隆得到的实例共享同一份数据和主键序列。
#[derive(Debug)]
pub struct MemoryStore<T> {
    data: Arc<DashMap<i64, T>>,
    sequence: Arc<AtomicI64>,
}

impl<T: Clone> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> MemoryStore<T> {
    pub fn new() -> Self {
        Self {
            data: Arc::new(DashMap::new()),
            sequence: Arc::new(AtomicI64::new(0)),
        }
    }

    /// 分配下一个主键，从 1 开始
    pub fn next_id(&self) -> i64 {
        self.sequence.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// 插入或覆盖
    ///
    /// 外部指定的主键会推进序列，避免后续 `next_id` 与之冲突
    pub fn insert(&self, id: i64, value: T) {
        self.sequence.fetch_max(id, Ordering::SeqCst);
        self.data.insert(id, value);
    }

    /// 获取数据的克隆，不持有锁
    pub fn get(&self, id: i64) -> Option<T> {
        self.data.get(&id).map(|v| v.clone())
    }

    /// 原地修改并返回修改后的克隆
    ///
    /// 闭包在分片写锁内执行，不要在其中访问同一个存储
    pub fn update<F>(&self, id: i64, f: F) -> Option<T>
    where
        F: FnOnce(&mut T),
    {
        self.data.get_mut(&id).map(|mut entry| {
            f(entry.value_mut());
            entry.value().clone()
        })
    }

    pub fn remove(&self, id: i64) -> Option<T> {
        self.data.remove(&id).map(|(_, v)| v)
    }

    /// 按主键升序列出所有数据
    pub fn list(&self) -> Vec<T> {
        self.list_by(|_| true)
    }

    /// 按条件筛选，结果按主键升序
    pub fn list_by<F>(&self, predicate: F) -> Vec<T>
    where
        F: Fn(&T) -> bool,
    {
        let mut entries: Vec<(i64, T)> = self
            .data
            .iter()
            .filter(|entry| predicate(entry.value()))
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect();
        entries.sort_by_key(|(id, _)| *id);
        entries.into_iter().map(|(_, v)| v).collect()
    }

    /// 返回第一个满足条件的数据（按主键升序）
    pub fn find<F>(&self, predicate: F) -> Option<T>
    where
        F: Fn(&T) -> bool,
    {
        self.list_by(predicate).into_iter().next()
    }

    pub fn count(&self) -> usize {
        self.data.len()
    }

    pub fn contains(&self, id: i64) -> bool {
        self.data.contains_key(&id)
    }

    pub fn clear(&self) {
        self.data.clear();
    }
}

impl<T> Clone for MemoryStore<T> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
            sequence: Arc::clone(&self.sequence),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        name: String,
        value: i32,
    }

    fn item(name: &str, value: i32) -> Item {
        Item {
            name: name.to_string(),
            value,
        }
    }

    #[test]
    fn test_next_id_is_monotonic() {
        let store: MemoryStore<Item> = MemoryStore::new();
        assert_eq!(store.next_id(), 1);
        assert_eq!(store.next_id(), 2);

        // 外部指定主键后序列跟进
        store.insert(10, item("a", 1));
        assert_eq!(store.next_id(), 11);
    }

    #[test]
    fn test_crud() {
        let store: MemoryStore<Item> = MemoryStore::new();
        let id = store.next_id();
        store.insert(id, item("cake", 42));

        assert_eq!(store.get(id), Some(item("cake", 42)));

        let updated = store.update(id, |it| it.value = 100).unwrap();
        assert_eq!(updated.value, 100);
        assert_eq!(store.get(id).unwrap().value, 100);

        assert!(store.update(999, |it| it.value = 0).is_none());

        let removed = store.remove(id).unwrap();
        assert_eq!(removed.value, 100);
        assert!(store.get(id).is_none());
        assert!(!store.contains(id));
    }

    #[test]
    fn test_list_is_ordered_by_id() {
        let store: MemoryStore<Item> = MemoryStore::new();
        store.insert(3, item("c", 30));
        store.insert(1, item("a", 10));
        store.insert(2, item("b", 20));

        let names: Vec<String> = store.list().into_iter().map(|it| it.name).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(store.count(), 3);
    }

    #[test]
    fn test_list_by_and_find() {
        let store: MemoryStore<Item> = MemoryStore::new();
        store.insert(1, item("a", 10));
        store.insert(2, item("b", 20));
        store.insert(3, item("c", 30));

        let filtered = store.list_by(|it| it.value > 15);
        assert_eq!(filtered.len(), 2);

        assert_eq!(store.find(|it| it.value > 15).unwrap().name, "b");
        assert!(store.find(|it| it.value > 100).is_none());
    }

    #[test]
    fn test_clone_shares_data() {
        let store: MemoryStore<Item> = MemoryStore::new();
        let other = store.clone();
        let id = other.next_id();
        other.insert(id, item("shared", 1));

        assert!(store.contains(id));
        store.clear();
        assert_eq!(other.count(), 0);
    }
}
