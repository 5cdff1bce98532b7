//! 有界 LRU 缓存
//!
//! `entries` 保存值与最近一次访问的序号，`order` 按序号排列键，
//! 最小序号即最久未使用的条目。

use std::collections::{BTreeMap, HashMap};
use std::num::NonZeroUsize;

struct Entry<V> {
    value: V,
    tick: u64,
}

pub(crate) struct LruCache<V> {
    capacity: NonZeroUsize,
    entries: HashMap<String, Entry<V>>,
    order: BTreeMap<u64, String>,
    next_tick: u64,
}

impl<V: Clone> LruCache<V> {
    pub(crate) fn new(capacity: NonZeroUsize) -> Self {
        Self {
            capacity,
            entries: HashMap::new(),
            order: BTreeMap::new(),
            next_tick: 0,
        }
    }

    fn bump(&mut self) -> u64 {
        self.next_tick += 1;
        self.next_tick
    }

    /// 读取并标记为最近使用
    pub(crate) fn get(&mut self, key: &str) -> Option<V> {
        let tick = self.bump();
        let entry = self.entries.get_mut(key)?;
        self.order.remove(&entry.tick);
        entry.tick = tick;
        self.order.insert(tick, key.to_string());
        Some(entry.value.clone())
    }

    /// 读取但不影响淘汰顺序
    pub(crate) fn peek(&self, key: &str) -> Option<&V> {
        self.entries.get(key).map(|entry| &entry.value)
    }

    pub(crate) fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// 插入或覆盖。超出容量时返回被淘汰的条目。
    pub(crate) fn insert(&mut self, key: &str, value: V) -> Option<(String, V)> {
        let tick = self.bump();
        if let Some(entry) = self.entries.get_mut(key) {
            self.order.remove(&entry.tick);
            entry.tick = tick;
            entry.value = value;
            self.order.insert(tick, key.to_string());
            return None;
        }

        let evicted = if self.entries.len() >= self.capacity.get() {
            self.pop_oldest()
        } else {
            None
        };

        self.entries.insert(key.to_string(), Entry { value, tick });
        self.order.insert(tick, key.to_string());
        evicted
    }

    fn pop_oldest(&mut self) -> Option<(String, V)> {
        let (_, key) = self.order.pop_first()?;
        let entry = self.entries.remove(&key)?;
        Some((key, entry.value))
    }

    pub(crate) fn remove(&mut self, key: &str) -> Option<V> {
        let entry = self.entries.remove(key)?;
        self.order.remove(&entry.tick);
        Some(entry.value)
    }

    /// 清空并返回原有的键（最久未使用的在前）
    pub(crate) fn clear(&mut self) -> Vec<String> {
        let keys = std::mem::take(&mut self.order).into_values().collect();
        self.entries.clear();
        keys
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn capacity(&self) -> usize {
        self.capacity.get()
    }

    /// 最近使用的在前
    pub(crate) fn keys_recent_first(&self) -> Vec<String> {
        self.order.values().rev().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache(capacity: usize) -> LruCache<u32> {
        LruCache::new(NonZeroUsize::new(capacity).unwrap())
    }

    #[test]
    fn evicts_least_recently_used() {
        let mut lru = cache(2);
        assert!(lru.insert("home", 1).is_none());
        assert!(lru.insert("riego", 2).is_none());

        // home 变为最近使用，riego 成为淘汰对象
        assert_eq!(lru.get("home"), Some(1));
        let evicted = lru.insert("clima", 3);

        assert_eq!(evicted, Some(("riego".to_string(), 2)));
        assert!(lru.contains("home"));
        assert!(lru.contains("clima"));
        assert_eq!(lru.len(), 2);
    }

    #[test]
    fn overwrite_does_not_evict() {
        let mut lru = cache(1);
        lru.insert("home", 1);
        assert!(lru.insert("home", 2).is_none());
        assert_eq!(lru.peek("home"), Some(&2));
        assert_eq!(lru.len(), 1);
    }

    #[test]
    fn peek_keeps_order() {
        let mut lru = cache(2);
        lru.insert("home", 1);
        lru.insert("riego", 2);
        lru.peek("home");

        let evicted = lru.insert("clima", 3);
        assert_eq!(evicted.map(|(k, _)| k), Some("home".to_string()));
    }

    #[test]
    fn keys_and_clear() {
        let mut lru = cache(4);
        lru.insert("a", 1);
        lru.insert("b", 2);
        lru.insert("c", 3);
        lru.get("a");

        assert_eq!(lru.keys_recent_first(), vec!["a", "c", "b"]);
        assert_eq!(lru.remove("c"), Some(3));
        assert_eq!(lru.clear(), vec!["b", "a"]);
        assert_eq!(lru.len(), 0);
        assert_eq!(lru.capacity(), 4);
    }
}
