use dashmap::DashMap;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// 默认缓存时间: 5 分钟
pub const DEFAULT_TABLE_TTL: Duration = Duration::from_secs(300);

struct CacheEntry<V> {
    value: V,
    stored_at: Instant,
}

/// 按表名缓存整表数据, 超过 TTL 后重新加载
///
/// 并发未命中时可能重复加载同一张表, 以最后写入的结果为准.
pub struct TtlCache<V> {
    ttl: Duration,
    entries: DashMap<String, CacheEntry<V>>,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: DashMap::new(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// 获取未过期的缓存值, 过期条目会被移除
    pub fn get(&self, key: &str) -> Option<V> {
        let expired = match self.entries.get(key) {
            Some(entry) if entry.stored_at.elapsed() < self.ttl => {
                return Some(entry.value.clone());
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            self.entries
                .remove_if(key, |_, entry| entry.stored_at.elapsed() >= self.ttl);
        }
        None
    }

    pub fn insert(&self, key: &str, value: V) {
        self.entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                stored_at: Instant::now(),
            },
        );
    }

    pub fn invalidate(&self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 命中则直接返回, 否则调用 `load` 加载并写入缓存. 加载失败不写缓存.
    pub async fn get_or_try_load<F, Fut, E>(&self, key: &str, load: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(key) {
            tracing::debug!("cache hit: {}", key);
            return Ok(value);
        }

        tracing::debug!("cache miss: {}", key);
        let value = load().await?;
        self.insert(key, value.clone());
        Ok(value)
    }
}
