//! 数据仓库
//!
//! 按名称加载 `<base>/<name>.json`，解析后放进有界 LRU 缓存。
//!
//! - `load` 永不失败：请求或解析出错时记录日志并返回该名称的占位数据（占位数据不缓存）。
//! - `try_load` 把错误交给调用方。
//! - `refresh` 跳过缓存重新请求，成功后才替换缓存中的旧值。
//! - 同一名称的并发请求共用一个进行中的请求。

mod cache;
mod fallback;

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use async_trait::async_trait;
use futures::FutureExt;
use futures::future::{LocalBoxFuture, Shared, join_all};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use cache::LruCache;

pub use fallback::fallback_for;

// =========================================================
// 抽象接口
// =========================================================

/// 取回 URL 对应的文本
#[async_trait(?Send)]
pub trait Fetcher {
    /// 非 2xx 响应必须返回 `Err`
    async fn fetch_text(&self, url: &str) -> AppResult<String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvictionReason {
    /// 超出容量，最久未使用的条目被淘汰
    Capacity,
    /// 被 `clear` / `invalidate` 显式移除
    Cleared,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub size: usize,
    pub capacity: usize,
    /// 最近使用的在前
    pub keys: Vec<String>,
}

type LoadResult = Result<Rc<Value>, Rc<AppError>>;
type InFlight = Shared<LocalBoxFuture<'static, LoadResult>>;
type EvictHook = Rc<dyn Fn(&str, EvictionReason)>;

// =========================================================
// 实现
// =========================================================

struct RepositoryInner<F> {
    fetcher: F,
    base_path: String,
    cache: RefCell<LruCache<Rc<Value>>>,
    /// 名称 -> (请求序号, 进行中的请求)
    in_flight: RefCell<HashMap<String, (u64, InFlight)>>,
    next_request: Cell<u64>,
    on_evict: RefCell<Vec<EvictHook>>,
}

impl<F> RepositoryInner<F> {
    fn url_for(&self, name: &str) -> String {
        format!("{}/{}.json", self.base_path.trim_end_matches('/'), name)
    }

    fn notify(&self, key: &str, reason: EvictionReason) {
        let hooks: Vec<EvictHook> = self.on_evict.borrow().clone();
        for hook in hooks {
            hook(key, reason);
        }
    }

    /// 进行中的请求完成后调用。请求已被 `invalidate` / `clear` 作废时返回 false。
    fn finish_request(&self, name: &str, request: u64) -> bool {
        let mut in_flight = self.in_flight.borrow_mut();
        match in_flight.get(name) {
            Some((id, _)) if *id == request => {
                in_flight.remove(name);
                true
            }
            _ => false,
        }
    }
}

fn decode<T: DeserializeOwned>(name: &str, value: &Value) -> AppResult<T> {
    T::deserialize(value).map_err(|e| AppError::from(e).in_op_with("repository.decode", name))
}

pub struct JsonRepository<F: Fetcher + 'static> {
    inner: Rc<RepositoryInner<F>>,
}

impl<F: Fetcher + 'static> Clone for JsonRepository<F> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<F: Fetcher + 'static> JsonRepository<F> {
    pub fn new(fetcher: F, config: &AppConfig) -> Self {
        Self {
            inner: Rc::new(RepositoryInner {
                fetcher,
                base_path: config.data_base_path.clone(),
                cache: RefCell::new(LruCache::new(config.cache_capacity)),
                in_flight: RefCell::new(HashMap::new()),
                next_request: Cell::new(0),
                on_evict: RefCell::new(Vec::new()),
            }),
        }
    }

    pub fn url_for(&self, name: &str) -> String {
        self.inner.url_for(name)
    }

    /// 加载数据，失败时返回占位数据
    pub async fn load(&self, name: &str) -> Rc<Value> {
        match self.try_load(name).await {
            Ok(value) => value,
            Err(e) => {
                log_error!("[Repository] Error al cargar JSON {}: {}", name, e);
                Rc::new(fallback_for(name))
            }
        }
    }

    /// 加载数据，错误原样返回
    pub async fn try_load(&self, name: &str) -> AppResult<Rc<Value>> {
        let cached = self.inner.cache.borrow_mut().get(name);
        if let Some(value) = cached {
            return Ok(value);
        }

        let pending = self.in_flight_for(name);
        pending.await.map_err(|e| e.duplicate())
    }

    /// 加载并反序列化为具体类型。请求失败时按占位数据反序列化，只有解码错误会返回 `Err`。
    pub async fn load_as<T: DeserializeOwned>(&self, name: &str) -> AppResult<T> {
        let value = self.load(name).await;
        decode(name, &value)
    }

    /// 重新请求。失败时返回错误，缓存中的旧值保持不变。
    pub async fn refresh(&self, name: &str) -> AppResult<Rc<Value>> {
        self.in_flight_for(name)
            .await
            .map_err(|e| e.duplicate().in_op_with("repository.refresh", name))
    }

    pub async fn refresh_as<T: DeserializeOwned>(&self, name: &str) -> AppResult<T> {
        let value = self.refresh(name).await?;
        decode(name, &value)
    }

    /// 进行中的同名请求直接复用，不检查缓存
    fn in_flight_for(&self, name: &str) -> InFlight {
        if let Some((_, pending)) = self.inner.in_flight.borrow().get(name) {
            return pending.clone();
        }

        let request = self.inner.next_request.get() + 1;
        self.inner.next_request.set(request);

        let pending = Self::fetch_and_store(self.inner.clone(), name.to_string(), request)
            .boxed_local()
            .shared();
        self.inner
            .in_flight
            .borrow_mut()
            .insert(name.to_string(), (request, pending.clone()));
        pending
    }

    async fn fetch_and_store(inner: Rc<RepositoryInner<F>>, name: String, request: u64) -> LoadResult {
        let url = inner.url_for(&name);
        let result = async {
            let text = inner
                .fetcher
                .fetch_text(&url)
                .await
                .map_err(|e| e.in_op_with("repository.fetch", name.as_str()))?;
            let value: Value = serde_json::from_str(&text)
                .map_err(|e| AppError::from(e).in_op_with("repository.parse", name.as_str()))?;
            Ok::<_, AppError>(Rc::new(value))
        }
        .await;

        let current = inner.finish_request(&name, request);
        match result {
            Ok(value) => {
                if current {
                    let evicted = inner.cache.borrow_mut().insert(&name, value.clone());
                    if let Some((key, _)) = evicted {
                        log_info!("[Repository] Evicted {} from cache", key);
                        inner.notify(&key, EvictionReason::Capacity);
                    }
                }
                Ok(value)
            }
            Err(e) => Err(Rc::new(e)),
        }
    }

    /// 并发加载多个名称（失败的名称同样返回占位数据）
    pub async fn preload(&self, names: &[&str]) {
        join_all(names.iter().map(|name| self.load(name))).await;
    }

    /// 清除单个名称或全部缓存
    pub fn clear(&self, name: Option<&str>) {
        match name {
            Some(name) => {
                self.invalidate(name);
            }
            None => {
                self.inner.in_flight.borrow_mut().clear();
                let keys = self.inner.cache.borrow_mut().clear();
                for key in keys {
                    self.inner.notify(&key, EvictionReason::Cleared);
                }
            }
        }
    }

    /// 移除单个名称。进行中的同名请求完成后不会写入缓存。
    pub fn invalidate(&self, name: &str) -> bool {
        self.inner.in_flight.borrow_mut().remove(name);
        let removed = self.inner.cache.borrow_mut().remove(name).is_some();
        if removed {
            self.inner.notify(name, EvictionReason::Cleared);
        }
        removed
    }

    pub fn is_cached(&self, name: &str) -> bool {
        self.inner.cache.borrow().contains(name)
    }

    /// 不影响淘汰顺序的缓存读取
    pub fn peek(&self, name: &str) -> Option<Rc<Value>> {
        self.inner.cache.borrow().peek(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.cache.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        let cache = self.inner.cache.borrow();
        CacheStats {
            size: cache.len(),
            capacity: cache.capacity(),
            keys: cache.keys_recent_first(),
        }
    }

    /// 注册淘汰回调，容量淘汰与显式清除都会触发
    pub fn on_evict<H>(&self, hook: H)
    where
        H: Fn(&str, EvictionReason) + 'static,
    {
        self.inner.on_evict.borrow_mut().push(Rc::new(hook));
    }
}
