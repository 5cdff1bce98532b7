//! 主题服务
//!
//! 持久化用户选择的主题（`light` / `dark` / `system`），把 `system` 解析为具体的明暗主题，
//! 并把每次应用的结果通知订阅者。前端订阅者负责写 `data-theme` 属性并派发 `themeChanged` 事件。

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use sigpa_shared::Theme;

use crate::config::AppConfig;

/// 键值存储（浏览器中是 LocalStorage）
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;

    /// 写入成功返回 true
    fn set(&self, key: &str, value: &str) -> bool;

    fn delete(&self, key: &str) -> bool;
}

/// 一次主题应用的结果
///
/// `theme` 总是 `Light` 或 `Dark`；`original_theme` 是用户的选择，可能是 `System`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeChanged {
    pub theme: Theme,
    pub original_theme: Theme,
}

type ThemeListener = Rc<dyn Fn(&ThemeChanged)>;

struct ThemeInner<S> {
    store: S,
    key: String,
    prefers_dark: Cell<bool>,
    listeners: RefCell<Vec<ThemeListener>>,
    applied: Cell<Option<ThemeChanged>>,
}

pub struct ThemeService<S: KeyValueStore> {
    inner: Rc<ThemeInner<S>>,
}

impl<S: KeyValueStore> Clone for ThemeService<S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<S: KeyValueStore> ThemeService<S> {
    pub fn new(store: S, config: &AppConfig) -> Self {
        Self {
            inner: Rc::new(ThemeInner {
                store,
                key: config.theme_storage_key.clone(),
                prefers_dark: Cell::new(false),
                listeners: RefCell::new(Vec::new()),
                applied: Cell::new(None),
            }),
        }
    }

    /// 已保存的主题；缺失或无法识别时为 `System`
    pub fn current(&self) -> Theme {
        self.inner
            .store
            .get(&self.inner.key)
            .and_then(|value| value.parse().ok())
            .unwrap_or_default()
    }

    /// 最近一次应用的结果
    pub fn applied(&self) -> Option<ThemeChanged> {
        self.inner.applied.get()
    }

    pub fn prefers_dark(&self) -> bool {
        self.inner.prefers_dark.get()
    }

    pub fn resolve(&self, theme: Theme) -> Theme {
        match theme {
            Theme::System if self.inner.prefers_dark.get() => Theme::Dark,
            Theme::System => Theme::Light,
            concrete => concrete,
        }
    }

    /// 记录系统偏好并应用已保存的主题
    pub fn initialize(&self, prefers_dark: bool) -> ThemeChanged {
        self.inner.prefers_dark.set(prefers_dark);
        self.apply(self.current())
    }

    pub fn set(&self, theme: Theme) -> ThemeChanged {
        if !self.inner.store.set(&self.inner.key, theme.as_str()) {
            log_warn!("[Theme] Could not persist theme {}", theme);
        }
        self.apply(theme)
    }

    /// 按名称设置，无法识别的名称按 `system` 处理
    pub fn set_from_str(&self, name: &str) -> ThemeChanged {
        let theme = name.parse().unwrap_or_else(|_| {
            log_warn!("[Theme] Tema inválido: {}. Usando 'system' por defecto.", name);
            Theme::System
        });
        self.set(theme)
    }

    /// 在明暗之间切换；`system` 切换为 `light`
    pub fn toggle(&self) -> Theme {
        let next = match self.current() {
            Theme::Light => Theme::Dark,
            _ => Theme::Light,
        };
        self.set(next);
        next
    }

    /// 系统配色变化时调用，只有保存的主题为 `system` 时才重新应用
    pub fn set_system_preference(&self, prefers_dark: bool) -> Option<ThemeChanged> {
        self.inner.prefers_dark.set(prefers_dark);
        match self.current() {
            Theme::System => Some(self.apply(Theme::System)),
            _ => None,
        }
    }

    /// 删除保存的选择，回到 `system`
    pub fn reset(&self) -> ThemeChanged {
        self.inner.store.delete(&self.inner.key);
        self.apply(Theme::System)
    }

    pub fn subscribe<L>(&self, listener: L)
    where
        L: Fn(&ThemeChanged) + 'static,
    {
        self.inner.listeners.borrow_mut().push(Rc::new(listener));
    }

    fn apply(&self, theme: Theme) -> ThemeChanged {
        let change = ThemeChanged {
            theme: self.resolve(theme),
            original_theme: theme,
        };
        self.inner.applied.set(Some(change));

        let listeners: Vec<ThemeListener> = self.inner.listeners.borrow().clone();
        for listener in listeners {
            listener(&change);
        }
        change
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[derive(Clone, Default)]
    struct MemoryStore {
        values: Rc<RefCell<HashMap<String, String>>>,
        read_only: Rc<Cell<bool>>,
    }

    impl KeyValueStore for MemoryStore {
        fn get(&self, key: &str) -> Option<String> {
            self.values.borrow().get(key).cloned()
        }

        fn set(&self, key: &str, value: &str) -> bool {
            if self.read_only.get() {
                return false;
            }
            self.values
                .borrow_mut()
                .insert(key.to_string(), value.to_string());
            true
        }

        fn delete(&self, key: &str) -> bool {
            self.values.borrow_mut().remove(key).is_some()
        }
    }

    fn setup() -> (MemoryStore, ThemeService<MemoryStore>, Rc<RefCell<Vec<ThemeChanged>>>) {
        let store = MemoryStore::default();
        let service = ThemeService::new(store.clone(), &AppConfig::default());
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        service.subscribe(move |change| sink.borrow_mut().push(*change));
        (store, service, seen)
    }

    #[test]
    fn missing_or_invalid_value_is_system() {
        let (store, service, _) = setup();
        assert_eq!(service.current(), Theme::System);

        store.set("sigpa-theme", "sepia");
        assert_eq!(service.current(), Theme::System);
    }

    #[test]
    fn dark_persists_and_notifies() {
        let (store, service, seen) = setup();
        let change = service.set(Theme::Dark);

        assert_eq!(store.get("sigpa-theme").as_deref(), Some("dark"));
        assert_eq!(service.current(), Theme::Dark);
        assert_eq!(change.theme, Theme::Dark);
        assert_eq!(seen.borrow().as_slice(), [change]);
    }

    #[test]
    fn system_resolves_from_preference() {
        let (_, service, seen) = setup();
        let light = service.initialize(false);
        assert_eq!(light.theme, Theme::Light);
        assert_eq!(light.original_theme, Theme::System);

        let dark = service.set_system_preference(true).unwrap();
        assert_eq!(dark.theme, Theme::Dark);
        assert_eq!(dark.original_theme, Theme::System);
        assert_eq!(seen.borrow().len(), 2);
    }

    #[test]
    fn preference_change_ignored_for_explicit_theme() {
        let (_, service, seen) = setup();
        service.set(Theme::Light);

        assert!(service.set_system_preference(true).is_none());
        assert_eq!(service.applied().unwrap().theme, Theme::Light);
        assert_eq!(seen.borrow().len(), 1);
        assert!(service.prefers_dark());
    }

    #[test]
    fn invalid_name_falls_back_to_system() {
        let (store, service, _) = setup();
        let change = service.set_from_str("neón");

        assert_eq!(change.original_theme, Theme::System);
        assert_eq!(store.get("sigpa-theme").as_deref(), Some("system"));
    }

    #[test]
    fn toggle_cycles_between_light_and_dark() {
        let (_, service, _) = setup();
        assert_eq!(service.toggle(), Theme::Light);
        assert_eq!(service.toggle(), Theme::Dark);
        assert_eq!(service.toggle(), Theme::Light);
    }

    #[test]
    fn failed_persist_still_applies() {
        let (store, service, seen) = setup();
        store.read_only.set(true);

        let change = service.set(Theme::Dark);
        assert_eq!(change.theme, Theme::Dark);
        assert_eq!(service.current(), Theme::System);
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn reset_forgets_choice() {
        let (store, service, _) = setup();
        service.set(Theme::Dark);
        let change = service.reset();

        assert!(store.get("sigpa-theme").is_none());
        assert_eq!(change.original_theme, Theme::System);
    }

    #[test]
    fn event_detail_uses_camel_case() {
        let change = ThemeChanged {
            theme: Theme::Dark,
            original_theme: Theme::System,
        };
        let json = serde_json::to_value(change).unwrap();
        assert_eq!(json, serde_json::json!({ "theme": "dark", "originalTheme": "system" }));
    }
}
