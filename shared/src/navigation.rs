//! 导航清单
//!
//! 侧边栏链接与路由表共用的静态描述，一个功能模块一项。

/// 功能模块的标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureKind {
    Home,
    Irrigation,
    Calendar,
    Alerts,
    Growth,
    Weather,
    Crops,
    Profile,
}

/// 导航项
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavEntry {
    pub kind: FeatureKind,
    pub path: &'static str,
    pub title: &'static str,
    pub icon: &'static str,
    /// 该模块读取的数据文件名（`./data/<name>.json`）
    pub fixture: Option<&'static str>,
}

impl NavEntry {
    /// 侧边栏链接的 href，与 `location.hash` 做精确比较
    pub fn href(&self) -> String {
        format!("#{}", self.path)
    }
}

pub const NAV_ROUTES: [NavEntry; 8] = [
    NavEntry {
        kind: FeatureKind::Home,
        path: "/",
        title: "Home",
        icon: "bi-house-door",
        fixture: Some("home"),
    },
    NavEntry {
        kind: FeatureKind::Irrigation,
        path: "/riego",
        title: "Riego",
        icon: "bi-droplet",
        fixture: Some("riego"),
    },
    NavEntry {
        kind: FeatureKind::Calendar,
        path: "/calendario",
        title: "Calendario",
        icon: "bi-calendar3",
        fixture: Some("calendario"),
    },
    NavEntry {
        kind: FeatureKind::Alerts,
        path: "/alertas",
        title: "Alertas",
        icon: "bi-exclamation-triangle",
        fixture: Some("alertas"),
    },
    NavEntry {
        kind: FeatureKind::Growth,
        path: "/crecimiento",
        title: "Crecimiento",
        icon: "bi-graph-up-arrow",
        fixture: Some("crecimiento"),
    },
    NavEntry {
        kind: FeatureKind::Weather,
        path: "/clima",
        title: "Clima",
        icon: "bi-cloud-sun",
        fixture: Some("clima"),
    },
    NavEntry {
        kind: FeatureKind::Crops,
        path: "/mis-cultivos",
        title: "Mis Cultivos",
        icon: "bi-flower1",
        fixture: Some("mis-cultivos"),
    },
    NavEntry {
        kind: FeatureKind::Profile,
        path: "/perfil",
        title: "Perfil",
        icon: "bi-person-circle",
        fixture: None,
    },
];

pub fn nav_entry(kind: FeatureKind) -> &'static NavEntry {
    NAV_ROUTES
        .iter()
        .find(|entry| entry.kind == kind)
        .unwrap_or(&NAV_ROUTES[0])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn paths_are_unique_and_rooted() {
        let mut seen = HashSet::new();
        for entry in NAV_ROUTES.iter() {
            assert!(entry.path.starts_with('/'), "{}", entry.path);
            assert!(seen.insert(entry.path), "duplicate {}", entry.path);
        }
    }

    #[test]
    fn href_is_hash_of_path() {
        assert_eq!(nav_entry(FeatureKind::Home).href(), "#/");
        assert_eq!(nav_entry(FeatureKind::Crops).href(), "#/mis-cultivos");
    }
}
