//! 数据文件无法加载时返回的占位数据
//!
//! 结构与对应的数据文件一致，数值为 0、列表为空，页面据此渲染空状态。

use serde_json::{Value, json};

/// 未知名称的占位对象
pub fn unavailable() -> Value {
    json!({ "error": "Datos no disponibles" })
}

pub fn fallback_for(name: &str) -> Value {
    match name {
        "home" => json!({
            "stats": [
                { "id": 1, "title": "Cultivos Activos", "value": 0, "icon": "bi-seed", "color": "success" },
                { "id": 2, "title": "Hectáreas", "value": 0, "icon": "bi-geo-alt", "color": "primary" }
            ],
            "recentActivities": [],
            "weather": { "current": { "temperature": 0, "humidity": 0, "description": "N/A" } }
        }),
        "riego" => json!({
            "sectors": [],
            "schedule": [],
            "statistics": { "totalWaterUsed": 0, "averageEfficiency": 0, "totalArea": 0 }
        }),
        "calendario" => json!({ "events": [], "tasks": [] }),
        "alertas" => json!({ "alerts": [], "notifications": [] }),
        "crecimiento" => json!({ "metrics": [], "charts": [] }),
        "clima" => json!({
            "current": { "temperature": 0, "humidity": 0, "description": "N/A" },
            "forecast": []
        }),
        "mis-cultivos" => json!({
            "crops": [],
            "statistics": { "totalCrops": 0, "totalArea": 0, "averageYield": 0 },
            "recentActivities": []
        }),
        _ => unavailable(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sigpa_shared::fixtures::{CropsData, HomeData, IrrigationData, WeatherData};

    #[test]
    fn known_fallbacks_deserialize_into_fixtures() {
        let home: HomeData = serde_json::from_value(fallback_for("home")).unwrap();
        assert_eq!(home.stats.len(), 2);
        assert_eq!(home.stats[0].title, "Cultivos Activos");
        assert_eq!(home.weather.unwrap().current.description, "N/A");

        let riego: IrrigationData = serde_json::from_value(fallback_for("riego")).unwrap();
        assert!(riego.sectors.is_empty());

        let clima: WeatherData = serde_json::from_value(fallback_for("clima")).unwrap();
        assert!(clima.forecast.is_empty());

        let crops: CropsData = serde_json::from_value(fallback_for("mis-cultivos")).unwrap();
        assert_eq!(crops.statistics.total_crops, 0);
    }

    #[test]
    fn unknown_name_gets_error_object() {
        assert_eq!(fallback_for("inexistente"), json!({ "error": "Datos no disponibles" }));
    }
}
