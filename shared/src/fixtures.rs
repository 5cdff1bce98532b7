//! 数据文件模型
//!
//! 每个功能模块读取 `./data/<name>.json`。所有结构体都带 `#[serde(default)]`，
//! 因此数据加载失败时返回的兜底对象（空集合、零值统计）同样可以反序列化。

use serde::{Deserialize, Serialize};

// =========================================================
// home
// =========================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HomeData {
    pub stats: Vec<StatCard>,
    pub recent_activities: Vec<Activity>,
    pub weather: Option<WeatherSnapshot>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StatCard {
    pub id: u32,
    pub title: String,
    pub value: f64,
    pub icon: String,
    pub color: String,
    pub change: Option<String>,
    pub change_type: Option<String>,
}

impl StatCard {
    pub fn is_positive(&self) -> bool {
        self.change_type.as_deref() == Some("positive")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Activity {
    pub icon: String,
    pub color: String,
    pub message: String,
    pub time: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WeatherSnapshot {
    pub current: CurrentWeather,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CurrentWeather {
    pub temperature: f64,
    pub humidity: f64,
    pub description: String,
    pub icon: Option<String>,
    pub wind_speed: f64,
    pub wind_direction: f64,
    pub weather_code: Option<u16>,
}

// =========================================================
// riego
// =========================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IrrigationData {
    pub sectors: Vec<IrrigationSector>,
    pub schedule: Vec<IrrigationSlot>,
    pub statistics: IrrigationStats,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IrrigationSector {
    pub id: u32,
    pub name: String,
    pub crop: String,
    pub area: f64,
    pub status: String,
    pub moisture: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IrrigationSlot {
    pub sector: String,
    pub start: String,
    pub duration_minutes: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IrrigationStats {
    pub total_water_used: f64,
    pub average_efficiency: f64,
    pub total_area: f64,
}

// =========================================================
// calendario
// =========================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CalendarData {
    pub events: Vec<CalendarEvent>,
    pub tasks: Vec<FarmTask>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CalendarEvent {
    pub title: String,
    pub date: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FarmTask {
    pub title: String,
    pub due: String,
    pub done: bool,
}

// =========================================================
// alertas
// =========================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AlertsData {
    pub alerts: Vec<FarmAlert>,
    pub notifications: Vec<Notification>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FarmAlert {
    pub id: u32,
    pub title: String,
    pub message: String,
    /// `info` | `warning` | `danger`
    pub level: String,
    pub time: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Notification {
    pub message: String,
    pub time: String,
    pub read: bool,
}

// =========================================================
// crecimiento
// =========================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GrowthData {
    pub metrics: Vec<GrowthMetric>,
    pub charts: Vec<GrowthSeries>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GrowthMetric {
    pub crop: String,
    pub stage: String,
    pub height_cm: f64,
    pub date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GrowthSeries {
    pub label: String,
    pub points: Vec<f64>,
}

impl GrowthSeries {
    /// 最后一个点相对第一个点的增量
    pub fn delta(&self) -> f64 {
        match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => last - first,
            _ => 0.0,
        }
    }
}

// =========================================================
// clima
// =========================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WeatherData {
    pub current: CurrentWeather,
    pub forecast: Vec<ForecastDay>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ForecastDay {
    pub date: String,
    pub max: f64,
    pub min: f64,
    pub weather_code: u16,
    pub precipitation: f64,
}

// =========================================================
// mis-cultivos
// =========================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CropsData {
    pub crops: Vec<Crop>,
    pub statistics: CropStats,
    pub recent_activities: Vec<Activity>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Crop {
    pub id: u32,
    pub name: String,
    pub variety: String,
    pub area: f64,
    pub stage: String,
    pub status: String,
    pub planted_at: String,
    pub expected_harvest: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CropStats {
    pub total_crops: u32,
    pub total_area: f64,
    pub average_yield: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn home_fallback_shape_deserializes() {
        let fallback = serde_json::json!({
            "stats": [
                { "id": 1, "title": "Cultivos Activos", "value": 0, "icon": "bi-seed", "color": "success" }
            ],
            "recentActivities": [],
            "weather": { "current": { "temperature": 0, "humidity": 0, "description": "N/A" } }
        });
        let home: HomeData = serde_json::from_value(fallback).unwrap();
        assert_eq!(home.stats.len(), 1);
        assert_eq!(home.stats[0].value, 0.0);
        assert!(!home.stats[0].is_positive());
        assert_eq!(home.weather.unwrap().current.description, "N/A");
    }

    #[test]
    fn missing_sections_default_to_empty() {
        let crops: CropsData = serde_json::from_str("{}").unwrap();
        assert!(crops.crops.is_empty());
        assert_eq!(crops.statistics.total_crops, 0);
    }

    #[test]
    fn series_delta() {
        let series = GrowthSeries {
            label: "Maíz".into(),
            points: vec![10.0, 14.5, 21.0],
        };
        assert_eq!(series.delta(), 11.0);
        assert_eq!(GrowthSeries::default().delta(), 0.0);
    }
}
