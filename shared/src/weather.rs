//! 天气辅助函数
//!
//! WMO 天气代码到图标 / 颜色的映射、风向换算，以及根据当前天气给出的农事提醒。

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::fixtures::{CurrentWeather, ForecastDay, WeatherData};

const COMPASS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSO", "SO", "OSO", "O", "ONO", "NO",
    "NNO",
];

pub fn weather_icon(code: u16) -> &'static str {
    match code {
        0 => "bi-sun",
        1..=3 => "bi-cloud-sun",
        45 | 48 => "bi-cloud-fog",
        51 | 53 | 55 | 61 | 63 => "bi-cloud-drizzle",
        65 | 67 | 80 | 81 | 82 => "bi-cloud-rain",
        71 | 73 | 75 | 85 | 86 => "bi-cloud-snow",
        77 => "bi-cloud-hail",
        95 | 96 | 99 => "bi-cloud-lightning",
        _ => "bi-question-circle",
    }
}

pub fn weather_color(code: u16) -> &'static str {
    match code {
        0 => "text-warning",
        1..=3 => "text-info",
        45 | 48 => "text-secondary",
        51 | 53 | 55 | 61 | 63 | 65 | 67 | 80 | 81 | 82 => "text-primary",
        71 | 73 | 75 | 85 | 86 => "text-light",
        77 => "text-secondary",
        95 | 96 | 99 => "text-danger",
        _ => "text-muted",
    }
}

/// 角度转 16 方位（西班牙语缩写）
pub fn wind_direction(degrees: f64) -> &'static str {
    let normalized = degrees.rem_euclid(360.0);
    let index = (normalized / 22.5).round() as usize % COMPASS.len();
    COMPASS[index]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvisoryLevel {
    Info,
    Warning,
    Danger,
}

impl AdvisoryLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdvisoryLevel::Info => "info",
            AdvisoryLevel::Warning => "warning",
            AdvisoryLevel::Danger => "danger",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeatherAdvisory {
    pub level: AdvisoryLevel,
    pub icon: &'static str,
    pub message: &'static str,
}

pub fn advisories(current: &CurrentWeather) -> Vec<WeatherAdvisory> {
    let mut out = Vec::new();

    if current.temperature > 35.0 {
        out.push(WeatherAdvisory {
            level: AdvisoryLevel::Warning,
            icon: "bi-thermometer-high",
            message: "Temperatura alta. Mantén hidratadas las plantas y considera riego adicional.",
        });
    } else if current.temperature < 5.0 {
        out.push(WeatherAdvisory {
            level: AdvisoryLevel::Info,
            icon: "bi-thermometer-low",
            message: "Temperatura baja. Protege cultivos sensibles al frío.",
        });
    }

    if current.humidity > 85.0 {
        out.push(WeatherAdvisory {
            level: AdvisoryLevel::Warning,
            icon: "bi-droplet-fill",
            message: "Humedad alta. Vigila posibles enfermedades fúngicas en cultivos.",
        });
    } else if current.humidity < 30.0 {
        out.push(WeatherAdvisory {
            level: AdvisoryLevel::Info,
            icon: "bi-droplet-half",
            message: "Baja humedad. Considera aumentar el riego.",
        });
    }

    if current.wind_speed > 40.0 {
        out.push(WeatherAdvisory {
            level: AdvisoryLevel::Danger,
            icon: "bi-wind",
            message: "Vientos fuertes. Protege estructuras y cultivos vulnerables.",
        });
    }

    out
}

// =========================================================
// 导出
// =========================================================

/// 下载文件的内容：导出时间、当前天气与预报
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherExport<'a> {
    pub fecha_exportacion: DateTime<Utc>,
    pub clima_actual: &'a CurrentWeather,
    pub pronostico: &'a [ForecastDay],
}

impl<'a> WeatherExport<'a> {
    pub fn new(data: &'a WeatherData, at: DateTime<Utc>) -> Self {
        Self {
            fecha_exportacion: at,
            clima_actual: &data.current,
            pronostico: &data.forecast,
        }
    }

    /// `clima_chiquinquira_YYYY-MM-DD.json`
    pub fn file_name(&self) -> String {
        format!("clima_chiquinquira_{}.json", self.fecha_exportacion.format("%Y-%m-%d"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn icon_and_color_tables() {
        assert_eq!(weather_icon(0), "bi-sun");
        assert_eq!(weather_icon(2), "bi-cloud-sun");
        assert_eq!(weather_icon(81), "bi-cloud-rain");
        assert_eq!(weather_icon(1000), "bi-question-circle");
        assert_eq!(weather_color(99), "text-danger");
        assert_eq!(weather_color(63), "text-primary");
    }

    #[test]
    fn compass_points() {
        assert_eq!(wind_direction(0.0), "N");
        assert_eq!(wind_direction(90.0), "E");
        assert_eq!(wind_direction(225.0), "SO");
        assert_eq!(wind_direction(350.0), "N");
        assert_eq!(wind_direction(-90.0), "O");
    }

    #[test]
    fn advisories_cover_extremes() {
        let calm = CurrentWeather {
            temperature: 22.0,
            humidity: 60.0,
            ..Default::default()
        };
        assert!(advisories(&calm).is_empty());

        let storm = CurrentWeather {
            temperature: 38.0,
            humidity: 90.0,
            wind_speed: 55.0,
            ..Default::default()
        };
        let levels: Vec<_> = advisories(&storm).iter().map(|a| a.level).collect();
        assert_eq!(
            levels,
            vec![
                AdvisoryLevel::Warning,
                AdvisoryLevel::Warning,
                AdvisoryLevel::Danger
            ]
        );
    }

    #[test]
    fn export_wraps_current_and_forecast() {
        let data = WeatherData {
            current: CurrentWeather {
                temperature: 18.5,
                description: "Nublado".into(),
                ..Default::default()
            },
            forecast: vec![ForecastDay {
                date: "2026-10-20".into(),
                ..Default::default()
            }],
        };
        let at = DateTime::parse_from_rfc3339("2026-10-19T14:30:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let export = WeatherExport::new(&data, at);

        assert_eq!(export.file_name(), "clima_chiquinquira_2026-10-19.json");
        let json = serde_json::to_value(&export).unwrap();
        assert_eq!(json["fechaExportacion"], "2026-10-19T14:30:00Z");
        assert_eq!(json["climaActual"]["temperature"], 18.5);
        assert_eq!(json["pronostico"][0]["date"], "2026-10-20");
    }
}
