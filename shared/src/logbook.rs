//! 作物生长记录簿
//!
//! 表单提交的原始字符串先经过 `EntryDraft::validate`，通过后追加到 `GrowthLog`。
//! 记录只保存在内存中，随视图一起释放。

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::format::format_number;

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthEntry {
    pub crop: String,
    pub height_cm: f64,
    pub date: NaiveDate,
    pub notes: String,
}

impl GrowthEntry {
    pub fn height_label(&self) -> String {
        format!("{} cm", format_number(self.height_cm, 1))
    }

    pub fn date_label(&self) -> String {
        self.date.format(DATE_FORMAT).to_string()
    }

    /// 提示消息中的摘要，如 `Maíz - 12,5 cm`
    pub fn summary(&self) -> String {
        format!("{} - {}", self.crop, self.height_label())
    }

    pub fn notes_or_na(&self) -> &str {
        if self.notes.trim().is_empty() {
            "N/A"
        } else {
            self.notes.trim()
        }
    }
}

/// 表单原始输入
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryDraft {
    pub crop: String,
    pub height: String,
    pub date: String,
    pub notes: String,
}

impl EntryDraft {
    /// 返回第一条不满足的规则
    pub fn validate(&self) -> Result<GrowthEntry, &'static str> {
        let crop = self.crop.trim();
        if crop.is_empty() {
            return Err("El cultivo es obligatorio");
        }

        let height = self
            .height
            .trim()
            .replace(',', ".")
            .parse::<f64>()
            .ok()
            .filter(|h| h.is_finite() && *h >= 0.0)
            .ok_or("La altura debe ser un número mayor o igual a 0")?;

        let date = NaiveDate::parse_from_str(self.date.trim(), DATE_FORMAT)
            .map_err(|_| "La fecha no es válida")?;

        Ok(GrowthEntry {
            crop: crop.to_string(),
            height_cm: height,
            date,
            notes: self.notes.trim().to_string(),
        })
    }
}

/// 图表中的一根柱子
#[derive(Debug, Clone, PartialEq)]
pub struct ChartBar {
    pub label: String,
    pub height_cm: f64,
    /// 相对最高记录的比例，0.0 ..= 1.0
    pub ratio: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GrowthLog {
    entries: Vec<GrowthEntry>,
}

impl GrowthLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加记录并返回其下标
    pub fn push(&mut self, entry: GrowthEntry) -> usize {
        self.entries.push(entry);
        self.entries.len() - 1
    }

    pub fn get(&self, index: usize) -> Option<&GrowthEntry> {
        self.entries.get(index)
    }

    /// 按录入顺序
    pub fn entries(&self) -> &[GrowthEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn chart(&self) -> Vec<ChartBar> {
        let max = self
            .entries
            .iter()
            .map(|e| e.height_cm)
            .fold(0.0_f64, f64::max);

        self.entries
            .iter()
            .map(|e| ChartBar {
                label: e.date_label(),
                height_cm: e.height_cm,
                ratio: if max > 0.0 { e.height_cm / max } else { 0.0 },
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(crop: &str, height: &str, date: &str) -> EntryDraft {
        EntryDraft {
            crop: crop.into(),
            height: height.into(),
            date: date.into(),
            notes: String::new(),
        }
    }

    #[test]
    fn valid_draft_becomes_entry() {
        let entry = EntryDraft {
            notes: "  hojas amarillas ".into(),
            ..draft(" Maíz ", "12,5", "2026-10-18")
        }
        .validate()
        .unwrap();

        assert_eq!(entry.crop, "Maíz");
        assert_eq!(entry.height_cm, 12.5);
        assert_eq!(entry.date_label(), "2026-10-18");
        assert_eq!(entry.notes_or_na(), "hojas amarillas");
        assert_eq!(entry.summary(), "Maíz - 12,5 cm");
    }

    #[test]
    fn first_failing_rule_is_reported() {
        assert_eq!(draft("", "abc", "").validate(), Err("El cultivo es obligatorio"));
        assert_eq!(
            draft("Papa", "-3", "2026-10-18").validate(),
            Err("La altura debe ser un número mayor o igual a 0")
        );
        assert_eq!(
            draft("Papa", "", "2026-10-18").validate(),
            Err("La altura debe ser un número mayor o igual a 0")
        );
        assert_eq!(draft("Papa", "8", "18/10/2026").validate(), Err("La fecha no es válida"));
    }

    #[test]
    fn log_keeps_insertion_order_and_scales_chart() {
        let mut log = GrowthLog::new();
        assert!(log.chart().is_empty());

        let first = log.push(draft("Maíz", "10", "2026-10-01").validate().unwrap());
        let second = log.push(draft("Maíz", "40", "2026-10-15").validate().unwrap());
        log.push(draft("Papa", "0", "2026-10-16").validate().unwrap());

        assert_eq!((first, second), (0, 1));
        assert_eq!(log.len(), 3);
        assert_eq!(log.get(1).unwrap().height_cm, 40.0);
        assert!(log.get(3).is_none());
        assert_eq!(log.get(2).unwrap().notes_or_na(), "N/A");

        let bars = log.chart();
        assert_eq!(bars[0].label, "2026-10-01");
        assert_eq!(bars[0].ratio, 0.25);
        assert_eq!(bars[1].ratio, 1.0);
        assert_eq!(bars[2].ratio, 0.0);
    }
}
