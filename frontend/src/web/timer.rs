//! 定时器工具
//!
//! 基于 `gloo-timers`。`Interval` 在 drop 时自动清除，组件卸载后不会留下定时器。

use chrono::{DateTime, Local};
use gloo_timers::future::TimeoutFuture;

pub use gloo_timers::callback::Interval;

/// 顶栏时钟的刷新周期
pub const CLOCK_TICK_MS: u32 = 60_000;

pub async fn sleep(millis: u32) {
    TimeoutFuture::new(millis).await;
}

/// `HH:MM`
pub fn clock_label(now: &DateTime<Local>) -> String {
    now.format("%H:%M").to_string()
}

/// 悬停提示中的完整时间
pub fn clock_title(now: &DateTime<Local>) -> String {
    now.format("%H:%M:%S").to_string()
}
