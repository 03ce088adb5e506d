//! 時刻アダプター（chrono）
use chrono::{Local, SecondsFormat, Utc};
use rr_domain::port::driven::Clock;

/// スナップショット/ログのファイル名に使う書式
pub const COMPACT_FORMAT: &str = "%Y%m%d_%H%M%S";

#[derive(Debug, Default, Clone, Copy)]
pub struct ClockAdapter;

impl ClockAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl Clock for ClockAdapter {
    fn now_ms(&self) -> u64 {
        Utc::now().timestamp_millis().max(0) as u64
    }

    fn now_iso8601(&self) -> String {
        Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    fn now_compact_local(&self) -> String {
        Local::now().format(COMPACT_FORMAT).to_string()
    }
}
