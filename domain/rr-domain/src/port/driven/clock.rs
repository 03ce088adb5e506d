//! 時刻ポート

/// 時刻ポート
pub trait Clock {
    /// エポックからのミリ秒を取得
    fn now_ms(&self) -> u64;

    /// ISO 8601形式のタイムスタンプを取得（UTC）
    fn now_iso8601(&self) -> String;

    /// `YYYYMMDD_HHMMSS` 形式のローカル時刻（ファイル名用）
    fn now_compact_local(&self) -> String;
}
