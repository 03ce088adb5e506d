//! 操作結果と実行記録
//!
//! カウンタは共有オブジェクトではなく実行ごとの値に保持する。

use super::{LocaleId, SettingValue, SettingsSubtree};
use std::path::PathBuf;

/// キー単位の最終結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeStatus {
    Applied,
    Failed,
}

impl OutcomeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeStatus::Applied => "applied",
            OutcomeStatus::Failed => "failed",
        }
    }
}

/// 1キーの書き込み結果（リトライ込みで1件）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationOutcome {
    /// `Control Panel\International\sCurrency` 形式
    pub key_path: String,
    pub value: SettingValue,
    pub attempts: u32,
    pub status: OutcomeStatus,
    /// 最後の失敗理由（成功時も途中失敗があれば保持）
    pub message: Option<String>,
}

/// 1回の ApplyLocale の記録
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationRun {
    pub locale: LocaleId,
    pub display_name: String,
    /// シミュレーションストアでの実行か
    pub simulated: bool,
    /// プロファイルが既定値からの導出か
    pub degraded: bool,
    pub attempted: u32,
    pub succeeded: u32,
    pub failed: u32,
    /// 作成されたスナップショットディレクトリ
    pub backup_location: Option<PathBuf>,
    pub outcomes: Vec<OperationOutcome>,
    /// 削除済みサブツリー
    pub cleared: Vec<SettingsSubtree>,
    /// 実行を止めない警告（バックアップ失敗等）
    pub warnings: Vec<String>,
}

impl ApplicationRun {
    pub fn new(locale: LocaleId, display_name: impl Into<String>) -> Self {
        Self {
            locale,
            display_name: display_name.into(),
            simulated: false,
            degraded: false,
            attempted: 0,
            succeeded: 0,
            failed: 0,
            backup_location: None,
            outcomes: Vec::new(),
            cleared: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// 結果を記録する。attempted はキーごとに1回だけ増える。
    pub fn record(&mut self, outcome: OperationOutcome) {
        self.attempted += 1;
        match outcome.status {
            OutcomeStatus::Applied => self.succeeded += 1,
            OutcomeStatus::Failed => self.failed += 1,
        }
        self.outcomes.push(outcome);
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// Failed のキーが1つもなければ成功
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// 成功率（%）。試行ゼロは分母1として扱う。
    pub fn success_rate(&self) -> f64 {
        self.succeeded as f64 / self.attempted.max(1) as f64 * 100.0
    }

    pub fn outcome(&self, key_path: &str) -> Option<&OperationOutcome> {
        self.outcomes.iter().find(|o| o.key_path == key_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(key: &str, status: OutcomeStatus, attempts: u32) -> OperationOutcome {
        OperationOutcome {
            key_path: key.into(),
            value: SettingValue::text("x"),
            attempts,
            status,
            message: None,
        }
    }

    #[test]
    fn record_counts_once_per_key() {
        let mut run = ApplicationRun::new(LocaleId::parse("en-US").unwrap(), "English");
        run.record(outcome("a", OutcomeStatus::Applied, 3));
        run.record(outcome("b", OutcomeStatus::Failed, 3));
        assert_eq!(run.attempted, 2);
        assert_eq!(run.succeeded, 1);
        assert_eq!(run.failed, 1);
        assert!(!run.is_success());
    }

    #[test]
    fn empty_run_is_success_with_zero_rate() {
        let run = ApplicationRun::new(LocaleId::parse("en-US").unwrap(), "English");
        assert!(run.is_success());
        assert_eq!(run.success_rate(), 0.0);
    }

    #[test]
    fn success_rate_is_percentage() {
        let mut run = ApplicationRun::new(LocaleId::parse("en-US").unwrap(), "English");
        run.record(outcome("a", OutcomeStatus::Applied, 1));
        run.record(outcome("b", OutcomeStatus::Applied, 1));
        run.record(outcome("c", OutcomeStatus::Applied, 1));
        run.record(outcome("d", OutcomeStatus::Failed, 3));
        assert!((run.success_rate() - 75.0).abs() < f64::EPSILON);
        assert_eq!(run.outcome("d").unwrap().attempts, 3);
    }
}
