//! 設定ストアポート（Live / Simulated の2実装）

use crate::error::DomainError;
use crate::model::{SettingValue, SettingsSubtree};

pub type Result<T> = std::result::Result<T, DomainError>;

/// 永続設定ストアの境界
pub trait SettingsStore {
    /// サブツリーがなければ作成して値を書き込み、直後に読み戻して照合する。
    /// 不一致は [`DomainError::VerificationFailed`]。
    fn write(&self, subtree: &SettingsSubtree, name: &str, value: &SettingValue) -> Result<()>;

    /// 値を読む（存在しなければ None）
    fn read(&self, subtree: &SettingsSubtree, name: &str) -> Result<Option<SettingValue>>;

    /// サブツリーごと削除（存在しなければ成功扱い）
    fn delete_subtree(&self, subtree: &SettingsSubtree) -> Result<()>;

    /// 実ストアに触れないシミュレーション実装か
    fn is_simulated(&self) -> bool {
        false
    }
}
