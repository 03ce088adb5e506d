//! 設定リポジトリポート

use crate::error::DomainError;
use crate::model::ResetConfig;

/// 設定ストレージポート
pub trait ConfigRepository {
    /// 設定を読込（ファイルがなければ既定値）
    fn load(&self) -> Result<ResetConfig, DomainError>;

    /// 設定を保存
    fn save(&self, config: &ResetConfig) -> Result<(), DomainError>;

    /// 設定ファイルの存在確認
    fn exists(&self) -> bool;
}
