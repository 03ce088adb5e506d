//! バックアップサービスポート

use crate::error::DomainError;
use crate::model::SettingsSubtree;
use std::path::PathBuf;

/// 変更前スナップショットのエクスポート
pub trait BackupService {
    /// `subtree` を `<label>.<拡張子>` としてエクスポートし、ファイルパスを返す。
    ///
    /// `run_dir` は実行ごとのスナップショットディレクトリ。
    /// None なら作成して格納し、Some なら再利用する（1実行につき1ディレクトリ）。
    fn snapshot(
        &self,
        run_dir: &mut Option<PathBuf>,
        subtree: &SettingsSubtree,
        label: &str,
    ) -> Result<PathBuf, DomainError>;
}
