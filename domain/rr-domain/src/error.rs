//! ドメインエラー型
//!
//! 標準ライブラリのみ使用（外部エラーハンドリングクレートなし）

use std::fmt;

/// ドメイン層のエラー型
/// 各バリアントは特定の失敗シナリオを表現
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// サポート外のロケール（呼び出し側の誤り。変更前に即時失敗）
    UnsupportedLocale(String),

    /// 設定ストアが構造的に利用できない（非Windows、サンドボックス等）
    StoreUnavailable(String),

    /// 設定ストアへのアクセス拒否（権限不足）
    StoreAccessDenied(String),

    /// 書き込みは成功したが読み戻し値が一致しない
    VerificationFailed {
        key: String,
        expected: String,
        actual: Option<String>,
    },

    /// バックアップ機能が利用できない（シミュレーション時）
    BackupUnavailable(String),

    /// バックアップのエクスポート失敗
    BackupFailed(String),

    /// 外部設定ファイルの解析失敗
    ConfigParseError(String),

    /// 設定値が無効
    InvalidConfig(String),

    /// ファイルI/Oエラー
    IoError(String),
}

impl DomainError {
    /// リトライで回復し得る失敗か（ストア系のみ）
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::StoreUnavailable(_)
                | Self::StoreAccessDenied(_)
                | Self::VerificationFailed { .. }
                | Self::IoError(_)
        )
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedLocale(id) => {
                write!(f, "Unsupported locale: {}", id)
            }
            Self::StoreUnavailable(msg) => {
                write!(f, "Settings store unavailable: {}", msg)
            }
            Self::StoreAccessDenied(msg) => {
                write!(f, "Settings store access denied: {}", msg)
            }
            Self::VerificationFailed {
                key,
                expected,
                actual,
            } => match actual {
                Some(actual) => write!(
                    f,
                    "Verification failed for {}: expected {:?}, read back {:?}",
                    key, expected, actual
                ),
                None => write!(
                    f,
                    "Verification failed for {}: expected {:?}, value missing",
                    key, expected
                ),
            },
            Self::BackupUnavailable(msg) => {
                write!(f, "Backup unavailable: {}", msg)
            }
            Self::BackupFailed(msg) => {
                write!(f, "Backup failed: {}", msg)
            }
            Self::ConfigParseError(msg) => {
                write!(f, "Configuration parse error: {}", msg)
            }
            Self::InvalidConfig(msg) => {
                write!(f, "Invalid configuration: {}", msg)
            }
            Self::IoError(msg) => {
                write!(f, "IO error: {}", msg)
            }
        }
    }
}

impl std::error::Error for DomainError {}
