use crate::DomainError;
use crate::model::LocaleId;

pub const DEFAULT_LOCALE: &str = "pl-PL";
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_LOG_LEVEL: &str = "INFO";
const LOG_LEVELS: &[&str] = &["TRACE", "DEBUG", "INFO", "WARNING", "WARN", "ERROR"];
const DEFAULT_RETENTION_DAYS: u32 = 30;
const MAX_RETRIES_LIMIT: u32 = 10;

/// 設定グループ単位の有効/無効
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureToggles {
    /// ブラウザ（IE/Edge）のAcceptLanguage
    pub reset_browser_settings: bool,
    /// Officeの言語設定（現状対応グループなし）
    pub reset_office_settings: bool,
    /// MRUリスト（現状対応グループなし）
    pub reset_mru_lists: bool,
    /// Geo（国/地域）設定
    pub reset_system_locale: bool,
    /// User Profile サブツリーの削除
    pub reset_windows11_memory: bool,
}

impl FeatureToggles {
    /// 全グループ有効
    pub fn all() -> Self {
        Self {
            reset_browser_settings: true,
            reset_office_settings: true,
            reset_mru_lists: true,
            reset_system_locale: true,
            reset_windows11_memory: true,
        }
    }

    /// International グループのみ
    pub fn international_only() -> Self {
        Self {
            reset_browser_settings: false,
            reset_office_settings: false,
            reset_mru_lists: false,
            reset_system_locale: false,
            reset_windows11_memory: false,
        }
    }
}

impl Default for FeatureToggles {
    fn default() -> Self {
        Self::all()
    }
}

/// バックアップ設定（保持期間の強制はコア外）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupSettings {
    pub retention_days: u32,
    pub compression_enabled: bool,
    /// 空ならテンポラリディレクトリ
    pub custom_backup_path: String,
}

impl Default for BackupSettings {
    fn default() -> Self {
        Self {
            retention_days: DEFAULT_RETENTION_DAYS,
            compression_enabled: false,
            custom_backup_path: String::new(),
        }
    }
}

/// リセット設定（外部で読み込まれ、プレーンデータとして渡される）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetConfig {
    pub default_locale: String,
    pub skip_backup: bool,
    pub max_retries: u32,
    /// ログの既定レベル（RUST_LOG があればそちら優先）
    pub log_level: String,
    pub features: FeatureToggles,
    pub backup: BackupSettings,
}

impl Default for ResetConfig {
    fn default() -> Self {
        Self {
            default_locale: DEFAULT_LOCALE.into(),
            skip_backup: false,
            max_retries: DEFAULT_MAX_RETRIES,
            log_level: DEFAULT_LOG_LEVEL.into(),
            features: FeatureToggles::default(),
            backup: BackupSettings::default(),
        }
    }
}

impl ResetConfig {
    pub fn validate(&self) -> Result<(), DomainError> {
        LocaleId::parse(&self.default_locale).map_err(|_| {
            DomainError::InvalidConfig(format!(
                "defaultLocale must look like xx-YY (got {:?})",
                self.default_locale
            ))
        })?;
        if self.max_retries > MAX_RETRIES_LIMIT {
            return Err(DomainError::InvalidConfig(format!(
                "maxRetries must be 0-{} (got {})",
                MAX_RETRIES_LIMIT, self.max_retries
            )));
        }
        if !LOG_LEVELS.contains(&self.log_level.to_ascii_uppercase().as_str()) {
            return Err(DomainError::InvalidConfig(format!(
                "logLevel must be one of {} (got {:?})",
                LOG_LEVELS.join(", "),
                self.log_level
            )));
        }
        Ok(())
    }

    /// 外部入力を丸める。検証に失敗する値は既定値へ戻す。
    pub fn normalize(&mut self) {
        self.default_locale = self.default_locale.trim().to_string();
        if LocaleId::parse(&self.default_locale).is_err() {
            self.default_locale = DEFAULT_LOCALE.into();
        }
        self.max_retries = self.max_retries.min(MAX_RETRIES_LIMIT);
        self.log_level = self.log_level.trim().to_ascii_uppercase();
        if !LOG_LEVELS.contains(&self.log_level.as_str()) {
            self.log_level = DEFAULT_LOG_LEVEL.into();
        }
        self.backup.custom_backup_path = self.backup.custom_backup_path.trim().to_string();
    }

    /// tracing のフィルタ指定（WARNING → warn 等）
    pub fn tracing_level(&self) -> &'static str {
        match self.log_level.trim().to_ascii_uppercase().as_str() {
            "TRACE" => "trace",
            "DEBUG" => "debug",
            "WARNING" | "WARN" => "warn",
            "ERROR" => "error",
            _ => "info",
        }
    }

    /// 1キーあたりの試行回数（0は1回として扱う）
    pub fn attempts_per_key(&self) -> u32 {
        self.max_retries.max(1)
    }
}
