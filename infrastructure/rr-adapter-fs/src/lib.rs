//! ファイルシステムアダプター（設定ファイル）
//! camelCase の JSON を DTO 経由で読み書きする。欠けた項目は既定値で補う。
use rr_domain::error::DomainError;
use rr_domain::model::{
    BackupSettings, DEFAULT_LOCALE, DEFAULT_LOG_LEVEL, DEFAULT_MAX_RETRIES, FeatureToggles,
    ResetConfig,
};
use rr_domain::port::driven::ConfigRepository;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// 既定の設定ファイル名（カレントディレクトリ）
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone)]
pub struct FsConfigRepository {
    config_path: PathBuf,
}

impl FsConfigRepository {
    pub fn new(config_path: impl AsRef<Path>) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// 既定値で設定ファイルを作成する。既存ファイルは上書きしない。
    pub fn save_default(&self) -> Result<bool, DomainError> {
        if self.exists() {
            return Ok(false);
        }
        self.save(&ResetConfig::default())?;
        Ok(true)
    }

    fn ensure_parent_dir(&self, path: &Path) -> Result<(), DomainError> {
        let Some(dir) = path.parent() else {
            return Ok(());
        };
        if dir.as_os_str().is_empty() {
            return Ok(());
        }
        fs::create_dir_all(dir).map_err(|e| DomainError::IoError(format!("create_dir_all: {e}")))
    }

    fn write_atomic(&self, path: &Path, data: &[u8]) -> Result<(), DomainError> {
        self.ensure_parent_dir(path)?;
        let tmp_path = path.with_extension(format!("tmp.{}", unique_suffix()));
        {
            let mut f = fs::File::create(&tmp_path)
                .map_err(|e| DomainError::IoError(format!("create temp file: {e}")))?;
            f.write_all(data)
                .map_err(|e| DomainError::IoError(format!("write temp file: {e}")))?;
            let _ = f.sync_all();
        }
        if let Err(e) = fs::rename(&tmp_path, path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(DomainError::IoError(format!("rename temp file: {e}")));
        }
        Ok(())
    }
}

impl ConfigRepository for FsConfigRepository {
    fn load(&self) -> Result<ResetConfig, DomainError> {
        if !self.exists() {
            return Ok(ResetConfig::default());
        }
        let buf = fs::read_to_string(&self.config_path)
            .map_err(|e| DomainError::IoError(format!("read config: {e}")))?;
        let dto: ConfigDto = serde_json::from_str(&buf).map_err(|e| {
            DomainError::ConfigParseError(format!("{}: {e}", self.config_path.display()))
        })?;
        Ok(ResetConfig::from(dto))
    }

    fn save(&self, config: &ResetConfig) -> Result<(), DomainError> {
        let dto = ConfigDto::from(config);
        let data = serde_json::to_string_pretty(&dto)
            .map_err(|e| DomainError::IoError(format!("serialize config: {e}")))?;
        self.write_atomic(&self.config_path, data.as_bytes())
    }

    fn exists(&self) -> bool {
        self.config_path.is_file()
    }
}

fn unique_suffix() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    format!("{}.{}", std::process::id(), nanos)
}

// ---------- DTO 定義 ----------

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ConfigDto {
    default_locale: String,
    skip_backup: bool,
    max_retries: u32,
    log_level: String,
    features: FeaturesDto,
    backup: BackupDto,
}

impl Default for ConfigDto {
    fn default() -> Self {
        Self {
            default_locale: DEFAULT_LOCALE.into(),
            skip_backup: false,
            max_retries: DEFAULT_MAX_RETRIES,
            log_level: DEFAULT_LOG_LEVEL.into(),
            features: FeaturesDto::default(),
            backup: BackupDto::default(),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct FeaturesDto {
    reset_browser_settings: bool,
    reset_office_settings: bool,
    reset_mru_lists: bool,
    reset_system_locale: bool,
    reset_windows11_memory: bool,
}

impl Default for FeaturesDto {
    fn default() -> Self {
        FeaturesDto::from(&FeatureToggles::default())
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct BackupDto {
    retention_days: u32,
    compression_enabled: bool,
    custom_backup_path: String,
}

impl Default for BackupDto {
    fn default() -> Self {
        BackupDto::from(&BackupSettings::default())
    }
}

impl From<&FeatureToggles> for FeaturesDto {
    fn from(f: &FeatureToggles) -> Self {
        Self {
            reset_browser_settings: f.reset_browser_settings,
            reset_office_settings: f.reset_office_settings,
            reset_mru_lists: f.reset_mru_lists,
            reset_system_locale: f.reset_system_locale,
            reset_windows11_memory: f.reset_windows11_memory,
        }
    }
}

impl From<&BackupSettings> for BackupDto {
    fn from(b: &BackupSettings) -> Self {
        Self {
            retention_days: b.retention_days,
            compression_enabled: b.compression_enabled,
            custom_backup_path: b.custom_backup_path.clone(),
        }
    }
}

impl From<&ResetConfig> for ConfigDto {
    fn from(cfg: &ResetConfig) -> Self {
        Self {
            default_locale: cfg.default_locale.clone(),
            skip_backup: cfg.skip_backup,
            max_retries: cfg.max_retries,
            log_level: cfg.log_level.clone(),
            features: FeaturesDto::from(&cfg.features),
            backup: BackupDto::from(&cfg.backup),
        }
    }
}

impl From<ConfigDto> for ResetConfig {
    fn from(dto: ConfigDto) -> Self {
        Self {
            default_locale: dto.default_locale,
            skip_backup: dto.skip_backup,
            max_retries: dto.max_retries,
            log_level: dto.log_level,
            features: FeatureToggles {
                reset_browser_settings: dto.features.reset_browser_settings,
                reset_office_settings: dto.features.reset_office_settings,
                reset_mru_lists: dto.features.reset_mru_lists,
                reset_system_locale: dto.features.reset_system_locale,
                reset_windows11_memory: dto.features.reset_windows11_memory,
            },
            backup: BackupSettings {
                retention_days: dto.backup.retention_days,
                compression_enabled: dto.backup.compression_enabled,
                custom_backup_path: dto.backup.custom_backup_path,
            },
        }
    }
}
