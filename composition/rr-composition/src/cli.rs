//! CLI 用ランタイム配線。
//! CLI ユースケースの構成ルート。

use rr_adapter_backup::{
    RegExportBackup, SnapshotInfo, UnavailableBackup, backup_root, list_snapshots,
};
use rr_adapter_clock::ClockAdapter;
use rr_adapter_fs::{DEFAULT_CONFIG_FILE, FsConfigRepository};
use rr_adapter_registry::{SelectedStore, is_elevated, select_store};
use rr_app::{AppService, CurrentSetting};
use rr_domain::DomainError;
use rr_domain::model::{ApplicationRun, ResetConfig};
use rr_domain::port::driven::{BackupService, SettingsStore};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// 起動オプション（CLI 引数から組み立てる）
#[derive(Debug, Clone)]
pub struct CliOptions {
    pub config_path: PathBuf,
    pub log_path: Option<PathBuf>,
    /// シミュレーションストアを強制
    pub dry_run: bool,
    pub verbose: bool,
    /// tracing を初期化するか（テストでは false）
    pub init_logging: bool,
}

impl Default for CliOptions {
    fn default() -> Self {
        Self {
            config_path: PathBuf::from(DEFAULT_CONFIG_FILE),
            log_path: None,
            dry_run: false,
            verbose: false,
            init_logging: true,
        }
    }
}

/// CLI実行ファイル用の依存関係
pub struct CliRuntime {
    app: AppService,
    config_repo: FsConfigRepository,
    config: ResetConfig,
    store: SelectedStore,
    backup: Box<dyn BackupService>,
    log_file: Option<PathBuf>,
}

impl CliRuntime {
    pub fn new(opts: &CliOptions) -> Self {
        let app = AppService::new();
        let config_repo = FsConfigRepository::new(&opts.config_path);

        // 設定は1回だけ読む。ログレベルは正規化後の値を使い、
        // フォールバックの警告はサブスクライバ設定後に出す。
        let loaded = app.load_config(&config_repo);
        let log_file = if opts.init_logging {
            rr_log_utils::init_logging(
                opts.log_path.as_deref(),
                loaded.config.tracing_level(),
                opts.verbose,
            )
        } else {
            None
        };
        if let Some(reason) = &loaded.fallback {
            warn!(event = "config-fallback", "{}", reason);
        }
        let config = loaded.config;

        let store = select_store(opts.dry_run);
        let backup: Box<dyn BackupService> = if store.is_simulated() {
            Box::new(UnavailableBackup::new("settings store is simulated"))
        } else {
            Box::new(RegExportBackup::new(
                backup_root(&config.backup),
                ClockAdapter::new(),
            ))
        };

        info!(
            config = %opts.config_path.display(),
            simulated = store.is_simulated(),
            elevated = is_elevated(),
            "Runtime ready"
        );

        Self {
            app,
            config_repo,
            config,
            store,
            backup,
            log_file,
        }
    }

    /// アプリケーションサービス取得
    pub fn app(&self) -> &AppService {
        &self.app
    }

    pub fn config(&self) -> &ResetConfig {
        &self.config
    }

    pub fn config_path(&self) -> &Path {
        self.config_repo.path()
    }

    pub fn log_file(&self) -> Option<&Path> {
        self.log_file.as_deref()
    }

    pub fn store(&self) -> &dyn SettingsStore {
        self.store.store.as_ref()
    }

    pub fn is_simulated(&self) -> bool {
        self.store.is_simulated()
    }

    /// シミュレーションへ切り替えた理由
    pub fn fallback_reason(&self) -> Option<&str> {
        self.store.fallback_reason.as_deref()
    }

    pub fn is_elevated(&self) -> bool {
        is_elevated()
    }

    /// 引数のロケール、なければ設定の defaultLocale
    pub fn target_locale<'a>(&'a self, requested: Option<&'a str>) -> &'a str {
        self.app.target_locale(requested, &self.config)
    }

    pub fn apply_locale(&self, id: &str) -> Result<ApplicationRun, DomainError> {
        self.app
            .apply_locale(id, &self.config, self.store(), self.backup.as_ref())
    }

    pub fn current_settings(&self) -> Vec<CurrentSetting> {
        self.app.current_settings(self.store())
    }

    /// スナップショットの保存先
    pub fn backup_dir(&self) -> PathBuf {
        backup_root(&self.config.backup)
    }

    pub fn list_snapshots(&self) -> Result<Vec<SnapshotInfo>, DomainError> {
        list_snapshots(&self.backup_dir())
    }

    /// 既定の設定ファイルを作成。既存なら false。
    pub fn init_config(&self) -> Result<bool, DomainError> {
        self.config_repo.save_default()
    }
}
