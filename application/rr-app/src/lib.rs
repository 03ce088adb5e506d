//! rr-app: アプリケーション層のファサード。
//! Engine 層とドメインポートを組み合わせて、ロケール適用・一覧・検証の
//! ユースケースを実装する。

use rr_domain::DomainError;
use rr_domain::model::{
    ApplicationRun, LocaleProfile, ResetConfig, SettingValue, SettingsSubtree, exit_codes,
};
use rr_domain::port::driven::{BackupService, ConfigRepository, SettingsStore};
use rr_domain::service::LocaleCatalog;
use tracing::warn;

/// 現在値表示の対象（International サブツリー）
pub const STATUS_KEYS: &[(&str, &str)] = &[
    ("Locale", "System Locale"),
    ("LocaleName", "Locale Name"),
    ("sCountry", "Country"),
    ("sShortDate", "Short Date Format"),
    ("sTimeFormat", "Time Format"),
    ("sCurrency", "Currency Symbol"),
];

/// 現在値1件（読み取り失敗もそのまま表示する）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentSetting {
    pub name: &'static str,
    pub label: &'static str,
    pub value: Result<Option<SettingValue>, DomainError>,
}

/// 読み込み済みの設定と、既定値/正規化へ切り替えた理由
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedConfig {
    pub config: ResetConfig,
    pub fallback: Option<String>,
}

#[derive(Debug, Default)]
pub struct AppService {
    catalog: LocaleCatalog,
}

impl AppService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_catalog(catalog: LocaleCatalog) -> Self {
        Self { catalog }
    }

    /// (識別子, 表示名) を表示順で返す
    pub fn supported_locales(&self) -> Vec<(&str, &str)> {
        self.catalog.supported_locales()
    }

    pub fn validate_locale(&self, id: &str) -> bool {
        self.catalog.validate(id)
    }

    /// カタログ上のプロファイル（全グループ）
    pub fn resolve(&self, id: &str) -> Result<LocaleProfile, DomainError> {
        self.catalog.resolve(id).cloned()
    }

    /// 設定を読む。解析/検証に失敗したら既定値へフォールバック（中断しない）
    pub fn load_config_or_default(&self, repo: &impl ConfigRepository) -> ResetConfig {
        let loaded = self.load_config(repo);
        if let Some(reason) = &loaded.fallback {
            warn!(event = "config-fallback", "{}", reason);
        }
        loaded.config
    }

    /// ログを出さずに設定を読む。フォールバック理由は呼び出し側で記録する
    /// （ログ初期化前に読む場合など）。
    pub fn load_config(&self, repo: &impl ConfigRepository) -> LoadedConfig {
        let mut config = match repo.load() {
            Ok(config) => config,
            Err(err) => {
                return LoadedConfig {
                    config: ResetConfig::default(),
                    fallback: Some(format!("{}; using defaults", err)),
                };
            }
        };
        let fallback = match config.validate() {
            Ok(()) => None,
            Err(err) => {
                config.normalize();
                Some(format!("{}; normalizing", err))
            }
        };
        LoadedConfig { config, fallback }
    }

    /// 指定がなければ設定の defaultLocale
    pub fn target_locale<'a>(&self, requested: Option<&'a str>, cfg: &'a ResetConfig) -> &'a str {
        match requested {
            Some(id) if !id.trim().is_empty() => id.trim(),
            _ => cfg.default_locale.as_str(),
        }
    }

    /// 現在の主要な地域設定を読む（ストアは変更しない）
    pub fn current_settings(&self, store: &dyn SettingsStore) -> Vec<CurrentSetting> {
        let subtree = SettingsSubtree::international();
        STATUS_KEYS
            .iter()
            .map(|&(name, label)| CurrentSetting {
                name,
                label,
                value: store.read(&subtree, name),
            })
            .collect()
    }

    pub fn apply_locale(
        &self,
        id: &str,
        cfg: &ResetConfig,
        store: &dyn SettingsStore,
        backup: &dyn BackupService,
    ) -> Result<ApplicationRun, DomainError> {
        rr_engine::apply_locale(&self.catalog, id, cfg, store, backup)
    }
}

/// 実行結果 → プロセス終了コード（0: 全キー成功、1: 失敗キーありまたはロケール不正）
pub fn run_exit_code(result: &Result<ApplicationRun, DomainError>) -> u8 {
    match result {
        Ok(run) if run.is_success() => exit_codes::SUCCESS,
        _ => exit_codes::FAILURE,
    }
}
