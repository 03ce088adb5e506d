//! rr-engine: ロケール適用ワークフロー（バックアップ → サブツリー削除 → キー単位の
//! 書き込み/リトライ）と集計を実装する層。ドメイン（rr-domain）のポートにのみ依存する。

pub mod report;

pub use report::{RunSummary, summarize};

use rr_domain::DomainError;
use rr_domain::model::{
    ApplicationRun, LocaleProfile, OperationOutcome, OutcomeStatus, ResetConfig, SettingEntry,
    SettingsSubtree,
};
use rr_domain::port::driven::{BackupService, SettingsStore};
use rr_domain::service::LocaleCatalog;
use std::path::PathBuf;
use tracing::{debug, error, info, warn};

/// 変更前スナップショットのラベル
pub const PRE_CHANGE_LABEL: &str = "pre-change";

/// ロケールを解決して適用する。
///
/// 失敗で中断するのはロケール解決のみ（副作用の前）。
/// キー単位の失敗は [`ApplicationRun`] の結果として返る。
pub fn apply_locale(
    catalog: &LocaleCatalog,
    locale_id: &str,
    cfg: &ResetConfig,
    store: &dyn SettingsStore,
    backup: &dyn BackupService,
) -> Result<ApplicationRun, DomainError> {
    let profile = match catalog.resolve(locale_id) {
        Ok(profile) => profile,
        Err(err) => {
            error!(event = "operation-failed", locale = %locale_id.trim(), "{}", err);
            return Err(err);
        }
    };
    Ok(apply_profile(
        &profile.filtered(&cfg.features),
        cfg,
        store,
        backup,
    ))
}

/// 解決済みプロファイルを適用する（機能トグルでの絞り込みは呼び出し側）
pub fn apply_profile(
    profile: &LocaleProfile,
    cfg: &ResetConfig,
    store: &dyn SettingsStore,
    backup: &dyn BackupService,
) -> ApplicationRun {
    let mut run = ApplicationRun::new(profile.id().clone(), profile.display_name());
    run.simulated = store.is_simulated();
    run.degraded = profile.is_degraded();

    info!(
        event = "run-started",
        locale = %profile.id(),
        keys = profile.key_count(),
        simulated = run.simulated,
        "Applying {} ({})",
        profile.id(),
        profile.display_name()
    );
    if run.degraded {
        let msg = format!(
            "No explicit settings table for {}; applying minimal default profile",
            profile.id()
        );
        warn!(locale = %profile.id(), "{}", msg);
        run.warn(msg);
    }

    if cfg.skip_backup {
        debug!("Backup skipped by configuration");
    } else {
        run.backup_location = take_snapshot(backup, &mut run);
    }

    for subtree in profile.clear_subtrees() {
        clear_subtree(store, subtree, &mut run);
    }

    let attempts = cfg.attempts_per_key();
    for (subtree, entry) in profile.entries() {
        let outcome = apply_entry(store, subtree, entry, attempts);
        match outcome.status {
            OutcomeStatus::Applied => info!(
                event = "operation-applied",
                key = %outcome.key_path,
                value = %outcome.value,
                kind = outcome.value.kind().as_str(),
                attempts = outcome.attempts,
                "Applied {}",
                outcome.key_path
            ),
            OutcomeStatus::Failed => error!(
                event = "operation-failed",
                key = %outcome.key_path,
                value = %outcome.value,
                attempts = outcome.attempts,
                "Failed {}: {}",
                outcome.key_path,
                outcome.message.as_deref().unwrap_or("unknown error")
            ),
        }
        run.record(outcome);
    }

    info!(
        event = "run-summary",
        locale = %run.locale,
        attempted = run.attempted,
        succeeded = run.succeeded,
        failed = run.failed,
        rate = run.success_rate(),
        "Run finished"
    );
    run
}

/// 変更前スナップショット。失敗は警告として記録するだけ。
fn take_snapshot(backup: &dyn BackupService, run: &mut ApplicationRun) -> Option<PathBuf> {
    let mut run_dir: Option<PathBuf> = None;
    let target = SettingsSubtree::international();
    match backup.snapshot(&mut run_dir, &target, PRE_CHANGE_LABEL) {
        Ok(file) => {
            info!(
                event = "backup-created",
                subtree = %target,
                file = %file.display(),
                "Backup created"
            );
        }
        Err(err) => {
            warn!(event = "backup-failed", subtree = %target, "{}", err);
            run.warn(err.to_string());
        }
    }
    run_dir
}

fn clear_subtree(store: &dyn SettingsStore, subtree: &SettingsSubtree, run: &mut ApplicationRun) {
    match store.delete_subtree(subtree) {
        Ok(()) => {
            info!(event = "subtree-cleared", subtree = %subtree, "Cleared {}", subtree);
            run.cleared.push(subtree.clone());
        }
        Err(err) => {
            warn!(event = "subtree-clear-failed", subtree = %subtree, "{}", err);
            run.warn(format!("Could not clear {}: {}", subtree, err));
        }
    }
}

/// 1キーを最大 `attempts` 回まで書き込む
fn apply_entry(
    store: &dyn SettingsStore,
    subtree: &SettingsSubtree,
    entry: &SettingEntry,
    attempts: u32,
) -> OperationOutcome {
    let key_path = subtree.key_path(&entry.name);
    let mut last_error: Option<String> = None;
    let mut attempt = 0;

    while attempt < attempts {
        attempt += 1;
        match store.write(subtree, &entry.name, &entry.value) {
            Ok(()) => {
                return OperationOutcome {
                    key_path,
                    value: entry.value.clone(),
                    attempts: attempt,
                    status: OutcomeStatus::Applied,
                    message: last_error,
                };
            }
            Err(err) => {
                let retry = err.is_retryable() && attempt < attempts;
                last_error = Some(err.to_string());
                if !retry {
                    break;
                }
                debug!(
                    event = "operation-retry",
                    key = %key_path,
                    attempt,
                    "{}",
                    err
                );
            }
        }
    }

    OperationOutcome {
        key_path,
        value: entry.value.clone(),
        attempts: attempt,
        status: OutcomeStatus::Failed,
        message: last_error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rr_domain::model::{FeatureToggles, LocaleId, SettingValue};
    use rr_domain::service::SupportedLocale;
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;

    /// 失敗パターンを指定できるメモリストア
    #[derive(Default)]
    struct MockStore {
        values: RefCell<HashMap<String, SettingValue>>,
        writes: Cell<u32>,
        deletes: RefCell<Vec<String>>,
        fail_key: Option<String>,
        always_mismatch: bool,
        /// 最初のN回の書き込みを失敗させる
        transient_failures: Cell<u32>,
        non_retryable: bool,
        fail_delete: bool,
    }

    impl SettingsStore for MockStore {
        fn write(
            &self,
            subtree: &SettingsSubtree,
            name: &str,
            value: &SettingValue,
        ) -> Result<(), DomainError> {
            self.writes.set(self.writes.get() + 1);
            if self.non_retryable {
                return Err(DomainError::InvalidConfig("rejected".into()));
            }
            if self.transient_failures.get() > 0 {
                self.transient_failures.set(self.transient_failures.get() - 1);
                return Err(DomainError::StoreAccessDenied("busy".into()));
            }
            if self.always_mismatch || self.fail_key.as_deref() == Some(name) {
                return Err(DomainError::VerificationFailed {
                    key: subtree.key_path(name),
                    expected: value.to_string(),
                    actual: None,
                });
            }
            self.values
                .borrow_mut()
                .insert(subtree.key_path(name), value.clone());
            Ok(())
        }

        fn read(
            &self,
            subtree: &SettingsSubtree,
            name: &str,
        ) -> Result<Option<SettingValue>, DomainError> {
            Ok(self.values.borrow().get(&subtree.key_path(name)).cloned())
        }

        fn delete_subtree(&self, subtree: &SettingsSubtree) -> Result<(), DomainError> {
            if self.fail_delete {
                return Err(DomainError::StoreAccessDenied("locked".into()));
            }
            self.deletes.borrow_mut().push(subtree.path().to_string());
            Ok(())
        }
    }

    #[derive(Default)]
    struct MockBackup {
        fail: bool,
        calls: RefCell<Vec<String>>,
    }

    impl BackupService for MockBackup {
        fn snapshot(
            &self,
            run_dir: &mut Option<PathBuf>,
            _subtree: &SettingsSubtree,
            label: &str,
        ) -> Result<PathBuf, DomainError> {
            self.calls.borrow_mut().push(label.to_string());
            if self.fail {
                return Err(DomainError::BackupFailed("reg export exited with 1".into()));
            }
            let dir = run_dir.get_or_insert_with(|| PathBuf::from("RegionalSettings_Backup_test"));
            Ok(dir.join(format!("{}.reg", label)))
        }
    }

    fn international_only() -> ResetConfig {
        ResetConfig {
            features: FeatureToggles::international_only(),
            ..ResetConfig::default()
        }
    }

    #[test]
    fn pl_pl_applies_all_international_keys() {
        let catalog = LocaleCatalog::builtin();
        let store = MockStore::default();
        let backup = MockBackup::default();

        let run = apply_locale(&catalog, "pl-PL", &international_only(), &store, &backup).unwrap();

        assert_eq!(run.attempted, 19);
        assert_eq!(run.succeeded, 19);
        assert_eq!(run.failed, 0);
        assert!(run.is_success());
        assert!((run.success_rate() - 100.0).abs() < f64::EPSILON);
        assert_eq!(
            run.backup_location,
            Some(PathBuf::from("RegionalSettings_Backup_test"))
        );
        assert_eq!(*backup.calls.borrow(), vec![PRE_CHANGE_LABEL.to_string()]);
        assert_eq!(
            store.read(&SettingsSubtree::international(), "sCurrency").unwrap(),
            Some(SettingValue::text("zł"))
        );
    }

    #[test]
    fn unsupported_locale_has_no_side_effects() {
        let catalog = LocaleCatalog::builtin();
        let store = MockStore::default();
        let backup = MockBackup::default();

        let err = apply_locale(&catalog, "xx-XX", &ResetConfig::default(), &store, &backup)
            .unwrap_err();

        assert_eq!(err, DomainError::UnsupportedLocale("xx-XX".into()));
        assert_eq!(store.writes.get(), 0);
        assert!(store.deletes.borrow().is_empty());
        assert!(backup.calls.borrow().is_empty());
    }

    #[test]
    fn repeated_runs_are_identical() {
        let catalog = LocaleCatalog::builtin();
        let store = MockStore::default();
        let backup = MockBackup::default();
        let cfg = ResetConfig::default();

        let first = apply_locale(&catalog, "en-US", &cfg, &store, &backup).unwrap();
        let second = apply_locale(&catalog, "en-US", &cfg, &store, &backup).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.attempted, 23);
    }

    #[test]
    fn always_mismatching_store_exhausts_retries() {
        let catalog = LocaleCatalog::builtin();
        let store = MockStore {
            always_mismatch: true,
            ..MockStore::default()
        };
        let backup = MockBackup::default();
        let cfg = international_only();

        let run = apply_locale(&catalog, "en-US", &cfg, &store, &backup).unwrap();

        assert_eq!(run.attempted, 19);
        assert_eq!(run.failed, 19);
        assert_eq!(store.writes.get(), 19 * cfg.max_retries);
        assert!(run.outcomes.iter().all(|o| o.attempts == cfg.max_retries));
        assert!(run.outcomes.iter().all(|o| o.status == OutcomeStatus::Failed));
        assert!(!run.is_success());
    }

    #[test]
    fn single_failing_key_fails_run_but_not_others() {
        let catalog = LocaleCatalog::builtin();
        let store = MockStore {
            fail_key: Some("sCurrency".into()),
            ..MockStore::default()
        };
        let backup = MockBackup::default();

        let run = apply_locale(&catalog, "de-DE", &international_only(), &store, &backup).unwrap();

        assert!(!run.is_success());
        assert_eq!(run.attempted, 19);
        assert_eq!(run.failed, 1);
        assert_eq!(run.succeeded, 18);
        let failed = run
            .outcome(r"Control Panel\International\sCurrency")
            .unwrap();
        assert_eq!(failed.status, OutcomeStatus::Failed);
        assert!(failed.message.as_deref().unwrap().contains("sCurrency"));
        assert_eq!(
            run.outcome(r"Control Panel\International\sDecimal").unwrap().status,
            OutcomeStatus::Applied
        );
    }

    #[test]
    fn failing_backup_does_not_stop_the_run() {
        let catalog = LocaleCatalog::builtin();
        let store = MockStore::default();
        let backup = MockBackup {
            fail: true,
            ..MockBackup::default()
        };

        let run = apply_locale(&catalog, "fr-FR", &international_only(), &store, &backup).unwrap();

        assert!(run.is_success());
        assert_eq!(run.succeeded, 19);
        assert_eq!(run.backup_location, None);
        assert_eq!(run.warnings.len(), 1);
    }

    #[test]
    fn skip_backup_never_calls_backup_service() {
        let catalog = LocaleCatalog::builtin();
        let store = MockStore::default();
        let backup = MockBackup::default();
        let cfg = ResetConfig {
            skip_backup: true,
            ..international_only()
        };

        let run = apply_locale(&catalog, "it-IT", &cfg, &store, &backup).unwrap();

        assert!(backup.calls.borrow().is_empty());
        assert_eq!(run.backup_location, None);
        assert!(run.warnings.is_empty());
    }

    #[test]
    fn transient_failure_recovers_within_budget() {
        let catalog = LocaleCatalog::builtin();
        let store = MockStore {
            transient_failures: Cell::new(2),
            ..MockStore::default()
        };
        let backup = MockBackup::default();

        let run = apply_locale(&catalog, "en-GB", &international_only(), &store, &backup).unwrap();

        assert!(run.is_success());
        assert_eq!(run.attempted, 19);
        let first = &run.outcomes[0];
        assert_eq!(first.attempts, 3);
        assert!(first.message.is_some());
        assert_eq!(run.outcomes[1].attempts, 1);
    }

    #[test]
    fn non_retryable_error_fails_on_first_attempt() {
        let catalog = LocaleCatalog::builtin();
        let store = MockStore {
            non_retryable: true,
            ..MockStore::default()
        };
        let backup = MockBackup::default();

        let run = apply_locale(&catalog, "ja-JP", &international_only(), &store, &backup).unwrap();

        assert_eq!(run.failed, 19);
        assert_eq!(store.writes.get(), 19);
    }

    #[test]
    fn zero_retries_still_attempts_each_key_once() {
        let catalog = LocaleCatalog::builtin();
        let store = MockStore {
            always_mismatch: true,
            ..MockStore::default()
        };
        let backup = MockBackup::default();
        let cfg = ResetConfig {
            max_retries: 0,
            ..international_only()
        };

        let run = apply_locale(&catalog, "ko-KR", &cfg, &store, &backup).unwrap();

        assert_eq!(store.writes.get(), 19);
        assert!(run.outcomes.iter().all(|o| o.attempts == 1));
    }

    #[test]
    fn memory_reset_clears_user_profile_first() {
        let catalog = LocaleCatalog::builtin();
        let store = MockStore::default();
        let backup = MockBackup::default();

        let run = apply_locale(&catalog, "ru-RU", &ResetConfig::default(), &store, &backup)
            .unwrap();

        assert_eq!(
            *store.deletes.borrow(),
            vec![r"Control Panel\International\User Profile".to_string()]
        );
        assert_eq!(run.cleared.len(), 1);
    }

    #[test]
    fn clear_failure_is_only_a_warning() {
        let catalog = LocaleCatalog::builtin();
        let store = MockStore {
            fail_delete: true,
            ..MockStore::default()
        };
        let backup = MockBackup::default();

        let run = apply_locale(&catalog, "es-ES", &ResetConfig::default(), &store, &backup)
            .unwrap();

        assert!(run.is_success());
        assert!(run.cleared.is_empty());
        assert_eq!(run.warnings.len(), 1);
    }

    #[test]
    fn degraded_profile_is_applied_with_warning() {
        let catalog = LocaleCatalog::from_supported(&[SupportedLocale::minimal(
            "nl-NL",
            "Dutch (Netherlands)",
            176,
        )]);
        let store = MockStore::default();
        let backup = MockBackup::default();

        let run = apply_locale(&catalog, "nl-NL", &international_only(), &store, &backup).unwrap();

        assert!(run.degraded);
        assert_eq!(run.attempted, 4);
        assert!(run.is_success());
        assert_eq!(run.warnings.len(), 1);
    }

    #[test]
    fn empty_profile_trivially_succeeds() {
        let profile = LocaleProfile::new(
            LocaleId::parse("en-US").unwrap(),
            "English (United States)",
            Vec::new(),
            Vec::new(),
            false,
        );
        let store = MockStore::default();
        let backup = MockBackup::default();

        let run = apply_profile(&profile, &ResetConfig::default(), &store, &backup);

        assert!(run.is_success());
        assert_eq!(run.attempted, 0);
        assert_eq!(store.writes.get(), 0);
    }
}
