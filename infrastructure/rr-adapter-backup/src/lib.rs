//! スナップショット（バックアップ）アダプター
//!
//! `reg export <subtree> <file> /y` でサブツリーを書き出す。
//! 1回の実行につき `<prefix>_<YYYYMMDD_HHMMSS>` ディレクトリを1つ作り、
//! ラベルごとに `<label>.reg` を置く。自動削除はしない。

use chrono::NaiveDateTime;
use rr_domain::DomainError;
use rr_domain::model::{BackupSettings, SettingsSubtree};
use rr_domain::port::driven::{BackupService, Clock};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::debug;

pub const SNAPSHOT_PREFIX: &str = "RegionalSettings_Backup";
pub const EXPORT_EXTENSION: &str = "reg";
const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const MAX_NAME_ATTEMPTS: u32 = 100;

/// スナップショットの保存先。customBackupPath が空ならテンポラリディレクトリ。
pub fn backup_root(settings: &BackupSettings) -> PathBuf {
    let custom = settings.custom_backup_path.trim();
    if custom.is_empty() {
        std::env::temp_dir()
    } else {
        PathBuf::from(custom)
    }
}

/// `reg export` によるスナップショット
#[derive(Debug)]
pub struct RegExportBackup<C: Clock> {
    base_dir: PathBuf,
    prefix: String,
    program: String,
    clock: C,
}

impl<C: Clock> RegExportBackup<C> {
    pub fn new(base_dir: impl AsRef<Path>, clock: C) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
            prefix: SNAPSHOT_PREFIX.into(),
            program: "reg".into(),
            clock,
        }
    }

    /// エクスポートに使うコマンド（既定: `reg`）
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// 実行ごとの新しいディレクトリを作る。同じ秒の既存ディレクトリは再利用せず、
    /// `_2`, `_3` ... を付けた名前で作り直す。
    fn create_run_dir(&self) -> Result<PathBuf, DomainError> {
        fs::create_dir_all(&self.base_dir).map_err(|e| {
            DomainError::BackupFailed(format!("create {}: {e}", self.base_dir.display()))
        })?;
        let stem = format!("{}_{}", self.prefix, self.clock.now_compact_local());
        for n in 1..=MAX_NAME_ATTEMPTS {
            let name = if n == 1 {
                stem.clone()
            } else {
                format!("{stem}_{n}")
            };
            let dir = self.base_dir.join(name);
            match fs::create_dir(&dir) {
                Ok(()) => return Ok(dir),
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
                Err(e) => {
                    return Err(DomainError::BackupFailed(format!(
                        "create {}: {e}",
                        dir.display()
                    )));
                }
            }
        }
        Err(DomainError::BackupFailed(format!(
            "no free snapshot directory name for {stem} in {}",
            self.base_dir.display()
        )))
    }

    fn run_export(&self, subtree: &SettingsSubtree, file: &Path) -> Result<(), DomainError> {
        let output = Command::new(&self.program)
            .arg("export")
            .arg(subtree.to_string())
            .arg(file)
            .arg("/y")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| DomainError::BackupFailed(format!("{}: {e}", self.program)))?;

        if output.status.success() {
            return Ok(());
        }
        let stderr = String::from_utf8_lossy(&output.stderr);
        Err(DomainError::BackupFailed(format!(
            "export of {} exited with code {}{}",
            subtree,
            output.status.code().unwrap_or(-1),
            if stderr.trim().is_empty() {
                String::new()
            } else {
                format!(": {}", stderr.trim())
            }
        )))
    }
}

impl<C: Clock> BackupService for RegExportBackup<C> {
    fn snapshot(
        &self,
        run_dir: &mut Option<PathBuf>,
        subtree: &SettingsSubtree,
        label: &str,
    ) -> Result<PathBuf, DomainError> {
        // 同じ実行の2回目以降は既存ディレクトリを使う
        let (dir, created) = match run_dir {
            Some(dir) => (dir.clone(), false),
            None => (self.create_run_dir()?, true),
        };

        let file = dir.join(format!("{}.{}", file_stem(label), EXPORT_EXTENSION));
        if let Err(err) = self.run_export(subtree, &file) {
            if created {
                let _ = fs::remove_dir_all(&dir);
            }
            return Err(err);
        }

        debug!(file = %file.display(), "exported {}", subtree);
        *run_dir = Some(dir);
        Ok(file)
    }
}

/// シミュレーション時のバックアップ（常に利用不可）
#[derive(Debug, Clone)]
pub struct UnavailableBackup {
    reason: String,
}

impl UnavailableBackup {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl BackupService for UnavailableBackup {
    fn snapshot(
        &self,
        _run_dir: &mut Option<PathBuf>,
        _subtree: &SettingsSubtree,
        _label: &str,
    ) -> Result<PathBuf, DomainError> {
        Err(DomainError::BackupUnavailable(self.reason.clone()))
    }
}

/// 既存スナップショットの情報
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotInfo {
    pub path: PathBuf,
    pub created: NaiveDateTime,
    /// `.reg` ファイル数
    pub files: usize,
}

/// `dir` 直下のスナップショットを新しい順に列挙する（一覧のみ、削除はしない）
pub fn list_snapshots(dir: &Path) -> Result<Vec<SnapshotInfo>, DomainError> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(DomainError::IoError(format!("read_dir {}: {e}", dir.display()))),
    };

    let mut snapshots = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let Some(created) = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(parse_snapshot_name)
        else {
            continue;
        };
        let files = fs::read_dir(&path)
            .map(|it| {
                it.flatten()
                    .filter(|e| {
                        e.path().extension().and_then(|x| x.to_str()) == Some(EXPORT_EXTENSION)
                    })
                    .count()
            })
            .unwrap_or(0);
        snapshots.push(SnapshotInfo {
            path,
            created,
            files,
        });
    }
    snapshots.sort_by(|a, b| b.created.cmp(&a.created));
    Ok(snapshots)
}

/// `<prefix>_<YYYYMMDD_HHMMSS>` または同じ秒の2個目以降 `..._<n>`
fn parse_snapshot_name(name: &str) -> Option<NaiveDateTime> {
    let rest = name.strip_prefix(SNAPSHOT_PREFIX)?.strip_prefix('_')?;
    // タイムスタンプ部は固定長（15文字）
    let ts = rest.get(..15)?;
    let suffix = rest.get(15..)?;
    if !suffix.is_empty() {
        let n = suffix.strip_prefix('_')?;
        if n.is_empty() || !n.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
    }
    NaiveDateTime::parse_from_str(ts, TIMESTAMP_FORMAT).ok()
}

/// ラベルをファイル名に使える形へ
fn file_stem(label: &str) -> String {
    let stem: String = label
        .trim()
        .chars()
        .map(|c| match c {
            '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c => c,
        })
        .collect();
    if stem.is_empty() {
        "snapshot".into()
    } else {
        stem
    }
}
