//! ログユーティリティ（tracing-subscriber の初期化と既定の出力先）

use chrono::Local;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub const LOG_FILE_PREFIX: &str = "RegionalSettings";

/// `RegionalSettings_<YYYYMMDD_HHMMSS>.log`
pub fn log_file_name(timestamp: &str) -> String {
    format!("{}_{}.log", LOG_FILE_PREFIX, timestamp)
}

/// ログファイルの既定出力先（テンポラリディレクトリ）
pub fn default_log_path() -> PathBuf {
    let ts = Local::now().format("%Y%m%d_%H%M%S").to_string();
    std::env::temp_dir().join(log_file_name(&ts))
}

/// 指定された出力先のうち、開けた最初の場所を返す
pub fn open_first_writable(paths: &[PathBuf]) -> Option<(PathBuf, File)> {
    for path in paths {
        if let Some(dir) = path.parent() {
            let _ = std::fs::create_dir_all(dir);
        }
        if let Ok(file) = OpenOptions::new().create(true).append(true).open(path) {
            return Some((path.clone(), file));
        }
    }
    None
}

/// tracing を初期化する。
///
/// フィルタは `RUST_LOG` が優先、なければ `default_level`。
/// 端末（stderr）には警告以上のみ（`verbose` なら全て）。ログファイルは開けなければ省略。
/// 実際に書き込むログファイルのパスを返す。
pub fn init_logging(log_path: Option<&Path>, default_level: &str, verbose: bool) -> Option<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(path) = log_path {
        candidates.push(path.to_path_buf());
    }
    candidates.push(default_log_path());
    let opened = open_first_writable(&candidates);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let console_level = if verbose {
        LevelFilter::TRACE
    } else {
        LevelFilter::WARN
    };
    let console = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(console_level);

    let (path, file_layer) = match opened {
        Some((path, file)) => (
            Some(path),
            Some(
                fmt::layer()
                    .with_writer(Mutex::new(file))
                    .with_ansi(false)
                    .with_target(false),
            ),
        ),
        None => (None, None),
    };

    // 二重初期化（テスト等）は無視
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file_layer)
        .try_init();
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn log_file_name_uses_prefix() {
        assert_eq!(
            log_file_name("20261019_120000"),
            "RegionalSettings_20261019_120000.log"
        );
    }

    #[test]
    fn default_log_path_is_in_temp_dir() {
        let path = default_log_path();
        assert_eq!(path.parent(), Some(std::env::temp_dir().as_path()));
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("RegionalSettings_"));
        assert!(name.ends_with(".log"));
    }

    #[test]
    fn open_first_writable_skips_unusable_paths() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "file, not a directory").unwrap();
        let bad = blocker.join("nested").join("app.log");
        let good = dir.path().join("logs").join("app.log");

        let (chosen, _file) = open_first_writable(&[bad, good.clone()]).unwrap();

        assert_eq!(chosen, good);
        assert!(good.exists());
    }
}
