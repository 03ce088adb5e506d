//! rr-cli: 地域設定（日付/時刻/通貨/数値書式）をサポート対象ロケールの既定値へ
//! リセットする CLI。一覧表示、現在値の確認、スナップショット一覧、設定ファイル作成も行う。

use clap::{Parser, Subcommand};
use rr_composition::cli::{CliOptions, CliRuntime};
use rr_composition::domain::model::{ApplicationRun, OutcomeStatus, exit_codes};
use rr_composition::error::{Result, err};
use rr_composition::{AppService, SnapshotInfo, summarize};
use serde::Serialize;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "rr-cli",
    version,
    about = "Reset Windows regional settings to a supported locale"
)]
struct Cli {
    /// 適用するロケール（省略時は設定ファイルの defaultLocale）
    #[arg(short, long)]
    locale: Option<String>,
    /// 確認なしで適用
    #[arg(short, long, default_value_t = false)]
    force: bool,
    /// 設定ファイル
    #[arg(short, long, global = true, default_value = "config.json")]
    config: PathBuf,
    /// ログファイル（省略時はテンポラリディレクトリ）
    #[arg(long, global = true)]
    log: Option<PathBuf>,
    /// 実ストアに触れずシミュレーションで実行
    #[arg(long, global = true, default_value_t = false)]
    dry_run: bool,
    /// JSON形式で出力
    #[arg(long, global = true, default_value_t = false)]
    json: bool,
    /// 端末にも詳細ログを出す
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// サポート対象ロケールの一覧
    List,
    /// 現在の地域設定を表示
    Status,
    /// 作成済みスナップショットの一覧
    Backups,
    /// 既定値で設定ファイルを作成
    InitConfig,
}

// ---------- JSON 出力 ----------

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonLocale<'a> {
    id: &'a str,
    display_name: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonCurrentSetting<'a> {
    name: &'a str,
    label: &'a str,
    value: Option<String>,
    error: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonSnapshot {
    path: String,
    created: String,
    files: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonOutcome<'a> {
    key_path: &'a str,
    value: String,
    kind: &'static str,
    attempts: u32,
    status: &'static str,
    message: Option<&'a str>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonRunReport<'a> {
    success: bool,
    locale: String,
    display_name: &'a str,
    simulated: bool,
    degraded: bool,
    attempted: u32,
    succeeded: u32,
    failed: u32,
    success_rate: f64,
    backup_location: Option<String>,
    outcomes: Vec<JsonOutcome<'a>>,
    warnings: &'a [String],
    log_file: Option<String>,
}

fn map_snapshot(info: &SnapshotInfo) -> JsonSnapshot {
    JsonSnapshot {
        path: info.path.display().to_string(),
        created: info.created.format("%Y-%m-%d %H:%M:%S").to_string(),
        files: info.files,
    }
}

fn map_run_report<'a>(run: &'a ApplicationRun, log_file: Option<String>) -> JsonRunReport<'a> {
    JsonRunReport {
        success: run.is_success(),
        locale: run.locale.to_string(),
        display_name: &run.display_name,
        simulated: run.simulated,
        degraded: run.degraded,
        attempted: run.attempted,
        succeeded: run.succeeded,
        failed: run.failed,
        success_rate: run.success_rate(),
        backup_location: run
            .backup_location
            .as_ref()
            .map(|p| p.display().to_string()),
        outcomes: run
            .outcomes
            .iter()
            .map(|o| JsonOutcome {
                key_path: &o.key_path,
                value: o.value.to_string(),
                kind: o.value.kind().as_str(),
                attempts: o.attempts,
                status: o.status.as_str(),
                message: o.message.as_deref(),
            })
            .collect(),
        warnings: &run.warnings,
        log_file,
    }
}

fn main() {
    match run() {
        Ok(code) => std::process::exit(i32::from(code)),
        Err(err) => {
            eprintln!("rr-cli failed: {err}");
            std::process::exit(i32::from(exit_codes::FAILURE));
        }
    }
}

fn run() -> Result<u8> {
    let cli = Cli::parse();

    // 一覧はストアも設定も不要
    if let Some(Command::List) = cli.command {
        print_locales(&AppService::new(), cli.json)?;
        return Ok(exit_codes::SUCCESS);
    }

    // 全依存関係はComposition Rootで組み立て
    let runtime = CliRuntime::new(&CliOptions {
        config_path: cli.config.clone(),
        log_path: cli.log.clone(),
        dry_run: cli.dry_run,
        verbose: cli.verbose,
        init_logging: true,
    });

    match cli.command {
        Some(Command::List) => Ok(exit_codes::SUCCESS),
        Some(Command::Status) => {
            print_status(&runtime, cli.json)?;
            Ok(exit_codes::SUCCESS)
        }
        Some(Command::Backups) => {
            let snapshots = runtime.list_snapshots()?;
            if cli.json {
                let body: Vec<JsonSnapshot> = snapshots.iter().map(map_snapshot).collect();
                println!("{}", serde_json::to_string_pretty(&body)?);
            } else if snapshots.is_empty() {
                println!("No backups found in {}", runtime.backup_dir().display());
            } else {
                println!("Backups in {}:", runtime.backup_dir().display());
                for s in &snapshots {
                    println!(
                        "  {}  {}  ({} file(s))",
                        s.created.format("%Y-%m-%d %H:%M:%S"),
                        s.path.display(),
                        s.files
                    );
                }
            }
            Ok(exit_codes::SUCCESS)
        }
        Some(Command::InitConfig) => {
            if runtime.init_config()? {
                println!("Configuration file created: {}", runtime.config_path().display());
            } else {
                println!(
                    "Configuration file already exists: {}",
                    runtime.config_path().display()
                );
            }
            Ok(exit_codes::SUCCESS)
        }
        None => apply(&runtime, cli.locale.as_deref(), cli.force, cli.json),
    }
}

fn apply(runtime: &CliRuntime, requested: Option<&str>, force: bool, json: bool) -> Result<u8> {
    let locale = runtime.target_locale(requested).to_string();

    let profile = match runtime.app().resolve(&locale) {
        Ok(profile) => profile,
        Err(e) => {
            eprintln!("{e}");
            eprintln!("Run `rr-cli list` to see supported locales.");
            return Ok(exit_codes::FAILURE);
        }
    };

    if !json {
        println!("Target locale: {} ({})", profile.id(), profile.display_name());
        if let Some(reason) = runtime.fallback_reason() {
            println!("Mode: simulated ({reason})");
        }
        if !runtime.is_elevated() {
            println!("Running without administrator rights (current-user settings only).");
        }
        if let Some(path) = runtime.log_file() {
            println!("Log file: {}", path.display());
        }
    }

    if !force && !confirm(&format!("Apply {} settings? (y/N): ", profile.id()))? {
        eprintln!("Cancelled; no settings were changed.");
        return Ok(exit_codes::FAILURE);
    }

    let result = runtime.apply_locale(&locale);
    let code = rr_composition::app::run_exit_code(&result);
    let run = result?;

    if json {
        let log_file = runtime.log_file().map(|p| p.display().to_string());
        println!(
            "{}",
            serde_json::to_string_pretty(&map_run_report(&run, log_file))?
        );
        return Ok(code);
    }

    for outcome in run
        .outcomes
        .iter()
        .filter(|o| o.status == OutcomeStatus::Failed)
    {
        println!(
            "  [FAILED] {} = {} ({} attempt(s)): {}",
            outcome.key_path,
            outcome.value,
            outcome.attempts,
            outcome.message.as_deref().unwrap_or("unknown error")
        );
    }
    for warning in &run.warnings {
        println!("  [WARNING] {warning}");
    }
    println!();
    println!("{}", summarize(&run));
    if run.is_success() {
        println!("\nRegional settings reset complete. Sign out and back in to apply everywhere.");
    }
    Ok(code)
}

fn print_locales(app: &AppService, json: bool) -> Result<()> {
    let locales = app.supported_locales();
    if json {
        let body: Vec<JsonLocale> = locales
            .iter()
            .map(|&(id, display_name)| JsonLocale { id, display_name })
            .collect();
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }
    println!("Supported locales:");
    for (id, name) in locales {
        println!("  {:<6} {}", id, name);
    }
    Ok(())
}

fn print_status(runtime: &CliRuntime, json: bool) -> Result<()> {
    let current = runtime.current_settings();
    if json {
        let body: Vec<JsonCurrentSetting> = current
            .iter()
            .map(|c| JsonCurrentSetting {
                name: c.name,
                label: c.label,
                value: c.value.as_ref().ok().and_then(|v| v.as_ref()).map(|v| v.to_string()),
                error: c.value.as_ref().err().map(|e| e.to_string()),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    println!("Current regional settings");
    if let Some(reason) = runtime.fallback_reason() {
        println!("[simulated] {reason}");
    }
    for c in &current {
        match &c.value {
            Ok(Some(value)) => println!("  {:<18} {}", format!("{}:", c.label), value),
            Ok(None) => println!("  {:<18} Not set", format!("{}:", c.label)),
            Err(e) => println!("  {:<18} <{}>", format!("{}:", c.label), e),
        }
    }
    Ok(())
}

/// stderr に問い合わせて y/Y のみ承諾とする
fn confirm(prompt: &str) -> Result<bool> {
    eprint!("{prompt}");
    io::stderr().flush()?;
    let mut line = String::new();
    let read = io::stdin().lock().read_line(&mut line)?;
    if read == 0 {
        return Err(err("No input available; use --force to apply without confirmation"));
    }
    Ok(matches!(line.trim(), "y" | "Y" | "yes" | "YES"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_apply_flags() {
        let cli = Cli::parse_from(["rr-cli", "--locale", "en-US", "--force", "--dry-run"]);
        assert_eq!(cli.locale.as_deref(), Some("en-US"));
        assert!(cli.force);
        assert!(cli.dry_run);
        assert!(cli.command.is_none());
        assert_eq!(cli.config, PathBuf::from("config.json"));
    }

    #[test]
    fn parses_subcommands_with_global_flags() {
        let cli = Cli::parse_from(["rr-cli", "backups", "--json", "--config", "custom.json"]);
        assert!(matches!(cli.command, Some(Command::Backups)));
        assert!(cli.json);
        assert_eq!(cli.config, PathBuf::from("custom.json"));

        let cli = Cli::parse_from(["rr-cli", "init-config"]);
        assert!(matches!(cli.command, Some(Command::InitConfig)));
    }
}
