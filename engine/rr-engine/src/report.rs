//! 実行結果の集計（純粋な射影）

use rr_domain::model::{ApplicationRun, OutcomeStatus};
use std::fmt;

/// レポート表示用の要約
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub locale: String,
    pub display_name: String,
    pub simulated: bool,
    pub degraded: bool,
    pub attempted: u32,
    pub succeeded: u32,
    pub failed: u32,
    /// succeeded / max(attempted, 1) * 100
    pub success_rate: f64,
    /// None は「作成されなかった」を意味する
    pub backup_location: Option<String>,
    pub failed_keys: Vec<String>,
    pub warnings: Vec<String>,
}

impl RunSummary {
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}

pub fn summarize(run: &ApplicationRun) -> RunSummary {
    RunSummary {
        locale: run.locale.to_string(),
        display_name: run.display_name.clone(),
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
        failed_keys: run
            .outcomes
            .iter()
            .filter(|o| o.status == OutcomeStatus::Failed)
            .map(|o| o.key_path.clone())
            .collect(),
        warnings: run.warnings.clone(),
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Locale:       {} ({})", self.locale, self.display_name)?;
        if self.simulated {
            writeln!(f, "Mode:         simulated (no changes written)")?;
        }
        if self.degraded {
            writeln!(f, "Profile:      minimal default")?;
        }
        writeln!(f, "Attempted:    {}", self.attempted)?;
        writeln!(f, "Succeeded:    {}", self.succeeded)?;
        writeln!(f, "Failed:       {}", self.failed)?;
        writeln!(f, "Success rate: {:.1}%", self.success_rate)?;
        match &self.backup_location {
            Some(path) => write!(f, "Backup:       {}", path)?,
            None => write!(f, "Backup:       None created")?,
        }
        for key in &self.failed_keys {
            write!(f, "\n  failed: {}", key)?;
        }
        Ok(())
    }
}
