//! 設定ストアアダプター
//!
//! HKCU の地域設定（Control Panel\International 等）を読み書きする実ストアと、
//! 何も変更しないシミュレーションストアを提供する。
//! どちらを使うかは起動時に一度だけ能力判定で決める。

mod live;
mod simulated;

pub use live::LiveRegistryStore;
pub use simulated::SimulatedStore;

use rr_domain::model::SettingsSubtree;
use rr_domain::port::driven::SettingsStore;
use tracing::warn;

/// 起動時に選ばれたストア
pub struct SelectedStore {
    pub store: Box<dyn SettingsStore>,
    /// シミュレーションへ切り替えた理由（実ストアなら None）
    pub fallback_reason: Option<String>,
}

impl SelectedStore {
    pub fn is_simulated(&self) -> bool {
        self.store.is_simulated()
    }
}

/// ストアを選ぶ。`force_simulated`（ドライラン）または実ストアが開けなければシミュレーション。
pub fn select_store(force_simulated: bool) -> SelectedStore {
    if force_simulated {
        return SelectedStore {
            store: Box::new(SimulatedStore::new()),
            fallback_reason: Some("dry run requested".into()),
        };
    }

    let live = LiveRegistryStore::new();
    match live.probe(&SettingsSubtree::international()) {
        Ok(()) => SelectedStore {
            store: Box::new(live),
            fallback_reason: None,
        },
        Err(err) => {
            warn!("Settings store unavailable, using simulated store: {}", err);
            SelectedStore {
                store: Box::new(SimulatedStore::new()),
                fallback_reason: Some(err.to_string()),
            }
        }
    }
}

/// 管理者権限（昇格済みトークン）で実行中か。HKCU のみ扱うため必須ではない。
pub fn is_elevated() -> bool {
    #[cfg(windows)]
    {
        windows_admin::check_elevated()
    }
    #[cfg(not(windows))]
    {
        false
    }
}

#[cfg(windows)]
mod windows_admin {
    use windows::Win32::Foundation::{CloseHandle, HANDLE};
    use windows::Win32::Security::{
        GetTokenInformation, TOKEN_ELEVATION, TOKEN_QUERY, TokenElevation,
    };
    use windows::Win32::System::Threading::{GetCurrentProcess, OpenProcessToken};

    pub fn check_elevated() -> bool {
        unsafe {
            let mut token = HANDLE::default();
            if OpenProcessToken(GetCurrentProcess(), TOKEN_QUERY, &mut token).is_err() {
                return false;
            }
            let mut elevation = TOKEN_ELEVATION::default();
            let mut return_length = 0u32;
            let result = GetTokenInformation(
                token,
                TokenElevation,
                Some(&mut elevation as *mut _ as *mut _),
                std::mem::size_of::<TOKEN_ELEVATION>() as u32,
                &mut return_length,
            );
            let _ = CloseHandle(token);
            result.is_ok() && elevation.TokenIsElevated != 0
        }
    }
}
