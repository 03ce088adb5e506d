//! Windowsレジストリストア
//!
//! 書き込みはキーを必要に応じて作成し、値を設定した後に同じハンドルで読み戻して比較する。
//! 不一致は [`DomainError::VerificationFailed`]。

use rr_domain::DomainError;
use rr_domain::model::{SettingValue, SettingsSubtree};
use rr_domain::port::driven::SettingsStore;

/// HKCU 等の実レジストリ
#[derive(Debug, Default, Clone)]
pub struct LiveRegistryStore;

impl LiveRegistryStore {
    pub fn new() -> Self {
        Self
    }

    /// 対象サブツリーを読み書き可能で開けるか確認する（起動時の能力判定）
    pub fn probe(&self, subtree: &SettingsSubtree) -> Result<(), DomainError> {
        probe_impl(subtree)
    }
}

impl SettingsStore for LiveRegistryStore {
    fn write(
        &self,
        subtree: &SettingsSubtree,
        name: &str,
        value: &SettingValue,
    ) -> Result<(), DomainError> {
        write_impl(subtree, name, value)
    }

    fn read(
        &self,
        subtree: &SettingsSubtree,
        name: &str,
    ) -> Result<Option<SettingValue>, DomainError> {
        read_impl(subtree, name)
    }

    fn delete_subtree(&self, subtree: &SettingsSubtree) -> Result<(), DomainError> {
        delete_subtree_impl(subtree)
    }
}

#[cfg(not(windows))]
fn unsupported() -> DomainError {
    DomainError::StoreUnavailable("Windows registry is not available on this platform".into())
}

#[cfg(not(windows))]
fn probe_impl(_subtree: &SettingsSubtree) -> Result<(), DomainError> {
    Err(unsupported())
}

#[cfg(not(windows))]
fn write_impl(
    _subtree: &SettingsSubtree,
    _name: &str,
    _value: &SettingValue,
) -> Result<(), DomainError> {
    Err(unsupported())
}

#[cfg(not(windows))]
fn read_impl(_subtree: &SettingsSubtree, _name: &str) -> Result<Option<SettingValue>, DomainError> {
    Err(unsupported())
}

#[cfg(not(windows))]
fn delete_subtree_impl(_subtree: &SettingsSubtree) -> Result<(), DomainError> {
    Err(unsupported())
}

#[cfg(windows)]
use windows_impl::{delete_subtree_impl, probe_impl, read_impl, write_impl};

#[cfg(windows)]
mod windows_impl {
    use super::*;
    use rr_domain::model::RootKey;
    use tracing::debug;
    use windows::Win32::Foundation::{
        ERROR_ACCESS_DENIED, ERROR_FILE_NOT_FOUND, ERROR_PATH_NOT_FOUND, ERROR_SUCCESS,
        WIN32_ERROR,
    };
    use windows::Win32::System::Registry::{
        HKEY, HKEY_CURRENT_USER, HKEY_LOCAL_MACHINE, KEY_QUERY_VALUE, KEY_SET_VALUE,
        REG_DWORD, REG_OPTION_NON_VOLATILE, REG_SAM_FLAGS, REG_SZ, REG_VALUE_TYPE,
        RRF_RT_REG_DWORD, RRF_RT_REG_SZ, RegCloseKey, RegCreateKeyExW, RegDeleteKeyW,
        RegDeleteTreeW, RegGetValueW, RegOpenKeyExW, RegSetValueExW,
    };
    use windows::core::PCWSTR;

    /// 閉じ忘れ防止のキーハンドル
    struct OwnedKey(HKEY);

    impl Drop for OwnedKey {
        fn drop(&mut self) {
            let _ = unsafe { RegCloseKey(self.0) };
        }
    }

    pub(super) fn probe_impl(subtree: &SettingsSubtree) -> Result<(), DomainError> {
        open_existing(subtree, KEY_QUERY_VALUE | KEY_SET_VALUE).map(|_| ())
    }

    pub(super) fn write_impl(
        subtree: &SettingsSubtree,
        name: &str,
        value: &SettingValue,
    ) -> Result<(), DomainError> {
        let key = open_or_create(subtree)?;
        let wide_name = to_wide(name); // API呼び出し中にVecを生存させる
        let status = match value {
            SettingValue::Text(text) => {
                let data = to_wide(text);
                unsafe {
                    RegSetValueExW(
                        key.0,
                        PCWSTR(wide_name.as_ptr()),
                        Some(0),
                        REG_SZ,
                        Some(std::slice::from_raw_parts(
                            data.as_ptr() as *const u8,
                            data.len() * 2,
                        )),
                    )
                }
            }
            SettingValue::Integer(number) => {
                let data = number.to_le_bytes();
                unsafe {
                    RegSetValueExW(
                        key.0,
                        PCWSTR(wide_name.as_ptr()),
                        Some(0),
                        REG_DWORD,
                        Some(&data),
                    )
                }
            }
        };
        if status != ERROR_SUCCESS {
            return Err(map_win32_error(status, &subtree.key_path(name)));
        }

        // 読み戻し検証
        let actual = read_value(&key, name, subtree)?;
        if actual.as_ref() != Some(value) {
            return Err(DomainError::VerificationFailed {
                key: subtree.key_path(name),
                expected: value.to_string(),
                actual: actual.map(|v| v.to_string()),
            });
        }
        debug!(key = %subtree.key_path(name), "verified");
        Ok(())
    }

    pub(super) fn read_impl(
        subtree: &SettingsSubtree,
        name: &str,
    ) -> Result<Option<SettingValue>, DomainError> {
        let key = match open_existing(subtree, KEY_QUERY_VALUE) {
            Ok(key) => key,
            Err(DomainError::StoreUnavailable(_)) if !key_exists(subtree) => return Ok(None),
            Err(e) => return Err(e),
        };
        read_value(&key, name, subtree)
    }

    pub(super) fn delete_subtree_impl(subtree: &SettingsSubtree) -> Result<(), DomainError> {
        let path = to_wide(subtree.path());
        let root = root_handle(subtree.root());
        // 存在しない場合は削除済みとして扱う
        let status = unsafe { RegDeleteTreeW(root, PCWSTR(path.as_ptr())) };
        if status != ERROR_SUCCESS
            && status != ERROR_FILE_NOT_FOUND
            && status != ERROR_PATH_NOT_FOUND
        {
            return Err(map_win32_error(status, &subtree.to_string()));
        }
        let status = unsafe { RegDeleteKeyW(root, PCWSTR(path.as_ptr())) };
        if status != ERROR_SUCCESS
            && status != ERROR_FILE_NOT_FOUND
            && status != ERROR_PATH_NOT_FOUND
        {
            return Err(map_win32_error(status, &subtree.to_string()));
        }
        Ok(())
    }

    fn read_value(
        key: &OwnedKey,
        name: &str,
        subtree: &SettingsSubtree,
    ) -> Result<Option<SettingValue>, DomainError> {
        let wide_name = to_wide(name);
        let mut value_type = REG_VALUE_TYPE(0);
        let mut size_bytes: u32 = 0;
        let status = unsafe {
            RegGetValueW(
                key.0,
                PCWSTR::null(),
                PCWSTR(wide_name.as_ptr()),
                RRF_RT_REG_SZ | RRF_RT_REG_DWORD,
                Some(&mut value_type),
                None,
                Some(&mut size_bytes),
            )
        };
        if status == ERROR_FILE_NOT_FOUND {
            return Ok(None);
        }
        if status != ERROR_SUCCESS {
            return Err(map_win32_error(status, &subtree.key_path(name)));
        }

        if value_type == REG_DWORD {
            let mut number: u32 = 0;
            let mut size = std::mem::size_of::<u32>() as u32;
            let status = unsafe {
                RegGetValueW(
                    key.0,
                    PCWSTR::null(),
                    PCWSTR(wide_name.as_ptr()),
                    RRF_RT_REG_DWORD,
                    None,
                    Some(&mut number as *mut u32 as *mut _),
                    Some(&mut size),
                )
            };
            if status != ERROR_SUCCESS {
                return Err(map_win32_error(status, &subtree.key_path(name)));
            }
            return Ok(Some(SettingValue::Integer(number)));
        }

        let mut buffer: Vec<u16> = vec![0u16; (size_bytes as usize / 2).max(1)];
        let status = unsafe {
            RegGetValueW(
                key.0,
                PCWSTR::null(),
                PCWSTR(wide_name.as_ptr()),
                RRF_RT_REG_SZ,
                None,
                Some(buffer.as_mut_ptr() as *mut _),
                Some(&mut size_bytes),
            )
        };
        if status != ERROR_SUCCESS {
            return Err(map_win32_error(status, &subtree.key_path(name)));
        }
        // size_bytesは終端nullを含む
        let char_len = (size_bytes as usize / 2).saturating_sub(1);
        buffer.truncate(char_len);
        Ok(Some(SettingValue::Text(String::from_utf16_lossy(&buffer))))
    }

    fn open_or_create(subtree: &SettingsSubtree) -> Result<OwnedKey, DomainError> {
        let wide_path = to_wide(subtree.path());
        let mut key: HKEY = HKEY::default();
        let status = unsafe {
            RegCreateKeyExW(
                root_handle(subtree.root()),
                PCWSTR(wide_path.as_ptr()),
                Some(0),
                None,
                REG_OPTION_NON_VOLATILE,
                KEY_SET_VALUE | KEY_QUERY_VALUE,
                None,
                &mut key,
                None,
            )
        };
        if status != ERROR_SUCCESS {
            return Err(map_win32_error(status, &subtree.to_string()));
        }
        Ok(OwnedKey(key))
    }

    fn open_existing(subtree: &SettingsSubtree, sam: REG_SAM_FLAGS) -> Result<OwnedKey, DomainError> {
        let wide_path = to_wide(subtree.path());
        let mut key: HKEY = HKEY::default();
        let status = unsafe {
            RegOpenKeyExW(
                root_handle(subtree.root()),
                PCWSTR(wide_path.as_ptr()),
                Some(0),
                sam,
                &mut key,
            )
        };
        if status != ERROR_SUCCESS {
            return Err(map_win32_error(status, &subtree.to_string()));
        }
        Ok(OwnedKey(key))
    }

    fn key_exists(subtree: &SettingsSubtree) -> bool {
        let wide_path = to_wide(subtree.path());
        let mut key: HKEY = HKEY::default();
        let status = unsafe {
            RegOpenKeyExW(
                root_handle(subtree.root()),
                PCWSTR(wide_path.as_ptr()),
                Some(0),
                KEY_QUERY_VALUE,
                &mut key,
            )
        };
        if status == ERROR_SUCCESS {
            drop(OwnedKey(key));
            return true;
        }
        status != ERROR_FILE_NOT_FOUND && status != ERROR_PATH_NOT_FOUND
    }

    fn root_handle(root: RootKey) -> HKEY {
        match root {
            RootKey::CurrentUser => HKEY_CURRENT_USER,
            RootKey::LocalMachine => HKEY_LOCAL_MACHINE,
        }
    }

    fn to_wide(s: &str) -> Vec<u16> {
        let mut wide: Vec<u16> = s.encode_utf16().collect();
        wide.push(0);
        wide
    }

    fn map_win32_error(status: WIN32_ERROR, target: &str) -> DomainError {
        if status == ERROR_ACCESS_DENIED {
            return DomainError::StoreAccessDenied(format!("Access denied for {}", target));
        }
        if status == ERROR_FILE_NOT_FOUND || status == ERROR_PATH_NOT_FOUND {
            return DomainError::StoreUnavailable(format!(
                "Registry entry not found for {}: status={}",
                target, status.0
            ));
        }
        DomainError::StoreUnavailable(format!(
            "Registry error for {}: status={}",
            target, status.0
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(not(windows))]
    mod non_windows {
        use super::*;

        #[test]
        fn live_store_reports_unavailable() {
            let store = LiveRegistryStore::new();
            let intl = SettingsSubtree::international();
            assert!(matches!(
                store.probe(&intl),
                Err(DomainError::StoreUnavailable(_))
            ));
            assert!(matches!(
                store.write(&intl, "sList", &SettingValue::text(";")),
                Err(DomainError::StoreUnavailable(_))
            ));
            assert!(!store.is_simulated());
        }
    }
}
