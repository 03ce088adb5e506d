//! 設定ストア内の位置（ルートハンドル + 階層パス）

use std::fmt;

/// ルートハンドル
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RootKey {
    CurrentUser,
    LocalMachine,
}

impl RootKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            RootKey::CurrentUser => "HKEY_CURRENT_USER",
            RootKey::LocalMachine => "HKEY_LOCAL_MACHINE",
        }
    }
}

pub const INTERNATIONAL_PATH: &str = r"Control Panel\International";
pub const GEO_PATH: &str = r"Control Panel\International\Geo";
pub const USER_PROFILE_PATH: &str = r"Control Panel\International\User Profile";
pub const IE_INTERNATIONAL_PATH: &str = r"Software\Microsoft\Internet Explorer\International";
pub const IE_MAIN_INTERNATIONAL_PATH: &str =
    r"Software\Microsoft\Internet Explorer\Main\International";

/// バックアップ単位かつ書き込み先のコンテナ
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SettingsSubtree {
    root: RootKey,
    path: String,
}

impl SettingsSubtree {
    pub fn new(root: RootKey, path: impl Into<String>) -> Self {
        Self {
            root,
            path: path.into(),
        }
    }

    pub fn current_user(path: impl Into<String>) -> Self {
        Self::new(RootKey::CurrentUser, path)
    }

    /// `HKCU\Control Panel\International`
    pub fn international() -> Self {
        Self::current_user(INTERNATIONAL_PATH)
    }

    pub fn root(&self) -> RootKey {
        self.root
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// 値の完全パス（ログ/結果表示用）
    pub fn key_path(&self, name: &str) -> String {
        format!("{}\\{}", self.path, name)
    }
}

impl fmt::Display for SettingsSubtree {
    /// `reg export` にそのまま渡せる形式
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\\{}", self.root.as_str(), self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_root() {
        assert_eq!(
            SettingsSubtree::international().to_string(),
            r"HKEY_CURRENT_USER\Control Panel\International"
        );
    }

    #[test]
    fn key_path_joins_with_backslash() {
        assert_eq!(
            SettingsSubtree::international().key_path("sCurrency"),
            r"Control Panel\International\sCurrency"
        );
    }
}
