//! ロケールプロファイル
//!
//! ロケールごとの不変な設定セット。グループ単位で書き込み先サブツリーを持ち、
//! グループ内のキー順序がそのまま適用順序になる。

use super::{FeatureToggles, LocaleId, SettingValue, SettingsSubtree};

/// 設定名と値の組
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingEntry {
    pub name: String,
    pub value: SettingValue,
}

impl SettingEntry {
    pub fn new(name: impl Into<String>, value: SettingValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// 設定グループの種別（機能トグルとの対応付けに使う）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKind {
    /// 日付/時刻/通貨/区切り文字（常に適用）
    International,
    /// 国/地域（resetSystemLocale）
    Geo,
    /// ブラウザの言語（resetBrowserSettings）
    Browser,
}

impl GroupKind {
    pub fn is_enabled(&self, features: &FeatureToggles) -> bool {
        match self {
            GroupKind::International => true,
            GroupKind::Geo => features.reset_system_locale,
            GroupKind::Browser => features.reset_browser_settings,
        }
    }
}

/// 1つのサブツリーへ書き込む設定の並び
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingGroup {
    pub kind: GroupKind,
    pub subtree: SettingsSubtree,
    pub entries: Vec<SettingEntry>,
}

/// ロケールプロファイル（起動時に構築、以後不変）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleProfile {
    id: LocaleId,
    display_name: String,
    groups: Vec<SettingGroup>,
    /// 書き込み前に削除するサブツリー（resetWindows11Memory）
    clear_subtrees: Vec<SettingsSubtree>,
    /// 明示テーブルがなく既定値から機械的に導出したか
    degraded: bool,
}

impl LocaleProfile {
    pub fn new(
        id: LocaleId,
        display_name: impl Into<String>,
        groups: Vec<SettingGroup>,
        clear_subtrees: Vec<SettingsSubtree>,
        degraded: bool,
    ) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            groups,
            clear_subtrees,
            degraded,
        }
    }

    pub fn id(&self) -> &LocaleId {
        &self.id
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn groups(&self) -> &[SettingGroup] {
        &self.groups
    }

    pub fn clear_subtrees(&self) -> &[SettingsSubtree] {
        &self.clear_subtrees
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// 適用順の (サブツリー, 設定) 列
    pub fn entries(&self) -> impl Iterator<Item = (&SettingsSubtree, &SettingEntry)> {
        self.groups
            .iter()
            .flat_map(|g| g.entries.iter().map(move |e| (&g.subtree, e)))
    }

    pub fn key_count(&self) -> usize {
        self.groups.iter().map(|g| g.entries.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.key_count() == 0 && self.clear_subtrees.is_empty()
    }

    /// International グループの値を名前で引く
    pub fn get(&self, name: &str) -> Option<&SettingValue> {
        self.groups
            .iter()
            .filter(|g| g.kind == GroupKind::International)
            .flat_map(|g| g.entries.iter())
            .find(|e| e.name == name)
            .map(|e| &e.value)
    }

    /// 機能トグルで無効なグループを除いたプロファイル
    pub fn filtered(&self, features: &FeatureToggles) -> LocaleProfile {
        let groups = self
            .groups
            .iter()
            .filter(|g| g.kind.is_enabled(features))
            .cloned()
            .collect();
        let clear_subtrees = if features.reset_windows11_memory {
            self.clear_subtrees.clone()
        } else {
            Vec::new()
        };
        LocaleProfile {
            id: self.id.clone(),
            display_name: self.display_name.clone(),
            groups,
            clear_subtrees,
            degraded: self.degraded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{GEO_PATH, USER_PROFILE_PATH};

    fn sample() -> LocaleProfile {
        LocaleProfile::new(
            LocaleId::parse("pl-PL").unwrap(),
            "Polish (Poland)",
            vec![
                SettingGroup {
                    kind: GroupKind::International,
                    subtree: SettingsSubtree::international(),
                    entries: vec![
                        SettingEntry::new("Locale", SettingValue::text("pl-PL")),
                        SettingEntry::new("iCountry", SettingValue::Integer(48)),
                    ],
                },
                SettingGroup {
                    kind: GroupKind::Geo,
                    subtree: SettingsSubtree::current_user(GEO_PATH),
                    entries: vec![SettingEntry::new("Nation", SettingValue::text("191"))],
                },
            ],
            vec![SettingsSubtree::current_user(USER_PROFILE_PATH)],
            false,
        )
    }

    #[test]
    fn entries_follow_group_order() {
        let profile = sample();
        let names: Vec<&str> = profile.entries().map(|(_, e)| e.name.as_str()).collect();
        assert_eq!(names, vec!["Locale", "iCountry", "Nation"]);
        assert_eq!(profile.key_count(), 3);
    }

    #[test]
    fn get_only_looks_at_international_group() {
        let profile = sample();
        assert_eq!(profile.get("iCountry"), Some(&SettingValue::Integer(48)));
        assert_eq!(profile.get("Nation"), None);
    }

    #[test]
    fn filtered_drops_disabled_groups_and_clears() {
        let profile = sample().filtered(&FeatureToggles::international_only());
        assert_eq!(profile.key_count(), 2);
        assert!(profile.clear_subtrees().is_empty());
        assert_eq!(profile.id().as_str(), "pl-PL");
    }

    #[test]
    fn filtered_keeps_everything_when_all_enabled() {
        let profile = sample();
        assert_eq!(profile.filtered(&FeatureToggles::all()), profile);
    }
}
