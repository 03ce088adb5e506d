//! ロケールカタログ
//!
//! ロケール識別子 → 表示名と設定セットの静的な対応表。
//! 起動時に全プロファイルを構築し、以後は参照のみ（キャッシュ不要）。

use crate::DomainError;
use crate::model::{
    GEO_PATH, GroupKind, IE_INTERNATIONAL_PATH, IE_MAIN_INTERNATIONAL_PATH, LocaleId,
    LocaleProfile, SettingEntry, SettingGroup, SettingValue, SettingsSubtree, USER_PROFILE_PATH,
};

/// International サブツリーの手作業テーブル
#[derive(Debug, Clone, Copy)]
struct FormatTable {
    language: &'static str,
    country: &'static str,
    short_date: &'static str,
    long_date: &'static str,
    time_format: &'static str,
    short_time: &'static str,
    currency: &'static str,
    decimal: &'static str,
    thousand: &'static str,
    list: &'static str,
    country_code: u32,
    currency_pattern: u32,
    currency_digits: u32,
    date_order: u32,
    time_24h: u32,
    am: &'static str,
    pm: &'static str,
}

/// サポート対象ロケール
#[derive(Debug, Clone, Copy)]
pub struct SupportedLocale {
    pub id: &'static str,
    pub display_name: &'static str,
    /// Windows GeoID
    pub geo_id: u32,
    table: Option<FormatTable>,
}

impl SupportedLocale {
    /// 書式テーブルを持たないロケール（縮退プロファイルで適用される）
    pub const fn minimal(id: &'static str, display_name: &'static str, geo_id: u32) -> Self {
        Self {
            id,
            display_name,
            geo_id,
            table: None,
        }
    }

    pub fn has_table(&self) -> bool {
        self.table.is_some()
    }
}

/// サポート対象（表示順）
pub const SUPPORTED_LOCALES: &[SupportedLocale] = &[
    SupportedLocale {
        id: "pl-PL",
        display_name: "Polish (Poland)",
        geo_id: 191,
        table: Some(FormatTable {
            language: "PLK",
            country: "Poland",
            short_date: "dd.MM.yyyy",
            long_date: "d MMMM yyyy",
            time_format: "HH:mm:ss",
            short_time: "HH:mm",
            currency: "zł",
            decimal: ",",
            thousand: " ",
            list: ";",
            country_code: 48,
            currency_pattern: 3,
            currency_digits: 2,
            date_order: 1,
            time_24h: 1,
            am: "",
            pm: "",
        }),
    },
    SupportedLocale {
        id: "en-US",
        display_name: "English (United States)",
        geo_id: 244,
        table: Some(FormatTable {
            language: "ENU",
            country: "United States",
            short_date: "M/d/yyyy",
            long_date: "dddd, MMMM d, yyyy",
            time_format: "h:mm:ss tt",
            short_time: "h:mm tt",
            currency: "$",
            decimal: ".",
            thousand: ",",
            list: ",",
            country_code: 1,
            currency_pattern: 0,
            currency_digits: 2,
            date_order: 0,
            time_24h: 0,
            am: "AM",
            pm: "PM",
        }),
    },
    SupportedLocale {
        id: "en-GB",
        display_name: "English (United Kingdom)",
        geo_id: 242,
        table: Some(FormatTable {
            language: "ENG",
            country: "United Kingdom",
            short_date: "dd/MM/yyyy",
            long_date: "dddd, d MMMM yyyy",
            time_format: "HH:mm:ss",
            short_time: "HH:mm",
            currency: "£",
            decimal: ".",
            thousand: ",",
            list: ",",
            country_code: 44,
            currency_pattern: 0,
            currency_digits: 2,
            date_order: 1,
            time_24h: 1,
            am: "AM",
            pm: "PM",
        }),
    },
    SupportedLocale {
        id: "de-DE",
        display_name: "German (Germany)",
        geo_id: 94,
        table: Some(FormatTable {
            language: "DEU",
            country: "Germany",
            short_date: "dd.MM.yyyy",
            long_date: "dddd, d. MMMM yyyy",
            time_format: "HH:mm:ss",
            short_time: "HH:mm",
            currency: "€",
            decimal: ",",
            thousand: ".",
            list: ";",
            country_code: 49,
            currency_pattern: 3,
            currency_digits: 2,
            date_order: 1,
            time_24h: 1,
            am: "",
            pm: "",
        }),
    },
    SupportedLocale {
        id: "fr-FR",
        display_name: "French (France)",
        geo_id: 84,
        table: Some(FormatTable {
            language: "FRA",
            country: "France",
            short_date: "dd/MM/yyyy",
            long_date: "dddd d MMMM yyyy",
            time_format: "HH:mm:ss",
            short_time: "HH:mm",
            currency: "€",
            decimal: ",",
            thousand: " ",
            list: ";",
            country_code: 33,
            currency_pattern: 3,
            currency_digits: 2,
            date_order: 1,
            time_24h: 1,
            am: "",
            pm: "",
        }),
    },
    SupportedLocale {
        id: "es-ES",
        display_name: "Spanish (Spain)",
        geo_id: 217,
        table: Some(FormatTable {
            language: "ESP",
            country: "Spain",
            short_date: "dd/MM/yyyy",
            long_date: "dddd, d MMMM yyyy",
            time_format: "HH:mm:ss",
            short_time: "HH:mm",
            currency: "€",
            decimal: ",",
            thousand: ".",
            list: ";",
            country_code: 34,
            currency_pattern: 3,
            currency_digits: 2,
            date_order: 1,
            time_24h: 1,
            am: "",
            pm: "",
        }),
    },
    SupportedLocale {
        id: "it-IT",
        display_name: "Italian (Italy)",
        geo_id: 118,
        table: Some(FormatTable {
            language: "ITA",
            country: "Italy",
            short_date: "dd/MM/yyyy",
            long_date: "dddd d MMMM yyyy",
            time_format: "HH:mm:ss",
            short_time: "HH:mm",
            currency: "€",
            decimal: ",",
            thousand: ".",
            list: ";",
            country_code: 39,
            currency_pattern: 2,
            currency_digits: 2,
            date_order: 1,
            time_24h: 1,
            am: "",
            pm: "",
        }),
    },
    SupportedLocale {
        id: "pt-PT",
        display_name: "Portuguese (Portugal)",
        geo_id: 193,
        table: Some(FormatTable {
            language: "PTG",
            country: "Portugal",
            short_date: "dd/MM/yyyy",
            long_date: "dddd, d 'de' MMMM 'de' yyyy",
            time_format: "HH:mm:ss",
            short_time: "HH:mm",
            currency: "€",
            decimal: ",",
            thousand: " ",
            list: ";",
            country_code: 351,
            currency_pattern: 3,
            currency_digits: 2,
            date_order: 1,
            time_24h: 1,
            am: "",
            pm: "",
        }),
    },
    SupportedLocale {
        id: "ru-RU",
        display_name: "Russian (Russia)",
        geo_id: 203,
        table: Some(FormatTable {
            language: "RUS",
            country: "Russia",
            short_date: "dd.MM.yyyy",
            long_date: "d MMMM yyyy г.",
            time_format: "H:mm:ss",
            short_time: "H:mm",
            currency: "₽",
            decimal: ",",
            thousand: " ",
            list: ";",
            country_code: 7,
            currency_pattern: 3,
            currency_digits: 2,
            date_order: 1,
            time_24h: 1,
            am: "",
            pm: "",
        }),
    },
    SupportedLocale {
        id: "zh-CN",
        display_name: "Chinese (Simplified, China)",
        geo_id: 45,
        table: Some(FormatTable {
            language: "CHS",
            country: "China",
            short_date: "yyyy/M/d",
            long_date: "yyyy'年'M'月'd'日'",
            time_format: "HH:mm:ss",
            short_time: "HH:mm",
            currency: "¥",
            decimal: ".",
            thousand: ",",
            list: ",",
            country_code: 86,
            currency_pattern: 0,
            currency_digits: 2,
            date_order: 2,
            time_24h: 1,
            am: "上午",
            pm: "下午",
        }),
    },
    SupportedLocale {
        id: "ja-JP",
        display_name: "Japanese (Japan)",
        geo_id: 122,
        table: Some(FormatTable {
            language: "JPN",
            country: "Japan",
            short_date: "yyyy/MM/dd",
            long_date: "yyyy年M月d日",
            time_format: "H:mm:ss",
            short_time: "H:mm",
            currency: "¥",
            decimal: ".",
            thousand: ",",
            list: ",",
            country_code: 81,
            currency_pattern: 0,
            currency_digits: 0,
            date_order: 2,
            time_24h: 1,
            am: "午前",
            pm: "午後",
        }),
    },
    SupportedLocale {
        id: "ko-KR",
        display_name: "Korean (Korea)",
        geo_id: 134,
        table: Some(FormatTable {
            language: "KOR",
            country: "Korea",
            short_date: "yyyy. MM. dd.",
            long_date: "yyyy년 M월 d일 dddd",
            time_format: "tt h:mm:ss",
            short_time: "tt h:mm",
            currency: "₩",
            decimal: ".",
            thousand: ",",
            list: ",",
            country_code: 82,
            currency_pattern: 0,
            currency_digits: 0,
            date_order: 2,
            time_24h: 0,
            am: "오전",
            pm: "오후",
        }),
    },
];

/// 起動時に構築される読み取り専用カタログ
#[derive(Debug, Clone)]
pub struct LocaleCatalog {
    profiles: Vec<LocaleProfile>,
}

impl LocaleCatalog {
    /// 組み込みテーブルから全プロファイルを構築
    pub fn builtin() -> Self {
        Self::from_supported(SUPPORTED_LOCALES)
    }

    /// 任意の対応表から作成。テーブルのないロケールは縮退プロファイルになる。
    pub fn from_supported(locales: &[SupportedLocale]) -> Self {
        let profiles = locales.iter().filter_map(build_profile).collect();
        Self { profiles }
    }

    /// 任意のプロファイル集合から作成（テストや拡張用）
    pub fn from_profiles(profiles: Vec<LocaleProfile>) -> Self {
        Self { profiles }
    }

    /// (識別子, 表示名) を表示順に返す
    pub fn supported_locales(&self) -> Vec<(&str, &str)> {
        self.profiles
            .iter()
            .map(|p| (p.id().as_str(), p.display_name()))
            .collect()
    }

    pub fn validate(&self, id: &str) -> bool {
        self.find(id).is_some()
    }

    /// サポート外なら [`DomainError::UnsupportedLocale`]
    pub fn resolve(&self, id: &str) -> Result<&LocaleProfile, DomainError> {
        self.find(id)
            .ok_or_else(|| DomainError::UnsupportedLocale(id.trim().to_string()))
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    fn find(&self, id: &str) -> Option<&LocaleProfile> {
        let id = id.trim();
        self.profiles.iter().find(|p| p.id().as_str() == id)
    }
}

impl Default for LocaleCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn build_profile(locale: &SupportedLocale) -> Option<LocaleProfile> {
    // 組み込みテーブルの識別子は常に形式を満たす
    let id = LocaleId::parse(locale.id).ok()?;
    let international = match &locale.table {
        Some(table) => explicit_entries(&id, table),
        None => fallback_entries(&id, locale.display_name),
    };

    let groups = vec![
        SettingGroup {
            kind: GroupKind::International,
            subtree: SettingsSubtree::international(),
            entries: international,
        },
        SettingGroup {
            kind: GroupKind::Geo,
            subtree: SettingsSubtree::current_user(GEO_PATH),
            entries: vec![
                SettingEntry::new("Nation", SettingValue::Text(locale.geo_id.to_string())),
                SettingEntry::new("Name", SettingValue::text(id.region())),
            ],
        },
        browser_group(&id, IE_INTERNATIONAL_PATH),
        browser_group(&id, IE_MAIN_INTERNATIONAL_PATH),
    ];

    Some(LocaleProfile::new(
        id,
        locale.display_name,
        groups,
        vec![SettingsSubtree::current_user(USER_PROFILE_PATH)],
        locale.table.is_none(),
    ))
}

fn explicit_entries(id: &LocaleId, t: &FormatTable) -> Vec<SettingEntry> {
    use SettingValue::{Integer, Text};
    vec![
        SettingEntry::new("Locale", Text(id.to_string())),
        SettingEntry::new("LocaleName", Text(id.to_string())),
        SettingEntry::new("sLanguage", SettingValue::text(t.language)),
        SettingEntry::new("sCountry", SettingValue::text(t.country)),
        SettingEntry::new("sShortDate", SettingValue::text(t.short_date)),
        SettingEntry::new("sLongDate", SettingValue::text(t.long_date)),
        SettingEntry::new("sTimeFormat", SettingValue::text(t.time_format)),
        SettingEntry::new("sShortTime", SettingValue::text(t.short_time)),
        SettingEntry::new("sCurrency", SettingValue::text(t.currency)),
        SettingEntry::new("sDecimal", SettingValue::text(t.decimal)),
        SettingEntry::new("sThousand", SettingValue::text(t.thousand)),
        SettingEntry::new("sList", SettingValue::text(t.list)),
        SettingEntry::new("iCountry", Integer(t.country_code)),
        SettingEntry::new("iCurrency", Integer(t.currency_pattern)),
        SettingEntry::new("iCurrDigits", Integer(t.currency_digits)),
        SettingEntry::new("iDate", Integer(t.date_order)),
        SettingEntry::new("iTime", Integer(t.time_24h)),
        SettingEntry::new("s1159", SettingValue::text(t.am)),
        SettingEntry::new("s2359", SettingValue::text(t.pm)),
    ]
}

/// 明示テーブルのないロケール用の縮退プロファイル（決定的）
fn fallback_entries(id: &LocaleId, display_name: &str) -> Vec<SettingEntry> {
    vec![
        SettingEntry::new("Locale", SettingValue::Text(id.to_string())),
        SettingEntry::new("LocaleName", SettingValue::Text(id.to_string())),
        SettingEntry::new("sLanguage", SettingValue::Text(id.language().to_ascii_uppercase())),
        SettingEntry::new("sCountry", SettingValue::text(display_name)),
    ]
}

fn browser_group(id: &LocaleId, path: &str) -> SettingGroup {
    SettingGroup {
        kind: GroupKind::Browser,
        subtree: SettingsSubtree::current_user(path),
        entries: vec![SettingEntry::new(
            "AcceptLanguage",
            SettingValue::Text(id.to_string()),
        )],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FeatureToggles;

    #[test]
    fn every_supported_locale_resolves_to_itself() {
        let catalog = LocaleCatalog::builtin();
        assert_eq!(catalog.len(), SUPPORTED_LOCALES.len());
        for (id, _) in catalog.supported_locales() {
            let profile = catalog.resolve(id).unwrap();
            assert_eq!(profile.get("Locale"), Some(&SettingValue::text(id)));
            assert_eq!(profile.get("LocaleName"), Some(&SettingValue::text(id)));
        }
    }

    #[test]
    fn unknown_locale_is_unsupported() {
        let catalog = LocaleCatalog::builtin();
        assert_eq!(
            catalog.resolve("xx-XX").unwrap_err(),
            DomainError::UnsupportedLocale("xx-XX".into())
        );
        assert!(!catalog.validate("xx-XX"));
        assert!(!catalog.validate("pl-pl"));
        assert!(catalog.validate("pl-PL"));
    }

    #[test]
    fn supported_locales_keep_display_order() {
        let catalog = LocaleCatalog::builtin();
        let ids: Vec<&str> = catalog.supported_locales().iter().map(|(id, _)| *id).collect();
        assert_eq!(ids.first(), Some(&"pl-PL"));
        assert_eq!(ids.last(), Some(&"ko-KR"));
        assert_eq!(ids.len(), 12);
    }

    #[test]
    fn explicit_tables_have_nineteen_international_keys() {
        let catalog = LocaleCatalog::builtin();
        let profile = catalog
            .resolve("pl-PL")
            .unwrap()
            .filtered(&FeatureToggles::international_only());
        assert_eq!(profile.key_count(), 19);
        assert!(!profile.is_degraded());
        assert_eq!(profile.get("sCurrency"), Some(&SettingValue::text("zł")));
        assert_eq!(profile.get("iCountry"), Some(&SettingValue::Integer(48)));
    }

    #[test]
    fn every_builtin_locale_has_a_format_table() {
        assert!(SUPPORTED_LOCALES.iter().all(SupportedLocale::has_table));
        let catalog = LocaleCatalog::builtin();
        for (id, _) in catalog.supported_locales() {
            assert!(!catalog.resolve(id).unwrap().is_degraded(), "{id}");
        }
    }

    #[test]
    fn builtin_values_follow_regional_conventions() {
        let catalog = LocaleCatalog::builtin();
        let pt = catalog.resolve("pt-PT").unwrap();
        assert_eq!(pt.get("sLanguage"), Some(&SettingValue::text("PTG")));
        assert_eq!(pt.get("sShortDate"), Some(&SettingValue::text("dd/MM/yyyy")));
        assert_eq!(pt.get("sCurrency"), Some(&SettingValue::text("€")));

        let zh = catalog.resolve("zh-CN").unwrap();
        assert_eq!(zh.get("sLanguage"), Some(&SettingValue::text("CHS")));
        assert_eq!(zh.get("sCountry"), Some(&SettingValue::text("China")));
        assert_eq!(zh.get("sShortDate"), Some(&SettingValue::text("yyyy/M/d")));
        assert_eq!(zh.get("sCurrency"), Some(&SettingValue::text("¥")));

        let ko = catalog.resolve("ko-KR").unwrap();
        assert_eq!(ko.get("sShortDate"), Some(&SettingValue::text("yyyy. MM. dd.")));
    }

    #[test]
    fn locales_without_table_fall_back_to_minimal_profile() {
        let catalog = LocaleCatalog::from_supported(&[SupportedLocale::minimal(
            "nl-NL",
            "Dutch (Netherlands)",
            176,
        )]);
        let profile = catalog.resolve("nl-NL").unwrap();
        assert!(profile.is_degraded());
        let international = profile.filtered(&FeatureToggles::international_only());
        let names: Vec<&str> = international.entries().map(|(_, e)| e.name.as_str()).collect();
        assert_eq!(names, vec!["Locale", "LocaleName", "sLanguage", "sCountry"]);
        assert_eq!(profile.get("sLanguage"), Some(&SettingValue::text("NL")));
        assert_eq!(
            profile.get("sCountry"),
            Some(&SettingValue::text("Dutch (Netherlands)"))
        );
    }

    #[test]
    fn fallback_is_deterministic() {
        let locales = [SupportedLocale::minimal("nl-NL", "Dutch (Netherlands)", 176)];
        let a = LocaleCatalog::from_supported(&locales);
        let b = LocaleCatalog::from_supported(&locales);
        assert_eq!(a.resolve("nl-NL").unwrap(), b.resolve("nl-NL").unwrap());
    }

    #[test]
    fn full_profile_includes_geo_and_browser_groups() {
        let catalog = LocaleCatalog::builtin();
        let profile = catalog.resolve("en-US").unwrap();
        assert_eq!(profile.key_count(), 19 + 2 + 2);
        let geo: Vec<(&str, String)> = profile
            .entries()
            .filter(|(s, _)| s.path() == GEO_PATH)
            .map(|(_, e)| (e.name.as_str(), e.value.to_string()))
            .collect();
        assert_eq!(geo, vec![("Nation", "244".to_string()), ("Name", "US".to_string())]);
        assert_eq!(profile.clear_subtrees().len(), 1);
    }
}
