//! ロケール識別子
//!
//! `language-REGION` 形式（例: `en-US`）。カタログ所属の確認はカタログ側で行う。

use crate::DomainError;
use std::fmt;

/// 形式検証済みのロケール識別子
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LocaleId(String);

impl LocaleId {
    /// `xx-YY` 形式を検証して作成（言語2-3文字小文字、地域2文字大文字）
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let trimmed = raw.trim();
        let Some((language, region)) = trimmed.split_once('-') else {
            return Err(DomainError::UnsupportedLocale(raw.to_string()));
        };
        let language_ok = (2..=3).contains(&language.len())
            && language.chars().all(|c| c.is_ascii_lowercase());
        let region_ok = region.len() == 2 && region.chars().all(|c| c.is_ascii_uppercase());
        if !language_ok || !region_ok {
            return Err(DomainError::UnsupportedLocale(raw.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 言語部分（`pl-PL` → `pl`）
    pub fn language(&self) -> &str {
        self.0.split_once('-').map(|(l, _)| l).unwrap_or(&self.0)
    }

    /// 地域部分（`pl-PL` → `PL`）
    pub fn region(&self) -> &str {
        self.0.split_once('-').map(|(_, r)| r).unwrap_or("")
    }
}

impl fmt::Display for LocaleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_language_region() {
        let id = LocaleId::parse("pl-PL").unwrap();
        assert_eq!(id.as_str(), "pl-PL");
        assert_eq!(id.language(), "pl");
        assert_eq!(id.region(), "PL");
    }

    #[test]
    fn parse_trims_whitespace() {
        assert_eq!(LocaleId::parse("  en-US ").unwrap().as_str(), "en-US");
    }

    #[test]
    fn parse_rejects_malformed_identifiers() {
        for raw in ["", "en", "EN-us", "en_US", "en-USA", "e-US", "en-U1", "-US"] {
            assert!(
                matches!(LocaleId::parse(raw), Err(DomainError::UnsupportedLocale(_))),
                "{raw:?} should be rejected"
            );
        }
    }
}
