//! 設定値（文字列 / 32bit整数の2種類のみ）

use std::fmt;

/// 値の種別（ストアの型へ対応: REG_SZ / REG_DWORD）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Text,
    Integer,
}

impl ValueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::Text => "text",
            ValueKind::Integer => "integer",
        }
    }
}

/// タグ付き設定値
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingValue {
    Text(String),
    Integer(u32),
}

impl SettingValue {
    pub fn text(value: impl Into<String>) -> Self {
        SettingValue::Text(value.into())
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            SettingValue::Text(_) => ValueKind::Text,
            SettingValue::Integer(_) => ValueKind::Integer,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            SettingValue::Text(s) => Some(s.as_str()),
            SettingValue::Integer(_) => None,
        }
    }

    pub fn as_integer(&self) -> Option<u32> {
        match self {
            SettingValue::Text(_) => None,
            SettingValue::Integer(v) => Some(*v),
        }
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingValue::Text(s) => f.write_str(s),
            SettingValue::Integer(v) => write!(f, "{}", v),
        }
    }
}
