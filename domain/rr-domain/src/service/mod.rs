//! ドメインサービス

pub mod catalog;

pub use catalog::{LocaleCatalog, SupportedLocale, SUPPORTED_LOCALES};
