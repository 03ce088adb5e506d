//! 駆動ポート（出力インターフェース）。
//!
//! ドメインが外部に求める機能を定義する。
//! インフラ層のアダプタが実装する。

mod backup_service;
mod clock;
mod config_repository;
mod settings_store;

pub use backup_service::*;
pub use clock::*;
pub use config_repository::*;
pub use settings_store::*;
