//! RegionReset ドメイン層
//!
//! 地域設定リセットの中核。外部依存ゼロでRust標準ライブラリのみ使用。
//! ヘキサゴナルアーキテクチャの最内層。

pub mod error;   // ドメインエラー定義
pub mod model;   // ドメインモデル（値オブジェクト、エンティティ）
pub mod port;    // ポート（driven）
pub mod service; // ドメインサービス（ロケールカタログ）

pub use error::DomainError; // エラー型を再エクスポート
