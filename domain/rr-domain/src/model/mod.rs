//! ドメインモデル
//!
//! 標準ライブラリのみ使用（外部依存なし）
//! 値オブジェクト、エンティティ、設定型を定義

mod config;         // リセット設定（機能トグル、バックアップ設定）
pub mod exit_codes; // CLI終了コード
mod locale;         // ロケール識別子
mod outcome;        // 操作結果と実行記録
mod profile;        // ロケールプロファイル（設定グループ）
mod subtree;        // 設定ストア内の位置
mod value;          // 設定値（文字列/32bit整数）

pub use config::*;
pub use locale::*;
pub use outcome::*;
pub use profile::*;
pub use subtree::*;
pub use value::*;
