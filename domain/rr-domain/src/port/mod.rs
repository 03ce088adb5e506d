//! ポート定義
//!
//! ドメインが外部に求める機能（driven）をトレイトで表現する。

pub mod driven;
