//! rr-composition: CLI 向けのランタイムを組み立てるコンポジションルート。
//! ドメイン／アプリケーション／各種アダプタをここで配線し、apps/* はこのクレートだけに依存する。

pub mod cli;
pub mod error;

// apps/* が内側レイヤーの型に触れる必要がある場合は、ここから辿れるようにする。
pub use rr_app as app;
pub use rr_domain as domain;
pub use rr_engine as engine;

pub use rr_adapter_backup::SnapshotInfo;
pub use rr_app::{AppService, CurrentSetting};
pub use rr_domain::model::{ApplicationRun, ResetConfig};
pub use rr_engine::{RunSummary, summarize};
