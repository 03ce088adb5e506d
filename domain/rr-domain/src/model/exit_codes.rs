//! CLIの終了コード定義

/// 全キーの適用に成功
pub const SUCCESS: u8 = 0;
/// 失敗キーあり、またはサポート外ロケール
pub const FAILURE: u8 = 1;
