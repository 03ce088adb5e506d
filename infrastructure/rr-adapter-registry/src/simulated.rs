//! シミュレーションストア（非Windows / ドライラン）
//!
//! 実ストアには一切触れず、書き込みをメモリ上に記録して常に成功を返す。

use rr_domain::DomainError;
use rr_domain::model::{SettingValue, SettingsSubtree};
use rr_domain::port::driven::SettingsStore;
use std::cell::RefCell;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct SimulatedStore {
    values: RefCell<HashMap<String, SettingValue>>,
    cleared: RefCell<Vec<String>>,
}

impl SimulatedStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 記録済みの書き込み件数
    pub fn write_count(&self) -> usize {
        self.values.borrow().len()
    }

    /// 削除要求されたサブツリー（表示形式）
    pub fn cleared(&self) -> Vec<String> {
        self.cleared.borrow().clone()
    }
}

impl SettingsStore for SimulatedStore {
    fn write(
        &self,
        subtree: &SettingsSubtree,
        name: &str,
        value: &SettingValue,
    ) -> Result<(), DomainError> {
        self.values
            .borrow_mut()
            .insert(format!("{}\\{}", subtree, name), value.clone());
        Ok(())
    }

    fn read(
        &self,
        subtree: &SettingsSubtree,
        name: &str,
    ) -> Result<Option<SettingValue>, DomainError> {
        Ok(self
            .values
            .borrow()
            .get(&format!("{}\\{}", subtree, name))
            .cloned())
    }

    fn delete_subtree(&self, subtree: &SettingsSubtree) -> Result<(), DomainError> {
        let prefix = format!("{}\\", subtree);
        self.values.borrow_mut().retain(|k, _| !k.starts_with(&prefix));
        self.cleared.borrow_mut().push(subtree.to_string());
        Ok(())
    }

    fn is_simulated(&self) -> bool {
        true
    }
}
