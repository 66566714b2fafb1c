//! Live form contract

use mockup_core::FieldMap;
use std::sync::RwLock;

/// Reactive form the coordinator mirrors.
///
/// `watch` is pulled once per change notification; `set_value` pushes an
/// approved suggestion back into the form.
pub trait FormSource: Send + Sync {
    fn watch(&self) -> FieldMap;
    fn set_value(&self, field: &str, value: &str);
}

/// Form held in memory, used by the HTTP surface and tests.
#[derive(Debug, Default)]
pub struct InMemoryForm {
    fields: RwLock<FieldMap>,
}

impl InMemoryForm {
    pub fn new(fields: FieldMap) -> Self {
        Self {
            fields: RwLock::new(fields),
        }
    }

    pub fn value(&self, field: &str) -> Option<String> {
        self.read().get(field).cloned()
    }

    /// Replace every field at once.
    pub fn replace(&self, fields: FieldMap) {
        *self.write() = fields;
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, FieldMap> {
        self.fields.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, FieldMap> {
        self.fields.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl FormSource for InMemoryForm {
    fn watch(&self) -> FieldMap {
        self.read().clone()
    }

    fn set_value(&self, field: &str, value: &str) {
        self.write().insert(field.to_string(), value.to_string());
    }
}
