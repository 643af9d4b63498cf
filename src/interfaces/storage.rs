use crate::error::Result;

/// String key/value storage shaped like browser local storage.
pub trait ContextStore: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> Result<()>;
}
