use crate::PluginError;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Typed token under which a plugin stores its options.
///
/// The name identifies the slot; the type parameter fixes what may be
/// stored there, so lookups need no casts at the call site.
pub struct ConfigKey<T> {
    name: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> ConfigKey<T> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _marker: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<T> fmt::Debug for ConfigKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ConfigKey").field(&self.name).finish()
    }
}

/// Write-once store of plugin options
#[derive(Default)]
pub struct ConfigRegistry {
    entries: HashMap<&'static str, Arc<dyn Any + Send + Sync>>,
}

impl ConfigRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<T>(&mut self, key: &ConfigKey<T>, value: T) -> Result<Arc<T>, PluginError>
    where
        T: Send + Sync + 'static,
    {
        if self.entries.contains_key(key.name) {
            return Err(PluginError::DuplicateConfig(key.name));
        }
        let value = Arc::new(value);
        self.entries.insert(key.name, value.clone());
        tracing::debug!(key = key.name, "Config registered");
        Ok(value)
    }

    pub fn get<T>(&self, key: &ConfigKey<T>) -> Option<Arc<T>>
    where
        T: Send + Sync + 'static,
    {
        self.entries
            .get(key.name)
            .cloned()
            .and_then(|entry| entry.downcast::<T>().ok())
    }

    pub fn contains<T>(&self, key: &ConfigKey<T>) -> bool {
        self.entries.contains_key(key.name)
    }
}
