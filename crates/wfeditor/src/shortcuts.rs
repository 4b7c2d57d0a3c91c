use crate::PluginError;
use std::collections::BTreeMap;

/// Keybinding bound to an editor command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shortcut {
    pub keybinding: String,
    pub command: String,
}

impl Shortcut {
    pub fn new(keybinding: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            keybinding: keybinding.into(),
            command: command.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct ShortcutRegistry {
    bindings: BTreeMap<String, String>,
}

impl ShortcutRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a shortcut. Keybindings are case-insensitive and may be bound once.
    pub fn register(&mut self, shortcut: Shortcut) -> Result<(), PluginError> {
        let key = shortcut.keybinding.to_lowercase();
        if self.bindings.contains_key(&key) {
            return Err(PluginError::DuplicateShortcut(key));
        }
        tracing::debug!(keybinding = %key, command = %shortcut.command, "Shortcut bound");
        self.bindings.insert(key, shortcut.command);
        Ok(())
    }

    pub fn command_for(&self, keybinding: &str) -> Option<&str> {
        self.bindings
            .get(&keybinding.to_lowercase())
            .map(String::as_str)
    }

    /// All bindings, ordered by keybinding
    pub fn list(&self) -> Vec<Shortcut> {
        self.bindings
            .iter()
            .map(|(key, command)| Shortcut::new(key.clone(), command.clone()))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
