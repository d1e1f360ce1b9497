//! Command Registry
//!
//! Maps command names to [`Command`]s. Built once at startup and shared by
//! every connection behind an `Arc`; it is never mutated afterwards.

use super::command::Command;
use super::{hashes, keys, lists, server, sets, strings};
use std::collections::HashMap;

/// The set of commands a server understands.
#[derive(Debug, Default)]
pub struct CommandRegistry {
    commands: HashMap<&'static str, Command>,
}

impl CommandRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in command family.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register_all(hashes::commands());
        registry.register_all(lists::commands());
        registry.register_all(sets::commands());
        registry.register_all(strings::commands());
        registry.register_all(keys::commands());
        registry.register_all(server::commands());
        registry
    }

    /// Adds `command`, replacing any previous command of the same name.
    pub fn register(&mut self, command: Command) {
        debug_assert_eq!(command.name(), command.name().to_ascii_lowercase());
        self.commands.insert(command.name(), command);
    }

    pub fn register_all(&mut self, commands: impl IntoIterator<Item = Command>) {
        for command in commands {
            self.register(command);
        }
    }

    /// Looks a command up by name, case-insensitively.
    pub fn get(&self, name: &[u8]) -> Option<&Command> {
        let name = std::str::from_utf8(name).ok()?.to_ascii_lowercase();
        self.commands.get(name.as_str())
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.commands.keys().copied().collect();
        names.sort_unstable();
        names
    }
}
