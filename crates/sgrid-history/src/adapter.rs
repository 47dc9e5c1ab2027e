//! Navigation backend abstraction.
//!
//! The store never touches a browser history object directly. Hosts plug in
//! an adapter; tests and non-browser shells use [`MemoryNavigation`].

use serde_json::{Map, Value};

use crate::error::Result;

/// Payload of one navigation entry: grid identifier to flat query state.
///
/// Kept as untyped JSON so entries written by other grids (or older builds)
/// pass through untouched.
pub type NavigationPayload = Map<String, Value>;

/// How a write lands in the navigation stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WriteMode {
    /// Create a new entry the user can return from with Back.
    Push,
    /// Overwrite the current entry in place.
    Replace,
}

impl WriteMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Push => "push",
            Self::Replace => "replace",
        }
    }
}

/// Access to a navigation stack whose entries carry a state payload.
pub trait NavigationStateAdapter {
    /// Payload of the current entry (empty when the entry carries none).
    fn read(&self) -> NavigationPayload;

    /// Store `payload` as a new entry or over the current one.
    fn write(&mut self, payload: NavigationPayload, mode: WriteMode) -> Result<()>;

    /// Move `delta` entries through the stack (negative is Back).
    ///
    /// Returns the payload delivered to the pop-state listener, or `None`
    /// when the move falls outside the stack.
    fn traverse(&mut self, delta: isize) -> Option<NavigationPayload>;
}

/// In-memory navigation stack with browser semantics.
///
/// Pushing discards any forward entries, like following a link after
/// pressing Back.
#[derive(Debug, Clone)]
pub struct MemoryNavigation {
    entries: Vec<NavigationPayload>,
    cursor: usize,
}

impl Default for MemoryNavigation {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryNavigation {
    /// A stack holding a single entry without payload.
    pub fn new() -> Self {
        Self {
            entries: vec![NavigationPayload::new()],
            cursor: 0,
        }
    }

    /// Number of entries in the stack.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false; a stack starts with one entry and never shrinks below it.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Index of the current entry.
    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn can_go_back(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_go_forward(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }
}

impl NavigationStateAdapter for MemoryNavigation {
    fn read(&self) -> NavigationPayload {
        self.entries[self.cursor].clone()
    }

    fn write(&mut self, payload: NavigationPayload, mode: WriteMode) -> Result<()> {
        match mode {
            WriteMode::Push => {
                self.entries.truncate(self.cursor + 1);
                self.entries.push(payload);
                self.cursor += 1;
            }
            WriteMode::Replace => {
                self.entries[self.cursor] = payload;
            }
        }
        Ok(())
    }

    fn traverse(&mut self, delta: isize) -> Option<NavigationPayload> {
        let target = self.cursor.checked_add_signed(delta)?;
        if target >= self.entries.len() || delta == 0 {
            return None;
        }
        self.cursor = target;
        Some(self.entries[target].clone())
    }
}
