//! Stackable boolean flags with scoped overrides.

use std::sync::Mutex;

/// A boolean whose value can be overridden for a nested scope.
///
/// The current value is the innermost override, or `false` when none is
/// active. Overrides are undone by dropping the returned [`FlagGuard`].
#[derive(Debug, Default)]
pub struct FlagStack {
    values: Mutex<Vec<bool>>,
}

impl FlagStack {
    /// Create a stack with no overrides.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value.
    pub fn top(&self) -> bool {
        let values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        values.last().copied().unwrap_or(false)
    }

    /// Number of active overrides.
    pub fn depth(&self) -> usize {
        self.values.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Override the value until the guard is dropped.
    pub fn push(&self, value: bool) -> FlagGuard<'_> {
        let mut values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        let depth = values.len();
        values.push(value);
        FlagGuard { stack: self, depth }
    }
}

/// Restores the enclosing value of a [`FlagStack`] when dropped.
#[derive(Debug)]
#[must_use = "the override ends as soon as the guard is dropped"]
pub struct FlagGuard<'a> {
    stack: &'a FlagStack,
    depth: usize,
}

impl Drop for FlagGuard<'_> {
    fn drop(&mut self) {
        let mut values = self.stack.values.lock().unwrap_or_else(|e| e.into_inner());
        values.truncate(self.depth);
    }
}
