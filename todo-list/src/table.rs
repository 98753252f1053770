//! In-memory table of to-do items.
//!
//! A single table keyed by [`TodoId`]. Ids come from a monotonically
//! increasing counter starting at 1 and are never handed out twice, even
//! after the row holding them is deleted.

use crate::types::{TodoId, TodoItem};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors raised by [`TodoTable`] lookups and updates.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    /// No row with this id exists.
    #[error("No item with id {0}")]
    NotFound(TodoId),
}

/// Partial update applied by [`TodoTable::update`].
///
/// Fields left as `None` keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoPatch {
    /// Replacement text.
    pub text: Option<String>,
    /// Replacement completion flag.
    pub completed: Option<bool>,
}

impl TodoPatch {
    /// Patch that changes nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the text.
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Replace the completion flag.
    #[must_use]
    pub const fn completed(mut self, completed: bool) -> Self {
        self.completed = Some(completed);
        self
    }
}

/// The to-do table.
#[derive(Debug, Clone)]
pub struct TodoTable {
    rows: BTreeMap<TodoId, TodoItem>,
    next_id: u64,
}

impl Default for TodoTable {
    fn default() -> Self {
        Self::new()
    }
}

impl TodoTable {
    /// Empty table; the first id handed out is 1.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Insert a row and return its freshly assigned id.
    pub fn create(&mut self, text: impl Into<String>, completed: bool) -> TodoId {
        let id = TodoId::new(self.next_id);
        self.next_id += 1;

        self.rows.insert(
            id,
            TodoItem {
                id,
                text: text.into(),
                completed,
            },
        );
        id
    }

    /// Look a row up by id.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::NotFound`] if `id` is absent.
    pub fn get(&self, id: TodoId) -> Result<&TodoItem, TableError> {
        self.rows.get(&id).ok_or(TableError::NotFound(id))
    }

    /// Whether a row with `id` exists.
    #[must_use]
    pub fn contains(&self, id: TodoId) -> bool {
        self.rows.contains_key(&id)
    }

    /// Remove a row. Returns `false` if there was nothing to remove.
    pub fn delete(&mut self, id: TodoId) -> bool {
        self.rows.remove(&id).is_some()
    }

    /// Apply `patch` to the row with `id` and return the updated row.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::NotFound`] if `id` is absent.
    pub fn update(&mut self, id: TodoId, patch: TodoPatch) -> Result<&TodoItem, TableError> {
        let row = self.rows.get_mut(&id).ok_or(TableError::NotFound(id))?;

        if let Some(text) = patch.text {
            row.text = text;
        }
        if let Some(completed) = patch.completed {
            row.completed = completed;
        }

        Ok(row)
    }

    /// All rows in ascending id order.
    pub fn list(&self) -> impl Iterator<Item = &TodoItem> {
        self.rows.values()
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of rows marked completed.
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.rows.values().filter(|row| row.completed).count()
    }
}
