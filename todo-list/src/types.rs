//! Domain types for the to-do list.
//!
//! Every mutation is a command/event pair. Commands come from the views and
//! carry a fresh command id; the reducer answers each command with exactly
//! one event carrying the same id.

use crate::table::TodoTable;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Identifier of a to-do item, assigned by the table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(u64);

impl TodoId {
    /// Wrap a raw id.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// The raw id.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single to-do item.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
    /// Unique identifier
    pub id: TodoId,
    /// What needs doing
    pub text: String,
    /// Whether it has been crossed off
    pub completed: bool,
}

/// State of the to-do list.
#[derive(Clone, Debug, Default)]
pub struct TodoState {
    /// All items
    pub items: TodoTable,
}

impl TodoState {
    /// Empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Why a command was refused.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum TodoError {
    /// The item does not exist (never did, or was deleted).
    #[error("Item {0} not found")]
    NotFound(TodoId),

    /// Text was empty once surrounding whitespace was removed.
    #[error("Item text cannot be empty")]
    EmptyText,

    /// Text exceeds the configured maximum.
    #[error("Item text is too long ({len} characters, at most {max} allowed)")]
    TextTooLong {
        /// Length of the submitted text, in characters
        len: usize,
        /// Configured maximum
        max: usize,
    },
}

/// Commands and events for the to-do list.
///
/// Commands are validated by the reducer, which answers each with one event
/// (or `Rejected`). Events are applied to the table when fed back.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TodoAction {
    // ========== Commands ==========
    /// Command: add an item (not completed)
    AddItem {
        /// Server-assigned id of the command, unique per dispatch
        command_id: Uuid,
        /// Submitted text, not yet trimmed
        text: String,
    },

    /// Command: overwrite an item's text, and its completion flag if given
    EditItem {
        /// Server-assigned id of the command, unique per dispatch
        command_id: Uuid,
        /// Item to edit
        id: TodoId,
        /// Submitted text, not yet trimmed
        text: String,
        /// New completion flag; `None` leaves it unchanged
        completed: Option<bool>,
    },

    /// Command: mark an item completed
    CrossOffItem {
        /// Server-assigned id of the command, unique per dispatch
        command_id: Uuid,
        /// Item to cross off
        id: TodoId,
    },

    /// Command: mark an item not completed
    UncrossItem {
        /// Server-assigned id of the command, unique per dispatch
        command_id: Uuid,
        /// Item to uncross
        id: TodoId,
    },

    /// Command: delete an item
    DeleteItem {
        /// Server-assigned id of the command, unique per dispatch
        command_id: Uuid,
        /// Item to delete
        id: TodoId,
    },

    // ========== Events ==========
    /// Event: an item was added; the table assigns its id when applied
    ItemAdded {
        /// Server-assigned id of the command, unique per dispatch
        command_id: Uuid,
        /// Trimmed text
        text: String,
    },

    /// Event: an item was edited
    ItemEdited {
        /// Server-assigned id of the command, unique per dispatch
        command_id: Uuid,
        /// Edited item
        id: TodoId,
        /// Trimmed text
        text: String,
        /// New completion flag, if it changes
        completed: Option<bool>,
    },

    /// Event: an item was crossed off
    ItemCrossedOff {
        /// Server-assigned id of the command, unique per dispatch
        command_id: Uuid,
        /// Crossed-off item
        id: TodoId,
    },

    /// Event: an item was uncrossed
    ItemUncrossed {
        /// Server-assigned id of the command, unique per dispatch
        command_id: Uuid,
        /// Uncrossed item
        id: TodoId,
    },

    /// Event: an item was deleted
    ItemDeleted {
        /// Server-assigned id of the command, unique per dispatch
        command_id: Uuid,
        /// Deleted item
        id: TodoId,
    },

    /// Event: a command was refused; the table is unchanged
    Rejected {
        /// Server-assigned id of the command, unique per dispatch
        command_id: Uuid,
        /// Why
        reason: TodoError,
    },
}

impl TodoAction {
    /// Id of the command this action belongs to.
    #[must_use]
    pub const fn command_id(&self) -> Uuid {
        match self {
            Self::AddItem { command_id, .. }
            | Self::EditItem { command_id, .. }
            | Self::CrossOffItem { command_id, .. }
            | Self::UncrossItem { command_id, .. }
            | Self::DeleteItem { command_id, .. }
            | Self::ItemAdded { command_id, .. }
            | Self::ItemEdited { command_id, .. }
            | Self::ItemCrossedOff { command_id, .. }
            | Self::ItemUncrossed { command_id, .. }
            | Self::ItemDeleted { command_id, .. }
            | Self::Rejected { command_id, .. } => *command_id,
        }
    }

    /// Whether this is a command (an intent the reducer still has to validate).
    #[must_use]
    pub const fn is_command(&self) -> bool {
        matches!(
            self,
            Self::AddItem { .. }
                | Self::EditItem { .. }
                | Self::CrossOffItem { .. }
                | Self::UncrossItem { .. }
                | Self::DeleteItem { .. }
        )
    }

    /// Whether this is an event (an outcome the reducer applies).
    #[must_use]
    pub const fn is_event(&self) -> bool {
        !self.is_command()
    }

    /// Whether this is the outcome of the command `command_id`.
    #[must_use]
    pub fn is_outcome_of(&self, command_id: Uuid) -> bool {
        self.is_event() && self.command_id() == command_id
    }

    /// Short label used in logs and metrics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::AddItem { .. } => "add_item",
            Self::EditItem { .. } => "edit_item",
            Self::CrossOffItem { .. } => "cross_off_item",
            Self::UncrossItem { .. } => "uncross_item",
            Self::DeleteItem { .. } => "delete_item",
            Self::ItemAdded { .. } => "item_added",
            Self::ItemEdited { .. } => "item_edited",
            Self::ItemCrossedOff { .. } => "item_crossed_off",
            Self::ItemUncrossed { .. } => "item_uncrossed",
            Self::ItemDeleted { .. } => "item_deleted",
            Self::Rejected { .. } => "rejected",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn todo_id_display() {
        assert_eq!(TodoId::new(7).to_string(), "7");
    }

    #[test]
    fn commands_and_events_are_disjoint() {
        let request = Uuid::new_v4();
        let command = TodoAction::DeleteItem {
            command_id: request,
            id: TodoId::new(1),
        };
        let event = TodoAction::ItemDeleted {
            command_id: request,
            id: TodoId::new(1),
        };

        assert!(command.is_command());
        assert!(!command.is_event());
        assert!(event.is_event());
        assert!(!event.is_command());
    }

    #[test]
    fn outcome_matches_only_its_own_request() {
        let request = Uuid::new_v4();
        let event = TodoAction::Rejected {
            command_id: request,
            reason: TodoError::EmptyText,
        };
        let command = TodoAction::AddItem {
            command_id: request,
            text: String::new(),
        };

        assert!(event.is_outcome_of(request));
        assert!(!event.is_outcome_of(Uuid::new_v4()));
        // The command itself never counts as its own outcome
        assert!(!command.is_outcome_of(request));
    }

    #[test]
    fn error_messages() {
        assert_eq!(
            TodoError::TextTooLong { len: 201, max: 200 }.to_string(),
            "Item text is too long (201 characters, at most 200 allowed)"
        );
        assert_eq!(TodoError::NotFound(TodoId::new(3)).to_string(), "Item 3 not found");
    }
}
