//! Reducer for the to-do list.
//!
//! Commands are validated against the current table and answered with one
//! outcome event through an effect. Events are applied when the store feeds
//! them back, so the table only ever changes through events.

use crate::table::TodoPatch;
use crate::types::{TodoAction, TodoError, TodoId, TodoState};
use crossoff_core::{effect::Effect, reducer::Reducer, smallvec, SmallVec};
use uuid::Uuid;

/// Default maximum item length, in characters.
pub const DEFAULT_MAX_TEXT_LEN: usize = 200;

/// Environment for the to-do reducer
#[derive(Clone, Debug)]
pub struct TodoEnvironment {
    /// Longest accepted item text, in characters (after trimming)
    pub max_text_len: usize,
}

impl TodoEnvironment {
    /// Creates a new `TodoEnvironment`
    #[must_use]
    pub const fn new(max_text_len: usize) -> Self {
        Self { max_text_len }
    }
}

impl Default for TodoEnvironment {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_TEXT_LEN)
    }
}

/// Reducer for the to-do list
#[derive(Clone, Debug, Default)]
pub struct TodoReducer;

impl TodoReducer {
    /// Creates a new `TodoReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Trim `text` and check it against the length limit.
    fn validate_text(text: &str, env: &TodoEnvironment) -> Result<String, TodoError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(TodoError::EmptyText);
        }

        let len = text.chars().count();
        if len > env.max_text_len {
            return Err(TodoError::TextTooLong {
                len,
                max: env.max_text_len,
            });
        }

        Ok(text.to_string())
    }

    fn validate_exists(state: &TodoState, id: TodoId) -> Result<(), TodoError> {
        if state.items.contains(id) {
            Ok(())
        } else {
            Err(TodoError::NotFound(id))
        }
    }

    /// Answer a command with its outcome event, or `Rejected` if validation failed.
    fn respond(
        command_id: Uuid,
        outcome: Result<TodoAction, TodoError>,
    ) -> SmallVec<[Effect<TodoAction>; 4]> {
        let event = outcome.unwrap_or_else(|reason| {
            tracing::debug!(%command_id, %reason, "Command rejected");
            TodoAction::Rejected {
                command_id,
                reason,
            }
        });

        smallvec![Effect::send(event)]
    }

    /// Apply an event to the table.
    ///
    /// An event can race with a delete of the same item; applying it to a row
    /// that is gone leaves the table unchanged.
    fn apply_event(state: &mut TodoState, action: &TodoAction) {
        match action {
            TodoAction::ItemAdded { text, .. } => {
                let id = state.items.create(text.clone(), false);
                tracing::info!(%id, "Item added");
            },
            TodoAction::ItemEdited {
                id,
                text,
                completed,
                ..
            } => {
                let patch = TodoPatch {
                    text: Some(text.clone()),
                    completed: *completed,
                };
                if let Err(error) = state.items.update(*id, patch) {
                    tracing::warn!(%error, "Edit applied to a deleted item");
                }
            },
            TodoAction::ItemCrossedOff { id, .. } => {
                if let Err(error) = state.items.update(*id, TodoPatch::new().completed(true)) {
                    tracing::warn!(%error, "Cross-off applied to a deleted item");
                }
            },
            TodoAction::ItemUncrossed { id, .. } => {
                if let Err(error) = state.items.update(*id, TodoPatch::new().completed(false)) {
                    tracing::warn!(%error, "Uncross applied to a deleted item");
                }
            },
            TodoAction::ItemDeleted { id, .. } => {
                if state.items.delete(*id) {
                    tracing::info!(%id, "Item deleted");
                }
            },
            // Commands are not applied to state; rejections change nothing
            TodoAction::Rejected { .. }
            | TodoAction::AddItem { .. }
            | TodoAction::EditItem { .. }
            | TodoAction::CrossOffItem { .. }
            | TodoAction::UncrossItem { .. }
            | TodoAction::DeleteItem { .. } => {},
        }
    }
}

impl Reducer for TodoReducer {
    type State = TodoState;
    type Action = TodoAction;
    type Environment = TodoEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            // ========== Commands ==========
            TodoAction::AddItem {
                command_id,
                text,
            } => Self::respond(
                command_id,
                Self::validate_text(&text, env).map(|text| TodoAction::ItemAdded {
                    command_id,
                    text,
                }),
            ),

            TodoAction::EditItem {
                command_id,
                id,
                text,
                completed,
            } => Self::respond(
                command_id,
                Self::validate_exists(state, id)
                    .and_then(|()| Self::validate_text(&text, env))
                    .map(|text| TodoAction::ItemEdited {
                        command_id,
                        id,
                        text,
                        completed,
                    }),
            ),

            TodoAction::CrossOffItem { command_id, id } => Self::respond(
                command_id,
                Self::validate_exists(state, id)
                    .map(|()| TodoAction::ItemCrossedOff { command_id, id }),
            ),

            TodoAction::UncrossItem { command_id, id } => Self::respond(
                command_id,
                Self::validate_exists(state, id)
                    .map(|()| TodoAction::ItemUncrossed { command_id, id }),
            ),

            TodoAction::DeleteItem { command_id, id } => Self::respond(
                command_id,
                Self::validate_exists(state, id)
                    .map(|()| TodoAction::ItemDeleted { command_id, id }),
            ),

            // ========== Events ==========
            TodoAction::ItemAdded { .. }
            | TodoAction::ItemEdited { .. }
            | TodoAction::ItemCrossedOff { .. }
            | TodoAction::ItemUncrossed { .. }
            | TodoAction::ItemDeleted { .. }
            | TodoAction::Rejected { .. } => {
                Self::apply_event(state, &action);
                SmallVec::new()
            },
        }
    }
}
