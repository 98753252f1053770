//! HTTP handlers for the to-do pages.
//!
//! Mutations follow the request-response pattern: build a command carrying
//! a fresh command id, `send_and_wait_for` the outcome event with the same
//! id, and map it to a redirect, a re-rendered form or an error. The
//! request's correlation id only labels logs and the response header.
//! Reads take a snapshot through `Store::state`.

use crate::routes::Route;
use crate::state::AppState;
use crate::templates::{self, EditView, HomeView};
use crate::types::{TodoAction, TodoError, TodoId, TodoItem};
use axum::{
    extract::{rejection::FormRejection, rejection::PathRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Form,
};
use crossoff_web::{AppError, CorrelationId, Found, Page, WebResult};
use serde::Deserialize;
use uuid::Uuid;

/// Form posted to `/` to add an item.
#[derive(Debug, Clone, Deserialize)]
pub struct AddForm {
    /// Item text
    pub item: String,
}

/// Form posted to `/edit/:id`.
#[derive(Debug, Clone, Deserialize)]
pub struct EditForm {
    /// New item text
    pub item: String,
    /// New completion flag; absent leaves it unchanged
    #[serde(default)]
    pub completed: Option<String>,
}

impl EditForm {
    /// Interpret the `completed` field.
    ///
    /// # Errors
    ///
    /// Returns a 400 [`AppError`] for values that are neither truthy nor falsy.
    pub fn completed(&self) -> WebResult<Option<bool>> {
        self.completed
            .as_deref()
            .map(|raw| {
                parse_flag(raw).ok_or_else(|| {
                    AppError::bad_request(format!("Invalid value for completed: {raw:?}"))
                })
            })
            .transpose()
    }
}

/// Checkbox-style boolean as browsers and test clients submit it.
fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim() {
        "on" | "true" | "True" | "1" | "yes" => Some(true),
        "off" | "false" | "False" | "0" | "no" | "" => Some(false),
        _ => None,
    }
}

/// Ids are positive integers; `0` is as malformed as `abc`.
fn item_id(path: Result<Path<u64>, PathRejection>) -> WebResult<TodoId> {
    let Path(raw) = path.map_err(|rejection| AppError::bad_request(rejection.body_text()))?;
    if raw == 0 {
        return Err(AppError::bad_request("Item id must be a positive integer"));
    }
    Ok(TodoId::new(raw))
}

fn form<T>(form: Result<Form<T>, FormRejection>) -> WebResult<T> {
    form.map(|Form(value)| value)
        .map_err(|rejection| AppError::bad_request(rejection.body_text()))
}

fn home_redirect() -> Found {
    Found::to(Route::Home.path())
}

fn unexpected(outcome: &TodoAction) -> AppError {
    AppError::internal("Unexpected outcome").with_source(anyhow::anyhow!(
        "command answered with {}",
        outcome.kind()
    ))
}

/// Build a command under a fresh id, send it and wait for the event answering it.
async fn dispatch<F>(
    state: &AppState,
    correlation_id: CorrelationId,
    command: F,
) -> WebResult<TodoAction>
where
    F: FnOnce(Uuid) -> TodoAction,
{
    let command_id = Uuid::new_v4();
    let command = command(command_id);
    let command_kind = command.kind();

    let outcome = state
        .store
        .send_and_wait_for(
            command,
            move |action| action.is_outcome_of(command_id),
            state.dispatch_timeout,
        )
        .await
        .inspect_err(|error| {
            tracing::warn!(%correlation_id, %command_id, command = command_kind, %error, "Dispatch failed");
        })?;

    metrics::counter!("todo.outcomes.total", "outcome" => outcome.kind()).increment(1);
    tracing::debug!(%correlation_id, %command_id, outcome = outcome.kind(), "Command answered");

    Ok(outcome)
}

async fn home_view(state: &AppState) -> HomeView {
    let items = state
        .store
        .state(|s| s.items.list().cloned().collect::<Vec<_>>())
        .await;

    HomeView {
        items,
        ..HomeView::default()
    }
}

async fn find_item(state: &AppState, id: TodoId) -> WebResult<TodoItem> {
    state
        .store
        .state(|s| s.items.get(id).cloned())
        .await
        .map_err(|_| AppError::not_found("Item", id))
}

/// List page.
///
/// ```text
/// GET /  →  200 home.html
/// ```
pub async fn home(State(state): State<AppState>) -> Page {
    templates::home(&home_view(&state).await)
}

/// Add an item.
///
/// ```text
/// POST /   item=Buy+milk
///   → 302 /
///   → 422 home.html with the message (empty or too-long text)
/// ```
///
/// # Errors
///
/// 400 for a malformed form, 408/503 if the store cannot answer.
pub async fn add(
    State(state): State<AppState>,
    correlation_id: CorrelationId,
    submitted: Result<Form<AddForm>, FormRejection>,
) -> WebResult<Response> {
    let AddForm { item } = form(submitted)?;

    let text = item.clone();
    let outcome = dispatch(&state, correlation_id, |command_id| TodoAction::AddItem {
        command_id,
        text,
    })
    .await?;

    match outcome {
        TodoAction::ItemAdded { .. } => Ok(home_redirect().into_response()),
        TodoAction::Rejected {
            reason: reason @ (TodoError::EmptyText | TodoError::TextTooLong { .. }),
            ..
        } => {
            let view = HomeView {
                error: Some(reason.to_string()),
                draft: item,
                ..home_view(&state).await
            };
            Ok(templates::home(&view)
                .with_status(StatusCode::UNPROCESSABLE_ENTITY)
                .into_response())
        },
        other => Err(unexpected(&other)),
    }
}

/// Shared tail of delete / cross off / uncross: every answer is a redirect home,
/// including "no such item".
fn redirect_after(outcome: TodoAction) -> WebResult<Found> {
    match outcome {
        TodoAction::ItemDeleted { .. }
        | TodoAction::ItemCrossedOff { .. }
        | TodoAction::ItemUncrossed { .. } => Ok(home_redirect()),
        TodoAction::Rejected {
            reason: TodoError::NotFound(id),
            ..
        } => {
            tracing::debug!(%id, "No such item, redirecting home");
            Ok(home_redirect())
        },
        other => Err(unexpected(&other)),
    }
}

/// Delete an item.
///
/// ```text
/// GET /delete/:id  →  302 /
/// ```
///
/// # Errors
///
/// 400 for a malformed id, 408/503 if the store cannot answer.
pub async fn delete(
    State(state): State<AppState>,
    correlation_id: CorrelationId,
    id: Result<Path<u64>, PathRejection>,
) -> WebResult<Found> {
    let id = item_id(id)?;
    let outcome = dispatch(&state, correlation_id, |command_id| TodoAction::DeleteItem {
        command_id,
        id,
    })
    .await?;
    redirect_after(outcome)
}

/// Mark an item done.
///
/// ```text
/// GET /cross_off/:id  →  302 /
/// ```
///
/// # Errors
///
/// 400 for a malformed id, 408/503 if the store cannot answer.
pub async fn cross_off(
    State(state): State<AppState>,
    correlation_id: CorrelationId,
    id: Result<Path<u64>, PathRejection>,
) -> WebResult<Found> {
    let id = item_id(id)?;
    let outcome = dispatch(&state, correlation_id, |command_id| TodoAction::CrossOffItem {
        command_id,
        id,
    })
    .await?;
    redirect_after(outcome)
}

/// Mark an item pending.
///
/// ```text
/// GET /uncross/:id  →  302 /
/// ```
///
/// # Errors
///
/// 400 for a malformed id, 408/503 if the store cannot answer.
pub async fn uncross(
    State(state): State<AppState>,
    correlation_id: CorrelationId,
    id: Result<Path<u64>, PathRejection>,
) -> WebResult<Found> {
    let id = item_id(id)?;
    let outcome = dispatch(&state, correlation_id, |command_id| TodoAction::UncrossItem {
        command_id,
        id,
    })
    .await?;
    redirect_after(outcome)
}

/// Edit form.
///
/// ```text
/// GET /edit/:id  →  200 edit.html | 404
/// ```
///
/// # Errors
///
/// 400 for a malformed id, 404 if the item does not exist.
pub async fn edit_form(
    State(state): State<AppState>,
    id: Result<Path<u64>, PathRejection>,
) -> WebResult<Page> {
    let id = item_id(id)?;
    let item = find_item(&state, id).await?;
    Ok(templates::edit(&EditView::new(item)))
}

/// Save an edit.
///
/// ```text
/// POST /edit/:id   item=Updated+Test+Todo&completed=false
///   → 302 /
///   → 404 if the item does not exist
///   → 422 edit.html with the message (empty or too-long text)
/// ```
///
/// # Errors
///
/// 400 for a malformed id, form or `completed` value; 404 for a missing
/// item; 408/503 if the store cannot answer.
pub async fn edit(
    State(state): State<AppState>,
    correlation_id: CorrelationId,
    id: Result<Path<u64>, PathRejection>,
    submitted: Result<Form<EditForm>, FormRejection>,
) -> WebResult<Response> {
    let id = item_id(id)?;
    let submitted = form(submitted)?;
    let completed = submitted.completed()?;

    let text = submitted.item.clone();
    let outcome = dispatch(&state, correlation_id, |command_id| TodoAction::EditItem {
        command_id,
        id,
        text,
        completed,
    })
    .await?;

    match outcome {
        TodoAction::ItemEdited { .. } => Ok(home_redirect().into_response()),
        TodoAction::Rejected {
            reason: TodoError::NotFound(id),
            ..
        } => Err(AppError::not_found("Item", id)),
        TodoAction::Rejected { reason, .. } => {
            let item = find_item(&state, id).await?;
            let view = EditView {
                error: Some(reason.to_string()),
                draft: submitted.item,
                completed: completed.unwrap_or(item.completed),
                item,
            };
            Ok(templates::edit(&view)
                .with_status(StatusCode::UNPROCESSABLE_ENTITY)
                .into_response())
        },
        other => Err(unexpected(&other)),
    }
}
