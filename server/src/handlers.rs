use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use bytes::Bytes;
use serde::Deserialize;
use todo_core::{ToDo, ToDoService};
use tracing::debug;

use crate::error::HandlerError;

pub(crate) const DEFAULT_PAGE_LIMIT: u32 = 50;
pub(crate) const MAX_PAGE_LIMIT: u32 = 500;

#[derive(Debug, Deserialize)]
pub(crate) struct PageParams {
    limit: Option<u32>,
    offset: Option<u32>,
}

// Bodies are decoded by hand: no content-type check, and a bad body must
// come back as 500 with the decoder's message. Only the first JSON value is
// read; anything after it is ignored.
fn decode_todo(body: &Bytes) -> Result<ToDo, HandlerError> {
    match serde_json::Deserializer::from_slice(body).into_iter::<ToDo>().next() {
        Some(todo) => Ok(todo?),
        None => Err(HandlerError::Decode(serde::de::Error::custom("EOF"))),
    }
}

pub(crate) async fn get_todo(
    State(service): State<ToDoService>,
    Path(raw_id): Path<String>,
) -> Result<Json<ToDo>, HandlerError> {
    let todo_id: i64 = raw_id.parse()?;
    let todo = service.get_todo(todo_id).await?;
    todo.map(Json).ok_or(HandlerError::NotFound)
}

pub(crate) async fn create_todo(
    State(service): State<ToDoService>,
    body: Bytes,
) -> Result<StatusCode, HandlerError> {
    let todo = decode_todo(&body)?;
    service.create_todo(todo).await?;
    Ok(StatusCode::CREATED)
}

pub(crate) async fn update_todo(
    State(service): State<ToDoService>,
    body: Bytes,
) -> Result<StatusCode, HandlerError> {
    let todo = decode_todo(&body)?;
    if todo.message.is_empty() {
        debug!(todo_id = todo.id, "rejecting update with empty message");
        return Err(HandlerError::EmptyMessage);
    }
    service.update_todo(todo).await?;
    Ok(StatusCode::OK)
}

pub(crate) async fn delete_todo(
    State(service): State<ToDoService>,
    Path(raw_id): Path<String>,
) -> Result<StatusCode, HandlerError> {
    let todo_id: i64 = raw_id.parse()?;
    service.delete_todo(todo_id).await?;
    Ok(StatusCode::OK)
}

pub(crate) async fn list_todos(
    State(service): State<ToDoService>,
    Path(raw_user_id): Path<String>,
    Query(page): Query<PageParams>,
) -> Result<Json<Vec<ToDo>>, HandlerError> {
    let user_id: i64 = raw_user_id.parse()?;
    let limit = page.limit.unwrap_or(DEFAULT_PAGE_LIMIT).min(MAX_PAGE_LIMIT);
    let offset = page.offset.unwrap_or(0);
    let todos = service
        .list_todos(user_id, i64::from(limit), i64::from(offset))
        .await?;
    Ok(Json(todos))
}
