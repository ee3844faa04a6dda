//! Domain service between the HTTP layer and storage.
//!
//! # Design
//! Pure forwarding: one method per storage operation, same arguments, same
//! result. The only thing added is a single error log line per failure so
//! the HTTP layer can stay storage-agnostic.

use std::sync::Arc;

use tracing::error;

use crate::error::Result;
use crate::storage::Storage;
use crate::types::ToDo;

#[derive(Clone)]
pub struct ToDoService {
    db: Arc<dyn Storage>,
}

impl ToDoService {
    pub fn new(db: Arc<dyn Storage>) -> Self {
        Self { db }
    }

    pub async fn create_todo(&self, todo: ToDo) -> Result<()> {
        self.db.create_todo(todo).await.inspect_err(|e| {
            error!(error = %e, "cant create new todo");
        })
    }

    pub async fn update_todo(&self, todo: ToDo) -> Result<()> {
        self.db.update_todo(todo).await.inspect_err(|e| {
            error!(error = %e, "cant update todo");
        })
    }

    pub async fn get_todo(&self, todo_id: i64) -> Result<Option<ToDo>> {
        self.db.get_todo(todo_id).await.inspect_err(|e| {
            error!(error = %e, todo_id, "cant return todo");
        })
    }

    pub async fn delete_todo(&self, todo_id: i64) -> Result<()> {
        self.db.delete_todo(todo_id).await.inspect_err(|e| {
            error!(error = %e, todo_id, "cant delete todo");
        })
    }

    pub async fn list_todos(&self, user_id: i64, limit: i64, offset: i64) -> Result<Vec<ToDo>> {
        self.db
            .list_todos(user_id, limit, offset)
            .await
            .inspect_err(|e| {
                error!(error = %e, user_id, "cant list todos");
            })
    }
}
