use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{ToDoStorage, UserStorage};
use crate::error::{Result, StorageError};
use crate::types::{ToDo, User};

/// In-process store with the same observable rules as the relational one:
/// ids start at 1, a todo must reference a known user, updates must match a
/// row, deletes never fail.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    inner: RwLock<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    todos: BTreeMap<i64, ToDo>,
    users: HashMap<i64, User>,
    last_id: i64,
}

impl MemoryStorage {
    pub fn with_users(users: impl IntoIterator<Item = User>) -> Self {
        let inner = Inner {
            users: users.into_iter().map(|u| (u.id, u)).collect(),
            ..Inner::default()
        };
        Self {
            inner: RwLock::new(inner),
        }
    }
}

#[async_trait]
impl ToDoStorage for MemoryStorage {
    async fn create_todo(&self, todo: ToDo) -> Result<()> {
        let mut inner = self.inner.write().await;
        if !inner.users.contains_key(&todo.user_id) {
            return Err(StorageError::UserMissing(todo.user_id));
        }
        inner.last_id += 1;
        let now = Utc::now();
        let row = ToDo {
            id: inner.last_id,
            message: todo.message,
            created_at: now,
            updated_at: now,
            user_id: todo.user_id,
        };
        inner.todos.insert(row.id, row);
        Ok(())
    }

    async fn update_todo(&self, todo: ToDo) -> Result<()> {
        let mut inner = self.inner.write().await;
        let row = inner
            .todos
            .get_mut(&todo.id)
            .ok_or(StorageError::RowsAffected(0))?;
        // updated_at is left alone: only the message column is written
        row.message = todo.message;
        Ok(())
    }

    async fn delete_todo(&self, todo_id: i64) -> Result<()> {
        self.inner.write().await.todos.remove(&todo_id);
        Ok(())
    }

    async fn get_todo(&self, todo_id: i64) -> Result<Option<ToDo>> {
        Ok(self.inner.read().await.todos.get(&todo_id).cloned())
    }

    async fn list_todos(&self, user_id: i64, limit: i64, offset: i64) -> Result<Vec<ToDo>> {
        let inner = self.inner.read().await;
        let skip = usize::try_from(offset).unwrap_or(0);
        let take = usize::try_from(limit).unwrap_or(0);
        Ok(inner
            .todos
            .values()
            .filter(|t| t.user_id == user_id)
            .skip(skip)
            .take(take)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl UserStorage for MemoryStorage {
    async fn get_user(&self, user_id: i64) -> Result<Option<User>> {
        Ok(self.inner.read().await.users.get(&user_id).cloned())
    }
}
