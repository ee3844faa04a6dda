use std::future::Future;
use std::ops::Deref;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use deadpool_postgres::{Manager, ManagerConfig, Object, Pool, RecyclingMethod, Runtime};
use tokio_postgres::{NoTls, Row};
use tracing::{debug, info, warn};

use super::{StorageConfig, ToDoStorage, UserStorage};
use crate::error::{Result, StorageError};
use crate::types::{ToDo, User};

const ADD_TODO_QUERY: &str = r#"
    INSERT INTO todo_app.todo_list
        (id, user_id, created_at, updated_at, message)
    VALUES
        (DEFAULT, $1, DEFAULT, DEFAULT, $2)"#;

const UPDATE_TODO_QUERY: &str = "UPDATE todo_app.todo_list SET message = $1 WHERE id = $2";

const DELETE_TODO_QUERY: &str = "DELETE FROM todo_app.todo_list WHERE id = $1";

const GET_TODO_QUERY: &str =
    "SELECT id, user_id, created_at, updated_at, message FROM todo_app.todo_list WHERE id = $1";

const LIST_TODOS_QUERY: &str = r#"
    SELECT id, user_id, created_at, updated_at, message
    FROM todo_app.todo_list
    WHERE user_id = $1
    ORDER BY id
    LIMIT $2 OFFSET $3"#;

const GET_USER_QUERY: &str = "SELECT id, name FROM todo_app.users WHERE id = $1";

/// PostgreSQL-backed storage over a deadpool connection pool.
///
/// Every statement runs under `query_timeout`. If the deadline passes, or the
/// caller stops polling (client hung up), a cancel request is sent to the
/// server for the statement still in flight. The connection it ran on is
/// detached from the pool so no later checkout can be hit by that cancel.
#[derive(Clone)]
pub struct PgStorage {
    pool: Pool,
    query_timeout: Duration,
}

impl PgStorage {
    pub async fn connect(cfg: &StorageConfig) -> Result<Self> {
        let pg_config: tokio_postgres::Config = cfg
            .dsn
            .parse()
            .map_err(StorageError::postgres("parse db DSN"))?;

        let mgr_config = ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        };
        let mgr = Manager::from_config(pg_config, NoTls, mgr_config);
        let pool = Pool::builder(mgr)
            .max_size(cfg.pool_size)
            .runtime(Runtime::Tokio1)
            .wait_timeout(Some(cfg.query_timeout))
            .create_timeout(Some(cfg.query_timeout))
            .build()
            .map_err(|e| StorageError::Config(format!("build {} pool: {e}", cfg.driver)))?;

        let storage = Self {
            pool,
            query_timeout: cfg.query_timeout,
        };
        storage.ping().await?;
        info!(pool_size = cfg.pool_size, "Successfully connected to database");
        Ok(storage)
    }

    async fn ping(&self) -> Result<()> {
        const CONTEXT: &str = "ping database";
        let client = self.checkout(CONTEXT).await?;
        client.guarded(CONTEXT, client.simple_query("SELECT 1")).await?;
        Ok(())
    }

    async fn checkout(&self, context: &'static str) -> Result<Checkout> {
        let client = self.pool.get().await.map_err(StorageError::pool(context))?;
        Ok(Checkout {
            client: Some(client),
            query_timeout: self.query_timeout,
            in_flight: AtomicBool::new(false),
        })
    }
}

#[async_trait]
impl ToDoStorage for PgStorage {
    async fn create_todo(&self, todo: ToDo) -> Result<()> {
        const CONTEXT: &str = "insert todo to database";
        let client = self.checkout(CONTEXT).await?;
        let rows = client
            .guarded(CONTEXT, client.execute(ADD_TODO_QUERY, &[&todo.user_id, &todo.message]))
            .await?;
        if rows != 1 {
            return Err(StorageError::RowsAffected(rows));
        }
        debug!(user_id = todo.user_id, "inserted todo");
        Ok(())
    }

    async fn update_todo(&self, todo: ToDo) -> Result<()> {
        const CONTEXT: &str = "update todo in database";
        let client = self.checkout(CONTEXT).await?;
        let rows = client
            .guarded(CONTEXT, client.execute(UPDATE_TODO_QUERY, &[&todo.message, &todo.id]))
            .await?;
        if rows != 1 {
            return Err(StorageError::RowsAffected(rows));
        }
        debug!(todo_id = todo.id, "updated todo");
        Ok(())
    }

    async fn delete_todo(&self, todo_id: i64) -> Result<()> {
        const CONTEXT: &str = "delete todo in database";
        let client = self.checkout(CONTEXT).await?;
        let rows = client
            .guarded(CONTEXT, client.execute(DELETE_TODO_QUERY, &[&todo_id]))
            .await?;
        debug!(todo_id, rows, "deleted todo");
        Ok(())
    }

    async fn get_todo(&self, todo_id: i64) -> Result<Option<ToDo>> {
        const CONTEXT: &str = "query todo";
        let client = self.checkout(CONTEXT).await?;
        let row = client
            .guarded(CONTEXT, client.query_opt(GET_TODO_QUERY, &[&todo_id]))
            .await?;
        match row {
            Some(row) => map_todo_row(&row).map(Some),
            None => {
                debug!(todo_id, "no todo with id");
                Ok(None)
            }
        }
    }

    async fn list_todos(&self, user_id: i64, limit: i64, offset: i64) -> Result<Vec<ToDo>> {
        const CONTEXT: &str = "list todos";
        let client = self.checkout(CONTEXT).await?;
        let rows = client
            .guarded(CONTEXT, client.query(LIST_TODOS_QUERY, &[&user_id, &limit, &offset]))
            .await?;
        rows.iter().map(map_todo_row).collect()
    }
}

#[async_trait]
impl UserStorage for PgStorage {
    async fn get_user(&self, user_id: i64) -> Result<Option<User>> {
        const CONTEXT: &str = "query user";
        let client = self.checkout(CONTEXT).await?;
        let row = client
            .guarded(CONTEXT, client.query_opt(GET_USER_QUERY, &[&user_id]))
            .await?;
        let Some(row) = row else {
            debug!(user_id, "no user with id");
            return Ok(None);
        };
        Ok(Some(User {
            id: row.try_get("id").map_err(StorageError::postgres("scan user"))?,
            name: row.try_get("name").map_err(StorageError::postgres("scan user"))?,
        }))
    }
}

fn map_todo_row(row: &Row) -> Result<ToDo> {
    scan_todo(row).map_err(StorageError::postgres("scan todo"))
}

fn scan_todo(row: &Row) -> std::result::Result<ToDo, tokio_postgres::Error> {
    Ok(ToDo {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        message: row.try_get("message")?,
    })
}

/// A pooled connection that runs statements under a deadline.
///
/// Dropped while a statement is still in flight, it sends a server-side
/// cancel and keeps the connection out of the pool until that cancel is done.
struct Checkout {
    client: Option<Object>,
    query_timeout: Duration,
    in_flight: AtomicBool,
}

impl Checkout {
    async fn guarded<T, F>(&self, context: &'static str, query: F) -> Result<T>
    where
        F: Future<Output = std::result::Result<T, tokio_postgres::Error>>,
    {
        self.in_flight.store(true, Ordering::Release);
        match tokio::time::timeout(self.query_timeout, query).await {
            Ok(result) => {
                self.in_flight.store(false, Ordering::Release);
                result.map_err(StorageError::postgres(context))
            }
            Err(_) => {
                warn!(context, timeout = ?self.query_timeout, "query deadline elapsed, cancelling");
                Err(StorageError::Timeout(self.query_timeout))
            }
        }
    }
}

impl Deref for Checkout {
    type Target = Object;

    fn deref(&self) -> &Object {
        self.client.as_ref().expect("client is only taken on drop")
    }
}

impl Drop for Checkout {
    fn drop(&mut self) {
        if !*self.in_flight.get_mut() {
            return;
        }
        let Some(client) = self.client.take() else {
            return;
        };
        let token = client.cancel_token();
        let client = Object::take(client);
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            return;
        };
        handle.spawn(async move {
            if let Err(error) = token.cancel_query(NoTls).await {
                warn!(%error, "failed to cancel in-flight query");
            }
            drop(client);
        });
    }
}
