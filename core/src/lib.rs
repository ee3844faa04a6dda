//! Domain core for the todo service.
//!
//! # Overview
//! Holds the records (`ToDo`, `User`), the storage contract with its
//! PostgreSQL and in-memory implementations, and the `ToDoService` the HTTP
//! layer calls into.
//!
//! # Design
//! - Storage is reached only through `Arc<dyn Storage>`; nothing above this
//!   crate knows which backend is running.
//! - A missing row on lookup is `Ok(None)`, never an error. Writes that must
//!   hit exactly one row say so in `StorageError::RowsAffected`.
//! - The service adds logging and nothing else.

pub mod error;
pub mod service;
pub mod storage;
pub mod types;

pub use error::StorageError;
pub use service::ToDoService;
pub use storage::{MemoryStorage, PgStorage, Storage, StorageConfig, ToDoStorage, UserStorage};
pub use types::{ToDo, User};
