//! Repository trait definitions
//!
//! These traits define the contract for data access.
//! Implementations live in the infrastructure layer; one implementation per
//! trait, whichever database `DATABASE_URL` points at.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

use super::{DomainError, Order, OrderDraft, OrderStatus};
use crate::catalog::CatalogFilter;
use crate::models::category::{self, CategoryInput};
use crate::models::{Book, BookInput};

/// Repository trait for the book catalog
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// Find all books matching the filter, newest first, with their categories
    async fn find_all(&self, filter: CatalogFilter) -> Result<Vec<Book>, DomainError>;

    /// Find a single book by ID
    async fn find_by_id(&self, id: i32) -> Result<Option<Book>, DomainError>;

    /// Find several books, in the order of `ids`; unknown ids are skipped
    async fn find_many(&self, ids: &[i32]) -> Result<Vec<Book>, DomainError>;

    /// Create a new book and its category links
    async fn create(&self, input: BookInput) -> Result<Book, DomainError>;

    /// Replace an existing book and its category links
    async fn update(&self, id: i32, input: BookInput) -> Result<Book, DomainError>;

    /// Delete a book by ID
    async fn delete(&self, id: i32) -> Result<(), DomainError>;
}

/// Repository trait for Category entity
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn find_all(&self) -> Result<Vec<category::Model>, DomainError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<category::Model>, DomainError>;

    async fn create(&self, input: CategoryInput) -> Result<category::Model, DomainError>;

    async fn update(&self, id: i32, input: CategoryInput)
    -> Result<category::Model, DomainError>;

    /// Delete a category, detaching its children and its books
    async fn delete(&self, id: i32) -> Result<(), DomainError>;
}

/// Repository trait for orders
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Price the draft from the catalog and persist header + items atomically
    async fn create(&self, draft: OrderDraft) -> Result<Order, DomainError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<Order>, DomainError>;

    /// Orders of one user, newest first
    async fn find_by_user(&self, user_id: i32) -> Result<Vec<Order>, DomainError>;

    /// Every order, newest first
    async fn find_all(&self) -> Result<Vec<Order>, DomainError>;

    async fn update_status(&self, id: i32, status: OrderStatus) -> Result<Order, DomainError>;
}

/// A live login session
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub id: String,
    pub user_id: i32,
    pub expires_at: DateTime<Utc>,
}

/// Persisted session store
#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn create(&self, user_id: i32, ttl: chrono::Duration) -> Result<Session, DomainError>;

    /// Session by id, `None` when unknown or expired
    async fn find_active(&self, id: &str) -> Result<Option<Session>, DomainError>;

    async fn revoke(&self, id: &str) -> Result<(), DomainError>;

    /// Remove expired rows, returns how many were deleted
    async fn purge_expired(&self) -> Result<u64, DomainError>;
}

/// JSON key-value store (settings, content slots)
#[async_trait]
pub trait KeyValueRepository: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>, DomainError>;

    async fn set(&self, key: &str, value: Value) -> Result<(), DomainError>;
}
