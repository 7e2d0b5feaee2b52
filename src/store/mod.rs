//! Persistence seams for identities, orders and menus.
//!
//! Handlers only see these traits; [`SqliteStore`] is the production
//! implementation and tests swap in mocks to inject faults.

pub mod sqlite;

use crate::{
    auth::models::{User, UserRole},
    models::{MenuItem, NewMenuItem, NewOrder, Order, OrderUpdate},
};
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

pub use sqlite::SqliteStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("{0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Account fields supplied at registration.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub role: UserRole,
}

/// Admin-editable account fields; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct UserUpdate {
    pub username: Option<String>,
    pub role: Option<UserRole>,
    pub active: Option<bool>,
}

#[cfg_attr(test, mockall::automock)]
pub trait UserRepository: Send + Sync {
    fn create(&self, user: NewUser) -> StoreResult<User>;
    fn find_by_username(&self, username: &str) -> StoreResult<Option<User>>;
    fn find_by_id(&self, id: &Uuid) -> StoreResult<Option<User>>;
    fn list(&self) -> StoreResult<Vec<User>>;
    fn list_by_role(&self, role: UserRole) -> StoreResult<Vec<User>>;
    fn update(&self, id: &Uuid, update: &UserUpdate) -> StoreResult<()>;
    fn set_active(&self, id: &Uuid, active: bool) -> StoreResult<()>;
}

#[cfg_attr(test, mockall::automock)]
pub trait OrderRepository: Send + Sync {
    fn create(&self, order: NewOrder) -> StoreResult<Order>;
    fn find_by_id(&self, id: &Uuid) -> StoreResult<Option<Order>>;
    fn list(&self) -> StoreResult<Vec<Order>>;
    fn list_by_customer(&self, customer_id: &Uuid) -> StoreResult<Vec<Order>>;
    fn list_by_restaurant(&self, restaurant_id: &Uuid) -> StoreResult<Vec<Order>>;
    fn list_by_delivery(&self, delivery_id: &Uuid) -> StoreResult<Vec<Order>>;
    fn update(&self, id: &Uuid, update: &OrderUpdate) -> StoreResult<Order>;
}

#[cfg_attr(test, mockall::automock)]
pub trait MenuRepository: Send + Sync {
    fn add_item(&self, item: NewMenuItem) -> StoreResult<MenuItem>;
    fn list_by_restaurant(&self, restaurant_id: &Uuid) -> StoreResult<Vec<MenuItem>>;
    fn search(&self, query: &str) -> StoreResult<Vec<MenuItem>>;
}
