//! SQLite Store
//! Mission: Persist accounts, orders and menus in a single SQLite database
//!
//! - One connection behind a mutex; every repository call is a single statement
//!   or a short read-after-write under the same lock
//! - WAL mode for on-disk databases
//! - Order items stored as a JSON column

use crate::{
    auth::models::{User, UserRole},
    models::{MenuItem, NewMenuItem, NewOrder, Order, OrderItem, OrderStatus, OrderUpdate},
    store::{
        MenuRepository, NewUser, OrderRepository, StoreError, StoreResult, UserRepository,
        UserUpdate,
    },
};
use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use parking_lot::Mutex;
use rusqlite::{params, types::Type, Connection, OptionalExtension, Row};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    username TEXT UNIQUE NOT NULL,
    password_hash TEXT NOT NULL,
    role TEXT NOT NULL,
    active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_users_role ON users(role, active);

CREATE TABLE IF NOT EXISTS orders (
    id TEXT PRIMARY KEY,
    customer_id TEXT NOT NULL,
    restaurant_id TEXT NOT NULL,
    items_json TEXT NOT NULL,
    total REAL NOT NULL,
    status TEXT NOT NULL,
    delivery_id TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_orders_customer ON orders(customer_id, created_at DESC);
CREATE INDEX IF NOT EXISTS idx_orders_restaurant ON orders(restaurant_id, created_at DESC);
CREATE INDEX IF NOT EXISTS idx_orders_delivery ON orders(delivery_id, created_at DESC);

CREATE TABLE IF NOT EXISTS menu_items (
    id TEXT PRIMARY KEY,
    restaurant_id TEXT NOT NULL,
    name TEXT NOT NULL,
    description TEXT NOT NULL,
    price REAL NOT NULL,
    available INTEGER NOT NULL DEFAULT 1
);

CREATE INDEX IF NOT EXISTS idx_menu_items_restaurant ON menu_items(restaurant_id);
"#;

const USER_COLUMNS: &str = "id, username, password_hash, role, active, created_at";
const ORDER_COLUMNS: &str =
    "id, customer_id, restaurant_id, items_json, total, status, delivery_id, created_at, updated_at";
const MENU_COLUMNS: &str = "id, restaurant_id, name, description, price, available";

/// Store with SQLite backend
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (or create) a database file and initialize the schema
    pub fn open(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path)
            .with_context(|| format!("Failed to open database at {}", db_path))?;
        conn.execute_batch("PRAGMA journal_mode = WAL; PRAGMA synchronous = NORMAL;")
            .context("Failed to enable WAL")?;

        let store = Self::init(conn)?;
        info!("🗄️  Store opened at {}", db_path);
        Ok(store)
    }

    /// Private in-memory database, used by tests and throwaway runs
    pub fn in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory().context("Failed to open in-memory database")?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA_SQL)
            .context("Failed to initialize schema")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn query_users(&self, sql: &str, args: &[&dyn rusqlite::ToSql]) -> StoreResult<Vec<User>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(sql)?;
        let users = stmt
            .query_map(args, user_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(users)
    }

    fn query_orders(&self, sql: &str, args: &[&dyn rusqlite::ToSql]) -> StoreResult<Vec<Order>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(sql)?;
        let orders = stmt
            .query_map(args, order_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(orders)
    }

    fn query_menu(&self, sql: &str, args: &[&dyn rusqlite::ToSql]) -> StoreResult<Vec<MenuItem>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(sql)?;
        let items = stmt
            .query_map(args, menu_item_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }
}

/// Match `%`, `_` and `\` literally inside a LIKE pattern.
fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn conversion_error(idx: usize, err: impl std::error::Error + Send + Sync + 'static) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

fn uuid_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Uuid> {
    let raw: String = row.get(idx)?;
    Uuid::parse_str(&raw).map_err(|e| conversion_error(idx, e))
}

fn optional_uuid_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<Uuid>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|s| Uuid::parse_str(&s).map_err(|e| conversion_error(idx, e)))
        .transpose()
}

#[derive(Debug, thiserror::Error)]
#[error("unknown value '{0}'")]
struct UnknownValue(String);

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    let role_str: String = row.get(3)?;
    Ok(User {
        id: uuid_column(row, 0)?,
        username: row.get(1)?,
        password_hash: row.get(2)?,
        role: UserRole::parse(&role_str).ok_or_else(|| conversion_error(3, UnknownValue(role_str)))?,
        active: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn order_from_row(row: &Row<'_>) -> rusqlite::Result<Order> {
    let items_json: String = row.get(3)?;
    let items: Vec<OrderItem> =
        serde_json::from_str(&items_json).map_err(|e| conversion_error(3, e))?;
    let status_str: String = row.get(5)?;

    Ok(Order {
        id: uuid_column(row, 0)?,
        customer_id: uuid_column(row, 1)?,
        restaurant_id: uuid_column(row, 2)?,
        items,
        total: row.get(4)?,
        status: OrderStatus::parse(&status_str)
            .ok_or_else(|| conversion_error(5, UnknownValue(status_str)))?,
        delivery_id: optional_uuid_column(row, 6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

fn menu_item_from_row(row: &Row<'_>) -> rusqlite::Result<MenuItem> {
    Ok(MenuItem {
        id: uuid_column(row, 0)?,
        restaurant_id: uuid_column(row, 1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        price: row.get(4)?,
        available: row.get(5)?,
    })
}

impl UserRepository for SqliteStore {
    fn create(&self, new_user: NewUser) -> StoreResult<User> {
        let user = User {
            id: Uuid::new_v4(),
            username: new_user.username,
            password_hash: new_user.password_hash,
            role: new_user.role,
            active: true,
            created_at: now_rfc3339(),
        };

        self.conn.lock().execute(
            "INSERT INTO users (id, username, password_hash, role, active, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                user.id.to_string(),
                user.username,
                user.password_hash,
                user.role.as_str(),
                user.active,
                user.created_at,
            ],
        )?;

        debug!("Inserted user {} ({})", user.username, user.role.as_str());
        Ok(user)
    }

    fn find_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let conn = self.conn.lock();
        let user = conn
            .query_row(
                &format!("SELECT {} FROM users WHERE username = ?1", USER_COLUMNS),
                params![username],
                user_from_row,
            )
            .optional()?;
        Ok(user)
    }

    fn find_by_id(&self, id: &Uuid) -> StoreResult<Option<User>> {
        let conn = self.conn.lock();
        let user = conn
            .query_row(
                &format!("SELECT {} FROM users WHERE id = ?1", USER_COLUMNS),
                params![id.to_string()],
                user_from_row,
            )
            .optional()?;
        Ok(user)
    }

    fn list(&self) -> StoreResult<Vec<User>> {
        self.query_users(
            &format!("SELECT {} FROM users ORDER BY created_at, rowid", USER_COLUMNS),
            params![],
        )
    }

    fn list_by_role(&self, role: UserRole) -> StoreResult<Vec<User>> {
        self.query_users(
            &format!(
                "SELECT {} FROM users WHERE role = ?1 ORDER BY username",
                USER_COLUMNS
            ),
            params![role.as_str()],
        )
    }

    fn update(&self, id: &Uuid, update: &UserUpdate) -> StoreResult<()> {
        let rows = self.conn.lock().execute(
            "UPDATE users SET
                username = COALESCE(?2, username),
                role = COALESCE(?3, role),
                active = COALESCE(?4, active)
             WHERE id = ?1",
            params![
                id.to_string(),
                update.username,
                update.role.map(|r| r.as_str()),
                update.active,
            ],
        )?;

        if rows == 0 {
            return Err(StoreError::NotFound("User"));
        }
        Ok(())
    }

    fn set_active(&self, id: &Uuid, active: bool) -> StoreResult<()> {
        let rows = self.conn.lock().execute(
            "UPDATE users SET active = ?2 WHERE id = ?1",
            params![id.to_string(), active],
        )?;

        if rows == 0 {
            return Err(StoreError::NotFound("User"));
        }
        Ok(())
    }
}

impl OrderRepository for SqliteStore {
    fn create(&self, new_order: NewOrder) -> StoreResult<Order> {
        let now = now_rfc3339();
        let order = Order {
            id: Uuid::new_v4(),
            customer_id: new_order.customer_id,
            restaurant_id: new_order.restaurant_id,
            total: new_order.total(),
            items: new_order.items,
            status: OrderStatus::Pending,
            delivery_id: None,
            created_at: now.clone(),
            updated_at: now,
        };
        let items_json =
            serde_json::to_string(&order.items).map_err(|e| StoreError::Backend(e.to_string()))?;

        self.conn.lock().execute(
            &format!(
                "INSERT INTO orders ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                ORDER_COLUMNS
            ),
            params![
                order.id.to_string(),
                order.customer_id.to_string(),
                order.restaurant_id.to_string(),
                items_json,
                order.total,
                order.status.as_str(),
                order.delivery_id.map(|id| id.to_string()),
                order.created_at,
                order.updated_at,
            ],
        )?;

        Ok(order)
    }

    fn find_by_id(&self, id: &Uuid) -> StoreResult<Option<Order>> {
        let conn = self.conn.lock();
        let order = conn
            .query_row(
                &format!("SELECT {} FROM orders WHERE id = ?1", ORDER_COLUMNS),
                params![id.to_string()],
                order_from_row,
            )
            .optional()?;
        Ok(order)
    }

    fn list(&self) -> StoreResult<Vec<Order>> {
        self.query_orders(
            &format!(
                "SELECT {} FROM orders ORDER BY created_at DESC, rowid DESC",
                ORDER_COLUMNS
            ),
            params![],
        )
    }

    fn list_by_customer(&self, customer_id: &Uuid) -> StoreResult<Vec<Order>> {
        self.query_orders(
            &format!(
                "SELECT {} FROM orders WHERE customer_id = ?1 ORDER BY created_at DESC, rowid DESC",
                ORDER_COLUMNS
            ),
            params![customer_id.to_string()],
        )
    }

    fn list_by_restaurant(&self, restaurant_id: &Uuid) -> StoreResult<Vec<Order>> {
        self.query_orders(
            &format!(
                "SELECT {} FROM orders WHERE restaurant_id = ?1 ORDER BY created_at DESC, rowid DESC",
                ORDER_COLUMNS
            ),
            params![restaurant_id.to_string()],
        )
    }

    fn list_by_delivery(&self, delivery_id: &Uuid) -> StoreResult<Vec<Order>> {
        self.query_orders(
            &format!(
                "SELECT {} FROM orders WHERE delivery_id = ?1 ORDER BY created_at DESC, rowid DESC",
                ORDER_COLUMNS
            ),
            params![delivery_id.to_string()],
        )
    }

    fn update(&self, id: &Uuid, update: &OrderUpdate) -> StoreResult<Order> {
        let conn = self.conn.lock();
        let rows = conn.execute(
            "UPDATE orders SET
                status = COALESCE(?2, status),
                delivery_id = COALESCE(?3, delivery_id),
                updated_at = ?4
             WHERE id = ?1",
            params![
                id.to_string(),
                update.status.map(|s| s.as_str()),
                update.delivery_id.map(|d| d.to_string()),
                now_rfc3339(),
            ],
        )?;

        if rows == 0 {
            return Err(StoreError::NotFound("Order"));
        }

        let order = conn.query_row(
            &format!("SELECT {} FROM orders WHERE id = ?1", ORDER_COLUMNS),
            params![id.to_string()],
            order_from_row,
        )?;
        Ok(order)
    }
}

impl MenuRepository for SqliteStore {
    fn add_item(&self, new_item: NewMenuItem) -> StoreResult<MenuItem> {
        let item = MenuItem {
            id: Uuid::new_v4(),
            restaurant_id: new_item.restaurant_id,
            name: new_item.name,
            description: new_item.description,
            price: new_item.price,
            available: true,
        };

        self.conn.lock().execute(
            &format!(
                "INSERT INTO menu_items ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                MENU_COLUMNS
            ),
            params![
                item.id.to_string(),
                item.restaurant_id.to_string(),
                item.name,
                item.description,
                item.price,
                item.available,
            ],
        )?;

        Ok(item)
    }

    fn list_by_restaurant(&self, restaurant_id: &Uuid) -> StoreResult<Vec<MenuItem>> {
        self.query_menu(
            &format!(
                "SELECT {} FROM menu_items WHERE restaurant_id = ?1 ORDER BY name",
                MENU_COLUMNS
            ),
            params![restaurant_id.to_string()],
        )
    }

    fn search(&self, query: &str) -> StoreResult<Vec<MenuItem>> {
        self.query_menu(
            &format!(
                "SELECT {} FROM menu_items
                 WHERE available = 1 AND name LIKE '%' || ?1 || '%' ESCAPE '\\'
                 ORDER BY name",
                MENU_COLUMNS
            ),
            params![escape_like(query)],
        )
    }
}
