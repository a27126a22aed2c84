//! Postgres-backed store.
//!
//! Schema lives in `migrations/0001_init.sql` and is applied by
//! [`PostgresStore::migrate`].
//!
//! ## Stock safety
//!
//! Quantities are never read, compared and written back from Rust. The
//! decrement is a single conditional statement:
//!
//! ```sql
//! UPDATE items SET quantity = quantity - $2 WHERE id = $1 AND quantity >= $2
//! ```
//!
//! Postgres takes the row lock for the duration of the enclosing transaction,
//! so two orders racing for the same stock serialize on that row and the
//! second one re-evaluates the condition against the committed quantity.
//! Before the first decrement the workflow locks every item of the order in
//! ascending id order (`SELECT ... ORDER BY id FOR UPDATE`), so orders naming
//! the same items in different orders queue up instead of deadlocking.
//! Cancellation locks the order header with `SELECT ... FOR UPDATE`; a
//! concurrent second cancel waits and then finds nothing to cancel.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (unique violation) | `23505` | `Conflict` |
//! | Database (foreign key violation) | `23503` | `Validation` |
//! | Database (check constraint violation) | `23514` | `Validation` |
//! | Database (other) | Any other | `Backend` |
//! | PoolClosed, RowNotFound, Other | N/A | `Backend` |

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{FromRow, PgConnection, PgPool, Postgres, Row, Transaction};
use tracing::{debug, info, instrument};

use greengrocer_accounts::{NewUser, User};
use greengrocer_catalog::{Category, Item, ItemListing, ItemStatus, ItemUpdate, NewItem};
use greengrocer_core::{CategoryId, CustomerOrderId, ItemId, OrderLineId, UserId};
use greengrocer_orders::{CustomerOrder, NewCustomerOrder, NewOrderLine, OrderAggregate, OrderLine};

use super::r#trait::{
    AccountStore, CatalogQuantities, CatalogStore, Decrement, OrderStore, OrderTransaction,
    StoreError,
};
use crate::config::PostgresConfig;

const SCHEMA: &str = include_str!("../../migrations/0001_init.sql");

/// Postgres implementation of every store trait.
///
/// `Send + Sync`; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: Arc<PgPool>,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Open a pool for `config.database_url`.
    #[instrument(skip(config), fields(max_connections = config.max_connections), err)]
    pub async fn connect(config: &PostgresConfig) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        info!("connected to postgres");
        Ok(Self::new(pool))
    }

    /// Apply the bundled schema. Safe to run repeatedly.
    #[instrument(skip(self), err)]
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::raw_sql(SCHEMA)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("migrate", e))?;
        info!("schema migrations applied");
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn connection(
        &self,
    ) -> Result<sqlx::pool::PoolConnection<Postgres>, StoreError> {
        self.pool
            .acquire()
            .await
            .map_err(|e| map_sqlx_error("acquire", e))
    }
}

/// A Postgres transaction. Dropping it without commit rolls back.
pub struct PostgresTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait::async_trait]
impl CatalogQuantities for PostgresTransaction {
    async fn item_quantity(&mut self, item_id: ItemId) -> Result<Option<f64>, StoreError> {
        current_quantity(&mut self.tx, item_id).await
    }

    #[instrument(skip(self), fields(item_id = %item_id), err)]
    async fn try_decrement(
        &mut self,
        item_id: ItemId,
        amount: f64,
    ) -> Result<Decrement, StoreError> {
        let row = sqlx::query(
            r#"
            UPDATE items
            SET quantity = quantity - $2
            WHERE id = $1 AND quantity >= $2
            RETURNING quantity
            "#,
        )
        .bind(item_id.get())
        .bind(amount)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("try_decrement", e))?;

        if let Some(row) = row {
            let remaining: f64 = row
                .try_get("quantity")
                .map_err(|e| decode_error("quantity", e))?;
            return Ok(Decrement::Applied { remaining });
        }

        match current_quantity(&mut self.tx, item_id).await? {
            Some(available) => Ok(Decrement::Insufficient { available }),
            None => Ok(Decrement::Missing),
        }
    }

    async fn increment(&mut self, item_id: ItemId, amount: f64) -> Result<bool, StoreError> {
        let result = sqlx::query("UPDATE items SET quantity = quantity + $2 WHERE id = $1")
            .bind(item_id.get())
            .bind(amount)
            .execute(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx_error("increment", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn lock_items(&mut self, item_ids: &[ItemId]) -> Result<(), StoreError> {
        if item_ids.is_empty() {
            return Ok(());
        }
        let raw: Vec<i64> = item_ids.iter().map(|id| id.get()).collect();
        let locked = sqlx::query("SELECT id FROM items WHERE id = ANY($1) ORDER BY id FOR UPDATE")
            .bind(raw)
            .fetch_all(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx_error("lock_items", e))?;
        debug!(requested = item_ids.len(), locked = locked.len(), "locked items");
        Ok(())
    }
}

#[async_trait::async_trait]
impl OrderTransaction for PostgresTransaction {
    async fn insert_customer_order(
        &mut self,
        header: NewCustomerOrder,
    ) -> Result<CustomerOrder, StoreError> {
        let row = sqlx::query(
            r#"
            INSERT INTO customer_orders (user_id, total_amount, order_date)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(header.user_id.get())
        .bind(header.total_amount)
        .bind(header.order_date)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("insert_customer_order", e))?;

        let id: i64 = row.try_get("id").map_err(|e| decode_error("id", e))?;
        Ok(CustomerOrder::from_new(CustomerOrderId::new(id), header))
    }

    async fn insert_order_line(&mut self, line: NewOrderLine) -> Result<OrderLine, StoreError> {
        let row = sqlx::query(
            r#"
            INSERT INTO orders (item_id, customer_order_id, quantity, unit_price, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(line.item_id.get())
        .bind(line.customer_order_id.get())
        .bind(line.quantity)
        .bind(line.unit_price)
        .bind(line.created_at)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("insert_order_line", e))?;

        let id: i64 = row.try_get("id").map_err(|e| decode_error("id", e))?;
        Ok(OrderLine::from_new(OrderLineId::new(id), line))
    }

    #[instrument(skip(self), fields(customer_order_id = %id), err)]
    async fn lock_customer_order(
        &mut self,
        id: CustomerOrderId,
    ) -> Result<Option<OrderAggregate>, StoreError> {
        load_aggregate(&mut self.tx, id, true).await
    }

    async fn delete_order_lines(&mut self, id: CustomerOrderId) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM orders WHERE customer_order_id = $1")
            .bind(id.get())
            .execute(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx_error("delete_order_lines", e))?;
        Ok(result.rows_affected())
    }

    async fn delete_customer_order(&mut self, id: CustomerOrderId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM customer_orders WHERE id = $1")
            .bind(id.get())
            .execute(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx_error("delete_customer_order", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn commit(self) -> Result<(), StoreError> {
        self.tx
            .commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))
    }

    async fn rollback(self) -> Result<(), StoreError> {
        self.tx
            .rollback()
            .await
            .map_err(|e| map_sqlx_error("rollback", e))
    }
}

#[async_trait::async_trait]
impl OrderStore for PostgresStore {
    type Tx = PostgresTransaction;

    async fn begin(&self) -> Result<Self::Tx, StoreError> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;
        Ok(PostgresTransaction { tx })
    }

    async fn user_exists(&self, user_id: UserId) -> Result<bool, StoreError> {
        let row = sqlx::query("SELECT EXISTS (SELECT 1 FROM users WHERE id = $1) AS present")
            .bind(user_id.get())
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("user_exists", e))?;
        row.try_get("present").map_err(|e| decode_error("present", e))
    }

    async fn order_lines(&self) -> Result<Vec<OrderLine>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, item_id, customer_order_id, quantity, unit_price, created_at
            FROM orders
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("order_lines", e))?;
        decode_rows::<OrderLineRow, _>(&rows, "order line")
    }

    async fn customer_order(
        &self,
        id: CustomerOrderId,
    ) -> Result<Option<OrderAggregate>, StoreError> {
        let mut conn = self.connection().await?;
        load_aggregate(&mut conn, id, false).await
    }

    #[instrument(skip(self), fields(user_id = %user_id), err)]
    async fn customer_orders_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<OrderAggregate>, StoreError> {
        let mut conn = self.connection().await?;
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, total_amount, order_date
            FROM customer_orders
            WHERE user_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(user_id.get())
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| map_sqlx_error("customer_orders_for_user", e))?;
        let headers: Vec<CustomerOrder> =
            decode_rows::<CustomerOrderRow, _>(&rows, "customer order")?;

        let ids: Vec<i64> = headers.iter().map(|h| h.id.get()).collect();
        let mut by_order: HashMap<CustomerOrderId, Vec<OrderLine>> = HashMap::new();
        for line in lines_for_orders(&mut conn, &ids).await? {
            by_order.entry(line.customer_order_id).or_default().push(line);
        }

        debug!(orders = headers.len(), "loaded customer orders");
        Ok(headers
            .into_iter()
            .map(|header| {
                let lines = by_order.remove(&header.id).unwrap_or_default();
                OrderAggregate::assemble(header, lines)
            })
            .collect())
    }

    async fn item_names(&self, ids: &[ItemId]) -> Result<HashMap<ItemId, String>, StoreError> {
        let raw: Vec<i64> = ids.iter().map(|id| id.get()).collect();
        let rows = sqlx::query("SELECT id, name FROM items WHERE id = ANY($1)")
            .bind(raw)
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("item_names", e))?;

        let mut names = HashMap::with_capacity(rows.len());
        for row in rows {
            let id: i64 = row.try_get("id").map_err(|e| decode_error("id", e))?;
            let name: String = row.try_get("name").map_err(|e| decode_error("name", e))?;
            names.insert(ItemId::new(id), name);
        }
        Ok(names)
    }
}

#[async_trait::async_trait]
impl CatalogStore for PostgresStore {
    async fn create_category(&self, name: &str) -> Result<Category, StoreError> {
        let name = Category::normalize_name(name)?;
        let row = sqlx::query("INSERT INTO categories (name) VALUES ($1) RETURNING id")
            .bind(&name)
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("create_category", e))?;
        let id: i64 = row.try_get("id").map_err(|e| decode_error("id", e))?;
        Ok(Category {
            id: CategoryId::new(id),
            name,
        })
    }

    async fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        let rows = sqlx::query("SELECT id, name FROM categories ORDER BY id ASC")
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_categories", e))?;
        decode_rows::<CategoryRow, _>(&rows, "category")
    }

    #[instrument(skip(self, item), fields(category_id = %item.category_id), err)]
    async fn create_item(&self, item: NewItem) -> Result<Item, StoreError> {
        item.validate()?;
        self.ensure_category(item.category_id).await?;
        let row = sqlx::query(
            r#"
            INSERT INTO items (name, description, quantity, category_id, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(item.name.trim())
        .bind(&item.description)
        .bind(item.quantity)
        .bind(item.category_id.get())
        .bind(ItemStatus::Active.as_str())
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_item", e))?;
        let id: i64 = row.try_get("id").map_err(|e| decode_error("id", e))?;
        Ok(Item::from_new(ItemId::new(id), item))
    }

    #[instrument(skip(self, update), fields(item_id = %id), err)]
    async fn update_item(&self, id: ItemId, update: ItemUpdate) -> Result<Item, StoreError> {
        update.validate()?;
        self.ensure_category(update.category_id).await?;
        let row = sqlx::query(
            r#"
            UPDATE items
            SET name = $2,
                description = $3,
                quantity = $4,
                category_id = $5,
                status = COALESCE($6::text, status)
            WHERE id = $1
            RETURNING id, name, description, quantity, category_id, status
            "#,
        )
        .bind(id.get())
        .bind(update.name.trim())
        .bind(&update.description)
        .bind(update.quantity)
        .bind(update.category_id.get())
        .bind(update.status.map(ItemStatus::as_str))
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_item", e))?;

        match row {
            Some(row) => item_from_row(&row),
            None => Err(StoreError::not_found("item", id)),
        }
    }

    async fn delete_item(&self, id: ItemId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM items WHERE id = $1")
            .bind(id.get())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_item", e))?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("item", id));
        }
        Ok(())
    }

    async fn get_item(&self, id: ItemId) -> Result<Option<Item>, StoreError> {
        let row = sqlx::query(
            "SELECT id, name, description, quantity, category_id, status FROM items WHERE id = $1",
        )
        .bind(id.get())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_item", e))?;
        row.as_ref().map(item_from_row).transpose()
    }

    async fn list_items(&self) -> Result<Vec<ItemListing>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT i.id, i.name, i.description, i.quantity, i.category_id, i.status,
                   c.name AS category_name
            FROM items i
            LEFT JOIN categories c ON c.id = i.category_id
            ORDER BY i.id ASC
            "#,
        )
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_items", e))?;

        let mut listings = Vec::with_capacity(rows.len());
        for row in &rows {
            listings.push(ItemListing {
                item: item_from_row(row)?,
                category_name: row
                    .try_get("category_name")
                    .map_err(|e| decode_error("category_name", e))?,
            });
        }
        Ok(listings)
    }
}

impl PostgresStore {
    async fn ensure_category(&self, id: CategoryId) -> Result<(), StoreError> {
        let row = sqlx::query("SELECT EXISTS (SELECT 1 FROM categories WHERE id = $1) AS present")
            .bind(id.get())
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("ensure_category", e))?;
        let present: bool = row.try_get("present").map_err(|e| decode_error("present", e))?;
        if present {
            Ok(())
        } else {
            Err(StoreError::not_found("category", id))
        }
    }
}

#[async_trait::async_trait]
impl AccountStore for PostgresStore {
    #[instrument(skip(self, user), err)]
    async fn register_user(&self, user: NewUser) -> Result<User, StoreError> {
        user.validate()?;
        let email = user.normalized_email();

        let row = sqlx::query("SELECT EXISTS (SELECT 1 FROM users WHERE email = $1) AS present")
            .bind(&email)
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("register_user", e))?;
        let taken: bool = row.try_get("present").map_err(|e| decode_error("present", e))?;
        if taken {
            return Err(StoreError::Conflict("email already registered".to_string()));
        }

        // A concurrent registration with the same email or phone still hits
        // the unique constraints and comes back as Conflict.
        let row = sqlx::query(
            r#"
            INSERT INTO users (name, email, phone_no, address)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(user.name.trim())
        .bind(&email)
        .bind(user.phone_no.trim())
        .bind(&user.address)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("register_user", e))?;
        let id: i64 = row.try_get("id").map_err(|e| decode_error("id", e))?;
        Ok(User::from_new(UserId::new(id), user))
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let row = sqlx::query("SELECT id, name, email, phone_no, address FROM users WHERE id = $1")
            .bind(id.get())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_user", e))?;
        match row {
            Some(row) => UserRow::from_row(&row)
                .map(Into::into)
                .map(Some)
                .map_err(|e| decode_error("user", e)),
            None => Ok(None),
        }
    }
}

async fn current_quantity(
    conn: &mut PgConnection,
    item_id: ItemId,
) -> Result<Option<f64>, StoreError> {
    let row = sqlx::query("SELECT quantity FROM items WHERE id = $1")
        .bind(item_id.get())
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| map_sqlx_error("item_quantity", e))?;
    row.map(|r| r.try_get("quantity"))
        .transpose()
        .map_err(|e| decode_error("quantity", e))
}

async fn load_aggregate(
    conn: &mut PgConnection,
    id: CustomerOrderId,
    for_update: bool,
) -> Result<Option<OrderAggregate>, StoreError> {
    let sql = if for_update {
        "SELECT id, user_id, total_amount, order_date FROM customer_orders WHERE id = $1 FOR UPDATE"
    } else {
        "SELECT id, user_id, total_amount, order_date FROM customer_orders WHERE id = $1"
    };
    let row = sqlx::query(sql)
        .bind(id.get())
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| map_sqlx_error("load_customer_order", e))?;
    let Some(row) = row else {
        return Ok(None);
    };
    let header: CustomerOrder = CustomerOrderRow::from_row(&row)
        .map_err(|e| decode_error("customer order", e))?
        .into();

    let lines = lines_for_orders(conn, &[id.get()]).await?;
    Ok(Some(OrderAggregate::assemble(header, lines)))
}

async fn lines_for_orders(
    conn: &mut PgConnection,
    order_ids: &[i64],
) -> Result<Vec<OrderLine>, StoreError> {
    if order_ids.is_empty() {
        return Ok(Vec::new());
    }
    let rows = sqlx::query(
        r#"
        SELECT id, item_id, customer_order_id, quantity, unit_price, created_at
        FROM orders
        WHERE customer_order_id = ANY($1)
        ORDER BY id ASC
        "#,
    )
    .bind(order_ids)
    .fetch_all(&mut *conn)
    .await
    .map_err(|e| map_sqlx_error("load_order_lines", e))?;
    decode_rows::<OrderLineRow, _>(&rows, "order line")
}

fn item_from_row(row: &PgRow) -> Result<Item, StoreError> {
    let status: String = row.try_get("status").map_err(|e| decode_error("status", e))?;
    Ok(Item {
        id: ItemId::new(row.try_get("id").map_err(|e| decode_error("id", e))?),
        name: row.try_get("name").map_err(|e| decode_error("name", e))?,
        description: row
            .try_get("description")
            .map_err(|e| decode_error("description", e))?,
        quantity: row
            .try_get("quantity")
            .map_err(|e| decode_error("quantity", e))?,
        category_id: CategoryId::new(
            row.try_get("category_id")
                .map_err(|e| decode_error("category_id", e))?,
        ),
        status: ItemStatus::from_str(&status)
            .map_err(|e| StoreError::backend(format!("unreadable item status: {e}")))?,
    })
}

fn decode_rows<R, T>(rows: &[PgRow], what: &str) -> Result<Vec<T>, StoreError>
where
    R: for<'r> FromRow<'r, PgRow> + Into<T>,
{
    rows.iter()
        .map(|row| R::from_row(row).map(Into::into))
        .collect::<Result<Vec<T>, sqlx::Error>>()
        .map_err(|e| decode_error(what, e))
}

fn decode_error(what: &str, err: sqlx::Error) -> StoreError {
    StoreError::backend(format!("failed to decode {what}: {err}"))
}

/// Map SQLx errors to `StoreError`; see the table in the module docs.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23505") => StoreError::Conflict(msg),
                Some("23503") | Some("23514") => StoreError::Validation(msg),
                _ => StoreError::Backend(msg),
            }
        }
        sqlx::Error::PoolClosed => {
            StoreError::backend(format!("connection pool closed in {}", operation))
        }
        sqlx::Error::RowNotFound => {
            StoreError::backend(format!("unexpected row not found in {}", operation))
        }
        _ => StoreError::backend(format!("sqlx error in {}: {}", operation, err)),
    }
}

// SQLx row types

#[derive(Debug)]
struct CategoryRow {
    id: i64,
    name: String,
}

impl<'r> FromRow<'r, PgRow> for CategoryRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(CategoryRow {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
        })
    }
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Category {
            id: CategoryId::new(row.id),
            name: row.name,
        }
    }
}

#[derive(Debug)]
struct UserRow {
    id: i64,
    name: String,
    email: String,
    phone_no: String,
    address: String,
}

impl<'r> FromRow<'r, PgRow> for UserRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(UserRow {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            phone_no: row.try_get("phone_no")?,
            address: row.try_get("address")?,
        })
    }
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: UserId::new(row.id),
            name: row.name,
            email: row.email,
            phone_no: row.phone_no,
            address: row.address,
        }
    }
}

#[derive(Debug)]
struct CustomerOrderRow {
    id: i64,
    user_id: i64,
    total_amount: f64,
    order_date: chrono::DateTime<chrono::Utc>,
}

impl<'r> FromRow<'r, PgRow> for CustomerOrderRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(CustomerOrderRow {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            total_amount: row.try_get("total_amount")?,
            order_date: row.try_get("order_date")?,
        })
    }
}

impl From<CustomerOrderRow> for CustomerOrder {
    fn from(row: CustomerOrderRow) -> Self {
        CustomerOrder {
            id: CustomerOrderId::new(row.id),
            user_id: UserId::new(row.user_id),
            total_amount: row.total_amount,
            order_date: row.order_date,
        }
    }
}

#[derive(Debug)]
struct OrderLineRow {
    id: i64,
    item_id: i64,
    customer_order_id: i64,
    quantity: f64,
    unit_price: f64,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl<'r> FromRow<'r, PgRow> for OrderLineRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(OrderLineRow {
            id: row.try_get("id")?,
            item_id: row.try_get("item_id")?,
            customer_order_id: row.try_get("customer_order_id")?,
            quantity: row.try_get("quantity")?,
            unit_price: row.try_get("unit_price")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

impl From<OrderLineRow> for OrderLine {
    fn from(row: OrderLineRow) -> Self {
        OrderLine {
            id: OrderLineId::new(row.id),
            item_id: ItemId::new(row.item_id),
            customer_order_id: CustomerOrderId::new(row.customer_order_id),
            quantity: row.quantity,
            unit_price: row.unit_price,
            created_at: row.created_at,
        }
    }
}
