//! In-memory store.
//!
//! All state sits behind one `tokio::sync::Mutex`. A transaction holds the
//! owned guard for its whole lifetime and works on a staged copy of the state:
//! `commit` publishes the copy, while `rollback` (or drop) throws it away.
//! Transactions are therefore fully serialized, which makes every
//! check-then-write inside one of them atomic.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

use greengrocer_accounts::{NewUser, User};
use greengrocer_catalog::{Category, Item, ItemListing, ItemUpdate, NewItem};
use greengrocer_core::{CategoryId, CustomerOrderId, Entity, ItemId, OrderLineId, UserId};
use greengrocer_orders::{CustomerOrder, NewCustomerOrder, NewOrderLine, OrderAggregate, OrderLine};

use super::r#trait::{
    AccountStore, CatalogQuantities, CatalogStore, Decrement, OrderStore, OrderTransaction,
    StoreError,
};

#[derive(Debug, Clone, Default)]
struct Sequences {
    category: i64,
    item: i64,
    user: i64,
    customer_order: i64,
    order_line: i64,
}

fn next(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

/// Store `row` under its own id and hand back a copy.
fn insert_row<E>(table: &mut BTreeMap<E::Id, E>, row: E) -> E
where
    E: Entity + Clone,
{
    table.insert(row.id(), row.clone());
    row
}

#[derive(Debug, Clone, Default)]
struct State {
    categories: BTreeMap<CategoryId, Category>,
    items: BTreeMap<ItemId, Item>,
    users: BTreeMap<UserId, User>,
    customer_orders: BTreeMap<CustomerOrderId, CustomerOrder>,
    order_lines: BTreeMap<OrderLineId, OrderLine>,
    seq: Sequences,
}

impl State {
    fn aggregate(&self, id: CustomerOrderId) -> Option<OrderAggregate> {
        let header = self.customer_orders.get(&id)?.clone();
        let lines = self
            .order_lines
            .values()
            .filter(|l| l.customer_order_id == id)
            .cloned();
        Some(OrderAggregate::assemble(header, lines))
    }

    fn ensure_category(&self, id: CategoryId) -> Result<(), StoreError> {
        if self.categories.contains_key(&id) {
            Ok(())
        } else {
            Err(StoreError::not_found("category", id))
        }
    }
}

/// In-memory implementation of every store trait.
///
/// Cloning is cheap and every clone shares the same state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Transaction over an [`InMemoryStore`]; see the module docs.
#[derive(Debug)]
pub struct InMemoryTransaction {
    guard: OwnedMutexGuard<State>,
    staged: State,
}

#[async_trait::async_trait]
impl CatalogQuantities for InMemoryTransaction {
    async fn item_quantity(&mut self, item_id: ItemId) -> Result<Option<f64>, StoreError> {
        Ok(self.staged.items.get(&item_id).map(|i| i.quantity))
    }

    async fn try_decrement(
        &mut self,
        item_id: ItemId,
        amount: f64,
    ) -> Result<Decrement, StoreError> {
        let Some(item) = self.staged.items.get_mut(&item_id) else {
            return Ok(Decrement::Missing);
        };
        if item.quantity < amount {
            return Ok(Decrement::Insufficient {
                available: item.quantity,
            });
        }
        item.quantity -= amount;
        Ok(Decrement::Applied {
            remaining: item.quantity,
        })
    }

    async fn increment(&mut self, item_id: ItemId, amount: f64) -> Result<bool, StoreError> {
        match self.staged.items.get_mut(&item_id) {
            Some(item) => {
                item.quantity += amount;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn lock_items(&mut self, _item_ids: &[ItemId]) -> Result<(), StoreError> {
        // The whole state is already held exclusively.
        Ok(())
    }
}

#[async_trait::async_trait]
impl OrderTransaction for InMemoryTransaction {
    async fn insert_customer_order(
        &mut self,
        header: NewCustomerOrder,
    ) -> Result<CustomerOrder, StoreError> {
        let id = CustomerOrderId::new(next(&mut self.staged.seq.customer_order));
        let order = CustomerOrder::from_new(id, header);
        Ok(insert_row(&mut self.staged.customer_orders, order))
    }

    async fn insert_order_line(&mut self, line: NewOrderLine) -> Result<OrderLine, StoreError> {
        if !self.staged.customer_orders.contains_key(&line.customer_order_id) {
            return Err(StoreError::not_found(
                "customer order",
                line.customer_order_id,
            ));
        }
        let id = OrderLineId::new(next(&mut self.staged.seq.order_line));
        let line = OrderLine::from_new(id, line);
        Ok(insert_row(&mut self.staged.order_lines, line))
    }

    async fn lock_customer_order(
        &mut self,
        id: CustomerOrderId,
    ) -> Result<Option<OrderAggregate>, StoreError> {
        // The whole state is already held exclusively.
        Ok(self.staged.aggregate(id))
    }

    async fn delete_order_lines(&mut self, id: CustomerOrderId) -> Result<u64, StoreError> {
        let before = self.staged.order_lines.len();
        self.staged
            .order_lines
            .retain(|_, l| l.customer_order_id != id);
        Ok((before - self.staged.order_lines.len()) as u64)
    }

    async fn delete_customer_order(&mut self, id: CustomerOrderId) -> Result<bool, StoreError> {
        Ok(self.staged.customer_orders.remove(&id).is_some())
    }

    async fn commit(self) -> Result<(), StoreError> {
        let InMemoryTransaction { mut guard, staged } = self;
        *guard = staged;
        Ok(())
    }

    async fn rollback(self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[async_trait::async_trait]
impl OrderStore for InMemoryStore {
    type Tx = InMemoryTransaction;

    async fn begin(&self) -> Result<Self::Tx, StoreError> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        let staged = State::clone(&guard);
        Ok(InMemoryTransaction { guard, staged })
    }

    async fn user_exists(&self, user_id: UserId) -> Result<bool, StoreError> {
        Ok(self.state.lock().await.users.contains_key(&user_id))
    }

    async fn order_lines(&self) -> Result<Vec<OrderLine>, StoreError> {
        Ok(self.state.lock().await.order_lines.values().cloned().collect())
    }

    async fn customer_order(
        &self,
        id: CustomerOrderId,
    ) -> Result<Option<OrderAggregate>, StoreError> {
        Ok(self.state.lock().await.aggregate(id))
    }

    async fn customer_orders_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<OrderAggregate>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .customer_orders
            .values()
            .filter(|o| o.user_id == user_id)
            .filter_map(|o| state.aggregate(o.id))
            .collect())
    }

    async fn item_names(&self, ids: &[ItemId]) -> Result<HashMap<ItemId, String>, StoreError> {
        let state = self.state.lock().await;
        Ok(ids
            .iter()
            .filter_map(|id| state.items.get(id).map(|i| (*id, i.name.clone())))
            .collect())
    }
}

#[async_trait::async_trait]
impl CatalogStore for InMemoryStore {
    async fn create_category(&self, name: &str) -> Result<Category, StoreError> {
        let name = Category::normalize_name(name)?;
        let mut state = self.state.lock().await;
        let id = CategoryId::new(next(&mut state.seq.category));
        Ok(insert_row(&mut state.categories, Category { id, name }))
    }

    async fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        Ok(self.state.lock().await.categories.values().cloned().collect())
    }

    async fn create_item(&self, item: NewItem) -> Result<Item, StoreError> {
        item.validate()?;
        let mut state = self.state.lock().await;
        state.ensure_category(item.category_id)?;
        let id = ItemId::new(next(&mut state.seq.item));
        Ok(insert_row(&mut state.items, Item::from_new(id, item)))
    }

    async fn update_item(&self, id: ItemId, update: ItemUpdate) -> Result<Item, StoreError> {
        update.validate()?;
        let mut state = self.state.lock().await;
        state.ensure_category(update.category_id)?;
        let item = state
            .items
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("item", id))?;
        update.apply_to(item);
        Ok(item.clone())
    }

    async fn delete_item(&self, id: ItemId) -> Result<(), StoreError> {
        match self.state.lock().await.items.remove(&id) {
            Some(_) => Ok(()),
            None => Err(StoreError::not_found("item", id)),
        }
    }

    async fn get_item(&self, id: ItemId) -> Result<Option<Item>, StoreError> {
        Ok(self.state.lock().await.items.get(&id).cloned())
    }

    async fn list_items(&self) -> Result<Vec<ItemListing>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .items
            .values()
            .map(|item| ItemListing {
                category_name: state
                    .categories
                    .get(&item.category_id)
                    .map(|c| c.name.clone()),
                item: item.clone(),
            })
            .collect())
    }
}

#[async_trait::async_trait]
impl AccountStore for InMemoryStore {
    async fn register_user(&self, user: NewUser) -> Result<User, StoreError> {
        user.validate()?;
        let mut state = self.state.lock().await;
        let email = user.normalized_email();
        let phone = user.phone_no.trim();
        if state.users.values().any(|u| u.email == email) {
            return Err(StoreError::Conflict("email already registered".to_string()));
        }
        if state.users.values().any(|u| u.phone_no == phone) {
            return Err(StoreError::Conflict(
                "phone number already registered".to_string(),
            ));
        }
        let id = UserId::new(next(&mut state.seq.user));
        Ok(insert_row(&mut state.users, User::from_new(id, user)))
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.state.lock().await.users.get(&id).cloned())
    }
}
