//! Order Service
//!
//! Orchestrates validation, reservation and persistence for every order
//! operation. Mutations follow a fixed shape: resolve and authorize on
//! the way in, then run the stock and order writes inside one write
//! transaction so a failure at any step leaves the store unchanged.

use std::collections::BTreeSet;

use shared::message::ChangeAction;
use shared::models::{Order, OrderCreate, OrderUpdate, Page, PageQuery};
use shared::util::{now_millis, snowflake_id};

use super::{reservation, validate_lines, OrderAccess, OrderError};
use crate::auth::CurrentUser;
use crate::db::repository::{funko, order as order_repo, user as user_repo};
use crate::db::DbService;
use crate::notifications::Notifier;

const RESOURCE: &str = "order";

#[derive(Clone)]
pub struct OrderService {
    db: DbService,
    notifier: Notifier,
}

fn distinct_funko_ids(lines: &[shared::models::OrderLine]) -> Vec<i64> {
    lines
        .iter()
        .map(|line| line.funko_id)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

impl OrderService {
    pub fn new(db: DbService, notifier: Notifier) -> Self {
        Self { db, notifier }
    }

    /// Place a new order: authorize, validate against live inventory,
    /// reserve stock, persist. The reservation and the insert share a
    /// transaction; its rollback is the compensation for a partial
    /// reservation.
    pub async fn create(
        &self,
        payload: OrderCreate,
        requester: &CurrentUser,
    ) -> Result<Order, OrderError> {
        if payload.order_lines.is_empty() {
            return Err(OrderError::Empty);
        }
        if user_repo::find_by_id(self.db.pool(), payload.user_id)
            .await?
            .is_none()
        {
            return Err(OrderError::UnknownUser(payload.user_id));
        }
        if !OrderAccess::can_create_for(payload.user_id, requester) {
            return Err(OrderError::Forbidden);
        }

        // Advisory validation on a committed snapshot. Read-only, so it can
        // run (and re-run) without touching anything; stock sufficiency is
        // enforced again by the conditional decrement below.
        {
            let mut conn = self.db.pool().acquire().await?;
            let ids = distinct_funko_ids(&payload.order_lines);
            let levels = funko::stock_levels(&mut *conn, &ids).await?;
            validate_lines(&payload.order_lines, &levels)?;
        }

        let now = now_millis();
        let order = Order {
            id: snowflake_id(),
            user_id: payload.user_id,
            client: payload.client,
            total_items: Order::computed_total_items(&payload.order_lines),
            total: Order::computed_total(&payload.order_lines),
            order_lines: payload.order_lines,
            created_at: now,
            updated_at: now,
        };

        let mut txn = self.db.begin_write().await?;
        reservation::reserve(txn.conn(), &order.order_lines).await?;
        order_repo::insert(txn.conn(), &order).await?;
        txn.commit().await?;

        tracing::info!(
            order_id = order.id,
            user_id = order.user_id,
            total = order.total,
            total_items = order.total_items,
            "Order created"
        );
        self.notify(ChangeAction::Created, &order);
        Ok(order)
    }

    /// Paginated listing, scoped to the requester unless they are admin.
    pub async fn list(
        &self,
        query: PageQuery,
        requester: &CurrentUser,
    ) -> Result<Page<Order>, OrderError> {
        let scope = OrderAccess::list_scope(requester);
        let (limit, offset) = query.window();
        let mut conn = self.db.pool().acquire().await?;
        let items = order_repo::find_scoped(&mut *conn, limit, offset, scope).await?;
        let total = order_repo::count_scoped(&mut *conn, scope).await?;
        Ok(Page::new(items, total, query))
    }

    /// Fetch one order. An order the requester may not see is reported as
    /// not found, indistinguishable from one that does not exist.
    pub async fn get(&self, id: i64, requester: &CurrentUser) -> Result<Order, OrderError> {
        let mut conn = self.db.pool().acquire().await?;
        let order = order_repo::find_by_id(&mut *conn, id)
            .await?
            .ok_or(OrderError::NotFound(id))?;
        if !OrderAccess::can_view(&order, requester) {
            return Err(OrderError::NotFound(id));
        }
        Ok(order)
    }

    /// Replace an order's lines: release the old reservation, validate the
    /// replacement against the freed stock, re-reserve, persist — all in
    /// one transaction. A failed update leaves the old order and the old
    /// reservation fully intact.
    pub async fn update(
        &self,
        id: i64,
        payload: OrderUpdate,
        requester: &CurrentUser,
    ) -> Result<Order, OrderError> {
        if payload.order_lines.is_empty() {
            return Err(OrderError::Empty);
        }

        let mut txn = self.db.begin_write().await?;

        let existing = order_repo::find_by_id(txn.conn(), id)
            .await?
            .ok_or(OrderError::NotFound(id))?;
        if !OrderAccess::can_view(&existing, requester) {
            return Err(OrderError::NotFound(id));
        }
        if user_repo::find_by_id_conn(txn.conn(), payload.user_id)
            .await?
            .is_none()
        {
            return Err(OrderError::UnknownUser(payload.user_id));
        }

        // Release first: the new lines validate and reserve against stock
        // that already includes what this order had claimed.
        reservation::release(txn.conn(), &existing.order_lines).await?;

        let ids = distinct_funko_ids(&payload.order_lines);
        let levels = funko::stock_levels(txn.conn(), &ids).await?;
        validate_lines(&payload.order_lines, &levels)?;
        reservation::reserve(txn.conn(), &payload.order_lines).await?;

        let order = Order {
            id,
            user_id: payload.user_id,
            client: payload.client,
            total_items: Order::computed_total_items(&payload.order_lines),
            total: Order::computed_total(&payload.order_lines),
            order_lines: payload.order_lines,
            created_at: existing.created_at,
            updated_at: now_millis(),
        };
        order_repo::update(txn.conn(), &order).await?;
        txn.commit().await?;

        tracing::info!(order_id = order.id, total = order.total, "Order updated");
        self.notify(ChangeAction::Updated, &order);
        Ok(order)
    }

    /// Delete an order and give its reservation back. Terminal: there is
    /// no cancelled state.
    pub async fn remove(&self, id: i64, requester: &CurrentUser) -> Result<(), OrderError> {
        let mut txn = self.db.begin_write().await?;

        let existing = order_repo::find_by_id(txn.conn(), id)
            .await?
            .ok_or(OrderError::NotFound(id))?;
        if !OrderAccess::can_view(&existing, requester) {
            return Err(OrderError::NotFound(id));
        }

        reservation::release(txn.conn(), &existing.order_lines).await?;
        order_repo::delete(txn.conn(), id).await?;
        txn.commit().await?;

        tracing::info!(order_id = id, "Order deleted");
        self.notifier
            .publish(RESOURCE, ChangeAction::Deleted, id, None);
        Ok(())
    }

    fn notify(&self, action: ChangeAction, order: &Order) {
        let data = serde_json::to_value(order).ok();
        self.notifier.publish(RESOURCE, action, order.id, data);
    }
}
