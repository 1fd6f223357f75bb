// server/src/db/pg_store.rs

use anyhow::Context;
use async_trait::async_trait;
use autoparts_core::models::{
  CartItem, CartLine, Order, OrderFilter, OrderItem, OrderStatus, OrderStatusUpdate, Shop, ShopListing, User,
};
use autoparts_core::store::{CommerceStore, UnitOfWork};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

const USER_COLUMNS: &str = "id, email, first_name, last_name, role, shop_id, is_active, created_at, updated_at";
const SHOP_COLUMNS: &str = "id, name, slug, is_active, created_at, updated_at";
const LISTING_COLUMNS: &str =
  "id, shop_id, name, sku, price_cents, sale_price_cents, stock_quantity, is_active, created_at, updated_at";
const CART_ITEM_COLUMNS: &str = "id, user_id, listing_id, quantity, created_at, updated_at";
const ORDER_COLUMNS: &str = "id, order_number, user_id, shop_id, status, total_amount_cents, shipping_address, \
   billing_address, payment_method, payment_status, tracking_number, shipping_company, notes, created_at, updated_at";
const ORDER_ITEM_COLUMNS: &str = "id, order_id, listing_id, quantity, price_cents, product_name, shop_name, created_at";
const STATUS_UPDATE_COLUMNS: &str = "id, order_id, status, comment, created_at";

const LOCK_CART_LISTINGS_SQL: &str = r#"
  SELECT sp.id
  FROM shop_products sp
  WHERE sp.id IN (SELECT listing_id FROM cart_items WHERE user_id = $1)
  ORDER BY sp.id
  FOR UPDATE
"#;

const CART_LINES_SQL: &str = r#"
  SELECT ci.id AS cart_item_id,
         sp.id AS listing_id,
         s.id AS shop_id,
         s.name AS shop_name,
         sp.name AS product_name,
         COALESCE(sp.sale_price_cents, sp.price_cents) AS unit_price_cents,
         ci.quantity,
         sp.stock_quantity,
         ci.created_at
  FROM cart_items ci
  JOIN shop_products sp ON sp.id = ci.listing_id
  JOIN shops s ON s.id = sp.shop_id
  WHERE ci.user_id = $1
  ORDER BY ci.created_at, ci.id
"#;

// Summed in bigint and held inside [0, i32::MAX], matching `ShopListing::clamped_stock`.
const CLAMPED_STOCK_EXPR: &str = "LEAST(GREATEST(stock_quantity::bigint + $2, 0), 2147483647)::int";

#[derive(Clone)]
pub struct PgStore {
  pool: PgPool,
}

impl PgStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

#[async_trait]
impl CommerceStore for PgStore {
  async fn begin(&self) -> anyhow::Result<Box<dyn UnitOfWork>> {
    let tx = self.pool.begin().await.context("beginning transaction")?;
    Ok(Box::new(PgUnitOfWork { tx }))
  }
}

/// One PostgreSQL transaction. sqlx rolls it back on drop.
pub struct PgUnitOfWork {
  tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
  async fn find_user(&mut self, user_id: Uuid) -> anyhow::Result<Option<User>> {
    let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
    let user = sqlx::query_as::<_, User>(&sql)
      .bind(user_id)
      .fetch_optional(&mut *self.tx)
      .await?;
    Ok(user)
  }

  async fn find_shop(&mut self, shop_id: Uuid) -> anyhow::Result<Option<Shop>> {
    let sql = format!("SELECT {} FROM shops WHERE id = $1", SHOP_COLUMNS);
    let shop = sqlx::query_as::<_, Shop>(&sql)
      .bind(shop_id)
      .fetch_optional(&mut *self.tx)
      .await?;
    Ok(shop)
  }

  async fn find_listing(&mut self, listing_id: Uuid) -> anyhow::Result<Option<ShopListing>> {
    let sql = format!("SELECT {} FROM shop_products WHERE id = $1", LISTING_COLUMNS);
    let listing = sqlx::query_as::<_, ShopListing>(&sql)
      .bind(listing_id)
      .fetch_optional(&mut *self.tx)
      .await?;
    Ok(listing)
  }

  async fn cart_lines(&mut self, user_id: Uuid) -> anyhow::Result<Vec<CartLine>> {
    // Listing rows are locked in id order so concurrent checkouts of
    // overlapping carts queue on each other instead of deadlocking.
    sqlx::query(LOCK_CART_LISTINGS_SQL)
      .bind(user_id)
      .execute(&mut *self.tx)
      .await
      .context("locking cart listings")?;
    let lines = sqlx::query_as::<_, CartLine>(CART_LINES_SQL)
      .bind(user_id)
      .fetch_all(&mut *self.tx)
      .await
      .context("loading cart lines")?;
    Ok(lines)
  }

  async fn find_cart_item(&mut self, user_id: Uuid, item_id: Uuid) -> anyhow::Result<Option<CartItem>> {
    let sql = format!("SELECT {} FROM cart_items WHERE id = $1 AND user_id = $2", CART_ITEM_COLUMNS);
    let item = sqlx::query_as::<_, CartItem>(&sql)
      .bind(item_id)
      .bind(user_id)
      .fetch_optional(&mut *self.tx)
      .await?;
    Ok(item)
  }

  async fn find_cart_item_by_listing(&mut self, user_id: Uuid, listing_id: Uuid) -> anyhow::Result<Option<CartItem>> {
    let sql = format!(
      "SELECT {} FROM cart_items WHERE user_id = $1 AND listing_id = $2",
      CART_ITEM_COLUMNS
    );
    let item = sqlx::query_as::<_, CartItem>(&sql)
      .bind(user_id)
      .bind(listing_id)
      .fetch_optional(&mut *self.tx)
      .await?;
    Ok(item)
  }

  async fn insert_cart_item(&mut self, item: &CartItem) -> anyhow::Result<()> {
    sqlx::query(
      "INSERT INTO cart_items (id, user_id, listing_id, quantity, created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(item.id)
    .bind(item.user_id)
    .bind(item.listing_id)
    .bind(item.quantity)
    .bind(item.created_at)
    .bind(item.updated_at)
    .execute(&mut *self.tx)
    .await
    .context("inserting cart item")?;
    Ok(())
  }

  async fn update_cart_quantity(&mut self, item_id: Uuid, quantity: i32) -> anyhow::Result<Option<CartItem>> {
    let sql = format!(
      "UPDATE cart_items SET quantity = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
      CART_ITEM_COLUMNS
    );
    let item = sqlx::query_as::<_, CartItem>(&sql)
      .bind(item_id)
      .bind(quantity)
      .fetch_optional(&mut *self.tx)
      .await?;
    Ok(item)
  }

  async fn delete_cart_item(&mut self, user_id: Uuid, item_id: Uuid) -> anyhow::Result<bool> {
    let result = sqlx::query("DELETE FROM cart_items WHERE id = $1 AND user_id = $2")
      .bind(item_id)
      .bind(user_id)
      .execute(&mut *self.tx)
      .await?;
    Ok(result.rows_affected() > 0)
  }

  async fn clear_cart(&mut self, user_id: Uuid) -> anyhow::Result<u64> {
    let result = sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
      .bind(user_id)
      .execute(&mut *self.tx)
      .await
      .context("clearing cart")?;
    Ok(result.rows_affected())
  }

  async fn adjust_stock(&mut self, listing_id: Uuid, delta: i32) -> anyhow::Result<Option<ShopListing>> {
    let sql = format!(
      "UPDATE shop_products SET stock_quantity = {}, updated_at = NOW() WHERE id = $1 RETURNING {}",
      CLAMPED_STOCK_EXPR, LISTING_COLUMNS
    );
    let listing = sqlx::query_as::<_, ShopListing>(&sql)
      .bind(listing_id)
      .bind(delta)
      .fetch_optional(&mut *self.tx)
      .await
      .context("adjusting stock")?;
    Ok(listing)
  }

  async fn insert_order(&mut self, order: &Order) -> anyhow::Result<()> {
    let sql = format!(
      "INSERT INTO orders ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)",
      ORDER_COLUMNS
    );
    sqlx::query(&sql)
      .bind(order.id)
      .bind(&order.order_number)
      .bind(order.user_id)
      .bind(order.shop_id)
      .bind(order.status)
      .bind(order.total_amount_cents)
      .bind(&order.shipping_address)
      .bind(&order.billing_address)
      .bind(order.payment_method)
      .bind(order.payment_status)
      .bind(&order.tracking_number)
      .bind(&order.shipping_company)
      .bind(&order.notes)
      .bind(order.created_at)
      .bind(order.updated_at)
      .execute(&mut *self.tx)
      .await
      .with_context(|| format!("inserting order {}", order.order_number))?;
    Ok(())
  }

  async fn insert_order_item(&mut self, item: &OrderItem) -> anyhow::Result<()> {
    let sql = format!(
      "INSERT INTO order_items ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
      ORDER_ITEM_COLUMNS
    );
    sqlx::query(&sql)
      .bind(item.id)
      .bind(item.order_id)
      .bind(item.listing_id)
      .bind(item.quantity)
      .bind(item.price_cents)
      .bind(&item.product_name)
      .bind(&item.shop_name)
      .bind(item.created_at)
      .execute(&mut *self.tx)
      .await
      .context("inserting order item")?;
    Ok(())
  }

  async fn insert_status_update(&mut self, update: &OrderStatusUpdate) -> anyhow::Result<()> {
    let sql = format!(
      "INSERT INTO order_status_updates ({}) VALUES ($1, $2, $3, $4, $5)",
      STATUS_UPDATE_COLUMNS
    );
    sqlx::query(&sql)
      .bind(update.id)
      .bind(update.order_id)
      .bind(update.status)
      .bind(&update.comment)
      .bind(update.created_at)
      .execute(&mut *self.tx)
      .await
      .context("inserting status update")?;
    Ok(())
  }

  async fn find_order(&mut self, order_id: Uuid) -> anyhow::Result<Option<Order>> {
    let sql = format!("SELECT {} FROM orders WHERE id = $1", ORDER_COLUMNS);
    let order = sqlx::query_as::<_, Order>(&sql)
      .bind(order_id)
      .fetch_optional(&mut *self.tx)
      .await?;
    Ok(order)
  }

  async fn find_order_by_number(&mut self, order_number: &str) -> anyhow::Result<Option<Order>> {
    let sql = format!("SELECT {} FROM orders WHERE order_number = $1", ORDER_COLUMNS);
    let order = sqlx::query_as::<_, Order>(&sql)
      .bind(order_number)
      .fetch_optional(&mut *self.tx)
      .await?;
    Ok(order)
  }

  async fn order_items(&mut self, order_id: Uuid) -> anyhow::Result<Vec<OrderItem>> {
    let sql = format!(
      "SELECT {} FROM order_items WHERE order_id = $1 ORDER BY created_at, seq",
      ORDER_ITEM_COLUMNS
    );
    let items = sqlx::query_as::<_, OrderItem>(&sql)
      .bind(order_id)
      .fetch_all(&mut *self.tx)
      .await?;
    Ok(items)
  }

  async fn status_updates(&mut self, order_id: Uuid) -> anyhow::Result<Vec<OrderStatusUpdate>> {
    let sql = format!(
      "SELECT {} FROM order_status_updates WHERE order_id = $1 ORDER BY created_at, seq",
      STATUS_UPDATE_COLUMNS
    );
    let updates = sqlx::query_as::<_, OrderStatusUpdate>(&sql)
      .bind(order_id)
      .fetch_all(&mut *self.tx)
      .await?;
    Ok(updates)
  }

  async fn update_order(&mut self, order: &Order) -> anyhow::Result<()> {
    sqlx::query(
      "UPDATE orders SET status = $2, payment_status = $3, tracking_number = $4, shipping_company = $5, updated_at = $6 \
       WHERE id = $1",
    )
    .bind(order.id)
    .bind(order.status)
    .bind(order.payment_status)
    .bind(&order.tracking_number)
    .bind(&order.shipping_company)
    .bind(order.updated_at)
    .execute(&mut *self.tx)
    .await
    .with_context(|| format!("updating order {}", order.order_number))?;
    Ok(())
  }

  async fn list_orders(&mut self, filter: &OrderFilter) -> anyhow::Result<Vec<Order>> {
    let sql = format!(
      "SELECT {} FROM orders \
       WHERE ($1::uuid IS NULL OR user_id = $1) \
         AND ($2::uuid IS NULL OR shop_id = $2) \
         AND ($3::order_status_enum IS NULL OR status = $3) \
       ORDER BY created_at DESC \
       OFFSET $4 LIMIT $5",
      ORDER_COLUMNS
    );
    let orders = sqlx::query_as::<_, Order>(&sql)
      .bind(filter.user_id)
      .bind(filter.shop_id)
      .bind(filter.status)
      .bind(filter.skip)
      .bind(filter.limit)
      .fetch_all(&mut *self.tx)
      .await
      .context("listing orders")?;
    Ok(orders)
  }

  async fn count_orders_by_status(&mut self, shop_id: Uuid) -> anyhow::Result<Vec<(OrderStatus, i64)>> {
    let counts = sqlx::query_as::<_, (OrderStatus, i64)>(
      "SELECT status, COUNT(*) FROM orders WHERE shop_id = $1 GROUP BY status",
    )
    .bind(shop_id)
    .fetch_all(&mut *self.tx)
    .await?;
    Ok(counts)
  }

  async fn delivered_revenue(&mut self, shop_id: Uuid) -> anyhow::Result<i64> {
    let revenue = sqlx::query_scalar::<_, i64>(
      "SELECT COALESCE(SUM(total_amount_cents), 0)::BIGINT FROM orders WHERE shop_id = $1 AND status = 'delivered'",
    )
    .bind(shop_id)
    .fetch_one(&mut *self.tx)
    .await?;
    Ok(revenue)
  }

  async fn commit(self: Box<Self>) -> anyhow::Result<()> {
    self.tx.commit().await.context("committing transaction")?;
    Ok(())
  }

  async fn rollback(self: Box<Self>) -> anyhow::Result<()> {
    self.tx.rollback().await.context("rolling back transaction")?;
    Ok(())
  }
}
