//! POS Order Repository

use super::{RepoError, RepoResult, payment};
use shared::error::ErrorCode;
use shared::models::{
    MenuItem, OrderDetail, OrderPayResponse, OrderStatus, PaymentMethod, PaymentProvider,
    PaymentStatus, PosOrder, PosOrderItem,
};
use sqlx::{SqliteConnection, SqlitePool};

const ORDER_COLUMNS: &str = "id, table_id, reservation_id, created_by, status, subtotal, tax_amount, total, notes, created_at, updated_at, closed_at";

fn not_found(id: i64) -> RepoError {
    RepoError::Business(ErrorCode::OrderNotFound, format!("Order {id} not found"))
}

/// Order line to insert (menu item snapshot + quantity + note)
#[derive(Debug, Clone)]
pub struct OrderLine {
    pub item: MenuItem,
    pub quantity: i32,
    pub notes: Option<String>,
}

/// Insert payload
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub table_id: Option<i64>,
    pub reservation_id: Option<i64>,
    pub created_by: i64,
    pub notes: Option<String>,
    pub lines: Vec<OrderLine>,
}

async fn find_by_id(conn: &mut SqliteConnection, id: i64) -> RepoResult<Option<PosOrder>> {
    let order = sqlx::query_as::<_, PosOrder>(&format!(
        "SELECT {ORDER_COLUMNS} FROM pos_order WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(conn)
    .await?;
    Ok(order)
}

async fn items_of(conn: &mut SqliteConnection, order_id: i64) -> RepoResult<Vec<PosOrderItem>> {
    let items = sqlx::query_as::<_, PosOrderItem>(
        "SELECT id, order_id, menu_item_id, name, unit_price, quantity, line_total, notes FROM pos_order_item WHERE order_id = ? ORDER BY rowid",
    )
    .bind(order_id)
    .fetch_all(conn)
    .await?;
    Ok(items)
}

/// Claim an open order for writing
///
/// Touches the row first so the write lock is held for the rest of the
/// transaction; a missing order is `OrderNotFound`, a closed one
/// `OrderNotOpen` / `OrderAlreadyPaid`.
async fn lock_open(conn: &mut SqliteConnection, id: i64) -> RepoResult<PosOrder> {
    let rows = sqlx::query("UPDATE pos_order SET updated_at = ?1 WHERE id = ?2 AND status = 'open'")
        .bind(shared::util::now_millis())
        .bind(id)
        .execute(&mut *conn)
        .await?;
    let order = find_by_id(conn, id).await?.ok_or_else(|| not_found(id))?;
    if rows.rows_affected() == 0 {
        return Err(match order.status {
            OrderStatus::Paid => RepoError::Business(
                ErrorCode::OrderAlreadyPaid,
                "Order has already been paid".into(),
            ),
            _ => RepoError::Business(ErrorCode::OrderNotOpen, "Order is not open".into()),
        });
    }
    Ok(order)
}

async fn insert_lines(
    conn: &mut SqliteConnection,
    order_id: i64,
    lines: &[OrderLine],
) -> RepoResult<()> {
    for line in lines {
        sqlx::query(
            "INSERT INTO pos_order_item (id, order_id, menu_item_id, name, unit_price, quantity, line_total, notes) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .bind(shared::util::snowflake_id())
        .bind(order_id)
        .bind(line.item.id)
        .bind(&line.item.name)
        .bind(line.item.price)
        .bind(line.quantity)
        .bind(crate::money::line_total(line.item.price, line.quantity))
        .bind(&line.notes)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

/// Recompute subtotal / tax / total from the stored lines (tax-inclusive)
async fn recalculate(conn: &mut SqliteConnection, order_id: i64, tax_rate: f64) -> RepoResult<()> {
    let line_totals: Vec<f64> =
        sqlx::query_scalar("SELECT line_total FROM pos_order_item WHERE order_id = ?")
            .bind(order_id)
            .fetch_all(&mut *conn)
            .await?;
    let (subtotal, tax, total) = crate::money::order_totals(line_totals, tax_rate);

    sqlx::query(
        "UPDATE pos_order SET subtotal = ?1, tax_amount = ?2, total = ?3, updated_at = ?4 WHERE id = ?5",
    )
    .bind(subtotal)
    .bind(tax)
    .bind(total)
    .bind(shared::util::now_millis())
    .bind(order_id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn create(pool: &SqlitePool, data: NewOrder, tax_rate: f64) -> RepoResult<OrderDetail> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();

    let mut tx = pool.begin().await?;
    sqlx::query(
        "INSERT INTO pos_order (id, table_id, reservation_id, created_by, status, notes, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, 'open', ?5, ?6, ?6)",
    )
    .bind(id)
    .bind(data.table_id)
    .bind(data.reservation_id)
    .bind(data.created_by)
    .bind(&data.notes)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    insert_lines(&mut tx, id, &data.lines).await?;
    recalculate(&mut tx, id, tax_rate).await?;
    tx.commit().await?;

    get_detail(pool, id).await
}

pub async fn get_detail(pool: &SqlitePool, id: i64) -> RepoResult<OrderDetail> {
    let mut conn = pool.acquire().await?;
    let order = find_by_id(&mut conn, id).await?.ok_or_else(|| not_found(id))?;
    let table_number: Option<i32> = match order.table_id {
        Some(table_id) => sqlx::query_scalar("SELECT number FROM dining_table WHERE id = ?")
            .bind(table_id)
            .fetch_optional(&mut *conn)
            .await?,
        None => None,
    };
    let items = items_of(&mut conn, id).await?;
    Ok(OrderDetail {
        order,
        table_number,
        items,
    })
}

pub async fn list(
    pool: &SqlitePool,
    status: Option<OrderStatus>,
    table_id: Option<i64>,
) -> RepoResult<Vec<PosOrder>> {
    let orders = sqlx::query_as::<_, PosOrder>(&format!(
        "SELECT {ORDER_COLUMNS} FROM pos_order WHERE (?1 IS NULL OR status = ?1) AND (?2 IS NULL OR table_id = ?2) ORDER BY created_at DESC, id DESC"
    ))
    .bind(status)
    .bind(table_id)
    .fetch_all(pool)
    .await?;
    Ok(orders)
}

pub async fn add_items(
    pool: &SqlitePool,
    id: i64,
    lines: Vec<OrderLine>,
    tax_rate: f64,
) -> RepoResult<OrderDetail> {
    let mut tx = pool.begin().await?;
    lock_open(&mut tx, id).await?;
    insert_lines(&mut tx, id, &lines).await?;
    recalculate(&mut tx, id, tax_rate).await?;
    tx.commit().await?;
    get_detail(pool, id).await
}

pub async fn remove_item(
    pool: &SqlitePool,
    id: i64,
    item_id: i64,
    tax_rate: f64,
) -> RepoResult<OrderDetail> {
    let mut tx = pool.begin().await?;
    lock_open(&mut tx, id).await?;
    let rows = sqlx::query("DELETE FROM pos_order_item WHERE id = ?1 AND order_id = ?2")
        .bind(item_id)
        .bind(id)
        .execute(&mut *tx)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::Business(
            ErrorCode::OrderItemNotFound,
            format!("Item {item_id} is not part of order {id}"),
        ));
    }
    recalculate(&mut tx, id, tax_rate).await?;
    tx.commit().await?;
    get_detail(pool, id).await
}

/// Close an open order with a manual (card/cash) payment
///
/// Cash needs `tendered >= total` and yields the change; card records the
/// total as-is.
pub async fn pay(
    pool: &SqlitePool,
    id: i64,
    method: PaymentMethod,
    tendered: Option<f64>,
    cashier_id: i64,
) -> RepoResult<OrderPayResponse> {
    if method.is_online() {
        return Err(RepoError::Business(
            ErrorCode::PaymentInvalidMethod,
            "POS orders are paid by card or cash".into(),
        ));
    }

    let mut tx = pool.begin().await?;
    let order = lock_open(&mut tx, id).await?;

    let item_count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM pos_order_item WHERE order_id = ?")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
    if item_count == 0 {
        return Err(RepoError::Business(ErrorCode::OrderEmpty, "Order has no items".into()));
    }

    let change = match method {
        PaymentMethod::Cash => {
            let tendered = tendered.ok_or_else(|| {
                RepoError::Business(
                    ErrorCode::PaymentInsufficientAmount,
                    "Cash payments need amount_tendered".into(),
                )
            })?;
            crate::money::change_due(order.total, tendered).ok_or_else(|| {
                RepoError::Business(
                    ErrorCode::PaymentInsufficientAmount,
                    format!("Tendered {tendered:.2} is less than the total {:.2}", order.total),
                )
            })?
        }
        _ => 0.0,
    };

    let payment = payment::create(
        &mut tx,
        payment::NewPayment {
            reservation_id: order.reservation_id,
            order_id: Some(id),
            user_id: Some(cashier_id),
            amount: order.total,
            method,
            provider: PaymentProvider::Manual,
            status: PaymentStatus::Paid,
            phone: None,
        },
    )
    .await?;

    let now = shared::util::now_millis();
    sqlx::query(
        "UPDATE pos_order SET status = 'paid', closed_at = ?1, updated_at = ?1 WHERE id = ?2",
    )
    .bind(now)
    .bind(id)
    .execute(&mut *tx)
    .await?;

    let order = find_by_id(&mut tx, id).await?.ok_or_else(|| not_found(id))?;
    tx.commit().await?;

    Ok(OrderPayResponse {
        order,
        payment,
        change,
    })
}

pub async fn cancel(pool: &SqlitePool, id: i64) -> RepoResult<PosOrder> {
    let mut tx = pool.begin().await?;
    lock_open(&mut tx, id).await?;
    let now = shared::util::now_millis();
    sqlx::query(
        "UPDATE pos_order SET status = 'cancelled', closed_at = ?1, updated_at = ?1 WHERE id = ?2",
    )
    .bind(now)
    .bind(id)
    .execute(&mut *tx)
    .await?;
    let order = find_by_id(&mut tx, id).await?.ok_or_else(|| not_found(id))?;
    tx.commit().await?;
    Ok(order)
}
