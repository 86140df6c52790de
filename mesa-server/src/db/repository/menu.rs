//! Menu Repository (categories and items)

use super::{RepoError, RepoResult, on_duplicate};
use shared::error::ErrorCode;
use shared::models::{
    DeleteOutcome, MenuCategory, MenuCategoryCreate, MenuCategoryUpdate, MenuItem, MenuItemCreate,
    MenuItemUpdate, MenuSection,
};
use sqlx::SqlitePool;

const CATEGORY_SELECT: &str =
    "SELECT id, name, description, sort_order, is_active, created_at, updated_at FROM menu_category";
const ITEM_SELECT: &str = "SELECT id, category_id, name, description, price, image_url, is_available, sort_order, created_at, updated_at FROM menu_item";

fn category_not_found(id: i64) -> RepoError {
    RepoError::Business(ErrorCode::CategoryNotFound, format!("Category {id} not found"))
}

fn item_not_found(id: i64) -> RepoError {
    RepoError::Business(ErrorCode::MenuItemNotFound, format!("Menu item {id} not found"))
}

fn name_taken(name: &str) -> RepoError {
    RepoError::Business(
        ErrorCode::CategoryNameExists,
        format!("Category '{name}' already exists"),
    )
}

// ==================== Categories ====================

/// All categories; `active_only` hides inactive ones
pub async fn list_categories(
    pool: &SqlitePool,
    active_only: bool,
) -> RepoResult<Vec<MenuCategory>> {
    let categories = sqlx::query_as::<_, MenuCategory>(&format!(
        "{CATEGORY_SELECT} WHERE (?1 = 0 OR is_active = 1) ORDER BY sort_order, name"
    ))
    .bind(active_only)
    .fetch_all(pool)
    .await?;
    Ok(categories)
}

pub async fn find_category(pool: &SqlitePool, id: i64) -> RepoResult<Option<MenuCategory>> {
    let category = sqlx::query_as::<_, MenuCategory>(&format!("{CATEGORY_SELECT} WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(category)
}

pub async fn get_category(pool: &SqlitePool, id: i64) -> RepoResult<MenuCategory> {
    find_category(pool, id)
        .await?
        .ok_or_else(|| category_not_found(id))
}

pub async fn find_category_by_name(
    pool: &SqlitePool,
    name: &str,
) -> RepoResult<Option<MenuCategory>> {
    let category = sqlx::query_as::<_, MenuCategory>(&format!(
        "{CATEGORY_SELECT} WHERE name = ? COLLATE NOCASE LIMIT 1"
    ))
    .bind(name.trim())
    .fetch_optional(pool)
    .await?;
    Ok(category)
}

pub async fn create_category(
    pool: &SqlitePool,
    data: MenuCategoryCreate,
) -> RepoResult<MenuCategory> {
    let name = data.name.trim();
    if find_category_by_name(pool, name).await?.is_some() {
        return Err(name_taken(name));
    }

    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    sqlx::query(
        "INSERT INTO menu_category (id, name, description, sort_order, is_active, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
    )
    .bind(id)
    .bind(name)
    .bind(data.description)
    .bind(data.sort_order.unwrap_or(0))
    .bind(data.is_active.unwrap_or(true))
    .bind(now)
    .execute(pool)
    .await
    .map_err(RepoError::from)
    .map_err(on_duplicate(
        ErrorCode::CategoryNameExists,
        format!("Category '{name}' already exists"),
    ))?;

    get_category(pool, id).await
}

pub async fn update_category(
    pool: &SqlitePool,
    id: i64,
    data: MenuCategoryUpdate,
) -> RepoResult<MenuCategory> {
    let existing = get_category(pool, id).await?;

    let name = data.name.as_deref().map(str::trim);
    if let Some(new_name) = name
        && !new_name.eq_ignore_ascii_case(&existing.name)
        && find_category_by_name(pool, new_name).await?.is_some()
    {
        return Err(name_taken(new_name));
    }

    sqlx::query(
        "UPDATE menu_category SET name = COALESCE(?1, name), description = COALESCE(?2, description), sort_order = COALESCE(?3, sort_order), is_active = COALESCE(?4, is_active), updated_at = ?5 WHERE id = ?6",
    )
    .bind(name)
    .bind(data.description)
    .bind(data.sort_order)
    .bind(data.is_active)
    .bind(shared::util::now_millis())
    .bind(id)
    .execute(pool)
    .await
    .map_err(RepoError::from)
    .map_err(on_duplicate(ErrorCode::CategoryNameExists, "Category name already exists"))?;

    get_category(pool, id).await
}

/// Delete a category; refused while it still holds items
pub async fn delete_category(pool: &SqlitePool, id: i64) -> RepoResult<()> {
    get_category(pool, id).await?;

    let items: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM menu_item WHERE category_id = ?")
        .bind(id)
        .fetch_one(pool)
        .await?;
    if items > 0 {
        return Err(RepoError::Business(
            ErrorCode::CategoryHasItems,
            format!("Category still has {items} item(s); move or delete them first"),
        ));
    }

    sqlx::query("DELETE FROM menu_category WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

// ==================== Items ====================

pub async fn list_items(
    pool: &SqlitePool,
    category_id: Option<i64>,
    available: Option<bool>,
) -> RepoResult<Vec<MenuItem>> {
    let items = sqlx::query_as::<_, MenuItem>(&format!(
        "{ITEM_SELECT} WHERE (?1 IS NULL OR category_id = ?1) AND (?2 IS NULL OR is_available = ?2) ORDER BY sort_order, name"
    ))
    .bind(category_id)
    .bind(available)
    .fetch_all(pool)
    .await?;
    Ok(items)
}

pub async fn find_item(pool: &SqlitePool, id: i64) -> RepoResult<Option<MenuItem>> {
    let item = sqlx::query_as::<_, MenuItem>(&format!("{ITEM_SELECT} WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(item)
}

pub async fn get_item(pool: &SqlitePool, id: i64) -> RepoResult<MenuItem> {
    find_item(pool, id).await?.ok_or_else(|| item_not_found(id))
}

/// Load items for an order/reservation, failing on missing or unavailable ones
pub async fn get_orderable_item(pool: &SqlitePool, id: i64) -> RepoResult<MenuItem> {
    let item = get_item(pool, id).await?;
    if !item.is_available {
        return Err(RepoError::Business(
            ErrorCode::MenuItemUnavailable,
            format!("'{}' is not available", item.name),
        ));
    }
    Ok(item)
}

pub async fn create_item(pool: &SqlitePool, data: MenuItemCreate) -> RepoResult<MenuItem> {
    get_category(pool, data.category_id).await?;

    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    sqlx::query(
        "INSERT INTO menu_item (id, category_id, name, description, price, image_url, is_available, sort_order, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)",
    )
    .bind(id)
    .bind(data.category_id)
    .bind(data.name.trim())
    .bind(data.description)
    .bind(crate::money::round(data.price))
    .bind(data.image_url)
    .bind(data.is_available.unwrap_or(true))
    .bind(data.sort_order.unwrap_or(0))
    .bind(now)
    .execute(pool)
    .await?;

    get_item(pool, id).await
}

pub async fn update_item(pool: &SqlitePool, id: i64, data: MenuItemUpdate) -> RepoResult<MenuItem> {
    get_item(pool, id).await?;
    if let Some(category_id) = data.category_id {
        get_category(pool, category_id).await?;
    }

    sqlx::query(
        "UPDATE menu_item SET category_id = COALESCE(?1, category_id), name = COALESCE(?2, name), description = COALESCE(?3, description), price = COALESCE(?4, price), image_url = COALESCE(?5, image_url), is_available = COALESCE(?6, is_available), sort_order = COALESCE(?7, sort_order), updated_at = ?8 WHERE id = ?9",
    )
    .bind(data.category_id)
    .bind(data.name.as_deref().map(str::trim))
    .bind(data.description)
    .bind(data.price.map(crate::money::round))
    .bind(data.image_url)
    .bind(data.is_available)
    .bind(data.sort_order)
    .bind(shared::util::now_millis())
    .bind(id)
    .execute(pool)
    .await?;

    get_item(pool, id).await
}

pub async fn set_availability(
    pool: &SqlitePool,
    id: i64,
    is_available: bool,
) -> RepoResult<MenuItem> {
    let rows = sqlx::query("UPDATE menu_item SET is_available = ?1, updated_at = ?2 WHERE id = ?3")
        .bind(is_available)
        .bind(shared::util::now_millis())
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(item_not_found(id));
    }
    get_item(pool, id).await
}

/// Delete an item, or archive it (mark unavailable) when reservations or
/// orders still reference it
pub async fn delete_item(pool: &SqlitePool, id: i64) -> RepoResult<DeleteOutcome> {
    get_item(pool, id).await?;

    let references: i64 = sqlx::query_scalar(
        "SELECT (SELECT COUNT(*) FROM reservation_item WHERE menu_item_id = ?1) + (SELECT COUNT(*) FROM pos_order_item WHERE menu_item_id = ?1)",
    )
    .bind(id)
    .fetch_one(pool)
    .await?;

    if references > 0 {
        set_availability(pool, id, false).await?;
        return Ok(DeleteOutcome::archived());
    }

    sqlx::query("DELETE FROM menu_item WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(DeleteOutcome::deleted())
}

/// Public menu: active categories with their available items
pub async fn public_menu(pool: &SqlitePool) -> RepoResult<Vec<MenuSection>> {
    let categories = list_categories(pool, true).await?;
    let mut items = list_items(pool, None, Some(true)).await?;

    let sections = categories
        .into_iter()
        .map(|category| {
            let (mine, rest): (Vec<_>, Vec<_>) =
                items.drain(..).partition(|i| i.category_id == category.id);
            items = rest;
            MenuSection {
                category,
                items: mine,
            }
        })
        .collect();
    Ok(sections)
}
