//! User Repository

use super::{RepoError, RepoResult, like_pattern, on_duplicate};
use shared::error::ErrorCode;
use shared::models::{ProfileUpdate, User, UserRole, UserUpdate};
use sqlx::SqlitePool;

const USER_SELECT: &str = "SELECT id, username, email, password_hash, full_name, phone, role, is_active, session_epoch, created_at, updated_at FROM users";

/// Insert payload (password already hashed)
#[derive(Debug, Clone)]
pub struct NewUser<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub full_name: &'a str,
    pub phone: Option<&'a str>,
    pub role: UserRole,
}

/// Emails are stored and compared lowercased
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!("{USER_SELECT} WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

pub async fn get(pool: &SqlitePool, id: i64) -> RepoResult<User> {
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Business(ErrorCode::UserNotFound, format!("User {id} not found")))
}

pub async fn find_by_username(pool: &SqlitePool, username: &str) -> RepoResult<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!("{USER_SELECT} WHERE username = ? LIMIT 1"))
        .bind(username)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

pub async fn find_by_email(pool: &SqlitePool, email: &str) -> RepoResult<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!("{USER_SELECT} WHERE email = ? LIMIT 1"))
        .bind(normalize_email(email))
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

/// Login lookup: exact username, or email (case-insensitive)
pub async fn find_by_login(pool: &SqlitePool, login: &str) -> RepoResult<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!(
        "{USER_SELECT} WHERE username = ?1 OR email = ?2 LIMIT 1"
    ))
    .bind(login.trim())
    .bind(normalize_email(login))
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

pub async fn count_admins(pool: &SqlitePool) -> RepoResult<i64> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = 'admin' AND is_active = 1")
            .fetch_one(pool)
            .await?;
    Ok(count)
}

/// Insert a user
///
/// Username and email collisions surface as `UsernameExists` / `EmailExists`.
pub async fn create(pool: &SqlitePool, data: NewUser<'_>) -> RepoResult<User> {
    if find_by_username(pool, data.username).await?.is_some() {
        return Err(RepoError::Business(
            ErrorCode::UsernameExists,
            format!("Username '{}' is already taken", data.username),
        ));
    }
    if find_by_email(pool, data.email).await?.is_some() {
        return Err(RepoError::Business(
            ErrorCode::EmailExists,
            "Email is already registered".into(),
        ));
    }

    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    sqlx::query(
        "INSERT INTO users (id, username, email, password_hash, full_name, phone, role, is_active, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 1, ?8, ?8)",
    )
    .bind(id)
    .bind(data.username)
    .bind(normalize_email(data.email))
    .bind(data.password_hash)
    .bind(data.full_name.trim())
    .bind(data.phone)
    .bind(data.role)
    .bind(now)
    .execute(pool)
    .await
    // a concurrent registration can still race past the checks above
    .map_err(RepoError::from)
    .map_err(on_duplicate(
        ErrorCode::UsernameExists,
        "Username or email is already registered",
    ))?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create user".into()))
}

/// Paginated list; `search` matches username, email or full name
pub async fn list(
    pool: &SqlitePool,
    role: Option<UserRole>,
    search: Option<&str>,
    limit: i64,
    offset: i64,
) -> RepoResult<(Vec<User>, i64)> {
    let pattern = search
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(like_pattern);
    let filter = "WHERE (?1 IS NULL OR role = ?1) AND (?2 IS NULL OR username LIKE ?2 ESCAPE '\\' OR email LIKE ?2 ESCAPE '\\' OR full_name LIKE ?2 ESCAPE '\\')";

    let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM users {filter}"))
        .bind(role)
        .bind(pattern.as_deref())
        .fetch_one(pool)
        .await?;

    let users = sqlx::query_as::<_, User>(&format!(
        "{USER_SELECT} {filter} ORDER BY created_at DESC, id DESC LIMIT ?3 OFFSET ?4"
    ))
    .bind(role)
    .bind(pattern.as_deref())
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok((users, total))
}

pub async fn reservation_count(pool: &SqlitePool, user_id: i64) -> RepoResult<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reservation WHERE user_id = ?")
        .bind(user_id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

async fn ensure_email_free(pool: &SqlitePool, email: &str, user_id: i64) -> RepoResult<()> {
    if let Some(other) = find_by_email(pool, email).await?
        && other.id != user_id
    {
        return Err(RepoError::Business(
            ErrorCode::EmailExists,
            "Email is already registered".into(),
        ));
    }
    Ok(())
}

/// Self-service profile update
pub async fn update_profile(pool: &SqlitePool, id: i64, data: ProfileUpdate) -> RepoResult<User> {
    if let Some(email) = data.email.as_deref() {
        ensure_email_free(pool, email, id).await?;
    }

    let rows = sqlx::query(
        "UPDATE users SET full_name = COALESCE(?1, full_name), email = COALESCE(?2, email), phone = COALESCE(?3, phone), updated_at = ?4 WHERE id = ?5",
    )
    .bind(data.full_name.as_deref().map(str::trim))
    .bind(data.email.as_deref().map(normalize_email))
    .bind(data.phone)
    .bind(shared::util::now_millis())
    .bind(id)
    .execute(pool)
    .await
    .map_err(RepoError::from)
    .map_err(on_duplicate(ErrorCode::EmailExists, "Email is already registered"))?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::Business(ErrorCode::UserNotFound, format!("User {id} not found")));
    }
    get(pool, id).await
}

/// Admin update (role and active flag included)
///
/// Disabling an account also revokes its sessions.
pub async fn update(pool: &SqlitePool, id: i64, data: UserUpdate) -> RepoResult<User> {
    if let Some(email) = data.email.as_deref() {
        ensure_email_free(pool, email, id).await?;
    }

    let rows = sqlx::query(
        "UPDATE users SET full_name = COALESCE(?1, full_name), email = COALESCE(?2, email), phone = COALESCE(?3, phone), role = COALESCE(?4, role), is_active = COALESCE(?5, is_active), session_epoch = session_epoch + (CASE WHEN ?5 = 0 THEN 1 ELSE 0 END), updated_at = ?6 WHERE id = ?7",
    )
    .bind(data.full_name.as_deref().map(str::trim))
    .bind(data.email.as_deref().map(normalize_email))
    .bind(data.phone)
    .bind(data.role)
    .bind(data.is_active)
    .bind(shared::util::now_millis())
    .bind(id)
    .execute(pool)
    .await
    .map_err(RepoError::from)
    .map_err(on_duplicate(ErrorCode::EmailExists, "Email is already registered"))?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::Business(ErrorCode::UserNotFound, format!("User {id} not found")));
    }
    get(pool, id).await
}

pub async fn update_password(pool: &SqlitePool, id: i64, password_hash: &str) -> RepoResult<()> {
    sqlx::query("UPDATE users SET password_hash = ?1, updated_at = ?2 WHERE id = ?3")
        .bind(password_hash)
        .bind(shared::util::now_millis())
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Invalidate every token issued to the user so far
pub async fn revoke_sessions(pool: &SqlitePool, id: i64) -> RepoResult<()> {
    sqlx::query("UPDATE users SET session_epoch = session_epoch + 1 WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Soft delete; open sessions are revoked with it
pub async fn deactivate(pool: &SqlitePool, id: i64) -> RepoResult<()> {
    let rows = sqlx::query(
        "UPDATE users SET is_active = 0, session_epoch = session_epoch + 1, updated_at = ?1 WHERE id = ?2",
    )
        .bind(shared::util::now_millis())
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::Business(ErrorCode::UserNotFound, format!("User {id} not found")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emails_are_normalized() {
        assert_eq!(normalize_email("  Ana@Example.PT "), "ana@example.pt");
    }
}
