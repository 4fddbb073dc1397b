use sqlx::{Sqlite, SqlitePool};

use crate::{errors::RequestError, models::User};

const USER_COLUMNS: &str = "id, email, password, name, role";

/// Inserts a user. The very first account becomes the admin, everyone after
/// that is a reader; the decision happens inside the insert so two racing
/// registrations cannot both become admin.
pub async fn insert_user(
    pool: &SqlitePool,
    email: &str,
    password_hash: &str,
    name: &str,
) -> Result<User, RequestError> {
    let mut tx = pool.begin().await?;
    let query = format!(
        r#"
        INSERT INTO users (email, password, name, role)
        VALUES ($1, $2, $3,
            CASE WHEN EXISTS (SELECT 1 FROM users) THEN 'reader' ELSE 'admin' END)
        RETURNING {USER_COLUMNS}
        "#
    );
    let user = sqlx::query_as::<Sqlite, User>(&query)
        .bind(email)
        .bind(password_hash)
        .bind(name)
        .fetch_one(&mut tx)
        .await
        .map_err(|e| RequestError::unique_violation(e, "email"))?;
    tx.commit().await?;
    Ok(user)
}

pub async fn get_user_by_id(pool: &SqlitePool, id: i64) -> Result<Option<User>, RequestError> {
    let mut tx = pool.begin().await?;
    let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
    let result = sqlx::query_as::<Sqlite, User>(&query)
        .bind(id)
        .fetch_optional(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(result)
}

pub async fn get_user_by_email(
    pool: &SqlitePool,
    email: &str,
) -> Result<Option<User>, RequestError> {
    let mut tx = pool.begin().await?;
    let query = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
    let result = sqlx::query_as::<Sqlite, User>(&query)
        .bind(email)
        .fetch_optional(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(result)
}

pub async fn count_users(pool: &SqlitePool) -> Result<i64, RequestError> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;
    Ok(count)
}
