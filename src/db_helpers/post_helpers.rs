use sqlx::{Sqlite, SqlitePool};

use crate::data_formats::PostForm;
use crate::errors::RequestError;
use crate::models::Post;

const POST_QUERY: &str = r#"
            SELECT blog_posts.id        AS "id",
                   blog_posts.author_id AS "author_id",
                   users.name           AS "author_name",
                   title                AS "title",
                   subtitle             AS "subtitle",
                   date                 AS "date",
                   body                 AS "body",
                   img_url              AS "img_url"
            FROM   blog_posts
                JOIN users
                    ON blog_posts.author_id = users.id
     "#;

pub async fn list_posts(pool: &SqlitePool) -> Result<Vec<Post>, RequestError> {
    let mut tx = pool.begin().await?;
    let query = format!("{POST_QUERY} ORDER BY blog_posts.id");
    let posts = sqlx::query_as::<Sqlite, Post>(&query)
        .fetch_all(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(posts)
}

pub async fn get_post_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Post>, RequestError> {
    let mut tx = pool.begin().await?;
    let query = format!("{POST_QUERY} WHERE blog_posts.id = $1");
    let post = sqlx::query_as::<Sqlite, Post>(&query)
        .bind(id)
        .fetch_optional(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(post)
}

/// Stores a new post by `author_id`, stamped with `date`.
pub async fn insert_post(
    pool: &SqlitePool,
    author_id: i64,
    date: &str,
    PostForm {
        title,
        subtitle,
        img_url,
        body,
    }: &PostForm,
) -> Result<Post, RequestError> {
    let mut tx = pool.begin().await?;
    let (id,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO blog_posts (author_id, title, subtitle, date, body, img_url)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id
        "#,
    )
    .bind(author_id)
    .bind(title)
    .bind(subtitle)
    .bind(date)
    .bind(body)
    .bind(img_url)
    .fetch_one(&mut tx)
    .await
    .map_err(|e| RequestError::unique_violation(e, "title"))?;

    let query = format!("{POST_QUERY} WHERE blog_posts.id = $1");
    let post = sqlx::query_as::<Sqlite, Post>(&query)
        .bind(id)
        .fetch_one(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(post)
}

/// Replaces the editable fields of a post. Id, author and date stay as they were.
pub async fn update_post(
    pool: &SqlitePool,
    id: i64,
    PostForm {
        title,
        subtitle,
        img_url,
        body,
    }: &PostForm,
) -> Result<(), RequestError> {
    let mut tx = pool.begin().await?;
    let result = sqlx::query(
        r#"
        UPDATE blog_posts
        SET title = $1, subtitle = $2, body = $3, img_url = $4
        WHERE id = $5
        "#,
    )
    .bind(title)
    .bind(subtitle)
    .bind(body)
    .bind(img_url)
    .bind(id)
    .execute(&mut tx)
    .await
    .map_err(|e| RequestError::unique_violation(e, "title"))?;
    if result.rows_affected() == 0 {
        return Err(RequestError::NotFound);
    }
    tx.commit().await?;
    Ok(())
}

/// Deletes a post; its comments go with it through the foreign key cascade.
pub async fn delete_post(pool: &SqlitePool, id: i64) -> Result<(), RequestError> {
    let mut tx = pool.begin().await?;
    let result = sqlx::query("DELETE FROM blog_posts WHERE id = $1")
        .bind(id)
        .execute(&mut tx)
        .await?;
    if result.rows_affected() == 0 {
        return Err(RequestError::NotFound);
    }
    tx.commit().await?;
    Ok(())
}

pub async fn count_posts(pool: &SqlitePool) -> Result<i64, RequestError> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM blog_posts")
        .fetch_one(pool)
        .await?;
    Ok(count)
}
