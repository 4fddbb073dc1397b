use sqlx::{Sqlite, SqlitePool};

use crate::{errors::RequestError, models::Comment};

const COMMENT_QUERY: &str = r#"
        SELECT comments.id        AS "id",
               comments.text      AS "text",
               comments.post_id   AS "post_id",
               comments.author_id AS "author_id",
               users.name         AS "author_name"
        FROM   comments
            JOIN users
                ON comments.author_id = users.id
"#;

pub async fn insert_comment(
    pool: &SqlitePool,
    author_id: i64,
    post_id: i64,
    text: &str,
) -> Result<Comment, RequestError> {
    let mut tx = pool.begin().await?;

    let post: Option<(i64,)> = sqlx::query_as("SELECT id FROM blog_posts WHERE id = $1")
        .bind(post_id)
        .fetch_optional(&mut tx)
        .await?;
    if post.is_none() {
        return Err(RequestError::NotFound);
    }

    let (id,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO comments (text, author_id, post_id)
        VALUES ($1, $2, $3)
        RETURNING id
        "#,
    )
    .bind(text)
    .bind(author_id)
    .bind(post_id)
    .fetch_one(&mut tx)
    .await?;

    let query = format!("{COMMENT_QUERY} WHERE comments.id = $1");
    let comment = sqlx::query_as::<Sqlite, Comment>(&query)
        .bind(id)
        .fetch_one(&mut tx)
        .await?;
    tx.commit().await?;

    Ok(comment)
}

pub async fn get_comments_for_post(
    pool: &SqlitePool,
    post_id: i64,
) -> Result<Vec<Comment>, RequestError> {
    let mut tx = pool.begin().await?;
    let query = format!("{COMMENT_QUERY} WHERE comments.post_id = $1 ORDER BY comments.id");
    let result = sqlx::query_as::<Sqlite, Comment>(&query)
        .bind(post_id)
        .fetch_all(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(result)
}

#[cfg(test)]
pub async fn count_comments(pool: &SqlitePool, post_id: i64) -> Result<i64, RequestError> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM comments WHERE post_id = $1")
        .bind(post_id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}
