use serde::Serialize;
use sqlx::{FromRow, PgPool};

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct LikedTrack {
    pub title: String,
    pub artist: String,
    pub link: String,
}

/// Record a like. Duplicates are allowed; returns the new row id.
pub async fn insert_like(
    db: &PgPool,
    username: &str,
    title: &str,
    artist: &str,
    link: &str,
) -> Result<i64, sqlx::Error> {
    let (id,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO liked_tracks (username, title, artist, link)
        VALUES ($1, $2, $3, $4)
        RETURNING id
        "#,
    )
    .bind(username)
    .bind(title)
    .bind(artist)
    .bind(link)
    .fetch_one(db)
    .await?;
    Ok(id)
}

/// Delete by exact (username, title, artist); returns rows affected.
pub async fn delete_like(
    db: &PgPool,
    username: &str,
    title: &str,
    artist: &str,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        DELETE FROM liked_tracks
        WHERE username = $1 AND title = $2 AND artist = $3
        "#,
    )
    .bind(username)
    .bind(title)
    .bind(artist)
    .execute(db)
    .await?;
    Ok(result.rows_affected())
}

/// All liked tracks for a username, matched case-insensitively and trimmed,
/// in insertion order.
pub async fn list_by_username(db: &PgPool, username: &str) -> Result<Vec<LikedTrack>, sqlx::Error> {
    sqlx::query_as::<_, LikedTrack>(
        r#"
        SELECT title, artist, link
        FROM liked_tracks
        WHERE LOWER(TRIM(username)) = LOWER(TRIM($1))
        ORDER BY id
        "#,
    )
    .bind(username)
    .fetch_all(db)
    .await
}
