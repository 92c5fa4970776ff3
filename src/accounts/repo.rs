use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub img: Option<String>,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, FromRow)]
pub struct Profile {
    pub username: String,
    pub email: String,
    pub img: Option<String>,
}

/// Insert a new user. Uniqueness is enforced inside the statement: a taken
/// username inserts nothing and returns `None`.
pub async fn insert_user(
    db: &PgPool,
    username: &str,
    password_hash: &str,
    first_name: &str,
    last_name: &str,
    email: &str,
) -> Result<Option<Uuid>, sqlx::Error> {
    let row: Option<(Uuid,)> = sqlx::query_as(
        r#"
        INSERT INTO users (username, password_hash, first_name, last_name, email)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (username) DO NOTHING
        RETURNING id
        "#,
    )
    .bind(username)
    .bind(password_hash)
    .bind(first_name)
    .bind(last_name)
    .bind(email)
    .fetch_optional(db)
    .await?;
    Ok(row.map(|(id,)| id))
}

pub async fn find_by_username(db: &PgPool, username: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT id, username, password_hash, first_name, last_name, email, img, created_at
        FROM users
        WHERE username = $1
        "#,
    )
    .bind(username)
    .fetch_optional(db)
    .await
}

/// First row matching on username or email, as (username, email).
pub async fn find_username_or_email(
    db: &PgPool,
    username: &str,
    email: &str,
) -> Result<Option<(String, String)>, sqlx::Error> {
    sqlx::query_as::<_, (String, String)>(
        r#"
        SELECT username, email
        FROM users
        WHERE username = $1 OR email = $2
        LIMIT 1
        "#,
    )
    .bind(username)
    .bind(email)
    .fetch_optional(db)
    .await
}

pub async fn profile_by_username(
    db: &PgPool,
    username: &str,
) -> Result<Option<Profile>, sqlx::Error> {
    sqlx::query_as::<_, Profile>(
        r#"
        SELECT username, email, img
        FROM users
        WHERE username = $1
        "#,
    )
    .bind(username)
    .fetch_optional(db)
    .await
}

/// Set the profile image URL, returning how many rows matched.
pub async fn set_profile_image(
    db: &PgPool,
    username: &str,
    img: &str,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE users SET img = $1 WHERE username = $2
        "#,
    )
    .bind(img)
    .bind(username)
    .execute(db)
    .await?;
    Ok(result.rows_affected())
}
