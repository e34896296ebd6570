use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

/// Article record in the database. Authorship is immutable.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Article {
    pub id: i64,
    pub title: String,
    pub body: String,
    pub category: String,
    pub submitted_by: i64,
    pub created_at: OffsetDateTime,
}

/// Article row joined with its author's public fields.
#[derive(Debug, Clone, FromRow)]
pub struct ArticleWithAuthor {
    pub id: i64,
    pub title: String,
    pub body: String,
    pub category: String,
    pub submitted_by: i64,
    pub created_at: OffsetDateTime,
    pub username: String,
    pub email: String,
}

impl Article {
    pub async fn list(db: &PgPool) -> anyhow::Result<Vec<Article>> {
        let rows = sqlx::query_as::<_, Article>(
            r#"
            SELECT id, title, body, category, submitted_by, created_at
            FROM articles
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn list_by_user(db: &PgPool, user_id: i64) -> anyhow::Result<Vec<Article>> {
        let rows = sqlx::query_as::<_, Article>(
            r#"
            SELECT id, title, body, category, submitted_by, created_at
            FROM articles
            WHERE submitted_by = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn list_with_author(
        db: &PgPool,
        user_id: i64,
    ) -> anyhow::Result<Vec<ArticleWithAuthor>> {
        let rows = sqlx::query_as::<_, ArticleWithAuthor>(
            r#"
            SELECT a.id, a.title, a.body, a.category, a.submitted_by, a.created_at,
                   u.username, u.email
            FROM articles a
            JOIN users u ON u.id = a.submitted_by
            WHERE a.submitted_by = $1
            ORDER BY a.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    /// Insert a new article stamped with its author.
    pub async fn create(
        db: &PgPool,
        submitted_by: i64,
        title: &str,
        body: &str,
        category: &str,
    ) -> anyhow::Result<Article> {
        let article = sqlx::query_as::<_, Article>(
            r#"
            INSERT INTO articles (title, body, category, submitted_by)
            VALUES ($1, $2, $3, $4)
            RETURNING id, title, body, category, submitted_by, created_at
            "#,
        )
        .bind(title)
        .bind(body)
        .bind(category)
        .bind(submitted_by)
        .fetch_one(db)
        .await?;
        Ok(article)
    }
}
