use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::articles::repo::{Article, ArticleWithAuthor};

/// Request body for article creation. The author comes from the token, not
/// the body.
#[derive(Debug, Deserialize)]
pub struct CreateArticleRequest {
    pub title: String,
    pub body: String,
    pub category: String,
}

#[derive(Debug, Serialize)]
pub struct ArticleResponse {
    pub id: i64,
    pub title: String,
    pub body: String,
    pub category: String,
    pub submitted_by: i64,
    pub created_at: OffsetDateTime,
}

impl From<Article> for ArticleResponse {
    fn from(a: Article) -> Self {
        Self {
            id: a.id,
            title: a.title,
            body: a.body,
            category: a.category,
            submitted_by: a.submitted_by,
            created_at: a.created_at,
        }
    }
}

/// Article plus its author's public fields, for the joined listing.
#[derive(Debug, Serialize)]
pub struct ArticleWithAuthorResponse {
    pub id: i64,
    pub title: String,
    pub body: String,
    pub category: String,
    pub submitted_by: i64,
    pub created_at: OffsetDateTime,
    pub username: String,
    pub email: String,
}

impl From<ArticleWithAuthor> for ArticleWithAuthorResponse {
    fn from(a: ArticleWithAuthor) -> Self {
        Self {
            id: a.id,
            title: a.title,
            body: a.body,
            category: a.category,
            submitted_by: a.submitted_by,
            created_at: a.created_at,
            username: a.username,
            email: a.email,
        }
    }
}
