use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    articles::{
        dto::{ArticleResponse, ArticleWithAuthorResponse, CreateArticleRequest},
        repo::Article,
    },
    auth::jwt::AuthUser,
    error::ApiError,
    state::AppState,
};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/articles", get(list_articles))
        .route("/users/:id/articles", get(list_user_articles))
        .route("/users/:id/posts-with-user", get(list_user_articles_with_author))
}

pub fn write_routes() -> Router<AppState> {
    Router::new().route("/articles", post(create_article))
}

#[instrument(skip(state))]
pub async fn list_articles(
    State(state): State<AppState>,
) -> Result<Json<Vec<ArticleResponse>>, ApiError> {
    let articles = Article::list(&state.db).await?;
    let items = articles.into_iter().map(ArticleResponse::from).collect();
    Ok(Json(items))
}

/// A user with no articles gets an empty list, not a 404.
#[instrument(skip(state))]
pub async fn list_user_articles(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<ArticleResponse>>, ApiError> {
    let articles = Article::list_by_user(&state.db, id).await?;
    let items = articles.into_iter().map(ArticleResponse::from).collect();
    Ok(Json(items))
}

#[instrument(skip(state))]
pub async fn list_user_articles_with_author(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<ArticleWithAuthorResponse>>, ApiError> {
    let rows = Article::list_with_author(&state.db, id).await?;
    let items = rows.into_iter().map(ArticleWithAuthorResponse::from).collect();
    Ok(Json(items))
}

#[instrument(skip(state, payload))]
pub async fn create_article(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(mut payload): Json<CreateArticleRequest>,
) -> Result<(StatusCode, Json<ArticleResponse>), ApiError> {
    payload.title = payload.title.trim().to_string();
    payload.category = payload.category.trim().to_string();

    if payload.title.is_empty() || payload.body.is_empty() || payload.category.is_empty() {
        warn!(user_id, "article with missing fields");
        return Err(ApiError::Validation(
            "title, body and category are required".into(),
        ));
    }

    let article = Article::create(
        &state.db,
        user_id,
        &payload.title,
        &payload.body,
        &payload.category,
    )
    .await?;

    info!(article_id = article.id, user_id, "article created");
    Ok((StatusCode::CREATED, Json(ArticleResponse::from(article))))
}
