use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, Query},
    Extension, Form, Json,
};
use chrono::Utc;

use crate::{
    data_formats::{
        parse_id, ArticleApiResponse, CreateArticleRequest, Envelope, ListQueryParams,
        PageParams, Reply, RequiredFields,
    },
    db_helpers::{
        add_article_in_db, delete_article_in_db, get_article_by_id_in_db, list_articles_in_db,
        list_latest_articles_in_db, update_article_by_id_in_db,
    },
    errors::RequestError,
    models::{Article, Row},
    store::Store,
};

// ----------------- Article Handlers -----------------

/// POST /articles
pub async fn create_article(
    Extension(store): Extension<Arc<Store>>,
    Form(request): Form<CreateArticleRequest>,
) -> Json<Envelope<Article>> {
    Json(insert_article(&store, request).await.into())
}

async fn insert_article(
    store: &Store,
    request: CreateArticleRequest,
) -> Result<Article, RequestError> {
    request.check()?;
    let now = Utc::now();
    let mut article = Article {
        id: 0,
        title: Some(request.title),
        content: Some(request.content),
        created_at: Some(now),
        updated_at: Some(now),
        title_image: request.title_image,
    };
    article.id = add_article_in_db(store, &article).await?;
    tracing::info!(id = article.id, "article created");
    Ok(article)
}

/// GET /articles/:id
pub async fn get_article(
    Extension(store): Extension<Arc<Store>>,
    Path(id): Path<String>,
) -> Json<Reply<Article>> {
    Json(get_article_by_id_in_db(&store, parse_id(&id)).await.into())
}

/// GET /articles?query=k:v&fields=a,b&sortby=a&order=desc&limit=10&offset=0
pub async fn list_articles(
    Extension(store): Extension<Arc<Store>>,
    Query(params): Query<ListQueryParams>,
) -> Json<Reply<Vec<Row>>> {
    let result = match params.into_list_params() {
        Ok(params) => list_articles_in_db(&store, &params).await,
        Err(e) => Err(e),
    };
    Json(result.into())
}

/// PUT /articles/:id
pub async fn update_article(
    Extension(store): Extension<Arc<Store>>,
    Path(id): Path<String>,
    body: Bytes,
) -> Json<Reply<&'static str>> {
    Json(replace_article(&store, parse_id(&id), &body).await.into())
}

async fn replace_article(store: &Store, id: i64, body: &[u8]) -> Result<&'static str, RequestError> {
    let mut article: Article = serde_json::from_slice(body)
        .map_err(|e| RequestError::Validation(format!("invalid JSON body: {}", e)))?;
    article.id = id;
    update_article_by_id_in_db(store, &article).await?;
    Ok("OK")
}

/// DELETE /articles/:id
pub async fn delete_article(
    Extension(store): Extension<Arc<Store>>,
    Path(id): Path<String>,
) -> Json<Reply<&'static str>> {
    let result = delete_article_in_db(&store, parse_id(&id)).await.map(|_| "OK");
    Json(result.into())
}

// ----------------- Article Projection Handlers -----------------

/// GET /api/articles/:id
pub async fn get_article_api(
    Extension(store): Extension<Arc<Store>>,
    Path(id): Path<String>,
) -> Json<Reply<ArticleApiResponse>> {
    let result = get_article_by_id_in_db(&store, parse_id(&id))
        .await
        .map(ArticleApiResponse::from);
    Json(result.into())
}

/// GET /api/articles?limit=10&offset=0
pub async fn list_articles_api(
    Extension(store): Extension<Arc<Store>>,
    Query(page): Query<PageParams>,
) -> Json<Reply<Vec<ArticleApiResponse>>> {
    let result = list_latest_articles_in_db(&store, page.limit(), page.offset())
        .await
        .map(|articles| articles.into_iter().map(ArticleApiResponse::from).collect());
    Json(result.into())
}
