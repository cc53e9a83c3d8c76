//! Backend trait and implementations for the article REST service.

pub mod http;
pub mod mock;

use std::future::Future;
use std::pin::Pin;

use crate::error::BackendError;
use crate::form::ArticlePayload;
use crate::model::{Article, Category, Id, User};

pub use http::HttpBackend;
pub use mock::MockBackend;

/// Boxed future returned by every [`DirectoryBackend`] operation.
pub type BackendFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, BackendError>> + Send + 'a>>;

/// The REST surface the directory consumes: three collections, one of them
/// writable. Each call is a single request; implementations never retry.
pub trait DirectoryBackend: Send + Sync {
    /// `GET /articles/`
    fn list_articles(&self) -> BackendFuture<'_, Vec<Article>>;

    /// `GET /articles/{id}`, with category and author expanded.
    fn get_article<'a>(&'a self, id: &'a Id) -> BackendFuture<'a, Article>;

    /// `GET /categories/`
    fn list_categories(&self) -> BackendFuture<'_, Vec<Category>>;

    /// `GET /users/`
    fn list_users(&self) -> BackendFuture<'_, Vec<User>>;

    /// `POST /articles/` as multipart form data.
    fn create_article<'a>(&'a self, payload: &'a ArticlePayload) -> BackendFuture<'a, Article>;

    /// `PUT /articles/{id}/` as multipart form data.
    fn update_article<'a>(
        &'a self,
        id: &'a Id,
        payload: &'a ArticlePayload,
    ) -> BackendFuture<'a, Article>;

    /// `DELETE /articles/{id}/`
    fn delete_article<'a>(&'a self, id: &'a Id) -> BackendFuture<'a, ()>;
}
