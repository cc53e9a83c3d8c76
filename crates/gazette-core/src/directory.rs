//! The shared directory view model.
//!
//! A single [`Directory`] owns the article list and both reference tables and
//! hands resolved labels to every consumer, so simultaneously rendered cards
//! can never disagree about a category name.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset};
use futures_util::StreamExt;
use futures_util::stream::FuturesUnordered;

use crate::backend::DirectoryBackend;
use crate::error::{BackendError, DirectoryError, Resource};
use crate::model::{Article, Category, Id, User};
use crate::reference::ReferenceTable;
use crate::resolve::{FallbackLabels, resolve};

/// Excerpt lengths for the card, featured and admin layouts.
pub const CARD_EXCERPT: usize = 100;
pub const FEATURED_EXCERPT: usize = 150;
pub const ADMIN_EXCERPT: usize = 50;

/// Lifecycle of the article list fetch.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Loaded,
    /// Carries the user-facing message. Never retried automatically.
    Failed(String),
}

impl LoadState {
    pub fn label(&self) -> &str {
        match self {
            Self::Idle => "Idle",
            Self::Loading => "Loading...",
            Self::Loaded => "Loaded",
            Self::Failed(msg) => msg,
        }
    }
}

/// Availability of one reference table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TableStatus {
    #[default]
    Pending,
    Ready,
    /// The last fetch failed; the table still holds the previous contents.
    Failed(String),
}

/// Every fetch that failed during one [`Directory::load`].
#[derive(Debug, Default)]
pub struct LoadReport {
    pub failures: Vec<DirectoryError>,
}

impl LoadReport {
    pub fn is_ok(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failed(&self, resource: Resource) -> bool {
        self.failures.iter().any(|f| {
            matches!(f, DirectoryError::FetchFailed { resource: r, .. } if *r == resource)
        })
    }
}

/// An article with both foreign keys resolved for display.
#[derive(Debug, Clone, PartialEq)]
pub struct ArticleView {
    pub id: Id,
    pub title: String,
    pub content: String,
    pub image: Option<String>,
    pub created_at: Option<DateTime<FixedOffset>>,
    pub category: String,
    pub author: String,
}

impl ArticleView {
    pub fn excerpt(&self, max_chars: usize) -> String {
        excerpt(&self.content, max_chars)
    }

    /// Calendar date of publication, or `""` when unknown.
    pub fn published_on(&self) -> String {
        self.created_at
            .map(|ts| ts.format("%Y-%m-%d").to_string())
            .unwrap_or_default()
    }
}

/// Front page layout: the first article featured, the rest in a grid.
#[derive(Debug, Clone, PartialEq)]
pub struct FrontPage {
    pub featured: ArticleView,
    pub rest: Vec<ArticleView>,
}

/// What a list consumer should render right now.
#[derive(Debug, Clone, PartialEq)]
pub enum Listing<'a> {
    Loading,
    Failed(&'a str),
    Empty,
    Articles(Vec<ArticleView>),
}

/// Cut `text` to at most `max_chars` characters followed by `...`.
pub fn excerpt(text: &str, max_chars: usize) -> String {
    let cut: String = text.chars().take(max_chars).collect();
    format!("{cut}...")
}

enum Fetched {
    Articles(Result<Vec<Article>, BackendError>),
    Categories(Result<Vec<Category>, BackendError>),
    Users(Result<Vec<User>, BackendError>),
}

type FetchFuture<'a> = Pin<Box<dyn Future<Output = Fetched> + Send + 'a>>;

pub struct Directory {
    backend: Arc<dyn DirectoryBackend>,
    state: LoadState,
    articles: Vec<Article>,
    categories: ReferenceTable,
    users: ReferenceTable,
    category_status: TableStatus,
    user_status: TableStatus,
}

impl Directory {
    pub fn new(backend: Arc<dyn DirectoryBackend>) -> Self {
        Self {
            backend,
            state: LoadState::Idle,
            articles: Vec::new(),
            categories: ReferenceTable::default(),
            users: ReferenceTable::default(),
            category_status: TableStatus::Pending,
            user_status: TableStatus::Pending,
        }
    }

    /// Fetch articles, categories and users concurrently, applying each
    /// result as soon as it arrives.
    pub async fn load(&mut self) -> LoadReport {
        self.state = LoadState::Loading;
        let backend = Arc::clone(&self.backend);

        let mut pending: FuturesUnordered<FetchFuture<'_>> = FuturesUnordered::new();
        pending.push(Box::pin(async {
            Fetched::Articles(backend.list_articles().await)
        }));
        pending.push(Box::pin(async {
            Fetched::Categories(backend.list_categories().await)
        }));
        pending.push(Box::pin(async {
            Fetched::Users(backend.list_users().await)
        }));

        let mut report = LoadReport::default();
        while let Some(fetched) = pending.next().await {
            let applied = match fetched {
                Fetched::Articles(result) => self.apply_articles(result),
                Fetched::Categories(result) => self.apply_categories(result),
                Fetched::Users(result) => self.apply_users(result),
            };
            if let Err(e) = applied {
                report.failures.push(e);
            }
        }
        tracing::debug!(
            articles = self.articles.len(),
            categories = self.categories.len(),
            users = self.users.len(),
            failures = report.failures.len(),
            "directory load complete"
        );
        report
    }

    /// Re-run [`load`](Self::load); the list is replaced, never merged.
    pub async fn refresh(&mut self) -> LoadReport {
        self.load().await
    }

    pub fn apply_articles(
        &mut self,
        result: Result<Vec<Article>, BackendError>,
    ) -> Result<(), DirectoryError> {
        match result {
            Ok(articles) => {
                self.articles = articles;
                self.state = LoadState::Loaded;
                Ok(())
            }
            Err(source) => {
                let err = fetch_failed(Resource::Articles, source);
                self.state = LoadState::Failed(err.user_message());
                Err(err)
            }
        }
    }

    pub fn apply_categories(
        &mut self,
        result: Result<Vec<Category>, BackendError>,
    ) -> Result<(), DirectoryError> {
        apply_table(
            &mut self.categories,
            &mut self.category_status,
            Resource::Categories,
            result,
        )
    }

    pub fn apply_users(
        &mut self,
        result: Result<Vec<User>, BackendError>,
    ) -> Result<(), DirectoryError> {
        apply_table(&mut self.users, &mut self.user_status, Resource::Users, result)
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    pub fn find(&self, id: &Id) -> Option<&Article> {
        self.articles.iter().find(|a| &a.id == id)
    }

    /// Loaded with zero articles: the "nothing here yet" state, not an error.
    pub fn is_empty(&self) -> bool {
        self.state == LoadState::Loaded && self.articles.is_empty()
    }

    pub fn categories(&self) -> &ReferenceTable {
        &self.categories
    }

    pub fn users(&self) -> &ReferenceTable {
        &self.users
    }

    pub fn category_status(&self) -> &TableStatus {
        &self.category_status
    }

    pub fn user_status(&self) -> &TableStatus {
        &self.user_status
    }

    pub fn category_label(&self, article: &Article, fallback: &str) -> String {
        resolve(&article.category, &self.categories, fallback)
    }

    pub fn author_label(&self, article: &Article, fallback: &str) -> String {
        resolve(&article.author, &self.users, fallback)
    }

    pub fn view(&self, article: &Article, labels: &FallbackLabels) -> ArticleView {
        ArticleView {
            id: article.id.clone(),
            title: article.title.clone(),
            content: article.content.clone(),
            image: article.image.clone(),
            created_at: article.created_at,
            category: self.category_label(article, &labels.category),
            author: self.author_label(article, &labels.author),
        }
    }

    /// All articles, resolved against whatever tables are present now.
    pub fn views(&self, labels: &FallbackLabels) -> Vec<ArticleView> {
        self.articles.iter().map(|a| self.view(a, labels)).collect()
    }

    pub fn listing(&self, labels: &FallbackLabels) -> Listing<'_> {
        match &self.state {
            LoadState::Idle | LoadState::Loading => Listing::Loading,
            LoadState::Failed(msg) => Listing::Failed(msg),
            LoadState::Loaded if self.articles.is_empty() => Listing::Empty,
            LoadState::Loaded => Listing::Articles(self.views(labels)),
        }
    }

    pub fn front_page(&self, featured: &FallbackLabels, card: &FallbackLabels) -> Option<FrontPage> {
        let (first, rest) = self.articles.split_first()?;
        Some(FrontPage {
            featured: self.view(first, featured),
            rest: rest.iter().map(|a| self.view(a, card)).collect(),
        })
    }

    /// `GET /articles/{id}`. Does not touch the list or the load state.
    ///
    /// A 404 becomes [`DirectoryError::ArticleNotFound`].
    pub async fn fetch_article(&self, id: &Id) -> Result<Article, DirectoryError> {
        match self.backend.get_article(id).await {
            Ok(article) => Ok(article),
            Err(source) if source.status() == Some(404) => {
                tracing::debug!(%id, error = %source, "article not found");
                Err(DirectoryError::ArticleNotFound(id.clone()))
            }
            Err(source) => Err(fetch_failed(Resource::Article, source)),
        }
    }

    /// Fetch and resolve a single article for the detail view.
    pub async fn detail(&self, id: &Id, labels: &FallbackLabels) -> Result<ArticleView, DirectoryError> {
        let article = self.fetch_article(id).await?;
        Ok(self.view(&article, labels))
    }
}

fn fetch_failed(resource: Resource, source: BackendError) -> DirectoryError {
    tracing::warn!(%resource, error = %source, "fetch failed");
    DirectoryError::FetchFailed { resource, source }
}

/// Replace `table` wholesale on success; keep it untouched on failure.
fn apply_table<E: Into<crate::model::ReferenceEntry>>(
    table: &mut ReferenceTable,
    status: &mut TableStatus,
    resource: Resource,
    result: Result<Vec<E>, BackendError>,
) -> Result<(), DirectoryError> {
    match result {
        Ok(entries) => {
            *table = ReferenceTable::build(entries);
            *status = TableStatus::Ready;
            Ok(())
        }
        Err(source) => {
            let err = fetch_failed(resource, source);
            *status = TableStatus::Failed(err.user_message());
            Err(err)
        }
    }
}
