//! In-memory backend for testing.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use super::{BackendFuture, DirectoryBackend};
use crate::error::BackendError;
use crate::form::ArticlePayload;
use crate::model::{Article, Category, ForeignKey, Id, User};

/// One backend operation, for failure injection and call counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ListArticles,
    GetArticle,
    ListCategories,
    ListUsers,
    Create,
    Update,
    Delete,
}

#[derive(Default)]
struct Store {
    articles: Vec<Article>,
    categories: Vec<Category>,
    users: Vec<User>,
    next_id: u64,
    failures: HashMap<Operation, String>,
    delays: HashMap<Operation, Duration>,
    calls: HashMap<Operation, usize>,
    payloads: Vec<ArticlePayload>,
}

/// A hand-rolled [`DirectoryBackend`] holding its collections in memory.
///
/// Supports:
/// - Seeding articles, categories and users.
/// - Failing any operation with a message until [`recover`](MockBackend::recover).
/// - Per-operation latency (pair with `tokio::time::pause` for ordering tests).
/// - Call counting via [`calls`](MockBackend::calls) and payload capture via
///   [`payloads`](MockBackend::payloads).
#[derive(Default)]
pub struct MockBackend {
    store: Mutex<Store>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_articles(self, articles: Vec<Article>) -> Self {
        {
            let mut store = self.lock();
            store.next_id = articles
                .iter()
                .filter_map(|a| a.id.as_str().parse::<u64>().ok())
                .max()
                .unwrap_or(0);
            store.articles = articles;
        }
        self
    }

    pub fn with_categories(self, categories: Vec<Category>) -> Self {
        self.lock().categories = categories;
        self
    }

    pub fn with_users(self, users: Vec<User>) -> Self {
        self.lock().users = users;
        self
    }

    pub fn with_delay(self, op: Operation, delay: Duration) -> Self {
        self.lock().delays.insert(op, delay);
        self
    }

    /// Make every subsequent `op` fail with `message`.
    pub fn fail(&self, op: Operation, message: impl Into<String>) {
        self.lock().failures.insert(op, message.into());
    }

    pub fn recover(&self, op: Operation) {
        self.lock().failures.remove(&op);
    }

    /// Replace the category collection server-side.
    pub fn set_categories(&self, categories: Vec<Category>) {
        self.lock().categories = categories;
    }

    /// How many times `op` has been invoked.
    pub fn calls(&self, op: Operation) -> usize {
        self.lock().calls.get(&op).copied().unwrap_or(0)
    }

    /// Total write requests issued.
    pub fn write_calls(&self) -> usize {
        self.calls(Operation::Create) + self.calls(Operation::Update) + self.calls(Operation::Delete)
    }

    /// Every create/update payload received, oldest first.
    pub fn payloads(&self) -> Vec<ArticlePayload> {
        self.lock().payloads.clone()
    }

    pub fn articles(&self) -> Vec<Article> {
        self.lock().articles.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Count the call and return its configured latency, or the injected failure.
    fn begin(&self, op: Operation) -> (Option<Duration>, Option<BackendError>) {
        let mut store = self.lock();
        *store.calls.entry(op).or_insert(0) += 1;
        let failure = store
            .failures
            .get(&op)
            .map(|msg| BackendError::Unavailable(msg.clone()));
        (store.delays.get(&op).copied(), failure)
    }

    fn run<'a, T, F>(&'a self, op: Operation, apply: F) -> BackendFuture<'a, T>
    where
        T: Send + 'a,
        F: FnOnce(&mut Store) -> Result<T, BackendError> + Send + 'a,
    {
        let (delay, failure) = self.begin(op);
        Box::pin(async move {
            if let Some(d) = delay {
                tokio::time::sleep(d).await;
            }
            if let Some(err) = failure {
                return Err(err);
            }
            apply(&mut self.lock())
        })
    }
}

fn not_found(id: &Id) -> BackendError {
    BackendError::Status {
        status: 404,
        body: format!("{{\"detail\":\"No article {id}.\"}}"),
    }
}

fn expand(key: &ForeignKey, lookup: impl Fn(&Id) -> Option<String>) -> ForeignKey {
    match key.id() {
        Some(id) => ForeignKey::Embedded {
            id: Some(id.clone()),
            label: lookup(id),
        },
        None => ForeignKey::Absent,
    }
}

impl DirectoryBackend for MockBackend {
    fn list_articles(&self) -> BackendFuture<'_, Vec<Article>> {
        self.run(Operation::ListArticles, |store| Ok(store.articles.clone()))
    }

    fn get_article<'a>(&'a self, id: &'a Id) -> BackendFuture<'a, Article> {
        self.run(Operation::GetArticle, move |store| {
            let mut article = store
                .articles
                .iter()
                .find(|a| &a.id == id)
                .cloned()
                .ok_or_else(|| not_found(id))?;
            article.category = expand(&article.category, |cid| {
                store
                    .categories
                    .iter()
                    .find(|c| &c.id == cid)
                    .map(|c| c.name.clone())
            });
            article.author = expand(&article.author, |uid| {
                store
                    .users
                    .iter()
                    .find(|u| &u.id == uid)
                    .map(|u| u.username.clone())
            });
            Ok(article)
        })
    }

    fn list_categories(&self) -> BackendFuture<'_, Vec<Category>> {
        self.run(Operation::ListCategories, |store| Ok(store.categories.clone()))
    }

    fn list_users(&self) -> BackendFuture<'_, Vec<User>> {
        self.run(Operation::ListUsers, |store| Ok(store.users.clone()))
    }

    fn create_article<'a>(&'a self, payload: &'a ArticlePayload) -> BackendFuture<'a, Article> {
        self.run(Operation::Create, move |store| {
            store.payloads.push(payload.clone());
            store.next_id += 1;
            let article = Article {
                id: Id::from(store.next_id),
                title: payload.title.clone(),
                content: payload.content.clone(),
                image: payload
                    .image
                    .as_ref()
                    .map(|img| format!("/media/articles/{}", img.file_name)),
                created_at: None,
                category: ForeignKey::Id(payload.category.clone()),
                author: ForeignKey::Id(payload.author.clone()),
            };
            store.articles.push(article.clone());
            Ok(article)
        })
    }

    fn update_article<'a>(
        &'a self,
        id: &'a Id,
        payload: &'a ArticlePayload,
    ) -> BackendFuture<'a, Article> {
        self.run(Operation::Update, move |store| {
            store.payloads.push(payload.clone());
            let article = store
                .articles
                .iter_mut()
                .find(|a| &a.id == id)
                .ok_or_else(|| not_found(id))?;
            article.title = payload.title.clone();
            article.content = payload.content.clone();
            article.category = ForeignKey::Id(payload.category.clone());
            article.author = ForeignKey::Id(payload.author.clone());
            if let Some(img) = &payload.image {
                article.image = Some(format!("/media/articles/{}", img.file_name));
            }
            Ok(article.clone())
        })
    }

    fn delete_article<'a>(&'a self, id: &'a Id) -> BackendFuture<'a, ()> {
        self.run(Operation::Delete, move |store| {
            let before = store.articles.len();
            store.articles.retain(|a| &a.id != id);
            if store.articles.len() == before {
                return Err(not_found(id));
            }
            Ok(())
        })
    }
}
