//! [`HttpBackend`] against a throwaway axum server on `127.0.0.1:0`.
//!
//! The server answers with canned JSON and records every write it receives
//! so tests can inspect the exact multipart fields that went over the wire.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, put};
use axum::{Json, Router};
use gazette_core::backend::DirectoryBackend;
use gazette_core::{
    ArticlePayload, BackendError, Config, Dashboard, FallbackLabels, FormField, ForeignKey,
    FormState, HttpBackend, Id, ImageUpload, LoadState, MutationError,
};
use serde_json::{Value, json};

#[derive(Debug, Clone)]
struct FilePart {
    file_name: Option<String>,
    content_type: Option<String>,
    bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
struct Received {
    method: &'static str,
    id: Option<String>,
    texts: HashMap<String, String>,
    files: HashMap<String, FilePart>,
}

type Log = Arc<Mutex<Vec<Received>>>;

async fn read_multipart(mut multipart: Multipart) -> (HashMap<String, String>, HashMap<String, FilePart>) {
    let mut texts = HashMap::new();
    let mut files = HashMap::new();
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or("").to_string();
        match field.file_name().map(String::from) {
            Some(file_name) => {
                let content_type = field.content_type().map(String::from);
                let bytes = field.bytes().await.unwrap().to_vec();
                files.insert(
                    name,
                    FilePart {
                        file_name: Some(file_name),
                        content_type,
                        bytes,
                    },
                );
            }
            None => {
                texts.insert(name, field.text().await.unwrap());
            }
        }
    }
    (texts, files)
}

fn echo(id: &str, texts: &HashMap<String, String>) -> Value {
    json!({
        "id": id.parse::<u64>().unwrap_or(0),
        "title": texts.get("title"),
        "content": texts.get("content"),
        "category": texts.get("category").and_then(|c| c.parse::<u64>().ok()),
        "author": texts.get("author").and_then(|a| a.parse::<u64>().ok()),
        "created_at": "2024-05-01T08:30:00Z"
    })
}

async fn list_articles() -> Json<Value> {
    Json(json!([
        {"id": 1, "title": "Chips", "content": "Smaller.", "category": 1, "author": 2,
         "image": "http://127.0.0.1/media/chips.png", "created_at": "2024-03-01T10:00:00Z"},
        {"id": 2, "title": "Orphan", "content": "No home.", "category": null, "author": null},
        {"id": 3, "title": "Expanded", "content": "Nested.",
         "category": {"id": 2, "name": "Science"}, "author": {"id": 2, "username": "ada"}}
    ]))
}

async fn get_article(Path(id): Path<String>) -> Response {
    if id != "1" {
        return (StatusCode::NOT_FOUND, Json(json!({"detail": "Not found."}))).into_response();
    }
    Json(json!({
        "id": 1, "title": "Chips", "content": "Smaller.",
        "category": {"id": 1, "name": "Tech"}, "author": {"id": 2, "username": "ada"},
        "created_at": "2024-03-01T10:00:00Z"
    }))
    .into_response()
}

async fn create_article(State(log): State<Log>, multipart: Multipart) -> Response {
    let (texts, files) = read_multipart(multipart).await;
    let body = echo("10", &texts);
    log.lock().unwrap().push(Received {
        method: "POST",
        id: None,
        texts,
        files,
    });
    (StatusCode::CREATED, Json(body)).into_response()
}

async fn update_article(
    State(log): State<Log>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Response {
    let (texts, files) = read_multipart(multipart).await;
    if id == "999" {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"category": ["Invalid pk"]})),
        )
            .into_response();
    }
    let body = echo(&id, &texts);
    log.lock().unwrap().push(Received {
        method: "PUT",
        id: Some(id),
        texts,
        files,
    });
    Json(body).into_response()
}

async fn delete_article(State(log): State<Log>, Path(id): Path<String>) -> StatusCode {
    log.lock().unwrap().push(Received {
        method: "DELETE",
        id: Some(id),
        texts: HashMap::new(),
        files: HashMap::new(),
    });
    StatusCode::NO_CONTENT
}

async fn serve() -> (HttpBackend, Log) {
    let log: Log = Arc::default();
    let app = Router::new()
        .route("/api/articles/", get(list_articles).post(create_article))
        .route("/api/articles/{id}", get(get_article))
        .route("/api/articles/{id}/", put(update_article).delete(delete_article))
        .route(
            "/api/categories/",
            get(|| async { Json(json!([{"id": 1, "name": "Tech"}, {"id": 2, "name": "Science"}])) }),
        )
        .route(
            "/api/users/",
            get(|| async { Json(json!([{"id": 2, "username": "ada"}])) }),
        )
        .with_state(log.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let backend = HttpBackend::new(&Config {
        base_url: format!("http://{addr}/api/"),
        request_timeout_secs: 5,
        ..Config::default()
    })
    .unwrap();
    (backend, log)
}

fn payload(image: Option<ImageUpload>) -> ArticlePayload {
    ArticlePayload {
        title: "T".into(),
        content: "C".into(),
        category: Id::new("1"),
        author: Id::new("2"),
        image,
    }
}

#[tokio::test]
async fn list_ingests_both_foreign_key_shapes() {
    let (backend, _) = serve().await;
    let articles = backend.list_articles().await.unwrap();
    assert_eq!(articles.len(), 3);
    assert_eq!(articles[0].category, ForeignKey::Id(Id::new("1")));
    assert!(articles[1].category.is_absent());
    assert_eq!(articles[2].category.embedded_label(), Some("Science"));
    assert_eq!(articles[2].author.id(), Some(&Id::new("2")));
}

#[tokio::test]
async fn directory_loads_over_http() {
    let (backend, _) = serve().await;
    let mut dashboard = Dashboard::new(Arc::new(backend));
    let report = dashboard.load().await;
    assert!(report.is_ok());
    assert_eq!(dashboard.directory.state(), &LoadState::Loaded);

    let views = dashboard.directory.views(&FallbackLabels::card());
    assert_eq!(views[0].category, "Tech");
    assert_eq!(views[0].author, "ada");
    assert_eq!(views[1].category, "No category assigned");
    assert_eq!(views[2].category, "Science");
}

#[tokio::test]
async fn detail_fetch_without_trailing_slash() {
    let (backend, _) = serve().await;
    let article = backend.get_article(&Id::new("1")).await.unwrap();
    assert_eq!(article.category.embedded_label(), Some("Tech"));

    let err = backend.get_article(&Id::new("7")).await.unwrap_err();
    assert_eq!(err.status(), Some(404));
}

#[tokio::test]
async fn create_without_image_sends_no_image_part() {
    let (backend, log) = serve().await;
    let created = backend.create_article(&payload(None)).await.unwrap();
    assert_eq!(created.id, Id::new("10"));

    let received = log.lock().unwrap()[0].clone();
    assert_eq!(received.method, "POST");
    assert_eq!(received.texts["title"], "T");
    assert_eq!(received.texts["content"], "C");
    assert_eq!(received.texts["category"], "1");
    assert_eq!(received.texts["author"], "2");
    assert!(!received.texts.contains_key("image"));
    assert!(received.files.is_empty());
}

#[tokio::test]
async fn update_with_image_sends_file_part() {
    let (backend, log) = serve().await;
    let image = ImageUpload::new("cover.png", vec![0x89, b'P', b'N', b'G']);
    backend
        .update_article(&Id::new("4"), &payload(Some(image)))
        .await
        .unwrap();

    let received = log.lock().unwrap()[0].clone();
    assert_eq!(received.method, "PUT");
    assert_eq!(received.id.as_deref(), Some("4"));
    let file = &received.files["image"];
    assert_eq!(file.file_name.as_deref(), Some("cover.png"));
    assert_eq!(file.content_type.as_deref(), Some("image/png"));
    assert_eq!(file.bytes, vec![0x89, b'P', b'N', b'G']);
}

#[tokio::test]
async fn delete_hits_trailing_slash_route() {
    let (backend, log) = serve().await;
    backend.delete_article(&Id::new("5")).await.unwrap();
    let received = log.lock().unwrap()[0].clone();
    assert_eq!(received.method, "DELETE");
    assert_eq!(received.id.as_deref(), Some("5"));
}

#[tokio::test]
async fn rejected_update_surfaces_status_and_keeps_form() {
    let (backend, log) = serve().await;
    let direct = backend
        .update_article(&Id::new("999"), &payload(None))
        .await
        .unwrap_err();
    assert!(matches!(direct, BackendError::Status { status: 400, .. }));

    let mut dashboard = Dashboard::new(Arc::new(backend));
    dashboard.load().await;
    dashboard.edit(&Id::new("999")).await.unwrap_err();
    assert_eq!(dashboard.form.state(), &FormState::default());

    dashboard.edit(&Id::new("1")).await.unwrap();
    dashboard.form.update_field(FormField::Title, "Edited");
    let before = dashboard.form.state().clone();
    let outcome = dashboard.submit().await.unwrap();
    assert_eq!(outcome.article.unwrap().title, "Edited");
    assert_eq!(dashboard.form.state(), &FormState::default());
    assert_ne!(before, FormState::default());
    assert_eq!(log.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn invalid_form_sends_nothing_over_http() {
    let (backend, log) = serve().await;
    let mut dashboard = Dashboard::new(Arc::new(backend));
    dashboard.form.update_field(FormField::Title, "T");
    let err = dashboard.submit().await.unwrap_err();
    assert!(matches!(err, MutationError::Invalid(_)));
    assert!(log.lock().unwrap().is_empty());
}
