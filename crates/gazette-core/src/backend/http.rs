use std::time::Duration;

use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;

use super::{BackendFuture, DirectoryBackend};
use crate::config::Config;
use crate::error::BackendError;
use crate::form::ArticlePayload;
use crate::model::{Article, Category, Id, User};

/// reqwest-backed client for the article REST service.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(config: &Config) -> Result<Self, BackendError> {
        let base_url = normalize_base_url(&config.base_url)?;
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
        if config.request_timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(config.request_timeout_secs));
        }
        Ok(Self {
            client: builder.build()?,
            base_url,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, BackendError> {
        let url = self.url(path);
        tracing::debug!(%url, "GET");
        let resp = self.client.get(&url).send().await?;
        let body = check_status(resp).await?.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn send_form(
        &self,
        request: reqwest::RequestBuilder,
        payload: &ArticlePayload,
    ) -> Result<Article, BackendError> {
        let resp = request.multipart(multipart_form(payload)?).send().await?;
        let body = check_status(resp).await?.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

impl DirectoryBackend for HttpBackend {
    fn list_articles(&self) -> BackendFuture<'_, Vec<Article>> {
        Box::pin(self.get_json("articles/"))
    }

    fn get_article<'a>(&'a self, id: &'a Id) -> BackendFuture<'a, Article> {
        Box::pin(async move { self.get_json(&format!("articles/{id}")).await })
    }

    fn list_categories(&self) -> BackendFuture<'_, Vec<Category>> {
        Box::pin(self.get_json("categories/"))
    }

    fn list_users(&self) -> BackendFuture<'_, Vec<User>> {
        Box::pin(self.get_json("users/"))
    }

    fn create_article<'a>(&'a self, payload: &'a ArticlePayload) -> BackendFuture<'a, Article> {
        Box::pin(async move {
            let url = self.url("articles/");
            tracing::debug!(%url, with_image = payload.image.is_some(), "POST");
            self.send_form(self.client.post(&url), payload).await
        })
    }

    fn update_article<'a>(
        &'a self,
        id: &'a Id,
        payload: &'a ArticlePayload,
    ) -> BackendFuture<'a, Article> {
        Box::pin(async move {
            let url = self.url(&format!("articles/{id}/"));
            tracing::debug!(%url, with_image = payload.image.is_some(), "PUT");
            self.send_form(self.client.put(&url), payload).await
        })
    }

    fn delete_article<'a>(&'a self, id: &'a Id) -> BackendFuture<'a, ()> {
        Box::pin(async move {
            let url = self.url(&format!("articles/{id}/"));
            tracing::debug!(%url, "DELETE");
            let resp = self.client.delete(&url).send().await?;
            check_status(resp).await?;
            Ok(())
        })
    }
}

/// Build the multipart body. `image` is only attached when a new file was chosen.
fn multipart_form(payload: &ArticlePayload) -> Result<Form, BackendError> {
    let form = Form::new()
        .text("title", payload.title.clone())
        .text("content", payload.content.clone())
        .text("category", payload.category.to_string())
        .text("author", payload.author.to_string());
    match &payload.image {
        Some(image) => {
            let part = Part::bytes(image.bytes.clone())
                .file_name(image.file_name.clone())
                .mime_str(&image.content_type)?;
            Ok(form.part("image", part))
        }
        None => Ok(form),
    }
}

async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, BackendError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(BackendError::Status {
        status: status.as_u16(),
        body,
    })
}

/// Trim trailing slashes and require an http(s) scheme.
pub fn normalize_base_url(raw: &str) -> Result<String, BackendError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let has_host = trimmed
        .strip_prefix("http://")
        .or_else(|| trimmed.strip_prefix("https://"))
        .is_some_and(|rest| !rest.is_empty());
    if !has_host {
        return Err(BackendError::InvalidUrl(raw.to_string()));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slashes_trimmed() {
        assert_eq!(
            normalize_base_url("http://127.0.0.1:8000/api/").unwrap(),
            "http://127.0.0.1:8000/api"
        );
        assert_eq!(
            normalize_base_url(" https://news.example//").unwrap(),
            "https://news.example"
        );
    }

    #[test]
    fn base_url_requires_http_scheme() {
        assert!(matches!(
            normalize_base_url("127.0.0.1:8000/api"),
            Err(BackendError::InvalidUrl(_))
        ));
        assert!(normalize_base_url("http://").is_err());
    }

    #[test]
    fn urls_join_under_base() {
        let backend = HttpBackend::new(&Config {
            base_url: "http://localhost:8000/api/".into(),
            ..Config::default()
        })
        .unwrap();
        assert_eq!(backend.url("articles/"), "http://localhost:8000/api/articles/");
    }
}
