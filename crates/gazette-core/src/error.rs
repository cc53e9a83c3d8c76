use std::fmt;

use thiserror::Error;

use crate::form::FormField;
use crate::model::Id;

/// Failure talking to the article backend.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid base URL: {0}")]
    InvalidUrl(String),
    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

impl BackendError {
    /// HTTP status code, when the backend answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            BackendError::Status { status, .. } => Some(*status),
            BackendError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Which backend collection a read was aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Articles,
    Article,
    Categories,
    Users,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Resource::Articles => "articles",
            Resource::Article => "article",
            Resource::Categories => "categories",
            Resource::Users => "users",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("failed to fetch {resource}: {source}")]
    FetchFailed {
        resource: Resource,
        #[source]
        source: BackendError,
    },
    #[error("article {0} does not exist")]
    ArticleNotFound(Id),
}

impl DirectoryError {
    pub fn user_message(&self) -> String {
        match self {
            DirectoryError::FetchFailed {
                resource: Resource::Article,
                ..
            }
            | DirectoryError::ArticleNotFound(_) => "Failed to load article.".to_string(),
            DirectoryError::FetchFailed { resource, .. } => format!("Failed to load {resource}."),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("missing required field: {0}")]
    MissingRequiredField(FormField),
    #[error("unknown form field: {0}")]
    UnknownField(String),
}

impl FormError {
    pub fn user_message(&self) -> String {
        match self {
            FormError::MissingRequiredField(field) => {
                format!("Please fill the required field: {field}.")
            }
            FormError::UnknownField(name) => format!("Unknown field \"{name}\"."),
        }
    }
}

/// The three write operations the coordinator can issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
    Create,
    Update,
    Delete,
}

impl MutationKind {
    pub fn success_message(&self) -> &'static str {
        match self {
            MutationKind::Create => "Article created successfully!",
            MutationKind::Update => "Article updated successfully!",
            MutationKind::Delete => "Article deleted.",
        }
    }
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MutationKind::Create => "create",
            MutationKind::Update => "update",
            MutationKind::Delete => "delete",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum MutationError {
    /// Rejected locally; nothing was sent.
    #[error("invalid form: {0}")]
    Invalid(#[from] FormError),
    #[error("{kind} failed: {source}")]
    Failed {
        kind: MutationKind,
        #[source]
        source: BackendError,
    },
}

impl MutationError {
    pub fn user_message(&self) -> String {
        match self {
            MutationError::Invalid(e) => e.user_message(),
            MutationError::Failed {
                kind: MutationKind::Delete,
                ..
            } => "Failed to delete article.".to_string(),
            MutationError::Failed { .. } => {
                "Failed to save article. Please check the input fields.".to_string()
            }
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),
}
