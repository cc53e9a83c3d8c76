//! Create, update and delete, each followed by a full directory refresh.
//!
//! The coordinator holds nothing but a backend handle. A failed write returns
//! before touching the directory or the form, so callers see exactly the
//! state they had before submitting.

use std::sync::Arc;

use crate::backend::DirectoryBackend;
use crate::directory::{Directory, LoadReport};
use crate::error::{MutationError, MutationKind};
use crate::form::{ArticleForm, SubmitTarget};
use crate::model::{Article, Id};

pub const DELETE_PROMPT: &str = "Are you sure you want to delete this article?";

/// Operator confirmation for destructive actions.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F: Fn(&str) -> bool> Confirm for F {
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Result of a write that the backend accepted.
#[derive(Debug)]
pub struct MutationOutcome {
    pub kind: MutationKind,
    /// The article as the backend returned it; `None` for deletes.
    pub article: Option<Article>,
    /// Outcome of the refresh issued after the write.
    pub refresh: LoadReport,
}

impl MutationOutcome {
    pub fn message(&self) -> &'static str {
        self.kind.success_message()
    }
}

#[derive(Debug)]
pub enum DeleteOutcome {
    /// The operator declined; no request was made.
    Cancelled,
    Deleted(MutationOutcome),
}

#[derive(Clone)]
pub struct MutationCoordinator {
    backend: Arc<dyn DirectoryBackend>,
}

impl MutationCoordinator {
    pub fn new(backend: Arc<dyn DirectoryBackend>) -> Self {
        Self { backend }
    }

    /// Validate and send the form as a create or update, depending on its mode.
    ///
    /// A missing required field is reported without any request being made.
    pub async fn submit(
        &self,
        form: &mut ArticleForm,
        directory: &mut Directory,
    ) -> Result<MutationOutcome, MutationError> {
        let submission = form.submission()?;
        let (kind, result) = match &submission.target {
            SubmitTarget::Create => (
                MutationKind::Create,
                self.backend.create_article(&submission.payload).await,
            ),
            SubmitTarget::Update(id) => (
                MutationKind::Update,
                self.backend.update_article(id, &submission.payload).await,
            ),
        };
        let article = result.map_err(|source| {
            tracing::warn!(%kind, error = %source, "article write rejected");
            MutationError::Failed { kind, source }
        })?;
        tracing::debug!(%kind, id = %article.id, "article saved");

        let refresh = directory.refresh().await;
        form.start_create();
        Ok(MutationOutcome {
            kind,
            article: Some(article),
            refresh,
        })
    }

    /// Delete `id` after `confirm` agrees. If the form was editing that
    /// article it drops back to create mode.
    pub async fn delete(
        &self,
        id: &Id,
        confirm: &dyn Confirm,
        form: &mut ArticleForm,
        directory: &mut Directory,
    ) -> Result<DeleteOutcome, MutationError> {
        if !confirm.confirm(DELETE_PROMPT) {
            tracing::debug!(%id, "delete cancelled");
            return Ok(DeleteOutcome::Cancelled);
        }
        self.backend.delete_article(id).await.map_err(|source| {
            tracing::warn!(%id, error = %source, "article delete rejected");
            MutationError::Failed {
                kind: MutationKind::Delete,
                source,
            }
        })?;
        tracing::debug!(%id, "article deleted");

        let refresh = directory.refresh().await;
        if form.is_editing(id) {
            form.start_create();
        }
        Ok(DeleteOutcome::Deleted(MutationOutcome {
            kind: MutationKind::Delete,
            article: None,
            refresh,
        }))
    }
}
