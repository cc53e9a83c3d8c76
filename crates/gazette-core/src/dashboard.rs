use std::sync::Arc;

use crate::backend::DirectoryBackend;
use crate::directory::{Directory, LoadReport};
use crate::error::{DirectoryError, MutationError};
use crate::form::ArticleForm;
use crate::model::Id;
use crate::mutation::{Confirm, DeleteOutcome, MutationCoordinator, MutationOutcome};

/// The admin screen: one directory, one form, one coordinator, all sharing a
/// backend.
pub struct Dashboard {
    pub directory: Directory,
    pub form: ArticleForm,
    coordinator: MutationCoordinator,
}

impl Dashboard {
    pub fn new(backend: Arc<dyn DirectoryBackend>) -> Self {
        Self {
            directory: Directory::new(Arc::clone(&backend)),
            form: ArticleForm::new(),
            coordinator: MutationCoordinator::new(backend),
        }
    }

    pub async fn load(&mut self) -> LoadReport {
        self.directory.load().await
    }

    /// Put the form into edit mode for `id`.
    ///
    /// Uses the loaded list when it has the article, otherwise fetches it.
    pub async fn edit(&mut self, id: &Id) -> Result<(), DirectoryError> {
        match self.directory.find(id) {
            Some(article) => self.form.start_edit(article),
            None => {
                let article = self.directory.fetch_article(id).await?;
                self.form.start_edit(&article);
            }
        }
        Ok(())
    }

    pub async fn submit(&mut self) -> Result<MutationOutcome, MutationError> {
        self.coordinator
            .submit(&mut self.form, &mut self.directory)
            .await
    }

    pub async fn delete(
        &mut self,
        id: &Id,
        confirm: &dyn Confirm,
    ) -> Result<DeleteOutcome, MutationError> {
        self.coordinator
            .delete(id, confirm, &mut self.form, &mut self.directory)
            .await
    }
}
