//! Article directory client: reference resolution, a shared directory view
//! model, and a create/edit form reconciled against the backend.

pub mod backend;
pub mod config;
pub mod config_file;
pub mod dashboard;
pub mod directory;
pub mod error;
pub mod form;
pub mod model;
pub mod mutation;
pub mod reference;
pub mod resolve;

// Re-export for convenience
pub use backend::{DirectoryBackend, HttpBackend, MockBackend};
pub use config::{Config, LabelSet};
pub use dashboard::Dashboard;
pub use directory::{
    ArticleView, Directory, FrontPage, Listing, LoadReport, LoadState, TableStatus, excerpt,
};
pub use error::{
    BackendError, ConfigError, DirectoryError, FormError, MutationError, MutationKind, Resource,
};
pub use form::{ArticleForm, ArticlePayload, FormField, FormMode, FormState, ImageField};
pub use model::{Article, Category, ForeignKey, Id, ImageUpload, ReferenceEntry, User};
pub use mutation::{Confirm, DeleteOutcome, MutationCoordinator, MutationOutcome};
pub use reference::ReferenceTable;
pub use resolve::{FallbackLabels, resolve};
