//! The single create/edit article form.
//!
//! [`ArticleForm`] is the only thing that mutates a [`FormState`]. Selecting
//! an article for editing copies its fields in; leaving edit mode (cancel,
//! or a successful write) always lands on the blank create state.

use std::fmt;
use std::str::FromStr;

use crate::error::FormError;
use crate::model::{Article, Id, ImageUpload};

/// Editable text fields, in validation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    Title,
    Content,
    Category,
    Author,
}

impl FormField {
    pub const REQUIRED: [FormField; 4] = [
        FormField::Title,
        FormField::Content,
        FormField::Category,
        FormField::Author,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            FormField::Title => "title",
            FormField::Content => "content",
            FormField::Category => "category",
            FormField::Author => "author",
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FormField {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "title" => Ok(FormField::Title),
            "content" => Ok(FormField::Content),
            "category" | "category_id" => Ok(FormField::Category),
            "author" | "author_id" => Ok(FormField::Author),
            other => Err(FormError::UnknownField(other.to_string())),
        }
    }
}

/// The form's image slot.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ImageField {
    #[default]
    None,
    /// The article's stored image, shown as a preview only.
    Existing(String),
    /// A file picked by the operator; the only variant that gets uploaded.
    Selected(ImageUpload),
}

/// Current contents of the form. `Default` is the blank create state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormState {
    title: String,
    content: String,
    category_id: String,
    author_id: String,
    image: ImageField,
    selected_article_id: Option<Id>,
}

impl FormState {
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn category_id(&self) -> &str {
        &self.category_id
    }

    pub fn author_id(&self) -> &str {
        &self.author_id
    }

    pub fn image(&self) -> &ImageField {
        &self.image
    }

    pub fn selected_article_id(&self) -> Option<&Id> {
        self.selected_article_id.as_ref()
    }

    pub fn field(&self, field: FormField) -> &str {
        match field {
            FormField::Title => &self.title,
            FormField::Content => &self.content,
            FormField::Category => &self.category_id,
            FormField::Author => &self.author_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(Id),
}

/// What the form serializes to: the multipart fields of a create/update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticlePayload {
    pub title: String,
    pub content: String,
    pub category: Id,
    pub author: Id,
    /// Present only when a new file was selected.
    pub image: Option<ImageUpload>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitTarget {
    Create,
    Update(Id),
}

/// A validated payload plus where it should go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub target: SubmitTarget,
    pub payload: ArticlePayload,
}

#[derive(Debug, Clone, Default)]
pub struct ArticleForm {
    state: FormState,
}

impl ArticleForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn mode(&self) -> FormMode {
        match &self.state.selected_article_id {
            Some(id) => FormMode::Edit(id.clone()),
            None => FormMode::Create,
        }
    }

    pub fn is_editing(&self, id: &Id) -> bool {
        self.state.selected_article_id.as_ref() == Some(id)
    }

    pub fn heading(&self) -> &'static str {
        match self.state.selected_article_id {
            Some(_) => "Edit Article",
            None => "Create Article",
        }
    }

    pub fn start_create(&mut self) {
        self.state = FormState::default();
    }

    /// Abandon an edit. Same as [`start_create`](Self::start_create).
    pub fn cancel(&mut self) {
        self.start_create();
    }

    /// Enter edit mode for `article`, overwriting every field.
    pub fn start_edit(&mut self, article: &Article) {
        self.state = FormState {
            title: article.title.clone(),
            content: article.content.clone(),
            category_id: article
                .category
                .id()
                .map(Id::to_string)
                .unwrap_or_default(),
            author_id: article.author.id().map(Id::to_string).unwrap_or_default(),
            image: match &article.image {
                Some(uri) => ImageField::Existing(uri.clone()),
                None => ImageField::None,
            },
            selected_article_id: Some(article.id.clone()),
        };
    }

    pub fn update_field(&mut self, field: FormField, value: impl Into<String>) {
        let value = value.into();
        match field {
            FormField::Title => self.state.title = value,
            FormField::Content => self.state.content = value,
            FormField::Category => self.state.category_id = value,
            FormField::Author => self.state.author_id = value,
        }
    }

    pub fn select_image(&mut self, image: ImageUpload) {
        self.state.image = ImageField::Selected(image);
    }

    /// The first empty required field, if any. The image is never required.
    pub fn validate(&self) -> Result<(), FormError> {
        match FormField::REQUIRED
            .into_iter()
            .find(|&field| self.state.field(field).is_empty())
        {
            Some(field) => Err(FormError::MissingRequiredField(field)),
            None => Ok(()),
        }
    }

    /// Build the payload. An unchanged (`Existing`) image is left out so the
    /// backend keeps the asset it already has.
    pub fn serialize(&self) -> ArticlePayload {
        ArticlePayload {
            title: self.state.title.clone(),
            content: self.state.content.clone(),
            category: Id::new(self.state.category_id.clone()),
            author: Id::new(self.state.author_id.clone()),
            image: match &self.state.image {
                ImageField::Selected(upload) => Some(upload.clone()),
                ImageField::Existing(_) | ImageField::None => None,
            },
        }
    }

    /// [`validate`](Self::validate), then [`serialize`](Self::serialize).
    pub fn submission(&self) -> Result<Submission, FormError> {
        self.validate()?;
        let target = match &self.state.selected_article_id {
            Some(id) => SubmitTarget::Update(id.clone()),
            None => SubmitTarget::Create,
        };
        Ok(Submission {
            target,
            payload: self.serialize(),
        })
    }
}
