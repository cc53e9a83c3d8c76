//! Wire-facing data model: articles, reference records and image uploads.
//!
//! Foreign keys arrive in two shapes depending on the endpoint: a bare id
//! (`"category": 3`) or an expanded object (`"category": {"id": 3, "name":
//! "Tech"}`). Both are folded into [`ForeignKey`] here, once, so nothing
//! downstream has to sniff JSON.

use std::fmt;
use std::path::Path;

use chrono::{DateTime, FixedOffset};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Opaque backend identifier, kept as canonical text.
///
/// JSON `1` and `"1"` produce the same `Id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Id(String);

impl Id {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse an identifier from a JSON scalar. Objects and arrays are not ids.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => Some(Self(canonical_number(n))),
            Value::String(s) if !s.is_empty() => Some(Self(s.clone())),
            _ => None,
        }
    }
}

/// Integral numbers render without a fractional part, so `1.0` keys like `1`.
fn canonical_number(n: &serde_json::Number) -> String {
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() < 9.0e15 => format!("{}", f as i64),
        _ => n.to_string(),
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<u64> for Id {
    fn from(n: u64) -> Self {
        Self(n.to_string())
    }
}

impl From<&str> for Id {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Id {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Id::from_json(&value)
            .ok_or_else(|| de::Error::custom(format!("expected a string or numeric id, got {value}")))
    }
}

/// The display field an embedded reference object carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelField {
    /// Categories: `{"id", "name"}`.
    Name,
    /// Users: `{"id", "username"}`.
    Username,
}

impl LabelField {
    pub fn key(self) -> &'static str {
        match self {
            LabelField::Name => "name",
            LabelField::Username => "username",
        }
    }

    fn other(self) -> Self {
        match self {
            LabelField::Name => LabelField::Username,
            LabelField::Username => LabelField::Name,
        }
    }
}

/// An article's reference to a category or author.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ForeignKey {
    /// Missing, `null`, `0`, `""` or `false`.
    #[default]
    Absent,
    Id(Id),
    /// An already-expanded object. Either half may be missing.
    Embedded { id: Option<Id>, label: Option<String> },
}

impl ForeignKey {
    pub fn from_json(value: &Value, field: LabelField) -> Self {
        match value {
            Value::Number(n) if n.as_f64() == Some(0.0) => ForeignKey::Absent,
            Value::Number(_) | Value::String(_) => match Id::from_json(value) {
                Some(id) => ForeignKey::Id(id),
                None => ForeignKey::Absent,
            },
            Value::Object(map) => {
                let label = map
                    .get(field.key())
                    .or_else(|| map.get(field.other().key()))
                    .and_then(Value::as_str)
                    .filter(|s| !s.is_empty())
                    .map(String::from);
                let id = map.get("id").and_then(Id::from_json);
                ForeignKey::Embedded { id, label }
            }
            Value::Null | Value::Bool(_) | Value::Array(_) => ForeignKey::Absent,
        }
    }

    /// The identifier behind this key, whichever shape it came in.
    pub fn id(&self) -> Option<&Id> {
        match self {
            ForeignKey::Absent => None,
            ForeignKey::Id(id) => Some(id),
            ForeignKey::Embedded { id, .. } => id.as_ref(),
        }
    }

    pub fn embedded_label(&self) -> Option<&str> {
        match self {
            ForeignKey::Embedded { label, .. } => label.as_deref(),
            _ => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, ForeignKey::Absent)
    }
}

impl From<Id> for ForeignKey {
    fn from(id: Id) -> Self {
        ForeignKey::Id(id)
    }
}

/// A directory article.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawArticle")]
pub struct Article {
    pub id: Id,
    pub title: String,
    pub content: String,
    /// URI of the stored image, if any.
    pub image: Option<String>,
    pub created_at: Option<DateTime<FixedOffset>>,
    pub category: ForeignKey,
    pub author: ForeignKey,
}

#[derive(Deserialize)]
struct RawArticle {
    id: Id,
    #[serde(default)]
    title: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    category: Value,
    #[serde(default)]
    author: Value,
}

impl From<RawArticle> for Article {
    fn from(raw: RawArticle) -> Self {
        let created_at = raw.created_at.as_deref().and_then(|ts| {
            DateTime::parse_from_rfc3339(ts)
                .map_err(|e| tracing::debug!(id = %raw.id, timestamp = ts, error = %e, "unparseable created_at"))
                .ok()
        });
        Self {
            created_at,
            image: raw.image.filter(|uri| !uri.is_empty()),
            category: ForeignKey::from_json(&raw.category, LabelField::Name),
            author: ForeignKey::from_json(&raw.author, LabelField::Username),
            id: raw.id,
            title: raw.title,
            content: raw.content,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Category {
    pub id: Id,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct User {
    pub id: Id,
    #[serde(default)]
    pub username: String,
}

/// One `id → label` row of a reference table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceEntry {
    pub id: Id,
    pub label: String,
}

impl ReferenceEntry {
    pub fn new(id: impl Into<Id>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

impl From<Category> for ReferenceEntry {
    fn from(c: Category) -> Self {
        Self {
            id: c.id,
            label: c.name,
        }
    }
}

impl From<User> for ReferenceEntry {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            label: u.username,
        }
    }
}

/// A freshly chosen image file, ready to be sent as a multipart part.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        Self {
            content_type: guess_content_type(&file_name).to_string(),
            file_name,
            bytes,
        }
    }

    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        Ok(Self::new(file_name, bytes))
    }
}

impl fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageUpload")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("bytes", &format_args!("<{} bytes>", self.bytes.len()))
            .finish()
    }
}

/// MIME type from a file extension.
pub fn guess_content_type(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numeric_and_string_ids_are_the_same_key() {
        let a: Id = serde_json::from_value(json!(7)).unwrap();
        let b: Id = serde_json::from_value(json!("7")).unwrap();
        assert_eq!(a, b);
        assert!(serde_json::from_value::<Id>(json!(null)).is_err());
    }

    #[test]
    fn integral_float_ids_match_integer_ids() {
        let float: Id = serde_json::from_value(json!(1.0)).unwrap();
        assert_eq!(float, Id::new("1"));
        assert_eq!(Id::from_json(&json!(-3)), Some(Id::new("-3")));
        assert_eq!(Id::from_json(&json!(2.5)), Some(Id::new("2.5")));
        assert_eq!(
            ForeignKey::from_json(&json!(4.0), LabelField::Name),
            ForeignKey::Id(Id::new("4"))
        );
    }

    #[test]
    fn falsy_keys_are_absent() {
        for raw in [json!(null), json!(0), json!(""), json!(false)] {
            assert_eq!(
                ForeignKey::from_json(&raw, LabelField::Name),
                ForeignKey::Absent,
                "{raw}"
            );
        }
    }

    #[test]
    fn embedded_object_keeps_id_and_label() {
        let key = ForeignKey::from_json(&json!({"id": 3, "name": "Tech"}), LabelField::Name);
        assert_eq!(key.id(), Some(&Id::new("3")));
        assert_eq!(key.embedded_label(), Some("Tech"));

        let author =
            ForeignKey::from_json(&json!({"id": 2, "username": "ada"}), LabelField::Username);
        assert_eq!(author.embedded_label(), Some("ada"));
    }

    #[test]
    fn embedded_object_with_blank_label_has_no_label() {
        let key = ForeignKey::from_json(&json!({"id": 3, "name": ""}), LabelField::Name);
        assert_eq!(key.embedded_label(), None);
        assert_eq!(key.id(), Some(&Id::new("3")));
    }

    #[test]
    fn article_ingests_both_key_shapes() {
        let flat: Article = serde_json::from_value(json!({
            "id": 1,
            "title": "Hello",
            "content": "Body",
            "image": "http://localhost/media/a.png",
            "created_at": "2024-03-01T10:00:00Z",
            "category": 1,
            "author": null
        }))
        .unwrap();
        assert_eq!(flat.category, ForeignKey::Id(Id::new("1")));
        assert!(flat.author.is_absent());
        assert!(flat.created_at.is_some());

        let expanded: Article = serde_json::from_value(json!({
            "id": "1",
            "title": "Hello",
            "content": "Body",
            "category": {"id": 1, "name": "Tech"},
            "author": {"id": 2, "username": "ada"}
        }))
        .unwrap();
        assert_eq!(expanded.id, flat.id);
        assert_eq!(expanded.category.embedded_label(), Some("Tech"));
        assert_eq!(expanded.image, None);
        assert_eq!(expanded.created_at, None);
    }

    #[test]
    fn bad_timestamp_does_not_reject_article() {
        let article: Article = serde_json::from_value(json!({
            "id": 4,
            "title": "T",
            "content": "C",
            "created_at": "yesterday"
        }))
        .unwrap();
        assert_eq!(article.created_at, None);
    }

    #[test]
    fn content_type_from_extension() {
        assert_eq!(guess_content_type("cover.JPG"), "image/jpeg");
        assert_eq!(guess_content_type("diagram.svg"), "image/svg+xml");
        assert_eq!(guess_content_type("README"), "application/octet-stream");
    }
}
