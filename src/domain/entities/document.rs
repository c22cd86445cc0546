use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;
use validator::Validate;

use crate::errors::AppError;

// ───── Collections ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Websites,
    Games,
    Experiences,
    Tools,
    Skills,
    Techs,
    Photos,
}

impl Collection {
    pub const ALL: [Collection; 7] = [
        Collection::Websites,
        Collection::Games,
        Collection::Experiences,
        Collection::Tools,
        Collection::Skills,
        Collection::Techs,
        Collection::Photos,
    ];

    /// Collections shown on the admin dashboard.
    pub const DASHBOARD: [Collection; 5] = [
        Collection::Websites,
        Collection::Games,
        Collection::Experiences,
        Collection::Tools,
        Collection::Photos,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Websites => "websites",
            Collection::Games => "games",
            Collection::Experiences => "experiences",
            Collection::Tools => "tools",
            Collection::Skills => "skills",
            Collection::Techs => "techs",
            Collection::Photos => "photos",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Collection {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Collection::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| AppError::NotFound(format!("Unknown collection '{}'", s)))
    }
}

// ───── Stored (untyped) documents ────────────────────────────────────

/// A document as the store sees it: an id, timestamps and a bag of fields.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: Uuid,
    pub collection: Collection,
    pub data: Map<String, Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl StoredDocument {
    /// Reads a string field, treating absent and non-string values alike.
    pub fn str_field(&self, field: &str) -> Option<&str> {
        self.data.get(field).and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListOrder {
    /// Whatever order the backing store returns.
    #[default]
    Natural,
    CreatedDesc,
}

// ───── Typed documents ───────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document<K> {
    pub id: Uuid,
    #[serde(flatten)]
    pub data: K,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(
        default,
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<Utc>>,
}

impl<K: ContentKind> TryFrom<StoredDocument> for Document<K> {
    type Error = serde_json::Error;

    fn try_from(doc: StoredDocument) -> Result<Self, Self::Error> {
        let data = serde_json::from_value(Value::Object(doc.data))?;
        Ok(Document {
            id: doc.id,
            data,
            created_at: doc.created_at,
            updated_at: doc.updated_at,
        })
    }
}

/// Binds an entity type to its collection and its editable form.
pub trait ContentKind:
    Serialize + DeserializeOwned + Clone + PartialEq + fmt::Debug + Send + Sync + 'static
{
    type Draft: DeserializeOwned + Serialize + Validate + Default + Clone + fmt::Debug + Send + Sync + 'static;

    const COLLECTION: Collection;

    /// Whether documents of this kind carry an uploaded `image`.
    const ACCEPTS_UPLOADS: bool = false;

    /// Normalises a validated draft into the stored record.
    fn from_draft(draft: Self::Draft) -> Self;

    /// Loads an existing record back into an editable draft.
    fn to_draft(&self) -> Self::Draft;

    fn image_url(&self) -> Option<&str> {
        None
    }

    fn category(&self) -> Option<&str> {
        None
    }

    /// Replaces the image URL on a draft. No-op for kinds without images.
    fn set_draft_image(_draft: &mut Self::Draft, _url: String) {}

    fn to_fields(&self) -> Result<Map<String, Value>, AppError> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            other => Err(AppError::InternalError(format!(
                "{} record did not encode as an object: {}",
                Self::COLLECTION, other
            ))),
        }
    }
}
