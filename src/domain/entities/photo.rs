use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    entities::{
        document::{Collection, ContentKind},
        validation::{validate_not_blank, validate_optional_url},
    },
    utils::tags::{split_tags, TagsInput},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhotoCategory {
    Landscape,
    Wildlife,
    Urban,
    Portrait,
    #[default]
    Other,
}

impl PhotoCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            PhotoCategory::Landscape => "landscape",
            PhotoCategory::Wildlife => "wildlife",
            PhotoCategory::Urban => "urban",
            PhotoCategory::Portrait => "portrait",
            PhotoCategory::Other => "other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
    pub category: PhotoCategory,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub featured: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct PhotoDraft {
    #[validate(length(min = 1, max = 120), custom(function = "validate_not_blank"))]
    pub title: String,

    #[validate(length(max = 2000))]
    pub description: String,

    #[validate(custom(function = "validate_optional_url"))]
    pub image: String,

    pub category: PhotoCategory,

    pub tags: TagsInput,

    pub featured: bool,
}

impl ContentKind for Photo {
    type Draft = PhotoDraft;

    const COLLECTION: Collection = Collection::Photos;
    const ACCEPTS_UPLOADS: bool = true;

    fn from_draft(draft: PhotoDraft) -> Self {
        Photo {
            title: draft.title.trim().to_string(),
            description: draft.description,
            image: draft.image.trim().to_string(),
            category: draft.category,
            tags: split_tags(draft.tags),
            featured: draft.featured,
        }
    }

    fn to_draft(&self) -> PhotoDraft {
        PhotoDraft {
            title: self.title.clone(),
            description: self.description.clone(),
            image: self.image.clone(),
            category: self.category,
            tags: TagsInput::List(self.tags.clone()),
            featured: self.featured,
        }
    }

    fn image_url(&self) -> Option<&str> {
        Some(self.image.as_str()).filter(|url| !url.is_empty())
    }

    fn category(&self) -> Option<&str> {
        Some(self.category.as_str())
    }

    fn set_draft_image(draft: &mut PhotoDraft, url: String) {
        draft.image = url;
    }
}
