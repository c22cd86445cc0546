use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    entities::{
        document::{Collection, ContentKind},
        validation::{validate_not_blank, validate_optional_url},
    },
    utils::tags::{split_tags, TagsInput},
};

const MAX_TITLE_LENGTH: u64 = 120;
const MAX_DESCRIPTION_LENGTH: u64 = 2000;

pub const WEB_CATEGORY: &str = "web";
pub const GAMES_CATEGORY: &str = "games";

/// Shared shape of website and game projects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectFields {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub category: String,
    #[serde(default)]
    pub featured: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectDraft {
    #[validate(
        length(min = 1, max = MAX_TITLE_LENGTH),
        custom(function = "validate_not_blank")
    )]
    pub title: String,

    #[validate(length(min = 1, max = MAX_DESCRIPTION_LENGTH))]
    pub description: String,

    #[validate(custom(function = "validate_optional_url"))]
    pub image: String,

    #[validate(custom(function = "validate_optional_url"))]
    pub link: String,

    pub tags: TagsInput,

    pub featured: bool,
}

impl ProjectFields {
    fn from_draft(draft: ProjectDraft, category: &str) -> Self {
        ProjectFields {
            title: draft.title.trim().to_string(),
            description: draft.description,
            image: draft.image.trim().to_string(),
            link: draft.link.trim().to_string(),
            tags: split_tags(draft.tags),
            category: category.to_string(),
            featured: draft.featured,
        }
    }

    fn to_draft(&self) -> ProjectDraft {
        ProjectDraft {
            title: self.title.clone(),
            description: self.description.clone(),
            image: self.image.clone(),
            link: self.link.clone(),
            tags: TagsInput::List(self.tags.clone()),
            featured: self.featured,
        }
    }
}

macro_rules! project_kind {
    ($name:ident, $collection:expr, $category:expr) => {
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub ProjectFields);

        impl ContentKind for $name {
            type Draft = ProjectDraft;

            const COLLECTION: Collection = $collection;
            const ACCEPTS_UPLOADS: bool = true;

            fn from_draft(draft: ProjectDraft) -> Self {
                $name(ProjectFields::from_draft(draft, $category))
            }

            fn to_draft(&self) -> ProjectDraft {
                self.0.to_draft()
            }

            fn image_url(&self) -> Option<&str> {
                Some(self.0.image.as_str()).filter(|url| !url.is_empty())
            }

            fn category(&self) -> Option<&str> {
                Some(&self.0.category)
            }

            fn set_draft_image(draft: &mut ProjectDraft, url: String) {
                draft.image = url;
            }
        }
    };
}

project_kind!(WebsiteProject, Collection::Websites, WEB_CATEGORY);
project_kind!(GameProject, Collection::Games, GAMES_CATEGORY);
