use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::entities::{
    document::{Collection, ContentKind},
    validation::validate_not_blank,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolCategory {
    #[default]
    Web,
    Games,
    Design,
    Other,
    Mobile,
}

impl ToolCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolCategory::Web => "web",
            ToolCategory::Games => "games",
            ToolCategory::Design => "design",
            ToolCategory::Other => "other",
            ToolCategory::Mobile => "mobile",
        }
    }
}

/// Name, proficiency level and category. Tools, skills and techs all use it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolFields {
    pub name: String,
    pub level: u8,
    pub category: ToolCategory,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct ToolDraft {
    #[validate(length(min = 1, max = 80), custom(function = "validate_not_blank"))]
    pub name: String,

    #[validate(range(min = 0, max = 100, message = "Level must be between 0 and 100"))]
    pub level: i32,

    pub category: ToolCategory,
}

macro_rules! tool_kind {
    ($name:ident, $collection:expr) => {
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub ToolFields);

        impl ContentKind for $name {
            type Draft = ToolDraft;

            const COLLECTION: Collection = $collection;

            fn from_draft(draft: ToolDraft) -> Self {
                $name(ToolFields {
                    name: draft.name.trim().to_string(),
                    // validated to 0..=100 before we get here
                    level: draft.level.clamp(0, 100) as u8,
                    category: draft.category,
                })
            }

            fn to_draft(&self) -> ToolDraft {
                ToolDraft {
                    name: self.0.name.clone(),
                    level: i32::from(self.0.level),
                    category: self.0.category,
                }
            }

            fn category(&self) -> Option<&str> {
                Some(self.0.category.as_str())
            }
        }
    };
}

tool_kind!(Tool, Collection::Tools);
tool_kind!(Skill, Collection::Skills);
tool_kind!(Tech, Collection::Techs);
