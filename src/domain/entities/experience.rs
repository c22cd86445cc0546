use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::entities::{
    document::{Collection, ContentKind},
    validation::{validate_not_blank, validate_year},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    #[default]
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Experience {
    pub role: String,
    pub company: String,
    pub start_year: String,
    pub end_year: Option<String>,
    #[serde(default)]
    pub is_present: bool,
    /// Display string computed when the document is written.
    pub period: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub details: String,
    #[serde(default)]
    pub align: Align,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct ExperienceDraft {
    #[validate(length(min = 1, max = 120), custom(function = "validate_not_blank"))]
    pub role: String,

    #[validate(length(min = 1, max = 120), custom(function = "validate_not_blank"))]
    pub company: String,

    #[validate(custom(function = "validate_year"))]
    pub start_year: String,

    #[validate(custom(function = "validate_year"))]
    pub end_year: Option<String>,

    pub is_present: bool,

    #[validate(length(max = 2000))]
    pub description: String,

    #[validate(length(max = 5000))]
    pub details: String,

    pub align: Align,
}

/// `"2021 - Present"`, `"2019 - 2021"` or just `"2019"`.
pub fn derive_period(start_year: &str, end_year: Option<&str>, is_present: bool) -> String {
    let start = start_year.trim();
    if is_present {
        return format!("{} - Present", start);
    }
    match end_year.map(str::trim).filter(|end| !end.is_empty()) {
        Some(end) => format!("{} - {}", start, end),
        None => start.to_string(),
    }
}

impl ContentKind for Experience {
    type Draft = ExperienceDraft;

    const COLLECTION: Collection = Collection::Experiences;

    fn from_draft(draft: ExperienceDraft) -> Self {
        let end_year = if draft.is_present {
            None
        } else {
            draft.end_year
                .map(|end| end.trim().to_string())
                .filter(|end| !end.is_empty())
        };
        let period = derive_period(&draft.start_year, end_year.as_deref(), draft.is_present);

        Experience {
            role: draft.role.trim().to_string(),
            company: draft.company.trim().to_string(),
            start_year: draft.start_year.trim().to_string(),
            end_year,
            is_present: draft.is_present,
            period,
            description: draft.description,
            details: draft.details,
            align: draft.align,
        }
    }

    fn to_draft(&self) -> ExperienceDraft {
        ExperienceDraft {
            role: self.role.clone(),
            company: self.company.clone(),
            start_year: self.start_year.clone(),
            end_year: self.end_year.clone(),
            is_present: self.is_present,
            description: self.description.clone(),
            details: self.details.clone(),
            align: self.align,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn present_role_ignores_end_year() {
        let draft = ExperienceDraft {
            role: "Engineer".into(),
            company: "Studio".into(),
            start_year: "2021".into(),
            end_year: Some("2023".into()),
            is_present: true,
            ..Default::default()
        };
        let exp = Experience::from_draft(draft);
        assert_eq!(exp.period, "2021 - Present");
        assert_eq!(exp.end_year, None);
    }

    #[test]
    fn closed_role_uses_end_year() {
        assert_eq!(derive_period("2019", Some("2021"), false), "2019 - 2021");
    }

    #[test]
    fn missing_end_year_keeps_start_only() {
        assert_eq!(derive_period("2019", Some("  "), false), "2019");
        assert_eq!(derive_period("2019", None, false), "2019");
    }
}
