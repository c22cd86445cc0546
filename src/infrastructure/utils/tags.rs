use serde::{Deserialize, Serialize};

/// Tags as they arrive from a form: either the raw comma separated text
/// field or an already split list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagsInput {
    Text(String),
    List(Vec<String>),
}

impl Default for TagsInput {
    fn default() -> Self {
        TagsInput::List(Vec::new())
    }
}

impl From<&str> for TagsInput {
    fn from(text: &str) -> Self {
        TagsInput::Text(text.to_string())
    }
}

impl From<Vec<String>> for TagsInput {
    fn from(tags: Vec<String>) -> Self {
        TagsInput::List(tags)
    }
}

/// Splits on commas, trims every entry and drops empty ones.
///
/// There is no escaping, so a tag containing a comma cannot be expressed in
/// the text form. Lists are trimmed and filtered but never split again.
pub fn split_tags(input: TagsInput) -> Vec<String> {
    match input {
        TagsInput::Text(text) => clean(text.split(',')),
        TagsInput::List(tags) => clean(tags.iter().map(String::as_str)),
    }
}

fn clean<'a>(parts: impl Iterator<Item = &'a str>) -> Vec<String> {
    parts
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_and_trims_text() {
        assert_eq!(split_tags("a, b ,c".into()), vec!["a", "b", "c"]);
    }

    #[test]
    fn drops_empty_entries() {
        assert_eq!(split_tags(" , react,, ,rust ,".into()), vec!["react", "rust"]);
        assert!(split_tags("".into()).is_empty());
    }

    #[test]
    fn already_split_list_is_unchanged() {
        let tags = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        assert_eq!(split_tags(tags.clone().into()), tags);
    }

    #[test]
    fn splitting_is_idempotent() {
        let once = split_tags("unity,  c# , game jam".into());
        let twice = split_tags(once.clone().into());
        assert_eq!(once, twice);
    }
}
