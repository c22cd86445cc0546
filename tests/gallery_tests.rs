use chrono::Utc;
use portfolio_content::{
    entities::{
        document::Document,
        tool::{Tool, ToolCategory, ToolFields},
    },
    gallery::{filter_by_category, tile_class, with_tiles, CategoryFilter, TILE_PERIOD},
};
use uuid::Uuid;

fn tool(name: &str, category: ToolCategory) -> Document<Tool> {
    Document {
        id: Uuid::new_v4(),
        data: Tool(ToolFields { name: name.into(), level: 50, category }),
        created_at: Utc::now(),
        updated_at: None,
    }
}

fn names(items: &[Document<Tool>]) -> Vec<&str> {
    items.iter().map(|doc| doc.data.0.name.as_str()).collect()
}

fn mixed() -> Vec<Document<Tool>> {
    vec![
        tool("React", ToolCategory::Web),
        tool("Unity", ToolCategory::Games),
        tool("Vue", ToolCategory::Web),
        tool("Figma", ToolCategory::Design),
    ]
}

#[test]
fn websites_label_keeps_web_items_in_order() {
    let filtered = filter_by_category(mixed(), &CategoryFilter::from_label("Websites"));
    assert_eq!(names(&filtered), vec!["React", "Vue"]);
}

#[test]
fn all_label_is_identity() {
    let items = mixed();
    let filtered = filter_by_category(items.clone(), &CategoryFilter::from_label("All"));
    assert_eq!(filtered, items);
    assert_eq!(CategoryFilter::from_label("  "), CategoryFilter::All);
}

#[test]
fn unknown_label_matches_nothing() {
    let filtered = filter_by_category(mixed(), &CategoryFilter::from_label("Podcasts"));
    assert!(filtered.is_empty());
}

#[test]
fn label_aliases_map_to_stored_tags() {
    assert_eq!(CategoryFilter::from_label("Game Dev"), CategoryFilter::Category("games".into()));
    assert_eq!(CategoryFilter::from_label("Design"), CategoryFilter::Category("design".into()));
}

#[test]
fn tiles_repeat_with_fixed_period() {
    for index in 0..TILE_PERIOD * 3 {
        assert_eq!(tile_class(index), tile_class(index + TILE_PERIOD));
    }
    assert_eq!(TILE_PERIOD, 20);
}

#[test]
fn tiles_depend_only_on_position() {
    let first = with_tiles(mixed());
    let second = with_tiles(mixed());

    assert_eq!(first.len(), 4);
    for (a, b) in first.iter().zip(&second) {
        assert_eq!(a.tile, b.tile);
    }
    assert_eq!(first[0].tile, tile_class(0));
}
