//! Recipe draft edited by the new-recipe form

use chrono::{DateTime, Local};
use serde::Deserialize;
use serde_json::Value;
use std::fmt;

pub const MIN_PEOPLES: u8 = 1;
pub const MAX_PEOPLES: u8 = 99;
pub const DEFAULT_PEOPLES: u8 = 4;
pub const MAX_RATING: u8 = 10;

/// Timestamp format shown in the form
pub const DISPLAY_FORMAT: &str = "%d-%m-%Y %H:%M:%S";

/// An image attached to a recipe, kept in display order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageEntry {
    pub path: String,
    pub alt_text: Option<String>,
}

/// `path | alt text` as typed in the form
impl From<String> for ImageEntry {
    fn from(input: String) -> Self {
        match input.split_once('|') {
            Some((path, alt)) if !alt.trim().is_empty() => ImageEntry {
                path: path.trim().to_string(),
                alt_text: Some(alt.trim().to_string()),
            },
            Some((path, _)) => ImageEntry {
                path: path.trim().to_string(),
                alt_text: None,
            },
            None => ImageEntry {
                path: input.trim().to_string(),
                alt_text: None,
            },
        }
    }
}

impl fmt::Display for ImageEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.alt_text {
            Some(alt) => write!(f, "{} ({})", self.path, alt),
            None => write!(f, "{}", self.path),
        }
    }
}

/// Index an item lands on when dragged from `from` and dropped at `drop_row`
///
/// `drop_row` is the insertion point in the list as it looked before the
/// drag (`0..=len`). Removing the item first shifts every later row up by one.
pub fn drop_target(from: usize, drop_row: usize) -> usize {
    if drop_row > from {
        drop_row - 1
    } else {
        drop_row
    }
}

/// Move `items[from]` to the drop position, returning its new index
pub fn move_item<T>(items: &mut Vec<T>, from: usize, drop_row: usize) -> Option<usize> {
    if from >= items.len() || drop_row > items.len() {
        return None;
    }
    let to = drop_target(from, drop_row);
    if to != from {
        let item = items.remove(from);
        items.insert(to, item);
    }
    Some(to)
}

/// Everything the form collects before it is written to the database
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeDraft {
    pub name: String,
    pub rating: Option<u8>,
    pub description: String,
    pub nb_peoples: u8,
    pub ingredients: Vec<String>,
    pub steps: Vec<String>,
    pub images: Vec<ImageEntry>,
    pub created_at: DateTime<Local>,
    pub updated_at: DateTime<Local>,
}

impl Default for RecipeDraft {
    fn default() -> Self {
        Self::new()
    }
}

impl RecipeDraft {
    pub fn new() -> Self {
        let now = Local::now();
        Self {
            name: String::new(),
            rating: None,
            description: String::new(),
            nb_peoples: DEFAULT_PEOPLES,
            ingredients: Vec::new(),
            steps: Vec::new(),
            images: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Cycle the rating: unset, 0, 1, ... 10, unset
    pub fn next_rating(&mut self) {
        self.rating = match self.rating {
            None => Some(0),
            Some(r) if r >= MAX_RATING => None,
            Some(r) => Some(r + 1),
        };
    }

    pub fn prev_rating(&mut self) {
        self.rating = match self.rating {
            None => Some(MAX_RATING),
            Some(0) => None,
            Some(r) => Some(r - 1),
        };
    }

    pub fn increment_peoples(&mut self) {
        self.nb_peoples = (self.nb_peoples + 1).min(MAX_PEOPLES);
    }

    pub fn decrement_peoples(&mut self) {
        self.nb_peoples = self.nb_peoples.saturating_sub(1).max(MIN_PEOPLES);
    }

    /// Check the draft can be inserted
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Recipe name is required".to_string());
        }
        if !(MIN_PEOPLES..=MAX_PEOPLES).contains(&self.nb_peoples) {
            return Err(format!(
                "Number of peoples must be between {} and {}",
                MIN_PEOPLES, MAX_PEOPLES
            ));
        }
        Ok(())
    }

    /// Merge an imported recipe file into the draft
    ///
    /// Ingredients and steps are appended; the number of peoples is only
    /// replaced when the file carries a value in range.
    pub fn apply_import(&mut self, import: RecipeImport) {
        if let Some(n) = import.nb_peoples {
            self.nb_peoples = n;
        }
        self.ingredients.extend(import.ingredients);
        self.steps.extend(import.steps);
    }
}

/// Recipe fields read from a JSON file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeImport {
    pub nb_peoples: Option<u8>,
    pub ingredients: Vec<String>,
    pub steps: Vec<String>,
}

#[derive(Deserialize)]
struct RawRecipe {
    #[serde(default)]
    nb_peoples: Option<Value>,
    #[serde(default)]
    ingredients: Option<Value>,
    #[serde(default)]
    steps: Option<Value>,
}

fn string_list(value: Option<Value>) -> Vec<String> {
    match value {
        Some(Value::Array(elements)) => elements
            .into_iter()
            .map(|el| match el {
                Value::String(s) => s,
                other => other.to_string(),
            })
            .collect(),
        _ => Vec::new(),
    }
}

impl RecipeImport {
    /// Parse recipe JSON; unknown keys and wrongly typed fields are ignored
    pub fn from_json_str(contents: &str) -> anyhow::Result<Self> {
        let contents = contents.trim_start_matches('\u{feff}');
        let raw: RawRecipe = serde_json::from_str(contents)?;

        let nb_peoples = raw
            .nb_peoples
            .as_ref()
            .and_then(Value::as_i64)
            .filter(|n| (MIN_PEOPLES as i64..=MAX_PEOPLES as i64).contains(n))
            .map(|n| n as u8);

        Ok(Self {
            nb_peoples,
            ingredients: string_list(raw.ingredients),
            steps: string_list(raw.steps),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drop_below_accounts_for_removal() {
        let mut items = vec!["a", "b", "c", "d"];
        // Drag "a" and drop between "c" and "d"
        assert_eq!(move_item(&mut items, 0, 3), Some(2));
        assert_eq!(items, vec!["b", "c", "a", "d"]);
    }

    #[test]
    fn test_drop_above() {
        let mut items = vec!["a", "b", "c", "d"];
        assert_eq!(move_item(&mut items, 3, 0), Some(0));
        assert_eq!(items, vec!["d", "a", "b", "c"]);
    }

    #[test]
    fn test_drop_at_end_and_on_itself() {
        let mut items = vec!["a", "b", "c"];
        assert_eq!(move_item(&mut items, 1, 3), Some(2));
        assert_eq!(items, vec!["a", "c", "b"]);

        // Dropping right before or right after itself does nothing
        assert_eq!(move_item(&mut items, 1, 1), Some(1));
        assert_eq!(move_item(&mut items, 1, 2), Some(1));
        assert_eq!(items, vec!["a", "c", "b"]);
    }

    #[test]
    fn test_drop_out_of_range() {
        let mut items = vec!["a"];
        assert_eq!(move_item(&mut items, 1, 0), None);
        assert_eq!(move_item(&mut items, 0, 2), None);
    }

    #[test]
    fn test_import_appends_and_sets_peoples() {
        let mut draft = RecipeDraft::new();
        draft.ingredients.push("salt".to_string());

        let import = RecipeImport::from_json_str(
            r#"{"nb_peoples": 6, "ingredients": ["flour", 2], "steps": ["mix"], "author": "me"}"#,
        )
        .unwrap();
        draft.apply_import(import);

        assert_eq!(draft.nb_peoples, 6);
        assert_eq!(draft.ingredients, vec!["salt", "flour", "2"]);
        assert_eq!(draft.steps, vec!["mix"]);
    }

    #[test]
    fn test_import_ignores_out_of_range_peoples() {
        for json in [
            r#"{"nb_peoples": 0}"#,
            r#"{"nb_peoples": 100}"#,
            r#"{"nb_peoples": "4"}"#,
            r#"{"nb_peoples": 2.5}"#,
        ] {
            let import = RecipeImport::from_json_str(json).unwrap();
            assert_eq!(import.nb_peoples, None, "{}", json);
        }
    }

    #[test]
    fn test_import_accepts_bom_and_bad_lists() {
        let import =
            RecipeImport::from_json_str("\u{feff}{\"ingredients\": \"not a list\"}").unwrap();
        assert!(import.ingredients.is_empty());
        assert!(import.steps.is_empty());
    }

    #[test]
    fn test_rating_cycle() {
        let mut draft = RecipeDraft::new();
        draft.prev_rating();
        assert_eq!(draft.rating, Some(10));
        draft.next_rating();
        assert_eq!(draft.rating, None);
        draft.next_rating();
        assert_eq!(draft.rating, Some(0));
    }

    #[test]
    fn test_peoples_bounds() {
        let mut draft = RecipeDraft::new();
        draft.nb_peoples = MAX_PEOPLES;
        draft.increment_peoples();
        assert_eq!(draft.nb_peoples, MAX_PEOPLES);
        draft.nb_peoples = MIN_PEOPLES;
        draft.decrement_peoples();
        assert_eq!(draft.nb_peoples, MIN_PEOPLES);
    }

    #[test]
    fn test_validate_requires_name() {
        let mut draft = RecipeDraft::new();
        assert!(draft.validate().is_err());
        draft.name = "Tarte".to_string();
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn test_image_entry_from_input() {
        let image = ImageEntry::from("img/a.jpg | Top view".to_string());
        assert_eq!(image.path, "img/a.jpg");
        assert_eq!(image.alt_text.as_deref(), Some("Top view"));
        let image = ImageEntry::from("img/b.jpg".to_string());
        assert!(image.alt_text.is_none());
    }
}
