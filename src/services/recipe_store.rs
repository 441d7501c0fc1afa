//! Recipe persistence
//!
//! Creates the recipe schema on demand and writes a draft with its tags,
//! ingredients, steps and images in one transaction.

use super::database::Database;
use crate::model::item::ItemValue;
use crate::model::query::CellValue;
use crate::model::recipe::{RecipeDraft, DISPLAY_FORMAT};
use anyhow::{Context, Result};
use rusqlite::{params, OptionalExtension};
use tracing::info;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS category (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE
);
CREATE TABLE IF NOT EXISTS tag (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    category_id INTEGER REFERENCES category(id)
);
CREATE TABLE IF NOT EXISTS recipe (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    description TEXT,
    url TEXT,
    rating INTEGER,
    nb_peoples INTEGER,
    created_at TEXT,
    updated_at TEXT
);
CREATE TABLE IF NOT EXISTS recipeTag (
    recipe_id INTEGER REFERENCES recipe(id),
    tag_id INTEGER REFERENCES tag(id),
    PRIMARY KEY (recipe_id, tag_id)
);
CREATE TABLE IF NOT EXISTS ingredient (
    id INTEGER PRIMARY KEY,
    recipe_id INTEGER REFERENCES recipe(id),
    position INTEGER,
    text TEXT
);
CREATE TABLE IF NOT EXISTS step (
    id INTEGER PRIMARY KEY,
    recipe_id INTEGER REFERENCES recipe(id),
    position INTEGER,
    text TEXT
);
CREATE TABLE IF NOT EXISTS image (
    id INTEGER PRIMARY KEY,
    recipe_id INTEGER REFERENCES recipe(id),
    url TEXT,
    alt_text TEXT,
    position INTEGER
);
";

pub fn ensure_schema(db: &Database) -> Result<()> {
    db.connection()
        .execute_batch(SCHEMA)
        .context("Failed to create recipe tables")
}

/// Insert a validated draft and return the new recipe id
///
/// `tags` are the values selected in the tag combo. Text values are looked
/// up by tag name; integers are used as tag ids directly.
pub fn insert_recipe(db: &Database, draft: &RecipeDraft, tags: &[ItemValue]) -> Result<i64> {
    draft
        .validate()
        .map_err(|message| anyhow::anyhow!(message))?;
    ensure_schema(db)?;

    let conn = db.connection();
    let tx = conn.unchecked_transaction()?;

    tx.execute(
        "INSERT INTO recipe (name, description, rating, nb_peoples, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            draft.name.trim(),
            draft.description,
            draft.rating,
            draft.nb_peoples,
            draft.created_at.format(DISPLAY_FORMAT).to_string(),
            draft.updated_at.format(DISPLAY_FORMAT).to_string(),
        ],
    )
    .context("Error inserting data into recipe")?;
    let recipe_id = tx.last_insert_rowid();

    for tag in tags {
        let tag_id: Option<i64> = match tag {
            ItemValue::Integer(id) => Some(*id),
            ItemValue::Text(name) => tx
                .query_row("SELECT id FROM tag WHERE name = ?1", [name], |row| row.get(0))
                .optional()
                .context("Error looking up tag")?,
        };
        let Some(tag_id) = tag_id else {
            anyhow::bail!("Unknown tag: {}", tag);
        };
        tx.execute(
            "INSERT OR IGNORE INTO recipeTag (recipe_id, tag_id) VALUES (?1, ?2)",
            params![recipe_id, tag_id],
        )
        .context("Error inserting data into recipeTag")?;
    }

    for (position, text) in draft.ingredients.iter().enumerate() {
        tx.execute(
            "INSERT INTO ingredient (recipe_id, position, text) VALUES (?1, ?2, ?3)",
            params![recipe_id, position as i64, text],
        )
        .context("Error inserting data into ingredient")?;
    }

    for (position, text) in draft.steps.iter().enumerate() {
        tx.execute(
            "INSERT INTO step (recipe_id, position, text) VALUES (?1, ?2, ?3)",
            params![recipe_id, position as i64, text],
        )
        .context("Error inserting data into step")?;
    }

    for (position, image) in draft.images.iter().enumerate() {
        tx.execute(
            "INSERT INTO image (recipe_id, url, alt_text, position) VALUES (?1, ?2, ?3, ?4)",
            params![recipe_id, image.path, image.alt_text, position as i64],
        )
        .context("Error inserting data into image")?;
    }

    tx.commit()?;
    info!(recipe_id, name = %draft.name.trim(), "saved recipe");
    Ok(recipe_id)
}

/// Rows of the configured tag query, one combo item each
pub fn load_tag_items(db: &Database, query: &str) -> Result<Vec<Vec<CellValue>>> {
    let result = db.query(query, []).context("Failed to load tags")?;
    Ok(result.rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::recipe::ImageEntry;

    const TAG_QUERY: &str = "SELECT t.name, t.id, c.name FROM tag t \
                             LEFT JOIN category c ON t.category_id = c.id \
                             ORDER BY c.name, t.name";

    fn seeded_db() -> Database {
        let db = Database::open_in_memory().unwrap();
        ensure_schema(&db).unwrap();
        db.connection()
            .execute_batch(
                "INSERT INTO category (name) VALUES ('Diet');
                 INSERT INTO tag (name, category_id) VALUES ('Vegan', 1), ('Quick', NULL);",
            )
            .unwrap();
        db
    }

    fn count(db: &Database, table: &str) -> i64 {
        db.connection()
            .query_row(&format!("SELECT count(*) FROM {}", table), [], |r| r.get(0))
            .unwrap()
    }

    #[test]
    fn test_ensure_schema_is_idempotent() {
        let db = seeded_db();
        ensure_schema(&db).unwrap();
        assert_eq!(count(&db, "tag"), 2);
    }

    #[test]
    fn test_insert_recipe_writes_children() {
        let db = seeded_db();
        let mut draft = RecipeDraft::new();
        draft.name = "  Ratatouille ".to_string();
        draft.rating = Some(8);
        draft.ingredients = vec!["Zucchini".to_string(), "Tomato".to_string()];
        draft.steps = vec!["Chop".to_string()];
        draft.images = vec![ImageEntry::from("pan.jpg | In the pan".to_string())];

        let id = insert_recipe(
            &db,
            &draft,
            &[ItemValue::Integer(1), ItemValue::Text("Quick".to_string())],
        )
        .unwrap();

        let name: String = db
            .connection()
            .query_row("SELECT name FROM recipe WHERE id = ?1", [id], |r| r.get(0))
            .unwrap();
        assert_eq!(name, "Ratatouille");
        assert_eq!(count(&db, "recipeTag"), 2);
        assert_eq!(count(&db, "ingredient"), 2);
        assert_eq!(count(&db, "step"), 1);

        let alt: Option<String> = db
            .connection()
            .query_row("SELECT alt_text FROM image", [], |r| r.get(0))
            .unwrap();
        assert_eq!(alt.as_deref(), Some("In the pan"));
    }

    #[test]
    fn test_insert_recipe_rejects_empty_name() {
        let db = seeded_db();
        assert!(insert_recipe(&db, &RecipeDraft::new(), &[]).is_err());
        assert_eq!(count(&db, "recipe"), 0);
    }

    #[test]
    fn test_unknown_tag_rolls_back() {
        let db = seeded_db();
        let mut draft = RecipeDraft::new();
        draft.name = "Soup".to_string();
        draft.ingredients = vec!["Water".to_string()];

        let err = insert_recipe(&db, &draft, &[ItemValue::Text("Nope".to_string())]).unwrap_err();
        assert!(err.to_string().contains("Unknown tag"));
        assert_eq!(count(&db, "recipe"), 0);
        assert_eq!(count(&db, "ingredient"), 0);
    }

    #[test]
    fn test_tag_lookup_error_is_not_unknown_tag() {
        let db = Database::open_in_memory().unwrap();
        db.connection()
            .execute_batch("CREATE TABLE tag (tag_id INTEGER PRIMARY KEY, name TEXT);")
            .unwrap();
        let mut draft = RecipeDraft::new();
        draft.name = "Soup".to_string();

        let err = insert_recipe(&db, &draft, &[ItemValue::Text("Quick".to_string())]).unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.contains("no such column"), "{}", message);
        assert!(!message.contains("Unknown tag"));
        assert_eq!(count(&db, "recipe"), 0);
    }

    #[test]
    fn test_load_tag_items() {
        let db = seeded_db();
        let rows = load_tag_items(&db, TAG_QUERY).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0],
            vec![
                CellValue::Text("Quick".to_string()),
                CellValue::Integer(2),
                CellValue::Null
            ]
        );
    }

    #[test]
    fn test_load_tag_items_without_tag_table() {
        let db = Database::open_in_memory().unwrap();
        let err = load_tag_items(&db, TAG_QUERY).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to load tags"));
    }
}
