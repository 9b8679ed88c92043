//! Tag repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide tag-level persistence APIs on top of the `tags` table.
//! - Keep the owning-meal relation explicit in every mutation.
//!
//! # Invariants
//! - A tag row always references exactly one meal; `add_tag` requires the
//!   owning meal id up front.
//! - `remove_tag` only deletes when both the tag id and the owning meal id
//!   match, so a tag belonging to another meal is left untouched.
//! - `tags_for_meal` is sorted ascending by tag text.

use crate::model::meal::MealId;
use crate::model::tag::{TagId, TagModel};
use crate::repo::meal_repo::{parse_uuid, table_exists, RepoError, RepoResult};
use rusqlite::{params, Connection};
use uuid::Uuid;

/// Repository interface for tag operations.
pub trait TagRepository {
    /// Creates one tag row linked to the given meal. Returns the new id.
    fn add_tag(&self, meal_id: MealId, tag: &str) -> RepoResult<TagId>;
    /// Deletes the tag only when it belongs to the given meal.
    /// Returns whether a row was removed.
    fn remove_tag(&self, tag_id: TagId, meal_id: MealId) -> RepoResult<bool>;
    /// Lists one meal's tags sorted ascending by text.
    fn tags_for_meal(&self, meal_id: MealId) -> RepoResult<Vec<TagModel>>;
    /// Lists every tag row in the store.
    fn list_all_tags(&self) -> RepoResult<Vec<TagModel>>;
    /// Returns (text, occurrence count) pairs across all meals,
    /// count descending with text ascending as tiebreak.
    fn tag_counts(&self) -> RepoResult<Vec<(String, i64)>>;
}

/// SQLite-backed tag repository.
pub struct SqliteTagRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTagRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        if !table_exists(conn, "tags")? {
            return Err(RepoError::MissingRequiredTable("tags"));
        }
        Ok(Self { conn })
    }
}

impl TagRepository for SqliteTagRepository<'_> {
    fn add_tag(&self, meal_id: MealId, tag: &str) -> RepoResult<TagId> {
        let id = Uuid::new_v4();
        self.conn.execute(
            "INSERT INTO tags (uuid, meal_uuid, tag) VALUES (?1, ?2, ?3);",
            params![id.to_string(), meal_id.to_string(), tag],
        )?;
        Ok(id)
    }

    fn remove_tag(&self, tag_id: TagId, meal_id: MealId) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "DELETE FROM tags WHERE uuid = ?1 AND meal_uuid = ?2;",
            params![tag_id.to_string(), meal_id.to_string()],
        )?;
        Ok(changed > 0)
    }

    fn tags_for_meal(&self, meal_id: MealId) -> RepoResult<Vec<TagModel>> {
        let mut stmt = self.conn.prepare(
            "SELECT uuid, tag
             FROM tags
             WHERE meal_uuid = ?1
             ORDER BY tag ASC, uuid ASC;",
        )?;
        let mut rows = stmt.query([meal_id.to_string()])?;
        let mut tags = Vec::new();
        while let Some(row) = rows.next()? {
            tags.push(parse_tag_row(row.get::<_, String>(0)?, row.get(1)?)?);
        }
        Ok(tags)
    }

    fn list_all_tags(&self) -> RepoResult<Vec<TagModel>> {
        let mut stmt = self.conn.prepare(
            "SELECT uuid, tag
             FROM tags
             ORDER BY tag ASC, uuid ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut tags = Vec::new();
        while let Some(row) = rows.next()? {
            tags.push(parse_tag_row(row.get::<_, String>(0)?, row.get(1)?)?);
        }
        Ok(tags)
    }

    fn tag_counts(&self) -> RepoResult<Vec<(String, i64)>> {
        let mut stmt = self.conn.prepare(
            "SELECT tag, COUNT(*) AS uses
             FROM tags
             GROUP BY tag
             ORDER BY uses DESC, tag ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut counts = Vec::new();
        while let Some(row) = rows.next()? {
            counts.push((row.get(0)?, row.get(1)?));
        }
        Ok(counts)
    }
}

fn parse_tag_row(uuid_text: String, tag: String) -> RepoResult<TagModel> {
    let id = parse_uuid(&uuid_text, "tags.uuid")?;
    Ok(TagModel { id: Some(id), tag })
}
