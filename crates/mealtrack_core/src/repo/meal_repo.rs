//! Meal repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide stable CRUD and query APIs over `meals` storage.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - `create_meal` and `update_meal` write the meal row and its tag rows in
//!   a single transaction.
//! - Read paths reject invalid persisted state (bad uuid text, unknown mood
//!   codes) instead of masking it.
//! - Deleting a meal cascades to its tag rows via the schema foreign key.

use crate::db::DbError;
use crate::model::meal::{MealId, MealModel, Mood};
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const MEAL_SELECT_SQL: &str = "SELECT
    uuid,
    name,
    date,
    picture,
    mood,
    mood_after
FROM meals";

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for meal/tag persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    NotFound(Uuid),
    InvalidData(String),
    MissingRequiredTable(&'static str),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "record not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted meal data: {message}"),
            Self::MissingRequiredTable(table) => {
                write!(f, "required table `{table}` is missing; run migrations first")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for meal CRUD and query operations.
pub trait MealRepository {
    /// Creates one meal row plus one tag row per tag text, atomically.
    /// Returns the freshly generated stable id.
    fn create_meal(&mut self, meal: &MealModel) -> RepoResult<MealId>;
    /// Overwrites all scalar fields and replaces the full tag set, atomically.
    fn update_meal(&mut self, id: MealId, meal: &MealModel) -> RepoResult<()>;
    /// Gets one meal by id, tags projection included.
    fn get_meal(&self, id: MealId) -> RepoResult<Option<MealModel>>;
    /// Lists all meals ordered by date descending.
    fn list_meals(&self) -> RepoResult<Vec<MealModel>>;
    /// Returns the single most-recently-dated meal, if any.
    fn most_recent_meal(&self) -> RepoResult<Option<MealModel>>;
    /// Lists meals with both moods recorded, ordered by date ascending.
    fn list_meals_with_moods(&self) -> RepoResult<Vec<MealModel>>;
    /// Deletes one meal; the schema cascades the delete to its tags.
    fn delete_meal(&self, id: MealId) -> RepoResult<()>;
    /// Returns whether a meal row with this id exists.
    fn meal_exists(&self, id: MealId) -> RepoResult<bool>;
}

/// SQLite-backed meal repository.
pub struct SqliteMealRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteMealRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        for table in ["meals", "tags"] {
            if !table_exists(conn, table)? {
                return Err(RepoError::MissingRequiredTable(table));
            }
        }
        Ok(Self { conn })
    }
}

impl MealRepository for SqliteMealRepository<'_> {
    fn create_meal(&mut self, meal: &MealModel) -> RepoResult<MealId> {
        let id = Uuid::new_v4();
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        tx.execute(
            "INSERT INTO meals (uuid, name, date, picture, mood, mood_after)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                id.to_string(),
                meal.name.as_str(),
                meal.date,
                meal.picture.as_deref(),
                meal.mood.map(Mood::code),
                meal.mood_after.map(Mood::code),
            ],
        )?;
        insert_tag_rows(&tx, id, &meal.tags)?;

        tx.commit()?;
        Ok(id)
    }

    fn update_meal(&mut self, id: MealId, meal: &MealModel) -> RepoResult<()> {
        let id_text = id.to_string();
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let changed = tx.execute(
            "UPDATE meals
             SET
                name = ?2,
                date = ?3,
                picture = ?4,
                mood = ?5,
                mood_after = ?6,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            params![
                id_text.as_str(),
                meal.name.as_str(),
                meal.date,
                meal.picture.as_deref(),
                meal.mood.map(Mood::code),
                meal.mood_after.map(Mood::code),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        tx.execute("DELETE FROM tags WHERE meal_uuid = ?1;", [id_text.as_str()])?;
        insert_tag_rows(&tx, id, &meal.tags)?;

        tx.commit()?;
        Ok(())
    }

    fn get_meal(&self, id: MealId) -> RepoResult<Option<MealModel>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{MEAL_SELECT_SQL} WHERE uuid = ?1;"))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_meal_row(self.conn, row)?));
        }

        Ok(None)
    }

    fn list_meals(&self) -> RepoResult<Vec<MealModel>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{MEAL_SELECT_SQL} ORDER BY date DESC, uuid ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut meals = Vec::new();
        while let Some(row) = rows.next()? {
            meals.push(parse_meal_row(self.conn, row)?);
        }
        Ok(meals)
    }

    fn most_recent_meal(&self) -> RepoResult<Option<MealModel>> {
        let mut stmt = self.conn.prepare(&format!(
            "{MEAL_SELECT_SQL} ORDER BY date DESC, uuid ASC LIMIT 1;"
        ))?;
        let mut rows = stmt.query([])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_meal_row(self.conn, row)?));
        }
        Ok(None)
    }

    fn list_meals_with_moods(&self) -> RepoResult<Vec<MealModel>> {
        let mut stmt = self.conn.prepare(&format!(
            "{MEAL_SELECT_SQL}
             WHERE mood IS NOT NULL
               AND mood_after IS NOT NULL
             ORDER BY date ASC, uuid ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut meals = Vec::new();
        while let Some(row) = rows.next()? {
            meals.push(parse_meal_row(self.conn, row)?);
        }
        Ok(meals)
    }

    fn delete_meal(&self, id: MealId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM meals WHERE uuid = ?1;", [id.to_string()])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn meal_exists(&self, id: MealId) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM meals WHERE uuid = ?1);",
            [id.to_string()],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }
}

fn insert_tag_rows(tx: &Transaction<'_>, meal_id: MealId, tags: &[String]) -> RepoResult<()> {
    let meal_id_text = meal_id.to_string();
    for tag in tags {
        tx.execute(
            "INSERT INTO tags (uuid, meal_uuid, tag) VALUES (?1, ?2, ?3);",
            params![
                Uuid::new_v4().to_string(),
                meal_id_text.as_str(),
                tag.as_str()
            ],
        )?;
    }
    Ok(())
}

fn parse_meal_row(conn: &Connection, row: &Row<'_>) -> RepoResult<MealModel> {
    let uuid_text: String = row.get("uuid")?;
    let id = parse_uuid(&uuid_text, "meals.uuid")?;

    let mood = parse_mood_column(row.get::<_, Option<i64>>("mood")?, "meals.mood")?;
    let mood_after = parse_mood_column(
        row.get::<_, Option<i64>>("mood_after")?,
        "meals.mood_after",
    )?;

    let tags = load_tag_texts(conn, &uuid_text)?;

    Ok(MealModel {
        id: Some(id),
        name: row.get("name")?,
        date: row.get("date")?,
        picture: row.get("picture")?,
        mood,
        mood_after,
        tags,
    })
}

fn parse_mood_column(code: Option<i64>, column: &str) -> RepoResult<Option<Mood>> {
    match code {
        None => Ok(None),
        Some(value) => Mood::from_code(value).map(Some).ok_or_else(|| {
            RepoError::InvalidData(format!("invalid mood code `{value}` in {column}"))
        }),
    }
}

pub(crate) fn parse_uuid(value: &str, column: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}

fn load_tag_texts(conn: &Connection, meal_uuid: &str) -> RepoResult<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT tag
         FROM tags
         WHERE meal_uuid = ?1
         ORDER BY tag ASC;",
    )?;
    let mut rows = stmt.query([meal_uuid])?;
    let mut tags = Vec::new();
    while let Some(row) = rows.next()? {
        tags.push(row.get(0)?);
    }
    Ok(tags)
}

pub(crate) fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
