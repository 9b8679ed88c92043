//! Meal data service — the sole caller-facing access point to the store.
//!
//! # Responsibility
//! - Own the serialized work context (one mutex-guarded connection).
//! - Translate between domain models and persisted rows via repositories.
//! - Map every internal failure to absence/emptiness/no-op at the public
//!   boundary, with a structured log record for diagnosis.
//!
//! # Invariants
//! - No public method returns an error or panics; store-open failure at
//!   construction is the only fallible call.
//! - All store access goes through the single work context, so concurrent
//!   callers are serialized FIFO by lock acquisition.
//! - Mutations commit their own transaction before returning.

use crate::db::{open_db, open_db_in_memory, DbError};
use crate::model::meal::{MealId, MealModel};
use crate::model::tag::TagModel;
use crate::repo::meal_repo::{MealRepository, RepoError, RepoResult, SqliteMealRepository};
use crate::repo::tag_repo::{SqliteTagRepository, TagRepository};
use log::{debug, error};
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Ranking key used by [`MealDataService::fetch_popular_tags`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TagRanking {
    /// Longest tag text first, text ascending as tiebreak. Default.
    #[default]
    TextLength,
    /// Most-used tag text first, text ascending as tiebreak. Aggregates
    /// equal texts across meals, so returned models carry no id.
    Frequency,
}

/// Caller-facing façade over the meal store.
///
/// Every query degrades to `None`/empty and every mutation degrades to a
/// silent no-op when the store misbehaves; failures are logged internally.
pub struct MealDataService {
    conn: Mutex<Connection>,
    ranking: TagRanking,
}

impl MealDataService {
    /// Opens (or creates) the store at `path` and migrates it.
    ///
    /// # Errors
    /// - Returns `DbError` when the store cannot be opened or migrated;
    ///   the embedding application decides whether that is fatal.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DbError> {
        Ok(Self::from_connection(open_db(path)?))
    }

    /// Opens an in-memory store, primarily for tests.
    ///
    /// # Errors
    /// - Returns `DbError` when bootstrap or migration fails.
    pub fn open_in_memory() -> Result<Self, DbError> {
        Ok(Self::from_connection(open_db_in_memory()?))
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
            ranking: TagRanking::default(),
        }
    }

    /// Selects the ranking key used by [`Self::fetch_popular_tags`].
    pub fn with_tag_ranking(mut self, ranking: TagRanking) -> Self {
        self.ranking = ranking;
        self
    }

    /// Returns the active popular-tags ranking key.
    pub fn tag_ranking(&self) -> TagRanking {
        self.ranking
    }

    /// Best-effort flush of pending WAL frames into the database file.
    ///
    /// Fire-and-forget: a failed checkpoint is logged and dropped.
    pub fn save_changes(&self) {
        let conn = self.lock_conn();
        let result = conn.query_row("PRAGMA wal_checkpoint(PASSIVE);", [], |_| Ok(()));
        if let Err(err) = result {
            error!("event=save_changes module=service status=error error={err}");
        }
    }

    /// Returns the single most-recently-dated meal, or `None` when the
    /// store is empty or the query fails.
    pub fn fetch_recent_meal(&self) -> Option<MealModel> {
        self.with_meal_repo("fetch_recent_meal", |repo| repo.most_recent_meal())
            .flatten()
    }

    /// Returns all meals ordered by date descending, or `None` on failure.
    pub fn fetch_all_meals(&self) -> Option<Vec<MealModel>> {
        self.with_meal_repo("fetch_all_meals", |repo| repo.list_meals())
    }

    /// Resolves one meal by id. `None` when missing or unresolvable.
    pub fn meal_by_id(&self, id: MealId) -> Option<MealModel> {
        self.with_meal_repo("meal_by_id", |repo| repo.get_meal(id))
            .flatten()
    }

    /// Creates a new meal from the model, one tag row per tag string
    /// included. Returns the new stable id, or `None` on failure.
    pub fn add_new_meal(&self, meal: &MealModel) -> Option<MealId> {
        self.with_meal_repo("add_new_meal", |repo| repo.create_meal(meal))
    }

    /// Overwrites an existing meal's scalar fields and replaces its whole
    /// tag set with the model's tag list.
    ///
    /// Silent no-op when the model has no id or the id does not resolve.
    pub fn change_meal(&self, meal: &MealModel) {
        let Some(id) = meal.id else {
            debug!("event=change_meal module=service status=skip reason=missing_id");
            return;
        };

        let mut conn = self.lock_conn();
        let result =
            SqliteMealRepository::try_new(&mut conn).and_then(|mut repo| repo.update_meal(id, meal));
        match result {
            Ok(()) => {}
            Err(RepoError::NotFound(_)) => {
                debug!("event=change_meal module=service status=skip reason=unresolved id={id}");
            }
            Err(err) => {
                error!("event=change_meal module=service status=error id={id} error={err}");
            }
        }
    }

    /// Deletes a meal; the store cascades the delete to its tags.
    ///
    /// Silent no-op when the model has no id or the id does not resolve.
    pub fn remove_meal(&self, meal: &MealModel) {
        let Some(id) = meal.id else {
            debug!("event=remove_meal module=service status=skip reason=missing_id");
            return;
        };

        let mut conn = self.lock_conn();
        let result =
            SqliteMealRepository::try_new(&mut conn).and_then(|repo| repo.delete_meal(id));
        match result {
            Ok(()) => {}
            Err(RepoError::NotFound(_)) => {
                debug!("event=remove_meal module=service status=skip reason=unresolved id={id}");
            }
            Err(err) => {
                error!("event=remove_meal module=service status=error id={id} error={err}");
            }
        }
    }

    /// Returns meals with both moods recorded, ordered by date ascending,
    /// or `None` on failure.
    pub fn fetch_meal_statistics(&self) -> Option<Vec<MealModel>> {
        self.with_meal_repo("fetch_meal_statistics", |repo| repo.list_meals_with_moods())
    }

    /// Returns the meal's tags sorted ascending by text. Empty when the
    /// meal is unresolvable or the query fails.
    pub fn fetch_tags(&self, meal: &MealModel) -> Vec<TagModel> {
        let Some(id) = meal.id else {
            debug!("event=fetch_tags module=service status=skip reason=missing_id");
            return Vec::new();
        };

        let conn = self.lock_conn();
        let result = SqliteTagRepository::try_new(&conn).and_then(|repo| repo.tags_for_meal(id));
        match result {
            Ok(tags) => tags,
            Err(err) => {
                error!("event=fetch_tags module=service status=error id={id} error={err}");
                Vec::new()
            }
        }
    }

    /// Returns up to `amount` tags ranked by the configured [`TagRanking`],
    /// or `None` when the underlying fetch fails.
    pub fn fetch_popular_tags(&self, amount: usize) -> Option<Vec<TagModel>> {
        let conn = self.lock_conn();
        let result = SqliteTagRepository::try_new(&conn).and_then(|repo| match self.ranking {
            TagRanking::TextLength => {
                let mut tags = repo.list_all_tags()?;
                rank_by_text_length(&mut tags);
                tags.truncate(amount);
                Ok(tags)
            }
            TagRanking::Frequency => {
                let counts = repo.tag_counts()?;
                Ok(counts
                    .into_iter()
                    .take(amount)
                    .map(|(text, _uses)| TagModel::new(text))
                    .collect())
            }
        });

        match result {
            Ok(tags) => Some(tags),
            Err(err) => {
                error!("event=fetch_popular_tags module=service status=error error={err}");
                None
            }
        }
    }

    /// Creates a new tag from the model's text, linked to the given meal.
    ///
    /// Silent no-op when the meal has no id or does not resolve.
    pub fn add_tag(&self, tag: &TagModel, meal: &MealModel) {
        let Some(meal_id) = meal.id else {
            debug!("event=add_tag module=service status=skip reason=missing_meal_id");
            return;
        };

        let mut conn = self.lock_conn();
        let resolved =
            SqliteMealRepository::try_new(&mut conn).and_then(|repo| repo.meal_exists(meal_id));
        match resolved {
            Ok(true) => {}
            Ok(false) => {
                debug!(
                    "event=add_tag module=service status=skip reason=unresolved meal_id={meal_id}"
                );
                return;
            }
            Err(err) => {
                error!("event=add_tag module=service status=error meal_id={meal_id} error={err}");
                return;
            }
        }

        let result =
            SqliteTagRepository::try_new(&conn).and_then(|repo| repo.add_tag(meal_id, &tag.tag));
        if let Err(err) = result {
            error!("event=add_tag module=service status=error meal_id={meal_id} error={err}");
        }
    }

    /// Unlinks the tag from the meal, deleting the tag row.
    ///
    /// Silent no-op when either id is missing, either record is
    /// unresolvable, or the tag belongs to a different meal.
    pub fn remove_tag(&self, tag: &TagModel, meal: &MealModel) {
        let (Some(tag_id), Some(meal_id)) = (tag.id, meal.id) else {
            debug!("event=remove_tag module=service status=skip reason=missing_id");
            return;
        };

        let conn = self.lock_conn();
        let result =
            SqliteTagRepository::try_new(&conn).and_then(|repo| repo.remove_tag(tag_id, meal_id));
        match result {
            Ok(true) => {}
            Ok(false) => {
                debug!(
                    "event=remove_tag module=service status=skip reason=unresolved tag_id={tag_id}"
                );
            }
            Err(err) => {
                error!("event=remove_tag module=service status=error tag_id={tag_id} error={err}");
            }
        }
    }

    fn with_meal_repo<T>(
        &self,
        op: &str,
        f: impl FnOnce(&mut SqliteMealRepository<'_>) -> RepoResult<T>,
    ) -> Option<T> {
        let mut conn = self.lock_conn();
        let result = SqliteMealRepository::try_new(&mut conn).and_then(|mut repo| f(&mut repo));
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                error!("event={op} module=service status=error error={err}");
                None
            }
        }
    }

    fn lock_conn(&self) -> MutexGuard<'_, Connection> {
        // A poisoned lock only means another caller panicked mid-call; the
        // connection itself is still usable.
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Sorts tags longest-text-first, text ascending as tiebreak.
fn rank_by_text_length(tags: &mut [TagModel]) {
    tags.sort_by(|a, b| {
        b.tag
            .chars()
            .count()
            .cmp(&a.tag.chars().count())
            .then_with(|| a.tag.cmp(&b.tag))
    });
}
