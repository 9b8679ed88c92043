//! Meal domain model.
//!
//! # Responsibility
//! - Define the meal value object and the mood enumeration.
//! - Provide constructors for the unpersisted → persisted lifecycle.
//!
//! # Invariants
//! - `id` is `None` until the meal has been stored; a stored meal's id is
//!   stable and never reused.
//! - `tags` is a projection of the meal's persisted tag texts, rebuilt from
//!   the authoritative tag rows on every read; it is never stored itself.
//! - A missing mood is `None` — there is no sentinel code for absence.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a persisted meal.
pub type MealId = Uuid;

/// Fixed mood scale recorded before and after a meal.
///
/// Codes are part of the storage contract; rows carrying a code outside
/// this set are rejected as invalid data on read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    Neutral,
    Terrible,
    Bad,
    Okay,
    Good,
    Great,
}

impl Mood {
    /// Returns the stable storage code for this mood.
    pub fn code(self) -> i64 {
        match self {
            Self::Neutral => 0,
            Self::Terrible => 1,
            Self::Bad => 2,
            Self::Okay => 3,
            Self::Good => 4,
            Self::Great => 5,
        }
    }

    /// Parses a storage code back into a mood. `None` for unknown codes.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Neutral),
            1 => Some(Self::Terrible),
            2 => Some(Self::Bad),
            3 => Some(Self::Okay),
            4 => Some(Self::Good),
            5 => Some(Self::Great),
            _ => None,
        }
    }
}

/// Meal value object passed across the data-service boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealModel {
    /// Stable id, set once the meal is persisted.
    pub id: Option<MealId>,
    /// Display name of the meal.
    pub name: String,
    /// When the meal was eaten, epoch milliseconds.
    pub date: i64,
    /// Optional photo bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<Vec<u8>>,
    /// Mood before eating.
    pub mood: Option<Mood>,
    /// Mood after eating.
    pub mood_after: Option<Mood>,
    /// Tag texts, recomputed from the persisted tag set on read.
    #[serde(default)]
    pub tags: Vec<String>,
}

impl MealModel {
    /// Creates an unpersisted meal with the given name and date.
    pub fn new(name: impl Into<String>, date: i64) -> Self {
        Self {
            id: None,
            name: name.into(),
            date,
            picture: None,
            mood: None,
            mood_after: None,
            tags: Vec::new(),
        }
    }

    /// Returns whether this model refers to a stored meal.
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }
}
