//! Tag domain model.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a persisted tag.
pub type TagId = Uuid;

/// Tag value object passed across the data-service boundary.
///
/// A persisted tag belongs to exactly one meal; the owning relation lives
/// in storage and is not mirrored here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagModel {
    /// Stable id, set once the tag is persisted.
    pub id: Option<TagId>,
    /// Text label.
    pub tag: String,
}

impl TagModel {
    /// Creates an unpersisted tag with the given text.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            id: None,
            tag: tag.into(),
        }
    }
}
