//! Edition categories (age/gender brackets).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type CategoryId = Uuid;

/// One yearly instance of the tournament.
pub type EditionId = Uuid;

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub edition_id: EditionId,
    /// Stable key used by the court rule table (e.g. "U13B", "mini").
    pub code: String,
    pub name: String,
}

impl Category {
    pub fn new(edition_id: EditionId, code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            edition_id,
            code: code.into(),
            name: name.into(),
        }
    }
}
