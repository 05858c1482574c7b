//! Domain models for the movies service.
//!
//! - [`Movie`] - A stored movie record
//! - [`MoviePatch`] - Partial update of a record
//! - [`MovieFilter`] - Title/year filter used by search and export

use serde::{Deserialize, Serialize};

/// Lowest accepted release year.
pub const MIN_YEAR: i32 = 1888;

/// Highest accepted release year.
pub const MAX_YEAR: i32 = 2100;

/// Records loaded into a freshly seeded store, in insertion order.
pub const SEED_MOVIES: [(&str, i32); 10] = [
    ("Inception", 2010),
    ("Interstellar", 2014),
    ("The Matrix", 1999),
    ("Fight Club", 1999),
    ("Pulp Fiction", 1994),
    ("The Godfather", 1972),
    ("The Dark Knight", 2008),
    ("Forrest Gump", 1994),
    ("Gladiator", 2000),
    ("Titanic", 1997),
];

// =============================================================================
// Movie
// =============================================================================

/// A movie record as held by the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Movie {
    /// Unique for the lifetime of the store, never reused.
    pub id: u64,
    pub title: String,
    pub year: i32,
}

impl Movie {
    /// Line used by the plain-text listing.
    pub fn list_line(&self) -> String {
        format!("Film: {}, lansat în {}", self.title, self.year)
    }
}

// =============================================================================
// Partial update
// =============================================================================

/// Fields to overwrite on an existing record. `None` leaves the field as is.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MoviePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
}

impl MoviePatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.year.is_none()
    }
}

// =============================================================================
// Filter
// =============================================================================

/// Optional title substring and minimum year, combined with AND.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MovieFilter {
    pub name: Option<String>,
    pub min_year: Option<i32>,
}

impl MovieFilter {
    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            min_year: None,
        }
    }

    pub fn by_min_year(min_year: i32) -> Self {
        Self {
            name: None,
            min_year: Some(min_year),
        }
    }

    /// Case-insensitive title containment and `year >= min_year`.
    pub fn matches(&self, movie: &Movie) -> bool {
        let name_ok = match &self.name {
            Some(needle) => movie
                .title
                .to_uppercase()
                .contains(&needle.to_uppercase()),
            None => true,
        };
        let year_ok = self.min_year.map_or(true, |min| movie.year >= min);
        name_ok && year_ok
    }
}
