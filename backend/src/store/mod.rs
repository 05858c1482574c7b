//! In-memory movie store.
//!
//! Owns the record list and a monotonically increasing id counter. The HTTP
//! layer shares one store behind [`SharedStore`]: reads take the read lock,
//! every mutation (including a whole CSV import) takes the write lock.

use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{StoreError, StoreResult};
use crate::models::{Movie, MoviePatch, SEED_MOVIES};

/// Store handle shared between request handlers.
pub type SharedStore = Arc<RwLock<MovieStore>>;

/// Ordered collection of movie records.
#[derive(Debug, Clone)]
pub struct MovieStore {
    movies: Vec<Movie>,
    next_id: u64,
}

impl MovieStore {
    /// Create an empty store. The first inserted record gets id 1.
    pub fn new() -> Self {
        Self {
            movies: Vec::new(),
            next_id: 1,
        }
    }

    /// Create a store holding the ten seed movies (ids 1 to 10).
    pub fn seeded() -> Self {
        let mut store = Self::new();
        for (title, year) in SEED_MOVIES {
            store.insert(title, year);
        }
        store
    }

    /// Wrap the store for sharing across handlers.
    pub fn into_shared(self) -> SharedStore {
        Arc::new(RwLock::new(self))
    }

    /// All records in insertion order.
    pub fn list(&self) -> &[Movie] {
        &self.movies
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }

    pub fn find_by_id(&self, id: u64) -> StoreResult<Movie> {
        self.movies
            .iter()
            .find(|m| m.id == id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    /// Linear scan, insertion order preserved.
    pub fn find_where<P>(&self, predicate: P) -> Vec<Movie>
    where
        P: Fn(&Movie) -> bool,
    {
        self.movies.iter().filter(|m| predicate(m)).cloned().collect()
    }

    /// Append a record. Callers validate title and year beforehand.
    pub fn insert(&mut self, title: impl Into<String>, year: i32) -> Movie {
        let movie = Movie {
            id: self.next_id,
            title: title.into(),
            year,
        };
        self.next_id += 1;
        self.movies.push(movie.clone());
        movie
    }

    /// Overwrite only the fields present in `patch`.
    pub fn update(&mut self, id: u64, patch: MoviePatch) -> StoreResult<Movie> {
        let movie = self
            .movies
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or(StoreError::NotFound(id))?;

        if let Some(title) = patch.title {
            movie.title = title;
        }
        if let Some(year) = patch.year {
            movie.year = year;
        }
        Ok(movie.clone())
    }

    /// Remove and return a record.
    pub fn delete(&mut self, id: u64) -> StoreResult<Movie> {
        let index = self
            .movies
            .iter()
            .position(|m| m.id == id)
            .ok_or(StoreError::NotFound(id))?;
        Ok(self.movies.remove(index))
    }
}

impl Default for MovieStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_store() {
        let store = MovieStore::seeded();
        assert_eq!(store.len(), 10);
        assert_eq!(store.list()[0].title, "Inception");
        assert_eq!(store.list()[9].id, 10);
    }

    #[test]
    fn test_insert_assigns_sequential_ids() {
        let mut store = MovieStore::new();
        let a = store.insert("Alien", 1979);
        let b = store.insert("Aliens", 1986);
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert_eq!(store.find_by_id(2).unwrap().title, "Aliens");
    }

    #[test]
    fn test_ids_not_reused_after_delete() {
        let mut store = MovieStore::seeded();
        store.delete(3).unwrap();
        store.delete(10).unwrap();
        let added = store.insert("Heat", 1995);
        assert_eq!(added.id, 11);

        let ids: Vec<u64> = store.list().iter().map(|m| m.id).collect();
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_find_where_preserves_order() {
        let store = MovieStore::seeded();
        let titles: Vec<String> = store
            .find_where(|m| m.year >= 2000)
            .into_iter()
            .map(|m| m.title)
            .collect();
        assert_eq!(
            titles,
            vec!["Inception", "Interstellar", "The Dark Knight", "Gladiator"]
        );
    }

    #[test]
    fn test_partial_update() {
        let mut store = MovieStore::seeded();
        let updated = store
            .update(
                1,
                MoviePatch {
                    title: None,
                    year: Some(2011),
                },
            )
            .unwrap();
        assert_eq!(updated.title, "Inception");
        assert_eq!(updated.year, 2011);
        assert_eq!(store.find_by_id(1).unwrap().year, 2011);
    }

    #[test]
    fn test_missing_ids() {
        let mut store = MovieStore::seeded();
        assert_eq!(store.find_by_id(99), Err(StoreError::NotFound(99)));
        assert_eq!(
            store.update(99, MoviePatch::default()),
            Err(StoreError::NotFound(99))
        );
        assert_eq!(store.delete(99), Err(StoreError::NotFound(99)));
    }

    #[test]
    fn test_delete_returns_record() {
        let mut store = MovieStore::seeded();
        let removed = store.delete(5).unwrap();
        assert_eq!(removed.title, "Pulp Fiction");
        assert!(store.find_by_id(5).is_err());
        assert_eq!(store.len(), 9);
    }
}
