use crate::domain::{Book, QueryField};
use crate::error::{FetchError, StorageError};

/// Produces book records from an external listing source.
pub trait BookFetcher {
    fn fetch_books(&self) -> Result<Vec<Book>, FetchError>;
}

/// Durable keyed collection of book records.
///
/// Records are deduplicated on (title, author): inserting an already-seen
/// book refreshes its price instead of adding a second row, and does not
/// count toward the newly-added tally.
pub trait BookStore {
    /// Creates the backing schema if missing. Safe to call repeatedly.
    fn ensure_schema(&self) -> Result<(), StorageError>;

    /// Inserts records, returning how many were not previously present.
    fn insert_books(&self, books: &[Book]) -> Result<usize, StorageError>;

    /// Returns records whose `field` contains `keyword`, in store order.
    fn query_books(&self, field: QueryField, keyword: &str) -> Result<Vec<Book>, StorageError>;
}
