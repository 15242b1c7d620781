use crate::domain::{Book, QueryField};
use crate::error::{FetchError, StorageError};
use crate::ports::{BookFetcher, BookStore};
use thiserror::Error;

/// Outcome of one update pass: how many records the fetcher produced and
/// how many of those were not already in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateReport {
    pub total: usize,
    pub new_count: usize,
}

/// What the update action can fail with. The menu pattern-matches on this
/// to pick the message; nothing propagates past the action boundary.
#[derive(Debug, Error)]
pub enum UpdateError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Application service composing the fetcher and the store.
pub struct CatalogService {
    fetcher: Box<dyn BookFetcher>,
    store: Box<dyn BookStore>,
}

impl CatalogService {
    pub fn new(fetcher: Box<dyn BookFetcher>, store: Box<dyn BookStore>) -> Self {
        Self { fetcher, store }
    }

    /// Startup schema initialization. The update action re-runs it
    /// defensively before inserting.
    pub fn ensure_schema(&self) -> Result<(), StorageError> {
        self.store.ensure_schema()
    }

    /// One scrape-then-upsert pass.
    ///
    /// A fetch failure aborts before the store is touched. Zero fetched
    /// records also leaves the store untouched and reports total = 0.
    pub fn update_database(&self) -> Result<UpdateReport, UpdateError> {
        let books = self.fetcher.fetch_books()?;
        let total = books.len();
        if total == 0 {
            tracing::info!("fetcher returned no records, store untouched");
            return Ok(UpdateReport {
                total: 0,
                new_count: 0,
            });
        }

        self.store.ensure_schema()?;
        let new_count = self.store.insert_books(&books)?;
        tracing::info!(total, new_count, "update pass complete");
        Ok(UpdateReport { total, new_count })
    }

    /// Field-based substring lookup. Keyword validation happens at the menu;
    /// by the time this runs the keyword is non-empty.
    pub fn search(&self, field: QueryField, keyword: &str) -> Result<Vec<Book>, StorageError> {
        self.store.query_books(field, keyword)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::collections::HashSet;
    use std::rc::Rc;

    #[derive(Default)]
    struct StoreState {
        schema_calls: Cell<usize>,
        insert_calls: Cell<usize>,
        fail_insert: Cell<bool>,
        seen: RefCell<HashSet<(String, String)>>,
        rows: RefCell<Vec<Book>>,
    }

    struct FakeStore(Rc<StoreState>);

    impl BookStore for FakeStore {
        fn ensure_schema(&self) -> Result<(), StorageError> {
            self.0.schema_calls.set(self.0.schema_calls.get() + 1);
            Ok(())
        }

        fn insert_books(&self, books: &[Book]) -> Result<usize, StorageError> {
            self.0.insert_calls.set(self.0.insert_calls.get() + 1);
            if self.0.fail_insert.get() {
                return Err(StorageError::new("disk full"));
            }
            let mut seen = self.0.seen.borrow_mut();
            let mut added = 0;
            for book in books {
                if seen.insert((book.title.clone(), book.author.clone())) {
                    self.0.rows.borrow_mut().push(book.clone());
                    added += 1;
                }
            }
            Ok(added)
        }

        fn query_books(
            &self,
            field: QueryField,
            keyword: &str,
        ) -> Result<Vec<Book>, StorageError> {
            Ok(self
                .0
                .rows
                .borrow()
                .iter()
                .filter(|b| match field {
                    QueryField::Title => b.title.contains(keyword),
                    QueryField::Author => b.author.contains(keyword),
                })
                .cloned()
                .collect())
        }
    }

    struct FakeFetcher {
        books: Vec<Book>,
        fail: bool,
    }

    impl BookFetcher for FakeFetcher {
        fn fetch_books(&self) -> Result<Vec<Book>, FetchError> {
            if self.fail {
                return Err(FetchError::Network("connection refused".into()));
            }
            Ok(self.books.clone())
        }
    }

    fn book(title: &str, author: &str, price: i64) -> Book {
        Book {
            title: title.into(),
            author: author.into(),
            price,
        }
    }

    fn service(fetcher: FakeFetcher) -> (CatalogService, Rc<StoreState>) {
        let state = Rc::new(StoreState::default());
        let service = CatalogService::new(
            Box::new(fetcher),
            Box::new(FakeStore(Rc::clone(&state))),
        );
        (service, state)
    }

    #[test]
    fn fetch_failure_leaves_store_untouched() {
        let (service, state) = service(FakeFetcher {
            books: vec![],
            fail: true,
        });

        let err = service.update_database().unwrap_err();
        assert!(matches!(err, UpdateError::Fetch(_)));
        assert_eq!(state.schema_calls.get(), 0);
        assert_eq!(state.insert_calls.get(), 0);
    }

    #[test]
    fn empty_fetch_skips_schema_and_insert() {
        let (service, state) = service(FakeFetcher {
            books: vec![],
            fail: false,
        });

        let report = service.update_database().unwrap();
        assert_eq!(report, UpdateReport { total: 0, new_count: 0 });
        assert_eq!(state.schema_calls.get(), 0);
        assert_eq!(state.insert_calls.get(), 0);
    }

    #[test]
    fn update_reports_total_and_newly_added() {
        let (service, state) = service(FakeFetcher {
            books: vec![book("A", "X", 100), book("B", "Y", 250)],
            fail: false,
        });

        let report = service.update_database().unwrap();
        assert_eq!(report, UpdateReport { total: 2, new_count: 2 });
        assert_eq!(state.schema_calls.get(), 1);
        assert_eq!(state.insert_calls.get(), 1);
    }

    #[test]
    fn second_identical_pass_adds_nothing() {
        let (service, _state) = service(FakeFetcher {
            books: vec![book("A", "X", 100)],
            fail: false,
        });

        let first = service.update_database().unwrap();
        assert_eq!(first, UpdateReport { total: 1, new_count: 1 });

        let second = service.update_database().unwrap();
        assert_eq!(second, UpdateReport { total: 1, new_count: 0 });
    }

    #[test]
    fn insert_failure_surfaces_as_storage_error() {
        let (service, state) = service(FakeFetcher {
            books: vec![book("A", "X", 100)],
            fail: false,
        });
        state.fail_insert.set(true);

        let err = service.update_database().unwrap_err();
        assert!(matches!(err, UpdateError::Storage(_)));
    }

    #[test]
    fn inserted_record_is_returned_by_matching_search() {
        let (service, _state) = service(FakeFetcher {
            books: vec![book("Deep Learning", "Goodfellow", 474)],
            fail: false,
        });
        service.update_database().unwrap();

        let hits = service.search(QueryField::Author, "Good").unwrap();
        assert_eq!(hits, vec![book("Deep Learning", "Goodfellow", 474)]);

        let none = service.search(QueryField::Title, "Zzz").unwrap();
        assert!(none.is_empty());
    }
}
