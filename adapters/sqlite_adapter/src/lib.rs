use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use bookshelf_core::domain::{Book, QueryField};
use bookshelf_core::error::StorageError;
use bookshelf_core::ports::BookStore;
use chrono::Utc;
use rusqlite::{params, Connection};

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS books (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    title      TEXT NOT NULL,
    author     TEXT NOT NULL,
    price      INTEGER NOT NULL,
    first_seen TEXT NOT NULL,
    UNIQUE (title, author)
);
"#;

/// SQLite implementation of the `BookStore` port.
///
/// Dedup key is (title, author), enforced by the UNIQUE constraint. A
/// duplicate insert refreshes the stored price and is not counted as new.
pub struct SqliteBookStore {
    conn: Mutex<Connection>,
}

impl SqliteBookStore {
    /// Opens (or creates) the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let conn = Connection::open(path).map_err(sql_err)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// In-memory store for tests.
    pub fn in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory().map_err(sql_err)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StorageError> {
        self.conn
            .lock()
            .map_err(|_| StorageError::new("database connection poisoned"))
    }
}

impl BookStore for SqliteBookStore {
    fn ensure_schema(&self) -> Result<(), StorageError> {
        let conn = self.lock()?;
        conn.execute_batch(SCHEMA_SQL).map_err(sql_err)
    }

    fn insert_books(&self, books: &[Book]) -> Result<usize, StorageError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction().map_err(sql_err)?;
        let mut added = 0;
        {
            let mut insert = tx
                .prepare(
                    "INSERT OR IGNORE INTO books (title, author, price, first_seen)
                     VALUES (?1, ?2, ?3, ?4)",
                )
                .map_err(sql_err)?;
            let mut refresh = tx
                .prepare("UPDATE books SET price = ?3 WHERE title = ?1 AND author = ?2")
                .map_err(sql_err)?;
            let now = Utc::now().to_rfc3339();

            for book in books {
                let inserted = insert
                    .execute(params![book.title, book.author, book.price, now])
                    .map_err(sql_err)?;
                if inserted == 1 {
                    added += 1;
                } else {
                    // Already present: keep the row, refresh the price.
                    refresh
                        .execute(params![book.title, book.author, book.price])
                        .map_err(sql_err)?;
                }
            }
        }
        tx.commit().map_err(sql_err)?;
        tracing::debug!(total = books.len(), added, "bulk insert committed");
        Ok(added)
    }

    fn query_books(&self, field: QueryField, keyword: &str) -> Result<Vec<Book>, StorageError> {
        let conn = self.lock()?;
        let sql = format!(
            "SELECT title, author, price FROM books
             WHERE {} LIKE ?1 ORDER BY title, author",
            field.column()
        );
        let mut stmt = conn.prepare(&sql).map_err(sql_err)?;
        let pattern = format!("%{keyword}%");

        let books = stmt
            .query_map(params![pattern], |row| {
                Ok(Book {
                    title: row.get(0)?,
                    author: row.get(1)?,
                    price: row.get(2)?,
                })
            })
            .map_err(sql_err)?
            .collect::<Result<Vec<_>, rusqlite::Error>>()
            .map_err(sql_err)?;

        Ok(books)
    }
}

fn sql_err(e: rusqlite::Error) -> StorageError {
    StorageError::new(e.to_string())
}
