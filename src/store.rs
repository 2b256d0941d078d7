use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_graphql::ErrorExtensions;
use tracing::{debug, info};

use crate::datamodel::{Author, Book, seed_authors, seed_books};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{entity} with id {id} does not exist")]
    NotFound { entity: &'static str, id: i32 },
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl StoreError {
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::NotFound { .. } => "NOT_FOUND",
            StoreError::InvalidInput(_) => "INVALID_INPUT",
        }
    }
}

impl ErrorExtensions for StoreError {
    fn extend(&self) -> async_graphql::Error {
        async_graphql::Error::new(self.to_string()).extend_with(|_, e| e.set("code", self.code()))
    }
}

struct Collections {
    authors: Vec<Author>,
    books: Vec<Book>,
    next_author_id: i32,
    next_book_id: i32,
}

/// Shared handle to the in-memory authors and books.
///
/// Clones share the same collections. Id assignment and the append happen under
/// one write lock, so concurrent writers never hand out the same id.
#[derive(Clone)]
pub struct Library {
    inner: Arc<RwLock<Collections>>,
}

impl Library {
    pub fn new(authors: Vec<Author>, books: Vec<Book>) -> Self {
        let next_author_id = authors.iter().map(|a| a.id).max().unwrap_or(0) + 1;
        let next_book_id = books.iter().map(|b| b.id).max().unwrap_or(0) + 1;
        let inner = Collections {
            authors,
            books,
            next_author_id,
            next_book_id,
        };
        Self {
            inner: Arc::new(RwLock::new(inner)),
        }
    }

    pub fn seeded() -> Self {
        Self::new(seed_authors(), seed_books())
    }

    // Nothing spans a panic while the lock is held, so a poisoned lock still
    // guards consistent data.
    fn read(&self) -> RwLockReadGuard<'_, Collections> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Collections> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn book(&self, id: i32) -> Option<Book> {
        self.read().books.iter().find(|b| b.id == id).cloned()
    }

    pub fn books(&self) -> Vec<Book> {
        self.read().books.clone()
    }

    pub fn author(&self, id: i32) -> Option<Author> {
        self.read().authors.iter().find(|a| a.id == id).cloned()
    }

    pub fn authors(&self) -> Vec<Author> {
        self.read().authors.clone()
    }

    /// Groups the books of every requested author in a single pass.
    ///
    /// Each requested id is present in the result, with an empty list for
    /// authors without books.
    pub fn books_by_authors(&self, author_ids: &[i32]) -> HashMap<i32, Vec<Book>> {
        let mut grouped: HashMap<i32, Vec<Book>> =
            author_ids.iter().map(|&id| (id, Vec::new())).collect();
        for book in &self.read().books {
            if let Some(books) = grouped.get_mut(&book.author_id) {
                books.push(book.clone());
            }
        }
        grouped
    }

    /// Looks up every requested author in a single pass, `None` for unknown ids.
    pub fn authors_by_ids(&self, ids: &[i32]) -> HashMap<i32, Option<Author>> {
        let mut found: HashMap<i32, Option<Author>> = ids.iter().map(|&id| (id, None)).collect();
        for author in &self.read().authors {
            if let Some(slot) = found.get_mut(&author.id) {
                slot.get_or_insert_with(|| author.clone());
            }
        }
        found
    }

    pub fn add_book(&self, name: String, author_id: i32) -> Book {
        let mut inner = self.write();
        let book = Book {
            id: inner.next_book_id,
            name,
            author_id,
        };
        inner.next_book_id += 1;
        inner.books.push(book.clone());

        info!(id = book.id, author_id, "added book");
        book
    }

    pub fn add_author(&self, name: String) -> Author {
        let mut inner = self.write();
        let author = Author {
            id: inner.next_author_id,
            name,
        };
        inner.next_author_id += 1;
        inner.authors.push(author.clone());

        info!(id = author.id, "added author");
        author
    }

    /// Renames every author carrying `id` and returns the first of them.
    pub fn update_author(&self, id: i32, name: &str) -> Result<Author, StoreError> {
        let mut inner = self.write();
        let mut updated = None;
        for author in inner.authors.iter_mut().filter(|a| a.id == id) {
            author.name = name.to_owned();
            updated.get_or_insert_with(|| author.clone());
        }

        match updated {
            Some(author) => {
                info!(id, "renamed author");
                Ok(author)
            }
            None => {
                debug!(id, "no author to rename");
                Err(StoreError::NotFound {
                    entity: "Author",
                    id,
                })
            }
        }
    }
}
