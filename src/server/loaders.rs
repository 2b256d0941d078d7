use async_graphql::Context;
use tracing::debug;

use crate::datamodel;
use crate::store::Library;

use super::dataloader::{BatchFuture, BatchLoader, DataLoader};

/// Access to the per-request loaders from inside resolvers.
pub trait Loaders {
    fn load_books_by_author(
        &self,
        author_id: i32,
    ) -> impl Future<Output = Vec<datamodel::Book>> + Send;
    fn load_author(&self, id: i32) -> impl Future<Output = Option<datamodel::Author>> + Send;
    /// Forgets everything loaded so far, called after each write.
    fn invalidate_loaders(&self);
}

impl Loaders for Context<'_> {
    async fn load_books_by_author(&self, author_id: i32) -> Vec<datamodel::Book> {
        self.data_unchecked::<DataLoader<LoadBooksByAuthor>>()
            .load(author_id)
            .await
    }

    async fn load_author(&self, id: i32) -> Option<datamodel::Author> {
        self.data_unchecked::<DataLoader<LoadAuthor>>()
            .load(id)
            .await
    }

    fn invalidate_loaders(&self) {
        self.data_unchecked::<DataLoader<LoadBooksByAuthor>>().clear();
        self.data_unchecked::<DataLoader<LoadAuthor>>().clear();
    }
}

pub struct LoadBooksByAuthor(pub Library);

impl BatchLoader for LoadBooksByAuthor {
    type K = i32;
    type V = Vec<datamodel::Book>;

    fn load_batch(&mut self, keys: Vec<i32>) -> BatchFuture<i32, Self::V> {
        let library = self.0.clone();
        Box::pin(async move {
            debug!(authors = ?keys, "resolving books by author");
            library.books_by_authors(&keys)
        })
    }
}

pub struct LoadAuthor(pub Library);

impl BatchLoader for LoadAuthor {
    type K = i32;
    type V = Option<datamodel::Author>;

    fn load_batch(&mut self, keys: Vec<i32>) -> BatchFuture<i32, Self::V> {
        let library = self.0.clone();
        Box::pin(async move {
            debug!(ids = ?keys, "resolving authors");
            library.authors_by_ids(&keys)
        })
    }
}
