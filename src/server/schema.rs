use async_graphql::{
    ComplexObject, Context, EmptySubscription, ErrorExtensions, Object, Result, SimpleObject,
};

use crate::datamodel;
use crate::store::{Library, StoreError};

use super::loaders::Loaders;

pub type LibrarySchema = async_graphql::Schema<Query, Mutation, EmptySubscription>;

pub fn build_schema(library: Library) -> LibrarySchema {
    async_graphql::Schema::build(Query, Mutation, EmptySubscription)
        .data(library)
        .extension(async_graphql::extensions::Tracing)
        .finish()
}

fn library<'a>(ctx: &'a Context<'_>) -> &'a Library {
    ctx.data_unchecked::<Library>()
}

/// This represents an author name
#[derive(SimpleObject, Clone, Debug, PartialEq)]
#[graphql(complex)]
pub struct Author {
    pub id: i32,
    pub name: String,
}

impl From<datamodel::Author> for Author {
    fn from(author: datamodel::Author) -> Self {
        Self {
            id: author.id,
            name: author.name,
        }
    }
}

#[ComplexObject]
impl Author {
    async fn books(&self, ctx: &Context<'_>) -> Option<Vec<Option<Book>>> {
        let books = ctx.load_books_by_author(self.id).await;
        Some(books.into_iter().map(|b| Some(b.into())).collect())
    }
}

/// This represents a book written by an author
#[derive(SimpleObject, Clone, Debug, PartialEq)]
#[graphql(complex)]
pub struct Book {
    pub id: i32,
    pub name: String,
    pub author_id: i32,
}

impl From<datamodel::Book> for Book {
    fn from(book: datamodel::Book) -> Self {
        Self {
            id: book.id,
            name: book.name,
            author_id: book.author_id,
        }
    }
}

#[ComplexObject]
impl Book {
    /// Null when `authorId` does not point at a known author.
    async fn author(&self, ctx: &Context<'_>) -> Option<Author> {
        ctx.load_author(self.author_id).await.map(Author::from)
    }
}

/// Root Query
pub struct Query;

#[Object]
impl Query {
    /// A single book
    async fn book(&self, ctx: &Context<'_>, id: Option<i32>) -> Option<Book> {
        library(ctx).book(id?).map(Book::from)
    }

    /// List of All books
    async fn books(&self, ctx: &Context<'_>) -> Option<Vec<Option<Book>>> {
        Some(library(ctx).books().into_iter().map(|b| Some(b.into())).collect())
    }

    /// Single author
    async fn author(&self, ctx: &Context<'_>, id: Option<i32>) -> Option<Author> {
        library(ctx).author(id?).map(Author::from)
    }

    /// List of All authors
    async fn authors(&self, ctx: &Context<'_>) -> Option<Vec<Option<Author>>> {
        Some(library(ctx).authors().into_iter().map(|a| Some(a.into())).collect())
    }
}

/// Root Mutation
pub struct Mutation;

#[Object]
impl Mutation {
    /// Add a book
    async fn add_book(&self, ctx: &Context<'_>, name: String, author_id: i32) -> Option<Book> {
        let book = library(ctx).add_book(name, author_id);
        ctx.invalidate_loaders();
        Some(book.into())
    }

    /// Add an author
    async fn add_author(&self, ctx: &Context<'_>, name: String) -> Option<Author> {
        let author = library(ctx).add_author(name);
        ctx.invalidate_loaders();
        Some(author.into())
    }

    /// Update an author
    async fn update_author(
        &self,
        ctx: &Context<'_>,
        id: Option<i32>,
        name: String,
    ) -> Result<Option<Author>> {
        let id = id.ok_or_else(|| {
            StoreError::InvalidInput("`id` is required to update an author".into()).extend()
        })?;
        let author = library(ctx).update_author(id, &name).map_err(|e| e.extend())?;
        ctx.invalidate_loaders();
        Ok(Some(author.into()))
    }
}
