#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    pub id: i32,
    pub name: String,
    /// Soft reference, never checked against the known authors.
    pub author_id: i32,
}

pub static SEED_AUTHORS: &[(i32, &str)] = &[
    (1, "J. K. Rowling"),
    (2, "J. R. R. Tolkien"),
    (3, "Brent Weeks"),
];

pub static SEED_BOOKS: &[(i32, &str, i32)] = &[
    (1, "Harry Potter Chapter 1", 1),
    (2, "Harry Potter Chapter 2", 1),
    (3, "Harry Potter Chapter 3", 1),
    (4, "HThe fellowship of the ring", 2),
    (5, "the two tower", 2),
    (6, "The return of the king", 2),
    (7, "The way of shadows", 3),
    (8, "Beyond the shadows", 3),
];

pub fn seed_authors() -> Vec<Author> {
    SEED_AUTHORS
        .iter()
        .map(|&(id, name)| Author {
            id,
            name: name.into(),
        })
        .collect()
}

pub fn seed_books() -> Vec<Book> {
    SEED_BOOKS
        .iter()
        .map(|&(id, name, author_id)| Book {
            id,
            name: name.into(),
            author_id,
        })
        .collect()
}
