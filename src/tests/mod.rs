use cynic::{MutationBuilder as _, QueryBuilder as _};

use crate::client::{
    AddAuthor, AddAuthorVariables, AllBooks, AuthorVariables, AuthorWithBooks, Client,
};
use crate::server::{GRAPHQL_PATH, make_app};
use crate::store::Library;


#[tokio::test]
async fn test_books_over_http() {
    let server = testserver::Server::with_router(make_app(Library::seeded()));
    let client = Client::new(server.url(GRAPHQL_PATH));

    let res = client.run(AllBooks::build(())).await;
    assert!(res.errors.is_none());

    let books: Vec<_> = res.data.unwrap().books.unwrap().into_iter().flatten().collect();
    let ids: Vec<_> = books.iter().map(|b| b.id).collect();
    assert_eq!(ids, [1, 2, 3, 4, 5, 6, 7, 8]);
    assert_eq!(books[0].name, "Harry Potter Chapter 1");
    assert_eq!(books[0].author_id, 1);
}

#[tokio::test]
async fn test_author_books_over_http() {
    let server = testserver::Server::with_router(make_app(Library::seeded()));
    let client = Client::new(server.url(GRAPHQL_PATH));

    let res = client
        .run(AuthorWithBooks::build(AuthorVariables { id: Some(2) }))
        .await;
    let author = res.data.unwrap().author.unwrap();
    assert_eq!(author.name, "J. R. R. Tolkien");
    let ids: Vec<_> = author.books.unwrap().into_iter().flatten().map(|b| b.id).collect();
    assert_eq!(ids, [4, 5, 6]);

    let res = client
        .run(AuthorWithBooks::build(AuthorVariables { id: Some(999) }))
        .await;
    assert!(res.data.unwrap().author.is_none());
}

#[tokio::test]
async fn test_add_author_over_http() {
    let library = Library::seeded();
    let server = testserver::Server::with_router(make_app(library.clone()));
    let client = Client::new(server.url(GRAPHQL_PATH));

    let res = client
        .run(AddAuthor::build(AddAuthorVariables {
            name: "New Author".into(),
        }))
        .await;
    let added = res.data.unwrap().add_author.unwrap();
    assert_eq!(added.id, 4);
    assert_eq!(added.name, "New Author");

    assert_eq!(library.authors().len(), 4);
}

#[tokio::test]
async fn test_get_serves_graphiql_and_queries() {
    let server = testserver::Server::with_router(make_app(Library::seeded()));
    let http = reqwest::Client::new();

    let page = http.get(server.url(GRAPHQL_PATH)).send().await.unwrap();
    assert!(page.status().is_success());
    let html = page.text().await.unwrap();
    assert!(html.contains("graphiql"));

    let mut url = server.url(GRAPHQL_PATH);
    url.query_pairs_mut()
        .append_pair("query", "{ book(id: 1) { author { name } } }");
    let body: serde_json::Value = http.get(url).send().await.unwrap().json().await.unwrap();
    assert_eq!(body["data"]["book"]["author"]["name"], "J. K. Rowling");
}

#[tokio::test]
async fn test_empty_query_string_serves_graphiql() {
    let server = testserver::Server::with_router(make_app(Library::seeded()));

    let mut url = server.url(GRAPHQL_PATH);
    url.set_query(Some(""));
    let page = reqwest::get(url).await.unwrap();
    assert!(page.status().is_success());
    assert!(page.text().await.unwrap().contains("graphiql"));
}

#[tokio::test]
async fn test_get_rejects_mutations() {
    let library = Library::seeded();
    let server = testserver::Server::with_router(make_app(library.clone()));
    let http = reqwest::Client::new();

    let mut url = server.url(GRAPHQL_PATH);
    url.query_pairs_mut()
        .append_pair("query", r#"mutation { addAuthor(name: "via GET") { id } }"#);
    let res = http.get(url).send().await.unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(res.headers()["allow"], "POST");
    let body: serde_json::Value = res.json().await.unwrap();
    assert!(body["errors"][0]["message"].as_str().unwrap().contains("POST"));
    assert_eq!(library.authors().len(), 3);

    // the operation picked by name decides, not the first one in the document
    let mut url = server.url(GRAPHQL_PATH);
    url.query_pairs_mut()
        .append_pair(
            "query",
            r#"query Read { authors { id } } mutation Write { addAuthor(name: "x") { id } }"#,
        )
        .append_pair("operationName", "Write");
    let res = http.get(url).send().await.unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::METHOD_NOT_ALLOWED);

    let mut url = server.url(GRAPHQL_PATH);
    url.query_pairs_mut()
        .append_pair(
            "query",
            r#"query Read { authors { id } } mutation Write { addAuthor(name: "x") { id } }"#,
        )
        .append_pair("operationName", "Read");
    let body: serde_json::Value = http.get(url).send().await.unwrap().json().await.unwrap();
    assert_eq!(body["data"]["authors"].as_array().unwrap().len(), 3);
    assert_eq!(library.authors().len(), 3);
}

#[tokio::test]
async fn test_root_redirects_to_endpoint() {
    let server = testserver::Server::with_router(make_app(Library::seeded()));
    let http = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    let res = http.get(server.url("/")).send().await.unwrap();
    assert!(res.status().is_redirection());
    assert_eq!(res.headers()["location"], GRAPHQL_PATH);
}
