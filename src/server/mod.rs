use async_graphql::ServerError;
use async_graphql::http::GraphiQLSource;
use async_graphql::parser::parse_query;
use async_graphql::parser::types::{DocumentOperations, OperationType};
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::Router;
use axum::extract::{FromRequest, Request, State};
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::get;

mod dataloader;
mod loaders;
mod schema;

use crate::store::Library;
use dataloader::DataLoader;
use loaders::{LoadAuthor, LoadBooksByAuthor};
pub use schema::{LibrarySchema, build_schema};

pub const GRAPHQL_PATH: &str = "/graphql";

#[derive(Clone)]
pub struct AppState {
    schema: LibrarySchema,
    library: Library,
}

impl AppState {
    pub fn new(library: Library) -> Self {
        Self {
            schema: build_schema(library.clone()),
            library,
        }
    }

    /// Runs one GraphQL request with its own set of relationship loaders.
    pub async fn execute(&self, request: async_graphql::Request) -> async_graphql::Response {
        let load_books = DataLoader::new(LoadBooksByAuthor(self.library.clone()));
        let load_author = DataLoader::new(LoadAuthor(self.library.clone()));
        let request = request
            .data(load_books.clone())
            .data(load_author.clone());

        let execute = self.schema.execute(request);
        load_author.wrap(load_books.wrap(execute)).await
    }
}

pub fn schema_sdl() -> String {
    build_schema(Library::new(Vec::new(), Vec::new())).sdl()
}

fn graphiql() -> Html<String> {
    Html(GraphiQLSource::build().endpoint(GRAPHQL_PATH).finish())
}

/// The kind of operation `request` would run, if it can be told before execution.
///
/// Documents that fail to parse or name an unknown operation yield `None` and
/// are left to the executor to report.
fn operation_type(request: &async_graphql::Request) -> Option<OperationType> {
    let document = parse_query(&request.query).ok()?;
    match &document.operations {
        DocumentOperations::Single(op) => Some(op.node.ty),
        DocumentOperations::Multiple(ops) => {
            let name = request.operation_name.as_deref()?;
            ops.iter()
                .find(|(op_name, _)| op_name.as_str() == name)
                .map(|(_, op)| op.node.ty)
        }
    }
}

async fn graphql_get(State(state): State<AppState>, request: Request) -> Response {
    // A bare GET is a browser asking for the explorer.
    if request.uri().query().is_none_or(str::is_empty) {
        return graphiql().into_response();
    }

    let extracted = <GraphQLRequest as FromRequest<AppState>>::from_request(request, &state).await;
    let request = match extracted {
        Ok(req) => req.into_inner(),
        Err(rejection) => return rejection.into_response(),
    };

    // Writes over GET could be triggered by a plain link.
    let kind = match operation_type(&request) {
        Some(OperationType::Mutation) => Some("mutation"),
        Some(OperationType::Subscription) => Some("subscription"),
        Some(OperationType::Query) | None => None,
    };
    if let Some(kind) = kind {
        let error = ServerError::new(
            format!("Can only perform a {kind} operation from a POST request."),
            None,
        );
        let response = GraphQLResponse::from(async_graphql::Response::from_errors(vec![error]));
        return (
            StatusCode::METHOD_NOT_ALLOWED,
            [(header::ALLOW, "POST")],
            response,
        )
            .into_response();
    }

    GraphQLResponse::from(state.execute(request).await).into_response()
}

#[axum::debug_handler]
async fn graphql_post(State(state): State<AppState>, req: GraphQLRequest) -> GraphQLResponse {
    state.execute(req.into_inner()).await.into()
}

pub fn make_app(library: Library) -> Router {
    Router::new()
        .route("/", get(|| async { Redirect::to(GRAPHQL_PATH) }))
        .route(GRAPHQL_PATH, get(graphql_get).post(graphql_post))
        .with_state(AppState::new(library))
}
