use std::net::SocketAddr;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "library-graphql", version, about = "GraphQL endpoint over an in-memory library")]
pub struct Args {
    /// Address the HTTP server listens on
    #[arg(long, default_value = "0.0.0.0:5000")]
    pub listen: SocketAddr,

    /// Print the GraphQL schema (SDL) and exit
    #[arg(long)]
    pub print_schema: bool,
}
