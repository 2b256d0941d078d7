use anyhow::Context as _;
use clap::Parser;
use tracing::info;

use config::Args;
use server::make_app;
use store::Library;

mod config;
mod datamodel;
mod server;
mod store;

#[cfg(test)]
mod tests;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    if args.print_schema {
        print!("{}", server::schema_sdl());
        return Ok(());
    }

    setup_tracing();
    info!(?args, "starting library-graphql");

    let app = make_app(Library::seeded());

    let listener = tokio::net::TcpListener::bind(args.listen)
        .await
        .with_context(|| format!("failed to bind {}", args.listen))?;
    info!(
        "GraphQL endpoint at http://{}{}",
        listener.local_addr()?,
        server::GRAPHQL_PATH
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server failed")?;

    info!("shutdown");
    Ok(())
}

fn setup_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(?e, "failed to install Ctrl-C handler");
        std::future::pending::<()>().await;
    }
}
