use std::sync::Arc;

use futures::future::join_all;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::db::prelude::{PgStore, Store};
use crate::score::handler::ScoreHandler;
use crate::util::telemetry;

mod api;
mod constants;
mod db;
mod score;
mod socket;
mod util;

#[derive(Debug, Error)]
enum RunnerErr {
    #[error(transparent)]
    Db(#[from] db::DbError),

    #[error(transparent)]
    Route(#[from] api::server::RouteError),

    #[error(transparent)]
    Std(#[from] Box<dyn std::error::Error>),
}

type Result<T> = core::result::Result<T, RunnerErr>;

#[tokio::main]
async fn main() -> Result<()> {
    let telemetry_registry = telemetry::Telemetry::new().await?.register();

    tracing::info!("starting medal tracker");

    let pool = db::db_pool().await?;
    db::schema::migrate(pool).await?;

    let store: Arc<dyn Store> = Arc::new(PgStore::new(pool));
    let handler = Arc::new(ScoreHandler::new(Arc::clone(&store)));

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("shutdown requested");
                cancel.cancel();
            }
        }
    });

    let mut handles = socket::spawn_feeds(handler, cancel);
    handles.extend(api::server::start_server(store).await?);

    _ = join_all(handles).await;

    telemetry_registry.shutdown();
    Ok(())
}
