use std::sync::LazyLock;

use sqlx::PgPool;
use thiserror::Error;
use tokio::sync::OnceCell;

use crate::util::env::{self, Var};
use crate::var;

pub mod models;
pub mod postgres;
pub mod schema;
pub mod store;

#[cfg(test)]
pub mod memory;

pub mod prelude {
    pub use crate::db::models::change::MedalChange;
    pub use crate::db::models::player::{Player, PlayerId};
    pub use crate::db::models::score::RankedScore;
    pub use crate::db::models::{HistoryQuery, Pagination};
    pub use crate::db::postgres::PgStore;
    pub use crate::db::store::Store;
    pub use crate::db::{DbError, DbResult, db_pool};
}

static DB_POOL: LazyLock<OnceCell<Db>> = LazyLock::new(OnceCell::new);

pub async fn db_pool() -> DbResult<&'static PgPool> {
    Ok(&DB_POOL
        .get_or_try_init(|| async { Db::new_pool().await })
        .await?
        .pool)
}

struct Db {
    pool: PgPool,
}

impl Db {
    pub async fn new_pool() -> DbResult<Self> {
        let db_url = var!(Var::DatabaseUrl).await?;
        let pool = sqlx::PgPool::connect(db_url).await?;

        Ok(Self { pool })
    }
}

pub type DbResult<T> = core::result::Result<T, DbError>;

#[derive(Debug, Error)]
pub enum DbError {
    #[error(transparent)]
    SqlxError(#[from] sqlx::Error),

    #[error("storage call exceeded its deadline")]
    Deadline,

    #[error("{0}")]
    EnvError(#[from] env::EnvErr),
}
