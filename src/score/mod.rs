use thiserror::Error;

pub mod beatleader;
pub mod event;
pub mod handler;
pub mod ledger;
pub mod medals;
pub mod scoresaber;
pub mod table;

pub use event::{Platform, PlatformMessage, ScoreEvent};

pub type ScoreResult<T> = core::result::Result<T, ScoreError>;

#[derive(Debug, Error)]
pub enum ScoreError {
    #[error(transparent)]
    Db(#[from] crate::db::DbError),
}
